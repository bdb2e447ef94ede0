//! Scrape orchestration for one modem.
//!
//! A poll fetches the status page and the event page, turns their tables into
//! typed records and runs the event rows through the endpoint's dedup state.
//! Polls against the same endpoint are serialized by a per-endpoint lock that
//! guards the HTTP session, the dedup state and the scrape counters together.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use influxdb2::models::DataPoint;
use tokio::sync::Mutex;

use crate::config::ModemConfig;
use crate::error::{CollectorError, ModemError, ParseError, StorageError};
use crate::event_log::EventLogSink;
use crate::model::utilities::timestamp_nanos;
use crate::model::{DataPointBuilder, Measurement, MetricCollector, Page};
use crate::modem::channel::{DownstreamChannel, UpstreamChannel};
use crate::modem::client::Client;
use crate::modem::dedup::DedupState;
use crate::modem::event::{EventRecord, EventTable};
use crate::modem::extract::{HtmlTableExtractor, TableExtractor, XmlIslandExtractor};
use crate::modem::fields::RowContext;
use crate::modem::layout::PageLayout;

/// Process-lifetime counters for one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageStats {
    pub scrapes_total: u64,
    pub scrape_errors_total: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    pub status: PageStats,
    pub events: PageStats,
}

impl ScrapeStats {
    fn page_mut(&mut self, page: Page) -> &mut PageStats {
        match page {
            Page::Status => &mut self.status,
            Page::Events => &mut self.events,
        }
    }

    fn record(&mut self, page: Page, succeeded: bool) {
        let stats = self.page_mut(page);
        stats.scrapes_total += 1;
        if !succeeded {
            stats.scrape_errors_total += 1;
        }
    }
}

/// Counters of one page, as written to the time-series store.
#[derive(Debug, Clone)]
pub struct PageStatsMetric {
    pub page: Page,
    pub stats: PageStats,
    pub timestamp: DateTime<Local>,
}

impl DataPointBuilder for PageStatsMetric {
    fn to_point(&self) -> Result<DataPoint, StorageError> {
        DataPoint::builder(Measurement::Scrape.to_string())
            .tag("page", self.page.to_string())
            .field("scrapes_total", self.stats.scrapes_total as i64)
            .field("scrape_errors_total", self.stats.scrape_errors_total as i64)
            .timestamp(timestamp_nanos(&self.timestamp)?)
            .build()
            .map_err(|e| StorageError::InvalidDataPoint(format!("Failed to build PageStatsMetric: {}", e)))
    }
}

/// Everything one poll produced.
///
/// `events` holds only entries not handed out by an earlier snapshot. Entries
/// admitted by a poll whose caller stopped waiting are carried into the next
/// snapshot.
#[derive(Debug, Clone, Default)]
pub struct ScrapeSnapshot {
    pub downstream: Vec<DownstreamChannel>,
    pub upstream: Vec<UpstreamChannel>,
    pub events: Vec<EventRecord>,
    pub stats: ScrapeStats,
}

impl ScrapeSnapshot {
    /// Channel and counter points are stamped with `timestamp`; event points
    /// keep the device's own time.
    pub fn into_data_points(self, timestamp: DateTime<Local>) -> Vec<Box<dyn DataPointBuilder>> {
        let mut points: Vec<Box<dyn DataPointBuilder>> = Vec::with_capacity(
            self.downstream.len() + self.upstream.len() + self.events.len() + 2,
        );
        for mut channel in self.downstream {
            channel.timestamp = Some(timestamp);
            points.push(Box::new(channel));
        }
        for mut channel in self.upstream {
            channel.timestamp = Some(timestamp);
            points.push(Box::new(channel));
        }
        for event in self.events {
            points.push(Box::new(event));
        }
        points.push(Box::new(PageStatsMetric {
            page: Page::Status,
            stats: self.stats.status,
            timestamp,
        }));
        points.push(Box::new(PageStatsMetric {
            page: Page::Events,
            stats: self.stats.events,
            timestamp,
        }));
        points
    }
}

struct Session {
    client: Client,
    dedup: DedupState,
    stats: ScrapeStats,
    /// Admitted events not yet handed out in a snapshot.
    pending: Vec<EventRecord>,
}

struct Endpoint {
    address: String,
    layout: PageLayout,
    event_log: Option<EventLogSink>,
    session: Arc<Mutex<Session>>,
}

impl Endpoint {
    fn row_context(&self, page: Page, row: usize) -> RowContext<'_> {
        RowContext {
            endpoint: &self.address,
            page: page.as_str(),
            row,
        }
    }

    /// Runs one poll while holding the session. New events are queued on
    /// `session.pending`, not placed in the returned snapshot.
    async fn poll(&self, session: &mut Session) -> ScrapeSnapshot {
        let (downstream, upstream) = self.scrape_status(session).await;
        let events = self.scrape_events(session).await;

        if let Some(sink) = &self.event_log {
            if let Err(e) = sink.append(&events).await {
                tracing::error!(
                    endpoint = %self.address,
                    path = %sink.path().display(),
                    error = %e,
                    "Failed to write event log"
                );
            }
        }

        tracing::debug!(
            endpoint = %self.address,
            downstream = downstream.len(),
            upstream = upstream.len(),
            events = events.len(),
            high_water_mark = ?session.dedup.mark(),
            "Poll finished"
        );
        session.pending.extend(events);

        ScrapeSnapshot {
            downstream,
            upstream,
            events: Vec::new(),
            stats: session.stats,
        }
    }

    async fn fetch(&self, session: &mut Session, page: Page, path: &str) -> Option<String> {
        match session.client.get(path).await {
            Ok(body) => Some(body),
            Err(e) => {
                self.log_page_failure(page, &e);
                session.stats.record(page, false);
                None
            }
        }
    }

    fn log_page_failure(&self, page: Page, err: &ModemError) {
        match err {
            ModemError::AuthFailed => tracing::error!(
                endpoint = %self.address,
                page = %page,
                error = %err,
                "Modem rejected credentials"
            ),
            _ => tracing::warn!(
                endpoint = %self.address,
                page = %page,
                error = %err,
                "Failed to fetch page"
            ),
        }
    }

    async fn scrape_status(
        &self,
        session: &mut Session,
    ) -> (Vec<DownstreamChannel>, Vec<UpstreamChannel>) {
        let Some(body) = self.fetch(session, Page::Status, self.layout.status_path).await else {
            return (Vec::new(), Vec::new());
        };

        let downstream_columns = self.layout.downstream.columns;
        let downstream = self.channel_rows(&body, self.layout.downstream.table_id, |cells, ctx| {
            DownstreamChannel::from_cells(cells, &downstream_columns, ctx)
        });
        let upstream_columns = self.layout.upstream.columns;
        let upstream = self.channel_rows(&body, self.layout.upstream.table_id, |cells, ctx| {
            UpstreamChannel::from_cells(cells, &upstream_columns, ctx)
        });

        let succeeded = downstream.is_ok() && upstream.is_ok();
        session.stats.record(Page::Status, succeeded);
        let (downstream, upstream) = (downstream.unwrap_or_default(), upstream.unwrap_or_default());

        for channel in &downstream {
            tracing::trace!(
                endpoint = %self.address,
                channel = %channel.channel,
                frequency = %channel.frequency_label(),
                "Downstream channel"
            );
        }
        for channel in &upstream {
            tracing::trace!(
                endpoint = %self.address,
                channel = %channel.channel,
                frequency = %channel.frequency_label(),
                "Upstream channel"
            );
        }
        (downstream, upstream)
    }

    /// A missing table yields no rows for that table only.
    fn channel_rows<R>(
        &self,
        body: &str,
        table_id: &'static str,
        build: impl Fn(&[String], RowContext) -> R,
    ) -> Result<Vec<R>, ParseError> {
        let extractor = HtmlTableExtractor::new(table_id);
        let rows = extractor.extract(body).map_err(|e| {
            tracing::warn!(
                endpoint = %self.address,
                page = %Page::Status,
                table = extractor.table_id(),
                error = %e,
                "Channel table not found"
            );
            e
        })?;

        Ok(rows
            .iter()
            .enumerate()
            .map(|(row, cells)| build(cells.as_slice(), self.row_context(Page::Status, row)))
            .collect())
    }

    async fn scrape_events(&self, session: &mut Session) -> Vec<EventRecord> {
        let Some(body) = self.fetch(session, Page::Events, self.layout.event_path).await else {
            return Vec::new();
        };

        let rows = match XmlIslandExtractor::<EventTable>::new().extract(&body) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(
                    endpoint = %self.address,
                    page = %Page::Events,
                    error = %e,
                    "Event table did not match its schema"
                );
                session.stats.record(Page::Events, false);
                return Vec::new();
            }
        };
        session.stats.record(Page::Events, true);

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(row, wire)| EventRecord::from_row(wire, self.row_context(Page::Events, row)))
            .collect();
        session.dedup.begin_poll().retain_new(records)
    }
}

/// Scrapes one cable modem.
///
/// Cloning is cheap and clones share the same session, dedup state and
/// counters.
#[derive(Clone)]
pub struct ModemCollector {
    endpoint: Arc<Endpoint>,
}

impl ModemCollector {
    pub fn new(config: &ModemConfig) -> Result<Self, ModemError> {
        let client = Client::new(config)?;
        let model = config.model();
        tracing::info!(
            endpoint = %config.address,
            url = client.base_url(),
            model = %model,
            "Configured modem"
        );

        Ok(Self {
            endpoint: Arc::new(Endpoint {
                address: config.address.clone(),
                layout: model.layout(),
                event_log: config.event_log_path.as_ref().map(EventLogSink::new),
                session: Arc::new(Mutex::new(Session {
                    client,
                    dedup: DedupState::new(),
                    stats: ScrapeStats::default(),
                    pending: Vec::new(),
                })),
            }),
        })
    }

    pub fn address(&self) -> &str {
        &self.endpoint.address
    }

    /// Runs one poll to completion.
    ///
    /// Dropping the returned future while it waits for an earlier poll means
    /// this poll never starts. Once it holds the session the poll runs on its
    /// own task and finishes even if the caller stops waiting; the events it
    /// admitted are then returned by the next snapshot.
    pub async fn poll(&self) -> Result<ScrapeSnapshot, CollectorError> {
        let mut session = Arc::clone(&self.endpoint.session).lock_owned().await;
        let endpoint = Arc::clone(&self.endpoint);

        let (mut snapshot, mut session) = tokio::spawn(async move {
            let snapshot = endpoint.poll(&mut session).await;
            (snapshot, session)
        })
        .await
        .map_err(|e| CollectorError::poll_aborted(self.address(), e))?;

        snapshot.events = std::mem::take(&mut session.pending);
        Ok(snapshot)
    }
}

#[async_trait]
impl MetricCollector for ModemCollector {
    async fn collect(
        &self,
        timestamp: DateTime<Local>,
    ) -> Result<Vec<Box<dyn DataPointBuilder>>, CollectorError> {
        Ok(self.poll().await?.into_data_points(timestamp))
    }
}
