//! Event log records.
//!
//! The event page embeds a `<docsDevEventTable>` XML island; each `<tr>` in it
//! is one entry of the modem's DOCSIS event log.

use std::fmt;

use chrono::{Local, NaiveDateTime, TimeZone};
use influxdb2::models::DataPoint;
use serde_derive::Deserialize;

use crate::error::{ParseError, StorageError};
use crate::model::utilities::timestamp_nanos;
use crate::model::{DataPointBuilder, Measurement};
use crate::modem::extract::XmlTable;
use crate::modem::fields::{parse_counter, RowContext};

/// Text the modem reports when its clock has not been set via ToD yet.
pub const TIME_NOT_ESTABLISHED: &str = "Time Not Established";

/// Device-local timestamp format, e.g. `2024-03-01, 14:05:09`.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d, %H:%M:%S";

/// One `<tr>` of the event table as it appears on the wire.
///
/// Numeric elements are kept as text: firmware emits them empty on some rows.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRow {
    #[serde(rename = "docsDevEvIndex", default)]
    pub index: String,
    #[serde(rename = "docsDevEvFirstTime", default)]
    pub first_time: String,
    #[serde(rename = "docsDevEvLastTime", default)]
    pub last_time: String,
    #[serde(rename = "docsDevEvCounts", default)]
    pub count: String,
    #[serde(rename = "docsDevEvLevel", default)]
    pub level: String,
    #[serde(rename = "docsDevEvId", default)]
    pub id: String,
    #[serde(rename = "docsDevEvText", default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct EventTable {
    #[serde(rename = "tr", default)]
    rows: Vec<EventRow>,
}

impl XmlTable for EventTable {
    type Row = EventRow;
    const ROOT_TAG: &'static str = "docsDevEventTable";

    fn into_rows(self) -> Vec<EventRow> {
        self.rows
    }
}

/// An event timestamp as reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    At(NaiveDateTime),
    /// The sentinel [`TIME_NOT_ESTABLISHED`]
    NotEstablished,
    /// Anything else; kept verbatim for logging.
    Unparseable(String),
}

impl EventTime {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text == TIME_NOT_ESTABLISHED {
            return EventTime::NotEstablished;
        }
        match NaiveDateTime::parse_from_str(text, EVENT_TIME_FORMAT) {
            Ok(t) => EventTime::At(t),
            Err(_) => EventTime::Unparseable(text.to_string()),
        }
    }

    pub fn at(&self) -> Option<NaiveDateTime> {
        match self {
            EventTime::At(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventTime::At(t) => write!(f, "{}", t.format(EVENT_TIME_FORMAT)),
            EventTime::NotEstablished => write!(f, "{}", TIME_NOT_ESTABLISHED),
            EventTime::Unparseable(raw) => write!(f, "{}", raw),
        }
    }
}

/// A typed event log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub first_time: EventTime,
    pub last_time: EventTime,
    pub level: String,
    pub text: String,
    pub count: u64,
    pub id: u64,
    pub index: String,
}

impl EventRecord {
    /// Builds a record from a wire row, logging timestamps that are neither a
    /// datetime nor the sentinel.
    pub fn from_row(row: EventRow, ctx: RowContext) -> Self {
        let first_time = EventTime::parse(&row.first_time);
        if let EventTime::Unparseable(raw) = &first_time {
            let err = ParseError::datetime_parse(raw, format!("expected '{}'", EVENT_TIME_FORMAT));
            tracing::warn!(
                endpoint = ctx.endpoint,
                page = ctx.page,
                row = ctx.row,
                error = %err,
                "Event timestamp unparseable, row will not advance the high-water mark"
            );
        }

        Self {
            first_time,
            last_time: EventTime::parse(&row.last_time),
            level: row.level.trim().to_string(),
            text: row.text.trim().to_string(),
            count: Self::counter(&row.count, "docsDevEvCounts", ctx),
            id: Self::counter(&row.id, "docsDevEvId", ctx),
            index: row.index.trim().to_string(),
        }
    }

    fn counter(text: &str, element: &str, ctx: RowContext) -> u64 {
        let (field, err) = parse_counter(text);
        if let Some(err) = err {
            tracing::debug!(
                endpoint = ctx.endpoint,
                page = ctx.page,
                row = ctx.row,
                element,
                error = %err,
                "Event field did not match, using zero"
            );
        }
        field.value
    }

    /// Renders the entry as one line of the append-only event log.
    pub fn log_line(&self) -> String {
        format!("[{}] {} - {}\n", self.first_time, self.level, self.text)
    }
}

impl DataPointBuilder for EventRecord {
    fn to_point(&self) -> Result<DataPoint, StorageError> {
        let mut builder = DataPoint::builder(Measurement::Event.to_string())
            .tag("id", self.id.to_string());
        if !self.level.is_empty() {
            builder = builder.tag("priority", self.level.clone());
        }

        if let Some(first) = self.first_time.at() {
            // Device clocks are local time; ambiguous DST instants take the earlier.
            let local = Local
                .from_local_datetime(&first)
                .earliest()
                .ok_or_else(|| {
                    StorageError::InvalidDataPoint(format!("Nonexistent local time {}", first))
                })?;
            builder = builder.timestamp(timestamp_nanos(&local)?);
        }

        builder
            .field("description", self.text.clone())
            .field("count", self.count as i64)
            .field("index", self.index.clone())
            .field("last_time", self.last_time.to_string())
            .build()
            .map_err(|e| StorageError::InvalidDataPoint(format!("Failed to build EventRecord: {}", e)))
    }
}
