//! Mock implementations of MetricCollector and DataPointBuilder.

use crate::error::{CollectorError, StorageError};
use crate::model::{DataPointBuilder, MetricCollector};
use crate::modem::channel::DownstreamChannel;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use influxdb2::models::DataPoint;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A locked downstream channel with the given channel number.
pub fn test_channel(channel: &str) -> DownstreamChannel {
    DownstreamChannel {
        channel: channel.to_string(),
        lock_status: "Locked".to_string(),
        modulation: "QAM256".to_string(),
        channel_id: channel.to_string(),
        frequency_hz: 603_000_000.0,
        power_dbmv: 3.4,
        snr_db: 40.1,
        correctable_errors: 0,
        uncorrectable_errors: 0,
        timestamp: None,
    }
}

/// Boxed test channels, one per channel number.
pub fn test_points(channels: &[&str]) -> Vec<Box<dyn DataPointBuilder>> {
    channels
        .iter()
        .map(|channel| Box::new(test_channel(channel)) as Box<dyn DataPointBuilder>)
        .collect()
}

/// A collector that succeeds with generated data or fails as a poll abort.
pub struct MockMetricCollector {
    failing_endpoint: Option<String>,
    create_data: Box<dyn Fn() -> Vec<Box<dyn DataPointBuilder>> + Send + Sync>,
    delay: Option<Duration>,
    call_count: Arc<AtomicUsize>,
}

impl MockMetricCollector {
    pub fn new_success() -> Self {
        Self::new_with_data(|| test_points(&["1"]))
    }

    /// Fails every call with a poll abort for `endpoint`.
    pub fn new_failure(endpoint: impl Into<String>) -> Self {
        Self {
            failing_endpoint: Some(endpoint.into()),
            create_data: Box::new(Vec::new),
            delay: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn new_with_data<F>(create_fn: F) -> Self
    where
        F: Fn() -> Vec<Box<dyn DataPointBuilder>> + Send + Sync + 'static,
    {
        Self {
            failing_endpoint: None,
            create_data: Box::new(create_fn),
            delay: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleeps before answering, to exercise cycle timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared counter of `collect` calls.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }
}

#[async_trait]
impl MetricCollector for MockMetricCollector {
    async fn collect(
        &self,
        _timestamp: DateTime<Local>,
    ) -> Result<Vec<Box<dyn DataPointBuilder>>, CollectorError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failing_endpoint {
            Some(endpoint) => Err(CollectorError::poll_aborted(endpoint, "task panicked")),
            None => Ok((self.create_data)()),
        }
    }
}

/// A record whose conversion always fails.
pub struct FailingDataPointBuilder;

impl DataPointBuilder for FailingDataPointBuilder {
    fn to_point(&self) -> Result<DataPoint, StorageError> {
        Err(StorageError::InvalidDataPoint("always fails".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_success_collector() {
        let collector = MockMetricCollector::new_success();
        let data = collector.collect(Local::now()).await.unwrap();
        assert_eq!(data.len(), 1);
        assert!(data[0].to_point().is_ok());
    }

    #[tokio::test]
    async fn test_mock_failure_collector() {
        let collector = MockMetricCollector::new_failure("10.0.0.1");
        let err = collector.collect(Local::now()).await.err().unwrap();
        assert!(err.to_string().contains("10.0.0.1"));
    }

    #[tokio::test]
    async fn test_call_counter() {
        let collector = MockMetricCollector::new_success();
        let counter = collector.call_counter();

        collector.collect(Local::now()).await.unwrap();
        collector.collect(Local::now()).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failing_data_point_builder() {
        assert!(FailingDataPointBuilder.to_point().is_err());
    }
}
