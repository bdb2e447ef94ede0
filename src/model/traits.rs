use crate::error::{CollectorError, Result, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use influxdb2::models::DataPoint;

/// Trait for types that can be converted to InfluxDB data points.
///
/// Implementors must be thread-safe (Send + Sync) so snapshots can be
/// handed across tasks.
pub trait DataPointBuilder: Send + Sync {
    /// Converts the record into an InfluxDB DataPoint.
    ///
    /// # Returns
    /// - `Ok(DataPoint)` if conversion succeeds
    /// - `Err` if the record cannot be converted to a valid DataPoint
    fn to_point(&self) -> Result<DataPoint, StorageError>;
}

/// The "collect now" entry point invoked by the scheduler.
///
/// Each call performs one poll of the underlying source and returns
/// everything that should be written for it.
#[async_trait]
pub trait MetricCollector: Send + Sync {
    /// Collects metrics at the specified timestamp.
    ///
    /// # Arguments
    /// * `timestamp` - The time to associate with collected gauge values
    async fn collect(
        &self,
        timestamp: DateTime<Local>,
    ) -> Result<Vec<Box<dyn DataPointBuilder>>, CollectorError>;
}
