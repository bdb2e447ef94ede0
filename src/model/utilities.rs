use chrono::{DateTime, Local};
use futures::future::join_all;
use influxdb2::models::DataPoint;

use super::traits::MetricCollector;
use crate::error::StorageError;

/// Converts a point time to the nanosecond precision written to InfluxDB.
pub fn timestamp_nanos(timestamp: &DateTime<Local>) -> Result<i64, StorageError> {
    timestamp
        .timestamp_nanos_opt()
        .ok_or_else(|| StorageError::InvalidDataPoint("Timestamp overflow".to_string()))
}

/// Collects metrics from multiple collectors concurrently.
///
/// Collectors for different modems are independent, so they run in
/// parallel. Failed collections or conversions are logged but don't stop
/// other collectors.
///
/// # Arguments
/// * `collectors` - Metric collectors to run
/// * `timestamp` - The timestamp to use for all collected gauge values
///
/// # Returns
/// A vector of successfully collected and converted data points
pub async fn batch_collect_metrics(
    collectors: &[Box<dyn MetricCollector>],
    timestamp: DateTime<Local>,
) -> Vec<DataPoint> {
    let results = join_all(collectors.iter().map(|c| c.collect(timestamp))).await;

    results
        .into_iter()
        .filter_map(|res| match res {
            Ok(builders) => Some(builders),
            Err(e) => {
                tracing::error!("Failed to get metrics: {:?}", e);
                None
            }
        })
        .flatten()
        .filter_map(|p| match p.to_point() {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::error!("Failed to convert to point: {:?}", e);
                None
            }
        })
        .collect()
}
