use crate::config::InfluxConfig;
use crate::error::StorageError;
use futures::prelude::stream;
use influxdb2::models::DataPoint;

pub struct Client {
    client: influxdb2::Client,
    bucket: String,
}

impl Client {
    pub(crate) fn new(config: InfluxConfig) -> Self {
        let client = influxdb2::Client::new(config.url, config.org, config.token);
        Self {
            client,
            bucket: config.bucket,
        }
    }

    /// Writes a batch to the configured bucket. An empty batch is a no-op.
    pub async fn write(&self, points: Vec<DataPoint>) -> Result<usize, StorageError> {
        if points.is_empty() {
            return Ok(0);
        }
        let count = points.len();
        self.client
            .write(self.bucket.as_str(), stream::iter(points))
            .await?;
        Ok(count)
    }
}
