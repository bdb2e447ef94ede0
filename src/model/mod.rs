//! Data point model shared by collectors and the InfluxDB writer.
//!
//! Records scraped from the modem implement [`DataPointBuilder`]; each modem
//! is driven through the [`MetricCollector`] trait.

pub mod traits;
pub mod types;
pub mod utilities;

pub use traits::{DataPointBuilder, MetricCollector};
pub use types::{Measurement, Page};
pub use utilities::batch_collect_metrics;
