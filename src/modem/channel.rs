//! Downstream and upstream channel records built from status page rows.

use chrono::{DateTime, Local};
use influxdb2::models::DataPoint;

use crate::error::StorageError;
use crate::model::utilities::timestamp_nanos;
use crate::model::{DataPointBuilder, Measurement};
use crate::modem::fields::{format_megahertz, hertz_to_megahertz, RowContext, RowReader, Unit};
use crate::modem::layout::{DownstreamColumns, UpstreamColumns};

/// One row of the downstream (receive) channel table.
#[derive(Debug, Clone, PartialEq)]
pub struct DownstreamChannel {
    pub channel: String,
    pub lock_status: String,
    pub modulation: String,
    pub channel_id: String,
    pub frequency_hz: f64,
    pub power_dbmv: f64,
    pub snr_db: f64,
    pub correctable_errors: u64,
    pub uncorrectable_errors: u64,
    /// Collection time; unset points get the server's write time.
    pub timestamp: Option<DateTime<Local>>,
}

impl DownstreamChannel {
    /// Builds a record from raw cells. Never fails: unparseable or missing
    /// cells leave their field at zero.
    pub fn from_cells(cells: &[String], columns: &DownstreamColumns, ctx: RowContext) -> Self {
        let row = RowReader::new(cells, ctx);
        Self {
            channel: row.text(columns.channel),
            lock_status: row.text(columns.lock_status),
            modulation: row.text(columns.modulation),
            channel_id: row.text(columns.channel_id),
            frequency_hz: row.float(columns.frequency, Unit::Hertz),
            power_dbmv: row.float(columns.power, Unit::DbMillivolt),
            snr_db: row.float(columns.snr, Unit::Decibel),
            correctable_errors: row.counter(columns.correctable),
            uncorrectable_errors: row.counter(columns.uncorrectable),
            timestamp: None,
        }
    }

    pub fn frequency_mhz(&self) -> f64 {
        hertz_to_megahertz(self.frequency_hz)
    }

    pub fn frequency_label(&self) -> String {
        format_megahertz(self.frequency_hz)
    }
}

/// One row of the upstream (transmit) channel table.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamChannel {
    pub channel: String,
    pub lock_status: String,
    pub channel_type: String,
    pub channel_id: String,
    /// Symbols per second, converted from the page's Ksym/sec
    pub symbol_rate: f64,
    pub frequency_hz: f64,
    pub power_dbmv: f64,
    pub timestamp: Option<DateTime<Local>>,
}

impl UpstreamChannel {
    pub fn from_cells(cells: &[String], columns: &UpstreamColumns, ctx: RowContext) -> Self {
        let row = RowReader::new(cells, ctx);
        Self {
            channel: row.text(columns.channel),
            lock_status: row.text(columns.lock_status),
            channel_type: row.text(columns.channel_type),
            channel_id: row.text(columns.channel_id),
            symbol_rate: row.symbol_rate(columns.symbol_rate),
            frequency_hz: row.float(columns.frequency, Unit::Hertz),
            power_dbmv: row.float(columns.power, Unit::DbMillivolt),
            timestamp: None,
        }
    }

    pub fn frequency_mhz(&self) -> f64 {
        hertz_to_megahertz(self.frequency_hz)
    }

    pub fn frequency_label(&self) -> String {
        format_megahertz(self.frequency_hz)
    }
}

// Frequency is written as a field: it is a measurement that drifts with
// channel plans, and only channel/channel_id identify a series.
impl DataPointBuilder for DownstreamChannel {
    fn to_point(&self) -> Result<DataPoint, StorageError> {
        let mut builder = DataPoint::builder(Measurement::DownstreamChannel.to_string());
        for (key, value) in [
            ("channel", &self.channel),
            ("lock_status", &self.lock_status),
            ("modulation", &self.modulation),
            ("channel_id", &self.channel_id),
        ] {
            // Empty tag values are rejected by line protocol.
            if !value.is_empty() {
                builder = builder.tag(key, value.clone());
            }
        }

        if let Some(timestamp) = &self.timestamp {
            builder = builder.timestamp(timestamp_nanos(timestamp)?);
        }

        builder
            .field("frequency_mhz", self.frequency_mhz())
            .field("power_dbmv", self.power_dbmv)
            .field("snr_db", self.snr_db)
            .field("correctable_errors_total", self.correctable_errors as i64)
            .field("uncorrectable_errors_total", self.uncorrectable_errors as i64)
            .build()
            .map_err(|e| {
                StorageError::InvalidDataPoint(format!("Failed to build DownstreamChannel: {}", e))
            })
    }
}

impl DataPointBuilder for UpstreamChannel {
    fn to_point(&self) -> Result<DataPoint, StorageError> {
        let mut builder = DataPoint::builder(Measurement::UpstreamChannel.to_string());
        for (key, value) in [
            ("channel", &self.channel),
            ("lock_status", &self.lock_status),
            ("channel_type", &self.channel_type),
            ("channel_id", &self.channel_id),
        ] {
            if !value.is_empty() {
                builder = builder.tag(key, value.clone());
            }
        }

        if let Some(timestamp) = &self.timestamp {
            builder = builder.timestamp(timestamp_nanos(timestamp)?);
        }

        builder
            .field("frequency_mhz", self.frequency_mhz())
            .field("power_dbmv", self.power_dbmv)
            .field("symbol_rate", self.symbol_rate)
            .build()
            .map_err(|e| {
                StorageError::InvalidDataPoint(format!("Failed to build UpstreamChannel: {}", e))
            })
    }
}
