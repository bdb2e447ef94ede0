//! Per-model page layouts.
//!
//! A model is resolved once when the collector is built. Everything that
//! varies between firmware variants (page paths, table ids, column order)
//! lives in the [`PageLayout`] it returns, so the parsing code never branches
//! on the model itself.

use std::fmt;

/// Column positions of the downstream channel table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownstreamColumns {
    pub channel: usize,
    pub lock_status: usize,
    pub modulation: usize,
    pub channel_id: usize,
    pub frequency: usize,
    pub power: usize,
    pub snr: usize,
    pub correctable: usize,
    pub uncorrectable: usize,
}

/// Column positions of the upstream channel table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamColumns {
    pub channel: usize,
    pub lock_status: usize,
    pub channel_type: usize,
    pub channel_id: usize,
    pub symbol_rate: usize,
    pub frequency: usize,
    pub power: usize,
}

/// Where a table lives and how its columns are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout<C> {
    pub table_id: &'static str,
    pub columns: C,
}

/// Everything the orchestrator needs to know about one modem model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub status_path: &'static str,
    pub event_path: &'static str,
    pub downstream: TableLayout<DownstreamColumns>,
    pub upstream: TableLayout<UpstreamColumns>,
}

const DOCSIS_DOWNSTREAM: DownstreamColumns = DownstreamColumns {
    channel: 0,
    lock_status: 1,
    modulation: 2,
    channel_id: 3,
    frequency: 4,
    power: 5,
    snr: 6,
    correctable: 7,
    uncorrectable: 8,
};

const DOCSIS_UPSTREAM: UpstreamColumns = UpstreamColumns {
    channel: 0,
    lock_status: 1,
    channel_type: 2,
    channel_id: 3,
    symbol_rate: 4,
    frequency: 5,
    power: 6,
};

/// Supported modem models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemModel {
    Cm600,
    Cm1000,
}

impl ModemModel {
    /// Resolves a configured model name. Unknown names fall back to CM600.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "CM600" => ModemModel::Cm600,
            "CM1000" => ModemModel::Cm1000,
            other => {
                tracing::warn!(model = other, "Unknown modem model, defaulting to CM600");
                ModemModel::Cm600
            }
        }
    }

    pub fn layout(self) -> PageLayout {
        match self {
            // Both firmwares render the DOCSIS 3.0 bonded channel tables the
            // same way; they differ only in the extra 3.1 tables, which are
            // not scraped.
            ModemModel::Cm600 | ModemModel::Cm1000 => PageLayout {
                status_path: "/DocsisStatus.asp",
                event_path: "/EventLog.asp",
                downstream: TableLayout {
                    table_id: "dsTable",
                    columns: DOCSIS_DOWNSTREAM,
                },
                upstream: TableLayout {
                    table_id: "usTable",
                    columns: DOCSIS_UPSTREAM,
                },
            },
        }
    }
}

impl fmt::Display for ModemModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModemModel::Cm600 => write!(f, "CM600"),
            ModemModel::Cm1000 => write!(f, "CM1000"),
        }
    }
}
