use std::fmt;

/// Represents the type of measurement being collected.
///
/// Each measurement type corresponds to a different InfluxDB measurement
/// (table) where the data will be stored.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Measurement {
    /// Per-channel receive statistics
    DownstreamChannel,
    /// Per-channel transmit statistics
    UpstreamChannel,
    /// Entries from the device event log
    Event,
    /// Exporter bookkeeping (scrape and error counters per page)
    Scrape,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Measurement::DownstreamChannel => write!(f, "downstream_channel"),
            Measurement::UpstreamChannel => write!(f, "upstream_channel"),
            Measurement::Event => write!(f, "event"),
            Measurement::Scrape => write!(f, "scrape"),
        }
    }
}

/// Management pages fetched on every poll.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Page {
    /// `DocsisStatus.asp`, the channel tables
    Status,
    /// `EventLog.asp`, the embedded XML event table
    Events,
}

impl Page {
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Status => "status",
            Page::Events => "events",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
