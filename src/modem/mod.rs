//! Netgear cable modem scraping.
//!
//! The modem exposes its DOCSIS state only through HTML management pages:
//! `DocsisStatus.asp` carries the downstream and upstream channel tables and
//! `EventLog.asp` embeds the device event log as an XML island.

pub mod channel;
mod client;
mod collector;
pub mod dedup;
pub mod event;
pub mod extract;
pub mod fields;
pub mod layout;

pub use collector::ModemCollector;
pub use layout::ModemModel;
