//! Netgear Cable Modem to InfluxDB2 Forwarder
//!
//! Scrapes DOCSIS channel statistics and the device event log from a Netgear
//! cable modem's management pages and forwards them to InfluxDB2.
//!
//! # Architecture
//!
//! A single collection loop polls the modem every `COLLECTOR_INTERVAL_SEC`:
//! - **Status page**: downstream and upstream channel tables
//! - **Event page**: the event log, deduplicated across polls so each entry
//!   is written once
//!
//! # Features
//!
//! - Automatic restart of the collection task on failure
//! - Graceful shutdown on SIGTERM/SIGINT
//! - Timeout protection for hung cycles
//! - Optional append-only text log of new events

mod config;
mod error;
mod event_log;
mod influxdb;
mod model;
mod modem;

#[cfg(test)]
mod test_utils;

use crate::model::{batch_collect_metrics, MetricCollector};
use anyhow::Context;
use chrono::Local;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinError;
use tokio::time;
use tokio::time::{sleep, Duration};

/// Application entry point.
///
/// Loads configuration, builds the modem collector and supervises the
/// collection task until a shutdown signal arrives.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_app_config()?;
    tracing_subscriber::fmt()
        .with_max_level(app_config.log_level())
        .init();

    let collector_config = Arc::new(config::load_collector_config()?);
    let influx_config = config::load_influx_config()?;
    let influx_client = Arc::new(influxdb::Client::new(influx_config));

    let modem_config = config::load_modem_config()?;
    let modem_collector =
        modem::ModemCollector::new(&modem_config).context("Failed to create modem collector")?;
    let collectors: Arc<Vec<Box<dyn MetricCollector>>> =
        Arc::new(vec![Box::new(modem_collector)]);

    // Recreated after every cycle, and after a crash
    let spawn_collect_task = || -> tokio::task::JoinHandle<()> {
        let config = Arc::clone(&collector_config);
        tokio::spawn(create_collect_task(
            Arc::clone(&influx_client),
            Arc::clone(&collectors),
            Duration::from_secs(config.interval_sec),
            "modem_collectors",
            config.task_timeout_seconds,
        ))
    };
    let mut collect_task = spawn_collect_task();

    let mut sig_term =
        signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;
    tracing::info!("Running... Press Ctrl-C or send SIGTERM to terminate.");
    loop {
        tokio::select! {
            _ = sig_term.recv() => {
                tracing::info!("Received SIGTERM. Exiting...");
                break;
            }
            _ = ctrl_c() => {
                tracing::info!("Received SIGINT. Exiting...");
                break;
            }
            result = &mut collect_task => {
                handle_task_result("modem_collectors", result);
                collect_task = spawn_collect_task();
            }
        }
    }
    Ok(())
}

/// Runs `future` with a timeout, logging instead of propagating expiry.
///
/// An expired cycle only stops waiting: polls already in flight run to
/// completion on their own tasks.
async fn with_timeout<F>(task_name: &'static str, future: F, timeout_seconds: u64)
where
    F: IntoFuture,
{
    let timeout_duration = Duration::from_secs(timeout_seconds);

    if time::timeout(timeout_duration, future).await.is_err() {
        tracing::error!("Task {} timed out.", task_name);
    }
}

/// One collection cycle: collect from every collector, write the points to
/// InfluxDB, then sleep for `interval`.
///
/// Collection and write errors are logged and never end the task.
async fn create_collect_task(
    influx_client: Arc<influxdb::Client>,
    collectors: Arc<Vec<Box<dyn MetricCollector>>>,
    interval: Duration,
    task_name: &'static str,
    timeout_seconds: u64,
) {
    with_timeout(
        task_name,
        async {
            let points = batch_collect_metrics(&collectors, Local::now()).await;

            for point in &points {
                tracing::debug!("{:?}", point);
            }

            match influx_client.write(points).await {
                Ok(count) => tracing::info!(
                    "Successfully wrote {} points to InfluxDB ({})",
                    count,
                    task_name
                ),
                Err(e) => tracing::error!(
                    "Failed to write points to InfluxDB ({}): {:?}",
                    task_name,
                    e
                ),
            }
        },
        timeout_seconds,
    )
    .await;
    sleep(interval).await;
}

/// Logs how a collection task ended. Panics and cancellations are errors.
fn handle_task_result(task_name: &str, result: Result<(), JoinError>) {
    match result {
        Ok(_) => {
            tracing::debug!("Task {} completed.", task_name);
        }
        Err(e) => {
            tracing::error!("Task {} failed: {:?}", task_name, e);
        }
    }
}
