//! Runs one monitor invocation and prints the response as JSON.
//!
//! Usage: `sms-spend-monitor [CONFIG_FILE]`. Without a file, configuration is read
//! from `SMS_MONITOR_*` environment variables.

use std::process::ExitCode;
use std::sync::Arc;

use sms_spend_monitor::observability::{TracingConfig, init_tracing_subscriber};
use sms_spend_monitor::{AwsProvider, MonitorConfig, Result, UsageMonitor};
use tracing::{error, info};

const LOCAL_EVENT: &str = "Local Test";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing_subscriber(&TracingConfig::new().service_name(env!("CARGO_PKG_NAME")));

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Invocation failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "Loading configuration file");
            MonitorConfig::from_file(path).await?
        }
        None => MonitorConfig::from_env()?,
    };
    config.validate()?;

    let provider = Arc::new(AwsProvider::from_config(&config).await?);
    let monitor = UsageMonitor::builder(config)
        .usage_provider(provider.clone())
        .notifier(provider.clone())
        .identity(provider)
        .skip_validation()
        .build()?;

    let response = monitor.invoke(serde_json::json!(LOCAL_EVENT)).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
