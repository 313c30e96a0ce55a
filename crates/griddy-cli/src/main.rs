mod cli;
mod config;
mod discovery;

use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use griddy_core::RingBuffer;
use griddy_dispatch::CbcBackend;
use griddy_link::{out_ready_channel, run_in_link, run_out_link, RECONNECT_BACKOFF};
use griddy_llm::{EscalationClient, EscalationConfig};
use griddy_scheduler::{run_scheduler, Metrics, SchedulerContext};

const EXIT_OK: i32 = 0;
const EXIT_CONFIG_ERROR: i32 = 2;
const EXIT_FATAL: i32 = 3;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            std::process::exit(EXIT_FATAL);
        }
    };

    let exit_code = runtime.block_on(run(cli));
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> i32 {
    let config = match config::load_config(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, path = %cli.config.display(), "configuration error");
            return EXIT_CONFIG_ERROR;
        }
    };

    let device_ip = discovery::discover_device_ip(config.kv_url.as_deref(), &config.fallback_ip).await;
    let out_url = format!("ws://{device_ip}/out");
    let in_url = format!("ws://{device_ip}/in");

    let ring = Arc::new(Mutex::new(RingBuffer::new(config.ring_capacity)));
    let metrics = Arc::new(Mutex::new(Metrics::new()));
    let (ready_tx, ready_rx) = out_ready_channel();
    let (frame_tx, frame_rx) = mpsc::channel::<()>(16);

    let _out_link = run_out_link(
        out_url,
        Arc::clone(&ring),
        Arc::clone(&metrics),
        ready_tx,
        frame_tx,
        RECONNECT_BACKOFF,
    )
    .await;
    let in_link = run_in_link(in_url, ready_rx, RECONNECT_BACKOFF).await;

    let llm = match &config.llm_endpoint {
        Some(endpoint) => {
            // load_config already rejected an endpoint with no api key.
            let escalation_config = EscalationConfig {
                endpoint: endpoint.clone(),
                api_key: config.llm_api_key.clone().expect("validated by load_config"),
                timeout: config.cycle_deadline(),
            };
            match EscalationClient::new(escalation_config) {
                Ok(client) => Some(Arc::new(client)),
                Err(err) => {
                    error!(error = %err, "failed to build escalation client, continuing without one");
                    None
                }
            }
        }
        None => None,
    };

    let ctx = Arc::new(SchedulerContext {
        ring,
        metrics,
        in_link,
        sources: config.sources.clone(),
        config,
        solver: Arc::new(CbcBackend::default()),
        llm,
    });

    info!("griddyd started");

    tokio::select! {
        _ = run_scheduler(ctx, frame_rx) => {
            error!("scheduler loop exited unexpectedly");
            EXIT_FATAL
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
            EXIT_OK
        }
    }
}
