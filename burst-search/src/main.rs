mod parameters;
mod processing;
mod simulation;

use anyhow::{Result, bail};
use burstsearch_common::{
    init_tracer,
    metrics::{
        component_info_metric,
        metric_names::{
            BURSTS_DETECTED, CHANNELS_PROCESSED, FAILURES, LAST_FRAME_NUMBER, PHOTONS_PROCESSED,
        },
    },
};
use clap::{Parser, Subcommand};
use metrics::gauge;
use metrics_exporter_prometheus::PrometheusBuilder;
use parameters::{Continuous, DetectorSettings, SimulationParameters, Single};
use std::{net::SocketAddr, time::Duration};
use tokio::{signal, time};
use tracing::{info, level_filters::LevelFilter};

// cargo run --bin burst-search -- --search 10,8000,30 --alex-period 4000 --dual-channel --seed 1 single

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(flatten)]
    detector: DetectorSettings,

    #[clap(flatten)]
    simulation: SimulationParameters,

    /// Endpoint on which OpenMetrics flavour metrics are available
    #[clap(long, env, default_value = "127.0.0.1:9090")]
    observability_address: SocketAddr,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run in single shot mode, search a single frame then exit
    Single(Single),

    /// Run in continuous mode, searching one frame every `frame-time` milliseconds until interrupted
    Continuous(Continuous),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let tracer = init_tracer!(LevelFilter::INFO);

    let builder = PrometheusBuilder::new();
    builder
        .with_http_listener(args.observability_address)
        .install()?;

    metrics::describe_counter!(
        PHOTONS_PROCESSED,
        metrics::Unit::Count,
        "Number of photons searched"
    );
    metrics::describe_counter!(
        BURSTS_DETECTED,
        metrics::Unit::Count,
        "Number of bursts detected"
    );
    metrics::describe_counter!(
        CHANNELS_PROCESSED,
        metrics::Unit::Count,
        "Number of channels searched"
    );
    metrics::describe_counter!(
        FAILURES,
        metrics::Unit::Count,
        "Number of failures encountered"
    );
    metrics::describe_gauge!(
        LAST_FRAME_NUMBER,
        metrics::Unit::Count,
        "Number of the last frame searched"
    );
    component_info_metric("burst-search");

    info!(
        "{} searching with parameters {} ({} trailing bursts) using the {} engine",
        tracer.service_name(),
        args.detector.search,
        args.detector.trailing_burst,
        args.detector.implementation
    );

    match &args.mode {
        Mode::Single(single) => {
            let report = run_frame(&args, single.frame_number);
            if let Some((channel, e)) = report.failures.first() {
                bail!("Channel {channel} failed: {e}");
            }
        }
        Mode::Continuous(continuous) => {
            let mut frame = time::interval(Duration::from_millis(continuous.frame_time));
            let mut frame_number = continuous.start_frame_number;
            loop {
                tokio::select! {
                    _ = frame.tick() => {
                        run_frame(&args, frame_number);
                        frame_number = frame_number.wrapping_add(1);
                    }
                    _ = signal::ctrl_c() => {
                        let frames = frame_number.wrapping_sub(continuous.start_frame_number);
                        info!("Interrupted after {frames} frames");
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}

fn run_frame(args: &Cli, frame_number: u32) -> processing::FrameReport {
    let report = processing::process_frame(frame_number, &args.detector, &args.simulation);
    report.log_summary(args.simulation.clock_period);
    gauge!(LAST_FRAME_NUMBER).set(frame_number);
    report
}
