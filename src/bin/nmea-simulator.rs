/*
Copyright 2020-2021 Timo Saarinen

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;

use nmea_simulator::config::{
    FileSinkConfig, LineEnding, OutputConfig, SimulatorConfig, TcpSinkConfig, UdpSinkConfig,
};
use nmea_simulator::output::{SentenceBus, SinkSet, DEFAULT_QUEUE_CAPACITY};
use nmea_simulator::sim::SimulationEngine;

/// NMEA 0183 / AIS sentence simulator
#[derive(Debug, Parser)]
#[command(name = "nmea-simulator", version, about)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long)]
    config: PathBuf,

    /// Override the configured simulation duration in seconds
    #[arg(long)]
    duration: Option<f64>,

    /// Add an output sink: file:<path>, tcp:<port> or udp:<host>:<port>
    #[arg(long)]
    output: Vec<String>,
}

/// Parse a compact output spec from the command line.
fn parse_output_spec(spec: &str) -> Result<OutputConfig> {
    match spec.split_once(':') {
        Some(("file", path)) if !path.is_empty() => Ok(OutputConfig::File(FileSinkConfig {
            path: PathBuf::from(path),
            line_ending: LineEnding::CrLf,
            rotation_size_mb: None,
            max_files: 5,
            auto_flush: true,
        })),
        Some(("tcp", port)) => Ok(OutputConfig::Tcp(TcpSinkConfig {
            host: "0.0.0.0".to_string(),
            port: port.parse().with_context(|| format!("bad TCP port: {}", port))?,
            max_clients: 16,
            client_timeout_secs: 60.0,
            send_timeout_secs: 5.0,
            queue_size: DEFAULT_QUEUE_CAPACITY,
        })),
        Some(("udp", rest)) => {
            let (host, port) = rest
                .rsplit_once(':')
                .with_context(|| format!("expected udp:<host>:<port>, got {}", spec))?;
            Ok(OutputConfig::Udp(UdpSinkConfig {
                host: host.to_string(),
                port: port.parse().with_context(|| format!("bad UDP port: {}", port))?,
                broadcast: host == "255.255.255.255" || host.ends_with(".255"),
            }))
        }
        _ => bail!("unsupported output spec: {}", spec),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = SimulatorConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(duration) = cli.duration {
        config.simulation.duration_seconds = duration;
    }
    for spec in &cli.output {
        config.outputs.push(parse_output_spec(spec)?);
    }
    config.validate().context("validating configuration")?;
    if config.outputs.is_empty() {
        warn!("No outputs configured; sentences will be discarded");
    }

    let bus = SentenceBus::new(DEFAULT_QUEUE_CAPACITY);
    let sinks = SinkSet::start(&config.outputs, &bus)
        .await
        .context("starting outputs")?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping");
            let _ = stop_tx.send(true);
        }
    });

    let mut engine = SimulationEngine::new(&config);
    engine.run(&bus, stop_rx).await;
    let stats = engine.stats();

    // Closing the bus lets the sinks drain their queues before the deadline
    drop(bus);
    for (name, counters) in sinks.shutdown(Duration::from_secs(5)).await {
        info!("Output {}: {}", name, counters);
    }
    info!("Simulation finished: {}", stats);
    Ok(())
}
