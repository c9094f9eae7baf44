/*
Copyright 2020 Timo Saarinen

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

//! Serial port sink with reconnection

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};

use super::{Sentence, SinkCounters};
use crate::config::SerialSinkConfig;
use crate::error::SinkError;

/// Open the device and spawn the writer task. A missing or unusable device at startup
/// is fatal; later write failures trigger the reconnection policy instead.
pub(crate) async fn start(
    config: &SerialSinkConfig,
    rx: broadcast::Receiver<Sentence>,
    counters: Arc<SinkCounters>,
) -> Result<JoinHandle<()>, SinkError> {
    let port = open(config).map_err(|e| SinkError::Startup(format!("{}: {}", config.device, e)))?;
    Ok(tokio::spawn(run(config.clone(), port, rx, counters)))
}

fn open(config: &SerialSinkConfig) -> tokio_serial::Result<SerialStream> {
    tokio_serial::new(config.device.as_str(), config.baud_rate)
        .data_bits(data_bits(config.data_bits))
        .parity(parity(&config.parity))
        .stop_bits(stop_bits(config.stop_bits))
        .flow_control(flow_control(&config.flow_control))
        .open_native_async()
}

pub(crate) fn data_bits(bits: u8) -> DataBits {
    match bits {
        5 => DataBits::Five,
        6 => DataBits::Six,
        7 => DataBits::Seven,
        _ => DataBits::Eight,
    }
}

pub(crate) fn parity(parity: &str) -> Parity {
    match parity {
        "odd" => Parity::Odd,
        "even" => Parity::Even,
        _ => Parity::None,
    }
}

pub(crate) fn stop_bits(bits: u8) -> StopBits {
    match bits {
        2 => StopBits::Two,
        _ => StopBits::One,
    }
}

pub(crate) fn flow_control(flow: &str) -> FlowControl {
    match flow {
        "software" => FlowControl::Software,
        "hardware" => FlowControl::Hardware,
        _ => FlowControl::None,
    }
}

async fn run(
    config: SerialSinkConfig,
    port: SerialStream,
    mut rx: broadcast::Receiver<Sentence>,
    counters: Arc<SinkCounters>,
) {
    let send_interval = Duration::from_millis(config.send_interval_ms);
    let mut port = Some(port);
    let mut last_write: Option<Instant> = None;
    loop {
        match rx.recv().await {
            Ok(sentence) => {
                if !send_interval.is_zero() {
                    if let Some(at) = last_write {
                        let elapsed = at.elapsed();
                        if elapsed < send_interval {
                            tokio::time::sleep(send_interval - elapsed).await;
                        }
                    }
                }
                loop {
                    match &mut port {
                        Some(stream) => match stream.write_all(sentence.as_bytes()).await {
                            Ok(()) => {
                                counters.add_written();
                                break;
                            }
                            Err(e) => {
                                warn!("Serial write to {} failed: {}", config.device, e);
                                counters.add_write_error();
                                port = None;
                            }
                        },
                        None => match reconnect(&config).await {
                            Some(stream) => port = Some(stream),
                            None => return,
                        },
                    }
                }
                last_write = Some(Instant::now());
            }
            Err(broadcast::error::RecvError::Lagged(n)) => counters.add_dropped(n),
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Reopen the device after `reconnect_delay`, up to `max_reconnect_attempts` times. A
/// negative limit retries indefinitely. Returns `None` when the attempts are exhausted,
/// which shuts the sink down.
async fn reconnect(config: &SerialSinkConfig) -> Option<SerialStream> {
    let mut attempt: i64 = 0;
    loop {
        tokio::time::sleep(Duration::from_secs_f64(config.reconnect_delay_secs)).await;
        attempt += 1;
        match open(config) {
            Ok(stream) => {
                info!("Serial port {} reconnected", config.device);
                return Some(stream);
            }
            Err(e) => {
                warn!(
                    "Serial reconnect attempt {} to {} failed: {}",
                    attempt, config.device, e
                );
                if config.max_reconnect_attempts >= 0
                    && attempt >= config.max_reconnect_attempts as i64
                {
                    error!(
                        "Giving up on serial port {} after {} attempts",
                        config.device, attempt
                    );
                    return None;
                }
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::SentenceBus;
    use super::*;

    #[test]
    fn test_port_option_mapping() {
        assert_eq!(data_bits(7), DataBits::Seven);
        assert_eq!(data_bits(8), DataBits::Eight);
        assert_eq!(parity("odd"), Parity::Odd);
        assert_eq!(parity("none"), Parity::None);
        assert_eq!(stop_bits(2), StopBits::Two);
        assert_eq!(stop_bits(1), StopBits::One);
        assert_eq!(flow_control("hardware"), FlowControl::Hardware);
        assert_eq!(flow_control("none"), FlowControl::None);
    }

    #[tokio::test]
    async fn test_start_fails_on_missing_device() {
        let config = SerialSinkConfig {
            device: "/dev/nonexistent-nmea-port".to_string(),
            baud_rate: 38400,
            data_bits: 8,
            parity: "none".to_string(),
            stop_bits: 1,
            flow_control: "none".to_string(),
            reconnect_delay_secs: 0.1,
            max_reconnect_attempts: 2,
            send_interval_ms: 0,
        };
        let bus = SentenceBus::new(4);
        let counters = Arc::new(SinkCounters::default());
        assert!(start(&config, bus.subscribe(), counters).await.is_err());
    }
}
