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

//! UDP sink: one datagram per sentence, unicast or broadcast

use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::{Sentence, SinkCounters};
use crate::config::UdpSinkConfig;
use crate::error::SinkError;

/// Every sentence fits one datagram by construction; anything larger is a logic error
/// upstream and is dropped with a counter rather than fragmented here.
const MAX_DATAGRAM: usize = 1024;

/// Bind the socket and spawn the sink task. A bind or socket option failure is fatal.
pub(crate) async fn start(
    config: &UdpSinkConfig,
    rx: broadcast::Receiver<Sentence>,
    counters: Arc<SinkCounters>,
) -> Result<JoinHandle<()>, SinkError> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))
        .await
        .map_err(|e| SinkError::Startup(format!("UDP socket: {}", e)))?;
    if config.broadcast {
        socket
            .set_broadcast(true)
            .map_err(|e| SinkError::Startup(format!("UDP broadcast flag: {}", e)))?;
    }
    Ok(tokio::spawn(run(config.clone(), socket, rx, counters)))
}

async fn run(
    config: UdpSinkConfig,
    socket: UdpSocket,
    mut rx: broadcast::Receiver<Sentence>,
    counters: Arc<SinkCounters>,
) {
    let target = (config.host.as_str(), config.port);
    loop {
        match rx.recv().await {
            Ok(sentence) => {
                if sentence.len() > MAX_DATAGRAM {
                    warn!("UDP sink dropping oversized sentence of {} bytes", sentence.len());
                    counters.add_write_error();
                    continue;
                }
                match socket.send_to(sentence.as_bytes(), target).await {
                    Ok(_) => counters.add_written(),
                    Err(e) => {
                        // io-transient: count and continue
                        warn!("UDP send to {}:{} failed: {}", config.host, config.port, e);
                        counters.add_write_error();
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => counters.add_dropped(n),
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

// -------------------------------------------------------------------------------------------------
