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

//! TCP server sink: accepts clients and feeds each through its own bounded queue

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::{Sentence, SinkCounters};
use crate::config::TcpSinkConfig;
use crate::error::SinkError;

/// Bind the listener and spawn the sink task. A bind failure is fatal.
pub(crate) async fn start(
    config: &TcpSinkConfig,
    rx: broadcast::Receiver<Sentence>,
    counters: Arc<SinkCounters>,
) -> Result<JoinHandle<()>, SinkError> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| SinkError::Startup(format!("{}:{}: {}", config.host, config.port, e)))?;
    Ok(tokio::spawn(run(config.clone(), listener, rx, counters)))
}

/// Accepts clients and fans incoming sentences out to the per-client queues. Each client
/// queue is a bounded ring: a slow client loses its oldest entries rather than slowing
/// anybody else down.
pub(crate) async fn run(
    config: TcpSinkConfig,
    listener: TcpListener,
    mut rx: broadcast::Receiver<Sentence>,
    counters: Arc<SinkCounters>,
) {
    let mut clients: Vec<broadcast::Sender<Sentence>> = Vec::new();
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        clients.retain(|tx| tx.receiver_count() > 0);
                        if clients.len() >= config.max_clients {
                            warn!("Refusing TCP client {}: {} clients connected", peer, clients.len());
                            continue;
                        }
                        info!("TCP client connected: {}", peer);
                        let (tx, client_rx) = broadcast::channel(config.queue_size);
                        tokio::spawn(serve_client(
                            stream,
                            peer,
                            client_rx,
                            counters.clone(),
                            Duration::from_secs_f64(config.client_timeout_secs),
                            Duration::from_secs_f64(config.send_timeout_secs),
                        ));
                        counters.clients_connected.fetch_add(1, Ordering::Relaxed);
                        clients.push(tx);
                    }
                    Err(e) => {
                        warn!("TCP accept failed: {}", e);
                    }
                }
            }
            received = rx.recv() => {
                match received {
                    Ok(sentence) => {
                        clients.retain(|tx| tx.receiver_count() > 0);
                        for tx in &clients {
                            let _ = tx.send(sentence.clone());
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => counters.add_dropped(n),
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
    // Dropping the client senders lets the writer tasks drain their queues and close.
}

/// Sole owner of one client connection. The client is dropped when a write exceeds the
/// send timeout, when the write fails, or when no sentence arrives within the idle
/// timeout.
async fn serve_client(
    mut stream: TcpStream,
    peer: SocketAddr,
    mut rx: broadcast::Receiver<Sentence>,
    counters: Arc<SinkCounters>,
    client_timeout: Duration,
    send_timeout: Duration,
) {
    loop {
        tokio::select! {
            received = rx.recv() => {
                match received {
                    Ok(sentence) => {
                        match tokio::time::timeout(send_timeout, stream.write_all(sentence.as_bytes())).await {
                            Ok(Ok(())) => counters.add_written(),
                            Ok(Err(e)) => {
                                info!("Dropping TCP client {}: {}", peer, e);
                                counters.add_write_error();
                                break;
                            }
                            Err(_) => {
                                info!("Dropping TCP client {}: send timeout", peer);
                                counters.add_write_error();
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => counters.add_dropped(n),
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = tokio::time::sleep(client_timeout) => {
                info!("Dropping TCP client {}: idle timeout", peer);
                break;
            }
        }
    }
    let _ = stream.shutdown().await;
}

// -------------------------------------------------------------------------------------------------
