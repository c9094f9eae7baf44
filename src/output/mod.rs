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

//! Output bus and sinks. The engine publishes every produced sentence to the bus; each
//! sink task consumes its own bounded queue and owns its I/O resource exclusively.

pub mod file;
pub mod serial;
pub mod tcp;
pub mod udp;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::OutputConfig;
use crate::error::SinkError;

/// Default capacity of the sentence queues.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Sentences travel the bus as shared immutable values.
pub type Sentence = Arc<str>;

/// Fan-out point between the engine and the sinks. Publishing never blocks: a sink whose
/// queue is full loses its oldest entries, which the sink records in its `dropped`
/// counter.
#[derive(Clone, Debug)]
pub struct SentenceBus {
    tx: broadcast::Sender<Sentence>,
}

impl SentenceBus {
    pub fn new(capacity: usize) -> SentenceBus {
        let (tx, _) = broadcast::channel(capacity);
        SentenceBus { tx }
    }

    /// Hand a sentence to every subscribed sink. A send without subscribers is not an
    /// error; the sentence is simply discarded.
    pub fn publish(&self, sentence: String) {
        let _ = self.tx.send(Arc::from(sentence));
    }

    /// Open a new queue onto the bus. Subscribers only observe sentences published
    /// after subscription, so sinks are started before the engine.
    pub fn subscribe(&self) -> broadcast::Receiver<Sentence> {
        self.tx.subscribe()
    }
}

// -------------------------------------------------------------------------------------------------

/// Per-sink statistics. Written only by the owning sink task, read via `snapshot`.
#[derive(Debug, Default)]
pub struct SinkCounters {
    pub sentences_written: AtomicU64,
    pub sentences_dropped: AtomicU64,
    pub write_errors: AtomicU64,
    pub clients_connected: AtomicU64,
}

impl SinkCounters {
    pub(crate) fn add_written(&self) {
        self.sentences_written.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_dropped(&self, count: u64) {
        self.sentences_dropped.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn add_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SinkCountersSnapshot {
        SinkCountersSnapshot {
            sentences_written: self.sentences_written.load(Ordering::Relaxed),
            sentences_dropped: self.sentences_dropped.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            clients_connected: self.clients_connected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a sink's counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SinkCountersSnapshot {
    pub sentences_written: u64,
    pub sentences_dropped: u64,
    pub write_errors: u64,
    pub clients_connected: u64,
}

impl core::fmt::Display for SinkCountersSnapshot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} written, {} dropped, {} write errors",
            self.sentences_written, self.sentences_dropped, self.write_errors
        )
    }
}

// -------------------------------------------------------------------------------------------------

/// A started sink: its task plus the shared counters.
pub struct SinkHandle {
    pub name: String,
    pub counters: Arc<SinkCounters>,
    task: JoinHandle<()>,
}

impl SinkHandle {
    pub(crate) fn new(name: String, counters: Arc<SinkCounters>, task: JoinHandle<()>) -> SinkHandle {
        SinkHandle {
            name,
            counters,
            task,
        }
    }
}

/// All sinks of a simulation run. Startup failures (bind errors, missing devices) are
/// fatal; runtime write failures stay inside the individual sink tasks.
pub struct SinkSet {
    handles: Vec<SinkHandle>,
}

impl SinkSet {
    /// Bring up every configured sink. Each sink subscribes to the bus before this
    /// function returns, so sentences published afterwards reach all of them.
    pub async fn start(configs: &[OutputConfig], bus: &SentenceBus) -> Result<SinkSet, SinkError> {
        let mut handles = Vec::new();
        for config in configs {
            let counters = Arc::new(SinkCounters::default());
            let task = match config {
                OutputConfig::File(c) => file::start(c, bus.subscribe(), counters.clone()).await?,
                OutputConfig::Tcp(c) => tcp::start(c, bus.subscribe(), counters.clone()).await?,
                OutputConfig::Udp(c) => udp::start(c, bus.subscribe(), counters.clone()).await?,
                OutputConfig::Serial(c) => {
                    serial::start(c, bus.subscribe(), counters.clone()).await?
                }
            };
            info!("Started output {}", config.label());
            handles.push(SinkHandle::new(config.label(), counters, task));
        }
        Ok(SinkSet { handles })
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for the sinks to drain and finish. Sinks still running at the deadline are
    /// aborted; in both cases their I/O resources are released. Returns the final
    /// counter snapshots.
    pub async fn shutdown(self, deadline: Duration) -> Vec<(String, SinkCountersSnapshot)> {
        let mut snapshots = Vec::new();
        for handle in self.handles {
            let mut task = handle.task;
            if tokio::time::timeout(deadline, &mut task).await.is_err() {
                warn!("Output {} didn't drain within the deadline, aborting", handle.name);
                task.abort();
            }
            snapshots.push((handle.name, handle.counters.snapshot()));
        }
        snapshots
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_bus_fan_out_preserves_order() {
        let bus = SentenceBus::new(DEFAULT_QUEUE_CAPACITY);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        for i in 0..10 {
            bus.publish(format!("S{}", i));
        }
        for i in 0..10 {
            assert_eq!(&*rx1.recv().await.unwrap(), format!("S{}", i).as_str());
            assert_eq!(&*rx2.recv().await.unwrap(), format!("S{}", i).as_str());
        }
    }

    #[tokio::test]
    async fn test_bus_overflow_drops_oldest() {
        let bus = SentenceBus::new(4);
        let mut rx = bus.subscribe();
        for i in 0..10 {
            bus.publish(format!("S{}", i));
        }
        // The six oldest sentences are gone; the lag is reported once
        match rx.recv().await {
            Err(broadcast::error::RecvError::Lagged(n)) => assert_eq!(n, 6),
            other => panic!("Expected lag, got {:?}", other),
        }
        assert_eq!(&*rx.recv().await.unwrap(), "S6");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = SentenceBus::new(4);
        bus.publish("S1".to_string());
    }
}
