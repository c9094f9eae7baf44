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

//! The time-driven simulation engine

use chrono::prelude::*;
use chrono::Duration as ChronoDuration;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::scheduler::{AisScheduler, CadenceTimers};
use super::{AidToNavigation, BaseStation, Vessel};
use crate::ais::{AisMessage, Fragmenter};
use crate::config::{ChannelMode, SimulatorConfig};
use crate::gnss::{GnssSentenceKind, NavigationSystem};
use crate::nmea::AivdmSentence;
use crate::output::SentenceBus;

/// Engine lifecycle states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Created,
    Running,
    Stopping,
    Stopped,
}

/// Statistics counters, written only by the engine task and read via snapshots.
#[derive(Clone, Debug, Default)]
pub struct EngineStats {
    /// Ticks executed
    pub ticks: u64,

    /// Sentences handed to the output bus
    pub sentences: u64,

    /// AIS messages encoded
    pub ais_messages: u64,

    /// GNSS sentences formatted
    pub gnss_sentences: u64,

    /// Emissions skipped because of encoder range failures
    pub encode_errors: u64,
}

impl core::fmt::Display for EngineStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} ticks, {} sentences ({} AIS messages, {} GNSS sentences), {} encode errors",
            self.ticks, self.sentences, self.ais_messages, self.gnss_sentences, self.encode_errors
        )
    }
}

/// One enabled GNSS sentence cadence.
#[derive(Clone, Debug)]
struct GnssCadence {
    kind: GnssSentenceKind,
    source: NavigationSystem,
    interval: f64,
}

/// The simulation engine: sole owner of vessel state, the simulation clock, the
/// scheduler and the statistics counters. Everything else observes snapshots.
pub struct SimulationEngine {
    vessels: Vec<Vessel>,
    base_stations: Vec<BaseStation>,
    aids_to_navigation: Vec<AidToNavigation>,
    gnss_cadences: Vec<GnssCadence>,
    scheduler: AisScheduler,
    gnss_timers: CadenceTimers<(u32, GnssSentenceKind)>,
    fragmenter: Fragmenter,
    start_time: DateTime<Utc>,
    sim_elapsed: f64,
    duration: f64,
    time_factor: f64,
    tick_hz: f64,
    channel_mode: ChannelMode,
    next_channel: char,
    rng: StdRng,
    state: EngineState,
    stats: EngineStats,
}

impl SimulationEngine {
    /// Build an engine from a validated configuration.
    pub fn new(config: &SimulatorConfig) -> SimulationEngine {
        let rng = match config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let gnss_cadences = config
            .sentences
            .iter()
            .filter(|s| s.enabled)
            .map(|s| GnssCadence {
                kind: s.sentence_type,
                source: s.talker_id,
                interval: 1.0 / s.rate_hz,
            })
            .collect();
        SimulationEngine {
            vessels: config.vessels.iter().map(Vessel::from).collect(),
            base_stations: config.base_stations.iter().map(BaseStation::from).collect(),
            aids_to_navigation: config
                .aids_to_navigation
                .iter()
                .map(AidToNavigation::from)
                .collect(),
            gnss_cadences,
            scheduler: AisScheduler::new(config.simulation.extended_class_b_reports),
            gnss_timers: CadenceTimers::new(),
            fragmenter: Fragmenter::new(),
            start_time: config.simulation.start_time.unwrap_or_else(Utc::now),
            sim_elapsed: 0.0,
            duration: config.simulation.duration_seconds,
            time_factor: config.simulation.time_factor,
            tick_hz: config.simulation.tick_hz,
            channel_mode: config.simulation.channel,
            next_channel: 'A',
            rng,
            state: EngineState::Created,
            stats: EngineStats::default(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Snapshot of the statistics counters.
    pub fn stats(&self) -> EngineStats {
        self.stats.clone()
    }

    /// Simulation seconds elapsed.
    pub fn sim_elapsed(&self) -> f64 {
        self.sim_elapsed
    }

    /// Execute one tick: advance the clock and the fleet, and return the produced
    /// sentences in emission order. Fragments of one AIS message are contiguous.
    pub fn tick(&mut self) -> Vec<String> {
        let dt = self.time_factor / self.tick_hz;
        self.sim_elapsed += dt;
        let now_s = self.sim_elapsed;
        let now = self.start_time + ChronoDuration::milliseconds((now_s * 1000.0) as i64);
        let mut sentences = Vec::new();

        for vessel in &mut self.vessels {
            vessel.update(dt, &mut self.rng);
        }

        // GNSS sentences at their configured rates
        for cadence in &self.gnss_cadences {
            for vessel in &self.vessels {
                if !self
                    .gnss_timers
                    .poll((vessel.mmsi, cadence.kind), now_s, cadence.interval)
                {
                    continue;
                }
                let formatted = match cadence.kind {
                    GnssSentenceKind::Gga => vessel.gga(cadence.source, &now).format(),
                    GnssSentenceKind::Rmc => vessel.rmc(cadence.source, &now).format(),
                };
                match formatted {
                    Ok(sentence) => {
                        self.stats.gnss_sentences += 1;
                        sentences.push(sentence);
                    }
                    Err(e) => {
                        warn!("Skipping {} for {}: {}", cadence.kind, vessel.mmsi, e);
                        self.stats.encode_errors += 1;
                    }
                }
            }
        }

        // Due AIS messages
        let mut messages: Vec<AisMessage> = Vec::new();
        for vessel in &self.vessels {
            if self.scheduler.vessel_dynamic_due(vessel, now_s) {
                messages.push(vessel.dynamic_report(&now));
            }
            if self.scheduler.vessel_extended_due(vessel, now_s) {
                messages.push(vessel.extended_report(&now));
            }
            if self.scheduler.vessel_static_due(vessel, now_s) {
                messages.extend(vessel.static_reports());
            }
        }
        for station in &self.base_stations {
            if self.scheduler.base_station_due(station.mmsi, now_s) {
                messages.push(station.report(&now));
            }
        }
        for aid in &self.aids_to_navigation {
            if self.scheduler.aid_to_navigation_due(aid.mmsi, now_s) {
                messages.push(aid.report(&now));
            }
        }

        for message in messages {
            match message.encode() {
                Ok(bits) => {
                    let channel = self.alternate_channel();
                    for fragment in self.fragmenter.fragment(&bits, channel) {
                        sentences.push(AivdmSentence::from(fragment).format());
                    }
                    self.stats.ais_messages += 1;
                }
                Err(e) => {
                    warn!(
                        "Skipping AIS type {} message: {}",
                        message.message_type(),
                        e
                    );
                    self.stats.encode_errors += 1;
                }
            }
        }

        self.stats.ticks += 1;
        self.stats.sentences += sentences.len() as u64;
        sentences
    }

    /// Pick the radio channel for the next message: round-robin A/B unless a fixed
    /// channel is configured.
    fn alternate_channel(&mut self) -> char {
        match self.channel_mode {
            ChannelMode::A => 'A',
            ChannelMode::B => 'B',
            ChannelMode::Alternate => {
                let channel = self.next_channel;
                self.next_channel = if channel == 'A' { 'B' } else { 'A' };
                channel
            }
        }
    }

    /// Run the tick loop at the configured base frequency until the configured duration
    /// elapses or shutdown is signalled. Transitions are idempotent: a second call on a
    /// stopped engine returns immediately.
    pub async fn run(&mut self, bus: &SentenceBus, mut shutdown: watch::Receiver<bool>) {
        if self.state != EngineState::Created {
            return;
        }
        self.state = EngineState::Running;
        info!(
            "Engine running: {} vessels, {} base stations, {} aids to navigation",
            self.vessels.len(),
            self.base_stations.len(),
            self.aids_to_navigation.len()
        );
        let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / self.tick_hz));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        while self.state == EngineState::Running {
            tokio::select! {
                _ = ticker.tick() => {
                    for sentence in self.tick() {
                        bus.publish(sentence);
                    }
                    if self.sim_elapsed >= self.duration {
                        self.state = EngineState::Stopping;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.state = EngineState::Stopping;
                    }
                }
            }
        }
        self.state = EngineState::Stopped;
        info!("Engine stopped after {:.1} simulation seconds: {}", self.sim_elapsed, self.stats);
    }
}

// -------------------------------------------------------------------------------------------------
