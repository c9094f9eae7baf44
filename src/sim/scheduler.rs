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

//! Report cadence timers and the ITU-R M.1371 derived AIS reporting intervals

use std::collections::HashMap;

use crate::ais::NavigationStatus;
use super::Vessel;

/// Static reports (type 5 / type 24), both classes.
pub const STATIC_INTERVAL: f64 = 360.0;

/// Optional type 19 extended Class B reports.
pub const EXTENDED_INTERVAL: f64 = 360.0;

/// Base station type 4 reports.
pub const BASE_STATION_INTERVAL: f64 = 10.0;

/// Aid-to-navigation type 21 reports.
pub const AID_TO_NAVIGATION_INTERVAL: f64 = 180.0;

/// Class A dynamic report interval in seconds, derived from speed, navigation status
/// and whether the vessel is changing course.
pub fn class_a_dynamic_interval(sog_knots: f64, nav_status: NavigationStatus, turning: bool) -> f64 {
    if nav_status.is_stationary() {
        if sog_knots <= 3.0 {
            return 180.0;
        }
        return 10.0;
    }
    if sog_knots <= 14.0 {
        10.0
    } else if sog_knots <= 23.0 {
        if turning {
            10.0 / 3.0
        } else {
            6.0
        }
    } else {
        2.0
    }
}

/// Class B dynamic report interval in seconds.
pub fn class_b_dynamic_interval(sog_knots: f64) -> f64 {
    if sog_knots < 2.0 {
        30.0
    } else {
        3.0
    }
}

// -------------------------------------------------------------------------------------------------

/// Monotonic next-due timers keyed by caller-defined keys. A timer fires on its first
/// poll and every `interval` simulation seconds after; when the caller is late by more
/// than one interval the missed instances are skipped instead of bursting.
#[derive(Clone, Debug, Default)]
pub struct CadenceTimers<K> {
    next_due: HashMap<K, f64>,
}

impl<K: Eq + std::hash::Hash + Copy> CadenceTimers<K> {
    pub fn new() -> CadenceTimers<K> {
        CadenceTimers {
            next_due: HashMap::new(),
        }
    }

    /// Poll the timer for `key`: returns true and schedules the next due time when the
    /// timer has fired.
    pub fn poll(&mut self, key: K, now: f64, interval: f64) -> bool {
        let due = self.next_due.entry(key).or_insert(now);
        if now < *due {
            return false;
        }
        *due += interval;
        if *due <= now {
            // Late by more than one interval: skip the missed instances
            *due = now + interval;
        }
        true
    }
}

// -------------------------------------------------------------------------------------------------

/// Message classes scheduled per entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportSlot {
    /// Type 1 / 18 dynamic reports
    Dynamic,

    /// Type 5 / 24 static reports
    Static,

    /// Type 19 extended Class B reports
    Extended,

    /// Type 4 base station reports
    BaseStation,

    /// Type 21 aid-to-navigation reports
    AidToNavigation,
}

/// Per-entity AIS report scheduling. Holds one next-due timestamp per (MMSI, slot) pair;
/// intervals for dynamic slots are recomputed from the vessel state at every poll.
#[derive(Clone, Debug)]
pub struct AisScheduler {
    timers: CadenceTimers<(u32, ReportSlot)>,
    extended_enabled: bool,
}

impl AisScheduler {
    pub fn new(extended_enabled: bool) -> AisScheduler {
        AisScheduler {
            timers: CadenceTimers::new(),
            extended_enabled,
        }
    }

    /// Poll the dynamic report timer of a vessel.
    pub fn vessel_dynamic_due(&mut self, vessel: &Vessel, now: f64) -> bool {
        let interval = match vessel.class {
            crate::ais::AisClass::ClassA => {
                class_a_dynamic_interval(vessel.sog_knots, vessel.nav_status, vessel.turning)
            }
            crate::ais::AisClass::ClassB => class_b_dynamic_interval(vessel.sog_knots),
        };
        self.timers
            .poll((vessel.mmsi, ReportSlot::Dynamic), now, interval)
    }

    /// Poll the static report timer of a vessel.
    pub fn vessel_static_due(&mut self, vessel: &Vessel, now: f64) -> bool {
        self.timers
            .poll((vessel.mmsi, ReportSlot::Static), now, STATIC_INTERVAL)
    }

    /// Poll the type 19 timer of a Class B vessel. Always false unless enabled.
    pub fn vessel_extended_due(&mut self, vessel: &Vessel, now: f64) -> bool {
        if !self.extended_enabled || vessel.class != crate::ais::AisClass::ClassB {
            return false;
        }
        self.timers
            .poll((vessel.mmsi, ReportSlot::Extended), now, EXTENDED_INTERVAL)
    }

    /// Poll the type 4 timer of a base station.
    pub fn base_station_due(&mut self, mmsi: u32, now: f64) -> bool {
        self.timers
            .poll((mmsi, ReportSlot::BaseStation), now, BASE_STATION_INTERVAL)
    }

    /// Poll the type 21 timer of an aid to navigation.
    pub fn aid_to_navigation_due(&mut self, mmsi: u32, now: f64) -> bool {
        self.timers.poll(
            (mmsi, ReportSlot::AidToNavigation),
            now,
            AID_TO_NAVIGATION_INTERVAL,
        )
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_class_a_intervals() {
        let underway = NavigationStatus::UnderWayUsingEngine;
        assert::close(class_a_dynamic_interval(0.0, underway, false), 10.0, 1e-9);
        assert::close(class_a_dynamic_interval(14.0, underway, false), 10.0, 1e-9);
        assert::close(class_a_dynamic_interval(14.1, underway, false), 6.0, 1e-9);
        assert::close(class_a_dynamic_interval(23.0, underway, false), 6.0, 1e-9);
        assert::close(class_a_dynamic_interval(23.1, underway, false), 2.0, 1e-9);

        // Changing course in the 14-23 knot band tightens the interval
        assert::close(class_a_dynamic_interval(20.0, underway, true), 10.0 / 3.0, 1e-9);
        assert::close(class_a_dynamic_interval(10.0, underway, true), 10.0, 1e-9);

        let anchored = NavigationStatus::AtAnchor;
        assert::close(class_a_dynamic_interval(0.5, anchored, false), 180.0, 1e-9);
        assert::close(class_a_dynamic_interval(3.5, anchored, false), 10.0, 1e-9);
        let moored = NavigationStatus::Moored;
        assert::close(class_a_dynamic_interval(0.0, moored, false), 180.0, 1e-9);
    }

    #[test]
    fn test_class_b_intervals() {
        assert::close(class_b_dynamic_interval(1.9), 30.0, 1e-9);
        assert::close(class_b_dynamic_interval(2.0), 3.0, 1e-9);
    }

    #[test]
    fn test_cadence_fires_at_interval() {
        // One simulated hour at 10 Hz, 10 s interval: one firing every 10 s
        let mut timers = CadenceTimers::new();
        let mut count = 0;
        for i in 0..36_000 {
            let now = i as f64 * 0.1;
            if timers.poll(1u32, now, 10.0) {
                count += 1;
            }
        }
        assert!((359..=361).contains(&count), "count = {}", count);
    }

    #[test]
    fn test_cadence_static_interval() {
        // One simulated hour, 360 s interval: ten firings give or take the initial one
        let mut timers = CadenceTimers::new();
        let mut count = 0;
        for i in 0..36_000 {
            let now = i as f64 * 0.1;
            if timers.poll(1u32, now, 360.0) {
                count += 1;
            }
        }
        assert!((10..=11).contains(&count), "count = {}", count);
    }

    #[test]
    fn test_cadence_skips_missed_instances() {
        let mut timers = CadenceTimers::new();
        assert!(timers.poll(1u32, 0.0, 10.0));
        // The caller went away for 35 seconds: one firing, no catch-up burst
        assert!(timers.poll(1u32, 35.0, 10.0));
        assert!(!timers.poll(1u32, 36.0, 10.0));
        assert!(!timers.poll(1u32, 44.9, 10.0));
        assert!(timers.poll(1u32, 45.0, 10.0));
    }

    #[test]
    fn test_independent_keys() {
        let mut timers = CadenceTimers::new();
        assert!(timers.poll(1u32, 0.0, 10.0));
        assert!(timers.poll(2u32, 0.0, 30.0));
        assert!(timers.poll(1u32, 10.0, 10.0));
        assert!(!timers.poll(2u32, 10.0, 30.0));
    }
}
