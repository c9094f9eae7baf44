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

//! Simulated entities and the simulation engine

pub mod engine;
pub mod kinematics;
pub mod scheduler;

use chrono::prelude::*;
use rand::Rng;
use serde::Deserialize;

use crate::ais::{
    AidToNavigationReport, AisClass, AisMessage, BaseStationReport, Dimensions, EtaDate,
    ExtendedClassBReport, NavigationStatus, PositionReport, StandardClassBReport,
    StaticAndVoyageData, StaticDataReportA, StaticDataReportB,
};
use crate::gnss::{GgaData, GgaQualityIndicator, NavigationSystem, RmcData};
use kinematics::MovementPattern;

pub use engine::{EngineState, EngineStats, SimulationEngine};
pub use scheduler::AisScheduler;

/// Position fix type reported by the simulated GPS receivers (1 = GPS).
const POSITION_FIX_GPS: u8 = 1;

// -------------------------------------------------------------------------------------------------

/// Geographical position in signed decimal degrees (WGS-84).
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Position {
    #[serde(rename = "lat")]
    pub latitude: f64,

    #[serde(rename = "lon")]
    pub longitude: f64,
}

// -------------------------------------------------------------------------------------------------

/// Voyage related data broadcast in type 5 messages.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoyageData {
    /// Destination (up to 20 characters)
    pub destination: String,

    /// Maximum present static draught in meters
    pub draught_m: f64,

    /// Estimated time of arrival
    pub eta: EtaDate,
}

/// One simulated vessel. Mutated only by the engine tick; every emission works from a
/// snapshot taken by the message builder methods below.
#[derive(Clone, Debug)]
pub struct Vessel {
    pub mmsi: u32,
    pub name: String,
    pub call_sign: String,
    pub class: AisClass,
    pub ship_type: u8,
    pub dimensions: Dimensions,
    pub nav_status: NavigationStatus,
    pub position: Position,
    pub sog_knots: f64,
    pub cog: f64,
    pub heading_true: Option<u16>,
    pub rot: Option<i8>,
    pub movement: MovementPattern,
    pub speed_variation: f64,
    pub course_variation: f64,
    pub voyage: Option<VoyageData>,

    /// True while the movement pattern is actively changing course; tightens the
    /// Class A dynamic reporting interval in the 14-23 knot band.
    pub turning: bool,
}

/// Course change rate above which a vessel counts as changing course, in degrees per
/// simulation second. Kept above the default course noise window.
const TURNING_RATE_THRESHOLD: f64 = 2.0;

impl Vessel {
    /// Advance the vessel by one tick of `dt` simulation seconds.
    pub fn update<R: Rng>(&mut self, dt: f64, rng: &mut R) {
        let steered = self.movement.steer(&self.position, self.cog);
        if dt > 0.0 {
            let turn_rate = kinematics::angular_difference(steered, self.cog).abs() / dt;
            self.turning = turn_rate > TURNING_RATE_THRESHOLD;
        }
        self.sog_knots = kinematics::perturb_speed(rng, self.sog_knots, self.speed_variation, dt);
        self.cog = kinematics::perturb_course(rng, steered, self.course_variation, dt);
        self.position = kinematics::advance(&self.position, self.sog_knots, self.cog, dt);
        self.heading_true = Some(self.cog.round() as u16 % 360);
    }

    /// Dynamic report of the vessel's class: type 1 for Class A, type 18 for Class B.
    pub fn dynamic_report(&self, now: &DateTime<Utc>) -> AisMessage {
        match self.class {
            AisClass::ClassA => AisMessage::PositionReport(PositionReport {
                message_type: 1,
                repeat: 0,
                mmsi: self.mmsi,
                nav_status: self.nav_status,
                rot: self.rot,
                sog_knots: Some(self.sog_knots),
                high_position_accuracy: true,
                longitude: Some(self.position.longitude),
                latitude: Some(self.position.latitude),
                cog: Some(self.cog),
                heading_true: self.heading_true,
                timestamp_seconds: now.second() as u8,
                special_manoeuvre: 0,
                raim_flag: false,
                radio_status: 0,
            }),
            AisClass::ClassB => AisMessage::StandardClassBReport(StandardClassBReport {
                repeat: 0,
                mmsi: self.mmsi,
                sog_knots: Some(self.sog_knots),
                high_position_accuracy: true,
                longitude: Some(self.position.longitude),
                latitude: Some(self.position.latitude),
                cog: Some(self.cog),
                heading_true: self.heading_true,
                timestamp_seconds: now.second() as u8,
                ..Default::default()
            }),
        }
    }

    /// Type 19 extended Class B report.
    pub fn extended_report(&self, now: &DateTime<Utc>) -> AisMessage {
        AisMessage::ExtendedClassBReport(ExtendedClassBReport {
            repeat: 0,
            mmsi: self.mmsi,
            sog_knots: Some(self.sog_knots),
            high_position_accuracy: true,
            longitude: Some(self.position.longitude),
            latitude: Some(self.position.latitude),
            cog: Some(self.cog),
            heading_true: self.heading_true,
            timestamp_seconds: now.second() as u8,
            regional: 0,
            name: self.name.clone(),
            ship_type: self.ship_type,
            dimensions: self.dimensions,
            position_fix_type: POSITION_FIX_GPS,
            raim_flag: false,
            dte: true,
            assigned: false,
        })
    }

    /// Static reports of the vessel's class: one type 5 for Class A, type 24 parts A and
    /// B for Class B.
    pub fn static_reports(&self) -> Vec<AisMessage> {
        match self.class {
            AisClass::ClassA => {
                let voyage = self.voyage.clone().unwrap_or_default();
                vec![AisMessage::StaticAndVoyageData(StaticAndVoyageData {
                    repeat: 0,
                    mmsi: self.mmsi,
                    ais_version: 0,
                    imo_number: None,
                    call_sign: self.call_sign.clone(),
                    name: self.name.clone(),
                    ship_type: self.ship_type,
                    dimensions: self.dimensions,
                    position_fix_type: POSITION_FIX_GPS,
                    eta: voyage.eta,
                    draught_m: voyage.draught_m,
                    destination: voyage.destination,
                    dte: true,
                })]
            }
            AisClass::ClassB => vec![
                AisMessage::StaticDataReportA(StaticDataReportA {
                    repeat: 0,
                    mmsi: self.mmsi,
                    name: self.name.clone(),
                }),
                AisMessage::StaticDataReportB(StaticDataReportB {
                    repeat: 0,
                    mmsi: self.mmsi,
                    ship_type: self.ship_type,
                    vendor_id: String::new(),
                    call_sign: self.call_sign.clone(),
                    dimensions: self.dimensions,
                    mothership_mmsi: None,
                }),
            ],
        }
    }

    /// GGA snapshot for the vessel's GPS receiver.
    pub fn gga(&self, source: NavigationSystem, now: &DateTime<Utc>) -> GgaData {
        GgaData {
            source,
            timestamp: Some(*now),
            latitude: Some(self.position.latitude),
            longitude: Some(self.position.longitude),
            quality: GgaQualityIndicator::GpsFix,
            satellite_count: Some(8),
            hdop: Some(1.2),
            altitude: Some(0.0),
            geoid_separation: Some(19.6),
            age_of_dgps: None,
            ref_station_id: None,
        }
    }

    /// RMC snapshot for the vessel's GPS receiver.
    pub fn rmc(&self, source: NavigationSystem, now: &DateTime<Utc>) -> RmcData {
        RmcData {
            source,
            timestamp: Some(*now),
            status_active: Some(true),
            latitude: Some(self.position.latitude),
            longitude: Some(self.position.longitude),
            sog_knots: Some(self.sog_knots),
            bearing: Some(self.cog),
            variation: None,
            mode: Some('A'),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// One simulated base station, reporting its position and UTC with type 4 messages.
#[derive(Clone, Debug)]
pub struct BaseStation {
    pub mmsi: u32,
    pub position: Position,
}

impl BaseStation {
    pub fn report(&self, now: &DateTime<Utc>) -> AisMessage {
        AisMessage::BaseStationReport(BaseStationReport {
            repeat: 0,
            mmsi: self.mmsi,
            timestamp: Some(*now),
            high_position_accuracy: true,
            longitude: Some(self.position.longitude),
            latitude: Some(self.position.latitude),
            position_fix_type: 7,
            raim_flag: false,
            radio_status: 0,
        })
    }
}

// -------------------------------------------------------------------------------------------------

/// One simulated aid to navigation, reporting with type 21 messages.
#[derive(Clone, Debug)]
pub struct AidToNavigation {
    pub mmsi: u32,
    pub name: String,
    pub position: Position,
    pub aid_type: u8,
    pub virtual_aid: bool,
    pub dimensions: Dimensions,
}

impl AidToNavigation {
    pub fn report(&self, now: &DateTime<Utc>) -> AisMessage {
        AisMessage::AidToNavigationReport(AidToNavigationReport {
            repeat: 0,
            mmsi: self.mmsi,
            aid_type: self.aid_type,
            name: self.name.clone(),
            high_position_accuracy: true,
            longitude: Some(self.position.longitude),
            latitude: Some(self.position.latitude),
            dimensions: self.dimensions,
            position_fix_type: 7,
            timestamp_seconds: now.second() as u8,
            off_position: false,
            regional: 0,
            raim_flag: false,
            virtual_aid: self.virtual_aid,
            assigned: false,
        })
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_vessel() -> Vessel {
        Vessel {
            mmsi: 367001234,
            name: "TEST VESSEL".into(),
            call_sign: "WDL1234".into(),
            class: AisClass::ClassA,
            ship_type: 70,
            dimensions: Dimensions::default(),
            nav_status: NavigationStatus::UnderWayUsingEngine,
            position: Position {
                latitude: 37.8,
                longitude: -122.4,
            },
            sog_knots: 10.0,
            cog: 90.0,
            heading_true: Some(90),
            rot: Some(0),
            movement: MovementPattern::Linear,
            speed_variation: 0.0,
            course_variation: 0.0,
            voyage: None,
            turning: false,
        }
    }

    #[test]
    fn test_update_moves_vessel() {
        let mut vessel = test_vessel();
        let mut rng = StdRng::seed_from_u64(1);
        let before = vessel.position;
        vessel.update(0.1, &mut rng);
        let moved = kinematics::distance_nm(&before, &vessel.position);
        assert!(moved > 0.0);
        assert!(moved <= 10.0 * 0.1 / 3600.0 + 1e-9);
    }

    #[test]
    fn test_dynamic_report_class_a() {
        let vessel = test_vessel();
        let now = Utc.with_ymd_and_hms(2020, 8, 1, 0, 0, 30).single().unwrap();
        match vessel.dynamic_report(&now) {
            AisMessage::PositionReport(report) => {
                assert_eq!(report.mmsi, 367001234);
                assert_eq!(report.sog_knots, Some(10.0));
                assert_eq!(report.timestamp_seconds, 30);
            }
            other => panic!("Expected a position report, got {:?}", other),
        }
    }

    #[test]
    fn test_dynamic_report_class_b() {
        let mut vessel = test_vessel();
        vessel.class = AisClass::ClassB;
        let now = Utc.with_ymd_and_hms(2020, 8, 1, 0, 0, 30).single().unwrap();
        match vessel.dynamic_report(&now) {
            AisMessage::StandardClassBReport(report) => {
                assert_eq!(report.mmsi, 367001234);
            }
            other => panic!("Expected a Class B report, got {:?}", other),
        }
    }

    #[test]
    fn test_static_reports_by_class() {
        let mut vessel = test_vessel();
        assert_eq!(vessel.static_reports().len(), 1);
        vessel.class = AisClass::ClassB;
        let reports = vessel.static_reports();
        assert_eq!(reports.len(), 2);
        assert!(matches!(reports[0], AisMessage::StaticDataReportA(_)));
        assert!(matches!(reports[1], AisMessage::StaticDataReportB(_)));
    }

    #[test]
    fn test_all_reports_encode() {
        let mut vessel = test_vessel();
        vessel.voyage = Some(VoyageData {
            destination: "OAKLAND".into(),
            draught_m: 7.9,
            eta: EtaDate {
                month: 3,
                day: 15,
                hour: 14,
                minute: 30,
            },
        });
        let now = Utc.with_ymd_and_hms(2020, 8, 1, 0, 0, 30).single().unwrap();
        assert!(vessel.dynamic_report(&now).encode().is_ok());
        assert!(vessel.extended_report(&now).encode().is_ok());
        for report in vessel.static_reports() {
            assert!(report.encode().is_ok());
        }
    }
}
