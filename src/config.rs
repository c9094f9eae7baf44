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

//! YAML configuration model and validation

use chrono::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::ais::{AisClass, Dimensions, EtaDate, NavigationStatus};
use crate::error::ConfigError;
use crate::gnss::{GnssSentenceKind, NavigationSystem};
use crate::sim::kinematics::MovementPattern;
use crate::sim::{AidToNavigation, BaseStation, Position, Vessel, VoyageData};

/// Root of the configuration document.
#[derive(Clone, Debug, Deserialize)]
pub struct SimulatorConfig {
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub vessels: Vec<VesselConfig>,

    #[serde(default)]
    pub base_stations: Vec<BaseStationConfig>,

    #[serde(default)]
    pub aids_to_navigation: Vec<AidToNavigationConfig>,

    #[serde(default)]
    pub sentences: Vec<SentenceConfig>,

    #[serde(default)]
    pub outputs: Vec<OutputConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SimulationConfig {
    /// Simulation seconds to run
    pub duration_seconds: f64,

    /// Simulation seconds advanced per wall-clock second
    #[serde(default = "default_time_factor")]
    pub time_factor: f64,

    /// UTC start of the simulation clock; wall clock when absent
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,

    /// Engine tick frequency in Hz
    #[serde(default = "default_tick_hz")]
    pub tick_hz: f64,

    /// Seed for the kinematic noise; random when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Emit optional type 19 extended Class B reports
    #[serde(default)]
    pub extended_class_b_reports: bool,

    /// AIS radio channel selection; alternates A/B per message by default
    #[serde(default)]
    pub channel: ChannelMode,
}

/// AIS radio channel selection policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum ChannelMode {
    /// Round-robin A/B per message
    #[serde(rename = "alternate")]
    Alternate,

    /// Channel A only
    #[serde(rename = "A")]
    A,

    /// Channel B only
    #[serde(rename = "B")]
    B,
}

impl Default for ChannelMode {
    fn default() -> ChannelMode {
        ChannelMode::Alternate
    }
}

fn default_time_factor() -> f64 {
    1.0
}

fn default_tick_hz() -> f64 {
    10.0
}

// -------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct VesselConfig {
    pub mmsi: u32,
    pub name: String,

    #[serde(default)]
    pub callsign: String,

    pub class: AisClass,

    #[serde(default)]
    pub ship_type: u8,

    pub position: Position,

    /// Initial speed over ground in knots
    #[serde(default)]
    pub initial_speed: f64,

    /// Initial course and heading in degrees
    #[serde(default)]
    pub initial_heading: f64,

    /// Navigation status code (Class A; 0-15)
    #[serde(default)]
    pub nav_status: u8,

    #[serde(default)]
    pub dimensions: Dimensions,

    #[serde(default)]
    pub movement: MovementPattern,

    /// Bounded speed noise window in knots per second
    #[serde(default = "default_speed_variation")]
    pub speed_variation: f64,

    /// Bounded course noise window in degrees per second
    #[serde(default = "default_course_variation")]
    pub course_variation: f64,

    #[serde(default)]
    pub voyage_data: Option<VoyageDataConfig>,
}

fn default_speed_variation() -> f64 {
    0.1
}

fn default_course_variation() -> f64 {
    1.0
}

#[derive(Clone, Debug, Deserialize)]
pub struct VoyageDataConfig {
    #[serde(default)]
    pub destination: String,

    /// Maximum static draught in meters
    #[serde(default)]
    pub draught: f64,

    #[serde(default)]
    pub eta_month: u8,

    #[serde(default)]
    pub eta_day: u8,

    #[serde(default = "default_eta_hour")]
    pub eta_hour: u8,

    #[serde(default = "default_eta_minute")]
    pub eta_minute: u8,
}

fn default_eta_hour() -> u8 {
    24
}

fn default_eta_minute() -> u8 {
    60
}

#[derive(Clone, Debug, Deserialize)]
pub struct BaseStationConfig {
    pub mmsi: u32,
    pub position: Position,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AidToNavigationConfig {
    pub mmsi: u32,
    pub name: String,
    pub position: Position,

    /// Type of aid to navigation (0-31)
    #[serde(default)]
    pub aid_type: u8,

    /// True for a virtual aid carried only in the radio picture
    #[serde(default)]
    pub virtual_aid: bool,

    #[serde(default)]
    pub dimensions: Dimensions,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SentenceConfig {
    #[serde(rename = "type")]
    pub sentence_type: GnssSentenceKind,

    #[serde(default)]
    pub talker_id: NavigationSystem,

    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_rate_hz() -> f64 {
    1.0
}

fn default_enabled() -> bool {
    true
}

// -------------------------------------------------------------------------------------------------

/// One configured output sink, discriminated by `type`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    File(FileSinkConfig),
    Tcp(TcpSinkConfig),
    Udp(UdpSinkConfig),
    Serial(SerialSinkConfig),
}

impl OutputConfig {
    /// Short human-readable label for logs and statistics.
    pub fn label(&self) -> String {
        match self {
            OutputConfig::File(c) => format!("file:{}", c.path.display()),
            OutputConfig::Tcp(c) => format!("tcp:{}:{}", c.host, c.port),
            OutputConfig::Udp(c) => format!("udp:{}:{}", c.host, c.port),
            OutputConfig::Serial(c) => format!("serial:{}", c.device),
        }
    }
}

/// Line ending written by the file sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum LineEnding {
    #[serde(rename = "crlf")]
    CrLf,

    #[serde(rename = "lf")]
    Lf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FileSinkConfig {
    pub path: PathBuf,

    #[serde(default = "default_line_ending")]
    pub line_ending: LineEnding,

    /// Rotate when the file exceeds this size; no rotation when absent
    #[serde(default)]
    pub rotation_size_mb: Option<f64>,

    /// Total files retained including the current one
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    #[serde(default = "default_auto_flush")]
    pub auto_flush: bool,
}

fn default_line_ending() -> LineEnding {
    LineEnding::CrLf
}

fn default_max_files() -> usize {
    5
}

fn default_auto_flush() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct TcpSinkConfig {
    #[serde(default = "default_host")]
    pub host: String,

    pub port: u16,

    #[serde(default = "default_max_clients")]
    pub max_clients: usize,

    /// Drop a client when no sentence has been delivered to it for this long
    #[serde(default = "default_client_timeout")]
    pub client_timeout_secs: f64,

    /// Drop a client whose single write takes longer than this
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: f64,

    /// Per-client queue capacity
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_clients() -> usize {
    16
}

fn default_client_timeout() -> f64 {
    60.0
}

fn default_send_timeout() -> f64 {
    5.0
}

fn default_queue_size() -> usize {
    crate::output::DEFAULT_QUEUE_CAPACITY
}

#[derive(Clone, Debug, Deserialize)]
pub struct UdpSinkConfig {
    pub host: String,
    pub port: u16,

    #[serde(default)]
    pub broadcast: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SerialSinkConfig {
    pub device: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_data_bits")]
    pub data_bits: u8,

    #[serde(default = "default_parity")]
    pub parity: String,

    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,

    #[serde(default = "default_parity")]
    pub flow_control: String,

    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: f64,

    /// Reconnection attempts before giving up; negative retries indefinitely
    #[serde(default = "default_reconnect_attempts")]
    pub max_reconnect_attempts: i32,

    /// Minimum gap between writes in milliseconds
    #[serde(default)]
    pub send_interval_ms: u64,
}

fn default_baud_rate() -> u32 {
    38400
}

fn default_data_bits() -> u8 {
    8
}

fn default_parity() -> String {
    "none".to_string()
}

fn default_stop_bits() -> u8 {
    1
}

fn default_reconnect_delay() -> f64 {
    5.0
}

fn default_reconnect_attempts() -> i32 {
    -1
}

// -------------------------------------------------------------------------------------------------

impl SimulatorConfig {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<SimulatorConfig, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        SimulatorConfig::from_yaml(&text)
    }

    /// Parse and validate a configuration document.
    pub fn from_yaml(text: &str) -> Result<SimulatorConfig, ConfigError> {
        let config: SimulatorConfig =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic validation; every violation is fatal at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.duration_seconds <= 0.0 {
            return Err(invalid(format!("duration_seconds: {}", sim.duration_seconds)));
        }
        if sim.time_factor <= 0.0 {
            return Err(invalid(format!("time_factor: {}", sim.time_factor)));
        }
        if sim.tick_hz <= 0.0 {
            return Err(invalid(format!("tick_hz: {}", sim.tick_hz)));
        }

        let mut mmsis: HashSet<u32> = HashSet::new();
        let mut check_unique = |mmsi: u32| -> Result<(), ConfigError> {
            if !mmsis.insert(mmsi) {
                return Err(invalid(format!("duplicate MMSI {}", mmsi)));
            }
            Ok(())
        };

        for vessel in &self.vessels {
            check_unique(vessel.mmsi)?;
            if !(100_000_000..=999_999_999).contains(&vessel.mmsi) {
                return Err(invalid(format!("vessel MMSI must have 9 digits: {}", vessel.mmsi)));
            }
            validate_position(&vessel.position, vessel.mmsi)?;
            if !(0.0..=102.2).contains(&vessel.initial_speed) {
                return Err(invalid(format!(
                    "vessel {} initial_speed: {}",
                    vessel.mmsi, vessel.initial_speed
                )));
            }
            if !(0.0..360.0).contains(&vessel.initial_heading) {
                return Err(invalid(format!(
                    "vessel {} initial_heading: {}",
                    vessel.mmsi, vessel.initial_heading
                )));
            }
            if vessel.nav_status > 15 {
                return Err(invalid(format!(
                    "vessel {} nav_status: {}",
                    vessel.mmsi, vessel.nav_status
                )));
            }
            if vessel.ship_type > 99 {
                return Err(invalid(format!(
                    "vessel {} ship_type: {}",
                    vessel.mmsi, vessel.ship_type
                )));
            }
            if vessel.name.chars().count() > 20 {
                return Err(invalid(format!("vessel {} name too long", vessel.mmsi)));
            }
            if vessel.callsign.chars().count() > 7 {
                return Err(invalid(format!("vessel {} callsign too long", vessel.mmsi)));
            }
            validate_dimensions(&vessel.dimensions, vessel.mmsi)?;
            validate_movement(&vessel.movement, vessel.mmsi)?;
            if let Some(voyage) = &vessel.voyage_data {
                if !(0.0..=25.5).contains(&voyage.draught) {
                    return Err(invalid(format!(
                        "vessel {} draught: {}",
                        vessel.mmsi, voyage.draught
                    )));
                }
                if voyage.destination.chars().count() > 20 {
                    return Err(invalid(format!("vessel {} destination too long", vessel.mmsi)));
                }
                if voyage.eta_month > 12
                    || voyage.eta_day > 31
                    || voyage.eta_hour > 24
                    || voyage.eta_minute > 60
                {
                    return Err(invalid(format!("vessel {} ETA out of range", vessel.mmsi)));
                }
            }
        }

        for station in &self.base_stations {
            check_unique(station.mmsi)?;
            if !(100_000_000..=999_999_999).contains(&station.mmsi) {
                return Err(invalid(format!(
                    "base station MMSI must have 9 digits: {}",
                    station.mmsi
                )));
            }
            validate_position(&station.position, station.mmsi)?;
        }

        for aid in &self.aids_to_navigation {
            check_unique(aid.mmsi)?;
            if !(100_000_000..=999_999_999).contains(&aid.mmsi) {
                return Err(invalid(format!("aid MMSI must have 9 digits: {}", aid.mmsi)));
            }
            validate_position(&aid.position, aid.mmsi)?;
            if aid.aid_type > 31 {
                return Err(invalid(format!("aid {} aid_type: {}", aid.mmsi, aid.aid_type)));
            }
            if aid.name.chars().count() > 34 {
                return Err(invalid(format!("aid {} name too long", aid.mmsi)));
            }
            validate_dimensions(&aid.dimensions, aid.mmsi)?;
        }

        for sentence in &self.sentences {
            if sentence.rate_hz <= 0.0 {
                return Err(invalid(format!(
                    "{} rate_hz: {}",
                    sentence.sentence_type, sentence.rate_hz
                )));
            }
        }

        for output in &self.outputs {
            match output {
                OutputConfig::File(c) => {
                    if c.max_files == 0 {
                        return Err(invalid("file sink max_files must be at least 1".to_string()));
                    }
                    if let Some(mb) = c.rotation_size_mb {
                        if mb <= 0.0 {
                            return Err(invalid(format!("file sink rotation_size_mb: {}", mb)));
                        }
                    }
                }
                OutputConfig::Tcp(c) => {
                    if c.max_clients == 0 || c.queue_size == 0 {
                        return Err(invalid(
                            "tcp sink max_clients and queue_size must be at least 1".to_string(),
                        ));
                    }
                    if c.client_timeout_secs <= 0.0 || c.send_timeout_secs <= 0.0 {
                        return Err(invalid("tcp sink timeouts must be positive".to_string()));
                    }
                }
                OutputConfig::Udp(_) => {}
                OutputConfig::Serial(c) => {
                    if !["none", "odd", "even"].contains(&c.parity.as_str()) {
                        return Err(invalid(format!("serial parity: {}", c.parity)));
                    }
                    if !["none", "software", "hardware"].contains(&c.flow_control.as_str()) {
                        return Err(invalid(format!("serial flow_control: {}", c.flow_control)));
                    }
                    if ![5, 6, 7, 8].contains(&c.data_bits) {
                        return Err(invalid(format!("serial data_bits: {}", c.data_bits)));
                    }
                    if ![1, 2].contains(&c.stop_bits) {
                        return Err(invalid(format!("serial stop_bits: {}", c.stop_bits)));
                    }
                }
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

fn validate_position(position: &Position, mmsi: u32) -> Result<(), ConfigError> {
    if !(-90.0..=90.0).contains(&position.latitude)
        || !(-180.0..=180.0).contains(&position.longitude)
    {
        return Err(invalid(format!(
            "{} position out of range: {}, {}",
            mmsi, position.latitude, position.longitude
        )));
    }
    Ok(())
}

fn validate_dimensions(dimensions: &Dimensions, mmsi: u32) -> Result<(), ConfigError> {
    if dimensions.to_bow > 511
        || dimensions.to_stern > 511
        || dimensions.to_port > 63
        || dimensions.to_starboard > 63
    {
        return Err(invalid(format!("{} dimensions out of range", mmsi)));
    }
    Ok(())
}

fn validate_movement(movement: &MovementPattern, mmsi: u32) -> Result<(), ConfigError> {
    match movement {
        MovementPattern::Linear | MovementPattern::Circular { .. } => Ok(()),
        MovementPattern::RandomWalk {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        } => {
            if min_lat >= max_lat || min_lon >= max_lon {
                return Err(invalid(format!("{} random_walk box is empty", mmsi)));
            }
            Ok(())
        }
        MovementPattern::Waypoint { waypoints, .. } => {
            if waypoints.is_empty() {
                return Err(invalid(format!("{} waypoint list is empty", mmsi)));
            }
            Ok(())
        }
    }
}

// -------------------------------------------------------------------------------------------------

impl From<&VesselConfig> for Vessel {
    fn from(config: &VesselConfig) -> Vessel {
        Vessel {
            mmsi: config.mmsi,
            name: config.name.clone(),
            call_sign: config.callsign.clone(),
            class: config.class,
            ship_type: config.ship_type,
            dimensions: config.dimensions,
            nav_status: NavigationStatus::new(config.nav_status),
            position: config.position,
            sog_knots: config.initial_speed,
            cog: config.initial_heading,
            heading_true: Some(config.initial_heading.round() as u16 % 360),
            rot: Some(0),
            movement: config.movement.clone(),
            speed_variation: config.speed_variation,
            course_variation: config.course_variation,
            voyage: config.voyage_data.as_ref().map(|voyage| VoyageData {
                destination: voyage.destination.clone(),
                draught_m: voyage.draught,
                eta: EtaDate {
                    month: voyage.eta_month,
                    day: voyage.eta_day,
                    hour: voyage.eta_hour,
                    minute: voyage.eta_minute,
                },
            }),
            turning: false,
        }
    }
}

impl From<&BaseStationConfig> for BaseStation {
    fn from(config: &BaseStationConfig) -> BaseStation {
        BaseStation {
            mmsi: config.mmsi,
            position: config.position,
        }
    }
}

impl From<&AidToNavigationConfig> for AidToNavigation {
    fn from(config: &AidToNavigationConfig) -> AidToNavigation {
        AidToNavigation {
            mmsi: config.mmsi,
            name: config.name.clone(),
            position: config.position,
            aid_type: config.aid_type,
            virtual_aid: config.virtual_aid,
            dimensions: config.dimensions,
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const FULL_CONFIG: &str = r#"
simulation:
  duration_seconds: 60
  time_factor: 10.0
  start_time: "2020-08-01T00:00:00Z"
  tick_hz: 10.0
  seed: 7
vessels:
  - mmsi: 367001234
    name: "EVER GIVEN"
    callsign: "WDL1234"
    class: A
    ship_type: 70
    position: { lat: 37.8, lon: -122.4 }
    initial_speed: 12.0
    initial_heading: 90.0
    nav_status: 0
    dimensions: { to_bow: 200, to_stern: 100, to_port: 20, to_starboard: 12 }
    movement:
      pattern: waypoint
      waypoints:
        - { lat: 37.9, lon: -122.4 }
        - { lat: 37.9, lon: -122.3 }
      tolerance_nm: 0.1
    voyage_data:
      destination: "OAKLAND"
      draught: 12.5
      eta_month: 3
      eta_day: 15
      eta_hour: 14
      eta_minute: 30
  - mmsi: 338123456
    name: "SEA BREEZE"
    class: B
    position: { lat: 37.81, lon: -122.41 }
    initial_speed: 5.5
    movement:
      pattern: random_walk
      min_lat: 37.7
      max_lat: 37.9
      min_lon: -122.5
      max_lon: -122.3
base_stations:
  - mmsi: 366970200
    position: { lat: 37.82, lon: -122.42 }
aids_to_navigation:
  - mmsi: 993692005
    name: "ALCATRAZ W"
    position: { lat: 37.826, lon: -122.425 }
    aid_type: 14
    virtual_aid: false
sentences:
  - type: GGA
    talker_id: GP
    rate_hz: 1.0
    enabled: true
  - type: RMC
    talker_id: GP
    rate_hz: 0.5
    enabled: true
outputs:
  - type: file
    path: /tmp/nmea.log
    rotation_size_mb: 10
    max_files: 2
  - type: tcp
    port: 10110
    max_clients: 4
  - type: udp
    host: 255.255.255.255
    port: 10111
    broadcast: true
  - type: serial
    device: /dev/ttyUSB0
    baud_rate: 4800
"#;

    #[test]
    fn test_parse_full_config() {
        let config = SimulatorConfig::from_yaml(FULL_CONFIG).unwrap();
        assert_eq!(config.vessels.len(), 2);
        assert_eq!(config.vessels[0].class, AisClass::ClassA);
        assert!(matches!(
            config.vessels[0].movement,
            MovementPattern::Waypoint { .. }
        ));
        assert!(config.vessels[0].voyage_data.is_some());
        assert_eq!(config.base_stations.len(), 1);
        assert_eq!(config.aids_to_navigation.len(), 1);
        assert_eq!(config.sentences.len(), 2);
        assert_eq!(config.outputs.len(), 4);
        assert_eq!(config.outputs[1].label(), "tcp:0.0.0.0:10110");
        match &config.outputs[3] {
            OutputConfig::Serial(c) => {
                assert_eq!(c.baud_rate, 4800);
                assert_eq!(c.max_reconnect_attempts, -1);
            }
            other => panic!("Expected a serial output, got {:?}", other),
        }
    }

    #[test]
    fn test_vessel_conversion() {
        let config = SimulatorConfig::from_yaml(FULL_CONFIG).unwrap();
        let vessel = Vessel::from(&config.vessels[0]);
        assert_eq!(vessel.mmsi, 367001234);
        assert_eq!(vessel.heading_true, Some(90));
        assert_eq!(vessel.voyage.as_ref().unwrap().eta.month, 3);
    }

    #[test]
    fn test_duplicate_mmsi_rejected() {
        let yaml = r#"
simulation: { duration_seconds: 60 }
vessels:
  - { mmsi: 367001234, name: "A", class: A, position: { lat: 0.0, lon: 0.0 } }
  - { mmsi: 367001234, name: "B", class: B, position: { lat: 1.0, lon: 1.0 } }
"#;
        assert!(matches!(
            SimulatorConfig::from_yaml(yaml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_short_mmsi_rejected() {
        let yaml = r#"
simulation: { duration_seconds: 60 }
vessels:
  - { mmsi: 12345, name: "A", class: A, position: { lat: 0.0, lon: 0.0 } }
"#;
        assert!(SimulatorConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_short_base_station_mmsi_rejected() {
        let yaml = r#"
simulation: { duration_seconds: 60 }
base_stations:
  - { mmsi: 3669702, position: { lat: 0.0, lon: 0.0 } }
"#;
        assert!(SimulatorConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_short_aid_mmsi_rejected() {
        let yaml = r#"
simulation: { duration_seconds: 60 }
aids_to_navigation:
  - { mmsi: 99369, name: "A", position: { lat: 0.0, lon: 0.0 } }
"#;
        assert!(SimulatorConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_bad_heading_rejected() {
        let yaml = r#"
simulation: { duration_seconds: 60 }
vessels:
  - mmsi: 367001234
    name: "A"
    class: A
    position: { lat: 0.0, lon: 0.0 }
    initial_heading: 360.0
"#;
        assert!(SimulatorConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_bad_speed_rejected() {
        let yaml = r#"
simulation: { duration_seconds: 60 }
vessels:
  - mmsi: 367001234
    name: "A"
    class: A
    position: { lat: 0.0, lon: 0.0 }
    initial_speed: 150.0
"#;
        assert!(SimulatorConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_empty_waypoints_rejected() {
        let yaml = r#"
simulation: { duration_seconds: 60 }
vessels:
  - mmsi: 367001234
    name: "A"
    class: A
    position: { lat: 0.0, lon: 0.0 }
    movement: { pattern: waypoint, waypoints: [] }
"#;
        assert!(SimulatorConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_defaults() {
        let yaml = r#"
simulation: { duration_seconds: 60 }
"#;
        let config = SimulatorConfig::from_yaml(yaml).unwrap();
        assert::close(config.simulation.time_factor, 1.0, 1e-9);
        assert::close(config.simulation.tick_hz, 10.0, 1e-9);
        assert!(config.simulation.start_time.is_none());
        assert!(config.vessels.is_empty());
        assert!(config.outputs.is_empty());
    }
}
