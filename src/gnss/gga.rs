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

use chrono::prelude::*;

use super::*;
use crate::error::{EncodeError, ParseError};
use crate::nmea;

/// GGA - time, position, and fix related data
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GgaData {
    /// Navigation system
    pub source: NavigationSystem,

    /// UTC of position fix
    pub timestamp: Option<DateTime<Utc>>,

    /// Latitude in degrees
    pub latitude: Option<f64>,

    /// Longitude in degrees
    pub longitude: Option<f64>,

    /// GNSS quality indicator
    pub quality: GgaQualityIndicator,

    /// Number of satellites in use
    pub satellite_count: Option<u8>,

    /// Horizontal dilution of position
    pub hdop: Option<f64>,

    /// Altitude above mean sea level (meters)
    pub altitude: Option<f64>,

    /// Height of geoid (mean sea level) above WGS84 ellipsoid
    pub geoid_separation: Option<f64>,

    /// Age of differential GPS data record
    pub age_of_dgps: Option<f64>,

    /// Reference station ID, range 0000-4095
    pub ref_station_id: Option<u16>,
}

/// GGA GPS quality indicator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GgaQualityIndicator {
    Invalid,                // 0
    GpsFix,                 // 1
    DGpsFix,                // 2
    PpsFix,                 // 3
    RealTimeKinematic,      // 4
    RealTimeKinematicFloat, // 5
    DeadReckoning,          // 6
    ManualInputMode,        // 7
    SimulationMode,         // 8
}

impl GgaQualityIndicator {
    pub fn new(a: u8) -> GgaQualityIndicator {
        match a {
            1 => GgaQualityIndicator::GpsFix,
            2 => GgaQualityIndicator::DGpsFix,
            3 => GgaQualityIndicator::PpsFix,
            4 => GgaQualityIndicator::RealTimeKinematic,
            5 => GgaQualityIndicator::RealTimeKinematicFloat,
            6 => GgaQualityIndicator::DeadReckoning,
            7 => GgaQualityIndicator::ManualInputMode,
            8 => GgaQualityIndicator::SimulationMode,
            _ => GgaQualityIndicator::Invalid,
        }
    }

    pub fn to_value(self) -> u8 {
        match self {
            GgaQualityIndicator::Invalid => 0,
            GgaQualityIndicator::GpsFix => 1,
            GgaQualityIndicator::DGpsFix => 2,
            GgaQualityIndicator::PpsFix => 3,
            GgaQualityIndicator::RealTimeKinematic => 4,
            GgaQualityIndicator::RealTimeKinematicFloat => 5,
            GgaQualityIndicator::DeadReckoning => 6,
            GgaQualityIndicator::ManualInputMode => 7,
            GgaQualityIndicator::SimulationMode => 8,
        }
    }
}

impl Default for GgaQualityIndicator {
    fn default() -> GgaQualityIndicator {
        GgaQualityIndicator::GpsFix
    }
}

impl core::fmt::Display for GgaQualityIndicator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GgaQualityIndicator::Invalid => write!(f, "invalid"),
            GgaQualityIndicator::GpsFix => write!(f, "GPS fix"),
            GgaQualityIndicator::DGpsFix => write!(f, "DGPS fix"),
            GgaQualityIndicator::PpsFix => write!(f, "PPS fix"),
            GgaQualityIndicator::RealTimeKinematic => write!(f, "Real-Time Kinematic"),
            GgaQualityIndicator::RealTimeKinematicFloat => {
                write!(f, "Real-Time Kinematic (floating point)")
            }
            GgaQualityIndicator::DeadReckoning => write!(f, "dead reckoning"),
            GgaQualityIndicator::ManualInputMode => write!(f, "manual input mode"),
            GgaQualityIndicator::SimulationMode => write!(f, "simulation mode"),
        }
    }
}

// -------------------------------------------------------------------------------------------------

impl GgaData {
    /// Render the complete sentence including checksum and line terminator.
    pub fn format(&self) -> Result<String, EncodeError> {
        let time = self.timestamp.map(|t| nmea::format_hhmmss(&t)).unwrap_or_default();
        let (lat, ns) = match self.latitude {
            Some(v) => {
                let (field, hemisphere) = nmea::format_latitude(v)?;
                (field, hemisphere.to_string())
            }
            None => (String::new(), String::new()),
        };
        let (lon, ew) = match self.longitude {
            Some(v) => {
                let (field, hemisphere) = nmea::format_longitude(v)?;
                (field, hemisphere.to_string())
            }
            None => (String::new(), String::new()),
        };
        let body = format!(
            "${}GGA,{},{},{},{},{},{},{},{},{},M,{},M,{},{}",
            self.source.talker_id(),
            time,
            lat,
            ns,
            lon,
            ew,
            self.quality.to_value(),
            self.satellite_count
                .map(|n| format!("{:02}", n))
                .unwrap_or_default(),
            self.hdop.map(|v| format!("{:.1}", v)).unwrap_or_default(),
            self.altitude.map(|v| format!("{:.1}", v)).unwrap_or_default(),
            self.geoid_separation
                .map(|v| format!("{:.1}", v))
                .unwrap_or_default(),
            self.age_of_dgps.map(|v| format!("{:.1}", v)).unwrap_or_default(),
            self.ref_station_id
                .map(|v| format!("{:04}", v))
                .unwrap_or_default(),
        );
        Ok(nmea::finish_sentence(&body))
    }

    /// Parse and strictly validate a GGA sentence.
    pub fn parse(sentence: &str) -> Result<GgaData, ParseError> {
        let (init, body) = nmea::verify(sentence)?;
        if init != '$' {
            return Err(ParseError::InvalidSentence(format!(
                "GGA sentence must start with '$': {}",
                sentence
            )));
        }
        let split: Vec<&str> = body.split(',').collect();
        let header = split[0];
        if header.len() != 5 || &header[2..] != "GGA" {
            return Err(ParseError::UnsupportedSentenceType(format!(
                "Unsupported sentence type: {}",
                header
            )));
        }
        let source = NavigationSystem::from_talker_id(&header[..2])?;
        let now = nmea::parse_valid_utc(2000, 1, 1, 0, 0, 0, 0)?;
        Ok(GgaData {
            source,
            timestamp: {
                let field = split.get(1).unwrap_or(&"");
                if field.is_empty() {
                    None
                } else {
                    Some(
                        nmea::parse_hhmmss(field, now)
                            .map_err(|e| ParseError::InvalidField(1, e.to_string()))?,
                    )
                }
            },
            latitude: nmea::parse_latitude_ddmm(
                split.get(2).unwrap_or(&""),
                split.get(3).unwrap_or(&""),
            )
            .map_err(|e| ParseError::InvalidField(2, e))?,
            longitude: nmea::parse_longitude_dddmm(
                split.get(4).unwrap_or(&""),
                split.get(5).unwrap_or(&""),
            )
            .map_err(|e| ParseError::InvalidField(4, e))?,
            quality: GgaQualityIndicator::new(pick_number_field(&split, 6)?.unwrap_or(0)),
            satellite_count: pick_number_field(&split, 7)?,
            hdop: pick_number_field(&split, 8)?,
            altitude: pick_number_field(&split, 9)?,
            geoid_separation: pick_number_field(&split, 11)?,
            age_of_dgps: pick_number_field(&split, 13)?,
            ref_station_id: pick_number_field(&split, 14)?,
        })
    }
}

// -------------------------------------------------------------------------------------------------
