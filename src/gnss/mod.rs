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

//! GNSS sentence records and formatters

pub mod gga;
pub mod rmc;

use serde::Deserialize;

use crate::error::ParseError;

pub use gga::{GgaData, GgaQualityIndicator};
pub use rmc::RmcData;

// -------------------------------------------------------------------------------------------------

/// Satellite navigation system identified by the sentence talker ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum NavigationSystem {
    /// Combination of several satellite systems (GN)
    #[serde(rename = "GN")]
    Combination,

    /// GPS (GP)
    #[serde(rename = "GP")]
    Gps,

    /// GLONASS (GL)
    #[serde(rename = "GL")]
    Glonass,

    /// Galileo (GA)
    #[serde(rename = "GA")]
    Galileo,

    /// BeiDou (BD)
    #[serde(rename = "BD")]
    Beidou,

    /// NavIC (GI)
    #[serde(rename = "GI")]
    Navic,

    /// QZSS (QZ)
    #[serde(rename = "QZ")]
    Qzss,
}

impl NavigationSystem {
    /// The two-letter talker ID of the system.
    pub fn talker_id(&self) -> &'static str {
        match self {
            NavigationSystem::Combination => "GN",
            NavigationSystem::Gps => "GP",
            NavigationSystem::Glonass => "GL",
            NavigationSystem::Galileo => "GA",
            NavigationSystem::Beidou => "BD",
            NavigationSystem::Navic => "GI",
            NavigationSystem::Qzss => "QZ",
        }
    }

    /// Identify a system from a talker ID.
    pub fn from_talker_id(talker_id: &str) -> Result<NavigationSystem, ParseError> {
        match talker_id {
            "GN" => Ok(NavigationSystem::Combination),
            "GP" => Ok(NavigationSystem::Gps),
            "GL" => Ok(NavigationSystem::Glonass),
            "GA" => Ok(NavigationSystem::Galileo),
            "BD" => Ok(NavigationSystem::Beidou),
            "GI" => Ok(NavigationSystem::Navic),
            "QZ" => Ok(NavigationSystem::Qzss),
            _ => Err(ParseError::UnsupportedSentenceType(format!(
                "Unsupported talker ID: {}",
                talker_id
            ))),
        }
    }
}

impl Default for NavigationSystem {
    fn default() -> NavigationSystem {
        NavigationSystem::Gps
    }
}

impl core::fmt::Display for NavigationSystem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NavigationSystem::Combination => write!(f, "combination"),
            NavigationSystem::Gps => write!(f, "GPS"),
            NavigationSystem::Glonass => write!(f, "GLONASS"),
            NavigationSystem::Galileo => write!(f, "Galileo"),
            NavigationSystem::Beidou => write!(f, "BeiDou"),
            NavigationSystem::Navic => write!(f, "NavIC"),
            NavigationSystem::Qzss => write!(f, "QZSS"),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// GNSS sentence kinds the simulator can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum GnssSentenceKind {
    #[serde(rename = "GGA")]
    Gga,

    #[serde(rename = "RMC")]
    Rmc,
}

impl core::fmt::Display for GnssSentenceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GnssSentenceKind::Gga => write!(f, "GGA"),
            GnssSentenceKind::Rmc => write!(f, "RMC"),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Pick a number field from a comma-separated sentence or `None` in case of an empty
/// field. The error carries the field index.
pub(crate) fn pick_number_field<T: core::str::FromStr>(
    split: &[&str],
    num: usize,
) -> Result<Option<T>, ParseError> {
    split
        .get(num)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| ParseError::InvalidField(num, format!("failed to parse: {}", s)))
        })
        .transpose()
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_talker_id_round_trip() {
        for system in [
            NavigationSystem::Combination,
            NavigationSystem::Gps,
            NavigationSystem::Glonass,
            NavigationSystem::Galileo,
            NavigationSystem::Beidou,
            NavigationSystem::Navic,
            NavigationSystem::Qzss,
        ] {
            assert_eq!(
                NavigationSystem::from_talker_id(system.talker_id()).unwrap(),
                system
            );
        }
        assert!(NavigationSystem::from_talker_id("XX").is_err());
    }

    #[test]
    fn test_pick_number_field() {
        let s: Vec<&str> = "128,0,8.0,,xyz".split(',').collect();
        assert_eq!(pick_number_field::<u8>(&s, 0).unwrap(), Some(128));
        assert_eq!(pick_number_field::<f64>(&s, 2).unwrap(), Some(8.0));
        assert_eq!(pick_number_field::<u16>(&s, 3).unwrap(), None);
        assert_eq!(
            pick_number_field::<u32>(&s, 4),
            Err(ParseError::InvalidField(4, "failed to parse: xyz".into()))
        );
        assert_eq!(pick_number_field::<u32>(&s, 5).unwrap(), None);
    }
}
