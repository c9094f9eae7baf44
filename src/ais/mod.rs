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

//! AIS message records, encoders and decoders

pub mod bits;
pub mod fragment;
pub(crate) mod vdm_t18;
pub(crate) mod vdm_t19;
pub(crate) mod vdm_t1t2t3;
pub(crate) mod vdm_t21;
pub(crate) mod vdm_t24;
pub(crate) mod vdm_t4;
pub(crate) mod vdm_t5;

use bitvec::prelude::*;
use serde::Deserialize;

use crate::error::{EncodeError, ParseError};
use bits::pick_u64;

pub use fragment::Fragmenter;
pub use vdm_t18::StandardClassBReport;
pub use vdm_t19::ExtendedClassBReport;
pub use vdm_t1t2t3::PositionReport;
pub use vdm_t21::AidToNavigationReport;
pub use vdm_t24::{StaticDataReportA, StaticDataReportB};
pub use vdm_t4::BaseStationReport;
pub use vdm_t5::StaticAndVoyageData;

// -------------------------------------------------------------------------------------------------

/// AIS class which is either Class A or Class B
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum AisClass {
    /// AIS class A.
    #[serde(rename = "A")]
    ClassA, // Message types 1, 2, 3, 5

    /// AIS class B.
    #[serde(rename = "B")]
    ClassB, // Message types 18, 19, 24
}

impl core::fmt::Display for AisClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AisClass::ClassA => write!(f, "Class A"),
            AisClass::ClassB => write!(f, "Class B"),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Navigation status of a Class A vessel (4 bits)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationStatus {
    UnderWayUsingEngine = 0,
    AtAnchor = 1,
    NotUnderCommand = 2,
    RestrictedManoeuverability = 3,
    ConstrainedByDraught = 4,
    Moored = 5,
    Aground = 6,
    EngagedInFishing = 7,
    UnderWaySailing = 8,
    Reserved9 = 9,
    Reserved10 = 10,
    Reserved11 = 11,
    Reserved12 = 12,
    Reserved13 = 13,
    AisSartIsActive = 14,
    NotDefined = 15,
}

impl NavigationStatus {
    pub fn new(nav_status: u8) -> NavigationStatus {
        match nav_status {
            0 => NavigationStatus::UnderWayUsingEngine,
            1 => NavigationStatus::AtAnchor,
            2 => NavigationStatus::NotUnderCommand,
            3 => NavigationStatus::RestrictedManoeuverability,
            4 => NavigationStatus::ConstrainedByDraught,
            5 => NavigationStatus::Moored,
            6 => NavigationStatus::Aground,
            7 => NavigationStatus::EngagedInFishing,
            8 => NavigationStatus::UnderWaySailing,
            9 => NavigationStatus::Reserved9,
            10 => NavigationStatus::Reserved10,
            11 => NavigationStatus::Reserved11,
            12 => NavigationStatus::Reserved12,
            13 => NavigationStatus::Reserved13,
            14 => NavigationStatus::AisSartIsActive,
            _ => NavigationStatus::NotDefined,
        }
    }

    pub fn to_value(self) -> u8 {
        self as u8
    }

    /// True for the statuses whose dynamic reporting interval is relaxed to three minutes
    /// at low speed.
    pub fn is_stationary(self) -> bool {
        matches!(self, NavigationStatus::AtAnchor | NavigationStatus::Moored)
    }
}

impl Default for NavigationStatus {
    fn default() -> NavigationStatus {
        NavigationStatus::UnderWayUsingEngine
    }
}

impl core::fmt::Display for NavigationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NavigationStatus::UnderWayUsingEngine => write!(f, "under way using engine"),
            NavigationStatus::AtAnchor => write!(f, "at anchor"),
            NavigationStatus::NotUnderCommand => write!(f, "not under command"),
            NavigationStatus::RestrictedManoeuverability => {
                write!(f, "restricted manoeuverability")
            }
            NavigationStatus::ConstrainedByDraught => write!(f, "constrained by draught"),
            NavigationStatus::Moored => write!(f, "moored"),
            NavigationStatus::Aground => write!(f, "aground"),
            NavigationStatus::EngagedInFishing => write!(f, "engaged in fishing"),
            NavigationStatus::UnderWaySailing => write!(f, "under way sailing"),
            NavigationStatus::Reserved9 => write!(f, "(reserved9)"),
            NavigationStatus::Reserved10 => write!(f, "(reserved10)"),
            NavigationStatus::Reserved11 => write!(f, "(reserved11)"),
            NavigationStatus::Reserved12 => write!(f, "(reserved12)"),
            NavigationStatus::Reserved13 => write!(f, "(reserved13)"),
            NavigationStatus::AisSartIsActive => write!(f, "ais sart is active"),
            NavigationStatus::NotDefined => write!(f, "(notDefined)"),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Overall dimension and reference point of position, in meters. Bow and stern fields are
/// 9-bit (0-511), port and starboard fields 6-bit (0-63).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Dimensions {
    pub to_bow: u16,
    pub to_stern: u16,
    pub to_port: u8,
    pub to_starboard: u8,
}

impl Dimensions {
    /// Append the 30-bit dimension block.
    pub(crate) fn append_to(&self, bb: &mut bits::BitBuffer) -> Result<(), EncodeError> {
        bb.append_uint("dimension_to_bow", self.to_bow as u64, 9)?;
        bb.append_uint("dimension_to_stern", self.to_stern as u64, 9)?;
        bb.append_uint("dimension_to_port", self.to_port as u64, 6)?;
        bb.append_uint("dimension_to_starboard", self.to_starboard as u64, 6)?;
        Ok(())
    }

    pub(crate) fn pick(bv: &BitVec, index: usize) -> Dimensions {
        Dimensions {
            to_bow: pick_u64(bv, index, 9) as u16,
            to_stern: pick_u64(bv, index + 9, 9) as u16,
            to_port: pick_u64(bv, index + 18, 6) as u8,
            to_starboard: pick_u64(bv, index + 24, 6) as u8,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Estimated time of arrival as broadcast in type 5 messages. The defaults are the
/// not-available sentinels of M.1371 (month 0, day 0, hour 24, minute 60).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EtaDate {
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl Default for EtaDate {
    fn default() -> EtaDate {
        EtaDate {
            month: 0,
            day: 0,
            hour: 24,
            minute: 60,
        }
    }
}

impl EtaDate {
    pub(crate) fn append_to(&self, bb: &mut bits::BitBuffer) -> Result<(), EncodeError> {
        if self.month > 12 {
            return Err(EncodeError::field("eta_month", self.month));
        }
        if self.day > 31 {
            return Err(EncodeError::field("eta_day", self.day));
        }
        if self.hour > 24 {
            return Err(EncodeError::field("eta_hour", self.hour));
        }
        if self.minute > 60 {
            return Err(EncodeError::field("eta_minute", self.minute));
        }
        bb.append_uint("eta_month", self.month as u64, 4)?;
        bb.append_uint("eta_day", self.day as u64, 5)?;
        bb.append_uint("eta_hour", self.hour as u64, 5)?;
        bb.append_uint("eta_minute", self.minute as u64, 6)?;
        Ok(())
    }

    pub(crate) fn pick(bv: &BitVec, index: usize) -> EtaDate {
        EtaDate {
            month: pick_u64(bv, index, 4) as u8,
            day: pick_u64(bv, index + 4, 5) as u8,
            hour: pick_u64(bv, index + 9, 5) as u8,
            minute: pick_u64(bv, index + 14, 6) as u8,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// One AIS radio message as a tagged variant. Encoding dispatches on the tag; each variant
/// carries the explicit record of its message type.
#[derive(Clone, Debug, PartialEq)]
pub enum AisMessage {
    /// Types 1, 2 and 3: Class A position report
    PositionReport(PositionReport),

    /// Type 4: base station report
    BaseStationReport(BaseStationReport),

    /// Type 5: Class A static and voyage related data
    StaticAndVoyageData(StaticAndVoyageData),

    /// Type 18: standard Class B position report
    StandardClassBReport(StandardClassBReport),

    /// Type 19: extended Class B position report
    ExtendedClassBReport(ExtendedClassBReport),

    /// Type 21: aid-to-navigation report
    AidToNavigationReport(AidToNavigationReport),

    /// Type 24 part A: static data report, name
    StaticDataReportA(StaticDataReportA),

    /// Type 24 part B: static data report, vessel particulars
    StaticDataReportB(StaticDataReportB),
}

impl AisMessage {
    /// The wire message type carried in the first six payload bits.
    pub fn message_type(&self) -> u8 {
        match self {
            AisMessage::PositionReport(r) => r.message_type,
            AisMessage::BaseStationReport(_) => 4,
            AisMessage::StaticAndVoyageData(_) => 5,
            AisMessage::StandardClassBReport(_) => 18,
            AisMessage::ExtendedClassBReport(_) => 19,
            AisMessage::AidToNavigationReport(_) => 21,
            AisMessage::StaticDataReportA(_) => 24,
            AisMessage::StaticDataReportB(_) => 24,
        }
    }

    /// Build the unpadded payload bit vector for this message.
    pub fn encode(&self) -> Result<BitVec, EncodeError> {
        match self {
            AisMessage::PositionReport(r) => r.encode(),
            AisMessage::BaseStationReport(r) => r.encode(),
            AisMessage::StaticAndVoyageData(r) => r.encode(),
            AisMessage::StandardClassBReport(r) => r.encode(),
            AisMessage::ExtendedClassBReport(r) => r.encode(),
            AisMessage::AidToNavigationReport(r) => r.encode(),
            AisMessage::StaticDataReportA(r) => r.encode(),
            AisMessage::StaticDataReportB(r) => r.encode(),
        }
    }

    /// Decode a payload bit vector back into a typed message. Inverse of `encode`; used by
    /// the parse surface and the round-trip tests.
    pub fn decode(bv: &BitVec) -> Result<AisMessage, ParseError> {
        let message_type = pick_u64(bv, 0, 6);
        match message_type {
            1 | 2 | 3 => Ok(AisMessage::PositionReport(PositionReport::decode(bv)?)),
            4 => Ok(AisMessage::BaseStationReport(BaseStationReport::decode(
                bv,
            )?)),
            5 => Ok(AisMessage::StaticAndVoyageData(StaticAndVoyageData::decode(
                bv,
            )?)),
            18 => Ok(AisMessage::StandardClassBReport(
                StandardClassBReport::decode(bv)?,
            )),
            19 => Ok(AisMessage::ExtendedClassBReport(
                ExtendedClassBReport::decode(bv)?,
            )),
            21 => Ok(AisMessage::AidToNavigationReport(
                AidToNavigationReport::decode(bv)?,
            )),
            24 => match pick_u64(bv, 38, 2) {
                0 => Ok(AisMessage::StaticDataReportA(StaticDataReportA::decode(
                    bv,
                )?)),
                1 => Ok(AisMessage::StaticDataReportB(StaticDataReportB::decode(
                    bv,
                )?)),
                part => Err(ParseError::InvalidSentence(format!(
                    "Invalid type 24 part number: {}",
                    part
                ))),
            },
            _ => Err(ParseError::UnsupportedSentenceType(format!(
                "Unsupported AIS message type: {}",
                message_type
            ))),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Field scaling helpers shared by the encoders. Not-available sentinels follow M.1371.

pub(crate) const LONGITUDE_NOT_AVAILABLE: i64 = 181 * 600_000; // 0x6791AC0
pub(crate) const LATITUDE_NOT_AVAILABLE: i64 = 91 * 600_000; // 0x3412140

/// Longitude in degrees to I4 fixed point (1/10000 minute).
pub(crate) fn encode_longitude(longitude: Option<f64>) -> Result<i64, EncodeError> {
    match longitude {
        Some(lon) => {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(EncodeError::field("longitude", lon));
            }
            Ok((lon * 600_000.0).round() as i64)
        }
        None => Ok(LONGITUDE_NOT_AVAILABLE),
    }
}

/// Latitude in degrees to I4 fixed point (1/10000 minute).
pub(crate) fn encode_latitude(latitude: Option<f64>) -> Result<i64, EncodeError> {
    match latitude {
        Some(lat) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(EncodeError::field("latitude", lat));
            }
            Ok((lat * 600_000.0).round() as i64)
        }
        None => Ok(LATITUDE_NOT_AVAILABLE),
    }
}

pub(crate) fn decode_longitude(raw: i64) -> Option<f64> {
    if raw == LONGITUDE_NOT_AVAILABLE {
        None
    } else {
        Some(raw as f64 / 600_000.0)
    }
}

pub(crate) fn decode_latitude(raw: i64) -> Option<f64> {
    if raw == LATITUDE_NOT_AVAILABLE {
        None
    } else {
        Some(raw as f64 / 600_000.0)
    }
}

/// Speed over ground in knots to tenths of knots; 1023 = not available, 1022 = 102.2 kn.
pub(crate) fn encode_sog(sog_knots: Option<f64>) -> Result<u64, EncodeError> {
    match sog_knots {
        Some(sog) => {
            if sog < 0.0 {
                return Err(EncodeError::field("sog", sog));
            }
            let raw = (sog * 10.0).round() as u64;
            if raw > 1022 {
                return Err(EncodeError::field("sog", sog));
            }
            Ok(raw)
        }
        None => Ok(1023),
    }
}

pub(crate) fn decode_sog(raw: u64) -> Option<f64> {
    if raw < 1023 {
        Some(raw as f64 * 0.1)
    } else {
        None
    }
}

/// Course over ground in degrees to tenths of degrees; 3600 = not available.
pub(crate) fn encode_cog(cog: Option<f64>) -> Result<u64, EncodeError> {
    match cog {
        Some(cog) => {
            if !(0.0..360.0).contains(&cog) {
                return Err(EncodeError::field("cog", cog));
            }
            Ok(((cog * 10.0).round() as u64) % 3600)
        }
        None => Ok(3600),
    }
}

pub(crate) fn decode_cog(raw: u64) -> Option<f64> {
    if raw < 3600 {
        Some(raw as f64 * 0.1)
    } else {
        None
    }
}

/// True heading in degrees; 511 = not available.
pub(crate) fn encode_heading(heading: Option<u16>) -> Result<u64, EncodeError> {
    match heading {
        Some(heading) => {
            if heading > 359 {
                return Err(EncodeError::field("heading", heading));
            }
            Ok(heading as u64)
        }
        None => Ok(511),
    }
}

pub(crate) fn decode_heading(raw: u64) -> Option<u16> {
    if raw != 511 {
        Some(raw as u16)
    } else {
        None
    }
}

/// UTC second of the position fix (0-59) or one of the 60-63 sentinels.
pub(crate) fn check_timestamp_seconds(timestamp: u8) -> Result<u64, EncodeError> {
    if timestamp > 63 {
        return Err(EncodeError::field("timestamp", timestamp));
    }
    Ok(timestamp as u64)
}

pub(crate) fn check_mmsi(mmsi: u32) -> Result<u64, EncodeError> {
    if mmsi > 999_999_999 {
        return Err(EncodeError::field("mmsi", mmsi));
    }
    Ok(mmsi as u64)
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_longitude_scaling() {
        assert_eq!(encode_longitude(Some(-122.4)).unwrap(), -73_440_000);
        assert_eq!(encode_longitude(None).unwrap(), 0x6791AC0);
        assert_eq!(decode_longitude(-73_440_000), Some(-122.4));
        assert_eq!(decode_longitude(0x6791AC0), None);
        assert!(encode_longitude(Some(181.0)).is_err());
    }

    #[test]
    fn test_latitude_scaling() {
        assert_eq!(encode_latitude(Some(37.8)).unwrap(), 22_680_000);
        assert_eq!(encode_latitude(None).unwrap(), 0x3412140);
        assert_eq!(decode_latitude(22_680_000), Some(37.8));
        assert_eq!(decode_latitude(0x3412140), None);
        assert!(encode_latitude(Some(-90.1)).is_err());
    }

    #[test]
    fn test_sog_scaling() {
        assert_eq!(encode_sog(Some(12.3)).unwrap(), 123);
        assert_eq!(encode_sog(Some(102.2)).unwrap(), 1022);
        assert_eq!(encode_sog(None).unwrap(), 1023);
        assert!(encode_sog(Some(102.3)).is_err());
        assert!(encode_sog(Some(-0.1)).is_err());
        assert_eq!(decode_sog(123), Some(12.3));
        assert_eq!(decode_sog(1023), None);
    }

    #[test]
    fn test_cog_scaling() {
        assert_eq!(encode_cog(Some(90.0)).unwrap(), 900);
        assert_eq!(encode_cog(Some(0.0)).unwrap(), 0);
        assert_eq!(encode_cog(None).unwrap(), 3600);
        assert!(encode_cog(Some(360.0)).is_err());
        assert_eq!(decode_cog(900), Some(90.0));
        assert_eq!(decode_cog(3600), None);
    }

    #[test]
    fn test_heading() {
        assert_eq!(encode_heading(Some(90)).unwrap(), 90);
        assert_eq!(encode_heading(None).unwrap(), 511);
        assert!(encode_heading(Some(360)).is_err());
        assert_eq!(decode_heading(90), Some(90));
        assert_eq!(decode_heading(511), None);
    }

    #[test]
    fn test_navigation_status() {
        for value in 0..16u8 {
            assert_eq!(NavigationStatus::new(value).to_value(), value);
        }
        assert!(NavigationStatus::AtAnchor.is_stationary());
        assert!(NavigationStatus::Moored.is_stationary());
        assert!(!NavigationStatus::UnderWayUsingEngine.is_stationary());
    }
}
