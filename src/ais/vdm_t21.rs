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

use bitvec::prelude::*;

use super::bits::{pick_i64, pick_string, pick_u64, BitBuffer};
use super::*;
use crate::error::{EncodeError, ParseError};

/// Characters of the name that fit the fixed 120-bit field.
const NAME_FIELD_CHARS: usize = 20;

/// Maximum characters of the variable name extension field (88 bits cap the extension
/// at 14 six-bit characters).
const NAME_EXTENSION_CHARS: usize = 14;

/// AIS type 21: Aid-to-Navigation Report. 272 bits plus an optional name extension.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AidToNavigationReport {
    /// Repeat indicator (0-3)
    pub repeat: u8,

    /// User ID (30 bits)
    pub mmsi: u32,

    /// Type of aid to navigation (0-31)
    pub aid_type: u8,

    /// Name of the aid; up to 34 characters, the tail beyond 20 goes to the
    /// name extension field
    pub name: String,

    /// Position accuracy: true = high (<= 10 m), false = low (> 10 m)
    pub high_position_accuracy: bool,

    /// Longitude in degrees
    pub longitude: Option<f64>,

    /// Latitude in degrees
    pub latitude: Option<f64>,

    /// Overall dimensions and position reference
    pub dimensions: Dimensions,

    /// Type of electronic position fixing device (4 bits)
    pub position_fix_type: u8,

    /// UTC second of the position fix (0-59) or a 60-63 sentinel
    pub timestamp_seconds: u8,

    /// True when the aid is observed off its charted position
    pub off_position: bool,

    /// Regional reserved bits (8)
    pub regional: u8,

    /// RAIM flag of the position fixing device
    pub raim_flag: bool,

    /// True for a virtual aid (no physical structure)
    pub virtual_aid: bool,

    /// Assigned-mode flag
    pub assigned: bool,
}

impl AidToNavigationReport {
    /// Build the payload: 272 bits, plus six bits per name extension character.
    pub fn encode(&self) -> Result<BitVec, EncodeError> {
        if self.aid_type > 31 {
            return Err(EncodeError::field("aid_type", self.aid_type));
        }
        let name_chars = self.name.chars().count();
        if name_chars > NAME_FIELD_CHARS + NAME_EXTENSION_CHARS {
            return Err(EncodeError::field("name", &self.name));
        }
        let (head, tail) = if name_chars > NAME_FIELD_CHARS {
            let split: usize = self
                .name
                .char_indices()
                .nth(NAME_FIELD_CHARS)
                .map(|(i, _)| i)
                .unwrap_or(self.name.len());
            (&self.name[..split], &self.name[split..])
        } else {
            (&self.name[..], "")
        };
        let mut bb = BitBuffer::new();
        bb.append_uint("message_type", 21, 6)?;
        bb.append_uint("repeat", self.repeat as u64, 2)?;
        bb.append_uint("mmsi", check_mmsi(self.mmsi)?, 30)?;
        bb.append_uint("aid_type", self.aid_type as u64, 5)?;
        bb.append_string("name", head, NAME_FIELD_CHARS)?;
        bb.append_bool(self.high_position_accuracy);
        bb.append_int("longitude", encode_longitude(self.longitude)?, 28)?;
        bb.append_int("latitude", encode_latitude(self.latitude)?, 27)?;
        self.dimensions.append_to(&mut bb)?;
        bb.append_uint("position_fix_type", self.position_fix_type as u64, 4)?;
        bb.append_uint("timestamp", check_timestamp_seconds(self.timestamp_seconds)?, 6)?;
        bb.append_bool(self.off_position);
        bb.append_uint("regional", self.regional as u64, 8)?;
        bb.append_bool(self.raim_flag);
        bb.append_bool(self.virtual_aid);
        bb.append_bool(self.assigned);
        bb.append_uint("spare", 0, 1)?;
        if !tail.is_empty() {
            bb.append_string("name_extension", tail, tail.chars().count())?;
        }
        Ok(bb.into_bits())
    }

    /// Decode a payload bit vector. Inverse of `encode`.
    pub fn decode(bv: &BitVec) -> Result<AidToNavigationReport, ParseError> {
        if bv.len() < 272 {
            return Err(ParseError::InvalidSentence(format!(
                "Type 21 payload too short: {} bits",
                bv.len()
            )));
        }
        let mut name = pick_string(bv, 43, NAME_FIELD_CHARS);
        let extension_chars = (bv.len() - 272) / 6;
        if extension_chars > 0 {
            name.push_str(&pick_string(bv, 272, extension_chars));
        }
        Ok(AidToNavigationReport {
            repeat: pick_u64(bv, 6, 2) as u8,
            mmsi: pick_u64(bv, 8, 30) as u32,
            aid_type: pick_u64(bv, 38, 5) as u8,
            name,
            high_position_accuracy: pick_u64(bv, 163, 1) != 0,
            longitude: decode_longitude(pick_i64(bv, 164, 28)),
            latitude: decode_latitude(pick_i64(bv, 192, 27)),
            dimensions: Dimensions::pick(bv, 219),
            position_fix_type: pick_u64(bv, 249, 4) as u8,
            timestamp_seconds: pick_u64(bv, 253, 6) as u8,
            off_position: pick_u64(bv, 259, 1) != 0,
            regional: pick_u64(bv, 260, 8) as u8,
            raim_flag: pick_u64(bv, 268, 1) != 0,
            virtual_aid: pick_u64(bv, 269, 1) != 0,
            assigned: pick_u64(bv, 270, 1) != 0,
        })
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::bits::unarmor;
    use super::*;

    #[test]
    fn test_decode_type21() {
        // Payloads of the two-fragment sentence pair
        // !AIVDM,2,1,5,B,E1mg=5J1T4W0h97aRh6ba84<h2d;W:Te=eLvH50```q,0*46
        // !AIVDM,2,2,5,B,:D44QDlp0C1DU00,2*36
        let combined = "E1mg=5J1T4W0h97aRh6ba84<h2d;W:Te=eLvH50```q:D44QDlp0C1DU00";
        let bv = unarmor(combined, 2).unwrap();
        let report = AidToNavigationReport::decode(&bv).unwrap();
        assert_eq!(report.mmsi, 123456789);
        assert_eq!(report.aid_type, 20);
        assert_eq!(report.name, "CHINA ROSE MURPHY EXPRESS ALERT");
        assert!(!report.high_position_accuracy);
        assert::close(report.latitude.unwrap_or(0.0), 47.9206183333, 0.00000001);
        assert::close(report.longitude.unwrap_or(0.0), -122.698591667, 0.00000001);
        assert_eq!(
            report.dimensions,
            Dimensions {
                to_bow: 5,
                to_stern: 5,
                to_port: 5,
                to_starboard: 5,
            }
        );
        assert_eq!(report.position_fix_type, 1);
        assert_eq!(report.timestamp_seconds, 50);
        assert!(!report.off_position);
        assert_eq!(report.regional, 165);
        assert!(!report.raim_flag);
        assert!(!report.virtual_aid);
        assert!(!report.assigned);
    }

    #[test]
    fn test_round_trip_short_name() {
        let report = AidToNavigationReport {
            mmsi: 993_692_005,
            aid_type: 14,
            name: "ALCATRAZ W".into(),
            high_position_accuracy: true,
            longitude: Some(-122.4098),
            latitude: Some(37.8087),
            timestamp_seconds: 61,
            virtual_aid: true,
            ..Default::default()
        };
        let bv = report.encode().unwrap();
        assert_eq!(bv.len(), 272);
        assert_eq!(AidToNavigationReport::decode(&bv).unwrap(), report);
    }

    #[test]
    fn test_round_trip_name_extension() {
        let report = AidToNavigationReport {
            mmsi: 993_692_005,
            aid_type: 20,
            name: "GOLDEN GATE BRIDGE PIER NORTH".into(),
            longitude: Some(-122.4783),
            latitude: Some(37.8199),
            timestamp_seconds: 60,
            ..Default::default()
        };
        let bv = report.encode().unwrap();
        assert_eq!(bv.len(), 272 + 9 * 6);
        assert_eq!(AidToNavigationReport::decode(&bv).unwrap(), report);
    }

    #[test]
    fn test_encode_rejects_bad_fields() {
        assert!(AidToNavigationReport {
            mmsi: 993_692_005,
            aid_type: 32,
            ..Default::default()
        }
        .encode()
        .is_err());
        assert!(AidToNavigationReport {
            mmsi: 993_692_005,
            name: "A NAME FAR TOO LONG FOR EVEN THE EXTENSION".into(),
            ..Default::default()
        }
        .encode()
        .is_err());
    }
}
