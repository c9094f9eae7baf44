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

use super::bits::{pick_i64, pick_u64, BitBuffer};
use super::*;
use crate::error::{EncodeError, ParseError};

/// AIS type 18: Standard Class B CS Position Report. 168 bits.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardClassBReport {
    /// Repeat indicator (0-3)
    pub repeat: u8,

    /// User ID (30 bits)
    pub mmsi: u32,

    /// Speed over ground in knots; `None` = not available
    pub sog_knots: Option<f64>,

    /// Position accuracy: true = high (<= 10 m), false = low (> 10 m)
    pub high_position_accuracy: bool,

    /// Longitude in degrees
    pub longitude: Option<f64>,

    /// Latitude in degrees
    pub latitude: Option<f64>,

    /// Course over ground in degrees
    pub cog: Option<f64>,

    /// True heading (0-359)
    pub heading_true: Option<u16>,

    /// UTC second of the position fix (0-59) or a 60-63 sentinel
    pub timestamp_seconds: u8,

    /// Class B unit flag: false = SOTDMA unit, true = CS unit
    pub cs_unit: bool,

    /// Display flag: capable of displaying messages 12 and 14
    pub display: bool,

    /// DSC flag: equipped with DSC function
    pub dsc: bool,

    /// Band flag: capable of operating over the whole marine band
    pub band: bool,

    /// Message 22 frequency management flag
    pub msg22: bool,

    /// Assigned-mode flag
    pub assigned: bool,

    /// RAIM flag of the position fixing device
    pub raim_flag: bool,

    /// Communication state (20 bits including the selector)
    pub radio_status: u32,
}

impl Default for StandardClassBReport {
    fn default() -> StandardClassBReport {
        StandardClassBReport {
            repeat: 0,
            mmsi: 0,
            sog_knots: None,
            high_position_accuracy: false,
            longitude: None,
            latitude: None,
            cog: None,
            heading_true: None,
            timestamp_seconds: 60,
            cs_unit: true,
            display: false,
            dsc: false,
            band: true,
            msg22: false,
            assigned: false,
            raim_flag: false,
            radio_status: 0,
        }
    }
}

impl StandardClassBReport {
    /// Build the 168-bit payload.
    pub fn encode(&self) -> Result<BitVec, EncodeError> {
        let mut bb = BitBuffer::new();
        bb.append_uint("message_type", 18, 6)?;
        bb.append_uint("repeat", self.repeat as u64, 2)?;
        bb.append_uint("mmsi", check_mmsi(self.mmsi)?, 30)?;
        bb.append_uint("reserved", 0, 8)?;
        bb.append_uint("sog", encode_sog(self.sog_knots)?, 10)?;
        bb.append_bool(self.high_position_accuracy);
        bb.append_int("longitude", encode_longitude(self.longitude)?, 28)?;
        bb.append_int("latitude", encode_latitude(self.latitude)?, 27)?;
        bb.append_uint("cog", encode_cog(self.cog)?, 12)?;
        bb.append_uint("heading", encode_heading(self.heading_true)?, 9)?;
        bb.append_uint("timestamp", check_timestamp_seconds(self.timestamp_seconds)?, 6)?;
        bb.append_uint("regional", 0, 2)?;
        bb.append_bool(self.cs_unit);
        bb.append_bool(self.display);
        bb.append_bool(self.dsc);
        bb.append_bool(self.band);
        bb.append_bool(self.msg22);
        bb.append_bool(self.assigned);
        bb.append_bool(self.raim_flag);
        bb.append_uint("radio_status", self.radio_status as u64, 20)?;
        Ok(bb.into_bits())
    }

    /// Decode a payload bit vector. Inverse of `encode`.
    pub fn decode(bv: &BitVec) -> Result<StandardClassBReport, ParseError> {
        let message_type = pick_u64(bv, 0, 6);
        if message_type != 18 {
            return Err(ParseError::InvalidSentence(format!(
                "Unexpected message type for Class B report: {}",
                message_type
            )));
        }
        Ok(StandardClassBReport {
            repeat: pick_u64(bv, 6, 2) as u8,
            mmsi: pick_u64(bv, 8, 30) as u32,
            sog_knots: decode_sog(pick_u64(bv, 46, 10)),
            high_position_accuracy: pick_u64(bv, 56, 1) != 0,
            longitude: decode_longitude(pick_i64(bv, 57, 28)),
            latitude: decode_latitude(pick_i64(bv, 85, 27)),
            cog: decode_cog(pick_u64(bv, 112, 12)),
            heading_true: decode_heading(pick_u64(bv, 124, 9)),
            timestamp_seconds: pick_u64(bv, 133, 6) as u8,
            cs_unit: pick_u64(bv, 141, 1) != 0,
            display: pick_u64(bv, 142, 1) != 0,
            dsc: pick_u64(bv, 143, 1) != 0,
            band: pick_u64(bv, 144, 1) != 0,
            msg22: pick_u64(bv, 145, 1) != 0,
            assigned: pick_u64(bv, 146, 1) != 0,
            raim_flag: pick_u64(bv, 147, 1) != 0,
            radio_status: pick_u64(bv, 148, 20) as u32,
        })
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::bits::unarmor;
    use super::*;

    #[test]
    fn test_decode_type18() {
        // Real-world sentence payload: !AIVDM,1,1,,A,B52K>;h00Fc>jpUlNV@ikwpUoP06,0*4C
        let bv = unarmor("B52K>;h00Fc>jpUlNV@ikwpUoP06", 0).unwrap();
        let report = StandardClassBReport::decode(&bv).unwrap();
        assert_eq!(report.mmsi, 338087471);
        assert_eq!(report.sog_knots, Some(0.1));
        assert!(!report.high_position_accuracy);
        assert::close(report.longitude.unwrap_or(0.0), -74.0721, 0.001);
        assert::close(report.latitude.unwrap_or(0.0), 40.6845, 0.001);
        assert::close(report.cog.unwrap_or(0.0), 79.6, 0.001);
        assert_eq!(report.heading_true, None);
        assert_eq!(report.timestamp_seconds, 49);
        assert!(report.cs_unit);
        assert!(!report.display);
        assert!(report.dsc);
        assert!(report.band);
        assert!(report.msg22);
        assert!(!report.assigned);
        assert!(report.raim_flag);
    }

    #[test]
    fn test_round_trip() {
        let report = StandardClassBReport {
            mmsi: 338123456,
            sog_knots: Some(6.4),
            high_position_accuracy: true,
            longitude: Some(-122.4098),
            latitude: Some(37.8087),
            cog: Some(181.5),
            heading_true: Some(180),
            timestamp_seconds: 17,
            ..Default::default()
        };
        let bv = report.encode().unwrap();
        assert_eq!(bv.len(), 168);
        assert_eq!(StandardClassBReport::decode(&bv).unwrap(), report);
    }

    #[test]
    fn test_encode_rejects_bad_fields() {
        assert!(StandardClassBReport {
            mmsi: 338123456,
            sog_knots: Some(-1.0),
            ..Default::default()
        }
        .encode()
        .is_err());
        assert!(StandardClassBReport {
            mmsi: 338123456,
            latitude: Some(90.5),
            ..Default::default()
        }
        .encode()
        .is_err());
    }
}
