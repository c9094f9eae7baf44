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

/// AIS types 1, 2 and 3: Position Report Class A. 168 bits.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionReport {
    /// Wire message type; 1, 2 or 3 depending on the assigned access scheme
    pub message_type: u8,

    /// Repeat indicator (0-3)
    pub repeat: u8,

    /// User ID (30 bits)
    pub mmsi: u32,

    /// Navigation status
    pub nav_status: NavigationStatus,

    /// Rate of turn in raw ROTais units (-127..127); `None` = not available
    pub rot: Option<i8>,

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

    /// Special manoeuvre indicator, raw 2-bit value (0 = not available)
    pub special_manoeuvre: u8,

    /// RAIM flag of the position fixing device
    pub raim_flag: bool,

    /// SOTDMA/ITDMA communication state (19 bits)
    pub radio_status: u32,
}

impl Default for PositionReport {
    fn default() -> PositionReport {
        PositionReport {
            message_type: 1,
            repeat: 0,
            mmsi: 0,
            nav_status: NavigationStatus::default(),
            rot: None,
            sog_knots: None,
            high_position_accuracy: false,
            longitude: None,
            latitude: None,
            cog: None,
            heading_true: None,
            timestamp_seconds: 60,
            special_manoeuvre: 0,
            raim_flag: false,
            radio_status: 0,
        }
    }
}

impl PositionReport {
    /// Build the 168-bit payload.
    pub fn encode(&self) -> Result<BitVec, EncodeError> {
        if !(1..=3).contains(&self.message_type) {
            return Err(EncodeError::field("message_type", self.message_type));
        }
        let mut bb = BitBuffer::new();
        bb.append_uint("message_type", self.message_type as u64, 6)?;
        bb.append_uint("repeat", self.repeat as u64, 2)?;
        bb.append_uint("mmsi", check_mmsi(self.mmsi)?, 30)?;
        bb.append_uint("nav_status", self.nav_status.to_value() as u64, 4)?;
        match self.rot {
            Some(rot) => {
                if rot == i8::MIN {
                    return Err(EncodeError::field("rot", rot));
                }
                bb.append_int("rot", rot as i64, 8)?;
            }
            None => bb.append_int("rot", -128, 8)?,
        }
        bb.append_uint("sog", encode_sog(self.sog_knots)?, 10)?;
        bb.append_bool(self.high_position_accuracy);
        bb.append_int("longitude", encode_longitude(self.longitude)?, 28)?;
        bb.append_int("latitude", encode_latitude(self.latitude)?, 27)?;
        bb.append_uint("cog", encode_cog(self.cog)?, 12)?;
        bb.append_uint("heading", encode_heading(self.heading_true)?, 9)?;
        bb.append_uint("timestamp", check_timestamp_seconds(self.timestamp_seconds)?, 6)?;
        bb.append_uint("special_manoeuvre", self.special_manoeuvre as u64, 2)?;
        bb.append_uint("spare", 0, 3)?;
        bb.append_bool(self.raim_flag);
        bb.append_uint("radio_status", self.radio_status as u64, 19)?;
        Ok(bb.into_bits())
    }

    /// Decode a payload bit vector. Inverse of `encode`.
    pub fn decode(bv: &BitVec) -> Result<PositionReport, ParseError> {
        let message_type = pick_u64(bv, 0, 6) as u8;
        if !(1..=3).contains(&message_type) {
            return Err(ParseError::InvalidSentence(format!(
                "Unexpected message type for position report: {}",
                message_type
            )));
        }
        Ok(PositionReport {
            message_type,
            repeat: pick_u64(bv, 6, 2) as u8,
            mmsi: pick_u64(bv, 8, 30) as u32,
            nav_status: NavigationStatus::new(pick_u64(bv, 38, 4) as u8),
            rot: {
                let raw = pick_i64(bv, 42, 8);
                if raw == -128 {
                    None
                } else {
                    Some(raw as i8)
                }
            },
            sog_knots: decode_sog(pick_u64(bv, 50, 10)),
            high_position_accuracy: pick_u64(bv, 60, 1) != 0,
            longitude: decode_longitude(pick_i64(bv, 61, 28)),
            latitude: decode_latitude(pick_i64(bv, 89, 27)),
            cog: decode_cog(pick_u64(bv, 116, 12)),
            heading_true: decode_heading(pick_u64(bv, 128, 9)),
            timestamp_seconds: pick_u64(bv, 137, 6) as u8,
            special_manoeuvre: pick_u64(bv, 143, 2) as u8,
            raim_flag: pick_u64(bv, 148, 1) != 0,
            radio_status: pick_u64(bv, 149, 19) as u32,
        })
    }
}

// -------------------------------------------------------------------------------------------------
