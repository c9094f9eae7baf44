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

/// AIS type 19: Extended Class B Position Report. 312 bits.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtendedClassBReport {
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

    /// Regional reserved bits (4)
    pub regional: u8,

    /// Vessel name (up to 20 characters)
    pub name: String,

    /// Type of ship and cargo (0-99)
    pub ship_type: u8,

    /// Overall dimensions and position reference
    pub dimensions: Dimensions,

    /// Type of electronic position fixing device (4 bits)
    pub position_fix_type: u8,

    /// RAIM flag of the position fixing device
    pub raim_flag: bool,

    /// Data terminal equipment ready flag
    pub dte: bool,

    /// Assigned-mode flag
    pub assigned: bool,
}

impl ExtendedClassBReport {
    /// Build the 312-bit payload.
    pub fn encode(&self) -> Result<BitVec, EncodeError> {
        if self.ship_type > 99 {
            return Err(EncodeError::field("ship_type", self.ship_type));
        }
        let mut bb = BitBuffer::new();
        bb.append_uint("message_type", 19, 6)?;
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
        bb.append_uint("regional", self.regional as u64, 4)?;
        bb.append_string("name", &self.name, 20)?;
        bb.append_uint("ship_type", self.ship_type as u64, 8)?;
        self.dimensions.append_to(&mut bb)?;
        bb.append_uint("position_fix_type", self.position_fix_type as u64, 4)?;
        bb.append_bool(self.raim_flag);
        bb.append_bool(self.dte);
        bb.append_bool(self.assigned);
        bb.append_uint("spare", 0, 4)?;
        Ok(bb.into_bits())
    }

    /// Decode a payload bit vector. Inverse of `encode`.
    pub fn decode(bv: &BitVec) -> Result<ExtendedClassBReport, ParseError> {
        if bv.len() < 312 {
            return Err(ParseError::InvalidSentence(format!(
                "Type 19 payload too short: {} bits",
                bv.len()
            )));
        }
        Ok(ExtendedClassBReport {
            repeat: pick_u64(bv, 6, 2) as u8,
            mmsi: pick_u64(bv, 8, 30) as u32,
            sog_knots: decode_sog(pick_u64(bv, 46, 10)),
            high_position_accuracy: pick_u64(bv, 56, 1) != 0,
            longitude: decode_longitude(pick_i64(bv, 57, 28)),
            latitude: decode_latitude(pick_i64(bv, 85, 27)),
            cog: decode_cog(pick_u64(bv, 112, 12)),
            heading_true: decode_heading(pick_u64(bv, 124, 9)),
            timestamp_seconds: pick_u64(bv, 133, 6) as u8,
            regional: pick_u64(bv, 139, 4) as u8,
            name: pick_string(bv, 143, 20),
            ship_type: pick_u64(bv, 263, 8) as u8,
            dimensions: Dimensions::pick(bv, 271),
            position_fix_type: pick_u64(bv, 301, 4) as u8,
            raim_flag: pick_u64(bv, 305, 1) != 0,
            dte: pick_u64(bv, 306, 1) != 0,
            assigned: pick_u64(bv, 307, 1) != 0,
        })
    }
}

// -------------------------------------------------------------------------------------------------
