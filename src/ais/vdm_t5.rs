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

use super::bits::{pick_string, pick_u64, BitBuffer};
use super::*;
use crate::error::{EncodeError, ParseError};

/// AIS type 5: Static and Voyage Related Data, Class A. 424 bits.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticAndVoyageData {
    /// Repeat indicator (0-3)
    pub repeat: u8,

    /// User ID (30 bits)
    pub mmsi: u32,

    /// AIS version indicator (2 bits)
    pub ais_version: u8,

    /// IMO number; `None` encodes as 0
    pub imo_number: Option<u32>,

    /// Call sign (up to 7 characters)
    pub call_sign: String,

    /// Vessel name (up to 20 characters)
    pub name: String,

    /// Type of ship and cargo (0-99)
    pub ship_type: u8,

    /// Overall dimensions and position reference
    pub dimensions: Dimensions,

    /// Type of electronic position fixing device (4 bits)
    pub position_fix_type: u8,

    /// Estimated time of arrival
    pub eta: EtaDate,

    /// Maximum present static draught in meters (0-25.5; 0 = not available)
    pub draught_m: f64,

    /// Destination (up to 20 characters)
    pub destination: String,

    /// Data terminal equipment ready flag
    pub dte: bool,
}

impl StaticAndVoyageData {
    /// Build the 424-bit payload.
    pub fn encode(&self) -> Result<BitVec, EncodeError> {
        if self.ship_type > 99 {
            return Err(EncodeError::field("ship_type", self.ship_type));
        }
        if !(0.0..=25.5).contains(&self.draught_m) {
            return Err(EncodeError::field("draught", self.draught_m));
        }
        let mut bb = BitBuffer::new();
        bb.append_uint("message_type", 5, 6)?;
        bb.append_uint("repeat", self.repeat as u64, 2)?;
        bb.append_uint("mmsi", check_mmsi(self.mmsi)?, 30)?;
        bb.append_uint("ais_version", self.ais_version as u64, 2)?;
        bb.append_uint("imo_number", self.imo_number.unwrap_or(0) as u64, 30)?;
        bb.append_string("call_sign", &self.call_sign, 7)?;
        bb.append_string("name", &self.name, 20)?;
        bb.append_uint("ship_type", self.ship_type as u64, 8)?;
        self.dimensions.append_to(&mut bb)?;
        bb.append_uint("position_fix_type", self.position_fix_type as u64, 4)?;
        self.eta.append_to(&mut bb)?;
        bb.append_uint("draught", (self.draught_m * 10.0).round() as u64, 8)?;
        bb.append_string("destination", &self.destination, 20)?;
        bb.append_bool(self.dte);
        bb.append_uint("spare", 0, 1)?;
        Ok(bb.into_bits())
    }

    /// Decode a payload bit vector. Inverse of `encode`.
    pub fn decode(bv: &BitVec) -> Result<StaticAndVoyageData, ParseError> {
        if bv.len() < 423 {
            return Err(ParseError::InvalidSentence(format!(
                "Type 5 payload too short: {} bits",
                bv.len()
            )));
        }
        Ok(StaticAndVoyageData {
            repeat: pick_u64(bv, 6, 2) as u8,
            mmsi: pick_u64(bv, 8, 30) as u32,
            ais_version: pick_u64(bv, 38, 2) as u8,
            imo_number: {
                let raw = pick_u64(bv, 40, 30) as u32;
                if raw != 0 {
                    Some(raw)
                } else {
                    None
                }
            },
            call_sign: pick_string(bv, 70, 7),
            name: pick_string(bv, 112, 20),
            ship_type: pick_u64(bv, 232, 8) as u8,
            dimensions: Dimensions::pick(bv, 240),
            position_fix_type: pick_u64(bv, 270, 4) as u8,
            eta: EtaDate::pick(bv, 274),
            draught_m: pick_u64(bv, 294, 8) as f64 / 10.0,
            destination: pick_string(bv, 302, 20),
            dte: pick_u64(bv, 422, 1) != 0,
        })
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::bits::unarmor;
    use super::*;

    #[test]
    fn test_decode_type5() {
        // Payloads of the two-fragment sentence pair
        // !AIVDM,2,1,1,A,55?MbV02;H;s<HtKR20EHE:0@T4@Dn2222222216L961O5Gf0NSQEp6ClRp8,0*1C
        // !AIVDM,2,2,1,A,88888888880,2*25
        let combined =
            "55?MbV02;H;s<HtKR20EHE:0@T4@Dn2222222216L961O5Gf0NSQEp6ClRp888888888880";
        let bv = unarmor(combined, 2).unwrap();
        let data = StaticAndVoyageData::decode(&bv).unwrap();
        assert_eq!(data.mmsi, 351759000);
        assert_eq!(data.ais_version, 0);
        assert_eq!(data.imo_number, Some(9134270));
        assert_eq!(data.call_sign, "3FOF8");
        assert_eq!(data.name, "EVER DIADEM");
        assert_eq!(data.ship_type, 70);
        assert_eq!(
            data.dimensions,
            Dimensions {
                to_bow: 225,
                to_stern: 70,
                to_port: 1,
                to_starboard: 31,
            }
        );
        assert_eq!(data.position_fix_type, 1);
        assert_eq!(
            data.eta,
            EtaDate {
                month: 5,
                day: 15,
                hour: 14,
                minute: 0,
            }
        );
        assert::close(data.draught_m, 12.2, 0.001);
        assert_eq!(data.destination, "NEW YORK");
    }

    #[test]
    fn test_round_trip() {
        let data = StaticAndVoyageData {
            repeat: 0,
            mmsi: 367001234,
            ais_version: 0,
            imo_number: Some(9111222),
            call_sign: "WDL1234".into(),
            name: "EVER GIVEN".into(),
            ship_type: 70,
            dimensions: Dimensions {
                to_bow: 200,
                to_stern: 100,
                to_port: 20,
                to_starboard: 12,
            },
            position_fix_type: 1,
            eta: EtaDate {
                month: 3,
                day: 15,
                hour: 14,
                minute: 30,
            },
            draught_m: 12.5,
            destination: "OAKLAND".into(),
            dte: true,
        };
        let bv = data.encode().unwrap();
        assert_eq!(bv.len(), 424);
        assert_eq!(StaticAndVoyageData::decode(&bv).unwrap(), data);
    }

    #[test]
    fn test_encode_rejects_bad_fields() {
        let good = StaticAndVoyageData {
            mmsi: 367001234,
            ..Default::default()
        };
        assert!(good.encode().is_ok());
        assert!(StaticAndVoyageData {
            ship_type: 100,
            ..good.clone()
        }
        .encode()
        .is_err());
        assert!(StaticAndVoyageData {
            draught_m: 25.6,
            ..good.clone()
        }
        .encode()
        .is_err());
        assert!(StaticAndVoyageData {
            name: "THIS NAME IS MUCH TOO LONG".into(),
            ..good
        }
        .encode()
        .is_err());
    }
}
