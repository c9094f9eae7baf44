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

use bitvec::prelude::*;

use super::bits::{pick_string, pick_u64, BitBuffer};
use super::*;
use crate::error::{EncodeError, ParseError};

/// AIS type 24 part A: Static Data Report carrying the vessel name. 160 bits.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticDataReportA {
    /// Repeat indicator (0-3)
    pub repeat: u8,

    /// User ID (30 bits)
    pub mmsi: u32,

    /// Vessel name (up to 20 characters)
    pub name: String,
}

impl StaticDataReportA {
    /// Build the 160-bit payload.
    pub fn encode(&self) -> Result<BitVec, EncodeError> {
        let mut bb = BitBuffer::new();
        bb.append_uint("message_type", 24, 6)?;
        bb.append_uint("repeat", self.repeat as u64, 2)?;
        bb.append_uint("mmsi", check_mmsi(self.mmsi)?, 30)?;
        bb.append_uint("part_number", 0, 2)?;
        bb.append_string("name", &self.name, 20)?;
        Ok(bb.into_bits())
    }

    /// Decode a payload bit vector. Inverse of `encode`.
    pub fn decode(bv: &BitVec) -> Result<StaticDataReportA, ParseError> {
        if pick_u64(bv, 38, 2) != 0 {
            return Err(ParseError::InvalidSentence(
                "Not a type 24 part A payload".to_string(),
            ));
        }
        Ok(StaticDataReportA {
            repeat: pick_u64(bv, 6, 2) as u8,
            mmsi: pick_u64(bv, 8, 30) as u32,
            name: pick_string(bv, 40, 20),
        })
    }
}

// -------------------------------------------------------------------------------------------------

/// AIS type 24 part B: Static Data Report carrying the vessel particulars. 168 bits.
///
/// For an auxiliary craft (MMSI 98xxxxxxx) the dimension block carries the mothership
/// MMSI instead of the dimensions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticDataReportB {
    /// Repeat indicator (0-3)
    pub repeat: u8,

    /// User ID (30 bits)
    pub mmsi: u32,

    /// Type of ship and cargo (0-99)
    pub ship_type: u8,

    /// Vendor ID (up to 7 characters)
    pub vendor_id: String,

    /// Call sign (up to 7 characters)
    pub call_sign: String,

    /// Overall dimensions and position reference
    pub dimensions: Dimensions,

    /// Mothership MMSI, encoded in place of the dimensions for auxiliary craft
    pub mothership_mmsi: Option<u32>,
}

impl StaticDataReportB {
    /// Build the 168-bit payload.
    pub fn encode(&self) -> Result<BitVec, EncodeError> {
        if self.ship_type > 99 {
            return Err(EncodeError::field("ship_type", self.ship_type));
        }
        let mut bb = BitBuffer::new();
        bb.append_uint("message_type", 24, 6)?;
        bb.append_uint("repeat", self.repeat as u64, 2)?;
        bb.append_uint("mmsi", check_mmsi(self.mmsi)?, 30)?;
        bb.append_uint("part_number", 1, 2)?;
        bb.append_uint("ship_type", self.ship_type as u64, 8)?;
        bb.append_string("vendor_id", &self.vendor_id, 7)?;
        bb.append_string("call_sign", &self.call_sign, 7)?;
        match self.mothership_mmsi {
            Some(mothership) => {
                bb.append_uint("mothership_mmsi", check_mmsi(mothership)?, 30)?;
            }
            None => self.dimensions.append_to(&mut bb)?,
        }
        bb.append_uint("spare", 0, 6)?;
        Ok(bb.into_bits())
    }

    /// Decode a payload bit vector. Inverse of `encode`.
    pub fn decode(bv: &BitVec) -> Result<StaticDataReportB, ParseError> {
        if pick_u64(bv, 38, 2) != 1 {
            return Err(ParseError::InvalidSentence(
                "Not a type 24 part B payload".to_string(),
            ));
        }
        let mmsi = pick_u64(bv, 8, 30) as u32;
        let auxiliary_craft = (980_000_000..990_000_000).contains(&mmsi);
        Ok(StaticDataReportB {
            repeat: pick_u64(bv, 6, 2) as u8,
            mmsi,
            ship_type: pick_u64(bv, 40, 8) as u8,
            vendor_id: pick_string(bv, 48, 7),
            call_sign: pick_string(bv, 90, 7),
            dimensions: if auxiliary_craft {
                Dimensions::default()
            } else {
                Dimensions::pick(bv, 132)
            },
            mothership_mmsi: if auxiliary_craft {
                Some(pick_u64(bv, 132, 30) as u32)
            } else {
                None
            },
        })
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::bits::unarmor;
    use super::*;

    #[test]
    fn test_decode_part_a() {
        // Real-world sentence payload: !AIVDM,1,1,,A,H42O55i18tMET00000000000000,2*6D
        let bv = unarmor("H42O55i18tMET00000000000000", 2).unwrap();
        let report = StaticDataReportA::decode(&bv).unwrap();
        assert_eq!(report.mmsi, 271041815);
        assert_eq!(report.name, "PROGUY");
    }

    #[test]
    fn test_decode_part_b() {
        // Real-world sentence payload: !AIVDM,1,1,,A,H42O55lti4hhhilD3nink000?050,0*40
        let bv = unarmor("H42O55lti4hhhilD3nink000?050", 0).unwrap();
        let report = StaticDataReportB::decode(&bv).unwrap();
        assert_eq!(report.mmsi, 271041815);
        assert_eq!(report.ship_type, 60);
        assert_eq!(report.vendor_id, "1D00014");
        assert_eq!(report.call_sign, "TC6163");
        assert_eq!(
            report.dimensions,
            Dimensions {
                to_bow: 0,
                to_stern: 15,
                to_port: 0,
                to_starboard: 5,
            }
        );
        assert_eq!(report.mothership_mmsi, None);
    }

    #[test]
    fn test_round_trip_part_a() {
        let report = StaticDataReportA {
            repeat: 0,
            mmsi: 338123456,
            name: "SEA BREEZE".into(),
        };
        let bv = report.encode().unwrap();
        assert_eq!(bv.len(), 160);
        assert_eq!(StaticDataReportA::decode(&bv).unwrap(), report);
    }

    #[test]
    fn test_round_trip_part_b() {
        let report = StaticDataReportB {
            repeat: 0,
            mmsi: 338123456,
            ship_type: 37,
            vendor_id: "SRT".into(),
            call_sign: "WDL5678".into(),
            dimensions: Dimensions {
                to_bow: 8,
                to_stern: 4,
                to_port: 2,
                to_starboard: 2,
            },
            mothership_mmsi: None,
        };
        let bv = report.encode().unwrap();
        assert_eq!(bv.len(), 168);
        assert_eq!(StaticDataReportB::decode(&bv).unwrap(), report);
    }

    #[test]
    fn test_round_trip_auxiliary_craft() {
        let report = StaticDataReportB {
            repeat: 0,
            mmsi: 982_311_234,
            ship_type: 36,
            vendor_id: "SRT".into(),
            call_sign: "".into(),
            dimensions: Dimensions::default(),
            mothership_mmsi: Some(230_123_250),
        };
        let decoded = StaticDataReportB::decode(&report.encode().unwrap()).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn test_part_number_mismatch() {
        let bv = unarmor("H42O55i18tMET00000000000000", 2).unwrap();
        assert!(StaticDataReportB::decode(&bv).is_err());
    }
}
