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
use chrono::prelude::*;

use super::bits::{pick_i64, pick_u64, BitBuffer};
use super::*;
use crate::error::{EncodeError, ParseError};

/// AIS type 4: Base Station Report. 168 bits.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BaseStationReport {
    /// Repeat indicator (0-3)
    pub repeat: u8,

    /// User ID (30 bits)
    pub mmsi: u32,

    /// UTC timestamp of the report; `None` encodes the not-available defaults
    pub timestamp: Option<DateTime<Utc>>,

    /// Position accuracy: true = high (<= 10 m), false = low (> 10 m)
    pub high_position_accuracy: bool,

    /// Longitude in degrees
    pub longitude: Option<f64>,

    /// Latitude in degrees
    pub latitude: Option<f64>,

    /// Type of electronic position fixing device (4 bits; 0 = undefined)
    pub position_fix_type: u8,

    /// RAIM flag of the position fixing device
    pub raim_flag: bool,

    /// SOTDMA communication state (19 bits)
    pub radio_status: u32,
}

impl BaseStationReport {
    /// Build the 168-bit payload.
    pub fn encode(&self) -> Result<BitVec, EncodeError> {
        let (year, month, day, hour, minute, second) = match &self.timestamp {
            Some(t) => {
                if t.year() < 0 || t.year() > 9999 {
                    return Err(EncodeError::field("year", t.year()));
                }
                (
                    t.year() as u64,
                    t.month() as u64,
                    t.day() as u64,
                    t.hour() as u64,
                    t.minute() as u64,
                    t.second() as u64,
                )
            }
            None => (0, 0, 0, 24, 60, 60),
        };
        let mut bb = BitBuffer::new();
        bb.append_uint("message_type", 4, 6)?;
        bb.append_uint("repeat", self.repeat as u64, 2)?;
        bb.append_uint("mmsi", check_mmsi(self.mmsi)?, 30)?;
        bb.append_uint("year", year, 14)?;
        bb.append_uint("month", month, 4)?;
        bb.append_uint("day", day, 5)?;
        bb.append_uint("hour", hour, 5)?;
        bb.append_uint("minute", minute, 6)?;
        bb.append_uint("second", second, 6)?;
        bb.append_bool(self.high_position_accuracy);
        bb.append_int("longitude", encode_longitude(self.longitude)?, 28)?;
        bb.append_int("latitude", encode_latitude(self.latitude)?, 27)?;
        bb.append_uint("position_fix_type", self.position_fix_type as u64, 4)?;
        bb.append_uint("spare", 0, 10)?;
        bb.append_bool(self.raim_flag);
        bb.append_uint("radio_status", self.radio_status as u64, 19)?;
        Ok(bb.into_bits())
    }

    /// Decode a payload bit vector. Inverse of `encode`.
    pub fn decode(bv: &BitVec) -> Result<BaseStationReport, ParseError> {
        let year = pick_u64(bv, 38, 14) as i32;
        let month = pick_u64(bv, 52, 4) as u32;
        let day = pick_u64(bv, 56, 5) as u32;
        let hour = pick_u64(bv, 61, 5) as u32;
        let minute = pick_u64(bv, 66, 6) as u32;
        let second = pick_u64(bv, 72, 6) as u32;
        let timestamp = if year == 0 && month == 0 && day == 0 {
            None
        } else {
            match Utc
                .with_ymd_and_hms(year, month, day, hour, minute, second)
                .single()
            {
                Some(t) => Some(t),
                None => {
                    return Err(ParseError::InvalidSentence(format!(
                        "Failed to parse Utc Date from y:{} m:{} d:{} h:{} m:{} s:{}",
                        year, month, day, hour, minute, second
                    )));
                }
            }
        };
        Ok(BaseStationReport {
            repeat: pick_u64(bv, 6, 2) as u8,
            mmsi: pick_u64(bv, 8, 30) as u32,
            timestamp,
            high_position_accuracy: pick_u64(bv, 78, 1) != 0,
            longitude: decode_longitude(pick_i64(bv, 79, 28)),
            latitude: decode_latitude(pick_i64(bv, 107, 27)),
            position_fix_type: pick_u64(bv, 134, 4) as u8,
            raim_flag: pick_u64(bv, 148, 1) != 0,
            radio_status: pick_u64(bv, 149, 19) as u32,
        })
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::bits::unarmor;
    use super::*;

    #[test]
    fn test_decode_type4() {
        // Real-world sentence payload: !AIVDM,1,1,,A,403OviQuMGCqWrRO9>E6fE700@GO,0*4D
        let bv = unarmor("403OviQuMGCqWrRO9>E6fE700@GO", 0).unwrap();
        let report = BaseStationReport::decode(&bv).unwrap();
        assert_eq!(report.mmsi, 3669702);
        assert_eq!(
            report.timestamp,
            Utc.with_ymd_and_hms(2007, 5, 14, 19, 57, 39).single()
        );
        assert!(report.high_position_accuracy);
        assert::close(report.latitude.unwrap_or(0.0), 36.884, 0.001);
        assert::close(report.longitude.unwrap_or(0.0), -76.352, 0.001);
        assert_eq!(report.position_fix_type, 7);
        assert!(!report.raim_flag);
        assert_eq!(report.radio_status, 67039);
    }

    #[test]
    fn test_decode_invalid_utc() {
        // Month 15 on the wire
        let bv = unarmor("4028iqT47wP00wGiNbH8H0700`2H", 0).unwrap();
        assert!(BaseStationReport::decode(&bv).is_err());
    }

    #[test]
    fn test_round_trip() {
        let report = BaseStationReport {
            repeat: 0,
            mmsi: 2_311_234,
            timestamp: Utc.with_ymd_and_hms(2020, 8, 1, 4, 43, 57).single(),
            high_position_accuracy: true,
            longitude: Some(24.9384),
            latitude: Some(60.1699),
            position_fix_type: 7,
            raim_flag: false,
            radio_status: 0,
        };
        let bv = report.encode().unwrap();
        assert_eq!(bv.len(), 168);
        assert_eq!(BaseStationReport::decode(&bv).unwrap(), report);
    }

    #[test]
    fn test_round_trip_no_timestamp() {
        let report = BaseStationReport {
            mmsi: 2_311_234,
            ..Default::default()
        };
        let decoded = BaseStationReport::decode(&report.encode().unwrap()).unwrap();
        assert_eq!(decoded.timestamp, None);
    }
}
