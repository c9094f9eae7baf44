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

/// RMC - recommended minimum specific GNSS data
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RmcData {
    /// Navigation system
    pub source: NavigationSystem,

    /// Date and UTC of position fix
    pub timestamp: Option<DateTime<Utc>>,

    /// Receiver status: true = active (A), false = void (V)
    pub status_active: Option<bool>,

    /// Latitude in degrees
    pub latitude: Option<f64>,

    /// Longitude in degrees
    pub longitude: Option<f64>,

    /// Speed over ground in knots
    pub sog_knots: Option<f64>,

    /// Course over ground in degrees true
    pub bearing: Option<f64>,

    /// Magnetic variation in degrees; negative values are westerly
    pub variation: Option<f64>,

    /// FAA mode indicator
    pub mode: Option<char>,
}

impl RmcData {
    /// Render the complete sentence including checksum and line terminator.
    pub fn format(&self) -> Result<String, EncodeError> {
        let time = self.timestamp.map(|t| nmea::format_hhmmss(&t)).unwrap_or_default();
        let date = self.timestamp.map(|t| nmea::format_ddmmyy(&t)).unwrap_or_default();
        let status = match self.status_active {
            Some(true) => "A",
            Some(false) => "V",
            None => "",
        };
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
        let (variation, variation_side) = match self.variation {
            Some(v) => (
                format!("{:.1}", v.abs()),
                if v < 0.0 { "W" } else { "E" }.to_string(),
            ),
            None => (String::new(), String::new()),
        };
        let body = format!(
            "${}RMC,{},{},{},{},{},{},{},{},{},{},{},{}",
            self.source.talker_id(),
            time,
            status,
            lat,
            ns,
            lon,
            ew,
            self.sog_knots.map(|v| format!("{:.1}", v)).unwrap_or_default(),
            self.bearing.map(|v| format!("{:.1}", v)).unwrap_or_default(),
            date,
            variation,
            variation_side,
            self.mode.map(String::from).unwrap_or_default(),
        );
        Ok(nmea::finish_sentence(&body))
    }

    /// Parse and strictly validate an RMC sentence.
    pub fn parse(sentence: &str) -> Result<RmcData, ParseError> {
        let (init, body) = nmea::verify(sentence)?;
        if init != '$' {
            return Err(ParseError::InvalidSentence(format!(
                "RMC sentence must start with '$': {}",
                sentence
            )));
        }
        let split: Vec<&str> = body.split(',').collect();
        let header = split[0];
        if header.len() != 5 || &header[2..] != "RMC" {
            return Err(ParseError::UnsupportedSentenceType(format!(
                "Unsupported sentence type: {}",
                header
            )));
        }
        let source = NavigationSystem::from_talker_id(&header[..2])?;
        Ok(RmcData {
            source,
            timestamp: {
                let date = split.get(9).unwrap_or(&"");
                let time = split.get(1).unwrap_or(&"");
                if date.is_empty() || time.is_empty() {
                    None
                } else {
                    Some(
                        nmea::parse_ddmmyy_hhmmss(date, time)
                            .map_err(|e| ParseError::InvalidField(9, e.to_string()))?,
                    )
                }
            },
            status_active: {
                let s = split.get(2).unwrap_or(&"");
                match *s {
                    "A" => Some(true),
                    "V" => Some(false),
                    "" => None,
                    _ => {
                        return Err(ParseError::InvalidField(
                            2,
                            format!("receiver status: {}", s),
                        ));
                    }
                }
            },
            latitude: nmea::parse_latitude_ddmm(
                split.get(3).unwrap_or(&""),
                split.get(4).unwrap_or(&""),
            )
            .map_err(|e| ParseError::InvalidField(3, e))?,
            longitude: nmea::parse_longitude_dddmm(
                split.get(5).unwrap_or(&""),
                split.get(6).unwrap_or(&""),
            )
            .map_err(|e| ParseError::InvalidField(5, e))?,
            sog_knots: pick_number_field(&split, 7)?,
            bearing: pick_number_field(&split, 8)?,
            variation: {
                if let Some(value) = pick_number_field::<f64>(&split, 10)? {
                    let side = split.get(11).unwrap_or(&"");
                    match *side {
                        "E" => Some(value),
                        "W" => Some(-value),
                        _ => {
                            return Err(ParseError::InvalidField(
                                11,
                                format!("variation side: {}", side),
                            ));
                        }
                    }
                } else {
                    None
                }
            },
            mode: split.get(12).and_then(|s| s.chars().next()),
        })
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_rmc() {
        let rmc = RmcData {
            source: NavigationSystem::Gps,
            timestamp: Some(
                Utc.with_ymd_and_hms(2020, 8, 1, 4, 43, 57).single().unwrap()
                    + chrono::Duration::milliseconds(944),
            ),
            status_active: Some(true),
            latitude: Some(37.8046517),
            longitude: Some(-122.4054417),
            sog_knots: Some(12.3),
            bearing: Some(90.0),
            variation: None,
            mode: Some('A'),
        };
        assert_eq!(
            rmc.format().unwrap(),
            "$GPRMC,044357.944,A,3748.2791,N,12224.3265,W,12.3,90.0,010820,,,A*76\r\n"
        );
    }

    #[test]
    fn test_parse_rmc() {
        let rmc = RmcData::parse(
            "$GPRMC,225446,A,4916.45,N,12311.12,W,000.5,054.7,191120,020.3,E*67",
        )
        .unwrap();
        assert_eq!(rmc.status_active, Some(true));
        assert_eq!(
            rmc.timestamp,
            Utc.with_ymd_and_hms(2020, 11, 19, 22, 54, 46).single()
        );
        assert_eq!(rmc.sog_knots, Some(0.5));
        assert::close(rmc.bearing.unwrap_or(0.0), 54.7, 0.1);
        assert_eq!(rmc.variation, Some(20.3));
    }

    #[test]
    fn test_parse_rmc_empty_fields() {
        let rmc = RmcData::parse("$GPRMC,225446,A,,,,,,,070809,,*23").unwrap();
        assert_eq!(rmc.status_active, Some(true));
        assert_eq!(
            rmc.timestamp,
            Utc.with_ymd_and_hms(2009, 8, 7, 22, 54, 46).single()
        );
        assert_eq!(rmc.latitude, None);
        assert_eq!(rmc.longitude, None);
        assert_eq!(rmc.sog_knots, None);
        assert_eq!(rmc.bearing, None);
        assert_eq!(rmc.variation, None);
    }

    #[test]
    fn test_format_parse_round_trip() {
        let rmc = RmcData {
            source: NavigationSystem::Gps,
            timestamp: Utc.with_ymd_and_hms(2020, 11, 19, 22, 54, 46).single(),
            status_active: Some(true),
            latitude: Some(49.274167),
            longitude: Some(-123.185333),
            sog_knots: Some(0.5),
            bearing: Some(54.7),
            variation: Some(-20.3),
            mode: Some('A'),
        };
        let parsed = RmcData::parse(&rmc.format().unwrap()).unwrap();
        assert_eq!(parsed.timestamp, rmc.timestamp);
        assert_eq!(parsed.status_active, rmc.status_active);
        assert::close(parsed.latitude.unwrap_or(0.0), 49.274167, 0.00001);
        assert::close(parsed.longitude.unwrap_or(0.0), -123.185333, 0.00001);
        assert_eq!(parsed.sog_knots, rmc.sog_knots);
        assert_eq!(parsed.variation, rmc.variation);
        assert_eq!(parsed.mode, rmc.mode);
    }

    #[test]
    fn test_parse_rmc_invalid_status() {
        assert_eq!(
            RmcData::parse(&crate::nmea::finish_sentence(
                "$GPRMC,225446,X,4916.45,N,12311.12,W,000.5,054.7,191120,020.3,E"
            )),
            Err(ParseError::InvalidField(2, "receiver status: X".into()))
        );
    }
}
