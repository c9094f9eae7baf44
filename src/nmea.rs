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

//! NMEA 0183 sentence framing, field formatting and the AIVDM encapsulation

use chrono::prelude::*;

use crate::ais::fragment::Fragment;
use crate::error::{EncodeError, ParseError};

/// Maximum sentence length in characters, including the framing character, the checksum
/// and the line terminator.
pub const MAX_SENTENCE_LENGTH: usize = 82;

/// Calculate the NMEA checksum: XOR of all bytes strictly between the framing character
/// and the `*`.
pub fn checksum(body: &str) -> u8 {
    let mut checksum = 0;
    for c in body.chars().skip(1) {
        checksum ^= c as u8;
    }
    checksum
}

/// Append the checksum and line terminator to a sentence body. The body is expected to
/// start with `$` or `!` and contain no checksum part yet.
pub fn finish_sentence(body: &str) -> String {
    format!("{}*{:02X}\r\n", body, checksum(body))
}

/// Validate framing, length and checksum of a complete sentence. Returns the framing
/// character and the sentence body between it and the `*`.
pub fn verify(sentence: &str) -> Result<(char, &str), ParseError> {
    let trimmed = sentence.trim_end_matches(|c| c == '\r' || c == '\n');
    if trimmed.len() + 2 > MAX_SENTENCE_LENGTH {
        return Err(ParseError::InvalidSentence(format!(
            "Sentence exceeds {} characters: {}",
            MAX_SENTENCE_LENGTH,
            trimmed.len() + 2
        )));
    }
    let init = match trimmed.chars().next() {
        Some(c @ ('$' | '!')) => c,
        _ => {
            return Err(ParseError::InvalidSentence(format!(
                "Missing framing character: {}",
                trimmed
            )));
        }
    };
    if !trimmed.is_ascii() {
        return Err(ParseError::InvalidSentence(format!(
            "Sentence contains non-ASCII bytes: {}",
            trimmed
        )));
    }
    let star = match trimmed.rfind('*') {
        Some(pos) if pos + 3 == trimmed.len() => pos,
        _ => {
            return Err(ParseError::InvalidSentence(format!(
                "Missing checksum part: {}",
                trimmed
            )));
        }
    };
    let body = &trimmed[..star];
    let given = &trimmed[star + 1..];
    let calculated = format!("{:02X}", checksum(body));
    if calculated != given.to_ascii_uppercase() {
        return Err(ParseError::CorruptedSentence(format!(
            "Corrupted NMEA sentence: {} != {}",
            calculated, given
        )));
    }
    Ok((init, &body[1..]))
}

// -------------------------------------------------------------------------------------------------

/// Format latitude as `ddmm.mmmm` with four fractional digits, returning the field and
/// the hemisphere character.
pub fn format_latitude(latitude: f64) -> Result<(String, char), EncodeError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(EncodeError::field("latitude", latitude));
    }
    let hemisphere = if latitude < 0.0 { 'S' } else { 'N' };
    let (degrees, minutes10k) = split_degrees(latitude.abs());
    Ok((
        format!(
            "{:02}{:02}.{:04}",
            degrees,
            minutes10k / 10_000,
            minutes10k % 10_000
        ),
        hemisphere,
    ))
}

/// Format longitude as `dddmm.mmmm` with four fractional digits, returning the field and
/// the hemisphere character.
pub fn format_longitude(longitude: f64) -> Result<(String, char), EncodeError> {
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(EncodeError::field("longitude", longitude));
    }
    let hemisphere = if longitude < 0.0 { 'W' } else { 'E' };
    let (degrees, minutes10k) = split_degrees(longitude.abs());
    Ok((
        format!(
            "{:03}{:02}.{:04}",
            degrees,
            minutes10k / 10_000,
            minutes10k % 10_000
        ),
        hemisphere,
    ))
}

/// Split absolute degrees into whole degrees and minutes in 1/10000 minute, carrying a
/// rounded-up 60.0000 into the degree part.
fn split_degrees(absolute: f64) -> (u32, u32) {
    let mut degrees = absolute.trunc() as u32;
    let mut minutes10k = ((absolute - degrees as f64) * 60.0 * 10_000.0).round() as u32;
    if minutes10k >= 600_000 {
        minutes10k -= 600_000;
        degrees += 1;
    }
    (degrees, minutes10k)
}

/// Format a UTC time of day as `HHMMSS.sss`.
pub fn format_hhmmss(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%H%M%S%.3f").to_string()
}

/// Format a UTC date as `DDMMYY`.
pub fn format_ddmmyy(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%d%m%y").to_string()
}

// -------------------------------------------------------------------------------------------------

/// Parse latitude of format DDMM.MMMM with its hemisphere field.
pub(crate) fn parse_latitude_ddmm(
    lat_string: &str,
    hemisphere: &str,
) -> Result<Option<f64>, String> {
    if lat_string.is_empty() {
        return Ok(None);
    }
    let bytes = lat_string.as_bytes();
    if !(bytes.iter().take(4).all(|c| c.is_ascii_digit())
        && bytes.get(4) == Some(&b'.')
        && bytes.get(5).map(|c| c.is_ascii_digit()).unwrap_or(false))
    {
        return Err(format!(
            "Failed to parse latitude (DDMM.MMMM) from {}",
            lat_string
        ));
    }
    let degrees = lat_string[0..2].parse::<f64>().unwrap_or(0.0);
    let minutes = lat_string[2..].parse::<f64>().unwrap_or(0.0);
    let value = degrees + minutes / 60.0;
    Ok(Some(match hemisphere {
        "S" => -value,
        _ => value,
    }))
}

/// Parse longitude of format DDDMM.MMMM with its hemisphere field.
pub(crate) fn parse_longitude_dddmm(
    lon_string: &str,
    hemisphere: &str,
) -> Result<Option<f64>, String> {
    if lon_string.is_empty() {
        return Ok(None);
    }
    let bytes = lon_string.as_bytes();
    if !(bytes.iter().take(5).all(|c| c.is_ascii_digit())
        && bytes.get(5) == Some(&b'.')
        && bytes.get(6).map(|c| c.is_ascii_digit()).unwrap_or(false))
    {
        return Err(format!(
            "Failed to parse longitude (DDDMM.MMMM) from {}",
            lon_string
        ));
    }
    let degrees = lon_string[0..3].parse::<f64>().unwrap_or(0.0);
    let minutes = lon_string[3..].parse::<f64>().unwrap_or(0.0);
    let value = degrees + minutes / 60.0;
    Ok(Some(match hemisphere {
        "W" => -value,
        _ => value,
    }))
}

/// Parse a time field of format HHMMSS.sss using the date part of the given timestamp.
pub(crate) fn parse_hhmmss(
    hhmmss: &str,
    date: DateTime<Utc>,
) -> Result<DateTime<Utc>, ParseError> {
    let (hour, minute, second, nano) = parse_time_with_fractions(hhmmss)
        .map_err(|_| format!("Invalid time format: {}", hhmmss))?;
    parse_valid_utc(date.year(), date.month(), date.day(), hour, minute, second, nano)
}

/// Parse date (DDMMYY) and time (HHMMSS.sss) fields into a single timestamp.
pub(crate) fn parse_ddmmyy_hhmmss(
    ddmmyy: &str,
    hhmmss: &str,
) -> Result<DateTime<Utc>, ParseError> {
    let century = 2000;
    let (day, month, year) =
        parse_date(ddmmyy).map_err(|_| format!("Invalid date format: {}", ddmmyy))?;
    let (hour, minute, second, nano) = parse_time_with_fractions(hhmmss)
        .map_err(|_| format!("Invalid time format: {}", hhmmss))?;
    parse_valid_utc(century + year, month, day, hour, minute, second, nano)
}

/// Parse day, month and year from a DDMMYY string.
fn parse_date(ddmmyy: &str) -> Result<(u32, u32, i32), ParseError> {
    let day = pick_s2(ddmmyy, 0).parse::<u32>()?;
    let month = pick_s2(ddmmyy, 2).parse::<u32>()?;
    let year = pick_s2(ddmmyy, 4).parse::<i32>()?;
    Ok((day, month, year))
}

/// Parse hour, minute, second and nanoseconds from a HHMMSS.sss string.
fn parse_time_with_fractions(hhmmss: &str) -> Result<(u32, u32, u32, u32), ParseError> {
    let hour = pick_s2(hhmmss, 0).parse::<u32>()?;
    let minute = pick_s2(hhmmss, 2).parse::<u32>()?;
    let second = pick_s2(hhmmss, 4).parse::<u32>()?;
    let nano = {
        let nano_str = hhmmss.get(6..).unwrap_or(".0");
        if !nano_str.is_empty() {
            (nano_str.parse::<f64>()? * 1_000_000_000.0).round() as u32
        } else {
            0
        }
    };
    Ok((hour, minute, second, nano))
}

impl From<core::num::ParseIntError> for ParseError {
    fn from(e: core::num::ParseIntError) -> Self {
        ParseError::InvalidSentence(e.to_string())
    }
}

impl From<core::num::ParseFloatError> for ParseError {
    fn from(e: core::num::ParseFloatError) -> Self {
        ParseError::InvalidSentence(e.to_string())
    }
}

/// Construct a `DateTime<Utc>`, catching invalid dates (e.g. month > 12).
pub(crate) fn parse_valid_utc(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    min: u32,
    sec: u32,
    nano: u32,
) -> Result<DateTime<Utc>, ParseError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_nano_opt(hour, min, sec, nano))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| {
            ParseError::InvalidSentence(format!(
                "Failed to parse Utc Date from y:{} m:{} d:{} h:{} m:{} s:{}",
                year, month, day, hour, min, sec
            ))
        })
}

/// A simple helper to pick a substring of length two from the given string.
fn pick_s2(s: &str, i: usize) -> &str {
    s.get(i..i + 2).unwrap_or("")
}

// -------------------------------------------------------------------------------------------------

/// AIVDM encapsulation sentence:
/// `!AIVDM,<count>,<index>,<group_id_or_empty>,<channel>,<payload>,<fill>*<cs>`.
#[derive(Clone, Debug, PartialEq)]
pub struct AivdmSentence {
    /// Total number of fragments of the message (1-9)
    pub fragment_count: u8,

    /// One-based index of this fragment
    pub fragment_number: u8,

    /// Group sequence ID tying multi-part fragments together
    pub group_id: Option<u8>,

    /// Radio channel, `A` or `B`
    pub channel: char,

    /// Armored payload characters
    pub payload: String,

    /// Fill bits appended to the final fragment
    pub fill_bits: u8,
}

impl From<Fragment> for AivdmSentence {
    fn from(fragment: Fragment) -> Self {
        AivdmSentence {
            fragment_count: fragment.fragment_count,
            fragment_number: fragment.fragment_number,
            group_id: fragment.group_id,
            channel: fragment.channel,
            payload: fragment.payload,
            fill_bits: fragment.fill_bits,
        }
    }
}

impl AivdmSentence {
    /// Render the complete sentence including checksum and line terminator.
    pub fn format(&self) -> String {
        let group = match self.group_id {
            Some(id) => id.to_string(),
            None => String::new(),
        };
        let body = format!(
            "!AIVDM,{},{},{},{},{},{}",
            self.fragment_count,
            self.fragment_number,
            group,
            self.channel,
            self.payload,
            self.fill_bits
        );
        finish_sentence(&body)
    }

    /// Parse and strictly validate an AIVDM sentence.
    pub fn parse(sentence: &str) -> Result<AivdmSentence, ParseError> {
        let (init, body) = verify(sentence)?;
        if init != '!' {
            return Err(ParseError::InvalidSentence(format!(
                "AIVDM sentence must start with '!': {}",
                sentence
            )));
        }
        let split: Vec<&str> = body.split(',').collect();
        if split.len() != 7 {
            return Err(ParseError::InvalidSentence(format!(
                "Expected 7 AIVDM fields, got {}",
                split.len()
            )));
        }
        if split[0] != "AIVDM" {
            return Err(ParseError::UnsupportedSentenceType(format!(
                "Unsupported sentence type: {}",
                split[0]
            )));
        }
        let fragment_count = split[1]
            .parse::<u8>()
            .ok()
            .filter(|n| (1..=9).contains(n))
            .ok_or_else(|| ParseError::InvalidField(1, format!("fragment count: {}", split[1])))?;
        let fragment_number = split[2]
            .parse::<u8>()
            .ok()
            .filter(|n| (1..=fragment_count).contains(n))
            .ok_or_else(|| ParseError::InvalidField(2, format!("fragment number: {}", split[2])))?;
        let group_id = if split[3].is_empty() {
            None
        } else {
            Some(
                split[3]
                    .parse::<u8>()
                    .ok()
                    .filter(|id| *id < 10)
                    .ok_or_else(|| {
                        ParseError::InvalidField(3, format!("group sequence id: {}", split[3]))
                    })?,
            )
        };
        let channel = match split[4] {
            "A" => 'A',
            "B" => 'B',
            other => {
                return Err(ParseError::InvalidField(4, format!("channel: {}", other)));
            }
        };
        let payload = split[5];
        if payload.is_empty() {
            return Err(ParseError::InvalidField(5, "empty payload".to_string()));
        }
        let fill_bits = split[6]
            .parse::<u8>()
            .ok()
            .filter(|f| *f < 6)
            .ok_or_else(|| ParseError::InvalidField(6, format!("fill bits: {}", split[6])))?;
        Ok(AivdmSentence {
            fragment_count,
            fragment_number,
            group_id,
            channel,
            payload: payload.to_string(),
            fill_bits,
        })
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_checksum() {
        assert_eq!(
            checksum("$GPGGA,044357.944,3748.2791,N,12224.3265,W,1,08,1.2,0.0,M,19.6,M,,"),
            0x43
        );
    }

    #[test]
    fn test_finish_sentence() {
        let sentence = finish_sentence("!AIVDM,1,1,,A,15MwvTP01so?d`0E`Ah3Q2lt0000,0");
        assert_eq!(sentence, "!AIVDM,1,1,,A,15MwvTP01so?d`0E`Ah3Q2lt0000,0*38\r\n");
        assert!(sentence.len() <= MAX_SENTENCE_LENGTH);
    }

    #[test]
    fn test_verify() {
        let (init, body) = verify("!AIVDM,1,1,,A,15MwvTP01so?d`0E`Ah3Q2lt0000,0*38\r\n").unwrap();
        assert_eq!(init, '!');
        assert_eq!(body, "AIVDM,1,1,,A,15MwvTP01so?d`0E`Ah3Q2lt0000,0");

        // Mismatching checksum
        assert!(matches!(
            verify("!AIVDM,1,1,,A,38Id705000rRVJhE7cl9n;160000,0*41"),
            Err(ParseError::CorruptedSentence(_))
        ));

        // Missing checksum part
        assert!(verify("!AIVDM,1,1,,A,38Id705000rRVJhE7cl9n;160000,0").is_err());

        // Missing framing character
        assert!(verify("AIVDM,1,1,,A,38Id705000rRVJhE7cl9n;160000,0*41").is_err());
    }

    #[test]
    fn test_format_latitude() {
        assert_eq!(format_latitude(37.8046517).unwrap(), ("3748.2791".to_string(), 'N'));
        assert_eq!(format_latitude(-37.8046517).unwrap(), ("3748.2791".to_string(), 'S'));
        assert_eq!(format_latitude(0.0).unwrap(), ("0000.0000".to_string(), 'N'));
        assert!(format_latitude(90.1).is_err());

        // Rounded minutes carry into the degree part
        assert_eq!(format_latitude(45.9999999).unwrap(), ("4600.0000".to_string(), 'N'));
    }

    #[test]
    fn test_format_longitude() {
        assert_eq!(
            format_longitude(-122.4054417).unwrap(),
            ("12224.3265".to_string(), 'W')
        );
        assert_eq!(format_longitude(24.9384).unwrap(), ("02456.3040".to_string(), 'E'));
        assert!(format_longitude(180.5).is_err());
    }

    #[test]
    fn test_format_time_and_date() {
        let t = Utc
            .with_ymd_and_hms(2020, 8, 1, 4, 43, 57)
            .single()
            .unwrap()
            + chrono::Duration::milliseconds(944);
        assert_eq!(format_hhmmss(&t), "044357.944");
        assert_eq!(format_ddmmyy(&t), "010820");
    }

    #[test]
    fn test_parse_latitude_ddmm() {
        assert::close(
            parse_latitude_ddmm("4807.038", "N").unwrap().unwrap(),
            48.117,
            0.001,
        );
        assert::close(
            parse_latitude_ddmm("4807.038", "S").unwrap().unwrap(),
            -48.117,
            0.001,
        );
        assert_eq!(parse_latitude_ddmm("", "N").unwrap(), None);
        assert!(parse_latitude_ddmm("ABCD.0", "N").is_err());
    }

    #[test]
    fn test_parse_longitude_dddmm() {
        assert::close(
            parse_longitude_dddmm("01131.000", "E").unwrap().unwrap(),
            11.517,
            0.001,
        );
        assert::close(
            parse_longitude_dddmm("12224.3265", "W").unwrap().unwrap(),
            -122.4054,
            0.0001,
        );
        assert_eq!(parse_longitude_dddmm("", "E").unwrap(), None);
        assert!(parse_longitude_dddmm("1131.000", "E").is_err());
    }

    #[test]
    fn test_aivdm_format() {
        let sentence = AivdmSentence {
            fragment_count: 1,
            fragment_number: 1,
            group_id: None,
            channel: 'A',
            payload: "15MwvTP01so?d`0E`Ah3Q2lt0000".to_string(),
            fill_bits: 0,
        };
        assert_eq!(
            sentence.format(),
            "!AIVDM,1,1,,A,15MwvTP01so?d`0E`Ah3Q2lt0000,0*38\r\n"
        );
    }

    #[test]
    fn test_aivdm_parse() {
        let sentence =
            AivdmSentence::parse("!AIVDM,2,1,5,B,E1mg=5J1T4W0h97aRh6ba84<h2d;W:Te=eLvH50```q,0*46")
                .unwrap();
        assert_eq!(sentence.fragment_count, 2);
        assert_eq!(sentence.fragment_number, 1);
        assert_eq!(sentence.group_id, Some(5));
        assert_eq!(sentence.channel, 'B');
        assert_eq!(sentence.fill_bits, 0);
    }

    #[test]
    fn test_aivdm_round_trip() {
        let sentence = AivdmSentence {
            fragment_count: 2,
            fragment_number: 2,
            group_id: Some(7),
            channel: 'B',
            payload: "88888888880".to_string(),
            fill_bits: 2,
        };
        assert_eq!(AivdmSentence::parse(&sentence.format()).unwrap(), sentence);
    }

    #[test]
    fn test_aivdm_parse_reports_field_index() {
        // The channel field is the fourth comma-separated field
        let body = "!AIVDM,1,1,,X,15MwvTP01so?d`0E`Ah3Q2lt0000,0";
        match AivdmSentence::parse(&finish_sentence(body)) {
            Err(ParseError::InvalidField(index, _)) => assert_eq!(index, 4),
            other => panic!("Expected channel field error, got {:?}", other),
        }

        let body = "!AIVDM,1,1,,A,15MwvTP01so?d`0E`Ah3Q2lt0000,6";
        match AivdmSentence::parse(&finish_sentence(body)) {
            Err(ParseError::InvalidField(index, _)) => assert_eq!(index, 6),
            other => panic!("Expected fill bits field error, got {:?}", other),
        }
    }
}
