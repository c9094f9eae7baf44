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

//! Splitting of armored AIS payloads into AIVDM-sized fragments

use bitvec::prelude::*;

use super::bits::armor;
use crate::nmea::MAX_SENTENCE_LENGTH;

/// Character count of the AIVDM envelope around the payload, with every header field at
/// its widest: `!AIVDM,9,9,9,A,` before the payload and `,5*hh\r\n` after it.
const ENVELOPE_CHARS: usize = 22;

/// One AIVDM-sized piece of an armored payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    /// Total number of fragments of the message (1-9)
    pub fragment_count: u8,

    /// One-based index of this fragment
    pub fragment_number: u8,

    /// Group sequence ID shared by the fragments of a multi-part message; `None` for a
    /// single-fragment message
    pub group_id: Option<u8>,

    /// Radio channel, `A` or `B`
    pub channel: char,

    /// Armored payload characters of this fragment
    pub payload: String,

    /// Fill bits; non-zero only on the final fragment
    pub fill_bits: u8,
}

/// Splits armored payloads into fragments and allocates group sequence IDs. Group IDs are
/// allocated per radio channel from a monotonic counter modulo 10, so that the fragments
/// of concurrent messages on different channels can't collide.
#[derive(Clone, Debug)]
pub struct Fragmenter {
    max_payload_chars: usize,
    next_group_id: [u8; 2],
}

impl Default for Fragmenter {
    fn default() -> Fragmenter {
        Fragmenter::new()
    }
}

impl Fragmenter {
    /// Construct a fragmenter whose per-fragment payload limit is derived from the NMEA
    /// sentence length limit and the worst-case AIVDM envelope.
    pub fn new() -> Fragmenter {
        Fragmenter::with_limit(MAX_SENTENCE_LENGTH - ENVELOPE_CHARS)
    }

    /// Construct a fragmenter with an explicit per-fragment payload character limit.
    pub fn with_limit(max_payload_chars: usize) -> Fragmenter {
        Fragmenter {
            max_payload_chars,
            next_group_id: [0, 0],
        }
    }

    /// Per-fragment payload character limit.
    pub fn max_payload_chars(&self) -> usize {
        self.max_payload_chars
    }

    /// Armor a payload bit vector and split it into fragments for the given channel.
    pub fn fragment(&mut self, bits: &BitSlice, channel: char) -> Vec<Fragment> {
        let (payload, fill) = armor(bits);
        if payload.len() <= self.max_payload_chars {
            return vec![Fragment {
                fragment_count: 1,
                fragment_number: 1,
                group_id: None,
                channel,
                payload,
                fill_bits: fill,
            }];
        }

        let group_id = self.allocate_group_id(channel);
        let chunks: Vec<&str> = payload
            .as_bytes()
            .chunks(self.max_payload_chars)
            .map(|c| core::str::from_utf8(c).unwrap_or(""))
            .collect();
        let count = chunks.len();
        if count > 9 {
            warn!(
                "AIS message needs {} fragments which exceeds the single digit field",
                count
            );
        }
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| Fragment {
                fragment_count: count as u8,
                fragment_number: (i + 1) as u8,
                group_id: Some(group_id),
                channel,
                payload: (*chunk).to_string(),
                // Earlier fragment lengths are multiples of six bits by construction
                fill_bits: if i + 1 == count { fill } else { 0 },
            })
            .collect()
    }

    fn allocate_group_id(&mut self, channel: char) -> u8 {
        let slot = if channel == 'B' { 1 } else { 0 };
        let group_id = self.next_group_id[slot];
        self.next_group_id[slot] = (group_id + 1) % 10;
        group_id
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::super::bits::unarmor;
    use super::super::{Dimensions, EtaDate, StaticAndVoyageData};
    use super::*;

    fn type5_payload() -> BitVec {
        StaticAndVoyageData {
            mmsi: 367001234,
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
            ..Default::default()
        }
        .encode()
        .unwrap()
    }

    #[test]
    fn test_limit_derived_from_envelope() {
        assert_eq!(Fragmenter::new().max_payload_chars(), 60);
    }

    #[test]
    fn test_single_fragment() {
        let mut fragmenter = Fragmenter::new();
        let bits = bitvec![0; 168];
        let fragments = fragmenter.fragment(&bits, 'A');
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].fragment_count, 1);
        assert_eq!(fragments[0].fragment_number, 1);
        assert_eq!(fragments[0].group_id, None);
        assert_eq!(fragments[0].payload.len(), 28);
        assert_eq!(fragments[0].fill_bits, 0);
    }

    #[test]
    fn test_two_fragments() {
        let mut fragmenter = Fragmenter::new();
        let bits = type5_payload();
        assert_eq!(bits.len(), 424);

        let fragments = fragmenter.fragment(&bits, 'A');
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].fragment_count, 2);
        assert_eq!(fragments[0].fragment_number, 1);
        assert_eq!(fragments[1].fragment_count, 2);
        assert_eq!(fragments[1].fragment_number, 2);
        assert_eq!(fragments[0].payload.len(), 60);
        assert_eq!(fragments[1].payload.len(), 11);
        assert_eq!(fragments[0].fill_bits, 0);
        assert_eq!(fragments[1].fill_bits, 2);

        // Both fragments share one group sequence ID in 0..10
        let group_id = fragments[0].group_id.unwrap();
        assert!(group_id < 10);
        assert_eq!(fragments[1].group_id, Some(group_id));

        // Payload bit count bookkeeping: 60*6 + (11*6 - 2) = 424
        assert_eq!(
            fragments[0].payload.len() * 6 + fragments[1].payload.len() * 6
                - fragments[1].fill_bits as usize,
            424
        );

        // Concatenating the payloads in index order and dropping the final fill bits
        // reproduces the original bit vector
        let combined = format!("{}{}", fragments[0].payload, fragments[1].payload);
        assert_eq!(unarmor(&combined, fragments[1].fill_bits).unwrap(), bits);
    }

    #[test]
    fn test_group_id_allocation() {
        let mut fragmenter = Fragmenter::new();
        let bits = type5_payload();

        // Group IDs increment per channel and wrap modulo 10
        for expected in 0..10u8 {
            let fragments = fragmenter.fragment(&bits, 'A');
            assert_eq!(fragments[0].group_id, Some(expected));
        }
        let fragments = fragmenter.fragment(&bits, 'A');
        assert_eq!(fragments[0].group_id, Some(0));

        // Channel B has an independent counter
        let fragments = fragmenter.fragment(&bits, 'B');
        assert_eq!(fragments[0].group_id, Some(0));
    }
}
