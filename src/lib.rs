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

//! # NMEA Simulator: NMEA 0183 and AIS sentence generator for Rust
//!
//! This crate simulates a population of vessels, base stations and aids to navigation
//! and synthesizes the NMEA 0183 sentence stream the corresponding real-world equipment
//! would produce: GGA and RMC sentences at configured GPS cadences and `!AIVDM` AIS
//! reports (types 1-3, 4, 5, 18, 19, 21 and 24) at the ITU-R M.1371 derived reporting
//! intervals. The produced stream is fanned out to file, TCP server, UDP and serial
//! sinks.
//!
//! The AIS payloads are assembled bit-exactly and armored to the 6-bit payload alphabet;
//! every emitted sentence carries a valid checksum and fits the NMEA length limit.
//! Decoders for the generated message types are included for validation and round-trip
//! testing.

#![allow(dead_code)]

#[macro_use]
extern crate log;

pub use chrono;

pub mod ais;
pub mod config;
mod error;
pub mod gnss;
pub mod nmea;
pub mod output;
pub mod sim;

pub use error::{ConfigError, EncodeError, ParseError, SinkError};

// -------------------------------------------------------------------------------------------------
