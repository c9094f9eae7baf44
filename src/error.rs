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

/// Parse error returned by the sentence validation functions. The string is used instead of
/// static str because the error messages are expected to contain context-specific details.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
    /// Unsupported (or unimplemented) sentence type
    UnsupportedSentenceType(String),

    /// Checksum doesn't match
    CorruptedSentence(String),

    /// The sentence format isn't what expected
    InvalidSentence(String),

    /// A single field failed strict validation; carries the zero-based field index
    /// counted from the sentence header.
    InvalidField(usize, String),
}

impl From<String> for ParseError {
    fn from(s: String) -> Self {
        ParseError::InvalidSentence(s)
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::UnsupportedSentenceType(s) => write!(f, "{}", s),
            ParseError::CorruptedSentence(s) => write!(f, "{}", s),
            ParseError::InvalidSentence(s) => write!(f, "{}", s),
            ParseError::InvalidField(num, s) => write!(f, "Invalid field {}: {}", num, s),
        }
    }
}

impl std::error::Error for ParseError {}

// -------------------------------------------------------------------------------------------------

/// Encode error returned by the AIS message encoders when a field value doesn't fit its
/// bit field. The engine reports these and skips the offending emission.
#[derive(Clone, Debug, PartialEq)]
pub enum EncodeError {
    /// Field value outside the representable range of its bit field
    FieldOutOfRange(String),
}

impl EncodeError {
    /// Shorthand used by the encoders to report a named field and its offending value.
    pub(crate) fn field<T: core::fmt::Display>(name: &str, value: T) -> EncodeError {
        EncodeError::FieldOutOfRange(format!("Field {} out of range: {}", name, value))
    }
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EncodeError::FieldOutOfRange(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for EncodeError {}

// -------------------------------------------------------------------------------------------------

/// Configuration error, fatal at startup.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The configuration file couldn't be read
    Read(String),

    /// The configuration document couldn't be deserialized
    Parse(String),

    /// The configuration is well-formed but semantically invalid
    Invalid(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Read(s) => write!(f, "Failed to read configuration: {}", s),
            ConfigError::Parse(s) => write!(f, "Failed to parse configuration: {}", s),
            ConfigError::Invalid(s) => write!(f, "Invalid configuration: {}", s),
        }
    }
}

impl std::error::Error for ConfigError {}

// -------------------------------------------------------------------------------------------------

/// Output sink startup error. Runtime write failures stay inside the sink tasks; only
/// failures to bring a sink up at all (bind failure, missing device) surface through this
/// type and abort the run.
#[derive(Debug)]
pub enum SinkError {
    /// The sink couldn't be brought up at startup
    Startup(String),
}

impl core::fmt::Display for SinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SinkError::Startup(s) => write!(f, "Failed to start output: {}", s),
        }
    }
}

impl std::error::Error for SinkError {}
