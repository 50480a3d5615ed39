//! Text to typed value conversion for cell contents.
//!
//! [`Scan`] is the plain-text conversion every scalar field goes through. Structured
//! (JSON) payloads go through `serde_json` instead.

use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use iso8601_duration::Duration as IsoDuration;
use serde::de::DeserializeOwned;
use std::any::type_name;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// How the text of a cell is decoded into its field.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Converted with [`Scan::scan`]
    #[default]
    Plain,
    /// Decoded as one JSON payload
    Json,
}

impl Encoding {
    /// Parses an encoding name ignoring case, so `JSON` is `json`; unknown names are `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "" | "plain" => Some(Self::Plain),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Json => "json",
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors converting cell text into a field value.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("parse '{value}' to {target} failed")]
    InvalidValue { value: String, target: &'static str },

    #[error("decode '{value}' as json {target} failed: {source}")]
    InvalidPayload {
        value: String,
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{target} does not support {encoding} encoding")]
    UnsupportedEncoding { target: &'static str, encoding: Encoding },

    #[error("{0}")]
    Custom(#[from] anyhow::Error),
}

/// Converts cell text into a value of `Self`.
///
/// Implemented for the integer and float primitives, `bool`, `char`, `String`, and the
/// chrono date, time, datetime and duration types. Dates and times accept ISO text as
/// well as spreadsheet serial numbers (1900 date system).
pub trait Scan: Sized {
    fn scan(text: &str) -> Result<Self, ScanError>;

    /// Decodes a JSON payload; types without a JSON form report unsupported.
    fn scan_structured(text: &str) -> Result<Self, ScanError> {
        let _ = text;
        Err(ScanError::UnsupportedEncoding {
            target: type_name::<Self>(),
            encoding: Encoding::Json,
        })
    }
}

pub(crate) fn invalid<T>(text: &str) -> ScanError {
    ScanError::InvalidValue {
        value: text.to_owned(),
        target: type_name::<T>(),
    }
}

/// Decodes `text` as one JSON payload.
pub fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, ScanError> {
    serde_json::from_str(text).map_err(|source| ScanError::InvalidPayload {
        value: text.to_owned(),
        target: type_name::<T>(),
        source,
    })
}

/// Integers also accept integral float text such as `3.0` or `1E3`.
fn scan_integer<T: FromStr + TryFrom<i128>>(text: &str) -> Result<T, ScanError> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<T>() {
        return Ok(value);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && value.fract() == 0.0 && value.abs() < 1e38)
        .and_then(|value| T::try_from(value as i128).ok())
        .ok_or_else(|| invalid::<T>(text))
}

macro_rules! scan_integers {
    ($($t:ty),*) => {
        $(
            impl Scan for $t {
                fn scan(text: &str) -> Result<Self, ScanError> {
                    scan_integer(text)
                }

                fn scan_structured(text: &str) -> Result<Self, ScanError> {
                    decode_json(text)
                }
            }
        )*
    };
}

scan_integers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! scan_floats {
    ($($t:ty),*) => {
        $(
            impl Scan for $t {
                fn scan(text: &str) -> Result<Self, ScanError> {
                    text.trim().parse::<$t>().map_err(|_| invalid::<$t>(text))
                }

                fn scan_structured(text: &str) -> Result<Self, ScanError> {
                    decode_json(text)
                }
            }
        )*
    };
}

scan_floats!(f32, f64);

impl Scan for bool {
    fn scan(text: &str) -> Result<Self, ScanError> {
        match text.trim() {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(invalid::<bool>(text)),
        }
    }

    fn scan_structured(text: &str) -> Result<Self, ScanError> {
        decode_json(text)
    }
}

impl Scan for char {
    fn scan(text: &str) -> Result<Self, ScanError> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(character), None) => Ok(character),
            _ => Err(invalid::<char>(text)),
        }
    }

    fn scan_structured(text: &str) -> Result<Self, ScanError> {
        decode_json(text)
    }
}

impl Scan for String {
    fn scan(text: &str) -> Result<Self, ScanError> {
        Ok(text.to_owned())
    }

    fn scan_structured(text: &str) -> Result<Self, ScanError> {
        decode_json(text)
    }
}

/// Converts a spreadsheet serial number (days since 1899-12-30) to a datetime.
/// Handles the Lotus 1-2-3 leap year bug: serials below 60 are shifted by one day.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    let days = days + if days < 60 { 1 } else { 0 };
    let milliseconds = (serial.fract() * 86_400_000f64).round() as i64;
    NaiveDate::from_ymd_opt(1899, 12, 30)?
        .checked_add_signed(Duration::try_days(days)?)?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::try_milliseconds(milliseconds)?)
}

fn scan_serial(text: &str) -> Option<NaiveDateTime> {
    text.trim().parse::<f64>().ok().and_then(serial_to_datetime)
}

impl Scan for NaiveDate {
    fn scan(text: &str) -> Result<Self, ScanError> {
        NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .ok()
            .or_else(|| scan_serial(text).map(|datetime| datetime.date()))
            .ok_or_else(|| invalid::<NaiveDate>(text))
    }

    fn scan_structured(text: &str) -> Result<Self, ScanError> {
        decode_json(text)
    }
}

impl Scan for NaiveDateTime {
    fn scan(text: &str) -> Result<Self, ScanError> {
        let trimmed = text.trim();
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .or_else(|| scan_serial(text))
            .ok_or_else(|| invalid::<NaiveDateTime>(text))
    }

    fn scan_structured(text: &str) -> Result<Self, ScanError> {
        decode_json(text)
    }
}

impl Scan for NaiveTime {
    fn scan(text: &str) -> Result<Self, ScanError> {
        let trimmed = text.trim();
        ["%H:%M:%S%.f", "%H:%M"]
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
            .or_else(|| scan_serial(text).map(|datetime| datetime.time()))
            .ok_or_else(|| invalid::<NaiveTime>(text))
    }

    fn scan_structured(text: &str) -> Result<Self, ScanError> {
        decode_json(text)
    }
}

/// ISO 8601 durations such as `PT1H30M` or `P2DT4H`. Year and month parts are rejected.
impl Scan for Duration {
    fn scan(text: &str) -> Result<Self, ScanError> {
        let duration = text
            .trim()
            .parse::<IsoDuration>()
            .map_err(|_| invalid::<Duration>(text))?;
        if duration.year != 0.0 || duration.month != 0.0 {
            return Err(invalid::<Duration>(text));
        }
        let seconds = duration.day as f64 * 86_400f64
            + duration.hour as f64 * 3_600f64
            + duration.minute as f64 * 60f64
            + duration.second as f64;
        Duration::try_milliseconds((seconds * 1_000f64).round() as i64).ok_or_else(|| invalid::<Duration>(text))
    }
}
