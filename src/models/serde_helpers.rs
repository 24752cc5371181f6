//! Serde helpers for reading values saved by older front-ends
//!
//! Form inputs hand their values over as strings, so stored JSON may hold
//! `"size": "1000"` or `"removeBrand": "true"`. These accept both forms.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserializer, Unexpected};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(u64),
    Float(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    Text(String),
}

fn number_to_u32<E: de::Error>(value: NumberOrString) -> Result<u32, E> {
    match value {
        NumberOrString::Int(n) => {
            u32::try_from(n).map_err(|_| E::invalid_value(Unexpected::Unsigned(n), &"a u32"))
        }
        NumberOrString::Float(f) if f.is_finite() && f >= 0.0 && f <= u32::MAX as f64 => {
            Ok(f.round() as u32)
        }
        NumberOrString::Float(f) => Err(E::invalid_value(Unexpected::Float(f), &"a u32")),
        NumberOrString::Text(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<u32>()
                .ok()
                .or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u32::MAX as f64)
                        .map(|f| f.round() as u32)
                })
                .ok_or_else(|| E::invalid_value(Unexpected::Str(&s), &"a numeric string"))
        }
    }
}

fn text_to_bool<E: de::Error>(value: BoolOrString) -> Result<bool, E> {
    match value {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Text(s) => match s.trim() {
            "true" | "on" | "1" => Ok(true),
            "false" | "off" | "0" | "" => Ok(false),
            _ => Err(E::invalid_value(Unexpected::Str(&s), &"a boolean string")),
        },
    }
}

/// Deserialize a u32 from a number or a numeric string
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    number_to_u32(NumberOrString::deserialize(deserializer)?)
}

/// Deserialize a bool from a bool or "true"/"false"/"on"/"off"
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    text_to_bool(BoolOrString::deserialize(deserializer)?)
}

/// Deserialize a finite f64 from a number or a numeric string
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(n) => n as f64,
        NumberOrString::Float(f) => f,
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::invalid_value(Unexpected::Str(&s), &"a decimal number"))?,
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(de::Error::invalid_value(Unexpected::Float(value), &"a finite number"))
    }
}

/// Deserialize a UTC instant from RFC 3339 or a `datetime-local` value.
///
/// `2024-05-01T08:00` (optionally with seconds) carries no offset and is read
/// in the browser's local timezone.
pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_datetime(&text)
        .ok_or_else(|| de::Error::invalid_value(Unexpected::Str(&text), &"an RFC 3339 or local date-time"))
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .ok()?;
    // Skipped wall-clock times (DST gaps) have no local instant
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Optional variant of `lenient_u32` (null stays None)
pub fn lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<NumberOrString>::deserialize(deserializer)?
        .map(number_to_u32)
        .transpose()
}

/// Optional variant of `lenient_bool` (null stays None)
pub fn lenient_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<BoolOrString>::deserialize(deserializer)?
        .map(text_to_bool)
        .transpose()
}
