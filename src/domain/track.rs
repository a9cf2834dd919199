use std::fmt::Display;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());
static FLOAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d*\.\d+$").unwrap());
static DURATION_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(ms|mn|min|h|s)\b").unwrap());

/// Lowercases a raw field name and replaces `.` with `_`
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase().replace('.', "_")
}

/// Typed view over a raw attribute text
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if INTEGER.is_match(trimmed) {
            if let Ok(i) = trimmed.parse() {
                return Self::Integer(i);
            }
        }
        if FLOAT.is_match(trimmed) {
            if let Ok(f) = trimmed.parse() {
                return Self::Float(f);
            }
        }
        Self::Text(raw.to_string())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) => None,
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Represent one metadata track of an analyzed media (General, Video, Audio...)
///
/// The attribute set is whatever fields the XML element carried, in document order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Track {
    #[serde(rename = "type")]
    kind: String,
    attributes: IndexMap<String, String>,
}

impl Track {
    pub(crate) fn new(kind: &str) -> Self {
        Self {
            kind: kind.trim().to_lowercase(),
            attributes: IndexMap::new(),
        }
    }

    /// Adds a field under its normalized name.
    ///
    /// A name that is already present keeps its position and takes the new value.
    /// Returns the replaced value, if any.
    pub(crate) fn insert(&mut self, raw_name: &str, value: &str) -> Option<String> {
        self.attributes.insert(normalize_name(raw_name), value.to_string())
    }

    /// `type` attribute of the track element, lowercased; empty when absent
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Raw text of a field. `name` may be given raw (`Codec.ID`) or normalized (`codec_id`).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn value(&self, name: &str) -> Option<AttributeValue> {
        self.get(name).map(AttributeValue::infer)
    }

    /// Reads a duration field as milliseconds.
    ///
    /// Understands integer milliseconds (`1500`), fractional seconds (`1.500`)
    /// and the human form of older releases (`1mn 30s`, `1 h 2 min 3 s 40 ms`).
    pub fn duration_ms(&self, name: &str) -> Option<u64> {
        parse_duration_ms(self.get(name)?)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

fn parse_duration_ms(raw: &str) -> Option<u64> {
    match AttributeValue::infer(raw) {
        AttributeValue::Integer(ms) => u64::try_from(ms).ok(),
        AttributeValue::Float(secs) if secs >= 0.0 => Some((secs * 1000.0).round() as u64),
        AttributeValue::Float(_) => None,
        AttributeValue::Text(text) => {
            let mut total = 0u64;
            let mut matched = false;
            for caps in DURATION_PART.captures_iter(&text) {
                let amount: u64 = caps[1].parse().ok()?;
                let unit_ms = match &caps[2] {
                    "h" => 3_600_000,
                    "mn" | "min" => 60_000,
                    "s" => 1_000,
                    _ => 1,
                };
                total = total.checked_add(amount.checked_mul(unit_ms)?)?;
                matched = true;
            }
            matched.then_some(total)
        }
    }
}
