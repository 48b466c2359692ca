// Raw metric models as returned by the monitoring query service
use serde::{Deserialize, Serialize};

/// A sample or last value: the service sends numbers for some items and text for others.
/// Any other JSON shape is kept as-is and coerces to zero.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SampleValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl SampleValue {
    /// Numeric coercion with a zero fallback. Text is read up to its longest
    /// float prefix; anything unparseable becomes `0.0`.
    pub fn coerce(&self) -> f64 {
        let value = match self {
            SampleValue::Number(n) => *n,
            SampleValue::Text(text) => parse_float_prefix(text).unwrap_or(0.0),
            SampleValue::Other(_) => 0.0,
        };
        if value.is_nan() { 0.0 } else { value }
    }
}

impl From<f64> for SampleValue {
    fn from(value: f64) -> Self {
        SampleValue::Number(value)
    }
}

impl From<&str> for SampleValue {
    fn from(value: &str) -> Self {
        SampleValue::Text(value.to_string())
    }
}

/// Coerce an optional value; a missing or null value coerces like bad text.
pub fn coerce(value: Option<&SampleValue>) -> f64 {
    value.map(SampleValue::coerce).unwrap_or(0.0)
}

fn parse_float_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |start: usize| bytes[start.min(bytes.len())..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if s[end..].starts_with("Infinity") {
        return Some(if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let int_digits = digits_from(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Item value kinds reported by the monitoring agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Float,
    Character,
    Log,
    Unsigned,
    Text,
}

impl ValueType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ValueType::Float),
            1 => Some(ValueType::Character),
            2 => Some(ValueType::Log),
            3 => Some(ValueType::Unsigned),
            4 => Some(ValueType::Text),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ValueType::Float => "float",
            ValueType::Character => "char",
            ValueType::Log => "log",
            ValueType::Unsigned => "uint",
            ValueType::Text => "text",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Float | ValueType::Unsigned)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawSample {
    pub timestamp: i64,
    #[serde(default)]
    pub value: Option<SampleValue>,
}

impl RawSample {
    pub fn new(timestamp: i64, value: impl Into<SampleValue>) -> Self {
        Self {
            timestamp,
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawMetric {
    #[serde(rename = "itemid", alias = "item_id")]
    pub item_id: String,
    pub name: String,
    #[serde(alias = "key_")]
    pub key: String,
    #[serde(default, alias = "lastValue", alias = "lastvalue")]
    pub last_value: Option<SampleValue>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub value_type: Option<u8>,
    /// Chronological, as returned by the service. A missing array deserializes as empty.
    #[serde(default, deserialize_with = "nullable_history")]
    pub history: Vec<RawSample>,
}

fn nullable_history<'de, D>(deserializer: D) -> Result<Vec<RawSample>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<RawSample>>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawMetric {
    pub fn new(item_id: impl Into<String>, name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            key: key.into(),
            last_value: None,
            units: None,
            value_type: None,
            history: Vec::new(),
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_last_value(mut self, value: impl Into<SampleValue>) -> Self {
        self.last_value = Some(value.into());
        self
    }

    pub fn with_history(mut self, history: Vec<RawSample>) -> Self {
        self.history = history;
        self
    }

    pub fn kind(&self) -> Option<ValueType> {
        self.value_type.and_then(ValueType::from_code)
    }
}

/// Body of the host metrics query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostMetrics {
    #[serde(default, rename = "hostid")]
    pub host_id: Option<String>,
    #[serde(default)]
    pub time_from: Option<i64>,
    #[serde(default)]
    pub time_to: Option<i64>,
    #[serde(default)]
    pub metrics: Vec<RawMetric>,
}
