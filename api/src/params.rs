//! Request parameters: loose caller input, validated values and the
//! normalizer that turns them into query-string pairs.
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};

/// A caller-supplied value before validation.
///
/// Enum instances become [`Value::Choice`] through their `From` impls, so a
/// field taking an enumeration accepts either a raw wire string or an instance
/// of that exact enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Date(NaiveDate),
    Time(DateTime<FixedOffset>),
    Choice {
        kind: &'static str,
        wire: &'static str,
    },
}

impl Value {
    /// Name of the value's type, as used in argument errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Decimal(_) => "decimal",
            Value::Date(_) => "date",
            Value::Time(_) => "timestamp",
            Value::Choice { kind, .. } => *kind,
        }
    }

    /// Best-effort typing of free text: `true`/`false`, integers and decimals
    /// are recognised, anything else stays text.
    pub fn infer(raw: &str) -> Self {
        match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => {
                if let Ok(int) = raw.parse::<i64>() {
                    Value::Int(int)
                } else if let Ok(decimal) = raw.parse::<f64>()
                    && decimal.is_finite()
                {
                    Value::Decimal(decimal)
                } else {
                    Value::Text(raw.to_owned())
                }
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Value::Decimal(value as f64), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Decimal(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::Time(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Time(value.fixed_offset())
    }
}

/// Caller-supplied values keyed by field name, before validation.
///
/// Only keys that were explicitly set are ever validated or sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values(Vec<(String, Value)>);

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an earlier value for the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

/// A value that passed validation and has its final wire type.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    Bool(bool),
    Int(i64),
    /// Already rounded to one fraction digit.
    Decimal(f64),
    Date(NaiveDate),
    Time(DateTime<FixedOffset>),
    /// Wire string of an enumeration member.
    Choice(&'static str),
}

impl Param {
    pub fn to_wire(&self) -> String {
        match self {
            Param::Text(text) => text.clone(),
            Param::Bool(flag) => flag.to_string(),
            Param::Int(int) => int.to_string(),
            Param::Decimal(decimal) => format!("{decimal:.1}"),
            Param::Date(date) => date.format("%Y-%m-%d").to_string(),
            Param::Time(time) => time.to_rfc3339_opts(SecondsFormat::Secs, false),
            Param::Choice(wire) => (*wire).to_owned(),
        }
    }
}

/// Validated parameters in insertion order, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(&'static str, Param)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `field`.
    pub fn insert(&mut self, field: &'static str, param: Param) {
        match self.0.iter_mut().find(|(key, _)| *key == field) {
            Some(slot) => slot.1 = param,
            None => self.0.push((field, param)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Param> {
        self.0
            .iter()
            .find(|(key, _)| *key == field)
            .map(|(_, param)| param)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Param)> {
        self.0.iter().map(|(key, param)| (*key, param))
    }
}

/// Turn validated parameters into query-string pairs.
///
/// Booleans render as `true`/`false`, enumerations as their wire string. With
/// a `prefix` every key is rewritten to `prefix[key]`.
pub fn prepare_params(params: &Params, prefix: Option<&str>) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(key, param)| {
            let key = match prefix {
                Some(prefix) => format!("{prefix}[{key}]"),
                None => key.to_owned(),
            };
            (key, param.to_wire())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Params {
        let mut params = Params::new();
        params.insert("name", Param::Text("Spring Cup".into()));
        params.insert("open_signup", Param::Bool(true));
        params.insert("private", Param::Bool(false));
        params.insert("tournament_type", Param::Choice("double elimination"));
        params.insert("pts_for_bye", Param::Decimal(1.0));
        params
    }

    #[test]
    fn booleans_render_as_lowercase_tokens() {
        let pairs = prepare_params(&sample(), None);
        assert!(pairs.contains(&("open_signup".into(), "true".into())));
        assert!(pairs.contains(&("private".into(), "false".into())));
    }

    #[test]
    fn enum_values_render_as_wire_strings() {
        let pairs = prepare_params(&sample(), None);
        assert!(pairs.contains(&("tournament_type".into(), "double elimination".into())));
    }

    #[test]
    fn prefix_wraps_every_key() {
        let pairs = prepare_params(&sample(), Some("tournament"));
        assert_eq!(pairs.len(), 5);
        assert!(pairs.iter().all(|(key, _)| key.starts_with("tournament[") && key.ends_with(']')));
        assert!(pairs.contains(&("tournament[name]".into(), "Spring Cup".into())));
        assert!(pairs.contains(&("tournament[pts_for_bye]".into(), "1.0".into())));
    }

    #[test]
    fn insert_replaces_existing_key() {
        let mut params = sample();
        params.insert("name", Param::Text("Autumn Cup".into()));
        assert_eq!(params.len(), 5);
        assert_eq!(params.get("name"), Some(&Param::Text("Autumn Cup".into())));
    }

    #[test]
    fn dates_and_times_use_api_formats() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        assert_eq!(Param::Date(date).to_wire(), "2021-06-01");

        let time = FixedOffset::west_opt(4 * 3600)
            .unwrap()
            .with_ymd_and_hms(2021, 6, 1, 10, 0, 0)
            .unwrap();
        assert_eq!(Param::Time(time).to_wire(), "2021-06-01T10:00:00-04:00");
    }

    #[test]
    fn infer_types_free_text() {
        assert_eq!(Value::infer("true"), Value::Bool(true));
        assert_eq!(Value::infer("42"), Value::Int(42));
        assert_eq!(Value::infer("0.5"), Value::Decimal(0.5));
        assert_eq!(Value::infer("Spring Cup"), Value::Text("Spring Cup".into()));
    }
}
