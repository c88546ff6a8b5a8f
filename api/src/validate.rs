//! Declarative per-field rules and the single routine that applies them.
//!
//! Every operation that accepts a field shares the same [`FieldRule`], so
//! `create` and `update` cannot drift apart.
use crate::client::{ApiError, ApiResult};
use crate::enums::{
    GrandFinalsModifier, MatchState, TournamentRankedBy, TournamentState, TournamentType, WireEnum,
};
use crate::params::{Param, Params, Value, Values};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

/// Longest accepted name, url or subdomain.
pub const MAX_TEXT_LEN: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Any,
    /// Letters, digits and underscores only (`[A-Za-z0-9_]*`).
    Word,
}

impl Charset {
    fn allows(self, text: &str) -> bool {
        match self {
            Charset::Any => true,
            Charset::Word => text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
        }
    }
}

/// Coerces a loose value into an enumeration. `Err` carries the list of valid
/// wire values for the error message.
pub type Coerce = fn(&Value) -> Result<&'static str, String>;

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Text { max_len: Option<usize>, charset: Charset },
    Flag,
    Integer { min: i64, max: i64 },
    /// Any number, rounded to one fraction digit.
    Decimal,
    Choice(Coerce),
    /// A calendar day, sent as `YYYY-MM-DD`.
    Date,
    /// A point in time, sent as RFC 3339.
    Timestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub rule: Rule,
}

const fn field(name: &'static str, rule: Rule) -> FieldRule {
    FieldRule { name, rule }
}

const NAME: Rule = Rule::Text {
    max_len: Some(MAX_TEXT_LEN),
    charset: Charset::Any,
};
const SLUG: Rule = Rule::Text {
    max_len: Some(MAX_TEXT_LEN),
    charset: Charset::Word,
};
const TEXT: Rule = Rule::Text {
    max_len: None,
    charset: Charset::Any,
};
const INTEGER: Rule = Rule::Integer {
    min: i64::MIN,
    max: i64::MAX,
};

/// Fields accepted by tournament create and update.
pub const TOURNAMENT_FIELDS: &[FieldRule] = &[
    field("name", NAME),
    field("url", SLUG),
    field("tournament_type", Rule::Choice(wire_of::<TournamentType>)),
    field("subdomain", SLUG),
    field("description", TEXT),
    field("open_signup", Rule::Flag),
    field("hold_third_place_match", Rule::Flag),
    field("pts_for_match_win", Rule::Decimal),
    field("pts_for_match_tie", Rule::Decimal),
    field("pts_for_game_win", Rule::Decimal),
    field("pts_for_game_tie", Rule::Decimal),
    field("pts_for_bye", Rule::Decimal),
    field("swiss_rounds", INTEGER),
    field("ranked_by", Rule::Choice(wire_of::<TournamentRankedBy>)),
    field("rr_pts_for_match_win", Rule::Decimal),
    field("rr_pts_for_match_tie", Rule::Decimal),
    field("rr_pts_for_game_win", Rule::Decimal),
    field("rr_pts_for_game_tie", Rule::Decimal),
    field("accept_attachments", Rule::Flag),
    field("hide_forum", Rule::Flag),
    field("show_rounds", Rule::Flag),
    field("private", Rule::Flag),
    field("notify_users_when_matches_open", Rule::Flag),
    field("notify_users_when_the_tournament_ends", Rule::Flag),
    field("sequential_pairings", Rule::Flag),
    field("signup_cap", Rule::Integer { min: 1, max: 256 }),
    field("start_at", Rule::Timestamp),
    field("check_in_duration", INTEGER),
    field(
        "grand_finals_modifier",
        Rule::Choice(wire_of::<GrandFinalsModifier>),
    ),
];

/// Filters accepted by the tournament index.
pub const TOURNAMENT_FILTERS: &[FieldRule] = &[
    field("state", Rule::Choice(name_of::<TournamentState>)),
    field("type", Rule::Choice(name_of::<TournamentType>)),
    field("created_after", Rule::Date),
    field("created_before", Rule::Date),
    field("subdomain", SLUG),
];

/// Filters accepted by the match index of a tournament.
pub const MATCH_FILTERS: &[FieldRule] = &[
    field("state", Rule::Choice(name_of::<MatchState>)),
    field("participant_id", INTEGER),
];

/// Coerce into `T` and send its canonical wire string.
pub fn wire_of<T: WireEnum>(value: &Value) -> Result<&'static str, String> {
    coerce::<T>(value).map(T::wire)
}

/// Coerce into `T` and send its symbolic name, as the index filters expect.
pub fn name_of<T: WireEnum>(value: &Value) -> Result<&'static str, String> {
    coerce::<T>(value).map(T::name)
}

/// Accepts a wire string or an instance of exactly `T`, nothing else.
fn coerce<T: WireEnum>(value: &Value) -> Result<T, String> {
    let raw = match value {
        Value::Text(text) => text.as_str(),
        Value::Choice { kind, wire } if *kind == T::NAME => *wire,
        _ => return Err(T::valid_values()),
    };
    T::from_wire(Some(raw)).map_err(|_| T::valid_values())
}

/// Check one value against its field's rule.
pub fn validate_field(field: &FieldRule, value: &Value) -> ApiResult<Param> {
    let name = field.name;
    let param = match (field.rule, value) {
        (Rule::Text { max_len, charset }, Value::Text(text)) => {
            if let Some(max_len) = max_len
                && text.chars().count() > max_len
            {
                return Err(argument(format!(
                    "Parameter `{name}` cannot be more than {max_len} characters"
                )));
            }
            if !charset.allows(text) {
                return Err(argument(format!(
                    "Parameter `{name}` can only be letters, numbers, and underscores"
                )));
            }
            Param::Text(text.clone())
        }
        (Rule::Flag, Value::Bool(flag)) => Param::Bool(*flag),
        (Rule::Integer { min, max }, Value::Int(int)) => {
            if *int < min || *int > max {
                return Err(argument(format!(
                    "Parameter `{name}` must be between the values {min} and {max}"
                )));
            }
            Param::Int(*int)
        }
        (Rule::Decimal, Value::Int(int)) => Param::Decimal(round_tenth(*int as f64)),
        (Rule::Decimal, Value::Decimal(decimal)) if decimal.is_finite() => {
            Param::Decimal(round_tenth(*decimal))
        }
        (Rule::Choice(coerce), value) => {
            let wire = coerce(value).map_err(|valid| {
                argument(format!(
                    "Parameter `{name}` is invalid, valid values: {valid}"
                ))
            })?;
            Param::Choice(wire)
        }
        (Rule::Date, value) => Param::Date(date(value).ok_or_else(|| {
            argument(format!(
                "Parameter `{name}` must be a date or a string in the format `YYYY-MM-DD`"
            ))
        })?),
        (Rule::Timestamp, value) => Param::Time(timestamp(value).ok_or_else(|| {
            argument(format!(
                "Parameter `{name}` must be a timestamp, an RFC 3339 string or a string in the format `YYYY-MM-DD`"
            ))
        })?),
        (rule, value) => {
            return Err(argument(format!(
                "Parameter `{name}` must be of type {}, got {}",
                expected_type(rule),
                value.type_name()
            )));
        }
    };
    Ok(param)
}

/// Validate every supplied value against `rules`. Keys without a rule are
/// rejected; keys that were not supplied are simply absent from the result.
pub fn validate(rules: &[FieldRule], values: &Values) -> ApiResult<Params> {
    let mut params = Params::new();
    for (key, value) in values.iter() {
        let field = rules
            .iter()
            .find(|field| field.name == key)
            .ok_or_else(|| argument(format!("Unknown parameter `{key}`")))?;
        params.insert(field.name, validate_field(field, value)?);
    }
    Ok(params)
}

fn date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(day) => Some(*day),
        Value::Time(time) => Some(time.date_naive()),
        Value::Text(text) if is_day_string(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// Exactly `YYYY-MM-DD`: ten ASCII digits and dashes, no padding.
fn is_day_string(text: &str) -> bool {
    text.len() == 10
        && text.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Day strings are taken as midnight UTC.
fn timestamp(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::Time(time) => Some(*time),
        Value::Text(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .or_else(|| date(value).map(|day| day.and_time(NaiveTime::MIN).and_utc().fixed_offset())),
        Value::Date(day) => Some(day.and_time(NaiveTime::MIN).and_utc().fixed_offset()),
        _ => None,
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn expected_type(rule: Rule) -> &'static str {
    match rule {
        Rule::Text { .. } => "text",
        Rule::Flag => "bool",
        Rule::Integer { .. } => "int",
        Rule::Decimal => "int or decimal",
        Rule::Choice(_) => "enum",
        Rule::Date => "date",
        Rule::Timestamp => "timestamp",
    }
}

fn argument(message: String) -> ApiError {
    ApiError::Argument(message)
}
