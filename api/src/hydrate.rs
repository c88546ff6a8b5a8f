//! Mapping from decoded JSON responses to [`Tournament`] and [`Match`].
//!
//! The API wraps every entity in an envelope named after it
//! (`{"tournament": {...}}`). Keys are copied by exact name; a missing key,
//! a value of the wrong JSON type, an unparseable timestamp or an unknown
//! enumeration value fails the whole entity.
use crate::client::{ApiError, ApiResult, Connection};
use crate::enums::WireEnum;
use crate::matches::Matches;
use crate::{Match, Tournament};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Parse an API timestamp: `YYYY-MM-DDTHH:MM:SS(.ffffff)?±HH:MM`.
///
/// Offsets with or without the colon are accepted. A timestamp without any
/// offset is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.with_timezone(&Utc));
    }
    if let Ok(time) = DateTime::parse_from_str(&strip_offset_colon(raw), "%Y-%m-%dT%H:%M:%S%.f%z")
    {
        return Some(time.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `...+05:30` becomes `...+0530`; anything else is returned unchanged.
fn strip_offset_colon(raw: &str) -> Cow<'_, str> {
    let bytes = raw.as_bytes();
    let len = bytes.len();
    if len >= 6 && matches!(bytes[len - 6], b'+' | b'-') && bytes[len - 3] == b':' {
        let mut fixed = String::with_capacity(len - 1);
        fixed.push_str(&raw[..len - 3]);
        fixed.push_str(&raw[len - 2..]);
        Cow::Owned(fixed)
    } else {
        Cow::Borrowed(raw)
    }
}

/// Fields of one entity object, with typed accessors that fail on missing keys.
struct Fields<'a> {
    entity: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Open the `{"<entity>": {...}}` envelope.
    fn open(body: &'a Value, entity: &'static str) -> ApiResult<Self> {
        body.get(entity)
            .and_then(Value::as_object)
            .map(|map| Fields { entity, map })
            .ok_or_else(|| hydration(entity, format!("missing `{entity}` object")))
    }

    fn raw(&self, key: &str) -> ApiResult<&'a Value> {
        self.map
            .get(key)
            .ok_or_else(|| hydration(self.entity, format!("missing key `{key}`")))
    }

    /// Keys that only appear on request, like embedded matches.
    fn optional(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> ApiResult<T> {
        serde_json::from_value(self.raw(key)?.clone())
            .map_err(|e| hydration(self.entity, format!("key `{key}`: {e}")))
    }

    /// Absent and `null` timestamps are both "no value".
    fn timestamp(&self, key: &str) -> ApiResult<Option<DateTime<Utc>>> {
        match self.map.get(key).unwrap_or(&Value::Null) {
            Value::Null => Ok(None),
            Value::String(raw) => parse_timestamp(raw).map(Some).ok_or_else(|| {
                hydration(self.entity, format!("key `{key}`: invalid timestamp `{raw}`"))
            }),
            other => Err(hydration(
                self.entity,
                format!("key `{key}`: expected a timestamp, found {other}"),
            )),
        }
    }

    /// Decimals arrive either as JSON numbers or as strings like `"1.0"`.
    fn decimal(&self, key: &str) -> ApiResult<Option<f64>> {
        match self.raw(key)? {
            Value::Null => Ok(None),
            Value::Number(number) => Ok(number.as_f64()),
            Value::String(raw) => raw.trim().parse().map(Some).map_err(|_| {
                hydration(self.entity, format!("key `{key}`: invalid decimal `{raw}`"))
            }),
            other => Err(hydration(
                self.entity,
                format!("key `{key}`: expected a decimal, found {other}"),
            )),
        }
    }

    fn choice<E: WireEnum>(&self, key: &str) -> ApiResult<E> {
        let raw = match self.raw(key)? {
            Value::Null => None,
            Value::String(raw) => Some(raw.as_str()),
            other => {
                return Err(hydration(
                    self.entity,
                    format!("key `{key}`: expected a string, found {other}"),
                ));
            }
        };
        E::from_wire(raw).map_err(|e| hydration(self.entity, format!("key `{key}`: {e}")))
    }
}

fn hydration(entity: &'static str, reason: String) -> ApiError {
    ApiError::Hydration { entity, reason }
}

fn array<'a>(body: &'a Value, entity: &'static str) -> ApiResult<&'a Vec<Value>> {
    body.as_array()
        .ok_or_else(|| hydration(entity, "expected a JSON array".to_owned()))
}

/// Hydrate a `{"match": {...}}` body.
pub fn match_from(body: &Value) -> ApiResult<Match> {
    let f = Fields::open(body, "match")?;
    Ok(Match {
        id: f.get("id")?,
        tournament_id: f.get("tournament_id")?,
        identifier: f.get("identifier")?,
        round: f.get("round")?,
        state: f.choice("state")?,
        group_id: f.get("group_id")?,
        location: f.get("location")?,
        player1_id: f.get("player1_id")?,
        player1_is_prereq_match_loser: f.get("player1_is_prereq_match_loser")?,
        player1_prereq_match_id: f.get("player1_prereq_match_id")?,
        player1_votes: f.get("player1_votes")?,
        player2_id: f.get("player2_id")?,
        player2_is_prereq_match_loser: f.get("player2_is_prereq_match_loser")?,
        player2_prereq_match_id: f.get("player2_prereq_match_id")?,
        player2_votes: f.get("player2_votes")?,
        winner_id: f.get("winner_id")?,
        loser_id: f.get("loser_id")?,
        scores_csv: f.get("scores_csv")?,
        prerequisite_match_ids_csv: f.get("prerequisite_match_ids_csv")?,
        attachment_count: f.get("attachment_count")?,
        has_attachment: f.get("has_attachment")?,
        created_at: f.timestamp("created_at")?,
        updated_at: f.timestamp("updated_at")?,
        scheduled_time: f.timestamp("scheduled_time")?,
        started_at: f.timestamp("started_at")?,
        underway_at: f.timestamp("underway_at")?,
    })
}

/// Hydrate a JSON array of `{"match": {...}}` items, keeping their order.
pub fn matches_from(body: &Value) -> ApiResult<Vec<Match>> {
    array(body, "match")?.iter().map(match_from).collect()
}

/// Hydrate a `{"tournament": {...}}` body. The tournament keeps a handle on
/// `conn` for its own operations and its scoped [`Matches`] client.
pub(crate) fn tournament_from(body: &Value, conn: &Connection) -> ApiResult<Tournament> {
    let f = Fields::open(body, "tournament")?;
    let id: u64 = f.get("id")?;

    let matches = match f.optional("matches") {
        Some(raw) => matches_from(raw)?,
        None => Vec::new(),
    };
    let participants = match f.optional("participants") {
        Some(Value::Array(records)) => Some(records.clone()),
        Some(other) => {
            return Err(hydration(
                "tournament",
                format!("key `participants`: expected an array, found {other}"),
            ));
        }
        None => None,
    };

    Ok(Tournament {
        id,
        name: f.get("name")?,
        description: f.get("description")?,
        tournament_type: f.choice("tournament_type")?,
        state: f.get("state")?,
        progress_meter: f.get("progress_meter")?,
        subdomain: f.get("subdomain")?,
        full_challonge_url: f.get("full_challonge_url")?,
        live_image_url: f.get("live_image_url")?,
        sign_up_url: f.get("sign_up_url")?,
        category: f.get("category")?,
        game_id: f.get("game_id")?,
        game_name: f.get("game_name")?,
        event_id: f.get("event_id")?,

        created_at: f.timestamp("created_at")?,
        updated_at: f.timestamp("updated_at")?,
        start_at: f.timestamp("start_at")?,
        started_at: f.timestamp("started_at")?,
        started_checking_in_at: f.timestamp("started_checking_in_at")?,
        completed_at: f.timestamp("completed_at")?,
        locked_at: f.timestamp("locked_at")?,
        predictions_opened_at: f.timestamp("predictions_opened_at")?,
        check_in_duration: f.get("check_in_duration")?,

        open_signup: f.get("open_signup")?,
        signup_cap: f.get("signup_cap")?,
        participants_count: f.get("participants_count")?,
        participants_locked: f.get("participants_locked")?,
        participants_swappable: f.get("participants_swappable")?,
        teams: f.get("teams")?,
        team_convertable: f.get("team_convertable")?,
        split_participants: f.get("split_participants")?,

        ranked_by: f.choice("ranked_by")?,
        grand_finals_modifier: f.choice("grand_finals_modifier")?,
        hold_third_place_match: f.get("hold_third_place_match")?,
        sequential_pairings: f.get("sequential_pairings")?,
        swiss_rounds: f.get("swiss_rounds")?,
        rr_iterations: f.get("rr_iterations")?,
        tie_breaks: f.get("tie_breaks")?,
        pts_for_match_win: f.decimal("pts_for_match_win")?,
        pts_for_match_tie: f.decimal("pts_for_match_tie")?,
        pts_for_game_win: f.decimal("pts_for_game_win")?,
        pts_for_game_tie: f.decimal("pts_for_game_tie")?,
        pts_for_bye: f.decimal("pts_for_bye")?,
        rr_pts_for_match_win: f.decimal("rr_pts_for_match_win")?,
        rr_pts_for_match_tie: f.decimal("rr_pts_for_match_tie")?,
        rr_pts_for_game_win: f.decimal("rr_pts_for_game_win")?,
        rr_pts_for_game_tie: f.decimal("rr_pts_for_game_tie")?,

        private: f.get("private")?,
        hide_forum: f.get("hide_forum")?,
        hide_seeds: f.get("hide_seeds")?,
        show_rounds: f.get("show_rounds")?,
        accept_attachments: f.get("accept_attachments")?,
        quick_advance: f.get("quick_advance")?,
        require_score_agreement: f.get("require_score_agreement")?,
        allow_participant_match_reporting: f.get("allow_participant_match_reporting")?,
        review_before_finalizing: f.get("review_before_finalizing")?,
        notify_users_when_matches_open: f.get("notify_users_when_matches_open")?,
        notify_users_when_the_tournament_ends: f.get("notify_users_when_the_tournament_ends")?,
        group_stages_enabled: f.get("group_stages_enabled")?,
        group_stages_were_started: f.get("group_stages_were_started")?,
        non_elimination_tournament_data: f.get("non_elimination_tournament_data")?,

        prediction_method: f.get("prediction_method")?,
        accepting_predictions: f.get("accepting_predictions")?,
        anonymous_voting: f.get("anonymous_voting")?,
        max_predictions_per_user: f.get("max_predictions_per_user")?,
        public_predictions_before_start_time: f.get("public_predictions_before_start_time")?,
        predict_the_losers_bracket: f.get("predict_the_losers_bracket")?,

        ranked: f.get("ranked")?,
        created_by_api: f.get("created_by_api")?,
        credit_capped: f.get("credit_capped")?,
        spam: f.get("spam")?,
        ham: f.get("ham")?,
        description_source: f.get("description_source")?,
        tournament_registration_id: f.get("tournament_registration_id")?,
        registration_fee: f.decimal("registration_fee")?,
        registration_type: f.get("registration_type")?,
        donation_contest_enabled: f.get("donation_contest_enabled")?,
        mandatory_donation: f.get("mandatory_donation")?,
        auto_assign_stations: f.get("auto_assign_stations")?,
        only_start_matches_with_stations: f.get("only_start_matches_with_stations")?,

        matches,
        participants,

        conn: conn.clone(),
        matches_client: Matches::new(conn.clone(), id),
    })
}

/// Hydrate a JSON array of `{"tournament": {...}}` items, keeping their order.
pub(crate) fn tournaments_from(body: &Value, conn: &Connection) -> ApiResult<Vec<Tournament>> {
    array(body, "tournament")?
        .iter()
        .map(|item| tournament_from(item, conn))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::enums::{GrandFinalsModifier, MatchState, TournamentRankedBy, TournamentType};
    use crate::fixtures::{MATCH_JSON, TOURNAMENT_JSON};
    use chrono::TimeZone;

    fn conn() -> Connection {
        Connection::new(&ClientConfig::new("user", "key"))
    }

    fn tournament_body() -> Value {
        serde_json::from_str(TOURNAMENT_JSON).unwrap()
    }

    #[test]
    fn colon_offset_is_normalized() {
        let parsed = parse_timestamp("2021-06-01T10:00:00-04:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2021, 6, 1, 14, 0, 0).unwrap());
        assert_eq!(strip_offset_colon("2021-06-01T10:00:00-04:00"), "2021-06-01T10:00:00-0400");
        assert_eq!(strip_offset_colon("2021-06-01T10:00:00Z"), "2021-06-01T10:00:00Z");
    }

    #[test]
    fn timestamp_variants_parse() {
        let expected = Utc.with_ymd_and_hms(2021, 6, 1, 14, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2021-06-01T10:00:00.000-04:00"), Some(expected));
        assert_eq!(parse_timestamp("2021-06-01T10:00:00.123456-0400").map(|t| t.timestamp()), Some(expected.timestamp()));
        assert_eq!(parse_timestamp("2021-06-01T14:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2021-06-01T14:00:00"), Some(expected));
        assert_eq!(parse_timestamp("June 1st"), None);
    }

    #[test]
    fn tournament_fixture_hydrates() {
        let tournament = tournament_from(&tournament_body(), &conn()).unwrap();
        assert_eq!(tournament.id, 9_876_543);
        assert_eq!(tournament.name, "Spring Cup");
        assert_eq!(tournament.tournament_type, TournamentType::SingleElimination);
        assert_eq!(tournament.ranked_by, TournamentRankedBy::MatchWins);
        assert_eq!(tournament.grand_finals_modifier, GrandFinalsModifier::Default);
        assert_eq!(tournament.pts_for_match_win, Some(1.0));
        assert_eq!(tournament.pts_for_bye, Some(1.0));
        assert_eq!(
            tournament.created_at,
            Some(Utc.with_ymd_and_hms(2021, 6, 1, 14, 0, 0).unwrap())
        );
        assert_eq!(tournament.started_at, None);
        assert!(tournament.matches.is_empty());
        assert!(tournament.participants.is_none());
        assert_eq!(tournament.matches_client.tournament_id(), 9_876_543);
    }

    #[test]
    fn embedded_matches_keep_api_order() {
        let mut body = tournament_body();
        let first: Value = serde_json::from_str(MATCH_JSON).unwrap();
        let mut second = first.clone();
        second["match"]["id"] = 2.into();
        second["match"]["state"] = "pending".into();
        let mut third = first.clone();
        third["match"]["id"] = 1.into();
        body["tournament"]["matches"] = Value::Array(vec![first, second, third]);
        body["tournament"]["participants"] = serde_json::json!([{"participant": {"id": 7}}]);

        let tournament = tournament_from(&body, &conn()).unwrap();
        let ids: Vec<u64> = tournament.matches.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1_234_567, 2, 1]);
        assert_eq!(tournament.matches[1].state, MatchState::Pending);
        assert_eq!(tournament.participants.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn missing_key_fails_hydration() {
        let mut body = tournament_body();
        body["tournament"].as_object_mut().unwrap().remove("hide_forum");
        let err = tournament_from(&body, &conn()).unwrap_err();
        assert!(err.is_protocol());
        assert!(err.to_string().contains("hide_forum"), "{err}");
    }

    #[test]
    fn absent_timestamp_is_no_value() {
        let mut body = tournament_body();
        let fields = body["tournament"].as_object_mut().unwrap();
        fields.remove("completed_at");
        fields.insert("started_at".into(), Value::Null);
        let tournament = tournament_from(&body, &conn()).unwrap();
        assert_eq!(tournament.completed_at, None);
        assert_eq!(tournament.started_at, None);

        let mut body: Value = serde_json::from_str(MATCH_JSON).unwrap();
        body["match"].as_object_mut().unwrap().remove("underway_at");
        assert_eq!(match_from(&body).unwrap().underway_at, None);
    }

    #[test]
    fn unknown_enum_value_fails_hydration() {
        let mut body = tournament_body();
        body["tournament"]["tournament_type"] = "free for all".into();
        let err = tournament_from(&body, &conn()).unwrap_err();
        assert!(matches!(err, ApiError::Hydration { entity: "tournament", .. }));
        assert!(err.to_string().contains("free for all"), "{err}");
    }

    #[test]
    fn null_enum_value_is_the_default_member() {
        let mut body = tournament_body();
        body["tournament"]["grand_finals_modifier"] = Value::Null;
        body["tournament"]["tournament_type"] = "double elimination".into();
        let tournament = tournament_from(&body, &conn()).unwrap();
        assert_eq!(tournament.grand_finals_modifier, GrandFinalsModifier::Default);
        assert_eq!(tournament.tournament_type, TournamentType::DoubleElimination);
    }

    #[test]
    fn bad_timestamp_fails_hydration() {
        let mut body = tournament_body();
        body["tournament"]["updated_at"] = "yesterday".into();
        let err = tournament_from(&body, &conn()).unwrap_err();
        assert!(err.to_string().contains("updated_at"), "{err}");
    }

    #[test]
    fn match_fixture_hydrates() {
        let body: Value = serde_json::from_str(MATCH_JSON).unwrap();
        let m = match_from(&body).unwrap();
        assert_eq!(m.id, 1_234_567);
        assert_eq!(m.tournament_id, 9_876_543);
        assert_eq!(m.state, MatchState::Open);
        assert_eq!(m.identifier, "A");
        assert_eq!(m.player1_id, Some(101));
        assert_eq!(m.winner_id, None);
        assert_eq!(
            m.underway_at,
            Some(Utc.with_ymd_and_hms(2021, 6, 1, 15, 30, 0).unwrap())
        );
        assert_eq!(m.scheduled_time, None);
    }

    #[test]
    fn match_list_requires_array() {
        let body: Value = serde_json::from_str(MATCH_JSON).unwrap();
        assert!(matches_from(&body).is_err());
        let list = Value::Array(vec![body]);
        assert_eq!(matches_from(&list).unwrap().len(), 1);
    }
}
