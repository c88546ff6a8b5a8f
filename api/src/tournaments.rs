//! The tournament resource: index, lookup, creation and every operation a
//! fetched [`Tournament`] can perform on itself.
use crate::client::{ApiError, ApiResult, Connection};
use crate::enums::{TournamentState, TournamentType, WireEnum};
use crate::hydrate;
use crate::matches::Matches;
use crate::params::{Param, Params, Value, Values, prepare_params};
use crate::validate::{TOURNAMENT_FIELDS, TOURNAMENT_FILTERS, validate};
use crate::{Include, Tournament};
use chrono::Utc;
use log::info;
use reqwest::Method;
use std::fmt::Display;

const PUBLIC_URL: &str = "https://challonge.com";

macro_rules! setters {
    ($($field:ident),+ $(,)?) => {$(
        pub fn $field(mut self, value: impl Into<Value>) -> Self {
            self.0.set(stringify!($field), value);
            self
        }
    )+};
}

/// Fields for [`Tournaments::create`] and [`Tournament::update`].
///
/// Only fields that were set are validated and sent.
#[derive(Debug, Clone, Default)]
pub struct TournamentParams(Values);

impl TournamentParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field by its API name. Unknown names fail at validation.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.set(key, value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    setters!(
        name,
        url,
        tournament_type,
        subdomain,
        description,
        open_signup,
        hold_third_place_match,
        pts_for_match_win,
        pts_for_match_tie,
        pts_for_game_win,
        pts_for_game_tie,
        pts_for_bye,
        swiss_rounds,
        ranked_by,
        rr_pts_for_match_win,
        rr_pts_for_match_tie,
        rr_pts_for_game_win,
        rr_pts_for_game_tie,
        accept_attachments,
        hide_forum,
        show_rounds,
        private,
        notify_users_when_matches_open,
        notify_users_when_the_tournament_ends,
        sequential_pairings,
        signup_cap,
        start_at,
        check_in_duration,
        grand_finals_modifier,
    );
}

/// Filters for [`Tournaments::list`].
#[derive(Debug, Clone, Default)]
pub struct TournamentFilter(Values);

impl TournamentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, state: TournamentState) -> Self {
        self.0.set("state", state);
        self
    }

    pub fn tournament_type(mut self, kind: TournamentType) -> Self {
        self.0.set("type", kind);
        self
    }

    /// Date or `YYYY-MM-DD` string.
    pub fn created_after(mut self, date: impl Into<Value>) -> Self {
        self.0.set("created_after", date);
        self
    }

    pub fn created_before(mut self, date: impl Into<Value>) -> Self {
        self.0.set("created_before", date);
        self
    }

    /// Tournaments of an organization's subdomain.
    pub fn subdomain(mut self, subdomain: impl Into<Value>) -> Self {
        self.0.set("subdomain", subdomain);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.set(key, value);
    }
}

fn include_query(include: Include) -> Vec<(String, String)> {
    let flag = |on: bool| String::from(if on { "1" } else { "0" });
    vec![
        ("include_participants".to_owned(), flag(include.participants)),
        ("include_matches".to_owned(), flag(include.matches)),
    ]
}

/// Entry point for tournament operations of one account.
#[derive(Debug, Clone)]
pub struct Tournaments {
    conn: Connection,
}

impl Tournaments {
    pub(crate) fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Tournaments matching `filter`, in API order.
    pub fn list(&self, filter: &TournamentFilter) -> ApiResult<Vec<Tournament>> {
        let params = validate(TOURNAMENT_FILTERS, &filter.0)?;
        info!("list tournaments");
        let body = self.conn.send_json(
            Method::GET,
            "tournaments.json",
            &prepare_params(&params, None),
        )?;
        hydrate::tournaments_from(&body, &self.conn)
    }

    /// Fetch one tournament by numeric id or by url (`subdomain-url` for
    /// organization tournaments).
    pub fn get(&self, id: impl Display, include: Include) -> ApiResult<Tournament> {
        info!("get tournament {id}");
        let body = self.conn.send_json(
            Method::GET,
            &format!("tournaments/{id}.json"),
            &include_query(include),
        )?;
        hydrate::tournament_from(&body, &self.conn)
    }

    /// Create a tournament. `name` and `url` are required; the type defaults
    /// to single elimination.
    pub fn create(&self, fields: &TournamentParams) -> ApiResult<Tournament> {
        let mut params = validate(TOURNAMENT_FIELDS, &fields.0)?;
        for required in ["name", "url"] {
            if params.get(required).is_none() {
                return Err(ApiError::Argument(format!(
                    "Parameter `{required}` is required"
                )));
            }
        }
        if params.get("tournament_type").is_none() {
            params.insert(
                "tournament_type",
                Param::Choice(TournamentType::DEFAULT.wire()),
            );
        }

        if let Some(Param::Text(name)) = params.get("name") {
            info!("create tournament {name}");
        }
        let body = self.conn.send_json(
            Method::POST,
            "tournaments.json",
            &prepare_params(&params, Some("tournament")),
        )?;
        hydrate::tournament_from(&body, &self.conn)
    }

    /// Match operations of the tournament `tournament_id`, without fetching it.
    pub fn matches(&self, tournament_id: u64) -> Matches {
        Matches::new(self.conn.clone(), tournament_id)
    }
}

impl Tournament {
    /// Match operations scoped to this tournament.
    pub fn matches_client(&self) -> &Matches {
        &self.matches_client
    }

    /// Send the supplied fields and, once the API accepts them, apply exactly
    /// those fields to `self`. Nothing else on `self` changes.
    pub fn update(&mut self, fields: &TournamentParams) -> ApiResult<()> {
        if fields.is_empty() {
            return Err(ApiError::Argument(
                "No parameters given, nothing to update".to_owned(),
            ));
        }
        let params = validate(TOURNAMENT_FIELDS, &fields.0)?;

        // Staged on a copy so a field that cannot be applied fails before the request.
        let mut updated = self.clone();
        updated.apply(&params)?;

        info!("update tournament {} ({} fields)", self.id, params.len());
        self.conn.send(
            Method::PUT,
            &format!("tournaments/{}.json", self.id),
            &prepare_params(&params, Some("tournament")),
        )?;
        *self = updated;
        Ok(())
    }

    fn apply(&mut self, params: &Params) -> ApiResult<()> {
        for (key, param) in params.iter() {
            match (key, param) {
                ("name", Param::Text(v)) => self.name = v.clone(),
                ("url", Param::Text(v)) => self.full_challonge_url = format!("{PUBLIC_URL}/{v}"),
                ("subdomain", Param::Text(v)) => self.subdomain = Some(v.clone()),
                ("description", Param::Text(v)) => self.description = Some(v.clone()),

                ("tournament_type", Param::Choice(w)) => self.tournament_type = choice(key, w)?,
                ("ranked_by", Param::Choice(w)) => self.ranked_by = choice(key, w)?,
                ("grand_finals_modifier", Param::Choice(w)) => {
                    self.grand_finals_modifier = choice(key, w)?
                }

                ("open_signup", Param::Bool(v)) => self.open_signup = *v,
                ("hold_third_place_match", Param::Bool(v)) => self.hold_third_place_match = *v,
                ("accept_attachments", Param::Bool(v)) => self.accept_attachments = *v,
                ("hide_forum", Param::Bool(v)) => self.hide_forum = *v,
                ("show_rounds", Param::Bool(v)) => self.show_rounds = *v,
                ("private", Param::Bool(v)) => self.private = *v,
                ("notify_users_when_matches_open", Param::Bool(v)) => {
                    self.notify_users_when_matches_open = *v
                }
                ("notify_users_when_the_tournament_ends", Param::Bool(v)) => {
                    self.notify_users_when_the_tournament_ends = *v
                }
                ("sequential_pairings", Param::Bool(v)) => self.sequential_pairings = *v,

                ("pts_for_match_win", Param::Decimal(v)) => self.pts_for_match_win = Some(*v),
                ("pts_for_match_tie", Param::Decimal(v)) => self.pts_for_match_tie = Some(*v),
                ("pts_for_game_win", Param::Decimal(v)) => self.pts_for_game_win = Some(*v),
                ("pts_for_game_tie", Param::Decimal(v)) => self.pts_for_game_tie = Some(*v),
                ("pts_for_bye", Param::Decimal(v)) => self.pts_for_bye = Some(*v),
                ("rr_pts_for_match_win", Param::Decimal(v)) => self.rr_pts_for_match_win = Some(*v),
                ("rr_pts_for_match_tie", Param::Decimal(v)) => self.rr_pts_for_match_tie = Some(*v),
                ("rr_pts_for_game_win", Param::Decimal(v)) => self.rr_pts_for_game_win = Some(*v),
                ("rr_pts_for_game_tie", Param::Decimal(v)) => self.rr_pts_for_game_tie = Some(*v),

                ("swiss_rounds", Param::Int(v)) => self.swiss_rounds = *v,
                ("signup_cap", Param::Int(v)) => self.signup_cap = Some(*v),
                ("check_in_duration", Param::Int(v)) => self.check_in_duration = Some(*v),
                ("start_at", Param::Time(v)) => self.start_at = Some(v.with_timezone(&Utc)),

                (key, param) => {
                    return Err(ApiError::Argument(format!(
                        "Parameter `{key}` cannot be set to {param:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Start a pending tournament.
    pub fn start(&self, include: Include) -> ApiResult<()> {
        self.transition("start", include)
    }

    /// Return the tournament to pending, discarding match results.
    pub fn reset(&self, include: Include) -> ApiResult<()> {
        self.transition("reset", include)
    }

    pub fn finalize(&self, include: Include) -> ApiResult<()> {
        self.transition("finalize", include)
    }

    /// Leave the check-in phase and return to pending.
    pub fn abort_check_in(&self, include: Include) -> ApiResult<()> {
        self.transition("abort_check_in", include)
    }

    pub fn open_for_predictions(&self, include: Include) -> ApiResult<()> {
        self.transition("open_for_predictions", include)
    }

    pub fn process_check_ins(&self, include: Include) -> ApiResult<()> {
        self.transition("process_check_ins", include)
    }

    /// Delete the tournament on the server. `self` keeps its last known state.
    pub fn delete(&self, include: Include) -> ApiResult<()> {
        info!("delete tournament {}", self.id);
        self.conn.send(
            Method::DELETE,
            &format!("tournaments/{}.json", self.id),
            &include_query(include),
        )?;
        Ok(())
    }

    // Legality of the transition is decided by the server.
    fn transition(&self, action: &str, include: Include) -> ApiResult<()> {
        info!("{action} tournament {}", self.id);
        self.conn.send(
            Method::POST,
            &format!("tournaments/{}/{action}.json", self.id),
            &include_query(include),
        )?;
        Ok(())
    }
}

fn choice<E: WireEnum>(key: &str, wire: &str) -> ApiResult<E> {
    E::from_wire(Some(wire)).map_err(|e| ApiError::Argument(format!("Parameter `{key}`: {e}")))
}
