use crate::client::{ApiResult, Connection};
use crate::enums::MatchState;
use crate::hydrate;
use crate::params::{Value, Values, prepare_params};
use crate::validate::{MATCH_FILTERS, validate};
use crate::Match;
use log::info;
use reqwest::Method;

/// Filters for [`Matches::list`]. Unset filters are not sent.
#[derive(Debug, Clone, Default)]
pub struct MatchFilter(Values);

impl MatchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, state: MatchState) -> Self {
        self.0.set("state", state);
        self
    }

    /// Only matches this participant plays in.
    pub fn participant_id(mut self, id: impl Into<Value>) -> Self {
        self.0.set("participant_id", id);
        self
    }

    /// Set a filter by its API name.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.set(key, value);
    }
}

/// Match operations of one tournament.
#[derive(Debug, Clone)]
pub struct Matches {
    conn: Connection,
    tournament_id: u64,
}

impl Matches {
    pub(crate) fn new(conn: Connection, tournament_id: u64) -> Self {
        Self {
            conn,
            tournament_id,
        }
    }

    pub fn tournament_id(&self) -> u64 {
        self.tournament_id
    }

    /// Matches of the tournament, in the order the API returns them.
    pub fn list(&self, filter: &MatchFilter) -> ApiResult<Vec<Match>> {
        let params = validate(MATCH_FILTERS, &filter.0)?;
        info!("list matches of tournament {}", self.tournament_id);
        let body = self.conn.send_json(
            Method::GET,
            &format!("tournaments/{}/matches.json", self.tournament_id),
            &prepare_params(&params, None),
        )?;
        hydrate::matches_from(&body)
    }

    pub fn get(&self, match_id: u64) -> ApiResult<Match> {
        info!("get match {match_id} of tournament {}", self.tournament_id);
        let body = self.conn.send_json(
            Method::GET,
            &format!("tournaments/{}/matches/{match_id}.json", self.tournament_id),
            &[],
        )?;
        hydrate::match_from(&body)
    }
}
