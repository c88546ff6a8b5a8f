pub mod client;
pub mod enums;
pub mod hydrate;
pub mod matches;
pub mod params;
pub mod tournaments;
pub mod validate;

pub use client::{ApiError, ApiResult, Challonge, ClientConfig, Credentials};
pub use enums::{
    GrandFinalsModifier, MatchState, TournamentRankedBy, TournamentState, TournamentType, WireEnum,
};
pub use matches::{MatchFilter, Matches};
pub use params::Value;
pub use tournaments::{TournamentFilter, TournamentParams, Tournaments};

use crate::client::Connection;
use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Entities, hydrated from API responses
// ---------------------------------------------------------------------------

/// A tournament as reported by the API.
///
/// Attributes mirror the API's keys. Operations that change the tournament
/// live in [`tournaments`]; only [`Tournament::update`] touches local fields.
#[derive(Debug, Clone)]
pub struct Tournament {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub tournament_type: TournamentType,
    pub state: String,
    pub progress_meter: i64,
    pub subdomain: Option<String>,
    pub full_challonge_url: String,
    pub live_image_url: String,
    pub sign_up_url: Option<String>,
    pub category: Option<String>,
    pub game_id: Option<u64>,
    pub game_name: Option<String>,
    pub event_id: Option<u64>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub start_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub started_checking_in_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub locked_at: Option<DateTime<Utc>>,
    pub predictions_opened_at: Option<DateTime<Utc>>,
    pub check_in_duration: Option<i64>,

    pub open_signup: bool,
    pub signup_cap: Option<i64>,
    pub participants_count: i64,
    pub participants_locked: bool,
    pub participants_swappable: bool,
    pub teams: Option<bool>,
    pub team_convertable: bool,
    pub split_participants: bool,

    pub ranked_by: TournamentRankedBy,
    pub grand_finals_modifier: GrandFinalsModifier,
    pub hold_third_place_match: bool,
    pub sequential_pairings: bool,
    pub swiss_rounds: i64,
    pub rr_iterations: Option<i64>,
    pub tie_breaks: serde_json::Value,
    pub pts_for_match_win: Option<f64>,
    pub pts_for_match_tie: Option<f64>,
    pub pts_for_game_win: Option<f64>,
    pub pts_for_game_tie: Option<f64>,
    pub pts_for_bye: Option<f64>,
    pub rr_pts_for_match_win: Option<f64>,
    pub rr_pts_for_match_tie: Option<f64>,
    pub rr_pts_for_game_win: Option<f64>,
    pub rr_pts_for_game_tie: Option<f64>,

    pub private: bool,
    pub hide_forum: bool,
    pub hide_seeds: bool,
    pub show_rounds: bool,
    pub accept_attachments: bool,
    pub quick_advance: bool,
    pub require_score_agreement: bool,
    pub allow_participant_match_reporting: bool,
    pub review_before_finalizing: bool,
    pub notify_users_when_matches_open: bool,
    pub notify_users_when_the_tournament_ends: bool,
    pub group_stages_enabled: bool,
    pub group_stages_were_started: bool,
    pub non_elimination_tournament_data: serde_json::Value,

    pub prediction_method: i64,
    pub accepting_predictions: bool,
    pub anonymous_voting: bool,
    pub max_predictions_per_user: i64,
    pub public_predictions_before_start_time: Option<bool>,
    pub predict_the_losers_bracket: Option<bool>,

    pub ranked: bool,
    pub created_by_api: bool,
    pub credit_capped: bool,
    pub spam: Option<bool>,
    pub ham: Option<bool>,
    pub description_source: Option<String>,
    pub tournament_registration_id: Option<u64>,
    pub registration_fee: Option<f64>,
    pub registration_type: Option<String>,
    pub donation_contest_enabled: Option<bool>,
    pub mandatory_donation: Option<bool>,
    pub auto_assign_stations: Option<bool>,
    pub only_start_matches_with_stations: Option<bool>,

    /// Present only when the response included matches, in API order.
    pub matches: Vec<Match>,
    /// Raw participant records, `None` unless the response included them.
    pub participants: Option<Vec<serde_json::Value>>,

    pub(crate) conn: Connection,
    pub(crate) matches_client: Matches,
}

/// A single match of a tournament.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: u64,
    pub tournament_id: u64,
    pub identifier: String,
    pub round: i64,
    pub state: MatchState,
    pub group_id: Option<u64>,
    pub location: Option<String>,

    pub player1_id: Option<u64>,
    pub player1_is_prereq_match_loser: bool,
    pub player1_prereq_match_id: Option<u64>,
    pub player1_votes: Option<i64>,
    pub player2_id: Option<u64>,
    pub player2_is_prereq_match_loser: bool,
    pub player2_prereq_match_id: Option<u64>,
    pub player2_votes: Option<i64>,
    pub winner_id: Option<u64>,
    pub loser_id: Option<u64>,
    pub scores_csv: String,
    pub prerequisite_match_ids_csv: Option<String>,

    pub attachment_count: Option<i64>,
    pub has_attachment: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub underway_at: Option<DateTime<Utc>>,
}

/// Which sub-collections a tournament response should embed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Include {
    pub participants: bool,
    pub matches: bool,
}

impl Include {
    pub fn all() -> Self {
        Self {
            participants: true,
            matches: true,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A pending single elimination tournament without embedded collections.
    pub const TOURNAMENT_JSON: &str = include_str!("../fixtures/tournament.json");
    /// An open first-round match of that tournament.
    pub const MATCH_JSON: &str = include_str!("../fixtures/match.json");
}
