use crate::cli::{Command, MatchCommand, Target, TournamentCommand};
use anyhow::Context;
use challonge_api::{
    ApiResult, Challonge, Include, Match, MatchFilter, Tournament, TournamentFilter, TournamentParams,
    WireEnum,
};
use chrono::{DateTime, Local, Utc};
use log::info;
use std::io::Write;

pub fn run(challonge: &Challonge, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Command::Tournaments(command) => tournaments(challonge, command, out),
        Command::Matches(command) => matches(challonge, command, out),
    }
}

fn tournaments(
    challonge: &Challonge,
    command: TournamentCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let client = challonge.tournaments();
    match command {
        TournamentCommand::List {
            state,
            kind,
            created_after,
            created_before,
            subdomain,
        } => {
            let mut filter = TournamentFilter::new();
            if let Some(state) = state {
                filter = filter.state(state);
            }
            if let Some(kind) = kind {
                filter = filter.tournament_type(kind);
            }
            if let Some(date) = created_after {
                filter = filter.created_after(date);
            }
            if let Some(date) = created_before {
                filter = filter.created_before(date);
            }
            if let Some(subdomain) = subdomain {
                filter = filter.subdomain(subdomain);
            }
            let list = client.list(&filter)?;
            for tournament in &list {
                write_tournament_row(out, tournament)?;
            }
            if list.is_empty() {
                writeln!(out, "No tournaments")?;
            }
        }
        TournamentCommand::Show(target) => {
            let tournament = client.get(&target.id, target.include())?;
            write_tournament(out, &tournament)?;
        }
        TournamentCommand::Create {
            name,
            url,
            kind,
            fields,
        } => {
            let mut params = TournamentParams::new().name(name).url(url);
            if let Some(kind) = kind {
                params = params.tournament_type(kind);
            }
            for (key, value) in fields {
                params.set(key, value);
            }
            let tournament = client.create(&params)?;
            writeln!(out, "Created tournament {}", tournament.id)?;
            write_tournament(out, &tournament)?;
        }
        TournamentCommand::Update { id, fields } => {
            let mut params = TournamentParams::new();
            for (key, value) in fields {
                params.set(key, value);
            }
            let mut tournament = client.get(&id, Include::default())?;
            tournament.update(&params)?;
            write_tournament(out, &tournament)?;
        }
        TournamentCommand::Start(target) => {
            transition(challonge, &target, "start", Tournament::start, out)?
        }
        TournamentCommand::Reset(target) => {
            transition(challonge, &target, "reset", Tournament::reset, out)?
        }
        TournamentCommand::Finalize(target) => {
            transition(challonge, &target, "finalize", Tournament::finalize, out)?
        }
        TournamentCommand::AbortCheckIn(target) => transition(
            challonge,
            &target,
            "abort_check_in",
            Tournament::abort_check_in,
            out,
        )?,
        TournamentCommand::OpenForPredictions(target) => transition(
            challonge,
            &target,
            "open_for_predictions",
            Tournament::open_for_predictions,
            out,
        )?,
        TournamentCommand::ProcessCheckIns(target) => transition(
            challonge,
            &target,
            "process_check_ins",
            Tournament::process_check_ins,
            out,
        )?,
        TournamentCommand::Delete(target) => {
            let tournament = client.get(&target.id, Include::default())?;
            tournament.delete(target.include())?;
            writeln!(out, "Deleted tournament {} ({})", tournament.id, tournament.name)?;
        }
    }
    Ok(())
}

/// Run a state change, then fetch the tournament again to show the new state.
fn transition(
    challonge: &Challonge,
    target: &Target,
    action: &str,
    operation: fn(&Tournament, Include) -> ApiResult<()>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let client = challonge.tournaments();
    let tournament = client.get(&target.id, Include::default())?;
    let include = target.include();
    operation(&tournament, include)
        .with_context(|| format!("{action} failed for tournament {}", tournament.id))?;

    info!("{action} accepted for tournament {}", tournament.id);
    let refreshed = client.get(tournament.id, include)?;
    writeln!(out, "{}: {} -> {}", refreshed.name, tournament.state, refreshed.state)?;
    Ok(())
}

fn matches(challonge: &Challonge, command: MatchCommand, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        MatchCommand::List {
            tournament_id,
            state,
            participant_id,
        } => {
            let mut filter = MatchFilter::new();
            if let Some(state) = state {
                filter = filter.state(state);
            }
            if let Some(id) = participant_id {
                filter = filter.participant_id(id);
            }
            let list = challonge.tournaments().matches(tournament_id).list(&filter)?;
            for m in &list {
                write_match(out, m)?;
            }
            if list.is_empty() {
                writeln!(out, "No matches")?;
            }
        }
        MatchCommand::Show {
            tournament_id,
            match_id,
        } => {
            let m = challonge.tournaments().matches(tournament_id).get(match_id)?;
            write_match(out, &m)?;
        }
    }
    Ok(())
}

fn local(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_owned())
}

fn player(id: Option<u64>) -> String {
    id.map_or_else(|| "TBD".to_owned(), |id| id.to_string())
}

fn write_tournament_row(out: &mut impl Write, t: &Tournament) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>10}  {:<12} {:<20} {}",
        t.id,
        t.state,
        t.tournament_type.to_string(),
        t.name
    )
}

fn write_tournament(out: &mut impl Write, t: &Tournament) -> std::io::Result<()> {
    writeln!(out, "{} (#{})", t.name, t.id)?;
    writeln!(out, "  url:          {}", t.full_challonge_url)?;
    writeln!(out, "  state:        {} ({}%)", t.state, t.progress_meter)?;
    writeln!(out, "  type:         {}", t.tournament_type)?;
    writeln!(out, "  ranked by:    {}", t.ranked_by)?;
    if let Some(game) = &t.game_name {
        writeln!(out, "  game:         {game}")?;
    }
    let cap = t.signup_cap.map_or_else(|| "-".to_owned(), |cap| cap.to_string());
    writeln!(out, "  participants: {} (cap {cap})", t.participants_count)?;
    writeln!(out, "  starts:       {}", local(t.start_at))?;
    writeln!(out, "  created:      {}", local(t.created_at))?;
    if let Some(participants) = &t.participants {
        writeln!(out, "  participant records:")?;
        for record in participants {
            writeln!(out, "    {record}")?;
        }
    }
    if !t.matches.is_empty() {
        writeln!(out, "  matches:")?;
        for m in &t.matches {
            write!(out, "  ")?;
            write_match(out, m)?;
        }
    }
    Ok(())
}

fn write_match(out: &mut impl Write, m: &Match) -> std::io::Result<()> {
    let scores = if m.scores_csv.is_empty() {
        "-"
    } else {
        m.scores_csv.as_str()
    };
    writeln!(
        out,
        "{:>4} r{:<3} {:<9} {} vs {}  {scores}  winner {}",
        m.identifier,
        m.round,
        m.state.name(),
        player(m.player1_id),
        player(m.player2_id),
        player(m.winner_id),
    )
}
