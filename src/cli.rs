use challonge_api::{Include, MatchState, TournamentState, TournamentType, Value, WireEnum};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Manage Challonge tournaments from the terminal.
///
/// Credentials come from `--config` and the `CHALLONGE_USERNAME` /
/// `CHALLONGE_API_KEY` environment variables.
#[derive(Parser, Debug)]
#[command(name = "challonge", version, about, long_about = None)]
pub struct Cli {
    /// YAML file with `username`, `api_key` and optionally `base_url`.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (`-v` info, `-vv` debug). `RUST_LOG` wins if set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Tournaments(TournamentCommand),
    #[command(subcommand)]
    Matches(MatchCommand),
}

#[derive(Subcommand, Debug)]
pub enum TournamentCommand {
    /// List tournaments of the account.
    List {
        /// all, pending, in_progress or ended.
        #[arg(long, value_parser = choice::<TournamentState>)]
        state: Option<TournamentState>,
        #[arg(long = "type", value_parser = choice::<TournamentType>)]
        kind: Option<TournamentType>,
        /// YYYY-MM-DD
        #[arg(long)]
        created_after: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        created_before: Option<String>,
        #[arg(long)]
        subdomain: Option<String>,
    },
    /// Show one tournament by id or url.
    Show(Target),
    /// Create a tournament.
    Create {
        name: String,
        /// Letters, numbers and underscores only.
        url: String,
        #[arg(long = "type", value_parser = choice::<TournamentType>)]
        kind: Option<TournamentType>,
        /// Any other tournament field, e.g. `--set signup_cap=16`.
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_field)]
        fields: Vec<(String, Value)>,
    },
    /// Change fields of a tournament.
    Update {
        id: String,
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_field, required = true)]
        fields: Vec<(String, Value)>,
    },
    Start(Target),
    Reset(Target),
    Finalize(Target),
    AbortCheckIn(Target),
    OpenForPredictions(Target),
    ProcessCheckIns(Target),
    Delete(Target),
}

#[derive(Subcommand, Debug)]
pub enum MatchCommand {
    /// List matches of a tournament.
    List {
        tournament_id: u64,
        /// all, pending, open or complete.
        #[arg(long, value_parser = choice::<MatchState>)]
        state: Option<MatchState>,
        #[arg(long)]
        participant_id: Option<u64>,
    },
    Show { tournament_id: u64, match_id: u64 },
}

#[derive(Args, Debug)]
pub struct Target {
    /// Numeric id, url, or `subdomain-url` for organization tournaments.
    pub id: String,
    /// Embed participants in the response.
    #[arg(long)]
    pub participants: bool,
    /// Embed matches in the response.
    #[arg(long)]
    pub matches: bool,
}

impl Target {
    pub fn include(&self) -> Include {
        Include {
            participants: self.participants,
            matches: self.matches,
        }
    }
}

/// A symbolic name (`round_robin`) or a wire string (`"round robin"`).
fn choice<T: WireEnum>(raw: &str) -> Result<T, String> {
    T::ALL
        .iter()
        .copied()
        .find(|member| member.name() == raw)
        .or_else(|| T::from_wire(Some(raw)).ok())
        .ok_or_else(|| {
            let names: Vec<_> = T::ALL.iter().map(|member| member.name()).collect();
            format!("expected one of {}", names.join(", "))
        })
}

/// `key=value`; the value is typed by [`Value::infer`].
fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("missing field name in `{raw}`"));
    }
    Ok((key.to_owned(), Value::infer(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn set_values_are_typed() {
        assert_eq!(
            parse_field("signup_cap=16"),
            Ok(("signup_cap".to_owned(), Value::Int(16)))
        );
        assert_eq!(
            parse_field("private=true"),
            Ok(("private".to_owned(), Value::Bool(true)))
        );
        assert_eq!(
            parse_field("description=a=b"),
            Ok(("description".to_owned(), Value::Text("a=b".into())))
        );
        assert!(parse_field("private").is_err());
        assert!(parse_field("=1").is_err());
    }

    #[test]
    fn enum_arguments_accept_names_and_wire_strings() {
        let cli = Cli::try_parse_from([
            "challonge",
            "tournaments",
            "list",
            "--state",
            "in_progress",
            "--type",
            "double elimination",
        ])
        .unwrap();
        match cli.command {
            Command::Tournaments(TournamentCommand::List { state, kind, .. }) => {
                assert_eq!(state, Some(TournamentState::InProgress));
                assert_eq!(kind, Some(TournamentType::DoubleElimination));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn choice_parser_accepts_names_and_wire_strings() {
        assert_eq!(choice("round_robin"), Ok(TournamentType::RoundRobin));
        assert_eq!(choice("round robin"), Ok(TournamentType::RoundRobin));
        assert_eq!(choice("in_progress"), Ok(TournamentState::InProgress));
        let err = choice::<MatchState>("sideways").unwrap_err();
        assert_eq!(err, "expected one of all, pending, open, complete");
    }

    #[test]
    fn transition_commands_take_include_flags() {
        let cli = Cli::try_parse_from([
            "challonge",
            "-vv",
            "tournaments",
            "abort-check-in",
            "spring_cup",
            "--matches",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Tournaments(TournamentCommand::AbortCheckIn(target)) => {
                assert_eq!(target.id, "spring_cup");
                assert_eq!(
                    target.include(),
                    Include {
                        participants: false,
                        matches: true
                    }
                );
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn update_requires_fields() {
        assert!(Cli::try_parse_from(["challonge", "tournaments", "update", "1"]).is_err());
    }
}
