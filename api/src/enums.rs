//! Closed value sets accepted and returned by the Challonge API.
//!
//! Every member has a symbolic name (`single_elimination`) and one or more
//! wire strings (`"single elimination"`). The first wire string is the
//! canonical one and is what gets sent. One member per type is the default
//! and is also what an absent (`null`) wire value decodes to.
use crate::params::Value;
use std::fmt;
use std::str::FromStr;

/// Strict conversion between an enumeration and its wire strings.
pub trait WireEnum: Copy + Sized + 'static {
    /// Type name used to tag enum instances passed as loose [`Value`]s.
    const NAME: &'static str;
    /// Every member, in declaration order.
    const ALL: &'static [Self];
    const DEFAULT: Self;

    /// Symbolic name, e.g. `in_progress`.
    fn name(self) -> &'static str;

    /// Accepted wire strings; the first one is canonical.
    fn wire_values(self) -> &'static [&'static str];

    fn wire(self) -> &'static str {
        self.wire_values()[0]
    }

    /// Decode a wire value. `None` (absent or `null`) decodes to the default member.
    fn from_wire(raw: Option<&str>) -> Result<Self, UnknownValue> {
        let Some(raw) = raw else {
            return Ok(Self::DEFAULT);
        };
        Self::ALL
            .iter()
            .copied()
            .find(|member| member.wire_values().contains(&raw))
            .ok_or_else(|| UnknownValue {
                kind: Self::NAME,
                value: raw.to_owned(),
            })
    }

    /// Back-quoted canonical wire strings, for error messages.
    fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|member| format!("`{}`", member.wire()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A wire string that matches no member of the enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a valid {}", self.value, self.kind)
    }
}

impl std::error::Error for UnknownValue {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TournamentType {
    #[default]
    SingleElimination,
    DoubleElimination,
    RoundRobin,
    Swiss,
}

impl WireEnum for TournamentType {
    const NAME: &'static str = "TournamentType";
    const ALL: &'static [Self] = &[
        TournamentType::SingleElimination,
        TournamentType::DoubleElimination,
        TournamentType::RoundRobin,
        TournamentType::Swiss,
    ];
    const DEFAULT: Self = TournamentType::SingleElimination;

    fn name(self) -> &'static str {
        match self {
            TournamentType::SingleElimination => "single_elimination",
            TournamentType::DoubleElimination => "double_elimination",
            TournamentType::RoundRobin => "round_robin",
            TournamentType::Swiss => "swiss",
        }
    }

    fn wire_values(self) -> &'static [&'static str] {
        match self {
            TournamentType::SingleElimination => &["single elimination"],
            TournamentType::DoubleElimination => &["double elimination"],
            TournamentType::RoundRobin => &["round robin"],
            TournamentType::Swiss => &["swiss"],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TournamentRankedBy {
    #[default]
    MatchWins,
    GameWins,
    PointsScored,
    PointsDifference,
    Custom,
}

impl WireEnum for TournamentRankedBy {
    const NAME: &'static str = "TournamentRankedBy";
    const ALL: &'static [Self] = &[
        TournamentRankedBy::MatchWins,
        TournamentRankedBy::GameWins,
        TournamentRankedBy::PointsScored,
        TournamentRankedBy::PointsDifference,
        TournamentRankedBy::Custom,
    ];
    const DEFAULT: Self = TournamentRankedBy::MatchWins;

    fn name(self) -> &'static str {
        match self {
            TournamentRankedBy::MatchWins => "match_wins",
            TournamentRankedBy::GameWins => "game_wins",
            TournamentRankedBy::PointsScored => "points_scored",
            TournamentRankedBy::PointsDifference => "points_difference",
            TournamentRankedBy::Custom => "custom",
        }
    }

    fn wire_values(self) -> &'static [&'static str] {
        match self {
            TournamentRankedBy::MatchWins => &["match wins"],
            TournamentRankedBy::GameWins => &["game wins"],
            TournamentRankedBy::PointsScored => &["points scored"],
            TournamentRankedBy::PointsDifference => &["points difference"],
            TournamentRankedBy::Custom => &["custom"],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GrandFinalsModifier {
    /// Grand finals as the tournament type plays them; sent as an empty string.
    #[default]
    Default,
    SingleMatch,
    Skip,
}

impl WireEnum for GrandFinalsModifier {
    const NAME: &'static str = "GrandFinalsModifier";
    const ALL: &'static [Self] = &[
        GrandFinalsModifier::Default,
        GrandFinalsModifier::SingleMatch,
        GrandFinalsModifier::Skip,
    ];
    const DEFAULT: Self = GrandFinalsModifier::Default;

    fn name(self) -> &'static str {
        match self {
            GrandFinalsModifier::Default => "default",
            GrandFinalsModifier::SingleMatch => "single_match",
            GrandFinalsModifier::Skip => "skip",
        }
    }

    fn wire_values(self) -> &'static [&'static str] {
        match self {
            GrandFinalsModifier::Default => &[""],
            GrandFinalsModifier::SingleMatch => &["single match"],
            GrandFinalsModifier::Skip => &["skip"],
        }
    }
}

/// Tournament state as used by the list filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TournamentState {
    #[default]
    All,
    Pending,
    InProgress,
    Ended,
}

impl WireEnum for TournamentState {
    const NAME: &'static str = "TournamentState";
    const ALL: &'static [Self] = &[
        TournamentState::All,
        TournamentState::Pending,
        TournamentState::InProgress,
        TournamentState::Ended,
    ];
    const DEFAULT: Self = TournamentState::All;

    fn name(self) -> &'static str {
        match self {
            TournamentState::All => "all",
            TournamentState::Pending => "pending",
            TournamentState::InProgress => "in_progress",
            TournamentState::Ended => "ended",
        }
    }

    fn wire_values(self) -> &'static [&'static str] {
        match self {
            TournamentState::All => &["all"],
            TournamentState::Pending => &["pending"],
            TournamentState::InProgress => &["in progress"],
            TournamentState::Ended => &["ended"],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatchState {
    #[default]
    All,
    Pending,
    Open,
    Complete,
}

impl WireEnum for MatchState {
    const NAME: &'static str = "MatchState";
    const ALL: &'static [Self] = &[
        MatchState::All,
        MatchState::Pending,
        MatchState::Open,
        MatchState::Complete,
    ];
    const DEFAULT: Self = MatchState::All;

    fn name(self) -> &'static str {
        match self {
            MatchState::All => "all",
            MatchState::Pending => "pending",
            MatchState::Open => "open",
            MatchState::Complete => "complete",
        }
    }

    fn wire_values(self) -> &'static [&'static str] {
        match self {
            MatchState::All => &["all"],
            MatchState::Pending => &["pending"],
            MatchState::Open => &["open"],
            MatchState::Complete => &["complete"],
        }
    }
}

macro_rules! wire_enum_impls {
    ($($ty:ty),+ $(,)?) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.wire())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownValue;

            /// Parses a wire string (`"round robin"`) only.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as WireEnum>::from_wire(Some(s))
            }
        }

        impl From<$ty> for Value {
            fn from(member: $ty) -> Self {
                Value::Choice {
                    kind: <$ty as WireEnum>::NAME,
                    wire: member.wire(),
                }
            }
        }
    )+};
}

wire_enum_impls!(
    TournamentType,
    TournamentRankedBy,
    GrandFinalsModifier,
    TournamentState,
    MatchState,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trips<T: WireEnum + PartialEq + fmt::Debug>() {
        for member in T::ALL {
            for wire in member.wire_values() {
                let decoded = T::from_wire(Some(*wire)).unwrap();
                assert_eq!(decoded, *member, "{wire:?} should decode to {member:?}");
                assert_eq!(decoded.wire(), member.wire());
            }
        }
    }

    #[test]
    fn every_wire_value_round_trips() {
        assert_round_trips::<TournamentType>();
        assert_round_trips::<TournamentRankedBy>();
        assert_round_trips::<GrandFinalsModifier>();
        assert_round_trips::<TournamentState>();
        assert_round_trips::<MatchState>();
    }

    #[test]
    fn absent_value_decodes_to_default_member() {
        assert_eq!(
            TournamentType::from_wire(None),
            Ok(TournamentType::SingleElimination)
        );
        assert_eq!(
            GrandFinalsModifier::from_wire(None),
            Ok(GrandFinalsModifier::Default)
        );
        assert_eq!(MatchState::from_wire(None), Ok(MatchState::All));
    }

    #[test]
    fn empty_string_is_the_default_grand_finals_modifier() {
        assert_eq!(
            GrandFinalsModifier::from_wire(Some("")),
            Ok(GrandFinalsModifier::Default)
        );
        assert_eq!(GrandFinalsModifier::Default.wire(), "");
    }

    #[test]
    fn unknown_wire_value_is_rejected() {
        let err = TournamentType::from_wire(Some("free for all")).unwrap_err();
        assert_eq!(err.kind, "TournamentType");
        assert_eq!(err.value, "free for all");
    }

    #[test]
    fn from_str_accepts_wire_strings_only() {
        assert_eq!("round robin".parse(), Ok(TournamentType::RoundRobin));
        assert_eq!("in progress".parse(), Ok(TournamentState::InProgress));
        assert!("round_robin".parse::<TournamentType>().is_err());
        assert!("in_progress".parse::<TournamentState>().is_err());
        assert!("default".parse::<GrandFinalsModifier>().is_err());
        assert!("sideways".parse::<MatchState>().is_err());
    }

    #[test]
    fn valid_values_lists_canonical_wire_strings() {
        assert_eq!(
            TournamentType::valid_values(),
            "`single elimination`, `double elimination`, `round robin`, `swiss`"
        );
    }

    #[test]
    fn enum_instances_become_tagged_values() {
        assert_eq!(
            Value::from(TournamentRankedBy::GameWins),
            Value::Choice {
                kind: "TournamentRankedBy",
                wire: "game wins"
            }
        );
    }
}
