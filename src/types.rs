use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::GameConfig;
use crate::engine::Session;
use crate::error::TrainerError;

/// Trade direction a scenario expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Entry the player picks for a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryChoice {
    Long,
    Short,
    Skip,
}

impl EntryChoice {
    pub const ALL: [EntryChoice; 3] = [EntryChoice::Long, EntryChoice::Short, EntryChoice::Skip];

    /// Direction taken, or None when the trade is skipped
    pub fn direction(self) -> Option<Direction> {
        match self {
            EntryChoice::Long => Some(Direction::Long),
            EntryChoice::Short => Some(Direction::Short),
            EntryChoice::Skip => None,
        }
    }
}

impl std::fmt::Display for EntryChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryChoice::Long => write!(f, "long"),
            EntryChoice::Short => write!(f, "short"),
            EntryChoice::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for EntryChoice {
    type Err = TrainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(EntryChoice::Long),
            "short" => Ok(EntryChoice::Short),
            "skip" => Ok(EntryChoice::Skip),
            _ => Err(TrainerError::InvalidEntry(s.to_string())),
        }
    }
}

/// Exit strategy the player picks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitChoice {
    Smart,
    Greedy,
}

impl ExitChoice {
    pub const ALL: [ExitChoice; 2] = [ExitChoice::Smart, ExitChoice::Greedy];
}

impl std::fmt::Display for ExitChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitChoice::Smart => write!(f, "smart"),
            ExitChoice::Greedy => write!(f, "greedy"),
        }
    }
}

impl FromStr for ExitChoice {
    type Err = TrainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smart" => Ok(ExitChoice::Smart),
            "greedy" => Ok(ExitChoice::Greedy),
            _ => Err(TrainerError::InvalidExit(s.to_string())),
        }
    }
}

/// Which pattern a scenario chart illustrates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Liquidity,
    Fvg,
    Bos,
    Orb,
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartKind::Liquidity => write!(f, "liquidity"),
            ChartKind::Fvg => write!(f, "fvg"),
            ChartKind::Bos => write!(f, "bos"),
            ChartKind::Orb => write!(f, "orb"),
        }
    }
}

impl FromStr for ChartKind {
    type Err = TrainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "liquidity" => Ok(ChartKind::Liquidity),
            "fvg" => Ok(ChartKind::Fvg),
            "bos" => Ok(ChartKind::Bos),
            "orb" => Ok(ChartKind::Orb),
            _ => Err(TrainerError::InvalidChartKind(s.to_string())),
        }
    }
}

/// A fixed multiple-choice setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "correctEntry")]
    pub correct_entry: Direction,
    #[serde(rename = "goodExit")]
    pub good_exit_label: &'static str,
    #[serde(rename = "badExit")]
    pub bad_exit_label: &'static str,
    #[serde(rename = "chartKind")]
    pub chart_kind: ChartKind,
}

/// Glossary entry shown above every scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Concept {
    pub name: &'static str,
    pub explanation: &'static str,
}

/// Body of a decision submitted from the frontend
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub entry: EntryChoice,
    pub exit: ExitChoice,
}

/// Shared application state
pub struct AppState {
    pub config: GameConfig,
    /// Chart seed for every new session; random per session when unset
    pub chart_seed: Option<u64>,
    pub sessions: RwLock<HashMap<Uuid, Session>>,
}

impl AppState {
    pub fn new(config: GameConfig, chart_seed: Option<u64>) -> Self {
        Self {
            config,
            chart_seed,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

/// Drop idle sessions, then the least recently active ones until there is
/// room for one more under `max_sessions`. Returns how many were removed.
pub fn prune_sessions(
    sessions: &mut HashMap<Uuid, Session>,
    config: &GameConfig,
    now: DateTime<Utc>,
) -> usize {
    let before = sessions.len();
    let ttl = config.session_ttl();
    sessions.retain(|_, session| !session.is_expired(now, ttl));

    let limit = config.max_sessions.max(1);
    if sessions.len() >= limit {
        let mut by_activity: Vec<(DateTime<Utc>, Uuid)> = sessions
            .values()
            .map(|s| (s.last_active(), s.id))
            .collect();
        by_activity.sort_unstable();

        let excess = sessions.len() + 1 - limit;
        for (_, id) in by_activity.into_iter().take(excess) {
            sessions.remove(&id);
        }
    }

    before - sessions.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_choice() {
        assert_eq!("long".parse::<EntryChoice>().unwrap(), EntryChoice::Long);
        assert_eq!(" SHORT ".parse::<EntryChoice>().unwrap(), EntryChoice::Short);
        assert_eq!("Skip".parse::<EntryChoice>().unwrap(), EntryChoice::Skip);
        assert!(matches!(
            "buy".parse::<EntryChoice>(),
            Err(TrainerError::InvalidEntry(_))
        ));
    }

    #[test]
    fn test_parse_exit_choice() {
        assert_eq!("smart".parse::<ExitChoice>().unwrap(), ExitChoice::Smart);
        assert_eq!("greedy".parse::<ExitChoice>().unwrap(), ExitChoice::Greedy);
        assert!("hold".parse::<ExitChoice>().is_err());
    }

    #[test]
    fn test_chart_kind_round_trips_through_display() {
        for kind in [ChartKind::Liquidity, ChartKind::Fvg, ChartKind::Bos, ChartKind::Orb] {
            assert_eq!(kind.to_string().parse::<ChartKind>().unwrap(), kind);
        }
        assert!("vwap".parse::<ChartKind>().is_err());
    }

    fn session_map(count: usize) -> HashMap<Uuid, Session> {
        (0..count)
            .map(|i| {
                let session = Session::new(GameConfig::default(), i as u64);
                (session.id, session)
            })
            .collect()
    }

    #[test]
    fn test_prune_drops_idle_sessions() {
        let config = GameConfig::default();
        let mut sessions = session_map(5);

        assert_eq!(prune_sessions(&mut sessions, &config, Utc::now()), 0);
        assert_eq!(sessions.len(), 5);

        let later = Utc::now() + config.session_ttl() + chrono::Duration::seconds(1);
        assert_eq!(prune_sessions(&mut sessions, &config, later), 5);
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_prune_makes_room_under_cap() {
        let config = GameConfig {
            max_sessions: 3,
            ..Default::default()
        };
        let mut sessions = session_map(3);
        let mut newest = Session::new(GameConfig::default(), 99);
        std::thread::sleep(std::time::Duration::from_millis(5));
        newest.submit(EntryChoice::Skip, ExitChoice::Smart).unwrap();
        let newest_id = newest.id;
        sessions.insert(newest_id, newest);

        let removed = prune_sessions(&mut sessions, &config, Utc::now());
        assert_eq!(removed, 2);
        assert_eq!(sessions.len(), 2);
        assert!(sessions.contains_key(&newest_id));
    }

    #[test]
    fn test_decision_request_rejects_unknown_values() {
        let ok: DecisionRequest =
            serde_json::from_str(r#"{"entry":"skip","exit":"greedy"}"#).unwrap();
        assert_eq!(ok.entry, EntryChoice::Skip);
        assert_eq!(ok.exit, ExitChoice::Greedy);

        assert!(serde_json::from_str::<DecisionRequest>(r#"{"entry":"buy","exit":"smart"}"#).is_err());
        assert!(serde_json::from_str::<DecisionRequest>(r#"{"entry":"long","exit":"hold"}"#).is_err());
    }
}
