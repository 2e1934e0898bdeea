//! Scenario engine
//!
//! Walks a session through the fixed scenario table:
//! 1. PLAYING - a scenario is on screen, waiting for an entry/exit decision
//! 2. GAME_OVER - every scenario has been scored, balance is final
//!
//! Each submitted decision is scored, applied to the balance, and advances the
//! session by exactly one scenario. There is no way back from GAME_OVER; a new
//! session has to be started.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::GameConfig;
use crate::error::{Result, TrainerError};
use crate::scenarios::SCENARIOS;
use crate::types::{EntryChoice, ExitChoice, Scenario};

pub const SKIPPED_MESSAGE: &str = "Skipped the trade.";
pub const WRONG_ENTRY_MESSAGE: &str = "Wrong entry type. You entered against the setup.";
pub const PASSED_MESSAGE: &str = "Well done! You made profitable decisions.";
pub const FAILED_MESSAGE: &str = "You need more practice. Review the concepts and try again.";

/// State of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// A scenario is waiting for a decision
    Playing,
    /// All scenarios scored
    GameOver,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameState::Playing => write!(f, "PLAYING"),
            GameState::GameOver => write!(f, "GAME_OVER"),
        }
    }
}

/// Result of scoring one decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub message: String,
    #[serde(rename = "balanceDelta")]
    pub balance_delta: i64,
}

/// Score a decision against a scenario without touching any session
pub fn score(
    scenario: &Scenario,
    entry: EntryChoice,
    exit: ExitChoice,
    config: &GameConfig,
) -> Outcome {
    let Some(direction) = entry.direction() else {
        return Outcome {
            message: SKIPPED_MESSAGE.to_string(),
            balance_delta: 0,
        };
    };

    if direction != scenario.correct_entry {
        return Outcome {
            message: WRONG_ENTRY_MESSAGE.to_string(),
            balance_delta: -config.wrong_entry_penalty,
        };
    }

    match exit {
        ExitChoice::Smart => Outcome {
            message: format!("Smart exit at {}!", scenario.good_exit_label),
            balance_delta: config.smart_exit_reward,
        },
        ExitChoice::Greedy => Outcome {
            message: format!("Poor exit at {}!", scenario.bad_exit_label),
            balance_delta: -config.greedy_exit_penalty,
        },
    }
}

/// One scored decision, kept for the session history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    #[serde(rename = "scenarioIndex")]
    pub scenario_index: usize,
    pub scenario: String,
    pub entry: EntryChoice,
    pub exit: ExitChoice,
    pub message: String,
    #[serde(rename = "balanceDelta")]
    pub balance_delta: i64,
    #[serde(rename = "balanceAfter")]
    pub balance_after: i64,
}

/// One player's run through the scenarios
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    #[serde(skip)]
    config: GameConfig,
    balance: i64,
    #[serde(rename = "scenarioIndex")]
    scenario_index: usize,
    /// Base seed; scenario `i` draws its chart from `chart_seed + i`
    #[serde(rename = "chartSeed")]
    chart_seed: u64,
    history: Vec<DecisionRecord>,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "lastActive")]
    last_active: DateTime<Utc>,
}

impl Session {
    /// Start a fresh session at the first scenario
    pub fn new(config: GameConfig, chart_seed: u64) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        debug!("New session {} (seed {})", id, chart_seed);
        Self {
            id,
            balance: config.starting_balance,
            config,
            scenario_index: 0,
            chart_seed,
            history: Vec::new(),
            created_at: now,
            last_active: now,
        }
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn scenario_index(&self) -> usize {
        self.scenario_index
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn history(&self) -> &[DecisionRecord] {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last scored decision, or creation if none yet
    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    /// Whether the session has been idle longer than `ttl` at `now`
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.last_active > ttl
    }

    pub fn total_scenarios(&self) -> usize {
        SCENARIOS.len()
    }

    pub fn state(&self) -> GameState {
        if self.scenario_index < SCENARIOS.len() {
            GameState::Playing
        } else {
            GameState::GameOver
        }
    }

    pub fn is_over(&self) -> bool {
        self.state() == GameState::GameOver
    }

    /// Scenario on screen, or None once the game is over
    pub fn current_scenario(&self) -> Option<&'static Scenario> {
        SCENARIOS.get(self.scenario_index)
    }

    /// Chart seed for the scenario at `index`
    pub fn chart_seed_for(&self, index: usize) -> u64 {
        self.chart_seed.wrapping_add(index as u64)
    }

    /// Score a decision on the current scenario and advance by one
    pub fn submit(&mut self, entry: EntryChoice, exit: ExitChoice) -> Result<Outcome> {
        let Some(scenario) = self.current_scenario() else {
            return Err(TrainerError::GameOver);
        };

        let outcome = score(scenario, entry, exit, &self.config);
        self.balance = self
            .balance
            .checked_add(outcome.balance_delta)
            .ok_or(TrainerError::BalanceOverflow {
                balance: self.balance,
                delta: outcome.balance_delta,
            })?;
        self.last_active = Utc::now();

        self.history.push(DecisionRecord {
            scenario_index: self.scenario_index,
            scenario: scenario.name.to_string(),
            entry,
            exit,
            message: outcome.message.clone(),
            balance_delta: outcome.balance_delta,
            balance_after: self.balance,
        });
        self.scenario_index += 1;

        info!(
            "Session {} scenario {}/{}: {} {} -> {:+} (balance {})",
            self.id,
            self.scenario_index,
            SCENARIOS.len(),
            entry,
            exit,
            outcome.balance_delta,
            self.balance
        );

        if self.is_over() {
            info!(
                "Session {} finished with {} ({})",
                self.id,
                self.balance,
                if self.is_profitable() { "passed" } else { "failed" }
            );
        }

        Ok(outcome)
    }

    /// Whether the balance ended above where it started
    pub fn is_profitable(&self) -> bool {
        self.balance > self.config.starting_balance
    }

    /// Closing verdict for the game over screen
    pub fn outcome_message(&self) -> &'static str {
        if self.is_profitable() {
            PASSED_MESSAGE
        } else {
            FAILED_MESSAGE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn wrong_direction(scenario: &Scenario) -> EntryChoice {
        match scenario.correct_entry {
            Direction::Long => EntryChoice::Short,
            Direction::Short => EntryChoice::Long,
        }
    }

    fn right_direction(scenario: &Scenario) -> EntryChoice {
        match scenario.correct_entry {
            Direction::Long => EntryChoice::Long,
            Direction::Short => EntryChoice::Short,
        }
    }

    #[test]
    fn test_session_init() {
        let session = Session::new(GameConfig::default(), 7);
        assert_eq!(session.state(), GameState::Playing);
        assert_eq!(session.balance(), 10_000);
        assert_eq!(session.scenario_index(), 0);
        assert_eq!(session.current_scenario().unwrap().name, "Liquidity Grab - Short Setup");
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_skip_is_always_neutral() {
        let config = GameConfig::default();
        for scenario in SCENARIOS.iter() {
            for exit in ExitChoice::ALL {
                let outcome = score(scenario, EntryChoice::Skip, exit, &config);
                assert_eq!(outcome.balance_delta, 0);
                assert_eq!(outcome.message, SKIPPED_MESSAGE);
            }
        }
    }

    #[test]
    fn test_wrong_direction_costs_300_regardless_of_exit() {
        let config = GameConfig::default();
        for scenario in SCENARIOS.iter() {
            for exit in ExitChoice::ALL {
                let outcome = score(scenario, wrong_direction(scenario), exit, &config);
                assert_eq!(outcome.balance_delta, -300);
                assert_eq!(outcome.message, WRONG_ENTRY_MESSAGE);
            }
        }
    }

    #[test]
    fn test_right_direction_exits() {
        let config = GameConfig::default();
        for scenario in SCENARIOS.iter() {
            let smart = score(scenario, right_direction(scenario), ExitChoice::Smart, &config);
            assert_eq!(smart.balance_delta, 500);
            assert_eq!(smart.message, format!("Smart exit at {}!", scenario.good_exit_label));

            let greedy = score(scenario, right_direction(scenario), ExitChoice::Greedy, &config);
            assert_eq!(greedy.balance_delta, -200);
            assert_eq!(greedy.message, format!("Poor exit at {}!", scenario.bad_exit_label));
        }
    }

    #[test]
    fn test_long_on_liquidity_grab_is_wrong_entry() {
        let mut session = Session::new(GameConfig::default(), 0);
        let outcome = session.submit(EntryChoice::Long, ExitChoice::Smart).unwrap();

        assert_eq!(outcome.balance_delta, -300);
        assert_eq!(session.balance(), 9_700);
        assert_eq!(session.scenario_index(), 1);
    }

    #[test]
    fn test_index_advances_once_per_submit_until_game_over() {
        let mut session = Session::new(GameConfig::default(), 0);
        for expected in 1..=4 {
            assert!(session.current_scenario().is_some());
            session.submit(EntryChoice::Skip, ExitChoice::Smart).unwrap();
            assert_eq!(session.scenario_index(), expected);
        }

        assert_eq!(session.state(), GameState::GameOver);
        assert!(session.current_scenario().is_none());
    }

    #[test]
    fn test_submit_after_game_over_is_rejected() {
        let mut session = Session::new(GameConfig::default(), 0);
        for _ in 0..4 {
            session.submit(EntryChoice::Long, ExitChoice::Smart).unwrap();
        }
        let balance = session.balance();

        let result = session.submit(EntryChoice::Long, ExitChoice::Smart);
        assert!(matches!(result, Err(TrainerError::GameOver)));
        assert_eq!(session.balance(), balance);
        assert_eq!(session.scenario_index(), 4);
        assert_eq!(session.history().len(), 4);
    }

    #[test]
    fn test_final_balance_is_start_plus_deltas() {
        let mut session = Session::new(GameConfig::default(), 0);
        let decisions = [
            (EntryChoice::Short, ExitChoice::Smart),  // +500
            (EntryChoice::Long, ExitChoice::Greedy),  // -200
            (EntryChoice::Short, ExitChoice::Smart),  // -300
            (EntryChoice::Skip, ExitChoice::Greedy),  // 0
        ];

        let mut total = 0;
        for (entry, exit) in decisions {
            total += session.submit(entry, exit).unwrap().balance_delta;
        }

        assert_eq!(total, 0);
        assert_eq!(session.balance(), 10_000);
        assert!(!session.is_profitable());
        assert_eq!(session.outcome_message(), FAILED_MESSAGE);
        assert_eq!(session.history().last().unwrap().balance_after, 10_000);
    }

    #[test]
    fn test_perfect_run_passes() {
        let mut session = Session::new(GameConfig::default(), 0);
        while let Some(scenario) = session.current_scenario() {
            session
                .submit(right_direction(scenario), ExitChoice::Smart)
                .unwrap();
        }

        assert_eq!(session.balance(), GameConfig::default().max_balance(4));
        assert!(session.is_profitable());
        assert_eq!(session.outcome_message(), PASSED_MESSAGE);
    }

    #[test]
    fn test_balance_overflow_is_rejected() {
        let mut session = Session::new(GameConfig::with_starting_balance(i64::MAX), 0);
        let result = session.submit(EntryChoice::Short, ExitChoice::Smart);

        assert!(matches!(
            result,
            Err(TrainerError::BalanceOverflow { delta: 500, .. })
        ));
        assert_eq!(session.balance(), i64::MAX);
        assert_eq!(session.scenario_index(), 0);
        assert!(session.history().is_empty());

        let mut session = Session::new(GameConfig::with_starting_balance(i64::MIN), 0);
        assert!(session.submit(EntryChoice::Long, ExitChoice::Smart).is_err());
        assert_eq!(session.balance(), i64::MIN);
    }

    #[test]
    fn test_expiry_follows_last_activity() {
        let mut session = Session::new(GameConfig::default(), 0);
        let ttl = chrono::Duration::minutes(30);
        let created = session.created_at();

        assert!(!session.is_expired(created + chrono::Duration::minutes(29), ttl));
        assert!(session.is_expired(created + chrono::Duration::minutes(31), ttl));

        session.submit(EntryChoice::Skip, ExitChoice::Smart).unwrap();
        assert!(session.last_active() >= created);
        assert!(!session.is_expired(session.last_active() + chrono::Duration::minutes(29), ttl));
    }

    #[test]
    fn test_chart_seed_per_scenario() {
        let session = Session::new(GameConfig::default(), u64::MAX);
        assert_eq!(session.chart_seed_for(0), u64::MAX);
        assert_eq!(session.chart_seed_for(1), 0);
    }
}
