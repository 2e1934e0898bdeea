//! Game configuration

use serde::{Deserialize, Serialize};

/// Payoffs and bankroll for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Balance every session starts with (default: 10000)
    pub starting_balance: i64,

    /// Credited for the right direction with a smart exit
    pub smart_exit_reward: i64,

    /// Debited for the right direction with a greedy exit
    pub greedy_exit_penalty: i64,

    /// Debited for entering against the setup, whatever the exit
    pub wrong_entry_penalty: i64,

    /// Idle time after which a server session is dropped (default: 1 hour)
    pub session_ttl_secs: u64,

    /// Most sessions the server keeps at once; the least recently active go first
    pub max_sessions: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_balance: 10_000,
            smart_exit_reward: 500,
            greedy_exit_penalty: 200,
            wrong_entry_penalty: 300,
            session_ttl_secs: 3_600,
            max_sessions: 10_000,
        }
    }
}

impl GameConfig {
    /// Config with a different bankroll and the default payoffs
    pub fn with_starting_balance(starting_balance: i64) -> Self {
        Self {
            starting_balance,
            ..Default::default()
        }
    }

    /// Idle TTL, capped at the largest span chrono can represent
    pub fn session_ttl(&self) -> chrono::Duration {
        let max_secs = (i64::MAX / 1_000) as u64;
        chrono::Duration::seconds(self.session_ttl_secs.min(max_secs) as i64)
    }

    /// Best possible final balance for a session of `rounds` scenarios
    pub fn max_balance(&self, rounds: usize) -> i64 {
        self.starting_balance + self.smart_exit_reward * rounds as i64
    }
}
