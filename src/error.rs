use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("Invalid entry choice: {0} (expected long, short or skip)")]
    InvalidEntry(String),

    #[error("Invalid exit choice: {0} (expected smart or greedy)")]
    InvalidExit(String),

    #[error("Invalid chart kind: {0} (expected liquidity, fvg, bos or orb)")]
    InvalidChartKind(String),

    #[error("Game over: all scenarios have been played")]
    GameOver,

    #[error("Balance out of range: {balance} {delta:+}")]
    BalanceOverflow { balance: i64, delta: i64 },

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Chart error: {0}")]
    Chart(String),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
