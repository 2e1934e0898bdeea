// Library crate - scenario engine, chart generation and both front ends

pub mod types;
pub mod error;
pub mod config;
pub mod scenarios;
pub mod engine;
pub mod chart;
pub mod presentation;
pub mod api;
pub mod terminal;

// Re-export commonly used types
pub use types::*;
pub use config::GameConfig;
pub use engine::{GameState, Outcome, Session};
pub use error::TrainerError;
pub use presentation::{handle, Event, Page, Render};
