//! Page rendering for a session
//!
//! `handle` is the only way a session moves forward: it takes the current
//! session and a user event, and hands back the next session together with
//! the page to show. Both front ends (HTTP API and terminal) go through it.

use serde::Serialize;
use std::fmt::Write as _;

use crate::engine::{GameState, Outcome, Session};
use crate::error::Result;
use crate::scenarios::CONCEPTS;
use crate::types::{ChartKind, Concept, EntryChoice, ExitChoice};

pub const TITLE: &str = "Stock Market Game with Visual Learning";

/// Something the user did on the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Show the current page without changing anything
    View,
    /// Submit an entry/exit decision for the scenario on screen
    Submit { entry: EntryChoice, exit: ExitChoice },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Error,
}

/// Result message shown above the page after a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub tone: Tone,
    pub message: String,
    #[serde(rename = "balanceDelta")]
    pub balance_delta: i64,
}

impl From<Outcome> for Banner {
    fn from(outcome: Outcome) -> Self {
        Self {
            tone: if outcome.balance_delta < 0 { Tone::Error } else { Tone::Success },
            message: outcome.message,
            balance_delta: outcome.balance_delta,
        }
    }
}

/// Where the frontend fetches a scenario chart from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartRef {
    pub kind: ChartKind,
    pub seed: u64,
    pub url: String,
}

impl ChartRef {
    pub fn new(kind: ChartKind, seed: u64) -> Self {
        Self {
            kind,
            seed,
            url: format!("/api/charts/{}?seed={}", kind, seed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioView {
    /// 1-based position in the game
    pub number: usize,
    pub total: usize,
    pub name: &'static str,
    pub description: &'static str,
    pub chart: ChartRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum Page {
    Playing {
        title: &'static str,
        balance: i64,
        concepts: &'static [Concept],
        scenario: ScenarioView,
        #[serde(rename = "entryOptions")]
        entry_options: [EntryChoice; 3],
        #[serde(rename = "exitOptions")]
        exit_options: [ExitChoice; 2],
    },
    GameOver {
        title: &'static str,
        concepts: &'static [Concept],
        #[serde(rename = "finalBalance")]
        final_balance: i64,
        #[serde(rename = "startingBalance")]
        starting_balance: i64,
        passed: bool,
        message: &'static str,
    },
}

/// What to draw next
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Render {
    pub banner: Option<Banner>,
    pub page: Page,
}

/// Page for the session as it stands
pub fn page(session: &Session) -> Page {
    match session.current_scenario() {
        Some(scenario) => {
            let index = session.scenario_index();
            Page::Playing {
                title: TITLE,
                balance: session.balance(),
                concepts: &CONCEPTS,
                scenario: ScenarioView {
                    number: index + 1,
                    total: session.total_scenarios(),
                    name: scenario.name,
                    description: scenario.description,
                    chart: ChartRef::new(scenario.chart_kind, session.chart_seed_for(index)),
                },
                entry_options: EntryChoice::ALL,
                exit_options: ExitChoice::ALL,
            }
        }
        None => Page::GameOver {
            title: TITLE,
            concepts: &CONCEPTS,
            final_balance: session.balance(),
            starting_balance: session.config().starting_balance,
            passed: session.is_profitable(),
            message: session.outcome_message(),
        },
    }
}

/// Apply an event and return the next session with the page to show.
///
/// A rejected submit leaves the session untouched and comes back as `Err`.
pub fn handle(mut session: Session, event: Event) -> (Session, Result<Render>) {
    let render = match event {
        Event::View => Ok(Render {
            banner: None,
            page: page(&session),
        }),
        Event::Submit { entry, exit } => session.submit(entry, exit).map(|outcome| Render {
            banner: Some(outcome.into()),
            page: page(&session),
        }),
    };
    (session, render)
}

/// Plain text version of a render, for the terminal
pub fn render_text(render: &Render) -> String {
    let mut out = String::new();

    if let Some(banner) = &render.banner {
        let marker = match banner.tone {
            Tone::Success => "+",
            Tone::Error => "!",
        };
        let _ = writeln!(out, "[{}] {} ({:+})", marker, banner.message, banner.balance_delta);
        let _ = writeln!(out);
    }

    let (title, balance, concepts) = match &render.page {
        Page::Playing {
            title,
            balance,
            concepts,
            ..
        } => (title, balance, concepts),
        Page::GameOver {
            title,
            final_balance,
            concepts,
            ..
        } => (title, final_balance, concepts),
    };

    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "Balance: ${}", balance);
    let _ = writeln!(out, "{}", "-".repeat(40));
    let _ = writeln!(out, "Market Concepts");
    for concept in concepts.iter() {
        let _ = writeln!(out, "  {}: {}", concept.name, concept.explanation);
    }
    let _ = writeln!(out, "{}", "-".repeat(40));

    match &render.page {
        Page::Playing { scenario, .. } => {
            let _ = writeln!(
                out,
                "Scenario {}/{}: {}",
                scenario.number, scenario.total, scenario.name
            );
            let _ = writeln!(out, "{}", scenario.description);
        }
        Page::GameOver {
            final_balance,
            passed,
            message,
            ..
        } => {
            let _ = writeln!(out, "Game Over");
            let _ = writeln!(out, "Final Balance: ${}", final_balance);
            let _ = writeln!(out, "[{}] {}", if *passed { "+" } else { "!" }, message);
        }
    }

    out
}

impl Render {
    pub fn state(&self) -> GameState {
        match self.page {
            Page::Playing { .. } => GameState::Playing,
            Page::GameOver { .. } => GameState::GameOver,
        }
    }
}
