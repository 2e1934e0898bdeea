//! Fixed scenario table and concept glossary

use crate::types::{ChartKind, Concept, Direction, Scenario};

pub static CONCEPTS: [Concept; 4] = [
    Concept {
        name: "Liquidity Grab",
        explanation: "A liquidity grab happens when price moves beyond a recent high/low to trap traders, then reverses.",
    },
    Concept {
        name: "FVG",
        explanation: "Fair Value Gap (FVG) is an imbalance between buyers and sellers visible as a gap in price.",
    },
    Concept {
        name: "BOS",
        explanation: "Break of Structure (BOS) occurs when price breaks a key high or low, indicating a trend change.",
    },
    Concept {
        name: "ORB",
        explanation: "Opening Range Breakout (ORB) is a strategy using the high and low of the first few minutes after market open.",
    },
];

/// Scenarios in play order
pub static SCENARIOS: [Scenario; 4] = [
    Scenario {
        name: "Liquidity Grab - Short Setup",
        description: "Price swept above previous high and closed back inside range.",
        correct_entry: Direction::Short,
        good_exit_label: "at previous low",
        bad_exit_label: "holding through reversal",
        chart_kind: ChartKind::Liquidity,
    },
    Scenario {
        name: "FVG Long Setup",
        description: "Price pulled into FVG and bounced.",
        correct_entry: Direction::Long,
        good_exit_label: "at supply zone",
        bad_exit_label: "holding through FVG close",
        chart_kind: ChartKind::Fvg,
    },
    Scenario {
        name: "BOS Confirmation",
        description: "Structure broke to upside after a higher low.",
        correct_entry: Direction::Long,
        good_exit_label: "at next swing high",
        bad_exit_label: "entering before BOS",
        chart_kind: ChartKind::Bos,
    },
    Scenario {
        name: "ORB Failure",
        description: "Price broke opening range high but reversed hard.",
        correct_entry: Direction::Long,
        good_exit_label: "quick scalp on breakout",
        bad_exit_label: "holding during pullback",
        chart_kind: ChartKind::Orb,
    },
];
