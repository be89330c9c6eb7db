// =============================================================================
// Signal Aggregator — checklist fold and verdict
// =============================================================================
//
// Combines the six booleans into an ordered checklist (insertion order is the
// display order) and classifies the verdict from the passing count:
//
//   >= 5  StrongSignal
//   >= 3  Neutral
//   else  Avoid
//
// A pure, stateless fold — no state machine behind it.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::patterns::PatternSnapshot;

/// Total number of checklist entries.
pub const CHECKLIST_LEN: usize = 6;

/// One checklist entry with its display label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalCheck {
    pub name: String,
    pub passed: bool,
}

/// Verdict classification over the whole checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    StrongSignal,
    Neutral,
    Avoid,
}

impl Verdict {
    pub fn from_passing_count(count: usize) -> Self {
        if count >= 5 {
            Self::StrongSignal
        } else if count >= 3 {
            Self::Neutral
        } else {
            Self::Avoid
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongSignal => write!(f, "Strong signal"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Avoid => write!(f, "Avoid"),
        }
    }
}

/// Aggregated checklist plus verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    pub signals: Vec<SignalCheck>,
    pub passing_count: usize,
    pub verdict: Verdict,
}

/// Fold the pattern booleans and the R/R check into the ordered checklist.
pub fn aggregate(patterns: &PatternSnapshot, good_rr: bool) -> Checklist {
    let entries = [
        ("In uptrend", patterns.uptrend),
        ("HH/HL pattern", patterns.hh_hl),
        ("Near resistance", patterns.near_resistance),
        ("Volume spike", patterns.volume_spike),
        ("Clear levels", patterns.clear_levels),
        ("Good R/R ratio", good_rr),
    ];

    let signals: Vec<SignalCheck> = entries
        .iter()
        .map(|&(name, passed)| SignalCheck {
            name: name.to_string(),
            passed,
        })
        .collect();

    let passing_count = signals.iter().filter(|s| s.passed).count();

    Checklist {
        signals,
        passing_count,
        verdict: Verdict::from_passing_count(passing_count),
    }
}
