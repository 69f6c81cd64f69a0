//! Data preparation: turn raw outcome records into the derived tables the
//! dashboard reads. Runs once at startup; the result is never mutated.

pub mod aggregate;
pub mod cohort;

pub use aggregate::{AvgFailsRow, GamesRow, RankingRow};
pub use cohort::PipelineReport;

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::{info, warn};

use crate::data::models::{Difficulty, OutcomeRecord};

/// Which players and puzzles take part in the analysis.
#[derive(Debug, Clone)]
pub struct CohortRules {
    /// Tracked players, in display order, without duplicates
    pub roster: Vec<String>,
    pub excluded_puzzles: BTreeSet<u32>,
    /// Exclusive upper bound on puzzle numbers
    pub max_puzzle: Option<u32>,
}

impl CohortRules {
    pub fn new(
        roster: impl IntoIterator<Item = String>,
        excluded_puzzles: impl IntoIterator<Item = u32>,
        max_puzzle: Option<u32>,
    ) -> Self {
        let mut seen = HashSet::new();
        let roster = roster
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();
        CohortRules {
            roster,
            excluded_puzzles: excluded_puzzles.into_iter().collect(),
            max_puzzle,
        }
    }

    pub fn roster_size(&self) -> usize {
        self.roster.len()
    }

    pub fn is_on_roster(&self, name: &str) -> bool {
        self.roster.iter().any(|n| n == name)
    }
}

/// Tables computed from the complete cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedTables {
    /// Retained outcome rows, input order preserved
    pub cohort_rows: Vec<OutcomeRecord>,
    pub cohort_puzzles: BTreeSet<u32>,
    pub ranking: Vec<RankingRow>,
    pub total_games: Vec<GamesRow>,
    pub avg_fails: Vec<AvgFailsRow>,
    pub report: PipelineReport,
}

impl DerivedTables {
    /// Number of cohort puzzles the player appears in.
    pub fn games_played(&self, name: &str) -> Option<usize> {
        self.total_games
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.games)
    }

    /// Mean fails for the player on `difficulty`, keyed by label.
    pub fn average_fails(&self, name: &str, difficulty: &Difficulty) -> Option<f64> {
        self.avg_fails
            .iter()
            .find(|r| r.name == name && &r.difficulty == difficulty)
            .and_then(|r| r.fails)
    }

    /// Retained rows for one player.
    pub fn rows_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a OutcomeRecord> + 'a {
        self.cohort_rows.iter().filter(move |r| r.name == name)
    }
}

/// Run the full pipeline over `records`.
pub fn build_tables(records: &[OutcomeRecord], rules: &CohortRules) -> DerivedTables {
    let cohort = cohort::select_cohort(records, rules);
    let has_cohort = !cohort.puzzles.is_empty();

    let report = &cohort.report;
    info!(
        "Cohort: {} puzzles, {} rows kept of {} (excluded={}, beyond_max={}, undefined={}, off_roster={}, incomplete={})",
        report.cohort_puzzles,
        report.cohort_rows,
        report.rows_read,
        report.dropped_excluded_puzzle,
        report.dropped_beyond_max_puzzle,
        report.dropped_undefined_difficulty,
        report.dropped_off_roster,
        report.dropped_incomplete_cohort,
    );
    if !has_cohort {
        warn!("No puzzle was played by all {} roster players; tables are empty", rules.roster_size());
    }

    DerivedTables {
        ranking: aggregate::ranking(&cohort.rows, &rules.roster, has_cohort),
        total_games: aggregate::total_games(&cohort.rows, &rules.roster, has_cohort),
        avg_fails: aggregate::average_fails(&cohort.rows),
        cohort_rows: cohort.rows,
        cohort_puzzles: cohort.puzzles,
        report: cohort.report,
    }
}
