//! Cohort selection: drop excluded and unlabeled puzzles, keep the roster,
//! then keep only puzzles every roster player attempted.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::CohortRules;
use crate::data::models::OutcomeRecord;

/// How many input rows each filtering rule removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub rows_read: usize,
    pub dropped_excluded_puzzle: usize,
    pub dropped_beyond_max_puzzle: usize,
    pub dropped_undefined_difficulty: usize,
    pub dropped_off_roster: usize,
    pub dropped_incomplete_cohort: usize,
    pub cohort_rows: usize,
    pub cohort_puzzles: usize,
}

/// Rows and puzzle numbers that survived every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Cohort {
    pub rows: Vec<OutcomeRecord>,
    pub puzzles: BTreeSet<u32>,
    pub report: PipelineReport,
}

pub fn select_cohort(records: &[OutcomeRecord], rules: &CohortRules) -> Cohort {
    let mut report = PipelineReport {
        rows_read: records.len(),
        ..Default::default()
    };

    let mut candidates: Vec<&OutcomeRecord> = Vec::with_capacity(records.len());
    for record in records {
        if rules.excluded_puzzles.contains(&record.puzzle_num) {
            report.dropped_excluded_puzzle += 1;
        } else if rules.max_puzzle.is_some_and(|max| record.puzzle_num >= max) {
            report.dropped_beyond_max_puzzle += 1;
        } else if record.difficulty.is_undefined() {
            report.dropped_undefined_difficulty += 1;
        } else if !rules.is_on_roster(&record.name) {
            report.dropped_off_roster += 1;
        } else {
            candidates.push(record);
        }
    }

    // puzzle number -> distinct roster players who recorded it
    let mut players_by_puzzle: BTreeMap<u32, HashSet<&str>> = BTreeMap::new();
    for record in &candidates {
        players_by_puzzle
            .entry(record.puzzle_num)
            .or_default()
            .insert(record.name.as_str());
    }

    let roster_size = rules.roster_size();
    let puzzles: BTreeSet<u32> = players_by_puzzle
        .into_iter()
        .filter(|(_, players)| roster_size > 0 && players.len() == roster_size)
        .map(|(puzzle, _)| puzzle)
        .collect();

    let rows: Vec<OutcomeRecord> = candidates
        .into_iter()
        .filter(|r| puzzles.contains(&r.puzzle_num))
        .cloned()
        .collect();

    report.dropped_incomplete_cohort = records.len()
        - report.dropped_excluded_puzzle
        - report.dropped_beyond_max_puzzle
        - report.dropped_undefined_difficulty
        - report.dropped_off_roster
        - rows.len();
    report.cohort_rows = rows.len();
    report.cohort_puzzles = puzzles.len();

    Cohort {
        rows,
        puzzles,
        report,
    }
}
