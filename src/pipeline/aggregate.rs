//! Grouped aggregations over the retained cohort.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::data::models::{Difficulty, OutcomeRecord};

/// Total fails for one player across every cohort puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingRow {
    pub name: String,
    pub fails: u64,
}

/// Distinct cohort puzzles a player appears in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GamesRow {
    pub name: String,
    pub games: usize,
}

/// Mean fails for one player on one difficulty. `fails` is `None` when every
/// row in the group was unplayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvgFailsRow {
    pub name: String,
    pub difficulty: Difficulty,
    pub fails: Option<f64>,
}

/// One row per roster player, ascending by total fails, ties by name.
///
/// Empty when there are no cohort puzzles. Unplayed rows count as zero.
pub fn ranking(rows: &[OutcomeRecord], roster: &[String], has_cohort: bool) -> Vec<RankingRow> {
    if !has_cohort {
        return Vec::new();
    }

    let mut totals: BTreeMap<&str, u64> = roster.iter().map(|n| (n.as_str(), 0)).collect();
    for row in rows {
        if let Some(total) = totals.get_mut(row.name.as_str()) {
            *total += u64::from(row.fails.unwrap_or(0));
        }
    }

    let mut table: Vec<RankingRow> = totals
        .into_iter()
        .map(|(name, fails)| RankingRow {
            name: name.to_string(),
            fails,
        })
        .collect();
    table.sort_by(|a, b| a.fails.cmp(&b.fails).then_with(|| a.name.cmp(&b.name)));
    table
}

/// One row per roster player, ordered by name.
pub fn total_games(rows: &[OutcomeRecord], roster: &[String], has_cohort: bool) -> Vec<GamesRow> {
    if !has_cohort {
        return Vec::new();
    }

    let mut puzzles: BTreeMap<&str, BTreeSet<u32>> = roster
        .iter()
        .map(|n| (n.as_str(), BTreeSet::new()))
        .collect();
    for row in rows {
        if let Some(set) = puzzles.get_mut(row.name.as_str()) {
            set.insert(row.puzzle_num);
        }
    }

    puzzles
        .into_iter()
        .map(|(name, set)| GamesRow {
            name: name.to_string(),
            games: set.len(),
        })
        .collect()
}

/// One row per (player, difficulty) present in the cohort, ordered by player
/// then difficulty, so Easy precedes Hard for every player.
pub fn average_fails(rows: &[OutcomeRecord]) -> Vec<AvgFailsRow> {
    // (name, difficulty) -> (sum of fails, played rows)
    let mut groups: BTreeMap<(&str, &Difficulty), (u64, u64)> = BTreeMap::new();
    for row in rows {
        let entry = groups
            .entry((row.name.as_str(), &row.difficulty))
            .or_insert((0, 0));
        if let Some(fails) = row.fails {
            entry.0 += u64::from(fails);
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|((name, difficulty), (sum, played))| AvgFailsRow {
            name: name.to_string(),
            difficulty: difficulty.clone(),
            fails: (played > 0).then(|| sum as f64 / played as f64),
        })
        .collect()
}
