use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::info;

use crate::data::{self, models::*};
use crate::pipeline::{self, CohortRules, DerivedTables};
use crate::views::charts::{self, RankingChart};

/// Everything the dashboard reads, built once at startup.
///
/// Nothing here is mutated after construction; handlers share it behind an
/// `Arc` and every view is a pure function of it and the selected player.
#[derive(Debug)]
pub struct DataContext {
    pub rules: CohortRules,
    pub tables: DerivedTables,
    pub predictions: Vec<Prediction>,
    pub model_output: Vec<DensityPoint>,
    pub ranking_chart: RankingChart,
    pub loaded_at: DateTime<Utc>,
}

/// Locations of the three input files.
#[derive(Debug, Clone, Copy)]
pub struct InputPaths<'a> {
    pub outcomes: &'a Path,
    pub predictions: &'a Path,
    pub model_output: &'a Path,
}

impl DataContext {
    /// Load every input file and run the pipeline. Any failure is fatal.
    pub fn load(paths: InputPaths<'_>, rules: CohortRules) -> Result<Self> {
        let outcomes = data::load_outcomes(paths.outcomes)
            .with_context(|| format!("loading outcomes from {}", paths.outcomes.display()))?;
        let predictions = data::load_predictions(paths.predictions).with_context(|| {
            format!("loading predictions from {}", paths.predictions.display())
        })?;
        let model_output = data::load_model_output(paths.model_output).with_context(|| {
            format!("loading model output from {}", paths.model_output.display())
        })?;

        Ok(Self::build(rules, &outcomes, predictions, model_output))
    }

    pub fn build(
        rules: CohortRules,
        outcomes: &[OutcomeRecord],
        predictions: Vec<Prediction>,
        model_output: Vec<DensityPoint>,
    ) -> Self {
        let tables = pipeline::build_tables(outcomes, &rules);
        let ranking_chart = charts::ranking_chart(&tables.ranking);
        info!(
            "Data context ready: {} players, {} cohort puzzles",
            rules.roster_size(),
            tables.cohort_puzzles.len()
        );

        DataContext {
            rules,
            tables,
            predictions,
            model_output,
            ranking_chart,
            loaded_at: Utc::now(),
        }
    }

    pub fn prediction(&self, name: &str, difficulty: &Difficulty) -> Option<f64> {
        self.predictions
            .iter()
            .find(|p| p.name == name && &p.difficulty == difficulty)
            .map(|p| p.prediction)
    }

    pub fn density_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DensityPoint> + 'a {
        self.model_output.iter().filter(move |p| p.name == name)
    }
}
