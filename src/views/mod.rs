//! Player-scoped views recomputed on every selection change.

pub mod charts;

use serde::Serialize;
use tracing::{debug, warn};

use crate::context::DataContext;
use crate::data::models::Difficulty;
use charts::{AreaPoint, FacetedChart, HistogramBin};

/// Display text for a value that is absent.
pub const NO_DATA: &str = "no data";

/// A labelled scalar shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub label: &'static str,
    pub value: Option<f64>,
    pub text: String,
}

impl StatCard {
    fn count(label: &'static str, value: Option<usize>) -> Self {
        StatCard {
            label,
            value: value.map(|v| v as f64),
            text: value.map_or_else(|| NO_DATA.to_string(), |v| v.to_string()),
        }
    }

    fn decimal(label: &'static str, value: Option<f64>) -> Self {
        StatCard {
            label,
            value,
            text: value.map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.2}")),
        }
    }
}

/// Everything the page shows for one selected player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub player: String,
    /// False when the player is not on the roster
    pub found: bool,
    pub games_played: StatCard,
    pub avg_fails_easy: StatCard,
    pub avg_fails_hard: StatCard,
    pub predicted_easy: StatCard,
    pub predicted_hard: StatCard,
    pub fails_distribution: FacetedChart<HistogramBin>,
    pub predicted_density: FacetedChart<AreaPoint>,
}

/// Compute every player-scoped view for `player`.
///
/// Missing rows never fail the whole view: each affected card falls back to
/// [`NO_DATA`] on its own.
pub fn player_view(ctx: &DataContext, player: &str) -> PlayerView {
    let found = ctx.rules.is_on_roster(player);
    if !found {
        warn!("Selection of unknown player {:?}", player);
        return PlayerView {
            player: player.to_string(),
            found,
            games_played: StatCard::count(GAMES_LABEL, None),
            avg_fails_easy: StatCard::decimal(AVG_EASY_LABEL, None),
            avg_fails_hard: StatCard::decimal(AVG_HARD_LABEL, None),
            predicted_easy: StatCard::decimal(PRED_EASY_LABEL, None),
            predicted_hard: StatCard::decimal(PRED_HARD_LABEL, None),
            fails_distribution: FacetedChart::empty(charts::HISTOGRAM_Y_MAX),
            predicted_density: FacetedChart::empty(charts::DENSITY_Y_MAX),
        };
    }

    let tables = &ctx.tables;
    let avg = |d: &Difficulty| {
        let v = tables.average_fails(player, d);
        if v.is_none() {
            warn!("No {} average fails for {}", d, player);
        }
        v
    };
    let pred = |d: &Difficulty| {
        let v = ctx.prediction(player, d);
        if v.is_none() {
            warn!("No {} prediction for {}", d, player);
        }
        v
    };

    let view = PlayerView {
        player: player.to_string(),
        found,
        games_played: StatCard::count(GAMES_LABEL, tables.games_played(player)),
        avg_fails_easy: StatCard::decimal(AVG_EASY_LABEL, avg(&Difficulty::Easy)),
        avg_fails_hard: StatCard::decimal(AVG_HARD_LABEL, avg(&Difficulty::Hard)),
        predicted_easy: StatCard::decimal(PRED_EASY_LABEL, pred(&Difficulty::Easy)),
        predicted_hard: StatCard::decimal(PRED_HARD_LABEL, pred(&Difficulty::Hard)),
        fails_distribution: charts::fails_histogram(tables.rows_for(player)),
        predicted_density: charts::density_area(ctx.density_for(player)),
    };
    debug!(
        "Views for {}: {} histogram panels, {} density panels",
        player,
        view.fails_distribution.facets.len(),
        view.predicted_density.facets.len()
    );
    view
}

const GAMES_LABEL: &str = "Number of Wordles Used";
const AVG_EASY_LABEL: &str = "Actual Avg. Fails on Easy Wordles";
const AVG_HARD_LABEL: &str = "Actual Avg. Fails on Hard Wordles";
const PRED_EASY_LABEL: &str = "Predicted Avg. Fails on Easy Wordles";
const PRED_HARD_LABEL: &str = "Predicted Avg. Fails on Hard Wordles";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::models::{DensityPoint, Prediction};
    use crate::pipeline::tests::{full_puzzle, rules, ROSTER};
    use approx::assert_relative_eq;

    fn prediction(name: &str, difficulty: Difficulty, value: f64) -> Prediction {
        Prediction {
            name: name.into(),
            difficulty,
            prediction: value,
        }
    }

    fn context() -> DataContext {
        let mut outcomes = full_puzzle(100, Difficulty::Easy, [1, 2, 3, 4, 5, 6]);
        outcomes.extend(full_puzzle(101, Difficulty::Easy, [1, 0, 1, 0, 1, 0]));
        outcomes.extend(full_puzzle(102, Difficulty::Hard, [2, 2, 2, 2, 2, 2]));
        // Ka.W never plays a Hard puzzle
        outcomes.extend(full_puzzle(103, Difficulty::Hard, [4, 0, 4, 4, 4, 4]));
        for row in outcomes.iter_mut().filter(|r| r.difficulty == Difficulty::Hard) {
            if row.name == "Ka.W" {
                row.difficulty = Difficulty::Easy;
            }
        }

        let predictions = vec![
            prediction("Da.M", Difficulty::Easy, 1.234),
            prediction("Da.M", Difficulty::Hard, 2.5),
            prediction("Ka.W", Difficulty::Easy, 0.9),
        ];
        let model_output = vec![
            DensityPoint {
                name: "Da.M".into(),
                difficulty: Difficulty::Hard,
                fails: 1,
                density: 0.25,
            },
            DensityPoint {
                name: "Da.M".into(),
                difficulty: Difficulty::Easy,
                fails: 0,
                density: 0.4,
            },
            DensityPoint {
                name: "Ka.W".into(),
                difficulty: Difficulty::Easy,
                fails: 0,
                density: 0.5,
            },
        ];

        DataContext::build(rules(), &outcomes, predictions, model_output)
    }

    #[test]
    fn complete_player_gets_every_value() {
        let ctx = context();
        let view = player_view(&ctx, "Da.M");

        assert!(view.found);
        assert_eq!(view.games_played.text, "4");
        assert_relative_eq!(view.avg_fails_easy.value.unwrap(), 1.0);
        assert_relative_eq!(view.avg_fails_hard.value.unwrap(), 3.0);
        assert_eq!(view.avg_fails_easy.text, "1.00");
        assert_eq!(view.predicted_easy.text, "1.23");
        assert_eq!(view.predicted_hard.text, "2.50");
        assert_eq!(view.fails_distribution.facets.len(), 2);
        assert_eq!(view.predicted_density.facets.len(), 2);
        assert_eq!(view.predicted_density.facets[0].difficulty, Difficulty::Easy);
    }

    #[test]
    fn player_without_hard_games_degrades_only_hard_cards() {
        let ctx = context();
        let view = player_view(&ctx, "Ka.W");

        assert!(view.found);
        assert_eq!(view.games_played.text, "4");
        assert_relative_eq!(view.avg_fails_easy.value.unwrap(), 1.0);
        assert_eq!(view.avg_fails_hard.value, None);
        assert_eq!(view.avg_fails_hard.text, NO_DATA);
        assert_eq!(view.predicted_easy.text, "0.90");
        assert_eq!(view.predicted_hard.text, NO_DATA);
        assert_eq!(view.fails_distribution.facets.len(), 1);
    }

    #[test]
    fn unknown_player_is_reported_not_found() {
        let ctx = context();
        let view = player_view(&ctx, "Mallory");

        assert!(!view.found);
        assert_eq!(view.games_played.text, NO_DATA);
        assert_eq!(view.avg_fails_easy.text, NO_DATA);
        assert_eq!(view.predicted_hard.text, NO_DATA);
        assert!(view.fails_distribution.facets.is_empty());
        assert!(view.predicted_density.facets.is_empty());
    }

    #[test]
    fn every_roster_player_has_a_view() {
        let ctx = context();
        for name in ROSTER {
            let view = player_view(&ctx, name);
            assert!(view.found);
            assert!(view.games_played.value.is_some());
            assert!(view.avg_fails_easy.value.is_some());
        }
    }

    #[test]
    fn views_are_pure() {
        let ctx = context();
        assert_eq!(player_view(&ctx, "St.S"), player_view(&ctx, "St.S"));
    }
}
