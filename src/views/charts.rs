//! Chart series for the dashboard. The page draws these as-is; all grouping
//! happens here.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::data::models::{DensityPoint, Difficulty, OutcomeRecord};
use crate::pipeline::RankingRow;

/// Fixed y-axis ceiling for the fails histogram.
pub const HISTOGRAM_Y_MAX: f64 = 40.0;
/// Fixed y-axis ceiling for the predicted density chart.
pub const DENSITY_Y_MAX: f64 = 0.5;

/// Horizontal bar chart of total fails, best player first.
#[derive(Debug, Clone, Serialize)]
pub struct RankingChart {
    pub bars: Vec<RankingRow>,
}

pub fn ranking_chart(ranking: &[RankingRow]) -> RankingChart {
    RankingChart {
        bars: ranking.to_vec(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub fails: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaPoint {
    pub fails: u32,
    pub density: f64,
}

/// One panel of a chart faceted by difficulty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet<P> {
    pub difficulty: Difficulty,
    pub points: Vec<P>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetedChart<P> {
    pub y_range: [f64; 2],
    /// Panels in difficulty order
    pub facets: Vec<Facet<P>>,
}

impl<P> FacetedChart<P> {
    pub fn empty(y_max: f64) -> Self {
        FacetedChart {
            y_range: [0.0, y_max],
            facets: Vec::new(),
        }
    }
}

/// Count of played games per fails value, one panel per difficulty.
/// Unplayed rows are left out.
pub fn fails_histogram<'a>(
    rows: impl IntoIterator<Item = &'a OutcomeRecord>,
) -> FacetedChart<HistogramBin> {
    let mut panels: BTreeMap<&Difficulty, BTreeMap<u32, usize>> = BTreeMap::new();
    for row in rows {
        if let Some(fails) = row.fails {
            *panels
                .entry(&row.difficulty)
                .or_default()
                .entry(fails)
                .or_insert(0) += 1;
        }
    }

    FacetedChart {
        y_range: [0.0, HISTOGRAM_Y_MAX],
        facets: panels
            .into_iter()
            .map(|(difficulty, bins)| Facet {
                difficulty: difficulty.clone(),
                points: bins
                    .into_iter()
                    .map(|(fails, count)| HistogramBin { fails, count })
                    .collect(),
            })
            .collect(),
    }
}

/// Predicted density over fails, one panel per difficulty, sorted by fails.
pub fn density_area<'a>(
    points: impl IntoIterator<Item = &'a DensityPoint>,
) -> FacetedChart<AreaPoint> {
    let mut panels: BTreeMap<&Difficulty, Vec<AreaPoint>> = BTreeMap::new();
    for p in points {
        panels.entry(&p.difficulty).or_default().push(AreaPoint {
            fails: p.fails,
            density: p.density,
        });
    }

    FacetedChart {
        y_range: [0.0, DENSITY_Y_MAX],
        facets: panels
            .into_iter()
            .map(|(difficulty, mut points)| {
                points.sort_by_key(|p| p.fails);
                Facet {
                    difficulty: difficulty.clone(),
                    points,
                }
            })
            .collect(),
    }
}
