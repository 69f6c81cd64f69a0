use clap::Parser;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::pipeline::CohortRules;

/// Wordle ranking & performance dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "wordle-dashboard", version, about)]
pub struct Config {
    /// Outcome records CSV (Name, PuzzleNum, Fails, Difficulty)
    #[arg(long = "outcomes", env = "OUTCOMES_PATH", default_value = "auto_wordle_scores.csv")]
    pub outcomes_path: PathBuf,

    /// Point predictions CSV (Name, prediction)
    #[arg(long = "predictions", env = "PREDICTIONS_PATH", default_value = "predictions.csv")]
    pub predictions_path: PathBuf,

    /// Predicted fails distribution CSV (Name, Difficulty, Fails, Density)
    #[arg(long = "model-output", env = "MODEL_OUTPUT_PATH", default_value = "BetaBinomialOut.csv")]
    pub model_output_path: PathBuf,

    /// Tracked players, comma-separated
    #[arg(
        long,
        env = "ROSTER",
        value_delimiter = ',',
        value_parser = player_name,
        default_value = "Da.M,Ka.W,St.S,Ca.W,Da.S,Ka.S"
    )]
    pub roster: Vec<String>,

    /// Puzzle numbers left out of the analysis, comma-separated
    #[arg(long, env = "EXCLUDE_PUZZLES", value_delimiter = ',', default_value = "420,421")]
    pub exclude_puzzles: Vec<u32>,

    /// Only puzzles numbered below this are analysed
    #[arg(long, env = "MAX_PUZZLE")]
    pub max_puzzle: Option<u32>,

    /// Player selected when the page opens (defaults to the first roster member)
    #[arg(long, env = "DEFAULT_PLAYER", value_parser = player_name)]
    pub default_player: Option<String>,

    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "127.0.0.1:8050")]
    pub dashboard_addr: String,

    /// Page heading
    #[arg(long, env = "DASHBOARD_TITLE", default_value = "Wordle Ranking & Performance")]
    pub title: String,
}

/// Player names are compared trimmed everywhere; blank names are rejected.
fn player_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("player name must not be empty".to_string());
    }
    Ok(name.to_string())
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.roster.is_empty() {
            anyhow::bail!("roster must list at least one player");
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.roster.iter().find(|n| !seen.insert(n.as_str())) {
            anyhow::bail!("roster lists {} more than once", dup);
        }
        if let Some(player) = &self.default_player {
            if !self.roster.contains(player) {
                anyhow::bail!("default player {} is not on the roster", player);
            }
        }
        if self.max_puzzle == Some(0) {
            anyhow::bail!("max_puzzle must be positive");
        }
        self.dashboard_addr
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("invalid dashboard_addr {}: {}", self.dashboard_addr, e))?;
        Ok(())
    }

    pub fn cohort_rules(&self) -> CohortRules {
        CohortRules::new(
            self.roster.iter().cloned(),
            self.exclude_puzzles.iter().copied(),
            self.max_puzzle,
        )
    }

    pub fn selected_by_default(&self) -> String {
        self.default_player
            .clone()
            .or_else(|| self.roster.first().cloned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("wordle-dashboard").chain(args.iter().copied()))
            .expect("parse args")
    }

    #[test]
    fn defaults_match_reference_deployment() {
        let config = parse(&[]);
        assert_eq!(config.roster.len(), 6);
        assert_eq!(config.exclude_puzzles, vec![420, 421]);
        assert_eq!(config.max_puzzle, None);
        assert_eq!(config.selected_by_default(), "Da.M");
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn lists_are_comma_separated() {
        let config = parse(&["--roster", "A,B", "--exclude-puzzles", "421", "--max-puzzle", "467"]);
        let rules = config.cohort_rules();
        assert_eq!(rules.roster, vec!["A".to_string(), "B".to_string()]);
        assert!(rules.excluded_puzzles.contains(&421));
        assert_eq!(rules.max_puzzle, Some(467));
    }

    #[test]
    fn rejects_duplicate_roster_names() {
        let config = parse(&["--roster", "A,B,A"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_default_player_off_roster() {
        let config = parse(&["--roster", "A,B", "--default-player", "C"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn roster_names_are_trimmed_before_validation() {
        let config = parse(&["--roster", " Da.M, Ka.W ", "--default-player", "Ka.W "]);
        assert_eq!(config.roster, vec!["Da.M".to_string(), "Ka.W".to_string()]);
        config.validate().expect("spaced roster is valid");
        assert_eq!(config.selected_by_default(), "Ka.W");
        assert_eq!(config.cohort_rules().roster, config.roster);

        let config = parse(&["--roster", " Da.M,Ka.W"]);
        assert_eq!(config.selected_by_default(), "Da.M");
    }

    #[test]
    fn rejects_duplicates_that_differ_only_by_spacing() {
        let config = parse(&["--roster", "Da.M, Da.M"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_blank_roster_entry() {
        let args = ["wordle-dashboard", "--roster", "Da.M, ,Ka.W"];
        assert!(Config::try_parse_from(args).is_err());
    }

    #[test]
    fn rejects_bad_listen_address() {
        let config = parse(&["--dashboard-addr", "localhost"]);
        assert!(config.validate().is_err());
    }
}
