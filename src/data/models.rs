use serde::{Deserialize, Serialize};
use std::fmt;

/// Label partitioning puzzles by how hard the answer word was.
///
/// Ordering is Easy, Hard, then any other label alphabetically, with the
/// `Undefined` sentinel last. Tables sorted by difficulty rely on this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Hard,
    Other(String),
    Undefined,
}

impl Difficulty {
    /// Difficulties in the order the prediction table lists them when it has
    /// no explicit `Difficulty` column.
    pub const IMPLICIT_ORDER: [Difficulty; 2] = [Difficulty::Easy, Difficulty::Hard];

    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Hard => "Hard",
            Difficulty::Undefined => "Undefined",
            Difficulty::Other(label) => label,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Difficulty::Undefined)
    }
}

impl From<String> for Difficulty {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Easy" => Difficulty::Easy,
            "Hard" => Difficulty::Hard,
            "Undefined" => Difficulty::Undefined,
            _ => Difficulty::Other(s),
        }
    }
}

impl From<&str> for Difficulty {
    fn from(s: &str) -> Self {
        Difficulty::from(s.to_string())
    }
}

impl From<Difficulty> for String {
    fn from(d: Difficulty) -> Self {
        d.as_str().to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One player's result on one puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub name: String,
    pub puzzle_num: u32,
    /// Failed guesses before solving; `None` when the puzzle was not played
    pub fails: Option<u32>,
    pub difficulty: Difficulty,
}

/// Point prediction of average fails for a player on one difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub name: String,
    pub difficulty: Difficulty,
    pub prediction: f64,
}

/// One point of the model's predicted fails distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityPoint {
    pub name: String,
    pub difficulty: Difficulty,
    pub fails: u32,
    pub density: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easy_sorts_before_hard_and_others() {
        let mut labels: Vec<Difficulty> = ["Medium", "Hard", "Undefined", "Easy", "Brutal"]
            .into_iter()
            .map(Difficulty::from)
            .collect();
        labels.sort();
        let names: Vec<&str> = labels.iter().map(|d| d.as_str()).collect();
        assert_eq!(names, vec!["Easy", "Hard", "Brutal", "Medium", "Undefined"]);
    }

    #[test]
    fn serializes_as_plain_label() {
        let json = serde_json::to_string(&Difficulty::Hard).unwrap();
        assert_eq!(json, "\"Hard\"");
        let back: Difficulty = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(back, Difficulty::Other("Medium".into()));
    }
}
