use serde::{Deserialize, Serialize};

use crate::error::CheckError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// A `.check.toml` run description.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckConfig {
    pub name: String,
    /// Expectations JSON file, relative to the config file.
    pub expected: String,
    /// Recorded messages JSON file, relative to the config file.
    pub record: String,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl CheckConfig {
    pub fn from_toml(s: &str) -> Result<Self, CheckError> {
        let config: Self = toml::from_str(s).map_err(|e| CheckError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CheckError> {
        if self.name.trim().is_empty() {
            return Err(CheckError::ConfigValidation("name must not be empty".into()));
        }
        if self.expected.trim().is_empty() {
            return Err(CheckError::ConfigValidation("expected must name a file".into()));
        }
        if self.record.trim().is_empty() {
            return Err(CheckError::ConfigValidation("record must name a file".into()));
        }
        if self.output.xml.is_some() && self.output.xml == self.output.json {
            return Err(CheckError::ConfigValidation(
                "output.xml and output.json must be different files".into(),
            ));
        }
        Ok(())
    }

    /// Engine-facing options.
    pub fn options(&self) -> CheckOptions {
        CheckOptions { ranking: self.ranking.mode }
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingConfig {
    #[serde(default)]
    pub mode: RankingMode,
}

/// How the candidates of one expectation are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Per-field distances weighted by `10^(3 - position)` and summed.
    #[default]
    Weighted,
    /// Per-field absolute distances compared element-wise, first field first.
    Lexicographic,
}

impl std::fmt::Display for RankingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weighted => write!(f, "weighted"),
            Self::Lexicographic => write!(f, "lexicographic"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output + engine options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub xml: Option<String>,
    #[serde(default)]
    pub json: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    pub ranking: RankingMode,
}
