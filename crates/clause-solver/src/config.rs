//! Solver configuration
//!
//! Margin and ratio thresholds are policy knobs: every solve call can override
//! them. The scoring weights used by [`crate::candidate_score`] are part of the model and
//! stay fixed.

use serde::{Deserialize, Serialize};

/// Parser version tag embedded in every solution by default
pub const DEFAULT_PARSER_VERSION: &str = "parser_v2_solver_v1";

/// Default margin below which a token abstains
pub const DEFAULT_ABSTAIN_MARGIN_THRESHOLD: f64 = 0.08;

/// Default margin below which a selected token goes to review
pub const DEFAULT_REVIEW_MARGIN_THRESHOLD: f64 = 0.20;

/// Default abstained-token share at which the whole section abstains
pub const DEFAULT_SECTION_ABSTAIN_RATIO_THRESHOLD: f64 = 0.40;

/// Solver policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Version tag copied verbatim into the solution
    pub parser_version: String,
    /// Tokens whose top-2 margin falls below this abstain
    pub abstain_margin_threshold: f64,
    /// Selected tokens whose margin falls below this go to review
    pub review_margin_threshold: f64,
    /// Abstain ratio at which the section abstains
    pub section_abstain_ratio_threshold: f64,
}

impl SolverConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With parser version tag
    #[inline]
    #[must_use]
    pub fn with_parser_version(mut self, version: impl Into<String>) -> Self {
        self.parser_version = version.into();
        self
    }

    /// With abstain margin threshold
    #[inline]
    #[must_use]
    pub fn with_abstain_margin_threshold(mut self, threshold: f64) -> Self {
        self.abstain_margin_threshold = threshold;
        self
    }

    /// With review margin threshold
    #[inline]
    #[must_use]
    pub fn with_review_margin_threshold(mut self, threshold: f64) -> Self {
        self.review_margin_threshold = threshold;
        self
    }

    /// With section abstain ratio threshold
    #[inline]
    #[must_use]
    pub fn with_section_abstain_ratio_threshold(mut self, threshold: f64) -> Self {
        self.section_abstain_ratio_threshold = threshold;
        self
    }

    /// Parse a (possibly partial) TOML document; missing keys keep defaults
    ///
    /// # Errors
    /// Decode failure or a config that fails [`SolverConfig::validate`]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Serialization failure
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Check threshold ranges
    ///
    /// # Errors
    /// - any threshold not finite or outside `[0, 1]`
    /// - review threshold below abstain threshold
    /// - empty parser version
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parser_version.trim().is_empty() {
            return Err(ConfigError::EmptyParserVersion);
        }

        for (name, value) in [
            ("abstain_margin_threshold", self.abstain_margin_threshold),
            ("review_margin_threshold", self.review_margin_threshold),
            ("section_abstain_ratio_threshold", self.section_abstain_ratio_threshold),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }

        if self.review_margin_threshold < self.abstain_margin_threshold {
            return Err(ConfigError::InvertedMargins {
                abstain: self.abstain_margin_threshold,
                review: self.review_margin_threshold,
            });
        }

        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            parser_version: DEFAULT_PARSER_VERSION.to_string(),
            abstain_margin_threshold: DEFAULT_ABSTAIN_MARGIN_THRESHOLD,
            review_margin_threshold: DEFAULT_REVIEW_MARGIN_THRESHOLD,
            section_abstain_ratio_threshold: DEFAULT_SECTION_ABSTAIN_RATIO_THRESHOLD,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Threshold outside `[0, 1]` or not finite
    #[error("{name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange {
        /// Field name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// Review margin below abstain margin
    #[error("review_margin_threshold ({review}) is below abstain_margin_threshold ({abstain})")]
    InvertedMargins {
        /// Abstain margin threshold
        abstain: f64,
        /// Review margin threshold
        review: f64,
    },

    /// Blank parser version
    #[error("parser_version must not be empty")]
    EmptyParserVersion,

    /// TOML decode error
    #[error("config decode error: {0}")]
    Decode(#[from] toml::de::Error),

    /// TOML encode error
    #[error("config encode error: {0}")]
    Encode(#[from] toml::ser::Error),
}
