//! Genuine and counterfeit code pattern records.
//!
//! A pattern string is either a literal code fragment or a regular
//! expression; the verification crate decides which when it matches.

use serde::{Deserialize, Serialize};

use crate::{AcpError, BrandId, PatternId, RiskLevel};

/// A registered code signature for one brand.
///
/// The genuine-pattern pass only reads records with `is_genuine = true`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePattern {
    pub id: PatternId,
    pub brand_id: BrandId,
    pub pattern: String,
    pub is_genuine: bool,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePatternDraft {
    pub brand_id: BrandId,
    pub pattern: String,
    #[serde(default = "default_true")]
    pub is_genuine: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_true() -> bool {
    true
}

impl CodePatternDraft {
    pub fn validate(&self) -> Result<(), AcpError> {
        if self.pattern.is_empty() {
            return Err(AcpError::MissingField("pattern"));
        }
        Ok(())
    }

    pub fn into_pattern(self, id: PatternId) -> CodePattern {
        CodePattern {
            id,
            brand_id: self.brand_id,
            pattern: self.pattern,
            is_genuine: self.is_genuine,
            notes: self.notes,
        }
    }
}

/// A known counterfeit code signature for one brand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakePattern {
    pub id: PatternId,
    pub brand_id: BrandId,
    pub pattern: String,
    /// Human-readable signs of a counterfeit ("misspelled label", ...).
    pub fake_signs: Vec<String>,
    pub risk_level: RiskLevel,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FakePatternDraft {
    pub brand_id: BrandId,
    pub pattern: String,
    #[serde(default)]
    pub fake_signs: Vec<String>,
    #[serde(default)]
    pub risk_level: RiskLevel,
}

impl FakePatternDraft {
    pub fn validate(&self) -> Result<(), AcpError> {
        if self.pattern.is_empty() {
            return Err(AcpError::MissingField("pattern"));
        }
        Ok(())
    }

    pub fn into_pattern(self, id: PatternId) -> FakePattern {
        FakePattern {
            id,
            brand_id: self.brand_id,
            pattern: self.pattern,
            fake_signs: self.fake_signs,
            risk_level: self.risk_level,
        }
    }
}
