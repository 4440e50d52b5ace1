//! Supervisor evaluation: five 1-5 category scores averaged into a
//! qualitative performance label. Distinct from the percentage-based
//! checklist scoring.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::InspectionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
    Excellent,
    Satisfactory,
    NeedsImprovement,
    NonCompliant,
}

impl PerformanceLevel {
    /// 4.5+ excellent, 3.5+ satisfactory, 2.0+ needs improvement, below
    /// that non-compliant.
    pub fn from_average(average: f64) -> Self {
        if average >= 4.5 {
            Self::Excellent
        } else if average >= 3.5 {
            Self::Satisfactory
        } else if average >= 2.0 {
            Self::NeedsImprovement
        } else {
            Self::NonCompliant
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Satisfactory => "Satisfactory",
            Self::NeedsImprovement => "Needs Improvement",
            Self::NonCompliant => "Non-Compliant",
        }
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The five supervisor-entered category scores, each 1-5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationScores {
    pub pre_trip_inspection: u8,
    pub driving_conduct: u8,
    pub incident_management: u8,
    pub post_trip_reporting: u8,
    pub compliance_documentation: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl EvaluationScores {
    pub fn validate(&self) -> Result<(), InspectionError> {
        for score in self.scores() {
            if !(1..=5).contains(&score) {
                return Err(InspectionError::InvalidEvaluationScore(score));
            }
        }
        Ok(())
    }

    pub fn scores(&self) -> [u8; 5] {
        [
            self.pre_trip_inspection,
            self.driving_conduct,
            self.incident_management,
            self.post_trip_reporting,
            self.compliance_documentation,
        ]
    }

    pub fn average(&self) -> f64 {
        let total: u32 = self.scores().iter().map(|&score| u32::from(score)).sum();
        f64::from(total) / 5.0
    }
}

/// Derived evaluation verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub scores: EvaluationScores,
    pub average: f64,
    pub performance: PerformanceLevel,
}

impl EvaluationSummary {
    pub fn from_scores(scores: EvaluationScores) -> Result<Self, InspectionError> {
        scores.validate()?;
        let average = scores.average();
        Ok(Self {
            scores,
            average,
            performance: PerformanceLevel::from_average(average),
        })
    }
}
