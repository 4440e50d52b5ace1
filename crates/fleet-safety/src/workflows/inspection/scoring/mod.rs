//! Pure scoring over checklist answers. One point per positively-answered
//! catalog item; percentages are banded into qualitative risk labels.

pub mod risk;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::catalog::ChecklistCatalog;
use super::domain::{ChecklistItemAnswer, SectionKind};

/// Answers grouped by section, as loaded from the store.
pub type SectionAnswers = BTreeMap<SectionKind, Vec<ChecklistItemAnswer>>;

/// Qualitative band applied to section, overall, and final percentages.
/// A perfect section is `no_risk`; anything under 70% is `high_risk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    NoRisk,
    VeryLowRisk,
    LowRisk,
    HighRisk,
}

impl RiskBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 100.0 {
            Self::NoRisk
        } else if percentage >= 85.0 {
            Self::VeryLowRisk
        } else if percentage >= 70.0 {
            Self::LowRisk
        } else {
            Self::HighRisk
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NoRisk => "No Risk",
            Self::VeryLowRisk => "Very Low Risk",
            Self::LowRisk => "Low Risk",
            Self::HighRisk => "High Risk",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pass/fail verdict applied only to the final weighted percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    Passed,
    NeedsReview,
    Failed,
}

impl FinalStatus {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 70.0 {
            Self::Passed
        } else if percentage >= 50.0 {
            Self::NeedsReview
        } else {
            Self::Failed
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::NeedsReview => "needs_review",
            Self::Failed => "failed",
        }
    }
}

/// Score for one checklist section. `percentage_of_total` is measured
/// against the wizard-wide item count; the risk band comes from the
/// section's own percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionScore {
    pub section: SectionKind,
    pub earned: u32,
    pub max: u32,
    pub section_percentage: f64,
    pub percentage_of_total: f64,
    pub risk_band: RiskBand,
}

/// Aggregate over all sections of one wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub sections: Vec<SectionScore>,
    pub total_earned: u32,
    pub total_max: u32,
    pub overall_percentage: f64,
    pub risk_band: RiskBand,
}

/// Final 50/50 weighting of the pre-trip and post-trip checklist scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalScore {
    pub pre_checklist_percentage: f64,
    pub pre_checklist_weighted: f64,
    pub post_checklist_percentage: f64,
    pub post_checklist_weighted: f64,
    pub final_percentage: f64,
    pub final_status: FinalStatus,
    pub final_risk_level: RiskBand,
}

/// Stateless given the current answers; all lookups go through the injected
/// catalog.
pub struct ScoringEngine<'a> {
    catalog: &'a ChecklistCatalog,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(catalog: &'a ChecklistCatalog) -> Self {
        Self { catalog }
    }

    pub fn section_score(
        &self,
        section: SectionKind,
        answers: &[ChecklistItemAnswer],
    ) -> SectionScore {
        let earned = answers
            .iter()
            .filter(|answer| {
                answer.status.is_positive() && self.catalog.contains(section, &answer.item)
            })
            .count() as u32;
        let max = self.catalog.count(section);
        let total = self.wizard_total(section);

        let section_percentage = percentage(earned, max);
        SectionScore {
            section,
            earned,
            max,
            section_percentage,
            percentage_of_total: percentage(earned, total),
            risk_band: RiskBand::from_percentage(section_percentage),
        }
    }

    /// Aggregate the seven pre-trip sections against the pre-trip item total.
    pub fn pre_trip_summary(&self, answers: &SectionAnswers) -> ScoreSummary {
        self.summary(&SectionKind::pre_trip(), answers)
    }

    /// Aggregate the three post-trip checklist sections against the
    /// post-trip item total.
    pub fn post_checklist_summary(&self, answers: &SectionAnswers) -> ScoreSummary {
        self.summary(&SectionKind::post_trip(), answers)
    }

    pub fn final_score(pre_percentage: f64, post_percentage: f64) -> FinalScore {
        let pre_weighted = round1(pre_percentage * 0.5);
        let post_weighted = round1(post_percentage * 0.5);
        let final_percentage = round1(pre_weighted + post_weighted);

        FinalScore {
            pre_checklist_percentage: round1(pre_percentage),
            pre_checklist_weighted: pre_weighted,
            post_checklist_percentage: round1(post_percentage),
            post_checklist_weighted: post_weighted,
            final_percentage,
            final_status: FinalStatus::from_percentage(final_percentage),
            final_risk_level: RiskBand::from_percentage(final_percentage),
        }
    }

    fn summary(&self, sections: &[SectionKind], answers: &SectionAnswers) -> ScoreSummary {
        static EMPTY: Vec<ChecklistItemAnswer> = Vec::new();

        let sections: Vec<SectionScore> = sections
            .iter()
            .map(|&section| {
                let section_answers = answers.get(&section).unwrap_or(&EMPTY);
                self.section_score(section, section_answers)
            })
            .collect();

        let total_earned = sections.iter().map(|score| score.earned).sum();
        let total_max = sections.iter().map(|score| score.max).sum();
        let overall_percentage = percentage(total_earned, total_max);

        ScoreSummary {
            sections,
            total_earned,
            total_max,
            overall_percentage,
            risk_band: RiskBand::from_percentage(overall_percentage),
        }
    }

    fn wizard_total(&self, section: SectionKind) -> u32 {
        match section.wizard() {
            super::domain::WizardKind::PreTrip => self.catalog.total_pre_trip_items(),
            super::domain::WizardKind::PostTrip => self.catalog.total_post_trip_items(),
        }
    }
}

fn percentage(earned: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    round1(earned as f64 * 100.0 / max as f64)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
