//! Violation-point risk scoring over trip-behavior answers, for the current
//! trip and a trailing 30-day window of the driver's history.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

use super::super::catalog::ChecklistCatalog;
use super::super::domain::{AnswerStatus, ChecklistItemAnswer, SectionKind};

/// Point-based risk level. The boundaries are exact: 0-3 low, 4-9 medium,
/// 10 and above high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn from_points(points: u32) -> Self {
        if points >= 10 {
            Self::High
        } else if points >= 4 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived risk assessment for one inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskScore {
    pub this_trip_points: u32,
    pub risk_level: RiskLevel,
    pub points_30_days: u32,
    pub risk_level_30_days: RiskLevel,
}

/// Points contributed by one inspection within a driver's history window.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPointsEntry {
    pub inspection_date: NaiveDate,
    pub points: u32,
}

/// Sums violation points using the fixed per-item weights from the catalog.
pub struct RiskPointCalculator<'a> {
    catalog: &'a ChecklistCatalog,
}

impl<'a> RiskPointCalculator<'a> {
    pub fn new(catalog: &'a ChecklistCatalog) -> Self {
        Self { catalog }
    }

    /// Total points for one trip: the sum of the fixed weights of every
    /// trip-behavior answer marked as a violation. Compliant and
    /// not-applicable answers contribute nothing.
    pub fn this_trip_points(&self, answers: &[ChecklistItemAnswer]) -> u32 {
        answers
            .iter()
            .filter(|answer| answer.status == AnswerStatus::Violation)
            .filter_map(|answer| self.catalog.item(SectionKind::TripBehavior, &answer.item))
            .filter_map(|spec| spec.points)
            .map(u32::from)
            .sum()
    }

    /// Sum over every entry dated within the trailing 30-day window of
    /// `as_of`, inclusive on both ends. An entry dated exactly 30 days
    /// before `as_of` is counted; 31 days before is not. The current trip's
    /// own entry belongs in `history` and is therefore included.
    pub fn rolling_30_day_points(history: &[TripPointsEntry], as_of: NaiveDate) -> u32 {
        let window_start = as_of - Duration::days(30);
        history
            .iter()
            .filter(|entry| entry.inspection_date >= window_start && entry.inspection_date <= as_of)
            .map(|entry| entry.points)
            .sum()
    }

    pub fn assess(&self, trip_answers: &[ChecklistItemAnswer], history: &[TripPointsEntry], as_of: NaiveDate) -> RiskScore {
        let this_trip_points = self.this_trip_points(trip_answers);
        let points_30_days = Self::rolling_30_day_points(history, as_of);

        RiskScore {
            this_trip_points,
            risk_level: RiskLevel::from_points(this_trip_points),
            points_30_days,
            risk_level_30_days: RiskLevel::from_points(points_30_days),
        }
    }
}
