use crate::workflows::inspection::domain::InspectionError;
use crate::workflows::inspection::evaluation::{
    EvaluationScores, EvaluationSummary, PerformanceLevel,
};

fn scores(values: [u8; 5]) -> EvaluationScores {
    EvaluationScores {
        pre_trip_inspection: values[0],
        driving_conduct: values[1],
        incident_management: values[2],
        post_trip_reporting: values[3],
        compliance_documentation: values[4],
        comments: None,
    }
}

#[test]
fn average_is_unweighted_over_the_five_categories() {
    assert_eq!(scores([5, 5, 5, 5, 5]).average(), 5.0);
    assert_eq!(scores([1, 2, 3, 4, 5]).average(), 3.0);
    assert_eq!(scores([4, 4, 4, 3, 3]).average(), 3.6);
}

#[test]
fn performance_boundaries_are_exact() {
    assert_eq!(PerformanceLevel::from_average(5.0), PerformanceLevel::Excellent);
    assert_eq!(PerformanceLevel::from_average(4.5), PerformanceLevel::Excellent);
    assert_eq!(PerformanceLevel::from_average(4.4), PerformanceLevel::Satisfactory);
    assert_eq!(PerformanceLevel::from_average(3.5), PerformanceLevel::Satisfactory);
    assert_eq!(
        PerformanceLevel::from_average(3.4),
        PerformanceLevel::NeedsImprovement
    );
    assert_eq!(
        PerformanceLevel::from_average(2.0),
        PerformanceLevel::NeedsImprovement
    );
    assert_eq!(PerformanceLevel::from_average(1.9), PerformanceLevel::NonCompliant);
}

#[test]
fn summary_carries_the_derived_label() {
    let summary = EvaluationSummary::from_scores(scores([5, 4, 5, 5, 4])).expect("valid scores");
    assert_eq!(summary.average, 4.6);
    assert_eq!(summary.performance, PerformanceLevel::Excellent);

    let summary = EvaluationSummary::from_scores(scores([2, 2, 1, 2, 2])).expect("valid scores");
    assert_eq!(summary.average, 1.8);
    assert_eq!(summary.performance, PerformanceLevel::NonCompliant);
}

#[test]
fn out_of_range_scores_are_rejected() {
    let err = EvaluationSummary::from_scores(scores([0, 3, 3, 3, 3])).expect_err("0 invalid");
    assert_eq!(err, InspectionError::InvalidEvaluationScore(0));

    let err = EvaluationSummary::from_scores(scores([3, 3, 6, 3, 3])).expect_err("6 invalid");
    assert_eq!(err, InspectionError::InvalidEvaluationScore(6));
}
