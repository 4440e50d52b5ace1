use super::domain::{InspectionError, InspectionStatus};

/// The legal status transitions. Status only moves forward, with the single
/// exception of the `rejected -> submitted` re-submission path.
pub(crate) fn ensure_transition(
    from: InspectionStatus,
    to: InspectionStatus,
) -> Result<(), InspectionError> {
    use InspectionStatus::*;

    let legal = matches!(
        (from, to),
        (Draft, Submitted)
            | (Rejected, Submitted)
            | (Submitted, Approved)
            | (Submitted, Rejected)
            | (Approved, PostTripInProgress)
            | (PostTripInProgress, PostTripCompleted)
    );

    if legal {
        Ok(())
    } else {
        Err(InspectionError::IllegalTransition { from, to })
    }
}
