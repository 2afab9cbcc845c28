//! Status state machines.
//!
//! Each entity's status field has an exhaustive transition table; a status
//! change that is not in the table is rejected with 422 at the handler. An
//! entry with an empty target list is terminal.

use crate::errors::AppError;
use crate::models::status::{ApplicationStatus, JobStatus, PipelineStatus};

const JOB_TRANSITIONS: &[(JobStatus, &[JobStatus])] = &[
    (JobStatus::Draft, &[JobStatus::Open]),
    (
        JobStatus::Open,
        &[JobStatus::OnHold, JobStatus::Closed, JobStatus::Filled],
    ),
    (JobStatus::OnHold, &[JobStatus::Open, JobStatus::Closed]),
    // Reopening a closed job is allowed; a filled job is terminal.
    (JobStatus::Closed, &[JobStatus::Open]),
    (JobStatus::Filled, &[]),
];

const APPLICATION_TRANSITIONS: &[(ApplicationStatus, &[ApplicationStatus])] = &[
    (ApplicationStatus::Pending, &[ApplicationStatus::Reviewing]),
    (
        ApplicationStatus::Reviewing,
        &[ApplicationStatus::Approved, ApplicationStatus::Rejected],
    ),
    // A rejected application can be reconsidered; approval is terminal
    // because the promotion into a candidate has already happened.
    (ApplicationStatus::Rejected, &[ApplicationStatus::Reviewing]),
    (ApplicationStatus::Approved, &[]),
];

const PIPELINE_TRANSITIONS: &[(PipelineStatus, &[PipelineStatus])] = &[
    (
        PipelineStatus::New,
        &[
            PipelineStatus::Screening,
            PipelineStatus::Rejected,
            PipelineStatus::Withdrawn,
        ],
    ),
    (
        PipelineStatus::Screening,
        &[
            PipelineStatus::Interview,
            PipelineStatus::Rejected,
            PipelineStatus::Withdrawn,
        ],
    ),
    (
        PipelineStatus::Interview,
        &[PipelineStatus::Offer, PipelineStatus::Rejected],
    ),
    (
        PipelineStatus::Offer,
        &[PipelineStatus::Hired, PipelineStatus::Rejected],
    ),
    (PipelineStatus::Hired, &[]),
    (PipelineStatus::Rejected, &[]),
    (PipelineStatus::Withdrawn, &[]),
];

fn lookup<T: PartialEq + Copy + 'static>(
    table: &'static [(T, &'static [T])],
    from: T,
) -> &'static [T] {
    table
        .iter()
        .find(|(state, _)| *state == from)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

pub fn job_transition_allowed(from: JobStatus, to: JobStatus) -> bool {
    lookup(JOB_TRANSITIONS, from).contains(&to)
}

pub fn application_transition_allowed(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    lookup(APPLICATION_TRANSITIONS, from).contains(&to)
}

pub fn pipeline_transition_allowed(from: PipelineStatus, to: PipelineStatus) -> bool {
    lookup(PIPELINE_TRANSITIONS, from).contains(&to)
}

pub fn check_job_transition(from: JobStatus, to: JobStatus) -> Result<(), AppError> {
    if job_transition_allowed(from, to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition(format!(
            "job cannot move from '{from}' to '{to}'"
        )))
    }
}

pub fn check_application_transition(
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<(), AppError> {
    if application_transition_allowed(from, to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition(format!(
            "application cannot move from '{from}' to '{to}'"
        )))
    }
}

pub fn check_pipeline_transition(
    from: PipelineStatus,
    to: PipelineStatus,
) -> Result<(), AppError> {
    if pipeline_transition_allowed(from, to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition(format!(
            "candidate cannot move from '{from}' to '{to}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_lifecycle() {
        assert!(job_transition_allowed(JobStatus::Draft, JobStatus::Open));
        assert!(job_transition_allowed(JobStatus::Open, JobStatus::Filled));
        assert!(job_transition_allowed(JobStatus::Closed, JobStatus::Open));
        assert!(!job_transition_allowed(JobStatus::Draft, JobStatus::Filled));
        assert!(!job_transition_allowed(JobStatus::Filled, JobStatus::Open));
    }

    #[test]
    fn test_application_approval_is_terminal() {
        assert!(application_transition_allowed(
            ApplicationStatus::Reviewing,
            ApplicationStatus::Approved
        ));
        for target in ApplicationStatus::ALL {
            assert!(!application_transition_allowed(
                ApplicationStatus::Approved,
                *target
            ));
        }
    }

    #[test]
    fn test_pipeline_cannot_skip_to_hired() {
        assert!(!pipeline_transition_allowed(
            PipelineStatus::New,
            PipelineStatus::Hired
        ));
        assert!(!pipeline_transition_allowed(
            PipelineStatus::Screening,
            PipelineStatus::Offer
        ));
        assert!(pipeline_transition_allowed(
            PipelineStatus::Offer,
            PipelineStatus::Hired
        ));
    }

    #[test]
    fn test_self_transitions_rejected() {
        assert!(!job_transition_allowed(JobStatus::Open, JobStatus::Open));
        assert!(!pipeline_transition_allowed(
            PipelineStatus::New,
            PipelineStatus::New
        ));
    }

    #[test]
    fn test_check_helpers_produce_422_errors() {
        let err = check_job_transition(JobStatus::Filled, JobStatus::Open).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert!(check_pipeline_transition(PipelineStatus::Offer, PipelineStatus::Hired).is_ok());
    }
}
