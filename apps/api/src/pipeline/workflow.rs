//! Workflow helpers: stage-id → status mapping and the application →
//! candidate promotion. Both are pure; persistence belongs to the caller.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::application::ApplicationRow;
use crate::models::candidate::CandidateRow;
use crate::models::status::{ApplicationStatus, PipelineStatus};

/// Pipeline-board stage ids as the dashboard names them. Anything
/// unrecognized falls back to `new`.
const STAGE_STATUS: &[(&str, PipelineStatus)] = &[
    ("sourced", PipelineStatus::New),
    ("applied", PipelineStatus::New),
    ("phone_screen", PipelineStatus::Screening),
    ("screening", PipelineStatus::Screening),
    ("interview", PipelineStatus::Interview),
    ("onsite", PipelineStatus::Interview),
    ("offer", PipelineStatus::Offer),
    ("hired", PipelineStatus::Hired),
    ("rejected", PipelineStatus::Rejected),
    ("withdrawn", PipelineStatus::Withdrawn),
];

pub fn map_stage_to_status(stage_id: &str) -> PipelineStatus {
    STAGE_STATUS
        .iter()
        .find(|(stage, _)| *stage == stage_id)
        .map(|(_, status)| *status)
        .unwrap_or(PipelineStatus::New)
}

/// The result of promoting an approved application: the updated application
/// plus the candidate record carved out of it.
#[derive(Debug, Clone)]
pub struct Promotion {
    pub application: ApplicationRow,
    pub candidate: CandidateRow,
}

/// Approves an application and derives a candidate record from its profile
/// fields. Generates the candidate id and links the application to it; the
/// caller persists both sides (in one transaction).
pub fn approve_application(mut application: ApplicationRow, now: DateTime<Utc>) -> Promotion {
    let candidate = CandidateRow {
        id: Uuid::new_v4(),
        name: application.applicant_name.clone(),
        email: application.email.clone(),
        phone: application.phone.clone(),
        skills: application.skills.clone(),
        experience_years: application.experience_years,
        education: application.education.clone(),
        resume_text: application.resume_text.clone(),
        created_at: now,
    };

    application.status = ApplicationStatus::Approved.as_str().to_string();
    application.candidate_id = Some(candidate.id);

    Promotion {
        application,
        candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_application() -> ApplicationRow {
        ApplicationRow {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            applicant_name: "Dana Whitfield".to_string(),
            email: "dana@example.com".to_string(),
            phone: Some("+1-555-0100".to_string()),
            skills: vec!["rust".to_string(), "sql".to_string()],
            experience_years: 6,
            education: Some("Bachelor of Science".to_string()),
            resume_text: Some("Six years building backend services.".to_string()),
            status: ApplicationStatus::Reviewing.as_str().to_string(),
            candidate_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_known_stages_map_to_statuses() {
        assert_eq!(map_stage_to_status("phone_screen"), PipelineStatus::Screening);
        assert_eq!(map_stage_to_status("onsite"), PipelineStatus::Interview);
        assert_eq!(map_stage_to_status("hired"), PipelineStatus::Hired);
    }

    #[test]
    fn test_unknown_stage_defaults_to_new() {
        assert_eq!(map_stage_to_status("totally-made-up"), PipelineStatus::New);
        assert_eq!(map_stage_to_status(""), PipelineStatus::New);
    }

    #[test]
    fn test_promotion_links_application_to_candidate() {
        let promotion = approve_application(make_application(), Utc::now());
        assert_eq!(
            promotion.application.candidate_id,
            Some(promotion.candidate.id)
        );
        assert_eq!(promotion.application.status, "approved");
    }

    #[test]
    fn test_promotion_copies_profile_fields() {
        let application = make_application();
        let promotion = approve_application(application.clone(), Utc::now());

        assert_eq!(promotion.candidate.name, application.applicant_name);
        assert_eq!(promotion.candidate.email, application.email);
        assert_eq!(promotion.candidate.skills, application.skills);
        assert_eq!(
            promotion.candidate.experience_years,
            application.experience_years
        );
        assert_eq!(promotion.candidate.resume_text, application.resume_text);
    }
}
