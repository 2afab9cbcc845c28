//! Relationship consistency checker.
//!
//! Detects dangling references between the entity tables and reports them.
//! It never repairs anything: this is a manual ops tool behind an admin
//! endpoint, and repair stays a human decision.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::models::application::ApplicationRow;
use crate::models::candidate::{CandidateApplicationRow, CandidateRow};
use crate::models::client::ClientRow;
use crate::models::job::JobRow;
use crate::models::status::ApplicationStatus;

#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyIssue {
    pub entity: &'static str,
    pub id: Uuid,
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    pub checked_jobs: usize,
    pub checked_candidate_applications: usize,
    pub checked_applications: usize,
    pub issues: Vec<ConsistencyIssue>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn check_consistency(
    clients: &[ClientRow],
    jobs: &[JobRow],
    candidates: &[CandidateRow],
    candidate_apps: &[CandidateApplicationRow],
    applications: &[ApplicationRow],
) -> ConsistencyReport {
    let client_ids: HashSet<Uuid> = clients.iter().map(|c| c.id).collect();
    let job_ids: HashSet<Uuid> = jobs.iter().map(|j| j.id).collect();
    let candidate_ids: HashSet<Uuid> = candidates.iter().map(|c| c.id).collect();

    let mut issues = Vec::new();

    for job in jobs {
        if !client_ids.contains(&job.client_id) {
            issues.push(ConsistencyIssue {
                entity: "job",
                id: job.id,
                field: "client_id",
                message: format!("references missing client {}", job.client_id),
            });
        }
    }

    for app in candidate_apps {
        if !candidate_ids.contains(&app.candidate_id) {
            issues.push(ConsistencyIssue {
                entity: "candidate_application",
                id: app.id,
                field: "candidate_id",
                message: format!("references missing candidate {}", app.candidate_id),
            });
        }
        if !job_ids.contains(&app.job_id) {
            issues.push(ConsistencyIssue {
                entity: "candidate_application",
                id: app.id,
                field: "job_id",
                message: format!("references missing job {}", app.job_id),
            });
        }
    }

    for app in applications {
        if !job_ids.contains(&app.job_id) {
            issues.push(ConsistencyIssue {
                entity: "application",
                id: app.id,
                field: "job_id",
                message: format!("references missing job {}", app.job_id),
            });
        }
        if !client_ids.contains(&app.client_id) {
            issues.push(ConsistencyIssue {
                entity: "application",
                id: app.id,
                field: "client_id",
                message: format!("references missing client {}", app.client_id),
            });
        }
        if app.status == ApplicationStatus::Approved.as_str() {
            match app.candidate_id {
                None => issues.push(ConsistencyIssue {
                    entity: "application",
                    id: app.id,
                    field: "candidate_id",
                    message: "approved but not linked to a candidate".to_string(),
                }),
                Some(candidate_id) if !candidate_ids.contains(&candidate_id) => {
                    issues.push(ConsistencyIssue {
                        entity: "application",
                        id: app.id,
                        field: "candidate_id",
                        message: format!("references missing candidate {candidate_id}"),
                    });
                }
                Some(_) => {}
            }
        }
    }

    ConsistencyReport {
        checked_jobs: jobs.len(),
        checked_candidate_applications: candidate_apps.len(),
        checked_applications: applications.len(),
        issues,
    }
}
