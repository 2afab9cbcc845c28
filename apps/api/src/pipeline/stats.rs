//! Derived statistics.
//!
//! Pure reducers over already-fetched slices. Every call is an O(n) scan;
//! nothing is cached or incrementally maintained. Candidate counts are per
//! distinct candidate, so someone in two of a client's pipelines counts once.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::models::application::ApplicationRow;
use crate::models::candidate::{CandidateApplicationRow, CandidateRow};
use crate::models::client::ClientRow;
use crate::models::job::JobRow;
use crate::models::status::{ApplicationStatus, JobStatus, PipelineStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientStatistics {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub closed_jobs: usize,
    pub total_candidates: usize,
    pub hired_candidates: usize,
    pub rejected_candidates: usize,
    /// hired / total candidates; 0.0 when there are no candidates.
    pub success_rate: f64,
}

pub fn client_statistics(
    client_id: Uuid,
    jobs: &[JobRow],
    candidate_apps: &[CandidateApplicationRow],
) -> ClientStatistics {
    let client_jobs: Vec<&JobRow> = jobs.iter().filter(|j| j.client_id == client_id).collect();

    let active_jobs = client_jobs
        .iter()
        .filter(|j| j.status == JobStatus::Open.as_str())
        .count();
    let closed_jobs = client_jobs
        .iter()
        .filter(|j| {
            j.status == JobStatus::Closed.as_str() || j.status == JobStatus::Filled.as_str()
        })
        .count();

    let job_ids: HashSet<Uuid> = client_jobs.iter().map(|j| j.id).collect();

    let mut all = HashSet::new();
    let mut hired = HashSet::new();
    let mut rejected = HashSet::new();
    for app in candidate_apps.iter().filter(|a| job_ids.contains(&a.job_id)) {
        all.insert(app.candidate_id);
        if app.status == PipelineStatus::Hired.as_str() {
            hired.insert(app.candidate_id);
        } else if app.status == PipelineStatus::Rejected.as_str() {
            rejected.insert(app.candidate_id);
        }
    }

    ClientStatistics {
        total_jobs: client_jobs.len(),
        active_jobs,
        closed_jobs,
        total_candidates: all.len(),
        hired_candidates: hired.len(),
        rejected_candidates: rejected.len(),
        success_rate: rate(hired.len(), all.len()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStatistics {
    pub total_candidates: usize,
    pub in_process: usize,
    pub hired: usize,
    pub rejected: usize,
    pub success_rate: f64,
}

pub fn job_statistics(job_id: Uuid, candidate_apps: &[CandidateApplicationRow]) -> JobStatistics {
    let mut total = 0;
    let mut hired = 0;
    let mut rejected = 0;
    let mut withdrawn = 0;
    for app in candidate_apps.iter().filter(|a| a.job_id == job_id) {
        total += 1;
        if app.status == PipelineStatus::Hired.as_str() {
            hired += 1;
        } else if app.status == PipelineStatus::Rejected.as_str() {
            rejected += 1;
        } else if app.status == PipelineStatus::Withdrawn.as_str() {
            withdrawn += 1;
        }
    }

    JobStatistics {
        total_candidates: total,
        in_process: total - hired - rejected - withdrawn,
        hired,
        rejected,
        success_rate: rate(hired, total),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStatistics {
    pub total_clients: usize,
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub total_candidates: usize,
    pub hired_candidates: usize,
    pub pending_applications: usize,
    pub approved_applications: usize,
}

pub fn dashboard_statistics(
    clients: &[ClientRow],
    jobs: &[JobRow],
    candidates: &[CandidateRow],
    candidate_apps: &[CandidateApplicationRow],
    applications: &[ApplicationRow],
) -> DashboardStatistics {
    let hired: HashSet<Uuid> = candidate_apps
        .iter()
        .filter(|a| a.status == PipelineStatus::Hired.as_str())
        .map(|a| a.candidate_id)
        .collect();

    DashboardStatistics {
        total_clients: clients.len(),
        total_jobs: jobs.len(),
        active_jobs: jobs
            .iter()
            .filter(|j| j.status == JobStatus::Open.as_str())
            .count(),
        // The candidate table itself, so someone not yet attached to any
        // pipeline still shows up.
        total_candidates: candidates.len(),
        hired_candidates: hired.len(),
        pending_applications: applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Pending.as_str())
            .count(),
        approved_applications: applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Approved.as_str())
            .count(),
    }
}

fn rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_job(client_id: Uuid, status: JobStatus) -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            client_id,
            title: "Backend Engineer".to_string(),
            description: String::new(),
            status: status.as_str().to_string(),
            job_type: "full_time".to_string(),
            required_skills: vec![],
            min_experience_years: 0,
            education_requirement: None,
            created_at: Utc::now(),
        }
    }

    fn make_candidate(id: Uuid) -> CandidateRow {
        CandidateRow {
            id,
            name: "Pat".to_string(),
            email: "pat@example.com".to_string(),
            phone: None,
            skills: vec![],
            experience_years: 0,
            education: None,
            resume_text: None,
            created_at: Utc::now(),
        }
    }

    fn make_candidate_app(job_id: Uuid, status: PipelineStatus) -> CandidateApplicationRow {
        CandidateApplicationRow {
            id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            job_id,
            status: status.as_str().to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_client_with_no_jobs_is_all_zeros() {
        let stats = client_statistics(Uuid::new_v4(), &[], &[]);
        assert_eq!(
            stats,
            ClientStatistics {
                total_jobs: 0,
                active_jobs: 0,
                closed_jobs: 0,
                total_candidates: 0,
                hired_candidates: 0,
                rejected_candidates: 0,
                success_rate: 0.0,
            }
        );
    }

    #[test]
    fn test_client_scenario_two_jobs_three_candidates() {
        // 2 jobs (1 open, 1 closed), 3 candidates (1 hired, 1 active, 1 rejected).
        let client_id = Uuid::new_v4();
        let open_job = make_job(client_id, JobStatus::Open);
        let closed_job = make_job(client_id, JobStatus::Closed);
        let apps = vec![
            make_candidate_app(open_job.id, PipelineStatus::Hired),
            make_candidate_app(open_job.id, PipelineStatus::Interview),
            make_candidate_app(closed_job.id, PipelineStatus::Rejected),
        ];

        let stats = client_statistics(client_id, &[open_job, closed_job], &apps);
        assert_eq!(stats.total_jobs, 2);
        assert_eq!(stats.active_jobs, 1);
        assert_eq!(stats.closed_jobs, 1);
        assert_eq!(stats.total_candidates, 3);
        assert_eq!(stats.hired_candidates, 1);
        assert_eq!(stats.rejected_candidates, 1);
        assert!((stats.success_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_other_clients_jobs_are_excluded() {
        let client_id = Uuid::new_v4();
        let mine = make_job(client_id, JobStatus::Open);
        let theirs = make_job(Uuid::new_v4(), JobStatus::Open);
        let apps = vec![make_candidate_app(theirs.id, PipelineStatus::Hired)];

        let stats = client_statistics(client_id, &[mine, theirs], &apps);
        assert_eq!(stats.total_jobs, 1);
        assert_eq!(stats.total_candidates, 0);
    }

    #[test]
    fn test_candidate_in_two_pipelines_counts_once() {
        let client_id = Uuid::new_v4();
        let job_a = make_job(client_id, JobStatus::Open);
        let job_b = make_job(client_id, JobStatus::Open);
        let candidate_id = Uuid::new_v4();
        let mut app_a = make_candidate_app(job_a.id, PipelineStatus::Interview);
        let mut app_b = make_candidate_app(job_b.id, PipelineStatus::Screening);
        app_a.candidate_id = candidate_id;
        app_b.candidate_id = candidate_id;

        let stats = client_statistics(client_id, &[job_a, job_b], &[app_a, app_b]);
        assert_eq!(stats.total_candidates, 1);
    }

    #[test]
    fn test_job_statistics_counts_and_rate() {
        let job_id = Uuid::new_v4();
        let apps = vec![
            make_candidate_app(job_id, PipelineStatus::Hired),
            make_candidate_app(job_id, PipelineStatus::Rejected),
            make_candidate_app(job_id, PipelineStatus::Offer),
            make_candidate_app(job_id, PipelineStatus::Withdrawn),
            make_candidate_app(Uuid::new_v4(), PipelineStatus::Hired),
        ];

        let stats = job_statistics(job_id, &apps);
        assert_eq!(stats.total_candidates, 4);
        assert_eq!(stats.hired, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.in_process, 1);
        assert!((stats.success_rate - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_dashboard_rollup() {
        let client = ClientRow {
            id: Uuid::new_v4(),
            company_name: "Acme".to_string(),
            industry: None,
            website: None,
            location: None,
            contacts: serde_json::json!([]),
            created_at: Utc::now(),
        };
        let job = make_job(client.id, JobStatus::Open);
        let apps = vec![make_candidate_app(job.id, PipelineStatus::Hired)];
        let inbound = vec![ApplicationRow {
            id: Uuid::new_v4(),
            job_id: job.id,
            client_id: client.id,
            applicant_name: "A".to_string(),
            email: "a@example.com".to_string(),
            phone: None,
            skills: vec![],
            experience_years: 0,
            education: None,
            resume_text: None,
            status: ApplicationStatus::Pending.as_str().to_string(),
            candidate_id: None,
            created_at: Utc::now(),
        }];

        let candidates = vec![make_candidate(apps[0].candidate_id)];
        let stats = dashboard_statistics(&[client], &[job], &candidates, &apps, &inbound);
        assert_eq!(stats.total_clients, 1);
        assert_eq!(stats.active_jobs, 1);
        assert_eq!(stats.total_candidates, 1);
        assert_eq!(stats.hired_candidates, 1);
        assert_eq!(stats.pending_applications, 1);
        assert_eq!(stats.approved_applications, 0);
    }

    #[test]
    fn test_dashboard_counts_candidates_without_pipelines() {
        let attached = make_candidate(Uuid::new_v4());
        let unattached = make_candidate(Uuid::new_v4());
        let job = make_job(Uuid::new_v4(), JobStatus::Open);
        let mut app = make_candidate_app(job.id, PipelineStatus::Screening);
        app.candidate_id = attached.id;

        let stats = dashboard_statistics(&[], &[job], &[attached, unattached], &[app], &[]);
        assert_eq!(stats.total_candidates, 2);
        assert_eq!(stats.hired_candidates, 0);
    }
}
