//! Resume scoring — pluggable, trait-based scorer measuring an application
//! against its target job.
//!
//! Default: `HeuristicResumeScorer` (pure, fast, deterministic). The trait
//! exists so a semantic backend can be swapped in behind `AppState` without
//! touching handlers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::models::job::JobRow;

const SKILLS_WEIGHT: f64 = 0.40;
const EXPERIENCE_WEIGHT: f64 = 0.30;
const EDUCATION_WEIGHT: f64 = 0.15;
const RELEVANCE_WEIGHT: f64 = 0.15;

/// Minimum word length considered when matching job text against the resume.
const RELEVANCE_MIN_WORD_LEN: usize = 4;

/// Component and overall scores, each in 0–100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeScore {
    pub overall: u32,
    pub skills: u32,
    pub experience: u32,
    pub education: u32,
    pub relevance: u32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

#[async_trait]
pub trait ResumeScorer: Send + Sync {
    async fn score(
        &self,
        application: &ApplicationRow,
        job: &JobRow,
    ) -> Result<ResumeScore, AppError>;
}

/// The default scorer: a weighted sum of four heuristic components
/// (skills 40%, experience 30%, education 15%, relevance 15%).
pub struct HeuristicResumeScorer;

#[async_trait]
impl ResumeScorer for HeuristicResumeScorer {
    async fn score(
        &self,
        application: &ApplicationRow,
        job: &JobRow,
    ) -> Result<ResumeScore, AppError> {
        Ok(compute_resume_score(application, job))
    }
}

pub fn compute_resume_score(application: &ApplicationRow, job: &JobRow) -> ResumeScore {
    let (skills, matched_skills, missing_skills) = skills_component(application, job);
    let experience = experience_component(application, job);
    let education = education_component(application, job);
    let relevance = relevance_component(application, job);

    let overall = (skills as f64 * SKILLS_WEIGHT
        + experience as f64 * EXPERIENCE_WEIGHT
        + education as f64 * EDUCATION_WEIGHT
        + relevance as f64 * RELEVANCE_WEIGHT)
        .round()
        .clamp(0.0, 100.0) as u32;

    ResumeScore {
        overall,
        skills,
        experience,
        education,
        relevance,
        matched_skills,
        missing_skills,
    }
}

/// Substring skill matching: a required skill counts as covered when it and
/// one of the applicant's skills contain each other (case-insensitive).
fn skills_component(application: &ApplicationRow, job: &JobRow) -> (u32, Vec<String>, Vec<String>) {
    if job.required_skills.is_empty() {
        return (100, vec![], vec![]);
    }

    let applicant: Vec<String> = application
        .skills
        .iter()
        .map(|s| s.to_lowercase())
        .collect();

    let mut matched = Vec::new();
    let mut missing = Vec::new();
    for required in &job.required_skills {
        let required_lower = required.to_lowercase();
        let covered = applicant
            .iter()
            .any(|s| s.contains(&required_lower) || required_lower.contains(s.as_str()));
        if covered {
            matched.push(required.clone());
        } else {
            missing.push(required.clone());
        }
    }

    let score = (matched.len() as f64 / job.required_skills.len() as f64 * 100.0).round() as u32;
    (score, matched, missing)
}

fn experience_component(application: &ApplicationRow, job: &JobRow) -> u32 {
    if job.min_experience_years <= 0 {
        return 100;
    }
    let ratio = application.experience_years as f64 / job.min_experience_years as f64;
    (ratio.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Loose education ladder. Unknown strings rank lowest, so an unmet
/// requirement scores proportionally rather than zeroing out.
fn education_rank(text: &str) -> u32 {
    let lower = text.to_lowercase();
    if lower.contains("phd") || lower.contains("doctor") {
        5
    } else if lower.contains("master") {
        4
    } else if lower.contains("bachelor") {
        3
    } else if lower.contains("associate") {
        2
    } else if lower.contains("high school") || lower.contains("diploma") {
        1
    } else {
        0
    }
}

fn education_component(application: &ApplicationRow, job: &JobRow) -> u32 {
    let Some(required) = job.education_requirement.as_deref() else {
        return 100;
    };
    let required_rank = education_rank(required);
    if required_rank == 0 {
        return 100;
    }

    let applicant_rank = application
        .education
        .as_deref()
        .map(education_rank)
        .unwrap_or(0);

    if applicant_rank >= required_rank {
        100
    } else {
        (applicant_rank as f64 / required_rank as f64 * 100.0).round() as u32
    }
}

/// Fraction of the job's title/description vocabulary that appears in the
/// resume text.
fn relevance_component(application: &ApplicationRow, job: &JobRow) -> u32 {
    let Some(resume) = application.resume_text.as_deref() else {
        return 0;
    };
    let resume_lower = resume.to_lowercase();

    let text = format!("{} {}", job.title, job.description).to_lowercase();
    let mut keywords: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= RELEVANCE_MIN_WORD_LEN)
        .collect();
    keywords.sort_unstable();
    keywords.dedup();

    if keywords.is_empty() {
        return 0;
    }

    let hits = keywords
        .iter()
        .filter(|w| resume_lower.contains(**w))
        .count();
    (hits as f64 / keywords.len() as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_job(
        required_skills: Vec<&str>,
        min_experience_years: i32,
        education_requirement: Option<&str>,
    ) -> JobRow {
        JobRow {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            description: "Building backend services in Rust with PostgreSQL.".to_string(),
            status: "open".to_string(),
            job_type: "full_time".to_string(),
            required_skills: required_skills.into_iter().map(String::from).collect(),
            min_experience_years,
            education_requirement: education_requirement.map(String::from),
            created_at: Utc::now(),
        }
    }

    fn make_application(
        skills: Vec<&str>,
        experience_years: i32,
        education: Option<&str>,
        resume_text: Option<&str>,
    ) -> ApplicationRow {
        ApplicationRow {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            applicant_name: "A".to_string(),
            email: "a@example.com".to_string(),
            phone: None,
            skills: skills.into_iter().map(String::from).collect(),
            experience_years,
            education: education.map(String::from),
            resume_text: resume_text.map(String::from),
            status: "pending".to_string(),
            candidate_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_perfect_candidate_scores_100() {
        let job = make_job(vec!["rust", "postgresql"], 3, Some("Bachelor"));
        let application = make_application(
            vec!["Rust", "PostgreSQL"],
            5,
            Some("Master of Science"),
            Some("Backend engineer building backend services with rust and postgresql."),
        );

        let score = compute_resume_score(&application, &job);
        assert_eq!(score.skills, 100);
        assert_eq!(score.experience, 100);
        assert_eq!(score.education, 100);
        assert_eq!(score.overall, 100);
        assert!(score.missing_skills.is_empty());
    }

    #[test]
    fn test_overall_is_weighted_sum_of_components() {
        let job = make_job(vec!["rust", "kubernetes"], 10, Some("Master"));
        let application = make_application(
            vec!["rust"],
            5,
            Some("Bachelor of Arts"),
            Some("I write rust."),
        );

        let score = compute_resume_score(&application, &job);
        let expected = (score.skills as f64 * 0.40
            + score.experience as f64 * 0.30
            + score.education as f64 * 0.15
            + score.relevance as f64 * 0.15)
            .round() as u32;
        assert_eq!(score.overall, expected);
        assert!(score.overall <= 100);
    }

    #[test]
    fn test_skill_matching_is_substring_and_case_insensitive() {
        let job = make_job(vec!["PostgreSQL"], 0, None);
        let application = make_application(vec!["postgres"], 0, None, None);

        let score = compute_resume_score(&application, &job);
        assert_eq!(score.skills, 100);
        assert_eq!(score.matched_skills, vec!["PostgreSQL".to_string()]);
    }

    #[test]
    fn test_missing_skills_are_reported() {
        let job = make_job(vec!["rust", "kafka"], 0, None);
        let application = make_application(vec!["rust"], 0, None, None);

        let score = compute_resume_score(&application, &job);
        assert_eq!(score.skills, 50);
        assert_eq!(score.missing_skills, vec!["kafka".to_string()]);
    }

    #[test]
    fn test_no_requirements_score_full_marks() {
        let job = make_job(vec![], 0, None);
        let application = make_application(vec![], 0, None, None);

        let score = compute_resume_score(&application, &job);
        assert_eq!(score.skills, 100);
        assert_eq!(score.experience, 100);
        assert_eq!(score.education, 100);
        // No resume text: relevance bottoms out at 0, everything stays in range.
        assert_eq!(score.relevance, 0);
        assert!(score.overall <= 100);
    }

    #[test]
    fn test_experience_is_proportional_and_capped() {
        let job = make_job(vec![], 4, None);
        assert_eq!(
            compute_resume_score(&make_application(vec![], 2, None, None), &job).experience,
            50
        );
        assert_eq!(
            compute_resume_score(&make_application(vec![], 12, None, None), &job).experience,
            100
        );
    }

    #[test]
    fn test_education_partial_credit() {
        let job = make_job(vec![], 0, Some("Master"));
        let score = compute_resume_score(
            &make_application(vec![], 0, Some("Bachelor of Science"), None),
            &job,
        );
        assert_eq!(score.education, 75); // rank 3 of 4
    }

    #[tokio::test]
    async fn test_heuristic_scorer_trait_impl() {
        let job = make_job(vec!["rust"], 0, None);
        let application = make_application(vec!["rust"], 0, None, None);

        let score = HeuristicResumeScorer
            .score(&application, &job)
            .await
            .unwrap();
        assert_eq!(score.skills, 100);
    }
}
