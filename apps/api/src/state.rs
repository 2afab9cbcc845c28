use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::jwt::JwtVerifier;
use crate::identity::IdentityClient;
use crate::pipeline::scoring::ResumeScorer;
use crate::sync::SyncHub;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Real-time fan-out: one snapshot channel per collection.
    pub hub: Arc<SyncHub>,
    pub identity: IdentityClient,
    pub jwt: Arc<JwtVerifier>,
    /// Pluggable resume scorer. Default: HeuristicResumeScorer.
    pub scorer: Arc<dyn ResumeScorer>,
}
