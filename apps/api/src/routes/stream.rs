//! Server-sent event streams of collection snapshots.
//!
//! A client subscribes to one collection and receives the current snapshot
//! immediately, then a fresh full snapshot after every mutation. The
//! subscription guard rides inside the stream, so the hub registry entry is
//! removed as soon as the client disconnects.

use std::convert::Infallible;
use std::str::FromStr;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

use crate::auth::extract::AuthUser;
use crate::auth::permissions::Permission;
use crate::errors::AppError;
use crate::state::AppState;
use crate::store::collection_snapshot;
use crate::sync::Collection;

/// GET /api/v1/stream/:collection
pub async fn handle_stream(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    user: AuthUser,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let collection = Collection::from_str(&collection).map_err(AppError::Validation)?;
    user.require(read_permission(collection))?;

    // Subscribe before the initial read so no snapshot published in between
    // is missed.
    let (guard, receiver) = state.hub.subscribe(collection).into_parts();
    let initial = collection_snapshot(&state.db, collection).await?;

    let initial_event = snapshot_event(collection, &initial);
    let live = BroadcastStream::new(receiver).filter_map(move |update| {
        // Keep the guard alive for as long as the stream is polled.
        let _guard = &guard;
        match update {
            Ok(update) => Some(snapshot_event(update.collection, update.documents.as_slice())),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                // A newer full snapshot is still coming; skipped ones are
                // stale anyway.
                warn!("stream for {collection} lagged, skipped {skipped} snapshot(s)");
                None
            }
        }
    });

    let stream = tokio_stream::once(initial_event).chain(live).map(Ok);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn snapshot_event<T: serde::Serialize + ?Sized>(collection: Collection, documents: &T) -> Event {
    match Event::default()
        .event(collection.as_str())
        .json_data(documents)
    {
        Ok(event) => event,
        Err(e) => {
            warn!("failed to serialize {collection} snapshot: {e}");
            Event::default().event(collection.as_str()).data("[]")
        }
    }
}

fn read_permission(collection: Collection) -> Permission {
    match collection {
        Collection::Users => Permission::ViewUsers,
        Collection::Clients => Permission::ViewClients,
        Collection::Jobs => Permission::ViewJobs,
        Collection::Candidates | Collection::CandidateApplications => Permission::ViewCandidates,
        Collection::Applications => Permission::ViewApplications,
        Collection::Interviews => Permission::ViewInterviews,
        Collection::Emails | Collection::EmailTemplates => Permission::ViewEmails,
    }
}
