//! REST API endpoints for the pulse service.
//!
//! Thin consumers of the core contract: every handler takes a snapshot (or
//! windowed copy) from the store and shapes it into a response body. No
//! handler mutates anything.

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use event_store::{EventRecord, EventStore};
use metrics_engine::{average_pr_interval, count_events_by_kind, MetricsError};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub stored_events: usize,
}

/// Counts-by-kind response.
#[derive(Debug, Serialize)]
pub struct CountsResponse {
    pub since_utc: DateTime<Utc>,
    pub offset_minutes: i64,
    pub counts: HashMap<String, u64>,
}

/// Distinct repositories currently retained.
#[derive(Debug, Serialize)]
pub struct ReposResponse {
    pub repos: Vec<String>,
}

/// Full snapshot dump, for diagnostics.
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub all_events: Vec<EventRecord>,
}

/// Error body for rejected requests.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct CountsParams {
    /// Look-back window in minutes; defaults to 10.
    offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct IntervalParams {
    /// Repository in `owner/name` format.
    repo: String,
}

/// Invalid look-back window rejection.
#[derive(Debug)]
struct InvalidWindow(String);

impl warp::reject::Reject for InvalidWindow {}

/// Build the complete route tree over a shared store.
pub fn routes(
    store: Arc<EventStore>,
    allowed_kinds: Arc<HashSet<String>>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let health = warp::path!("health")
        .and(warp::get())
        .and(with_store(Arc::clone(&store)))
        .map(|store: Arc<EventStore>| {
            warp::reply::json(&HealthResponse { status: "ok", stored_events: store.len() })
        });

    let counts = warp::path!("metrics" / "counts")
        .and(warp::get())
        .and(warp::query::<CountsParams>())
        .and(with_store(Arc::clone(&store)))
        .and(warp::any().map(move || Arc::clone(&allowed_kinds)))
        .and_then(counts_handler);

    let interval = warp::path!("metrics" / "avg-pr-interval")
        .and(warp::get())
        .and(warp::query::<IntervalParams>())
        .and(with_store(Arc::clone(&store)))
        .map(|params: IntervalParams, store: Arc<EventStore>| {
            warp::reply::json(&average_pr_interval(&store, &params.repo))
        });

    let repos = warp::path!("repos")
        .and(warp::get())
        .and(with_store(Arc::clone(&store)))
        .map(|store: Arc<EventStore>| {
            let mut repos: Vec<String> = store
                .snapshot()
                .into_iter()
                .map(|event| event.repo)
                .filter(|repo| !repo.is_empty())
                .collect();
            repos.sort_unstable();
            repos.dedup();
            warp::reply::json(&ReposResponse { repos })
        });

    let all_events = warp::path!("all-events")
        .and(warp::get())
        .and(with_store(store))
        .map(|store: Arc<EventStore>| {
            warp::reply::json(&EventsResponse { all_events: store.snapshot() })
        });

    health
        .or(counts)
        .or(interval)
        .or(repos)
        .or(all_events)
        .recover(handle_rejection)
}

fn with_store(
    store: Arc<EventStore>,
) -> impl Filter<Extract = (Arc<EventStore>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&store))
}

async fn counts_handler(
    params: CountsParams,
    store: Arc<EventStore>,
    allowed_kinds: Arc<HashSet<String>>,
) -> Result<impl Reply, Rejection> {
    let offset = params.offset.unwrap_or(10);
    let retention_minutes = store.retention().num_minutes();
    if offset < 1 || offset > retention_minutes {
        return Err(warp::reject::custom(InvalidWindow(format!(
            "offset must be between 1 and {retention_minutes} minutes"
        ))));
    }

    let since = Utc::now() - Duration::minutes(offset);
    match count_events_by_kind(&store, since, &allowed_kinds) {
        Ok(counts) => Ok(warp::reply::json(&CountsResponse {
            since_utc: since,
            offset_minutes: offset,
            counts,
        })),
        Err(MetricsError::WindowExceedsRetention) => Err(warp::reject::custom(InvalidWindow(
            "query window exceeds the store retention period".to_string(),
        ))),
    }
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(invalid) = err.find::<InvalidWindow>() {
        (StatusCode::BAD_REQUEST, invalid.0.clone())
    } else if let Some(invalid) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, invalid.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    };

    let body = warp::reply::json(&ErrorResponse { error: message });
    Ok(warp::reply::with_status(body, status))
}
