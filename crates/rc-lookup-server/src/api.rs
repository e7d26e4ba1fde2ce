//! HTTP API: `GET /?rc_number=...` and `GET /_health`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use rc_lookup::{normalize_rc_number, Metadata, Record};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::error::ServerResult;
use crate::lookup::{LookupOutcome, LookupService};

pub const MISSING_RC_MESSAGE: &str = "Missing rc_number";
pub const NOT_FOUND_MESSAGE: &str = "No details found from free sources";

/// Query parameters for a lookup.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LookupParams {
    pub rc_number: Option<String>,
    pub debug: Option<String>,
}

impl LookupParams {
    /// Pick parameters from raw query pairs. A repeated parameter keeps its
    /// first value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "rc_number" => &mut params.rc_number,
                "debug" => &mut params.debug,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }
}

/// Body of a lookup response. Field order is the wire order.
#[derive(Debug, Serialize)]
struct LookupBody<'a> {
    status: &'static str,
    rc_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_sources: Option<RawSources<'a>>,
}

impl<'a> LookupBody<'a> {
    fn new(outcome: &'a LookupOutcome, debug: bool) -> Self {
        let found = !outcome.details.is_empty();
        Self {
            status: if found { "success" } else { "not_found" },
            rc_number: &outcome.rc_number,
            message: (!found).then_some(NOT_FOUND_MESSAGE),
            details: found.then_some(&outcome.details),
            raw_sources: debug.then(|| RawSources(&outcome.sources)),
        }
    }
}

/// Per-source metadata as a JSON object keyed by source name, in query order.
#[derive(Debug)]
struct RawSources<'a>(&'a [(String, Metadata)]);

impl Serialize for RawSources<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, meta) in self.0 {
            map.serialize_entry(name, meta)?;
        }
        map.end()
    }
}

/// Build the axum Router with all endpoints.
pub fn router(service: Arc<LookupService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_lookup))
        .route("/_health", get(handle_health))
        .layer(cors)
        .with_state(service)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, service: Arc<LookupService>) -> ServerResult<()> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP API listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// `1`, `true`, or `yes`, any case.
pub fn is_truthy(raw: &str) -> bool {
    ["1", "true", "yes"]
        .iter()
        .any(|t| raw.eq_ignore_ascii_case(t))
}

async fn handle_lookup(
    State(service): State<Arc<LookupService>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params = LookupParams::from_pairs(pairs);
    let rc_number = params
        .rc_number
        .as_deref()
        .map(normalize_rc_number)
        .filter(|rc| !rc.is_empty());
    let Some(rc_number) = rc_number else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": MISSING_RC_MESSAGE })),
        )
            .into_response();
    };
    let debug = params.debug.as_deref().is_some_and(is_truthy);

    let outcome = service.lookup(&rc_number).await;
    let status = if outcome.details.is_empty() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };

    (status, Json(LookupBody::new(&outcome, debug))).into_response()
}

/// Health check.
async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
