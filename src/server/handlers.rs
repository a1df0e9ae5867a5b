use std::{sync::Arc, time::Instant};

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::executor::ExecutionResult;
use crate::query_planner::Variables;

use super::{
    models::{GraphQLRequest, HealthResponse},
    AppState,
};

pub async fn health_check(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let schema = app_state.executor.schema();
    Json(HealthResponse {
        service: "gqlbridge",
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        schema: schema.name().to_string(),
        roots: schema.root_names().into_iter().map(str::to_string).collect(),
    })
}

/// Executes a query document. Failures are reported inside the body, so the
/// status is always 200 once the request itself deserialized.
pub async fn graphql_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<GraphQLRequest>,
) -> Json<ExecutionResult> {
    let start_time = Instant::now();
    log::debug!("GraphQL handler called with query: {}", payload.query);

    let variables: Variables = payload.variables.unwrap_or_default();
    let result = app_state
        .executor
        .execute_operation(&payload.query, payload.operation_name.as_deref(), &variables)
        .await;

    log::info!(
        "Query finished in {:.3}ms with {} error(s)",
        start_time.elapsed().as_secs_f64() * 1000.0,
        result.errors.len()
    );
    Json(result)
}

/// Schema in SDL form.
pub async fn schema_handler(State(app_state): State<Arc<AppState>>) -> Response {
    let sdl = app_state.executor.schema().to_sdl();
    let mut response = sdl.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/graphql; charset=utf-8"),
    );
    response
}
