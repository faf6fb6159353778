use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use juniper::http::GraphQLBatchRequest;
use juniper::http::graphiql::graphiql_source;

use crate::auth::resolve_identity;
use crate::graphql::GraphQLContext;
use crate::state::SharedState;

/// GraphQL POST endpoint. Accepts single and batched requests.
pub async fn graphql_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<GraphQLBatchRequest>,
) -> Response {
    let identity = resolve_identity(&headers, &state.config.jwt_secret, state.store.as_ref()).await;
    let context = GraphQLContext::new(state.clone(), identity);

    let response = request.execute(&state.schema, &context).await;
    let status = if response.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };

    (status, Json(response)).into_response()
}

/// GraphiQL explorer.
pub async fn graphiql() -> Html<String> {
    Html(graphiql_source("/graphql", None))
}
