use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use super::handlers::health;
use crate::auth::{TokenService, TokenSettings};
use crate::graphql::{build_schema, GraphQLContext, GraphQLSchema};
use crate::node::TypeRegistry;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub graphql_schema: GraphQLSchema,
    pub context: GraphQLContext,
}

pub fn create_app(
    db: DatabaseConnection,
    cors_origin: Option<&str>,
    token_settings: TokenSettings,
) -> Result<Router> {
    let registry = Arc::new(TypeRegistry::blog());
    let context = GraphQLContext::new(db.clone(), registry, TokenService::new(token_settings));
    let graphql_schema = build_schema(context.clone());

    let state = AppState {
        db,
        graphql_schema,
        context,
    };

    let cors = match cors_origin.filter(|origin| *origin != "*") {
        Some(origin) => CorsLayer::new().allow_origin(
            origin
                .parse::<axum::http::HeaderValue>()
                .map_err(|e| anyhow!("Invalid CORS origin: {}", e))?,
        ),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers(Any)
    .allow_credentials(false);

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/graphql",
            get(graphql_playground)
                .post(graphql_handler)
                .options(|| async { StatusCode::OK }),
        )
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let principal = state.context.principal_for(authorization).await;
    debug!("GraphQL request from {:?}", principal.id);

    state
        .graphql_schema
        .execute(req.into_inner().data(principal))
        .await
        .into()
}

async fn graphql_playground() -> impl IntoResponse {
    Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
    ))
}
