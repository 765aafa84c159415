use axum::http::{HeaderName, Request, Response, StatusCode};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use shiftstock::{
    access,
    config::{AppConfig, PRINCIPAL_ADMIN_ID},
    db,
    routes,
    session::SessionStore,
    state::AppState,
    telegram::{BotClient, Sender},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shiftstock=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let orm = db::create_orm_conn(&config.database_url).await?;
    db::run_migrations(&orm).await?;

    let client = BotClient::new(&config.bot_token);
    if let Some(url) = config.webhook_url.clone() {
        client.set_webhook(&url).await?;
        tracing::info!(url = %url, "webhook registered");
    }

    let state = AppState {
        orm,
        config: config.clone(),
        api: Arc::new(client),
        sessions: Arc::new(SessionStore::new()),
    };

    // the principal admin row exists from the first boot
    let principal = Sender {
        id: PRINCIPAL_ADMIN_ID,
        username: None,
        first_name: None,
    };
    access::register_if_needed(&state, &principal).await?;
    tracing::info!(principal = PRINCIPAL_ADMIN_ID, "principal admin ready");

    let concurrency_limit_layer = ConcurrencyLimitLayer::new(100);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info!(
                request_id = %request_id,
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    let app = routes::create_router()
        .fallback(not_found)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(concurrency_limit_layer)
        .with_state(state);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
