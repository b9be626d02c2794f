use axum::http::{self, HeaderValue, Method};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use lupine::app::create_app_with_state;
use lupine::state::AppState;
use lupine::utils::config::ServerConfig;

fn init_logger(verbose: bool) {
    let default = if verbose {
        "debug,tower_http=debug,axum=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenv() {
        eprintln!("Warning: could not load .env file: {}", e);
    }

    let config = ServerConfig::from_env();
    init_logger(config.verbose_logging);

    let origins = [config
        .cors_origin
        .parse::<HeaderValue>()
        .expect("LUPINE_CORS_ORIGIN must be a valid origin")];
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([http::header::CONTENT_TYPE]);

    let addr = SocketAddr::from((config.host, config.port));
    let state = AppState::with_config(config);
    let app = create_app_with_state(state).layer(cors).layer(
        TraceLayer::new_for_http().make_span_with(|request: &http::Request<_>| {
            tracing::info_span!(
                "HTTP request",
                method = %request.method(),
                uri = %request.uri(),
            )
        }),
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind server address");

    println!("lupine server listening on http://{}", addr);
    axum::serve(listener, app).await.expect("server error");
}
