use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::VARY;
use axum::routing::get;
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::todo::TodoStore;
use crate::todo::web::create_todo_router;

pub mod htmx;

/// Builds the complete application: todo routes, `/health`, and the static
/// assets in `static_dir` under `/static`.
pub fn build_app(store: TodoStore, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health_check_handler))
        .merge(create_todo_router(store))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(vary_hx_request_layer()),
        )
}

/// Marks responses as varying on `HX-Request`, so caches never hand a
/// fragment to a full-page load or the other way around. Appends, keeping
/// any `Vary` set by the handler.
fn vary_hx_request_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::appending(VARY, HeaderValue::from_static("HX-Request"))
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let app = build_app(TodoStore::new(), &config.static_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Web server stopped");
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn can_add_vary_header() {
        let app = Router::new()
            .route("/test", get(|| async { "test response" }))
            .layer(vary_hx_request_layer());

        let response = app
            .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(VARY),
            Some(&HeaderValue::from_static("HX-Request"))
        );
    }

    #[tokio::test]
    async fn can_preserve_existing_vary_header() {
        async fn handler_with_vary() -> Response<String> {
            let mut response = Response::new("test response".to_string());
            response
                .headers_mut()
                .insert(VARY, HeaderValue::from_static("Accept-Encoding"));
            response
        }

        let app = Router::new()
            .route("/test-with-vary", get(handler_with_vary))
            .layer(vary_hx_request_layer());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/test-with-vary")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let vary: Vec<&str> = response
            .headers()
            .get_all(VARY)
            .iter()
            .map(|value| value.to_str().unwrap())
            .collect();
        assert_eq!(vary, vec!["Accept-Encoding", "HX-Request"]);
    }
}
