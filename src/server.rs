use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::connect_info::ConnectInfo;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::serve::ListenerExt;
use axum::Router;
use futures_util::StreamExt;
use tokio::task;
use tokio::time::{self, Duration};
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{error, info};

use crate::error::Error;
use crate::library::Library;
use crate::precompute::Precomputed;
use crate::session;

const PIPE_CAPACITY: usize = 64 * 1024;

#[derive(Clone)]
struct AppState {
    library: Arc<Library>,
    shutdown_token: CancellationToken,
    tracker: TaskTracker,
}

pub async fn serve(
    listener: tokio::net::TcpListener,
    library: Arc<Library>,
    shutdown_token: CancellationToken,
) -> io::Result<()> {
    let trace =
        TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(true));

    let tracker = TaskTracker::new();

    let state = AppState {
        library,
        shutdown_token: shutdown_token.clone(),
        tracker: tracker.clone(),
    };

    let app = Router::new()
        .route("/{name}", get(animation_handler))
        .with_state(state)
        .fallback(not_found)
        .layer(trace);

    let signal = async move {
        let _ = shutdown_token.cancelled().await;
    };

    info!("HTTP server listening on {}", listener.local_addr()?);

    let listener = listener.tap_io(|tcp_stream| {
        let _ = tcp_stream.set_nodelay(true);
    });

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(signal)
    .await;

    tracker.close();
    let _ = time::timeout(Duration::from_secs(3), tracker.wait()).await;

    result
}

async fn animation_handler(
    Path(name): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    let library = state.library.clone();
    let lookup = {
        let name = name.clone();
        task::spawn_blocking(move || library.get(&name)).await
    };

    match lookup {
        Ok(Ok(animation)) if animation.is_empty() => {
            info!("animation {name} has no frames");

            not_found().await.into_response()
        }

        Ok(Ok(animation)) => stream_response(animation, name, addr, &state),
        Ok(Err(Error::NotFound(_))) => not_found().await.into_response(),
        Ok(Err(Error::Load { .. })) => server_error(),

        Err(e) => {
            error!("animation lookup task failed: {e}");

            server_error()
        }
    }
}

fn stream_response(
    animation: Arc<Precomputed>,
    name: String,
    addr: SocketAddr,
    state: &AppState,
) -> Response {
    let (mut writer, reader) = tokio::io::duplex(PIPE_CAPACITY);
    let token = state.shutdown_token.child_token();

    // Dropping the body (client gone) cancels the session right away, so it
    // doesn't sleep through its frame delay before noticing.
    let guard = token.clone().drop_guard();

    state.tracker.spawn(async move {
        info!("client {addr} started streaming {name}");
        let end = session::stream(&animation, &mut writer, &token).await;
        info!("client {addr} stopped streaming {name}: {end:?}");
    });

    let body = ReaderStream::new(reader).map(move |chunk| {
        let _ = &guard;
        chunk
    });

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        ),
        (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        (header::CONNECTION, HeaderValue::from_static("keep-alive")),
    ];

    (headers, Body::from_stream(body)).into_response()
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Animation not found")
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Animation could not be loaded",
    )
        .into_response()
}
