use crate::config::Config;
use crate::favourites::{self, FavouritesList};
use crate::render::render_page;
use crate::selection::{self, Submission};
use crate::session::{Session, LOOKUP_FAILED_MESSAGE, SAVE_FAILED_MESSAGE};
use crate::store::{FileStore, KeyValueStore};
use crate::tvmaze::{ShowLookup, TvMazeClient};
use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

const MAX_BODY_BYTES: usize = 16 * 1024; // forms carry one short field

#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<dyn ShowLookup>,
    pub store: Arc<dyn KeyValueStore>,
    pub session: Arc<Mutex<Session>>,
    pub presets: Arc<Vec<String>>,
}

impl AppState {
    /// Restores the selected key and favourites from `store`.
    pub fn new(
        lookup: Arc<dyn ShowLookup>,
        store: Arc<dyn KeyValueStore>,
        seed_key: &str,
        presets: Vec<String>,
    ) -> Self {
        let selected_key = selection::load_selected_key(store.as_ref(), seed_key);
        let favourites = favourites::load(store.as_ref());
        info!(
            "Session restored: key '{}', {} favourites",
            selected_key,
            favourites.len()
        );
        Self {
            lookup,
            store,
            session: Arc::new(Mutex::new(Session::new(selected_key, favourites))),
            presets: Arc::new(presets),
        }
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let lookup: Arc<dyn ShowLookup> = Arc::new(TvMazeClient::new(
        config.tvmaze_base_url.clone(),
        config.http_timeout,
    )?);
    let store = FileStore::open(&config.store_path)?;
    info!("Using store file {:?}", store.path());
    let store: Arc<dyn KeyValueStore> = Arc::new(store);

    let state = AppState::new(lookup, store, &config.seed_key, config.presets.clone());
    let app = build_router(state);

    info!("Listening on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", post(search))
        .route("/presets/:name", post(select_preset))
        .route("/details/:id", post(open_details))
        .route("/overlay/close", post(close_details))
        .route("/favourites/:id", post(add_favourite))
        .route("/favourites/:id/remove", post(remove_favourite))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
struct SearchForm {
    #[serde(default)]
    query: String,
}

async fn index(State(state): State<AppState>) -> Response {
    let pending_key = {
        let session = state.session.lock().await;
        (!session.is_loaded()).then(|| session.selected_key.clone())
    };
    let status = match pending_key {
        Some(key) => run_search(&state, key).await,
        None => StatusCode::OK,
    };
    page(&state, status).await
}

async fn search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Response {
    match selection::submit(&form.query) {
        Submission::Empty => {
            debug!("Empty search submitted");
            state.session.lock().await.reject_empty_input();
            page(&state, StatusCode::OK).await
        }
        Submission::Search(key) => {
            remember_key(&state, &key).await;
            let status = run_search(&state, key).await;
            page(&state, status).await
        }
    }
}

async fn select_preset(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(preset) = selection::find_preset(&state.presets, &name).map(str::to_string) else {
        warn!("Unknown preset '{}'", name);
        return (StatusCode::NOT_FOUND, "Unknown preset").into_response();
    };
    remember_key(&state, &preset).await;
    let status = run_search(&state, preset).await;
    page(&state, status).await
}

async fn open_details(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    let ticket = state.session.lock().await.begin_details(id);
    let status = match state.lookup.fetch_show(id).await {
        Ok(record) => {
            info!(show_id = id, "Opening details for '{}'", record.name);
            state.session.lock().await.apply_details(&ticket, record);
            StatusCode::OK
        }
        Err(e) => {
            error!("Failed to fetch show {}: {:?}", id, e);
            state.session.lock().await.fail_details(&ticket);
            StatusCode::BAD_GATEWAY
        }
    };
    page(&state, status).await
}

async fn close_details(State(state): State<AppState>) -> Response {
    state.session.lock().await.close_details();
    page(&state, StatusCode::OK).await
}

async fn add_favourite(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    let known = state.session.lock().await.find_record(id);
    let record = match known {
        Some(record) => record,
        None => match state.lookup.fetch_show(id).await {
            Ok(record) => record,
            Err(e) => {
                error!("Failed to fetch show {} for favourites: {:?}", id, e);
                state.session.lock().await.set_notice(LOOKUP_FAILED_MESSAGE);
                return page(&state, StatusCode::BAD_GATEWAY).await;
            }
        },
    };

    let status = save_favourites(&state, id, move |store, current| {
        favourites::add(store, current, record)
    })
    .await;
    page(&state, status).await
}

async fn remove_favourite(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    let status = save_favourites(&state, id, move |store, current| {
        favourites::remove(store, current, id)
    })
    .await;
    page(&state, status).await
}

/// Applies a favourites change, writing through the store on the blocking
/// pool. The session lock is held until the write settles so changes apply
/// in order. On failure the session list stays as it was.
async fn save_favourites<F>(state: &AppState, id: u32, change: F) -> StatusCode
where
    F: FnOnce(&dyn KeyValueStore, &FavouritesList) -> Result<FavouritesList> + Send + 'static,
{
    let mut session = state.session.lock().await;
    let store = state.store.clone();
    let current = session.favourites.clone();
    let saved = tokio::task::spawn_blocking(move || change(store.as_ref(), &current))
        .await
        .map_err(anyhow::Error::from)
        .and_then(|outcome| outcome);
    match saved {
        Ok(list) => {
            session.set_favourites(list);
            StatusCode::OK
        }
        Err(e) => {
            error!("Failed to save favourites change for show {}: {:?}", id, e);
            session.set_notice(SAVE_FAILED_MESSAGE);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Issues a search for `key` without holding the session lock across the
/// lookup. A response that was superseded while in flight is discarded.
async fn run_search(state: &AppState, key: String) -> StatusCode {
    let ticket = state.session.lock().await.begin_search(key);
    match state.lookup.search_shows(&ticket.key).await {
        Ok(results) => {
            info!("Search '{}' returned {} shows", ticket.key, results.len());
            state.session.lock().await.apply_search(&ticket, results);
            StatusCode::OK
        }
        Err(e) => {
            error!("Search '{}' failed: {:?}", ticket.key, e);
            state.session.lock().await.fail_search(&ticket);
            StatusCode::BAD_GATEWAY
        }
    }
}

async fn remember_key(state: &AppState, key: &str) {
    let store = state.store.clone();
    let owned = key.to_string();
    let saved = tokio::task::spawn_blocking(move || {
        selection::persist_selected_key(store.as_ref(), &owned)
    })
    .await
    .map_err(anyhow::Error::from)
    .and_then(|outcome| outcome);
    if let Err(e) = saved {
        warn!("Could not persist selected key '{}': {:?}", key, e);
    }
}

async fn page(state: &AppState, status: StatusCode) -> Response {
    let session = state.session.lock().await;
    (status, Html(render_page(&session, &state.presets))).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
