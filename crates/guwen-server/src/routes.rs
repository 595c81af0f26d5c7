use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use guwen_core::catalog::{self, ResourceRoot};
use guwen_core::config::ServerConfig;
use guwen_core::locate::{self, ShardLocator};
use guwen_core::{CorpusError, Missing, Record, parse_id};
use serde_json::{Value, json};
use tracing::debug;

use crate::dictionary::{DictionaryClient, Translation};
use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub resources: ResourceRoot,
    pub music_dir: PathBuf,
    pub dictionary: Arc<DictionaryClient>,
}

impl AppState {
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            resources: ResourceRoot::new(&config.resources_dir),
            music_dir: config.music_dir.clone(),
            dictionary: Arc::new(DictionaryClient::new(
                &config.dictionary.base_url,
                Duration::from_secs(config.dictionary.timeout_secs),
            )),
        }
    }
}

#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/prose/count/:collection/:sub", get(count))
        .route("/api/prose/index/:collection/:sub/:id", get(shard_of_id))
        .route("/api/prose/name/:collection/:sub/:id", get(record_by_id))
        .route("/api/prose/shard/:collection/:sub/:stem", get(shard_by_name))
        .route(
            "/api/prose/voice/:collection/:sub/:language/:id",
            get(record_voice),
        )
        .route("/api/prose/word/voice/:word", get(word_voice))
        .route("/api/prose/word/translate/:word", get(word_translate))
        .route("/api/resources", get(collections))
        .route("/api/resources/:collection", get(subcollections))
        .route("/api/resources/:collection/:sub", get(shard_names))
        .route("/api/music", get(music))
        .with_state(state)
}

/// Run `work` on the blocking pool and flatten both failure layers.
async fn blocking<T, E, F>(work: F) -> Result<T, ServerError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    ServerError: From<E>,
{
    Ok(tokio::task::spawn_blocking(work).await??)
}

fn audio(bytes: Vec<u8>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "audio/mpeg")], bytes)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn count(
    State(st): State<AppState>,
    Path((collection, sub)): Path<(String, String)>,
) -> Result<Json<Value>, ServerError> {
    let total = blocking(move || {
        let dir = st.resources.corpus_dir(&collection, &sub)?;
        guwen_core::estimate_total_count(&dir)
    })
    .await?;
    Ok(Json(json!({ "count": total })))
}

async fn shard_of_id(
    State(st): State<AppState>,
    Path((collection, sub, id)): Path<(String, String, String)>,
) -> Result<Json<Vec<Record>>, ServerError> {
    let id = parse_id(&id)?;
    let records = blocking(move || {
        let dir = st.resources.corpus_dir(&collection, &sub)?;
        ShardLocator::open(dir)?.read_shard_containing(id)
    })
    .await?;
    debug!(id, records = records.len(), "served shard");
    Ok(Json(records))
}

async fn record_by_id(
    State(st): State<AppState>,
    Path((collection, sub, id)): Path<(String, String, String)>,
) -> Result<Json<Record>, ServerError> {
    let id = parse_id(&id)?;
    let record = blocking(move || {
        let dir = st.resources.corpus_dir(&collection, &sub)?;
        ShardLocator::open(dir)?.read_record(id)
    })
    .await?;
    Ok(Json(record))
}

async fn shard_by_name(
    State(st): State<AppState>,
    Path((collection, sub, stem)): Path<(String, String, String)>,
) -> Result<Json<Vec<Record>>, ServerError> {
    let records = blocking(move || {
        let dir = st.resources.corpus_dir(&collection, &sub)?;
        locate::read_shard_by_name(&dir, &stem)
    })
    .await?;
    Ok(Json(records))
}

async fn record_voice(
    State(st): State<AppState>,
    Path((collection, sub, language, id)): Path<(String, String, String, String)>,
) -> Result<impl IntoResponse, ServerError> {
    let bytes = blocking(move || {
        let path = st.resources.voice_path(&collection, &sub, &language, &id)?;
        std::fs::read(&path).map_err(|e| CorpusError::from_io(&path, e, Missing::Resource))
    })
    .await?;
    Ok(audio(bytes))
}

async fn word_voice(
    State(st): State<AppState>,
    Path(word): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let bytes = blocking(move || st.dictionary.voice(&word)).await?;
    Ok(audio(bytes))
}

async fn word_translate(
    State(st): State<AppState>,
    Path(word): Path<String>,
) -> Result<Json<Vec<Translation>>, ServerError> {
    Ok(Json(blocking(move || st.dictionary.translate(&word)).await?))
}

async fn collections(State(st): State<AppState>) -> Result<Json<Vec<String>>, ServerError> {
    Ok(Json(blocking(move || st.resources.list_collections()).await?))
}

async fn subcollections(
    State(st): State<AppState>,
    Path(collection): Path<String>,
) -> Result<Json<Vec<String>>, ServerError> {
    Ok(Json(
        blocking(move || st.resources.list_subcollections(&collection)).await?,
    ))
}

async fn shard_names(
    State(st): State<AppState>,
    Path((collection, sub)): Path<(String, String)>,
) -> Result<Json<Vec<String>>, ServerError> {
    let shards = blocking(move || st.resources.list_shards(&collection, &sub)).await?;
    Ok(Json(shards.into_iter().map(|s| s.name).collect()))
}

async fn music(State(st): State<AppState>) -> Result<Json<Vec<String>>, ServerError> {
    Ok(Json(blocking(move || catalog::list_music(&st.music_dir)).await?))
}
