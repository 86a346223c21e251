use std::borrow::Cow;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use verbatim_text::{
    Analyzer, Delimiter, PatternError, SentenceForm, StopWords, cloud, filter, ops, tree,
};

/// Response header naming the anchor a word tree was rooted at.
pub const ANCHOR_HEADER: HeaderName = HeaderName::from_static("x-anchor-word");

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub stop_words: Arc<StopWords>,
    pub max_cloud_words: usize,
    pub max_phrase_tokens: usize,
    pub max_body_bytes: usize,
}

#[derive(Deserialize)]
pub struct CloudQuery {
    pub stop_words: Option<String>,
    pub delimiter: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct TreeQuery {
    pub anchor: Option<String>,
}

#[derive(Deserialize)]
pub struct FilterQuery {
    pub word: Option<String>,
    pub form: Option<String>,
}

#[derive(Deserialize)]
pub struct IdsQuery {
    pub word: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/cloud", post(word_cloud))
        .route("/v1/tree", post(word_tree))
        .route("/v1/filter", post(filter_sentences))
        .route("/v1/filter/ids", post(filter_ids))
        .layer(body_limit)
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn word_cloud(
    State(state): State<AppState>,
    Query(params): Query<CloudQuery>,
    body: String,
) -> Result<Response, ApiError> {
    let mut limit = params.limit.unwrap_or(state.max_cloud_words);
    if limit == 0 {
        return Err(ApiError::bad_request("limit must be >= 1"));
    }
    if limit > state.max_cloud_words {
        limit = state.max_cloud_words;
    }
    let delimiter = match params.delimiter.as_deref() {
        Some(raw) => Delimiter::from_config(raw)
            .ok_or_else(|| ApiError::bad_request("delimiter must be a single character"))?,
        None => state.analyzer.delimiter,
    };

    let corpus = state.analyzer.decode(&body)?;
    let stop_words = match params.stop_words.as_deref() {
        Some(list) => Cow::Owned(StopWords::parse(list, delimiter)),
        None => Cow::Borrowed(state.stop_words.as_ref()),
    };
    let words = cloud::build_with_limit(&corpus, &stop_words, limit);
    Ok(json_body(ops::to_json(&words)?))
}

async fn word_tree(
    State(state): State<AppState>,
    Query(params): Query<TreeQuery>,
    body: String,
) -> Result<Response, ApiError> {
    let corpus = state.analyzer.decode(&body)?;
    let anchor = match params.anchor {
        Some(anchor) => anchor,
        None => match cloud::heaviest_word(&corpus, &state.stop_words) {
            Some(word) => word,
            None => return Ok(json_body("[]".to_string())),
        },
    };
    debug!("word tree rooted at {anchor:?}");

    let sets = tree::extract_with_limit(&corpus, &anchor, state.max_phrase_tokens)?;
    let mut response = json_body(ops::to_json(&sets)?);
    if let Ok(value) = HeaderValue::from_str(anchor.trim()) {
        response.headers_mut().insert(ANCHOR_HEADER, value);
    }
    Ok(response)
}

async fn filter_sentences(
    State(state): State<AppState>,
    Query(params): Query<FilterQuery>,
    body: String,
) -> Result<Response, ApiError> {
    let form = match params.form.as_deref() {
        Some(name) => SentenceForm::from_name(name)
            .ok_or_else(|| ApiError::bad_request("form must be raw or postfix"))?,
        None => SentenceForm::Postfix,
    };
    let word = required_word(params.word)?;
    let corpus = state.analyzer.decode(&body)?;
    let sets = filter::match_sentences(&corpus, &word, form)?;
    Ok(json_body(ops::to_json(&sets)?))
}

async fn filter_ids(
    State(state): State<AppState>,
    Query(params): Query<IdsQuery>,
    body: String,
) -> Result<Response, ApiError> {
    let word = required_word(params.word)?;
    let corpus = state.analyzer.decode(&body)?;
    let ids = filter::response_ids(&corpus, &word)?;
    Ok(json_body(ops::to_json(&ids)?))
}

fn required_word(word: Option<String>) -> Result<String, ApiError> {
    word.ok_or_else(|| ApiError::bad_request("missing query parameter: word"))
}

fn json_body(body: String) -> Response {
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl From<ops::Error> for ApiError {
    fn from(err: ops::Error) -> Self {
        match err {
            ops::Error::Decode(_) | ops::Error::Pattern(_) => ApiError::BadRequest(err.to_string()),
            ops::Error::Serialize(source) => {
                error!("failed to encode result: {source}");
                ApiError::Internal
            }
        }
    }
}

impl From<PatternError> for ApiError {
    fn from(err: PatternError) -> Self {
        ApiError::from(ops::Error::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal => {
                let body = Json(json!({ "error": "internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
