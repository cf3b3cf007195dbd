//! Test server for the curl-wrapper integration tests.
//!
//! - `/echo` answers any method with a JSON description of the request.
//! - `/fail/{code}/{name}/{description}` answers `code` with a
//!   `name:description` body; `/raw/{code}` answers with a body lacking the
//!   colon.
//! - `/items` is a small form-driven resource speaking JSON.
//! - `/redirect` answers `303 See Other` pointing at `/echo`.
//! - `/slow/{secs}` sleeps before answering `200`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::Redirect,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

/// What `/echo` saw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub title: String,
}

#[derive(Deserialize)]
pub struct ItemForm {
    pub title: String,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    items: BTreeMap<u64, Item>,
}

pub type Db = Arc<RwLock<Store>>;

type Failure = (StatusCode, String);

pub fn app() -> Router {
    let db: Db = Arc::default();
    Router::new()
        .route("/echo", any(echo))
        .route("/fail/{code}/{name}/{description}", any(fail))
        .route("/raw/{code}", any(raw))
        .route("/redirect", any(redirect))
        .route("/slow/{secs}", any(slow))
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", get(get_item).put(update_item).delete(delete_item))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn fail(Path((code, name, description)): Path<(u16, String, String)>) -> Failure {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("{name}:{description}"))
}

async fn raw(Path(code): Path<u16>) -> Failure {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, "something went wrong".to_string())
}

async fn redirect() -> Redirect {
    Redirect::to("/echo")
}

async fn slow(Path(secs): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_secs(secs)).await;
    "done"
}

async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    let store = db.read().await;
    Json(store.items.values().cloned().collect())
}

async fn create_item(
    State(db): State<Db>,
    body: Bytes,
) -> Result<(StatusCode, Json<Item>), Failure> {
    let input = parse_form(&body)?;
    let mut store = db.write().await;
    store.next_id += 1;
    let item = Item {
        id: store.next_id,
        title: input.title,
    };
    store.items.insert(item.id, item.clone());
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_item(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Item>, Failure> {
    let store = db.read().await;
    store.items.get(&id).cloned().map(Json).ok_or_else(|| not_found(id))
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<u64>,
    body: Bytes,
) -> Result<Json<Item>, Failure> {
    let input = parse_form(&body)?;
    let mut store = db.write().await;
    let item = store.items.get_mut(&id).ok_or_else(|| not_found(id))?;
    item.title = input.title;
    Ok(Json(item.clone()))
}

async fn delete_item(State(db): State<Db>, Path(id): Path<u64>) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    store
        .items
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found(id))
}

/// Bodies are form-urlencoded whether or not a content type was sent; PUT
/// uploads arrive without one.
fn parse_form(body: &[u8]) -> Result<ItemForm, Failure> {
    serde_urlencoded::from_bytes(body)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("bad_request:{e}")))
}

fn not_found(id: u64) -> Failure {
    (StatusCode::NOT_FOUND, format!("not_found:item {id} does not exist"))
}
