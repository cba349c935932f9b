use crate::config::AppConfig;
use crate::data::{CountyFeature, SocItem, WageStore};
use crate::encode::{self, ColorEncoding};
use crate::label;
use crate::types::{Collection, FeatureInfo, Theme, ViewMode, WageDataset, WageLevel, WageScale};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use geo::algorithm::contains::Contains;
use geo::bounding_rect::BoundingRect;
use geo::{Coord, Point, Rect};
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

// Wrapper for RTree indexing
struct CountyIndexEntry {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for CountyIndexEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct AppState {
    pub store: WageStore,
    pub counties: Vec<CountyFeature>,
    pub tree: RTree<CountyIndexEntry>,
}

pub async fn start_server(
    config: AppConfig,
    store: WageStore,
    counties: Vec<CountyFeature>,
) -> Result<()> {
    println!("Building spatial index for county lookup...");
    let state = Arc::new(build_state(store, counties));
    println!("Spatial index built.");

    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    println!("Starting server on http://{}", addr);

    let app = Router::new()
        .route("/api/soc-index", get(soc_index_handler))
        .route("/api/wages", get(wages_handler))
        .route("/api/encoding", get(encoding_handler))
        .route("/api/locate", get(locate_handler))
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(store: WageStore, counties: Vec<CountyFeature>) -> AppState {
    let tree_items: Vec<CountyIndexEntry> = counties
        .iter()
        .enumerate()
        .map(|(i, county)| {
            let rect = county.geometry.bounding_rect().unwrap_or(Rect::new(
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 0.0, y: 0.0 },
            ));
            CountyIndexEntry {
                index: i,
                aabb: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
            }
        })
        .collect();

    let tree = RTree::bulk_load(tree_items);
    AppState {
        store,
        counties,
        tree,
    }
}

/// Point-in-county lookup: R-tree candidates by bounding box, then exact
/// containment.
fn locate(state: &AppState, lon: f64, lat: f64) -> Option<FeatureInfo> {
    let point = Point::new(lon, lat);
    let envelope = AABB::from_point([lon, lat]);

    for candidate in state.tree.locate_in_envelope_intersecting(&envelope) {
        if let Some(county) = state.counties.get(candidate.index) {
            if county.geometry.contains(&point) {
                return Some(county.info.clone());
            }
        }
    }
    None
}

/// Query salaries arrive as raw integers; anything non-positive (or too
/// large to be one) means comparison mode is off.
fn parse_salary(raw: Option<i64>) -> Option<u32> {
    raw.and_then(|s| u32::try_from(s).ok()).filter(|s| *s > 0)
}

async fn soc_index_handler(State(state): State<Arc<AppState>>) -> Json<Vec<SocItem>> {
    Json(state.store.soc_index().to_vec())
}

#[derive(Deserialize)]
struct WageQuery {
    soc: String,
    #[serde(default)]
    collection: Collection,
    level: Option<WageLevel>,
}

async fn wages_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WageQuery>,
) -> Result<Json<WageDataset>, StatusCode> {
    let level = params.level.unwrap_or_default();
    let dataset = state
        .store
        .dataset(params.collection, &params.soc, level)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json((*dataset).clone()))
}

#[derive(Deserialize)]
struct EncodingQuery {
    soc: String,
    #[serde(default)]
    collection: Collection,
    level: Option<WageLevel>,
    salary: Option<i64>,
    theme: Option<Theme>,
}

#[derive(Serialize)]
struct EncodingResponse {
    colors: ColorEncoding,
    labels: BTreeMap<String, String>,
    scale: WageScale,
}

async fn encoding_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EncodingQuery>,
) -> Result<Json<EncodingResponse>, StatusCode> {
    let level = params.level.unwrap_or_default();
    let theme = params.theme.unwrap_or_default();
    let dataset = state
        .store
        .dataset(params.collection, &params.soc, level)
        .ok_or(StatusCode::NOT_FOUND)?;

    let mode = ViewMode::resolve(level, parse_salary(params.salary));
    Ok(Json(EncodingResponse {
        colors: encode::encode(&dataset, mode, theme),
        labels: label::label(&dataset, mode),
        scale: dataset.scale,
    }))
}

#[derive(Deserialize)]
struct LocateQuery {
    lat: f64,
    lon: f64,
}

async fn locate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocateQuery>,
) -> Json<Option<FeatureInfo>> {
    Json(locate(&state, params.lon, params.lat))
}
