use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use dracor_core::century::CenturyCounts;
use dracor_core::corpus_summary::CorpusSummary;
use dracor_core::export::frame_to_json;
use dracor_core::filter::{FilterBounds, InclusiveRange, PlayFilter};
use dracor_core::highlight::ScatterPoint;
use dracor_core::network::PlayNetwork;
use dracor_core::schema;
use serde::Deserialize;
use serde_json::Value;

use crate::{ApiError, AppState};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// `Query` whose rejection is reported through [`ApiError`].
type FilterParams = Result<Query<FilterQuery>, QueryRejection>;

/// Filter query parameters; anything omitted falls back to the table bounds.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub corpora: Option<String>,
    pub segments_min: Option<i64>,
    pub segments_max: Option<i64>,
    pub years_min: Option<i64>,
    pub years_max: Option<i64>,
    pub metrics: Option<String>,
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

impl FilterQuery {
    fn resolve(&self, bounds: &FilterBounds) -> Result<PlayFilter, ApiError> {
        let mut corpora = split_list(self.corpora.as_deref());
        if corpora.is_empty() {
            corpora = bounds.corpora.clone();
        }

        let segments = InclusiveRange::new(
            self.segments_min.unwrap_or(bounds.segments.start),
            self.segments_max.unwrap_or(bounds.segments.end),
        );

        let years = match (self.years_min, self.years_max, bounds.years) {
            (Some(start), Some(end), _) => InclusiveRange::new(start, end),
            (start, end, Some(known)) => {
                InclusiveRange::new(start.unwrap_or(known.start), end.unwrap_or(known.end))
            }
            _ => {
                return Err(ApiError::BadRequest(
                    "no play has a known year; pass years_min and years_max".to_string(),
                ))
            }
        };

        Ok(PlayFilter::new(corpora, segments, years))
    }
}

pub async fn corpora(State(app_state): State<Arc<AppState>>) -> ApiResult<Vec<String>> {
    Ok(Json(app_state.pipeline.corpus_names()?))
}

pub async fn corpus_plays(
    State(app_state): State<Arc<AppState>>,
    Path(corpus): Path<String>,
) -> ApiResult<Vec<String>> {
    let known = app_state.pipeline.corpus_names()?;
    if !known.contains(&corpus) {
        return Err(ApiError::NotFound(format!("unknown corpus '{corpus}'")));
    }
    Ok(Json(app_state.pipeline.play_names(Some(&corpus))?))
}

pub async fn bounds(State(app_state): State<Arc<AppState>>) -> ApiResult<FilterBounds> {
    Ok(Json(app_state.pipeline.bounds()?))
}

pub async fn summary(
    State(app_state): State<Arc<AppState>>,
    query: FilterParams,
) -> ApiResult<Vec<CorpusSummary>> {
    let Query(query) = query?;
    let filter = query.resolve(&app_state.pipeline.bounds()?)?;
    Ok(Json(app_state.pipeline.summarize_by_corpus(&filter)?))
}

pub async fn centuries(
    State(app_state): State<Arc<AppState>>,
    query: FilterParams,
) -> ApiResult<Vec<CenturyCounts>> {
    let Query(query) = query?;
    let filter = query.resolve(&app_state.pipeline.bounds()?)?;
    let requested = split_list(query.metrics.as_deref());
    let metrics: Vec<&str> = if requested.is_empty() {
        schema::DEFAULT_CENTURY_METRICS.to_vec()
    } else {
        requested.iter().map(String::as_str).collect()
    };
    Ok(Json(app_state.pipeline.summarize_by_century(&filter, &metrics)?))
}

pub async fn classified(
    State(app_state): State<Arc<AppState>>,
    query: FilterParams,
) -> ApiResult<Value> {
    let Query(query) = query?;
    let filter = query.resolve(&app_state.pipeline.bounds()?)?;
    let classified = app_state.pipeline.classify_and_filter(&filter)?;
    Ok(Json(frame_to_json(&classified)?))
}

pub async fn scatter(
    State(app_state): State<Arc<AppState>>,
    query: FilterParams,
) -> ApiResult<Vec<ScatterPoint>> {
    let Query(query) = query?;
    let filter = query.resolve(&app_state.pipeline.bounds()?)?;
    Ok(Json(app_state.pipeline.scatter_points(&filter)?))
}

#[derive(Debug, Deserialize)]
pub struct NetworkQuery {
    pub plays: Option<String>,
}

pub async fn networks(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<NetworkQuery>, QueryRejection>,
) -> ApiResult<Vec<PlayNetwork>> {
    let Query(query) = query?;
    let plays = split_list(query.plays.as_deref());
    let networks = app_state
        .pipeline
        .fetch_networks(app_state.source.as_ref(), &plays)
        .await?;
    Ok(Json(networks))
}
