//! Public catalog handlers
//!
//! Listing endpoints degrade on query failure: the page renders empty
//! with a human-readable error string rather than a 500, so a transient
//! database problem never takes the whole catalog page down.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use evalsite_common::{
    catalog::{normalize_filter, CatalogQuery, FilterOptions, Page},
    db::models::{BlogPost, Evaluation},
    db::{EvaluationFilters, Repository},
    errors::{AppError, Result},
    metrics,
};

const LOAD_ERROR: &str = "Could not load results. Please try again later.";

/// Raw listing parameters. Page arrives as a string so junk values fall
/// back to page 1 instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct EvaluationListParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub sector: Option<String>,
    pub year: Option<String>,
    pub page: Option<String>,
}

#[derive(Serialize)]
pub struct EvaluationListResponse {
    pub items: Vec<Evaluation>,
    pub page: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub filters: FilterOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Filterable, paginated listing of published evaluations.
pub async fn list_evaluations(
    State(state): State<AppState>,
    Query(params): Query<EvaluationListParams>,
) -> Json<EvaluationListResponse> {
    metrics::record_catalog_query("evaluations");

    let query = CatalogQuery::new(params.q.as_deref(), params.page.as_deref());
    let filters = EvaluationFilters {
        kind: normalize_filter(params.kind.as_deref()),
        sector: normalize_filter(params.sector.as_deref()),
        year: normalize_filter(params.year.as_deref()),
    };

    let repo = Repository::new(state.db.clone());

    let (page, error) = match repo.list_published_evaluations(&query, &filters).await {
        Ok(page) => (page, None),
        Err(e) => {
            tracing::error!(error = %e, "Evaluation listing query failed");
            (Page::empty(query.page), Some(LOAD_ERROR.to_string()))
        }
    };

    let filter_options = repo.evaluation_filter_options().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Evaluation filter options query failed");
        FilterOptions::default()
    });

    Json(EvaluationListResponse {
        items: page.items,
        page: page.page,
        has_next: page.has_next,
        has_prev: page.has_prev,
        filters: filter_options,
        error,
    })
}

/// Published evaluation detail by slug. Unpublished records 404.
pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Evaluation>> {
    let repo = Repository::new(state.db.clone());

    let evaluation = repo
        .find_published_evaluation(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "evaluation".to_string(),
            id: slug,
        })?;

    Ok(Json(evaluation))
}

#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    pub q: Option<String>,
    pub tag: Option<String>,
    pub page: Option<String>,
}

#[derive(Serialize)]
pub struct PostListResponse {
    pub items: Vec<BlogPost>,
    pub page: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Filterable, paginated listing of published blog posts.
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PostListParams>,
) -> Json<PostListResponse> {
    metrics::record_catalog_query("posts");

    let query = CatalogQuery::new(params.q.as_deref(), params.page.as_deref());
    let tag = normalize_filter(params.tag.as_deref());

    let repo = Repository::new(state.db.clone());

    let (page, error) = match repo.list_published_posts(&query, tag.as_deref()).await {
        Ok(page) => (page, None),
        Err(e) => {
            tracing::error!(error = %e, "Post listing query failed");
            (Page::empty(query.page), Some(LOAD_ERROR.to_string()))
        }
    };

    let tags = repo.post_tags().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Post tag query failed");
        Vec::new()
    });

    Json(PostListResponse {
        items: page.items,
        page: page.page,
        has_next: page.has_next,
        has_prev: page.has_prev,
        tags,
        error,
    })
}

/// Published blog post detail by slug.
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>> {
    let repo = Repository::new(state.db.clone());

    let post = repo
        .find_published_post(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "post".to_string(),
            id: slug,
        })?;

    Ok(Json(post))
}
