//! Admin contact inquiry handlers
//!
//! Inquiries are read-mostly: the listing pages through them newest
//! first, and the only mutations are flipping the reviewed flag and
//! hard deletion.

use axum::{
    extract::{Query, State},
    response::Redirect,
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::handlers::admin_evaluations::{parse_id, DeleteForm};
use crate::handlers::error_redirect;
use crate::session::AdminSession;
use crate::AppState;
use evalsite_common::{
    catalog::CatalogQuery,
    db::models::ContactInquiry,
    db::Repository,
    errors::{AppError, Result},
    metrics,
};

const LISTING: &str = "/admin/inquiries";

#[derive(Debug, Default, Deserialize)]
pub struct InquiryListParams {
    pub q: Option<String>,
    pub page: Option<String>,
}

#[derive(Serialize)]
pub struct InquiryListResponse {
    pub items: Vec<ContactInquiry>,
    pub page: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Paginated inquiry listing with optional search over name, email and
/// organisation.
pub async fn list(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(params): Query<InquiryListParams>,
) -> Result<Json<InquiryListResponse>> {
    let query = CatalogQuery::new(params.q.as_deref(), params.page.as_deref());

    let repo = Repository::new(state.db.clone());
    let page = repo.list_inquiries(&query).await?;

    Ok(Json(InquiryListResponse {
        items: page.items,
        page: page.page,
        has_next: page.has_next,
        has_prev: page.has_prev,
    }))
}

pub async fn review(
    State(state): State<AppState>,
    _session: AdminSession,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    match review_inner(&state, &form.id).await {
        Ok(()) => Redirect::to(&format!("{}?reviewed=1", LISTING)),
        Err(e) => {
            tracing::error!(error = %e, "Inquiry review failed");
            error_redirect(LISTING, &e.public_message())
        }
    }
}

async fn review_inner(state: &AppState, raw_id: &str) -> Result<()> {
    let id = parse_id(raw_id.trim())?;

    let repo = Repository::new(state.db.clone());
    if !repo.mark_inquiry_reviewed(id).await? {
        return Err(AppError::NotFound {
            resource_type: "inquiry".to_string(),
            id: id.to_string(),
        });
    }

    metrics::record_admin_mutation("inquiry", "review");
    tracing::info!(%id, "Inquiry marked reviewed");
    Ok(())
}

pub async fn delete(
    State(state): State<AppState>,
    _session: AdminSession,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    match delete_inner(&state, &form.id).await {
        Ok(()) => Redirect::to(LISTING),
        Err(e) => {
            tracing::error!(error = %e, "Inquiry delete failed");
            error_redirect(LISTING, &e.public_message())
        }
    }
}

async fn delete_inner(state: &AppState, raw_id: &str) -> Result<()> {
    let id = parse_id(raw_id.trim())?;

    let repo = Repository::new(state.db.clone());
    if !repo.delete_inquiry(id).await? {
        return Err(AppError::NotFound {
            resource_type: "inquiry".to_string(),
            id: id.to_string(),
        });
    }

    metrics::record_admin_mutation("inquiry", "delete");
    tracing::info!(%id, "Inquiry deleted");
    Ok(())
}
