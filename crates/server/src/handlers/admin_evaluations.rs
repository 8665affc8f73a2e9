//! Admin CRUD for evaluation records
//!
//! Mutations arrive as multipart form posts and always answer with a
//! redirect back to the admin listing, carrying an `error` message on
//! failure. Update submissions only touch the report and cover file
//! pairs when a new file was uploaded.

use axum::{
    extract::{Multipart, State},
    response::Redirect,
    Form, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::forms::FormData;
use crate::handlers::error_redirect;
use crate::session::AdminSession;
use crate::AppState;
use evalsite_common::{
    db::models::Evaluation,
    db::{EvaluationUpdate, NewEvaluation, Repository},
    errors::{AppError, Result},
    metrics,
    storage::{cover_path, report_path, StoredFile},
};

const LISTING: &str = "/admin/evaluations";

/// Every evaluation regardless of publication state.
pub async fn list(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<Evaluation>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.list_evaluations_admin().await?))
}

pub async fn create(
    State(state): State<AppState>,
    _session: AdminSession,
    mut multipart: Multipart,
) -> Redirect {
    match create_inner(&state, &mut multipart).await {
        Ok(()) => Redirect::to(LISTING),
        Err(e) => {
            tracing::error!(error = %e, "Evaluation create failed");
            error_redirect(LISTING, &e.public_message())
        }
    }
}

async fn create_inner(state: &AppState, multipart: &mut Multipart) -> Result<()> {
    let form = FormData::read(multipart).await?;

    let title = form.trimmed("title").to_string();
    let slug = form.trimmed("slug").to_string();
    if title.is_empty() || slug.is_empty() {
        return Err(AppError::Validation {
            message: "Title and slug are required.".to_string(),
        });
    }

    let report = upload_report(state, &slug, &form).await?;
    let cover = upload_cover(state, &slug, &form).await?;

    let repo = Repository::new(state.db.clone());
    let saved = repo
        .create_evaluation(NewEvaluation {
            title,
            slug,
            kind: form.optional("type"),
            sector: form.optional("sector"),
            location: form.optional("location"),
            year: form.optional("year"),
            summary: form.optional("summary"),
            content: form.optional("content"),
            is_published: form.checkbox("is_published"),
            report,
            cover,
        })
        .await?;

    metrics::record_admin_mutation("evaluation", "create");
    tracing::info!(id = %saved.id, slug = %saved.slug, "Evaluation created");
    Ok(())
}

pub async fn update(
    State(state): State<AppState>,
    _session: AdminSession,
    mut multipart: Multipart,
) -> Redirect {
    match update_inner(&state, &mut multipart).await {
        Ok(()) => Redirect::to(LISTING),
        Err(e) => {
            tracing::error!(error = %e, "Evaluation update failed");
            error_redirect(LISTING, &e.public_message())
        }
    }
}

async fn update_inner(state: &AppState, multipart: &mut Multipart) -> Result<()> {
    let form = FormData::read(multipart).await?;

    let id = parse_id(form.trimmed("id"))?;
    let title = form.trimmed("title").to_string();
    let slug = form.trimmed("slug").to_string();
    if title.is_empty() || slug.is_empty() {
        return Err(AppError::Validation {
            message: "Title and slug are required.".to_string(),
        });
    }

    let report = upload_report(state, &slug, &form).await?;
    let cover = upload_cover(state, &slug, &form).await?;

    let repo = Repository::new(state.db.clone());
    let updated = repo
        .update_evaluation(
            id,
            EvaluationUpdate {
                title,
                slug,
                kind: form.optional("type"),
                sector: form.optional("sector"),
                location: form.optional("location"),
                year: form.optional("year"),
                summary: form.optional("summary"),
                content: form.optional("content"),
                is_published: form.checkbox("is_published"),
                report,
                cover,
            },
        )
        .await?;

    if !updated {
        return Err(AppError::NotFound {
            resource_type: "evaluation".to_string(),
            id: id.to_string(),
        });
    }

    metrics::record_admin_mutation("evaluation", "update");
    tracing::info!(%id, "Evaluation updated");
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub id: String,
}

pub async fn delete(
    State(state): State<AppState>,
    _session: AdminSession,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    match delete_inner(&state, &form.id).await {
        Ok(()) => Redirect::to(LISTING),
        Err(e) => {
            tracing::error!(error = %e, "Evaluation delete failed");
            error_redirect(LISTING, &e.public_message())
        }
    }
}

async fn delete_inner(state: &AppState, raw_id: &str) -> Result<()> {
    let id = parse_id(raw_id.trim())?;

    let repo = Repository::new(state.db.clone());
    if !repo.delete_evaluation(id).await? {
        return Err(AppError::NotFound {
            resource_type: "evaluation".to_string(),
            id: id.to_string(),
        });
    }

    metrics::record_admin_mutation("evaluation", "delete");
    tracing::info!(%id, "Evaluation deleted");
    Ok(())
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid> {
    if raw.is_empty() {
        return Err(AppError::Validation {
            message: "Missing record id.".to_string(),
        });
    }
    Uuid::parse_str(raw).map_err(|_| AppError::Validation {
        message: "Invalid record id.".to_string(),
    })
}

async fn upload_report(
    state: &AppState,
    slug: &str,
    form: &FormData,
) -> Result<Option<StoredFile>> {
    let file = match form.file("report") {
        Some(file) => file,
        None => return Ok(None),
    };

    let path = report_path(slug, &file.filename);
    let stored = state
        .storage
        .upload(&path, file.bytes.clone(), &file.content_type)
        .await
        .inspect_err(|_| metrics::record_upload_failure())?;
    Ok(Some(stored))
}

async fn upload_cover(
    state: &AppState,
    slug: &str,
    form: &FormData,
) -> Result<Option<StoredFile>> {
    let file = match form.file("cover") {
        Some(file) => file,
        None => return Ok(None),
    };

    let path = cover_path(slug, &file.filename);
    let stored = state
        .storage
        .upload(&path, file.bytes.clone(), &file.content_type)
        .await
        .inspect_err(|_| metrics::record_upload_failure())?;
    Ok(Some(stored))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert!(parse_id("").is_err());
        assert!(parse_id("not-a-uuid").is_err());

        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
