//! Admin CRUD for blog posts
//!
//! Same redirect and file-preservation semantics as the evaluation
//! handlers. A blank publication timestamp defaults to the submission
//! time on create and leaves the stored value untouched on update.

use axum::{
    extract::{Multipart, State},
    response::Redirect,
    Form, Json,
};
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::forms::FormData;
use crate::handlers::error_redirect;
use crate::handlers::admin_evaluations::{parse_id, DeleteForm};
use crate::session::AdminSession;
use crate::AppState;
use evalsite_common::{
    db::models::BlogPost,
    db::{NewBlogPost, PostUpdate, Repository},
    errors::{AppError, Result},
    metrics,
    storage::{blog_cover_path, StoredFile},
};

const LISTING: &str = "/admin/posts";

pub async fn list(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Vec<BlogPost>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.list_posts_admin().await?))
}

pub async fn create(
    State(state): State<AppState>,
    _session: AdminSession,
    mut multipart: Multipart,
) -> Redirect {
    match create_inner(&state, &mut multipart).await {
        Ok(()) => Redirect::to(LISTING),
        Err(e) => {
            tracing::error!(error = %e, "Post create failed");
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

    let featured_image = upload_featured_image(state, &slug, &form).await?;
    let published_at = parse_published_at(form.trimmed("published_at")).unwrap_or_else(Utc::now);

    let repo = Repository::new(state.db.clone());
    let saved = repo
        .create_post(NewBlogPost {
            title,
            slug,
            summary: form.optional("summary"),
            content: form.optional("content"),
            tag: form.optional("tag"),
            is_published: form.checkbox("is_published"),
            published_at,
            featured_image,
        })
        .await?;

    metrics::record_admin_mutation("post", "create");
    tracing::info!(id = %saved.id, slug = %saved.slug, "Post created");
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
            tracing::error!(error = %e, "Post update failed");
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

    let featured_image = upload_featured_image(state, &slug, &form).await?;

    let repo = Repository::new(state.db.clone());
    let updated = repo
        .update_post(
            id,
            PostUpdate {
                title,
                slug,
                summary: form.optional("summary"),
                content: form.optional("content"),
                tag: form.optional("tag"),
                is_published: form.checkbox("is_published"),
                published_at: parse_published_at(form.trimmed("published_at")),
                featured_image,
            },
        )
        .await?;

    if !updated {
        return Err(AppError::NotFound {
            resource_type: "post".to_string(),
            id: id.to_string(),
        });
    }

    metrics::record_admin_mutation("post", "update");
    tracing::info!(%id, "Post updated");
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
            tracing::error!(error = %e, "Post delete failed");
            error_redirect(LISTING, &e.public_message())
        }
    }
}

async fn delete_inner(state: &AppState, raw_id: &str) -> Result<()> {
    let id = parse_id(raw_id.trim())?;

    let repo = Repository::new(state.db.clone());
    if !repo.delete_post(id).await? {
        return Err(AppError::NotFound {
            resource_type: "post".to_string(),
            id: id.to_string(),
        });
    }

    metrics::record_admin_mutation("post", "delete");
    tracing::info!(%id, "Post deleted");
    Ok(())
}

async fn upload_featured_image(
    state: &AppState,
    slug: &str,
    form: &FormData,
) -> Result<Option<StoredFile>> {
    let file = match form.file("featured_image") {
        Some(file) => file,
        None => return Ok(None),
    };

    let path = blog_cover_path(slug, &file.filename);
    let stored = state
        .storage
        .upload(&path, file.bytes.clone(), &file.content_type)
        .await
        .inspect_err(|_| metrics::record_upload_failure())?;
    Ok(Some(stored))
}

/// Parse the publication timestamp from either an RFC 3339 string or the
/// `datetime-local` input format. Blank or junk values yield None.
fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_published_at() {
        assert!(parse_published_at("").is_none());
        assert!(parse_published_at("yesterday").is_none());

        let rfc = parse_published_at("2024-05-01T09:30:00Z").unwrap();
        assert_eq!(rfc.year(), 2024);

        let local = parse_published_at("2024-05-01T09:30").unwrap();
        assert_eq!(local, rfc);
    }
}
