//! Object storage client and upload path helpers
//!
//! Talks to the storage provider's REST API (Supabase Storage shape).
//! Uploads are upserts; every stored object is publicly addressable via
//! a deterministic URL. Upload paths embed a timestamp plus a sanitized
//! variant of the original filename so concurrent uploads do not collide.

use crate::config::StorageConfig;
use crate::errors::{AppError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A stored object reference. URL and path always travel as a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub url: String,
    pub path: String,
}

/// Storage provider client
#[derive(Clone)]
pub struct ObjectStorage {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl ObjectStorage {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to build storage client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            service_key: config.service_key.clone(),
        })
    }

    /// Upload bytes to `path`, overwriting any existing object, and
    /// return the stored reference.
    pub async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredFile> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, path
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .header("cache-control", "3600")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Storage {
                message: format!("Upload request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage {
                message: format!("Upload failed with {}: {}", status, body),
            });
        }

        Ok(StoredFile {
            url: self.public_url(path),
            path: path.to_string(),
        })
    }

    /// Public URL for a stored object.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

/// Lowercased extension of a filename, or the given default when absent.
pub fn file_ext(name: &str, default: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Sanitized filename stem: lowercase, runs of anything outside
/// `[a-z0-9-_]` collapse to a single hyphen, capped at 60 characters.
pub fn sanitize_stem(name: &str) -> String {
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);

    let mut out = String::with_capacity(stem.len());
    let mut last_dash = false;
    for c in stem.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
            out.push(c);
            last_dash = c == '-';
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }

    out.truncate(60);
    if out.is_empty() {
        "attachment".to_string()
    } else {
        out
    }
}

/// Slug-safe variant of an arbitrary string for storage paths only:
/// lowercase with anything outside `[a-z0-9-]` replaced by a hyphen.
pub fn sanitize_slug(slug: &str) -> String {
    slug.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Storage path for a contact attachment.
pub fn attachment_path(original_name: &str) -> String {
    format!(
        "contact-attachments/{}-{}.{}",
        timestamp_millis(),
        sanitize_stem(original_name),
        file_ext(original_name, "bin")
    )
}

/// Storage path for an evaluation report file.
pub fn report_path(slug: &str, original_name: &str) -> String {
    format!(
        "reports/{}-{}.{}",
        sanitize_slug(slug),
        timestamp_millis(),
        file_ext(original_name, "pdf")
    )
}

/// Storage path for an evaluation cover image.
pub fn cover_path(slug: &str, original_name: &str) -> String {
    format!(
        "covers/{}-{}.{}",
        sanitize_slug(slug),
        timestamp_millis(),
        file_ext(original_name, "jpg")
    )
}

/// Storage path for a blog featured image.
pub fn blog_cover_path(slug: &str, original_name: &str) -> String {
    format!(
        "blog-covers/{}-{}.{}",
        sanitize_slug(slug),
        timestamp_millis(),
        file_ext(original_name, "jpg")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_ext() {
        assert_eq!(file_ext("Final Report.PDF", "bin"), "pdf");
        assert_eq!(file_ext("no-extension", "bin"), "bin");
        assert_eq!(file_ext("trailing-dot.", "bin"), "bin");
    }

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("Final Report (v2).pdf"), "final-report-v2-");
        assert_eq!(sanitize_stem("données évaluées.docx"), "donn-es-valu-es");
        assert_eq!(sanitize_stem("...."), "-");
        assert_eq!(sanitize_stem(""), "attachment");

        let long = "a".repeat(100);
        assert_eq!(sanitize_stem(&long).len(), 60);
    }

    #[test]
    fn test_sanitize_slug() {
        assert_eq!(sanitize_slug("Water & Sanitation 2023"), "water---sanitation-2023");
        assert_eq!(sanitize_slug("already-safe-slug"), "already-safe-slug");
    }

    #[test]
    fn test_paths_have_expected_prefixes() {
        assert!(attachment_path("notes.txt").starts_with("contact-attachments/"));
        assert!(report_path("my-eval", "r.pdf").starts_with("reports/my-eval-"));
        assert!(cover_path("my-eval", "c.png").ends_with(".png"));
        assert!(blog_cover_path("post", "img").ends_with(".jpg"));
    }

    #[test]
    fn test_public_url_shape() {
        let storage = ObjectStorage::new(&StorageConfig {
            base_url: "https://proj.supabase.co/".into(),
            service_key: "key".into(),
            bucket: "evaluation-files".into(),
            max_attachment_bytes: 10 * 1024 * 1024,
            timeout_secs: 30,
        })
        .unwrap();

        assert_eq!(
            storage.public_url("reports/a.pdf"),
            "https://proj.supabase.co/storage/v1/object/public/evaluation-files/reports/a.pdf"
        );
    }
}
