//! Multipart form reading
//!
//! Collects a multipart submission into text fields and uploaded files
//! so handlers can work with plain lookups instead of streaming parts.
//! A part with a filename is a file; a file part with an empty filename
//! or empty body counts as "no file chosen" and is dropped.

use axum::extract::Multipart;
use evalsite_common::errors::{AppError, Result};
use std::collections::HashMap;

/// One uploaded file from a multipart submission.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Parsed multipart form data.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl FormData {
    /// Drain a multipart stream into memory.
    pub async fn read(multipart: &mut Multipart) -> Result<Self> {
        let mut data = FormData::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = match field.name() {
                Some(name) => name.to_string(),
                None => continue,
            };

            let filename = field.file_name().map(str::to_string);
            match filename {
                Some(filename) if !filename.is_empty() => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(malformed)?.to_vec();
                    if bytes.is_empty() {
                        continue;
                    }
                    data.files.push(UploadedFile {
                        field: name,
                        filename,
                        content_type,
                        bytes,
                    });
                }
                _ => {
                    let value = field.text().await.map_err(malformed)?;
                    data.fields.insert(name, value);
                }
            }
        }

        Ok(data)
    }

    /// Raw text field value, empty string when absent.
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    /// Trimmed text field value.
    pub fn trimmed(&self, name: &str) -> &str {
        self.text(name).trim()
    }

    /// Trimmed value as an owned Option, blank collapsing to None.
    pub fn optional(&self, name: &str) -> Option<String> {
        let value = self.trimmed(name);
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// HTML checkbox state: present with a truthy value.
    pub fn checkbox(&self, name: &str) -> bool {
        matches!(self.trimmed(name), "on" | "true" | "1")
    }

    /// First uploaded file for the given field name.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == name)
    }
}

fn malformed(err: axum::extract::multipart::MultipartError) -> AppError {
    tracing::warn!(error = %err, "Malformed multipart submission");
    AppError::Validation {
        message: "Malformed form submission.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(fields: &[(&str, &str)]) -> FormData {
        FormData {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: Vec::new(),
        }
    }

    #[test]
    fn test_text_lookups() {
        let form = form_with(&[("title", "  Endline Study "), ("slug", "endline-study")]);
        assert_eq!(form.text("title"), "  Endline Study ");
        assert_eq!(form.trimmed("title"), "Endline Study");
        assert_eq!(form.trimmed("missing"), "");
        assert_eq!(form.optional("missing"), None);
        assert_eq!(form.optional("slug"), Some("endline-study".to_string()));
    }

    #[test]
    fn test_checkbox() {
        assert!(form_with(&[("is_published", "on")]).checkbox("is_published"));
        assert!(form_with(&[("is_published", "true")]).checkbox("is_published"));
        assert!(!form_with(&[("is_published", "off")]).checkbox("is_published"));
        assert!(!form_with(&[]).checkbox("is_published"));
    }

    #[test]
    fn test_file_lookup_by_field() {
        let form = FormData {
            fields: HashMap::new(),
            files: vec![UploadedFile {
                field: "report".into(),
                filename: "final.pdf".into(),
                content_type: "application/pdf".into(),
                bytes: vec![1, 2, 3],
            }],
        };
        assert!(form.file("report").is_some());
        assert!(form.file("cover").is_none());
    }
}
