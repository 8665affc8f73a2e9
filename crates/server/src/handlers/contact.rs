//! Contact submission handlers
//!
//! Two entry points share one flow: honeypot, validate, persist, then
//! best-effort side effects (attachment upload, email notification).
//! The JSON API rate limits by client address and answers with a status
//! body; the form endpoint always answers with a redirect so the
//! browser lands back on the contact page whatever happened.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::{header, HeaderMap},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::forms::FormData;
use crate::AppState;
use evalsite_common::{
    contact::ContactSubmission,
    db::{models::ContactInquiry, Repository},
    errors::{AppError, Result},
    metrics,
    rate_limit::{client_addr, UNKNOWN_ADDR},
    storage::{attachment_path, StoredFile},
};

const API_SOURCE: &str = "website-contact";
const SUCCESS_MESSAGE: &str = "Enquiry received.";

/// JSON API payload: the submission fields plus an optional reference to
/// an attachment the client already uploaded.
#[derive(Debug, Deserialize)]
pub struct ContactApiRequest {
    #[serde(flatten)]
    pub submission: ContactSubmission,
    #[serde(default)]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub attachment_path: Option<String>,
}

#[derive(Serialize)]
pub struct ContactApiResponse {
    pub success: bool,
    pub message: String,
}

/// JSON contact submission endpoint.
pub async fn submit_json(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ContactApiResponse>> {
    if !is_json_content_type(&headers) {
        return Err(AppError::InvalidContentType);
    }

    let addr = client_addr(&headers);
    if !state.rate_limiter.check(&addr) {
        metrics::record_rate_limited();
        tracing::info!(addr = %addr, "Contact submission rate limited");
        return Err(AppError::RateLimited);
    }

    let request = parse_request(&body)?;

    let submission = request.submission.normalize();

    // Honeypot hits pretend to succeed so bots learn nothing.
    if submission.is_spam() {
        tracing::info!(addr = %addr, "Honeypot tripped, dropping submission");
        return Ok(Json(ContactApiResponse {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }));
    }

    submission.validate()?;

    // The URL/path pair travels together or not at all.
    let attachment = match (request.attachment_url, request.attachment_path) {
        (Some(url), Some(path)) => Some(StoredFile { url, path }),
        _ => None,
    };

    let ip_address = (addr != UNKNOWN_ADDR).then(|| addr.clone());
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let inquiry = submission.into_inquiry(
        Some(API_SOURCE.to_string()),
        ip_address,
        user_agent,
        attachment,
    );

    let repo = Repository::new(state.db.clone());
    let saved = repo.create_inquiry(inquiry).await?;

    metrics::record_contact_submission("json");
    finish_submission(&state, &saved).await;

    Ok(Json(ContactApiResponse {
        success: true,
        message: SUCCESS_MESSAGE.to_string(),
    }))
}

/// Multipart form contact submission endpoint. Every outcome is a
/// redirect back to the contact page. Only the JSON API path is rate
/// limited; the form path never inspects client address headers.
pub async fn submit_form(State(state): State<AppState>, mut multipart: Multipart) -> Redirect {
    match submit_form_inner(&state, &mut multipart).await {
        Ok(redirect) => redirect,
        Err(e) => {
            if e.is_server_error() {
                tracing::error!(error = %e, "Contact form submission failed");
            } else {
                tracing::warn!(error = %e, "Contact form submission rejected");
            }
            Redirect::to("/contact?error=1")
        }
    }
}

async fn submit_form_inner(state: &AppState, multipart: &mut Multipart) -> Result<Redirect> {
    let form = FormData::read(multipart).await?;

    let submission = ContactSubmission {
        name: form.text("name").to_string(),
        organisation: form.text("organisation").to_string(),
        email: form.text("email").to_string(),
        role: form.text("role").to_string(),
        service_type: form.text("service_type").to_string(),
        timeframe: form.text("timeframe").to_string(),
        message: form.text("message").to_string(),
        referral: form.text("referral").to_string(),
        constraints_note: form.text("constraints").to_string(),
        preferred_contact: form.text("preferred_contact").to_string(),
        location: form.text("location").to_string(),
        company_website: form.text("company_website").to_string(),
    }
    .normalize();

    if submission.is_spam() {
        tracing::info!("Honeypot tripped, dropping submission");
        return Ok(Redirect::to("/contact?submitted=1"));
    }

    submission.validate()?;

    let attachment = upload_attachment(state, &form).await;

    // The form path deliberately records no address or agent.
    let inquiry = submission.into_inquiry(None, None, None, attachment);

    let repo = Repository::new(state.db.clone());
    let saved = repo.create_inquiry(inquiry).await?;

    metrics::record_contact_submission("form");
    finish_submission(state, &saved).await;

    Ok(Redirect::to("/contact?submitted=1"))
}

/// Best-effort attachment upload. Oversized files are skipped and upload
/// failures are logged; neither blocks the submission.
async fn upload_attachment(state: &AppState, form: &FormData) -> Option<StoredFile> {
    let file = form.file("attachment")?;

    if file.bytes.len() as u64 > state.config.storage.max_attachment_bytes {
        tracing::warn!(
            filename = %file.filename,
            size = file.bytes.len(),
            "Attachment exceeds size ceiling, skipping upload"
        );
        return None;
    }

    let path = attachment_path(&file.filename);
    match state
        .storage
        .upload(&path, file.bytes.clone(), &file.content_type)
        .await
    {
        Ok(stored) => Some(stored),
        Err(e) => {
            metrics::record_upload_failure();
            tracing::error!(error = %e, filename = %file.filename, "Attachment upload failed");
            None
        }
    }
}

async fn finish_submission(state: &AppState, saved: &ContactInquiry) {
    tracing::info!(inquiry_id = %saved.id, "Contact inquiry saved");
    state.notifier.notify(saved).await;
}

/// Case-insensitive JSON content-type check covering parameterized
/// values like `application/json; charset=utf-8`.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

/// Deserialize the API payload, keeping the serde detail in the logs and
/// a fixed message in the 400 body.
fn parse_request(body: &[u8]) -> Result<ContactApiRequest> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Contact payload failed to deserialize");
        AppError::Validation {
            message: "Invalid request body.".to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_content_type(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_json_content_type_is_case_insensitive() {
        assert!(is_json_content_type(&headers_with_content_type(
            "application/json"
        )));
        assert!(is_json_content_type(&headers_with_content_type(
            "Application/JSON"
        )));
        assert!(is_json_content_type(&headers_with_content_type(
            "application/json; charset=utf-8"
        )));
        assert!(!is_json_content_type(&headers_with_content_type(
            "text/plain"
        )));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }

    #[test]
    fn test_parse_request_error_stays_generic() {
        let err = parse_request(b"{\"name\": ").unwrap_err();
        assert_eq!(err.public_message(), "Invalid request body.");
    }

    #[test]
    fn test_parse_request_accepts_submission_fields() {
        let request = parse_request(
            br#"{"name": "Jane", "email": "jane@example.org", "message": "hi",
                "constraints": "Q3 budget", "attachment_url": "https://cdn.example/a.pdf",
                "attachment_path": "contact-attachments/a.pdf"}"#,
        )
        .unwrap();
        assert_eq!(request.submission.name, "Jane");
        assert_eq!(request.submission.constraints_note, "Q3 budget");
        assert_eq!(
            request.attachment_path.as_deref(),
            Some("contact-attachments/a.pdf")
        );
    }
}
