//! Contact submission payload: normalization and validation
//!
//! Both entry shapes (JSON API and multipart form) funnel through this
//! one representation. Fields are trimmed and length-capped before
//! validation; the caps defend storage against abuse and are not
//! business rules, so overlong values are truncated rather than
//! rejected.

use crate::db::NewContactInquiry;
use crate::errors::{AppError, Result};
use crate::storage::StoredFile;
use regex_lite::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

// Per-field length caps.
const NAME_MAX: usize = 120;
const ORGANISATION_MAX: usize = 160;
const EMAIL_MAX: usize = 254;
const MESSAGE_MAX: usize = 4000;
const EXTRA_MAX: usize = 160;
const HONEYPOT_MAX: usize = 200;

/// Raw submission fields as received from either entry point. The
/// `company_website` field is a honeypot: legitimate users never fill it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub organisation: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub service_type: String,
    #[serde(default)]
    pub timeframe: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub referral: String,
    #[serde(default, rename = "constraints")]
    pub constraints_note: String,
    #[serde(default)]
    pub preferred_contact: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub company_website: String,
}

impl ContactSubmission {
    /// Trim and cap every field in place.
    pub fn normalize(mut self) -> Self {
        self.name = trim_cap(&self.name, NAME_MAX);
        self.organisation = trim_cap(&self.organisation, ORGANISATION_MAX);
        self.email = trim_cap(&self.email, EMAIL_MAX);
        self.role = trim_cap(&self.role, EXTRA_MAX);
        self.service_type = trim_cap(&self.service_type, EXTRA_MAX);
        self.timeframe = trim_cap(&self.timeframe, EXTRA_MAX);
        self.message = trim_cap(&self.message, MESSAGE_MAX);
        self.referral = trim_cap(&self.referral, EXTRA_MAX);
        self.constraints_note = trim_cap(&self.constraints_note, EXTRA_MAX);
        self.preferred_contact = trim_cap(&self.preferred_contact, EXTRA_MAX);
        self.location = trim_cap(&self.location, ORGANISATION_MAX);
        self.company_website = trim_cap(&self.company_website, HONEYPOT_MAX);
        self
    }

    /// A filled honeypot marks the submission as automated.
    pub fn is_spam(&self) -> bool {
        !self.company_website.is_empty()
    }

    /// Required fields must be non-empty after trimming and the email
    /// must have a `local@domain.tld` shape.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.email.is_empty() || self.message.is_empty() {
            return Err(AppError::Validation {
                message: "Missing required fields.".to_string(),
            });
        }

        if !is_valid_email(&self.email) {
            return Err(AppError::Validation {
                message: "Please enter a valid email address.".to_string(),
            });
        }

        Ok(())
    }

    /// Convert into the persistence record, mapping blank optionals to
    /// null. Call after `normalize` and `validate`.
    pub fn into_inquiry(
        self,
        source: Option<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
        attachment: Option<StoredFile>,
    ) -> NewContactInquiry {
        NewContactInquiry {
            name: self.name,
            organisation: blank_to_none(self.organisation),
            email: self.email,
            role: blank_to_none(self.role),
            service_type: blank_to_none(self.service_type),
            timeframe: blank_to_none(self.timeframe),
            message: self.message,
            referral: blank_to_none(self.referral),
            constraints_note: blank_to_none(self.constraints_note),
            preferred_contact: blank_to_none(self.preferred_contact),
            location: blank_to_none(self.location),
            attachment,
            source,
            ip_address,
            user_agent,
        }
    }
}

/// Trim, then truncate to at most `max` characters.
pub fn trim_cap(value: &str, max: usize) -> String {
    let trimmed = value.trim();
    trimmed.chars().take(max).collect()
}

/// Simple email sanity check, not RFC-perfect but good enough for web
/// forms: non-space local part, `@`, non-space domain with a dot.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));
    re.is_match(email)
}

fn blank_to_none(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "  Jane ".into(),
            email: "jane@example.org".into(),
            message: "hi".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_trims_and_caps() {
        let long_message = "m".repeat(5000);
        let sub = ContactSubmission {
            message: long_message,
            ..submission()
        }
        .normalize();

        assert_eq!(sub.name, "Jane");
        assert_eq!(sub.message.len(), 4000);
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        for field in ["name", "email", "message"] {
            let mut sub = submission();
            match field {
                "name" => sub.name.clear(),
                "email" => sub.email.clear(),
                _ => sub.message.clear(),
            }
            let err = sub.normalize().validate().unwrap_err();
            assert_eq!(err.public_message(), "Missing required fields.");
        }
    }

    #[test]
    fn test_invalid_email_rejected() {
        let sub = ContactSubmission {
            email: "not-an-email".into(),
            ..submission()
        };
        let err = sub.normalize().validate().unwrap_err();
        assert_eq!(err.public_message(), "Please enter a valid email address.");
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@sub.domain.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("@b.co"));
    }

    #[test]
    fn test_honeypot_detection() {
        let mut sub = submission();
        sub.company_website = "http://spam.example".into();
        assert!(sub.normalize().is_spam());

        assert!(!submission().normalize().is_spam());
    }

    #[test]
    fn test_into_inquiry_maps_blanks_to_none() {
        let inquiry = submission().normalize().into_inquiry(
            Some("website-contact".into()),
            Some("198.51.100.7".into()),
            None,
            None,
        );
        assert_eq!(inquiry.name, "Jane");
        assert!(inquiry.organisation.is_none());
        assert_eq!(inquiry.source.as_deref(), Some("website-contact"));
    }
}
