//! HTTP handlers module

pub mod admin_auth;
pub mod admin_evaluations;
pub mod admin_inquiries;
pub mod admin_posts;
pub mod catalog;
pub mod contact;
pub mod health;

use axum::response::Redirect;

/// Redirect back to an admin listing page carrying a human-readable
/// error message as the `error` query parameter.
pub(crate) fn error_redirect(base: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{}?error={}", base, encode_query(message)))
}

/// Percent-encode the handful of characters that would break a query
/// string value. Messages are short ASCII sentences, so a full encoder
/// is not needed.
pub(crate) fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '+' => out.push_str("%2B"),
            '=' => out.push_str("%3D"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_query() {
        assert_eq!(
            encode_query("Title and slug are required."),
            "Title%20and%20slug%20are%20required."
        );
        assert_eq!(encode_query("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_query("plain"), "plain");
    }
}
