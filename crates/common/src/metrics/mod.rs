//! Metrics for the site backend
//!
//! Prometheus counters with standardized naming. Registration happens
//! once at startup; handlers call the record_* helpers.

use metrics::{counter, describe_counter, Unit};

/// Metrics prefix for all site metrics
pub const METRICS_PREFIX: &str = "evalsite";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_contact_submissions_total", METRICS_PREFIX),
        Unit::Count,
        "Contact inquiries accepted and persisted"
    );

    describe_counter!(
        format!("{}_contact_rate_limited_total", METRICS_PREFIX),
        Unit::Count,
        "Contact API requests rejected by the rate limiter"
    );

    describe_counter!(
        format!("{}_catalog_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Public catalog listing queries"
    );

    describe_counter!(
        format!("{}_admin_mutations_total", METRICS_PREFIX),
        Unit::Count,
        "Admin create/update/delete operations"
    );

    describe_counter!(
        format!("{}_upload_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Object storage uploads that failed"
    );

    describe_counter!(
        format!("{}_mail_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Notification emails that failed to send"
    );

    tracing::info!("Metrics registered");
}

/// Record an accepted contact submission by entry shape ("json" / "form").
pub fn record_contact_submission(entry: &str) {
    counter!(
        format!("{}_contact_submissions_total", METRICS_PREFIX),
        "entry" => entry.to_string()
    )
    .increment(1);
}

/// Record a rate-limited contact request.
pub fn record_rate_limited() {
    counter!(format!("{}_contact_rate_limited_total", METRICS_PREFIX)).increment(1);
}

/// Record a public catalog listing query by record kind.
pub fn record_catalog_query(kind: &str) {
    counter!(
        format!("{}_catalog_queries_total", METRICS_PREFIX),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record an admin mutation by entity and action.
pub fn record_admin_mutation(entity: &str, action: &str) {
    counter!(
        format!("{}_admin_mutations_total", METRICS_PREFIX),
        "entity" => entity.to_string(),
        "action" => action.to_string()
    )
    .increment(1);
}

/// Record a failed object-storage upload.
pub fn record_upload_failure() {
    counter!(format!("{}_upload_failures_total", METRICS_PREFIX)).increment(1);
}

/// Record a failed notification email.
pub fn record_mail_failure() {
    counter!(format!("{}_mail_failures_total", METRICS_PREFIX)).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_run_without_recorder() {
        // With no global recorder installed these are no-ops; verify
        // they never panic.
        record_contact_submission("json");
        record_rate_limited();
        record_catalog_query("evaluations");
        record_admin_mutation("evaluation", "update");
        record_upload_failure();
        record_mail_failure();
    }
}
