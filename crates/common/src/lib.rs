//! Evalsite Common Library
//!
//! Shared code for the consultancy site backend:
//! - Database entities and repository pattern
//! - Catalog query building (filter / search / paginate)
//! - Per-address request rate limiting
//! - Object storage and transactional mail clients
//! - Error types and handling
//! - Configuration management
//! - Metrics

pub mod catalog;
pub mod config;
pub mod contact;
pub mod db;
pub mod errors;
pub mod mail;
pub mod metrics;
pub mod rate_limit;
pub mod storage;

// Re-export commonly used types
pub use catalog::{CatalogQuery, FilterOptions, Page};
pub use config::AppConfig;
pub use contact::ContactSubmission;
pub use db::Repository;
pub use errors::{AppError, Result};
pub use rate_limit::RateLimiter;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Page size for public catalog listings (evaluations and posts)
pub const CATALOG_PAGE_SIZE: u64 = 6;

/// Page size for the admin inquiry listing
pub const INQUIRY_PAGE_SIZE: u64 = 10;
