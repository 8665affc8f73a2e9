//! Repository pattern for database operations
//!
//! All catalog and inquiry data access goes through here. Public listing
//! queries apply the published-only restriction unconditionally; admin
//! listings never do.

use crate::catalog::{CatalogQuery, FilterOptions, Page};
use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::Result;
use crate::storage::StoredFile;
use crate::{CATALOG_PAGE_SIZE, INQUIRY_PAGE_SIZE};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

/// Exact-match filters for the public evaluation listing.
#[derive(Debug, Clone, Default)]
pub struct EvaluationFilters {
    pub kind: Option<String>,
    pub sector: Option<String>,
    pub year: Option<String>,
}

/// Fields for creating an evaluation record.
#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub title: String,
    pub slug: String,
    pub kind: Option<String>,
    pub sector: Option<String>,
    pub location: Option<String>,
    pub year: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub is_published: bool,
    pub report: Option<StoredFile>,
    pub cover: Option<StoredFile>,
}

/// Fields for updating an evaluation. File pairs are applied only when
/// present; `None` leaves the stored URL/path untouched.
#[derive(Debug, Clone)]
pub struct EvaluationUpdate {
    pub title: String,
    pub slug: String,
    pub kind: Option<String>,
    pub sector: Option<String>,
    pub location: Option<String>,
    pub year: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub is_published: bool,
    pub report: Option<StoredFile>,
    pub cover: Option<StoredFile>,
}

/// Fields for creating a blog post.
#[derive(Debug, Clone)]
pub struct NewBlogPost {
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub tag: Option<String>,
    pub is_published: bool,
    pub published_at: DateTime<Utc>,
    pub featured_image: Option<StoredFile>,
}

/// Fields for updating a blog post; same file semantics as evaluations.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub tag: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub featured_image: Option<StoredFile>,
}

/// Fields for persisting a contact inquiry.
#[derive(Debug, Clone, Default)]
pub struct NewContactInquiry {
    pub name: String,
    pub organisation: Option<String>,
    pub email: String,
    pub role: Option<String>,
    pub service_type: Option<String>,
    pub timeframe: Option<String>,
    pub message: String,
    pub referral: Option<String>,
    pub constraints_note: Option<String>,
    pub preferred_contact: Option<String>,
    pub location: Option<String>,
    pub attachment: Option<StoredFile>,
    pub source: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Evaluations: public catalog
    // ========================================================================

    /// Filtered, paginated public evaluation listing: published records
    /// only, search ORed over title/summary/content, exact-match filters
    /// ANDed, ordered year descending then title ascending.
    pub async fn list_published_evaluations(
        &self,
        query: &CatalogQuery,
        filters: &EvaluationFilters,
    ) -> Result<Page<Evaluation>> {
        let mut find = EvaluationEntity::find()
            .filter(EvaluationColumn::IsPublished.eq(true));

        if let Some(ref term) = query.search {
            let pattern = format!("%{}%", term);
            find = find.filter(
                Condition::any()
                    .add(Expr::col(EvaluationColumn::Title).ilike(pattern.clone()))
                    .add(Expr::col(EvaluationColumn::Summary).ilike(pattern.clone()))
                    .add(Expr::col(EvaluationColumn::Content).ilike(pattern)),
            );
        }

        if let Some(ref kind) = filters.kind {
            find = find.filter(EvaluationColumn::Kind.eq(kind));
        }
        if let Some(ref sector) = filters.sector {
            find = find.filter(EvaluationColumn::Sector.eq(sector));
        }
        if let Some(ref year) = filters.year {
            find = find.filter(EvaluationColumn::Year.eq(year));
        }

        let rows = find
            .order_by_desc(EvaluationColumn::Year)
            .order_by_asc(EvaluationColumn::Title)
            .offset(query.offset(CATALOG_PAGE_SIZE))
            .limit(query.fetch_limit(CATALOG_PAGE_SIZE))
            .all(self.conn())
            .await?;

        Ok(Page::from_rows(rows, query.page, CATALOG_PAGE_SIZE))
    }

    /// Distinct type/sector/year values among published evaluations, for
    /// the filter selects.
    pub async fn evaluation_filter_options(&self) -> Result<FilterOptions> {
        let rows: Vec<(Option<String>, Option<String>, Option<String>)> =
            EvaluationEntity::find()
                .select_only()
                .column(EvaluationColumn::Kind)
                .column(EvaluationColumn::Sector)
                .column(EvaluationColumn::Year)
                .filter(EvaluationColumn::IsPublished.eq(true))
                .into_tuple()
                .all(self.conn())
                .await?;

        Ok(FilterOptions::from_rows(rows))
    }

    /// Published evaluation by slug; unpublished records are unreachable
    /// publicly.
    pub async fn find_published_evaluation(&self, slug: &str) -> Result<Option<Evaluation>> {
        EvaluationEntity::find()
            .filter(EvaluationColumn::Slug.eq(slug))
            .filter(EvaluationColumn::IsPublished.eq(true))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Evaluations: admin
    // ========================================================================

    /// Every evaluation regardless of publication state, newest work
    /// first (year desc, then creation time desc).
    pub async fn list_evaluations_admin(&self) -> Result<Vec<Evaluation>> {
        EvaluationEntity::find()
            .order_by_desc(EvaluationColumn::Year)
            .order_by_desc(EvaluationColumn::CreatedAt)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn create_evaluation(&self, new: NewEvaluation) -> Result<Evaluation> {
        let (report_url, report_path) = split_file(new.report);
        let (cover_url, cover_path) = split_file(new.cover);

        let model = EvaluationActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(new.title),
            slug: Set(new.slug),
            kind: Set(new.kind),
            sector: Set(new.sector),
            location: Set(new.location),
            year: Set(new.year),
            summary: Set(new.summary),
            content: Set(new.content),
            is_published: Set(new.is_published),
            report_url: Set(report_url),
            report_file_path: Set(report_path),
            cover_image_url: Set(cover_url),
            cover_image_path: Set(cover_path),
            created_at: Set(Utc::now().into()),
        };

        model.insert(self.conn()).await.map_err(Into::into)
    }

    /// Update an evaluation in place. Text fields are always written;
    /// the report and cover URL/path pairs are written together and only
    /// when a new file was uploaded, so an update without a file never
    /// clears the existing reference.
    pub async fn update_evaluation(&self, id: Uuid, update: EvaluationUpdate) -> Result<bool> {
        let mut model = EvaluationActiveModel {
            title: Set(update.title),
            slug: Set(update.slug),
            kind: Set(update.kind),
            sector: Set(update.sector),
            location: Set(update.location),
            year: Set(update.year),
            summary: Set(update.summary),
            content: Set(update.content),
            is_published: Set(update.is_published),
            ..Default::default()
        };

        if let Some(report) = update.report {
            model.report_url = Set(Some(report.url));
            model.report_file_path = Set(Some(report.path));
        }
        if let Some(cover) = update.cover {
            model.cover_image_url = Set(Some(cover.url));
            model.cover_image_path = Set(Some(cover.path));
        }

        let result = EvaluationEntity::update_many()
            .set(model)
            .filter(EvaluationColumn::Id.eq(id))
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Hard delete; returns whether a row existed.
    pub async fn delete_evaluation(&self, id: Uuid) -> Result<bool> {
        let result = EvaluationEntity::delete_by_id(id)
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Blog posts: public catalog
    // ========================================================================

    /// Filtered, paginated public post listing, ordered by publication
    /// time descending then title ascending.
    pub async fn list_published_posts(
        &self,
        query: &CatalogQuery,
        tag: Option<&str>,
    ) -> Result<Page<BlogPost>> {
        let mut find = BlogPostEntity::find()
            .filter(BlogPostColumn::IsPublished.eq(true));

        if let Some(ref term) = query.search {
            let pattern = format!("%{}%", term);
            find = find.filter(
                Condition::any()
                    .add(Expr::col(BlogPostColumn::Title).ilike(pattern.clone()))
                    .add(Expr::col(BlogPostColumn::Summary).ilike(pattern.clone()))
                    .add(Expr::col(BlogPostColumn::Content).ilike(pattern)),
            );
        }

        if let Some(tag) = tag {
            find = find.filter(BlogPostColumn::Tag.eq(tag));
        }

        let rows = find
            .order_by_desc(BlogPostColumn::PublishedAt)
            .order_by_asc(BlogPostColumn::Title)
            .offset(query.offset(CATALOG_PAGE_SIZE))
            .limit(query.fetch_limit(CATALOG_PAGE_SIZE))
            .all(self.conn())
            .await?;

        Ok(Page::from_rows(rows, query.page, CATALOG_PAGE_SIZE))
    }

    /// Distinct tags among published posts.
    pub async fn post_tags(&self) -> Result<Vec<String>> {
        let rows: Vec<Option<String>> = BlogPostEntity::find()
            .select_only()
            .column(BlogPostColumn::Tag)
            .filter(BlogPostColumn::IsPublished.eq(true))
            .into_tuple()
            .all(self.conn())
            .await?;

        Ok(crate::catalog::distinct_sorted(
            rows.into_iter().flatten().collect(),
        ))
    }

    pub async fn find_published_post(&self, slug: &str) -> Result<Option<BlogPost>> {
        BlogPostEntity::find()
            .filter(BlogPostColumn::Slug.eq(slug))
            .filter(BlogPostColumn::IsPublished.eq(true))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Blog posts: admin
    // ========================================================================

    pub async fn list_posts_admin(&self) -> Result<Vec<BlogPost>> {
        BlogPostEntity::find()
            .order_by_desc(BlogPostColumn::PublishedAt)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    pub async fn create_post(&self, new: NewBlogPost) -> Result<BlogPost> {
        let (image_url, image_path) = split_file(new.featured_image);

        let model = BlogPostActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(new.title),
            slug: Set(new.slug),
            summary: Set(new.summary),
            content: Set(new.content),
            tag: Set(new.tag),
            is_published: Set(new.is_published),
            published_at: Set(new.published_at.into()),
            featured_image_url: Set(image_url),
            featured_image_path: Set(image_path),
            created_at: Set(Utc::now().into()),
        };

        model.insert(self.conn()).await.map_err(Into::into)
    }

    /// Same preserve-on-absent file semantics as evaluation updates. The
    /// publication timestamp is rewritten only when supplied.
    pub async fn update_post(&self, id: Uuid, update: PostUpdate) -> Result<bool> {
        let mut model = BlogPostActiveModel {
            title: Set(update.title),
            slug: Set(update.slug),
            summary: Set(update.summary),
            content: Set(update.content),
            tag: Set(update.tag),
            is_published: Set(update.is_published),
            ..Default::default()
        };

        if let Some(published_at) = update.published_at {
            model.published_at = Set(published_at.into());
        }
        if let Some(image) = update.featured_image {
            model.featured_image_url = Set(Some(image.url));
            model.featured_image_path = Set(Some(image.path));
        }

        let result = BlogPostEntity::update_many()
            .set(model)
            .filter(BlogPostColumn::Id.eq(id))
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let result = BlogPostEntity::delete_by_id(id)
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Contact inquiries
    // ========================================================================

    pub async fn create_inquiry(&self, new: NewContactInquiry) -> Result<ContactInquiry> {
        let (attachment_url, attachment_path) = split_file(new.attachment);

        let model = ContactInquiryActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set(Utc::now().into()),
            name: Set(new.name),
            organisation: Set(new.organisation),
            email: Set(new.email),
            role: Set(new.role),
            service_type: Set(new.service_type),
            timeframe: Set(new.timeframe),
            message: Set(new.message),
            referral: Set(new.referral),
            constraints_note: Set(new.constraints_note),
            preferred_contact: Set(new.preferred_contact),
            location: Set(new.location),
            is_reviewed: Set(false),
            attachment_url: Set(attachment_url),
            attachment_path: Set(attachment_path),
            source: Set(new.source),
            ip_address: Set(new.ip_address),
            user_agent: Set(new.user_agent),
        };

        model.insert(self.conn()).await.map_err(Into::into)
    }

    /// Admin inquiry listing: newest first, 10 per page, optional search
    /// ORed over name, email and organisation.
    pub async fn list_inquiries(&self, query: &CatalogQuery) -> Result<Page<ContactInquiry>> {
        let mut find = ContactInquiryEntity::find();

        if let Some(ref term) = query.search {
            let pattern = format!("%{}%", term);
            find = find.filter(
                Condition::any()
                    .add(Expr::col(ContactInquiryColumn::Name).ilike(pattern.clone()))
                    .add(Expr::col(ContactInquiryColumn::Email).ilike(pattern.clone()))
                    .add(Expr::col(ContactInquiryColumn::Organisation).ilike(pattern)),
            );
        }

        let rows = find
            .order_by_desc(ContactInquiryColumn::CreatedAt)
            .offset(query.offset(INQUIRY_PAGE_SIZE))
            .limit(query.fetch_limit(INQUIRY_PAGE_SIZE))
            .all(self.conn())
            .await?;

        Ok(Page::from_rows(rows, query.page, INQUIRY_PAGE_SIZE))
    }

    /// Flip the reviewed flag; the only mutation inquiries receive.
    pub async fn mark_inquiry_reviewed(&self, id: Uuid) -> Result<bool> {
        let result = ContactInquiryEntity::update_many()
            .col_expr(ContactInquiryColumn::IsReviewed, Expr::value(true))
            .filter(ContactInquiryColumn::Id.eq(id))
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete_inquiry(&self, id: Uuid) -> Result<bool> {
        let result = ContactInquiryEntity::delete_by_id(id)
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }
}

fn split_file(file: Option<StoredFile>) -> (Option<String>, Option<String>) {
    match file {
        Some(f) => (Some(f.url), Some(f.path)),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_file_pairs_stay_together() {
        let (url, path) = split_file(Some(StoredFile {
            url: "https://cdn.example/evaluation-files/reports/a.pdf".into(),
            path: "reports/a.pdf".into(),
        }));
        assert!(url.is_some() && path.is_some());

        let (url, path) = split_file(None);
        assert!(url.is_none() && path.is_none());
    }
}
