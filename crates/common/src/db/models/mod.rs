//! SeaORM entity models
//!
//! Database entities for the consultancy site.

mod blog_post;
mod contact_inquiry;
mod evaluation;

pub use evaluation::{
    Entity as EvaluationEntity,
    Model as Evaluation,
    ActiveModel as EvaluationActiveModel,
    Column as EvaluationColumn,
};

pub use blog_post::{
    Entity as BlogPostEntity,
    Model as BlogPost,
    ActiveModel as BlogPostActiveModel,
    Column as BlogPostColumn,
};

pub use contact_inquiry::{
    Entity as ContactInquiryEntity,
    Model as ContactInquiry,
    ActiveModel as ContactInquiryActiveModel,
    Column as ContactInquiryColumn,
};
