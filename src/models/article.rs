use serde::{Deserialize, Serialize};

/// An article joined with its category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleView {
    pub id: i64,
    pub title: String,
    pub category_id: i64,
    pub category: String,
    pub description: String,
    pub text: String,
    pub source: String,
    pub datetime: i64,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub category: i64,
    pub description: String,
    pub text: String,
    pub source: String,
}
