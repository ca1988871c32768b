//! Raw "add article" input as submitted by a user, cleaned and validated
//! before it reaches the store.

use crate::db::{ArticleStore, Mutation};
use crate::error::{AppError, Result};
use crate::models::NewArticle;
use crate::sanitize::{clear_int_str, clear_str};

pub const MISSING_FIELDS_MESSAGE: &str = "Fill in all form fields!";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to add the article";

#[derive(Debug, Clone, Default)]
pub struct ArticleForm {
    pub title: String,
    pub category: String,
    pub description: String,
    pub text: String,
    pub source: String,
}

impl ArticleForm {
    /// Cleans every field. Any field that ends up empty (or a zero category)
    /// fails validation.
    pub fn validate(&self) -> Result<NewArticle> {
        let article = NewArticle {
            title: clear_str(&self.title),
            category: clear_int_str(&self.category),
            description: clear_str(&self.description),
            text: clear_str(&self.text),
            source: clear_str(&self.source),
        };

        let complete = !article.title.is_empty()
            && article.category != 0
            && !article.description.is_empty()
            && !article.text.is_empty()
            && !article.source.is_empty();

        if complete {
            Ok(article)
        } else {
            Err(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string()))
        }
    }

    /// Validates, then saves. Storage failures are reported with a generic
    /// message; validation failures never reach the store.
    pub fn submit(&self, store: &ArticleStore) -> Result<Mutation> {
        let article = self.validate()?;
        store.insert_article(&article).map_err(|e| {
            tracing::warn!("Saving article failed: {}", e);
            AppError::Validation(SAVE_FAILED_MESSAGE.to_string())
        })
    }
}
