//! A small news article store backed by SQLite that keeps an RSS 2.0 feed
//! file in sync with its contents.

pub mod config;
pub mod db;
pub mod error;
pub mod error_log;
pub mod feed;
pub mod form;
pub mod models;
pub mod sanitize;

pub use config::Config;
pub use db::{ArticleStore, FeedStatus, Mutation};
pub use error::{AppError, Result};
pub use error_log::ErrorLog;
pub use feed::FeedGenerator;
pub use form::ArticleForm;
pub use models::{ArticleView, Category, NewArticle};
