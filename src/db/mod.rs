mod repository;
pub mod schema;

pub use repository::{ArticleStore, FeedStatus, Mutation};
