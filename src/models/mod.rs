mod article;
mod category;

pub use article::{ArticleView, NewArticle};
pub use category::Category;
