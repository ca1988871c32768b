mod generator;

pub use generator::{format_pub_date, FeedGenerator};
