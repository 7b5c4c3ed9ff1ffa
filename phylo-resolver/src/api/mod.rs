//! HTTP API handlers for phylo-resolver

pub mod health;
pub mod posts;
pub mod stream;
pub mod trees;
pub mod user;

pub use health::health_routes;
pub use posts::get_posts_by_classification;
pub use stream::stream_posts_by_classification;
pub use trees::{get_ages, get_classification_tree};
pub use user::UserToken;
