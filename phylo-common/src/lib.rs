//! # Phylo Common Library
//!
//! Shared code for the phylo services including:
//! - Error and result types
//! - Configuration loading
//! - Database schema and row models
//! - Phylogenetic tree model and tolerant parser
//! - Geological age index and age window filter
//! - SSE utilities

pub mod age;
pub mod config;
pub mod db;
pub mod error;
pub mod sse;
pub mod tree;

pub use age::AgeIndex;
pub use error::{Error, Result};
pub use tree::TreeNode;
