//! Application services layer.

pub mod error;
pub mod filter;
pub mod options;
pub mod pagination;
pub mod repos;
pub mod request;
