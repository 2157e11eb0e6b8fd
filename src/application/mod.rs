pub mod auth;
pub mod error;
pub mod feed;
pub mod filter;
pub mod follows;
pub mod guards;
pub mod pagination;
pub mod posts;
pub mod repos;
