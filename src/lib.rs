//! Pluma: a server-rendered community blog.
//!
//! The crate is layered bottom-up: `domain` holds the entities and their
//! validation rules, `application` the services and repository traits,
//! `infra` the SQLite adapters and the HTTP surface, `presentation` the
//! askama view models, and `cache` the listing response cache.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
