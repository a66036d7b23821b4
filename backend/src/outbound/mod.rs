//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: MongoDB repositories plus in-memory equivalents
//! - **storage**: Google Cloud Storage uploads for public media
//! - **auth**: HS256 bearer tokens, Argon2id hashing, Google ID tokens
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod auth;
pub mod persistence;
pub mod storage;
