//! # Todo Backend
//!
//! Persistence and access-control layer for the todo service.
//!
//! The backend follows a layered architecture:
//! ```text
//! REST layer (axum handlers)
//!     ↓
//! Auth gates (token verification, role and ownership checks)
//!     ↓
//! Domain layer (services, validation, relationship invariants)
//!     ↓
//! Storage layer (one of two interchangeable backends)
//! ```
//!
//! The storage backend is chosen exactly once at startup from configuration
//! and injected into the domain services as trait objects; nothing below the
//! selector ever branches on the backend kind again.

pub mod auth;
pub mod config;
pub mod domain;
pub mod rest;
pub mod storage;
