//! Document backend: one JSON document per entity on the filesystem.
//!
//! Unlike the relational variant there are no enforced constraints here;
//! uniqueness and referential integrity are best-effort scans, which is why
//! the domain services check those invariants redundantly. Writes are
//! atomic per document (tmp file + rename), so a crashed write never leaves
//! a half-serialized entity behind.

pub mod connection;
pub mod todo_repository;
pub mod user_repository;

pub use connection::DocumentConnection;
pub use todo_repository::TodoRepository;
pub use user_repository::UserRepository;
