//! Domain layer: entities, validation, services, and the invariants that
//! hold regardless of which storage backend is active.

pub mod errors;
pub mod identity;
pub mod models;
pub mod password;
pub mod todo_service;
pub mod user_service;

pub use errors::DomainError;
pub use todo_service::TodoService;
pub use user_service::UserService;
