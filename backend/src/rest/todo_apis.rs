//! Todo endpoints. Every route runs behind the authentication gate; the
//! ownership check is applied per resource, with admins passing it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use shared::{
    CreateTodoRequest, TodoDto, TodoListResponse, TodoStatus, UpdateStatusRequest,
    UpdateTodoRequest,
};

use crate::auth::{ensure_owner, AuthUser};
use crate::domain::errors::DomainError;
use crate::domain::models::{Todo, User};
use crate::rest::{ApiError, AppState};

fn list_response(todos: Vec<Todo>) -> TodoListResponse {
    let todos: Vec<TodoDto> = todos.iter().map(TodoDto::from).collect();
    let count = todos.len();
    TodoListResponse { todos, count }
}

fn parse_status(raw: &str) -> Result<TodoStatus, ApiError> {
    raw.parse::<TodoStatus>()
        .map_err(|e| ApiError::from(DomainError::Validation(e)))
}

/// Fetch a todo and verify the caller may touch it. Admins see everything,
/// everyone else only their own.
async fn owned_todo(state: &AppState, user: &User, id: &str) -> Result<Todo, ApiError> {
    let todo = state.todo_service.get(id).await?;
    ensure_owner(Some(user), &todo.owner_id)?;
    Ok(todo)
}

pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoDto>), ApiError> {
    // Creating on someone else's behalf needs the same right as touching
    // their todos
    let owner = match request.owner_id.clone() {
        Some(owner_token) => {
            ensure_owner(Some(&user), &owner_token)?;
            owner_token
        }
        None => user.id.clone(),
    };
    let todo = state.todo_service.create(&owner, request).await?;
    Ok((StatusCode::CREATED, Json(TodoDto::from(&todo))))
}

pub async fn list_todos(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<TodoListResponse>, ApiError> {
    let todos = state.todo_service.list_for_owner(&user.id).await?;
    Ok(Json(list_response(todos)))
}

pub async fn list_by_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(status): Path<String>,
) -> Result<Json<TodoListResponse>, ApiError> {
    let status = parse_status(&status)?;
    let owner = (!user.is_admin()).then_some(user.id.as_str());
    let todos = state.todo_service.list_by_status(owner, status).await?;
    Ok(Json(list_response(todos)))
}

pub async fn list_overdue(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<TodoListResponse>, ApiError> {
    let owner = (!user.is_admin()).then_some(user.id.as_str());
    let todos = state.todo_service.list_overdue(owner).await?;
    Ok(Json(list_response(todos)))
}

pub async fn get_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TodoDto>, ApiError> {
    let todo = owned_todo(&state, &user, &id).await?;
    Ok(Json(TodoDto::from(&todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateTodoRequest>,
) -> Result<Json<TodoDto>, ApiError> {
    owned_todo(&state, &user, &id).await?;
    let todo = state.todo_service.update(&id, request).await?;
    Ok(Json(TodoDto::from(&todo)))
}

pub async fn set_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<TodoDto>, ApiError> {
    owned_todo(&state, &user, &id).await?;
    let todo = state.todo_service.set_status(&id, request.status).await?;
    Ok(Json(TodoDto::from(&todo)))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    owned_todo(&state, &user, &id).await?;
    state.todo_service.delete(&id).await?;
    Ok(Json(json!({ "success": true, "message": "todo deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TodoService, UserService};
    use crate::storage::sqlite::{DbConnection, TodoRepository, UserRepository};
    use shared::RegisterRequest;
    use std::sync::Arc;

    async fn test_state() -> AppState {
        let db = DbConnection::init_test().await.unwrap();
        let users: Arc<dyn crate::storage::UserStorage> = Arc::new(UserRepository::new(db.clone()));
        let todos: Arc<dyn crate::storage::TodoStorage> = Arc::new(TodoRepository::new(db));
        AppState::new(
            UserService::new(users.clone(), todos.clone()),
            TodoService::new(todos, users),
            "test-secret".to_string(),
        )
    }

    async fn register(state: &AppState, name: &str) -> User {
        state
            .user_service
            .register(RegisterRequest {
                username: name.to_string(),
                email: format!("{}@example.com", name),
                password: "Secret1x".to_string(),
            })
            .await
            .unwrap()
    }

    fn create_request(title: &str) -> CreateTodoRequest {
        CreateTodoRequest {
            title: title.to_string(),
            description: None,
            status: None,
            due_date: None,
            owner_id: None,
        }
    }

    #[tokio::test]
    async fn handlers_enforce_ownership_end_to_end() {
        let state = test_state().await;
        let alice = register(&state, "alice").await;
        let bob = register(&state, "bob").await;

        let (status, Json(created)) = create_todo(
            State(state.clone()),
            AuthUser(alice.clone()),
            Json(create_request("Pack boxes")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.owner_id, alice.id);

        // bob can neither read nor delete alice's todo
        let err = get_todo(
            State(state.clone()),
            AuthUser(bob.clone()),
            Path(created.id.clone()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.error_code(), "ACCESS_DENIED");

        let err = delete_todo(
            State(state.clone()),
            AuthUser(bob),
            Path(created.id.clone()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.error_code(), "ACCESS_DENIED");

        // alice deletes her own, after which it is gone
        delete_todo(
            State(state.clone()),
            AuthUser(alice.clone()),
            Path(created.id.clone()),
        )
        .await
        .unwrap();

        let err = get_todo(State(state), AuthUser(alice), Path(created.id))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "TODO_NOT_FOUND");
    }

    #[tokio::test]
    async fn creating_for_another_owner_needs_the_same_right() {
        let state = test_state().await;
        let alice = register(&state, "alice").await;
        let bob = register(&state, "bob").await;

        let mut request = create_request("Pack boxes");
        request.owner_id = Some(alice.id.clone());

        let err = create_todo(State(state.clone()), AuthUser(bob), Json(request.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "ACCESS_DENIED");

        // naming yourself explicitly is allowed
        let (_, Json(created)) = create_todo(State(state), AuthUser(alice.clone()), Json(request))
            .await
            .unwrap();
        assert_eq!(created.owner_id, alice.id);
    }
}
