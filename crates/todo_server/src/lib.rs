//! # Todo Server
//!
//! JSON HTTP API over [`todo_core::TodoService`].
//!
//! ## Routes
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | GET | `/api` | `{"message":"Hi!"}` |
//! | POST | `/api/todos` | 201 `{"todo": ...}` |
//! | GET | `/api/todos?sort=asc\|desc` | `{"todos": [...]}` |
//! | PATCH | `/api/todos/:todoId` | `{}` |
//! | DELETE | `/api/todos/:todoId` | `{}` |
//!
//! Errors are answered as `{"errorMessage": "..."}` with 400, 404 or 500.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handlers;
mod logging;
mod routes;
mod server;
mod types;

pub use config::{LogFormat, LogLevel, LoggingConfig, ServerConfig};
pub use error::{ApiError, ServerError, ServerResult, INTERNAL_ERROR_MESSAGE};
pub use handlers::AppState;
pub use logging::init_logging;
pub use routes::create_router;
pub use server::TodoServer;
pub use types::{
    CreateTodoRequest, CreateTodoResponse, EmptyResponse, ErrorResponse, GreetingResponse,
    ListQuery, TodoJson, TodoListResponse, UpdateTodoRequest,
};
