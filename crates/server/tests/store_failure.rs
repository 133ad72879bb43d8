//! Behavior of the service layer when the record store is unavailable.
//!
//! Exercises the handlers directly over a closed connection pool, checking
//! that storage failures surface as `INTERNAL` rather than leaking the
//! underlying database error or panicking.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use roster_proto::proto::user_service_server::UserService;
use roster_proto::proto::{CreateUserRequest, GetUserRequest};
use roster_server::services::UserServiceImpl;
use roster_storage::SqliteUserRepository;
use tonic::{Code, Request};

/// A service whose pool has been closed, so every query fails.
async fn unavailable_service() -> UserServiceImpl {
    let pool = roster_storage::memory_pool().await.expect("create pool");
    roster_storage::run_migrations(&pool).await.expect("run migrations");

    let repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    pool.close().await;

    UserServiceImpl::new(repository)
}

#[tokio::test]
async fn get_with_unavailable_store_is_internal() {
    let service = unavailable_service().await;

    let err = service
        .get_user(Request::new(GetUserRequest {
            id: "any-id".to_string(),
        }))
        .await
        .expect_err("closed pool should fail the call");

    assert_eq!(err.code(), Code::Internal);
    assert_eq!(err.message(), "storage failure", "no backend detail leaks");
}

#[tokio::test]
async fn create_with_unavailable_store_is_internal() {
    let service = unavailable_service().await;

    let err = service
        .create_user(Request::new(CreateUserRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        }))
        .await
        .expect_err("closed pool should fail the call");

    assert_eq!(err.code(), Code::Internal);
}
