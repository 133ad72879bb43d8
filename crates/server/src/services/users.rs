//! User service implementation.
//!
//! Maps the five `UserService` RPCs onto the repository. Absence is carried
//! as an explicit `Option` up to this boundary and only here translated into
//! a `NOT_FOUND` status; email-uniqueness violations surface as
//! `ALREADY_EXISTS`.

use std::sync::Arc;

use roster_proto::proto::user_service_server::UserService;
use roster_proto::proto::{
    CreateUserRequest, DeleteUserRequest, GetUserRequest, ListUsersRequest, ListUsersResponse,
    UpdateUserRequest, User,
};
use roster_storage::{StorageError, User as UserRecord, UserRepository};
use tonic::{Request, Response, Status};
use tracing::debug;

/// User service implementation.
pub struct UserServiceImpl {
    /// The repository mediating access to the record store.
    repository: Arc<dyn UserRepository>,
}

impl UserServiceImpl {
    /// Create a new user service over the given repository.
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }
}

/// 1:1 field mapping between the stored record and the wire message.
fn to_proto(record: UserRecord) -> User {
    User {
        id: record.id,
        name: record.name,
        email: record.email,
    }
}

fn not_found(id: &str) -> Status {
    Status::not_found(format!("user not found: {id}"))
}

/// Translates storage failures into gRPC statuses at the service boundary.
fn storage_status(err: StorageError) -> Status {
    match err {
        StorageError::EmailTaken { email } => {
            Status::already_exists(format!("email already in use: {email}"))
        }
        other => {
            tracing::error!(error = %other, "storage failure");
            Status::internal("storage failure")
        }
    }
}

#[tonic::async_trait]
impl UserService for UserServiceImpl {
    async fn get_user(
        &self,
        request: Request<GetUserRequest>,
    ) -> Result<Response<User>, Status> {
        let req = request.into_inner();

        let record = self
            .repository
            .find_by_id(&req.id)
            .await
            .map_err(storage_status)?
            .ok_or_else(|| not_found(&req.id))?;

        Ok(Response::new(to_proto(record)))
    }

    async fn create_user(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<Response<User>, Status> {
        let req = request.into_inner();

        // The record goes in without an id; save assigns one at insert time.
        let record = self
            .repository
            .save(UserRecord::new(req.name, req.email))
            .await
            .map_err(storage_status)?;

        debug!(id = %record.id, "created user");
        Ok(Response::new(to_proto(record)))
    }

    async fn list_users(
        &self,
        request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        let _ = request.into_inner();

        let users = self
            .repository
            .find_all()
            .await
            .map_err(storage_status)?
            .into_iter()
            .map(to_proto)
            .collect();

        Ok(Response::new(ListUsersResponse { users }))
    }

    async fn update_user(
        &self,
        request: Request<UpdateUserRequest>,
    ) -> Result<Response<User>, Status> {
        let req = request.into_inner();

        let mut record = self
            .repository
            .find_by_id(&req.id)
            .await
            .map_err(storage_status)?
            .ok_or_else(|| not_found(&req.id))?;

        // Overwrite the mutable fields in place; the id is never rewritten.
        record.name = req.name;
        record.email = req.email;

        let record = self.repository.save(record).await.map_err(storage_status)?;

        Ok(Response::new(to_proto(record)))
    }

    async fn delete_user(
        &self,
        request: Request<DeleteUserRequest>,
    ) -> Result<Response<User>, Status> {
        let req = request.into_inner();

        let record = self
            .repository
            .find_by_id(&req.id)
            .await
            .map_err(storage_status)?
            .ok_or_else(|| not_found(&req.id))?;

        // No re-fetch or lock between check and delete. A concurrent
        // delete-and-recreate can make the returned snapshot stale; that
        // ordering is delegated to the store.
        self.repository.delete(&record).await.map_err(storage_status)?;

        debug!(id = %record.id, "deleted user");
        Ok(Response::new(to_proto(record)))
    }
}
