//! Post service implementation.
//!
//! Maps the five `PostService` RPCs onto the repository. Absence is carried
//! as an explicit `Option` up to this boundary and only here translated into
//! a `NOT_FOUND` status. Posts have no uniqueness constraint beyond the
//! primary key, so any storage failure maps to `INTERNAL`.

use std::sync::Arc;

use roster_proto::proto::post_service_server::PostService;
use roster_proto::proto::{
    CreatePostRequest, DeletePostRequest, GetPostRequest, ListPostsRequest, ListPostsResponse,
    Post, UpdatePostRequest,
};
use roster_storage::{Post as PostRecord, PostRepository, StorageError};
use tonic::{Request, Response, Status};
use tracing::debug;

/// Post service implementation.
pub struct PostServiceImpl {
    /// The repository mediating access to the record store.
    repository: Arc<dyn PostRepository>,
}

impl PostServiceImpl {
    /// Create a new post service over the given repository.
    pub fn new(repository: Arc<dyn PostRepository>) -> Self {
        Self { repository }
    }
}

/// 1:1 field mapping between the stored record and the wire message.
fn to_proto(record: PostRecord) -> Post {
    Post {
        id: record.id,
        title: record.title,
        body: record.body,
    }
}

fn not_found(id: &str) -> Status {
    Status::not_found(format!("post not found: {id}"))
}

/// Translates storage failures into gRPC statuses at the service boundary.
fn storage_status(err: StorageError) -> Status {
    tracing::error!(error = %err, "storage failure");
    Status::internal("storage failure")
}

#[tonic::async_trait]
impl PostService for PostServiceImpl {
    async fn get_post(
        &self,
        request: Request<GetPostRequest>,
    ) -> Result<Response<Post>, Status> {
        let req = request.into_inner();

        let record = self
            .repository
            .find_by_id(&req.id)
            .await
            .map_err(storage_status)?
            .ok_or_else(|| not_found(&req.id))?;

        Ok(Response::new(to_proto(record)))
    }

    async fn create_post(
        &self,
        request: Request<CreatePostRequest>,
    ) -> Result<Response<Post>, Status> {
        let req = request.into_inner();

        // The record goes in without an id; save assigns one at insert time.
        let record = self
            .repository
            .save(PostRecord::new(req.title, req.body))
            .await
            .map_err(storage_status)?;

        debug!(id = %record.id, "created post");
        Ok(Response::new(to_proto(record)))
    }

    async fn list_posts(
        &self,
        request: Request<ListPostsRequest>,
    ) -> Result<Response<ListPostsResponse>, Status> {
        let _ = request.into_inner();

        let posts = self
            .repository
            .find_all()
            .await
            .map_err(storage_status)?
            .into_iter()
            .map(to_proto)
            .collect();

        Ok(Response::new(ListPostsResponse { posts }))
    }

    async fn update_post(
        &self,
        request: Request<UpdatePostRequest>,
    ) -> Result<Response<Post>, Status> {
        let req = request.into_inner();

        let mut record = self
            .repository
            .find_by_id(&req.id)
            .await
            .map_err(storage_status)?
            .ok_or_else(|| not_found(&req.id))?;

        // Overwrite the mutable fields in place; the id is never rewritten.
        record.title = req.title;
        record.body = req.body;

        let record = self.repository.save(record).await.map_err(storage_status)?;

        Ok(Response::new(to_proto(record)))
    }

    async fn delete_post(
        &self,
        request: Request<DeletePostRequest>,
    ) -> Result<Response<Post>, Status> {
        let req = request.into_inner();

        let record = self
            .repository
            .find_by_id(&req.id)
            .await
            .map_err(storage_status)?
            .ok_or_else(|| not_found(&req.id))?;

        // No re-fetch or lock between check and delete; the returned snapshot
        // reflects the fetched values.
        self.repository.delete(&record).await.map_err(storage_status)?;

        debug!(id = %record.id, "deleted post");
        Ok(Response::new(to_proto(record)))
    }
}
