//! gRPC server assembly for Roster.
//!
//! Combines the user and post services with a tonic transport. Supports
//! graceful shutdown via a caller-supplied future.

use std::net::SocketAddr;
use std::sync::Arc;

use roster_proto::proto::post_service_server::PostServiceServer;
use roster_proto::proto::user_service_server::UserServiceServer;
use roster_storage::{PostRepository, UserRepository};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

use crate::services::{PostServiceImpl, UserServiceImpl};

/// The Roster gRPC server.
pub struct RosterServer {
    /// Server address.
    addr: SocketAddr,
    /// The repository backing the user service.
    users: Arc<dyn UserRepository>,
    /// The repository backing the post service.
    posts: Arc<dyn PostRepository>,
}

impl RosterServer {
    /// Create a new server for the given address and repositories.
    pub fn new(
        addr: SocketAddr,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self { addr, users, posts }
    }

    /// Starts the gRPC server, binding the configured address.
    ///
    /// Blocks until the `shutdown` future resolves, then drains in-flight
    /// requests before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address
    /// or encounters a transport-level error during operation.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        F: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_on_with_shutdown(listener, shutdown).await
    }

    /// Starts the gRPC server on an already-bound listener.
    ///
    /// Used by tests to serve on an ephemeral port without a bind race.
    ///
    /// # Errors
    ///
    /// Returns an error on transport-level failures.
    pub async fn serve_on_with_shutdown<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        F: std::future::Future<Output = ()>,
    {
        let addr = listener.local_addr()?;
        let user_service = UserServiceImpl::new(self.users);
        let post_service = PostServiceImpl::new(self.posts);

        tracing::info!(addr = %addr, "gRPC server listening");

        Server::builder()
            .add_service(UserServiceServer::new(user_service))
            .add_service(PostServiceServer::new(post_service))
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await?;

        Ok(())
    }
}
