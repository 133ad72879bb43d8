//! Test harness for the Roster gRPC server.
//!
//! Spawns a real server on an ephemeral port over an in-memory database and
//! hands out clients connected to it. Each `TestServer` owns its own store,
//! so tests are independent and can run in parallel.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use roster_proto::proto::post_service_client::PostServiceClient;
use roster_proto::proto::user_service_client::UserServiceClient;
use roster_server::server::RosterServer;
use roster_storage::{SqlitePostRepository, SqliteUserRepository};
use tonic::transport::Channel;

/// A running server instance under test.
pub struct TestServer {
    /// The gRPC address.
    pub addr: SocketAddr,
    /// Server task handle for cleanup.
    _server_handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server over a fresh in-memory database.
    pub async fn spawn() -> Self {
        let pool = roster_storage::memory_pool().await.expect("create pool");
        roster_storage::run_migrations(&pool).await.expect("run migrations");
        let users = Arc::new(SqliteUserRepository::new(pool.clone()));
        let posts = Arc::new(SqlitePostRepository::new(pool));

        // Bind before spawning so connections queue instead of racing startup
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let addr = listener.local_addr().expect("local addr");

        let server = RosterServer::new(addr, users, posts);
        let server_handle = tokio::spawn(async move {
            let shutdown = std::future::pending::<()>();
            if let Err(e) = server.serve_on_with_shutdown(listener, shutdown).await {
                tracing::error!("server error: {}", e);
            }
        });

        Self {
            addr,
            _server_handle: server_handle,
        }
    }

    /// Connect a user-service client to this server.
    pub async fn client(&self) -> UserServiceClient<Channel> {
        UserServiceClient::connect(format!("http://{}", self.addr))
            .await
            .expect("connect to server")
    }

    /// Connect a post-service client to this server.
    pub async fn post_client(&self) -> PostServiceClient<Channel> {
        PostServiceClient::connect(format!("http://{}", self.addr))
            .await
            .expect("connect to server")
    }
}
