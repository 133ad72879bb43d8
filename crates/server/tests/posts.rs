//! End-to-end CRUD tests for the post service.
//!
//! Same setup as the user tests: a live server on an ephemeral port over an
//! in-memory database, driven through the generated client.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::collections::HashSet;

use common::TestServer;
use roster_proto::proto::{
    CreatePostRequest, DeletePostRequest, GetPostRequest, ListPostsRequest, UpdatePostRequest,
};
use tonic::Code;

#[tokio::test]
async fn create_assigns_unique_ids() {
    let server = TestServer::spawn().await;
    let mut client = server.post_client().await;

    let first = client
        .create_post(CreatePostRequest {
            title: "Hello".to_string(),
            body: "first post".to_string(),
        })
        .await
        .expect("create first")
        .into_inner();

    let second = client
        .create_post(CreatePostRequest {
            title: "Hello".to_string(),
            body: "second post".to_string(),
        })
        .await
        .expect("create second")
        .into_inner();

    assert!(!first.id.is_empty(), "created post should carry an id");
    assert_ne!(first.id, second.id, "ids must be unique");
    assert_eq!(first.title, "Hello");
    assert_eq!(first.body, "first post");
}

#[tokio::test]
async fn get_returns_created_post() {
    let server = TestServer::spawn().await;
    let mut client = server.post_client().await;

    let created = client
        .create_post(CreatePostRequest {
            title: "Hello".to_string(),
            body: "first post".to_string(),
        })
        .await
        .unwrap()
        .into_inner();

    let fetched = client
        .get_post(GetPostRequest {
            id: created.id.clone(),
        })
        .await
        .expect("get post")
        .into_inner();

    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let server = TestServer::spawn().await;
    let mut client = server.post_client().await;

    let err = client
        .get_post(GetPostRequest {
            id: "no-such-id".to_string(),
        })
        .await
        .expect_err("missing id should fail");

    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn update_overwrites_title_and_body() {
    let server = TestServer::spawn().await;
    let mut client = server.post_client().await;

    let created = client
        .create_post(CreatePostRequest {
            title: "Hello".to_string(),
            body: "first post".to_string(),
        })
        .await
        .unwrap()
        .into_inner();

    let updated = client
        .update_post(UpdatePostRequest {
            id: created.id.clone(),
            title: "Hello again".to_string(),
            body: "edited".to_string(),
        })
        .await
        .expect("update post")
        .into_inner();

    assert_eq!(updated.id, created.id, "update must not rewrite the id");
    assert_eq!(updated.title, "Hello again");
    assert_eq!(updated.body, "edited");

    let fetched = client
        .get_post(GetPostRequest { id: created.id })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let server = TestServer::spawn().await;
    let mut client = server.post_client().await;

    let err = client
        .update_post(UpdatePostRequest {
            id: "no-such-id".to_string(),
            title: "Hello".to_string(),
            body: "body".to_string(),
        })
        .await
        .expect_err("missing id should fail");

    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn delete_returns_prior_values_and_removes_record() {
    let server = TestServer::spawn().await;
    let mut client = server.post_client().await;

    let created = client
        .create_post(CreatePostRequest {
            title: "Hello".to_string(),
            body: "first post".to_string(),
        })
        .await
        .unwrap()
        .into_inner();

    let deleted = client
        .delete_post(DeletePostRequest {
            id: created.id.clone(),
        })
        .await
        .expect("delete post")
        .into_inner();

    assert_eq!(deleted, created, "delete answers with the prior values");

    let err = client
        .get_post(GetPostRequest { id: created.id })
        .await
        .expect_err("deleted id should be gone");
    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
    let server = TestServer::spawn().await;
    let mut client = server.post_client().await;

    let err = client
        .delete_post(DeletePostRequest {
            id: "no-such-id".to_string(),
        })
        .await
        .expect_err("missing id should fail");

    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn list_matches_persisted_set() {
    let server = TestServer::spawn().await;
    let mut client = server.post_client().await;

    let mut expected = HashSet::new();
    for (title, body) in [("First", "a"), ("Second", "b"), ("Third", "c")] {
        let created = client
            .create_post(CreatePostRequest {
                title: title.to_string(),
                body: body.to_string(),
            })
            .await
            .unwrap()
            .into_inner();
        expected.insert(created.id);
    }

    let listed = client
        .list_posts(ListPostsRequest {})
        .await
        .expect("list posts")
        .into_inner();

    let ids: HashSet<String> = listed.posts.into_iter().map(|p| p.id).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn posts_and_users_share_one_server() {
    let server = TestServer::spawn().await;
    let mut users = server.client().await;
    let mut posts = server.post_client().await;

    let user = users
        .create_user(roster_proto::proto::CreateUserRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        })
        .await
        .expect("create user")
        .into_inner();

    let post = posts
        .create_post(CreatePostRequest {
            title: "Hello".to_string(),
            body: "first post".to_string(),
        })
        .await
        .expect("create post")
        .into_inner();

    assert!(!user.id.is_empty());
    assert!(!post.id.is_empty());
}
