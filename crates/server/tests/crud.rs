//! End-to-end CRUD tests for the user service.
//!
//! Each test runs against a live server on an ephemeral port, backed by its
//! own in-memory database, and talks to it through the generated client.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::collections::HashSet;

use common::TestServer;
use roster_proto::proto::{
    CreateUserRequest, DeleteUserRequest, GetUserRequest, ListUsersRequest, UpdateUserRequest,
};
use tonic::Code;

#[tokio::test]
async fn create_assigns_unique_ids() {
    let server = TestServer::spawn().await;
    let mut client = server.client().await;

    let alice = client
        .create_user(CreateUserRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        })
        .await
        .expect("create alice")
        .into_inner();

    let bob = client
        .create_user(CreateUserRequest {
            name: "Bob".to_string(),
            email: "b@x.com".to_string(),
        })
        .await
        .expect("create bob")
        .into_inner();

    assert!(!alice.id.is_empty(), "created user should carry an id");
    assert!(!bob.id.is_empty());
    assert_ne!(alice.id, bob.id, "ids must be unique");
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.email, "a@x.com");
}

#[tokio::test]
async fn create_with_duplicate_email_fails() {
    let server = TestServer::spawn().await;
    let mut client = server.client().await;

    let alice = client
        .create_user(CreateUserRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        })
        .await
        .unwrap()
        .into_inner();

    let err = client
        .create_user(CreateUserRequest {
            name: "Bob".to_string(),
            email: "a@x.com".to_string(),
        })
        .await
        .expect_err("duplicate email must be rejected");
    assert_eq!(err.code(), Code::AlreadyExists);

    // The failed create must not have altered any existing record
    let users = client.list_users(ListUsersRequest {}).await.unwrap().into_inner().users;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, alice.id);
    assert_eq!(users[0].name, "Alice");
}

#[tokio::test]
async fn get_returns_created_user() {
    let server = TestServer::spawn().await;
    let mut client = server.client().await;

    let created = client
        .create_user(CreateUserRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        })
        .await
        .unwrap()
        .into_inner();

    let fetched = client
        .get_user(GetUserRequest { id: created.id.clone() })
        .await
        .expect("get after create")
        .into_inner();

    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let server = TestServer::spawn().await;
    let mut client = server.client().await;

    let err = client
        .get_user(GetUserRequest {
            id: uuid::Uuid::new_v4().to_string(),
        })
        .await
        .expect_err("unknown id must fail");
    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn update_overwrites_name_and_email() {
    let server = TestServer::spawn().await;
    let mut client = server.client().await;

    let created = client
        .create_user(CreateUserRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        })
        .await
        .unwrap()
        .into_inner();

    let updated = client
        .update_user(UpdateUserRequest {
            id: created.id.clone(),
            name: "Alicia".to_string(),
            email: "alicia@x.com".to_string(),
        })
        .await
        .expect("update")
        .into_inner();

    assert_eq!(updated.id, created.id, "update must not change the id");
    assert_eq!(updated.name, "Alicia");
    assert_eq!(updated.email, "alicia@x.com");

    // A subsequent read reflects the update
    let fetched = client
        .get_user(GetUserRequest { id: created.id })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let server = TestServer::spawn().await;
    let mut client = server.client().await;

    let err = client
        .update_user(UpdateUserRequest {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Ghost".to_string(),
            email: "ghost@x.com".to_string(),
        })
        .await
        .expect_err("unknown id must fail");
    assert_eq!(err.code(), Code::NotFound);

    // The failed update must not have created a record
    let users = client.list_users(ListUsersRequest {}).await.unwrap().into_inner().users;
    assert!(users.is_empty());
}

#[tokio::test]
async fn update_to_colliding_email_is_rejected() {
    let server = TestServer::spawn().await;
    let mut client = server.client().await;

    client
        .create_user(CreateUserRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        })
        .await
        .unwrap();
    let bob = client
        .create_user(CreateUserRequest {
            name: "Bob".to_string(),
            email: "b@x.com".to_string(),
        })
        .await
        .unwrap()
        .into_inner();

    let err = client
        .update_user(UpdateUserRequest {
            id: bob.id.clone(),
            name: "Bob".to_string(),
            email: "a@x.com".to_string(),
        })
        .await
        .expect_err("email collision must be rejected");
    assert_eq!(err.code(), Code::AlreadyExists);

    // Bob's record is unchanged
    let fetched = client.get_user(GetUserRequest { id: bob.id }).await.unwrap().into_inner();
    assert_eq!(fetched.email, "b@x.com");
}

#[tokio::test]
async fn delete_returns_prior_values_and_removes_record() {
    let server = TestServer::spawn().await;
    let mut client = server.client().await;

    let created = client
        .create_user(CreateUserRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        })
        .await
        .unwrap()
        .into_inner();

    let deleted = client
        .delete_user(DeleteUserRequest { id: created.id.clone() })
        .await
        .expect("delete")
        .into_inner();
    assert_eq!(deleted, created, "delete returns the pre-deletion snapshot");

    let err = client
        .get_user(GetUserRequest { id: created.id })
        .await
        .expect_err("deleted user must be gone");
    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
    let server = TestServer::spawn().await;
    let mut client = server.client().await;

    let err = client
        .delete_user(DeleteUserRequest {
            id: uuid::Uuid::new_v4().to_string(),
        })
        .await
        .expect_err("unknown id must fail");
    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn list_matches_persisted_set() {
    let server = TestServer::spawn().await;
    let mut client = server.client().await;

    // Empty store lists as an empty sequence
    let users = client.list_users(ListUsersRequest {}).await.unwrap().into_inner().users;
    assert!(users.is_empty());

    let mut expected = HashSet::new();
    for (name, email) in [("Alice", "a@x.com"), ("Bob", "b@x.com"), ("Carol", "c@x.com")] {
        let user = client
            .create_user(CreateUserRequest {
                name: name.to_string(),
                email: email.to_string(),
            })
            .await
            .unwrap()
            .into_inner();
        expected.insert(user.id);
    }

    // Remove one and expect the set to track it
    let victim = expected.iter().next().unwrap().clone();
    client.delete_user(DeleteUserRequest { id: victim.clone() }).await.unwrap();
    expected.remove(&victim);

    let users = client.list_users(ListUsersRequest {}).await.unwrap().into_inner().users;
    let ids: HashSet<String> = users.iter().map(|u| u.id.clone()).collect();
    assert_eq!(ids.len(), users.len(), "no duplicate ids");
    assert_eq!(ids, expected, "no omissions, no strays");
}

/// The full lifecycle scenario: create, duplicate create, list, update,
/// delete, get.
#[tokio::test]
async fn full_lifecycle() {
    let server = TestServer::spawn().await;
    let mut client = server.client().await;

    let alice = client
        .create_user(CreateUserRequest {
            name: "Alice".to_string(),
            email: "a@x.com".to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.email, "a@x.com");

    let err = client
        .create_user(CreateUserRequest {
            name: "Bob".to_string(),
            email: "a@x.com".to_string(),
        })
        .await
        .expect_err("duplicate email");
    assert_eq!(err.code(), Code::AlreadyExists);

    let users = client.list_users(ListUsersRequest {}).await.unwrap().into_inner().users;
    assert_eq!(users, vec![alice.clone()]);

    let alicia = client
        .update_user(UpdateUserRequest {
            id: alice.id.clone(),
            name: "Alicia".to_string(),
            email: "alicia@x.com".to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(alicia.id, alice.id);
    assert_eq!(alicia.name, "Alicia");
    assert_eq!(alicia.email, "alicia@x.com");

    let deleted = client
        .delete_user(DeleteUserRequest { id: alice.id.clone() })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(deleted, alicia);

    let err = client
        .get_user(GetUserRequest { id: alice.id })
        .await
        .expect_err("gone after delete");
    assert_eq!(err.code(), Code::NotFound);
}
