use std::sync::Arc;

use chrono::{TimeZone, Utc};
use mockito::{Matcher, Server};
use serde_json::json;

use postcraft_common::config::InstagramConfig;
use postcraft_post_model::schedule::{PublishRequest, ScheduleRequest};
use postcraft_publisher::{InstagramClient, PublishError};
use postcraft_store::{CredentialStore, Credentials, KeyValueStore, MemoryStore, SharedStore};

fn config(server: &Server) -> InstagramConfig {
    InstagramConfig {
        client_id: Some("app-123".to_string()),
        client_secret: Some("shh".to_string()),
        auth_base_url: server.url(),
        graph_base_url: server.url(),
        ..InstagramConfig::default()
    }
}

fn logged_in_store() -> SharedStore {
    let store: SharedStore = Arc::new(MemoryStore::new());
    CredentialStore::new(store.clone())
        .save(&Credentials {
            access_token: "long-token".into(),
            user_id: "17841".into(),
        })
        .unwrap();
    store
}

fn publish_request() -> PublishRequest {
    PublishRequest {
        post_id: "p1".into(),
        image_url: "https://cdn.example.com/p1.png".into(),
        caption: "Just breathe.".into(),
        hashtags: vec!["calm".into(), "mindful".into()],
    }
}

#[tokio::test]
async fn authorization_exchanges_code_and_stores_long_lived_token() {
    let mut server = Server::new_async().await;
    let short = server
        .mock("POST", "/oauth/access_token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("code".into(), "auth-code".into()),
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("client_id".into(), "app-123".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"short-token","user_id":17841}"#)
        .create_async()
        .await;
    let long = server
        .mock("GET", "/access_token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "ig_exchange_token".into()),
            Matcher::UrlEncoded("access_token".into(), "short-token".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"long-token","token_type":"bearer","expires_in":5183944}"#)
        .create_async()
        .await;

    let store: SharedStore = Arc::new(MemoryStore::new());
    let mut client = InstagramClient::new(config(&server), store.clone()).unwrap();
    assert!(!client.is_logged_in());

    client.complete_authorization("auth-code").await.unwrap();

    short.assert_async().await;
    long.assert_async().await;
    assert!(client.is_logged_in());
    assert_eq!(client.access_token(), Some("long-token"));
    assert_eq!(
        store.get_item("instagram_user_id").unwrap().as_deref(),
        Some("17841")
    );
}

#[tokio::test]
async fn failed_code_exchange_stores_nothing() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/oauth/access_token")
        .with_status(400)
        .with_body("bad request")
        .create_async()
        .await;

    let store: SharedStore = Arc::new(MemoryStore::new());
    let mut client = InstagramClient::new(config(&server), store.clone()).unwrap();
    let err = client.complete_authorization("bad").await.unwrap_err();

    assert!(matches!(
        err,
        PublishError::Api { status: 400, ref message } if message == "Failed to exchange code for token"
    ));
    assert!(!client.is_logged_in());
    assert!(store.get_item("instagram_access_token").unwrap().is_none());
}

#[tokio::test]
async fn publish_creates_container_then_publishes_it() {
    let mut server = Server::new_async().await;
    let container = server
        .mock("POST", "/17841/media")
        .match_body(Matcher::PartialJson(json!({
            "image_url": "https://cdn.example.com/p1.png",
            "caption": "Just breathe.\n\n#calm #mindful",
            "access_token": "long-token",
        })))
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"container-9"}"#)
        .create_async()
        .await;
    let publish = server
        .mock("POST", "/17841/media_publish")
        .match_body(Matcher::PartialJson(json!({ "creation_id": "container-9" })))
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"media-77"}"#)
        .create_async()
        .await;

    let client = InstagramClient::new(config(&server), logged_in_store()).unwrap();
    let media_id = client.publish_post(&publish_request()).await.unwrap();

    assert_eq!(media_id, "media-77");
    container.assert_async().await;
    publish.assert_async().await;
}

#[tokio::test]
async fn publish_surfaces_graph_error_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/17841/media")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"Only photo or video can be accepted as media type.","code":9004}}"#)
        .create_async()
        .await;
    let publish = server
        .mock("POST", "/17841/media_publish")
        .expect(0)
        .create_async()
        .await;

    let client = InstagramClient::new(config(&server), logged_in_store()).unwrap();
    let err = client.publish_post(&publish_request()).await.unwrap_err();

    assert!(matches!(
        err,
        PublishError::Api { status: 400, ref message } if message.starts_with("Only photo or video")
    ));
    publish.assert_async().await;
}

#[tokio::test]
async fn schedule_records_container_in_ledger() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/17841/media")
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"container-5"}"#)
        .create_async()
        .await;

    let client = InstagramClient::new(config(&server), logged_in_store()).unwrap();
    let at = Utc.with_ymd_and_hms(2026, 11, 1, 9, 30, 0).unwrap();
    let scheduled_id = client
        .schedule_post(&ScheduleRequest {
            post_id: "p1".into(),
            scheduled_time: at,
            image_url: "https://cdn.example.com/p1.png".into(),
            caption: "Just breathe.".into(),
            hashtags: vec![],
        })
        .await
        .unwrap();

    assert_eq!(scheduled_id, "container-5");
    let scheduled = client.scheduled_posts().unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].post_id, "p1");
    assert_eq!(scheduled[0].media_container_id, "container-5");
    assert_eq!(scheduled[0].scheduled_time, at);

    assert!(client.cancel_scheduled_post("container-5").unwrap());
    assert!(client.scheduled_posts().unwrap().is_empty());
}

#[tokio::test]
async fn calls_without_credentials_are_rejected() {
    let server = Server::new_async().await;
    let client = InstagramClient::new(config(&server), Arc::new(MemoryStore::new())).unwrap();

    assert!(matches!(
        client.publish_post(&publish_request()).await,
        Err(PublishError::NotAuthenticated)
    ));
    assert!(matches!(
        client.user_info().await,
        Err(PublishError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn rejected_token_probe_logs_out() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/17841")
        .match_query(Matcher::UrlEncoded("fields".into(), "id".into()))
        .with_status(401)
        .create_async()
        .await;

    let store = logged_in_store();
    let mut client = InstagramClient::new(config(&server), store.clone()).unwrap();
    assert!(client.is_logged_in());

    assert!(!client.is_connected().await.unwrap());
    assert!(!client.is_logged_in());
    assert!(CredentialStore::new(store).load().unwrap().is_none());
}

#[tokio::test]
async fn user_info_reads_profile() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/17841")
        .match_query(Matcher::UrlEncoded("access_token".into(), "long-token".into()))
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"17841","username":"calm.daily","media_count":12}"#)
        .create_async()
        .await;

    let client = InstagramClient::new(config(&server), logged_in_store()).unwrap();
    let info = client.user_info().await.unwrap();
    assert_eq!(info.username.as_deref(), Some("calm.daily"));
    assert_eq!(info.media_count, Some(12));
    assert_eq!(info.followers_count, None);
}
