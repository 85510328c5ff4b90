//! `BlueskyClient` against a local `wiremock` server standing in for both the
//! PDS and the image host.

use std::time::Duration;

use serde_json::{json, Value};
use shelfpost_bluesky::{BlueskyClient, BlueskyError, CoverImage, Credentials};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION_PATH: &str = "/xrpc/com.atproto.server.createSession";
const UPLOAD_PATH: &str = "/xrpc/com.atproto.repo.uploadBlob";
const RECORD_PATH: &str = "/xrpc/com.atproto.repo.createRecord";

fn test_client(server: &MockServer) -> BlueskyClient {
    BlueskyClient::new(&server.uri(), 5)
        .expect("client construction should not fail")
        .with_reply_delay(Duration::ZERO)
}

fn credentials() -> Credentials {
    Credentials::new("bokbot.bsky.social", "app-password")
}

fn messages() -> Vec<String> {
    vec![
        "Første del av anmeldelsen.".to_string(),
        "Andre del.".to_string(),
        "📚 Les mer: https://www.norli.no/boker/stormen-9788203".to_string(),
    ]
}

async fn mount_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .and(body_partial_json(json!({
            "identifier": "bokbot.bsky.social",
            "password": "app-password"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessJwt": "jwt-token",
            "refreshJwt": "refresh-token",
            "did": "did:plc:bokbot",
            "handle": "bokbot.bsky.social"
        })))
        .mount(server)
        .await;
}

async fn mount_post(server: &MockServer, text: &str, rkey: &str) {
    Mock::given(method("POST"))
        .and(path(RECORD_PATH))
        .and(header("authorization", "Bearer jwt-token"))
        .and(body_partial_json(json!({ "record": { "text": text } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uri": format!("at://did:plc:bokbot/app.bsky.feed.post/{rkey}"),
            "cid": format!("cid-{rkey}")
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_thread(server: &MockServer) {
    let messages = messages();
    mount_post(server, &messages[0], "root").await;
    mount_post(server, &messages[1], "second").await;
    mount_post(server, &messages[2], "third").await;
}

async fn record_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == RECORD_PATH)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn publishes_chained_thread_and_returns_root_url() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_thread(&server).await;

    let thread = test_client(&server)
        .publish_thread(&credentials(), &messages(), None)
        .await
        .unwrap();

    assert_eq!(thread.root_uri, "at://did:plc:bokbot/app.bsky.feed.post/root");
    assert_eq!(
        thread.url,
        "https://bsky.app/profile/bokbot.bsky.social/post/root"
    );
    assert_eq!(thread.posts, 3);

    let bodies = record_bodies(&server).await;
    assert_eq!(bodies.len(), 3);

    let root = &bodies[0];
    assert_eq!(root["repo"], "did:plc:bokbot");
    assert_eq!(root["collection"], "app.bsky.feed.post");
    assert_eq!(root["record"]["$type"], "app.bsky.feed.post");
    assert!(root["record"].get("reply").is_none());
    assert!(root["record"].get("embed").is_none());
    assert!(root["record"]["createdAt"].as_str().unwrap().ends_with('Z'));

    let second = &bodies[1]["record"]["reply"];
    assert_eq!(second["root"]["cid"], "cid-root");
    assert_eq!(second["parent"]["cid"], "cid-root");

    let third = &bodies[2]["record"]["reply"];
    assert_eq!(third["root"]["uri"], "at://did:plc:bokbot/app.bsky.feed.post/root");
    assert_eq!(third["parent"]["uri"], "at://did:plc:bokbot/app.bsky.feed.post/second");
}

#[tokio::test]
async fn cover_image_is_uploaded_and_embedded_in_root_only() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_thread(&server).await;

    Mock::given(method("GET"))
        .and(path("/covers/stormen.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![0x89, b'P', b'N', b'G']),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .and(header("authorization", "Bearer jwt-token"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "blob": {
                "$type": "blob",
                "ref": { "$link": "bafkrei-cover" },
                "mimeType": "image/png",
                "size": 4
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cover = CoverImage {
        url: format!("{}/covers/stormen.png", server.uri()),
        alt: "Book cover: Stormen".to_string(),
    };
    test_client(&server)
        .publish_thread(&credentials(), &messages(), Some(&cover))
        .await
        .unwrap();

    let bodies = record_bodies(&server).await;
    let embed = &bodies[0]["record"]["embed"];
    assert_eq!(embed["$type"], "app.bsky.embed.images");
    assert_eq!(embed["images"][0]["alt"], "Book cover: Stormen");
    assert_eq!(embed["images"][0]["image"]["ref"]["$link"], "bafkrei-cover");
    assert!(bodies[1]["record"].get("embed").is_none());
    assert!(bodies[2]["record"].get("embed").is_none());
}

#[tokio::test]
async fn unreachable_cover_image_still_publishes_thread() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_thread(&server).await;

    Mock::given(method("GET"))
        .and(path("/covers/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cover = CoverImage {
        url: format!("{}/covers/missing.jpg", server.uri()),
        alt: "Book cover: Stormen".to_string(),
    };
    let thread = test_client(&server)
        .publish_thread(&credentials(), &messages(), Some(&cover))
        .await
        .unwrap();

    assert_eq!(thread.posts, 3);
    let bodies = record_bodies(&server).await;
    assert!(bodies[0]["record"].get("embed").is_none());
}

#[tokio::test]
async fn failed_upload_still_publishes_thread() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_thread(&server).await;

    Mock::given(method("GET"))
        .and(path("/covers/stormen.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .and(header("content-type", "image/jpeg"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"BlobTooLarge"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let cover = CoverImage {
        url: format!("{}/covers/stormen.jpg", server.uri()),
        alt: "Book cover: Stormen".to_string(),
    };
    let thread = test_client(&server)
        .publish_thread(&credentials(), &messages(), Some(&cover))
        .await
        .unwrap();
    assert_eq!(thread.posts, 3);
}

#[tokio::test]
async fn oversized_image_is_rejected_by_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/covers/huge.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 1_000_001]))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_image(&format!("{}/covers/huge.jpg", server.uri()))
        .await
        .unwrap_err();
    assert!(
        matches!(err, BlueskyError::ImageTooLarge { size: 1_000_001, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn rejected_login_reports_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"error":"AuthenticationRequired","message":"Invalid identifier or password"}"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RECORD_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .publish_thread(&credentials(), &messages(), None)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            BlueskyError::Status { method: "com.atproto.server.createSession", status: 401, ref body }
                if body.contains("Invalid identifier")
        ),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn failed_reply_stops_the_thread() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    let messages = messages();
    mount_post(&server, &messages[0], "root").await;
    Mock::given(method("POST"))
        .and(path(RECORD_PATH))
        .and(body_partial_json(json!({ "record": { "text": messages[1] } })))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .publish_thread(&credentials(), &messages, None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, BlueskyError::Status { status: 500, .. }),
        "got: {err:?}"
    );
    assert_eq!(record_bodies(&server).await.len(), 2);
}

#[tokio::test]
async fn malformed_record_response_is_deserialize_error() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(path(RECORD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .publish_thread(&credentials(), &messages(), None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, BlueskyError::Deserialize { method: "com.atproto.repo.createRecord", .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn empty_thread_makes_no_requests() {
    let server = MockServer::start().await;

    let err = test_client(&server)
        .publish_thread(&credentials(), &[], None)
        .await
        .unwrap_err();
    assert!(matches!(err, BlueskyError::EmptyThread));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn single_message_thread_has_no_replies() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_post(&server, "Alt i én.", "solo").await;

    let thread = test_client(&server)
        .publish_thread(&credentials(), &["Alt i én.".to_string()], None)
        .await
        .unwrap();
    assert_eq!(thread.posts, 1);
    assert_eq!(thread.url, "https://bsky.app/profile/bokbot.bsky.social/post/solo");
}
