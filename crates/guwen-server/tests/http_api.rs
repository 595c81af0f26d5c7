//! Router tests: each request goes through `oneshot` against a fixture
//! resources tree in a temp directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use guwen_core::catalog::ResourceRoot;
use guwen_server::dictionary::DictionaryClient;
use guwen_server::{AppState, router};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

fn write_shard(dir: &Path, name: &str, ids: std::ops::Range<i64>) {
    let mut content = String::new();
    for id in ids {
        content.push_str(&format!(
            r#"{{"original":"第{id}篇","id":{id},"en":"Piece {id}","annotation":[{{"篇":"文章"}}]}}"#
        ));
        content.push('\n');
    }
    fs::write(dir.join(name), content).expect("write shard");
}

/// `guwen/zhou` holds 24 records in shards of 10, 10, 4.
fn fixture() -> (TempDir, Router) {
    let tmp = TempDir::new().expect("tempdir");
    let resources = tmp.path().join("resources");
    let zhou = resources.join("guwen/zhou");
    fs::create_dir_all(&zhou).expect("mkdir zhou");
    fs::create_dir_all(resources.join("guwen/qin")).expect("mkdir qin");
    fs::create_dir_all(resources.join("guwen/han")).expect("mkdir han");
    fs::create_dir_all(resources.join("shijing")).expect("mkdir shijing");
    fs::write(resources.join("guwen/prop.json"), r#"{"sort":["zhou","qin"]}"#)
        .expect("write prop");

    write_shard(&zhou, "zhou-1.jsonl", 0..10);
    write_shard(&zhou, "zhou-2.jsonl", 10..20);
    write_shard(&zhou, "zhou-3.jsonl", 20..24);
    fs::write(zhou.join("zhou-en_3.mp3"), b"ID3-fake").expect("write voice");

    let music = tmp.path().join("music");
    fs::create_dir_all(&music).expect("mkdir music");
    fs::write(music.join("b.mp3"), b"x").expect("write");
    fs::write(music.join("a.mp3"), b"x").expect("write");

    let state = AppState {
        resources: ResourceRoot::new(resources),
        music_dir: music,
        // Nothing listens on the discard port; dictionary calls fail fast.
        dictionary: Arc::new(DictionaryClient::new(
            "http://127.0.0.1:9",
            Duration::from_secs(1),
        )),
    };
    (tmp, router(state))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
    let resp = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, bytes.to_vec(), content_type)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, bytes, _) = get(app, uri).await;
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn healthz_ok() {
    let (_tmp, app) = fixture();
    let (status, v) = get_json(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["status"], "ok");
}

#[tokio::test]
async fn count_is_estimated() {
    let (_tmp, app) = fixture();
    let (status, v) = get_json(app, "/api/prose/count/guwen/zhou").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["count"], 24);
}

#[tokio::test]
async fn count_of_missing_corpus_is_404() {
    let (_tmp, app) = fixture();
    let (status, v) = get_json(app, "/api/prose/count/guwen/song").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], "E2001");
}

#[tokio::test]
async fn index_returns_whole_shard() {
    let (_tmp, app) = fixture();
    let (status, v) = get_json(app, "/api/prose/index/guwen/zhou/15").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = v
        .as_array()
        .expect("array")
        .iter()
        .map(|r| r["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(ids, (10..20).collect::<Vec<_>>());
}

#[tokio::test]
async fn name_returns_single_record() {
    let (_tmp, app) = fixture();
    let (status, v) = get_json(app, "/api/prose/name/guwen/zhou/22").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["id"], 22);
    assert_eq!(v["original"], "第22篇");
    assert_eq!(v["jp"], "");
    assert_eq!(v["annotation"][0]["篇"], "文章");
}

#[tokio::test]
async fn invalid_id_is_400() {
    let (_tmp, app) = fixture();
    for uri in [
        "/api/prose/name/guwen/zhou/abc",
        "/api/prose/name/guwen/zhou/-1",
        "/api/prose/index/guwen/zhou/1.5",
    ] {
        let (status, v) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(v["code"], "E1001", "{uri}");
        assert!(v["error"].is_string());
    }
}

#[tokio::test]
async fn id_past_layout_is_out_of_range() {
    let (_tmp, app) = fixture();
    let (status, v) = get_json(app, "/api/prose/name/guwen/zhou/30").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], "E3001");
}

#[tokio::test]
async fn id_inside_last_shard_but_absent_is_not_found() {
    let (_tmp, app) = fixture();
    let (status, v) = get_json(app, "/api/prose/name/guwen/zhou/27").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], "E2004");
}

#[tokio::test]
async fn empty_corpus_has_no_shards() {
    let (_tmp, app) = fixture();
    let (status, v) = get_json(app, "/api/prose/index/guwen/qin/0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], "E2002");
}

#[tokio::test]
async fn shard_by_stem() {
    let (_tmp, app) = fixture();
    let (status, v) = get_json(app.clone(), "/api/prose/shard/guwen/zhou/zhou-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v.as_array().expect("array").len(), 4);

    let (status, v) = get_json(app, "/api/prose/shard/guwen/zhou/zhou-9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], "E2003");
}

#[tokio::test]
async fn traversal_components_are_rejected() {
    let (_tmp, app) = fixture();
    let (status, v) = get_json(app, "/api/prose/count/guwen/..").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["code"], "E1002");
}

// ---------------------------------------------------------------------------
// Listings and audio
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resource_listings() {
    let (_tmp, app) = fixture();

    let (status, v) = get_json(app.clone(), "/api/resources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, serde_json::json!(["guwen", "shijing"]));

    let (status, v) = get_json(app.clone(), "/api/resources/guwen").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, serde_json::json!(["zhou", "qin", "han"]));

    let (status, v) = get_json(app.clone(), "/api/resources/guwen/zhou").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        v,
        serde_json::json!(["zhou-1.jsonl", "zhou-2.jsonl", "zhou-3.jsonl"])
    );

    let (status, _) = get_json(app, "/api/resources/chuci").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_resources_root_is_not_found() {
    let tmp = TempDir::new().expect("tempdir");
    let state = AppState {
        resources: ResourceRoot::new(tmp.path().join("absent")),
        music_dir: tmp.path().join("music"),
        dictionary: Arc::new(DictionaryClient::new(
            "http://127.0.0.1:9",
            Duration::from_secs(1),
        )),
    };
    let (status, v) = get_json(router(state), "/api/resources").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], "E2001");
}

#[tokio::test]
async fn music_playlist() {
    let (_tmp, app) = fixture();
    let (status, v) = get_json(app, "/api/music").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, serde_json::json!(["a.mp3", "b.mp3"]));
}

#[tokio::test]
async fn record_voice_is_served_as_mpeg() {
    let (_tmp, app) = fixture();
    let (status, bytes, content_type) =
        get(app.clone(), "/api/prose/voice/guwen/zhou/en/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"ID3-fake");
    assert_eq!(content_type.as_deref(), Some("audio/mpeg"));

    let (status, _, _) = get(app, "/api/prose/voice/guwen/zhou/jp/3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unreachable_dictionary_is_502() {
    let (_tmp, app) = fixture();
    for uri in ["/api/prose/word/voice/way", "/api/prose/word/translate/way"] {
        let (status, v) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY, "{uri}");
        assert_eq!(v["code"], "E6001", "{uri}");
    }
}
