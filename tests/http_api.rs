mod common;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{http::StatusCode, test, web, App};
use chrono::Utc;
use common::{record, UnreachableDirectory};
use jsonwebtoken::{encode, EncodingKey, Header};
use quipboard_server::cache::SnapshotCache;
use quipboard_server::db::memory::{MemoryEditorDirectory, MemoryRosterStorage};
use quipboard_server::db::models::RosterTable;
use quipboard_server::db::storage::RosterStorage;
use quipboard_server::http::auth::Claims;
use quipboard_server::http::routes;
use quipboard_server::state::AppState;
use serde_json::{json, Value};
use uuid::Uuid;

const SECRET: &str = "test-secret";

struct Harness {
    storage: Arc<MemoryRosterStorage>,
    state: web::Data<AppState>,
    editor_token: String,
    visitor_token: String,
}

fn token_for(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now().timestamp() + 3_600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("JWT encode failed")
}

fn harness(storage: MemoryRosterStorage) -> Harness {
    harness_with_ttl(storage, Duration::ZERO)
}

fn harness_with_ttl(storage: MemoryRosterStorage, ttl: Duration) -> Harness {
    let storage = Arc::new(storage);
    let editor_id = Uuid::new_v4();
    let directory = Arc::new(MemoryEditorDirectory::new([editor_id]));
    let state = web::Data::new(
        AppState::new(storage.clone(), directory, SECRET.into())
            .with_cache(SnapshotCache::new(ttl)),
    );
    Harness {
        storage,
        state,
        editor_token: token_for(editor_id),
        visitor_token: token_for(Uuid::new_v4()),
    }
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

macro_rules! app {
    ($h:expr) => {
        test::init_service(
            App::new()
                .app_data($h.state.clone())
                .configure(routes::init_routes),
        )
        .await
    };
}

#[actix_rt::test]
async fn public_list_is_sorted_and_presented() {
    let h = harness(MemoryRosterStorage::new().with_rows(
        RosterTable::Live,
        vec![record("mid", 1.2399), record("top", 1.95), record("low", 0.1)],
    ));
    let app = app!(h);

    let req = test::TestRequest::get().uri("/api/players").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["count"], 3);
    let players = body["players"].as_array().unwrap();
    let names: Vec<&str> = players
        .iter()
        .map(|p| p["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["top", "mid", "low"]);
    assert_eq!(players[1]["quip_rating"], "1.23");
    assert_eq!(players[1]["tier"], 1.2);
    assert_eq!(players[0]["style"]["kind"], "gradient");
    assert_eq!(players[1]["style"]["kind"], "plain");
}

#[actix_rt::test]
async fn public_search_and_lookup() {
    let h = harness(MemoryRosterStorage::new().with_rows(
        RosterTable::Live,
        vec![record("alice", 1.0), record("bob", 1.5)],
    ));
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/api/players?search=alise")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["players"][0]["username"], "alice");

    let req = test::TestRequest::get().uri("/api/players/bob").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["quip_rating"], "1.50");

    let req = test::TestRequest::get().uri("/api/players/Bob").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn tierlist_groups_live_players() {
    let h = harness(MemoryRosterStorage::new().with_rows(
        RosterTable::Live,
        vec![record("a", 1.31), record("b", 1.39), record("c", 0.4)],
    ));
    let app = app!(h);

    let req = test::TestRequest::get().uri("/api/tierlist").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["label"], "1.3");
    assert_eq!(rows[0]["players"][0]["username"], "b");
    assert_eq!(rows[1]["label"], "0.4");
}

#[actix_rt::test]
async fn storage_outage_is_503_not_empty() {
    let h = harness(MemoryRosterStorage::new());
    h.storage.set_unavailable(true);
    let app = app!(h);

    let req = test::TestRequest::get().uri("/api/players").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let req = test::TestRequest::get().uri("/api/healthz").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_rt::test]
async fn admin_routes_require_a_token_and_the_editor_role() {
    let h = harness(MemoryRosterStorage::new());
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/admin/players")
        .set_json(json!({ "username": "mallory", "rating": 2.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/admin/players")
        .insert_header(bearer(&h.visitor_token))
        .set_json(json!({ "username": "mallory", "rating": 2.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/admin/permissions")
        .insert_header(bearer(&h.visitor_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["editor"], false);

    assert!(h
        .storage
        .select_all(RosterTable::Draft)
        .await
        .unwrap()
        .is_empty());
}

#[actix_rt::test]
async fn draft_edits_stay_private_until_published() {
    let h = harness(MemoryRosterStorage::new());
    let app = app!(h);

    // stage a player
    let req = test::TestRequest::post()
        .uri("/api/admin/players")
        .insert_header(bearer(&h.editor_token))
        .set_json(json!({ "username": "carol", "rating": 1.45, "notes": "new" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();

    // duplicate name is a conflict
    let req = test::TestRequest::post()
        .uri("/api/admin/players")
        .insert_header(bearer(&h.editor_token))
        .set_json(json!({ "username": "carol", "rating": 0.1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // edit it
    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/players/{id}"))
        .insert_header(bearer(&h.editor_token))
        .set_json(json!({ "username": "carol", "rating": 1.61, "notes": "new" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["quip_rating"], "1.61");

    // live is still empty
    let req = test::TestRequest::get().uri("/api/players").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 0);

    // publish needs confirmation
    let req = test::TestRequest::post()
        .uri("/api/admin/publish")
        .insert_header(bearer(&h.editor_token))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/admin/publish")
        .insert_header(bearer(&h.editor_token))
        .set_json(json!({ "confirm": true }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"], "succeeded");

    // now visible publicly, without review notes
    let req = test::TestRequest::get().uri("/api/players/carol").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["rating"], 1.61);
    assert!(body.get("notes").is_none());

    let req = test::TestRequest::get()
        .uri("/api/admin/bulk/publish")
        .insert_header(bearer(&h.editor_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"], "succeeded");
}

#[actix_rt::test]
async fn discard_resets_draft_and_delete_is_not_idempotent() {
    let h = harness(
        MemoryRosterStorage::new()
            .with_rows(RosterTable::Live, vec![record("keeper", 1.0)])
            .with_rows(RosterTable::Draft, vec![record("keeper", 1.0)]),
    );
    let app = app!(h);
    let draft = h.storage.select_all(RosterTable::Draft).await.unwrap();
    let id = draft[0].id;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/players/{id}"))
        .insert_header(bearer(&h.editor_token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/players/{id}"))
        .insert_header(bearer(&h.editor_token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::post()
        .uri("/api/admin/discard")
        .insert_header(bearer(&h.editor_token))
        .set_json(json!({ "confirm": true }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/admin/players")
        .insert_header(bearer(&h.editor_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["players"][0]["username"], "keeper");
}

#[actix_rt::test]
async fn metrics_endpoint_reports_draft_writes() {
    let h = harness(MemoryRosterStorage::new());
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/admin/players")
        .insert_header(bearer(&h.editor_token))
        .set_json(json!({ "username": "metered", "rating": 0.5 }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CREATED
    );

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let body = test::call_and_read_body(&app, req).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("quipboard_draft_writes_total"));
}

macro_rules! draft_names {
    ($app:expr, $token:expr) => {{
        let req = test::TestRequest::get()
            .uri("/api/admin/players")
            .insert_header(bearer($token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["players"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["username"].as_str().unwrap().to_string())
            .collect::<Vec<_>>()
    }};
}

#[actix_rt::test]
async fn cached_draft_is_refreshed_by_editor_writes() {
    let h = harness_with_ttl(
        MemoryRosterStorage::new().with_rows(RosterTable::Draft, vec![record("anna", 1.0)]),
        Duration::from_secs(300),
    );
    let app = app!(h);
    assert_eq!(draft_names!(app, &h.editor_token), ["anna"]);

    // a write behind the server's back is not seen while the snapshot is fresh
    h.storage
        .insert(RosterTable::Draft, &record("ghost", 0.1))
        .await
        .unwrap();
    assert_eq!(draft_names!(app, &h.editor_token), ["anna"]);

    let req = test::TestRequest::post()
        .uri("/api/admin/players")
        .insert_header(bearer(&h.editor_token))
        .set_json(json!({ "username": "bea", "rating": 1.8 }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(
        draft_names!(app, &h.editor_token),
        ["bea", "anna", "ghost"]
    );

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/players/{id}"))
        .insert_header(bearer(&h.editor_token))
        .set_json(json!({ "username": "beatrice", "rating": 0.5 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert_eq!(
        draft_names!(app, &h.editor_token),
        ["anna", "beatrice", "ghost"]
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/players/{id}"))
        .insert_header(bearer(&h.editor_token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(draft_names!(app, &h.editor_token), ["anna", "ghost"]);
}

#[actix_rt::test]
async fn cached_live_roster_is_refreshed_by_publish() {
    let h = harness_with_ttl(
        MemoryRosterStorage::new()
            .with_rows(RosterTable::Live, vec![record("old", 1.0)])
            .with_rows(RosterTable::Draft, vec![record("new", 1.2)]),
        Duration::from_secs(300),
    );
    let app = app!(h);

    let req = test::TestRequest::get().uri("/api/players").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["players"][0]["username"], "old");

    let req = test::TestRequest::post()
        .uri("/api/admin/publish")
        .insert_header(bearer(&h.editor_token))
        .set_json(json!({ "confirm": true }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/players").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["players"][0]["username"], "new");
}

#[actix_rt::test]
async fn editor_directory_outage_is_503_not_403() {
    let storage = Arc::new(
        MemoryRosterStorage::new().with_rows(RosterTable::Draft, vec![record("kept", 1.0)]),
    );
    let state = web::Data::new(AppState::new(
        storage.clone(),
        Arc::new(UnreachableDirectory),
        SECRET.into(),
    ));
    let token = token_for(Uuid::new_v4());
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(routes::init_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/admin/players")
        .insert_header(bearer(&token))
        .set_json(json!({ "username": "late", "rating": 1.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    for uri in ["/api/admin/permissions", "/api/admin/players"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE, "{uri}");
    }

    assert_eq!(storage.select_all(RosterTable::Draft).await.unwrap().len(), 1);
}

#[actix_rt::test]
async fn bulk_state_is_editor_only() {
    let h = harness(MemoryRosterStorage::new());
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/api/admin/bulk/publish")
        .insert_header(bearer(&h.visitor_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/admin/bulk/discard")
        .insert_header(bearer(&h.editor_token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"], "idle");
}

#[actix_rt::test]
async fn malformed_or_foreign_tokens_are_401() {
    let h = harness(MemoryRosterStorage::new());
    let app = app!(h);

    let not_a_uuid = encode(
        &Header::default(),
        &Claims {
            sub: "someone".into(),
            exp: (Utc::now().timestamp() + 3_600) as usize,
        },
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    let other_secret = encode(
        &Header::default(),
        &Claims {
            sub: Uuid::new_v4().to_string(),
            exp: (Utc::now().timestamp() + 3_600) as usize,
        },
        &EncodingKey::from_secret(b"someone-else"),
    )
    .unwrap();

    for header in [
        format!("Token {}", h.editor_token),
        format!("Bearer {not_a_uuid}"),
        format!("Bearer {other_secret}"),
    ] {
        let req = test::TestRequest::get()
            .uri("/api/admin/permissions")
            .insert_header(("Authorization", header.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{header}");
    }
}
