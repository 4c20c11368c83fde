//! End-to-end tests for the wiki REST API against the in-memory SQLite
//! backend.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use roomwiki_persistence::backends::sqlite::SqliteBackend;
use roomwiki_persistence::store::WikiStore;
use roomwiki_rest::{ServerConfig, create_app_with_config};

const ROOT_TOKEN: &str = "root-token";

/// Boots a server with a fresh in-memory database and a seeded superuser.
async fn setup() -> TestServer {
    let backend = SqliteBackend::in_memory().unwrap();
    backend.init_schema().unwrap();
    backend.create_user("root", ROOT_TOKEN, true).await.unwrap();

    let app = create_app_with_config(backend, ServerConfig::for_testing());
    TestServer::new(app).unwrap()
}

/// Creates a user through the API, returning `(id, token)`.
async fn create_user(server: &TestServer, username: &str) -> (i64, String) {
    let res = server
        .post("/users")
        .authorization_bearer(ROOT_TOKEN)
        .json(&json!({ "username": username }))
        .await;
    res.assert_status(StatusCode::CREATED);
    let body: Value = res.json();
    (
        body["id"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

/// Replaces a user's memberships with a single grant.
async fn grant(server: &TestServer, user_id: i64, room: &str, role: &str) {
    server
        .put(&format!("/users/{user_id}/rooms"))
        .authorization_bearer(ROOT_TOKEN)
        .json(&json!([{ "room": room, "role": role }]))
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

/// Creates a room as the given token's user.
async fn create_room(server: &TestServer, token: &str, name: &str) {
    server
        .post("/rooms")
        .authorization_bearer(token)
        .json(&json!({ "name": name, "display_name": name }))
        .await
        .assert_status(StatusCode::CREATED);
}

/// Creates a page and returns its id.
async fn create_page(
    server: &TestServer,
    token: &str,
    room: &str,
    slug: &str,
    parent: Option<&str>,
) -> i64 {
    let res = server
        .post(&format!("/rooms/{room}/pages"))
        .authorization_bearer(token)
        .json(&json!({
            "title": format!("Page {slug}"),
            "slug": slug,
            "content": { "text": format!("content of {slug}") },
            "parent_path": parent,
        }))
        .await;
    res.assert_status(StatusCode::CREATED);
    res.json::<Value>()["id"].as_i64().unwrap()
}

// ---- system ----

#[tokio::test]
async fn test_health() {
    let server = setup().await;
    let res = server.get("/health").await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>()["backend"], "sqlite");
}

// ---- authentication ----

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let server = setup().await;
    server.get("/rooms").await.assert_status_unauthorized();
    server
        .post("/rooms")
        .json(&json!({ "name": "acme" }))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let server = setup().await;
    server
        .get("/rooms")
        .authorization_bearer("no-such-token")
        .await
        .assert_status_unauthorized();
}

// ---- rooms ----

#[tokio::test]
async fn test_room_create_and_owner_role() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;

    let res = server
        .get("/rooms/acme/my-role")
        .authorization_bearer(&token)
        .await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>()["role"], "Owner");
}

#[tokio::test]
async fn test_duplicate_room_name_conflicts() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;

    server
        .post("/rooms")
        .authorization_bearer(&token)
        .json(&json!({ "name": "acme" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    // Case variants would share the room's namespace.
    server
        .post("/rooms")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Acme" }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_malformed_room_identifier_rejected() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;

    for bad in ["a-b", "a.b", "a%3Bb"] {
        server
            .get(&format!("/rooms/{bad}/pages"))
            .authorization_bearer(&token)
            .await
            .assert_status_bad_request();
    }
    server
        .post("/rooms")
        .authorization_bearer(&token)
        .json(&json!({ "name": "bad name" }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_room_listing_scoped_to_membership() {
    let server = setup().await;
    let (_, ada) = create_user(&server, "ada").await;
    let (_, bob) = create_user(&server, "bob").await;
    create_room(&server, &ada, "acme").await;
    create_room(&server, &bob, "globex").await;

    let rooms: Value = server.get("/rooms").authorization_bearer(&ada).await.json();
    let names: Vec<&str> = rooms
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["acme"]);

    // Superusers see everything.
    let rooms: Value = server
        .get("/rooms")
        .authorization_bearer(ROOT_TOKEN)
        .await
        .json();
    assert_eq!(rooms.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_room_delete_requires_owner() {
    let server = setup().await;
    let (_, owner) = create_user(&server, "owner").await;
    let (admin_id, admin) = create_user(&server, "admin").await;
    create_room(&server, &owner, "acme").await;
    grant(&server, admin_id, "acme", "Admin").await;

    // Admin is not enough for room deletion.
    server
        .delete("/rooms/acme")
        .authorization_bearer(&admin)
        .await
        .assert_status_forbidden();

    server
        .delete("/rooms/acme")
        .authorization_bearer(&owner)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get("/rooms/acme/pages")
        .authorization_bearer(&owner)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_room_update_settings_owner_only() {
    let server = setup().await;
    let (_, owner) = create_user(&server, "owner").await;
    let (admin_id, admin) = create_user(&server, "admin").await;
    create_room(&server, &owner, "acme").await;
    grant(&server, admin_id, "acme", "Admin").await;

    server
        .put("/rooms/acme")
        .authorization_bearer(&admin)
        .json(&json!({ "display_name": "Acme Corp" }))
        .await
        .assert_status_forbidden();

    let res = server
        .put("/rooms/acme")
        .authorization_bearer(&owner)
        .json(&json!({ "display_name": "Acme Corp", "public_title": "Acme Wiki" }))
        .await;
    res.assert_status_ok();
    let room: Value = res.json();
    assert_eq!(room["display_name"], "Acme Corp");
    assert_eq!(room["public_title"], "Acme Wiki");
}

// ---- role gating ----

#[tokio::test]
async fn test_role_matrix_on_pages() {
    let server = setup().await;
    let (_, owner) = create_user(&server, "owner").await;
    let (viewer_id, viewer) = create_user(&server, "viewer").await;
    let (editor_id, editor) = create_user(&server, "editor").await;
    let (admin_id, admin) = create_user(&server, "admin").await;
    create_room(&server, &owner, "acme").await;
    grant(&server, viewer_id, "acme", "Viewer").await;
    grant(&server, editor_id, "acme", "Editor").await;
    grant(&server, admin_id, "acme", "Admin").await;

    let page = json!({ "title": "T", "slug": "t" });

    // Viewer reads but cannot write.
    server
        .get("/rooms/acme/pages")
        .authorization_bearer(&viewer)
        .await
        .assert_status_ok();
    server
        .post("/rooms/acme/pages")
        .authorization_bearer(&viewer)
        .json(&page)
        .await
        .assert_status_forbidden();

    // Editor creates and updates but cannot delete.
    let id = create_page(&server, &editor, "acme", "notes", None).await;
    server
        .put(&format!("/rooms/acme/pages/{id}"))
        .authorization_bearer(&editor)
        .json(&json!({ "title": "Renamed" }))
        .await
        .assert_status_ok();
    server
        .delete(&format!("/rooms/acme/pages/{id}"))
        .authorization_bearer(&editor)
        .await
        .assert_status_forbidden();

    // Admin deletes.
    server
        .delete(&format!("/rooms/acme/pages/{id}"))
        .authorization_bearer(&admin)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_outsider_has_no_access() {
    let server = setup().await;
    let (_, owner) = create_user(&server, "owner").await;
    let (_, outsider) = create_user(&server, "outsider").await;
    create_room(&server, &owner, "acme").await;

    server
        .get("/rooms/acme/pages")
        .authorization_bearer(&outsider)
        .await
        .assert_status_forbidden();
}

#[tokio::test]
async fn test_superuser_bypasses_role_checks() {
    let server = setup().await;
    let (_, owner) = create_user(&server, "owner").await;
    create_room(&server, &owner, "acme").await;

    let id = create_page(&server, ROOT_TOKEN, "acme", "root_page", None).await;
    server
        .delete(&format!("/rooms/acme/pages/{id}"))
        .authorization_bearer(ROOT_TOKEN)
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

// ---- pages ----

#[tokio::test]
async fn test_page_paths_follow_hierarchy() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;

    create_page(&server, &token, "acme", "intro", None).await;
    let setup_id = create_page(&server, &token, "acme", "setup", Some("intro")).await;

    let res = server
        .get(&format!("/rooms/acme/pages/{setup_id}"))
        .authorization_bearer(&token)
        .await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>()["path"], "intro.setup");
}

#[tokio::test]
async fn test_page_fetch_by_slug() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;
    let id = create_page(&server, &token, "acme", "getting-started", None).await;

    // Hyphens are normalized to underscores at write time.
    let res = server
        .get("/rooms/acme/pages/by-slug/getting_started")
        .authorization_bearer(&token)
        .await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>()["id"], id);

    server
        .get("/rooms/acme/pages/by-slug/nope")
        .authorization_bearer(&token)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_rename_relocates_subtree() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;

    let intro = create_page(&server, &token, "acme", "intro", None).await;
    let setup_id = create_page(&server, &token, "acme", "setup", Some("intro")).await;
    create_page(&server, &token, "acme", "sibling", None).await;

    server
        .put(&format!("/rooms/acme/pages/{intro}"))
        .authorization_bearer(&token)
        .json(&json!({ "slug": "guide" }))
        .await
        .assert_status_ok();

    let moved: Value = server
        .get(&format!("/rooms/acme/pages/{setup_id}"))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(moved["path"], "guide.setup");

    let pages: Value = server
        .get("/rooms/acme/pages")
        .authorization_bearer(&token)
        .await
        .json();
    let paths: Vec<&str> = pages
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["guide", "guide.setup", "sibling"]);
}

#[tokio::test]
async fn test_rename_onto_existing_path_conflicts() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;

    let a = create_page(&server, &token, "acme", "alpha", None).await;
    create_page(&server, &token, "acme", "beta", None).await;

    server
        .put(&format!("/rooms/acme/pages/{a}"))
        .authorization_bearer(&token)
        .json(&json!({ "slug": "beta" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    // The failed rename left the original path intact.
    let page: Value = server
        .get(&format!("/rooms/acme/pages/{a}"))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(page["path"], "alpha");
}

#[tokio::test]
async fn test_delete_page_with_children_conflicts() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;

    let parent = create_page(&server, &token, "acme", "parent", None).await;
    create_page(&server, &token, "acme", "child", Some("parent")).await;

    server
        .delete(&format!("/rooms/acme/pages/{parent}"))
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_page_tree_nesting() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;

    create_page(&server, &token, "acme", "guide", None).await;
    create_page(&server, &token, "acme", "setup", Some("guide")).await;
    create_page(&server, &token, "acme", "intro", None).await;

    let tree: Value = server
        .get("/rooms/acme/pages/tree")
        .authorization_bearer(&token)
        .await
        .json();
    let roots = tree.as_array().unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0]["slug"], "guide");
    assert_eq!(roots[0]["children"][0]["slug"], "setup");
    assert_eq!(roots[1]["slug"], "intro");
}

#[tokio::test]
async fn test_update_creates_version_snapshot() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;
    let id = create_page(&server, &token, "acme", "doc", None).await;

    server
        .put(&format!("/rooms/acme/pages/{id}"))
        .authorization_bearer(&token)
        .json(&json!({ "content": { "text": "revised" } }))
        .await
        .assert_status_ok();

    let versions: Value = server
        .get(&format!("/rooms/acme/pages/{id}/versions"))
        .authorization_bearer(&token)
        .await
        .json();
    let versions = versions.as_array().unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0]["content"]["text"], "content of doc");

    let live: Value = server
        .get(&format!("/rooms/acme/pages/{id}"))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(live["content"]["text"], "revised");
}

// ---- search ----

#[tokio::test]
async fn test_search_ranking_order() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;

    server
        .post("/rooms/acme/pages")
        .authorization_bearer(&token)
        .json(&json!({
            "title": "setup",
            "slug": "exact",
            "content": { "text": "irrelevant" },
        }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/rooms/acme/pages")
        .authorization_bearer(&token)
        .json(&json!({
            "title": "notes on setup",
            "slug": "partial",
            "content": { "text": "nothing" },
        }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/rooms/acme/pages")
        .authorization_bearer(&token)
        .json(&json!({
            "title": "other",
            "slug": "content_only",
            "content": { "text": "all about setup steps" },
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let hits: Value = server
        .get("/rooms/acme/search")
        .add_query_param("q", "setup")
        .authorization_bearer(&token)
        .await
        .json();
    let slugs: Vec<&str> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["exact", "partial", "content_only"]);
    assert!(
        hits[2]["excerpt"]
            .as_str()
            .unwrap()
            .contains("<mark>setup</mark>")
    );
}

// ---- shared links ----

#[tokio::test]
async fn test_shared_link_round_trip() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;
    let id = create_page(&server, &token, "acme", "doc", None).await;

    let res = server
        .post(&format!("/rooms/acme/pages/{id}/share"))
        .authorization_bearer(&token)
        .json(&json!({}))
        .await;
    res.assert_status(StatusCode::CREATED);
    let link_token = res.json::<Value>()["token"].as_str().unwrap().to_string();

    // Anonymous access through the token.
    let res = server.get(&format!("/shared/{link_token}")).await;
    res.assert_status_ok();
    assert_eq!(res.json::<Value>()["page"]["id"], id);
}

#[tokio::test]
async fn test_viewer_can_issue_shared_link() {
    let server = setup().await;
    let (_, owner) = create_user(&server, "owner").await;
    let (viewer_id, viewer) = create_user(&server, "viewer").await;
    create_room(&server, &owner, "acme").await;
    grant(&server, viewer_id, "acme", "Viewer").await;
    let id = create_page(&server, &owner, "acme", "doc", None).await;

    // Anyone who can read the page can share it.
    server
        .post(&format!("/rooms/acme/pages/{id}/share"))
        .authorization_bearer(&viewer)
        .json(&json!({}))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_expired_link_gone_unknown_not_found() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;
    let id = create_page(&server, &token, "acme", "doc", None).await;

    let res = server
        .post(&format!("/rooms/acme/pages/{id}/share"))
        .authorization_bearer(&token)
        .json(&json!({ "expires_in_days": -1 }))
        .await;
    let expired = res.json::<Value>()["token"].as_str().unwrap().to_string();

    server
        .get(&format!("/shared/{expired}"))
        .await
        .assert_status(StatusCode::GONE);
    server
        .get("/shared/never-issued")
        .await
        .assert_status_not_found();
}

// ---- public rooms ----

#[tokio::test]
async fn test_public_room_views() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;
    let id = create_page(&server, &token, "acme", "welcome", None).await;

    let res = server
        .post("/rooms/acme/toggle-public")
        .authorization_bearer(&token)
        .await;
    res.assert_status_ok();
    let slug = res.json::<Value>()["public_slug"]
        .as_str()
        .unwrap()
        .to_string();

    server.get(&format!("/public/{slug}")).await.assert_status_ok();

    let tree: Value = server.get(&format!("/public/{slug}/pages")).await.json();
    assert_eq!(tree.as_array().unwrap().len(), 1);

    let page: Value = server
        .get(&format!("/public/{slug}/pages/{id}"))
        .await
        .json();
    assert_eq!(page["slug"], "welcome");
}

#[tokio::test]
async fn test_toggle_public_rotates_slug() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;
    create_room(&server, &token, "acme").await;

    let first = server
        .post("/rooms/acme/toggle-public")
        .authorization_bearer(&token)
        .await
        .json::<Value>()["public_slug"]
        .as_str()
        .unwrap()
        .to_string();

    // Off: the old slug is dead.
    let off: Value = server
        .post("/rooms/acme/toggle-public")
        .authorization_bearer(&token)
        .await
        .json();
    assert!(off["public_slug"].is_null());
    server
        .get(&format!("/public/{first}"))
        .await
        .assert_status_not_found();

    // On again: a fresh slug, never the old one.
    let second = server
        .post("/rooms/acme/toggle-public")
        .authorization_bearer(&token)
        .await
        .json::<Value>()["public_slug"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(first, second);
    server
        .get(&format!("/public/{first}"))
        .await
        .assert_status_not_found();
    server
        .get(&format!("/public/{second}"))
        .await
        .assert_status_ok();
}

// ---- user administration ----

#[tokio::test]
async fn test_user_admin_requires_superuser() {
    let server = setup().await;
    let (_, token) = create_user(&server, "ada").await;

    server
        .get("/users")
        .authorization_bearer(&token)
        .await
        .assert_status_forbidden();
    server
        .post("/users")
        .authorization_bearer(&token)
        .json(&json!({ "username": "eve" }))
        .await
        .assert_status_forbidden();
}

#[tokio::test]
async fn test_membership_replacement_is_wholesale() {
    let server = setup().await;
    let (_, owner) = create_user(&server, "owner").await;
    let (id, member) = create_user(&server, "member").await;
    create_room(&server, &owner, "acme").await;
    create_room(&server, &owner, "globex").await;

    grant(&server, id, "acme", "Editor").await;
    // Replacing with a globex grant drops the acme one.
    grant(&server, id, "globex", "Viewer").await;

    server
        .get("/rooms/acme/pages")
        .authorization_bearer(&member)
        .await
        .assert_status_forbidden();
    server
        .get("/rooms/globex/pages")
        .authorization_bearer(&member)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_all_rooms_sentinel_membership() {
    let server = setup().await;
    let (_, owner) = create_user(&server, "owner").await;
    let (id, roamer) = create_user(&server, "roamer").await;
    create_room(&server, &owner, "acme").await;
    create_room(&server, &owner, "globex").await;
    grant(&server, id, "__all__", "Viewer").await;

    server
        .get("/rooms/acme/pages")
        .authorization_bearer(&roamer)
        .await
        .assert_status_ok();
    let rooms: Value = server.get("/rooms").authorization_bearer(&roamer).await.json();
    assert_eq!(rooms.as_array().unwrap().len(), 2);
}

// ---- feedback ----

#[tokio::test]
async fn test_feedback_flow() {
    let server = setup().await;
    let (_, owner) = create_user(&server, "owner").await;
    create_room(&server, &owner, "acme").await;

    // Submission needs no authentication.
    server
        .post("/feedback")
        .json(&json!({
            "room_name": "acme",
            "message": "great docs",
            "author_name": "visitor",
        }))
        .await
        .assert_status(StatusCode::CREATED);

    // Reading requires Admin in the room; the owner qualifies.
    let list: Value = server
        .get("/feedback/acme")
        .authorization_bearer(&owner)
        .await
        .json();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["message"], "great docs");

    let count: Value = server
        .get("/feedback/acme/count")
        .authorization_bearer(&owner)
        .await
        .json();
    assert_eq!(count["count"], 1);

    server
        .post("/feedback")
        .json(&json!({ "room_name": "acme", "message": "   " }))
        .await
        .assert_status_bad_request();
}
