mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use whiskey_canon::types::Role;

#[tokio::test]
async fn admin_sees_every_owner() -> Result<()> {
    let app = TestApp::new();
    app.import_csv(&app.alice(), "Name,Type,Distillery\nEagle Rare,bourbon,Buffalo Trace\nTalisker 10,scotch,Talisker\n")
        .await?;
    app.post_json(
        "/api/whiskeys",
        &app.bob(),
        &json!({"name": "Yamazaki 12", "type": "japanese", "distillery": "Suntory"}),
    )
    .await?;

    let res = app.get("/api/admin/whiskeys", Some(&app.admin())).await?;
    assert_eq!(res.status, StatusCode::OK);

    let body = res.json()?;
    let owners: Vec<i64> = body["whiskeys"]
        .as_array()
        .map(|all| all.iter().filter_map(|w| w["created_by"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(owners, vec![common::ALICE, common::ALICE, common::BOB]);
    assert_eq!(body["whiskeys"][0]["owner_username"], "alice");
    assert_eq!(body["whiskeys"][0]["owner_role"], "editor");
    assert_eq!(body["whiskeys"][2]["owner_username"], "bob");

    // The admin's own collection is still just their own
    let res = app.get("/api/whiskeys", Some(&app.admin())).await?;
    assert_eq!(res.json()?["whiskeys"], json!([]));
    Ok(())
}

#[tokio::test]
async fn non_admins_are_forbidden() -> Result<()> {
    let app = TestApp::new();

    for token in [app.alice(), app.token(5, "vic", Role::Viewer)] {
        let res = app.get("/api/admin/whiskeys", Some(&token)).await?;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert_eq!(res.json()?["message"], "Admin access required");
    }

    let res = app.get("/api/admin/whiskeys", None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_lists_known_users() -> Result<()> {
    let app = TestApp::new();
    app.get("/api/whiskeys", Some(&app.alice())).await?;
    app.get("/api/whiskeys", Some(&app.bob())).await?;

    let res = app.get("/api/admin/users", Some(&app.admin())).await?;
    assert_eq!(res.status, StatusCode::OK);

    let users = res.json()?["users"].clone();
    let names: Vec<&str> = users
        .as_array()
        .map(|all| all.iter().filter_map(|u| u["username"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["alice", "bob", "root"]);
    assert_eq!(users[0]["role"], "editor");
    Ok(())
}

#[tokio::test]
async fn role_change_applies_to_the_next_request() -> Result<()> {
    let app = TestApp::new();
    let alice = app.alice();
    app.get("/api/whiskeys", Some(&alice)).await?;

    let path = format!("/api/admin/users/{}/role", common::ALICE);
    let res = app.put_json(&path, &app.admin(), &json!({"role": "viewer"})).await?;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json()?;
    assert_eq!(body["message"], "User role updated successfully");
    assert_eq!(body["user"]["role"], "viewer");

    // Same token, stored role wins
    let res = app
        .post_json(
            "/api/whiskeys",
            &alice,
            &json!({"name": "Blanton's", "type": "bourbon", "distillery": "Buffalo Trace"}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.get("/api/auth/whoami", Some(&alice)).await?;
    assert_eq!(res.json()?["user"]["role"], "viewer");
    Ok(())
}

#[tokio::test]
async fn role_changes_are_checked() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin();
    app.get("/api/whiskeys", Some(&app.alice())).await?;

    let path = format!("/api/admin/users/{}/role", common::ALICE);
    let res = app.put_json(&path, &admin, &json!({"role": "owner"})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json()?["message"],
        "Invalid role \"owner\"; expected admin, editor or viewer"
    );

    let own = format!("/api/admin/users/{}/role", common::ADMIN);
    let res = app.put_json(&own, &admin, &json!({"role": "viewer"})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()?["message"], "Cannot change your own role");

    let res = app
        .put_json("/api/admin/users/404/role", &admin, &json!({"role": "editor"}))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()?["message"], "User not found");
    Ok(())
}

#[tokio::test]
async fn admin_edits_a_users_profile() -> Result<()> {
    let app = TestApp::new();
    app.get("/api/whiskeys", Some(&app.bob())).await?;

    let path = format!("/api/admin/users/{}", common::BOB);
    let res = app
        .put_json(&path, &app.admin(), &json!({"email": "bob@example.com", "firstName": "Bob"}))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json()?;
    assert_eq!(body["message"], "User updated successfully");
    assert_eq!(body["user"]["email"], "bob@example.com");
    assert_eq!(body["user"]["first_name"], "Bob");
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_removes_their_collection_and_access() -> Result<()> {
    let app = TestApp::new();
    let bob = app.bob();
    app.import_csv(&bob, "Name,Type,Distillery\nEagle Rare,bourbon,Buffalo Trace\nTalisker 10,scotch,Talisker\n")
        .await?;
    app.import_csv(&app.alice(), "Name,Type,Distillery\nRedbreast 12,irish,Midleton\n")
        .await?;

    let path = format!("/api/admin/users/{}", common::BOB);
    let res = app.delete(&path, &app.admin()).await?;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json()?;
    assert_eq!(body["message"], "User deleted successfully");
    assert_eq!(body["whiskeys_deleted"], 2);
    assert_eq!(app.stored_count().await?, 1);

    let res = app.get("/api/whiskeys", Some(&bob)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()?["message"], "Account has been removed");

    let res = app.delete(&path, &app.admin()).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn admins_cannot_delete_themselves() -> Result<()> {
    let app = TestApp::new();
    let path = format!("/api/admin/users/{}", common::ADMIN);

    let res = app.delete(&path, &app.admin()).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()?["message"], "Cannot delete your own account");
    Ok(())
}

#[tokio::test]
async fn user_management_is_admin_only() -> Result<()> {
    let app = TestApp::new();
    let alice = app.alice();
    let bob_path = format!("/api/admin/users/{}", common::BOB);

    let res = app.get("/api/admin/users", Some(&alice)).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .put_json(&format!("{}/role", bob_path), &alice, &json!({"role": "admin"}))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.delete(&bob_path, &alice).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.json()?["message"], "Admin access required");
    Ok(())
}

#[tokio::test]
async fn users_manage_their_own_profile() -> Result<()> {
    let app = TestApp::new();
    let alice = app.alice();

    let res = app.get("/api/auth/profile", Some(&alice)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json()?;
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], serde_json::Value::Null);

    let res = app
        .put_json(
            "/api/auth/profile",
            &alice,
            &json!({"email": "alice@example.com", "first_name": "Alice", "last_name": "Liddell"}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json()?;
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["last_name"], "Liddell");

    let res = app
        .put_json("/api/auth/profile", &alice, &json!({"email": "alice at example"}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()?["message"], "Invalid email address");

    let res = app.get("/api/auth/profile", Some(&alice)).await?;
    assert_eq!(res.json()?["user"]["email"], "alice@example.com");
    Ok(())
}
