//! Integration tests for the authenticated account endpoints

#[macro_use]
mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::json;

#[actix_web::test]
async fn test_protected_endpoints_require_token() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let (status, body) = call_json!(app, test::TestRequest::get().uri("/api/v1/auth/profile/"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri("/api/v1/auth/profile/"), "not.a.jwt")
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call_json!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/auth/sessions/")
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_update_profile() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let login = signed_in!(app, ctx, "profile@example.com", "profile_user");
    let access = login["access_token"].as_str().unwrap();

    let (status, body) = call_json!(
        app,
        common::bearer(
            test::TestRequest::patch()
                .uri("/api/v1/auth/profile/")
                .set_json(json!({ "first_name": "Beatriz", "company_name": "Sombra Ltda" })),
            access
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Beatriz");
    assert_eq!(body["last_name"], "Souza");
    assert_eq!(body["company_name"], "Sombra Ltda");
    assert_eq!(body["profile"]["language"], "pt-br");
}

#[actix_web::test]
async fn test_profile_preferences_round_trip() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let login = signed_in!(app, ctx, "prefs@example.com", "prefs_user");
    let access = login["access_token"].as_str().unwrap();

    let (status, body) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri("/api/v1/auth/profile/"), access)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["timezone"], "America/Sao_Paulo");
    assert_eq!(body["profile"]["profile_visibility"], "public");
    assert_eq!(body["profile"]["email_notifications"], true);

    let (status, body) = call_json!(
        app,
        common::bearer(
            test::TestRequest::patch().uri("/api/v1/auth/profile/").set_json(json!({
                "profile": {
                    "location": "Recife, PE",
                    "birth_date": "1991-03-04",
                    "language": "es",
                    "push_notifications": false
                }
            })),
            access
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ana");
    assert_eq!(body["profile"]["location"], "Recife, PE");
    assert_eq!(body["profile"]["birth_date"], "1991-03-04");

    let (_, body) = call_json!(
        app,
        common::bearer(
            test::TestRequest::patch()
                .uri("/api/v1/auth/profile/")
                .set_json(json!({ "profile": { "birth_date": null } })),
            access
        )
    );
    assert!(body["profile"]["birth_date"].is_null());
    assert_eq!(body["profile"]["language"], "es");
    assert_eq!(body["profile"]["push_notifications"], false);

    let (status, _) = call_json!(
        app,
        common::bearer(
            test::TestRequest::patch()
                .uri("/api/v1/auth/profile/")
                .set_json(json!({ "profile": { "profile_visibility": "everyone" } })),
            access
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_change_password_revokes_refresh_tokens() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let login = signed_in!(app, ctx, "change@example.com", "change_user");
    let access = login["access_token"].as_str().unwrap();
    let refresh = login["refresh_token"].as_str().unwrap();

    let (status, body) = call_json!(
        app,
        common::bearer(
            common::post_json(
                "/api/v1/auth/password/change/",
                json!({
                    "old_password": "Errada#Senha2024",
                    "new_password": "Nova#Senha2025",
                    "new_password_confirm": "Nova#Senha2025",
                })
            ),
            access
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");

    let (status, _) = call_json!(
        app,
        common::bearer(
            common::post_json(
                "/api/v1/auth/password/change/",
                json!({
                    "old_password": common::PASSWORD,
                    "new_password": "Nova#Senha2025",
                    "new_password_confirm": "Nova#Senha2025",
                })
            ),
            access
        )
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call_json!(
        app,
        common::post_json("/api/v1/auth/token/refresh/", json!({ "refresh_token": refresh }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call_json!(
        app,
        common::post_json(
            "/api/v1/auth/login/",
            json!({ "email": "change@example.com", "password": "Nova#Senha2025" })
        )
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_two_factor_enable_and_login() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let login = signed_in!(app, ctx, "twofa@example.com", "twofa_user");
    let access = login["access_token"].as_str().unwrap();

    // First call emails a confirmation code
    let (status, body) = call_json!(
        app,
        common::bearer(common::post_json("/api/v1/auth/2fa/toggle/", json!({ "enable": true })), access)
    );
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["requires_verification"], true);

    let code = ctx.code_for("twofa@example.com");
    let (status, body) = call_json!(
        app,
        common::bearer(
            common::post_json("/api/v1/auth/2fa/toggle/", json!({ "enable": true, "code": code })),
            access
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_2fa_enabled"], true);

    // Password alone is no longer enough
    let (status, body) = call_json!(
        app,
        common::post_json("/api/v1/auth/login/", common::credentials("twofa@example.com"))
    );
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["requires_2fa"], true);
    assert!(body.get("access_token").is_none());

    let code = ctx.code_for("twofa@example.com");
    let (status, body) = call_json!(
        app,
        common::post_json(
            "/api/v1/auth/login/",
            json!({
                "email": "twofa@example.com",
                "password": common::PASSWORD,
                "verification_code": code,
            })
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_2fa_enabled"], true);
    assert!(body["access_token"].is_string());
}

#[actix_web::test]
async fn test_two_factor_login_rejects_wrong_code() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let login = signed_in!(app, ctx, "wrong2fa@example.com", "wrong2fa");
    let access = login["access_token"].as_str().unwrap();

    let (status, _) = call_json!(
        app,
        common::bearer(common::post_json("/api/v1/auth/2fa/toggle/", json!({ "enable": true })), access)
    );
    assert_eq!(status, StatusCode::ACCEPTED);
    let code = ctx.code_for("wrong2fa@example.com");
    let (status, _) = call_json!(
        app,
        common::bearer(
            common::post_json("/api/v1/auth/2fa/toggle/", json!({ "enable": true, "code": code })),
            access
        )
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call_json!(
        app,
        common::post_json("/api/v1/auth/login/", common::credentials("wrong2fa@example.com"))
    );
    assert_eq!(status, StatusCode::ACCEPTED);

    let code = ctx.code_for("wrong2fa@example.com");
    let bad = if code == "000000" { "111111" } else { "000000" };
    let (status, _) = call_json!(
        app,
        common::post_json(
            "/api/v1/auth/login/",
            json!({
                "email": "wrong2fa@example.com",
                "password": common::PASSWORD,
                "verification_code": bad,
            })
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_disable_two_factor_is_immediate() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let login = signed_in!(app, ctx, "off@example.com", "off_user");
    let access = login["access_token"].as_str().unwrap();

    let (status, body) = call_json!(
        app,
        common::bearer(common::post_json("/api/v1/auth/2fa/toggle/", json!({ "enable": false })), access)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_2fa_enabled"], false);
}

#[actix_web::test]
async fn test_sessions_stats_and_security_log() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let login = signed_in!(app, ctx, "sessions@example.com", "sessions_user");
    let access = login["access_token"].as_str().unwrap().to_string();

    // A failed attempt shows up in the security log
    let (status, _) = call_json!(
        app,
        common::post_json(
            "/api/v1/auth/login/",
            json!({ "email": "sessions@example.com", "password": "Errada#Senha2024" })
        )
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, second) = call_json!(
        app,
        common::post_json("/api/v1/auth/login/", common::credentials("sessions@example.com"))
    );
    assert_eq!(status, StatusCode::OK);
    let second_access = second["access_token"].as_str().unwrap().to_string();

    let (status, sessions) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri("/api/v1/auth/sessions/"), &access)
    );
    assert_eq!(status, StatusCode::OK);
    let sessions = sessions.as_array().unwrap().clone();
    assert_eq!(sessions.len(), 2);
    assert!(sessions.iter().all(|s| s.get("session_key").is_none()));

    let (status, stats) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri("/api/v1/auth/stats/"), &access)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_login_attempts"], 3);
    assert_eq!(stats["is_verified"], true);
    assert_eq!(stats["subscription_plan"], "free");

    let (status, log) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri("/api/v1/auth/security/log/"), &access)
    );
    assert_eq!(status, StatusCode::OK);
    let log = log.as_array().unwrap().clone();
    assert_eq!(log.len(), 3);
    assert_eq!(log.iter().filter(|a| a["success"] == false).count(), 1);

    // Revoke the second session from the first one
    let second_claims = ctx.state.tokens.verify_access_token(&second_access).await.unwrap();
    let (status, _) = call_json!(
        app,
        common::bearer(
            test::TestRequest::delete().uri(&format!("/api/v1/auth/sessions/{}/", second_claims.sid)),
            &access
        )
    );
    assert_eq!(status, StatusCode::OK);

    // the revoked session's access token stops working at once
    let (status, _) = call_json!(
        app,
        common::bearer(
            common::post_json(
                "/api/v1/maps/markers/",
                json!({ "title": "Depois", "latitude": -23.55, "longitude": -46.63 })
            ),
            &second_access
        )
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, remaining) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri("/api/v1/auth/sessions/"), &access)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(remaining.as_array().unwrap().len(), 1);
    assert_ne!(remaining[0]["id"], second_claims.sid.as_str());

    let (status, _) = call_json!(
        app,
        common::bearer(
            test::TestRequest::delete().uri(&format!("/api/v1/auth/sessions/{}/", uuid::Uuid::new_v4())),
            &access
        )
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_account() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let login = signed_in!(app, ctx, "leaving@example.com", "leaving");
    let access = login["access_token"].as_str().unwrap();

    let (status, _) = call_json!(
        app,
        common::bearer(test::TestRequest::delete().uri("/api/v1/auth/delete/"), access)
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri("/api/v1/auth/profile/"), access)
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call_json!(
        app,
        common::bearer(
            common::post_json(
                "/api/v1/maps/markers/",
                json!({ "title": "Fantasma", "latitude": -23.55, "longitude": -46.63 })
            ),
            access
        )
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call_json!(
        app,
        common::post_json("/api/v1/auth/login/", common::credentials("leaving@example.com"))
    );
    assert_ne!(status, StatusCode::OK);

    // The address can be registered again
    let (status, body) = call_json!(
        app,
        common::post_json("/api/v1/auth/email/check/", json!({ "email": "leaving@example.com" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);
}

#[actix_web::test]
async fn test_logout_ends_access_token() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let login = signed_in!(app, ctx, "bye@example.com", "bye_user");
    let access = login["access_token"].as_str().unwrap();

    let (status, _) = call_json!(
        app,
        common::bearer(
            common::post_json(
                "/api/v1/auth/logout/",
                json!({ "refresh_token": login["refresh_token"] })
            ),
            access
        )
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri("/api/v1/maps/markers/"), access)
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
