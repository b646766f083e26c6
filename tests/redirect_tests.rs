//! Redirect endpoint tests
//!
//! GET/POST /{short_code} through the full application stack.

mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use chrono::{Duration, Utc};
use linkhub::api::{AppState, build_app};
use linkhub::config::SettingsUpdate;
use linkhub::storage::Role;

use common::{create_user, draft, location, session_cookie, setup, test_config};

#[actix_rt::test]
async fn test_unknown_code_is_404() {
    let env = setup().await;
    let state = AppState::new(env.storage.clone(), env.settings.clone(), &test_config());
    let app = test::init_service(build_app(state)).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/nothing").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_redirect_counts_click() {
    let env = setup().await;
    let alice = create_user(&env.storage, "alice", "pw", 0, Role::User).await;
    env.storage
        .insert_short_url(alice.id, draft("go", "https://example.com/target"))
        .await
        .unwrap();

    let state = AppState::new(env.storage.clone(), env.settings.clone(), &test_config());
    let app = test::init_service(build_app(state)).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/go").to_request()).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&resp), "https://example.com/target");

    let url = env.storage.find_short_url("go", 0).await.unwrap().unwrap();
    assert_eq!(url.clicks, 1);
}

#[actix_rt::test]
async fn test_unknown_host_is_404() {
    let env = setup().await;
    let alice = create_user(&env.storage, "alice", "pw", 0, Role::User).await;
    env.storage
        .insert_short_url(alice.id, draft("go", "https://example.com"))
        .await
        .unwrap();

    let state = AppState::new(env.storage.clone(), env.settings.clone(), &test_config());
    let app = test::init_service(build_app(state)).await;

    let req = TestRequest::get()
        .uri("/go")
        .insert_header(("Host", "unknown.example.org"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_custom_domain_resolution() {
    let env = setup().await;
    let alice = create_user(&env.storage, "alice", "pw", 0, Role::User).await;
    let domain = env.storage.insert_domain("go.example.com", None).await.unwrap();

    env.storage
        .insert_short_url(alice.id, draft("same", "https://base.example.com"))
        .await
        .unwrap();
    let mut custom = draft("same", "https://custom.example.com");
    custom.domain_id = domain.id;
    env.storage.insert_short_url(alice.id, custom).await.unwrap();

    let state = AppState::new(env.storage.clone(), env.settings.clone(), &test_config());
    let app = test::init_service(build_app(state)).await;

    let req = TestRequest::get()
        .uri("/same")
        .insert_header(("Host", "GO.example.com:8080"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&resp), "https://custom.example.com");

    let req = TestRequest::get()
        .uri("/same")
        .insert_header(("Host", "localhost:3000"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "https://base.example.com");
}

#[actix_rt::test]
async fn test_expired_link_is_gone_and_auto_deleted() {
    let env = setup().await;
    let alice = create_user(&env.storage, "alice", "pw", 0, Role::User).await;

    let mut keep = draft("old-keep", "https://example.com");
    keep.expiry_date = Some(Utc::now() - Duration::hours(1));
    env.storage.insert_short_url(alice.id, keep).await.unwrap();

    let mut purge = draft("old-purge", "https://example.com");
    purge.expiry_date = Some(Utc::now() - Duration::hours(1));
    purge.auto_delete = true;
    env.storage.insert_short_url(alice.id, purge).await.unwrap();

    let state = AppState::new(env.storage.clone(), env.settings.clone(), &test_config());
    let app = test::init_service(build_app(state)).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/old-keep").to_request()).await;
    assert_eq!(resp.status(), StatusCode::GONE);
    assert!(env.storage.find_short_url("old-keep", 0).await.unwrap().is_some());

    let resp = test::call_service(&app, TestRequest::get().uri("/old-purge").to_request()).await;
    assert_eq!(resp.status(), StatusCode::GONE);
    assert!(env.storage.find_short_url("old-purge", 0).await.unwrap().is_none());

    // 已删除，之后是 404
    let resp = test::call_service(&app, TestRequest::get().uri("/old-purge").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_passcode_challenge_without_captcha() {
    let env = setup().await;
    let alice = create_user(&env.storage, "alice", "pw", 0, Role::User).await;
    let mut locked = draft("locked", "https://secret.example.com");
    locked.passcode = Some("open-sesame".into());
    env.storage.insert_short_url(alice.id, locked).await.unwrap();

    let state = AppState::new(env.storage.clone(), env.settings.clone(), &test_config());
    let app = test::init_service(build_app(state)).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/locked").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("passcode"));
    assert!(!body.contains("secret.example.com"));

    let wrong = TestRequest::post()
        .uri("/locked")
        .set_form([("passcode", "nope")])
        .to_request();
    let resp = test::call_service(&app, wrong).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Incorrect passcode"));

    let right = TestRequest::post()
        .uri("/locked")
        .set_form([("passcode", "open-sesame")])
        .to_request();
    let resp = test::call_service(&app, right).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&resp), "https://secret.example.com");

    let url = env.storage.find_short_url("locked", 0).await.unwrap().unwrap();
    assert_eq!(url.clicks, 1);
}

#[actix_rt::test]
async fn test_passcode_challenge_requires_session_captcha() {
    let env = setup().await;
    env.settings
        .update(SettingsUpdate {
            captcha_enabled: true,
            ..Default::default()
        })
        .unwrap();
    let alice = create_user(&env.storage, "alice", "pw", 0, Role::User).await;
    let mut locked = draft("locked", "https://secret.example.com");
    locked.passcode = Some("1234".into());
    env.storage.insert_short_url(alice.id, locked).await.unwrap();

    let state = AppState::new(env.storage.clone(), env.settings.clone(), &test_config());
    let sessions = state.sessions.clone();
    let app = test::init_service(build_app(state)).await;

    // 验证页把验证码答案写入会话
    let resp = test::call_service(&app, TestRequest::get().uri("/locked").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp).expect("challenge should start a session");
    assert!(
        sessions
            .load(cookie.value())
            .and_then(|s| s.verify_captcha)
            .is_some()
    );

    // 正确的密码但验证码错误
    let req = TestRequest::post()
        .uri("/locked")
        .cookie(cookie.clone())
        .set_form([("passcode", "1234"), ("captcha", "wrong!")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Incorrect captcha"));

    // 错误后会生成新的验证码
    let answer = sessions
        .load(cookie.value())
        .and_then(|s| s.verify_captcha)
        .expect("captcha answer refreshed");

    let req = TestRequest::post()
        .uri("/locked")
        .cookie(cookie.clone())
        .set_form([("passcode", "1234"), ("captcha", answer.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert!(
        sessions
            .load(cookie.value())
            .and_then(|s| s.verify_captcha)
            .is_none()
    );
}

#[actix_rt::test]
async fn test_reserved_paths_are_not_short_codes() {
    let env = setup().await;
    let state = AppState::new(env.storage.clone(), env.settings.clone(), &test_config());
    let app = test::init_service(build_app(state)).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/static/style.css").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .starts_with("text/css")
    );

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
