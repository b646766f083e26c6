//! Authentication and account management tests

mod common;

use std::sync::Arc;

use linkhub::errors::AppError;
use linkhub::services::{AuthService, DomainService, ProfileInput, UserInput, UserService};
use linkhub::storage::{AccountStatus, Role};
use linkhub::utils::password::verify_password;

use common::{create_user, current, draft, setup};

#[tokio::test]
async fn test_first_login_bootstraps_superadmin() {
    let env = setup().await;
    let auth = AuthService::new(env.storage.clone());
    assert!(!auth.has_admin().await.unwrap());

    let outcome = auth.login("root", "secret").await.unwrap();
    assert!(outcome.bootstrapped);
    assert_eq!(outcome.admin.role, Role::SuperAdmin);
    assert!(verify_password("secret", &outcome.admin.password).unwrap());

    // 第二次登录走普通校验
    let again = auth.login("root", "secret").await.unwrap();
    assert!(!again.bootstrapped);

    let err = auth.login("someone", "else").await.unwrap_err();
    assert!(matches!(err, AppError::AuthFailed(_)));
    assert_eq!(env.storage.count_admins().await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_first_logins_create_one_superadmin() {
    let env = setup().await;
    let auth = Arc::new(AuthService::new(env.storage.clone()));

    let a = {
        let auth = auth.clone();
        tokio::spawn(async move { auth.login("first", "pw-one").await })
    };
    let b = {
        let auth = auth.clone();
        tokio::spawn(async move { auth.login("second", "pw-two").await })
    };
    let (a, b) = (a.await.unwrap(), b.await.unwrap());

    let bootstrapped = [a, b]
        .into_iter()
        .filter(|r| matches!(r, Ok(outcome) if outcome.bootstrapped))
        .count();
    assert_eq!(bootstrapped, 1);
    assert_eq!(env.storage.count_admins().await.unwrap(), 1);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let env = setup().await;
    create_user(&env.storage, "alice", "right", 0, Role::User).await;
    let auth = AuthService::new(env.storage.clone());

    for (user, pass) in [("alice", "wrong"), ("nobody", "right"), ("", "right"), ("alice", "")] {
        let err = auth.login(user, pass).await.unwrap_err();
        assert!(matches!(err, AppError::AuthFailed(_)), "{user}/{pass}");
    }
    let ok = auth.login("  alice ", "right").await.unwrap();
    assert_eq!(ok.admin.username, "alice");
}

#[tokio::test]
async fn test_disabled_account_refused() {
    let env = setup().await;
    let alice = create_user(&env.storage, "alice", "pw", 0, Role::User).await;
    env.storage
        .set_admin_status(alice.id, AccountStatus::Disabled)
        .await
        .unwrap();

    let auth = AuthService::new(env.storage.clone());
    let err = auth.login("alice", "pw").await.unwrap_err();
    assert!(matches!(err, AppError::AccountDisabled(_)));
}

#[tokio::test]
async fn test_update_profile() {
    let env = setup().await;
    let alice = create_user(&env.storage, "alice", "old", 7, Role::User).await;
    create_user(&env.storage, "bob", "pw", 0, Role::User).await;
    let auth = AuthService::new(env.storage.clone());

    let wrong = ProfileInput {
        current_password: "nope".into(),
        ..Default::default()
    };
    assert!(matches!(
        auth.update_profile(alice.id, wrong).await.unwrap_err(),
        AppError::AuthFailed(_)
    ));

    let mismatch = ProfileInput {
        new_password: Some("new".into()),
        confirm_password: Some("other".into()),
        current_password: "old".into(),
        ..Default::default()
    };
    assert!(matches!(
        auth.update_profile(alice.id, mismatch).await.unwrap_err(),
        AppError::Validation(_)
    ));

    let taken = ProfileInput {
        username: Some("bob".into()),
        current_password: "old".into(),
        ..Default::default()
    };
    assert!(matches!(
        auth.update_profile(alice.id, taken).await.unwrap_err(),
        AppError::Conflict(_)
    ));

    let ok = ProfileInput {
        username: Some("alicia".into()),
        new_password: Some("new".into()),
        confirm_password: Some("new".into()),
        current_password: "old".into(),
    };
    let updated = auth.update_profile(alice.id, ok).await.unwrap();
    assert_eq!(updated.username, "alicia");
    assert_eq!(updated.quota, 7);
    assert_eq!(updated.role, Role::User);
    assert!(auth.login("alicia", "new").await.is_ok());
}

#[tokio::test]
async fn test_reset_password() {
    let env = setup().await;
    create_user(&env.storage, "alice", "old", 0, Role::User).await;
    let auth = AuthService::new(env.storage.clone());

    auth.reset_password("alice", "fresh").await.unwrap();
    assert!(auth.login("alice", "fresh").await.is_ok());

    assert!(matches!(
        auth.reset_password("ghost", "x").await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        auth.reset_password("alice", "").await.unwrap_err(),
        AppError::Validation(_)
    ));
}

#[tokio::test]
async fn test_user_management() {
    let env = setup().await;
    let root = create_user(&env.storage, "root", "pw", 0, Role::SuperAdmin).await;
    let domain = env.storage.insert_domain("go.example.com", None).await.unwrap();
    let users = UserService::new(env.storage.clone());
    let actor = current(&root);

    let missing = UserInput {
        username: "carol".into(),
        ..Default::default()
    };
    assert!(matches!(
        users.add(&actor, missing).await.unwrap_err(),
        AppError::Validation(_)
    ));

    let carol = users
        .add(
            &actor,
            UserInput {
                username: "carol".into(),
                password: Some("pw".into()),
                quota: Some("".into()),
                role: Some("user".into()),
                domain_ids: vec![domain.id],
            },
        )
        .await
        .unwrap();
    assert_eq!(carol.quota, 0);
    assert_eq!(
        env.storage.domain_ids_for_user(carol.id).await.unwrap(),
        vec![domain.id]
    );

    let dup = UserInput {
        username: "carol".into(),
        password: Some("pw".into()),
        ..Default::default()
    };
    assert!(matches!(
        users.add(&actor, dup).await.unwrap_err(),
        AppError::Conflict(_)
    ));

    // 编辑：空密码保留原密码，域名整体替换
    let edited = users
        .edit(
            &actor,
            carol.id,
            UserInput {
                username: "carol".into(),
                password: Some("".into()),
                quota: Some("5".into()),
                role: Some("user".into()),
                domain_ids: vec![],
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.quota, 5);
    assert_eq!(edited.password, carol.password);
    assert!(env.storage.domain_ids_for_user(carol.id).await.unwrap().is_empty());

    let overview = users.overview().await.unwrap();
    assert_eq!(overview.users.len(), 2);
    assert_eq!(overview.domains.len(), 1);
}

#[tokio::test]
async fn test_superadmin_cannot_act_on_self() {
    let env = setup().await;
    let root = create_user(&env.storage, "root", "pw", 0, Role::SuperAdmin).await;
    let users = UserService::new(env.storage.clone());
    let actor = current(&root);

    assert!(matches!(
        users.delete(&actor, root.id).await.unwrap_err(),
        AppError::Forbidden(_)
    ));
    assert!(matches!(
        users.toggle_status(&actor, root.id).await.unwrap_err(),
        AppError::Forbidden(_)
    ));
    let demote = UserInput {
        username: "root".into(),
        role: Some("user".into()),
        ..Default::default()
    };
    assert!(matches!(
        users.edit(&actor, root.id, demote).await.unwrap_err(),
        AppError::Forbidden(_)
    ));
}

#[tokio::test]
async fn test_toggle_and_delete_user() {
    let env = setup().await;
    let root = create_user(&env.storage, "root", "pw", 0, Role::SuperAdmin).await;
    let alice = create_user(&env.storage, "alice", "pw", 0, Role::User).await;
    env.storage
        .insert_short_url(alice.id, draft("alice1", "https://example.com"))
        .await
        .unwrap();
    let users = UserService::new(env.storage.clone());
    let actor = current(&root);

    assert_eq!(
        users.toggle_status(&actor, alice.id).await.unwrap(),
        AccountStatus::Disabled
    );
    assert_eq!(
        users.toggle_status(&actor, alice.id).await.unwrap(),
        AccountStatus::Active
    );

    users.delete(&actor, alice.id).await.unwrap();
    assert!(env.storage.find_short_url("alice1", 0).await.unwrap().is_none());
    assert!(matches!(
        users.delete(&actor, alice.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_domain_management() {
    let env = setup().await;
    let root = create_user(&env.storage, "root", "pw", 0, Role::SuperAdmin).await;
    let domains = DomainService::new(env.storage.clone());
    let actor = current(&root);

    let added = domains.add(&actor, " Go.Example.COM. ").await.unwrap();
    assert_eq!(added.domain_name, "go.example.com");
    assert_eq!(added.added_by_user_id, Some(root.id));

    assert!(matches!(
        domains.add(&actor, "go.example.com").await.unwrap_err(),
        AppError::Conflict(_)
    ));
    for bad in ["", "not a domain", "-bad.example.com", "single"] {
        assert!(matches!(
            domains.add(&actor, bad).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    // 仍被短链接使用时拒绝删除
    let mut on_domain = draft("d", "https://example.com");
    on_domain.domain_id = added.id;
    let url = env.storage.insert_short_url(root.id, on_domain).await.unwrap();
    assert!(matches!(
        domains.delete(&actor, added.id).await.unwrap_err(),
        AppError::Conflict(_)
    ));

    env.storage.delete_short_url(url.id).await.unwrap();
    domains.delete(&actor, added.id).await.unwrap();
    assert!(domains.list().await.unwrap().is_empty());
    assert!(matches!(
        domains.delete(&actor, added.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}
