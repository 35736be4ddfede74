//! SessionManager integration tests: sign-in, sign-out, current user, guard

use chrono::{Duration, Utc};
use tempfile::TempDir;

use feedesk_auth::auth::ParentProfile;
use feedesk_auth::{AuthConfig, AuthError, Database, NewUser, Operation, Role, SessionManager};

fn test_config(dir: &TempDir) -> AuthConfig {
    AuthConfig::new(dir.path().join("feedesk.db"))
        .with_jwt_secret("test-secret-jwt-key-min-32-chars!!")
        .with_password_cost(64, 1, 1)
}

async fn setup(dir: &TempDir) -> SessionManager {
    let config = test_config(dir);
    let db = Database::open(&config).await.unwrap();
    SessionManager::new(db, &config).unwrap()
}

fn new_user(name: &str, email: &str, role: Role, password: &str) -> NewUser {
    NewUser {
        name: name.into(),
        email: email.into(),
        role,
        password: password.into(),
        parent: ParentProfile::default(),
    }
}

#[tokio::test]
async fn test_admin_sign_in_scenario() {
    let dir = TempDir::new().unwrap();
    let manager = setup(&dir).await;
    manager
        .users()
        .create(new_user("Admin", "admin@example.com", Role::Admin, "correct-pw"))
        .await
        .unwrap();

    let signed_in = manager.sign_in("admin@example.com", "correct-pw").await.unwrap();
    assert_eq!(signed_in.user.role, Role::Admin);
    assert_eq!(signed_in.redirect_path, "/admin/dashboard");
    assert_eq!(signed_in.cookie.value(), signed_in.token);

    let wrong = manager.sign_in("admin@example.com", "wrong-pw").await.unwrap_err();
    assert!(matches!(wrong, AuthError::InvalidCredentials));

    let ghost = manager.sign_in("ghost@example.com", "x").await.unwrap_err();
    assert!(matches!(ghost, AuthError::InvalidCredentials));
    assert_eq!(wrong.to_string(), ghost.to_string());

    assert!(manager.current_user(None).await.unwrap().is_none());
    assert!(manager.sign_out(None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_current_user_matches_signed_in_user() {
    let dir = TempDir::new().unwrap();
    let manager = setup(&dir).await;
    let created = manager
        .users()
        .create(new_user("Ayesha", "ayesha@example.com", Role::Accountant, "ledger-42"))
        .await
        .unwrap();

    let signed_in = manager.sign_in("ayesha@example.com", "ledger-42").await.unwrap();
    let user = manager.current_user(Some(&signed_in.token)).await.unwrap().unwrap();

    assert_eq!(user.id, created.id);
    assert_eq!(user.email, "ayesha@example.com");
    assert_eq!(user.role, Role::Accountant);
    assert_eq!(signed_in.redirect_path, "/accountant/dashboard");
}

#[tokio::test]
async fn test_inactive_user_fails_like_unknown_email() {
    let dir = TempDir::new().unwrap();
    let manager = setup(&dir).await;
    let admin = manager
        .users()
        .create(new_user("Admin", "admin@example.com", Role::Admin, "admin-pw"))
        .await
        .unwrap();
    let clerk = manager
        .users()
        .create(new_user("Clerk", "clerk@example.com", Role::SocietyMember, "clerk-pw"))
        .await
        .unwrap();

    manager.users().deactivate(admin.id, clerk.id).await.unwrap();

    let inactive = manager.sign_in("clerk@example.com", "clerk-pw").await.unwrap_err();
    let unknown = manager.sign_in("nobody@example.com", "clerk-pw").await.unwrap_err();
    assert!(matches!(inactive, AuthError::InvalidCredentials));
    assert_eq!(inactive.to_string(), unknown.to_string());
}

#[tokio::test]
async fn test_empty_credentials_rejected() {
    let dir = TempDir::new().unwrap();
    let manager = setup(&dir).await;

    assert!(matches!(
        manager.sign_in("", "pw").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        manager.sign_in("a@example.com", "").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_email_is_case_sensitive() {
    let dir = TempDir::new().unwrap();
    let manager = setup(&dir).await;
    manager
        .users()
        .create(new_user("P", "principal@example.com", Role::Principal, "pw"))
        .await
        .unwrap();

    assert!(manager.sign_in("Principal@Example.com", "pw").await.is_err());
    assert!(manager.sign_in("principal@example.com", "pw").await.is_ok());
}

#[tokio::test]
async fn test_sign_out_revokes_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let manager = setup(&dir).await;
    manager
        .users()
        .create(new_user("Admin", "admin@example.com", Role::Admin, "pw"))
        .await
        .unwrap();
    let signed_in = manager.sign_in("admin@example.com", "pw").await.unwrap();

    let cleared = manager.sign_out(Some(&signed_in.token)).await.unwrap().unwrap();
    assert!(cleared.is_removal());

    // the token still verifies cryptographically, but the session is gone
    assert!(manager.signer().verify(&signed_in.token).is_some());
    assert!(manager.current_user(Some(&signed_in.token)).await.unwrap().is_none());

    // second sign-out with the same token is not an error
    assert!(manager.sign_out(Some(&signed_in.token)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_parallel_sessions_are_independent() {
    let dir = TempDir::new().unwrap();
    let manager = setup(&dir).await;
    let user = manager
        .users()
        .create(new_user("Acc", "acc@example.com", Role::Accountant, "pw"))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        manager.sign_in("acc@example.com", "pw"),
        manager.sign_in("acc@example.com", "pw"),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.token, b.token);
    assert_eq!(manager.sessions().count_for_user(user.id).await.unwrap(), 2);

    manager.sign_out(Some(&a.token)).await.unwrap();
    assert!(manager.current_user(Some(&a.token)).await.unwrap().is_none());
    assert!(manager.current_user(Some(&b.token)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_expired_session_is_absent() {
    let dir = TempDir::new().unwrap();
    let manager = setup(&dir).await;
    let user = manager
        .users()
        .create(new_user("Acc", "acc@example.com", Role::Accountant, "pw"))
        .await
        .unwrap();

    // a row that expired an hour ago, still physically present
    let token = "expired-session-token";
    manager
        .sessions()
        .create(user.id, token, Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(manager.sessions().count_for_user(user.id).await.unwrap(), 1);
    assert!(manager.sessions().find_by_token(token).await.unwrap().is_none());
    assert!(manager.current_user(Some(token)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_role_change_applies_to_existing_session() {
    let dir = TempDir::new().unwrap();
    let manager = setup(&dir).await;
    let user = manager
        .users()
        .create(new_user("Acc", "acc@example.com", Role::Accountant, "pw"))
        .await
        .unwrap();
    let signed_in = manager.sign_in("acc@example.com", "pw").await.unwrap();

    assert!(manager
        .require(Some(&signed_in.token), Operation::IssueFeeVouchers)
        .await
        .is_ok());

    manager
        .users()
        .update(
            user.id,
            feedesk_auth::UserUpdate {
                role: Some(Role::Principal),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // the token claim still says accountant; the store wins
    let err = manager
        .require(Some(&signed_in.token), Operation::IssueFeeVouchers)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden { .. }));
}

#[tokio::test]
async fn test_blank_password_in_update_keeps_current_password() {
    let dir = TempDir::new().unwrap();
    let manager = setup(&dir).await;
    let user = manager
        .users()
        .create(new_user("Acc", "acc@example.com", Role::Accountant, "ledger-42"))
        .await
        .unwrap();

    // the admin edit form always sends the password field, empty when unchanged
    let updated = manager
        .users()
        .update(
            user.id,
            feedesk_auth::UserUpdate {
                name: Some("Renamed".into()),
                email: Some("acc@example.com".into()),
                role: Some(Role::Accountant),
                password: Some(String::new()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");

    assert!(manager.sign_in("acc@example.com", "ledger-42").await.is_ok());
    assert!(manager.sign_in("acc@example.com", "").await.is_err());

    // a password-only blank update changes nothing
    let err = manager
        .users()
        .update(
            user.id,
            feedesk_auth::UserUpdate {
                password: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
}

#[tokio::test]
async fn test_deactivation_revokes_sessions() {
    let dir = TempDir::new().unwrap();
    let manager = setup(&dir).await;
    let admin = manager
        .users()
        .create(new_user("Admin", "admin@example.com", Role::Admin, "pw"))
        .await
        .unwrap();
    let parent = manager
        .users()
        .create(new_user("Parent", "parent@example.com", Role::Parent, "pw"))
        .await
        .unwrap();
    let signed_in = manager.sign_in("parent@example.com", "pw").await.unwrap();
    assert_eq!(signed_in.redirect_path, "/parent/dashboard");

    manager.users().deactivate(admin.id, parent.id).await.unwrap();

    assert!(manager.current_user(Some(&signed_in.token)).await.unwrap().is_none());
    assert_eq!(manager.sessions().count_for_user(parent.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_require_distinguishes_unauthenticated_and_forbidden() {
    let dir = TempDir::new().unwrap();
    let manager = setup(&dir).await;
    manager
        .users()
        .create(new_user("Parent", "parent@example.com", Role::Parent, "pw"))
        .await
        .unwrap();
    let signed_in = manager.sign_in("parent@example.com", "pw").await.unwrap();

    assert!(matches!(
        manager.require(None, Operation::ViewOwnFees).await,
        Err(AuthError::Unauthenticated)
    ));
    assert!(matches!(
        manager.require(Some("garbage"), Operation::ViewOwnFees).await,
        Err(AuthError::Unauthenticated)
    ));
    assert!(matches!(
        manager.require(Some(&signed_in.token), Operation::ManageUsers).await,
        Err(AuthError::Forbidden { .. })
    ));
    let me = manager
        .require(Some(&signed_in.token), Operation::ViewOwnFees)
        .await
        .unwrap();
    assert_eq!(me.email, "parent@example.com");
}

#[tokio::test]
async fn test_cookie_flags_follow_environment() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir).with_production(true);
    let db = Database::open(&config).await.unwrap();
    let manager = SessionManager::new(db, &config).unwrap();
    manager
        .users()
        .create(new_user("Admin", "admin@example.com", Role::Admin, "pw"))
        .await
        .unwrap();

    let signed_in = manager.sign_in("admin@example.com", "pw").await.unwrap();
    let header = signed_in.cookie.to_header_value();
    assert!(header.starts_with("session="));
    assert!(header.contains("HttpOnly"));
    assert!(header.contains("SameSite=Lax"));
    assert!(header.contains("Max-Age=604800"));
    assert!(header.ends_with("; Secure"));
}
