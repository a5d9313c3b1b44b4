//! Integration tests for the authentication service.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use taskman_auth::config::AuthConfig;
use taskman_auth::service::{AuthService, RegisterInput, UpdateAccountInput};
use taskman_auth::{AuthError, token};
use taskman_core::error::TaskmanResult;
use taskman_core::models::account::{Account, CreateAccount, Role, UpdateAccount};
use taskman_core::repository::AccountRepository;
use taskman_db::SurrealAccountRepository;
use uuid::Uuid;

fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-test-secret".into(),
        token_lifetime_secs: 3600,
        bcrypt_cost: 4,
        min_password_length: 6,
    }
}

async fn setup() -> AuthService<SurrealAccountRepository<Db>> {
    setup_with_store().await.0
}

/// Like [`setup`], plus a second handle on the same store for reading
/// rows back directly.
async fn setup_with_store() -> (
    AuthService<SurrealAccountRepository<Db>>,
    SurrealAccountRepository<Db>,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    taskman_db::run_migrations(&db).await.unwrap();
    let store = SurrealAccountRepository::new(db);
    (AuthService::new(store.clone(), test_config()), store)
}

fn register_input(email: &str, password: &str) -> RegisterInput {
    RegisterInput {
        email: email.into(),
        password: password.into(),
        name: "Alice".into(),
        role: None,
        phone: None,
        location: None,
        bio: None,
    }
}

// -----------------------------------------------------------------------
// Registration
// -----------------------------------------------------------------------

#[tokio::test]
async fn register_defaults_to_member() {
    let svc = setup().await;
    let profile = svc
        .register(register_input("alice@example.com", "secret1"))
        .await
        .unwrap();

    assert_eq!(profile.email, "alice@example.com");
    assert_eq!(profile.role, Role::Member);
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let svc = setup().await;
    svc.register(register_input("dup@example.com", "secret1"))
        .await
        .unwrap();

    let err = svc
        .register(register_input("dup@example.com", "another1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::DuplicateAccount), "{err:?}");
}

#[tokio::test]
async fn register_validates_input() {
    let svc = setup().await;

    let short = svc
        .register(register_input("short@example.com", "12345"))
        .await
        .unwrap_err();
    assert!(matches!(short, AuthError::Validation(_)), "{short:?}");

    let bad_email = svc
        .register(register_input("not-an-email", "secret1"))
        .await
        .unwrap_err();
    assert!(matches!(bad_email, AuthError::Validation(_)), "{bad_email:?}");

    let mut blank_name = register_input("blank@example.com", "secret1");
    blank_name.name = "   ".into();
    let err = svc.register(blank_name).await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)), "{err:?}");
}

#[tokio::test]
async fn email_can_be_reused_after_removal() {
    let svc = setup().await;
    let first = svc
        .register(register_input("reuse@example.com", "secret1"))
        .await
        .unwrap();
    svc.remove_account(first.id).await.unwrap();

    let second = svc
        .register(register_input("reuse@example.com", "secret2"))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);
}

/// Store wrapper whose email pre-check never sees existing rows, so two
/// registrations race straight into the unique index.
struct BlindLookup<R>(R);

impl<R: AccountRepository> AccountRepository for BlindLookup<R> {
    async fn create(&self, input: CreateAccount) -> TaskmanResult<Account> {
        self.0.create(input).await
    }
    async fn find_by_id(&self, id: Uuid) -> TaskmanResult<Option<Account>> {
        self.0.find_by_id(id).await
    }
    async fn find_by_email(&self, _email: &str) -> TaskmanResult<Option<Account>> {
        Ok(None)
    }
    async fn update(&self, id: Uuid, input: UpdateAccount) -> TaskmanResult<Option<Account>> {
        self.0.update(id, input).await
    }
    async fn soft_delete(&self, id: Uuid) -> TaskmanResult<()> {
        self.0.soft_delete(id).await
    }
    async fn list_active(&self) -> TaskmanResult<Vec<Account>> {
        self.0.list_active().await
    }
}

#[tokio::test]
async fn store_index_catches_duplicate_that_slips_past_precheck() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    taskman_db::run_migrations(&db).await.unwrap();
    let svc = AuthService::new(
        BlindLookup(SurrealAccountRepository::new(db)),
        test_config(),
    );

    svc.register(register_input("race@example.com", "secret1"))
        .await
        .unwrap();
    let err = svc
        .register(register_input("race@example.com", "secret1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::DuplicateAccount), "{err:?}");
}

#[tokio::test]
async fn stored_row_holds_a_hash_not_the_password() {
    let (svc, store) = setup_with_store().await;
    svc.register(register_input("hash@example.com", "plain-secret-1"))
        .await
        .unwrap();

    let row = store
        .find_by_email("hash@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(row.password_hash, "plain-secret-1");
    assert!(!row.password_hash.contains("plain-secret-1"));
    assert!(row.password_hash.starts_with("$2"), "{}", row.password_hash);
}

#[tokio::test]
async fn password_beyond_bcrypt_limit_is_rejected() {
    let svc = setup().await;
    let too_long = "a".repeat(73);

    let err = svc
        .register(register_input("long@example.com", &too_long))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)), "{err:?}");

    let profile = svc
        .register(register_input("long@example.com", "secret1"))
        .await
        .unwrap();
    let err = svc
        .update_account(
            profile.id,
            UpdateAccountInput {
                password: Some(too_long),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)), "{err:?}");
}

#[tokio::test]
async fn passwords_sharing_a_72_byte_prefix_do_not_match() {
    let svc = setup().await;
    let stored = "a".repeat(72);
    svc.register(register_input("prefix@example.com", &stored))
        .await
        .unwrap();

    let err = svc
        .authenticate("prefix@example.com", &format!("{stored}totally-different"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials), "{err:?}");

    assert!(svc.authenticate("prefix@example.com", &stored).await.is_ok());
}

// -----------------------------------------------------------------------
// Authentication
// -----------------------------------------------------------------------

#[tokio::test]
async fn authenticate_issues_a_valid_token() {
    let svc = setup().await;
    let profile = svc
        .register(register_input("login@example.com", "secret1"))
        .await
        .unwrap();

    let login = svc
        .authenticate("login@example.com", "secret1")
        .await
        .unwrap();
    assert_eq!(login.account.id, profile.id);
    assert_eq!(login.expires_in, 3600);

    let claims = svc.validate(&login.access_token).await.unwrap();
    assert_eq!(claims.subject_id().unwrap(), profile.id);
    assert_eq!(claims.email, "login@example.com");
    assert_eq!(claims.role, Role::Member);
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let svc = setup().await;
    svc.register(register_input("bob@example.com", "secret1"))
        .await
        .unwrap();

    let wrong = svc
        .authenticate("bob@example.com", "secret2")
        .await
        .unwrap_err();
    let unknown = svc
        .authenticate("nobody@example.com", "secret1")
        .await
        .unwrap_err();

    assert!(matches!(wrong, AuthError::InvalidCredentials));
    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn removed_account_cannot_authenticate() {
    let svc = setup().await;
    let profile = svc
        .register(register_input("gone@example.com", "secret1"))
        .await
        .unwrap();
    svc.remove_account(profile.id).await.unwrap();

    let err = svc
        .authenticate("gone@example.com", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

// -----------------------------------------------------------------------
// Token validation
// -----------------------------------------------------------------------

#[tokio::test]
async fn expired_token_is_rejected() {
    let svc = setup().await;
    let profile = svc
        .register(register_input("old@example.com", "secret1"))
        .await
        .unwrap();

    let issued_at = chrono::Utc::now().timestamp() - 3600;
    let stale = token::issue_session_token_at(
        profile.id,
        &profile.email,
        profile.role,
        svc.config(),
        issued_at,
    )
    .unwrap();

    let err = svc.validate(&stale).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(_)), "{err:?}");
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let svc = setup().await;
    let profile = svc
        .register(register_input("forged@example.com", "secret1"))
        .await
        .unwrap();

    let other = AuthConfig {
        jwt_secret: "someone-else".into(),
        ..test_config()
    };
    let forged =
        token::issue_session_token(profile.id, &profile.email, Role::Admin, &other).unwrap();

    let err = svc.validate(&forged).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(_)), "{err:?}");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let svc = setup().await;
    for token in ["", "abc", "a.b.c"] {
        let err = svc.validate(token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)), "{token}: {err:?}");
    }
}

#[tokio::test]
async fn token_for_removed_account_stops_validating() {
    let svc = setup().await;
    let profile = svc
        .register(register_input("bye@example.com", "secret1"))
        .await
        .unwrap();
    let login = svc.authenticate("bye@example.com", "secret1").await.unwrap();
    assert!(svc.validate(&login.access_token).await.is_ok());

    svc.remove_account(profile.id).await.unwrap();

    let err = svc.validate(&login.access_token).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken(_)), "{err:?}");
}

#[tokio::test]
async fn role_change_invalidates_outstanding_token() {
    let svc = setup().await;
    let profile = svc
        .register(register_input("promote@example.com", "secret1"))
        .await
        .unwrap();
    let login = svc
        .authenticate("promote@example.com", "secret1")
        .await
        .unwrap();

    svc.update_account(
        profile.id,
        UpdateAccountInput {
            role: Some(Role::Admin),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(svc.validate(&login.access_token).await.is_err());

    let fresh = svc
        .authenticate("promote@example.com", "secret1")
        .await
        .unwrap();
    let claims = svc.validate(&fresh.access_token).await.unwrap();
    assert_eq!(claims.role, Role::Admin);
}

// -----------------------------------------------------------------------
// Account maintenance
// -----------------------------------------------------------------------

#[tokio::test]
async fn password_change_takes_effect() {
    let svc = setup().await;
    let profile = svc
        .register(register_input("pw@example.com", "secret1"))
        .await
        .unwrap();

    svc.update_account(
        profile.id,
        UpdateAccountInput {
            password: Some("secret2".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(matches!(
        svc.authenticate("pw@example.com", "secret1").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(svc.authenticate("pw@example.com", "secret2").await.is_ok());
}

#[tokio::test]
async fn update_to_taken_email_is_duplicate() {
    let svc = setup().await;
    svc.register(register_input("first@example.com", "secret1"))
        .await
        .unwrap();
    let second = svc
        .register(register_input("second@example.com", "secret1"))
        .await
        .unwrap();

    let err = svc
        .update_account(
            second.id,
            UpdateAccountInput {
                email: Some("first@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::DuplicateAccount), "{err:?}");
}

#[tokio::test]
async fn profile_fields_update_and_list() {
    let svc = setup().await;
    let profile = svc
        .register(register_input("prof@example.com", "secret1"))
        .await
        .unwrap();

    let updated = svc
        .update_account(
            profile.id,
            UpdateAccountInput {
                name: Some("  Alice Smith ".into()),
                bio: Some(Some("Writes tasks".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice Smith");
    assert_eq!(updated.bio.as_deref(), Some("Writes tasks"));

    let fetched = svc.get_account(profile.id).await.unwrap();
    assert_eq!(fetched.bio.as_deref(), Some("Writes tasks"));

    let all = svc.list_accounts().await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn missing_account_operations_report_not_found() {
    let svc = setup().await;
    let id = Uuid::new_v4();

    assert!(matches!(
        svc.get_account(id).await,
        Err(AuthError::AccountNotFound)
    ));
    assert!(matches!(
        svc.remove_account(id).await,
        Err(AuthError::AccountNotFound)
    ));
    assert!(matches!(
        svc.update_account(id, UpdateAccountInput::default()).await,
        Err(AuthError::AccountNotFound)
    ));
}
