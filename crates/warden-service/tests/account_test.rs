//! Account flows against in-memory doubles and mocked seams.

mod common;

use argon2::Params;
use async_trait::async_trait;
use common::{identity, Harness};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use warden_config::SecurityConfig;
use warden_core::{IdentityId, SubjectId, WardenError, WardenResult};
use warden_security::{CredentialHasher, PasswordHasher, SessionClaims, TokenError, TokenProvider, TokenVerifier};
use warden_service::{
    AccountService, ActivateRequest, AdminAllowList, ForgotPasswordRequest, IdentityResolver, InvalidationPolicy,
    LoginRequest, Mailer, OutboundEmail, ResolutionOrigin, SessionAuthenticator,
};

mock! {
    pub Outbox {}

    #[async_trait]
    impl Mailer for Outbox {
        async fn send(&self, email: OutboundEmail) -> WardenResult<String>;
    }
}

mock! {
    pub SessionVerifier {}

    impl TokenVerifier for SessionVerifier {
        fn verify_session(&self, token: &str) -> Result<SessionClaims, TokenError>;
    }
}

const PASSWORD: &str = "Corr3ct!Horse";

struct Accounts {
    harness: Harness,
    service: AccountService,
    tokens: Arc<TokenProvider>,
    hasher: Arc<PasswordHasher>,
}

fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_params(Params::new(1024, 1, 1, None).unwrap())
}

fn accounts_with(mailer: MockOutbox, verifier: Option<MockSessionVerifier>) -> Accounts {
    let harness = Harness::new();
    let tokens = Arc::new(TokenProvider::new(&SecurityConfig::default()));
    let hasher = Arc::new(fast_hasher());

    let resolver = Arc::new(IdentityResolver::new(
        Arc::clone(&harness.cache),
        harness.repository.clone(),
        AdminAllowList::default(),
    ));
    let verifier: Arc<dyn TokenVerifier> = match verifier {
        Some(mock) => Arc::new(mock),
        None => tokens.clone(),
    };

    let service = AccountService::new(
        harness.repository.clone(),
        hasher.clone(),
        Arc::clone(&tokens),
        Arc::new(mailer),
        InvalidationPolicy::new(Arc::clone(&harness.cache)),
        SessionAuthenticator::new(verifier, resolver),
        "http://localhost:3000/",
    );

    Accounts {
        harness,
        service,
        tokens,
        hasher,
    }
}

fn accounts() -> Accounts {
    let mut mailer = MockOutbox::new();
    mailer.expect_send().never();
    accounts_with(mailer, None)
}

fn capturing_mailer(result: WardenResult<String>) -> (MockOutbox, mpsc::UnboundedReceiver<OutboundEmail>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut mailer = MockOutbox::new();
    let mut result = Some(result);
    mailer.expect_send().times(1).returning(move |email| {
        let _ = tx.send(email);
        result.take().unwrap_or_else(|| Ok("duplicate".to_string()))
    });
    (mailer, rx)
}

async fn next_email(rx: &mut mpsc::UnboundedReceiver<OutboundEmail>) -> OutboundEmail {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("email dispatched")
        .expect("channel open")
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

impl Accounts {
    fn insert(&self, id: i64, active: bool, deleted: bool, password: &str) {
        let mut record = identity(id, active);
        record.deleted = deleted;
        let digest = self.hasher.hash(password).unwrap();
        self.harness.repository.insert(record, Some(&digest));
    }
}

// ============ login ============

#[tokio::test]
async fn test_login_issues_session_token() {
    let accounts = accounts();
    accounts.insert(1, true, false, PASSWORD);

    let response = accounts
        .service
        .login(login("  USER1@Example.com ", PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.identity.id, IdentityId::new(1));
    let claims = accounts.tokens.verify_session(&response.access_token).unwrap();
    assert_eq!(claims.id, SubjectId::Numeric(1));

    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("accessToken").is_some());
    assert!(json["identity"].get("password").is_none());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let accounts = accounts();
    accounts.insert(1, true, false, PASSWORD);
    accounts.insert(2, true, true, PASSWORD);

    for request in [
        login("user1@example.com", "wrong"),
        login("nobody@example.com", PASSWORD),
        login("user2@example.com", PASSWORD),
    ] {
        let err = accounts.service.login(request).await.unwrap_err();
        assert!(matches!(err, WardenError::InvalidCredentials));
        assert_eq!(err.to_string(), "Incorrect Email or Password");
    }
}

#[tokio::test]
async fn test_login_refuses_inactive_identity() {
    let accounts = accounts();
    accounts.insert(3, false, false, PASSWORD);

    let err = accounts
        .service
        .login(login("user3@example.com", PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unauthenticated: Cannot log into inactive user. Please activate your account first."
    );
}

#[tokio::test]
async fn test_login_validates_request() {
    let accounts = accounts();
    let err = accounts.service.login(login("", "")).await.unwrap_err();
    assert!(matches!(err, WardenError::Validation(_)));
}

// ============ forgot password / activate ============

#[tokio::test]
async fn test_forgot_password_for_unknown_email_is_silent() {
    let accounts = accounts();

    accounts
        .service
        .forgot_password(ForgotPasswordRequest {
            email: "ghost@example.com".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reset_then_activate_round_trip() {
    let (mailer, mut outbox) = capturing_mailer(Ok("msg-1".into()));
    let accounts = accounts_with(mailer, None);
    let id = IdentityId::new(4);
    accounts.insert(4, true, false, PASSWORD);
    accounts.harness.resolver.resolve(id).await.unwrap();

    accounts
        .service
        .forgot_password(ForgotPasswordRequest {
            email: "USER4@example.com".into(),
        })
        .await
        .unwrap();

    let stored = accounts.harness.repository.get(id).unwrap();
    assert!(!stored.active);
    let cached = accounts.harness.cached(4).await.expect("refreshed after reset");
    assert_eq!(cached.value["active"], false);

    let email = next_email(&mut outbox).await;
    assert_eq!(email.to, "user4@example.com");
    let (_, token) = email
        .body
        .split_once("http://localhost:3000/activate/")
        .expect("activation url");
    let token = token.trim().to_string();

    let err = accounts
        .service
        .login(login("user4@example.com", PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::Unauthenticated(_)));

    let activated = accounts
        .service
        .activate(ActivateRequest {
            activation_token: token.clone(),
            new_password: "N3w!Password".into(),
        })
        .await
        .unwrap();
    assert!(activated.active);

    let resolved = accounts.harness.resolver.resolve(id).await.unwrap();
    assert_eq!(resolved.origin, ResolutionOrigin::Cache);
    assert!(resolved.identity.active);

    accounts
        .service
        .login(login("user4@example.com", "N3w!Password"))
        .await
        .unwrap();

    // The token was bound to the temporary password, which is gone now.
    let err = accounts
        .service
        .activate(ActivateRequest {
            activation_token: token,
            new_password: "An0ther!Pass".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::NotFound(_)));
    assert_eq!(err.to_string(), "Activation Token does not belong to an existing user.");
}

#[tokio::test]
async fn test_mailer_failure_does_not_fail_reset() {
    let (mailer, mut outbox) = capturing_mailer(Err(WardenError::ExternalService {
        service: "smtp".into(),
        message: "connection refused".into(),
    }));
    let accounts = accounts_with(mailer, None);
    accounts.insert(5, true, false, PASSWORD);

    accounts
        .service
        .forgot_password(ForgotPasswordRequest {
            email: "user5@example.com".into(),
        })
        .await
        .unwrap();

    next_email(&mut outbox).await;
    assert!(!accounts.harness.repository.get(IdentityId::new(5)).unwrap().active);
}

#[tokio::test]
async fn test_activate_rejects_weak_password() {
    let accounts = accounts();
    let token = accounts.tokens.issue_activation(IdentityId::new(1), "temp").unwrap();

    let err = accounts
        .service
        .activate(ActivateRequest {
            activation_token: token,
            new_password: "weak".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Validation error: New Password is too weak.");
}

#[tokio::test]
async fn test_activate_rejects_token_for_other_password() {
    let accounts = accounts();
    accounts.insert(6, false, false, "temp-password");
    let token = accounts.tokens.issue_activation(IdentityId::new(6), "stale").unwrap();

    let err = accounts
        .service
        .activate(ActivateRequest {
            activation_token: token,
            new_password: "N3w!Password".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::NotFound(_)));
    assert_eq!(err.to_string(), "Activation Token does not belong to an existing user.");
}

#[tokio::test]
async fn test_activate_rejects_token_for_unknown_identity() {
    let accounts = accounts();
    let token = accounts.tokens.issue_activation(IdentityId::new(404), "temp").unwrap();

    let err = accounts
        .service
        .activate(ActivateRequest {
            activation_token: token,
            new_password: "N3w!Password".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
    assert_eq!(err.to_string(), "Activation Token does not belong to an existing user.");
}

#[tokio::test]
async fn test_activate_refuses_active_identity() {
    let accounts = accounts();
    accounts.insert(7, true, false, "temp-password");
    let token = accounts.tokens.issue_activation(IdentityId::new(7), "temp-password").unwrap();

    let err = accounts
        .service
        .activate(ActivateRequest {
            activation_token: token,
            new_password: "N3w!Password".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Business rule violation: User is already active.");
}

#[tokio::test]
async fn test_activate_restores_soft_deleted_identity() {
    let accounts = accounts();
    accounts.insert(8, false, true, "temp-password");
    let token = accounts.tokens.issue_activation(IdentityId::new(8), "temp-password").unwrap();

    let activated = accounts
        .service
        .activate(ActivateRequest {
            activation_token: token,
            new_password: "N3w!Password".into(),
        })
        .await
        .unwrap();
    assert!(activated.active);
    assert!(!activated.deleted);

    let resolved = accounts.harness.resolver.resolve(IdentityId::new(8)).await.unwrap();
    assert!(resolved.identity.active);
}

#[tokio::test]
async fn test_activate_rejects_session_token() {
    let accounts = accounts();
    accounts.insert(9, false, false, "temp-password");
    let session = accounts.tokens.issue_session(IdentityId::new(9)).unwrap();

    let err = accounts
        .service
        .activate(ActivateRequest {
            activation_token: session,
            new_password: "N3w!Password".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, WardenError::TokenInvalid(_)));
}

// ============ authenticate ============

#[tokio::test]
async fn test_authenticate_resolves_bearer_subject() {
    let mut verifier = MockSessionVerifier::new();
    verifier
        .expect_verify_session()
        .withf(|token: &str| token == "abc.def.ghi")
        .times(1)
        .returning(|_| {
            Ok(SessionClaims {
                id: SubjectId::Text("10".into()),
                iat: 0,
                exp: i64::MAX,
            })
        });
    let mut mailer = MockOutbox::new();
    mailer.expect_send().never();
    let accounts = accounts_with(mailer, Some(verifier));
    accounts.insert(10, true, false, PASSWORD);

    let resolved = accounts.service.authenticate(Some("Bearer abc.def.ghi")).await.unwrap();
    assert_eq!(resolved.identity.id, IdentityId::new(10));
}

#[tokio::test]
async fn test_authenticate_requires_bearer_header() {
    let mut verifier = MockSessionVerifier::new();
    verifier.expect_verify_session().never();
    let mut mailer = MockOutbox::new();
    mailer.expect_send().never();
    let accounts = accounts_with(mailer, Some(verifier));

    for header in [None, Some("Basic dXNlcjpwYXNz"), Some("Bearer   ")] {
        let err = accounts.service.authenticate(header).await.unwrap_err();
        assert!(matches!(err, WardenError::MissingToken));
    }
}

#[tokio::test]
async fn test_authenticate_maps_token_errors() {
    let mut verifier = MockSessionVerifier::new();
    verifier
        .expect_verify_session()
        .withf(|token: &str| token == "expired")
        .returning(|_| Err(TokenError::Expired));
    verifier
        .expect_verify_session()
        .withf(|token: &str| token == "forged")
        .returning(|_| Err(TokenError::Invalid("Invalid token signature".into())));
    let mut mailer = MockOutbox::new();
    mailer.expect_send().never();
    let accounts = accounts_with(mailer, Some(verifier));

    let err = accounts.service.authenticate(Some("Bearer expired")).await.unwrap_err();
    assert_eq!(err.to_string(), "Unauthenticated: Your session has expired.");

    let err = accounts.service.authenticate(Some("Bearer forged")).await.unwrap_err();
    assert!(matches!(err, WardenError::TokenInvalid(_)));
}

#[tokio::test]
async fn test_authenticate_with_real_session_token() {
    let accounts = accounts();
    accounts.insert(11, true, false, PASSWORD);

    let token = accounts.tokens.issue_session(IdentityId::new(11)).unwrap();
    let header = format!("Bearer {}", token);

    let first = accounts.service.authenticate(Some(&header)).await.unwrap();
    let second = accounts.service.authenticate(Some(&header)).await.unwrap();
    assert_eq!(first.origin, ResolutionOrigin::Store);
    assert_eq!(second.origin, ResolutionOrigin::Cache);
}
