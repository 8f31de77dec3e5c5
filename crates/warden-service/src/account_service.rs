//! Account flows: login, password reset, activation, and session
//! authentication.

use crate::dto::{ActivateRequest, ForgotPasswordRequest, LoginRequest, LoginResponse};
use crate::invalidation::InvalidationPolicy;
use crate::mailer::{Mailer, OutboundEmail};
use crate::repository::IdentityRepository;
use crate::resolver::ResolvedIdentity;
use crate::session::SessionAuthenticator;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use warden_core::{Email, Identity, IdentityId, IdentityPatch, SoftDelete, ValidateExt, WardenError, WardenResult};
use warden_security::{validate_password_strength, CredentialHasher, TokenProvider};

const INACTIVE_LOGIN_MESSAGE: &str = "Cannot log into inactive user. Please activate your account first.";

/// Account service.
///
/// Every identity mutation goes through the [`InvalidationPolicy`], so the
/// cache never outlives a write made here.
pub struct AccountService {
    repository: Arc<dyn IdentityRepository>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<TokenProvider>,
    mailer: Arc<dyn Mailer>,
    invalidation: InvalidationPolicy,
    session: SessionAuthenticator,
    app_url: String,
}

impl AccountService {
    pub fn new(
        repository: Arc<dyn IdentityRepository>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<TokenProvider>,
        mailer: Arc<dyn Mailer>,
        invalidation: InvalidationPolicy,
        session: SessionAuthenticator,
        app_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            hasher,
            tokens,
            mailer,
            invalidation,
            session,
            app_url: app_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Exchanges an email/password pair for a session token.
    pub async fn login(&self, request: LoginRequest) -> WardenResult<LoginResponse> {
        request.validate_request()?;
        let email = Email::normalize(&request.email);

        let identity = self
            .repository
            .find_by_email(&email, SoftDelete::Exclude)
            .await?
            .ok_or(WardenError::InvalidCredentials)?;

        if !identity.active {
            warn!(identity_id = %identity.id, "Login attempt on inactive identity");
            return Err(WardenError::Unauthenticated(INACTIVE_LOGIN_MESSAGE.to_string()));
        }

        if !self.password_matches(identity.id, &request.password).await? {
            debug!(identity_id = %identity.id, "Login rejected: password mismatch");
            return Err(WardenError::InvalidCredentials);
        }

        let access_token = self.tokens.issue_session(identity.id)?;
        info!(identity_id = %identity.id, "Identity logged in");

        Ok(LoginResponse { identity, access_token })
    }

    /// Starts the reset flow: deactivates the identity behind a temporary
    /// password and mails an activation link.
    ///
    /// Unknown emails succeed silently.
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> WardenResult<()> {
        request.validate_request()?;
        let email = Email::normalize(&request.email);

        let Some(identity) = self.repository.find_by_email(&email, SoftDelete::Include).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(());
        };
        let id = identity.id;

        let temporary_password = Uuid::new_v4().to_string();
        let token = self.tokens.issue_activation(id, &temporary_password)?;
        let activation_url = format!("{}/activate/{}", self.app_url, token);
        let digest = self.hasher.hash(&temporary_password)?;

        let patch = IdentityPatch::new().active(false).password_digest(digest);
        let repository = Arc::clone(&self.repository);
        self.invalidation
            .apply(id, move || async move { repository.update(id, patch).await })
            .await?;

        let message = OutboundEmail {
            to: identity.email.to_string(),
            subject: "Reset your password".to_string(),
            body: format!(
                "A password reset was requested for your account.\n\nActivate it again here: {}\n",
                activation_url
            ),
        };
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            match mailer.send(message).await {
                Ok(message_id) => debug!(identity_id = %id, %message_id, "Activation email sent"),
                Err(e) => error!(identity_id = %id, error = %e, "Activation email failed"),
            }
        });

        info!(identity_id = %id, "Password reset started");
        Ok(())
    }

    /// Completes the reset flow with a new password.
    pub async fn activate(&self, request: ActivateRequest) -> WardenResult<Identity> {
        request.validate_request()?;
        if let Err(rules) = validate_password_strength(&request.new_password) {
            debug!(?rules, "Activation rejected: weak password");
            return Err(WardenError::validation("New Password is too weak."));
        }

        let claims = self.tokens.verify_activation(&request.activation_token)?;
        let id = claims.id.to_identity_id()?;

        let identity = self
            .repository
            .find_by_id(id, SoftDelete::Include)
            .await?
            .ok_or_else(|| activation_owner_missing(id))?;

        if !self.password_matches(id, &claims.password).await? {
            return Err(activation_owner_missing(id));
        }

        if identity.active {
            return Err(WardenError::BusinessRule("User is already active.".to_string()));
        }

        let digest = self.hasher.hash(&request.new_password)?;
        let patch = IdentityPatch::new().active(true).deleted(false).password_digest(digest);
        let repository = Arc::clone(&self.repository);
        let updated = self
            .invalidation
            .apply(id, move || async move { repository.update(id, patch).await })
            .await?;

        info!(identity_id = %id, "Identity activated");
        Ok(updated)
    }

    /// Authenticates a request from its `Authorization` header.
    pub async fn authenticate(&self, authorization: Option<&str>) -> WardenResult<ResolvedIdentity> {
        self.session.authenticate(authorization).await
    }

    async fn password_matches(&self, id: IdentityId, password: &str) -> WardenResult<bool> {
        match self.repository.find_password_digest(id).await? {
            Some(digest) => self.hasher.verify(password, &digest),
            None => Ok(false),
        }
    }
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("app_url", &self.app_url)
            .finish_non_exhaustive()
    }
}

fn activation_owner_missing(id: IdentityId) -> WardenError {
    debug!(identity_id = %id, "Activation token has no matching identity");
    WardenError::NotFound("Activation Token does not belong to an existing user.".to_string())
}
