//! First-party sign-in use cases

use std::sync::Arc;

use listify_common::observability::ErrorLog;
use listify_domain::constants::{CONTEXT_LOGIN, CONTEXT_REGISTRATION, MIN_PASSWORD_LENGTH};
use listify_domain::{AuthResponse, Credentials, ListifyError, Registration, Result, Session};
use tracing::instrument;

use super::ports::AuthApiPort;
use super::store::SessionStore;

/// Login, registration and logout against the Listify backend
pub struct SessionService {
    api: Arc<dyn AuthApiPort>,
    store: Arc<SessionStore>,
    errors: Arc<ErrorLog>,
}

impl SessionService {
    pub fn new(
        api: Arc<dyn AuthApiPort>,
        store: Arc<SessionStore>,
        errors: Arc<ErrorLog>,
    ) -> Self {
        Self { api, store, errors }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Sign in and persist the resulting session
    ///
    /// # Errors
    /// - `ListifyError::InvalidInput` for a malformed email or short password
    ///   (nothing is sent)
    /// - any backend or storage failure, also logged under `Login`
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        validate_email(&credentials.email)?;
        validate_password(&credentials.password)?;

        let result = self.start_session(self.api.login(credentials).await);
        if let Err(err) = &result {
            self.errors.log_error(err, CONTEXT_LOGIN);
        }
        result
    }

    /// Create an account and sign straight in
    ///
    /// # Errors
    /// - `ListifyError::InvalidInput` for an empty name, malformed email or
    ///   short password (nothing is sent)
    /// - any backend or storage failure, also logged under `Registration`
    #[instrument(skip_all, fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<Session> {
        if registration.name.trim().is_empty() {
            return Err(ListifyError::InvalidInput("name is required".to_string()));
        }
        validate_email(&registration.email)?;
        validate_password(&registration.password)?;

        let result = self.start_session(self.api.register(registration).await);
        if let Err(err) = &result {
            self.errors.log_error(err, CONTEXT_REGISTRATION);
        }
        result
    }

    /// End the first-party session
    ///
    /// # Errors
    /// See [`SessionStore::logout`]
    pub fn logout(&self) -> Result<()> {
        self.store.logout()
    }

    fn start_session(&self, response: Result<AuthResponse>) -> Result<Session> {
        let session = Session::from(response?);
        self.store.login(session.clone())?;
        Ok(session)
    }
}

fn validate_email(email: &str) -> Result<()> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(())
    } else {
        Err(ListifyError::InvalidInput(format!("invalid email address: {email}")))
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ListifyError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
