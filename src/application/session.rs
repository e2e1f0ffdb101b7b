// Session - Bearer token shared by every authenticated backend call
use crate::application::ports::{AuthClient, FetchError};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.is_empty())),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn sign_in(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Forget the token. Authenticated fetches fail fast until the next sign-in.
    pub fn clear(&self) {
        let previous = self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            tracing::info!("Session cleared");
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    client: Arc<dyn AuthClient>,
    session: Arc<Session>,
}

impl AuthService {
    pub fn new(client: Arc<dyn AuthClient>, session: Arc<Session>) -> Self {
        Self { client, session }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), FetchError> {
        let token = self.client.login(username, password).await?;
        self.session.sign_in(token);
        tracing::info!("Signed in as {}", username);
        Ok(())
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}
