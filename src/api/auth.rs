//! Typed wrappers for the `/auth` surface. Successful calls are the only
//! writers of the session store besides logout and the gateway's 401 path.

use serde::{Deserialize, Serialize};

use super::Gateway;
use crate::error::ClientError;
use crate::session::{Credential, User};

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response of both `/auth/register` and `/auth/login`.
#[derive(Debug, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub user: User,
}

impl From<TokenGrant> for Credential {
    fn from(grant: TokenGrant) -> Self {
        Credential {
            token: grant.access_token,
            user: grant.user,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ProfileUpdate {
    name: String,
}

impl Gateway {
    /// Create an account and attach the granted credential.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Credential, ClientError> {
        let grant: TokenGrant = self.post_json("/auth/register", request).await?;
        let credential = Credential::from(grant);
        self.session().attach(credential.clone())?;
        tracing::info!(email = %credential.user.email, "registered and signed in");
        Ok(credential)
    }

    /// Authenticate and attach the granted credential, overwriting any
    /// prior session.
    pub async fn login(&self, request: &LoginRequest) -> Result<Credential, ClientError> {
        let grant: TokenGrant = self.post_json("/auth/login", request).await?;
        let credential = Credential::from(grant);
        self.session().attach(credential.clone())?;
        tracing::info!(email = %credential.user.email, "signed in");
        Ok(credential)
    }

    pub async fn fetch_profile(&self) -> Result<User, ClientError> {
        self.get_json("/auth/profile").await
    }

    /// Change the profile name and refresh the stored user record, keeping
    /// the token untouched.
    pub async fn update_profile(&self, name: &str) -> Result<User, ClientError> {
        let user: User = self
            .put_json(
                "/auth/profile",
                &ProfileUpdate {
                    name: name.to_string(),
                },
            )
            .await?;
        self.session().update_user(user.clone())?;
        Ok(user)
    }

    /// Local-only: the backend keeps no session state, so logging out just
    /// clears the stored credential. Idempotent.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.session().clear()
    }
}
