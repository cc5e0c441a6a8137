use common::{LoginRequest, UserIdentity};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;
use crate::request::{RequestClient, RequestOptions};

/// Cookie carrying the session token issued at login.
const TOKEN_COOKIE: &str = "token";

/// Sign in and install the identity in the session.
pub async fn login(
    client: &RequestClient,
    account: &str,
    password: &str,
) -> Result<UserIdentity, ClientError> {
    let request = LoginRequest {
        account: account.to_string(),
        password: password.to_string(),
    };
    let reply = client
        .send::<UserIdentity>(
            Method::POST,
            "users/login",
            RequestOptions::new().json(&request)?,
        )
        .await?;

    let token = reply
        .cookies
        .into_iter()
        .find(|(name, value)| name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value);
    let user = reply
        .envelope
        .into_data()
        .ok_or_else(|| ClientError::EmptyPayload {
            path: "users/login".into(),
        })?;
    client.session().set(user.clone(), token);
    Ok(user)
}

/// Sign out. The local session is cleared even if the backend call fails.
pub async fn logout(client: &RequestClient) {
    client.session().clear();
    if let Err(e) = client
        .post::<Value>("users/logout", RequestOptions::new().ignore_unauthorized())
        .await
    {
        debug!(error = %e, "Logout request failed");
    }
}

/// Refresh the session identity from the backend.
///
/// Runs with `ignore_unauthorized`, so an anonymous caller gets `Ok(None)`
/// without being sent to the login page.
pub async fn profile(client: &RequestClient) -> Result<Option<UserIdentity>, ClientError> {
    match client
        .get::<UserIdentity>("users/profile", RequestOptions::new().ignore_unauthorized())
        .await
    {
        Ok(envelope) => {
            let user = envelope.into_data();
            if let Some(user) = &user {
                client.session().set_user(user.clone());
            }
            Ok(user)
        }
        Err(ClientError::Unauthorized(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
