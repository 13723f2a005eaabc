use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use tracing::{info, warn};

use aid_types::api::{Credentials, LoginRequest, LoginResponse, SignupForm, SignupResponse};

use crate::client::{ApiClient, check, read_json};
use crate::error::ClientError;
use crate::session::Session;

impl ApiClient {
    /// Log in. The bearer token comes back in the `Authorization` response
    /// header; the body carries the user record.
    pub async fn login(&self, credentials: Credentials) -> Result<Session, ClientError> {
        let email = credentials.email.clone();
        let resp = self
            .post("/login")
            .json(&LoginRequest { user: credentials })
            .send()
            .await?;
        let resp = check(resp).await?;

        let token = resp
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(strip_bearer)
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::MissingField("Authorization"))?;

        let body: LoginResponse = read_json(resp).await?;
        if body.status.code != 200 {
            warn!("Login for {} rejected with status code {}", email, body.status.code);
            return Err(ClientError::Rejected(body.status.message.unwrap_or_else(|| {
                "An error occurred while logging in. Please try again.".to_string()
            })));
        }

        let user = body.data.ok_or(ClientError::MissingField("data"))?;
        info!("Logged in as {} (user {})", email, user.user_id);
        Ok(Session { token, user })
    }

    /// Register a new account. Sent as multipart so the photo ID can ride along.
    pub async fn signup(&self, form: SignupForm) -> Result<(), ClientError> {
        if form.password != form.password_confirmation {
            return Err(ClientError::Invalid(
                "Password confirmation does not match".to_string(),
            ));
        }

        let mut multipart = Form::new()
            .text("user[first_name]", form.first_name)
            .text("user[last_name]", form.last_name)
            .text("user[email]", form.email.clone())
            .text("user[password]", form.password)
            .text("user[password_confirmation]", form.password_confirmation);

        if let Some(path) = form.photo {
            let bytes = tokio::fs::read(&path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "photo".to_string());
            multipart = multipart.part("user[photo]", Part::bytes(bytes).file_name(file_name));
        }

        let resp = self.post("/signup").multipart(multipart).send().await?;
        let body: SignupResponse = read_json(check(resp).await?).await?;
        if !body.success {
            return Err(ClientError::Rejected(
                "An error occurred while signing up. Please try again.".to_string(),
            ));
        }

        info!("Registered {}", form.email);
        Ok(())
    }

    pub async fn logout(&self, token: &str) -> Result<(), ClientError> {
        let resp = self.delete("/logout").bearer_auth(token).send().await?;
        check(resp).await?;
        info!("Logged out");
        Ok(())
    }
}

/// The header may or may not carry the scheme prefix.
fn strip_bearer(value: &str) -> String {
    value
        .strip_prefix("Bearer ")
        .unwrap_or(value)
        .trim()
        .to_string()
}
