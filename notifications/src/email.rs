// notifications/src/email.rs

use async_trait::async_trait;
use serde_json::json;

use crate::{EmailSender, NotifyError, EMAIL_SUBJECT};

/// Email through a JSON mail-relay endpoint. The subject is fixed for the
/// whole system.
pub struct HttpEmailSender {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    from_address: String,
}

impl HttpEmailSender {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        from_address: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, recipient: &str, body: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from_address,
                "to": [recipient],
                "subject": EMAIL_SUBJECT,
                "text": body,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected(format!("{}: {}", status, body)));
        }

        Ok(())
    }
}
