// notifications/src/sms.rs

use async_trait::async_trait;
use serde::Deserialize;

use crate::{NotifyError, SmsSender};

/// SMS over a Twilio-style messaging HTTP API: a form POST to the account's
/// message endpoint, basic-auth'd with the account credentials. The provider
/// answers with a message `sid`.
pub struct HttpSmsSender {
    http: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

impl HttpSmsSender {
    pub fn new(
        base_url: impl Into<String>,
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
        }
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send(&self, destination_number: &str, message: &str) -> Result<String, NotifyError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.account_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("Body", message),
                ("From", self.from_number.as_str()),
                ("To", destination_number),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected(format!("{}: {}", status, body)));
        }

        let message: MessageResponse = response.json().await?;
        Ok(message.sid)
    }
}
