use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use crate::config::MailConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}

/// Mail delivery over the provider's HTTP API. The provider applies its own
/// timeouts; we impose none of our own.
pub struct HttpMailer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(cfg: &MailConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            from: cfg.from.clone(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let resp = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await
            .context("mail api request")?;

        let status = resp.status();
        anyhow::ensure!(status.is_success(), "mail api returned {}", status);
        Ok(())
    }
}

pub fn verification_email(base_url: &str, token: &str) -> (String, String) {
    let subject = "Account verification".to_string();
    let html = format!(
        "<strong>To verify your account, please \
         <a href='{}/api/users/verify/{}'>click here</a></strong>",
        base_url, token
    );
    (subject, html)
}

pub fn restore_email(temp_password: &str) -> (String, String) {
    let subject = "Password restore".to_string();
    let html = format!(
        "<p>Your new temporary password: <strong>{}</strong></p>\
         <p>Please change it after logging in.</p>",
        temp_password
    );
    (subject, html)
}
