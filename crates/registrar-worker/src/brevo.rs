//! Brevo transactional email. The request body is shared; the HTTP call goes through
//! `worker::Fetch` on Workers and `reqwest` elsewhere.

use async_trait::async_trait;
use serde::Serialize;

use crate::config::MailSettings;
use crate::error::NotifyError;
use crate::notify::{LogMailer, Mailer, OutgoingEmail};

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";
const USER_AGENT: &str = "Registrar/0.1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody {
    sender: BrevoEmailAddress,
    to: Vec<BrevoEmailAddress>,
    subject: String,
    text_content: String,
}

impl BrevoSendEmailBody {
    fn new(settings: &MailSettings, email: &OutgoingEmail) -> Self {
        Self {
            sender: BrevoEmailAddress {
                email: settings.sender_email.clone(),
                name: settings.sender_name.clone(),
            },
            to: vec![BrevoEmailAddress {
                email: email.to.clone(),
                name: email.to_name.clone(),
            }],
            subject: email.subject.clone(),
            text_content: email.text.clone(),
        }
    }
}

fn is_success_status(status: u16) -> bool {
    (200..=299).contains(&status)
}

#[derive(Debug, Clone)]
pub struct BrevoMailer {
    settings: MailSettings,
    #[cfg(not(target_arch = "wasm32"))]
    client: reqwest::Client,
}

impl BrevoMailer {
    pub fn new(settings: MailSettings) -> Self {
        Self {
            settings,
            #[cfg(not(target_arch = "wasm32"))]
            client: reqwest::Client::new(),
        }
    }

    /// Posts `json` and returns the status and response body.
    #[cfg(target_arch = "wasm32")]
    async fn post(&self, json: String) -> Result<(u16, String), NotifyError> {
        use worker::{Headers, Method, Request, RequestInit};

        fn transport(e: worker::Error) -> NotifyError {
            NotifyError::Transport(e.to_string())
        }

        let headers = Headers::new();
        headers.set("api-key", &self.settings.api_key).map_err(transport)?;
        headers.set("Content-Type", "application/json").map_err(transport)?;
        headers.set("Accept", "application/json").map_err(transport)?;
        headers.set("User-Agent", USER_AGENT).map_err(transport)?;

        let mut init = RequestInit::new();
        init.with_method(Method::Post);
        init.with_headers(headers);
        init.with_body(Some(json.into()));

        let req = Request::new_with_init(BREVO_SEND_URL, &init).map_err(transport)?;
        let mut resp = worker::Fetch::Request(req).send().await.map_err(transport)?;
        let status = resp.status_code();
        let body = resp.text().await.unwrap_or_default();
        Ok((status, body))
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn post(&self, json: String) -> Result<(u16, String), NotifyError> {
        let resp = self
            .client
            .post(BREVO_SEND_URL)
            .header("api-key", &self.settings.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .body(json)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Ok((status, body))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Mailer for BrevoMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        let body = BrevoSendEmailBody::new(&self.settings, email);
        let json = serde_json::to_string(&body).map_err(|e| {
            NotifyError::Misconfigured(format!("Failed to serialize Brevo payload: {e}"))
        })?;

        let (status, body) = self.post(json).await?;
        if is_success_status(status) {
            return Ok(());
        }
        Err(NotifyError::Rejected { status, body })
    }
}

/// Brevo when configured, otherwise log-only.
#[derive(Debug, Clone)]
pub enum ConfiguredMailer {
    Brevo(BrevoMailer),
    Log(LogMailer),
}

impl ConfiguredMailer {
    pub fn from_settings(settings: Option<MailSettings>) -> Self {
        match settings {
            Some(s) => Self::Brevo(BrevoMailer::new(s)),
            None => Self::Log(LogMailer),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Mailer for ConfiguredMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        match self {
            Self::Brevo(m) => m.send(email).await,
            Self::Log(m) => m.send(email).await,
        }
    }
}
