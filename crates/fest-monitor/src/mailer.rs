//! Outbound mail delivery.
//!
//! [`HttpMailer`] speaks the Resend-style JSON API: a bearer-authenticated
//! `POST` of `{from, to, subject, html}` answered by `{"id": ...}`. The
//! call is blocking, so async callers run it on the blocking pool.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MailError;

/// A message ready for the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Delivers an email and returns the provider's message id.
pub trait Mailer: Send + Sync + 'static {
    fn send(&self, email: &OutboundEmail) -> Result<String, MailError>;
}

#[derive(Deserialize)]
struct SendReceipt {
    #[serde(default)]
    id: String,
}

pub struct HttpMailer {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .timeout_write(Duration::from_secs(15))
            .build();
        Self {
            agent,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

impl Mailer for HttpMailer {
    fn send(&self, email: &OutboundEmail) -> Result<String, MailError> {
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(email);

        match response {
            Ok(resp) => {
                let receipt: SendReceipt = resp
                    .into_json()
                    .map_err(|e| MailError::Decode(e.to_string()))?;
                debug!(id = %receipt.id, to = %email.to, "alert email accepted");
                Ok(receipt.id)
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                warn!(code, "mail provider rejected alert email");
                Err(MailError::Status { code, body })
            }
            Err(ureq::Error::Transport(transport)) => Err(MailError::Transport(transport.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_serializes_as_provider_payload() {
        let email = OutboundEmail {
            from: "Festival <alerts@example.com>".into(),
            to: "ops@example.com".into(),
            subject: "hi".into(),
            html: "<p>hi</p>".into(),
        };
        let json = serde_json::to_value(&email).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "from": "Festival <alerts@example.com>",
                "to": "ops@example.com",
                "subject": "hi",
                "html": "<p>hi</p>",
            })
        );
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_error() {
        let mailer = HttpMailer::new("http://127.0.0.1:1/emails", "key");
        let email = OutboundEmail {
            from: "a@example.com".into(),
            to: "b@example.com".into(),
            subject: "s".into(),
            html: String::new(),
        };
        assert!(matches!(mailer.send(&email), Err(MailError::Transport(_))));
    }
}
