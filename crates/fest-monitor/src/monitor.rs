//! Registration monitor: one check-and-maybe-alert pass, the cron
//! authorization rule, and the periodic background loop.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use fest_core::config::MonitoringConfig;
use fest_core::epoch_secs;
use fest_state::StateStore;

use crate::alert::AlertEmail;
use crate::error::{MailError, MonitorResult};
use crate::mailer::{HttpMailer, Mailer, OutboundEmail};
use crate::stats::{RegistrationStats, StatsView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Sign-ups arrived inside the window.
    Ok,
    AlertSent,
    /// Dry run found a quiet window; a live check would alert.
    AlertDue,
    NotConfigured,
}

/// Outcome of a check, as returned by the cron endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorReport {
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsView>,
    pub alert_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
}

impl MonitorReport {
    pub fn not_configured(missing: &str) -> Self {
        Self {
            status: CheckStatus::NotConfigured,
            message: format!("Monitoring disabled - {missing} not configured"),
            stats: None,
            alert_sent: false,
            email_id: None,
        }
    }
}

/// Result of checking a cron caller's secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronAccess {
    Granted,
    Denied,
    /// No secret is configured, so no caller can be authorized.
    NotConfigured,
}

pub struct RegistrationMonitor {
    store: StateStore,
    config: MonitoringConfig,
    site_name: String,
    mailer: Option<Arc<dyn Mailer>>,
}

impl RegistrationMonitor {
    /// Build a monitor; an [`HttpMailer`] is attached when a mail API key
    /// is configured.
    pub fn new(store: StateStore, config: MonitoringConfig, site_name: impl Into<String>) -> Self {
        let mailer = config
            .mail_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(|key| Arc::new(HttpMailer::new(config.mail_endpoint.clone(), key)) as Arc<dyn Mailer>);
        Self {
            store,
            config,
            site_name: site_name.into(),
            mailer,
        }
    }

    /// Replace the mail transport.
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    /// Name of the first missing piece of alert configuration.
    pub fn missing_config(&self) -> Option<&'static str> {
        if self.mailer.is_none() {
            return Some("mail API key");
        }
        if !self
            .config
            .notification_email
            .as_deref()
            .is_some_and(|to| !to.is_empty())
        {
            return Some("notification email");
        }
        None
    }

    /// Authorize a cron caller presenting `bearer` (the token after
    /// `Bearer `) or a `secret` query parameter.
    pub fn cron_access(&self, bearer: Option<&str>, query_secret: Option<&str>) -> CronAccess {
        let Some(secret) = self.config.cron_secret.as_deref().filter(|s| !s.is_empty()) else {
            return CronAccess::NotConfigured;
        };
        let matches = |candidate: Option<&str>| {
            candidate.is_some_and(|c| bool::from(c.as_bytes().ct_eq(secret.as_bytes())))
        };
        if matches(bearer) || matches(query_secret) {
            CronAccess::Granted
        } else {
            CronAccess::Denied
        }
    }

    pub fn stats(&self, now: u64) -> MonitorResult<RegistrationStats> {
        Ok(RegistrationStats::collect(
            &self.store,
            now,
            self.config.window_hours.max(1),
        )?)
    }

    /// Count recent sign-ups and send an alert if there were none.
    pub async fn check(&self, now: u64) -> MonitorResult<MonitorReport> {
        if let Some(missing) = self.missing_config() {
            debug!(missing, "registration check skipped");
            return Ok(MonitorReport::not_configured(missing));
        }

        let stats = self.stats(now)?;
        info!(
            recent = stats.recent_registrations,
            total = stats.total_registrations,
            window_hours = stats.window_hours,
            "registration check"
        );
        if !stats.is_quiet() {
            return Ok(quiet_free_report(&stats));
        }

        let alert = AlertEmail::compose(&stats, &self.site_name, self.config.dashboard_url.as_deref())?;
        let email = OutboundEmail {
            from: self.config.from_address.clone(),
            to: self.config.notification_email.clone().unwrap_or_default(),
            subject: alert.subject,
            html: alert.html,
        };
        let Some(mailer) = self.mailer.clone() else {
            return Ok(MonitorReport::not_configured("mail API key"));
        };
        let email_id = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| MailError::Transport(e.to_string()))??;

        warn!(%email_id, "no recent registrations, alert email sent");
        Ok(MonitorReport {
            status: CheckStatus::AlertSent,
            message: "Alert email sent".to_string(),
            stats: Some(stats.view()),
            alert_sent: true,
            email_id: Some(email_id),
        })
    }

    /// Report what [`check`](Self::check) would do, without sending mail.
    pub fn dry_run(&self, now: u64) -> MonitorResult<MonitorReport> {
        let stats = self.stats(now)?;
        if !stats.is_quiet() {
            return Ok(quiet_free_report(&stats));
        }
        let (status, message) = match self.missing_config() {
            Some(missing) => (
                CheckStatus::NotConfigured,
                format!("No recent registrations; alerts disabled ({missing} not configured)"),
            ),
            None => (
                CheckStatus::AlertDue,
                "No recent registrations; the next check will send an alert".to_string(),
            ),
        };
        Ok(MonitorReport {
            status,
            message,
            stats: Some(stats.view()),
            alert_sent: false,
            email_id: None,
        })
    }

    /// Run [`check`](Self::check) every `interval_secs` until `shutdown`
    /// changes or its sender is dropped.
    pub fn spawn_periodic(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let interval = Duration::from_secs(self.config.interval_secs.max(1));
        tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "registration monitor started");
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        match self.check(epoch_secs()).await {
                            Ok(report) => {
                                info!(status = ?report.status, alert_sent = report.alert_sent, "{}", report.message);
                            }
                            Err(e) => error!(error = %e, "registration check failed"),
                        }
                    }
                    _ = shutdown.changed() => {
                        debug!("registration monitor shutting down");
                        break;
                    }
                }
            }
        })
    }
}

fn quiet_free_report(stats: &RegistrationStats) -> MonitorReport {
    let window = match stats.window_hours {
        1 => "hour".to_string(),
        h => format!("{h} hours"),
    };
    MonitorReport {
        status: CheckStatus::Ok,
        message: format!(
            "{} registrations in the last {window} - no alert needed",
            stats.recent_registrations
        ),
        stats: Some(stats.view()),
        alert_sent: false,
        email_id: None,
    }
}
