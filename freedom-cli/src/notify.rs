use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use freedom_achievements::{
    CelebrationNotifier, CelebrationSummary, LogNotifier, SourceError, SourceResult,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::NotifySection;

pub const RESEND_API_KEY: &str = "RESEND_API_KEY";

/// Celebration emails through the Resend HTTP API.
pub struct ResendNotifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
    to: String,
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
}

impl ResendNotifier {
    pub fn new(section: &NotifySection, api_key: String) -> Result<Self> {
        let Some(to) = section.to.clone() else {
            bail!("[notify] provider = \"resend\" needs a recipient: set `to` in config.toml");
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url: section.base_url.trim_end_matches('/').to_string(),
            api_key,
            from: section.from.clone(),
            to,
        })
    }
}

#[async_trait]
impl CelebrationNotifier for ResendNotifier {
    async fn schedule_milestone_celebration(
        &self,
        user_id: &str,
        summary: &CelebrationSummary,
    ) -> SourceResult<()> {
        let (subject, html) = render_email(user_id, summary);
        let body = EmailRequest {
            from: &self.from,
            to: [self.to.as_str()],
            subject,
            html,
        };

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| SourceError::Invalid(format!("api key: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .client
            .post(format!("{}/emails", self.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(format!("resend request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(SourceError::Unavailable(format!("resend error: {status} {txt}")));
        }
        tracing::debug!(
            user_id,
            achievement = %summary.achievement_id,
            "celebration email accepted"
        );
        Ok(())
    }
}

pub fn render_email(user_id: &str, summary: &CelebrationSummary) -> (String, String) {
    let subject = format!("{} Achievement unlocked: {}", summary.icon, summary.name);
    let html = format!(
        "<h1>{icon} {name}</h1>\
         <p>{description}</p>\
         <p><strong>+{points} points</strong> &middot; {rarity:?}</p>\
         <p>Unlocked {when} for {user_id}. Keep the momentum going.</p>",
        icon = summary.icon,
        name = summary.name,
        description = summary.description,
        points = summary.points,
        rarity = summary.rarity,
        when = summary.unlocked_at.format("%Y-%m-%d %H:%M UTC"),
    );
    (subject, html)
}

/// Pick the notifier named by `[notify] provider`.
pub fn build_notifier(section: &NotifySection) -> Result<Arc<dyn CelebrationNotifier>> {
    match section.provider.as_str() {
        "log" => Ok(Arc::new(LogNotifier)),
        "resend" => {
            let key = std::env::var(RESEND_API_KEY).with_context(|| {
                format!("{RESEND_API_KEY} must be set for provider = \"resend\"")
            })?;
            Ok(Arc::new(ResendNotifier::new(section, key)?))
        }
        other => bail!("unknown notify provider '{other}' (expected \"log\" or \"resend\")"),
    }
}

/// Reports each finished celebration so the process can wait for them
/// before exiting.
pub struct Delivered {
    inner: Arc<dyn CelebrationNotifier>,
    done: mpsc::UnboundedSender<String>,
}

impl Delivered {
    pub fn wrap(
        inner: Arc<dyn CelebrationNotifier>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (done, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { inner, done }), rx)
    }
}

#[async_trait]
impl CelebrationNotifier for Delivered {
    async fn schedule_milestone_celebration(
        &self,
        user_id: &str,
        summary: &CelebrationSummary,
    ) -> SourceResult<()> {
        let result = self.inner.schedule_milestone_celebration(user_id, summary).await;
        let _ = self.done.send(summary.achievement_id.clone());
        result
    }
}

/// Wait until `expected` celebrations finished, or give up after `limit`.
pub async fn wait_for_deliveries(
    rx: &mut mpsc::UnboundedReceiver<String>,
    expected: usize,
    limit: Duration,
) -> usize {
    let mut seen = 0;
    let deadline = tokio::time::Instant::now() + limit;
    while seen < expected {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Some(_)) => seen += 1,
            Ok(None) | Err(_) => break,
        }
    }
    if seen < expected {
        tracing::warn!(seen, expected, "exiting before every celebration finished");
    }
    seen
}
