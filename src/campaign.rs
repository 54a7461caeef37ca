use anyhow::Context;
use futures::future::join_all;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DerivePartialModel, EntityTrait, FromQueryResult, QueryFilter,
};

use entity::waitlist::{self, Entity as Waitlist};

use crate::configuration::{CampaignMode, CampaignSettings};
use crate::domain::{SubscriberEmail, WaitlistStatus};
use crate::email_client::EmailClient;

pub const WELCOME_SUBJECT: &str = "Welcome to SmartRisk Waitlist!";
pub const WELCOME_HTML: &str = include_str!("campaign/welcome.html");

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CampaignSummary {
    pub delivered: usize,
    pub failed: usize,
    /// Entries whose stored email no longer parses.
    pub skipped: usize,
}

impl std::fmt::Display for CampaignSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} delivered, {} failed, {} skipped",
            self.delivered, self.failed, self.skipped
        )
    }
}

/// One-shot welcome campaign: fetch the subscribed set, then send the fixed
/// welcome email to every entry.
///
/// A query failure aborts the run before any send is attempted. A failed
/// send is logged with the offending address and never aborts the run.
/// Delivery outcomes are not written back to the store, so every run
/// re-sends to the full subscribed set.
#[tracing::instrument(
    name = "Run a welcome campaign",
    skip(conn, email_client, settings),
    fields(mode = %settings.mode)
)]
pub async fn run(
    conn: &DatabaseConnection,
    email_client: &EmailClient,
    settings: &CampaignSettings,
) -> Result<CampaignSummary, anyhow::Error> {
    let entries = get_subscribed_waitlist(conn)
        .await
        .context("Failed to fetch the subscribed waitlist")?;
    tracing::info!("Found {} subscribed waitlist entries", entries.len());
    if entries.is_empty() {
        return Ok(CampaignSummary::default());
    }

    let mut recipients = Vec::with_capacity(entries.len());
    let mut skipped = 0;
    for entry in entries {
        match entry {
            Ok(email) => recipients.push(email),
            Err(error) => {
                tracing::warn!(
                    error.cause_chain = ?error,
                    "Skipping a waitlist entry. The stored email is invalid",
                );
                skipped += 1;
            }
        }
    }

    let mut summary = dispatch(email_client, &recipients, settings).await;
    summary.skipped = skipped;
    Ok(summary)
}

/// Send the welcome email to the working set in chunks of
/// `settings.chunk()`, pausing between chunks to stay under the email
/// API's rate limit. Sends within a chunk run concurrently and the next
/// chunk starts only once every send in the current one has settled.
#[tracing::instrument(name = "Dispatch campaign emails", skip(email_client, recipients, settings))]
async fn dispatch(
    email_client: &EmailClient,
    recipients: &[SubscriberEmail],
    settings: &CampaignSettings,
) -> CampaignSummary {
    let working_set = match settings.mode {
        CampaignMode::Test => &recipients[..recipients.len().min(1)],
        CampaignMode::Production => recipients,
    };

    let mut summary = CampaignSummary::default();
    let chunks: Vec<_> = working_set.chunks(settings.chunk()).collect();
    let last = chunks.len().saturating_sub(1);
    for (index, chunk) in chunks.iter().enumerate() {
        let outcomes = join_all(chunk.iter().map(|recipient| async move {
            email_client
                .send_email(recipient, WELCOME_SUBJECT, WELCOME_HTML)
                .await
                .map(|()| recipient)
                .map_err(|error| (recipient, error))
        }))
        .await;
        for outcome in outcomes {
            match outcome {
                Ok(recipient) => {
                    tracing::info!("Sent welcome email to {}", recipient);
                    summary.delivered += 1;
                }
                Err((recipient, error)) => {
                    tracing::error!(
                        error.cause_chain = ?error,
                        "Failed to send welcome email to {}", recipient,
                    );
                    summary.failed += 1;
                }
            }
        }
        if index < last {
            tokio::time::sleep(settings.pause()).await;
        }
    }
    summary
}

#[tracing::instrument(name = "Get subscribed waitlist entries", skip(conn))]
pub async fn get_subscribed_waitlist(
    conn: &DatabaseConnection,
) -> Result<Vec<Result<SubscriberEmail, anyhow::Error>>, anyhow::Error> {
    #[derive(DerivePartialModel, FromQueryResult, Debug)]
    #[sea_orm(entity = "Waitlist")]
    struct Row {
        email: String,
    }

    Ok(Waitlist::find()
        .filter(waitlist::Column::Status.eq(WaitlistStatus::Subscribed.as_ref()))
        .into_partial_model::<Row>()
        .all(conn)
        .await?
        .into_iter()
        .map(|r| match SubscriberEmail::parse(r.email) {
            Ok(email) => Ok(email),
            Err(error) => Err(anyhow::anyhow!(error)),
        })
        .collect())
}
