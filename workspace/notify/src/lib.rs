//! Distribution-partner payout notifications.
//!
//! After a disbursement run completes for an opportunity, each partner
//! whose referred investors were paid out gets one summary email. The
//! pipeline is a single stateless pass: resolve accounts, sum payouts per
//! account, group per partner, dispatch all emails concurrently.
//!
//! Notifications must never break the payout flow, so the top-level entry
//! point logs failures and reports them through [`NotificationOutcome`]
//! instead of returning an error.

pub mod directory;
pub mod error;
pub mod mailer;
pub mod partner;
pub mod payout;

pub use directory::{ReferredAccount, find_referred_accounts};
pub use error::{NotifyError, Result};
pub use mailer::{EmailMessage, EmailTemplate, HttpMailer, Mailer, NoopMailer, Recipient};
pub use partner::{PartnerNotification, RelatedAccount, group_by_partner};
pub use payout::{AccountPayoutTotal, PayoutRecord, sum_payouts_by_account};

use futures::future::join_all;
use model::entities::opportunity;
use sea_orm::DatabaseConnection;
use serde_json::json;
use tracing::{debug, error, info, instrument};

/// Fixed subject line of the partner payout summary email.
pub const CLIENT_GOT_PAID_SUBJECT: &str = "Tito klienti mají právě splacené investice";

/// The slice of an opportunity the notification templates need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpportunitySummary {
    pub title: String,
}

impl From<&opportunity::Model> for OpportunitySummary {
    fn from(model: &opportunity::Model) -> Self {
        Self {
            title: model.title.clone(),
        }
    }
}

/// What a notification run amounted to. Callers observe degraded outcomes
/// here; the run itself never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The run went through; individual sends may still have failed or
    /// been skipped for partners without an email address.
    Completed {
        notified: usize,
        skipped_missing_email: usize,
        failed_sends: usize,
    },
    /// The account-directory lookup failed; no emails were attempted.
    LookupFailed,
}

impl NotificationOutcome {
    /// True when anything less than a clean full dispatch happened.
    pub fn is_degraded(&self) -> bool {
        match self {
            NotificationOutcome::Completed { failed_sends, .. } => *failed_sends > 0,
            NotificationOutcome::LookupFailed => true,
        }
    }
}

/// Notifies every relevant distribution partner about their referred
/// investors' payouts from one completed batch.
///
/// Sends run concurrently and each send's failure is isolated: one failing
/// partner email never stops the others. Any failure is logged and folded
/// into the returned outcome; this function does not error out, because a
/// notification problem must not roll back an executed payout.
#[instrument(skip_all, fields(payouts = payouts.len(), opportunity = %opportunity.title))]
pub async fn notify_partners_of_payouts(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    payouts: &[PayoutRecord],
    opportunity: &OpportunitySummary,
) -> NotificationOutcome {
    let account_ids: Vec<i32> = payouts.iter().map(|p| p.account_id).collect();

    let referred = match find_referred_accounts(db, &account_ids).await {
        Ok(referred) => referred,
        Err(e) => {
            error!("account-directory lookup failed: {e}");
            return NotificationOutcome::LookupFailed;
        }
    };

    let totals = sum_payouts_by_account(payouts);
    let notifications = group_by_partner(&referred, &totals);

    let mut to_send: Vec<(&str, &PartnerNotification)> = Vec::new();
    let mut skipped_missing_email = 0usize;
    for notification in &notifications {
        match notification.email() {
            Some(email) => to_send.push((email, notification)),
            None => {
                skipped_missing_email += 1;
                debug!(
                    partner_id = notification.partner_id,
                    "partner has no email address; skipping payout summary"
                );
            }
        }
    }

    let sends = to_send.iter().map(|&(email, notification)| async move {
        let message = EmailMessage {
            to: Recipient {
                email: email.to_string(),
            },
            email_data: payout_summary_data(&opportunity.title, notification),
        };
        mailer
            .send(CLIENT_GOT_PAID_SUBJECT, EmailTemplate::ClientGotPaidNotice, message)
            .await
            .map_err(|e| (notification.partner_id, e))
    });

    let mut notified = 0usize;
    let mut failed_sends = 0usize;
    for result in join_all(sends).await {
        match result {
            Ok(()) => notified += 1,
            Err((partner_id, e)) => {
                failed_sends += 1;
                error!(partner_id, "payout summary email failed: {e}");
            }
        }
    }

    info!(
        notified,
        skipped_missing_email,
        failed_sends,
        "partner payout notification run finished"
    );

    NotificationOutcome::Completed {
        notified,
        skipped_missing_email,
        failed_sends,
    }
}

/// Template data of the "client got paid" notice. Key names are the mail
/// template's contract.
fn payout_summary_data(
    opportunity_title: &str,
    notification: &PartnerNotification,
) -> serde_json::Value {
    let accounts: Vec<serde_json::Value> = notification
        .related_accounts
        .iter()
        .map(|account| {
            json!({
                "userEmail": account.email,
                "payoutAmount": account.formatted_amount,
                "userFullName": account.display_name,
            })
        })
        .collect();

    json!({
        "opportunityTitle": opportunity_title,
        "accountsPayoutData": accounts,
    })
}
