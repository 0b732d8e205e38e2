//! Grouping of aggregated payouts by distribution partner.
//!
//! This is the pure middle of the pipeline: it takes resolved accounts and
//! per-account totals and produces one notification value per partner,
//! with all amounts already formatted for the Czech partner emails. No I/O
//! happens here, so the grouping is directly unit-testable.

use common::{Amount, Locale, format_amount};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::directory::ReferredAccount;
use crate::payout::AccountPayoutTotal;

/// One investor line in a partner's payout summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedAccount {
    pub account_id: i32,
    /// Investor contact email as stored on the account; may be absent.
    pub email: Option<String>,
    pub display_name: String,
    /// Total payout formatted per Czech locale, e.g. "1 500 Kč".
    pub formatted_amount: String,
    pub amount: Decimal,
}

/// Everything needed to send one partner their payout summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerNotification {
    pub partner_id: i32,
    /// Partners without an email are kept in the grouping but skipped at
    /// dispatch time.
    pub partner_email: Option<String>,
    pub related_accounts: Vec<RelatedAccount>,
}

impl PartnerNotification {
    /// The partner's email address, if one is usable. Empty strings in the
    /// directory count as missing.
    pub fn email(&self) -> Option<&str> {
        self.partner_email.as_deref().filter(|email| !email.is_empty())
    }

    pub fn has_email(&self) -> bool {
        self.email().is_some()
    }
}

/// Builds one notification per distinct partner from the resolved accounts
/// and the per-account totals.
///
/// Accounts with no total in the batch are skipped (they were not paid out
/// in this run). The result is ordered by partner id, and a partner's
/// accounts by the order they were resolved, so repeated runs over the
/// same data produce identical payloads.
pub fn group_by_partner(
    referred: &[ReferredAccount],
    totals: &HashMap<i32, AccountPayoutTotal>,
) -> Vec<PartnerNotification> {
    let mut by_partner: HashMap<i32, PartnerNotification> = HashMap::new();

    for entry in referred {
        let Some(total) = totals.get(&entry.account.id) else {
            continue;
        };

        let notification =
            by_partner
                .entry(entry.partner.id)
                .or_insert_with(|| PartnerNotification {
                    partner_id: entry.partner.id,
                    partner_email: entry.partner.email.clone(),
                    related_accounts: Vec::new(),
                });

        let amount = Amount::new(total.total, total.currency);
        notification.related_accounts.push(RelatedAccount {
            account_id: entry.account.id,
            email: entry.account.email.clone(),
            display_name: entry.account.display_name(),
            formatted_amount: format_amount(&amount, Locale::Cs),
            amount: total.total,
        });
    }

    let mut notifications: Vec<PartnerNotification> = by_partner.into_values().collect();
    notifications.sort_by_key(|n| n.partner_id);
    notifications
}
