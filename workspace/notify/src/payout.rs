//! Payout records and the per-account aggregation step.

use common::Currency;
use model::entities::payment;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

use crate::error::{NotifyError, Result};

/// One executed payout as the notifier sees it. Produced by the
/// payment-execution flow, either directly or from recorded payment rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutRecord {
    pub account_id: i32,
    pub amount: Decimal,
    pub currency: Currency,
}

impl TryFrom<&payment::Model> for PayoutRecord {
    type Error = NotifyError;

    fn try_from(payment: &payment::Model) -> Result<Self> {
        let currency = payment
            .currency
            .parse::<Currency>()
            .map_err(|e| NotifyError::Payout(e.to_string()))?;

        Ok(Self {
            account_id: payment.account_id,
            amount: payment.amount,
            currency,
        })
    }
}

/// Running payout sum for one account within a single notification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountPayoutTotal {
    pub total: Decimal,
    pub currency: Currency,
}

/// Sums all payout amounts per account across the batch.
///
/// The batch model assumes one currency per account; should a mixed batch
/// slip through, the first currency seen wins and the amounts are still
/// summed (a warning is logged).
pub fn sum_payouts_by_account(payouts: &[PayoutRecord]) -> HashMap<i32, AccountPayoutTotal> {
    let mut totals: HashMap<i32, AccountPayoutTotal> = HashMap::new();

    for payout in payouts {
        totals
            .entry(payout.account_id)
            .and_modify(|entry| {
                if entry.currency != payout.currency {
                    warn!(
                        account_id = payout.account_id,
                        expected = %entry.currency,
                        got = %payout.currency,
                        "mixed-currency payout batch for one account"
                    );
                }
                entry.total += payout.amount;
            })
            .or_insert(AccountPayoutTotal {
                total: payout.amount,
                currency: payout.currency,
            });
    }

    totals
}
