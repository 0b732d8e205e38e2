//! Account-directory lookup for the notifier.

use model::entities::account;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::error::Result;

/// An investor account resolved together with its distribution partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferredAccount {
    pub account: account::Model,
    pub partner: account::Model,
}

/// Fetches the accounts from the batch that have a distribution partner,
/// paired with the partner rows.
///
/// Account ids that do not resolve, accounts without a partner reference,
/// and references to partner rows that no longer exist are all dropped
/// silently; the notifier only ever works with what it can resolve.
pub async fn find_referred_accounts(
    db: &DatabaseConnection,
    account_ids: &[i32],
) -> Result<Vec<ReferredAccount>> {
    if account_ids.is_empty() {
        return Ok(Vec::new());
    }

    let distinct_ids: HashSet<i32> = account_ids.iter().copied().collect();

    let accounts = account::Entity::find()
        .filter(account::Column::Id.is_in(distinct_ids))
        .filter(account::Column::DistributionPartnerAccountId.is_not_null())
        .all(db)
        .await?;

    let partner_ids: HashSet<i32> = accounts
        .iter()
        .filter_map(|a| a.distribution_partner_account_id)
        .collect();

    let partners: HashMap<i32, account::Model> = account::Entity::find()
        .filter(account::Column::Id.is_in(partner_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|partner| (partner.id, partner))
        .collect();

    let mut referred = Vec::with_capacity(accounts.len());
    for account in accounts {
        let Some(partner_id) = account.distribution_partner_account_id else {
            continue;
        };
        match partners.get(&partner_id) {
            Some(partner) => referred.push(ReferredAccount {
                partner: partner.clone(),
                account,
            }),
            None => {
                warn!(
                    account_id = account.id,
                    partner_id, "referred account points at a missing partner row"
                );
            }
        }
    }

    Ok(referred)
}
