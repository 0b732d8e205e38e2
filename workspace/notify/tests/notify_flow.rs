//! End-to-end tests of the partner notification pipeline against an
//! in-memory SQLite database, with a recording mailer in place of the
//! real mail API.

use async_trait::async_trait;
use common::Currency;
use migration::{Migrator, MigratorTrait};
use model::entities::account;
use notify::{
    CLIENT_GOT_PAID_SUBJECT, EmailMessage, EmailTemplate, Mailer, NotificationOutcome,
    NotifyError, OpportunitySummary, PayoutRecord, notify_partners_of_payouts,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, Set};
use std::sync::Mutex;

async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

async fn insert_partner(db: &DatabaseConnection, email: Option<&str>) -> account::Model {
    account::ActiveModel {
        email: Set(email.map(str::to_string)),
        name: Set(None),
        surname: Set(None),
        is_corporate: Set(true),
        corporate_name: Set(Some("Partner a.s.".to_string())),
        distribution_partner_account_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert partner")
}

async fn insert_investor(
    db: &DatabaseConnection,
    name: &str,
    surname: &str,
    email: &str,
    partner_id: Option<i32>,
) -> account::Model {
    account::ActiveModel {
        email: Set(Some(email.to_string())),
        name: Set(Some(name.to_string())),
        surname: Set(Some(surname.to_string())),
        is_corporate: Set(false),
        corporate_name: Set(None),
        distribution_partner_account_id: Set(partner_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("failed to insert investor")
}

fn czk(account_id: i32, amount: i64) -> PayoutRecord {
    PayoutRecord {
        account_id,
        amount: Decimal::new(amount, 0),
        currency: Currency::Czk,
    }
}

fn opportunity() -> OpportunitySummary {
    OpportunitySummary {
        title: "Rezidence Waltrovka".to_string(),
    }
}

#[derive(Debug)]
struct SentEmail {
    subject: String,
    template: EmailTemplate,
    to: String,
    data: serde_json::Value,
}

/// Records sends instead of delivering them. Recipients listed in
/// `fail_for` error out, which is how the per-send isolation tests
/// simulate a flaky mail API.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
    fail_for: Vec<String>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        subject: &str,
        template: EmailTemplate,
        message: EmailMessage,
    ) -> Result<(), NotifyError> {
        if self.fail_for.contains(&message.to.email) {
            return Err(NotifyError::Mail(format!(
                "simulated failure for {}",
                message.to.email
            )));
        }
        self.sent.lock().unwrap().push(SentEmail {
            subject: subject.to_string(),
            template,
            to: message.to.email,
            data: message.email_data,
        });
        Ok(())
    }
}

#[tokio::test]
async fn test_one_summary_per_partner_with_aggregated_amounts() {
    let db = setup_db().await.unwrap();
    let partner = insert_partner(&db, Some("p@x.com")).await;
    let investor1 = insert_investor(&db, "Jan", "Novák", "jan@x.com", Some(partner.id)).await;
    let investor2 = insert_investor(&db, "Eva", "Malá", "eva@x.com", Some(partner.id)).await;

    // Account 1 appears twice in the batch; its amounts must be summed.
    let payouts = vec![
        czk(investor1.id, 1000),
        czk(investor1.id, 500),
        czk(investor2.id, 2000),
    ];

    let mailer = RecordingMailer::default();
    let outcome = notify_partners_of_payouts(&db, &mailer, &payouts, &opportunity()).await;

    assert_eq!(
        outcome,
        NotificationOutcome::Completed {
            notified: 1,
            skipped_missing_email: 0,
            failed_sends: 0
        }
    );

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let email = &sent[0];
    assert_eq!(email.to, "p@x.com");
    assert_eq!(email.subject, CLIENT_GOT_PAID_SUBJECT);
    assert_eq!(email.template, EmailTemplate::ClientGotPaidNotice);
    assert_eq!(email.data["opportunityTitle"], "Rezidence Waltrovka");

    let accounts = email.data["accountsPayoutData"].as_array().unwrap();
    assert_eq!(accounts.len(), 2);
    let amounts: Vec<&str> = accounts
        .iter()
        .map(|a| a["payoutAmount"].as_str().unwrap())
        .collect();
    assert!(amounts.contains(&"1\u{a0}500\u{a0}Kč"));
    assert!(amounts.contains(&"2\u{a0}000\u{a0}Kč"));
    let names: Vec<&str> = accounts
        .iter()
        .map(|a| a["userFullName"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Jan Novák"));
    assert!(names.contains(&"Eva Malá"));
}

#[tokio::test]
async fn test_accounts_without_partner_are_excluded() {
    let db = setup_db().await.unwrap();
    let partner = insert_partner(&db, Some("p@x.com")).await;
    let referred = insert_investor(&db, "Jan", "Novák", "jan@x.com", Some(partner.id)).await;
    let unaffiliated = insert_investor(&db, "Petr", "Velký", "petr@x.com", None).await;

    let payouts = vec![czk(referred.id, 1000), czk(unaffiliated.id, 9000)];

    let mailer = RecordingMailer::default();
    let outcome = notify_partners_of_payouts(&db, &mailer, &payouts, &opportunity()).await;

    assert_eq!(
        outcome,
        NotificationOutcome::Completed {
            notified: 1,
            skipped_missing_email: 0,
            failed_sends: 0
        }
    );

    let sent = mailer.sent.lock().unwrap();
    let accounts = sent[0].data["accountsPayoutData"].as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["userEmail"], "jan@x.com");
}

#[tokio::test]
async fn test_partner_without_email_is_skipped_not_errored() {
    let db = setup_db().await.unwrap();
    let partner = insert_partner(&db, None).await;
    let investor = insert_investor(&db, "Jan", "Novák", "jan@x.com", Some(partner.id)).await;

    let mailer = RecordingMailer::default();
    let outcome =
        notify_partners_of_payouts(&db, &mailer, &[czk(investor.id, 1000)], &opportunity()).await;

    assert_eq!(
        outcome,
        NotificationOutcome::Completed {
            notified: 0,
            skipped_missing_email: 1,
            failed_sends: 0
        }
    );
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unresolved_account_ids_are_ignored() {
    let db = setup_db().await.unwrap();
    let partner = insert_partner(&db, Some("p@x.com")).await;
    let investor = insert_investor(&db, "Jan", "Novák", "jan@x.com", Some(partner.id)).await;

    // 424242 does not exist; the lookup just never returns it.
    let payouts = vec![czk(investor.id, 1500), czk(424242, 777)];

    let mailer = RecordingMailer::default();
    let outcome = notify_partners_of_payouts(&db, &mailer, &payouts, &opportunity()).await;

    assert_eq!(
        outcome,
        NotificationOutcome::Completed {
            notified: 1,
            skipped_missing_email: 0,
            failed_sends: 0
        }
    );
    let sent = mailer.sent.lock().unwrap();
    let accounts = sent[0].data["accountsPayoutData"].as_array().unwrap();
    assert_eq!(accounts.len(), 1);
}

#[tokio::test]
async fn test_lookup_failure_sends_nothing_and_does_not_panic() {
    let db = setup_db().await.unwrap();

    // Make the directory lookup fail outright.
    db.execute_unprepared("DROP TABLE payments; DROP TABLE accounts;")
        .await
        .unwrap();

    let mailer = RecordingMailer::default();
    let outcome =
        notify_partners_of_payouts(&db, &mailer, &[czk(1, 1000)], &opportunity()).await;

    assert_eq!(outcome, NotificationOutcome::LookupFailed);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_one_failed_send_does_not_abort_the_others() {
    let db = setup_db().await.unwrap();
    let flaky_partner = insert_partner(&db, Some("flaky@x.com")).await;
    let healthy_partner = insert_partner(&db, Some("ok@x.com")).await;
    let investor1 = insert_investor(&db, "Jan", "Novák", "jan@x.com", Some(flaky_partner.id)).await;
    let investor2 = insert_investor(&db, "Eva", "Malá", "eva@x.com", Some(healthy_partner.id)).await;

    let mailer = RecordingMailer {
        fail_for: vec!["flaky@x.com".to_string()],
        ..Default::default()
    };

    let payouts = vec![czk(investor1.id, 1000), czk(investor2.id, 2000)];
    let outcome = notify_partners_of_payouts(&db, &mailer, &payouts, &opportunity()).await;

    assert_eq!(
        outcome,
        NotificationOutcome::Completed {
            notified: 1,
            skipped_missing_email: 0,
            failed_sends: 1
        }
    );
    assert!(outcome.is_degraded());

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ok@x.com");
}

#[tokio::test]
async fn test_empty_batch_is_a_clean_noop() {
    let db = setup_db().await.unwrap();
    let mailer = RecordingMailer::default();

    let outcome = notify_partners_of_payouts(&db, &mailer, &[], &opportunity()).await;

    assert_eq!(
        outcome,
        NotificationOutcome::Completed {
            notified: 0,
            skipped_missing_email: 0,
            failed_sends: 0
        }
    );
    assert!(mailer.sent.lock().unwrap().is_empty());
}
