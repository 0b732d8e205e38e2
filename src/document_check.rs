//! Validity check of Czech ID documents against the interior ministry's
//! public register of invalid documents (aplikace.mvcr.cz/neplatne-doklady).
//!
//! The register answers an XML document for a (number, document type)
//! query. A document listed there has been reported lost, stolen, or
//! otherwise invalidated. Numbers that do not look like a Czech document
//! number at all are treated as valid without calling the register: an
//! unverifiable document must not block a client's registration.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Europe::Prague;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use utoipa::ToSchema;

/// Production endpoint of the invalid-documents register.
pub const REGISTER_URL: &str = "https://aplikace.mvcr.cz/neplatne-doklady/doklady.aspx";

/// Document types the register can be queried for, with their `doklad`
/// query codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    IdCard,
    Passport,
    GunLicense,
}

impl DocumentKind {
    fn register_code(&self) -> &'static str {
        match self {
            DocumentKind::IdCard => "0",
            DocumentKind::Passport => "4",
            DocumentKind::GunLicense => "5",
        }
    }
}

// Number shapes of Czech documents: 9-digit ID cards, older series ID
// cards ("AB12 345678"), 8-digit passports, gun licenses ("AB 123456").
static ID_CARD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[1-9]\d{8}$").unwrap());
static ID_CARD_SERIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}\d{0,2}\s?\d{6}$").unwrap());
static PASSPORT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[1-9]\d{7}$").unwrap());
static GUN_LICENSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}\s?\d{6}$").unwrap());

/// Whether the number matches any known Czech document-number shape
/// (matching is done on the uppercased input).
pub fn is_czech_document_number(number: &str) -> bool {
    let number = number.to_uppercase();
    [&*ID_CARD, &*ID_CARD_SERIES, &*PASSPORT, &*GUN_LICENSE]
        .iter()
        .any(|regex| regex.is_match(&number))
}

/// Outcome of one register check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum DocumentValidity {
    Valid,
    /// The document is listed in the register since `invalid_from`
    /// (midnight of the reported day, Prague time).
    Invalid { invalid_from: DateTime<Utc> },
}

#[derive(Error, Debug)]
pub enum DocumentCheckError {
    #[error("register request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The register itself reported the query as faulty.
    #[error("register rejected the query: {0}")]
    Register(String),

    #[error("unexpected register response: {0}")]
    Parse(String),
}

// The register's XML, e.g.:
// <doklady_neplatne posl_zmena="1.3.2026" pristi_zmeny="8.3.2026">
//   <dotaz typ="OP" cislo="123456789" serie="" />
//   <odpoved aktualizovano="1.3.2026" evidovano="ano" evidovano_od="5.1.2026" />
// </doklady_neplatne>
// or, for malformed queries, a <chyba> element instead of <odpoved>.
#[derive(Debug, Deserialize)]
struct RegisterDocument {
    odpoved: Option<RegisterAnswer>,
    chyba: Option<RegisterFault>,
}

#[derive(Debug, Deserialize)]
struct RegisterAnswer {
    #[serde(rename = "@evidovano")]
    listed: String,
    #[serde(rename = "@evidovano_od")]
    listed_from: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterFault {
    #[serde(rename = "$text")]
    message: Option<String>,
}

/// Parses the register's XML answer into a validity verdict.
fn parse_register_response(xml: &str) -> Result<DocumentValidity, DocumentCheckError> {
    let document: RegisterDocument =
        quick_xml::de::from_str(xml).map_err(|e| DocumentCheckError::Parse(e.to_string()))?;

    if let Some(fault) = document.chyba {
        return Err(DocumentCheckError::Register(
            fault.message.unwrap_or_else(|| "unknown fault".to_string()),
        ));
    }

    let answer = document
        .odpoved
        .ok_or_else(|| DocumentCheckError::Parse("neither <odpoved> nor <chyba> present".into()))?;

    if answer.listed != "ano" {
        return Ok(DocumentValidity::Valid);
    }

    let listed_from = answer
        .listed_from
        .ok_or_else(|| DocumentCheckError::Parse("listed document without evidovano_od".into()))?;
    Ok(DocumentValidity::Invalid {
        invalid_from: parse_register_date(&listed_from)?,
    })
}

/// The register reports days as `D.M.YYYY` in local (Prague) time; the
/// verdict carries midnight of that day as UTC.
fn parse_register_date(date: &str) -> Result<DateTime<Utc>, DocumentCheckError> {
    let day = NaiveDate::parse_from_str(date, "%d.%m.%Y")
        .map_err(|e| DocumentCheckError::Parse(format!("bad register date {date:?}: {e}")))?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DocumentCheckError::Parse(format!("bad register date {date:?}")))?;
    let local = midnight
        .and_local_timezone(Prague)
        .earliest()
        .ok_or_else(|| DocumentCheckError::Parse(format!("bad register date {date:?}")))?;
    Ok(local.with_timezone(&Utc))
}

/// Client of the invalid-documents register.
#[derive(Debug, Clone)]
pub struct DocumentCheckClient {
    client: reqwest::Client,
    register_url: String,
}

impl DocumentCheckClient {
    pub fn new(register_url: String) -> Result<Self, DocumentCheckError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            register_url,
        })
    }

    /// Checks one document against the register.
    ///
    /// Numbers that do not look like a Czech document number are reported
    /// valid without querying, so registration is never blocked on a
    /// document the register cannot know.
    #[instrument(skip(self))]
    pub async fn check(
        &self,
        kind: DocumentKind,
        number: &str,
    ) -> Result<DocumentValidity, DocumentCheckError> {
        let number = number.trim().to_uppercase();
        if !is_czech_document_number(&number) {
            debug!("number does not match any Czech document shape; assuming valid");
            return Ok(DocumentValidity::Valid);
        }

        let response = self
            .client
            .get(&self.register_url)
            .query(&[("dotaz", number.as_str()), ("doklad", kind.register_code())])
            .send()
            .await?;
        let xml = response.error_for_status()?.text().await?;

        parse_register_response(&xml)
    }
}
