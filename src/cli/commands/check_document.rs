use anyhow::Result;
use tracing::info;

use crate::document_check::{DocumentCheckClient, DocumentKind, DocumentValidity, REGISTER_URL};

/// Ad-hoc register check from the command line, mostly for back office
/// verifying a single document without going through the API.
pub async fn check_document(number: &str, kind: DocumentKind) -> Result<()> {
    let register_url =
        std::env::var("DOCUMENT_REGISTER_URL").unwrap_or_else(|_| REGISTER_URL.to_string());
    let client = DocumentCheckClient::new(register_url)?;

    info!("Checking document {} against the register", number);
    match client.check(kind, number).await? {
        DocumentValidity::Valid => {
            println!("valid");
        }
        DocumentValidity::Invalid { invalid_from } => {
            println!("INVALID since {}", invalid_from.format("%Y-%m-%d"));
        }
    }

    Ok(())
}
