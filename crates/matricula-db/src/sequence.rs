use chrono::{DateTime, Datelike, Utc};
use tracing::warn;

use matricula_models::numbering::{MAX_NUMBER_ATTEMPTS, next_number};
use matricula_models::{AdmissionApplication, NewApplication};

use crate::error::StoreResult;
use crate::ports::Store;

/// Numbers and stores an application, recomputing the number when a
/// concurrent submission claimed it first.
pub async fn insert_application_with_next_number(
    store: &dyn Store,
    application: &NewApplication,
    submitted_at: DateTime<Utc>,
) -> StoreResult<AdmissionApplication> {
    let year = submitted_at.year();
    let mut attempt = 1;

    loop {
        let current = store.max_application_sequence(year).await?;
        let number = next_number(year, current);

        match store
            .insert_application(&number, application, submitted_at)
            .await
        {
            Err(err) if err.is_duplicate_of("applicationNumber") && attempt < MAX_NUMBER_ATTEMPTS => {
                warn!(
                    application_number = %number,
                    attempt,
                    "Application number taken, retrying"
                );
                attempt += 1;
            }
            result => return result,
        }
    }
}
