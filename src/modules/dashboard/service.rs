use tracing::instrument;

use matricula_db::Store;
use matricula_models::SchoolStatistics;

use crate::error::ServiceResult;

pub struct DashboardService;

impl DashboardService {
    #[instrument(skip(store))]
    pub async fn statistics(store: &dyn Store) -> ServiceResult<SchoolStatistics> {
        Ok(store.statistics().await?)
    }
}
