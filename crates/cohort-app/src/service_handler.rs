use salvo::async_trait;
use std::sync::Arc;

use crate::error::AppResult;
use cohort_core::error::CoreError;
use cohort_db::store::{PgGroupStore, PgUserDirectory};
use cohort_service::GroupCoordinator;

/// The coordinator as wired in the binary: Postgres behind both stores.
pub type AppCoordinator = GroupCoordinator<PgGroupStore, PgUserDirectory>;

pub struct CoordinatorHandler {
    pub coordinator: Arc<AppCoordinator>,
}

#[async_trait]
impl salvo::Handler for CoordinatorHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        // Insert a reference to the coordinator into the depot
        depot.inject(Arc::clone(&self.coordinator));
    }
}

/// ## Summary
/// Retrieves the group coordinator from the depot.
///
/// ## Errors
/// Returns an error if the coordinator is not found in the depot.
pub fn get_coordinator_from_depot(depot: &salvo::Depot) -> AppResult<Arc<AppCoordinator>> {
    depot
        .obtain::<Arc<AppCoordinator>>()
        .cloned()
        .map_err(|_err| {
            CoreError::InvariantViolation("Group coordinator not found in depot").into()
        })
}
