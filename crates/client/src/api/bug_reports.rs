use models::BugReport;
use reqwest::Method;
use tracing::info;

use crate::{
    client::{Expected, InventoryClient},
    error::ClientError,
};

pub struct BugReportsApi<'a> {
    client: &'a InventoryClient,
}

impl<'a> BugReportsApi<'a> {
    pub(crate) fn new(client: &'a InventoryClient) -> Self {
        Self { client }
    }

    pub async fn submit(&self, report: &BugReport) -> Result<(), ClientError> {
        self.client
            .send_unit(
                Method::POST,
                "/report-bug",
                Some(report),
                Expected::AnySuccess,
            )
            .await?;
        info!(reporter = %report.name, title = %report.title, "Bug report submitted");
        Ok(())
    }
}
