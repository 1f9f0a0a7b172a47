use reqwest::Method;
use tracing::info;

use crate::{
    client::{Expected, InventoryClient},
    error::ClientError,
};

/// Development-only endpoints that seed or wipe the backend.
pub struct DevApi<'a> {
    client: &'a InventoryClient,
}

impl<'a> DevApi<'a> {
    pub(crate) fn new(client: &'a InventoryClient) -> Self {
        Self { client }
    }

    pub async fn create_dummy_exhibits(&self) -> Result<(), ClientError> {
        self.client
            .send_unit::<()>(
                Method::GET,
                "/create-dummy-exhibits",
                None,
                Expected::AnySuccess,
            )
            .await?;
        info!(base_url = %self.client.base_url(), "Seeded dummy exhibits");
        Ok(())
    }

    pub async fn reset(&self) -> Result<(), ClientError> {
        self.client
            .send_unit::<()>(Method::GET, "/reset", None, Expected::AnySuccess)
            .await?;
        info!(base_url = %self.client.base_url(), "Reset backend data");
        Ok(())
    }
}
