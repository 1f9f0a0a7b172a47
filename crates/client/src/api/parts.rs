use models::{CreatedId, NewPart, Part, UpdatePart};
use reqwest::Method;
use tracing::debug;

use crate::{
    client::{Expected, InventoryClient},
    error::ClientError,
};

pub struct PartsApi<'a> {
    client: &'a InventoryClient,
}

impl<'a> PartsApi<'a> {
    pub(crate) fn new(client: &'a InventoryClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Part>, ClientError> {
        self.client.get_json("/parts").await
    }

    pub async fn get(&self, id: &str) -> Result<Part, ClientError> {
        self.client
            .get_json(&format!("/parts/{id}"))
            .await
            .map_err(|e| e.not_found_as("Part", id))
    }

    /// Fetch the parts with the given ids, in whatever order the backend returns them.
    pub async fn batch(&self, ids: &[String]) -> Result<Vec<Part>, ClientError> {
        if ids.is_empty() {
            debug!("Skipping part batch request for empty id list");
            return Ok(Vec::new());
        }
        self.client
            .send_json(Method::POST, "/parts/batch", ids, Expected::AnySuccess)
            .await
    }

    /// Returns the id the backend assigned.
    pub async fn create(&self, part: &NewPart) -> Result<String, ClientError> {
        let created: CreatedId = self
            .client
            .send_json(Method::POST, "/parts", part, Expected::AnySuccess)
            .await?;
        Ok(created.into())
    }

    pub async fn update(&self, id: &str, part: &UpdatePart) -> Result<(), ClientError> {
        self.client
            .send_unit(
                Method::PUT,
                &format!("/parts/{id}"),
                Some(part),
                Expected::AnySuccess,
            )
            .await
            .map_err(|e| e.not_found_as("Part", id))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client
            .send_unit::<()>(
                Method::DELETE,
                &format!("/parts/{id}"),
                None,
                Expected::NO_CONTENT,
            )
            .await
            .map_err(|e| e.not_found_as("Part", id))
    }
}
