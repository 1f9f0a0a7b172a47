use models::{Jotform, JotformStatus, StatusChange};
use reqwest::Method;

use crate::{
    client::{Expected, InventoryClient},
    error::ClientError,
};

pub struct JotformsApi<'a> {
    client: &'a InventoryClient,
}

impl<'a> JotformsApi<'a> {
    pub(crate) fn new(client: &'a InventoryClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Jotform>, ClientError> {
        self.client.get_json("/jotforms").await
    }

    pub async fn get(&self, id: &str) -> Result<Jotform, ClientError> {
        self.client
            .get_json(&format!("/jotforms/{id}"))
            .await
            .map_err(|e| e.not_found_as("Jotform", id))
    }

    pub async fn change_status(&self, id: &str, status: &JotformStatus) -> Result<(), ClientError> {
        let body = StatusChange {
            new_status: status.clone(),
        };
        self.client
            .send_unit(
                Method::POST,
                &format!("/jotforms/{id}/status"),
                Some(&body),
                Expected::AnySuccess,
            )
            .await
            .map_err(|e| e.not_found_as("Jotform", id))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client
            .send_unit::<()>(
                Method::DELETE,
                &format!("/jotforms/{id}"),
                None,
                Expected::NO_CONTENT,
            )
            .await
            .map_err(|e| e.not_found_as("Jotform", id))
    }
}
