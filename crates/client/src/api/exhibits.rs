use models::{
    AddPartRequest, CreatedId, Exhibit, ExhibitStatus, NewExhibit, StatusChange, UpdateExhibit,
};
use reqwest::Method;

use crate::{
    client::{Expected, InventoryClient},
    error::ClientError,
};

pub struct ExhibitsApi<'a> {
    client: &'a InventoryClient,
}

impl<'a> ExhibitsApi<'a> {
    pub(crate) fn new(client: &'a InventoryClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Exhibit>, ClientError> {
        self.client.get_json("/exhibits").await
    }

    pub async fn get(&self, id: &str) -> Result<Exhibit, ClientError> {
        self.client
            .get_json(&format!("/exhibits/{id}"))
            .await
            .map_err(|e| e.not_found_as("Exhibit", id))
    }

    /// One exhibit picked by the backend, shown on the sign-in splash.
    pub async fn random(&self) -> Result<Exhibit, ClientError> {
        self.client.get_json("/exhibits/random").await
    }

    /// Returns the id the backend assigned.
    pub async fn create(&self, exhibit: &NewExhibit) -> Result<String, ClientError> {
        let created: CreatedId = self
            .client
            .send_json(Method::POST, "/exhibits", exhibit, Expected::AnySuccess)
            .await?;
        Ok(created.into())
    }

    pub async fn update(&self, id: &str, changes: &UpdateExhibit) -> Result<(), ClientError> {
        self.client
            .send_unit(
                Method::PUT,
                &format!("/exhibits/{id}"),
                Some(changes),
                Expected::AnySuccess,
            )
            .await
            .map_err(|e| e.not_found_as("Exhibit", id))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client
            .send_unit::<()>(
                Method::DELETE,
                &format!("/exhibits/{id}"),
                None,
                Expected::NO_CONTENT,
            )
            .await
            .map_err(|e| e.not_found_as("Exhibit", id))
    }

    /// Attach an existing part to the exhibit.
    pub async fn add_part(&self, id: &str, part_id: &str) -> Result<(), ClientError> {
        let body = AddPartRequest {
            part_id: part_id.to_string(),
        };
        self.client
            .send_unit(
                Method::POST,
                &format!("/exhibits/{id}/add_part"),
                Some(&body),
                Expected::AnySuccess,
            )
            .await
            .map_err(|e| e.not_found_as("Exhibit", id))
    }

    pub async fn change_status(&self, id: &str, status: &ExhibitStatus) -> Result<(), ClientError> {
        let body = StatusChange {
            new_status: status.clone(),
        };
        self.client
            .send_unit(
                Method::POST,
                &format!("/exhibits/{id}/status"),
                Some(&body),
                Expected::AnySuccess,
            )
            .await
            .map_err(|e| e.not_found_as("Exhibit", id))
    }
}
