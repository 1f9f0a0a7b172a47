use models::{NewNote, Note, NoteOwner, NoteOwnerKind};
use reqwest::Method;

use crate::{
    client::{Expected, InventoryClient},
    error::ClientError,
};

/// Note sub-resource of one exhibit or part.
pub struct NotesApi<'a> {
    client: &'a InventoryClient,
    owner: NoteOwner,
}

impl<'a> NotesApi<'a> {
    pub(crate) fn new(client: &'a InventoryClient, owner: NoteOwner) -> Self {
        Self { client, owner }
    }

    pub fn owner(&self) -> &NoteOwner {
        &self.owner
    }

    fn owner_resource(&self) -> &'static str {
        match self.owner.kind {
            NoteOwnerKind::Exhibit => "Exhibit",
            NoteOwnerKind::Part => "Part",
        }
    }

    pub async fn list(&self) -> Result<Vec<Note>, ClientError> {
        self.client
            .get_json(&self.owner.notes_path())
            .await
            .map_err(|e| e.not_found_as(self.owner_resource(), &self.owner.id))
    }

    pub async fn get(&self, note_id: &str) -> Result<Note, ClientError> {
        self.client
            .get_json(&self.owner.note_path(note_id))
            .await
            .map_err(|e| e.not_found_as("Note", note_id))
    }

    pub async fn create(&self, note: &NewNote) -> Result<(), ClientError> {
        self.client
            .send_unit(
                Method::POST,
                &self.owner.notes_path(),
                Some(note),
                Expected::OK,
            )
            .await
            .map_err(|e| e.not_found_as(self.owner_resource(), &self.owner.id))
    }

    pub async fn delete(&self, note_id: &str) -> Result<(), ClientError> {
        self.client
            .send_unit::<()>(
                Method::DELETE,
                &self.owner.note_path(note_id),
                None,
                Expected::NO_CONTENT,
            )
            .await
            .map_err(|e| e.not_found_as("Note", note_id))
    }
}
