//! One entry point for everything the screens do: cached reads, writes with
//! invalidation, and the shell-backed profile.

use std::{future::Future, sync::Arc};

use client::{ClientError, InventoryClient};
use models::{
    BugReport, Exhibit, ExhibitStatus, Jotform, JotformStatus, NewBugReport, NewExhibit, NewNote,
    NewPart, NoteOwner, NoteOwnerKind, Part, UpdateExhibit, UpdatePart, UserProfile,
};
use tracing::{debug, info, warn};
use utils::config::Config;

use super::{
    mutations::{MutationSpec, Mutations},
    notification::Notifier,
    query_cache::{QueryCache, QueryError, QueryKey, QueryOptions, QuerySnapshot},
    refetch::{PollerSet, RefetchPoller},
    shell::ShellBridge,
};
use crate::error::ServiceError;

#[derive(Clone)]
pub struct Inventory {
    client: InventoryClient,
    cache: QueryCache,
    mutations: Mutations,
    shell: Arc<dyn ShellBridge>,
    options: QueryOptions,
}

/// Builds a fetcher that hands each attempt its own client handle.
fn fetcher<T, F, Fut>(
    client: InventoryClient,
    read: F,
) -> impl Fn() -> Fut + Clone + Send + Sync + 'static
where
    F: Fn(InventoryClient) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
{
    move || read(client.clone())
}

fn exhibit_write(name: &str, pending: &str, success: &str, failure: &str) -> MutationSpec {
    MutationSpec::new(name, pending, success, failure)
        .invalidates(QueryKey::exhibits())
        .invalidates(QueryKey::exhibit_records())
}

fn part_write(name: &str, pending: &str, success: &str, failure: &str) -> MutationSpec {
    MutationSpec::new(name, pending, success, failure)
        .invalidates(QueryKey::parts())
        .invalidates(QueryKey::part_records())
}

fn note_write(
    owner: &NoteOwner,
    name: &str,
    pending: &str,
    success: &str,
    failure: &str,
) -> MutationSpec {
    match owner.kind {
        NoteOwnerKind::Exhibit => exhibit_write(name, pending, success, failure),
        NoteOwnerKind::Part => part_write(name, pending, success, failure),
    }
}

impl Inventory {
    pub fn new(
        client: InventoryClient,
        shell: Arc<dyn ShellBridge>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cache = QueryCache::default();
        Self {
            client,
            mutations: Mutations::new(cache.clone(), notifier),
            cache,
            shell,
            options: QueryOptions::polling(),
        }
    }

    pub fn from_config(
        config: &Config,
        shell: Arc<dyn ShellBridge>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ServiceError> {
        let client = InventoryClient::from_config(config)?;
        let cache = QueryCache::from_config(&config.cache);
        Ok(Self {
            client,
            mutations: Mutations::new(cache.clone(), notifier),
            cache,
            shell,
            options: QueryOptions::from_config(&config.cache),
        })
    }

    /// Policy for collection and record reads.
    pub fn with_query_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn client(&self) -> &InventoryClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn mutations(&self) -> &Mutations {
        &self.mutations
    }

    pub fn shell(&self) -> &Arc<dyn ShellBridge> {
        &self.shell
    }

    pub fn query_options(&self) -> &QueryOptions {
        &self.options
    }

    async fn query<T, F, Fut>(
        &self,
        key: QueryKey,
        options: &QueryOptions,
        read: F,
    ) -> Result<Arc<T>, ServiceError>
    where
        T: Send + Sync + 'static,
        F: Fn(InventoryClient) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        let fetch = fetcher(self.client.clone(), read);
        Ok(self.cache.fetch(key, options, fetch).await?)
    }

    // Reads

    pub async fn exhibits(&self) -> Result<Arc<Vec<Exhibit>>, ServiceError> {
        self.query(QueryKey::exhibits(), &self.options, |client| async move {
            client.exhibits().list().await
        })
        .await
    }

    pub async fn exhibit(&self, id: &str) -> Result<Arc<Exhibit>, ServiceError> {
        let id = id.to_string();
        self.query(QueryKey::exhibit(&id), &self.options, move |client| {
            let id = id.clone();
            async move { client.exhibits().get(&id).await }
        })
        .await
    }

    pub async fn random_exhibit(&self) -> Result<Arc<Exhibit>, ServiceError> {
        self.query(
            QueryKey::random_exhibit(),
            &QueryOptions::random_splash(),
            |client| async move { client.exhibits().random().await },
        )
        .await
    }

    pub async fn parts(&self) -> Result<Arc<Vec<Part>>, ServiceError> {
        self.query(QueryKey::parts(), &self.options, |client| async move {
            client.parts().list().await
        })
        .await
    }

    pub async fn part(&self, id: &str) -> Result<Arc<Part>, ServiceError> {
        let id = id.to_string();
        self.query(QueryKey::part(&id), &self.options, move |client| {
            let id = id.clone();
            async move { client.parts().get(&id).await }
        })
        .await
    }

    /// Parts with the given ids. An empty list never reaches the backend.
    pub async fn parts_by_ids(&self, ids: &[String]) -> Result<Arc<Vec<Part>>, ServiceError> {
        let options = self.options.clone().enabled(!ids.is_empty());
        let owned = ids.to_vec();
        let result = self
            .query(QueryKey::parts_by_ids(ids), &options, move |client| {
                let ids = owned.clone();
                async move { client.parts().batch(&ids).await }
            })
            .await;
        match result {
            Err(ServiceError::Query(QueryError::Disabled)) => Ok(Arc::new(Vec::new())),
            other => other,
        }
    }

    pub async fn exhibit_parts(&self, exhibit: &Exhibit) -> Result<Arc<Vec<Part>>, ServiceError> {
        self.parts_by_ids(&exhibit.part_ids).await
    }

    pub async fn jotforms(&self) -> Result<Arc<Vec<Jotform>>, ServiceError> {
        self.query(QueryKey::jotforms(), &self.options, |client| async move {
            client.jotforms().list().await
        })
        .await
    }

    pub async fn profile(&self) -> Result<Arc<UserProfile>, ServiceError> {
        let shell = self.shell.clone();
        let fetch = move || {
            let shell = shell.clone();
            async move { shell.get_user_info().await }
        };
        Ok(self
            .cache
            .fetch(QueryKey::profile(), &QueryOptions::stale_window(), fetch)
            .await?)
    }

    /// Cached state of the exhibit list without triggering a read.
    pub async fn peek_exhibits(&self) -> QuerySnapshot<Vec<Exhibit>> {
        self.cache.peek(&QueryKey::exhibits(), &self.options).await
    }

    /// Start background refreshes for the polled collections.
    pub fn start_polling(&self) -> PollerSet {
        let mut set = PollerSet::default();
        set.push(RefetchPoller::spawn(
            self.cache.clone(),
            QueryKey::exhibits(),
            self.options.clone(),
            fetcher(self.client.clone(), |client| async move {
                client.exhibits().list().await
            }),
        ));
        set.push(RefetchPoller::spawn(
            self.cache.clone(),
            QueryKey::parts(),
            self.options.clone(),
            fetcher(self.client.clone(), |client| async move {
                client.parts().list().await
            }),
        ));
        set.push(RefetchPoller::spawn(
            self.cache.clone(),
            QueryKey::jotforms(),
            self.options.clone(),
            fetcher(self.client.clone(), |client| async move {
                client.jotforms().list().await
            }),
        ));
        set
    }

    // Session

    pub async fn sign_in(&self) -> Result<UserProfile, ServiceError> {
        let profile = self.shell.sign_in().await?;
        self.cache.set_data(QueryKey::profile(), profile.clone()).await;
        Ok(profile)
    }

    pub async fn sign_out(&self) -> Result<(), ServiceError> {
        self.shell.sign_out().await?;
        self.cache.remove(&QueryKey::profile()).await;
        Ok(())
    }

    // Exhibit writes

    pub async fn create_exhibit(&self, exhibit: NewExhibit) -> Result<String, ServiceError> {
        if exhibit.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("exhibit name is required".into()));
        }
        let spec = exhibit_write(
            "create-exhibit",
            "Creating exhibit...",
            "Exhibit created",
            "Failed to create exhibit",
        );
        self.mutations
            .run(&spec, async {
                let id = self.client.exhibits().create(&exhibit).await?;
                info!(exhibit_id = %id, name = %exhibit.name, "Exhibit created");
                Ok(id)
            })
            .await
    }

    pub async fn edit_exhibit(&self, id: &str, changes: UpdateExhibit) -> Result<(), ServiceError> {
        if changes.is_empty() {
            debug!(exhibit_id = %id, "No exhibit fields changed; skipping update");
            return Ok(());
        }
        let spec = exhibit_write(
            "edit-exhibit",
            "Saving exhibit...",
            "Exhibit updated",
            "Failed to update exhibit",
        );
        self.mutations
            .run(&spec, async {
                Ok(self.client.exhibits().update(id, &changes).await?)
            })
            .await
    }

    pub async fn delete_exhibit(&self, id: &str) -> Result<(), ServiceError> {
        let spec = exhibit_write(
            "delete-exhibit",
            "Deleting exhibit...",
            "Exhibit deleted",
            "Failed to delete exhibit",
        )
        .invalidates(QueryKey::parts());
        self.mutations
            .run(&spec, async { Ok(self.client.exhibits().delete(id).await?) })
            .await
    }

    pub async fn change_exhibit_status(
        &self,
        id: &str,
        status: ExhibitStatus,
    ) -> Result<(), ServiceError> {
        if let ExhibitStatus::Other(raw) = &status {
            return Err(ServiceError::InvalidInput(format!(
                "unknown exhibit status: {raw}"
            )));
        }
        let spec = exhibit_write(
            "change-exhibit-status",
            "Updating status...",
            "Status updated",
            "Failed to update status",
        );
        self.mutations
            .run(&spec, async {
                Ok(self.client.exhibits().change_status(id, &status).await?)
            })
            .await
    }

    pub async fn add_part_to_exhibit(
        &self,
        exhibit_id: &str,
        part_id: &str,
    ) -> Result<(), ServiceError> {
        let spec = exhibit_write(
            "add-part",
            "Adding part...",
            "Part added to exhibit",
            "Failed to add part",
        )
        .invalidates(QueryKey::parts().push(exhibit_id));
        self.mutations
            .run(&spec, async {
                Ok(self.client.exhibits().add_part(exhibit_id, part_id).await?)
            })
            .await
    }

    // Part writes

    pub async fn create_part(&self, part: NewPart) -> Result<String, ServiceError> {
        if part.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("part name is required".into()));
        }
        let mut spec = part_write(
            "create-part",
            "Creating part...",
            "Part created",
            "Failed to create part",
        );
        if !part.exhibit_ids.is_empty() {
            spec = spec
                .invalidates(QueryKey::exhibits())
                .invalidates(QueryKey::exhibit_records());
        }
        let id = self
            .mutations
            .run(&spec, async {
                let id = self.client.parts().create(&part).await?;
                info!(part_id = %id, name = %part.name, "Part created");
                Ok(id)
            })
            .await?;
        if !part.exhibit_ids.is_empty() {
            self.link_part(&id, &part.exhibit_ids).await?;
        }
        Ok(id)
    }

    pub async fn edit_part(&self, id: &str, part: UpdatePart) -> Result<(), ServiceError> {
        let spec = part_write(
            "edit-part",
            "Saving part...",
            "Part updated",
            "Failed to update part",
        )
        .invalidates(QueryKey::exhibits())
        .invalidates(QueryKey::exhibit_records());
        self.mutations
            .run(&spec, async { Ok(self.client.parts().update(id, &part).await?) })
            .await?;
        self.link_part(id, &part.exhibit_ids).await?;
        Ok(())
    }

    pub async fn delete_part(&self, id: &str) -> Result<(), ServiceError> {
        let spec = part_write(
            "delete-part",
            "Deleting part...",
            "Part deleted",
            "Failed to delete part",
        )
        .invalidates(QueryKey::exhibits())
        .invalidates(QueryKey::exhibit_records());
        self.mutations
            .run(&spec, async { Ok(self.client.parts().delete(id).await?) })
            .await
    }

    /// Runs [`reconcile_membership`](Self::reconcile_membership) as its own write after the
    /// part is saved. A failure leaves the part saved and comes back as
    /// [`ServiceError::LinkFailed`].
    async fn link_part(
        &self,
        part_id: &str,
        exhibit_ids: &[String],
    ) -> Result<usize, ServiceError> {
        let spec = exhibit_write(
            "link-part",
            "Linking part...",
            "Part linked to exhibits",
            "Failed to link part to exhibits",
        )
        .invalidates(QueryKey::parts())
        .invalidates(QueryKey::part_records());
        match self
            .mutations
            .run(&spec, self.reconcile_membership(part_id, exhibit_ids))
            .await
        {
            Ok(linked) => Ok(linked),
            Err(source) => {
                // Exhibits linked before the failure are already changed on the backend.
                for key in &spec.invalidates {
                    self.cache.invalidate(key);
                }
                Err(ServiceError::LinkFailed {
                    part_id: part_id.to_string(),
                    source: Box::new(source),
                })
            }
        }
    }

    /// Make every exhibit in `exhibit_ids` list the part. Reads exhibits fresh from the
    /// backend and only links the ones that are missing it. Returns how many were linked.
    ///
    /// Exhibits that list the part but are no longer in `exhibit_ids` are only reported;
    /// the backend has no unlink call.
    async fn reconcile_membership(
        &self,
        part_id: &str,
        exhibit_ids: &[String],
    ) -> Result<usize, ServiceError> {
        let exhibits = self.client.exhibits().list().await?;
        let mut linked = 0;

        for exhibit_id in exhibit_ids {
            match exhibits.iter().find(|e| &e.id == exhibit_id) {
                Some(exhibit) if exhibit.has_part(part_id) => {}
                Some(_) => {
                    self.client.exhibits().add_part(exhibit_id, part_id).await?;
                    info!(exhibit_id = %exhibit_id, part_id = %part_id, "Linked part to exhibit");
                    linked += 1;
                }
                None => warn!(
                    exhibit_id = %exhibit_id,
                    part_id = %part_id,
                    "Part references unknown exhibit; not linked"
                ),
            }
        }

        for exhibit in exhibits
            .iter()
            .filter(|e| e.has_part(part_id) && !exhibit_ids.contains(&e.id))
        {
            warn!(
                exhibit_id = %exhibit.id,
                part_id = %part_id,
                "Exhibit still lists part that was removed from it"
            );
        }

        Ok(linked)
    }

    // Notes

    /// Add a note. Without an explicit submitter the signed-in user's name is used.
    pub async fn create_note(
        &self,
        owner: &NoteOwner,
        message: &str,
        submitter: Option<String>,
    ) -> Result<(), ServiceError> {
        if message.trim().is_empty() {
            return Err(ServiceError::InvalidInput("note message is required".into()));
        }
        let submitter = match submitter.filter(|s| !s.trim().is_empty()) {
            Some(submitter) => submitter,
            None => self
                .shell
                .get_user_info()
                .await
                .map(|profile| profile.display_name().to_string())
                .map_err(|_| ServiceError::ProfileUnavailable)?,
        };
        let note = NewNote::new(submitter, message);
        let spec = note_write(
            owner,
            "create-note",
            "Adding note...",
            "Note added",
            "Failed to add note",
        );
        self.mutations
            .run(&spec, async {
                Ok(self.client.notes(owner.clone()).create(&note).await?)
            })
            .await
    }

    pub async fn delete_note(&self, owner: &NoteOwner, note_id: &str) -> Result<(), ServiceError> {
        let spec = note_write(
            owner,
            "delete-note",
            "Deleting note...",
            "Note deleted",
            "Failed to delete note",
        );
        self.mutations
            .run(&spec, async {
                Ok(self.client.notes(owner.clone()).delete(note_id).await?)
            })
            .await
    }

    // Jotforms

    /// Returns false without touching the backend when the status is unchanged.
    /// Statuses outside the known set are rejected.
    pub async fn change_jotform_status(
        &self,
        jotform: &Jotform,
        status: JotformStatus,
    ) -> Result<bool, ServiceError> {
        if let JotformStatus::Other(raw) = &status {
            return Err(ServiceError::InvalidInput(format!(
                "unknown jotform status: {raw}"
            )));
        }
        if jotform.status == status {
            debug!(jotform_id = %jotform.id, status = %status, "Jotform status unchanged");
            return Ok(false);
        }
        let spec = MutationSpec::new(
            "change-jotform-status",
            "Updating status...",
            "Status updated",
            "Failed to update status",
        )
        .invalidates(QueryKey::jotforms());
        self.mutations
            .run(&spec, async {
                self.client
                    .jotforms()
                    .change_status(&jotform.id, &status)
                    .await?;
                Ok(true)
            })
            .await
    }

    pub async fn delete_jotform(&self, id: &str) -> Result<(), ServiceError> {
        let spec = MutationSpec::new(
            "delete-jotform",
            "Deleting form...",
            "Form deleted",
            "Failed to delete form",
        )
        .invalidates(QueryKey::jotforms());
        self.mutations
            .run(&spec, async { Ok(self.client.jotforms().delete(id).await?) })
            .await
    }

    // Bug reports

    /// Send a bug report signed with the user's first name. Fails before any
    /// request when no profile is available.
    pub async fn report_bug(&self, draft: NewBugReport) -> Result<(), ServiceError> {
        let profile = self.shell.get_user_info().await.map_err(|e| {
            warn!(error = %e, "Cannot send bug report without a user profile");
            ServiceError::ProfileUnavailable
        })?;
        let report = BugReport::from_draft(draft, profile.given_name);
        let spec = MutationSpec::new(
            "report-bug",
            "Sending bug report...",
            "Bug report sent",
            "Failed to send bug report",
        );
        self.mutations
            .run(&spec, async {
                Ok(self.client.bug_reports().submit(&report).await?)
            })
            .await
    }

    // Development

    pub async fn seed_dummy_data(&self) -> Result<(), ServiceError> {
        let spec = MutationSpec::new(
            "create-dummy-exhibits",
            "Seeding data...",
            "Dummy data created",
            "Failed to seed data",
        )
        .invalidates(QueryKey::root());
        self.mutations
            .run(&spec, async {
                Ok(self.client.dev().create_dummy_exhibits().await?)
            })
            .await
    }

    pub async fn reset_backend(&self) -> Result<(), ServiceError> {
        let spec = MutationSpec::new(
            "reset",
            "Resetting data...",
            "All data cleared",
            "Failed to reset data",
        )
        .invalidates(QueryKey::root());
        self.mutations
            .run(&spec, async { Ok(self.client.dev().reset().await?) })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{notification::NoopNotifier, shell::LocalShell};

    #[test]
    fn test_note_writes_follow_their_owner() {
        let exhibit = note_write(&NoteOwner::exhibit("1"), "n", "p", "s", "f");
        assert_eq!(
            exhibit.invalidates,
            vec![QueryKey::exhibits(), QueryKey::exhibit_records()]
        );

        let part = note_write(&NoteOwner::part("7"), "n", "p", "s", "f");
        assert_eq!(part.invalidates, vec![QueryKey::parts(), QueryKey::part_records()]);
    }

    #[test]
    fn test_part_batches_fall_under_parts_prefix() {
        let batch = QueryKey::parts_by_ids(&["7".to_string(), "9".to_string()]);
        let spec = part_write("edit-part", "p", "s", "f");
        assert!(spec.invalidates.iter().any(|key| batch.starts_with(key)));
        assert!(!QueryKey::random_exhibit().starts_with(&QueryKey::exhibits()));
    }

    #[tokio::test]
    async fn test_unreachable_backend_surfaces_client_error() {
        let client = InventoryClient::new("http://127.0.0.1:9").unwrap();
        let inventory = Inventory::new(
            client,
            Arc::new(LocalShell::new(None)),
            Arc::new(NoopNotifier),
        )
        .with_query_options(
            QueryOptions::stale_window().with_retry_delay(std::time::Duration::from_millis(1)),
        );

        let err = inventory.jotforms().await.unwrap_err();
        assert!(err.status().is_none());
        assert!(matches!(
            err,
            ServiceError::Query(QueryError::Client(
                ClientError::Transport(_) | ClientError::Timeout
            ))
        ));
    }

    #[tokio::test]
    async fn test_bug_report_needs_profile() {
        let client = InventoryClient::new("http://127.0.0.1:9").unwrap();
        let inventory = Inventory::new(
            client,
            Arc::new(LocalShell::new(None)),
            Arc::new(NoopNotifier),
        );
        let err = inventory
            .report_bug(NewBugReport {
                title: "Crash".into(),
                description: "On launch".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ProfileUnavailable));
    }
}
