use std::{sync::Arc, time::Duration};

use axum::http::StatusCode;
use client::InventoryClient;
use mock_server::{MockOptions, MockServer};
use models::{
    ExhibitStatus, JotformStatus, NewBugReport, NewExhibit, NewPart, NoteOwner, UpdatePart,
    UserProfile,
};
use services::{
    Inventory, ServiceError,
    services::{
        filters::{DerivedView, ExhibitField, JotformField, sort_by_name, sort_jotforms},
        notification::{ChannelNotifier, NotificationPhase},
        query_cache::QueryOptions,
        shell::LocalShell,
    },
};

fn ada() -> UserProfile {
    UserProfile {
        id: "u1".into(),
        name: "Ada Lovelace".into(),
        given_name: "Ada".into(),
        family_name: "Lovelace".into(),
        picture: None,
    }
}

struct Harness {
    server: MockServer,
    inventory: Inventory,
    notifier: ChannelNotifier,
}

async fn setup_with(options: MockOptions, shell: LocalShell) -> Harness {
    let server = MockServer::spawn_with(options).await.unwrap();
    let client = InventoryClient::new(server.base_url()).unwrap();
    let notifier = ChannelNotifier::default();
    let inventory = Inventory::new(client, Arc::new(shell), Arc::new(notifier.clone()))
        .with_query_options(
            QueryOptions::stale_window().with_retry_delay(Duration::from_millis(10)),
        );
    Harness {
        server,
        inventory,
        notifier,
    }
}

async fn setup() -> Harness {
    setup_with(MockOptions::default(), LocalShell::signed_in(ada())).await
}

#[tokio::test]
async fn test_reads_are_served_from_cache_until_a_write() {
    let h = setup().await;
    h.server.seed().await;

    let first = h.inventory.exhibits().await.unwrap();
    let again = h.inventory.exhibits().await.unwrap();
    assert_eq!(first.len(), 4);
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(h.server.state().request_count("GET /exhibits").await, 1);

    let exhibit = first.iter().find(|e| e.name == "Comet").unwrap();
    let note_id = exhibit.notes[0].id.clone();
    h.inventory
        .delete_note(&NoteOwner::exhibit(&exhibit.id), &note_id)
        .await
        .unwrap();

    let after = h.inventory.exhibits().await.unwrap();
    let comet = after.iter().find(|e| e.name == "Comet").unwrap();
    assert!(comet.notes.is_empty());
    assert_eq!(h.server.state().request_count("GET /exhibits").await, 2);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let h = setup().await;
    h.server.seed().await;
    h.server
        .state()
        .fail_next(1, StatusCode::SERVICE_UNAVAILABLE)
        .await;

    let parts = h.inventory.parts().await.unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!(h.server.state().request_count("GET /parts").await, 2);
}

#[tokio::test]
async fn test_missing_record_is_not_retried() {
    let h = setup().await;

    let err = h.inventory.exhibit("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(h.server.state().request_count("GET /exhibits/missing").await, 1);
}

#[tokio::test]
async fn test_create_exhibit_notifies_and_refreshes_list() {
    let h = setup().await;
    let mut events = h.notifier.subscribe();
    assert!(h.inventory.exhibits().await.unwrap().is_empty());

    let id = h
        .inventory
        .create_exhibit(NewExhibit::new("Comet", "Space", "Hall A"))
        .await
        .unwrap();

    let pending = events.recv().await.unwrap();
    assert_eq!(pending.mutation, "create-exhibit");
    assert_eq!(pending.phase, NotificationPhase::Pending);
    assert_eq!(events.recv().await.unwrap().phase, NotificationPhase::Success);

    let exhibits = h.inventory.exhibits().await.unwrap();
    assert_eq!(exhibits.len(), 1);
    assert_eq!(exhibits[0].id, id);
}

#[tokio::test]
async fn test_blank_exhibit_name_is_rejected_locally() {
    let h = setup().await;
    let err = h
        .inventory
        .create_exhibit(NewExhibit::new("  ", "Space", "Hall A"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert!(h.server.state().requests().await.is_empty());
}

#[tokio::test]
async fn test_status_change_refreshes_cached_record() {
    let h = setup().await;
    let id = h
        .inventory
        .create_exhibit(NewExhibit::new("Comet", "Space", "Hall A"))
        .await
        .unwrap();
    assert_eq!(
        h.inventory.exhibit(&id).await.unwrap().status,
        ExhibitStatus::Operational
    );

    h.inventory
        .change_exhibit_status(&id, ExhibitStatus::NeedsRepair)
        .await
        .unwrap();
    assert_eq!(
        h.inventory.exhibit(&id).await.unwrap().status,
        ExhibitStatus::NeedsRepair
    );
}

#[tokio::test]
async fn test_unknown_exhibit_status_is_rejected_locally() {
    let h = setup().await;
    let id = h
        .inventory
        .create_exhibit(NewExhibit::new("Comet", "Space", "Hall A"))
        .await
        .unwrap();
    let sent = h.server.state().requests().await.len();

    let err = h
        .inventory
        .change_exhibit_status(&id, ExhibitStatus::Other("Retired".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert_eq!(h.server.state().requests().await.len(), sent);
    assert_eq!(
        h.server
            .state()
            .request_count(&format!("POST /exhibits/{id}/status"))
            .await,
        0
    );
}

#[tokio::test]
async fn test_new_part_appears_in_exhibit_batch() {
    let h = setup().await;
    let exhibit_id = h
        .inventory
        .create_exhibit(NewExhibit::new("Comet", "Space", "Hall A"))
        .await
        .unwrap();
    let before = h.inventory.exhibit(&exhibit_id).await.unwrap();
    assert!(h.inventory.exhibit_parts(&before).await.unwrap().is_empty());

    let part_id = h
        .inventory
        .create_part(NewPart::new("Servo", "https://parts.example/servo").for_exhibits([&exhibit_id]))
        .await
        .unwrap();

    // The backend links on create, so no extra add_part call is needed.
    let add_part = format!("POST /exhibits/{exhibit_id}/add_part");
    assert_eq!(h.server.state().request_count(&add_part).await, 0);

    let exhibit = h.inventory.exhibit(&exhibit_id).await.unwrap();
    assert!(exhibit.has_part(&part_id));
    let parts = h.inventory.exhibit_parts(&exhibit).await.unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "Servo");
}

#[tokio::test]
async fn test_unlinked_backend_is_reconciled() {
    let h = setup_with(
        MockOptions {
            link_on_create: false,
        },
        LocalShell::signed_in(ada()),
    )
    .await;
    let exhibit_id = h
        .inventory
        .create_exhibit(NewExhibit::new("Comet", "Space", "Hall A"))
        .await
        .unwrap();

    let part_id = h
        .inventory
        .create_part(NewPart::new("Servo", "https://parts.example/servo").for_exhibits([&exhibit_id]))
        .await
        .unwrap();

    let add_part = format!("POST /exhibits/{exhibit_id}/add_part");
    assert_eq!(h.server.state().request_count(&add_part).await, 1);
    let exhibit = h.inventory.exhibit(&exhibit_id).await.unwrap();
    assert_eq!(exhibit.part_ids, vec![part_id]);
}

#[tokio::test]
async fn test_part_saved_when_linking_fails() {
    let h = setup_with(
        MockOptions {
            link_on_create: false,
        },
        LocalShell::signed_in(ada()),
    )
    .await;
    let exhibit_id = h
        .inventory
        .create_exhibit(NewExhibit::new("Comet", "Space", "Hall A"))
        .await
        .unwrap();
    assert!(h.inventory.parts().await.unwrap().is_empty());
    assert!(h.inventory.exhibits().await.unwrap()[0].part_ids.is_empty());

    h.server
        .state()
        .fail_request("GET /exhibits", StatusCode::BAD_GATEWAY)
        .await;
    let err = h
        .inventory
        .create_part(NewPart::new("Servo", "https://parts.example/servo").for_exhibits([&exhibit_id]))
        .await
        .unwrap_err();

    let ServiceError::LinkFailed { part_id, .. } = &err else {
        panic!("expected a link failure, got {err:?}");
    };
    assert_eq!(err.status(), Some(502));
    assert_eq!(h.server.state().request_count("POST /parts").await, 1);

    let parts = h.inventory.parts().await.unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(&parts[0].id, part_id);
    assert_eq!(h.server.state().request_count("GET /parts").await, 2);

    // Linking again succeeds once the backend recovers.
    let mut update = UpdatePart::from(&parts[0]);
    update.exhibit_ids = vec![exhibit_id.clone()];
    h.inventory.edit_part(part_id, update).await.unwrap();
    let exhibit = h.inventory.exhibit(&exhibit_id).await.unwrap();
    assert_eq!(exhibit.part_ids, vec![part_id.clone()]);
}

#[tokio::test]
async fn test_edit_part_link_failure_still_refreshes_parts() {
    let h = setup_with(
        MockOptions {
            link_on_create: false,
        },
        LocalShell::signed_in(ada()),
    )
    .await;
    let part_id = h
        .inventory
        .create_part(NewPart::new("Pump", "https://parts.example/pump"))
        .await
        .unwrap();
    let part = h.inventory.part(&part_id).await.unwrap();
    assert_eq!(part.name, "Pump");

    h.server
        .state()
        .fail_request("GET /exhibits", StatusCode::SERVICE_UNAVAILABLE)
        .await;
    let mut update = UpdatePart::from(&*part);
    update.name = "Bilge Pump".into();
    let err = h.inventory.edit_part(&part_id, update).await.unwrap_err();
    assert!(matches!(err, ServiceError::LinkFailed { .. }));

    assert_eq!(h.inventory.part(&part_id).await.unwrap().name, "Bilge Pump");
}

#[tokio::test]
async fn test_edit_part_links_new_exhibits_only() {
    let h = setup_with(
        MockOptions {
            link_on_create: false,
        },
        LocalShell::signed_in(ada()),
    )
    .await;
    let comet = h
        .inventory
        .create_exhibit(NewExhibit::new("Comet", "Space", "Hall A"))
        .await
        .unwrap();
    let tank = h
        .inventory
        .create_exhibit(NewExhibit::new("Wave Tank", "Physics", "Hall C"))
        .await
        .unwrap();
    let part_id = h
        .inventory
        .create_part(NewPart::new("Pump", "https://parts.example/pump").for_exhibits([&comet]))
        .await
        .unwrap();

    let part = h.inventory.part(&part_id).await.unwrap();
    let mut update = UpdatePart::from(&*part);
    update.exhibit_ids = vec![comet.clone(), tank.clone(), "ghost".to_string()];
    h.inventory.edit_part(&part_id, update).await.unwrap();

    let state = h.server.state();
    assert_eq!(
        state
            .request_count(&format!("POST /exhibits/{comet}/add_part"))
            .await,
        1
    );
    assert_eq!(
        state
            .request_count(&format!("POST /exhibits/{tank}/add_part"))
            .await,
        1
    );
    assert_eq!(state.request_count("POST /exhibits/ghost/add_part").await, 0);
    assert!(h.inventory.exhibit(&tank).await.unwrap().has_part(&part_id));
}

#[tokio::test]
async fn test_empty_part_list_skips_backend() {
    let h = setup().await;
    let parts = h.inventory.parts_by_ids(&[]).await.unwrap();
    assert!(parts.is_empty());
    assert!(h.server.state().requests().await.is_empty());
}

#[tokio::test]
async fn test_note_defaults_to_signed_in_user() {
    let h = setup().await;
    let id = h
        .inventory
        .create_exhibit(NewExhibit::new("Comet", "Space", "Hall A"))
        .await
        .unwrap();
    let owner = NoteOwner::exhibit(&id);

    h.inventory
        .create_note(&owner, "Lamp flickers", None)
        .await
        .unwrap();
    h.inventory
        .create_note(&owner, "Replaced lamp", Some("Grace".into()))
        .await
        .unwrap();

    let exhibit = h.inventory.exhibit(&id).await.unwrap();
    let submitters: Vec<&str> = exhibit.notes.iter().map(|n| n.submitter.as_str()).collect();
    assert_eq!(submitters, vec!["Ada Lovelace", "Grace"]);
}

#[tokio::test]
async fn test_note_without_profile_fails() {
    let h = setup_with(MockOptions::default(), LocalShell::new(None)).await;
    let err = h
        .inventory
        .create_note(&NoteOwner::part("1"), "Worn gear", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ProfileUnavailable));
    assert!(h.server.state().requests().await.is_empty());
}

#[tokio::test]
async fn test_bug_report_carries_first_name() {
    let h = setup().await;
    h.inventory
        .report_bug(NewBugReport {
            title: "Crash".into(),
            description: "Filter panel froze".into(),
        })
        .await
        .unwrap();

    let reports = h.server.state().bug_reports().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name, "Ada");
    assert_eq!(reports[0].title, "Crash");
}

#[tokio::test]
async fn test_bug_report_without_profile_sends_nothing() {
    let h = setup_with(MockOptions::default(), LocalShell::new(Some(ada()))).await;
    let mut events = h.notifier.subscribe();

    let err = h
        .inventory
        .report_bug(NewBugReport {
            title: "Crash".into(),
            description: "Filter panel froze".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ProfileUnavailable));
    assert!(h.server.state().requests().await.is_empty());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_unchanged_jotform_status_is_a_noop() {
    let h = setup().await;
    h.server.seed().await;
    let forms = h.inventory.jotforms().await.unwrap();
    let form = forms.iter().find(|f| f.status == JotformStatus::Open).unwrap();
    let status_path = format!("POST /jotforms/{}/status", form.id);

    let changed = h
        .inventory
        .change_jotform_status(form, JotformStatus::Open)
        .await
        .unwrap();
    assert!(!changed);
    assert_eq!(h.server.state().request_count(&status_path).await, 0);

    let changed = h
        .inventory
        .change_jotform_status(form, JotformStatus::Closed)
        .await
        .unwrap();
    assert!(changed);
    assert_eq!(h.server.state().request_count(&status_path).await, 1);

    let refreshed = h.inventory.jotforms().await.unwrap();
    let form = refreshed.iter().find(|f| f.id == form.id).unwrap();
    assert_eq!(form.status, JotformStatus::Closed);
}

#[tokio::test]
async fn test_unknown_jotform_status_is_rejected_locally() {
    let h = setup().await;
    h.server.seed().await;
    let forms = h.inventory.jotforms().await.unwrap();
    let form = &forms[0];
    let sent = h.server.state().requests().await.len();

    let err = h
        .inventory
        .change_jotform_status(form, JotformStatus::Other("Escalated".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
    assert_eq!(h.server.state().requests().await.len(), sent);
}

#[tokio::test]
async fn test_jotform_delete_refreshes_list() {
    let h = setup().await;
    h.server.seed().await;
    let forms = h.inventory.jotforms().await.unwrap();
    h.inventory.delete_jotform(&forms[0].id).await.unwrap();
    assert_eq!(h.inventory.jotforms().await.unwrap().len(), forms.len() - 1);
}

#[tokio::test]
async fn test_jotform_table_order() {
    let h = setup().await;
    h.server.seed().await;

    let forms = h.inventory.jotforms().await.unwrap();
    let mut view = DerivedView::new(forms.to_vec()).with_sort(sort_jotforms);
    let order: Vec<&str> = view
        .rows()
        .iter()
        .map(|f| f.submitter_name.first.as_str())
        .collect();
    assert_eq!(order, vec!["Grace", "Alan", "Ada", "Edsger"]);

    view.set_filter(JotformField::Department, Some("Exhibits".into()));
    assert_eq!(view.summary().to_string(), "Showing 2 of 4");
}

#[tokio::test]
async fn test_exhibit_view_filters_cached_list() {
    let h = setup().await;
    h.server.seed().await;

    let exhibits = h.inventory.exhibits().await.unwrap();
    let mut view = DerivedView::new(exhibits.to_vec()).with_sort(sort_by_name);
    assert_eq!(view.options(ExhibitField::Cluster), vec!["Space", "Engineering", "Physics"]);

    view.set_filter(ExhibitField::Cluster, Some("Physics".into()));
    let names: Vec<&str> = view.rows().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Atom Smasher", "Wave Tank"]);

    view.set_search("tank");
    assert_eq!(view.summary().shown, 1);
}

#[tokio::test]
async fn test_seed_and_reset_refresh_everything() {
    let h = setup().await;
    assert!(h.inventory.exhibits().await.unwrap().is_empty());
    assert!(h.inventory.jotforms().await.unwrap().is_empty());

    h.inventory.seed_dummy_data().await.unwrap();
    assert_eq!(h.inventory.exhibits().await.unwrap().len(), 4);
    assert_eq!(h.inventory.jotforms().await.unwrap().len(), 4);

    h.inventory.reset_backend().await.unwrap();
    assert!(h.inventory.exhibits().await.unwrap().is_empty());
    assert!(h.inventory.parts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_profile_follows_session() {
    let h = setup_with(MockOptions::default(), LocalShell::new(Some(ada()))).await;
    assert!(h.inventory.profile().await.is_err());

    h.inventory.sign_in().await.unwrap();
    assert_eq!(h.inventory.profile().await.unwrap().given_name, "Ada");

    h.inventory.sign_out().await.unwrap();
    assert!(h.inventory.profile().await.is_err());
}
