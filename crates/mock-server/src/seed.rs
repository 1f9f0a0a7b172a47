//! Fixture data served by `GET /create-dummy-exhibits`.

use models::{
    Department, Exhibit, ExhibitStatus, Jotform, JotformStatus, Note, NoteTimestamp, Part,
    Priority, Sponsorship, SubmissionDate, SubmitterName,
};

use crate::state::MockStore;

const EXHIBITS: [(&str, &str, &str, ExhibitStatus); 4] = [
    ("Comet", "Space", "Hall A", ExhibitStatus::Operational),
    ("Robot Arm", "Engineering", "Hall B", ExhibitStatus::NeedsRepair),
    ("Atom Smasher", "Physics", "Hall A", ExhibitStatus::Operational),
    ("Wave Tank", "Physics", "Hall C", ExhibitStatus::OutOfService),
];

pub fn populate(store: &mut MockStore) {
    let mut exhibit_ids = Vec::new();
    for (name, cluster, location, status) in EXHIBITS {
        let id = store.next_id();
        let note_id = store.next_id();
        store.exhibits.push(Exhibit {
            id: id.clone(),
            name: name.to_string(),
            cluster: cluster.to_string(),
            location: location.to_string(),
            status,
            part_ids: Vec::new(),
            notes: vec![Note {
                id: note_id,
                timestamp: NoteTimestamp::new("2024-01-15", "10:30:00"),
                submitter: "Seed".to_string(),
                message: format!("{name} installed"),
            }],
            image_url: None,
            sponsorship: (cluster == "Space").then(|| Sponsorship {
                sponsor_name: "Orbital Friends".to_string(),
                start_date: "2024-01-01".to_string(),
                end_date: "2025-01-01".to_string(),
            }),
        });
        exhibit_ids.push(id);
    }

    let parts = [
        ("Servo Motor", "https://parts.example/servo", vec![1usize]),
        ("LED Strip", "https://parts.example/led", vec![0, 2]),
        ("Pump", "https://parts.example/pump", vec![3]),
    ];
    for (name, link, owners) in parts {
        let id = store.next_id();
        let owners: Vec<String> = owners.iter().map(|&i| exhibit_ids[i].clone()).collect();
        for exhibit in store.exhibits.iter_mut().filter(|e| owners.contains(&e.id)) {
            exhibit.part_ids.push(id.clone());
        }
        store.parts.push(Part {
            id,
            name: name.to_string(),
            link: link.to_string(),
            exhibit_ids: owners,
            notes: Vec::new(),
        });
    }

    let forms = [
        ("Grace", "Hopper", "2024-03-02", "Robot Arm", Priority::High, Department::Exhibits, JotformStatus::InProgress),
        ("Alan", "Turing", "2024-03-05", "Comet", Priority::Low, Department::Operations, JotformStatus::Open),
        ("Ada", "Lovelace", "2024-02-20", "Wave Tank", Priority::Medium, Department::Exhibits, JotformStatus::Closed),
        ("Edsger", "Dijkstra", "2024-03-07", "Lobby", Priority::NotApplicable, Department::NotApplicable, JotformStatus::Unplanned),
    ];
    for (first, last, date, exhibit_name, priority_level, department, status) in forms {
        let id = store.next_id();
        store.jotforms.push(Jotform {
            id,
            submitter_name: SubmitterName {
                first: first.to_string(),
                last: last.to_string(),
            },
            created_at: SubmissionDate {
                date: date.to_string(),
                time: "09:00:00".to_string(),
            },
            location: "Main Building".to_string(),
            exhibit_name: exhibit_name.to_string(),
            description: format!("Reported issue with {exhibit_name}"),
            priority_level,
            department,
            status,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_populate_links_both_sides() {
        let mut store = MockStore::default();
        populate(&mut store);
        assert_eq!(store.exhibits.len(), 4);
        for part in &store.parts {
            for exhibit_id in &part.exhibit_ids {
                let exhibit = store.exhibits.iter().find(|e| &e.id == exhibit_id).unwrap();
                assert!(exhibit.has_part(&part.id));
            }
        }
        assert_eq!(store.jotforms.len(), 4);
    }
}
