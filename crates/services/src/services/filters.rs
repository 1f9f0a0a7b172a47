//! Client-side search, categorical filtering and ordering of fetched collections.
//!
//! Everything here is pure: the same records and filter state always produce
//! the same rows in the same order.

use std::{borrow::Cow, cmp::Ordering, collections::HashSet, fmt};

use models::{Department, Exhibit, ExhibitStatus, Jotform, JotformStatus, Note, Part};
use strum_macros::{Display, EnumString};

/// A record the search box and filter dropdowns can act on.
pub trait Searchable {
    type Field: Copy + Eq + fmt::Debug;

    /// Text the free-text search looks at.
    fn search_text(&self) -> Vec<Cow<'_, str>>;

    /// Values of `field` on this record. Most fields have exactly one.
    fn field_values(&self, field: Self::Field) -> Vec<Cow<'_, str>>;

    fn matches_search(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let needle = term.to_lowercase();
        self.search_text()
            .iter()
            .any(|text| text.to_lowercase().contains(&needle))
    }

    fn matches_field(&self, field: Self::Field, value: &str) -> bool {
        self.field_values(field).iter().any(|v| v == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExhibitField {
    Cluster,
    Location,
    Status,
}

impl ExhibitField {
    /// Spell a typed filter value the way records store it, so `operational`
    /// selects `Operational`. Free-text fields pass through unchanged.
    pub fn canonical_value(self, raw: &str) -> String {
        match self {
            ExhibitField::Status => raw
                .parse::<ExhibitStatus>()
                .map_or_else(|_| raw.to_string(), |status| status.as_str().to_string()),
            ExhibitField::Cluster | ExhibitField::Location => raw.to_string(),
        }
    }
}

impl Searchable for Exhibit {
    type Field = ExhibitField;

    fn search_text(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(self.name.as_str())]
    }

    fn field_values(&self, field: ExhibitField) -> Vec<Cow<'_, str>> {
        let value = match field {
            ExhibitField::Cluster => Cow::Borrowed(self.cluster.as_str()),
            ExhibitField::Location => Cow::Borrowed(self.location.as_str()),
            ExhibitField::Status => Cow::Borrowed(self.status.as_str()),
        };
        vec![value]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PartField {
    /// Membership: matches parts that reference the exhibit id.
    Exhibit,
}

impl Searchable for Part {
    type Field = PartField;

    fn search_text(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(self.name.as_str())]
    }

    fn field_values(&self, field: PartField) -> Vec<Cow<'_, str>> {
        match field {
            PartField::Exhibit => self
                .exhibit_ids
                .iter()
                .map(|id| Cow::Borrowed(id.as_str()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum JotformField {
    Department,
    Status,
}

impl JotformField {
    /// See [`ExhibitField::canonical_value`].
    pub fn canonical_value(self, raw: &str) -> String {
        match self {
            JotformField::Department => raw
                .parse::<Department>()
                .map_or_else(|_| raw.to_string(), |d| d.as_str().to_string()),
            JotformField::Status => raw
                .parse::<JotformStatus>()
                .map_or_else(|_| raw.to_string(), |status| status.as_str().to_string()),
        }
    }
}

impl Searchable for Jotform {
    type Field = JotformField;

    fn search_text(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.id.as_str()),
            Cow::Borrowed(self.submitter_name.first.as_str()),
            Cow::Borrowed(self.submitter_name.last.as_str()),
            Cow::Borrowed(self.created_at.date.as_str()),
            Cow::Borrowed(self.created_at.time.as_str()),
            Cow::Borrowed(self.location.as_str()),
            Cow::Borrowed(self.exhibit_name.as_str()),
            Cow::Borrowed(self.description.as_str()),
            Cow::Borrowed(self.priority_level.as_str()),
            Cow::Borrowed(self.department.as_str()),
            Cow::Borrowed(self.status.as_str()),
        ]
    }

    fn field_values(&self, field: JotformField) -> Vec<Cow<'_, str>> {
        let value = match field {
            JotformField::Department => self.department.as_str(),
            JotformField::Status => self.status.as_str(),
        };
        vec![Cow::Borrowed(value)]
    }
}

/// Search box contents plus the selected value of each filter dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState<F> {
    search: String,
    filters: Vec<(F, String)>,
}

impl<F> Default for FilterState<F> {
    fn default() -> Self {
        Self {
            search: String::new(),
            filters: Vec::new(),
        }
    }
}

impl<F: Copy + Eq> FilterState<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Returns whether the term changed.
    pub fn set_search(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if term == self.search {
            return false;
        }
        self.search = term;
        true
    }

    /// Select a value for `field`, or clear it with `None`. An empty string clears too.
    /// Returns whether anything changed.
    pub fn set_filter(&mut self, field: F, value: Option<String>) -> bool {
        let value = value.filter(|v| !v.is_empty());
        let existing = self.filters.iter().position(|(f, _)| *f == field);
        match (existing, value) {
            (Some(i), Some(value)) => {
                if self.filters[i].1 == value {
                    return false;
                }
                self.filters[i].1 = value;
            }
            (Some(i), None) => {
                self.filters.remove(i);
            }
            (None, Some(value)) => self.filters.push((field, value)),
            (None, None) => return false,
        }
        true
    }

    pub fn filter(&self, field: F) -> Option<&str> {
        self.filters
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn filters(&self) -> impl Iterator<Item = (F, &str)> {
        self.filters.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Clear the dropdowns. The search term is left alone.
    pub fn clear_filters(&mut self) -> bool {
        let changed = !self.filters.is_empty();
        self.filters.clear();
        changed
    }

    pub fn clear_all(&mut self) -> bool {
        let changed = self.clear_filters();
        self.set_search(String::new()) || changed
    }

    /// True when any dropdown has a selection.
    pub fn is_filter_applied(&self) -> bool {
        !self.filters.is_empty()
    }

    /// True when the search box or any dropdown narrows the view.
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.is_filter_applied()
    }
}

/// Rows matching the search term and every selected filter, in input order.
pub fn apply<T>(records: &[T], state: &FilterState<T::Field>) -> Vec<T>
where
    T: Searchable + Clone,
{
    records
        .iter()
        .filter(|record| record.matches_search(state.search()))
        .filter(|record| {
            state
                .filters()
                .all(|(field, value)| record.matches_field(field, value))
        })
        .cloned()
        .collect()
}

/// Distinct values of `field`, in the order they first appear. Feeds a dropdown.
pub fn options<T: Searchable>(records: &[T], field: T::Field) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for record in records {
        for value in record.field_values(field) {
            if seen.insert(value.clone()) {
                out.push(value.into_owned());
            }
        }
    }
    out
}

/// Case-insensitive first, then case-sensitive so the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Exhibit {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Part {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Ascending by name. Stable.
pub fn sort_by_name<T: Named>(records: &mut [T]) {
    records.sort_by(|a, b| compare_names(a.name(), b.name()));
}

/// Status bucket first, newest submission first within a bucket. Forms whose date
/// can't be parsed go last in their bucket. Stable, so equal keys keep input order.
pub fn sort_jotforms(jotforms: &mut [Jotform]) {
    jotforms.sort_by(|a, b| {
        a.status
            .status_group()
            .cmp(&b.status.status_group())
            .then_with(|| match (a.created_at.parsed_date(), b.created_at.parsed_date()) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });
}

/// Newest first; unreadable timestamps sink to the bottom.
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(|a, b| match (a.timestamp.to_datetime(), b.timestamp.to_datetime()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Ordering applied after filtering.
pub type SortFn<T> = fn(&mut [T]);

/// "Showing X of Y".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSummary {
    pub shown: usize,
    pub total: usize,
}

impl fmt::Display for ViewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Showing {} of {}", self.shown, self.total)
    }
}

/// A filtered, sorted view over a collection that recomputes only when its
/// records or filter state change.
#[derive(Debug, Clone)]
pub struct DerivedView<T: Searchable> {
    records: Vec<T>,
    state: FilterState<T::Field>,
    sort: Option<SortFn<T>>,
    rows: Vec<T>,
    generation: u64,
    computed_for: Option<u64>,
}

impl<T> DerivedView<T>
where
    T: Searchable + Clone,
{
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            state: FilterState::default(),
            sort: None,
            rows: Vec::new(),
            generation: 0,
            computed_for: None,
        }
    }

    pub fn with_sort(mut self, sort: SortFn<T>) -> Self {
        self.sort = Some(sort);
        self.generation += 1;
        self
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn filter_state(&self) -> &FilterState<T::Field> {
        &self.state
    }

    pub fn set_records(&mut self, records: Vec<T>) {
        self.records = records;
        self.generation += 1;
    }

    /// Edit the filter state. The view is only marked dirty if something changed.
    pub fn update_filters(&mut self, edit: impl FnOnce(&mut FilterState<T::Field>) -> bool) {
        if edit(&mut self.state) {
            self.generation += 1;
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.update_filters(|state| state.set_search(term));
    }

    pub fn set_filter(&mut self, field: T::Field, value: Option<String>) {
        self.update_filters(|state| state.set_filter(field, value));
    }

    pub fn clear_filters(&mut self) {
        self.update_filters(FilterState::clear_filters);
    }

    pub fn options(&self, field: T::Field) -> Vec<String> {
        options(&self.records, field)
    }

    pub fn rows(&mut self) -> &[T] {
        if self.computed_for != Some(self.generation) {
            let mut rows = apply(&self.records, &self.state);
            if let Some(sort) = self.sort {
                sort(&mut rows);
            }
            self.rows = rows;
            self.computed_for = Some(self.generation);
        }
        &self.rows
    }

    pub fn summary(&mut self) -> ViewSummary {
        let shown = self.rows().len();
        ViewSummary {
            shown,
            total: self.records.len(),
        }
    }

    /// Bumped whenever the records, filters or sort change.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use models::{
        Department, ExhibitStatus, JotformStatus, NoteTimestamp, Priority, SubmissionDate,
        SubmitterName,
    };

    use super::*;

    fn exhibit(id: &str, name: &str, cluster: &str, location: &str, status: ExhibitStatus) -> Exhibit {
        Exhibit {
            id: id.into(),
            name: name.into(),
            cluster: cluster.into(),
            location: location.into(),
            status,
            part_ids: Vec::new(),
            notes: Vec::new(),
            image_url: None,
            sponsorship: None,
        }
    }

    fn jotform(id: &str, status: JotformStatus, date: &str) -> Jotform {
        Jotform {
            id: id.into(),
            submitter_name: SubmitterName {
                first: "Grace".into(),
                last: "Hopper".into(),
            },
            created_at: SubmissionDate {
                date: date.into(),
                time: "09:00:00".into(),
            },
            location: "Hall A".into(),
            exhibit_name: "Comet".into(),
            description: "Flicker".into(),
            priority_level: Priority::High,
            department: Department::Exhibits,
            status,
        }
    }

    fn sample() -> Vec<Exhibit> {
        vec![
            exhibit("1", "Comet", "Space", "Hall A", ExhibitStatus::Operational),
            exhibit("2", "Robot Arm", "Engineering", "Hall B", ExhibitStatus::NeedsRepair),
            exhibit("3", "Atom Smasher", "Physics", "Hall A", ExhibitStatus::Operational),
            exhibit("4", "comet tail", "Space", "Hall C", ExhibitStatus::OutOfService),
        ]
    }

    fn names<T: Named>(rows: &[T]) -> Vec<&str> {
        rows.iter().map(Named::name).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_and_idempotent() {
        let records = sample();
        let mut state = FilterState::new();
        state.set_search("COMET");

        let once = apply(&records, &state);
        assert_eq!(names(&once), ["Comet", "comet tail"]);
        assert_eq!(apply(&once, &state), once);
    }

    #[test]
    fn test_filters_intersect() {
        let records = sample();
        let mut state = FilterState::new();
        state.set_filter(ExhibitField::Location, Some("Hall A".into()));
        let by_location = apply(&records, &state);

        let mut status_only = FilterState::new();
        status_only.set_filter(ExhibitField::Status, Some("Operational".into()));
        let by_status = apply(&records, &status_only);

        state.set_filter(ExhibitField::Status, Some("Operational".into()));
        let both = apply(&records, &state);

        let expected: Vec<_> = by_location
            .iter()
            .filter(|e| by_status.contains(e))
            .cloned()
            .collect();
        assert_eq!(both, expected);
        assert_eq!(names(&both), ["Comet", "Atom Smasher"]);
    }

    #[test]
    fn test_typed_status_matches_stored_spelling() {
        let records = sample();
        for typed in ["operational", "OPERATIONAL", "Operational"] {
            let mut state = FilterState::new();
            let value = ExhibitField::Status.canonical_value(typed);
            state.set_filter(ExhibitField::Status, Some(value));
            assert_eq!(names(&apply(&records, &state)), ["Comet", "Atom Smasher"]);
        }
        assert_eq!(ExhibitField::Status.canonical_value("needs_repair"), "Needs Repair");
        assert_eq!(ExhibitField::Status.canonical_value("Retired"), "Retired");
        assert_eq!(ExhibitField::Cluster.canonical_value("space"), "space");
        assert_eq!(JotformField::Status.canonical_value("in progress"), "InProgress");
        assert_eq!(JotformField::Department.canonical_value("operations"), "Operations");
    }

    #[test]
    fn test_unmatched_filter_yields_nothing() {
        let mut state = FilterState::new();
        state.set_filter(ExhibitField::Cluster, Some("Botany".into()));
        assert!(apply(&sample(), &state).is_empty());
        assert!(apply::<Exhibit>(&[], &state).is_empty());
    }

    #[test]
    fn test_clearing_restores_original() {
        let records = sample();
        let mut state = FilterState::new();
        state.set_search("a");
        state.set_filter(ExhibitField::Cluster, Some("Space".into()));
        assert!(state.is_filter_applied());

        assert!(state.clear_filters());
        assert!(!state.is_filter_applied());
        assert_eq!(state.search(), "a");
        assert!(state.is_active());

        assert!(state.clear_all());
        assert!(!state.is_active());
        assert_eq!(apply(&records, &state), records);
    }

    #[test]
    fn test_empty_filter_value_clears() {
        let mut state = FilterState::new();
        assert!(state.set_filter(ExhibitField::Cluster, Some("Space".into())));
        assert!(!state.set_filter(ExhibitField::Cluster, Some("Space".into())));
        assert!(state.set_filter(ExhibitField::Cluster, Some(String::new())));
        assert_eq!(state.filter(ExhibitField::Cluster), None);
    }

    #[test]
    fn test_options_first_seen_order() {
        let records = sample();
        assert_eq!(options(&records, ExhibitField::Location), ["Hall A", "Hall B", "Hall C"]);
        assert_eq!(options(&records, ExhibitField::Cluster), ["Space", "Engineering", "Physics"]);
        assert_eq!(
            options(&records, ExhibitField::Status),
            ["Operational", "Needs Repair", "Out of Service"]
        );
    }

    #[test]
    fn test_part_membership_filter() {
        let parts = vec![
            Part {
                id: "P1".into(),
                name: "Servo".into(),
                link: String::new(),
                exhibit_ids: vec!["E1".into(), "E2".into()],
                notes: Vec::new(),
            },
            Part {
                id: "P2".into(),
                name: "Lens".into(),
                link: String::new(),
                exhibit_ids: vec!["E2".into()],
                notes: Vec::new(),
            },
        ];
        let mut state = FilterState::new();
        state.set_filter(PartField::Exhibit, Some("E1".into()));
        assert_eq!(names(&apply(&parts, &state)), ["Servo"]);
        assert_eq!(options(&parts, PartField::Exhibit), ["E1", "E2"]);
    }

    #[test]
    fn test_sort_by_name() {
        let mut records = vec![
            exhibit("1", "Comet", "", "", ExhibitStatus::Operational),
            exhibit("2", "Robot Arm", "", "", ExhibitStatus::Operational),
            exhibit("3", "Atom Smasher", "", "", ExhibitStatus::Operational),
        ];
        sort_by_name(&mut records);
        assert_eq!(names(&records), ["Atom Smasher", "Comet", "Robot Arm"]);

        let mut mixed = vec![
            exhibit("1", "beta", "", "", ExhibitStatus::Operational),
            exhibit("2", "Alpha", "", "", ExhibitStatus::Operational),
            exhibit("3", "alpha", "", "", ExhibitStatus::Operational),
        ];
        sort_by_name(&mut mixed);
        assert_eq!(names(&mixed), ["Alpha", "alpha", "beta"]);
    }

    #[test]
    fn test_sort_jotforms_buckets_then_recency() {
        let mut forms = vec![
            jotform("closed", JotformStatus::Closed, "2024-03-01"),
            jotform("progress", JotformStatus::InProgress, "2024-01-01"),
            jotform("unplanned", JotformStatus::Unplanned, "2024-05-01"),
            jotform("open", JotformStatus::Open, "2024-03-05"),
        ];
        sort_jotforms(&mut forms);
        let ids: Vec<_> = forms.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["progress", "open", "closed", "unplanned"]);
    }

    #[test]
    fn test_sort_jotforms_is_stable_and_handles_bad_dates() {
        let mut forms = vec![
            jotform("a", JotformStatus::Open, "2024-03-01"),
            jotform("garbled", JotformStatus::Open, "03/04/2024"),
            jotform("b", JotformStatus::Closed, "2024-03-01"),
            jotform("odd", JotformStatus::Other("Triage".into()), "2024-09-01"),
            jotform("c", JotformStatus::Open, "2024-03-01"),
        ];
        sort_jotforms(&mut forms);
        let ids: Vec<_> = forms.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "garbled", "odd"]);
    }

    #[test]
    fn test_jotform_search_covers_submitter() {
        let forms = vec![
            jotform("1", JotformStatus::Open, "2024-03-01"),
            Jotform {
                submitter_name: SubmitterName {
                    first: "Alan".into(),
                    last: "Turing".into(),
                },
                ..jotform("2", JotformStatus::Closed, "2024-03-02")
            },
        ];
        let mut state = FilterState::new();
        state.set_search("turing");
        assert_eq!(apply(&forms, &state).len(), 1);

        state.set_search("");
        state.set_filter(JotformField::Status, Some("Closed".into()));
        assert_eq!(apply(&forms, &state)[0].id, "2");
        assert_eq!(options(&forms, JotformField::Department), ["Exhibits"]);
    }

    #[test]
    fn test_sort_notes_newest_first() {
        let note = |id: &str, date: &str, time: &str| Note {
            id: id.into(),
            timestamp: NoteTimestamp::new(date, time),
            submitter: String::new(),
            message: String::new(),
        };
        let mut notes = vec![
            note("old", "2024-01-01", "08:00:00"),
            note("bad", "someday", ""),
            note("new", "2024-01-01", "17:30"),
            note("mid", "2024-01-01", "12:00:00"),
        ];
        sort_notes(&mut notes);
        let ids: Vec<_> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old", "bad"]);
    }

    #[test]
    fn test_derived_view_recomputes_only_on_change() {
        let mut view = DerivedView::new(sample()).with_sort(sort_by_name);
        assert_eq!(
            names(view.rows()),
            ["Atom Smasher", "Comet", "comet tail", "Robot Arm"]
        );
        let generation = view.generation();

        view.set_search("");
        view.clear_filters();
        assert_eq!(view.generation(), generation);

        view.set_filter(ExhibitField::Cluster, Some("Space".into()));
        assert_eq!(view.generation(), generation + 1);
        assert_eq!(names(view.rows()), ["Comet", "comet tail"]);
        assert_eq!(view.summary().to_string(), "Showing 2 of 4");

        view.set_records(Vec::new());
        assert_eq!(view.summary(), ViewSummary { shown: 0, total: 0 });
    }
}
