//! Event records: shape, normalization and validation
//!
//! Preparing an event for persistence is an explicit two-phase pipeline:
//! [`normalize_event`] rewrites the fields that changed (slug from title,
//! date, time), then [`validate_event`] checks every constraint on the
//! result. [`prepare_event`] runs both and returns every violation at once.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::datetime::{normalize_date, normalize_time};
use crate::slug::generate_slug;
use crate::validation::{ValidationError, ValidationFailure};

/// Maximum title length (characters)
pub const MAX_TITLE_LEN: usize = 100;

/// Maximum description length (characters)
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Maximum overview length (characters)
pub const MAX_OVERVIEW_LEN: usize = 500;

/// Caller-editable event fields, in display order.
pub const EVENT_FIELDS: &[&str] = &[
    "title",
    "description",
    "overview",
    "image",
    "venue",
    "location",
    "date",
    "time",
    "mode",
    "audience",
    "agenda",
    "organizer",
    "tags",
];

/// How attendees take part in an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    Online,
    Offline,
    Hybrid,
}

impl EventMode {
    /// Allowed values, for error messages.
    pub const ALLOWED: &'static str = "online, offline, hybrid";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Hybrid => "hybrid",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Online, Self::Offline, Self::Hybrid]
    }
}

impl fmt::Display for EventMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(ValidationError::InvalidVariant {
                field: "mode",
                value: other.to_owned(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Caller-supplied event fields.
///
/// Every field is optional so a missing value is reported as a violation
/// instead of a deserialization error. On edit the same shape is a patch:
/// absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub overview: Option<String>,
    pub image: Option<String>,
    pub venue: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub mode: Option<String>,
    pub audience: Option<String>,
    pub agenda: Option<Vec<String>>,
    pub organizer: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Validated, normalized event fields ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// 24-hour `HH:MM`
    pub time: String,
    pub mode: EventMode,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
}

/// A persisted event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    #[serde(flatten)]
    pub record: EventRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a write touches.
///
/// Built by diffing a patch against the stored record, or stated
/// explicitly by the caller with [`EventChanges::with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventChanges {
    fields: BTreeSet<&'static str>,
}

impl EventChanges {
    /// Every field; used for new records.
    pub fn all() -> Self {
        Self {
            fields: EVENT_FIELDS.iter().copied().collect(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &'static str) -> Self {
        self.fields.insert(field);
        self
    }

    /// Fields in either set.
    pub fn union(mut self, other: &EventChanges) -> Self {
        self.fields.extend(other.iter());
        self
    }

    /// Fields that `patch` supplies with a value different from `previous`.
    pub fn between(patch: &EventInput, previous: &EventRecord) -> Self {
        let mut changes = Self::default();
        changes.text("title", &patch.title, &previous.title);
        changes.text("description", &patch.description, &previous.description);
        changes.text("overview", &patch.overview, &previous.overview);
        changes.text("image", &patch.image, &previous.image);
        changes.text("venue", &patch.venue, &previous.venue);
        changes.text("location", &patch.location, &previous.location);
        changes.text("date", &patch.date, &previous.date);
        changes.text("time", &patch.time, &previous.time);
        changes.text("mode", &patch.mode, previous.mode.as_str());
        changes.text("audience", &patch.audience, &previous.audience);
        changes.list("agenda", &patch.agenda, &previous.agenda);
        changes.text("organizer", &patch.organizer, &previous.organizer);
        changes.list("tags", &patch.tags, &previous.tags);
        changes
    }

    fn text(&mut self, field: &'static str, patch: &Option<String>, previous: &str) {
        if matches!(patch, Some(value) if value.trim() != previous) {
            self.fields.insert(field);
        }
    }

    fn list(&mut self, field: &'static str, patch: &Option<Vec<String>>, previous: &[String]) {
        if matches!(patch, Some(items) if clean_list(items) != previous) {
            self.fields.insert(field);
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().copied()
    }
}

/// Event fields after normalization, before constraint checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub overview: Option<String>,
    pub image: Option<String>,
    pub venue: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub mode: Option<String>,
    pub audience: Option<String>,
    pub agenda: Option<Vec<String>>,
    pub organizer: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Phase one: merge `input` over `previous` and normalize changed fields.
///
/// The slug is re-derived when the title is new or changed; date and time
/// are normalized under the same rule. A field counts as changed when
/// `changes` lists it or `input` supplies a value different from
/// `previous`, so a supplied date or time is never stored raw. Malformed
/// dates and times are returned as violations and the raw value is left
/// in the draft.
pub fn normalize_event(
    input: EventInput,
    previous: Option<&EventRecord>,
    changes: &EventChanges,
) -> (EventDraft, ValidationFailure) {
    let mut failure = ValidationFailure::new();
    let is_new = previous.is_none();
    let supplied = previous
        .map(|p| EventChanges::between(&input, p))
        .unwrap_or_default();
    let touched = |field: &str| is_new || changes.contains(field) || supplied.contains(field);

    let title = merge_text(input.title, previous.map(|p| p.title.as_str()));
    let slug = match (&title, previous) {
        (Some(title), _) if touched("title") && !title.is_empty() => Some(generate_slug(title)),
        (_, Some(previous)) => Some(previous.slug.clone()),
        _ => None,
    };

    let mut date = merge_text(input.date, previous.map(|p| p.date.as_str()));
    if let Some(raw) = date.as_mut().filter(|d| !d.is_empty() && touched("date")) {
        match normalize_date(raw.as_str()) {
            Ok(normalized) => *raw = normalized,
            Err(e) => failure.push(e),
        }
    }

    let mut time = merge_text(input.time, previous.map(|p| p.time.as_str()));
    if let Some(raw) = time.as_mut().filter(|t| !t.is_empty() && touched("time")) {
        match normalize_time(raw.as_str()) {
            Ok(normalized) => *raw = normalized,
            Err(e) => failure.push(e),
        }
    }

    let draft = EventDraft {
        title,
        slug,
        description: merge_text(input.description, previous.map(|p| p.description.as_str())),
        overview: merge_text(input.overview, previous.map(|p| p.overview.as_str())),
        image: merge_text(input.image, previous.map(|p| p.image.as_str())),
        venue: merge_text(input.venue, previous.map(|p| p.venue.as_str())),
        location: merge_text(input.location, previous.map(|p| p.location.as_str())),
        date,
        time,
        mode: merge_text(input.mode, previous.map(|p| p.mode.as_str())),
        audience: merge_text(input.audience, previous.map(|p| p.audience.as_str())),
        agenda: merge_list(input.agenda, previous.map(|p| p.agenda.as_slice())),
        organizer: merge_text(input.organizer, previous.map(|p| p.organizer.as_str())),
        tags: merge_list(input.tags, previous.map(|p| p.tags.as_slice())),
    };

    (draft, failure)
}

/// Phase two: check required fields, length bounds, mode and non-empty lists.
///
/// Every violation is collected; the record is only built when there are none.
pub fn validate_event(draft: EventDraft) -> Result<EventRecord, ValidationFailure> {
    let mut failure = ValidationFailure::new();

    let title = check_text(&mut failure, "title", draft.title, Some(MAX_TITLE_LEN));
    let slug = draft.slug.filter(|s| !s.is_empty());
    if title.is_some() && slug.is_none() {
        failure.push(ValidationError::Required { field: "slug" });
    }
    let description = check_text(
        &mut failure,
        "description",
        draft.description,
        Some(MAX_DESCRIPTION_LEN),
    );
    let overview = check_text(&mut failure, "overview", draft.overview, Some(MAX_OVERVIEW_LEN));
    let image = check_text(&mut failure, "image", draft.image, None);
    let venue = check_text(&mut failure, "venue", draft.venue, None);
    let location = check_text(&mut failure, "location", draft.location, None);
    let date = check_text(&mut failure, "date", draft.date, None);
    let time = check_text(&mut failure, "time", draft.time, None);
    let mode = match check_text(&mut failure, "mode", draft.mode, None) {
        Some(raw) => raw.parse::<EventMode>().map_err(|e| failure.push(e)).ok(),
        None => None,
    };
    let audience = check_text(&mut failure, "audience", draft.audience, None);
    let agenda = check_list(&mut failure, "agenda", draft.agenda);
    let organizer = check_text(&mut failure, "organizer", draft.organizer, None);
    let tags = check_list(&mut failure, "tags", draft.tags);

    let (
        Some(title),
        Some(slug),
        Some(description),
        Some(overview),
        Some(image),
        Some(venue),
        Some(location),
        Some(date),
        Some(time),
        Some(mode),
        Some(audience),
        Some(agenda),
        Some(organizer),
        Some(tags),
    ) = (
        title,
        slug,
        description,
        overview,
        image,
        venue,
        location,
        date,
        time,
        mode,
        audience,
        agenda,
        organizer,
        tags,
    )
    else {
        return Err(failure);
    };

    failure.into_result(EventRecord {
        title,
        slug,
        description,
        overview,
        image,
        venue,
        location,
        date,
        time,
        mode,
        audience,
        agenda,
        organizer,
        tags,
    })
}

/// Normalize then validate, diffing against `previous` to find changed fields.
///
/// # Example
/// ```
/// use devevent_core::event::{prepare_event, EventInput};
///
/// let input = EventInput {
///     title: Some("Rust Meetup".into()),
///     description: Some("Monthly meetup".into()),
///     overview: Some("Talks and pizza".into()),
///     image: Some("https://example.com/rust.png".into()),
///     venue: Some("Hall A".into()),
///     location: Some("Berlin".into()),
///     date: Some("March 5, 2025".into()),
///     time: Some("6:30 PM".into()),
///     mode: Some("offline".into()),
///     audience: Some("Developers".into()),
///     agenda: Some(vec!["Intro".into()]),
///     organizer: Some("Rust Berlin".into()),
///     tags: Some(vec!["rust".into()]),
/// };
/// let record = prepare_event(input, None).unwrap();
/// assert_eq!(record.date, "2025-03-05");
/// assert_eq!(record.time, "18:30");
/// assert!(record.slug.starts_with("rust-meetup-"));
/// ```
pub fn prepare_event(
    input: EventInput,
    previous: Option<&EventRecord>,
) -> Result<EventRecord, ValidationFailure> {
    let changes = match previous {
        Some(previous) => EventChanges::between(&input, previous),
        None => EventChanges::all(),
    };
    prepare_event_with(input, previous, &changes)
}

/// Normalize then validate with caller-stated changes.
pub fn prepare_event_with(
    input: EventInput,
    previous: Option<&EventRecord>,
    changes: &EventChanges,
) -> Result<EventRecord, ValidationFailure> {
    let (draft, mut failure) = normalize_event(input, previous, changes);
    match validate_event(draft) {
        Ok(record) => failure.into_result(record),
        Err(more) => {
            failure.extend(more);
            Err(failure)
        }
    }
}

/// Listing filter, backed by the `(date, mode)` index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub date: Option<String>,
    pub mode: Option<EventMode>,
}

impl EventFilter {
    /// Normalize the date so it compares against stored values.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let date = self.date.map(|d| normalize_date(&d)).transpose()?;
        Ok(Self { date, ..self })
    }

    pub fn matches(&self, event: &EventRecord) -> bool {
        self.date.as_ref().map_or(true, |d| *d == event.date)
            && self.mode.map_or(true, |m| m == event.mode)
    }
}

fn merge_text(value: Option<String>, previous: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .or_else(|| previous.map(str::to_owned))
}

fn merge_list(value: Option<Vec<String>>, previous: Option<&[String]>) -> Option<Vec<String>> {
    value
        .map(|items| clean_list(&items))
        .or_else(|| previous.map(<[String]>::to_vec))
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

fn check_text(
    failure: &mut ValidationFailure,
    field: &'static str,
    value: Option<String>,
    max: Option<usize>,
) -> Option<String> {
    let value = match value.filter(|v| !v.trim().is_empty()) {
        Some(value) => value,
        None => {
            failure.push(ValidationError::Required { field });
            return None;
        }
    };

    match max {
        Some(max) if value.chars().count() > max => {
            failure.push(ValidationError::TooLong { field, max });
            None
        }
        _ => Some(value),
    }
}

fn check_list(
    failure: &mut ValidationFailure,
    field: &'static str,
    value: Option<Vec<String>>,
) -> Option<Vec<String>> {
    match value {
        None => {
            failure.push(ValidationError::Required { field });
            None
        }
        Some(items) if items.is_empty() => {
            failure.push(ValidationError::Empty { field });
            None
        }
        Some(items) => Some(items),
    }
}
