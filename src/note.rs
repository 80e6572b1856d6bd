//! Notes and the repository the pipeline reads from.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipeline::ClusterReport;

/// Repository-assigned note identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub u64);

impl From<u64> for NoteId {
    fn from(id: u64) -> Self {
        NoteId(id)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// `None` until the note is added to a repository.
    pub id: Option<NoteId>,
    /// Display title; never clustered.
    pub title: String,
    /// Body text; the only field clustering reads.
    pub text: String,
    /// When the note was built.
    pub created_at: DateTime<Utc>,
    /// Last text change; equals `created_at` for a fresh note.
    pub updated_at: DateTime<Utc>,
    /// Cluster label from the last run that covered this note.
    pub cluster: Option<usize>,
}

impl Note {
    /// A new, unstored note created now.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            title: title.into(),
            text: text.into(),
            created_at: now,
            updated_at: now,
            cluster: None,
        }
    }

    /// Set an explicit id.
    pub fn with_id(mut self, id: impl Into<NoteId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Replace the body and bump `updated_at`.
    pub fn update_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.updated_at = Utc::now();
    }
}

/// The `{id, text}` view the clustering pipeline reads.
pub trait Document {
    /// Note identity, `None` if the document has none yet.
    fn id(&self) -> Option<NoteId>;

    /// Body text; `None` counts as empty.
    fn text(&self) -> Option<&str>;
}

impl Document for Note {
    fn id(&self) -> Option<NoteId> {
        self.id
    }

    fn text(&self) -> Option<&str> {
        Some(&self.text)
    }
}

impl<D: Document + ?Sized> Document for &D {
    fn id(&self) -> Option<NoteId> {
        (**self).id()
    }

    fn text(&self) -> Option<&str> {
        (**self).text()
    }
}

impl Document for (u64, &str) {
    fn id(&self) -> Option<NoteId> {
        Some(NoteId(self.0))
    }

    fn text(&self) -> Option<&str> {
        Some(self.1)
    }
}

impl Document for (u64, String) {
    fn id(&self) -> Option<NoteId> {
        Some(NoteId(self.0))
    }

    fn text(&self) -> Option<&str> {
        Some(&self.1)
    }
}

impl Document for (u64, Option<&str>) {
    fn id(&self) -> Option<NoteId> {
        Some(NoteId(self.0))
    }

    fn text(&self) -> Option<&str> {
        self.1
    }
}

impl Document for (NoteId, &str) {
    fn id(&self) -> Option<NoteId> {
        Some(self.0)
    }

    fn text(&self) -> Option<&str> {
        Some(self.1)
    }
}

/// Where notes live between runs.
///
/// The pipeline never holds a repository; callers take a snapshot, cluster it,
/// and write the labels back.
pub trait NoteRepository {
    /// An owned, ordered copy of every stored note.
    fn snapshot(&self) -> Vec<Note>;

    /// Write a run's labels onto the stored notes. Returns how many were updated.
    ///
    /// Notes the report does not mention are left alone.
    fn apply_clusters(&mut self, report: &ClusterReport) -> usize;
}

/// In-memory note storage with auto-incrementing ids.
#[derive(Debug, Clone)]
pub struct NoteList {
    notes: Vec<Note>,
    next_id: u64,
}

impl NoteList {
    /// An empty list whose first assigned id is 1.
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            next_id: 1,
        }
    }

    /// Store a note, assigning the next free id when it has none.
    ///
    /// An explicit id already in the list is rejected with
    /// [`Error::DuplicateNoteId`] and the list is left unchanged.
    pub fn add_note(&mut self, mut note: Note) -> Result<NoteId> {
        let id = match note.id {
            Some(id) => {
                if self.get_note_by_id(id).is_some() {
                    return Err(Error::DuplicateNoteId(id));
                }
                self.next_id = self.next_id.max(id.0.saturating_add(1));
                id
            }
            None => {
                let id = NoteId(self.next_id);
                self.next_id += 1;
                id
            }
        };
        note.id = Some(id);
        self.notes.push(note);
        Ok(id)
    }

    /// The stored note with `id`.
    pub fn get_note_by_id(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == Some(id))
    }

    /// Mutable access to the stored note with `id`.
    pub fn get_note_by_id_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == Some(id))
    }

    /// Remove and return the note with `id`.
    ///
    /// Every stored note carrying `id` goes, even if one was given a clashing
    /// id through [`NoteList::get_note_by_id_mut`]; the first is returned.
    pub fn remove_note_by_id(&mut self, id: NoteId) -> Option<Note> {
        let pos = self.notes.iter().position(|n| n.id == Some(id))?;
        let removed = self.notes.remove(pos);
        self.notes.retain(|n| n.id != Some(id));
        Some(removed)
    }

    /// Stored notes in insertion order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Number of stored notes.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl Default for NoteList {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteRepository for NoteList {
    fn snapshot(&self) -> Vec<Note> {
        self.notes.clone()
    }

    fn apply_clusters(&mut self, report: &ClusterReport) -> usize {
        let mut updated = 0;
        for &(id, label) in report.assignments() {
            if let Some(note) = self.get_note_by_id_mut(id) {
                note.cluster = label;
                updated += 1;
            }
        }
        updated
    }
}
