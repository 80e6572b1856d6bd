//! Topical clustering of free-text notes.
//!
//! `notecluster` turns note bodies into TF-IDF vectors and partitions them with
//! k-means, so related notes can be surfaced together.
//!
//! - [`text`]: preprocessing (case folding, tokenization, stopwords) and TF-IDF
//! - [`mod@cluster`]: k-means (random or k-means++ seeding, Lloyd iterations)
//! - [`pipeline`]: the one-shot run from a note snapshot to `note id → label`
//! - [`note`]: notes, the [`Document`] view, and an in-memory repository
//!
//! ```rust
//! use notecluster::{cluster, ClusterConfig, NoteId};
//!
//! let notes = [
//!     (1, "cats and dogs"),
//!     (2, "dogs and cats"),
//!     (3, "stock market rises"),
//!     (4, "market stocks climb"),
//! ];
//! let report = cluster(&notes, &ClusterConfig::new(2)).unwrap();
//!
//! assert_eq!(report.label(NoteId(1)), report.label(NoteId(2)));
//! assert_eq!(report.label(NoteId(3)), report.label(NoteId(4)));
//! assert_ne!(report.label(NoteId(1)), report.label(NoteId(3)));
//! ```

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod note;
pub mod pipeline;
pub mod text;

pub use cluster::{Clustering, Kmeans, KmeansFit, KmeansInit};
pub use error::{Error, Result};
pub use note::{Document, Note, NoteId, NoteList, NoteRepository};
pub use pipeline::{assign, cluster, ClusterConfig, ClusterReport, Pipeline, Stage};
pub use text::{Prepared, Preprocessor, StopWords, TfidfModel, TfidfVectorizer, Vocabulary};
