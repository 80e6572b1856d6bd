//! Note text to vectors.
//!
//! [`Preprocessor`] lowercases, tokenizes on non-alphanumeric boundaries and drops
//! stopwords; [`TfidfVectorizer`] turns the surviving token lists into
//! L2-normalized TF-IDF vectors.
//!
//! ```rust
//! use notecluster::text::{Preprocessor, StopWords, TfidfVectorizer};
//!
//! let pre = Preprocessor::new(&StopWords::English);
//! let docs: Vec<Vec<String>> = ["cats and dogs", "stock market"]
//!     .iter()
//!     .filter_map(|t| pre.prepare(Some(t)).tokens().map(<[String]>::to_vec))
//!     .collect();
//!
//! let (model, vectors) = TfidfVectorizer::fit_transform(&docs);
//! assert_eq!(model.vocabulary().len(), 4);
//! assert_eq!(vectors.len(), 2);
//! ```

mod preprocess;
mod stopwords;
mod tfidf;

pub use preprocess::{Prepared, Preprocessor};
pub use stopwords::{StopWordSet, StopWords, ENGLISH};
pub use tfidf::{TfidfModel, TfidfVectorizer, Vocabulary};
