//! Clustering of document vectors.
//!
//! ## K-means
//!
//! Assign each vector to the nearest centroid, then move every centroid to the
//! mean of its vectors. Repeat until nothing moves.
//!
//! **Objective**: minimize the within-cluster sum of squares (inertia):
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! TF-IDF note vectors are L2-normalized, so squared Euclidean distance between
//! two of them is `2 - 2·cos(a, b)`. Minimizing it groups notes by cosine
//! similarity.
//!
//! **Assumptions**:
//! - You know k in advance
//! - Topics are roughly "round" in term space
//!
//! ## Usage
//!
//! ```rust
//! use notecluster::cluster::{Clustering, Kmeans};
//!
//! let data = vec![
//!     vec![1.0, 0.0],
//!     vec![0.9, 0.1],
//!     vec![0.0, 1.0],
//!     vec![0.1, 0.9],
//! ];
//!
//! let labels = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

mod kmeans;
mod traits;
pub(crate) mod util;

pub use kmeans::{Kmeans, KmeansFit, KmeansInit};
pub use traits::Clustering;
