use crate::error::Result;

/// A hard clustering algorithm over dense document vectors.
///
/// Every input vector receives exactly one label in `0..n_clusters()`.
pub trait Clustering {
    /// Fit the model and return one cluster label per input vector, in input order.
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>>;

    /// The configured number of clusters.
    fn n_clusters(&self) -> usize;
}
