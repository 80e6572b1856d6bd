//! K-means: centroid-based hard clustering.
//!
//! # The Algorithm (Lloyd, 1982)
//!
//! 1. Pick k initial centroids from the data.
//! 2. Assign every point to its nearest centroid (squared Euclidean distance).
//! 3. Move every centroid to the mean of the points assigned to it.
//! 4. Repeat 2-3 until no point changes cluster, or the iteration cap is hit.
//!
//! ## Initialization
//!
//! - [`KmeansInit::Random`]: k distinct points sampled uniformly.
//! - [`KmeansInit::KmeansPlusPlus`]: the first centroid uniformly, each next one
//!   with probability proportional to its squared distance from the nearest
//!   centroid chosen so far (Arthur & Vassilvitskii, 2007).
//!
//! Both draw from a [`StdRng`] seeded with [`Kmeans::with_seed`], so a fit is a pure
//! function of `(data, k, seed, max_iter, init, n_init)`. With `n_init > 1` the
//! restarts consume the same RNG stream in sequence and the fit with the lowest
//! inertia is kept (ties keep the earliest).
//!
//! ## Empty clusters
//!
//! When a centroid ends an update step with no members, it is moved onto the point
//! that is currently farthest from its own centroid (ties: lowest point index), and
//! the assignment step runs once more before the iteration continues. Points used
//! for reseeding are not reused within the same step.
//!
//! ## Complexity
//!
//! - **Time**: O(n · k · d) per iteration.
//! - **Space**: O(k · d) for centroids plus O(n) for labels.
//!
//! ## References
//!
//! Lloyd (1982). "Least squares quantization in PCM." IEEE Trans. Inf. Theory.
//!
//! Arthur & Vassilvitskii (2007). "k-means++: The Advantages of Careful Seeding." SODA.

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::traits::Clustering;
use super::util::{nearest, squared_euclidean};
use crate::error::{Error, Result};

/// Centroid initialization strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KmeansInit {
    /// Sample k distinct points uniformly.
    Random,
    /// D²-weighted seeding.
    #[default]
    KmeansPlusPlus,
}

/// K-means clustering.
#[derive(Debug, Clone)]
pub struct Kmeans {
    k: usize,
    max_iter: usize,
    seed: u64,
    init: KmeansInit,
    n_init: usize,
}

/// Result of a k-means fit.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// Final centroids, `k` vectors of the input dimension.
    pub centroids: Vec<Vec<f32>>,
    /// Centroid index per input point, in `0..k`.
    pub labels: Vec<usize>,
    /// Lloyd iterations run by the returned fit.
    pub iterations: usize,
    /// False when the iteration cap was reached before labels settled.
    pub converged: bool,
    /// Sum of squared distances from each point to its centroid.
    pub inertia: f32,
}

impl Kmeans {
    /// Default iteration cap.
    pub const DEFAULT_MAX_ITER: usize = 100;
    /// Default seed.
    pub const DEFAULT_SEED: u64 = 42;
    /// Default number of restarts.
    pub const DEFAULT_N_INIT: usize = 10;

    /// Create a k-means clusterer with `k` clusters.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: Self::DEFAULT_MAX_ITER,
            seed: Self::DEFAULT_SEED,
            init: KmeansInit::default(),
            n_init: Self::DEFAULT_N_INIT,
        }
    }

    /// Set the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the initialization strategy.
    pub fn with_init(mut self, init: KmeansInit) -> Self {
        self.init = init;
        self
    }

    /// Set the number of seeded restarts.
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Check parameters against the dataset; returns the dimension.
    fn validate(&self, data: &[Vec<f32>]) -> Result<usize> {
        let Some(first) = data.first() else {
            return Err(Error::EmptyInput);
        };
        let dim = first.len();
        if let Some(bad) = data.iter().find(|p| p.len() != dim) {
            return Err(Error::DimensionMismatch {
                expected: dim,
                found: bad.len(),
            });
        }
        if self.k == 0 || self.k > data.len() {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: data.len(),
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if self.n_init == 0 {
            return Err(Error::InvalidParameter {
                name: "n_init",
                message: "must be at least 1",
            });
        }
        Ok(dim)
    }

    /// Fit the model and return centroids, labels and convergence status.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<KmeansFit> {
        self.validate(data)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KmeansFit> = None;

        for run in 0..self.n_init {
            let centroids = match self.init {
                KmeansInit::Random => init_random(data, self.k, &mut rng),
                KmeansInit::KmeansPlusPlus => init_plus_plus(data, self.k, &mut rng),
            };
            let fit = self.lloyd(data, centroids);
            trace!(
                run,
                inertia = fit.inertia,
                iterations = fit.iterations,
                converged = fit.converged,
                "k-means restart finished"
            );
            if best.as_ref().is_none_or(|b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        let best = best.ok_or(Error::InvalidParameter {
            name: "n_init",
            message: "must be at least 1",
        })?;
        if !best.converged {
            warn!(
                k = self.k,
                max_iter = self.max_iter,
                "k-means reached the iteration cap before converging"
            );
        }
        Ok(best)
    }

    fn lloyd(&self, data: &[Vec<f32>], mut centroids: Vec<Vec<f32>>) -> KmeansFit {
        let mut assignment = assign(data, &centroids);
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iter {
            iterations += 1;

            let counts = update_centroids(data, &assignment, &mut centroids);
            if counts.contains(&0) {
                reseed_empty(data, &assignment, &counts, &mut centroids);
                assignment = assign(data, &centroids);
                update_centroids(data, &assignment, &mut centroids);
            }

            let next = assign(data, &centroids);
            let changed = next.iter().zip(assignment.iter()).any(|(a, b)| a.0 != b.0);
            assignment = next;
            if !changed {
                converged = true;
                break;
            }
        }

        let inertia = assignment.iter().map(|&(_, d)| d).sum();
        KmeansFit {
            centroids,
            labels: assignment.into_iter().map(|(c, _)| c).collect(),
            iterations,
            converged,
            inertia,
        }
    }
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

fn init_random(data: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    rand::seq::index::sample(rng, data.len(), k)
        .into_iter()
        .map(|i| data[i].clone())
        .collect()
}

fn init_plus_plus(data: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let n = data.len();
    let mut chosen = vec![false; n];
    let mut centroids = Vec::with_capacity(k);

    let first = rng.random_range(0..n);
    chosen[first] = true;
    centroids.push(data[first].clone());
    let mut d2: Vec<f32> = data
        .iter()
        .map(|p| squared_euclidean(p, &data[first]))
        .collect();

    while centroids.len() < k {
        let total: f64 = (0..n)
            .filter(|&i| !chosen[i])
            .map(|i| f64::from(d2[i]))
            .sum();

        let candidate = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut acc = 0.0;
            let mut last = None;
            let mut pick = None;
            for i in (0..n).filter(|&i| !chosen[i] && d2[i] > 0.0) {
                acc += f64::from(d2[i]);
                last = Some(i);
                if acc > target {
                    pick = Some(i);
                    break;
                }
            }
            // Rounding can leave `acc` just short of `target`.
            pick.or(last)
        } else {
            // Every remaining point coincides with a chosen centroid.
            (0..n).find(|&i| !chosen[i])
        };

        let Some(next) = candidate else {
            break;
        };
        chosen[next] = true;
        for (i, p) in data.iter().enumerate() {
            let d = squared_euclidean(p, &data[next]);
            if d < d2[i] {
                d2[i] = d;
            }
        }
        centroids.push(data[next].clone());
    }

    centroids
}

/// Nearest centroid and squared distance for every point.
#[cfg(not(feature = "parallel"))]
fn assign(data: &[Vec<f32>], centroids: &[Vec<f32>]) -> Vec<(usize, f32)> {
    data.iter().map(|p| nearest(p, centroids)).collect()
}

/// Nearest centroid and squared distance for every point.
#[cfg(feature = "parallel")]
fn assign(data: &[Vec<f32>], centroids: &[Vec<f32>]) -> Vec<(usize, f32)> {
    use rayon::prelude::*;
    data.par_iter().map(|p| nearest(p, centroids)).collect()
}

/// Move each centroid to the mean of its members; returns member counts.
///
/// Centroids with no members keep their previous position.
fn update_centroids(
    data: &[Vec<f32>],
    assignment: &[(usize, f32)],
    centroids: &mut [Vec<f32>],
) -> Vec<usize> {
    let dim = centroids.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0f32; dim]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (point, &(c, _)) in data.iter().zip(assignment.iter()) {
        counts[c] += 1;
        for (s, x) in sums[c].iter_mut().zip(point.iter()) {
            *s += x;
        }
    }

    for (c, sum) in sums.into_iter().enumerate() {
        if counts[c] == 0 {
            continue;
        }
        let inv = 1.0 / counts[c] as f32;
        centroids[c] = sum.into_iter().map(|s| s * inv).collect();
    }
    counts
}

/// Move every empty centroid onto the point farthest from its own centroid.
fn reseed_empty(
    data: &[Vec<f32>],
    assignment: &[(usize, f32)],
    counts: &[usize],
    centroids: &mut [Vec<f32>],
) {
    let mut dist: Vec<f32> = data
        .iter()
        .zip(assignment.iter())
        .map(|(p, &(c, _))| squared_euclidean(p, &centroids[c]))
        .collect();

    for (c, _) in counts.iter().enumerate().filter(|&(_, &n)| n == 0) {
        let mut far: Option<usize> = None;
        for (i, &d) in dist.iter().enumerate() {
            if d < 0.0 {
                continue;
            }
            if far.is_none_or(|f| d > dist[f]) {
                far = Some(i);
            }
        }
        let Some(far) = far else {
            break;
        };
        trace!(cluster = c, point = far, "reseeding empty cluster");
        centroids[c] = data[far].clone();
        // Used; excluded from later picks in this step.
        dist[far] = -1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![0.2, 0.0],
            vec![10.0, 10.0],
            vec![10.1, 10.1],
            vec![9.9, 10.2],
        ]
    }

    #[test]
    fn test_kmeans_two_clusters() {
        let data = blobs();
        let fit = Kmeans::new(2).with_seed(7).fit(&data).unwrap();

        assert_eq!(fit.labels.len(), 6);
        assert!(fit.converged);
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[0], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_eq!(fit.labels[3], fit.labels[5]);
        assert_ne!(fit.labels[0], fit.labels[3]);
    }

    #[test]
    fn test_kmeans_random_init_two_clusters() {
        let data = blobs();
        let labels = Kmeans::new(2)
            .with_init(KmeansInit::Random)
            .fit_predict(&data)
            .unwrap();
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[3], labels[5]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn test_kmeans_single_cluster() {
        let data = blobs();
        let fit = Kmeans::new(1).fit(&data).unwrap();
        assert!(fit.labels.iter().all(|&l| l == 0));
        assert_eq!(fit.centroids.len(), 1);
        // Centroid is the mean of everything.
        let mean_x: f32 = data.iter().map(|p| p[0]).sum::<f32>() / 6.0;
        assert!((fit.centroids[0][0] - mean_x).abs() < 1e-5);
    }

    #[test]
    fn test_kmeans_deterministic() {
        let data = blobs();
        for init in [KmeansInit::Random, KmeansInit::KmeansPlusPlus] {
            let model = Kmeans::new(3).with_seed(99).with_init(init);
            let a = model.fit(&data).unwrap();
            let b = model.fit(&data).unwrap();
            assert_eq!(a.labels, b.labels);
            assert_eq!(a.centroids, b.centroids);
            assert_eq!(a.inertia.to_bits(), b.inertia.to_bits());
        }
    }

    #[test]
    fn test_kmeans_identical_points_terminate() {
        let data = vec![vec![1.0, 1.0]; 5];
        for init in [KmeansInit::Random, KmeansInit::KmeansPlusPlus] {
            let fit = Kmeans::new(3).with_init(init).fit(&data).unwrap();
            assert!(fit.converged);
            assert!(fit.iterations <= Kmeans::DEFAULT_MAX_ITER);
            // All ties resolve to the lowest centroid.
            assert!(fit.labels.iter().all(|&l| l == 0));
            assert_eq!(fit.inertia, 0.0);
        }
    }

    #[test]
    fn test_kmeans_k_equals_n() {
        let data = vec![vec![0.0], vec![5.0], vec![10.0]];
        let fit = Kmeans::new(3).fit(&data).unwrap();
        let mut labels = fit.labels.clone();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 3);
        assert_eq!(fit.inertia, 0.0);
    }

    #[test]
    fn test_kmeans_iteration_cap() {
        let data = blobs();
        let fit = Kmeans::new(2).with_max_iter(1).fit(&data).unwrap();
        assert_eq!(fit.iterations, 1);
        assert!(fit.labels.iter().all(|&l| l < 2));
    }

    #[test]
    fn test_kmeans_invalid_params() {
        let data = blobs();
        assert!(matches!(
            Kmeans::new(0).fit(&data),
            Err(Error::InvalidClusterCount { requested: 0, .. })
        ));
        assert!(matches!(
            Kmeans::new(7).fit(&data),
            Err(Error::InvalidClusterCount {
                requested: 7,
                n_items: 6
            })
        ));
        assert!(Kmeans::new(2).with_max_iter(0).fit(&data).is_err());
        assert!(Kmeans::new(2).with_n_init(0).fit(&data).is_err());
    }

    #[test]
    fn test_kmeans_empty_and_ragged() {
        let empty: Vec<Vec<f32>> = vec![];
        assert!(matches!(Kmeans::new(1).fit(&empty), Err(Error::EmptyInput)));

        let ragged = vec![vec![0.0, 0.0], vec![1.0]];
        assert!(matches!(
            Kmeans::new(1).fit(&ragged),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_reseed_picks_farthest_point() {
        let data = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![10.0, 0.0]];
        let assignment = vec![(0, 0.0), (0, 0.0), (0, 0.0)];
        let mut centroids = vec![vec![0.0, 0.0], vec![50.0, 50.0]];
        reseed_empty(&data, &assignment, &[3, 0], &mut centroids);
        assert_eq!(centroids[1], vec![10.0, 0.0]);
    }

    #[test]
    fn test_reseed_does_not_reuse_points() {
        let data = vec![vec![0.0], vec![4.0], vec![9.0]];
        let assignment = vec![(0, 0.0), (0, 0.0), (0, 0.0)];
        let mut centroids = vec![vec![0.0], vec![100.0], vec![200.0]];
        reseed_empty(&data, &assignment, &[3, 0, 0], &mut centroids);
        assert_eq!(centroids[1], vec![9.0]);
        assert_eq!(centroids[2], vec![4.0]);
    }

    #[test]
    fn test_reseed_tie_takes_lowest_index() {
        // Points 1 and 2 are both 25 away from the shared centroid.
        let data = vec![vec![0.0], vec![5.0], vec![-5.0]];
        let assignment = vec![(0, 0.0), (0, 25.0), (0, 25.0)];
        let mut centroids = vec![vec![0.0], vec![100.0]];
        reseed_empty(&data, &assignment, &[3, 0], &mut centroids);
        assert_eq!(centroids[1], vec![5.0]);
    }

    #[test]
    fn test_reseed_two_empty_clusters_on_tie() {
        let data = vec![vec![0.0], vec![5.0], vec![-5.0]];
        let assignment = vec![(0, 0.0), (0, 25.0), (0, 25.0)];
        let mut centroids = vec![vec![0.0], vec![100.0], vec![200.0]];
        reseed_empty(&data, &assignment, &[3, 0, 0], &mut centroids);
        assert_eq!(centroids[1], vec![5.0]);
        assert_eq!(centroids[2], vec![-5.0]);
    }

    #[test]
    fn test_assign_known_labels() {
        // Many points so the parallel path actually splits the work.
        let data: Vec<Vec<f32>> = (0..2000).map(|i| vec![i as f32 * 0.015625]).collect();
        let centroids = vec![vec![0.0], vec![10.0], vec![20.0]];
        let labels: Vec<usize> = assign(&data, &centroids)
            .into_iter()
            .map(|(c, _)| c)
            .collect();

        let expected: Vec<usize> = data
            .iter()
            .map(|p| match p[0] {
                x if x <= 5.0 => 0,
                x if x <= 15.0 => 1,
                _ => 2,
            })
            .collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_kmeans_known_labels() {
        let xs = [0.0, 0.1, 0.2, 50.0, 50.1, 50.2];
        let data: Vec<Vec<f32>> = xs.iter().map(|&x| vec![x]).collect();
        let fit = Kmeans::new(2).with_seed(3).fit(&data).unwrap();
        let a = fit.labels[0];
        let b = 1 - a;
        assert_eq!(fit.labels, vec![a, a, a, b, b, b]);
        assert!(fit.converged);
        assert!((fit.inertia - 0.04).abs() < 1e-4);
    }

    #[test]
    fn test_plus_plus_picks_distinct_points() {
        let data = vec![vec![0.0], vec![0.0], vec![3.0], vec![7.0]];
        let mut rng = StdRng::seed_from_u64(1);
        let centroids = init_plus_plus(&data, 4, &mut rng);
        assert_eq!(centroids.len(), 4);
        let zeros = centroids.iter().filter(|c| c[0] == 0.0).count();
        assert_eq!(zeros, 2);
    }
}
