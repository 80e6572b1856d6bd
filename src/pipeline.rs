//! The note clustering pipeline.
//!
//! ```text
//! notes ─▶ Preprocessor ─▶ token lists ─▶ TfidfVectorizer ─▶ vectors ─▶ Kmeans ─▶ labels ─▶ assign ─▶ note id → label
//! ```
//!
//! One [`Pipeline`] runs once. [`cluster`] wraps the common case of building a
//! pipeline, running it, and returning the [`ClusterReport`].

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::cluster::{Kmeans, KmeansInit};
use crate::error::{Error, Result};
use crate::note::{Document, NoteId};
use crate::text::{Prepared, Preprocessor, StopWords, TfidfVectorizer};

/// Parameters of one clustering run.
///
/// Always passed in explicitly; nothing is read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of clusters. Must be in `1..=retained notes`.
    pub k: usize,
    /// Lloyd iteration cap.
    pub max_iterations: usize,
    /// Seed for centroid initialization.
    pub seed: u64,
    /// How the first centroids are chosen.
    pub init: KmeansInit,
    /// Seeded restarts; the lowest-inertia fit wins.
    pub n_init: usize,
    /// Words removed before vectorizing.
    pub stop_words: StopWords,
    /// Tokens shorter than this many chars are dropped.
    pub min_token_len: usize,
    /// Top terms kept per cluster.
    pub keywords: usize,
}

impl ClusterConfig {
    /// Defaults with `k` clusters.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    /// Set [`ClusterConfig::max_iterations`].
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set [`ClusterConfig::seed`].
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set [`ClusterConfig::init`].
    pub fn with_init(mut self, init: KmeansInit) -> Self {
        self.init = init;
        self
    }

    /// Set [`ClusterConfig::n_init`].
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set [`ClusterConfig::stop_words`].
    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Set [`ClusterConfig::min_token_len`].
    pub fn with_min_token_len(mut self, min_token_len: usize) -> Self {
        self.min_token_len = min_token_len;
        self
    }

    /// Set [`ClusterConfig::keywords`].
    pub fn with_keywords(mut self, keywords: usize) -> Self {
        self.keywords = keywords;
        self
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            k: 5,
            max_iterations: Kmeans::DEFAULT_MAX_ITER,
            seed: Kmeans::DEFAULT_SEED,
            init: KmeansInit::default(),
            n_init: Kmeans::DEFAULT_N_INIT,
            stop_words: StopWords::default(),
            min_token_len: 1,
            keywords: 5,
        }
    }
}

/// Where a [`Pipeline`] is in its single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Built, not yet run.
    Idle,
    /// Tokenizing and excluding empty notes.
    Preprocessing,
    /// Fitting TF-IDF over the retained notes.
    Vectorizing,
    /// Running k-means.
    Clustering,
    /// Mapping labels back onto note ids.
    Assigning,
    /// Terminal; the report was produced.
    Done,
    /// Terminal; reached from any stage on error.
    Failed,
}

impl Stage {
    /// The stage that follows this one in a successful run.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::Preprocessing),
            Stage::Preprocessing => Some(Stage::Vectorizing),
            Stage::Vectorizing => Some(Stage::Clustering),
            Stage::Clustering => Some(Stage::Assigning),
            Stage::Assigning => Some(Stage::Done),
            Stage::Done | Stage::Failed => None,
        }
    }

    /// True for `Done` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct ClusterReport {
    assignments: Vec<(NoteId, Option<usize>)>,
    by_id: HashMap<NoteId, Option<usize>>,
    keywords: Vec<Vec<String>>,
    k: usize,
    retained: usize,
    vocabulary_size: usize,
    iterations: usize,
    converged: bool,
    inertia: f32,
}

impl ClusterReport {
    /// `(note, label)` in input order; excluded notes carry `None`.
    pub fn assignments(&self) -> &[(NoteId, Option<usize>)] {
        &self.assignments
    }

    /// Label of `id`; `None` for excluded or unknown notes.
    pub fn label(&self, id: NoteId) -> Option<usize> {
        self.by_id.get(&id).copied().flatten()
    }

    /// True if `id` was in the run but had no text to cluster.
    pub fn is_excluded(&self, id: NoteId) -> bool {
        matches!(self.by_id.get(&id), Some(None))
    }

    /// The mapping the caller persists.
    pub fn to_map(&self) -> HashMap<NoteId, Option<usize>> {
        self.by_id.clone()
    }

    /// Members of every non-empty cluster, in input order.
    pub fn clusters(&self) -> BTreeMap<usize, Vec<NoteId>> {
        let mut out: BTreeMap<usize, Vec<NoteId>> = BTreeMap::new();
        for &(id, label) in &self.assignments {
            if let Some(label) = label {
                out.entry(label).or_default().push(id);
            }
        }
        out
    }

    /// Highest-weighted centroid terms of `cluster`.
    pub fn keywords(&self, cluster: usize) -> &[String] {
        self.keywords
            .get(cluster)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Related-note links: consecutive members of each cluster, chained.
    pub fn links(&self) -> Vec<(NoteId, NoteId)> {
        self.clusters()
            .values()
            .flat_map(|ids| ids.windows(2).map(|w| (w[0], w[1])).collect::<Vec<_>>())
            .collect()
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of notes that were vectorized and clustered.
    pub fn retained(&self) -> usize {
        self.retained
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// False if the iteration cap cut the run short.
    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }
}

/// Map engine labels back onto note ids.
///
/// `labels` holds one entry per non-excluded note, in order.
pub fn assign(ids: &[NoteId], excluded: &[bool], labels: &[usize]) -> Vec<(NoteId, Option<usize>)> {
    let mut labels = labels.iter().copied();
    ids.iter()
        .zip(excluded.iter())
        .map(|(&id, &skip)| (id, if skip { None } else { labels.next() }))
        .collect()
}

/// A one-shot clustering run.
#[derive(Debug)]
pub struct Pipeline {
    config: ClusterConfig,
    stage: Stage,
}

impl Pipeline {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    fn advance(&mut self, to: Stage) -> Result<()> {
        if self.stage.next() != Some(to) {
            return Err(Error::StageViolation {
                from: self.stage,
                to,
            });
        }
        debug!(from = ?self.stage, to = ?to, "pipeline stage");
        self.stage = to;
        Ok(())
    }

    /// Cluster `docs`. Any error leaves the pipeline in [`Stage::Failed`].
    #[instrument(skip_all, fields(k = self.config.k, notes = docs.len()))]
    pub fn run<D: Document>(&mut self, docs: &[D]) -> Result<ClusterReport> {
        match self.execute(docs) {
            Ok(report) => Ok(report),
            Err(err) => {
                warn!(stage = ?self.stage, error = %err, "clustering run failed");
                self.stage = Stage::Failed;
                Err(err)
            }
        }
    }

    fn execute<D: Document>(&mut self, docs: &[D]) -> Result<ClusterReport> {
        self.advance(Stage::Preprocessing)?;
        let mut ids = Vec::with_capacity(docs.len());
        let mut seen = HashSet::with_capacity(docs.len());
        for doc in docs {
            let id = doc.id().ok_or(Error::InvalidParameter {
                name: "notes",
                message: "every note needs an id",
            })?;
            if !seen.insert(id) {
                return Err(Error::DuplicateNoteId(id));
            }
            ids.push(id);
        }

        let pre = Preprocessor::new(&self.config.stop_words)
            .with_min_token_len(self.config.min_token_len);
        let prepared = pre.prepare_all(docs.iter().map(|d| d.text()));
        let excluded: Vec<bool> = prepared.iter().map(Prepared::is_excluded).collect();
        let retained: Vec<Vec<String>> = prepared
            .into_iter()
            .filter_map(|p| match p {
                Prepared::Tokens(tokens) => Some(tokens),
                Prepared::Excluded => None,
            })
            .collect();
        debug!(
            retained = retained.len(),
            excluded = ids.len() - retained.len(),
            "preprocessed notes"
        );
        self.check_preconditions(retained.len())?;

        self.advance(Stage::Vectorizing)?;
        let (model, vectors) = TfidfVectorizer::fit_transform(&retained);
        debug!(vocabulary = model.dim(), "vectorized notes");

        self.advance(Stage::Clustering)?;
        let fit = Kmeans::new(self.config.k)
            .with_max_iter(self.config.max_iterations)
            .with_seed(self.config.seed)
            .with_init(self.config.init)
            .with_n_init(self.config.n_init)
            .fit(&vectors)?;
        debug!(
            iterations = fit.iterations,
            converged = fit.converged,
            inertia = fit.inertia,
            "clustered notes"
        );

        self.advance(Stage::Assigning)?;
        let assignments = assign(&ids, &excluded, &fit.labels);
        for (id, label) in &assignments {
            trace!(note = %id, cluster = ?label, "note assigned");
        }
        let keywords = fit
            .centroids
            .iter()
            .map(|c| model.top_terms(c, self.config.keywords))
            .collect();
        let by_id = assignments.iter().copied().collect();

        self.advance(Stage::Done)?;
        Ok(ClusterReport {
            assignments,
            by_id,
            keywords,
            k: self.config.k,
            retained: retained.len(),
            vocabulary_size: model.dim(),
            iterations: fit.iterations,
            converged: fit.converged,
            inertia: fit.inertia,
        })
    }

    fn check_preconditions(&self, retained: usize) -> Result<()> {
        if retained == 0 {
            return Err(Error::EmptyCorpus);
        }
        if self.config.k == 0 || self.config.k > retained {
            return Err(Error::InvalidClusterCount {
                requested: self.config.k,
                n_items: retained,
            });
        }
        if self.config.max_iterations == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iterations",
                message: "must be at least 1",
            });
        }
        if self.config.n_init == 0 {
            return Err(Error::InvalidParameter {
                name: "n_init",
                message: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Cluster a note snapshot into `config.k` topical groups.
///
/// ```rust
/// use notecluster::{cluster, ClusterConfig, NoteId};
///
/// let notes = [(1, ""), (2, "hello world")];
/// let report = cluster(&notes, &ClusterConfig::new(1)).unwrap();
/// assert_eq!(report.label(NoteId(1)), None);
/// assert_eq!(report.label(NoteId(2)), Some(0));
/// ```
pub fn cluster<D: Document>(docs: &[D], config: &ClusterConfig) -> Result<ClusterReport> {
    Pipeline::new(config.clone()).run(docs)
}
