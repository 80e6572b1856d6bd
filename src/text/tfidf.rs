//! TF-IDF document vectors.
//!
//! For a corpus of N documents:
//!
//! ```text
//! tf(t, d)  = count(t, d) / |d|
//! idf(t)    = ln((1 + N) / (1 + df(t))) + 1
//! w(t, d)   = tf(t, d) · idf(t), then L2-normalized per document
//! ```
//!
//! The smoothing keeps `idf` finite and positive even for a term present in every
//! document. A document with no in-vocabulary tokens maps to the zero vector.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::cluster::util::l2_normalize;

/// Token → column index, fixed once fitted.
///
/// Columns follow lexicographic token order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    index: BTreeMap<String, usize>,
}

impl Vocabulary {
    fn from_terms<I: IntoIterator<Item = String>>(terms: I) -> Self {
        let sorted: std::collections::BTreeSet<String> = terms.into_iter().collect();
        let index = sorted
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t, i))
            .collect();
        Self { index }
    }

    /// Column of `token`, if it is in the vocabulary.
    pub fn get(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Number of distinct terms (the vector dimension).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when no term was seen.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Terms in column order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }
}

/// Fits a [`TfidfModel`] to a corpus of token lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfidfVectorizer;

impl TfidfVectorizer {
    /// Learn the vocabulary and idf weights of `docs`.
    pub fn fit<S: AsRef<str>>(docs: &[Vec<S>]) -> TfidfModel {
        let n = docs.len();
        let mut df: HashMap<&str, usize> = HashMap::new();
        for doc in docs {
            let unique: HashSet<&str> = doc.iter().map(|t| t.as_ref()).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let vocabulary = Vocabulary::from_terms(df.keys().map(|t| (*t).to_string()));
        let mut idf = vec![0.0f32; vocabulary.len()];
        for (term, &count) in &df {
            if let Some(col) = vocabulary.get(term) {
                idf[col] = smoothed_idf(n, count);
            }
        }

        TfidfModel { vocabulary, idf }
    }

    /// Fit to `docs` and return the model with one vector per document.
    pub fn fit_transform<S: AsRef<str>>(docs: &[Vec<S>]) -> (TfidfModel, Vec<Vec<f32>>) {
        let model = Self::fit(docs);
        let vectors = model.transform_all(docs);
        (model, vectors)
    }
}

fn smoothed_idf(n_docs: usize, df: usize) -> f32 {
    let ratio = (1.0 + n_docs as f64) / (1.0 + df as f64);
    (ratio.ln() + 1.0) as f32
}

/// A fitted vocabulary with per-term idf weights.
#[derive(Debug, Clone, Default)]
pub struct TfidfModel {
    vocabulary: Vocabulary,
    idf: Vec<f32>,
}

impl TfidfModel {
    /// The fitted vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Vector dimension.
    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    /// Idf weight of `token`, if it is in the vocabulary.
    pub fn idf(&self, token: &str) -> Option<f32> {
        self.vocabulary.get(token).map(|col| self.idf[col])
    }

    /// Vectorize one token list. Out-of-vocabulary tokens count toward the
    /// document length but carry no weight.
    pub fn transform<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim()];
        if tokens.is_empty() {
            return v;
        }

        let mut counts: HashMap<usize, usize> = HashMap::new();
        for token in tokens {
            if let Some(col) = self.vocabulary.get(token.as_ref()) {
                *counts.entry(col).or_insert(0) += 1;
            }
        }

        let len = tokens.len() as f32;
        for (col, count) in counts {
            v[col] = (count as f32 / len) * self.idf[col];
        }
        l2_normalize(&mut v);
        v
    }

    /// Vectorize every token list, in order.
    pub fn transform_all<S: AsRef<str>>(&self, docs: &[Vec<S>]) -> Vec<Vec<f32>> {
        docs.iter().map(|d| self.transform(d)).collect()
    }

    /// The `n` highest-weighted terms of `vector`, heaviest first.
    ///
    /// Zero weights are skipped; ties keep column order.
    pub fn top_terms(&self, vector: &[f32], n: usize) -> Vec<String> {
        let mut weighted: Vec<(usize, f32)> = vector
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, w)| w > 0.0)
            .collect();
        // Stable sort: equal weights stay in column order.
        weighted.sort_by(|a, b| b.1.total_cmp(&a.1));

        let terms: Vec<&str> = self.vocabulary.terms().collect();
        weighted
            .into_iter()
            .take(n)
            .filter_map(|(col, _)| terms.get(col).map(|t| (*t).to_string()))
            .collect()
    }
}
