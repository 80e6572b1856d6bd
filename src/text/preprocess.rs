use super::stopwords::{StopWordSet, StopWords};

/// A note body after preprocessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prepared {
    /// Missing, empty or whitespace-only text. Never vectorized.
    Excluded,
    /// Lowercased tokens with stopwords removed. May be empty.
    Tokens(Vec<String>),
}

impl Prepared {
    /// True for [`Prepared::Excluded`].
    pub fn is_excluded(&self) -> bool {
        matches!(self, Prepared::Excluded)
    }

    /// The token list of a retained document.
    pub fn tokens(&self) -> Option<&[String]> {
        match self {
            Prepared::Excluded => None,
            Prepared::Tokens(t) => Some(t),
        }
    }
}

/// Turns raw note text into token lists.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    stop_words: StopWordSet,
    min_token_len: usize,
}

impl Preprocessor {
    /// Create a preprocessor that drops the given stopwords.
    pub fn new(stop_words: &StopWords) -> Self {
        Self {
            stop_words: stop_words.to_set(),
            min_token_len: 1,
        }
    }

    /// Drop tokens shorter than `min_token_len` chars.
    pub fn with_min_token_len(mut self, min_token_len: usize) -> Self {
        self.min_token_len = min_token_len;
        self
    }

    /// Preprocess one text.
    pub fn prepare(&self, text: Option<&str>) -> Prepared {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return Prepared::Excluded;
        };

        let tokens = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .filter(|t| t.chars().count() >= self.min_token_len)
            .filter(|t| !self.stop_words.contains(t))
            .map(str::to_string)
            .collect();
        Prepared::Tokens(tokens)
    }

    /// Preprocess a sequence of texts, keeping order.
    pub fn prepare_all<'a, I>(&self, texts: I) -> Vec<Prepared>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        texts.into_iter().map(|t| self.prepare(t)).collect()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(&StopWords::English)
    }
}
