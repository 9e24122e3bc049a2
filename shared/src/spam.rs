//! Spam risk scoring
//!
//! This module scores free text against a keyword list. A keyword counts
//! once when it occurs anywhere in the text, compared case-insensitively.
//! The list comes from a [`KeywordSource`]; when it cannot be loaded the
//! text scores zero and the assessment records that the list was missing,
//! so screening degrades instead of failing the submission.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Keywords used when no list file is configured
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "viagra",
    "cialis",
    "casino",
    "lottery",
    "bitcoin",
    "crypto",
    "forex",
    "payday loan",
    "cheap",
    "discount",
    "free money",
    "winner",
    "prize",
    "click here",
    "act now",
    "limited time",
    "risk free",
    "guaranteed",
    "100% free",
    "work from home",
    "make money",
    "extra income",
    "earn $",
    "double your",
    "seo services",
    "backlinks",
    "rank your website",
    "first page of google",
    "web traffic",
    "unsubscribe",
    "weight loss",
    "miracle",
    "no obligation",
    "dear friend",
    "congratulations",
    "inheritance",
    "wire transfer",
    "bank account",
    "investment opportunity",
    "adult",
];

/// Keyword list loading errors
#[derive(Error, Debug)]
pub enum KeywordListError {
    #[error("Keyword list not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read keyword list {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Trait for supplying the keyword list
///
/// The list is requested on every evaluation, so file-backed sources pick up
/// edits without a restart.
pub trait KeywordSource: Send + Sync {
    /// Load the current keyword list
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Keywords in list order
    /// * `Err(KeywordListError)` - If the list is unavailable
    fn keywords(&self) -> Result<Vec<String>, KeywordListError>;
}

impl<K: KeywordSource + ?Sized> KeywordSource for Box<K> {
    fn keywords(&self) -> Result<Vec<String>, KeywordListError> {
        (**self).keywords()
    }
}

/// In-memory keyword list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticKeywords {
    keywords: Vec<String>,
}

impl StaticKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for StaticKeywords {
    /// The built-in [`DEFAULT_KEYWORDS`] list
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied())
    }
}

impl KeywordSource for StaticKeywords {
    fn keywords(&self) -> Result<Vec<String>, KeywordListError> {
        Ok(self.keywords.clone())
    }
}

/// Keyword list file: one keyword per line, `#` starts a comment line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFile {
    path: PathBuf,
}

impl KeywordFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse list file contents
    pub fn parse(contents: &str) -> Vec<String> {
        contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    }
}

impl KeywordSource for KeywordFile {
    fn keywords(&self) -> Result<Vec<String>, KeywordListError> {
        if !self.path.exists() {
            return Err(KeywordListError::NotFound {
                path: self.path.clone(),
            });
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| KeywordListError::Read {
            path: self.path.clone(),
            source,
        })?;

        Ok(Self::parse(&contents))
    }
}

/// The keyword file when one is configured, otherwise the built-in list
pub fn keyword_source(path: Option<&Path>) -> Box<dyn KeywordSource> {
    match path {
        Some(path) => Box::new(KeywordFile::new(path)),
        None => Box::new(StaticKeywords::default()),
    }
}

/// Result of scoring one text
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpamAssessment {
    /// Number of keywords that occur in the text
    pub score: usize,
    /// The keywords that occurred, in list order
    pub flagged: Vec<String>,
    /// False when the keyword list could not be loaded
    pub list_available: bool,
}

impl SpamAssessment {
    /// Assessment for a text scored without a list
    pub fn unavailable() -> Self {
        Self {
            score: 0,
            flagged: Vec::new(),
            list_available: false,
        }
    }
}

/// Scores text against a keyword source
#[derive(Debug, Clone)]
pub struct SpamEvaluator<K: KeywordSource> {
    source: K,
}

impl<K: KeywordSource> SpamEvaluator<K> {
    pub fn new(source: K) -> Self {
        Self { source }
    }

    /// Score a text and report which keywords matched
    pub fn assess(&self, text: &str) -> SpamAssessment {
        let keywords = match self.source.keywords() {
            Ok(keywords) => keywords,
            Err(e) => {
                warn!("Spam keyword list unavailable, scoring as 0: {}", e);
                return SpamAssessment::unavailable();
            }
        };

        let haystack = text.to_lowercase();
        let flagged: Vec<String> = keywords
            .into_iter()
            .filter(|keyword| !keyword.trim().is_empty())
            .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
            .collect();

        debug!("Spam score {} ({} chars scanned)", flagged.len(), haystack.len());

        SpamAssessment {
            score: flagged.len(),
            flagged,
            list_available: true,
        }
    }

    /// Number of keywords that occur in the text
    pub fn score(&self, text: &str) -> usize {
        self.assess(text).score
    }
}
