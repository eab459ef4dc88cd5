//! Abstraction over `regex` and `regex-lite` depending on whether we have `unicode` crate feature
//! enabled.

use cfg_if::cfg_if;
#[cfg(feature = "unicode")]
pub(crate) use regex::{escape, Regex};
#[cfg(not(feature = "unicode"))]
pub(crate) use regex_lite::{escape, Regex};

/// Every compiled pattern of a route table, tested in one pass.
#[cfg(feature = "unicode")]
#[derive(Debug, Clone)]
pub(crate) struct RegexSet(regex::RegexSet);

#[cfg(not(feature = "unicode"))]
#[derive(Debug, Clone)]
pub(crate) struct RegexSet(Vec<regex_lite::Regex>);

impl RegexSet {
    /// Builds a set from already validated patterns.
    ///
    /// # Panics
    ///
    /// Panics if the combined set exceeds the regex engine's size limits. Every source was
    /// compiled on its own during registration, so this is the only remaining failure.
    pub(crate) fn new<'a>(re_set: impl IntoIterator<Item = &'a Regex>) -> Self {
        cfg_if! {
            if #[cfg(feature = "unicode")] {
                let sources = re_set.into_iter().map(Regex::as_str);
                Self(regex::RegexSet::new(sources).expect("route table exceeds regex size limit"))
            } else {
                Self(re_set.into_iter().cloned().collect())
            }
        }
    }

    /// Returns the index of the lowest-numbered pattern matching `path`.
    ///
    /// Patterns are indexed in registration order, so this is the first registered match.
    pub(crate) fn first_match_idx(&self, path: &str) -> Option<usize> {
        cfg_if! {
            if #[cfg(feature = "unicode")] {
                self.0.matches(path).into_iter().next()
            } else {
                self.0.iter().position(|re| re.is_match(path))
            }
        }
    }

    /// Number of patterns in the set.
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}
