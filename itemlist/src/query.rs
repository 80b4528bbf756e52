use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

/// A custom matcher applied to an item's search text.
pub type MatchFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A filter query applied to the search field.
#[derive(Clone)]
pub enum Query {
    /// Case-insensitive substring match.
    Text(String),
    /// Arbitrary predicate over the search text.
    Pattern(MatchFn),
}

impl Query {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn pattern(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self::Pattern(Arc::new(f))
    }

    /// Length in characters of a text query; patterns have no length.
    pub fn text_len(&self) -> Option<usize> {
        match self {
            Self::Text(t) => Some(t.chars().count()),
            Self::Pattern(_) => None,
        }
    }

    pub(crate) fn matcher(&self) -> Matcher<'_> {
        match self {
            Self::Text(t) => Matcher::Text(t.to_lowercase()),
            Self::Pattern(f) => Matcher::Pattern(f.as_ref()),
        }
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Self::Pattern(_) => f.write_str("Pattern(..)"),
        }
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Self::Text(text.into())
    }
}

pub(crate) enum Matcher<'a> {
    Text(String),
    Pattern(&'a (dyn Fn(&str) -> bool + Send + Sync)),
}

impl Matcher<'_> {
    pub(crate) fn is_match(&self, haystack: &str) -> bool {
        match self {
            Self::Text(needle) => {
                needle.is_empty() || haystack.to_lowercase().contains(needle.as_str())
            }
            Self::Pattern(f) => f(haystack),
        }
    }
}
