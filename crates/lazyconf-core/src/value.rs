//! Data model for parsed configuration values
//!
//! A raw value string is tokenized into an ordered sequence of [`Fragment`]s
//! held in a [`StoredValue`]. Keys and scalar inputs cross the store boundary
//! as [`Scalar`]s and are canonicalized to their string form exactly once.

use std::fmt;

/// A scalar accepted as a store key or value
///
/// The store works on canonical strings internally; this is the closed set of
/// input kinds that convert to one. The conversion is total and deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Text, stored as-is
    Text(String),
    /// Integer, canonicalized via its decimal form
    Integer(i64),
    /// Floating point, canonicalized via its shortest round-trip form
    Float(f64),
}

impl Scalar {
    /// Canonical string form used for storage and lookup
    pub fn canonical(&self) -> String {
        match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<&String> for Scalar {
    fn from(s: &String) -> Self {
        Scalar::Text(s.clone())
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Integer(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Integer(i as i64)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// One unit of a parsed value
///
/// Fragment content is already unescaped. Reference fragments hold the raw
/// captured name/expression, expanded lazily at read time.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Literal text, appended verbatim on expansion
    Literal(String),
    /// Reference to another key in the same store
    VariableReference(String),
}

impl Fragment {
    /// Check if this fragment is a variable reference
    pub fn is_reference(&self) -> bool {
        matches!(self, Fragment::VariableReference(_))
    }

    /// Get the fragment content
    pub fn content(&self) -> &str {
        match self {
            Fragment::Literal(s) => s,
            Fragment::VariableReference(s) => s,
        }
    }
}

/// The ordered fragment sequence stored under a key
///
/// Fully replaced on every `set`; expansion is the concatenation of fragment
/// expansions in sequence order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredValue {
    fragments: Vec<Fragment>,
}

impl StoredValue {
    /// Create a stored value from a fragment sequence
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    /// The fragments in sequence order
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Check if any fragment is a variable reference
    pub fn has_references(&self) -> bool {
        self.fragments.iter().any(Fragment::is_reference)
    }

    /// Concatenation of literal fragments, skipping references
    ///
    /// For a reference-free value this equals its full expansion.
    pub fn literal_text(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            if let Fragment::Literal(s) = fragment {
                out.push_str(s);
            }
        }
        out
    }
}
