//! Dotted key paths: parsing, joining, and first/rest decomposition.
//!
//! A [`KeyPath`] is a non-empty ordered sequence of key segments, written
//! `"branch.leaf"`. Paths are validated at construction: an empty path or an
//! empty segment is rejected immediately rather than surfacing later as a
//! mysterious dispatch miss.
//!
//! # Invariants
//!
//! 1. A `KeyPath` always holds at least one segment.
//! 2. No segment is empty.
//! 3. `KeyPath::parse(p.to_string())` round-trips for every `KeyPath` `p`.
//!
//! Registries key observer entries by the *first* segment and forward the
//! *rest* down the object graph, so [`first`](KeyPath::first),
//! [`rest`](KeyPath::rest), and [`prefixed`](KeyPath::prefixed) are the hot
//! operations here.

use smallvec::SmallVec;

use crate::error::KeyPathError;

/// Most real-world paths are shallow; four inline segments covers them
/// without a heap allocation.
type Segments = SmallVec<[String; 4]>;

/// A validated, non-empty dotted key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Segments,
}

impl KeyPath {
    /// Parse a dotted path string.
    ///
    /// # Errors
    ///
    /// [`KeyPathError::EmptyPath`] for `""`, [`KeyPathError::EmptySegment`]
    /// for paths like `"a..b"`, `".a"`, or `"a."`.
    pub fn parse(path: &str) -> Result<Self, KeyPathError> {
        if path.is_empty() {
            return Err(KeyPathError::EmptyPath);
        }
        let mut segments = Segments::new();
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(KeyPathError::EmptySegment { path: path.into() });
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// A single-segment path.
    ///
    /// # Errors
    ///
    /// [`KeyPathError::EmptyPath`] if `key` is empty,
    /// [`KeyPathError::EmptySegment`] if it contains a dot (a key is one
    /// segment; use [`parse`](Self::parse) for full paths).
    pub fn key(key: impl Into<String>) -> Result<Self, KeyPathError> {
        let key = key.into();
        if key.is_empty() {
            return Err(KeyPathError::EmptyPath);
        }
        if key.contains('.') {
            return Err(KeyPathError::EmptySegment { path: key });
        }
        let mut segments = Segments::new();
        segments.push(key);
        Ok(Self { segments })
    }

    /// Build a path from pre-split segments.
    ///
    /// # Errors
    ///
    /// [`KeyPathError::EmptyPath`] for an empty iterator,
    /// [`KeyPathError::EmptySegment`] if any segment is empty.
    pub fn from_segments<I, S>(iter: I) -> Result<Self, KeyPathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut segments = Segments::new();
        for segment in iter {
            let segment = segment.into();
            if segment.is_empty() {
                return Err(KeyPathError::EmptySegment {
                    path: segments.join("."),
                });
            }
            segments.push(segment);
        }
        if segments.is_empty() {
            return Err(KeyPathError::EmptyPath);
        }
        Ok(Self { segments })
    }

    /// The first segment.
    #[must_use]
    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    /// The final segment.
    #[must_use]
    pub fn last(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Everything after the first segment, or `None` for a single-segment
    /// path.
    #[must_use]
    pub fn rest(&self) -> Option<KeyPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[1..].iter().cloned().collect(),
        })
    }

    /// A new path with `key` prepended. Used when a forwarded change climbs
    /// one level and the full path string must be reconstructed.
    #[must_use]
    pub fn prefixed(&self, key: &str) -> KeyPath {
        let mut segments = Segments::new();
        segments.push(key.to_string());
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: a `KeyPath` holds at least one segment. Present for
    /// clippy's `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether this path is a single key.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.segments.len() == 1
    }

    /// Iterate the segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl std::str::FromStr for KeyPath {
    type Err = KeyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
