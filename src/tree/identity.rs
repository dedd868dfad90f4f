use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Path-encoded widget identity: the sibling `index` of every node from the
/// root down to the node, root first.
///
/// Rendered dot-delimited (`0.0.12.3`) so indices of ten or more stay
/// unambiguous; a root-only id renders as its index (`12`). The legacy
/// single-digit form (`0013`) is only read through [`UniqueId::from_legacy`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UniqueId {
    path: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniqueIdError {
    #[error("empty widget id")]
    Empty,

    #[error("invalid widget id segment '{0}'")]
    InvalidSegment(String),
}

impl UniqueId {
    pub fn root(index: u32) -> Self {
        Self { path: vec![index] }
    }

    /// Id of a child with the given sibling index.
    pub fn child(&self, index: u32) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        Self { path }
    }

    pub fn segments(&self) -> &[u32] {
        &self.path
    }

    /// Number of path segments. The root has depth 1.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Id made of the first `len` segments.
    pub fn prefix(&self, len: usize) -> UniqueId {
        Self {
            path: self.path[..len.min(self.path.len())].to_vec(),
        }
    }

    /// Position of the first segment where the two paths differ, or `None`
    /// when one path is a prefix of the other.
    pub fn first_divergence(&self, other: &UniqueId) -> Option<usize> {
        self.path
            .iter()
            .zip(other.path.iter())
            .position(|(a, b)| a != b)
    }

    /// Undelimited legacy rendering. Ambiguous once any index exceeds 9.
    pub fn legacy_string(&self) -> String {
        self.path.iter().map(|i| i.to_string()).collect()
    }

    /// Parse the undelimited legacy form, one digit per level.
    pub fn from_legacy(s: &str) -> Result<Self, UniqueIdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(UniqueIdError::Empty);
        }
        let path = s
            .chars()
            .map(|c| {
                c.to_digit(10)
                    .ok_or_else(|| UniqueIdError::InvalidSegment(c.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { path })
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.path {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for UniqueId {
    type Err = UniqueIdError;

    /// Dot-delimited form only. A string without dots is a single segment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(UniqueIdError::Empty);
        }

        let path = s
            .split('.')
            .map(|seg| {
                seg.parse::<u32>()
                    .map_err(|_| UniqueIdError::InvalidSegment(seg.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { path })
    }
}

impl Serialize for UniqueId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
