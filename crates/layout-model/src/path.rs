//! Dotted and bracket-indexed data-model paths.
//!
//! A path such as `Group1[1].Group2[0].Field` is a sequence of segments, each with a
//! name and an optional row index. Comparisons always happen on whole segments, so
//! `Group22.X` is never treated as living under `Group2`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ModelError, Result};

/// One `name` or `name[index]` part of a data-model path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub name: String,
    pub index: Option<usize>,
}

impl PathSegment {
    pub fn new(name: impl Into<String>, index: Option<usize>) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    fn parse(raw: &str, full: &str) -> Result<Self> {
        let Some(open) = raw.find('[') else {
            if raw.contains(']') {
                return Err(ModelError::invalid_path(full, "unbalanced ']'"));
            }
            return Ok(Self::new(raw, None));
        };

        let name = &raw[..open];
        if name.is_empty() {
            return Err(ModelError::invalid_path(full, "index without a segment name"));
        }
        let rest = &raw[open + 1..];
        let Some(digits) = rest.strip_suffix(']') else {
            return Err(ModelError::invalid_path(full, "unterminated index"));
        };
        let index = digits.parse::<usize>().map_err(|_| {
            ModelError::invalid_path(full, format!("'{digits}' is not a row index"))
        })?;
        Ok(Self::new(name, Some(index)))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.name, index),
            None => f.write_str(&self.name),
        }
    }
}

/// A parsed data-model path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataModelPath {
    segments: Vec<PathSegment>,
}

impl DataModelPath {
    pub fn parse(path: &str) -> Result<Self> {
        if path.trim().is_empty() {
            return Err(ModelError::invalid_path(path, "empty path"));
        }
        let segments = path
            .split('.')
            .map(|raw| {
                if raw.is_empty() {
                    Err(ModelError::invalid_path(path, "empty segment"))
                } else {
                    PathSegment::parse(raw, path)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&PathSegment> {
        self.segments.get(position)
    }

    /// Sets the row index of the segment at `position`. Out-of-range positions are ignored.
    pub fn set_index(&mut self, position: usize, index: Option<usize>) {
        if let Some(segment) = self.segments.get_mut(position) {
            segment.index = index;
        }
    }

    #[must_use]
    pub fn without_indices(&self) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .map(|s| PathSegment::new(s.name.clone(), None))
                .collect(),
        }
    }

    /// True when every segment name of `self` equals the corresponding leading
    /// segment name of `other`. Indices are ignored.
    pub fn is_name_prefix_of(&self, other: &DataModelPath) -> bool {
        self.len() <= other.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(ours, theirs)| ours.name == theirs.name)
    }

    /// Treats `self` as a concrete group path (e.g. `Group1[1].Group2`) and returns the
    /// row index `key` carries for the last group segment, provided every earlier segment
    /// of `key` matches `self` exactly, index included.
    pub fn row_index_in(&self, key: &DataModelPath) -> Option<usize> {
        let (last, leading) = self.segments.split_last()?;
        if key.len() <= leading.len() {
            return None;
        }
        if leading.iter().zip(&key.segments).any(|(ours, theirs)| ours != theirs) {
            return None;
        }
        let candidate = &key.segments[leading.len()];
        if candidate.name != last.name {
            return None;
        }
        candidate.index
    }
}

impl fmt::Display for DataModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            if position > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for DataModelPath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for DataModelPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataModelPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
