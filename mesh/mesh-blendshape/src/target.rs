//! Sparse per-vertex displacement targets.
//!
//! A [`MorphTarget`] stores only the vertices a shape actually moves. All
//! other vertices of the base mesh are implicitly at zero displacement.

use std::collections::BTreeMap;

use nalgebra::Vector3;

/// Component magnitude above which a displacement is considered significant.
///
/// Entries with no component strictly greater than this (in absolute value)
/// are dropped when a target is decoded.
pub const SPARSITY_THRESHOLD: f64 = 1e-4;

/// Returns whether any component of `offset` exceeds [`SPARSITY_THRESHOLD`].
///
/// # Example
///
/// ```
/// use mesh_blendshape::is_significant;
/// use nalgebra::Vector3;
///
/// assert!(is_significant(&Vector3::new(0.0, 0.0, 0.0002)));
/// assert!(!is_significant(&Vector3::new(0.0001, -0.0001, 0.0)));
/// ```
#[must_use]
pub fn is_significant(offset: &Vector3<f64>) -> bool {
    offset.iter().any(|c| c.abs() > SPARSITY_THRESHOLD)
}

/// A named morph target: sparse map from vertex index to displacement.
///
/// Arithmetic never mutates the receiver. [`scale`](Self::scale) and
/// [`add`](Self::add) return new targets.
///
/// # Example
///
/// ```
/// use mesh_blendshape::MorphTarget;
/// use nalgebra::Vector3;
///
/// let open = MorphTarget::from_offsets("mouth_open", [(10, Vector3::new(0.0, -1.0, 0.0))]);
/// let wide = MorphTarget::from_offsets("mouth_wide", [(10, Vector3::new(1.0, 0.0, 0.0))]);
///
/// let combined = open.scale(0.5).add(&wide).with_name("jawOpen");
/// assert_eq!(combined.name, "jawOpen");
/// assert_eq!(combined.get(10), Some(&Vector3::new(1.0, -0.5, 0.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MorphTarget {
    /// Shape name, unique within a loaded set.
    pub name: String,
    /// Vertex index to displacement, ordered by index.
    pub offsets: BTreeMap<u32, Vector3<f64>>,
}

impl MorphTarget {
    /// Creates an empty target.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offsets: BTreeMap::new(),
        }
    }

    /// Creates a target from `(vertex, offset)` pairs.
    ///
    /// No sparsity filtering is applied; later duplicates overwrite earlier ones.
    #[must_use]
    pub fn from_offsets<I>(name: impl Into<String>, offsets: I) -> Self
    where
        I: IntoIterator<Item = (u32, Vector3<f64>)>,
    {
        Self {
            name: name.into(),
            offsets: offsets.into_iter().collect(),
        }
    }

    /// Returns the same target under a different name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of stored vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether no vertex is displaced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Displacement for `vertex`, if stored.
    #[must_use]
    pub fn get(&self, vertex: u32) -> Option<&Vector3<f64>> {
        self.offsets.get(&vertex)
    }

    /// Iterates stored entries in ascending vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Vector3<f64>)> {
        self.offsets.iter().map(|(&idx, offset)| (idx, offset))
    }

    /// Largest displacement length, or `0.0` for an empty target.
    #[must_use]
    pub fn max_displacement(&self) -> f64 {
        self.offsets.values().map(|offset| offset.norm()).fold(0.0, f64::max)
    }

    /// Returns a copy with every displacement multiplied by `factor`.
    ///
    /// The vertex set is unchanged, even where the scaled value drops
    /// below [`SPARSITY_THRESHOLD`].
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            name: self.name.clone(),
            offsets: self
                .offsets
                .iter()
                .map(|(&idx, offset)| (idx, *offset * factor))
                .collect(),
        }
    }

    /// Returns the superposition of `self` and `other`.
    ///
    /// The result covers the union of both vertex sets. Shared vertices are
    /// summed. The name is taken from `self`.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let mut offsets = self.offsets.clone();
        for (&idx, offset) in &other.offsets {
            offsets
                .entry(idx)
                .and_modify(|existing| *existing += *offset)
                .or_insert(*offset);
        }
        Self {
            name: self.name.clone(),
            offsets,
        }
    }
}
