//! The output shape catalog.
//!
//! A [`Catalog`] lists every output shape to produce, in order, together with
//! how to build it from input shapes. [`Catalog::arkit`] is the built-in table
//! mapping MakeHuman face shapes onto the 52 ARKit blend shapes.

use std::fmt;
#[cfg(feature = "serde")]
use std::path::Path;

use hashbrown::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{BlendshapeError, BlendshapeResult};

/// One weighted input term of a combination.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeightedSource {
    /// Input shape name.
    pub source: String,
    /// Scalar applied to the input before summing.
    pub weight: f64,
}

impl WeightedSource {
    /// Creates a weighted term.
    #[must_use]
    pub fn new(source: impl Into<String>, weight: f64) -> Self {
        Self {
            source: source.into(),
            weight,
        }
    }
}

/// How an output shape is derived.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ShapeDefinition {
    /// No combination of inputs produces this shape. It has to be sculpted.
    Unmapped,
    /// Weighted sum of input shapes, kept in authoring order.
    Combination(Vec<WeightedSource>),
}

impl ShapeDefinition {
    /// Builds a combination from `(source, weight)` pairs.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_blendshape::ShapeDefinition;
    ///
    /// let smile = ShapeDefinition::combination([("mouth_corner_up", 0.5), ("mouth_wide", 0.3)]);
    /// assert_eq!(smile.sources().count(), 2);
    /// ```
    #[must_use]
    pub fn combination<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self::Combination(
            terms
                .into_iter()
                .map(|(source, weight)| WeightedSource::new(source, weight))
                .collect(),
        )
    }

    /// Whether this definition can never be generated.
    #[must_use]
    pub const fn is_unmapped(&self) -> bool {
        matches!(self, Self::Unmapped)
    }

    /// Input shape names referenced by this definition.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        let terms: &[WeightedSource] = match self {
            Self::Unmapped => &[],
            Self::Combination(terms) => terms,
        };
        terms.iter().map(|t| t.source.as_str())
    }
}

/// Semantic group of an output shape, derived from its name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ShapeGroup {
    /// `eye*`
    Eye,
    /// `jaw*`
    Jaw,
    /// `mouth*`
    Mouth,
    /// `cheek*`
    Cheek,
    /// `nose*`
    Nose,
    /// `brow*`
    Brow,
    /// `tongue*`
    Tongue,
    /// Anything else.
    Other,
}

impl ShapeGroup {
    /// All groups in reporting order.
    pub const ALL: [Self; 8] = [
        Self::Eye,
        Self::Jaw,
        Self::Mouth,
        Self::Cheek,
        Self::Nose,
        Self::Brow,
        Self::Tongue,
        Self::Other,
    ];

    /// Classifies a shape name by prefix.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_blendshape::ShapeGroup;
    ///
    /// assert_eq!(ShapeGroup::of("eyeBlinkLeft"), ShapeGroup::Eye);
    /// assert_eq!(ShapeGroup::of("tongueOut"), ShapeGroup::Tongue);
    /// assert_eq!(ShapeGroup::of("custom"), ShapeGroup::Other);
    /// ```
    #[must_use]
    pub fn of(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|group| group.prefix().is_some_and(|p| name.starts_with(p)))
            .unwrap_or(Self::Other)
    }

    /// Name prefix for this group, `None` for [`Self::Other`].
    #[must_use]
    pub const fn prefix(self) -> Option<&'static str> {
        match self {
            Self::Eye => Some("eye"),
            Self::Jaw => Some("jaw"),
            Self::Mouth => Some("mouth"),
            Self::Cheek => Some("cheek"),
            Self::Nose => Some("nose"),
            Self::Brow => Some("brow"),
            Self::Tongue => Some("tongue"),
            Self::Other => None,
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Eye => "Eyes",
            Self::Jaw => "Jaw",
            Self::Mouth => "Mouth",
            Self::Cheek => "Cheek",
            Self::Nose => "Nose",
            Self::Brow => "Brow",
            Self::Tongue => "Tongue",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ShapeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Facial side an output shape targets, derived from its name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// `*Left`
    Left,
    /// `*Right`
    Right,
    /// Symmetric shape.
    Center,
}

impl Side {
    /// Classifies a shape name by suffix.
    #[must_use]
    pub fn of(name: &str) -> Self {
        if name.ends_with("Left") {
            Self::Left
        } else if name.ends_with("Right") {
            Self::Right
        } else {
            Self::Center
        }
    }

    /// Whether the shape is meant to affect one side only.
    #[must_use]
    pub const fn is_sided(self) -> bool {
        !matches!(self, Self::Center)
    }
}

/// A named output shape and its definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CatalogEntry {
    /// Output shape name.
    pub name: String,
    /// How to build it.
    pub definition: ShapeDefinition,
}

impl CatalogEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(name: impl Into<String>, definition: ShapeDefinition) -> Self {
        Self {
            name: name.into(),
            definition,
        }
    }

    /// Semantic group of this entry.
    #[must_use]
    pub fn group(&self) -> ShapeGroup {
        ShapeGroup::of(&self.name)
    }

    /// Side of this entry.
    #[must_use]
    pub fn side(&self) -> Side {
        Side::of(&self.name)
    }
}

/// Ordered list of output shapes.
///
/// # Example
///
/// ```
/// use mesh_blendshape::{Catalog, ShapeDefinition};
///
/// let arkit = Catalog::arkit();
/// assert_eq!(arkit.len(), 52);
/// assert_eq!(arkit.get("eyeBlinkLeft"), Some(&ShapeDefinition::Unmapped));
///
/// let custom = Catalog::new()
///     .with_entry("jawOpen", ShapeDefinition::combination([("mouth_open", 1.0)]));
/// assert_eq!(custom.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates a catalog from entries, keeping their order.
    #[must_use]
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Appends an entry.
    #[must_use]
    pub fn with_entry(mut self, name: impl Into<String>, definition: ShapeDefinition) -> Self {
        self.entries.push(CatalogEntry::new(name, definition));
        self
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Iterates entries in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, CatalogEntry> {
        self.entries.iter()
    }

    /// Looks up the definition for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ShapeDefinition> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.definition)
    }

    /// Checks that names are unique file stems and weights are finite.
    ///
    /// Names become output file names, so only ASCII letters, digits, `_`
    /// and `-` are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`BlendshapeError::InvalidCatalog`] describing the first problem.
    pub fn validate(&self) -> BlendshapeResult<()> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if entry.name.is_empty() {
                return Err(BlendshapeError::invalid_catalog("entry with empty name"));
            }
            if !is_file_stem(&entry.name) {
                return Err(BlendshapeError::invalid_catalog(format!(
                    "'{}' is not a valid shape name",
                    entry.name
                )));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(BlendshapeError::invalid_catalog(format!(
                    "duplicate entry '{}'",
                    entry.name
                )));
            }
            if let ShapeDefinition::Combination(terms) = &entry.definition {
                if let Some(term) = terms.iter().find(|t| !t.weight.is_finite()) {
                    return Err(BlendshapeError::invalid_catalog(format!(
                        "'{}' has non-finite weight {} for '{}'",
                        entry.name, term.weight, term.source
                    )));
                }
            }
        }
        Ok(())
    }

    /// Parses and validates a catalog from JSON.
    ///
    /// The JSON is an array of entries:
    ///
    /// ```json
    /// [
    ///   { "name": "jawOpen", "definition": { "combination": [{ "source": "mouth_open", "weight": 1.0 }] } },
    ///   { "name": "jawLeft", "definition": "unmapped" }
    /// ]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the catalog fails
    /// [`validate`](Self::validate).
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> BlendshapeResult<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reads and validates a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<Path>>(path: P) -> BlendshapeResult<Self> {
        let path = path.as_ref();
        let json =
            std::fs::read_to_string(path).map_err(|e| BlendshapeError::from_open(path, e))?;
        Self::from_json_str(&json)
    }

    /// The MakeHuman to ARKit mapping.
    ///
    /// MakeHuman drives the eyes with bones rather than shapes, so every eye
    /// entry is unmapped. Sided entries reuse symmetric MakeHuman shapes.
    #[must_use]
    pub fn arkit() -> Self {
        use ShapeDefinition::Unmapped;

        let mix = |terms: &[(&str, f64)]| ShapeDefinition::combination(terms.iter().copied());

        let table: Vec<(&str, ShapeDefinition)> = vec![
            // Eyes
            ("eyeBlinkLeft", Unmapped),
            ("eyeBlinkRight", Unmapped),
            ("eyeLookDownLeft", Unmapped),
            ("eyeLookDownRight", Unmapped),
            ("eyeLookInLeft", Unmapped),
            ("eyeLookInRight", Unmapped),
            ("eyeLookOutLeft", Unmapped),
            ("eyeLookOutRight", Unmapped),
            ("eyeLookUpLeft", Unmapped),
            ("eyeLookUpRight", Unmapped),
            ("eyeSquintLeft", Unmapped),
            ("eyeSquintRight", Unmapped),
            ("eyeWideLeft", Unmapped),
            ("eyeWideRight", Unmapped),
            // Jaw
            ("jawOpen", mix(&[("mouth_open", 1.0)])),
            ("jawForward", Unmapped),
            ("jawLeft", Unmapped),
            ("jawRight", Unmapped),
            // Mouth
            ("mouthClose", Unmapped),
            ("mouthFunnel", mix(&[("mouth_narrow", 1.0)])),
            ("mouthPucker", mix(&[("mouth_narrow", 1.0)])),
            ("mouthLeft", Unmapped),
            ("mouthRight", Unmapped),
            ("mouthSmileLeft", mix(&[("mouth_corner_up", 0.5), ("mouth_wide", 0.3)])),
            ("mouthSmileRight", mix(&[("mouth_corner_up", 0.5), ("mouth_wide", 0.3)])),
            ("mouthFrownLeft", mix(&[("mouth_corner_down", 1.0)])),
            ("mouthFrownRight", mix(&[("mouth_corner_down", 1.0)])),
            ("mouthDimpleLeft", mix(&[("mouth_corner_in", 0.5)])),
            ("mouthDimpleRight", mix(&[("mouth_corner_in", 0.5)])),
            ("mouthStretchLeft", mix(&[("mouth_wide", 1.0)])),
            ("mouthStretchRight", mix(&[("mouth_wide", 1.0)])),
            ("mouthRollLower", mix(&[("lips_lower_in", 1.0)])),
            ("mouthRollUpper", mix(&[("lips_upper_in", 1.0)])),
            ("mouthShrugLower", mix(&[("lips_lower_out", 1.0)])),
            ("mouthShrugUpper", mix(&[("lips_upper_out", 1.0)])),
            ("mouthPressLeft", mix(&[("lips_part", -0.5)])),
            ("mouthPressRight", mix(&[("lips_part", -0.5)])),
            ("mouthLowerDownLeft", mix(&[("lips_mid_lower_down", 1.0)])),
            ("mouthLowerDownRight", mix(&[("lips_mid_lower_down", 1.0)])),
            ("mouthUpperUpLeft", mix(&[("lips_mid_upper_up", 1.0)])),
            ("mouthUpperUpRight", mix(&[("lips_mid_upper_up", 1.0)])),
            // Cheek
            ("cheekPuff", mix(&[("cheek_balloon", 1.0)])),
            ("cheekSquintLeft", mix(&[("cheek_squint", 1.0), ("cheek_up", 0.5)])),
            ("cheekSquintRight", mix(&[("cheek_squint", 1.0), ("cheek_up", 0.5)])),
            // Nose
            ("noseSneerLeft", mix(&[("nose_wrinkle", 0.5)])),
            ("noseSneerRight", mix(&[("nose_wrinkle", 0.5)])),
            // Brow
            ("browDownLeft", mix(&[("brow_mid_down", 0.5), ("brow_outer_down", 0.5)])),
            ("browDownRight", mix(&[("brow_mid_down", 0.5), ("brow_outer_down", 0.5)])),
            ("browInnerUp", mix(&[("brow_mid_up", 1.0)])),
            ("browOuterUpLeft", mix(&[("brow_outer_up", 1.0)])),
            ("browOuterUpRight", mix(&[("brow_outer_up", 1.0)])),
            // Tongue
            ("tongueOut", mix(&[("tongue_out", 1.0)])),
        ];

        Self::from_entries(
            table
                .into_iter()
                .map(|(name, definition)| CatalogEntry::new(name, definition))
                .collect(),
        )
    }
}

fn is_file_stem(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogEntry;
    type IntoIter = std::slice::Iter<'a, CatalogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
