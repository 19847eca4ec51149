//! Generation results and coverage reporting.
//!
//! This module provides the [`GenerationReport`] struct which partitions the
//! catalog into generated and missing shapes, along with the diagnostics
//! collected while combining inputs.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::catalog::ShapeGroup;

/// Why an output shape was not generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MissingReason {
    /// The catalog marks the shape as needing manual sculpting.
    Unmapped,
    /// None of the referenced input shapes were loaded.
    NoResolvedSources,
}

/// An output shape that was not generated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MissingShape {
    /// Output shape name.
    pub name: String,
    /// Why it is missing.
    pub reason: MissingReason,
}

/// A combination term dropped because its input shape was not loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct UnresolvedSource {
    /// Output shape the term belongs to.
    pub output: String,
    /// Input shape that was not found.
    pub source: String,
}

/// Coverage of one semantic group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GroupCoverage {
    /// The group.
    pub group: ShapeGroup,
    /// Catalog entries in the group.
    pub total: usize,
    /// Entries that were generated.
    pub generated: usize,
    /// Entries that are missing.
    pub missing: usize,
}

/// Outcome of running the catalog against a set of inputs.
///
/// Every catalog entry appears in exactly one of [`generated`](Self::generated)
/// or [`missing`](Self::missing), both in catalog order.
///
/// # Examples
///
/// ```
/// use mesh_blendshape::{GenerationReport, MissingReason, MissingShape};
///
/// let mut report = GenerationReport::default();
/// report.generated.push("jawOpen".to_string());
/// report.missing.push(MissingShape {
///     name: "jawLeft".to_string(),
///     reason: MissingReason::Unmapped,
/// });
///
/// assert_eq!(report.total(), 2);
/// assert_eq!(report.missing_names(), vec!["jawLeft"]);
/// println!("{}", report.summary());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GenerationReport {
    /// Output shapes written to disk.
    pub generated: Vec<String>,
    /// Output shapes that could not be produced.
    pub missing: Vec<MissingShape>,
    /// Combination terms dropped for lack of an input.
    pub unresolved: Vec<UnresolvedSource>,
    /// Generated left/right shapes that carry displacement for both sides.
    pub mirrored: Vec<String>,
}

impl GenerationReport {
    /// Number of catalog entries covered by this report.
    #[must_use]
    pub fn total(&self) -> usize {
        self.generated.len() + self.missing.len()
    }

    /// Whether every entry was generated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Names of the missing shapes, in catalog order.
    #[must_use]
    pub fn missing_names(&self) -> Vec<&str> {
        self.missing.iter().map(|m| m.name.as_str()).collect()
    }

    /// Missing shapes belonging to `group`.
    pub fn missing_in(&self, group: ShapeGroup) -> impl Iterator<Item = &MissingShape> {
        self.missing
            .iter()
            .filter(move |m| ShapeGroup::of(&m.name) == group)
    }

    /// Per-group coverage in reporting order. Groups without entries are omitted.
    ///
    /// # Examples
    ///
    /// ```
    /// use mesh_blendshape::{GenerationReport, MissingReason, MissingShape, ShapeGroup};
    ///
    /// let mut report = GenerationReport::default();
    /// report.generated.push("jawOpen".to_string());
    /// report.missing.push(MissingShape {
    ///     name: "jawLeft".to_string(),
    ///     reason: MissingReason::Unmapped,
    /// });
    ///
    /// let coverage = report.coverage();
    /// assert_eq!(coverage.len(), 1);
    /// assert_eq!(coverage[0].group, ShapeGroup::Jaw);
    /// assert_eq!((coverage[0].generated, coverage[0].total), (1, 2));
    /// ```
    #[must_use]
    pub fn coverage(&self) -> Vec<GroupCoverage> {
        ShapeGroup::ALL
            .into_iter()
            .filter_map(|group| {
                let generated = self
                    .generated
                    .iter()
                    .filter(|name| ShapeGroup::of(name) == group)
                    .count();
                let missing = self.missing_in(group).count();
                let total = generated + missing;
                (total > 0).then_some(GroupCoverage {
                    group,
                    total,
                    generated,
                    missing,
                })
            })
            .collect()
    }

    /// One-line summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "GenerationReport: {}/{} shapes generated, {} missing, \
             {} unresolved source references, {} mirrored",
            self.generated.len(),
            self.total(),
            self.missing.len(),
            self.unresolved.len(),
            self.mirrored.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing(name: &str, reason: MissingReason) -> MissingShape {
        MissingShape {
            name: name.to_string(),
            reason,
        }
    }

    fn sample_report() -> GenerationReport {
        GenerationReport {
            generated: vec![
                "jawOpen".to_string(),
                "mouthFunnel".to_string(),
                "tongueOut".to_string(),
            ],
            missing: vec![
                missing("eyeBlinkLeft", MissingReason::Unmapped),
                missing("eyeBlinkRight", MissingReason::Unmapped),
                missing("jawLeft", MissingReason::Unmapped),
                missing("mouthPucker", MissingReason::NoResolvedSources),
            ],
            unresolved: vec![UnresolvedSource {
                output: "mouthPucker".to_string(),
                source: "mouth_narrow".to_string(),
            }],
            mirrored: Vec::new(),
        }
    }

    #[test]
    fn test_totals() {
        let report = sample_report();
        assert_eq!(report.total(), 7);
        assert!(!report.is_complete());
        assert!(GenerationReport::default().is_complete());
    }

    #[test]
    fn test_missing_names_keep_order() {
        assert_eq!(
            sample_report().missing_names(),
            vec!["eyeBlinkLeft", "eyeBlinkRight", "jawLeft", "mouthPucker"]
        );
    }

    #[test]
    fn test_coverage_by_group() {
        let coverage = sample_report().coverage();
        let groups: Vec<ShapeGroup> = coverage.iter().map(|c| c.group).collect();
        assert_eq!(
            groups,
            vec![
                ShapeGroup::Eye,
                ShapeGroup::Jaw,
                ShapeGroup::Mouth,
                ShapeGroup::Tongue
            ]
        );

        let eye = coverage[0];
        assert_eq!((eye.generated, eye.missing, eye.total), (0, 2, 2));
        let mouth = coverage[2];
        assert_eq!((mouth.generated, mouth.missing, mouth.total), (1, 1, 2));
    }

    #[test]
    fn test_missing_in_group() {
        let report = sample_report();
        let jaw: Vec<&str> = report
            .missing_in(ShapeGroup::Jaw)
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(jaw, vec!["jawLeft"]);
    }

    #[test]
    fn test_summary_mentions_counts() {
        let summary = sample_report().summary();
        assert!(summary.contains("3/7"));
        assert!(summary.contains("4 missing"));
    }
}
