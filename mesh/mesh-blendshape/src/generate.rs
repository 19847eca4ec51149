//! Blend shape generation.
//!
//! Each catalog entry is either skipped as unmapped or built by scaling and
//! summing the input shapes it references. Terms whose input was not loaded
//! are dropped with a warning; an entry left with no terms is reported as
//! missing rather than written as an empty shape.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogEntry, ShapeDefinition};
use crate::error::BlendshapeResult;
use crate::io::{load_shape_set, ShapeSet, TARGET_EXTENSION};
use crate::params::ConvertParams;
use crate::report::{GenerationReport, MissingReason, MissingShape, UnresolvedSource};
use crate::target::MorphTarget;

/// What became of a single catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A target named after the entry.
    Generated(MorphTarget),
    /// Nothing could be produced.
    Missing(MissingReason),
}

/// Result of combining one catalog entry, before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// Generated target or the reason it is missing.
    pub outcome: Outcome,
    /// Referenced inputs that were not loaded, in definition order.
    pub unresolved: Vec<String>,
}

/// Combines the inputs referenced by `entry`.
///
/// Pure apart from logging: nothing is written.
///
/// # Example
///
/// ```
/// use mesh_blendshape::{synthesize, CatalogEntry, MorphTarget, Outcome, ShapeDefinition, ShapeSet};
/// use nalgebra::Vector3;
///
/// let mut inputs = ShapeSet::new();
/// inputs.insert(
///     "mouth_corner_up".to_string(),
///     MorphTarget::from_offsets("mouth_corner_up", [(5, Vector3::new(1.0, 0.0, 0.0))]),
/// );
///
/// let entry = CatalogEntry::new(
///     "mouthSmileLeft",
///     ShapeDefinition::combination([("mouth_corner_up", 0.5), ("mouth_wide", 0.3)]),
/// );
/// let synthesis = synthesize(&inputs, &entry);
///
/// assert_eq!(synthesis.unresolved, vec!["mouth_wide"]);
/// let Outcome::Generated(target) = synthesis.outcome else { panic!() };
/// assert_eq!(target.get(5), Some(&Vector3::new(0.5, 0.0, 0.0)));
/// ```
#[must_use]
pub fn synthesize(inputs: &ShapeSet, entry: &CatalogEntry) -> Synthesis {
    let terms = match &entry.definition {
        ShapeDefinition::Unmapped => {
            return Synthesis {
                outcome: Outcome::Missing(MissingReason::Unmapped),
                unresolved: Vec::new(),
            };
        }
        ShapeDefinition::Combination(terms) => terms,
    };

    let mut unresolved = Vec::new();
    let mut accumulated: Option<MorphTarget> = None;

    for term in terms {
        let Some(shape) = inputs.get(&term.source) else {
            warn!(
                output = %entry.name,
                source = %term.source,
                "Input shape not found, dropping term"
            );
            unresolved.push(term.source.clone());
            continue;
        };

        let scaled = shape.scale(term.weight);
        accumulated = Some(match accumulated {
            None => scaled,
            Some(sum) => sum.add(&scaled),
        });
    }

    let outcome = match accumulated {
        Some(target) => Outcome::Generated(target.with_name(entry.name.as_str())),
        None => Outcome::Missing(MissingReason::NoResolvedSources),
    };

    Synthesis {
        outcome,
        unresolved,
    }
}

/// Generates every catalog entry and writes the results to `output_dir`.
///
/// The directory is created if needed. Each generated shape is saved as
/// `<output_dir>/<name>.target`.
///
/// Left/right catalog entries are built from symmetric inputs, so both sides
/// receive the same displacement. Such shapes are listed in
/// [`GenerationReport::mirrored`].
///
/// # Errors
///
/// Returns [`BlendshapeError::InvalidCatalog`](crate::BlendshapeError::InvalidCatalog)
/// if the catalog fails [`Catalog::validate`], before anything is written.
/// Returns an I/O error if the output directory cannot be created or a target
/// cannot be written. Missing inputs are not errors.
///
/// # Example
///
/// ```no_run
/// use mesh_blendshape::{generate, load_shape_set, Catalog};
///
/// let inputs = load_shape_set("faceshapes/raw").unwrap();
/// let report = generate(&inputs, &Catalog::arkit(), "targets/arkit").unwrap();
/// println!("{}", report.summary());
/// ```
pub fn generate<P: AsRef<Path>>(
    inputs: &ShapeSet,
    catalog: &Catalog,
    output_dir: P,
) -> BlendshapeResult<GenerationReport> {
    catalog.validate()?;

    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    info!(
        inputs = inputs.len(),
        entries = catalog.len(),
        output = %output_dir.display(),
        "Generating blend shapes"
    );

    let mut report = GenerationReport::default();

    for entry in catalog {
        let synthesis = synthesize(inputs, entry);

        report
            .unresolved
            .extend(synthesis.unresolved.into_iter().map(|source| UnresolvedSource {
                output: entry.name.clone(),
                source,
            }));

        match synthesis.outcome {
            Outcome::Missing(reason) => {
                debug!(output = %entry.name, ?reason, "Shape missing");
                report.missing.push(MissingShape {
                    name: entry.name.clone(),
                    reason,
                });
            }
            Outcome::Generated(target) => {
                let path = output_dir.join(format!("{}.{TARGET_EXTENSION}", entry.name));
                target.save(&path)?;
                info!("Generated: {} ({} vertices)", entry.name, target.len());

                if entry.side().is_sided() {
                    warn!(
                        output = %entry.name,
                        "No side filtering available, shape affects both sides"
                    );
                    report.mirrored.push(entry.name.clone());
                }
                report.generated.push(entry.name.clone());
            }
        }
    }

    info!("{}", report.summary());
    Ok(report)
}

/// Everything produced by [`convert`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutput {
    /// Input directory actually read.
    pub input_dir: PathBuf,
    /// Number of input shapes loaded.
    pub inputs_loaded: usize,
    /// Generation outcome.
    pub report: GenerationReport,
}

/// Resolves the input directory, loads it, and generates the catalog.
///
/// # Errors
///
/// Returns an error if an input file cannot be read or an output file cannot
/// be written. An input directory that does not exist is only a warning.
///
/// # Example
///
/// ```no_run
/// use mesh_blendshape::{convert, Catalog, ConvertParams};
///
/// let params = ConvertParams::new("faceshapes/raw", "targets/arkit");
/// let output = convert(&params, &Catalog::arkit()).unwrap();
/// println!("loaded {} inputs", output.inputs_loaded);
/// ```
pub fn convert(params: &ConvertParams, catalog: &Catalog) -> BlendshapeResult<ConversionOutput> {
    let input_dir = params.resolve_input_dir();
    if input_dir != params.input_dir {
        info!("Using alternate input path: {}", input_dir.display());
    }
    if !input_dir.is_dir() {
        warn!("Input path not found: {}", input_dir.display());
    }

    let inputs = load_shape_set(input_dir)?;
    info!("Loaded {} input shapes", inputs.len());

    let report = generate(&inputs, catalog, &params.output_dir)?;

    Ok(ConversionOutput {
        input_dir: input_dir.to_path_buf(),
        inputs_loaded: inputs.len(),
        report,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::error::BlendshapeError;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use tempfile::tempdir;

    fn shape(name: &str, offsets: &[(u32, [f64; 3])]) -> MorphTarget {
        MorphTarget::from_offsets(
            name,
            offsets
                .iter()
                .map(|&(idx, [x, y, z])| (idx, Vector3::new(x, y, z))),
        )
    }

    fn inputs(shapes: Vec<MorphTarget>) -> ShapeSet {
        shapes.into_iter().map(|s| (s.name.clone(), s)).collect()
    }

    #[test]
    fn test_unmapped_is_missing() {
        let entry = CatalogEntry::new("eyeBlinkLeft", ShapeDefinition::Unmapped);
        let synthesis = synthesize(&ShapeSet::new(), &entry);

        assert_eq!(synthesis.outcome, Outcome::Missing(MissingReason::Unmapped));
        assert!(synthesis.unresolved.is_empty());
    }

    #[test]
    fn test_all_sources_absent_is_missing() {
        let entry = CatalogEntry::new(
            "browDownLeft",
            ShapeDefinition::combination([("brow_mid_down", 0.5), ("brow_outer_down", 0.5)]),
        );
        let synthesis = synthesize(&ShapeSet::new(), &entry);

        assert_eq!(
            synthesis.outcome,
            Outcome::Missing(MissingReason::NoResolvedSources)
        );
        assert_eq!(synthesis.unresolved, vec!["brow_mid_down", "brow_outer_down"]);
    }

    #[test]
    fn test_weighted_sum_of_sources() {
        let set = inputs(vec![
            shape("brow_mid_down", &[(1, [0.0, -2.0, 0.0]), (2, [1.0, 0.0, 0.0])]),
            shape("brow_outer_down", &[(2, [1.0, 0.0, 0.0]), (3, [0.0, 0.0, 4.0])]),
        ]);
        let entry = CatalogEntry::new(
            "browDownLeft",
            ShapeDefinition::combination([("brow_mid_down", 0.5), ("brow_outer_down", 0.5)]),
        );

        let Outcome::Generated(target) = synthesize(&set, &entry).outcome else {
            panic!("expected a generated shape");
        };

        assert_eq!(target.name, "browDownLeft");
        assert_eq!(target.len(), 3);
        assert_relative_eq!(target.get(1).unwrap().y, -1.0);
        assert_relative_eq!(target.get(2).unwrap().x, 1.0);
        assert_relative_eq!(target.get(3).unwrap().z, 2.0);
    }

    #[test]
    fn test_input_shapes_are_not_mutated() {
        let set = inputs(vec![shape("lips_part", &[(9, [0.0, 1.0, 0.0])])]);
        let entry = CatalogEntry::new(
            "mouthPressLeft",
            ShapeDefinition::combination([("lips_part", -0.5)]),
        );

        let _ = synthesize(&set, &entry);
        assert_eq!(set["lips_part"].name, "lips_part");
        assert_eq!(set["lips_part"].get(9), Some(&Vector3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_generate_partitions_catalog() {
        let dir = tempdir().unwrap();
        let set = inputs(vec![shape("mouth_open", &[(10, [0.0, 0.0, 0.0002])])]);

        let report = generate(&set, &Catalog::arkit(), dir.path()).unwrap();

        assert_eq!(report.total(), 52);
        assert_eq!(report.generated, vec!["jawOpen"]);
        for name in &report.generated {
            assert!(!report.missing_names().contains(&name.as_str()));
        }
        assert!(dir.path().join("jawOpen.target").exists());
        assert!(!dir.path().join("jawLeft.target").exists());
        assert!(!dir.path().join("mouthFunnel.target").exists());
    }

    #[test]
    fn test_generate_flags_sided_outputs() {
        let dir = tempdir().unwrap();
        let set = inputs(vec![shape("nose_wrinkle", &[(1, [0.0, 1.0, 0.0])])]);
        let catalog = Catalog::new()
            .with_entry("noseSneerLeft", ShapeDefinition::combination([("nose_wrinkle", 0.5)]))
            .with_entry("noseSneerRight", ShapeDefinition::combination([("nose_wrinkle", 0.5)]))
            .with_entry("cheekPuff", ShapeDefinition::combination([("nose_wrinkle", 1.0)]));

        let report = generate(&set, &catalog, dir.path()).unwrap();

        assert_eq!(report.generated.len(), 3);
        assert_eq!(report.mirrored, vec!["noseSneerLeft", "noseSneerRight"]);
        assert_eq!(
            fs::read(dir.path().join("noseSneerLeft.target")).unwrap(),
            fs::read(dir.path().join("noseSneerRight.target")).unwrap()
        );
    }

    #[test]
    fn test_generate_rejects_escaping_names() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("arkit");
        let set = inputs(vec![shape("mouth_open", &[(10, [0.0, 0.0, 1.0])])]);
        let catalog =
            Catalog::new().with_entry("../escaped", ShapeDefinition::combination([("mouth_open", 1.0)]));

        let err = generate(&set, &catalog, &output).unwrap_err();

        assert!(matches!(err, BlendshapeError::InvalidCatalog { .. }));
        assert!(!dir.path().join("escaped.target").exists());
        assert!(!output.exists());
    }

    #[test]
    fn test_generate_rejects_duplicate_names() {
        let dir = tempdir().unwrap();
        let set = inputs(vec![
            shape("mouth_open", &[(10, [0.0, 0.0, 1.0])]),
            shape("tongue_out", &[(4, [0.0, 1.0, 0.0])]),
        ]);
        let catalog = Catalog::new()
            .with_entry("jawOpen", ShapeDefinition::combination([("mouth_open", 1.0)]))
            .with_entry("jawOpen", ShapeDefinition::combination([("tongue_out", 1.0)]));

        let err = generate(&set, &catalog, dir.path()).unwrap_err();

        assert!(matches!(err, BlendshapeError::InvalidCatalog { .. }));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_generate_creates_nested_output_dir() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("assets").join("targets").join("arkit");
        let set = inputs(vec![shape("tongue_out", &[(4, [0.0, 0.0, 1.0])])]);
        let catalog =
            Catalog::new().with_entry("tongueOut", ShapeDefinition::combination([("tongue_out", 1.0)]));

        generate(&set, &catalog, &output).unwrap();
        assert!(output.join("tongueOut.target").is_file());
    }

    #[test]
    fn test_convert_with_missing_input_dir() {
        let dir = tempdir().unwrap();
        let params = ConvertParams::new(dir.path().join("nowhere"), dir.path().join("out"));

        let output = convert(&params, &Catalog::arkit()).unwrap();

        assert_eq!(output.inputs_loaded, 0);
        assert!(output.report.generated.is_empty());
        assert_eq!(output.report.missing.len(), 52);
        assert_eq!(
            output
                .report
                .missing
                .iter()
                .filter(|m| m.reason == MissingReason::NoResolvedSources)
                .count(),
            32
        );
    }

    #[test]
    fn test_convert_uses_fallback_dir() {
        let dir = tempdir().unwrap();
        let fallback = dir.path().join("raw");
        fs::create_dir(&fallback).unwrap();
        fs::write(fallback.join("tongue_out.target"), "4 0 0 1\n").unwrap();

        let params = ConvertParams::new(dir.path().join("nowhere"), dir.path().join("out"))
            .with_fallback_input_dir(&fallback);
        let output = convert(&params, &Catalog::arkit()).unwrap();

        assert_eq!(output.input_dir, fallback);
        assert_eq!(output.inputs_loaded, 1);
        assert_eq!(output.report.generated, vec!["tongueOut"]);
    }
}
