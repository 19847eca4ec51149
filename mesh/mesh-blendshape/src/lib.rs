//! Sparse morph targets and ARKit blend shape generation.
//!
//! This crate converts MakeHuman face shapes into the 52 ARKit blend shapes:
//!
//! - [`MorphTarget`] - Sparse per-vertex displacement with `scale`/`add` algebra
//! - `.target` codec - [`MorphTarget::load`], [`MorphTarget::save`], [`load_shape_set`]
//! - [`Catalog`] - Ordered output shapes, each [`ShapeDefinition::Unmapped`] or a
//!   weighted [`ShapeDefinition::Combination`] of inputs
//! - [`generate`] / [`convert`] - Build the catalog and write results
//! - [`GenerationReport`] - Generated/missing partition and per-group coverage
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh_blendshape::{convert, Catalog, ConvertParams};
//!
//! let params = ConvertParams::new("faceshapes/raw", "assets/make_human/targets/arkit");
//! let output = convert(&params, &Catalog::arkit()).unwrap();
//!
//! for coverage in output.report.coverage() {
//!     println!("{}: {}/{}", coverage.group, coverage.generated, coverage.total);
//! }
//! ```
//!
//! # Combination Semantics
//!
//! A combination is a weighted superposition: each referenced input is scaled
//! by its weight and the results are summed over the union of their vertices.
//! Inputs that were not loaded are skipped with a warning. If none of the
//! inputs were loaded the output is reported missing and no file is written.
//!
//! ```
//! use mesh_blendshape::{synthesize, CatalogEntry, MorphTarget, Outcome, ShapeDefinition, ShapeSet};
//! use nalgebra::Vector3;
//!
//! let mut inputs = ShapeSet::new();
//! inputs.insert(
//!     "mouth_open".to_string(),
//!     MorphTarget::from_offsets("mouth_open", [(10, Vector3::new(0.0, 0.0, 0.0002))]),
//! );
//!
//! let jaw = CatalogEntry::new("jawOpen", ShapeDefinition::combination([("mouth_open", 1.0)]));
//! assert!(matches!(synthesize(&inputs, &jaw).outcome, Outcome::Generated(_)));
//!
//! let funnel = CatalogEntry::new("mouthFunnel", ShapeDefinition::combination([("mouth_narrow", 1.0)]));
//! assert!(matches!(synthesize(&inputs, &funnel).outcome, Outcome::Missing(_)));
//! ```
//!
//! # Sides
//!
//! Left/right output shapes are built from symmetric MakeHuman shapes. Splitting
//! them needs base mesh vertex positions, which this crate does not model, so
//! such outputs are listed in [`GenerationReport::mirrored`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod catalog;
mod error;
mod generate;
mod io;
mod params;
mod report;
mod target;

pub use catalog::{Catalog, CatalogEntry, ShapeDefinition, ShapeGroup, Side, WeightedSource};
pub use error::{BlendshapeError, BlendshapeResult};
pub use generate::{convert, generate, synthesize, ConversionOutput, Outcome, Synthesis};
pub use io::{
    load_shape_set, read_target, write_target, ShapeSet, TARGET_EXTENSION, TARGET_HEADER,
};
pub use params::ConvertParams;
pub use report::{GenerationReport, GroupCoverage, MissingReason, MissingShape, UnresolvedSource};
pub use target::{is_significant, MorphTarget, SPARSITY_THRESHOLD};

// Re-export nalgebra types for convenience
pub use nalgebra::Vector3;
