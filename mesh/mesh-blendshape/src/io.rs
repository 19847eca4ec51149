//! `.target` file I/O.
//!
//! MakeHuman stores each morph target as plain text, one displaced vertex per
//! line:
//!
//! ```text
//! # comment
//! # comment
//! <vertex_index> <dx> <dy> <dz>
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Lines with fewer than
//! four fields are skipped, so trailing metadata does not break loading. A line
//! with four or more fields whose first four do not parse is a hard error.
//!
//! # Example
//!
//! ```no_run
//! use mesh_blendshape::{load_shape_set, MorphTarget};
//!
//! let shapes = load_shape_set("faceshapes/raw").unwrap();
//! let open = MorphTarget::load("faceshapes/raw/mouth_open.target").unwrap();
//! open.scale(0.5).save("half_open.target").unwrap();
//! ```

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use nalgebra::Vector3;
use tracing::{debug, info};

use crate::error::{BlendshapeError, BlendshapeResult};
use crate::target::{is_significant, MorphTarget};

/// File extension of morph target files (without the dot).
pub const TARGET_EXTENSION: &str = "target";

/// Header written at the top of every saved target.
pub const TARGET_HEADER: [&str; 2] = [
    "# ARKit blend shape generated from MakeHuman targets",
    "# basemesh hm08",
];

/// Loaded input shapes keyed by name.
pub type ShapeSet = HashMap<String, MorphTarget>;

impl MorphTarget {
    /// Loads a target from a `.target` file.
    ///
    /// The name is the file stem. Entries below the sparsity threshold are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read, if the stem is
    /// not valid UTF-8, or if a data line holds a malformed number.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mesh_blendshape::MorphTarget;
    ///
    /// let target = MorphTarget::load("mouth_open.target").unwrap();
    /// assert_eq!(target.name, "mouth_open");
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> BlendshapeResult<Self> {
        let path = path.as_ref();
        let name = shape_name(path)?;
        let file = File::open(path).map_err(|e| BlendshapeError::from_open(path, e))?;
        parse_target(name, BufReader::new(file), path)
    }

    /// Saves the target as a `.target` file, overwriting any existing file.
    ///
    /// Output is sorted by vertex index with six decimals per component, so
    /// saving an unchanged target always produces identical bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> BlendshapeResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_target(self, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Decodes a target from any buffered reader.
///
/// # Errors
///
/// Returns [`BlendshapeError::Parse`] on a malformed data line and
/// [`BlendshapeError::Io`] if reading fails.
///
/// # Example
///
/// ```
/// use mesh_blendshape::read_target;
///
/// let text = "# header\n10 0 0 0.0002\n11 0 0 0.00001\n";
/// let target = read_target("mouth_open", text.as_bytes()).unwrap();
/// assert_eq!(target.len(), 1);
/// ```
pub fn read_target<R: BufRead>(name: impl Into<String>, reader: R) -> BlendshapeResult<MorphTarget> {
    let name = name.into();
    let origin = PathBuf::from(format!("<{name}>"));
    parse_target(name, reader, &origin)
}

/// Encodes a target to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_target<W: Write>(target: &MorphTarget, writer: &mut W) -> BlendshapeResult<()> {
    for line in TARGET_HEADER {
        writeln!(writer, "{line}")?;
    }
    for (idx, offset) in target.iter() {
        writeln!(
            writer,
            "{idx} {:.6} {:.6} {:.6}",
            offset.x, offset.y, offset.z
        )?;
    }
    Ok(())
}

fn parse_target<R: BufRead>(
    name: String,
    reader: R,
    origin: &Path,
) -> BlendshapeResult<MorphTarget> {
    let mut target = MorphTarget::new(name);

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }

        let parse_error = |message: String| BlendshapeError::Parse {
            path: origin.to_path_buf(),
            line: line_no + 1,
            message,
        };

        let idx = parts[0]
            .parse::<u32>()
            .map_err(|e| parse_error(format!("invalid vertex index '{}': {e}", parts[0])))?;

        let mut components = [0.0_f64; 3];
        for (axis, (slot, token)) in components.iter_mut().zip(&parts[1..4]).enumerate() {
            *slot = token.parse::<f64>().map_err(|e| {
                parse_error(format!("invalid {} offset '{token}': {e}", ["x", "y", "z"][axis]))
            })?;
        }

        let offset = Vector3::from(components);
        if is_significant(&offset) {
            target.offsets.insert(idx, offset);
        }
    }

    Ok(target)
}

/// Shape name for a target file: its stem.
fn shape_name(path: &Path) -> BlendshapeResult<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| BlendshapeError::InvalidFileName {
            path: path.to_path_buf(),
        })
}

fn is_target_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(TARGET_EXTENSION))
}

/// Loads every `.target` file directly inside `dir`.
///
/// Subdirectories are not searched. A directory that does not exist yields an
/// empty set; callers decide whether that deserves a warning.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or any target file in
/// it fails to load.
pub fn load_shape_set<P: AsRef<Path>>(dir: P) -> BlendshapeResult<ShapeSet> {
    let dir = dir.as_ref();
    let mut shapes = ShapeSet::new();

    if !dir.exists() {
        debug!("Input directory {} does not exist", dir.display());
        return Ok(shapes);
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_target_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    for path in paths {
        let target = MorphTarget::load(&path)?;
        info!("Loaded: {} ({} vertices)", target.name, target.len());
        if let Some(previous) = shapes.insert(target.name.clone(), target) {
            debug!("Replaced earlier shape '{}' from {}", previous.name, path.display());
        }
    }

    Ok(shapes)
}
