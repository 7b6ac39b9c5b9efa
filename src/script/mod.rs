//! Composition of the transient R script.
//!
//! The script has four statement groups: library loads, data-frame loads,
//! the user's plot expression bound to an internal variable, and one
//! `ggsave` call. Everything interpolated except the user's own plot code
//! goes through strict escaping so a hostile path or parameter cannot break
//! the script apart.

use std::fmt;
use std::path::Path;

use crate::error::GgError;

/// A save-time width or height. `Auto` lets ggsave pick (rendered as `NA`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    Num(f64),
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Auto => f.write_str("NA"),
            Dimension::Num(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for Dimension {
    fn from(v: f64) -> Self {
        Dimension::Num(v)
    }
}

impl From<i32> for Dimension {
    fn from(v: i32) -> Self {
        Dimension::Num(f64::from(v))
    }
}

/// Graph size passed to ggsave; both sides default to automatic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SaveSize {
    pub width: Dimension,
    pub height: Dimension,
}

impl SaveSize {
    pub fn new(width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }
}

pub(crate) struct ComposeInput<'a> {
    pub libs: &'a [String],
    pub loads: &'a [String],
    pub plotcode: &'a str,
    pub outfile: &'a Path,
    pub size: SaveSize,
    pub scale: f64,
    pub units: &'a str,
    pub dpi: u32,
}

/// Build the full script text. `ggplot2` is always loaded last so a user
/// library cannot shadow `ggsave`.
pub(crate) fn compose(input: &ComposeInput<'_>) -> Result<String, GgError> {
    let mut script = String::new();
    for lib in input.libs.iter().map(String::as_str).chain(["ggplot2"]) {
        if !is_valid_library(lib) {
            return Err(GgError::BadLibraryName(lib.to_string()));
        }
        script.push_str(&format!("library({lib})\n"));
    }
    for load in input.loads {
        script.push_str(load);
        script.push('\n');
    }
    script.push_str("..g <- {\n");
    script.push_str(input.plotcode);
    script.push_str("\n}\n");
    script.push_str(&format!(
        "ggsave({outfile}, ..g, width={width}, height={height}, scale={scale}, units={units}, dpi={dpi})\n",
        outfile = r_string(&path_for_r(input.outfile)),
        width = input.size.width,
        height = input.size.height,
        scale = input.scale,
        units = r_string(input.units),
        dpi = input.dpi,
    ));
    Ok(script)
}

/// Escape a value into a double-quoted R string literal.
pub(crate) fn r_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Normalize a host path to the forward-slash form Rscript accepts on every
/// operating system.
pub(crate) fn path_for_r(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// R package names: letters, digits and dots, starting with a letter.
fn is_valid_library(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '.')
}
