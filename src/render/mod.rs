//! The two public operations, `ggwrite` and `ggshow`, plus artifact
//! materialization.
//!
//! Control flow is strictly linear per call: export tables, compose the
//! script, invoke Rscript, verify the artifact, materialize the result.
//! `ggwrite` deliberately keeps interpreter failures non-fatal so batch
//! pipelines are not halted; `ggshow` escalates the downstream consequence
//! (a missing artifact) to a hard error, because no result can be built
//! from nothing.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::TempDir;

use crate::config;
use crate::diag;
use crate::error::GgError;
use crate::exec;
use crate::script::{self, Dimension, SaveSize};
use crate::table::{self, Table};

/// Options shared by every write call.
///
/// # Examples
///
/// ```no_run
/// use ggshow::{ggwrite, WriteOptions};
///
/// # fn main() -> anyhow::Result<()> {
/// let opts = WriteOptions::default().size(3.0, 2.0).dpi(150);
/// ggwrite("qplot(1:3, c(1, 4, 9))", "out.png", &opts)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Extra R libraries to load; `ggplot2` is always added.
    pub libs: Vec<String>,
    pub size: SaveSize,
    pub scale: f64,
    pub units: String,
    pub dpi: u32,
    /// Per-call interpreter override; `None` uses the process-wide default.
    pub rscript: Option<String>,
    /// Named data frames, exported in this order.
    pub tables: Vec<(String, Table)>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            libs: Vec::new(),
            size: SaveSize::default(),
            scale: 1.0,
            units: "in".to_string(),
            dpi: 300,
            rscript: None,
            tables: Vec::new(),
        }
    }
}

impl WriteOptions {
    pub fn lib(mut self, name: impl Into<String>) -> Self {
        self.libs.push(name.into());
        self
    }

    pub fn size(mut self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.size = SaveSize::new(width, height);
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn rscript(mut self, command: impl Into<String>) -> Self {
        self.rscript = Some(command.into());
        self
    }

    pub fn table(mut self, name: impl Into<String>, table: Table) -> Self {
        self.tables.push((name.into(), table));
        self
    }
}

/// Diagnostics from a non-zero interpreter exit. Kept whole so a failed run
/// can be reproduced by hand from the warning text alone.
#[derive(Debug, Clone)]
pub struct ProcessFailure {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
    /// The full generated script, verbatim.
    pub script: String,
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "some error occurred while running the R code; the graph may not have been created.\
             \nExit code: {}\nStdout:\n\n{}\nStderr:\n\n{}\nR code (auto-generated):\n{}",
            self.status, self.stdout, self.stderr, self.script
        )
    }
}

impl ProcessFailure {
    /// Escalate to the hard-failure form.
    pub fn into_error(self) -> GgError {
        GgError::ExternalProcess(self)
    }
}

/// What `ggwrite` observed. An interpreter failure is reported here (and as
/// a stderr warning) instead of an `Err`, so callers running batches can
/// keep going.
#[derive(Debug)]
pub enum WriteOutcome {
    Written,
    InterpreterFailed(ProcessFailure),
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written)
    }
}

/// Write a ggplot2 graph to `outfile`.
///
/// Exports every named table to a CSV interchange file in a scratch
/// directory, composes the R script, and runs it under Rscript. On a zero
/// exit the interpreter's stdout/stderr are forwarded verbatim to this
/// process's own streams. On a non-zero exit a warning carrying stdout,
/// stderr and the generated script is printed and returned; the call itself
/// still succeeds. An interpreter that cannot be spawned is treated the same
/// way. Hard `Err`s are reserved for conditions before the interpreter runs:
/// bad table or library names, or serialization failures.
pub fn ggwrite(
    plotcode: &str,
    outfile: impl AsRef<Path>,
    opts: &WriteOptions,
) -> Result<WriteOutcome, GgError> {
    let outfile = outfile.as_ref();
    let tmpdir = TempDir::new()?;
    let loads = table::export_tables(tmpdir.path(), &opts.tables)?;
    let script_text = script::compose(&script::ComposeInput {
        libs: &opts.libs,
        loads: &loads,
        plotcode,
        outfile,
        size: opts.size,
        scale: opts.scale,
        units: &opts.units,
        dpi: opts.dpi,
    })?;

    let command = opts.rscript.clone().unwrap_or_else(config::rscript);
    let run = match exec::run_script(&command, &script_text) {
        Ok(run) => run,
        // An interpreter that cannot even be spawned gets the same two-tier
        // treatment as a non-zero exit: warn here, let the missing artifact
        // escalate one layer up.
        Err(err @ GgError::InterpreterNotFound { .. }) => {
            let failure = ProcessFailure {
                status: -1,
                stdout: String::new(),
                stderr: err.to_string(),
                script: script_text,
            };
            diag::warn(&failure.to_string());
            return Ok(WriteOutcome::InterpreterFailed(failure));
        }
        Err(err) => return Err(err),
    };
    if run.success() {
        // Transparency: hand the interpreter's chatter to our own streams.
        let _ = io::stderr().write_all(run.stderr.as_bytes());
        let _ = io::stdout().write_all(run.stdout.as_bytes());
        Ok(WriteOutcome::Written)
    } else {
        let failure = ProcessFailure {
            status: run.status,
            stdout: run.stdout,
            stderr: run.stderr,
            script: script_text,
        };
        diag::warn(&failure.to_string());
        Ok(WriteOutcome::InterpreterFailed(failure))
    }
}

/// Output formats ggsave can produce and this crate knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Tiff,
    Svg,
    Pdf,
    Eps,
}

impl ImageFormat {
    /// Parse a user-supplied format name; anything outside the fixed set is
    /// rejected before any interpreter work happens.
    pub fn from_name(name: &str) -> Result<Self, GgError> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "bmp" => Ok(ImageFormat::Bmp),
            "tiff" => Ok(ImageFormat::Tiff),
            "svg" => Ok(ImageFormat::Svg),
            "pdf" => Ok(ImageFormat::Pdf),
            "eps" => Ok(ImageFormat::Eps),
            other => Err(GgError::UnsupportedFormat(other.to_string())),
        }
    }

    /// File extension; ggsave picks its device from this.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Svg => "svg",
            ImageFormat::Pdf => "pdf",
            ImageFormat::Eps => "eps",
        }
    }

    /// Raster formats carry display-size hints; vector formats do not.
    pub fn is_raster(self) -> bool {
        matches!(
            self,
            ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp | ImageFormat::Tiff
        )
    }
}

/// A fully materialized graph. The bytes are read eagerly, so the value
/// stays valid after the backing file (always in a scratch directory) is
/// gone.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    /// Presentation hints only, independent of the save-time size.
    pub display_width: Dimension,
    pub display_height: Dimension,
}

/// Optional inline-display capability. The core never imports a notebook or
/// terminal environment; callers that have one implement this.
pub trait Displayer {
    fn display(&self, image: &RenderedImage) -> io::Result<()>;
}

/// Options for [`ggshow`] on top of the write options.
#[derive(Debug, Clone)]
pub struct ShowOptions {
    pub write: WriteOptions,
    pub format: ImageFormat,
    /// Display-size hint handed to the displayer; not the save size.
    pub disp_width: Dimension,
    pub disp_height: Dimension,
    /// When false the image is returned without being handed to a displayer.
    pub display: bool,
}

impl Default for ShowOptions {
    fn default() -> Self {
        Self {
            write: WriteOptions::default(),
            format: ImageFormat::Png,
            disp_width: Dimension::Num(300.0),
            disp_height: Dimension::Auto,
            display: true,
        }
    }
}

impl ShowOptions {
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    pub fn disp_size(mut self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.disp_width = width.into();
        self.disp_height = height.into();
        self
    }

    pub fn display(mut self, display: bool) -> Self {
        self.display = display;
        self
    }

    pub fn write(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }
}

/// Draw a ggplot2 graph and materialize it in memory.
///
/// Runs [`ggwrite`] against `__ggout.<ext>` in a private scratch directory,
/// then requires the artifact to exist: absence is always a hard
/// [`GgError::ArtifactNotFound`], never an empty result. On success the file
/// content is loaded eagerly and, if `display` is set and a displayer is
/// given, handed to it.
pub fn ggshow(
    plotcode: &str,
    opts: &ShowOptions,
    displayer: Option<&dyn Displayer>,
) -> Result<RenderedImage, GgError> {
    let tmpdir = TempDir::new()?;
    let outfile = tmpdir
        .path()
        .join(format!("__ggout.{}", opts.format.extension()));

    // The outcome is deliberately not inspected here; a failed run shows up
    // as a missing artifact just below.
    ggwrite(plotcode, &outfile, &opts.write)?;

    if !outfile.is_file() {
        return Err(GgError::ArtifactNotFound { path: outfile });
    }
    let data = fs::read(&outfile)?;

    let (display_width, display_height) = if opts.format.is_raster() {
        (opts.disp_width, opts.disp_height)
    } else {
        (Dimension::Auto, Dimension::Auto)
    };
    let image = RenderedImage {
        data,
        format: opts.format,
        display_width,
        display_height,
    };
    if opts.display {
        if let Some(d) = displayer {
            d.display(&image)?;
        }
    }
    Ok(image)
}
