//! Draw ggplot2 graphs from Rust by shelling out to Rscript.
//!
//! Each call exports the caller's named tables to CSV interchange files,
//! composes a transient R script, runs it under Rscript and either leaves
//! the graph at the requested path ([`ggwrite`]) or loads it back into
//! memory ([`ggshow`]). There is no plotting engine here and no validation
//! of the user's R code; the interpreter's verdict is the only one.
//!
//! ```no_run
//! use ggshow::{ggwrite, Cell, Table, WriteOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut df = Table::new(["x", "y"]);
//! df.push_row(vec![Cell::Int(1), Cell::Float(1.0)])?;
//! df.push_row(vec![Cell::Int(2), Cell::Float(4.0)])?;
//!
//! let opts = WriteOptions::default()
//!     .size(3.0, 2.0)
//!     .table("df", df);
//! ggwrite("ggplot(df, aes(x, y)) + geom_line()", "out.png", &opts)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod diag;
mod error;
mod exec;
mod render;
mod script;
mod table;

pub use error::GgError;
pub use render::{
    ggshow, ggwrite, Displayer, ImageFormat, ProcessFailure, RenderedImage, ShowOptions,
    WriteOptions, WriteOutcome,
};
pub use script::{Dimension, SaveSize};
pub use table::{Cell, Table};
