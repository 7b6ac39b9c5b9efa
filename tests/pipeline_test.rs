//! End-to-end pipeline tests against a stub interpreter.
//!
//! The stub is a small shell script standing in for Rscript: it receives the
//! generated script file as its only argument, checks that every
//! `read.csv(...)` interchange file really exists, and writes a fake
//! artifact to the `ggsave(...)` target. This exercises table export, script
//! composition, invocation and materialization without needing R installed.
#![cfg(unix)]

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use tempfile::TempDir;

use ggshow::{
    ggshow, ggwrite, Cell, Dimension, Displayer, GgError, ImageFormat, RenderedImage,
    ShowOptions, Table, WriteOptions, WriteOutcome,
};

// Extracts the ggsave target and the read.csv sources from the script file,
// verifies every source exists, and writes "stub:<n>" to the target where
// <n> is the number of interchange files seen.
const OK_STUB: &str = r#"#!/bin/sh
script="$1"
out=$(sed -n 's/.*ggsave("\([^"]*\)".*/\1/p' "$script" | head -n 1)
n=0
for f in $(sed -n 's/.*read\.csv("\([^"]*\)".*/\1/p' "$script"); do
  [ -f "$f" ] || exit 3
  n=$((n+1))
done
printf 'stub:%s' "$n" > "$out"
echo "stub stdout"
echo "stub stderr" >&2
"#;

const FAIL_STUB: &str = r#"#!/bin/sh
echo "Error: could not find function \"qplot\"" >&2
exit 1
"#;

fn stub_interpreter(body: &str) -> Result<(TempDir, String)> {
    let dir = TempDir::new()?;
    let path = dir.path().join("fake-rscript");
    fs::write(&path, body)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    let command = path.to_string_lossy().into_owned();
    Ok((dir, command))
}

fn sample_table(rows: usize) -> Table {
    let mut t = Table::new(["x", "y"]);
    for i in 0..rows {
        t.push_row(vec![Cell::Int(i as i64), Cell::Float(i as f64 * 0.5)])
            .unwrap();
    }
    t
}

#[test]
fn write_with_explicit_path_produces_the_artifact() -> Result<()> {
    let (_stub_dir, stub) = stub_interpreter(OK_STUB)?;
    let out_dir = TempDir::new()?;
    let outfile = out_dir.path().join("out.png");

    let opts = WriteOptions::default().size(3.0, 2.0).rscript(&stub);
    let outcome = ggwrite("qplot(seq_along(y), y)", &outfile, &opts)?;

    assert!(outcome.is_written());
    assert!(outfile.is_file());
    assert!(fs::metadata(&outfile)?.len() > 0);
    Ok(())
}

#[test]
fn every_named_table_is_exported_before_the_script_runs() -> Result<()> {
    let (_stub_dir, stub) = stub_interpreter(OK_STUB)?;
    let out_dir = TempDir::new()?;
    let outfile = out_dir.path().join("out.png");

    let opts = WriteOptions::default()
        .rscript(&stub)
        .table("a", sample_table(3))
        .table("b", sample_table(5));
    let outcome = ggwrite("ggplot(a, aes(x, y)) + geom_point(data=b)", &outfile, &opts)?;

    // The stub exits non-zero if any read.csv source is missing, and records
    // how many interchange files it saw.
    assert!(outcome.is_written());
    assert_eq!(fs::read_to_string(&outfile)?, "stub:2");
    Ok(())
}

#[test]
fn interpreter_failure_is_a_warning_carrying_the_script_verbatim() -> Result<()> {
    let (_stub_dir, stub) = stub_interpreter(FAIL_STUB)?;
    let out_dir = TempDir::new()?;
    let outfile = out_dir.path().join("out.png");

    let plotcode = "qplot(seq_along(y), y)";
    let opts = WriteOptions::default().rscript(&stub);
    let outcome = ggwrite(plotcode, &outfile, &opts)?;

    match outcome {
        WriteOutcome::InterpreterFailed(failure) => {
            assert_eq!(failure.status, 1);
            assert!(failure.stderr.contains("could not find function"));
            assert!(failure.script.contains(plotcode));
            let msg = failure.to_string();
            assert!(msg.contains("R code (auto-generated)"));
            assert!(msg.contains(plotcode));
        }
        other => panic!("expected InterpreterFailed, got {other:?}"),
    }
    assert!(!outfile.exists());
    Ok(())
}

#[test]
fn ggshow_fails_hard_when_the_artifact_is_missing() -> Result<()> {
    let (_stub_dir, stub) = stub_interpreter(FAIL_STUB)?;
    let opts = ShowOptions::default().write(WriteOptions::default().rscript(&stub));

    let err = ggshow("qplot(1:3, 1:3)", &opts, None).unwrap_err();
    assert!(matches!(err, GgError::ArtifactNotFound { .. }));
    Ok(())
}

#[test]
fn ggshow_materializes_the_result_eagerly() -> Result<()> {
    let (_stub_dir, stub) = stub_interpreter(OK_STUB)?;
    let opts = ShowOptions::default()
        .display(false)
        .write(WriteOptions::default().rscript(&stub));

    let image = ggshow("qplot(1:3, 1:3)", &opts, None)?;

    // The scratch directory holding __ggout.png is already gone; the value
    // must stand on its own.
    assert_eq!(image.data, b"stub:0");
    assert_eq!(image.format, ImageFormat::Png);
    assert_eq!(image.display_width, Dimension::Num(300.0));
    assert_eq!(image.display_height, Dimension::Auto);
    Ok(())
}

#[test]
fn vector_formats_carry_no_display_hints() -> Result<()> {
    let (_stub_dir, stub) = stub_interpreter(OK_STUB)?;
    let opts = ShowOptions::default()
        .format(ImageFormat::from_name("svg")?)
        .display(false)
        .write(WriteOptions::default().rscript(&stub));

    let image = ggshow("qplot(1:3, 1:3)", &opts, None)?;
    assert_eq!(image.format, ImageFormat::Svg);
    assert_eq!(image.display_width, Dimension::Auto);
    assert_eq!(image.display_height, Dimension::Auto);
    Ok(())
}

struct CountingDisplayer(AtomicUsize);

impl Displayer for CountingDisplayer {
    fn display(&self, _image: &RenderedImage) -> io::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn displayer_is_invoked_only_when_display_is_set() -> Result<()> {
    let (_stub_dir, stub) = stub_interpreter(OK_STUB)?;
    let displayer = CountingDisplayer(AtomicUsize::new(0));

    let silent = ShowOptions::default()
        .display(false)
        .write(WriteOptions::default().rscript(&stub));
    ggshow("qplot(1:3, 1:3)", &silent, Some(&displayer))?;
    assert_eq!(displayer.0.load(Ordering::SeqCst), 0);

    let shown = ShowOptions::default().write(WriteOptions::default().rscript(&stub));
    ggshow("qplot(1:3, 1:3)", &shown, Some(&displayer))?;
    assert_eq!(displayer.0.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn table_names_referenced_by_the_plot_must_be_exported_as_given() -> Result<()> {
    let (_stub_dir, stub) = stub_interpreter(OK_STUB)?;
    let out_dir = TempDir::new()?;
    let outfile = out_dir.path().join("out.png");

    // A name R cannot bind is refused before any subprocess work.
    let opts = WriteOptions::default()
        .rscript(&stub)
        .table("not a name", sample_table(1));
    let err = ggwrite("qplot(1, 1)", &outfile, &opts).unwrap_err();
    assert!(matches!(err, GgError::BadTableName(_)));
    assert!(!outfile.exists());
    Ok(())
}

#[test]
fn missing_interpreter_warns_and_leaves_no_artifact() -> Result<()> {
    let out_dir = TempDir::new()?;
    let outfile = out_dir.path().join("out.png");

    let opts = WriteOptions::default().rscript("no-such-rscript-command");
    let outcome = ggwrite("qplot(1, 1)", &outfile, &opts)?;
    match outcome {
        WriteOutcome::InterpreterFailed(failure) => {
            assert!(failure.stderr.contains("not a valid Rscript command"));
        }
        other => panic!("expected InterpreterFailed, got {other:?}"),
    }
    assert!(!outfile.exists());

    // One layer up the same condition is fatal.
    let show = ShowOptions::default()
        .write(WriteOptions::default().rscript("no-such-rscript-command"));
    let err = ggshow("qplot(1, 1)", &show, None).unwrap_err();
    assert!(matches!(err, GgError::ArtifactNotFound { .. }));
    Ok(())
}
