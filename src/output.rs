use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::config::ConverterSettings;
use crate::convert::{ConversionReport, Converter};
use crate::Result;

/// Removes a file when dropped unless `remove` already did.
struct RemoveOnDrop {
    path: PathBuf,
    armed: bool,
}

impl RemoveOnDrop {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// Remove the file now, surfacing the error.
    fn remove(mut self) -> std::io::Result<()> {
        self.armed = false;
        std::fs::remove_file(&self.path)
    }
}

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// A fresh `<temp dir>/<uuid>.txt` path.
pub fn temporary_path() -> PathBuf {
    std::env::temp_dir().join(format!("{}.txt", Uuid::new_v4().simple()))
}

/// True when the output would overwrite the input.
fn is_same_file(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Convert `input` into `output`, or in place when `output` is `None` or names the input.
///
/// Nothing is left behind on failure: an explicit output is written to a temp
/// file beside it and only renamed over the target on success, and in-place
/// runs leave the input untouched.
pub fn convert_file(
    input: &Path,
    output: Option<&Path>,
    settings: &ConverterSettings,
) -> Result<ConversionReport> {
    let converter = Converter::from_settings(settings);
    let reader = BufReader::new(File::open(input)?);

    match output {
        Some(output) if !is_same_file(input, output) => {
            let dir = match output.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let staged = NamedTempFile::new_in(dir)?;
            let report = write_declaration(&converter, reader, staged.as_file())?;
            staged.persist(output).map_err(|e| e.error)?;
            tracing::debug!("Wrote {}", output.display());
            Ok(report)
        }
        _ => {
            let temp = temporary_path();
            let file = File::create(&temp)?;
            let guard = RemoveOnDrop::new(temp.clone());
            let report = write_declaration(&converter, reader, &file)?;
            drop(file);
            std::fs::copy(&temp, input)?;
            guard.remove()?;
            tracing::debug!("Replaced {} via {}", input.display(), temp.display());
            Ok(report)
        }
    }
}

fn write_declaration<R: std::io::BufRead>(
    converter: &Converter<crate::symbols::SchemeDemangler>,
    reader: R,
    file: &File,
) -> Result<ConversionReport> {
    let mut out = BufWriter::new(file);
    let report = converter.convert(reader, &mut out)?;
    out.flush()?;
    Ok(report)
}
