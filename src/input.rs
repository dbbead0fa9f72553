// src/input.rs
use anyhow::{bail, Context, Result};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::info;
use zip::ZipArchive;

use crate::record::RECORD_LEN;

/// True when `path` looks like a ZIP archive rather than a raw delstat file.
pub fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

/// Opens `path` and hands `f` a reader over the delstat bytes.
///
/// Plain files are read through a buffer. ZIP archives are streamed from
/// their first file entry without unpacking to disk or memory.
pub fn with_input<T, F>(path: &Path, f: F) -> Result<T>
where
    F: FnOnce(&mut dyn Read) -> Result<T>,
{
    let file =
        File::open(path).with_context(|| format!("Failed to open input: {}", path.display()))?;

    if !is_zip(path) {
        let mut reader = BufReader::with_capacity(RECORD_LEN * 256, file);
        return f(&mut reader);
    }

    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {}", path.display()))?;
    let mut first_file = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i).with_context(|| {
            format!("Failed to access ZIP entry #{} in {}", i, path.display())
        })?;
        if entry.is_file() {
            first_file = Some(i);
            break;
        }
    }
    let Some(index) = first_file else {
        bail!("ZIP archive {} contains no files", path.display());
    };

    let mut entry = archive
        .by_index(index)
        .with_context(|| format!("Failed to open ZIP entry #{} in {}", index, path.display()))?;
    info!(entry = entry.name(), size = entry.size(), "reading delstat from archive");
    f(&mut entry)
}
