//! Archive extraction and record decoding
//!
//! Unpacking is all-or-nothing. On success the output directory holds every
//! decoded record and the archive is deleted. On failure the archive stays
//! where it is and the output directory is emptied. The staging directory is
//! emptied either way.

use crate::core::walk;
use crate::core::workspace::Workspace;
use crate::domain::{DecodedDocumentSet, UnpackError};
use flate2::read::GzDecoder;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Suffix of compressed records inside the day folder
pub const RECORD_SUFFIX: &str = ".gz";

/// Unpack `archive_path` into the workspace's output directory
///
/// Runs on the blocking thread pool.
///
/// # Errors
///
/// Returns an [`UnpackError`] describing the first problem found. See
/// [`unpack_blocking`].
pub async fn unpack(
    archive_path: &Path,
    workspace: &Workspace,
) -> Result<DecodedDocumentSet, UnpackError> {
    let archive = archive_path.to_path_buf();
    let staging = workspace.staging_dir();
    let output = workspace.output_dir();

    tokio::task::spawn_blocking(move || unpack_blocking(&archive, &staging, &output))
        .await
        .map_err(|e| UnpackError::TaskFailed(e.to_string()))?
}

/// Synchronous unpack with explicit directories
///
/// # Errors
///
/// - [`UnpackError::ArchiveUnreadable`] if the archive cannot be opened
/// - [`UnpackError::CorruptArchive`] if it is not a valid zip
/// - [`UnpackError::NoDayFolder`] / [`UnpackError::AmbiguousDayFolder`] if
///   the archive root does not hold exactly one digit-named folder
/// - [`UnpackError::DuplicateRecord`] if two records decode to the same name
/// - [`UnpackError::Decompression`] if a record is not valid gzip
pub fn unpack_blocking(
    archive: &Path,
    staging: &Path,
    output: &Path,
) -> Result<DecodedDocumentSet, UnpackError> {
    let result = extract_and_decode(archive, staging, output);
    reset_dir(staging);

    match result {
        Ok(count) => {
            match fs::remove_file(archive) {
                Ok(()) => tracing::debug!(archive = %archive.display(), "Archive deleted"),
                Err(e) => tracing::warn!(
                    archive = %archive.display(),
                    error = %e,
                    "Failed to delete archive after unpack"
                ),
            }
            tracing::info!(count, output = %output.display(), "Archive unpacked");
            Ok(DecodedDocumentSet::new(output, count))
        }
        Err(e) => {
            reset_dir(output);
            tracing::error!(
                archive = %archive.display(),
                error = %e,
                "Unpack failed, archive kept and output discarded"
            );
            Err(e)
        }
    }
}

fn extract_and_decode(archive: &Path, staging: &Path, output: &Path) -> Result<usize, UnpackError> {
    let file = File::open(archive).map_err(|e| UnpackError::ArchiveUnreadable {
        path: archive.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut zip = ZipArchive::new(BufReader::new(file))
        .map_err(|e| UnpackError::CorruptArchive(e.to_string()))?;

    fs::create_dir_all(staging)?;
    zip.extract(staging)
        .map_err(|e| UnpackError::CorruptArchive(e.to_string()))?;
    tracing::debug!(entries = zip.len(), staging = %staging.display(), "Archive extracted");

    let day_folder = locate_day_folder(staging)?;
    tracing::debug!(day_folder = %day_folder.display(), "Day folder located");

    fs::create_dir_all(output)?;
    let records = walk::files_with_suffix(&day_folder, RECORD_SUFFIX)?;
    let mut names = HashSet::with_capacity(records.len());

    for record in &records {
        let file_name = walk::file_name_lossy(record);
        let name = file_name
            .strip_suffix(RECORD_SUFFIX)
            .unwrap_or(&file_name)
            .to_string();

        if name.is_empty() {
            return Err(UnpackError::Decompression {
                file: record.clone(),
                message: "record name is empty once the suffix is removed".to_string(),
            });
        }
        if !names.insert(name.clone()) {
            return Err(UnpackError::DuplicateRecord(name));
        }

        decode_record(record, &output.join(&name))?;
    }

    Ok(records.len())
}

/// The single digit-named directory directly under `root`
///
/// Only directories count; a file named `12345` is ignored.
///
/// # Errors
///
/// [`UnpackError::NoDayFolder`] when none exists,
/// [`UnpackError::AmbiguousDayFolder`] (candidates sorted) when several do.
pub fn locate_day_folder(root: &Path) -> Result<PathBuf, UnpackError> {
    let mut candidates = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            candidates.push(name);
        }
    }

    candidates.sort();
    match candidates.len() {
        0 => Err(UnpackError::NoDayFolder(root.to_path_buf())),
        1 => Ok(root.join(&candidates[0])),
        _ => Err(UnpackError::AmbiguousDayFolder(candidates)),
    }
}

fn decode_record(source: &Path, target: &Path) -> Result<(), UnpackError> {
    let decompression = |e: io::Error| UnpackError::Decompression {
        file: source.to_path_buf(),
        message: e.to_string(),
    };

    let input = File::open(source)?;
    let mut decoder = GzDecoder::new(BufReader::new(input));
    let mut writer = BufWriter::new(File::create(target)?);

    io::copy(&mut decoder, &mut writer).map_err(decompression)?;
    writer.flush()?;
    Ok(())
}

fn reset_dir(dir: &Path) {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Failed to clear directory");
            return;
        }
    }
    if let Err(e) = fs::create_dir_all(dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "Failed to recreate directory");
    }
}
