//! On-disk snapshot of a pass's aggregate.
//!
//! Written as pretty-printed JSON, or gzip-compressed JSON when the target
//! path ends in `.gz`. Writes land in a temp file that is renamed into place,
//! so an interrupted write never leaves a truncated snapshot behind.

use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::info;

use crate::error::Result;
use crate::models::CollectionCards;

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("gz")
}

/// Write `collections` to `path`.
pub fn write(path: &Path, collections: &[CollectionCards]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or("")
    ));

    let result = (|| -> Result<()> {
        let file = fs::File::create(&tmp_path)?;
        if is_gzip(path) {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            serde_json::to_writer_pretty(&mut encoder, collections)?;
            encoder.finish()?.flush()?;
        } else {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, collections)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    } else {
        info!(path = %path.display(), collections = collections.len(), "snapshot written");
    }
    result
}

/// Load a snapshot previously written by [`write`].
pub fn read(path: &Path) -> Result<Vec<CollectionCards>> {
    let file = fs::File::open(path)?;
    let mut contents = String::new();
    if is_gzip(path) {
        BufReader::new(GzDecoder::new(BufReader::new(file))).read_to_string(&mut contents)?;
    } else {
        BufReader::new(file).read_to_string(&mut contents)?;
    }
    Ok(serde_json::from_str(&contents)?)
}
