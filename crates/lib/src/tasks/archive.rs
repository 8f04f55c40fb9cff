//! Zip archives of platform trees (`.zip`, `.apk`, `.ipa` are all zips).

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::build::{BuildContext, TaskError};
use crate::consts::RELEASE_DIR;
use crate::platform::Platform;

/// Zip the contents of `src` into `dest`. Entry names are relative to `src`
/// and always use `/`. Files named in `skip` at any depth are left out.
pub fn zip_dir(src: &Path, dest: &Path, skip: &[&str]) -> Result<usize, TaskError> {
  fs::read_dir(src).map_err(|e| TaskError::path("read", src, e))?;
  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent).map_err(|e| TaskError::path("create", parent, e))?;
  }
  let file = File::create(dest).map_err(|e| TaskError::path("create", dest, e))?;
  let mut writer = zip::ZipWriter::new(BufWriter::new(file));
  let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

  let mut count = 0;
  for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
    let entry = entry?;
    if entry.path() == dest {
      continue;
    }
    let Ok(rel) = entry.path().strip_prefix(src) else {
      continue;
    };
    let name = rel
      .components()
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/");

    if entry.file_type().is_dir() {
      writer.add_directory(name, options)?;
    } else if entry.file_type().is_file() {
      if entry.file_name().to_str().is_some_and(|n| skip.contains(&n)) {
        continue;
      }
      debug!(entry = %name, "zipping");
      writer.start_file(name, options)?;
      let mut input = File::open(entry.path()).map_err(|e| TaskError::path("read", entry.path(), e))?;
      io::copy(&mut input, &mut writer)?;
      count += 1;
    }
  }
  writer.finish()?;
  Ok(count)
}

/// `release/<platform>/<slug>-<unix time>.<ext>` under the working directory.
pub fn release_path(ctx: &BuildContext<'_>, platform: Platform, ext: &str) -> Result<PathBuf, TaskError> {
  let secs = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
  let name = format!("{}-{}.{}", ctx.config.slug()?, secs, ext);
  Ok(ctx.working_dir.join(RELEASE_DIR).join(platform.as_str()).join(name))
}
