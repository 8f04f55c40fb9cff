//! File-manipulation tasks: copying, renaming and in-place text replacement.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::glob_paths;
use crate::build::{BuildContext, TaskError};
use crate::command::Invocation;

/// Placeholder in `find_and_replace_in_dir` expanded to one `../` per
/// directory level between the file and the search root.
pub const BACK_TO_PARENT: &str = "%{back_to_parent}%";

/// `copy_files{from, to, ignore_patterns?}`
///
/// Both paths are rendered through the configuration. A `*` in `to` globs its
/// parent directory, so one source can land in every matching template.
/// Directories are copied recursively, skipping names that match any ignore
/// pattern.
pub fn copy_files(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  let from = ctx.config.render(call.require_str("from")?)?;
  let to = ctx.config.render(call.require_str("to")?)?;
  let ignore = compile_patterns(&call.kwarg_str_list("ignore_patterns")?)?;

  let from = ctx.resolve_path(&from);
  let targets = if to.contains('*') {
    let to = Path::new(&to);
    let name = to.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    let parent = to.parent().map(|p| p.to_string_lossy().into_owned()).unwrap_or_default();
    glob_paths(ctx, &parent)?.into_iter().map(|dir| dir.join(&name)).collect()
  } else {
    vec![ctx.resolve_path(&to)]
  };

  if targets.is_empty() {
    warn!(to = %to, "no destination matched");
  }
  for target in targets {
    debug!(from = %from.display(), to = %target.display(), "copying");
    if from.is_dir() {
      copy_tree(&from, &target, &ignore)?;
    } else {
      copy_file(&from, &target)?;
    }
  }
  Ok(())
}

/// `rename_files{from, to}`
pub fn rename_files(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  let from = ctx.resolve_path(ctx.config.render(call.require_str("from")?)?);
  let to = ctx.resolve_path(ctx.config.render(call.require_str("to")?)?);
  debug!(from = %from.display(), to = %to.display(), "renaming");
  if let Some(parent) = to.parent() {
    fs::create_dir_all(parent).map_err(|e| TaskError::path("create", parent, e))?;
  }
  fs::rename(&from, &to).map_err(|e| TaskError::path("rename", &from, e))
}

/// `find_and_replace(*globs){find, replace, template=true}`
pub fn find_and_replace(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  let patterns = call.str_args()?;
  let find = call.require_str("find")?;
  let mut replace = call.require_str("replace")?.to_string();
  if call.kwarg_bool("template", true)? {
    replace = ctx.config.render(&replace)?;
  }
  info!(patterns = patterns.len(), "find and replace");
  debug!(find = %find, replace = %summary(&replace), "replacing");

  for pattern in patterns {
    let pattern = ctx.config.render(pattern)?;
    let found = glob_paths(ctx, &pattern)?;
    if found.is_empty() {
      warn!(pattern = %pattern, "no files were found to match pattern");
    }
    for file in found {
      replace_in_file(&file, find, &replace)?;
    }
  }
  Ok(())
}

/// `find_and_replace_in_dir(root){find, replace, file_suffixes=["html"], template=false}`
///
/// `root` may be a glob. [`BACK_TO_PARENT`] in `find` or `replace` expands
/// per file to the relative path back up to the root.
pub fn find_and_replace_in_dir(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  let root = call.require_arg_str(0, "root_dir")?;
  let find = call.require_str("find")?;
  let mut replace = call.require_str("replace")?.to_string();
  if call.kwarg_bool("template", false)? {
    replace = ctx.config.render(&replace)?;
  }
  let mut suffixes = call.kwarg_str_list("file_suffixes")?;
  if call.kwarg("file_suffixes").is_none() {
    suffixes.push("html".to_string());
  }
  debug!(root = %root, find = %find, replace = %summary(&replace), suffixes = ?suffixes, "replacing in directory");

  let roots = glob_paths(ctx, root)?;
  if roots.is_empty() {
    warn!(pattern = %root, "no files were found to match pattern");
  }
  for found in roots {
    for entry in WalkDir::new(&found).min_depth(1).sort_by_file_name() {
      let entry = entry?;
      if !entry.file_type().is_file() || !has_suffix(entry.path(), &suffixes) {
        continue;
      }
      let back = "../".repeat(entry.depth());
      let find = find.replace(BACK_TO_PARENT, &back);
      let replace = replace.replace(BACK_TO_PARENT, &back);
      replace_in_file(entry.path(), &find, &replace)?;
    }
  }
  Ok(())
}

fn has_suffix(path: &Path, suffixes: &[String]) -> bool {
  path
    .file_name()
    .and_then(|n| n.to_str())
    .and_then(|n| n.rsplit_once('.'))
    .is_some_and(|(_, ext)| suffixes.iter().any(|s| s == ext))
}

fn summary(text: &str) -> String {
  match text.char_indices().nth(60) {
    Some((idx, _)) => format!("{}...", &text[..idx]),
    None => text.to_string(),
  }
}

/// Replace every occurrence of `find` in `path`, writing through a temp file
/// in the same directory so the swap is atomic.
pub(crate) fn replace_in_file(path: &Path, find: &str, replace: &str) -> Result<(), TaskError> {
  debug!(file = %path.display(), "replacing");
  let contents = fs::read_to_string(path).map_err(|e| TaskError::path("read", path, e))?;
  write_atomic(path, &contents.replace(find, replace))
}

pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), TaskError> {
  let dir = path.parent().unwrap_or(Path::new("."));
  let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| TaskError::path("create temp file in", dir, e))?;
  tmp.write_all(contents.as_bytes())?;
  tmp.persist(path).map_err(|e| TaskError::path("write", path, e.error))?;
  Ok(())
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, TaskError> {
  patterns.iter().map(|p| Pattern::new(p).map_err(TaskError::from)).collect()
}

fn ignored(name: &str, ignore: &[Pattern]) -> bool {
  ignore.iter().any(|p| p.matches(name))
}

fn copy_file(from: &Path, to: &Path) -> Result<(), TaskError> {
  let target: PathBuf = if to.is_dir() {
    match from.file_name() {
      Some(name) => to.join(name),
      None => to.to_path_buf(),
    }
  } else {
    to.to_path_buf()
  };
  if let Some(parent) = target.parent() {
    fs::create_dir_all(parent).map_err(|e| TaskError::path("create", parent, e))?;
  }
  fs::copy(from, &target).map_err(|e| TaskError::path("copy", from, e))?;
  Ok(())
}

/// Copy `from` into `to`, merging with anything already there.
pub(crate) fn copy_tree(from: &Path, to: &Path, ignore: &[Pattern]) -> Result<(), TaskError> {
  let walker = WalkDir::new(from).sort_by_file_name().into_iter().filter_entry(|e| {
    e.depth() == 0 || !e.file_name().to_str().is_some_and(|name| ignored(name, ignore))
  });
  for entry in walker {
    let entry = entry?;
    let Ok(rel) = entry.path().strip_prefix(from) else {
      continue;
    };
    let target = to.join(rel);
    if entry.file_type().is_dir() {
      fs::create_dir_all(&target).map_err(|e| TaskError::path("create", &target, e))?;
    } else {
      fs::copy(entry.path(), &target).map_err(|e| TaskError::path("copy", entry.path(), e))?;
    }
  }
  Ok(())
}
