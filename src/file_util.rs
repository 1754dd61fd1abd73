//! Copy primitives used by the executor.
//!
//! Sources are always dereferenced: a symbolic link is copied as the content
//! it points to, at the top level and at every level of a copied tree.

use std::fs;
use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use glob::MatchOptions;
use tracing::warn;
use walkdir::WalkDir;

use crate::error::ExecutionError;

/// Whether a directive entry names a single file or a directory tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    /// Returns true if `path` exists with this kind, following symbolic links.
    pub fn present(self, path: &Path) -> bool {
        match self {
            EntryKind::File => path.is_file(),
            EntryKind::Dir => path.is_dir(),
        }
    }
}

/// Expands a wildcard pattern into the matching paths, in sorted order.
///
/// Hidden names are only matched by a pattern that spells out the leading dot.
///
/// # Errors
/// Fails if the pattern is malformed, a directory cannot be read during the
/// expansion, or nothing matches.
pub fn expand(entry: &str, pattern: &str) -> Result<Vec<PathBuf>, ExecutionError> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let paths = glob::glob_with(pattern, options).map_err(|e| ExecutionError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut matches = vec![];
    for path in paths {
        let path = path.map_err(|e| ExecutionError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        matches.push(path);
    }
    if matches.is_empty() {
        return Err(ExecutionError::NoMatch {
            entry: entry.to_string(),
            pattern: pattern.to_string(),
        });
    }
    matches.sort();
    Ok(matches)
}

/// Checks that `path` can be copied as an entry of the given kind, without copying it.
///
/// # Errors
/// Returns an error if the path is missing, or is a directory listed as a file.
pub fn check_path(path: &Path, kind: EntryKind) -> io::Result<()> {
    let meta = fs::metadata(path)?;
    if kind == EntryKind::File && meta.is_dir() {
        return Err(omitting_directory(path));
    }
    Ok(())
}

/// Copies a file into `dst_dir`, keeping its file name and following symbolic links.
///
/// An existing file of the same name is overwritten.
///
/// # Errors
/// Returns an error if the source is missing or is a directory, or if source and
/// target are the same file.
pub fn copy_file(src: &Path, dst_dir: &Path) -> io::Result<PathBuf> {
    check_path(src, EntryKind::File)?;
    let file_name = src
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{src:?} has no file name")))?;
    let target = dst_dir.join(file_name);
    ensure_distinct(src, &target)?;
    fs::copy(src, &target)?;
    Ok(target)
}

/// Recursively copies `src` into `dst_dir`, following symbolic links at every level.
///
/// A directory lands at `dst_dir/<name>` and merges into an existing directory
/// of that name; a path ending in `.` merges its contents straight into
/// `dst_dir`. A regular file is copied like [`copy_file`]. Directories created
/// here take the permissions of their source. Returns the number of files
/// written.
///
/// # Errors
/// Returns an error if the source is missing, a symbolic link is broken or
/// loops, the destination lies inside the source, or any single copy fails.
pub fn copy_tree(src: &Path, dst_dir: &Path) -> io::Result<u64> {
    let meta = fs::metadata(src)?;
    if !meta.is_dir() {
        copy_file(src, dst_dir)?;
        return Ok(1);
    }

    let root = match src.file_name() {
        Some(_) if ends_with_cur_dir(src) => dst_dir.to_path_buf(),
        Some(name) => dst_dir.join(name),
        None => dst_dir.to_path_buf(),
    };
    ensure_outside(src, dst_dir, &root)?;

    let mut files = 0;
    let mut created = vec![];
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src).map_err(io::Error::other)?;
        let target = root.join(rel);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            if !target.is_dir() {
                fs::create_dir_all(&target)?;
                created.push((target, entry.metadata()?.permissions()));
            }
        } else if file_type.is_file() {
            fs::copy(entry.path(), &target)?;
            files += 1;
        } else {
            warn!("skip special file {}", entry.path().display());
        }
    }

    // Deepest first, once every child is written, so read-only sources still copy.
    for (dir, permissions) in created.into_iter().rev() {
        fs::set_permissions(&dir, permissions)?;
    }
    Ok(files)
}

/// True if the last component of `path`, as written, is `.`.
///
/// `Path::file_name` skips such a component, so `a/.` would otherwise be
/// treated like `a`.
fn ends_with_cur_dir(path: &Path) -> bool {
    let raw = path.to_string_lossy();
    raw.trim_end_matches(['/', MAIN_SEPARATOR])
        .rsplit(['/', MAIN_SEPARATOR])
        .next()
        == Some(".")
}

fn omitting_directory(path: &Path) -> io::Error {
    io::Error::other(format!("{path:?} is a directory (not copied)"))
}

fn ensure_distinct(src: &Path, target: &Path) -> io::Result<()> {
    if target.exists() && fs::canonicalize(src)? == fs::canonicalize(target)? {
        return Err(io::Error::other(format!(
            "{src:?} and {target:?} are the same file"
        )));
    }
    Ok(())
}

/// Refuses to copy a directory into itself or one of its descendants.
fn ensure_outside(src: &Path, dst_dir: &Path, root: &Path) -> io::Result<()> {
    let src = fs::canonicalize(src)?;
    let inside = match fs::canonicalize(dst_dir) {
        Ok(dst) => dst.starts_with(&src),
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => return Err(e),
    };
    let onto_itself = root.exists() && fs::canonicalize(root)? == src;
    if inside || onto_itself {
        return Err(io::Error::other(format!(
            "cannot copy a directory, {src:?}, into itself, {root:?}"
        )));
    }
    Ok(())
}
