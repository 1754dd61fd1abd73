use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Character that marks an entry for wildcard expansion.
pub const WILDCARD: char = '*';

/// Returns true if the entry must be expanded rather than used as a literal path.
pub fn is_wildcard(entry: &str) -> bool {
    entry.contains(WILDCARD)
}

/// Resolves a file or directory entry against the directive's `src_dir`.
///
/// With no `src_dir` the entry is returned as given, so relative entries resolve
/// against the process working directory. Otherwise the entry always lands under
/// `src_dir`, even when it starts with a path separator.
pub fn source_path(src_dir: Option<&str>, entry: &str) -> PathBuf {
    match src_dir {
        Some(dir) => Path::new(dir).join(trim_separators(entry)),
        None => PathBuf::from(entry),
    }
}

/// Builds the glob pattern for a wildcard entry.
///
/// `src_dir` is escaped so that only the entry itself can carry pattern syntax.
/// A run of wildcards matches like a single one and never crosses a directory.
pub fn source_pattern(src_dir: Option<&str>, entry: &str) -> String {
    let entry = collapse_wildcards(entry);
    match src_dir {
        Some(dir) => {
            let dir = dir.trim_end_matches(is_separator);
            format!(
                "{}{MAIN_SEPARATOR}{}",
                glob::Pattern::escape(dir),
                trim_separators(&entry)
            )
        }
        None => entry,
    }
}

fn collapse_wildcards(entry: &str) -> String {
    let mut collapsed = String::with_capacity(entry.len());
    for c in entry.chars() {
        if c != WILDCARD || !collapsed.ends_with(WILDCARD) {
            collapsed.push(c);
        }
    }
    collapsed
}

/// Resolves the destination directory of a directive: the base directory, or
/// `dst_dir` underneath it.
pub fn destination_dir(base_dir: &Path, dst_dir: Option<&str>) -> PathBuf {
    match dst_dir {
        Some(dir) => base_dir.join(trim_separators(dir)),
        None => base_dir.to_path_buf(),
    }
}

fn trim_separators(s: &str) -> &str {
    s.trim_start_matches(is_separator)
}

fn is_separator(c: char) -> bool {
    c == '/' || c == MAIN_SEPARATOR
}
