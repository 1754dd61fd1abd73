//! Executes validated backup directives against the filesystem.
//!
//! Directives run strictly in declaration order: within a directive the files
//! are copied before the directories, each list in its declared order. The
//! first failure aborts the run; whatever was already copied stays in place.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::directive::BackupDirective;
use crate::error::ExecutionError;
use crate::file_util::{self, EntryKind};
use crate::path_util::{destination_dir, is_wildcard, source_path, source_pattern};

/// One invocation: the base destination directory plus the directives to run.
#[derive(Debug, Clone)]
pub struct BackupRun {
    base_dir: PathBuf,
    directives: Vec<BackupDirective>,
    dry_run: bool,
}

/// Counters collected over a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Enabled directives that were processed.
    pub directives_run: usize,
    /// Directives skipped because `enabled` is false.
    pub directives_skipped: usize,
    /// Files copied by `files` entries.
    pub files_copied: usize,
    /// Sources copied by `dirs` entries.
    pub dirs_copied: usize,
    /// Entries skipped because their source does not exist.
    pub entries_skipped: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} directives run, {} skipped, {} files and {} dirs copied, \
             {} missing entries skipped",
            self.directives_run,
            self.directives_skipped,
            self.files_copied,
            self.dirs_copied,
            self.entries_skipped
        )
    }
}

impl BackupRun {
    pub fn new(base_dir: impl Into<PathBuf>, directives: Vec<BackupDirective>) -> Self {
        Self {
            base_dir: base_dir.into(),
            directives,
            dry_run: false,
        }
    }

    /// In a dry run every read-only step is performed and logged, but no
    /// directory is created and nothing is copied.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn directives(&self) -> &[BackupDirective] {
        &self.directives
    }

    /// Runs every directive in order.
    ///
    /// # Errors
    /// Returns the first [`ExecutionError`]; later directives are not processed.
    pub fn execute(&self) -> Result<Summary, ExecutionError> {
        let mut summary = Summary::default();
        for directive in &self.directives {
            self.run_directive(directive, &mut summary)?;
        }
        Ok(summary)
    }

    fn run_directive(
        &self,
        directive: &BackupDirective,
        summary: &mut Summary,
    ) -> Result<(), ExecutionError> {
        if !directive.enabled {
            info!("skip backup {}", directive.label());
            summary.directives_skipped += 1;
            return Ok(());
        }

        let dst = destination_dir(&self.base_dir, directive.dst_dir());
        info!("backup {} to {}", directive.label(), dst.display());
        if !self.dry_run {
            fs::create_dir_all(&dst).map_err(|source| ExecutionError::CreateDir {
                path: dst.clone(),
                source,
            })?;
        }

        for file in &directive.files {
            info!("backup file: {file}");
            let copied = self.copy_entry(directive, file, EntryKind::File, &dst, summary)?;
            summary.files_copied += copied;
        }
        for dir in &directive.dirs {
            info!("backup dir: {dir}");
            let copied = self.copy_entry(directive, dir, EntryKind::Dir, &dst, summary)?;
            summary.dirs_copied += copied;
        }
        summary.directives_run += 1;
        Ok(())
    }

    /// Copies one entry and returns the number of sources copied for it.
    fn copy_entry(
        &self,
        directive: &BackupDirective,
        entry: &str,
        kind: EntryKind,
        dst: &Path,
        summary: &mut Summary,
    ) -> Result<usize, ExecutionError> {
        let sources = if is_wildcard(entry) {
            let pattern = source_pattern(directive.src_dir(), entry);
            file_util::expand(entry, &pattern)?
        } else {
            let src = source_path(directive.src_dir(), entry);
            if directive.skip_non_exist && !kind.present(&src) {
                debug!("skip non-existent {}", src.display());
                summary.entries_skipped += 1;
                return Ok(0);
            }
            vec![src]
        };

        for src in &sources {
            let result = if self.dry_run {
                info!("would copy {} to {}", src.display(), dst.display());
                file_util::check_path(src, kind)
            } else {
                match kind {
                    EntryKind::File => file_util::copy_file(src, dst).map(|_| ()),
                    EntryKind::Dir => file_util::copy_tree(src, dst).map(|files| {
                        debug!("copied {files} files from {}", src.display());
                    }),
                }
            };
            result.map_err(|e| copy_error(kind, entry, src, e.to_string()))?;
        }
        Ok(sources.len())
    }
}

/// Runs `directives` against `base_dir`. See [`BackupRun::execute`].
pub fn execute(
    base_dir: &Path,
    directives: &[BackupDirective],
) -> Result<Summary, ExecutionError> {
    BackupRun::new(base_dir, directives.to_vec()).execute()
}

fn copy_error(kind: EntryKind, entry: &str, path: &Path, message: String) -> ExecutionError {
    let entry = entry.to_string();
    let path = path.to_path_buf();
    match kind {
        EntryKind::File => ExecutionError::CopyFile {
            entry,
            path,
            message,
        },
        EntryKind::Dir => ExecutionError::CopyDir {
            entry,
            path,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::{self, Write};
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let file_path = dir.join(name);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(&file_path).unwrap();
        file.write_all(content).unwrap();
        file_path
    }

    fn src_dir(temp: &TempDir) -> Option<String> {
        Some(temp.path().join("src").to_string_lossy().into_owned())
    }

    #[test]
    fn test_copies_files_into_dst_dir() -> io::Result<()> {
        let temp = TempDir::new()?;
        create_test_file(&temp.path().join("src"), "x.txt", b"x");
        let base = temp.path().join("out");

        let directive = BackupDirective {
            src_dir: src_dir(&temp),
            dst_dir: Some("b".to_string()),
            files: vec!["x.txt".to_string()],
            ..Default::default()
        };
        let summary = execute(&base, &[directive]).unwrap();

        assert!(base.join("b").is_dir());
        assert_eq!(fs::read_to_string(base.join("b/x.txt"))?, "x");
        assert_eq!(summary.files_copied, 1);
        assert_eq!(summary.directives_run, 1);
        Ok(())
    }

    #[test]
    fn test_disabled_directive_is_untouched() -> io::Result<()> {
        let temp = TempDir::new()?;
        create_test_file(&temp.path().join("src"), "x.txt", b"x");
        let base = temp.path().join("out");

        let disabled = BackupDirective {
            enabled: false,
            src_dir: src_dir(&temp),
            dst_dir: Some("disabled".to_string()),
            files: vec!["x.txt".to_string()],
            ..Default::default()
        };
        let enabled = BackupDirective {
            src_dir: src_dir(&temp),
            dst_dir: Some("enabled".to_string()),
            files: vec!["x.txt".to_string()],
            ..Default::default()
        };
        let summary = execute(&base, &[disabled, enabled]).unwrap();

        assert!(!base.join("disabled").exists());
        assert!(base.join("enabled/x.txt").is_file());
        assert_eq!(summary.directives_skipped, 1);
        assert_eq!(summary.directives_run, 1);
        Ok(())
    }

    #[test]
    fn test_skip_non_exist() -> io::Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("src"))?;
        let base = temp.path().join("out");

        let directive = BackupDirective {
            skip_non_exist: true,
            src_dir: src_dir(&temp),
            files: vec!["missing.txt".to_string()],
            dirs: vec!["missing".to_string()],
            ..Default::default()
        };
        let summary = execute(&base, &[directive]).unwrap();
        assert_eq!(summary.entries_skipped, 2);
        assert_eq!(summary.files_copied, 0);
        Ok(())
    }

    #[test]
    fn test_skip_non_exist_checks_kind() -> io::Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("src/not_a_file"))?;
        let base = temp.path().join("out");

        let directive = BackupDirective {
            skip_non_exist: true,
            src_dir: src_dir(&temp),
            files: vec!["not_a_file".to_string()],
            ..Default::default()
        };
        let summary = execute(&base, &[directive]).unwrap();
        assert_eq!(summary.entries_skipped, 1);
        assert!(!base.join("not_a_file").exists());
        Ok(())
    }

    #[test]
    fn test_missing_file_aborts_run() -> io::Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("src"))?;
        create_test_file(&temp.path().join("src"), "x.txt", b"x");
        let base = temp.path().join("out");

        let failing = BackupDirective {
            src_dir: src_dir(&temp),
            dst_dir: Some("first".to_string()),
            files: vec!["missing.txt".to_string()],
            ..Default::default()
        };
        let later = BackupDirective {
            src_dir: src_dir(&temp),
            dst_dir: Some("second".to_string()),
            files: vec!["x.txt".to_string()],
            ..Default::default()
        };
        let err = execute(&base, &[failing, later]).unwrap_err();

        match err {
            ExecutionError::CopyFile { entry, path, .. } => {
                assert_eq!(entry, "missing.txt");
                assert!(path.ends_with("missing.txt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(base.join("first").is_dir());
        assert!(!base.join("second").exists());
        Ok(())
    }

    #[test]
    fn test_files_before_dirs() -> io::Result<()> {
        let temp = TempDir::new()?;
        create_test_file(&temp.path().join("src"), "sub/a.txt", b"a");
        let base = temp.path().join("out");

        // The file copy fails first, so the dir is never copied.
        let directive = BackupDirective {
            src_dir: src_dir(&temp),
            files: vec!["missing.txt".to_string()],
            dirs: vec!["sub".to_string()],
            ..Default::default()
        };
        assert!(execute(&base, &[directive]).is_err());
        assert!(!base.join("sub").exists());
        Ok(())
    }

    #[test]
    fn test_wildcard_files() -> io::Result<()> {
        let temp = TempDir::new()?;
        let src = temp.path().join("src");
        create_test_file(&src, "a.log", b"a");
        create_test_file(&src, "b.log", b"b");
        create_test_file(&src, "c.txt", b"c");
        let base = temp.path().join("out");

        let directive = BackupDirective {
            src_dir: src_dir(&temp),
            files: vec!["*.log".to_string()],
            ..Default::default()
        };
        let summary = execute(&base, &[directive]).unwrap();
        assert_eq!(summary.files_copied, 2);
        assert!(base.join("a.log").is_file());
        assert!(base.join("b.log").is_file());
        assert!(!base.join("c.txt").exists());
        Ok(())
    }

    #[test]
    fn test_wildcard_without_match_fails_even_when_skipping() -> io::Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("src"))?;
        let base = temp.path().join("out");

        let directive = BackupDirective {
            skip_non_exist: true,
            src_dir: src_dir(&temp),
            files: vec!["*.log".to_string()],
            ..Default::default()
        };
        let err = execute(&base, &[directive]).unwrap_err();
        assert!(matches!(err, ExecutionError::NoMatch { .. }));
        Ok(())
    }

    #[test]
    fn test_literal_entry_with_spaces() -> io::Result<()> {
        let temp = TempDir::new()?;
        create_test_file(&temp.path().join("src"), "my file [1].txt", b"spaced");
        let base = temp.path().join("out");

        let directive = BackupDirective {
            src_dir: src_dir(&temp),
            files: vec!["my file [1].txt".to_string()],
            ..Default::default()
        };
        execute(&base, &[directive]).unwrap();
        assert_eq!(fs::read_to_string(base.join("my file [1].txt"))?, "spaced");
        Ok(())
    }

    #[test]
    fn test_dirs_copied_recursively() -> io::Result<()> {
        let temp = TempDir::new()?;
        let src = temp.path().join("src");
        create_test_file(&src, "sub/a.txt", b"a");
        create_test_file(&src, "sub/deep/b.txt", b"b");
        let base = temp.path().join("out");

        let directive = BackupDirective {
            src_dir: src_dir(&temp),
            dirs: vec!["sub".to_string()],
            ..Default::default()
        };
        let summary = execute(&base, &[directive]).unwrap();
        assert_eq!(summary.dirs_copied, 1);
        assert_eq!(fs::read_to_string(base.join("sub/a.txt"))?, "a");
        assert_eq!(fs::read_to_string(base.join("sub/deep/b.txt"))?, "b");
        Ok(())
    }

    #[test]
    fn test_cur_dir_entry_copies_contents() -> io::Result<()> {
        let temp = TempDir::new()?;
        let src = temp.path().join("src");
        create_test_file(&src, "x.txt", b"x");
        create_test_file(&src, "inner/y.txt", b"y");
        let base = temp.path().join("out");

        let directive = BackupDirective {
            src_dir: src_dir(&temp),
            dirs: vec![".".to_string()],
            ..Default::default()
        };
        let summary = execute(&base, &[directive]).unwrap();
        assert_eq!(summary.dirs_copied, 1);

        let mut names: Vec<_> = fs::read_dir(&base)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<io::Result<_>>()?;
        names.sort();
        assert_eq!(names, ["inner", "x.txt"]);
        assert_eq!(fs::read_to_string(base.join("inner/y.txt"))?, "y");
        Ok(())
    }

    #[test]
    fn test_nested_cur_dir_entry_copies_contents() -> io::Result<()> {
        let temp = TempDir::new()?;
        create_test_file(&temp.path().join("src"), "sub/a.txt", b"a");
        let base = temp.path().join("out");

        let directive = BackupDirective {
            src_dir: src_dir(&temp),
            dst_dir: Some("b".to_string()),
            dirs: vec!["sub/.".to_string()],
            ..Default::default()
        };
        execute(&base, &[directive]).unwrap();
        assert_eq!(fs::read_to_string(base.join("b/a.txt"))?, "a");
        assert!(!base.join("b/sub").exists());
        Ok(())
    }

    #[test]
    fn test_double_wildcard_matches_like_single() -> io::Result<()> {
        let temp = TempDir::new()?;
        create_test_file(&temp.path().join("src"), "logs/app-1.log", b"1");
        create_test_file(&temp.path().join("src"), "logs/other.log", b"o");
        let base = temp.path().join("out");

        let directive = BackupDirective {
            src_dir: src_dir(&temp),
            files: vec!["logs/app**.log".to_string()],
            ..Default::default()
        };
        let summary = execute(&base, &[directive]).unwrap();
        assert_eq!(summary.files_copied, 1);
        assert_eq!(fs::read_to_string(base.join("app-1.log"))?, "1");
        assert!(!base.join("other.log").exists());
        Ok(())
    }

    #[test]
    fn test_double_wildcard_is_not_recursive() -> io::Result<()> {
        let temp = TempDir::new()?;
        let src = temp.path().join("src");
        create_test_file(&src, "top.log", b"top");
        create_test_file(&src, "one/mid.log", b"mid");
        create_test_file(&src, "one/two/deep.log", b"deep");
        let base = temp.path().join("out");

        let directive = BackupDirective {
            src_dir: src_dir(&temp),
            files: vec!["**/*.log".to_string()],
            ..Default::default()
        };
        let summary = execute(&base, &[directive]).unwrap();
        assert_eq!(summary.files_copied, 1);
        assert_eq!(fs::read_to_string(base.join("mid.log"))?, "mid");
        assert!(!base.join("top.log").exists());
        assert!(!base.join("deep.log").exists());
        Ok(())
    }

    #[test]
    fn test_missing_dir_aborts_run() -> io::Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("src"))?;
        let base = temp.path().join("out");

        let directive = BackupDirective {
            src_dir: src_dir(&temp),
            dirs: vec!["gone".to_string()],
            ..Default::default()
        };
        let err = execute(&base, &[directive]).unwrap_err();
        assert!(matches!(err, ExecutionError::CopyDir { ref entry, .. } if entry == "gone"));
        Ok(())
    }

    #[test]
    fn test_uncreatable_destination() -> io::Result<()> {
        let temp = TempDir::new()?;
        let base = create_test_file(temp.path(), "base_is_a_file", b"");

        let directive = BackupDirective {
            dst_dir: Some("sub".to_string()),
            files: vec!["x.txt".to_string()],
            ..Default::default()
        };
        let err = execute(&base, &[directive]).unwrap_err();
        assert!(matches!(err, ExecutionError::CreateDir { .. }));
        Ok(())
    }

    #[test]
    fn test_dry_run_touches_nothing() -> io::Result<()> {
        let temp = TempDir::new()?;
        create_test_file(&temp.path().join("src"), "x.txt", b"x");
        create_test_file(&temp.path().join("src"), "sub/y.txt", b"y");
        let base = temp.path().join("out");

        let directive = BackupDirective {
            src_dir: src_dir(&temp),
            dst_dir: Some("b".to_string()),
            files: vec!["x.txt".to_string()],
            dirs: vec!["sub".to_string()],
            ..Default::default()
        };
        let summary = BackupRun::new(&base, vec![directive])
            .dry_run(true)
            .execute()
            .unwrap();
        assert_eq!(summary.files_copied, 1);
        assert_eq!(summary.dirs_copied, 1);
        assert!(!base.exists());
        Ok(())
    }

    #[test]
    fn test_dry_run_reports_missing_source() -> io::Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("src"))?;
        let base = temp.path().join("out");

        let directive = BackupDirective {
            src_dir: src_dir(&temp),
            files: vec!["missing.txt".to_string()],
            ..Default::default()
        };
        let result = BackupRun::new(&base, vec![directive]).dry_run(true).execute();
        assert!(matches!(result, Err(ExecutionError::CopyFile { .. })));
        assert!(!base.exists());
        Ok(())
    }

    #[test]
    fn test_summary_display() {
        let summary = Summary {
            directives_run: 2,
            directives_skipped: 1,
            files_copied: 3,
            dirs_copied: 1,
            entries_skipped: 0,
        };
        assert_eq!(
            summary.to_string(),
            "2 directives run, 1 skipped, 3 files and 1 dirs copied, 0 missing entries skipped"
        );
    }
}
