use serde::{Deserialize, Serialize};

/// A single copy task: a source/destination pair plus the files and
/// directories to replicate from one into the other.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BackupDirective {
    /// If false, the directive is skipped entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// If true, missing non-wildcard sources are skipped instead of failing the run.
    #[serde(default)]
    pub skip_non_exist: bool,
    /// Base path prepended to every file/dir entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_dir: Option<String>,
    /// Subdirectory under the base destination directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_dir: Option<String>,
    /// Individual files to copy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// Directories to copy recursively.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dirs: Vec<String>,
}

impl Default for BackupDirective {
    fn default() -> Self {
        Self {
            enabled: true,
            skip_non_exist: false,
            src_dir: None,
            dst_dir: None,
            files: vec![],
            dirs: vec![],
        }
    }
}

impl BackupDirective {
    /// The `src_dir` value, with an empty string treated as absent.
    pub fn src_dir(&self) -> Option<&str> {
        self.src_dir.as_deref().filter(|s| !s.is_empty())
    }

    /// The `dst_dir` value, with an empty string treated as absent.
    pub fn dst_dir(&self) -> Option<&str> {
        self.dst_dir.as_deref().filter(|s| !s.is_empty())
    }

    /// Human-readable label used in progress output.
    pub fn label(&self) -> &str {
        self.src_dir().unwrap_or(".")
    }
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        let directive = BackupDirective::default();
        assert!(directive.enabled);
        assert!(!directive.skip_non_exist);
        assert!(directive.src_dir().is_none());
        assert!(directive.dst_dir().is_none());
    }

    #[test]
    fn test_empty_dirs_are_absent() {
        let directive = BackupDirective {
            src_dir: Some(String::new()),
            dst_dir: Some(String::new()),
            files: vec!["a.txt".to_string()],
            ..Default::default()
        };
        assert!(directive.src_dir().is_none());
        assert!(directive.dst_dir().is_none());
        assert_eq!(directive.label(), ".");
    }

    #[test]
    fn test_serialization_fills_defaults() {
        let directive: BackupDirective =
            serde_yaml::from_str("src_dir: /etc\nfiles: [hosts]\n").expect("valid yaml");
        assert!(directive.enabled);
        assert!(!directive.skip_non_exist);

        let yaml = serde_yaml::to_string(&directive).expect("serializable");
        assert!(yaml.contains("enabled: true"));
        assert!(yaml.contains("skip_non_exist: false"));
        assert!(!yaml.contains("dirs"));
        assert!(!yaml.contains("dst_dir"));
    }
}
