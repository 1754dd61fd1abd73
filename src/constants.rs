/// Package name.
pub(crate) const PKG_NAME: &str = env!("CARGO_PKG_NAME");
/// Default configuration file name, looked up under the platform config directory.
pub(crate) const CONFIG_NAME: &str = "config.yaml";
/// Environment variable holding the inline YAML configuration.
pub const CONFIG_ENV: &str = "backup_cfg";
/// Environment variable holding the base destination directory.
pub const BASE_DIR_ENV: &str = "base_backup_dir";
/// Top-level document key holding the directive list.
pub(crate) const BACKUPS_KEY: &str = "backups";
