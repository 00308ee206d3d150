//! Path resolution utilities.

use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the Folio base directory (~/.folio).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(".folio"))
}

/// Get the main config file path (~/.folio/folio.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    if let Some(path) = crate::env::get_var(crate::env::vars::FOLIO_CONFIG) {
        return Ok(PathBuf::from(path));
    }
    Ok(base_dir()?.join("folio.json5"))
}

/// Resolve a possibly-relative path against a base directory.
pub fn resolve(base: &std::path::Path, path: &std::path::Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_base_dir_ends_with_folio() {
        if let Ok(dir) = base_dir() {
            assert!(dir.ends_with(".folio"));
        }
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = Path::new("/srv/site");
        assert_eq!(resolve(base, Path::new("static")), PathBuf::from("/srv/site/static"));
        assert_eq!(resolve(base, Path::new("/etc/folio")), PathBuf::from("/etc/folio"));
    }
}
