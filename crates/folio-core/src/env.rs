//! Environment variable handling.

use std::env;
use std::path::Path;

/// Dotenv files consulted at startup, in priority order.
pub const DOTENV_FILES: &[&str] = &[".env.local", ".env", "chatbot/.env"];

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get the first set variable among `names`.
pub fn get_any(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| get_var(name))
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Get an environment variable as a u16 (e.g., for ports).
pub fn get_u16(name: &str) -> Option<u16> {
    get_var(name).and_then(|v| v.parse().ok())
}

/// Get an environment variable as a usize.
pub fn get_usize(name: &str) -> Option<usize> {
    get_var(name).and_then(|v| v.parse().ok())
}

/// Load environment variables from the standard dotenv files.
///
/// Returns the files that were found and applied. Variables that are already
/// set in the process environment are never overridden, so earlier files win.
pub fn load_dotenv() -> Result<Vec<&'static str>, std::io::Error> {
    let mut loaded = Vec::new();
    for file in DOTENV_FILES {
        if load_dotenv_file(Path::new(file))? {
            loaded.push(*file);
        }
    }
    Ok(loaded)
}

/// Load a single dotenv file. Returns `false` when the file does not exist.
pub fn load_dotenv_file(path: &Path) -> Result<bool, std::io::Error> {
    if !path.exists() {
        return Ok(false);
    }

    let content = std::fs::read_to_string(path)?;
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            env::set_var(key, value);
        }
    }
    Ok(true)
}

/// Parse `KEY=value` lines, skipping comments and blank lines.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();

            // Remove quotes if present
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);

            if !key.is_empty() {
                pairs.push((key.to_string(), value.to_string()));
            }
        }
    }
    pairs
}

/// Common environment variable names.
pub mod vars {
    /// Hugging Face token used for generation and embeddings.
    pub const HUGGINGFACE_API_KEY: &str = "HUGGINGFACE_API_KEY";

    /// Alternate Hugging Face token name used by the hub client.
    pub const HUGGINGFACEHUB_API_TOKEN: &str = "HUGGINGFACEHUB_API_TOKEN";

    /// API key for OpenAI-compatible embeddings.
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

    /// SMTP relay host.
    pub const SMTP_SERVER: &str = "SMTP_SERVER";

    /// SMTP relay port.
    pub const SMTP_PORT: &str = "SMTP_PORT";

    /// SMTP username, also the default inbox.
    pub const EMAIL_USERNAME: &str = "EMAIL_USERNAME";

    /// SMTP password.
    pub const EMAIL_PASSWORD: &str = "EMAIL_PASSWORD";

    /// Folio config file override.
    pub const FOLIO_CONFIG: &str = "FOLIO_CONFIG";

    /// Folio HTTP port override.
    pub const FOLIO_PORT: &str = "FOLIO_PORT";

    /// Folio log filter.
    pub const FOLIO_LOG: &str = "FOLIO_LOG";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_bool() {
        env::set_var("FOLIO_TEST_BOOL_TRUE", "true");
        env::set_var("FOLIO_TEST_BOOL_1", "1");
        env::set_var("FOLIO_TEST_BOOL_FALSE", "false");
        env::set_var("FOLIO_TEST_BOOL_0", "0");

        assert!(get_bool("FOLIO_TEST_BOOL_TRUE"));
        assert!(get_bool("FOLIO_TEST_BOOL_1"));
        assert!(!get_bool("FOLIO_TEST_BOOL_FALSE"));
        assert!(!get_bool("FOLIO_TEST_BOOL_0"));
        assert!(!get_bool("FOLIO_TEST_BOOL_NONEXISTENT"));
    }

    #[test]
    fn test_get_any_prefers_first_set() {
        env::set_var("FOLIO_TEST_ANY_B", "second");
        assert_eq!(
            get_any(&["FOLIO_TEST_ANY_A", "FOLIO_TEST_ANY_B"]),
            Some("second".to_string())
        );
        env::set_var("FOLIO_TEST_ANY_A", "first");
        assert_eq!(
            get_any(&["FOLIO_TEST_ANY_A", "FOLIO_TEST_ANY_B"]),
            Some("first".to_string())
        );
    }

    #[test]
    fn test_parse_dotenv() {
        let pairs = parse_dotenv(
            "# comment\n\nSMTP_SERVER=smtp.example.com\nexport TOKEN=\"abc\"\nQUOTED='x y'\n=skip\n",
        );
        assert_eq!(
            pairs,
            vec![
                ("SMTP_SERVER".to_string(), "smtp.example.com".to_string()),
                ("TOKEN".to_string(), "abc".to_string()),
                ("QUOTED".to_string(), "x y".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_dotenv_file_does_not_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "FOLIO_TEST_DOTENV_NEW=from-file\nFOLIO_TEST_DOTENV_SET=from-file\n")
            .unwrap();
        env::set_var("FOLIO_TEST_DOTENV_SET", "from-env");

        assert!(load_dotenv_file(&path).unwrap());
        assert_eq!(get_var("FOLIO_TEST_DOTENV_NEW"), Some("from-file".to_string()));
        assert_eq!(get_var("FOLIO_TEST_DOTENV_SET"), Some("from-env".to_string()));

        assert!(!load_dotenv_file(&dir.path().join("missing.env")).unwrap());
    }
}
