//! # Config Loader
//!
//! Locates configuration files on disk and reads or deserializes them.
//!
//! ```no_run
//! use config_loader::{find_config_file, load_config_file, load_json};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Option 1: search the usual locations
//!     let path = find_config_file("encoder.json")?;
//!     let content = load_config_file(&path)?;
//!
//!     // Option 2: deserialize straight into a serde type
//!     let value: serde_json::Value = load_json("./config/encoder.json")?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{ConfigError, Result};

use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable checked first by [`find_config_file`].
pub const CONFIG_PATH_ENV: &str = "ENCODER_CONFIG_PATH";

/// Reads a configuration file into a string.
///
/// The content is not validated here.
///
/// # Errors
///
/// [`ConfigError::FileNotFound`] if nothing exists at `path`,
/// [`ConfigError::ReadError`] if reading fails.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))
}

/// Searches the usual locations for a configuration file.
///
/// Order:
/// 1. `ENCODER_CONFIG_PATH` environment variable (when it names an existing file)
/// 2. `./config/{filename}`
/// 3. `./{filename}`
pub fn find_config_file(filename: &str) -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let path_buf = PathBuf::from(&path);
        if path_buf.exists() {
            return Ok(path_buf);
        }
    }

    search_dirs(filename, &[Path::new("./config"), Path::new("./")]).ok_or_else(|| {
        ConfigError::FileNotFound(format!(
            "'{}' not found. Searched: {} env var, ./config/{}, ./{}",
            filename, CONFIG_PATH_ENV, filename, filename
        ))
    })
}

fn search_dirs(filename: &str, dirs: &[&Path]) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(filename))
        .find(|candidate| candidate.exists())
}

/// Finds and reads a configuration file in one step.
pub fn find_and_load(filename: &str) -> Result<String> {
    let path = find_config_file(filename)?;
    load_config_file(path)
}

/// Reads `path` and deserializes it as JSON into `T`.
///
/// # Errors
///
/// Same as [`load_config_file`], plus [`ConfigError::Parse`] when the
/// content does not match `T`.
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let content = load_config_file(path)?;
    parse_json(&content, &path.display().to_string())
}

/// Deserializes JSON text already in memory. `origin` names the source in
/// error messages.
pub fn parse_json<T: DeserializeOwned>(content: &str, origin: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        codec: String,
        #[serde(default)]
        threads: u32,
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_config_file("/path/that/does/not/exist.json");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_find_nonexistent_file() {
        let result = find_config_file("file_that_definitely_does_not_exist_12345.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_search_dirs_prefers_first_match() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(first.path().join("a.json"), "{}").unwrap();
        fs::write(second.path().join("a.json"), "{}").unwrap();

        let found = search_dirs("a.json", &[first.path(), second.path()]).unwrap();
        assert_eq!(found, first.path().join("a.json"));

        assert!(search_dirs("b.json", &[first.path(), second.path()]).is_none());
    }

    #[test]
    fn test_load_json_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("encoder.json");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, r#"{{ "codec": "libx264" }}"#).unwrap();

        let sample: Sample = load_json(&path).unwrap();
        assert_eq!(
            sample,
            Sample {
                codec: "libx264".to_string(),
                threads: 0
            }
        );
    }

    #[test]
    fn test_load_json_reports_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ codec: ").unwrap();

        match load_json::<Sample, _>(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert!(p.ends_with("broken.json")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_json_names_origin() {
        let err = parse_json::<Sample>("[]", "ENCODER_CONFIG").unwrap_err();
        assert!(err.to_string().contains("ENCODER_CONFIG"));
    }
}
