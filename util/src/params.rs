//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot load the parmeter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// Relative paths are resolved against `$TRAJ_SW_ROOT/params` if the software
/// root is set, otherwise against the current directory.
pub fn load<P, F>(param_file_path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    F: AsRef<Path>,
{
    let path = resolve(param_file_path.as_ref());

    // Load the file into a string
    let params_str = match read_to_string(&path) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(path, e)),
    };

    from_str(&params_str)
}

/// Parse a parameter structure from a TOML string.
pub fn from_str<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn resolve(param_file_path: &Path) -> PathBuf {
    if param_file_path.is_absolute() {
        return param_file_path.to_path_buf();
    }

    match crate::host::get_traj_sw_root() {
        Ok(mut root) => {
            root.push("params");
            root.push(param_file_path);
            root
        }
        Err(_) => param_file_path.to_path_buf(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Dummy {
        ratio: f64,
        #[serde(default)]
        count: u32,
    }

    #[test]
    fn test_from_str() {
        let p: Dummy = from_str("ratio = 100.0").unwrap();
        assert_eq!(p, Dummy { ratio: 100.0, count: 0 });

        assert!(matches!(
            from_str::<Dummy>("ratio = \"abc\""),
            Err(LoadError::DeserialiseError(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("util_params_test_does_not_exist.toml");
        assert!(matches!(
            load::<Dummy, _>(&path),
            Err(LoadError::FileLoadError(_, _))
        ));
    }
}
