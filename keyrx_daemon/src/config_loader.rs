//! Loads a compiled `.krx` configuration file into a [`keyrx_core::Config`].
//!
//! `.krx` files are produced by `keyrx_compiler` and are `rkyv`-archived
//! [`Config`] values. Loading is zero-copy validation followed by a single
//! deserialize into an owned, mutable `Config` the daemon can run with.

use std::fs;
use std::path::Path;

use keyrx_core::Config;
use rkyv::Deserialize;

use crate::error::ConfigError;

/// Reads and validates a `.krx` file, returning an owned [`Config`].
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

    let archived = rkyv::check_archived_root::<Config>(&bytes)
        .map_err(|e| ConfigError::Decode(format!("{e}")))?;

    archived
        .deserialize(&mut rkyv::Infallible)
        .map_err(|_: core::convert::Infallible| ConfigError::Decode("deserialize failed".into()))
}
