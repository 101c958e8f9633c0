//! TOML file stage.
//!
//! The file is decoded *into* the target: its tables are deep-merged over the
//! target's current serialized form, so keys the file does not mention keep
//! whatever value the target already had. The target is only replaced once
//! the whole decode has succeeded.
//!
//! A missing file (or a directory) is skipped. Every other I/O or decode
//! failure is returned; nothing continues with a half-decoded target.

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use toml::{Table, Value};

use crate::{
    bind::{load_env_from, Bind, Shape},
    environment::{EnvSource, ProcessEnv},
    error::ConfigError,
    leaf::type_name_of,
};

/// Lay the file's `table` over `current`, the target's serialized form.
///
/// Tables present on both sides are combined key by key; any other value
/// from the file replaces what the target had.
pub(crate) fn overlay_file(current: &mut Table, table: Table) {
    for (key, file_value) in table {
        let file_table = match file_value {
            Value::Table(file_table) => file_table,
            other => {
                current.insert(key, other);
                continue;
            }
        };
        if let Some(Value::Table(current_table)) = current.get_mut(&key) {
            overlay_file(current_table, file_table);
            continue;
        }
        current.insert(key, Value::Table(file_table));
    }
}

/// Decode the TOML text `content` into `target`. `path` is only used in errors.
pub fn decode_str<T>(content: &str, path: &Path, target: &mut T) -> Result<(), ConfigError>
where
    T: Serialize + DeserializeOwned,
{
    let decode_err = |source| ConfigError::FileDecode {
        path: path.to_path_buf(),
        source,
    };

    let file_table: Table = toml::from_str(content).map_err(decode_err)?;
    let mut current = match Value::try_from(&*target)? {
        Value::Table(table) => table,
        _ => Table::new(),
    };
    overlay_file(&mut current, file_table);

    let decoded: T = Value::Table(current).try_into().map_err(decode_err)?;
    *target = decoded;
    Ok(())
}

/// Decode the file at `path` into `target`.
///
/// Returns `Ok(false)` when the file was skipped because it does not exist or
/// is a directory.
pub fn decode_file<T>(path: &Path, target: &mut T) -> Result<bool, ConfigError>
where
    T: Serialize + DeserializeOwned,
{
    let read_err = |source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    };

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "config file not found, skipping");
            return Ok(false);
        }
        Err(e) => return Err(read_err(e)),
    };
    if metadata.is_dir() {
        tracing::warn!(path = %path.display(), "config path is a directory, skipping");
        return Ok(false);
    }

    let content = std::fs::read_to_string(path).map_err(read_err)?;
    decode_str(&content, path, target)?;
    tracing::debug!(path = %path.display(), "decoded config file");
    Ok(true)
}

/// Load `path` into `target`, then override from the process environment.
///
/// An empty `path` skips the file stage.
pub fn load_config<T>(path: impl AsRef<Path>, target: &mut T) -> Result<(), ConfigError>
where
    T: Bind + Serialize + DeserializeOwned,
{
    load_config_from(path, target, &ProcessEnv)
}

/// Like [`load_config`], reading variables from `source`
pub fn load_config_from<T>(
    path: impl AsRef<Path>,
    target: &mut T,
    source: &dyn EnvSource,
) -> Result<(), ConfigError>
where
    T: Bind + Serialize + DeserializeOwned,
{
    if T::SHAPE != Shape::Record {
        return Err(ConfigError::InvalidTarget {
            type_name: type_name_of::<T>(),
        });
    }

    let path = path.as_ref();
    if !path.as_os_str().is_empty() {
        decode_file(path, target)?;
    }
    load_env_from(target, source)
}
