use crate::{
    bind::{describe, load_env_from, Bind},
    environment::{DotenvFile, EnvSource, Layered, ProcessEnv},
    error::ConfigError,
    field::Binding,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[cfg(feature = "file")]
use serde::{de::DeserializeOwned, Serialize};

/// Loads configuration in stages: TOML file first, environment second.
///
/// # Example
/// ```rust
/// use config_bindr::{Bind, ConfigLoader};
/// use std::collections::HashMap;
///
/// #[derive(Bind, Default, serde::Serialize, serde::Deserialize)]
/// struct Config {
///     #[env("PORT")]
///     pub port: u16,
/// }
///
/// let env: HashMap<String, String> = [("PORT".to_string(), "8080".to_string())].into();
/// let config: Config = ConfigLoader::new().source(env).load().unwrap();
/// assert_eq!(config.port, 8080);
/// ```
pub struct ConfigLoader {
    #[cfg_attr(not(feature = "file"), allow(dead_code))]
    file: Option<PathBuf>,
    dotenv: Option<PathBuf>,
    source: Box<dyn EnvSource>,
}

impl ConfigLoader {
    /// A loader reading the process environment, with no file stage
    pub fn new() -> Self {
        Self {
            file: None,
            dotenv: None,
            source: Box::new(ProcessEnv),
        }
    }

    /// Decode this TOML file before binding the environment.
    ///
    /// A missing file is skipped.
    #[cfg(feature = "file")]
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use values from this `.env` file for variables the environment source
    /// does not set. The process environment is never written.
    pub fn dotenv(mut self, path: impl AsRef<Path>) -> Self {
        self.dotenv = Some(path.as_ref().to_path_buf());
        self
    }

    /// Read variables from `source` instead of the process environment
    pub fn source(mut self, source: impl EnvSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    fn bind_env<T: Bind>(&self, target: &mut T) -> Result<(), ConfigError> {
        match &self.dotenv {
            Some(path) => {
                let dotenv = DotenvFile::from_path(path)?;
                load_env_from(target, &Layered::new(&*self.source, dotenv))
            }
            None => load_env_from(target, &*self.source),
        }
    }

    /// Run every configured stage against `target`
    #[cfg(feature = "file")]
    pub fn load_into<T>(&self, target: &mut T) -> Result<(), ConfigError>
    where
        T: Bind + Serialize + DeserializeOwned,
    {
        if let Some(path) = &self.file {
            crate::file::decode_file(path, target)?;
        }
        self.bind_env(target)
    }

    /// Run the environment stage against `target`
    #[cfg(not(feature = "file"))]
    pub fn load_into<T: Bind>(&self, target: &mut T) -> Result<(), ConfigError> {
        self.bind_env(target)
    }

    /// Load into a fresh `T::default()`
    #[cfg(feature = "file")]
    pub fn load<T>(&self) -> Result<T, ConfigError>
    where
        T: Bind + Default + Serialize + DeserializeOwned,
    {
        let mut target = T::default();
        self.load_into(&mut target)?;
        Ok(target)
    }

    /// Load into a fresh `T::default()`
    #[cfg(not(feature = "file"))]
    pub fn load<T: Bind + Default>(&self) -> Result<T, ConfigError> {
        let mut target = T::default();
        self.load_into(&mut target)?;
        Ok(target)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Render bindings as a markdown summary table
pub fn format_docs(bindings: &[Binding]) -> String {
    let mut md = String::new();

    md.push_str("## Environment Variables Summary\n\n");
    md.push_str("| Variable | Field | Type | Description |\n");
    md.push_str("|----------|-------|------|-------------|\n");
    for binding in bindings {
        let description = if binding.doc.is_empty() {
            "-"
        } else {
            binding.doc
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            binding.var, binding.path, binding.type_name, description
        ));
    }

    md
}

/// Write configuration documentation for `T` to a markdown file
///
/// # Example
/// ```no_run
/// use config_bindr::{write_docs, Bind};
///
/// #[derive(Bind, Default)]
/// struct Config {
///     /// Server port
///     #[env("PORT")]
///     pub port: u16,
/// }
///
/// write_docs::<Config>("CONFIG.md").unwrap();
/// ```
pub fn write_docs<T: Bind + Default>(path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let bindings = describe::<T>()?;
    let path = path.as_ref();
    fs::write(path, format_docs(&bindings)).map_err(|source| ConfigError::DocsWrite {
        path: path.to_path_buf(),
        source,
    })
}
