use crate::error::ConfigError;
use std::{
    collections::{BTreeMap, HashMap},
    env::VarError,
    path::Path,
};

/// Read-only lookup of environment variables by name.
///
/// The binder only ever reads through this trait, so tests can hand in a map
/// instead of touching the process environment.
pub trait EnvSource {
    /// Same contract as [`std::env::var`]
    fn var(&self, name: &str) -> Result<String, VarError>;

    /// The value of `name`, or `None` when it is unset or not unicode
    fn lookup(&self, name: &str) -> Option<String> {
        self.var(name).ok()
    }
}

/// The environment of the running process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Result<String, VarError> {
        std::env::var(name)
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Result<String, VarError> {
        self.get(name).cloned().ok_or(VarError::NotPresent)
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Result<String, VarError> {
        self.get(name).cloned().ok_or(VarError::NotPresent)
    }
}

impl<S: EnvSource + ?Sized> EnvSource for &S {
    fn var(&self, name: &str) -> Result<String, VarError> {
        (**self).var(name)
    }
}

/// Two sources stacked: `first` wins, `fallback` answers for names `first` does not set
#[derive(Debug, Clone, Default)]
pub struct Layered<A, B> {
    pub first: A,
    pub fallback: B,
}

impl<A, B> Layered<A, B> {
    pub fn new(first: A, fallback: B) -> Self {
        Self { first, fallback }
    }
}

impl<A: EnvSource, B: EnvSource> EnvSource for Layered<A, B> {
    fn var(&self, name: &str) -> Result<String, VarError> {
        match self.first.var(name) {
            Err(VarError::NotPresent) => self.fallback.var(name),
            found => found,
        }
    }
}

/// Variables read from a `.env` file.
///
/// The file is parsed with `dotenvy` but nothing is written to the process
/// environment; layer it under [`ProcessEnv`] to get the usual precedence.
#[derive(Debug, Clone, Default)]
pub struct DotenvFile {
    vars: HashMap<String, String>,
}

impl DotenvFile {
    /// Read `path`. A missing file yields an empty source.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                tracing::debug!(path = %path.display(), ".env file not found, skipping");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Dotenv {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|source| ConfigError::Dotenv {
                path: path.to_path_buf(),
                source,
            })?;
            vars.insert(key, value);
        }
        tracing::debug!(path = %path.display(), count = vars.len(), "read .env file");
        Ok(Self { vars })
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvSource for DotenvFile {
    fn var(&self, name: &str) -> Result<String, VarError> {
        self.vars.var(name)
    }
}
