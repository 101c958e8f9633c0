//! The tree walker.
//!
//! Every bindable type implements [`Bind`]. Records (via `#[derive(Bind)]`)
//! visit their visible fields in declaration order through [`Binder::field`];
//! leaves look their variable up and parse it through [`Binder::bind_leaf`].
//! Recursion follows static types, so the walk always terminates.

use std::env::VarError;

use crate::{
    environment::{EnvSource, ProcessEnv},
    error::{ConfigError, ParseError},
    field::{Binding, FieldDescriptor},
    leaf::type_name_of,
};

/// How the walker treats a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A struct deriving `Bind`; recursed into regardless of tags
    Record,
    /// `Option<T>`; allocated and recursed for records, parsed for leaves
    Optional,
    /// A scalar or list parsed from text
    Leaf,
}

/// A type the binder knows how to walk or parse.
///
/// Leaf types only override [`from_env_text`](Bind::from_env_text); records get
/// every method from `#[derive(Bind)]`. A type that keeps the default
/// `from_env_text` fails with [`ConfigError::UnsupportedType`] when tagged.
pub trait Bind: Sized {
    const SHAPE: Shape = Shape::Leaf;

    /// Bind this value, reached through `field`
    fn bind_value(
        &mut self,
        field: &FieldDescriptor,
        binder: &mut Binder<'_>,
    ) -> Result<(), ConfigError> {
        binder.bind_leaf(field, self)
    }

    /// Parse one piece of environment text into a value of this type
    fn from_env_text(text: &str) -> Result<Self, ParseError> {
        let _ = text;
        Err(ParseError::Unsupported {
            type_name: type_name_of::<Self>(),
        })
    }

    /// Fresh zero value used to allocate an `Option<Self>` before recursing
    fn zero() -> Option<Self> {
        None
    }

    /// Field table of a record, in declaration order
    fn fields() -> &'static [FieldDescriptor] {
        &[]
    }
}

impl<T: Bind> Bind for Option<T> {
    const SHAPE: Shape = Shape::Optional;

    fn bind_value(
        &mut self,
        field: &FieldDescriptor,
        binder: &mut Binder<'_>,
    ) -> Result<(), ConfigError> {
        if T::SHAPE != Shape::Record {
            return binder.bind_leaf(field, self);
        }

        if self.is_none() {
            *self = T::zero();
            tracing::trace!(field = %binder.path(), "allocated optional record");
        }
        match self {
            Some(inner) => inner.bind_value(field, binder),
            None => Ok(()),
        }
    }

    fn from_env_text(text: &str) -> Result<Self, ParseError> {
        T::from_env_text(text).map(Some)
    }
}

/// Never answers; used when describing bindings without reading anything
struct Unset;

impl EnvSource for Unset {
    fn var(&self, _name: &str) -> Result<String, VarError> {
        Err(VarError::NotPresent)
    }
}

/// State of one walk over a record tree
pub struct Binder<'a> {
    source: &'a dyn EnvSource,
    path: Vec<&'static str>,
    bound: usize,
    bindings: Option<Vec<Binding>>,
}

impl<'a> Binder<'a> {
    /// A binder reading from `source`
    pub fn new(source: &'a dyn EnvSource) -> Self {
        Self {
            source,
            path: Vec::new(),
            bound: 0,
            bindings: None,
        }
    }

    /// A binder that records tagged leaves instead of reading them
    pub(crate) fn describing() -> Binder<'static> {
        Binder {
            source: &Unset,
            path: Vec::new(),
            bound: 0,
            bindings: Some(Vec::new()),
        }
    }

    /// Walk `target`, which must be a record
    pub fn bind<T: Bind>(&mut self, target: &mut T) -> Result<(), ConfigError> {
        if T::SHAPE != Shape::Record {
            return Err(ConfigError::InvalidTarget {
                type_name: type_name_of::<T>(),
            });
        }
        target.bind_value(&FieldDescriptor::root(), self)
    }

    /// Visit one field of the record currently being walked
    pub fn field<V: Bind>(
        &mut self,
        field: &FieldDescriptor,
        value: &mut V,
    ) -> Result<(), ConfigError> {
        self.path.push(field.name);
        let result = value.bind_value(field, self);
        self.path.pop();
        result
    }

    /// Look up the variable named by `field`'s tag and, when set, parse it into `slot`.
    ///
    /// `slot` is only assigned after a successful parse.
    pub fn bind_leaf<V: Bind>(
        &mut self,
        field: &FieldDescriptor,
        slot: &mut V,
    ) -> Result<(), ConfigError> {
        let Some(var) = field.tag.var() else {
            return Ok(());
        };

        if self.bindings.is_some() {
            let binding = Binding {
                path: self.path(),
                var,
                type_name: type_name_of::<V>(),
                doc: field.doc,
            };
            if let Some(bindings) = self.bindings.as_mut() {
                bindings.push(binding);
            }
            return Ok(());
        }

        let text = match self.source.var(var) {
            Ok(text) => text,
            Err(VarError::NotPresent) => {
                tracing::trace!(var, field = %self.path(), "not set, keeping current value");
                return Ok(());
            }
            Err(VarError::NotUnicode(_)) => {
                return Err(ConfigError::NotUnicode {
                    field: self.path(),
                    var: var.to_string(),
                });
            }
        };

        match V::from_env_text(&text) {
            Ok(value) => {
                *slot = value;
                self.bound += 1;
                tracing::debug!(var, field = %self.path(), "bound from environment");
                Ok(())
            }
            Err(ParseError::Unsupported { type_name }) => Err(ConfigError::UnsupportedType {
                field: self.path(),
                var: var.to_string(),
                type_name,
            }),
            Err(cause) => Err(ConfigError::FieldBind {
                field: self.path(),
                var: var.to_string(),
                cause,
            }),
        }
    }

    /// Dotted path of the field currently being visited
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Number of fields assigned so far
    pub fn bound(&self) -> usize {
        self.bound
    }

    pub(crate) fn into_bindings(self) -> Vec<Binding> {
        self.bindings.unwrap_or_default()
    }
}

/// Overwrite every tagged field of `target` whose variable is set in the process environment
pub fn load_env<T: Bind>(target: &mut T) -> Result<(), ConfigError> {
    load_env_from(target, &ProcessEnv)
}

/// Like [`load_env`], reading variables from `source`
pub fn load_env_from<T: Bind>(target: &mut T, source: &dyn EnvSource) -> Result<(), ConfigError> {
    let mut binder = Binder::new(source);
    binder.bind(target)?;
    tracing::debug!(
        target_type = %type_name_of::<T>(),
        bound = binder.bound(),
        "environment bind complete"
    );
    Ok(())
}

/// Every tagged leaf of `T`, without reading any environment
pub fn describe<T: Bind + Default>() -> Result<Vec<Binding>, ConfigError> {
    let mut target = T::default();
    let mut binder = Binder::describing();
    binder.bind(&mut target)?;
    Ok(binder.into_bindings())
}
