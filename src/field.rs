/// Binding annotation carried by a field descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// No annotation, or an empty variable name
    None,
    /// Explicit "do not bind" sentinel: `#[env(skip)]` or `#[env("-")]`
    Skip,
    /// Name of the environment variable that supplies the value
    Env(&'static str),
}

impl Tag {
    /// Build a tag from the raw annotation text, the way `#[env("...")]` reads it
    pub const fn from_attr(raw: &'static str) -> Self {
        match raw.as_bytes() {
            [] => Tag::None,
            [b'-'] => Tag::Skip,
            _ => Tag::Env(raw),
        }
    }

    /// The variable to consult, if this tag binds one
    pub fn var(&self) -> Option<&'static str> {
        match self {
            Tag::Env(name) => Some(*name),
            Tag::None | Tag::Skip => None,
        }
    }
}

/// Compile-time description of one field of a bindable record.
///
/// `#[derive(Bind)]` emits one of these per visible field, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Rust field name
    pub name: &'static str,
    /// Binding annotation
    pub tag: Tag,
    /// Human-readable description, from doc comments or `#[env(doc = "...")]`
    pub doc: &'static str,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, tag: Tag, doc: &'static str) -> Self {
        Self { name, tag, doc }
    }

    /// Descriptor for the top-level record, which has no field of its own
    pub(crate) const fn root() -> Self {
        Self::new("", Tag::None, "")
    }
}

/// A tagged leaf discovered by [`describe`](crate::describe)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Dotted path from the root record, e.g. `server.port`
    pub path: String,
    /// Environment variable key
    pub var: &'static str,
    /// Short name of the field type, e.g. `Vec<u16>`
    pub type_name: String,
    /// Human-readable description
    pub doc: &'static str,
}
