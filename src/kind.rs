use std::fmt;

/// The closed set of destination shapes a configuration leaf can take
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Kind {
    Bool,
    Int { signed: bool, bits: u32 },
    Float { bits: u32 },
    String,
    Duration,
    /// A type that decodes itself from text, named by its Rust type
    Text(&'static str),
    /// Optional value, allocated on first write
    Pointer(Box<Kind>),
    /// Comma separated list of elements
    Sequence(Box<Kind>),
    /// A nested record; never written from a single string
    Record(&'static str),
}

impl Kind {
    pub fn is_bool(&self) -> bool {
        match self {
            Kind::Bool => true,
            Kind::Pointer(inner) => inner.is_bool(),
            _ => false,
        }
    }

    pub fn is_sequence(&self) -> bool {
        match self {
            Kind::Sequence(_) => true,
            Kind::Pointer(inner) => inner.is_sequence(),
            _ => false,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => write!(f, "bool"),
            Kind::Int { signed: true, bits } => write!(f, "i{bits}"),
            Kind::Int { signed: false, bits } => write!(f, "u{bits}"),
            Kind::Float { bits } => write!(f, "f{bits}"),
            Kind::String => write!(f, "string"),
            Kind::Duration => write!(f, "duration"),
            Kind::Text(name) => write!(f, "{name}"),
            Kind::Pointer(inner) => write!(f, "Option<{inner}>"),
            Kind::Sequence(inner) => write!(f, "Vec<{inner}>"),
            Kind::Record(name) => write!(f, "record {name}"),
        }
    }
}
