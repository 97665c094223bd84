use crate::{
    duration::{format_duration, parse_duration},
    error::CoerceError,
    kind::Kind,
};
use std::{
    num::{IntErrorKind, ParseIntError},
    time::Duration,
};
use thiserror::Error;

/// Separator between elements of a sequence value
pub const SEQUENCE_SEPARATOR: char = ',';

/// A leaf slot that can be written from text.
///
/// Implemented for the scalar family, `Duration`, `Option<T>` and `Vec<T>`.
/// Types with their own text form opt in through [`text_value!`](crate::text_value).
pub trait Value {
    /// Shape of the destination, without needing an instance
    fn kind() -> Kind
    where
        Self: Sized;

    fn value_kind(&self) -> Kind;

    /// Convert `raw` and write it in place
    fn set(&mut self, raw: &str) -> Result<(), CoerceError>;

    /// Write an already split list of elements, as carried by structured files
    fn set_items(&mut self, items: &[&str]) -> Result<(), CoerceError> {
        let _ = items;
        Err(CoerceError::Shape {
            kind: self.value_kind(),
            found: "list",
        })
    }

    /// Whether the slot still holds its type's zero value
    fn is_zero(&self) -> bool;

    /// Text form of the current value, in the syntax `set` accepts
    fn render(&self) -> String;
}

#[derive(Debug, Error)]
#[error("expected one of true, false, 1, 0, t, f")]
struct BoolSyntax;

#[derive(Debug, Error)]
#[error("invalid float literal")]
struct FloatSyntax;

fn int_error(kind: Kind, raw: &str, err: ParseIntError) -> CoerceError {
    match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => CoerceError::Overflow {
            kind,
            input: raw.to_string(),
        },
        _ => CoerceError::Parse {
            kind,
            input: raw.to_string(),
            source: Box::new(err),
        },
    }
}

impl Value for String {
    fn kind() -> Kind {
        Kind::String
    }

    fn value_kind(&self) -> Kind {
        Kind::String
    }

    fn set(&mut self, raw: &str) -> Result<(), CoerceError> {
        raw.clone_into(self);
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn render(&self) -> String {
        self.clone()
    }
}

impl Value for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn value_kind(&self) -> Kind {
        Kind::Bool
    }

    fn set(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = match raw {
            "1" => true,
            "0" => false,
            s if s.eq_ignore_ascii_case("t") || s.eq_ignore_ascii_case("true") => true,
            s if s.eq_ignore_ascii_case("f") || s.eq_ignore_ascii_case("false") => false,
            _ => {
                return Err(CoerceError::Parse {
                    kind: Kind::Bool,
                    input: raw.to_string(),
                    source: Box::new(BoolSyntax),
                });
            }
        };
        Ok(())
    }

    fn is_zero(&self) -> bool {
        !*self
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

macro_rules! int_value {
    ($($ty:ty => $signed:expr),* $(,)?) => {$(
        impl Value for $ty {
            fn kind() -> Kind {
                Kind::Int { signed: $signed, bits: <$ty>::BITS }
            }

            fn value_kind(&self) -> Kind {
                Self::kind()
            }

            fn set(&mut self, raw: &str) -> Result<(), CoerceError> {
                *self = raw
                    .parse::<$ty>()
                    .map_err(|err| int_error(Self::kind(), raw, err))?;
                Ok(())
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }

            fn render(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

int_value! {
    i8 => true,
    i16 => true,
    i32 => true,
    i64 => true,
    isize => true,
    u8 => false,
    u16 => false,
    u32 => false,
    u64 => false,
    usize => false,
}

macro_rules! float_value {
    ($($ty:ty => $bits:expr),* $(,)?) => {$(
        impl Value for $ty {
            fn kind() -> Kind {
                Kind::Float { bits: $bits }
            }

            fn value_kind(&self) -> Kind {
                Self::kind()
            }

            fn set(&mut self, raw: &str) -> Result<(), CoerceError> {
                let parsed = raw.parse::<$ty>().map_err(|_| CoerceError::Parse {
                    kind: Self::kind(),
                    input: raw.to_string(),
                    source: Box::new(FloatSyntax),
                })?;
                // Finite literals too large for the width parse to infinity.
                if parsed.is_infinite() && !raw.to_ascii_lowercase().contains("inf") {
                    return Err(CoerceError::Overflow {
                        kind: Self::kind(),
                        input: raw.to_string(),
                    });
                }
                *self = parsed;
                Ok(())
            }

            fn is_zero(&self) -> bool {
                *self == 0.0
            }

            fn render(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

float_value! {
    f32 => 32,
    f64 => 64,
}

impl Value for Duration {
    fn kind() -> Kind {
        Kind::Duration
    }

    fn value_kind(&self) -> Kind {
        Kind::Duration
    }

    fn set(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = parse_duration(raw).map_err(|err| CoerceError::Parse {
            kind: Kind::Duration,
            input: raw.to_string(),
            source: Box::new(err),
        })?;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        *self == Duration::ZERO
    }

    fn render(&self) -> String {
        format_duration(*self)
    }
}

impl<T: Value + Default> Value for Option<T> {
    fn kind() -> Kind {
        Kind::Pointer(Box::new(T::kind()))
    }

    fn value_kind(&self) -> Kind {
        Self::kind()
    }

    fn set(&mut self, raw: &str) -> Result<(), CoerceError> {
        let allocated = self.is_none();
        let result = self.get_or_insert_with(T::default).set(raw);
        if result.is_err() && allocated {
            *self = None;
        }
        result
    }

    fn set_items(&mut self, items: &[&str]) -> Result<(), CoerceError> {
        let allocated = self.is_none();
        let result = self.get_or_insert_with(T::default).set_items(items);
        if result.is_err() && allocated {
            *self = None;
        }
        result
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn render(&self) -> String {
        self.as_ref().map(Value::render).unwrap_or_default()
    }
}

impl<T: Value + Default> Value for Vec<T> {
    fn kind() -> Kind {
        Kind::Sequence(Box::new(T::kind()))
    }

    fn value_kind(&self) -> Kind {
        Self::kind()
    }

    fn set(&mut self, raw: &str) -> Result<(), CoerceError> {
        if raw.is_empty() {
            return Ok(());
        }
        let items: Vec<&str> = raw.split(SEQUENCE_SEPARATOR).collect();
        self.set_items(&items)
    }

    fn set_items(&mut self, items: &[&str]) -> Result<(), CoerceError> {
        let mut elements = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut element = T::default();
            element
                .set(item)
                .map_err(|source| CoerceError::Element {
                    index,
                    source: Box::new(source),
                })?;
            elements.push(element);
        }
        *self = elements;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn render(&self) -> String {
        self.iter()
            .map(Value::render)
            .collect::<Vec<_>>()
            .join(&SEQUENCE_SEPARATOR.to_string())
    }
}

crate::text_value!(
    chrono::DateTime<chrono::FixedOffset> => "DateTime<FixedOffset>",
    chrono::DateTime<chrono::Utc> => "DateTime<Utc>",
    chrono::NaiveDate => "NaiveDate",
);
