/// Implement [`Value`](crate::Value) for types that decode themselves from text.
///
/// The type must implement `FromStr` (with an error convertible into a boxed
/// error), `Display`, `Default` and `PartialEq`. The raw string is handed to
/// `FromStr` verbatim and its error is carried as the parse cause. The zero
/// value is `Default::default()`.
///
/// ```rust
/// use std::{fmt, str::FromStr};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Level(u8);
///
/// impl FromStr for Level {
///     type Err = String;
///
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.strip_prefix('L')
///             .and_then(|n| n.parse().ok())
///             .map(Level)
///             .ok_or_else(|| format!("expected L<n>, got {s}"))
///     }
/// }
///
/// impl fmt::Display for Level {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "L{}", self.0)
///     }
/// }
///
/// multiconf::text_value!(Level);
/// ```
#[macro_export]
macro_rules! text_value {
    ($($ty:ty => $name:expr),+ $(,)?) => {$(
        impl $crate::Value for $ty {
            fn kind() -> $crate::Kind {
                $crate::Kind::Text($name)
            }

            fn value_kind(&self) -> $crate::Kind {
                $crate::Kind::Text($name)
            }

            fn set(&mut self, raw: &str) -> ::std::result::Result<(), $crate::CoerceError> {
                *self = raw.parse::<$ty>().map_err(|err| $crate::CoerceError::Parse {
                    kind: $crate::Kind::Text($name),
                    input: raw.to_string(),
                    source: ::std::convert::Into::into(err),
                })?;
                Ok(())
            }

            fn is_zero(&self) -> bool {
                *self == <$ty as ::std::default::Default>::default()
            }

            fn render(&self) -> String {
                self.to_string()
            }
        }
    )+};
    ($($ty:ty),+ $(,)?) => {
        $crate::text_value!($($ty => stringify!($ty)),+);
    };
}
