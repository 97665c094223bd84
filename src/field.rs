use crate::{
    error::{CoerceError, Error},
    kind::Kind,
    value::Value,
};

/// Tag holding the text a field is initialised with
pub const DEFAULT_TAG: &str = "default";

/// Static description of a record type, built once per type by `#[derive(Record)]`
#[derive(Debug)]
pub struct Schema {
    /// Record name, used as the default environment prefix
    pub name: &'static str,
    /// Fields in declaration order, hidden ones included
    pub fields: &'static [FieldDef],
}

/// Description of a single field of a record
#[derive(Debug)]
pub struct FieldDef {
    /// Path segment for this field
    pub name: &'static str,
    /// Human-readable description, empty when undocumented
    pub doc: &'static str,
    /// Hidden fields are invisible to every loader and to validation
    pub hidden: bool,
    pub shape: Shape,
    /// `(name, value)` pairs such as `("default", "6060")` or `("required", "true")`
    pub tags: &'static [(&'static str, &'static str)],
}

/// What a field holds
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// A value written from text
    Leaf(fn() -> Kind),
    /// A nested record, populated field by field
    Record(fn() -> &'static Schema),
    /// A hidden field the engine knows nothing about
    Opaque,
}

impl FieldDef {
    pub fn tag(&self, name: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn default_value(&self) -> Option<&'static str> {
        self.tag(DEFAULT_TAG)
    }

    pub fn nested(&self) -> Option<&'static Schema> {
        match self.shape {
            Shape::Record(schema) => Some(schema()),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<Kind> {
        match self.shape {
            Shape::Leaf(kind) => Some(kind()),
            Shape::Record(schema) => Some(Kind::Record(schema().name)),
            Shape::Opaque => None,
        }
    }
}

impl Schema {
    /// Visible field by path segment
    pub fn field(&self, name: &str) -> Option<(usize, &'static FieldDef)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| !field.hidden && field.name == name)
    }
}

/// Shared access to a field of a record instance
pub enum Slot<'a> {
    Value(&'a dyn Value),
    Record(&'a dyn Record),
}

/// Mutable access to a field of a record instance
pub enum SlotMut<'a> {
    Value(&'a mut dyn Value),
    Record(&'a mut dyn Record),
}

/// A configuration struct whose fields can be enumerated and written.
///
/// Implement with `#[derive(Record)]`. Field indices follow
/// [`Schema::fields`]; hidden fields have no slot.
pub trait Record {
    fn describe() -> &'static Schema
    where
        Self: Sized;

    fn schema(&self) -> &'static Schema;

    fn field(&self, index: usize) -> Option<Slot<'_>>;

    fn field_mut(&mut self, index: usize) -> Option<SlotMut<'_>>;
}

/// Leaf value at the given index path
pub fn value_at<'a>(record: &'a dyn Record, indices: &[usize]) -> Option<&'a dyn Value> {
    let (first, rest) = indices.split_first()?;
    match record.field(*first)? {
        Slot::Value(value) if rest.is_empty() => Some(value),
        Slot::Record(nested) => value_at(nested, rest),
        Slot::Value(_) => None,
    }
}

/// Mutable leaf value at the given index path
pub fn value_at_mut<'a>(
    record: &'a mut dyn Record,
    indices: &[usize],
) -> Option<&'a mut dyn Value> {
    let (first, rest) = indices.split_first()?;
    match record.field_mut(*first)? {
        SlotMut::Value(value) if rest.is_empty() => Some(value),
        SlotMut::Record(nested) => value_at_mut(nested, rest),
        SlotMut::Value(_) => None,
    }
}

/// Convert `raw` into the field at the dotted `path`, e.g. `"postgres.port"`
pub fn set_path(record: &mut dyn Record, path: &str, raw: &str) -> Result<(), Error> {
    let mut current = record;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let (index, def) = current
            .schema()
            .field(segment)
            .ok_or_else(|| Error::UnknownField(path.to_string()))?;
        let last = segments.peek().is_none();
        match current.field_mut(index) {
            Some(SlotMut::Value(value)) if last => {
                return value.set(raw).map_err(|source| Error::field(path, source));
            }
            Some(SlotMut::Record(nested)) if !last => current = nested,
            Some(SlotMut::Record(_)) => {
                let kind = def.kind().unwrap_or(Kind::Record(def.name));
                return Err(Error::field(path, CoerceError::Unsupported { kind }));
            }
            _ => return Err(Error::UnknownField(path.to_string())),
        }
    }
    Err(Error::UnknownField(path.to_string()))
}

/// Render the field at the dotted `path` in the syntax `set_path` accepts
pub fn get_path(record: &dyn Record, path: &str) -> Result<String, Error> {
    let mut current = record;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let (index, def) = current
            .schema()
            .field(segment)
            .ok_or_else(|| Error::UnknownField(path.to_string()))?;
        let last = segments.peek().is_none();
        match current.field(index) {
            Some(Slot::Value(value)) if last => return Ok(value.render()),
            Some(Slot::Record(nested)) if !last => current = nested,
            Some(Slot::Record(_)) => {
                let kind = def.kind().unwrap_or(Kind::Record(def.name));
                return Err(Error::field(path, CoerceError::Unsupported { kind }));
            }
            _ => return Err(Error::UnknownField(path.to_string())),
        }
    }
    Err(Error::UnknownField(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;

    #[derive(Debug, Default, Record)]
    struct Postgres {
        #[config(default = "5432")]
        port: u16,
        hosts: Vec<String>,
    }

    #[derive(Debug, Default, Record)]
    struct Server {
        /// Service name
        #[config(required)]
        name: String,
        #[config(nested)]
        postgres: Postgres,
        #[config(skip)]
        secret: String,
    }

    #[test]
    fn test_schema_shape() {
        let schema = Server::describe();
        assert_eq!(schema.name, "Server");
        assert_eq!(schema.fields.len(), 3);

        let name = &schema.fields[0];
        assert_eq!(name.name, "name");
        assert_eq!(name.doc, "Service name");
        assert_eq!(name.tag("required"), Some("true"));
        assert_eq!(name.kind(), Some(Kind::String));

        assert_eq!(schema.fields[1].nested().map(|s| s.name), Some("Postgres"));
        assert!(schema.fields[2].hidden);
        assert!(schema.fields[2].kind().is_none());
    }

    #[test]
    fn test_default_tag() {
        let port = &Postgres::describe().fields[0];
        assert_eq!(port.default_value(), Some("5432"));
        assert_eq!(Postgres::describe().fields[1].default_value(), None);
    }

    #[test]
    fn test_hidden_field_has_no_slot() {
        let mut server = Server::default();
        assert!(server.field(2).is_none());
        assert!(server.field_mut(2).is_none());
        assert!(Server::describe().field("secret").is_none());
    }

    #[test]
    fn test_set_path_nested() {
        let mut server = Server::default();
        set_path(&mut server, "postgres.port", "6543").unwrap();
        set_path(&mut server, "name", "koding").unwrap();

        assert_eq!(server.postgres.port, 6543);
        assert_eq!(server.name, "koding");
        assert_eq!(get_path(&server, "postgres.port").unwrap(), "6543");
    }

    #[test]
    fn test_set_path_record_is_unsupported() {
        let mut server = Server::default();
        let err = set_path(&mut server, "postgres", "x").unwrap_err();
        assert!(err.is_unsupported());
        assert!(err.to_string().contains("record Postgres"));
    }

    #[test]
    fn test_set_path_unknown() {
        let mut server = Server::default();
        assert!(matches!(
            set_path(&mut server, "postgres.nope", "1"),
            Err(Error::UnknownField(_))
        ));
        assert!(matches!(
            set_path(&mut server, "name.inner", "1"),
            Err(Error::UnknownField(_))
        ));
        assert!(matches!(
            set_path(&mut server, "secret", "1"),
            Err(Error::UnknownField(_))
        ));
    }

    #[test]
    fn test_set_path_parse_error_names_path() {
        let mut server = Server::default();
        let err = set_path(&mut server, "postgres.port", "70000").unwrap_err();
        assert_eq!(err.field_path(), Some("postgres.port"));
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_value_at() {
        let mut server = Server::default();
        server.postgres.hosts = vec!["a".into(), "b".into()];

        let hosts = value_at(&server, &[1, 1]).unwrap();
        assert_eq!(hosts.render(), "a,b");
        assert!(value_at(&server, &[1]).is_none());

        value_at_mut(&mut server, &[0]).unwrap().set("x").unwrap();
        assert_eq!(server.name, "x");
    }
}
