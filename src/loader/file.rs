use super::Loader;
use crate::{
    error::{CoerceError, Error},
    field::{Record, Schema, SlotMut},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Structured file formats a [`FileLoader`] decodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
    Yaml,
}

impl Format {
    /// Format implied by the file extension
    pub fn from_path(path: &Path) -> Option<Format> {
        match path.extension()?.to_str()? {
            "toml" => Some(Format::Toml),
            "json" => Some(Format::Json),
            "yml" | "yaml" => Some(Format::Yaml),
            _ => None,
        }
    }
}

/// Decoded document, reduced to what the coercion engine consumes
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Null,
    Scalar(String),
    List(Vec<Node>),
    Table(Vec<(String, Node)>),
}

impl From<toml::Value> for Node {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Node::Scalar(s),
            toml::Value::Integer(i) => Node::Scalar(i.to_string()),
            toml::Value::Float(f) => Node::Scalar(f.to_string()),
            toml::Value::Boolean(b) => Node::Scalar(b.to_string()),
            toml::Value::Datetime(d) => Node::Scalar(d.to_string()),
            toml::Value::Array(items) => Node::List(items.into_iter().map(Node::from).collect()),
            toml::Value::Table(table) => Node::Table(
                table
                    .into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Node::Null,
            serde_json::Value::Bool(b) => Node::Scalar(b.to_string()),
            serde_json::Value::Number(n) => Node::Scalar(n.to_string()),
            serde_json::Value::String(s) => Node::Scalar(s),
            serde_json::Value::Array(items) => {
                Node::List(items.into_iter().map(Node::from).collect())
            }
            serde_json::Value::Object(map) => Node::Table(
                map.into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_yaml_ng::Value> for Node {
    fn from(value: serde_yaml_ng::Value) -> Self {
        use serde_yaml_ng::Value;
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Scalar(b.to_string()),
            Value::Number(n) => Node::Scalar(n.to_string()),
            Value::String(s) => Node::Scalar(s),
            Value::Sequence(items) => Node::List(items.into_iter().map(Node::from).collect()),
            Value::Mapping(map) => Node::Table(
                map.into_iter()
                    .filter_map(|(key, value)| {
                        let key = match key {
                            Value::String(s) => s,
                            Value::Number(n) => n.to_string(),
                            Value::Bool(b) => b.to_string(),
                            _ => return None,
                        };
                        Some((key, Node::from(value)))
                    })
                    .collect(),
            ),
            Value::Tagged(tagged) => Node::from(tagged.value),
        }
    }
}

/// Reads fields from a TOML, JSON or YAML document shaped like the record.
///
/// Keys match field names ignoring case, `_` and `-`. Unknown keys are
/// ignored, `null` leaves a field untouched and tables descend into nested
/// records.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    path: Option<PathBuf>,
    contents: Option<String>,
    format: Option<Format>,
    optional: bool,
}

impl FileLoader {
    /// Load `path`, choosing the format from its extension
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    pub fn toml(path: impl AsRef<Path>) -> Self {
        Self::new(path).format(Format::Toml)
    }

    pub fn json(path: impl AsRef<Path>) -> Self {
        Self::new(path).format(Format::Json)
    }

    pub fn yaml(path: impl AsRef<Path>) -> Self {
        Self::new(path).format(Format::Yaml)
    }

    /// Decode an in-memory document instead of a file
    pub fn from_contents(format: Format, contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            format: Some(format),
            ..Default::default()
        }
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Skip silently when the file does not exist
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn read(&self) -> Result<Option<(PathBuf, String)>, Error> {
        if let Some(contents) = &self.contents {
            return Ok(Some((PathBuf::from("<memory>"), contents.clone())));
        }
        let path = match &self.path {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => return Err(Error::PathNotSet),
        };
        let resolved = match resolve(path) {
            Ok(resolved) => resolved,
            Err(Error::FileNotFound(_)) if self.optional => {
                tracing::debug!(path = %path.display(), "optional config file not found, skipping");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let contents = fs::read_to_string(&resolved).map_err(|source| Error::Io {
            path: resolved.clone(),
            source,
        })?;
        tracing::debug!(path = %resolved.display(), "loading config file");
        Ok(Some((resolved, contents)))
    }
}

/// Relative to the working directory first, then as given
fn resolve(path: &Path) -> Result<PathBuf, Error> {
    if let Ok(cwd) = std::env::current_dir() {
        let joined = cwd.join(path);
        if joined.exists() {
            return Ok(joined);
        }
    }
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    Err(Error::FileNotFound(path.to_path_buf()))
}

fn parse(format: Format, path: &Path, contents: &str) -> Result<Node, Error> {
    let node = match format {
        Format::Toml => toml::from_str::<toml::Table>(contents)
            .map(|table| Node::from(toml::Value::Table(table)))
            .map_err(|source| Error::Toml {
                path: path.to_path_buf(),
                source,
            })?,
        Format::Json => serde_json::from_str::<serde_json::Value>(contents)
            .map(Node::from)
            .map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            })?,
        Format::Yaml => serde_yaml_ng::from_str::<serde_yaml_ng::Value>(contents)
            .map(Node::from)
            .map_err(|source| Error::Yaml {
                path: path.to_path_buf(),
                source,
            })?,
    };
    Ok(node)
}

fn normalize(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn find_field(schema: &Schema, key: &str) -> Option<usize> {
    let wanted = normalize(key);
    schema
        .fields
        .iter()
        .position(|field| !field.hidden && normalize(field.name) == wanted)
}

fn qualify(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn apply_table(
    record: &mut dyn Record,
    parent: &str,
    entries: Vec<(String, Node)>,
) -> Result<(), Error> {
    let schema = record.schema();
    for (key, node) in entries {
        let Some(index) = find_field(schema, &key) else {
            tracing::debug!(key = %qualify(parent, &key), "ignoring unknown config key");
            continue;
        };
        let def = &schema.fields[index];
        let path = qualify(parent, def.name);
        match (record.field_mut(index), node) {
            (_, Node::Null) | (None, _) => {}
            (Some(SlotMut::Record(nested)), Node::Table(entries)) => {
                apply_table(nested, &path, entries)?;
            }
            (Some(SlotMut::Record(nested)), _) => {
                let kind = crate::kind::Kind::Record(nested.schema().name);
                return Err(Error::field(path, CoerceError::Unsupported { kind }));
            }
            (Some(SlotMut::Value(_)), Node::Scalar(raw)) if raw.is_empty() => {}
            (Some(SlotMut::Value(value)), Node::Scalar(raw)) => {
                value.set(&raw).map_err(|err| Error::field(&path, err))?;
                tracing::trace!(field = %path, source = "file", "applied value");
            }
            (Some(SlotMut::Value(value)), Node::List(items)) => {
                let mut scalars = Vec::with_capacity(items.len());
                for item in &items {
                    match item {
                        Node::Scalar(raw) => scalars.push(raw.as_str()),
                        _ => {
                            let err = CoerceError::Shape {
                                kind: value.value_kind(),
                                found: "nested list or table",
                            };
                            return Err(Error::field(path, err));
                        }
                    }
                }
                value
                    .set_items(&scalars)
                    .map_err(|err| Error::field(&path, err))?;
                tracing::trace!(field = %path, source = "file", "applied value");
            }
            (Some(SlotMut::Value(value)), Node::Table(_)) => {
                let err = CoerceError::Shape {
                    kind: value.value_kind(),
                    found: "table",
                };
                return Err(Error::field(path, err));
            }
        }
    }
    Ok(())
}

impl Loader for FileLoader {
    fn load(&self, record: &mut dyn Record) -> Result<(), Error> {
        let Some((path, contents)) = self.read()? else {
            return Ok(());
        };
        let format = self
            .format
            .or_else(|| Format::from_path(&path))
            .ok_or_else(|| Error::UnknownFormat(path.clone()))?;

        match parse(format, &path, &contents)? {
            Node::Table(entries) => apply_table(record, "", entries),
            Node::Null => Ok(()),
            _ => Err(Error::NotATable(path)),
        }
    }
}
