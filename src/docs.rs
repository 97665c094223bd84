use crate::{
    error::Error,
    field::Schema,
    kind::Kind,
    loader::{EnvLoader, FlagLoader},
    validator::RequiredValidator,
};
use std::{fs, path::Path};

/// What a user needs to know to set one leaf
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldSummary {
    /// Dotted field path
    pub path: String,
    pub env: String,
    /// Flag name without the leading dashes
    pub flag: String,
    pub kind: Kind,
    pub default: Option<String>,
    pub required: bool,
    pub doc: String,
}

/// Describe every visible leaf of `schema` as `env` and `flag` would name it
pub fn summarize(
    schema: &'static Schema,
    env: &EnvLoader,
    flag: &FlagLoader,
) -> Result<Vec<FieldSummary>, Error> {
    let required = RequiredValidator::default();
    let flags = flag.names(schema)?;

    env.names(schema)?
        .into_iter()
        .zip(flags)
        .map(|((leaf, env), (_, flag))| {
            let kind = leaf.def.kind().ok_or_else(|| Error::UnknownField(leaf.path()))?;
            Ok(FieldSummary {
                path: leaf.path(),
                env,
                flag,
                kind,
                default: leaf.def.default_value().map(str::to_string),
                required: leaf.def.tag(&required.tag_name) == Some(required.tag_value.as_str()),
                doc: leaf.def.doc.to_string(),
            })
        })
        .collect()
}

/// Render summaries as a Markdown table
pub fn render_markdown(title: &str, fields: &[FieldSummary]) -> String {
    let mut md = String::new();

    md.push_str(&format!("## {title}\n\n"));
    md.push_str("| Field | Variable | Flag | Type | Required | Description | Default |\n");
    md.push_str("|-------|----------|------|------|----------|-------------|---------|\n");
    for field in fields {
        let required_str = if field.required { "Yes" } else { "No" };
        let default_display = match field.default.as_deref() {
            None | Some("") => "-",
            Some(default) => default,
        };
        md.push_str(&format!(
            "| {} | {} | --{} | {} | {} | {} | {} |\n",
            field.path, field.env, field.flag, field.kind, required_str, field.doc, default_display
        ));
    }
    md
}

/// Write configuration documentation for `schema` to a Markdown file
pub fn write_docs(
    path: impl AsRef<Path>,
    schema: &'static Schema,
    env: &EnvLoader,
    flag: &FlagLoader,
) -> Result<(), Error> {
    let path = path.as_ref();
    let fields = summarize(schema, env, flag)?;
    let title = format!("{} Configuration", schema.name);
    fs::write(path, render_markdown(&title, &fields)).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
