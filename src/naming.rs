use crate::{
    error::Error,
    field::Schema,
    walk::{Leaf, walk},
};
use std::collections::HashMap;

/// How walker segments are combined into an env or flag name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Naming {
    /// Every segment, parent first: `POSTGRES_PORT`
    #[default]
    Plain,
    /// Only the innermost segment: `PORT`
    Flatten,
    /// Every segment, each split on case changes: `POSTGRES_DB_NAME` for `DBName`
    CamelCase,
}

impl Naming {
    pub fn join(&self, segments: &[&str], separator: &str) -> String {
        match self {
            Naming::Plain => segments.join(separator),
            Naming::Flatten => segments.last().copied().unwrap_or_default().to_string(),
            Naming::CamelCase => segments
                .iter()
                .map(|segment| split_camel_case(segment).join(separator))
                .collect::<Vec<_>>()
                .join(separator),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
    Other,
}

fn class_of(c: char) -> CharClass {
    if c.is_lowercase() {
        CharClass::Lower
    } else if c.is_uppercase() {
        CharClass::Upper
    } else if c.is_numeric() {
        CharClass::Digit
    } else {
        CharClass::Other
    }
}

/// Split an identifier into words on case changes, digits, `_` and `-`.
///
/// `"DBName"` becomes `["DB", "Name"]`, `"AvailabilityRatio"` becomes
/// `["Availability", "Ratio"]`.
pub fn split_camel_case(ident: &str) -> Vec<String> {
    let mut runs: Vec<(CharClass, Vec<char>)> = Vec::new();
    for c in ident.chars() {
        if c == '_' || c == '-' {
            runs.push((CharClass::Other, Vec::new()));
            continue;
        }
        let class = class_of(c);
        match runs.last_mut() {
            Some((last, chars)) if *last == class && !chars.is_empty() => chars.push(c),
            _ => runs.push((class, vec![c])),
        }
    }

    // An upper run followed by a lower run lends its last letter: "DBN" + "ame".
    for i in 0..runs.len().saturating_sub(1) {
        if runs[i].0 == CharClass::Upper && runs[i + 1].0 == CharClass::Lower {
            if let Some(c) = runs[i].1.pop() {
                runs[i + 1].1.insert(0, c);
            }
        }
    }

    runs.into_iter()
        .filter(|(_, chars)| !chars.is_empty())
        .map(|(_, chars)| chars.into_iter().collect())
        .collect()
}

/// Environment variable name: `PREFIX_SEGMENTS`, uppercased
pub fn env_name(prefix: &str, segments: &[&str], naming: Naming) -> String {
    let body = naming.join(segments, "_");
    if prefix.is_empty() {
        body.to_uppercase()
    } else {
        format!("{}_{}", prefix, body).to_uppercase()
    }
}

/// Flag name without dashes: `prefix-segments`, lowercased, `_` rendered as `-`
pub fn flag_name(prefix: Option<&str>, segments: &[&str], naming: Naming) -> String {
    let body = naming.join(segments, "-");
    let name = match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}-{body}"),
        _ => body,
    };
    name.to_lowercase().replace('_', "-")
}

/// Pair every visible leaf of `schema` with its generated name, rejecting duplicates
pub fn leaf_names(
    schema: &'static Schema,
    mut name_of: impl FnMut(&Leaf) -> String,
) -> Result<Vec<(Leaf, String)>, Error> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut out = Vec::new();
    for leaf in walk(schema) {
        let name = name_of(&leaf);
        if let Some(first) = seen.insert(name.clone(), leaf.path()) {
            return Err(Error::NameCollision {
                name,
                first,
                second: leaf.path(),
            });
        }
        out.push((leaf, name));
    }
    Ok(out)
}
