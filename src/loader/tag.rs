use super::{Loader, apply};
use crate::{
    error::Error,
    field::{DEFAULT_TAG, Record},
    walk::walk,
};

/// Writes each field's default tag, e.g. `#[config(default = "6060")]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLoader {
    tag: String,
}

impl Default for TagLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TagLoader {
    pub fn new() -> Self {
        Self::with_tag(DEFAULT_TAG)
    }

    /// Read defaults from another tag, e.g. `tag(dev_default = "...")`
    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl Loader for TagLoader {
    fn load(&self, record: &mut dyn Record) -> Result<(), Error> {
        for leaf in walk(record.schema()) {
            match leaf.def.tag(&self.tag) {
                Some(raw) if !raw.is_empty() => apply(record, &leaf, raw, "tag")?,
                _ => {}
            }
        }
        Ok(())
    }
}
