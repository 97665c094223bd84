//! Sources that write string values into a record.
//!
//! Every source implements [`Loader`]. A source that has no value for a field
//! leaves it untouched, so running several of them in order layers their values.

mod env;
mod file;
mod flag;
mod tag;

pub use env::EnvLoader;
pub use file::{FileLoader, Format};
pub use flag::FlagLoader;
pub use tag::TagLoader;

use crate::{
    error::Error,
    field::{Record, value_at_mut},
    walk::Leaf,
};

/// A configuration source
pub trait Loader {
    /// Write every value this source has into `record`
    fn load(&self, record: &mut dyn Record) -> Result<(), Error>;
}

/// Runs loaders in order against the same record, stopping at the first error.
///
/// Later loaders overwrite what earlier ones wrote. Nothing is rolled back on
/// failure.
#[derive(Default)]
pub struct MultiLoader {
    loaders: Vec<Box<dyn Loader>>,
}

impl MultiLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, loader: impl Loader + 'static) -> Self {
        self.push(loader);
        self
    }

    pub fn push(&mut self, loader: impl Loader + 'static) {
        self.loaders.push(Box::new(loader));
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl Loader for MultiLoader {
    fn load(&self, record: &mut dyn Record) -> Result<(), Error> {
        for loader in &self.loaders {
            loader.load(record)?;
        }
        Ok(())
    }
}

impl<F> Loader for F
where
    F: Fn(&mut dyn Record) -> Result<(), Error>,
{
    fn load(&self, record: &mut dyn Record) -> Result<(), Error> {
        self(record)
    }
}

/// Convert `raw` into the slot of `leaf`, naming the field on failure
pub(crate) fn apply(
    record: &mut dyn Record,
    leaf: &Leaf,
    raw: &str,
    source: &'static str,
) -> Result<(), Error> {
    let value = value_at_mut(record, &leaf.indices)
        .ok_or_else(|| Error::UnknownField(leaf.path()))?;
    value
        .set(raw)
        .map_err(|err| Error::field(leaf.path(), err))?;
    tracing::trace!(field = %leaf.path(), source, "applied value");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Record, set_path};

    #[derive(Debug, Default, Record)]
    struct Server {
        name: String,
        port: u16,
    }

    fn set(path: &'static str, raw: &'static str) -> impl Loader {
        move |record: &mut dyn Record| set_path(record, path, raw)
    }

    #[test]
    fn test_later_loader_wins() {
        let loaders = MultiLoader::new()
            .with(set("name", "first"))
            .with(set("name", "second"));

        let mut server = Server::default();
        loaders.load(&mut server).unwrap();
        assert_eq!(server.name, "second");
    }

    #[test]
    fn test_stops_at_first_error_without_rollback() {
        let loaders = MultiLoader::new()
            .with(set("name", "koding"))
            .with(set("port", "not-a-port"))
            .with(set("name", "never"));

        let mut server = Server::default();
        let err = loaders.load(&mut server).unwrap_err();

        assert_eq!(err.field_path(), Some("port"));
        assert_eq!(server.name, "koding");
    }

    #[test]
    fn test_empty_multi_loader() {
        let loaders = MultiLoader::new();
        assert!(loaders.is_empty());
        assert_eq!(loaders.len(), 0);

        let mut server = Server::default();
        loaders.load(&mut server).unwrap();
        assert_eq!(server.port, 0);
    }
}
