use super::{Loader, apply};
use crate::{
    error::Error,
    field::{Record, Schema},
    naming::{Naming, env_name, leaf_names},
    walk::Leaf,
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Reads fields from environment variables named `PREFIX_FIELD_SUBFIELD`.
///
/// The prefix defaults to the record name. Variables that are unset or empty
/// leave their field untouched.
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    prefix: Option<String>,
    naming: Naming,
    vars: Option<HashMap<String, String>>,
    dotenv: Option<PathBuf>,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix for every variable; an empty prefix means none
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    pub fn camel_case(self) -> Self {
        self.naming(Naming::CamelCase)
    }

    /// Read from the given variables instead of the process environment
    pub fn vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Also read a dotenv file; variables already in the environment take precedence
    pub fn dotenv(mut self, path: impl AsRef<Path>) -> Self {
        self.dotenv = Some(path.as_ref().to_path_buf());
        self
    }

    fn prefix_for(&self, schema: &Schema) -> String {
        self.prefix
            .clone()
            .unwrap_or_else(|| schema.name.to_string())
    }

    /// Generated variable name for every visible leaf of `schema`
    pub fn names(&self, schema: &'static Schema) -> Result<Vec<(Leaf, String)>, Error> {
        let prefix = self.prefix_for(schema);
        leaf_names(schema, |leaf| env_name(&prefix, &leaf.segments, self.naming))
    }

    /// Variable names this loader reads for `record`, in walk order
    pub fn env_names(&self, record: &dyn Record) -> Result<Vec<String>, Error> {
        Ok(self
            .names(record.schema())?
            .into_iter()
            .map(|(_, name)| name)
            .collect())
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match &self.vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }

    fn read_dotenv(&self) -> Result<HashMap<String, String>, Error> {
        let Some(path) = &self.dotenv else {
            return Ok(HashMap::new());
        };
        let entries = dotenvy::from_path_iter(path)?.collect::<Result<HashMap<_, _>, _>>()?;
        tracing::debug!(path = %path.display(), count = entries.len(), "read dotenv file");
        Ok(entries)
    }
}

impl Loader for EnvLoader {
    fn load(&self, record: &mut dyn Record) -> Result<(), Error> {
        let dotenv = self.read_dotenv()?;
        for (leaf, name) in self.names(record.schema())? {
            let value = self
                .lookup(&name)
                .filter(|raw| !raw.is_empty())
                .or_else(|| dotenv.get(&name).cloned());
            match value {
                Some(raw) if !raw.is_empty() => apply(record, &leaf, &raw, "env")?,
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;
    use std::io::Write;

    #[derive(Debug, Default, Record)]
    struct Postgres {
        enabled: bool,
        port: u16,
        hosts: Vec<String>,
        db_name: String,
        availability_ratio: f64,
    }

    #[derive(Debug, Default, Record)]
    struct Server {
        name: String,
        port: u16,
        #[config(nested)]
        postgres: Postgres,
    }

    #[allow(non_snake_case)]
    #[derive(Debug, Default, Record)]
    struct CamelCaseServer {
        AccessKey: String,
        Normal: String,
    }

    #[test]
    fn test_env_with_struct_prefix() {
        let loader = EnvLoader::new().vars([
            ("SERVER_NAME", "koding"),
            ("SERVER_PORT", "6060"),
            ("SERVER_POSTGRES_ENABLED", "true"),
            ("SERVER_POSTGRES_PORT", "5432"),
            ("SERVER_POSTGRES_HOSTS", "192.168.2.1,192.168.2.2,192.168.2.3"),
            ("SERVER_POSTGRES_DB_NAME", "configdb"),
            ("SERVER_POSTGRES_AVAILABILITY_RATIO", "8.23"),
        ]);

        let mut server = Server::default();
        loader.load(&mut server).unwrap();

        assert_eq!(server.name, "koding");
        assert_eq!(server.port, 6060);
        assert!(server.postgres.enabled);
        assert_eq!(server.postgres.port, 5432);
        assert_eq!(
            server.postgres.hosts,
            ["192.168.2.1", "192.168.2.2", "192.168.2.3"]
        );
        assert_eq!(server.postgres.db_name, "configdb");
        assert_eq!(server.postgres.availability_ratio, 8.23);
    }

    #[test]
    fn test_env_with_custom_prefix() {
        let loader = EnvLoader::new()
            .prefix("Prefix")
            .vars([("PREFIX_NAME", "koding"), ("SERVER_PORT", "1")]);

        let mut server = Server::default();
        loader.load(&mut server).unwrap();
        assert_eq!(server.name, "koding");
        assert_eq!(server.port, 0);
    }

    #[test]
    fn test_env_without_prefix() {
        let loader = EnvLoader::new()
            .prefix("")
            .vars([("NAME", "koding"), ("POSTGRES_PORT", "5432")]);

        let mut server = Server::default();
        loader.load(&mut server).unwrap();
        assert_eq!(server.name, "koding");
        assert_eq!(server.postgres.port, 5432);
    }

    #[test]
    fn test_env_camel_case() {
        let loader = EnvLoader::new().camel_case().vars([
            ("CAMELCASESERVER_ACCESS_KEY", "123456"),
            ("CAMELCASESERVER_NORMAL", "normal"),
        ]);

        let mut server = CamelCaseServer::default();
        loader.load(&mut server).unwrap();
        assert_eq!(server.AccessKey, "123456");
        assert_eq!(server.Normal, "normal");
    }

    #[test]
    fn test_env_empty_value_leaves_field() {
        let loader = EnvLoader::new().vars([("SERVER_NAME", "")]);
        let mut server = Server {
            name: "kept".into(),
            ..Default::default()
        };
        loader.load(&mut server).unwrap();
        assert_eq!(server.name, "kept");
    }

    #[test]
    fn test_env_parse_error_names_field() {
        let loader = EnvLoader::new().vars([("SERVER_POSTGRES_PORT", "99999")]);
        let err = loader.load(&mut Server::default()).unwrap_err();
        assert_eq!(err.field_path(), Some("postgres.port"));
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_env_names() {
        let names = EnvLoader::new().env_names(&Server::default()).unwrap();
        assert_eq!(
            names,
            [
                "SERVER_NAME",
                "SERVER_PORT",
                "SERVER_POSTGRES_ENABLED",
                "SERVER_POSTGRES_PORT",
                "SERVER_POSTGRES_HOSTS",
                "SERVER_POSTGRES_DB_NAME",
                "SERVER_POSTGRES_AVAILABILITY_RATIO",
            ]
        );
    }

    #[test]
    fn test_env_flatten_collision() {
        let loader = EnvLoader::new().naming(Naming::Flatten).vars([("SERVER_PORT", "1")]);
        let mut server = Server::default();
        let err = loader.load(&mut server).unwrap_err();
        assert!(matches!(err, Error::NameCollision { .. }));
        assert_eq!(server.port, 0);
    }

    #[test]
    fn test_dotenv_file_fills_gaps() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SERVER_NAME=from-dotenv").unwrap();
        writeln!(file, "SERVER_PORT=7000").unwrap();

        let loader = EnvLoader::new()
            .vars([("SERVER_PORT", "6060")])
            .dotenv(file.path());

        let mut server = Server::default();
        loader.load(&mut server).unwrap();
        assert_eq!(server.name, "from-dotenv");
        assert_eq!(server.port, 6060);
    }

    #[test]
    fn test_empty_var_falls_back_to_dotenv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SERVER_NAME=from-dotenv").unwrap();

        let loader = EnvLoader::new()
            .vars([("SERVER_NAME", "")])
            .dotenv(file.path());

        let mut server = Server::default();
        loader.load(&mut server).unwrap();
        assert_eq!(server.name, "from-dotenv");
    }

    #[test]
    fn test_missing_dotenv_file_is_error() {
        let loader = EnvLoader::new()
            .vars(Vec::<(String, String)>::new())
            .dotenv("/definitely/not/here/.env");
        assert!(matches!(
            loader.load(&mut Server::default()),
            Err(Error::Dotenv(_))
        ));
    }
}
