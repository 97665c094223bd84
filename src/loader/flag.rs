use super::{Loader, apply};
use crate::{
    error::Error,
    field::{Record, Schema},
    naming::{Naming, env_name, flag_name, leaf_names},
    walk::Leaf,
};
use clap::{Arg, ArgAction, Command};
use std::ffi::OsString;

const POSITIONAL: &str = "__positional";
const HELP: &str = "help";

/// Reads fields from command line flags generated from the schema.
///
/// `postgres.db_name` becomes `--postgres-db-name <string>`. Boolean fields
/// also accept a bare `--flag`, meaning `true`, and `--flag=false`. Only flags
/// present on the command line with a non-empty value are written, the last
/// occurrence of a repeated flag wins, and positional arguments are ignored.
#[derive(Debug, Clone, Default)]
pub struct FlagLoader {
    prefix: Option<String>,
    naming: Naming,
    env_prefix: Option<String>,
    args: Option<Vec<OsString>>,
}

impl FlagLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix for every flag, e.g. `app` gives `--app-port`
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

    /// Mention the matching environment variable in each flag's help
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Parse these arguments (program name excluded) instead of the process arguments
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Generated flag name (without dashes) for every visible leaf of `schema`
    pub fn names(&self, schema: &'static Schema) -> Result<Vec<(Leaf, String)>, Error> {
        leaf_names(schema, |leaf| {
            flag_name(self.prefix.as_deref(), &leaf.segments, self.naming)
        })
    }

    fn help(&self, leaf: &Leaf, name: &str) -> String {
        let mut help = if leaf.def.doc.is_empty() {
            format!("Change value of {name}.")
        } else {
            leaf.def.doc.to_string()
        };
        if let Some(prefix) = &self.env_prefix {
            let env = env_name(prefix, &leaf.segments, self.naming);
            help.push_str(&format!(" [env: {env}]"));
        }
        help
    }

    /// The command line parser this loader uses for `schema`
    pub fn command(&self, schema: &'static Schema) -> Result<Command, Error> {
        let names = self.names(schema)?;
        let mut command = Command::new(schema.name)
            .no_binary_name(true)
            .disable_version_flag(true)
            .disable_help_flag(true)
            .args_override_self(true)
            .arg(
                Arg::new(POSITIONAL)
                    .num_args(1..)
                    .action(ArgAction::Append)
                    .hide(true),
            );
        // A leaf named `help` takes over `--help`.
        if !names.iter().any(|(_, name)| name == HELP) {
            command = command.arg(
                Arg::new(HELP)
                    .short('h')
                    .long(HELP)
                    .help("Print help")
                    .action(ArgAction::Help),
            );
        }

        for (leaf, name) in names {
            let kind = leaf.def.kind();
            let mut arg = Arg::new(name.clone())
                .long(name.clone())
                .help(self.help(&leaf, &name))
                .action(ArgAction::Set);
            match kind {
                Some(kind) if kind.is_bool() => {
                    arg = arg
                        .num_args(0..=1)
                        .require_equals(true)
                        .default_missing_value("true");
                }
                Some(kind) => {
                    arg = arg.value_name(kind.to_string()).allow_hyphen_values(true);
                }
                None => {}
            }
            command = command.arg(arg);
        }
        Ok(command)
    }
}

impl Loader for FlagLoader {
    fn load(&self, record: &mut dyn Record) -> Result<(), Error> {
        let schema = record.schema();
        let command = self.command(schema)?;
        let matches = match &self.args {
            Some(args) => command.try_get_matches_from(args.iter())?,
            None => command.try_get_matches_from(std::env::args_os().skip(1))?,
        };

        for (leaf, name) in self.names(schema)? {
            match matches.get_one::<String>(&name) {
                Some(raw) if !raw.is_empty() => apply(record, &leaf, raw, "flag")?,
                _ => {}
            }
        }
        Ok(())
    }
}
