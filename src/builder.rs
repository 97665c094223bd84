use crate::{
    error::{Error, format_errors},
    field::{Record, get_path},
    loader::{EnvLoader, FileLoader, FlagLoader, Loader, MultiLoader, TagLoader},
    validator::{MultiValidator, RequiredValidator, Validator},
};
use std::path::{Path, PathBuf};

/// The standard source chain plus validation.
///
/// Sources run from lowest to highest precedence: default tags, config
/// files, environment, flags. After loading, every validator runs.
///
/// # Example
/// ```rust
/// use multiconf::{DefaultLoader, EnvLoader, FlagLoader, Record};
///
/// #[derive(Debug, Default, Record)]
/// struct Server {
///     #[config(required)]
///     name: String,
///     #[config(default = 6060)]
///     port: u16,
/// }
///
/// let loader = DefaultLoader::new()
///     .env(EnvLoader::new().vars([("SERVER_NAME", "koding")]))
///     .flag(FlagLoader::new().args(["--port", "8080"]));
///
/// let mut server = Server::default();
/// loader.load(&mut server).unwrap();
/// assert_eq!(server.name, "koding");
/// assert_eq!(server.port, 8080);
/// ```
#[derive(Debug, Clone)]
pub struct DefaultLoader {
    tag: TagLoader,
    files: Vec<FileLoader>,
    env: EnvLoader,
    flag: FlagLoader,
    conf_field: Option<String>,
    required: Vec<RequiredValidator>,
}

impl Default for DefaultLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultLoader {
    /// Default tags, then environment, then flags
    pub fn new() -> Self {
        Self {
            tag: TagLoader::new(),
            files: Vec::new(),
            env: EnvLoader::new(),
            flag: FlagLoader::new(),
            conf_field: None,
            required: vec![RequiredValidator::default()],
        }
    }

    /// Like [`new`](Self::new), with the file at `path` between tags and environment.
    ///
    /// The format follows the extension: `.toml`, `.json`, `.yml` or `.yaml`.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self::new().file(FileLoader::new(path))
    }

    /// Conventional layout for an application named `app`.
    ///
    /// Reads `conf/<app>.json`, `conf/<app>.yml`, `conf/<app>.yaml` and
    /// `conf/<app>.toml` when present, then `<APP>_*` variables and flags, both
    /// with camel case splitting.
    pub fn in_turn(app: &str) -> Self {
        let conf = PathBuf::from("conf");
        let mut loader = Self::new()
            .env(EnvLoader::new().prefix(app).camel_case())
            .flag(FlagLoader::new().camel_case().env_prefix(app));
        for ext in ["json", "yml", "yaml", "toml"] {
            loader = loader.file(FileLoader::new(conf.join(format!("{app}.{ext}"))).optional());
        }
        loader
    }

    /// Add a file source after the ones already configured
    pub fn file(mut self, file: FileLoader) -> Self {
        self.files.push(file);
        self
    }

    pub fn tag(mut self, tag: TagLoader) -> Self {
        self.tag = tag;
        self
    }

    pub fn env(mut self, env: EnvLoader) -> Self {
        self.env = env;
        self
    }

    pub fn flag(mut self, flag: FlagLoader) -> Self {
        self.flag = flag;
        self
    }

    /// Name a string field that may point at one more config file.
    ///
    /// When the field is non-empty after the first pass, that file is loaded
    /// and flags are applied again so they keep the last word.
    pub fn conf_field(mut self, path: impl Into<String>) -> Self {
        self.conf_field = Some(path.into());
        self
    }

    /// Check another required-ness marker, in addition to `required = "true"`
    pub fn require(mut self, validator: RequiredValidator) -> Self {
        self.required.push(validator);
        self
    }

    /// Skip validation entirely
    pub fn without_validation(mut self) -> Self {
        self.required.clear();
        self
    }

    /// The source chain, lowest precedence first
    pub fn loaders(&self) -> MultiLoader {
        let mut loaders = MultiLoader::new().with(self.tag.clone());
        for file in &self.files {
            loaders.push(file.clone());
        }
        loaders.with(self.env.clone()).with(self.flag.clone())
    }

    pub fn validators(&self) -> MultiValidator {
        self.required
            .iter()
            .cloned()
            .fold(MultiValidator::new(), |all, validator| all.with(validator))
    }

    /// Run every source, then every validator
    pub fn load(&self, record: &mut dyn Record) -> Result<(), Error> {
        self.loaders().load(record)?;

        if let Some(field) = &self.conf_field {
            let path = get_path(record, field)?;
            if !path.is_empty() {
                tracing::debug!(path = %path, field = %field, "loading config file named by field");
                FileLoader::new(&path).load(record)?;
                self.flag.load(record)?;
            }
        }

        self.validate(record)
    }

    pub fn validate(&self, record: &dyn Record) -> Result<(), Error> {
        self.validators().validate(record)
    }

    /// Load and validate, panicking with a readable report on failure
    pub fn must_load(&self, record: &mut dyn Record) {
        if let Err(err) = self.load(record) {
            panic!("{}", format_errors(&err));
        }
    }
}
