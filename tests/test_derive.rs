use multiconf::{
    EnvLoader, FlagLoader, Kind, Loader, Record, Shape, TagLoader, get_path, set_path, walk,
};
use std::{collections::HashMap, fmt, str::FromStr};

#[derive(Debug, Default, PartialEq)]
enum Level {
    #[default]
    Info,
    Debug,
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            other => Err(format!("unknown level {other}")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Debug => write!(f, "debug"),
        }
    }
}

multiconf::text_value!(Level);

#[derive(Debug, Default, Record)]
#[config(name = "App")]
struct Settings {
    /// Log verbosity.
    ///
    /// One of `info` or `debug`.
    #[config(default = "debug")]
    level: Level,
    #[config(rename = "listen_port", default = 8080)]
    port: u16,
    #[config(default = -5)]
    offset: i32,
    #[config(default = 0.5)]
    ratio: f32,
    token: Option<String>,
    #[config(skip)]
    cache: HashMap<String, String>,
}

#[test]
fn test_record_name_override() {
    assert_eq!(Settings::describe().name, "App");
    assert_eq!(Settings::default().schema().name, "App");
}

#[test]
fn test_doc_comment_collected() {
    let level = &Settings::describe().fields[0];
    assert_eq!(level.doc, "Log verbosity. One of `info` or `debug`.");
    assert_eq!(level.kind(), Some(Kind::Text("Level")));
}

#[test]
fn test_rename_changes_segment() {
    let paths: Vec<String> = walk(Settings::describe()).map(|leaf| leaf.path()).collect();
    assert_eq!(paths, ["level", "listen_port", "offset", "ratio", "token"]);

    let names = EnvLoader::new().env_names(&Settings::default()).unwrap();
    assert_eq!(names[1], "APP_LISTEN_PORT");
}

#[test]
fn test_skip_field_is_opaque() {
    let cache = &Settings::describe().fields[5];
    assert!(cache.hidden);
    assert!(matches!(cache.shape, Shape::Opaque));
}

#[test]
fn test_literal_defaults() {
    let mut settings = Settings::default();
    TagLoader::new().load(&mut settings).unwrap();

    assert_eq!(settings.level, Level::Debug);
    assert_eq!(settings.port, 8080);
    assert_eq!(settings.offset, -5);
    assert_eq!(settings.ratio, 0.5);
    assert_eq!(settings.token, None);
}

#[test]
fn test_custom_text_value_error() {
    let mut settings = Settings::default();
    let err = set_path(&mut settings, "level", "loud").unwrap_err();
    assert!(err.is_parse_error());
    assert!(err.to_string().contains("unknown level loud"));
    assert_eq!(settings.level, Level::Info);
}

#[test]
fn test_pointer_field_from_flag() {
    let mut settings = Settings::default();
    FlagLoader::new()
        .args(["--token", "s3cret", "--listen-port", "9090"])
        .load(&mut settings)
        .unwrap();

    assert_eq!(settings.token.as_deref(), Some("s3cret"));
    assert_eq!(settings.port, 9090);
    assert_eq!(get_path(&settings, "token").unwrap(), "s3cret");
}
