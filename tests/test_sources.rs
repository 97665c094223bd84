use multiconf::{
    DefaultLoader, EnvLoader, FileLoader, FlagLoader, Format, Loader, MultiLoader, Record,
    TagLoader,
};

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
    #[config(default = "Koding")]
    name: String,
    #[config(default = 6060)]
    port: u16,
    enabled: bool,
    users: Vec<String>,
    #[config(nested)]
    postgres: Postgres,
}

fn assert_testdata(server: &Server) {
    assert_eq!(server.name, "Koding");
    assert_eq!(server.port, 6060);
    assert!(server.enabled);
    assert_eq!(server.users, ["ankara", "istanbul"]);

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
fn test_toml_file() {
    let mut server = Server::default();
    FileLoader::new("testdata/config.toml")
        .load(&mut server)
        .unwrap();
    assert_testdata(&server);
}

#[test]
fn test_json_file() {
    let mut server = Server::default();
    FileLoader::new("testdata/config.json")
        .load(&mut server)
        .unwrap();
    assert_testdata(&server);
}

#[test]
fn test_yaml_file() {
    let mut server = Server::default();
    FileLoader::new("testdata/config.yaml")
        .load(&mut server)
        .unwrap();
    assert_testdata(&server);
}

#[test]
fn test_every_source_in_order() {
    let loader = MultiLoader::new()
        .with(TagLoader::new())
        .with(FileLoader::new("testdata/config.toml"))
        .with(EnvLoader::new().vars([("SERVER_PORT", "7000"), ("SERVER_NAME", "from-env")]))
        .with(FlagLoader::new().args(["--port", "8000", "--postgres-db-name", "flagdb"]));

    let mut server = Server::default();
    loader.load(&mut server).unwrap();

    assert_eq!(server.name, "from-env");
    assert_eq!(server.port, 8000);
    assert_eq!(server.postgres.db_name, "flagdb");
    assert_eq!(server.postgres.port, 5432);
}

#[test]
fn test_default_loader_with_path() {
    let loader = DefaultLoader::with_path("testdata/config.json")
        .env(EnvLoader::new().vars([("SERVER_POSTGRES_ENABLED", "false")]))
        .flag(FlagLoader::new().args(["--enabled=false"]));

    let mut server = Server::default();
    loader.load(&mut server).unwrap();

    assert!(!server.enabled);
    assert!(!server.postgres.enabled);
    assert_eq!(server.users, ["ankara", "istanbul"]);
}

#[test]
fn test_in_memory_yaml_overrides_defaults() {
    let loader = MultiLoader::new()
        .with(TagLoader::new())
        .with(FileLoader::from_contents(Format::Yaml, "port: 9000\n"));

    let mut server = Server::default();
    loader.load(&mut server).unwrap();
    assert_eq!(server.name, "Koding");
    assert_eq!(server.port, 9000);
}

#[test]
fn test_dotenv_with_camel_case_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env");
    std::fs::write(&path, "APP_POSTGRES_DB_NAME=fromdotenv\nAPP_PORT=1234\n").unwrap();

    let loader = EnvLoader::new()
        .prefix("app")
        .camel_case()
        .vars(Vec::<(String, String)>::new())
        .dotenv(&path);

    let mut server = Server::default();
    loader.load(&mut server).unwrap();
    assert_eq!(server.postgres.db_name, "fromdotenv");
    assert_eq!(server.port, 1234);
}
