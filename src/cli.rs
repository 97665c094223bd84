use multiconf::{DefaultLoader, EnvLoader, Error, FlagLoader, Record, format_errors, write_docs};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Record)]
struct Postgres {
    #[config(default = true)]
    enabled: bool,
    /// Port the database listens on
    #[config(default = 5432)]
    port: u16,
    /// Comma separated database hosts
    #[config(required)]
    hosts: Vec<String>,
    #[config(default = "configdb")]
    db_name: String,
    #[config(default = 8.23)]
    availability_ratio: f64,
}

#[derive(Debug, Default, Record)]
struct Server {
    /// Name of the service
    #[config(required)]
    name: String,
    #[config(default = 6060)]
    port: u16,
    #[config(default = "ankara,istanbul")]
    users: Vec<String>,
    #[config(default = "30s")]
    timeout: Duration,
    /// Extra config file to read after the first pass
    conf: String,
    #[config(nested)]
    postgres: Postgres,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    match args.next() {
        Some(command) => match command.as_str() {
            "default" => load_server(args.collect()),
            "envs" => show_env_names(),
            "docs" => generate_docs(),
            _ => println!("unknown command: {command}. Available: default, envs, docs"),
        },
        None => {
            println!("Usage: multiconf-demo [command] [flags...]");
            println!("Commands:");
            println!("  default  - Load the sample server config and print it");
            println!("  envs     - List the environment variables that are read");
            println!("  docs     - Generate CONFIG.md documentation");
        }
    }
}

fn load_server(flags: Vec<String>) {
    let loader = DefaultLoader::new()
        .conf_field("conf")
        .flag(FlagLoader::new().env_prefix("Server").args(flags));

    let mut server = Server::default();
    match loader.load(&mut server) {
        Ok(()) => {
            println!("Config loaded successfully!");
            println!("{server:#?}");
        }
        Err(Error::Flag(err)) => err.exit(),
        Err(err) => {
            eprintln!("{}", format_errors(&err));
            std::process::exit(2);
        }
    }
}

fn show_env_names() {
    match EnvLoader::new().env_names(&Server::default()) {
        Ok(names) => names.iter().for_each(|name| println!("{name}")),
        Err(err) => eprintln!("{}", format_errors(&err)),
    }
}

fn generate_docs() {
    println!("Generating documentation for Server...");
    match write_docs(
        "CONFIG.md",
        Server::describe(),
        &EnvLoader::new(),
        &FlagLoader::new(),
    ) {
        Ok(()) => println!("✓ Documentation written to CONFIG.md"),
        Err(e) => eprintln!("✗ Failed to write documentation: {e}"),
    }
}
