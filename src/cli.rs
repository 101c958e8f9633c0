use config_bindr::{describe, format_docs, write_docs, Bind, ConfigLoader};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Bind, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    /// Database user name
    #[env("DB_USER")]
    pub user: String,
    /// Database password
    #[env("DB_PASSWORD")]
    pub password: String,
    /// Database name
    #[env("DB_NAME")]
    pub name: String,
}

#[derive(Bind, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    /// Listen port
    #[env("SERVER_PORT")]
    pub port: u16,
    /// Listen host
    #[env("SERVER_HOST")]
    pub host: String,
    /// Request timeout, e.g. 30s or 1m30s
    #[env("SERVER_TIMEOUT")]
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
}

#[derive(Bind, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub server: Server,
    pub database: Database,
    /// Comma-separated feature flags
    #[env("FEATURES")]
    pub features: Vec<String>,
    /// Enable debug output
    #[env("DEBUG")]
    pub debug: bool,
}

/// Durations as whole milliseconds in TOML
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("load") => load(args.get(1).map(String::as_str).unwrap_or("")),
        Some("docs") => generate_docs(),
        Some("bindings") => show_bindings(),
        Some(arg) => println!(
            "unknown arg: {}. Available: load, docs, bindings",
            arg
        ),
        None => {
            println!("Usage: util-cli [command]");
            println!("Commands:");
            println!("  load [path] - Load DemoConfig from a TOML file, then test.env and the environment");
            println!("  docs        - Generate CONFIG.md documentation");
            println!("  bindings    - Show every bound environment variable");
        }
    };
}

fn load(path: &str) {
    let mut loader = ConfigLoader::new().dotenv("./test.env");
    if !path.is_empty() {
        loader = loader.file(path);
    }

    match loader.load::<DemoConfig>() {
        Ok(config) => {
            println!("Config loaded successfully!");
            println!("  server.host: {}", config.server.host);
            println!("  server.port: {}", config.server.port);
            println!("  server.timeout: {:?}", config.server.timeout);
            println!("  database.user: {}", config.database.user);
            println!("  database.name: {}", config.database.name);
            println!("  features: {:?}", config.features);
            println!("  debug: {}", config.debug);
        }
        Err(e) => {
            eprintln!("Failed to load config:");
            eprintln!("\t- {}", e);
            std::process::exit(1);
        }
    }
}

fn generate_docs() {
    println!("Generating documentation for DemoConfig...");
    match write_docs::<DemoConfig>("CONFIG.md") {
        Ok(_) => println!("✓ Documentation written to CONFIG.md"),
        Err(e) => eprintln!("✗ Failed to write documentation: {}", e),
    }
}

fn show_bindings() {
    match describe::<DemoConfig>() {
        Ok(bindings) => print!("{}", format_docs(&bindings)),
        Err(e) => eprintln!("✗ Failed to describe DemoConfig: {}", e),
    }
}
