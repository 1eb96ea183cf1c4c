use std::fmt;
use std::path::PathBuf;

use client::FileKvStore;
use client::api::DEFAULT_SERVER_URL;
use server::config::ServerConfig;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};

mod play;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPort { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid --port value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- serve [--port <port>] [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- play  [--server <url>] [--data-dir <dir>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --port 5000");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --server {DEFAULT_SERVER_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_PORT, QUIZ_DB_URL, OPENAI_API_KEY, QUIZ_AI_BASE_URL, QUIZ_AI_MODEL,");
    eprintln!("  QUIZ_AI_TIMEOUT_SECS, QUIZ_SERVER_URL, QUIZ_CLIENT_DIR, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Serve,
    Play,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "serve" => Some(Self::Serve),
            "play" => Some(Self::Play),
            _ => None,
        }
    }
}

fn parse_serve(
    args: &mut impl Iterator<Item = String>,
    mut config: ServerConfig,
) -> Result<ServerConfig, ArgsError> {
    config.db_url = normalize_sqlite_url(config.db_url);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                let value = require_value(args, "--port")?;
                config.port = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidPort { raw: value.clone() })?;
            }
            "--db" => {
                let value = require_value(args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                config.db_url = normalize_sqlite_url(value);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }

    Ok(config)
}

struct PlayArgs {
    server_url: String,
    data_dir: PathBuf,
}

impl PlayArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut server_url =
            std::env::var("QUIZ_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.into());
        let mut data_dir = std::env::var("QUIZ_CLIENT_DIR")
            .ok()
            .map_or_else(FileKvStore::default_dir, PathBuf::from);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--server" => server_url = require_value(args, "--server")?,
                "--data-dir" => data_dir = PathBuf::from(require_value(args, "--data-dir")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            server_url,
            data_dir,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means serve.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Serve,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Serve,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let report = |e: ArgsError| {
        eprintln!("{e}");
        print_usage();
        e
    };

    match cmd {
        Command::Serve => {
            let config = parse_serve(&mut iter, ServerConfig::load()?).map_err(report)?;
            prepare_sqlite_file(&config.db_url)?;
            server::serve(config).await?;
        }
        Command::Play => {
            let args = PlayArgs::parse(&mut iter).map_err(report)?;
            play::run(&args.server_url, &args.data_dir).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    log_fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> std::vec::IntoIter<String> {
        list.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn base_config() -> ServerConfig {
        ServerConfig {
            port: 5000,
            db_url: "sqlite://quiz.sqlite3".into(),
            completion: None,
        }
    }

    #[test]
    fn serve_flags_override_environment() {
        let config = parse_serve(
            &mut args(&["--port", "8081", "--db", "sqlite::memory:"]),
            base_config(),
        )
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.db_url, "sqlite::memory:");
    }

    #[test]
    fn serve_rejects_bad_port_and_unknown_flags() {
        assert!(matches!(
            parse_serve(&mut args(&["--port", "http"]), base_config()),
            Err(ArgsError::InvalidPort { .. })
        ));
        assert!(matches!(
            parse_serve(&mut args(&["--verbose"]), base_config()),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse_serve(&mut args(&["--db"]), base_config()),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/quiz.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/quiz.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/q.db".into()),
            "sqlite:///tmp/q.db"
        );
    }

    #[test]
    fn play_flags_are_parsed() {
        let parsed = PlayArgs::parse(&mut args(&[
            "--server",
            "http://quiz.local:9000",
            "--data-dir",
            "/tmp/quiz-client",
        ]))
        .unwrap();
        assert_eq!(parsed.server_url, "http://quiz.local:9000");
        assert_eq!(parsed.data_dir, PathBuf::from("/tmp/quiz-client"));
    }
}
