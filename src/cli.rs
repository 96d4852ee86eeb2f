//! Command-line argument parsing for db-chat.
//!
//! Flags override values from the config file; a few of them also fall back
//! to environment variables.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Chat with a SQLite database in plain language.
#[derive(Parser, Debug)]
#[command(name = "db-chat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long, value_name = "PORT", env = "PORT")]
    pub port: Option<u16>,

    /// Path to the SQLite database file
    #[arg(short = 'd', long, value_name = "PATH", env = "DATABASE_PATH")]
    pub database: Option<PathBuf>,

    /// LLM provider to use (openai, ollama, mock)
    #[arg(long, value_name = "PROVIDER", env = "LLM_PROVIDER")]
    pub llm: Option<String>,

    /// Directory holding the chat widget assets
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Overlays the flags that were given onto a loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.static_dir {
            config.server.static_dir = dir.clone();
        }
        if let Some(path) = &self.database {
            config.database.path = path.clone();
        }
        if let Some(provider) = &self.llm {
            config.llm.provider = provider.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_parse_server_args() {
        let cli = parse_args(&["db-chat", "--host", "0.0.0.0", "--port", "8080"]);

        assert_eq!(cli.host, Some("0.0.0.0".to_string()));
        assert_eq!(cli.port, Some(8080));
    }

    #[test]
    fn test_parse_short_args() {
        let cli = parse_args(&["db-chat", "-H", "::1", "-p", "4000", "-d", "shop.db"]);

        assert_eq!(cli.host, Some("::1".to_string()));
        assert_eq!(cli.port, Some(4000));
        assert_eq!(cli.database, Some(PathBuf::from("shop.db")));
    }

    #[test]
    fn test_parse_config_path() {
        let cli = parse_args(&["db-chat", "--config", "/path/to/config.toml"]);
        assert_eq!(cli.config_path(), PathBuf::from("/path/to/config.toml"));
    }

    #[test]
    fn test_rejects_invalid_port() {
        assert!(Cli::try_parse_from(["db-chat", "--port", "not-a-port"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse_args(&[
            "db-chat",
            "--port",
            "9000",
            "--database",
            "/tmp/other.db",
            "--llm",
            "mock",
            "--static-dir",
            "web",
            "--log-file",
            "/tmp/db-chat.log",
        ]);
        let mut config = Config::default();

        cli.apply_to(&mut config);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.llm.provider, "mock");
        assert_eq!(config.server.static_dir, PathBuf::from("web"));
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/db-chat.log")));
    }

    #[test]
    fn test_absent_flags_keep_config_values() {
        let cli = Cli {
            config: None,
            host: None,
            port: None,
            database: None,
            llm: None,
            static_dir: None,
            log_file: None,
        };
        let mut config = Config::default();
        config.server.port = 7000;
        config.llm.provider = "ollama".to_string();

        cli.apply_to(&mut config);

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.llm.provider, "ollama");
    }
}
