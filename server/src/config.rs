/**
 * @file config.rs
 * @author Nguyen Le Duy
 * @date 09/04/2025
 * @brief Configuration handling for the server.
 */
use api_types::BoardIdentity;
use serde::{Deserialize, Serialize};

use crate::board::default_boards;

/// One row of the board table as written in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BoardEntry {
    pub name: String,
    pub fqbn: String,
}

impl From<BoardEntry> for BoardIdentity {
    fn from(entry: BoardEntry) -> Self {
        BoardIdentity::new(entry.name, entry.fqbn)
    }
}

impl From<BoardIdentity> for BoardEntry {
    fn from(board: BoardIdentity) -> Self {
        Self {
            name: board.display_name,
            fqbn: board.fqbn,
        }
    }
}

/// Environment variable holding the remote compile service base URL.
pub const SERVICE_URL_ENV: &str = "COMPILE_SERVICE_URL";

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    pub port: u16,
    pub ip: String,
    pub static_dir: Option<String>,
    pub compile_service_url: Option<String>,
    pub max_body_bytes: u64,
    pub boards: Vec<BoardEntry>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8888,
            ip: String::from("127.0.0.1"),
            static_dir: None,
            compile_service_url: None,
            max_body_bytes: 1024 * 1024,
            boards: default_boards().into_iter().map(BoardEntry::from).collect(),
        }
    }
}

impl ServerConfig {
    pub fn parse(path: &str) -> Result<Self, config::ConfigError> {
        Self::parse_with_service_url(path, std::env::var(SERVICE_URL_ENV).ok())
    }

    fn parse_with_service_url(
        path: &str,
        service_url: Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let mut config: Self = config::Config::builder()
            .add_source(config::Config::try_from(&ServerConfig::default())?)
            .add_source(config::File::with_name(path).required(false))
            .set_override_option("compile_service_url", service_url)?
            .build()?
            .try_deserialize()?;

        // An empty URL is the same as no URL at all
        if config
            .compile_service_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            config.compile_service_url = None;
        }

        Ok(config)
    }

    pub fn board_table(&self) -> Vec<BoardIdentity> {
        self.boards.iter().cloned().map(BoardIdentity::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: &str = "./does-not-exist/config";

    #[test]
    fn test_defaults_without_file() {
        let config = ServerConfig::parse_with_service_url(MISSING, None).unwrap();

        assert_eq!(config.port, 8888);
        assert_eq!(config.ip, "127.0.0.1");
        assert_eq!(config.compile_service_url, None);
        assert_eq!(config.board_table(), default_boards());
    }

    #[test]
    fn test_service_url_override() {
        let url = Some("http://compiler.local:3001".to_string());
        let config = ServerConfig::parse_with_service_url(MISSING, url).unwrap();

        assert_eq!(
            config.compile_service_url.as_deref(),
            Some("http://compiler.local:3001")
        );
    }

    #[test]
    fn test_board_table_from_file() {
        let dir = std::env::temp_dir().join(format!("sketch-server-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
port = 9000

[[boards]]
name = "My Board"
fqbn = "acme:avr:thing"
"#,
        )
        .unwrap();

        let config = ServerConfig::parse_with_service_url(path.to_str().unwrap(), None).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(
            config.board_table(),
            vec![BoardIdentity::new("My Board", "acme:avr:thing")]
        );
    }

    #[test]
    fn test_empty_service_url_is_unset() {
        let config = ServerConfig::parse_with_service_url(MISSING, Some("  ".to_string())).unwrap();
        assert_eq!(config.compile_service_url, None);
    }
}
