use crate::core::round::TiePolicy;
use crate::domain::model::PackId;
use crate::utils::error::{GameError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub game: GameSection,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSection {
    #[serde(default = "default_pack_id")]
    pub pack_id: PackId,
    #[serde(default)]
    pub tie_policy: TiePolicy,
    /// 揭曉價格後到下一組出現前的停留時間，只影響畫面
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Catalog,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub r#type: SourceKind,
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    #[serde(default = "default_leaderboard_path")]
    pub path: String,
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

fn default_pack_id() -> PackId {
    1
}

fn default_reveal_delay_ms() -> u64 {
    600
}

fn default_catalog_path() -> String {
    "./data/properties.json".to_string()
}

fn default_leaderboard_path() -> String {
    "./data/leaderboard.json".to_string()
}

fn default_top_limit() -> usize {
    crate::core::leaderboard::DEFAULT_LIMIT
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            pack_id: default_pack_id(),
            tie_policy: TiePolicy::default(),
            reveal_delay_ms: default_reveal_delay_ms(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            r#type: SourceKind::default(),
            catalog_path: default_catalog_path(),
            endpoint: None,
            timeout_seconds: None,
        }
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            path: default_leaderboard_path(),
            top_limit: default_top_limit(),
        }
    }
}

impl GameConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GameError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GameError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ITEM_ENDPOINT})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GameError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_positive_number("game.pack_id", self.game.pack_id, 1)?;
        validation::validate_range("game.reveal_delay_ms", self.game.reveal_delay_ms, 0, 10_000)?;

        match self.source.r#type {
            SourceKind::Catalog => {
                validation::validate_path("source.catalog_path", &self.source.catalog_path)?;
            }
            SourceKind::Http => {
                let endpoint = self.source.endpoint.as_deref().ok_or_else(|| {
                    GameError::ConfigError {
                        message: "source.endpoint is required for http sources".to_string(),
                    }
                })?;
                validation::validate_url("source.endpoint", endpoint)?;
            }
        }

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_positive_number("source.timeout_seconds", timeout, 1)?;
        }

        validation::validate_path("leaderboard.path", &self.leaderboard.path)?;
        validation::validate_range(
            "leaderboard.top_limit",
            self.leaderboard.top_limit,
            1,
            crate::core::leaderboard::MAX_LIMIT,
        )?;

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(10))
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.game.reveal_delay_ms)
    }

    pub fn json_logging(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }
}

impl Validate for GameConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[game]
pack_id = 2
tie_policy = "strict"
reveal_delay_ms = 0

[source]
type = "http"
endpoint = "https://example.com/api/properties"
timeout_seconds = 5

[leaderboard]
path = "./scores.json"
top_limit = 50
"#;

        let config = GameConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.game.pack_id, 2);
        assert_eq!(config.game.tie_policy, TiePolicy::Strict);
        assert_eq!(config.source.r#type, SourceKind::Http);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.reveal_delay(), Duration::ZERO);
        assert_eq!(config.leaderboard.top_limit, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GameConfig::from_toml_str("").unwrap();

        assert_eq!(config.game.pack_id, 1);
        assert_eq!(config.game.tie_policy, TiePolicy::Lenient);
        assert_eq!(config.source.r#type, SourceKind::Catalog);
        assert_eq!(config.source.catalog_path, "./data/properties.json");
        assert_eq!(config.leaderboard.top_limit, 10);
        assert!(!config.json_logging());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HL_TEST_ITEM_ENDPOINT", "https://items.example.com/random");

        let toml_content = r#"
[source]
type = "http"
endpoint = "${HL_TEST_ITEM_ENDPOINT}"
"#;

        let config = GameConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.source.endpoint.as_deref(),
            Some("https://items.example.com/random")
        );

        std::env::remove_var("HL_TEST_ITEM_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let missing_endpoint = GameConfig::from_toml_str("[source]\ntype = \"http\"\n").unwrap();
        assert!(missing_endpoint.validate().is_err());

        let bad_pack = GameConfig::from_toml_str("[game]\npack_id = 0\n").unwrap();
        assert!(bad_pack.validate().is_err());

        let bad_limit = GameConfig::from_toml_str("[leaderboard]\ntop_limit = 500\n").unwrap();
        assert!(bad_limit.validate().is_err());

        assert!(GameConfig::from_toml_str("[game]\ntie_policy = \"coin-flip\"\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[game]\npack_id = 3\n\n[source]\ncatalog_path = \"./pack3.json\"\n")
            .unwrap();

        let config = GameConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.game.pack_id, 3);
        assert_eq!(config.source.catalog_path, "./pack3.json");
    }
}
