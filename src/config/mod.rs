pub mod toml_config;

pub use toml_config::{GameConfig, SourceKind};

#[cfg(feature = "cli")]
use crate::core::round::TiePolicy;
#[cfg(feature = "cli")]
use crate::domain::model::PackId;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "higher-lower")]
#[command(about = "Guess whether the next property is priced higher or lower")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Pack to play (overrides game.pack_id)
    #[arg(long)]
    pub pack: Option<PackId>,

    /// Name to submit to the leaderboard at game over
    #[arg(long)]
    pub player: Option<String>,

    /// JSON catalog of items (switches the source to catalog)
    #[arg(long, conflicts_with = "endpoint")]
    pub catalog: Option<String>,

    /// HTTP endpoint returning a random item (switches the source to http)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Leaderboard JSON file
    #[arg(long)]
    pub leaderboard: Option<String>,

    /// Ties count only for "lower"
    #[arg(long)]
    pub strict_ties: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔 (若有) 並套用命令列覆蓋，最後驗證
    pub fn resolve(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_file(path)?,
            None => GameConfig::default(),
        };

        if let Some(pack) = self.pack {
            config.game.pack_id = pack;
        }
        if let Some(catalog) = &self.catalog {
            config.source.r#type = SourceKind::Catalog;
            config.source.catalog_path = catalog.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.source.r#type = SourceKind::Http;
            config.source.endpoint = Some(endpoint.clone());
        }
        if let Some(leaderboard) = &self.leaderboard {
            config.leaderboard.path = leaderboard.clone();
        }
        if self.strict_ties {
            config.game.tie_policy = TiePolicy::Strict;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = CliConfig::try_parse_from([
            "higher-lower",
            "--pack",
            "2",
            "--endpoint",
            "http://localhost:3000/api/properties",
            "--strict-ties",
        ])
        .unwrap();

        let config = cli.resolve().unwrap();
        assert_eq!(config.game.pack_id, 2);
        assert_eq!(config.source.r#type, SourceKind::Http);
        assert_eq!(config.game.tie_policy, TiePolicy::Strict);
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let cli = CliConfig::try_parse_from(["higher-lower", "--pack", "0"]).unwrap();
        assert!(cli.resolve().is_err());
    }

    #[test]
    fn test_catalog_and_endpoint_conflict() {
        let parsed = CliConfig::try_parse_from([
            "higher-lower",
            "--catalog",
            "a.json",
            "--endpoint",
            "http://localhost",
        ]);
        assert!(parsed.is_err());
    }
}
