// Adapters layer: concrete implementations of the domain ports.

pub mod catalog;
pub mod http;
pub mod json_store;
pub mod memory;

pub use catalog::CatalogItemSource;
pub use http::HttpItemSource;
pub use json_store::JsonFileScoreRepository;
pub use memory::InMemoryScoreRepository;

use crate::config::{GameConfig, SourceKind};
use crate::domain::model::{Item, PackId};
use crate::domain::ports::ItemSource;
use crate::utils::error::{GameError, Result};

/// 依設定建立的物件來源
pub enum ConfiguredSource {
    Catalog(CatalogItemSource),
    Http(HttpItemSource),
}

impl ConfiguredSource {
    pub fn from_config(config: &GameConfig) -> Result<Self> {
        match config.source.r#type {
            SourceKind::Catalog => Ok(ConfiguredSource::Catalog(CatalogItemSource::from_file(
                &config.source.catalog_path,
            )?)),
            SourceKind::Http => {
                let endpoint = config.source.endpoint.as_deref().ok_or_else(|| {
                    GameError::ConfigError {
                        message: "source.endpoint is required for http sources".to_string(),
                    }
                })?;
                Ok(ConfiguredSource::Http(HttpItemSource::new(
                    endpoint,
                    config.timeout(),
                )?))
            }
        }
    }
}

impl ItemSource for ConfiguredSource {
    async fn fetch_random(&self, pack_id: PackId) -> Result<Item> {
        match self {
            ConfiguredSource::Catalog(source) => source.fetch_random(pack_id).await,
            ConfiguredSource::Http(source) => source.fetch_random(pack_id).await,
        }
    }
}
