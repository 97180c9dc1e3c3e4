use crate::domain::model::{Item, PackId, PackSummary};
use crate::domain::ports::ItemSource;
use crate::utils::error::{GameError, Result};
use crate::utils::validation::Validate;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

/// 從本地物件目錄隨機抽取 (例如匯出的 JSON 房源資料)
pub struct CatalogItemSource {
    packs: BTreeMap<PackId, Vec<Item>>,
    rng: Mutex<StdRng>,
}

impl CatalogItemSource {
    pub fn from_items(items: Vec<Item>) -> Result<Self> {
        let mut packs: BTreeMap<PackId, Vec<Item>> = BTreeMap::new();
        for item in items {
            item.validate()?;
            packs.entry(item.pack_id).or_default().push(item);
        }

        Ok(Self {
            packs,
            rng: Mutex::new(StdRng::from_os_rng()),
        })
    }

    /// 讀取 JSON 陣列格式的目錄檔
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let items: Vec<Item> = serde_json::from_str(&content)?;
        tracing::info!(
            "📦 Loaded {} items from {}",
            items.len(),
            path.as_ref().display()
        );
        Self::from_items(items)
    }

    /// 固定亂數種子，讓抽取順序可重現
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn pack_summaries(&self) -> Vec<PackSummary> {
        self.packs
            .iter()
            .map(|(&pack_id, items)| PackSummary {
                pack_id,
                item_count: items.len(),
            })
            .collect()
    }

    pub fn item_count(&self, pack_id: PackId) -> usize {
        self.packs.get(&pack_id).map(Vec::len).unwrap_or(0)
    }

    fn pick(&self, pack_id: PackId) -> Result<Item> {
        let items = self
            .packs
            .get(&pack_id)
            .filter(|items| !items.is_empty())
            .ok_or_else(|| {
                GameError::source_unavailable(format!("No properties found in pack {}", pack_id))
            })?;

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| GameError::source_unavailable("catalog random generator poisoned"))?;

        items
            .choose(&mut *rng)
            .cloned()
            .ok_or_else(|| GameError::source_unavailable("catalog pack is empty"))
    }
}

impl ItemSource for CatalogItemSource {
    async fn fetch_random(&self, pack_id: PackId) -> Result<Item> {
        self.pick(pack_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn items() -> Vec<Item> {
        vec![
            Item::new("a", 100.0, 1),
            Item::new("b", 200.0, 1),
            Item::new("c", 300.0, 2),
        ]
    }

    #[tokio::test]
    async fn test_fetch_stays_within_pack() {
        let source = CatalogItemSource::from_items(items()).unwrap().with_seed(7);
        for _ in 0..20 {
            let item = source.fetch_random(1).await.unwrap();
            assert_eq!(item.pack_id, 1);
            assert!(item.id == "a" || item.id == "b");
        }
        assert_eq!(source.fetch_random(2).await.unwrap().id, "c");
    }

    #[tokio::test]
    async fn test_unknown_pack_is_unavailable() {
        let source = CatalogItemSource::from_items(items()).unwrap();
        let err = source.fetch_random(9).await.unwrap_err();
        assert!(matches!(err, GameError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_invalid_items_are_rejected() {
        let result = CatalogItemSource::from_items(vec![Item::new("bad", -5.0, 1)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_pack_summaries_sorted_by_pack() {
        let source = CatalogItemSource::from_items(items()).unwrap();
        let summaries = source.pack_summaries();
        assert_eq!(
            summaries,
            vec![
                PackSummary {
                    pack_id: 1,
                    item_count: 2
                },
                PackSummary {
                    pack_id: 2,
                    item_count: 1
                },
            ]
        );
        assert_eq!(source.item_count(3), 0);
    }

    #[test]
    fn test_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let content = r#"[
            {"id": 1, "price": 650000, "pack_id": 2, "address": "1 Main St", "city": "Calgary"},
            {"id": 2, "price": 720000, "pack_id": 2, "address": "2 Main St", "city": "Calgary"}
        ]"#;
        temp_file.write_all(content.as_bytes()).unwrap();

        let source = CatalogItemSource::from_file(temp_file.path()).unwrap();
        assert_eq!(source.item_count(2), 2);
    }
}
