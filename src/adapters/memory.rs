use crate::domain::model::{PackId, ScoreEntry};
use crate::domain::ports::ScoreRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 排行榜排序：分數由高到低，同分時較早的在前
pub(crate) fn top_entries(
    entries: &[ScoreEntry],
    pack_id: PackId,
    limit: usize,
) -> Vec<ScoreEntry> {
    let mut in_pack: Vec<ScoreEntry> = entries
        .iter()
        .filter(|e| e.pack_id == pack_id)
        .cloned()
        .collect();
    in_pack.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    in_pack.truncate(limit);
    in_pack
}

pub(crate) fn scores_in_pack(entries: &[ScoreEntry], pack_id: PackId) -> Vec<u32> {
    entries
        .iter()
        .filter(|e| e.pack_id == pack_id)
        .map(|e| e.score)
        .collect()
}

/// 記憶體內的成績庫；clone 出來的 handle 共用同一份資料
#[derive(Debug, Clone, Default)]
pub struct InMemoryScoreRepository {
    entries: Arc<Mutex<Vec<ScoreEntry>>>,
}

impl InMemoryScoreRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<ScoreEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl ScoreRepository for InMemoryScoreRepository {
    async fn submit(&self, entry: ScoreEntry) -> Result<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }

    async fn top_scores(&self, pack_id: PackId, limit: usize) -> Result<Vec<ScoreEntry>> {
        let entries = self.entries.lock().await;
        Ok(top_entries(&entries, pack_id, limit))
    }

    async fn all_scores(&self, pack_id: PackId) -> Result<Vec<u32>> {
        let entries = self.entries.lock().await;
        Ok(scores_in_pack(&entries, pack_id))
    }
}
