use crate::domain::model::{Item, PackId, ScoreEntry};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 隨機物件來源。回傳的物件必須屬於指定的 pack。
pub trait ItemSource: Send + Sync {
    fn fetch_random(
        &self,
        pack_id: PackId,
    ) -> impl std::future::Future<Output = Result<Item>> + Send;
}

/// 成績儲存庫 (只新增，不更新或刪除)
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    async fn submit(&self, entry: ScoreEntry) -> Result<()>;
    /// 依分數由高到低排序
    async fn top_scores(&self, pack_id: PackId, limit: usize) -> Result<Vec<ScoreEntry>>;
    async fn all_scores(&self, pack_id: PackId) -> Result<Vec<u32>>;
}
