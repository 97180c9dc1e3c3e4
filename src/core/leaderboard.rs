use crate::domain::model::{PackId, RankedScore};
use crate::domain::ports::ScoreRepository;
use crate::utils::error::Result;
use crate::utils::validation;
use serde::Serialize;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;
/// 「顯示更多」每次增加的筆數
pub const SHOW_MORE_STEP: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardPage {
    pub pack_id: PackId,
    pub entries: Vec<RankedScore>,
    pub has_more: bool,
}

pub struct Leaderboard<R: ScoreRepository> {
    repository: R,
}

impl<R: ScoreRepository> Leaderboard<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// 取得前 `limit` 名；多抓一筆用來判斷是否還有更多
    pub async fn page(&self, pack_id: PackId, limit: usize) -> Result<LeaderboardPage> {
        validation::validate_range("limit", limit, 1, MAX_LIMIT)?;
        validation::validate_positive_number("pack_id", pack_id, 1)?;

        let mut fetched = self.repository.top_scores(pack_id, limit + 1).await?;
        let has_more = fetched.len() > limit;
        fetched.truncate(limit);

        let entries = fetched
            .into_iter()
            .enumerate()
            .map(|(i, entry)| RankedScore { rank: i + 1, entry })
            .collect();

        Ok(LeaderboardPage {
            pack_id,
            entries,
            has_more,
        })
    }

    pub fn next_limit(current: usize) -> usize {
        (current + SHOW_MORE_STEP).min(MAX_LIMIT)
    }

    /// 該成績會拿到的名次 (從 1 開始)，同分不會壓過既有成績
    pub async fn potential_rank(&self, pack_id: PackId, score: u32) -> Result<usize> {
        let scores = self.repository.all_scores(pack_id).await?;
        Ok(scores.iter().filter(|&&s| s >= score).count() + 1)
    }
}
