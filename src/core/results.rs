use crate::core::percentile::PercentileCalculator;
use crate::domain::model::{GameResult, ScoreEntry};
use crate::domain::ports::ScoreRepository;
use crate::utils::error::{GameError, Result};
use crate::utils::validation::Validate;
use serde::Serialize;

/// 遊戲結束畫面需要的資料
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub result: GameResult,
    pub percentile: u32,
    /// 參與比較的歷史成績數量
    pub population: usize,
}

fn as_persistence_error(e: GameError) -> GameError {
    match e {
        GameError::PersistenceError { .. } | GameError::ValidationError { .. } => e,
        other => GameError::persistence(other.to_string()),
    }
}

/// 遊戲結束後的百分位計算與成績提交。不持有也不修改任何回合狀態。
pub struct ResultsService<R: ScoreRepository> {
    repository: R,
}

impl<R: ScoreRepository> ResultsService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// 以提交前的歷史成績計算百分位
    pub async fn summarize(&self, result: &GameResult) -> Result<GameSummary> {
        let history = self
            .repository
            .all_scores(result.pack_id)
            .await
            .map_err(as_persistence_error)?;

        let percentile = PercentileCalculator::compute(result.score, &history);
        tracing::debug!(
            "Score {} in pack {} ranks at percentile {} of {}",
            result.score,
            result.pack_id,
            percentile,
            history.len()
        );

        Ok(GameSummary {
            result: *result,
            percentile,
            population: history.len(),
        })
    }

    pub async fn percentile(&self, result: &GameResult) -> Result<u32> {
        Ok(self.summarize(result).await?.percentile)
    }

    /// 驗證後寫入；儲存的名稱一律去除前後空白
    pub async fn submit(&self, mut entry: ScoreEntry) -> Result<ScoreEntry> {
        entry.player_name = entry.player_name.trim().to_string();
        entry.validate()?;

        self.repository
            .submit(entry.clone())
            .await
            .map_err(as_persistence_error)?;

        tracing::info!(
            "🏆 Submitted score {} for '{}' in pack {}",
            entry.score,
            entry.player_name,
            entry.pack_id
        );
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryScoreRepository;
    use crate::domain::model::{PackId, MAX_PLAYER_NAME_CHARS};
    use async_trait::async_trait;

    struct BrokenRepository;

    #[async_trait]
    impl ScoreRepository for BrokenRepository {
        async fn submit(&self, _entry: ScoreEntry) -> Result<()> {
            Err(GameError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }

        async fn top_scores(&self, _pack_id: PackId, _limit: usize) -> Result<Vec<ScoreEntry>> {
            Ok(Vec::new())
        }

        async fn all_scores(&self, _pack_id: PackId) -> Result<Vec<u32>> {
            Err(GameError::persistence("connection reset"))
        }
    }

    fn result(pack_id: PackId, score: u32) -> GameResult {
        GameResult {
            pack_id,
            score,
            total_guesses: score + 1,
        }
    }

    #[tokio::test]
    async fn test_first_score_in_pack_is_top_percentile() {
        let service = ResultsService::new(InMemoryScoreRepository::new());
        let summary = service.summarize(&result(3, 0)).await.unwrap();
        assert_eq!(summary.percentile, 100);
        assert_eq!(summary.population, 0);
    }

    #[tokio::test]
    async fn test_percentile_is_scoped_to_pack() {
        let repository = InMemoryScoreRepository::new();
        for (pack_id, score) in [(1, 1), (1, 2), (2, 10), (2, 20)] {
            repository
                .submit(ScoreEntry::from_result("p", &result(pack_id, score), None))
                .await
                .unwrap();
        }

        let service = ResultsService::new(repository);
        assert_eq!(service.percentile(&result(1, 5)).await.unwrap(), 100);
        assert_eq!(service.percentile(&result(2, 15)).await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_invalid_entry_is_not_submitted() {
        let repository = InMemoryScoreRepository::new();
        let service = ResultsService::new(repository.clone());

        let err = service
            .submit(ScoreEntry::from_result("  ", &result(1, 3), None))
            .await
            .unwrap_err();

        assert!(matches!(err, GameError::ValidationError { .. }));
        assert!(repository.all_scores(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submitted_name_is_stored_trimmed() {
        let repository = InMemoryScoreRepository::new();
        let service = ResultsService::new(repository.clone());

        let mut entry = ScoreEntry::from_result("Ada", &result(1, 3), None);
        entry.player_name = "   Ada   ".to_string();

        let submitted = service.submit(entry).await.unwrap();
        assert_eq!(submitted.player_name, "Ada");

        let stored = repository.top_scores(1, 10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].player_name, "Ada");
    }

    #[tokio::test]
    async fn test_name_length_is_checked_after_trimming() {
        let service = ResultsService::new(InMemoryScoreRepository::new());
        let mut entry = ScoreEntry::from_result("Ada", &result(1, 3), None);
        entry.player_name = format!("  {}  ", "x".repeat(MAX_PLAYER_NAME_CHARS));

        let submitted = service.submit(entry).await.unwrap();
        assert_eq!(submitted.player_name.chars().count(), MAX_PLAYER_NAME_CHARS);
    }

    #[tokio::test]
    async fn test_repository_failures_surface_as_persistence_errors() {
        let service = ResultsService::new(BrokenRepository);

        let err = service
            .submit(ScoreEntry::from_result("Ada", &result(1, 3), None))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::PersistenceError { .. }));

        let err = service.summarize(&result(1, 3)).await.unwrap_err();
        assert!(err.is_recoverable());
    }
}
