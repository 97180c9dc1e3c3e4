use crate::core::events::RoundEvent;
use crate::core::round::{GuessOutcome, RoundEngine};
use crate::domain::model::{Direction, GameResult, PackId, PairSnapshot};
use crate::domain::ports::ItemSource;
use crate::utils::error::{GameError, Result};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, MutexGuard};

/// 可跨 task 共用的遊戲 session。
///
/// 同一時間只允許一個操作；前一個操作 (例如補位取物) 尚未完成時，新的操作會直接以
/// `Busy` 拒絕，不會排隊或交錯執行。訂閱事件不需要取得引擎。
pub struct GameSession<S: ItemSource> {
    engine: Arc<Mutex<RoundEngine<S>>>,
    events: broadcast::Sender<RoundEvent>,
}

impl<S: ItemSource> Clone for GameSession<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            events: self.events.clone(),
        }
    }
}

impl<S: ItemSource> GameSession<S> {
    pub fn new(engine: RoundEngine<S>) -> Self {
        Self {
            events: engine.event_sender(),
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    fn acquire(&self, operation: &str) -> Result<MutexGuard<'_, RoundEngine<S>>> {
        self.engine.try_lock().map_err(|_| {
            tracing::debug!("Rejected overlapping {} request", operation);
            GameError::Busy {
                operation: operation.to_string(),
            }
        })
    }

    pub async fn start(&self, pack_id: PackId) -> Result<()> {
        self.acquire("start")?.start(pack_id).await
    }

    pub async fn guess(&self, direction: Direction) -> Result<GuessOutcome> {
        self.acquire("guess")?.guess(direction).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.acquire("resume")?.resume().await
    }

    pub fn abandon(&self) -> Result<()> {
        self.acquire("abandon")?.abandon();
        Ok(())
    }

    pub fn current_pair(&self) -> Result<PairSnapshot> {
        Ok(self.acquire("read the current pair")?.current_pair())
    }

    pub fn final_result(&self) -> Result<Option<GameResult>> {
        Ok(self.acquire("read the final result")?.final_result())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Item, Phase};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// 第三次取物會卡住，直到測試放行
    struct GatedSource {
        calls: AtomicUsize,
        gate: Arc<Notify>,
    }

    impl ItemSource for GatedSource {
        async fn fetch_random(&self, pack_id: PackId) -> Result<Item> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call >= 2 {
                self.gate.notified().await;
            }
            let price = [100.0, 150.0, 175.0][call.min(2)];
            Ok(Item::new(format!("p{}", call), price, pack_id))
        }
    }

    #[tokio::test]
    async fn test_guess_during_replacement_fetch_is_rejected() {
        let gate = Arc::new(Notify::new());
        let session = GameSession::new(RoundEngine::new(GatedSource {
            calls: AtomicUsize::new(0),
            gate: Arc::clone(&gate),
        }));
        session.start(1).await.unwrap();

        let background = session.clone();
        let pending = tokio::spawn(async move { background.guess(Direction::Higher).await });

        // 等待背景 guess 進入補位取物
        while session.current_pair().is_ok() {
            tokio::task::yield_now().await;
        }

        let err = session.guess(Direction::Lower).await.unwrap_err();
        assert!(matches!(err, GameError::Busy { .. }));

        gate.notify_one();
        let outcome = pending.await.unwrap().unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.score, 1);

        let pair = session.current_pair().unwrap();
        assert_eq!(pair.phase, Phase::AwaitingGuess);
        assert_eq!(pair.total_guesses, 1);
        assert_eq!(pair.current.unwrap().price, Some(150.0));
    }

    #[tokio::test]
    async fn test_subscribe_while_replacement_fetch_is_pending() {
        let gate = Arc::new(Notify::new());
        let session = GameSession::new(RoundEngine::new(GatedSource {
            calls: AtomicUsize::new(0),
            gate: Arc::clone(&gate),
        }));
        session.start(1).await.unwrap();

        let background = session.clone();
        let pending = tokio::spawn(async move { background.guess(Direction::Higher).await });

        while session.current_pair().is_ok() {
            tokio::task::yield_now().await;
        }

        let mut events = session.subscribe();
        gate.notify_one();
        pending.await.unwrap().unwrap();

        assert_eq!(events.recv().await.unwrap(), RoundEvent::ChallengerReady);
    }
}
