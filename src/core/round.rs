use crate::core::events::{RoundEvent, EVENT_CHANNEL_CAPACITY};
use crate::domain::model::{
    Direction, GameResult, Item, PackId, PairSnapshot, Phase, RoundState,
};
use crate::domain::ports::ItemSource;
use crate::utils::error::{GameError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// 兩個價格相同時的判定規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiePolicy {
    /// 同價時 Higher 與 Lower 都算對 (`>=` / `<=`)
    #[default]
    Lenient,
    /// 只看 `challenger > current`；同價時只有 Lower 算對
    Strict,
}

/// 判定一次猜測是否正確
pub fn evaluate_guess(
    direction: Direction,
    current_price: f64,
    challenger_price: f64,
    policy: TiePolicy,
) -> bool {
    match policy {
        TiePolicy::Lenient => match direction {
            Direction::Higher => challenger_price >= current_price,
            Direction::Lower => challenger_price <= current_price,
        },
        TiePolicy::Strict => {
            let is_higher = challenger_price > current_price;
            (direction == Direction::Higher) == is_higher
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessOutcome {
    pub direction: Direction,
    pub correct: bool,
    pub current_price: f64,
    pub challenger_price: f64,
    pub score: u32,
    pub total_guesses: u32,
    pub phase: Phase,
}

/// 取得一個物件並確認它屬於該 pack；任何失敗都回報為 `SourceUnavailable`
async fn fetch_checked<S: ItemSource>(source: &S, pack_id: PackId) -> Result<Item> {
    let item = source.fetch_random(pack_id).await.map_err(|e| match e {
        GameError::SourceUnavailable { .. } => e,
        other => GameError::source_unavailable(other.to_string()),
    })?;

    if item.pack_id != pack_id {
        return Err(GameError::source_unavailable(format!(
            "item {} belongs to pack {}, expected pack {}",
            item.id, item.pack_id, pack_id
        )));
    }

    item.validate().map_err(|e| {
        GameError::source_unavailable(format!("item {} rejected: {}", item.id, e))
    })?;

    Ok(item)
}

/// 一段連勝的狀態機。
///
/// 所有轉換都是同步的請求/回應，不含任何延遲；展示層透過 [`RoundEngine::subscribe`]
/// 取得事件後自行安排動畫時間。
pub struct RoundEngine<S: ItemSource> {
    source: S,
    tie_policy: TiePolicy,
    state: RoundState,
    events: broadcast::Sender<RoundEvent>,
}

impl<S: ItemSource> RoundEngine<S> {
    pub fn new(source: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            source,
            tie_policy: TiePolicy::default(),
            state: RoundState::default(),
            events,
        }
    }

    pub fn with_tie_policy(mut self, tie_policy: TiePolicy) -> Self {
        self.tie_policy = tie_policy;
        self
    }

    pub fn tie_policy(&self) -> TiePolicy {
        self.tie_policy
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.events.subscribe()
    }

    /// 事件通道的發送端，讓外層不必持有引擎也能訂閱
    pub fn event_sender(&self) -> broadcast::Sender<RoundEvent> {
        self.events.clone()
    }

    fn emit(&self, event: RoundEvent) {
        // 沒有訂閱者時 send 會失敗，屬正常情況
        let _ = self.events.send(event);
    }

    fn invalid_state(&self, operation: &str) -> GameError {
        GameError::InvalidState {
            operation: operation.to_string(),
            phase: self.state.phase.to_string(),
        }
    }

    /// 開始新的一局。兩個物件都取得成功前不會修改任何狀態。
    pub async fn start(&mut self, pack_id: PackId) -> Result<()> {
        validation::validate_positive_number("pack_id", pack_id, 1)?;

        tracing::debug!("Starting round in pack {}", pack_id);
        let (current, challenger) = match tokio::try_join!(
            fetch_checked(&self.source, pack_id),
            fetch_checked(&self.source, pack_id)
        ) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!("Failed to load initial pair for pack {}: {}", pack_id, e);
                return Err(e);
            }
        };

        self.state = RoundState {
            current: Some(current),
            challenger: Some(challenger),
            score: 0,
            total_guesses: 0,
            phase: Phase::AwaitingGuess,
            pack_id: Some(pack_id),
        };

        tracing::info!("🏠 Game started in pack {}", pack_id);
        self.emit(RoundEvent::Started { pack_id });
        Ok(())
    }

    /// 判定猜測。答對時立即補上新的挑戰者；補位失敗時停在 `Revealing` 並保留分數。
    pub async fn guess(&mut self, direction: Direction) -> Result<GuessOutcome> {
        if self.state.phase != Phase::AwaitingGuess {
            return Err(self.invalid_state("guess"));
        }

        let (current_price, challenger_price) =
            match (&self.state.current, &self.state.challenger) {
                (Some(current), Some(challenger)) => (current.price, challenger.price),
                _ => return Err(self.invalid_state("guess")),
            };

        self.state.total_guesses += 1;
        let correct = evaluate_guess(direction, current_price, challenger_price, self.tie_policy);

        tracing::debug!(
            "Guess {:?}: current={} challenger={} correct={}",
            direction,
            current_price,
            challenger_price,
            correct
        );

        self.emit(RoundEvent::Revealed {
            direction,
            challenger_price,
            correct,
        });

        if !correct {
            self.state.phase = Phase::GameOver;
            tracing::info!(
                "Game over in pack {:?}: score {} after {} guesses",
                self.state.pack_id,
                self.state.score,
                self.state.total_guesses
            );
            self.emit(RoundEvent::GameOver {
                score: self.state.score,
                total_guesses: self.state.total_guesses,
            });
            return Ok(self.outcome(direction, false, current_price, challenger_price));
        }

        self.state.phase = Phase::Revealing;
        self.state.score += 1;
        self.state.current = self.state.challenger.take();
        self.emit(RoundEvent::Promoted {
            score: self.state.score,
        });

        self.refill().await?;
        Ok(self.outcome(direction, true, current_price, challenger_price))
    }

    /// 補位失敗後重試取得挑戰者
    pub async fn resume(&mut self) -> Result<()> {
        if self.state.phase != Phase::Revealing || self.state.challenger.is_some() {
            return Err(self.invalid_state("resume"));
        }
        self.refill().await
    }

    async fn refill(&mut self) -> Result<()> {
        let pack_id = self
            .state
            .pack_id
            .ok_or_else(|| self.invalid_state("fetch a challenger"))?;

        match fetch_checked(&self.source, pack_id).await {
            Ok(item) => {
                self.state.challenger = Some(item);
                self.state.phase = Phase::AwaitingGuess;
                self.emit(RoundEvent::ChallengerReady);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "Replacement fetch failed in pack {} (score {} kept): {}",
                    pack_id,
                    self.state.score,
                    e
                );
                self.emit(RoundEvent::ReplacementFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// 玩家回到首頁，放棄目前這一局
    pub fn abandon(&mut self) {
        if self.state.phase != Phase::Idle {
            tracing::debug!("Round abandoned at score {}", self.state.score);
        }
        self.state = RoundState::default();
        self.emit(RoundEvent::Reset);
    }

    pub fn current_pair(&self) -> PairSnapshot {
        let reveal = matches!(self.state.phase, Phase::Revealing | Phase::GameOver);
        PairSnapshot {
            current: self.state.current.as_ref().map(|item| item.view(true)),
            challenger: self.state.challenger.as_ref().map(|item| item.view(reveal)),
            phase: self.state.phase,
            score: self.state.score,
            total_guesses: self.state.total_guesses,
        }
    }

    /// 只有在 `GameOver` 時才有最終成績
    pub fn final_result(&self) -> Option<GameResult> {
        match (self.state.phase, self.state.pack_id) {
            (Phase::GameOver, Some(pack_id)) => Some(GameResult {
                pack_id,
                score: self.state.score,
                total_guesses: self.state.total_guesses,
            }),
            _ => None,
        }
    }

    fn outcome(
        &self,
        direction: Direction,
        correct: bool,
        current_price: f64,
        challenger_price: f64,
    ) -> GuessOutcome {
        GuessOutcome {
            direction,
            correct,
            current_price,
            challenger_price,
            score: self.state.score,
            total_guesses: self.state.total_guesses,
            phase: self.state.phase,
        }
    }
}
