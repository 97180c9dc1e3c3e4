use crate::domain::model::{Direction, PackId};
use serde::Serialize;

/// 廣播容量；落後的訂閱者會收到 `Lagged`
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// 狀態轉換事件，供展示層 (動畫、延遲) 訂閱。
///
/// 事件在轉換完成後才送出，展示層如何安排時間都不會影響判定結果。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RoundEvent {
    Started {
        pack_id: PackId,
    },
    Revealed {
        direction: Direction,
        challenger_price: f64,
        correct: bool,
    },
    /// 挑戰者成為新的 current
    Promoted {
        score: u32,
    },
    ChallengerReady,
    ReplacementFailed {
        message: String,
    },
    GameOver {
        score: u32,
        total_guesses: u32,
    },
    Reset,
}
