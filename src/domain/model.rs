use crate::utils::error::{GameError, Result};
use crate::utils::validation::{self, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Pack 編號，從 1 開始
pub type PackId = u32;

/// 玩家名稱最大字元數
pub const MAX_PLAYER_NAME_CHARS: usize = 50;

/// 可比較價格的物件 (例如一筆房地產刊登)
///
/// `details` 保存地址、圖片、房間數等顯示欄位，引擎不會讀取，原樣傳遞。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub price: f64,
    #[serde(default = "default_pack_id")]
    pub pack_id: PackId,
    #[serde(flatten)]
    pub details: HashMap<String, serde_json::Value>,
}

fn default_pack_id() -> PackId {
    1
}

/// 資料庫回傳的 id 可能是數字或字串
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

impl Item {
    pub fn new(id: impl Into<String>, price: f64, pack_id: PackId) -> Self {
        Self {
            id: id.into(),
            price,
            pack_id,
            details: HashMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: serde_json::Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }

    /// 產生顯示用的視圖，`reveal_price` 為 false 時隱藏價格
    pub fn view(&self, reveal_price: bool) -> ItemView {
        ItemView {
            id: self.id.clone(),
            price: reveal_price.then_some(self.price),
            pack_id: self.pack_id,
            details: self.details.clone(),
        }
    }
}

impl Validate for Item {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("item.id", &self.id)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(GameError::ValidationError {
                field: "item.price".to_string(),
                value: self.price.to_string(),
                reason: "Price must be a finite non-negative number".to_string(),
            });
        }
        validation::validate_positive_number("item.pack_id", self.pack_id, 1)
    }
}

/// 顯示給玩家的物件，挑戰者價格在猜測前為 `None`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub id: String,
    pub price: Option<f64>,
    pub pack_id: PackId,
    pub details: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Higher,
    Lower,
}

impl FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "higher" | "h" | "up" => Ok(Direction::Higher),
            "lower" | "l" | "down" => Ok(Direction::Lower),
            other => Err(GameError::ValidationError {
                field: "direction".to_string(),
                value: other.to_string(),
                reason: "Guess must be 'higher' or 'lower'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingGuess,
    Revealing,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "Idle",
            Phase::AwaitingGuess => "AwaitingGuess",
            Phase::Revealing => "Revealing",
            Phase::GameOver => "GameOver",
        };
        f.write_str(name)
    }
}

/// 單一局 (一段連勝) 的狀態
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundState {
    pub current: Option<Item>,
    pub challenger: Option<Item>,
    pub score: u32,
    pub total_guesses: u32,
    pub phase: Phase,
    pub pack_id: Option<PackId>,
}

/// `current_pair()` 的快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairSnapshot {
    pub current: Option<ItemView>,
    pub challenger: Option<ItemView>,
    pub phase: Phase,
    pub score: u32,
    pub total_guesses: u32,
}

/// 遊戲結束時凍結的成績
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub pack_id: PackId,
    pub score: u32,
    pub total_guesses: u32,
}

/// 排行榜上的一筆成績
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player_name: String,
    pub score: u32,
    pub correct_guesses: u32,
    pub total_guesses: u32,
    #[serde(default = "default_pack_id")]
    pub pack_id: PackId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selfie_url: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ScoreEntry {
    /// 由結束的遊戲建立成績。連勝在第一次猜錯時結束，所以答對數等於分數。
    pub fn from_result(
        player_name: &str,
        result: &GameResult,
        selfie_url: Option<String>,
    ) -> Self {
        Self {
            player_name: player_name.trim().to_string(),
            score: result.score,
            correct_guesses: result.score,
            total_guesses: result.total_guesses,
            pack_id: result.pack_id,
            selfie_url,
            created_at: Utc::now(),
        }
    }
}

impl Validate for ScoreEntry {
    fn validate(&self) -> Result<()> {
        let name = self.player_name.trim();
        if name.is_empty() {
            return Err(GameError::ValidationError {
                field: "player_name".to_string(),
                value: self.player_name.clone(),
                reason: "Please enter your name".to_string(),
            });
        }
        validation::validate_max_chars("player_name", name, MAX_PLAYER_NAME_CHARS)?;

        if self.correct_guesses > self.total_guesses {
            return Err(GameError::ValidationError {
                field: "correct_guesses".to_string(),
                value: self.correct_guesses.to_string(),
                reason: "Correct guesses cannot exceed total guesses".to_string(),
            });
        }

        validation::validate_positive_number("pack_id", self.pack_id, 1)?;

        if let Some(url) = &self.selfie_url {
            validation::validate_url("selfie_url", url)?;
        }

        Ok(())
    }
}

/// 帶名次 (從 1 開始) 的成績
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedScore {
    pub rank: usize,
    pub entry: ScoreEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackSummary {
    pub pack_id: PackId,
    pub item_count: usize,
}
