/// 將一個成績與同 pack 的歷史成績比較，算出百分位。
///
/// 百分位 = 歷史成績中「嚴格小於」該成績的比例，四捨五入 (遠離零) 為整數百分比。
/// 沒有任何歷史成績時回傳 100 (第一筆成績的慣例)。
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentileCalculator;

impl PercentileCalculator {
    pub fn compute(score: u32, historical_scores: &[u32]) -> u32 {
        if historical_scores.is_empty() {
            return 100;
        }

        let below = historical_scores.iter().filter(|&&s| s < score).count() as u64;
        let total = historical_scores.len() as u64;

        // round(100 * below / total)，以整數運算避免浮點誤差
        ((200 * below + total) / (2 * total)) as u32
    }
}
