#[derive(Debug, Clone, Copy)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
}

impl LimitOffset {
    /// Clamp caller-supplied paging to sane bounds: limit 1..=200,
    /// offset never negative.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(50).clamp(1, 200),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for LimitOffset {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}
