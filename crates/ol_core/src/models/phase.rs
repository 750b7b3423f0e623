use serde::{Deserialize, Serialize};

/// Coarse season stage controlling which bookkeeping rules apply.
///
/// The derived ordering matters: comparisons like `phase < Phase::Playoffs`
/// gate regular-season-only logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Preseason,
    RegularSeason,
    AfterTradeDeadline,
    Playoffs,
    DraftLottery,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Preseason => "preseason",
            Phase::RegularSeason => "regular season",
            Phase::AfterTradeDeadline => "regular season, after trade deadline",
            Phase::Playoffs => "playoffs",
            Phase::DraftLottery => "draft lottery",
        }
    }

    /// Phases where free agency housekeeping runs after each completed day.
    pub fn is_regular_season_adjacent(&self) -> bool {
        matches!(self, Phase::RegularSeason | Phase::AfterTradeDeadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ordering() {
        assert!(Phase::RegularSeason < Phase::Playoffs);
        assert!(Phase::AfterTradeDeadline < Phase::Playoffs);
        assert!(Phase::Playoffs < Phase::DraftLottery);
    }
}
