use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Sentinel `tid` for players not on any roster.
pub const FREE_AGENT_TID: i32 = -1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    G,
    F,
    C,
}

impl Position {
    pub fn abbrev(&self) -> &'static str {
        match self {
            Position::G => "G",
            Position::F => "F",
            Position::C => "C",
        }
    }
}

/// Current injury. `kind == "Healthy"` with zero games remaining means none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Injury {
    pub kind: String,
    pub games_remaining: u16,

    /// Severity used for notification ranking.
    #[serde(default)]
    pub score: u8,
}

impl Injury {
    pub fn healthy() -> Self {
        Self { kind: "Healthy".to_string(), games_remaining: 0, score: 0 }
    }

    pub fn is_healthy(&self) -> bool {
        self.kind == "Healthy"
    }
}

impl Default for Injury {
    fn default() -> Self {
        Self::healthy()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Ratings {
    pub ovr: u8,
    pub pot: u8,
}

/// Contract amount in thousands plus expiration season.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Contract {
    pub amount: u32,
    pub exp: u16,
}

/// Cumulative season stat totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerSeasonStats {
    pub gp: u32,
    pub min: u32,
    pub pts: u32,
    pub reb: u32,
    pub ast: u32,

    /// Derived efficiency figure, recomputed with advanced stats.
    #[serde(default)]
    pub efficiency: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub pid: u32,
    pub tid: i32,
    pub name: String,
    pub pos: Position,
    pub ratings: Ratings,

    /// Trade/release valuation, higher is better.
    pub value: f32,

    pub contract: Contract,

    #[serde(default)]
    pub injury: Injury,

    /// Pitcher-style daily fatigue, 0-100. Absent for sports without it.
    #[serde(default)]
    pub p_fatigue: Option<u8>,

    /// Countdown before the player can be traded again. Initialized to zero
    /// when missing on an older save.
    #[serde(default)]
    pub games_until_tradable: Option<u16>,

    #[serde(default)]
    pub stats: PlayerSeasonStats,
}

impl Player {
    pub fn is_free_agent(&self) -> bool {
        self.tid == FREE_AGENT_TID
    }

    pub fn can_play(&self) -> bool {
        self.injury.games_remaining == 0
    }

    /// Generate a filler free agent on a minimum contract, for AI rosters
    /// that fall under the league minimum when no real free agent is left.
    pub fn gen_random_free_agent(
        pid: u32,
        season: u16,
        min_contract: u32,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        const FIRST: [&str; 8] =
            ["Alex", "Chris", "Devin", "Jordan", "Marcus", "Pat", "Sam", "Tyler"];
        const LAST: [&str; 8] =
            ["Baker", "Diaz", "Harris", "Kim", "Lopez", "Novak", "Reed", "Silva"];

        let ovr = rng.gen_range(30..=42);
        let pos = match rng.gen_range(0..3) {
            0 => Position::G,
            1 => Position::F,
            _ => Position::C,
        };

        Self {
            pid,
            tid: FREE_AGENT_TID,
            name: format!(
                "{} {}",
                FIRST[rng.gen_range(0..FIRST.len())],
                LAST[rng.gen_range(0..LAST.len())]
            ),
            pos,
            ratings: Ratings { ovr, pot: ovr },
            value: ovr as f32,
            contract: Contract { amount: min_contract, exp: season + 1 },
            injury: Injury::healthy(),
            p_fatigue: None,
            games_until_tradable: Some(0),
            stats: PlayerSeasonStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_injury_default_is_healthy() {
        let injury = Injury::default();
        assert!(injury.is_healthy());
        assert_eq!(injury.games_remaining, 0);
    }

    #[test]
    fn test_legacy_player_without_tradable_countdown() {
        let json = r#"{
            "pid": 7, "tid": 2, "name": "Old Save", "pos": "G",
            "ratings": {"ovr": 50, "pot": 55},
            "value": 50.0,
            "contract": {"amount": 1000, "exp": 4}
        }"#;
        let p: Player = serde_json::from_str(json).unwrap();

        assert_eq!(p.games_until_tradable, None);
        assert!(p.injury.is_healthy());
        assert_eq!(p.p_fatigue, None);
    }

    #[test]
    fn test_gen_random_free_agent_is_deterministic() {
        let mut a = ChaCha8Rng::seed_from_u64(5);
        let mut b = ChaCha8Rng::seed_from_u64(5);

        let pa = Player::gen_random_free_agent(100, 1, 750, &mut a);
        let pb = Player::gen_random_free_agent(100, 1, 750, &mut b);

        assert_eq!(pa, pb);
        assert!(pa.is_free_agent());
        assert_eq!(pa.contract.amount, 750);
    }
}
