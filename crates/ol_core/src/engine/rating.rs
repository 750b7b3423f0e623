//! Rating-driven game simulation.
//!
//! A compact engine producing plausible box scores from roster quality:
//! team strength comes from the rotation's ratings, final scores from a
//! normal distribution around a strength-derived mean, and player lines
//! from weighted shares of the team totals. Deterministic given the rng
//! state it is handed.

use once_cell::sync::Lazy;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use super::{GameEngine, GameInput};
use crate::models::{
    GameResult, Injury, PlayerLine, Position, TeamLine, TeamSnapshot,
};

/// Players in the nightly rotation.
const ROTATION_SIZE: usize = 8;

/// Total player-minutes to distribute per team.
const TEAM_MINUTES: u16 = 240;

const BASE_PTS: f64 = 104.0;
const PTS_PER_OVR: f64 = 1.1;
const SCORE_SD: f64 = 9.0;

/// Home strength bump in percent, before the search's factor scaling.
const HOME_ADVANTAGE_PCT: f64 = 1.5;

/// Injury table: kind, games out (lo..=hi), severity score.
static INJURY_TYPES: Lazy<Vec<(&'static str, u16, u16, u8)>> = Lazy::new(|| {
    vec![
        ("Bruised Knee", 1, 3, 10),
        ("Sore Shoulder", 1, 4, 12),
        ("Back Spasms", 1, 6, 15),
        ("Sprained Ankle", 2, 10, 25),
        ("Strained Hamstring", 3, 12, 30),
        ("Broken Foot", 15, 30, 60),
        ("Torn ACL", 40, 70, 90),
    ]
});

#[derive(Debug, Clone, Default)]
pub struct RatingEngine;

impl RatingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Mean rating of the rotation's healthy players.
    fn strength(team: &TeamSnapshot) -> f64 {
        let ratings: Vec<f64> = team
            .players
            .iter()
            .filter(|p| !p.injured)
            .take(ROTATION_SIZE)
            .map(|p| p.ovr as f64)
            .collect();

        if ratings.is_empty() {
            // A fully injured roster still fields somebody.
            return 40.0;
        }
        ratings.iter().sum::<f64>() / ratings.len() as f64
    }

    fn sample_score(mean: f64, rng: &mut ChaCha8Rng) -> u16 {
        let normal = Normal::new(mean, SCORE_SD).unwrap();
        normal.sample(rng).round().max(55.0) as u16
    }

    /// Split `total` into integer shares proportional to `weights`,
    /// assigning the rounding remainder to the largest fractional parts.
    fn distribute(total: u16, weights: &[f64]) -> Vec<u16> {
        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 || weights.is_empty() {
            return vec![0; weights.len()];
        }

        let mut shares: Vec<u16> = Vec::with_capacity(weights.len());
        let mut fractions: Vec<(usize, f64)> = Vec::with_capacity(weights.len());
        let mut assigned = 0u16;

        for (i, w) in weights.iter().enumerate() {
            let exact = total as f64 * w / sum;
            let floor = exact.floor() as u16;
            shares.push(floor);
            assigned += floor;
            fractions.push((i, exact - floor as f64));
        }

        fractions.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let mut remainder = total - assigned;
        for (i, _) in fractions {
            if remainder == 0 {
                break;
            }
            shares[i] += 1;
            remainder -= 1;
        }

        shares
    }

    fn reb_factor(pos: Position) -> f64 {
        match pos {
            Position::C => 1.3,
            Position::F => 1.0,
            Position::G => 0.8,
        }
    }

    fn ast_factor(pos: Position) -> f64 {
        match pos {
            Position::G => 1.4,
            Position::F => 1.0,
            Position::C => 0.7,
        }
    }

    /// Fill one team's stat lines from its final score.
    fn fill_team(team: &mut TeamSnapshot, pts: u16, rng: &mut ChaCha8Rng) {
        let fg = (pts as f64 * 0.43).round() as u16;
        let fga = (fg as f64 / 0.46).round() as u16;
        let reb = Normal::new(44.0, 4.0).unwrap().sample(rng) as f64;
        let reb = reb.round().max(20.0) as u16;
        let ast = (fg as f64 * 0.55).round() as u16;

        team.stat.pts = pts;
        team.stat.fg = fg;
        team.stat.fga = fga;
        team.stat.reb = reb;
        team.stat.ast = ast;

        let rotation: Vec<usize> = team
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.injured)
            .take(ROTATION_SIZE)
            .map(|(i, _)| i)
            .collect();

        if rotation.is_empty() {
            return;
        }

        let ovr_weights: Vec<f64> =
            rotation.iter().map(|&i| (team.players[i].ovr as f64).powi(2)).collect();
        let minutes = Self::distribute(TEAM_MINUTES.min(48 * rotation.len() as u16), &ovr_weights);

        let pts_weights: Vec<f64> = rotation
            .iter()
            .zip(&minutes)
            .map(|(&i, &min)| (team.players[i].ovr as f64).powi(2) * min as f64)
            .collect();
        let pts_shares = Self::distribute(pts, &pts_weights);

        let reb_weights: Vec<f64> = rotation
            .iter()
            .zip(&minutes)
            .map(|(&i, &min)| Self::reb_factor(team.players[i].pos) * min as f64)
            .collect();
        let reb_shares = Self::distribute(reb, &reb_weights);

        let ast_weights: Vec<f64> = rotation
            .iter()
            .zip(&minutes)
            .map(|(&i, &min)| Self::ast_factor(team.players[i].pos) * min as f64)
            .collect();
        let ast_shares = Self::distribute(ast, &ast_weights);

        for (slot, &i) in rotation.iter().enumerate() {
            let player = &mut team.players[i];
            player.stat.min = minutes[slot];
            player.stat.pts = pts_shares[slot];
            player.stat.reb = reb_shares[slot];
            player.stat.ast = ast_shares[slot];
        }
    }

    /// Roll injuries for everyone who played. Returns the new injuries so
    /// they land on the player lines.
    fn roll_injuries(
        team: &mut TeamSnapshot,
        base_injury_rate: f64,
        rng: &mut ChaCha8Rng,
    ) -> Vec<(u32, Injury)> {
        let mut injuries = Vec::new();
        if base_injury_rate <= 0.0 {
            return injuries;
        }

        for player in team.players.iter_mut().filter(|p| p.stat.min > 0 && !p.injured) {
            let chance = base_injury_rate * player.stat.min as f64;
            if rng.gen::<f64>() < chance {
                let (kind, lo, hi, score) = INJURY_TYPES[rng.gen_range(0..INJURY_TYPES.len())];
                let injury = Injury {
                    kind: kind.to_string(),
                    games_remaining: rng.gen_range(lo..=hi),
                    score,
                };
                player.injured = true;
                injuries.push((player.pid, injury));
            }
        }

        injuries
    }

    fn trace(
        home: &TeamSnapshot,
        away: &TeamSnapshot,
        rng: &mut ChaCha8Rng,
    ) -> Vec<String> {
        let mut lines = Vec::with_capacity(10);
        lines.push(format!("{} at {}", away.name, home.name));

        // Carve the final scores into four period lines.
        let noise = |rng: &mut ChaCha8Rng| -> Vec<f64> {
            (0..4).map(|_| 1.0 + rng.gen::<f64>() * 0.4).collect()
        };
        let home_periods = Self::distribute(home.stat.pts, &noise(rng));
        let away_periods = Self::distribute(away.stat.pts, &noise(rng));

        let mut home_running = 0u16;
        let mut away_running = 0u16;
        for period in 0..4 {
            home_running += home_periods[period];
            away_running += away_periods[period];
            lines.push(format!(
                "End of period {}: {} {}, {} {}",
                period + 1,
                home.name,
                home_running,
                away.name,
                away_running
            ));
        }

        lines.push(format!(
            "Final: {} {}, {} {}",
            home.name, home.stat.pts, away.name, away.stat.pts
        ));
        lines
    }
}

impl GameEngine for RatingEngine {
    fn simulate(&self, input: GameInput, rng: &mut ChaCha8Rng) -> GameResult {
        let GameInput {
            gid,
            day,
            mut teams,
            want_trace,
            home_advantage_factor,
            home_advantage_disabled,
            is_exhibition: _,
            base_injury_rate,
            allow_tie,
        } = input;

        teams[0].resolve_lineup();
        teams[1].resolve_lineup();

        let mut home_strength = Self::strength(&teams[0]);
        let away_strength = Self::strength(&teams[1]);

        if !home_advantage_disabled {
            home_strength *= 1.0 + (HOME_ADVANTAGE_PCT / 100.0) * home_advantage_factor;
        }

        let diff = home_strength - away_strength;
        let mut home_pts = Self::sample_score(BASE_PTS + diff * PTS_PER_OVR, rng);
        let mut away_pts = Self::sample_score(BASE_PTS - diff * PTS_PER_OVR, rng);

        if !allow_tie {
            // Overtime periods until somebody leads.
            while home_pts == away_pts {
                home_pts += rng.gen_range(4..=14);
                away_pts += rng.gen_range(4..=14);
            }
        }

        let [mut home, mut away] = teams;
        Self::fill_team(&mut home, home_pts, rng);
        Self::fill_team(&mut away, away_pts, rng);

        let home_injuries = Self::roll_injuries(&mut home, base_injury_rate, rng);
        let away_injuries = Self::roll_injuries(&mut away, base_injury_rate, rng);

        let play_by_play =
            if want_trace { Some(Self::trace(&home, &away, rng)) } else { None };

        let mut players = Vec::with_capacity(home.players.len() + away.players.len());
        for (snapshot, injuries) in
            [(&home, &home_injuries), (&away, &away_injuries)]
        {
            for p in &snapshot.players {
                if p.stat.min == 0 {
                    continue;
                }
                let injury_new =
                    injuries.iter().find(|(pid, _)| *pid == p.pid).map(|(_, inj)| inj.clone());
                players.push(PlayerLine {
                    pid: p.pid,
                    tid: snapshot.id,
                    stat: p.stat,
                    injury_new,
                });
            }
        }

        GameResult {
            gid,
            day,
            teams: [
                TeamLine { tid: home.id, stat: home.stat },
                TeamLine { tid: away.id, stat: away.stat },
            ],
            players,
            play_by_play,
            force_win_trials: None,
        }
    }
}
