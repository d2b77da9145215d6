//! Shared machinery of the objective-mode behaviors
//!
//! - `Commitment` biases a behavior toward the objective it picked last
//! - `RoleClock` spaces out role re-evaluation
//! - small scoring helpers every mode uses the same way

use crate::ai::context::DecisionContext;
use crate::core::types::{Seconds, Team, Vec2, FREE_FOR_ALL};

/// How long a chosen objective is defended against better-looking ones
pub const COMMITMENT_WINDOW: Seconds = 8.0;
/// Score an alternative must exceed the committed objective by to win early
pub const COMMITMENT_BONUS: f32 = 25.0;

/// Points lost per world unit between the bot and an objective
pub(crate) const DISTANCE_PENALTY: f32 = 0.02;
/// Points lost per visible enemy near an objective, scaled by caution
pub(crate) const THREAT_PENALTY: f32 = 8.0;
/// Radius used to measure threat density around an objective
pub(crate) const THREAT_RADIUS: f32 = 400.0;

/// Time-boxed preference for a previously selected objective
///
/// Within the window the committed key is kept as long as it is still on
/// offer and no option beats it by more than the bonus. The window starts
/// when a key is first chosen and is never renewed by keeping it.
#[derive(Debug, Clone)]
pub struct Commitment<K> {
    current: Option<K>,
    since: Seconds,
    window: Seconds,
    bonus: f32,
}

impl<K> Default for Commitment<K> {
    fn default() -> Self {
        Self {
            current: None,
            since: 0.0,
            window: COMMITMENT_WINDOW,
            bonus: COMMITMENT_BONUS,
        }
    }
}

impl<K: Copy + PartialEq> Commitment<K> {
    pub fn new(window: Seconds, bonus: f32) -> Self {
        Self {
            current: None,
            since: 0.0,
            window,
            bonus,
        }
    }

    pub fn current(&self) -> Option<K> {
        self.current
    }

    pub fn is_active(&self, now: Seconds) -> bool {
        self.current.is_some() && now - self.since < self.window
    }

    /// Pick among scored options; first option wins ties
    pub fn choose(&mut self, options: &[(K, f32)], now: Seconds) -> Option<K> {
        let mut best: Option<(K, f32)> = None;
        for &(key, score) in options {
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((key, score));
            }
        }
        let Some((best_key, best_score)) = best else {
            self.current = None;
            return None;
        };

        if let Some(current) = self.current {
            let committed = options.iter().find(|(k, _)| *k == current).map(|&(_, s)| s);
            if let Some(score) = committed {
                if self.is_active(now) && best_score <= score + self.bonus {
                    return Some(current);
                }
            }
        }

        if self.current != Some(best_key) {
            self.since = now;
        }
        self.current = Some(best_key);
        Some(best_key)
    }
}

/// Fixed-interval role re-evaluation on the bot clock
#[derive(Debug, Clone)]
pub struct RoleClock {
    next_eval: Option<Seconds>,
    interval: Seconds,
}

impl RoleClock {
    pub fn new(interval: Seconds) -> Self {
        Self { next_eval: None, interval }
    }

    /// True (and re-armed) if a re-evaluation is due at `clock`
    pub fn due(&mut self, clock: Seconds) -> bool {
        if self.next_eval.is_some_and(|next| clock < next) {
            return false;
        }
        self.next_eval = Some(clock + self.interval);
        true
    }

    /// Make the next call to `due` succeed
    pub fn force(&mut self) {
        self.next_eval = None;
    }
}

/// Whether `team` is the bot's own (never true in free-for-all)
pub(crate) fn is_own_team(ctx: &DecisionContext, team: Option<Team>) -> bool {
    ctx.me.team != FREE_FOR_ALL && team == Some(ctx.me.team)
}

/// Distance and local-threat penalty shared by every objective score
pub(crate) fn approach_cost(ctx: &DecisionContext, position: Vec2) -> f32 {
    let caution = 1.0 - ctx.personality.risk_tolerance();
    ctx.position().distance(position) * DISTANCE_PENALTY
        + ctx.threat_density(position, THREAT_RADIUS) * THREAT_PENALTY * caution
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_holds_within_window() {
        let mut c: Commitment<u32> = Commitment::default();
        assert_eq!(c.choose(&[(1, 28.0), (2, 28.0)], 0.0), Some(1));
        // Alternative 20 points better at t=3: stay
        assert_eq!(c.choose(&[(1, 8.0), (2, 28.0)], 3.0), Some(1));
        // Past the window: switch
        assert_eq!(c.choose(&[(1, 8.0), (2, 28.0)], 8.5), Some(2));
    }

    #[test]
    fn test_commitment_broken_by_large_margin() {
        let mut c: Commitment<u32> = Commitment::default();
        c.choose(&[(1, 30.0), (2, 10.0)], 0.0);
        assert_eq!(c.choose(&[(1, 30.0), (2, 56.0)], 1.0), Some(2));
    }

    #[test]
    fn test_commitment_dropped_when_invalid() {
        let mut c: Commitment<u32> = Commitment::default();
        c.choose(&[(1, 30.0), (2, 10.0)], 0.0);
        assert_eq!(c.choose(&[(2, 10.0)], 1.0), Some(2));
        assert_eq!(c.choose(&[], 2.0), None);
        assert_eq!(c.current(), None);
    }

    #[test]
    fn test_commitment_not_renewed() {
        let mut c: Commitment<u32> = Commitment::default();
        c.choose(&[(1, 30.0)], 0.0);
        c.choose(&[(1, 30.0), (2, 20.0)], 6.0);
        assert!(!c.is_active(8.0));
        assert_eq!(c.choose(&[(1, 30.0), (2, 31.0)], 9.0), Some(2));
    }

    #[test]
    fn test_role_clock_interval() {
        let mut clock = RoleClock::new(2.0);
        assert!(clock.due(0.0));
        assert!(!clock.due(1.9));
        assert!(clock.due(2.0));
        clock.force();
        assert!(clock.due(2.1));
    }
}
