//! Target selection across heterogeneous attackable entities
//!
//! Players, turrets and bases are normalized into `Candidate`s once per
//! scoring pass, then scored with a single weighted sum. Candidates are never
//! stored between passes.

use crate::core::config::AiConfig;
use crate::core::types::{same_team, EntityId, Team, Vec2, FREE_FOR_ALL};
use crate::world::snapshot::{PlayerState, WorldSnapshot};

/// Kind of attackable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    Player,
    Turret,
    Base,
}

impl CandidateKind {
    /// Type-priority weight: players outrank turrets, turrets outrank bases
    pub fn priority_weight(&self) -> f32 {
        match self {
            CandidateKind::Player => 1.0,
            CandidateKind::Turret => 0.6,
            CandidateKind::Base => 0.4,
        }
    }
}

/// Normalized scoring view of a potential target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub id: EntityId,
    pub kind: CandidateKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub team: Team,
    pub owner: Option<EntityId>,
    pub type_weight: f32,
}

impl Candidate {
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// Which entity kinds a query considers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindFilter {
    pub players: bool,
    pub turrets: bool,
    pub bases: bool,
}

impl KindFilter {
    pub const COMBATANTS: KindFilter = KindFilter { players: true, turrets: true, bases: false };
    pub const PLAYERS: KindFilter = KindFilter { players: true, turrets: false, bases: false };
    pub const ALL: KindFilter = KindFilter { players: true, turrets: true, bases: true };
}

/// Parameters of one selection pass
#[derive(Debug, Clone, Copy)]
pub struct TargetQuery {
    /// Candidates beyond this distance are ignored (400-800 per behavior)
    pub cutoff: f32,
    /// Effective range of the equipped weapon
    pub weapon_range: f32,
    /// Target kept from the previous pass, earns the continuity bonus
    pub current: Option<EntityId>,
    pub kinds: KindFilter,
    /// Only consider candidates within `cutoff` of this point instead of the bot
    pub anchor: Option<Vec2>,
}

impl TargetQuery {
    pub fn new(cutoff: f32, weapon_range: f32) -> Self {
        Self {
            cutoff,
            weapon_range,
            current: None,
            kinds: KindFilter::COMBATANTS,
            anchor: None,
        }
    }

    pub fn with_current(mut self, current: Option<EntityId>) -> Self {
        self.current = current;
        self
    }

    pub fn with_kinds(mut self, kinds: KindFilter) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn anchored_at(mut self, anchor: Vec2) -> Self {
        self.anchor = Some(anchor);
        self
    }
}

/// Winner of a selection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredTarget {
    pub candidate: Candidate,
    pub score: f32,
    pub distance: f32,
}

/// Weapon effectiveness at `distance`, peaking at 60-80% of `range`
///
/// Rises from 0.5 at point blank to 1.0 at 60% of range, stays flat to 80%,
/// then falls to 0.0 at 120% of range.
pub fn effectiveness_at_range(distance: f32, range: f32) -> f32 {
    if range <= 0.0 {
        return 0.0;
    }
    let ratio = distance / range;
    if ratio < 0.6 {
        0.5 + 0.5 * (ratio / 0.6)
    } else if ratio <= 0.8 {
        1.0
    } else {
        (1.0 - (ratio - 0.8) / 0.4).max(0.0)
    }
}

/// True if `candidate` may be attacked by `me`
///
/// Teammates are excluded when teams exist; in free-for-all a bot never
/// targets assets it owns.
pub fn is_hostile(me: &PlayerState, candidate: &Candidate) -> bool {
    if candidate.id == me.id {
        return false;
    }
    if me.team == FREE_FOR_ALL {
        return candidate.owner != Some(me.id);
    }
    !same_team(me.team, candidate.team)
}

/// Scores candidates with the weights from `AiConfig`
#[derive(Debug, Clone)]
pub struct TargetSelector {
    proximity_weight: f32,
    health_deficit_weight: f32,
    wounded_bonus: f32,
    finishing_bonus: f32,
    continuity_bonus: f32,
    type_weight: f32,
    effectiveness_weight: f32,
}

impl TargetSelector {
    pub fn new(config: &AiConfig) -> Self {
        Self {
            proximity_weight: config.proximity_weight,
            health_deficit_weight: config.health_deficit_weight,
            wounded_bonus: config.wounded_bonus,
            finishing_bonus: config.finishing_bonus,
            continuity_bonus: config.continuity_bonus,
            type_weight: config.type_weight,
            effectiveness_weight: config.effectiveness_weight,
        }
    }

    /// Normalize every active, hostile entity within the cutoff
    pub fn candidates(&self, me: &PlayerState, world: &WorldSnapshot, query: &TargetQuery) -> Vec<Candidate> {
        let origin = query.anchor.unwrap_or(me.position);
        let mut out = Vec::new();

        if query.kinds.players {
            out.extend(world.players.iter().filter(|p| p.active).map(|p| Candidate {
                id: p.id,
                kind: CandidateKind::Player,
                position: p.position,
                velocity: p.velocity,
                health: p.health,
                max_health: p.max_health,
                team: p.team,
                owner: None,
                type_weight: CandidateKind::Player.priority_weight(),
            }));
        }
        if query.kinds.turrets {
            out.extend(world.turrets.iter().filter(|t| t.active).map(|t| Candidate {
                id: t.id,
                kind: CandidateKind::Turret,
                position: t.position,
                velocity: Vec2::ZERO,
                health: t.health,
                max_health: t.max_health,
                team: t.team,
                owner: Some(t.owner),
                type_weight: CandidateKind::Turret.priority_weight(),
            }));
        }
        if query.kinds.bases {
            out.extend(world.bases.iter().filter(|b| b.active).map(|b| Candidate {
                id: b.id,
                kind: CandidateKind::Base,
                position: b.position,
                velocity: Vec2::ZERO,
                health: b.health,
                max_health: b.max_health,
                team: b.team,
                owner: b.owner,
                type_weight: CandidateKind::Base.priority_weight(),
            }));
        }

        out.retain(|c| is_hostile(me, c) && c.position.distance(origin) <= query.cutoff);
        out
    }

    /// Weighted score of one candidate seen from `from`
    pub fn score(&self, from: Vec2, candidate: &Candidate, query: &TargetQuery) -> f32 {
        let distance = from.distance(candidate.position);
        let proximity = if query.cutoff > 0.0 {
            (1.0 - distance / query.cutoff).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let health = candidate.health_fraction();

        let mut score = proximity * self.proximity_weight + (1.0 - health) * self.health_deficit_weight;
        if health < 0.75 {
            score += self.wounded_bonus;
        }
        if health < 0.5 {
            score += self.finishing_bonus;
        }
        if query.current == Some(candidate.id) {
            score += self.continuity_bonus;
        }
        score += candidate.type_weight * self.type_weight;
        score += effectiveness_at_range(distance, query.weapon_range) * self.effectiveness_weight;
        score
    }

    /// Best candidate, or `None` if there are none or the best scores <= 0
    pub fn select(&self, me: &PlayerState, world: &WorldSnapshot, query: &TargetQuery) -> Option<ScoredTarget> {
        let mut best: Option<ScoredTarget> = None;
        for candidate in self.candidates(me, world, query) {
            let score = self.score(me.position, &candidate, query);
            if best.map_or(true, |b| score > b.score) {
                best = Some(ScoredTarget {
                    candidate,
                    score,
                    distance: me.position.distance(candidate.position),
                });
            }
        }
        best.filter(|b| b.score > 0.0)
    }

    /// Re-resolve a previously chosen target id against the snapshot
    pub fn resolve(&self, me: &PlayerState, world: &WorldSnapshot, id: EntityId) -> Option<Candidate> {
        let query = TargetQuery::new(f32::INFINITY, 1.0).with_kinds(KindFilter::ALL);
        self.candidates(me, world, &query).into_iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::snapshot::{BaseState, TurretState};

    fn world_with(players: Vec<PlayerState>) -> WorldSnapshot {
        let mut world = WorldSnapshot::new(0.0);
        world.players = players;
        world
    }

    fn selector() -> TargetSelector {
        TargetSelector::new(&AiConfig::default())
    }

    #[test]
    fn test_effectiveness_curve_peak() {
        assert_eq!(effectiveness_at_range(70.0, 100.0), 1.0);
        assert_eq!(effectiveness_at_range(60.0, 100.0), 1.0);
        assert!((effectiveness_at_range(0.0, 100.0) - 0.5).abs() < 1e-6);
        assert!(effectiveness_at_range(100.0, 100.0) < 1.0);
        assert_eq!(effectiveness_at_range(130.0, 100.0), 0.0);
    }

    #[test]
    fn test_never_selects_teammate() {
        let me = PlayerState::new(EntityId(1), 1, Vec2::ZERO);
        let mate = PlayerState::new(EntityId(2), 1, Vec2::new(50.0, 0.0));
        let world = world_with(vec![me.clone(), mate]);
        let query = TargetQuery::new(800.0, 600.0);
        assert!(selector().select(&me, &world, &query).is_none());
    }

    #[test]
    fn test_prefers_wounded_target() {
        let me = PlayerState::new(EntityId(1), 1, Vec2::ZERO);
        let healthy = PlayerState::new(EntityId(2), 2, Vec2::new(300.0, 0.0));
        let mut wounded = PlayerState::new(EntityId(3), 2, Vec2::new(330.0, 0.0));
        wounded.health = 30.0;
        let world = world_with(vec![me.clone(), healthy, wounded]);
        let best = selector().select(&me, &world, &TargetQuery::new(800.0, 600.0)).unwrap();
        assert_eq!(best.candidate.id, EntityId(3));
    }

    #[test]
    fn test_continuity_bonus_keeps_target() {
        let me = PlayerState::new(EntityId(1), 1, Vec2::ZERO);
        let a = PlayerState::new(EntityId(2), 2, Vec2::new(300.0, 0.0));
        let b = PlayerState::new(EntityId(3), 2, Vec2::new(320.0, 0.0));
        let world = world_with(vec![me.clone(), a, b]);
        let query = TargetQuery::new(800.0, 600.0).with_current(Some(EntityId(3)));
        assert_eq!(selector().select(&me, &world, &query).unwrap().candidate.id, EntityId(3));
    }

    #[test]
    fn test_players_outrank_turrets() {
        let me = PlayerState::new(EntityId(1), 1, Vec2::ZERO);
        let enemy = PlayerState::new(EntityId(2), 2, Vec2::new(400.0, 0.0));
        let mut world = world_with(vec![me.clone(), enemy]);
        world.turrets.push(TurretState {
            id: EntityId(20),
            owner: EntityId(2),
            team: 2,
            position: Vec2::new(400.0, 10.0),
            health: 100.0,
            max_health: 100.0,
            active: true,
        });
        let best = selector().select(&me, &world, &TargetQuery::new(800.0, 600.0)).unwrap();
        assert_eq!(best.candidate.kind, CandidateKind::Player);
    }

    #[test]
    fn test_free_for_all_ignores_own_assets() {
        let me = PlayerState::new(EntityId(1), FREE_FOR_ALL, Vec2::ZERO);
        let mut world = world_with(vec![me.clone()]);
        world.turrets.push(TurretState {
            id: EntityId(20),
            owner: EntityId(1),
            team: FREE_FOR_ALL,
            position: Vec2::new(100.0, 0.0),
            health: 100.0,
            max_health: 100.0,
            active: true,
        });
        world.bases.push(BaseState {
            id: EntityId(30),
            team: FREE_FOR_ALL,
            owner: Some(EntityId(1)),
            position: Vec2::new(50.0, 0.0),
            radius: 60.0,
            health: 500.0,
            max_health: 500.0,
            active: true,
        });
        let query = TargetQuery::new(800.0, 600.0).with_kinds(KindFilter::ALL);
        assert!(selector().select(&me, &world, &query).is_none());
    }

    #[test]
    fn test_cutoff_and_inactive_filtered() {
        let me = PlayerState::new(EntityId(1), 1, Vec2::ZERO);
        let far = PlayerState::new(EntityId(2), 2, Vec2::new(900.0, 0.0));
        let mut dead = PlayerState::new(EntityId(3), 2, Vec2::new(100.0, 0.0));
        dead.active = false;
        let world = world_with(vec![me.clone(), far, dead]);
        assert!(selector().select(&me, &world, &TargetQuery::new(800.0, 600.0)).is_none());
    }
}
