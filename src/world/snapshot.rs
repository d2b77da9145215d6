//! Read-only view of the world taken at the start of a tick
//!
//! The authoritative simulation builds one `WorldSnapshot` per tick and every
//! bot decides against it. Nothing in this crate mutates a snapshot.

use serde::{Deserialize, Serialize};

use crate::core::types::{same_team, EntityId, Seconds, Team, Vec2, WorldBounds};

/// Public state of a player (human or bot)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: EntityId,
    pub team: Team,
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// False while dead or spectating
    pub active: bool,
    /// Rounds left in the current magazine
    pub ammo: u32,
    pub kills: u32,
    pub deaths: u32,
    /// Whether the equipped utility is off cooldown
    pub utility_ready: bool,
}

impl PlayerState {
    pub fn new(id: EntityId, team: Team, position: Vec2) -> Self {
        Self {
            id,
            team,
            position,
            velocity: Vec2::ZERO,
            health: 100.0,
            max_health: 100.0,
            active: true,
            ammo: 30,
            kills: 0,
            deaths: 0,
            utility_ready: true,
        }
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// An automated defense placed by a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurretState {
    pub id: EntityId,
    pub owner: EntityId,
    pub team: Team,
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub active: bool,
}

/// Whether a zone is a capture point (area control) or a hill (zone control)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneKind {
    ControlPoint,
    Hill,
}

/// A circular area that teams fight over
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneState {
    pub id: EntityId,
    pub kind: ZoneKind,
    pub position: Vec2,
    pub radius: f32,
    /// Team currently holding the zone, if any
    pub controlling_team: Option<Team>,
    /// Players of more than one team are inside
    pub contested: bool,
    /// Hills rotate; inactive zones are ignored
    pub active: bool,
}

impl ZoneState {
    pub fn contains(&self, point: Vec2) -> bool {
        self.position.distance(point) <= self.radius
    }
}

/// A team flag for capture-the-flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagState {
    pub id: EntityId,
    pub team: Team,
    /// Where the flag rests and where captures are scored
    pub home: Vec2,
    pub position: Vec2,
    pub carrier: Option<EntityId>,
    pub at_home: bool,
}

impl FlagState {
    pub fn is_dropped(&self) -> bool {
        self.carrier.is_none() && !self.at_home
    }
}

/// A destructible team base or objective-defense asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseState {
    pub id: EntityId,
    pub team: Team,
    /// Owning player in free-for-all modes
    pub owner: Option<EntityId>,
    pub position: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub active: bool,
}

impl BaseState {
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// A single contested item that players pick up and carry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarriedItemState {
    pub id: EntityId,
    pub position: Vec2,
    pub carrier: Option<EntityId>,
    /// Where a carrier scores by delivering the item; `None` means "survive while holding"
    pub delivery_point: Option<Vec2>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LootKind {
    Ammo,
    Health,
    Armor,
    Weapon,
}

/// A pickup spawner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootStationState {
    pub id: EntityId,
    pub kind: LootKind,
    pub position: Vec2,
    /// Relative worth in [0, 1]
    pub value: f32,
    pub available: bool,
    /// Seconds until the pickup respawns when not available
    pub respawn_in: Seconds,
}

/// Everything a bot may read during one tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Simulation clock at the start of the tick
    pub time: Seconds,
    pub bounds: WorldBounds,
    pub players: Vec<PlayerState>,
    pub turrets: Vec<TurretState>,
    pub control_points: Vec<ZoneState>,
    pub zones: Vec<ZoneState>,
    pub flags: Vec<FlagState>,
    pub bases: Vec<BaseState>,
    pub carried_items: Vec<CarriedItemState>,
    pub loot_stations: Vec<LootStationState>,
}

impl WorldSnapshot {
    pub fn new(time: Seconds) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    pub fn player(&self, id: EntityId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn turret(&self, id: EntityId) -> Option<&TurretState> {
        self.turrets.iter().find(|t| t.id == id)
    }

    pub fn base(&self, id: EntityId) -> Option<&BaseState> {
        self.bases.iter().find(|b| b.id == id)
    }

    /// Active players hostile to `me` within `range` of `origin`
    pub fn enemies_near<'a>(
        &'a self,
        me: &'a PlayerState,
        origin: Vec2,
        range: f32,
    ) -> impl Iterator<Item = &'a PlayerState> + 'a {
        self.players.iter().filter(move |p| {
            p.active
                && p.id != me.id
                && !same_team(me.team, p.team)
                && p.position.distance(origin) <= range
        })
    }

    /// Active teammates of `me` (excluding `me`) within `range` of `origin`
    pub fn allies_near<'a>(
        &'a self,
        me: &'a PlayerState,
        origin: Vec2,
        range: f32,
    ) -> impl Iterator<Item = &'a PlayerState> + 'a {
        self.players.iter().filter(move |p| {
            p.active
                && p.id != me.id
                && same_team(me.team, p.team)
                && p.position.distance(origin) <= range
        })
    }

    /// Closest hostile player to `me` within `range`
    pub fn nearest_enemy<'a>(&'a self, me: &'a PlayerState, range: f32) -> Option<&'a PlayerState> {
        self.enemies_near(me, me.position, range).min_by(|a, b| {
            a.position
                .distance_squared(me.position)
                .total_cmp(&b.position.distance_squared(me.position))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> WorldSnapshot {
        let mut world = WorldSnapshot::new(0.0);
        world.players.push(PlayerState::new(EntityId(1), 1, Vec2::ZERO));
        world.players.push(PlayerState::new(EntityId(2), 1, Vec2::new(50.0, 0.0)));
        world.players.push(PlayerState::new(EntityId(3), 2, Vec2::new(100.0, 0.0)));
        world.players.push(PlayerState::new(EntityId(4), 2, Vec2::new(300.0, 0.0)));
        world
    }

    #[test]
    fn test_enemies_near_excludes_allies_and_self() {
        let world = snapshot();
        let me = world.player(EntityId(1)).unwrap();
        let ids: Vec<_> = world.enemies_near(me, me.position, 200.0).map(|p| p.id).collect();
        assert_eq!(ids, vec![EntityId(3)]);
    }

    #[test]
    fn test_nearest_enemy() {
        let world = snapshot();
        let me = world.player(EntityId(1)).unwrap();
        assert_eq!(world.nearest_enemy(me, 1000.0).map(|p| p.id), Some(EntityId(3)));
    }

    #[test]
    fn test_free_for_all_everyone_is_enemy() {
        let mut world = snapshot();
        for p in &mut world.players {
            p.team = 0;
        }
        let me = world.player(EntityId(1)).unwrap();
        assert_eq!(world.enemies_near(me, me.position, 1000.0).count(), 3);
        assert_eq!(world.allies_near(me, me.position, 1000.0).count(), 0);
    }

    #[test]
    fn test_flag_dropped() {
        let flag = FlagState {
            id: EntityId(10),
            team: 1,
            home: Vec2::ZERO,
            position: Vec2::new(10.0, 0.0),
            carrier: None,
            at_home: false,
        };
        assert!(flag.is_dropped());
    }
}
