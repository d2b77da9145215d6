//! Shared tactical movement, aiming, firing and reload rules
//!
//! Behaviors compose these helpers; none of them hold state. Anything
//! periodic takes the bot's accumulated clock as input.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::ai::context::DecisionContext;
use crate::core::types::{direction, perpendicular, Seconds, Vec2, WorldBounds};
use crate::world::registry::WeaponStats;

/// Below this distance the fire probability starts rising above the floor
const POINT_BLANK: f32 = 200.0;
/// Minimum chance to pull the trigger once a shot is allowed
const FIRE_PROBABILITY_FLOOR: f64 = 0.6;
/// Spread radius per unit distance at zero accuracy
const INACCURACY_PER_UNIT: f32 = 0.12;
/// Movement shorter than this counts as stopped
const STOPPED: f32 = 0.05;
/// How much a weapon may be fired beyond its listed range
const RANGE_SLACK: f32 = 1.1;
/// Close in when further than this multiple of the optimal range
const CLOSE_IN: f32 = 1.2;
const MIN_RANGE_FLOOR: f32 = 60.0;

/// Predicted intercept point for a projectile weapon
///
/// Beam-class weapons aim at the current position.
pub fn lead_target(shooter: Vec2, target: Vec2, target_velocity: Vec2, weapon: &WeaponStats) -> Vec2 {
    if weapon.is_instant() {
        return target;
    }
    let mut predicted = target;
    // Two refinement passes are enough at arena speeds
    for _ in 0..2 {
        let time_of_flight = shooter.distance(predicted) / weapon.projectile_speed;
        predicted = target + target_velocity * time_of_flight;
    }
    predicted
}

/// Random aim error that grows with distance and (1 - accuracy)
pub fn apply_inaccuracy(aim: Vec2, distance: f32, accuracy: f32, weapon: &WeaponStats, rng: &mut ChaCha8Rng) -> Vec2 {
    let spread = (1.0 - accuracy) * distance * INACCURACY_PER_UNIT * (1.5 - 0.5 * weapon.accuracy);
    if spread <= 0.0 {
        return aim;
    }
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let radius = spread * rng.gen::<f32>().sqrt();
    aim + Vec2::from_angle(angle) * radius
}

/// Lead + inaccuracy, using the bot's personality and weapon
pub fn aim_at(ctx: &DecisionContext, target: Vec2, target_velocity: Vec2, rng: &mut ChaCha8Rng) -> Vec2 {
    let weapon = ctx.weapon();
    let lead = lead_target(ctx.position(), target, target_velocity, weapon);
    let distance = ctx.position().distance(target);
    apply_inaccuracy(lead, distance, ctx.personality.accuracy(), weapon, rng)
}

/// Fire if the shot interval elapsed, the target is in range and the roll passes
///
/// The roll never drops below 60% and climbs to 100% at point blank.
pub fn should_fire(
    ctx: &DecisionContext,
    distance: f32,
    last_shot: Option<Seconds>,
    rng: &mut ChaCha8Rng,
) -> bool {
    let weapon = ctx.weapon();
    if ctx.me.ammo == 0 || distance > weapon.range * RANGE_SLACK {
        return false;
    }
    if let Some(last) = last_shot {
        if ctx.clock - last < weapon.fire_interval {
            return false;
        }
    }
    let closeness = (1.0 - distance / POINT_BLANK).clamp(0.0, 1.0) as f64;
    let probability = FIRE_PROBABILITY_FLOOR + (1.0 - FIRE_PROBABILITY_FLOOR) * closeness;
    rng.gen_bool(probability.min(1.0))
}

/// Inputs of the reload rule
#[derive(Debug, Clone, Copy)]
pub struct ReloadInputs {
    pub ammo: u32,
    pub magazine: u32,
    pub retreating: bool,
    /// Distance to the current target; `None` when there is no live target
    pub target_distance: Option<f32>,
}

impl ReloadInputs {
    pub fn from_context(ctx: &DecisionContext, retreating: bool, target_distance: Option<f32>) -> Self {
        Self {
            ammo: ctx.me.ammo,
            magazine: ctx.weapon().magazine_size,
            retreating,
            target_distance,
        }
    }
}

/// Reload rule shared by every behavior that fires
pub fn should_reload(inputs: ReloadInputs) -> bool {
    if inputs.ammo == 0 {
        return true;
    }
    let fraction = inputs.ammo as f32 / inputs.magazine.max(1) as f32;
    let distance = inputs.target_distance.unwrap_or(f32::INFINITY);

    // Enemy in your face and enough rounds left: keep shooting
    let meaningful = inputs.ammo >= 3u32.max(inputs.magazine / 5);
    if distance < 150.0 && meaningful {
        return false;
    }

    (inputs.retreating && fraction < 0.5)
        || (distance > 300.0 && inputs.ammo < 3)
        || (distance > 250.0 && fraction < 0.25)
        || (inputs.target_distance.is_none() && fraction < 0.4)
}

/// Circle-strafe around `target` while correcting toward `optimal` distance
///
/// The strafe side flips on a sine of the bot clock whose frequency rises
/// with mobility; `phase` desynchronizes bots.
pub fn orbit(me: Vec2, target: Vec2, optimal: f32, clock: Seconds, mobility: f32, phase: f32) -> Vec2 {
    let to_target = direction(me, target);
    if to_target == Vec2::ZERO {
        return Vec2::ZERO;
    }
    let distance = me.distance(target);
    let frequency = 0.6 + mobility * 1.4;
    let side = if (clock * frequency + phase).sin() >= 0.0 { 1.0 } else { -1.0 };
    let lateral = perpendicular(to_target) * side * (0.5 + 0.5 * mobility);
    let radial = if optimal > 0.0 {
        to_target * ((distance - optimal) / optimal).clamp(-1.0, 1.0) * 0.35
    } else {
        Vec2::ZERO
    };
    (lateral + radial).normalize_or_zero()
}

/// Distance inside which a fighter backs away from its target
pub fn min_engage_range(ctx: &DecisionContext) -> f32 {
    (ctx.personality.preferred_combat_range() * 0.5)
        .max(MIN_RANGE_FLOOR)
        .min(ctx.weapon().optimal_range() * 0.8)
}

/// Close in, back off or strafe around a target `distance` away
pub fn fighting_movement(ctx: &DecisionContext, target: Vec2, distance: f32) -> Vec2 {
    let me = ctx.position();
    let optimal = ctx.weapon().optimal_range();
    if distance > optimal * CLOSE_IN {
        return direction(me, target);
    }
    if distance < min_engage_range(ctx) {
        let away = direction(target, me);
        return (away + perpendicular(away) * 0.4).normalize_or_zero();
    }
    orbit(me, target, optimal, ctx.clock, ctx.personality.mobility(), phase_offset(ctx.me.id.0))
}

/// Close on `goal` with a lateral weave (attackers feint while closing)
pub fn feint_toward(me: Vec2, goal: Vec2, clock: Seconds, mobility: f32, phase: f32) -> Vec2 {
    let forward = direction(me, goal);
    if forward == Vec2::ZERO {
        return Vec2::ZERO;
    }
    let weave = (clock * (1.0 + mobility * 2.0) + phase).sin() * (0.2 + 0.4 * mobility);
    (forward + perpendicular(forward) * weave).normalize_or_zero()
}

/// Move away from a threat while staying inside the arena
pub fn retreat_from(me: Vec2, threat: Vec2, bounds: &WorldBounds) -> Vec2 {
    let mut away = direction(threat, me);
    if away == Vec2::ZERO {
        away = direction(me, bounds.center());
    }
    let probe = me + away * 150.0;
    if !bounds.contains(probe) {
        // Pinned against a wall: slide along it instead of into it
        let slide = perpendicular(away);
        let alt = if bounds.contains(me + slide * 150.0) { slide } else { -slide };
        away = (away * 0.3 + alt).normalize_or_zero();
    }
    away
}

/// Head to `goal` (if any) while being pushed away from nearby threats
pub fn evade(me: Vec2, threats: impl Iterator<Item = Vec2>, goal: Option<Vec2>, radius: f32) -> Vec2 {
    let mut push = Vec2::ZERO;
    for threat in threats {
        let distance = me.distance(threat);
        if distance < radius && distance > 1e-3 {
            push += direction(threat, me) * (1.0 - distance / radius);
        }
    }
    let pull = goal.map(|g| direction(me, g)).unwrap_or(Vec2::ZERO);
    let combined = pull + push * 1.2;
    if combined.length() < STOPPED {
        // Threats cancel the pull; sidestep rather than freeze
        return perpendicular(pull).normalize_or_zero();
    }
    combined.normalize_or_zero()
}

/// Point on a patrol ring around `center` for the current clock
pub fn patrol_point(center: Vec2, radius: f32, clock: Seconds, mobility: f32, phase: f32) -> Vec2 {
    let angular_speed = 0.3 + 0.5 * mobility;
    center + Vec2::from_angle(clock * angular_speed + phase) * radius
}

/// Unit vector toward `goal`, or zero when already there
pub fn steer_to(me: Vec2, goal: Vec2, arrive: f32) -> Vec2 {
    if me.distance(goal) <= arrive {
        return Vec2::ZERO;
    }
    direction(me, goal)
}

/// Guarantee non-zero movement: continue the previous heading or jitter
pub fn keep_moving(movement: Vec2, previous: Vec2, rng: &mut ChaCha8Rng) -> Vec2 {
    if movement.length() >= STOPPED {
        return movement;
    }
    if previous.length() >= STOPPED {
        return previous.normalize_or_zero();
    }
    Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU))
}

/// Stable per-bot phase offset so bots don't strafe in lockstep
pub fn phase_offset(id: u32) -> f32 {
    (id.wrapping_mul(2_654_435_761) % 6283) as f32 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::registry::Registry;
    use rand::SeedableRng;

    fn weapon(name: &str) -> WeaponStats {
        Registry::with_defaults().weapon(name).unwrap().clone()
    }

    #[test]
    fn test_lead_moves_aim_ahead() {
        let aim = lead_target(Vec2::ZERO, Vec2::new(900.0, 0.0), Vec2::new(0.0, 200.0), &weapon("rifle"));
        assert!(aim.y > 90.0 && aim.y < 110.0, "expected ~0.5s lead, got {:?}", aim);
    }

    #[test]
    fn test_beam_has_no_lead() {
        let target = Vec2::new(300.0, 0.0);
        assert_eq!(lead_target(Vec2::ZERO, target, Vec2::new(0.0, 200.0), &weapon("lance")), target);
    }

    #[test]
    fn test_perfect_accuracy_no_spread() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let aim = Vec2::new(500.0, 0.0);
        assert_eq!(apply_inaccuracy(aim, 500.0, 1.0, &weapon("rifle"), &mut rng), aim);
    }

    #[test]
    fn test_spread_bounded_by_distance() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let w = weapon("rifle");
        for _ in 0..100 {
            let aim = apply_inaccuracy(Vec2::ZERO, 100.0, 0.0, &w, &mut rng);
            assert!(aim.length() <= 100.0 * INACCURACY_PER_UNIT * 1.5 + 1e-3);
        }
    }

    #[test]
    fn test_reload_empty_is_mandatory() {
        let inputs = ReloadInputs { ammo: 0, magazine: 30, retreating: false, target_distance: Some(50.0) };
        assert!(should_reload(inputs));
    }

    #[test]
    fn test_reload_suppressed_up_close() {
        let inputs = ReloadInputs { ammo: 7, magazine: 30, retreating: true, target_distance: Some(100.0) };
        assert!(!should_reload(inputs));
    }

    #[test]
    fn test_reload_rules() {
        let base = ReloadInputs { ammo: 14, magazine: 30, retreating: true, target_distance: Some(400.0) };
        assert!(should_reload(base));
        assert!(!should_reload(ReloadInputs { retreating: false, ..base }));
        assert!(should_reload(ReloadInputs { ammo: 2, magazine: 5, retreating: false, target_distance: Some(350.0) }));
        assert!(should_reload(ReloadInputs { ammo: 7, retreating: false, target_distance: Some(260.0), ..base }));
        assert!(should_reload(ReloadInputs { ammo: 11, retreating: false, target_distance: None, ..base }));
        assert!(!should_reload(ReloadInputs { ammo: 13, retreating: false, target_distance: None, ..base }));
    }

    #[test]
    fn test_orbit_is_mostly_lateral_at_optimal() {
        let v = orbit(Vec2::ZERO, Vec2::new(300.0, 0.0), 300.0, 1.0, 0.5, 0.0);
        assert!((v.length() - 1.0).abs() < 1e-4);
        assert!(v.x.abs() < 1e-4);
    }

    #[test]
    fn test_orbit_corrects_toward_optimal() {
        let far = orbit(Vec2::ZERO, Vec2::new(600.0, 0.0), 300.0, 1.0, 0.5, 0.0);
        assert!(far.x > 0.0);
        let near = orbit(Vec2::ZERO, Vec2::new(150.0, 0.0), 300.0, 1.0, 0.5, 0.0);
        assert!(near.x < 0.0);
    }

    #[test]
    fn test_retreat_slides_along_wall() {
        let bounds = WorldBounds::new(Vec2::new(-100.0, -100.0), Vec2::new(100.0, 100.0));
        let v = retreat_from(Vec2::new(95.0, 0.0), Vec2::new(0.0, 0.0), &bounds);
        assert!(v.length() > 0.9);
        assert!(v.y.abs() > 0.5);
    }

    #[test]
    fn test_evade_never_freezes() {
        let me = Vec2::ZERO;
        let goal = Some(Vec2::new(100.0, 0.0));
        // Push from this threat cancels the pull almost exactly
        let threats = vec![Vec2::new(83.333, 0.0)];
        let v = evade(me, threats.into_iter(), goal, 500.0);
        assert!(v.length() > 0.5);
    }

    #[test]
    fn test_keep_moving_fallbacks() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(keep_moving(Vec2::ZERO, Vec2::new(0.0, 2.0), &mut rng), Vec2::Y);
        assert!(keep_moving(Vec2::ZERO, Vec2::ZERO, &mut rng).length() > 0.99);
    }
}
