//! Fixed combat constants and damage arithmetic.

use oakhaven_domain::catalog::has_high_defense;
use oakhaven_domain::{DiceFormula, Position};

/// Chebyshev reach of every melee attack.
pub const MELEE_RANGE: i32 = 1;
pub const PLAYER_HIT_BONUS: i32 = 2;
pub const RAGE_HIT_BONUS: i32 = 2;
pub const RAGE_TURNS: u32 = 3;
pub const HEAVY_STRIKE_HIT_PENALTY: i32 = 2;
pub const HEAVY_STRIKE_DICE: DiceFormula = DiceFormula::fixed(2, 8, 0);
pub const CLEAVE_HIT_BONUS: i32 = 2;
pub const CLEAVE_DICE: DiceFormula = DiceFormula::die(6);
pub const KICK_DC: i32 = 12;
pub const SECOND_WIND_DICE: DiceFormula = DiceFormula::die(10);
pub const FLEE_DISTANCE: i32 = 3;
pub const MONSTER_HIT_BONUS: i32 = 2;
pub const ALLY_HIT_BONUS: i32 = 3;
pub const ALLY_DAMAGE: DiceFormula = DiceFormula::fixed(1, 6, 1);
pub const ALLY_INITIATIVE_BONUS: i32 = 1;
/// Tiles revealed around every combatant when a fight starts.
pub const REVEAL_RADIUS: i32 = 2;

pub fn in_melee(a: &Position, b: &Position) -> bool {
    a.same_level(b) && a.chebyshev(b) <= MELEE_RANGE
}

/// ×1.2, rounded down.
pub fn rage_scaled(amount: i32) -> i32 {
    (amount * 6).div_euclid(5)
}

/// `floor(1.5 × modifier)`.
pub fn heavy_strike_bonus(strength_mod: i32) -> i32 {
    (strength_mod * 3).div_euclid(2)
}

/// Final damage of a landed hit.
///
/// Rage scales first, then the target's armour halves, and a hit always
/// deals at least 1.
pub fn hit_damage(raw: i32, attacker_raging: bool, target_archetype: &str) -> i32 {
    let mut damage = raw;
    if attacker_raging {
        damage = rage_scaled(damage);
    }
    if has_high_defense(target_archetype) {
        damage = (damage / 2).max(1);
    }
    damage.max(1)
}

/// Damage a raging player suffers from a hit of `amount`.
pub fn damage_to_player(amount: i32, player_raging: bool) -> i32 {
    let amount = amount.max(1);
    if player_raging {
        rage_scaled(amount)
    } else {
        amount
    }
}
