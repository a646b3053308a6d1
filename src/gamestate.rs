//! The observable world reconstructed from the demo: players, teams,
//! projectiles, infernos, hostages, bomb sites and the sticky state the
//! event translator consults.

use std::collections::{HashMap, VecDeque};

use crate::equipment::{Equipment, EquipmentType};
use crate::events::{RoundEndReason, Team};

/// Entity handles address entities through their low bits.
pub const ENTITY_HANDLE_INDEX_MASK: u64 = 0x7FF;

#[derive(Debug, Clone)]
pub struct Player {
    pub user_id: i32,
    pub name: String,
    pub steam_id64: u64,
    /// Controller entity id, once seen.
    pub entity_id: Option<i32>,
    /// Pawn entity id, once seen.
    pub pawn_entity_id: Option<i32>,
    pub team: Team,
    pub health: i32,
    pub armor: i32,
    pub flash_duration: f32,
    pub position: [f32; 3],
    pub is_bot: bool,
    pub is_hltv: bool,
    pub is_connected: bool,
    pub is_planting: bool,
    pub is_defusing: bool,
    pub is_reloading: bool,
    /// Steam id of the bot this player currently controls.
    pub controlled_bot_steam_id: Option<u64>,
    pub weapons: Vec<Equipment>,
}

impl Player {
    pub fn new(user_id: i32) -> Self {
        Self {
            user_id,
            name: String::new(),
            steam_id64: 0,
            entity_id: None,
            pawn_entity_id: None,
            team: Team::Unassigned,
            health: 100,
            armor: 0,
            flash_duration: 0.0,
            position: [0.0; 3],
            is_bot: false,
            is_hltv: false,
            is_connected: true,
            is_planting: false,
            is_defusing: false,
            is_reloading: false,
            controlled_bot_steam_id: None,
            weapons: Vec::new(),
        }
    }

    pub fn weapon(&self, equipment_type: EquipmentType) -> Option<&Equipment> {
        let alternative = equipment_type.alternative();
        self.weapons.iter().find(|w| {
            w.equipment_type == equipment_type
                || (alternative != EquipmentType::Unknown && w.equipment_type == alternative)
        })
    }
}

#[derive(Debug, Clone)]
pub struct TeamState {
    pub team: Team,
    pub entity_id: i32,
    pub score: i32,
    pub clan_name: String,
}

/// An in-flight grenade entity; distinct from the thrown-grenade
/// bookkeeping used for event emission.
#[derive(Debug, Clone)]
pub struct GrenadeProjectile {
    pub entity_id: i32,
    pub equipment_type: EquipmentType,
    pub thrower_user_id: Option<i32>,
    pub position: [f32; 3],
}

#[derive(Debug, Clone)]
pub struct Inferno {
    pub entity_id: i32,
    pub thrower_user_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct Hostage {
    pub entity_id: i32,
    pub health: i32,
}

/// Axis-aligned trigger volume, used for the bomb-site fallback resolution.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub entity_id: i32,
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
}

impl Trigger {
    pub fn contains(&self, point: [f32; 3]) -> bool {
        (0..3).all(|axis| self.mins[axis] <= point[axis] && point[axis] <= self.maxs[axis])
    }
}

#[derive(Debug, Clone, Default)]
pub struct Bombsite {
    pub index: i32,
    pub center: [f32; 3],
}

/// Queue entry carrying a flashbang projectile plus the entity ids flashed
/// this frame.
#[derive(Debug, Clone)]
pub struct FlyingFlashbang {
    pub projectile_entity_id: i32,
    pub flashed_entity_ids: Vec<i32>,
    pub exploded_frame: i64,
}

#[derive(Debug, Clone, Default)]
pub struct RoundStartData {
    pub time_limit: i32,
    pub frag_limit: i32,
    pub objective: String,
}

#[derive(Debug, Clone)]
pub struct RoundEndData {
    pub message: String,
    pub reason: RoundEndReason,
    pub winner: Team,
}

/// Single-valued round-progress slots, drained in a fixed order at
/// end-of-frame.
#[derive(Debug, Default)]
pub struct PendingRoundEvents {
    pub match_started_changed: Option<(bool, bool)>,
    pub round_start: Option<RoundStartData>,
    pub freeze_time_start: bool,
    pub freeze_time_end: bool,
    pub round_end: Option<RoundEndData>,
}

#[derive(Debug, Default)]
pub struct GameState {
    pub players_by_user_id: HashMap<i32, Player>,
    /// Controller entity id to user id.
    pub players_by_entity_id: HashMap<i32, i32>,
    pub players_by_steam_id: HashMap<u64, i32>,
    /// Pawn entity id to user id.
    pub pawn_to_user_id: HashMap<i32, i32>,
    pub team_states: HashMap<Team, TeamState>,
    pub grenade_projectiles: HashMap<i32, GrenadeProjectile>,
    pub infernos: HashMap<i32, Inferno>,
    pub hostages: HashMap<i32, Hostage>,
    pub triggers: HashMap<i32, Trigger>,
    pub bombsite_a: Bombsite,
    pub bombsite_b: Bombsite,
    /// Per player, per grenade type, the equipment thrown and not yet
    /// expired.
    pub thrown_grenades: HashMap<i32, HashMap<EquipmentType, Vec<Equipment>>>,
    pub flying_flashbangs: VecDeque<FlyingFlashbang>,
    pub current_planter: Option<i32>,
    pub current_defuser: Option<i32>,
    /// Thrower of the last flashbang detonation.
    pub last_flash_attacker: Option<i32>,
    pub is_match_started: bool,
    pub is_freeze_period: bool,
    pub ingame_tick: u32,
    pub total_rounds_played: i32,
    pub pending: PendingRoundEvents,
}

/// User ids arrive in two shapes: legacy 8-bit ids (possibly widened with
/// `0xff << 8` for real players) and full 32-bit ids. Lookups normalize the
/// short shape first.
pub fn normalize_user_id(user_id: i32) -> i32 {
    if user_id <= 0xFFFF {
        user_id & 0xFF
    } else {
        user_id
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player_by_user_id(&self, user_id: i32) -> Option<&Player> {
        self.players_by_user_id.get(&normalize_user_id(user_id))
    }

    pub fn player_by_entity_id(&self, entity_id: i32) -> Option<&Player> {
        let user_id = self.players_by_entity_id.get(&entity_id)?;
        self.players_by_user_id.get(user_id)
    }

    pub fn find_by_pawn_handle(&self, handle: u64) -> Option<&Player> {
        let entity_id = (handle & ENTITY_HANDLE_INDEX_MASK) as i32;
        let user_id = self.pawn_to_user_id.get(&entity_id)?;
        self.players_by_user_id.get(user_id)
    }

    pub fn team(&self, team: Team) -> Option<&TeamState> {
        self.team_states.get(&team)
    }

    pub fn add_thrown_grenade(&mut self, user_id: i32, weapon: Equipment) {
        self.thrown_grenades
            .entry(user_id)
            .or_default()
            .entry(weapon.equipment_type)
            .or_default()
            .push(weapon);
    }

    /// The newest matching thrown grenade, honouring the molotov/incendiary
    /// alias and falling back to a controlled bot's bookkeeping.
    pub fn get_thrown_grenade(
        &self,
        user_id: i32,
        equipment_type: EquipmentType,
    ) -> Option<&Equipment> {
        let player_grenades = self.thrown_grenades.get(&user_id);

        let grenades = player_grenades
            .and_then(|by_type| by_type.get(&equipment_type))
            .filter(|g| !g.is_empty())
            .or_else(|| {
                let alternative = equipment_type.alternative();
                if alternative == EquipmentType::Unknown {
                    return None;
                }
                player_grenades
                    .and_then(|by_type| by_type.get(&alternative))
                    .filter(|g| !g.is_empty())
            });

        if let Some(grenades) = grenades {
            return grenades.last();
        }

        // The player might be controlling a bot; the throw is then recorded
        // against the bot.
        let player = self.players_by_user_id.get(&user_id)?;
        let bot_steam_id = player.controlled_bot_steam_id?;
        if bot_steam_id == player.steam_id64 {
            return None;
        }
        let bot_user_id = *self.players_by_steam_id.get(&bot_steam_id)?;
        self.get_thrown_grenade(bot_user_id, equipment_type)
    }

    /// Removes the newest matching thrown grenade.
    pub fn delete_thrown_grenade(&mut self, user_id: i32, equipment_type: EquipmentType) {
        let Some(by_type) = self.thrown_grenades.get_mut(&user_id) else {
            return;
        };
        let Some(grenades) = by_type.get_mut(&equipment_type) else {
            return;
        };
        if grenades.is_empty() {
            return;
        }

        grenades.pop();
        if grenades.is_empty() {
            by_type.remove(&equipment_type);
        }
    }

    /// Round-boundary cleanup: projectiles and infernos are sometimes never
    /// destroyed through entity updates, so residual state is flushed here.
    pub fn clear_grenade_projectiles(&mut self) {
        self.grenade_projectiles.clear();
        self.infernos.clear();
        self.thrown_grenades.clear();
        self.flying_flashbangs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::EquipmentType::*;

    #[test]
    fn user_id_quirk_roundtrip() {
        // Real players with a short user id get widened with 0xff << 8;
        // normalization recovers the original id.
        for short_id in [0, 3, 77, 0xFF] {
            let widened = short_id | (0xFF << 8);
            assert_eq!(short_id, normalize_user_id(widened));
            assert_eq!(short_id, normalize_user_id(short_id));
        }

        // Full 32-bit ids pass through untouched.
        assert_eq!(0x10001, normalize_user_id(0x10001));
    }

    #[test]
    fn thrown_grenade_alias() {
        let mut state = GameState::new();
        state.players_by_user_id.insert(5, Player::new(5));
        state.add_thrown_grenade(5, Equipment::new(Incendiary));

        // Looking up a molotov finds the incendiary entry.
        let found = state.get_thrown_grenade(5, Molotov).unwrap();
        assert_eq!(Incendiary, found.equipment_type);

        state.delete_thrown_grenade(5, Incendiary);
        assert!(state.get_thrown_grenade(5, Molotov).is_none());
    }

    #[test]
    fn thrown_grenade_bot_fallback() {
        let mut state = GameState::new();

        let mut controller = Player::new(3);
        controller.steam_id64 = 1000;
        controller.controlled_bot_steam_id = Some(2000);
        state.players_by_user_id.insert(3, controller);

        let mut bot = Player::new(9);
        bot.steam_id64 = 2000;
        bot.is_bot = true;
        state.players_by_user_id.insert(9, bot);
        state.players_by_steam_id.insert(2000, 9);

        state.add_thrown_grenade(9, Equipment::new(Smoke));

        let found = state.get_thrown_grenade(3, Smoke).unwrap();
        assert_eq!(Smoke, found.equipment_type);
    }

    #[test]
    fn throws_balance_by_round_cleanup() {
        let mut state = GameState::new();
        state.add_thrown_grenade(1, Equipment::new(Flash));
        state.add_thrown_grenade(1, Equipment::new(Flash));
        state.flying_flashbangs.push_back(FlyingFlashbang {
            projectile_entity_id: 50,
            flashed_entity_ids: vec![],
            exploded_frame: 0,
        });

        state.clear_grenade_projectiles();

        assert!(state.thrown_grenades.is_empty());
        assert!(state.flying_flashbangs.is_empty());
        assert!(state.grenade_projectiles.is_empty());
        assert!(state.infernos.is_empty());
    }

    #[test]
    fn trigger_containment() {
        let trigger = Trigger {
            entity_id: 17,
            mins: [-10.0, -10.0, 0.0],
            maxs: [10.0, 10.0, 100.0],
        };
        assert!(trigger.contains([0.0, 5.0, 50.0]));
        assert!(!trigger.contains([0.0, 11.0, 50.0]));
    }

    #[test]
    fn pawn_handle_lookup() {
        let mut state = GameState::new();
        let mut player = Player::new(4);
        player.pawn_entity_id = Some(99);
        state.players_by_user_id.insert(4, player);
        state.pawn_to_user_id.insert(99, 4);

        // Handles carry the entity index in the low bits plus a serial above.
        let handle = (7 << 15) | 99u64;
        assert_eq!(4, state.find_by_pawn_handle(handle).unwrap().user_id);
    }
}
