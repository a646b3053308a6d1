//! Translates descriptor-keyed legacy game events into typed events,
//! consulting and mutating the game state. Handlers follow one of three
//! delivery disciplines: immediate, delayed to end-of-frame, or delayed
//! only while no players are known yet.

use std::collections::HashMap;

use crate::equipment::{Equipment, EquipmentClass, EquipmentType};
use crate::events::{self, Bombsite, Event, HitGroup, RoundEndReason, Team, WarnType};
use crate::gamestate::{normalize_user_id, GameState, RoundEndData};
use crate::parser::Parser;
use crate::proto;
use crate::stringtables::RawPlayerInfo;

/// A single game-event value, keyed by the descriptor's key name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyValue {
    pub key_type: i32,
    pub val_string: Option<String>,
    pub val_float: Option<f32>,
    pub val_long: Option<i32>,
    pub val_short: Option<i32>,
    pub val_byte: Option<i32>,
    pub val_bool: Option<bool>,
    pub val_uint64: Option<u64>,
}

impl From<proto::source1_legacy_game_event::KeyT> for KeyValue {
    fn from(value: proto::source1_legacy_game_event::KeyT) -> Self {
        Self {
            key_type: value.r#type.unwrap_or(0),
            val_string: value.val_string,
            val_float: value.val_float,
            val_long: value.val_long,
            val_short: value.val_short,
            val_byte: value.val_byte,
            val_bool: value.val_bool,
            val_uint64: value.val_uint64,
        }
    }
}

pub const KEY_TYPE_LONG: i32 = 3;

/// Descriptor-keyed event payload. Accessors mirror the wire accessors:
/// missing keys yield zero values.
#[derive(Debug, Clone, Default)]
pub struct EventData(pub HashMap<String, KeyValue>);

impl EventData {
    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn key_type(&self, key: &str) -> i32 {
        self.0.get(key).map(|v| v.key_type).unwrap_or(0)
    }

    pub fn string(&self, key: &str) -> &str {
        self.0
            .get(key)
            .and_then(|v| v.val_string.as_deref())
            .unwrap_or("")
    }

    pub fn float(&self, key: &str) -> f32 {
        self.0.get(key).and_then(|v| v.val_float).unwrap_or(0.0)
    }

    pub fn long(&self, key: &str) -> i32 {
        self.0.get(key).and_then(|v| v.val_long).unwrap_or(0)
    }

    pub fn short(&self, key: &str) -> i32 {
        self.0.get(key).and_then(|v| v.val_short).unwrap_or(0)
    }

    pub fn byte(&self, key: &str) -> i32 {
        self.0.get(key).and_then(|v| v.val_byte).unwrap_or(0)
    }

    pub fn boolean(&self, key: &str) -> bool {
        self.0.get(key).and_then(|v| v.val_bool).unwrap_or(false)
    }

    pub fn uint64(&self, key: &str) -> u64 {
        self.0.get(key).and_then(|v| v.val_uint64).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct GameEventDescriptor {
    pub name: String,
    pub keys: Vec<String>,
}

/// Zips descriptor key names with event values by position.
pub fn map_game_event_data(
    descriptor: &GameEventDescriptor,
    event: proto::CMsgSource1LegacyGameEvent,
) -> EventData {
    let mut data = HashMap::with_capacity(descriptor.keys.len());
    for (name, value) in descriptor.keys.iter().zip(event.keys.into_iter()) {
        data.insert(name.clone(), KeyValue::from(value));
    }
    EventData(data)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Run within the current message processing.
    Immediate,
    /// Appended to the end-of-frame queue unconditionally.
    Delayed,
    /// Delayed only until players are known.
    DelayedIfNoPlayers,
}

/// What a handler does, as a tag the delayed queue can carry without
/// capturing closures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    BeginNewMatch,
    WinPanelMatch,
    RoundAnnounceFinal,
    RoundAnnounceMatchStart,
    RoundAnnounceLastRoundHalf,
    RoundStart,
    RoundEnd,
    RoundOfficiallyEnded,
    RoundFreezeEnd,
    RoundMvp,
    BotTakeover,
    PlayerFootstep,
    PlayerJump,
    PlayerSound,
    WeaponFire,
    WeaponReload,
    PlayerDeath,
    PlayerHurt,
    PlayerFallDamage,
    PlayerBlind,
    PlayerConnect,
    PlayerDisconnect,
    PlayerTeam,
    FlashbangDetonate,
    HeGrenadeDetonate,
    DecoyStarted,
    DecoyDetonate,
    SmokeGrenadeDetonate,
    SmokeGrenadeExpired,
    InfernoStartBurn,
    InfernoExpire,
    HostageHurt,
    HostageKilled,
    HostageRescued,
    HostageRescuedAll,
    BulletDamage,
    BombBeginPlant,
    BombPlanted,
    BombBeginDefuse,
    BombDefused,
    BombExploded,
    BombDropped,
    BombPickup,
    ItemEquip,
    ItemPickup,
    ItemRemove,
    OtherDeath,
}

pub struct HandlerSpec {
    pub delivery: Delivery,
    pub kind: Option<HandlerKind>,
}

const fn immediate(kind: HandlerKind) -> HandlerSpec {
    HandlerSpec {
        delivery: Delivery::Immediate,
        kind: Some(kind),
    }
}
const fn delayed(kind: HandlerKind) -> HandlerSpec {
    HandlerSpec {
        delivery: Delivery::Delayed,
        kind: Some(kind),
    }
}
const fn delayed_if_no_players(kind: HandlerKind) -> HandlerSpec {
    HandlerSpec {
        delivery: Delivery::DelayedIfNoPlayers,
        kind: Some(kind),
    }
}
/// Known event without a handler; only a `GenericGameEvent` is emitted.
const NONE: HandlerSpec = HandlerSpec {
    delivery: Delivery::Immediate,
    kind: None,
};

pub static GAME_EVENT_HANDLERS: phf::Map<&'static str, HandlerSpec> = phf::phf_map! {
    "ammo_pickup" => NONE,
    "announce_phase_end" => NONE,
    "begin_new_match" => immediate(HandlerKind::BeginNewMatch),
    "bomb_beep" => NONE,
    "bomb_begindefuse" => delayed_if_no_players(HandlerKind::BombBeginDefuse),
    "bomb_beginplant" => delayed_if_no_players(HandlerKind::BombBeginPlant),
    "bomb_defused" => delayed_if_no_players(HandlerKind::BombDefused),
    "bomb_dropped" => delayed_if_no_players(HandlerKind::BombDropped),
    "bomb_exploded" => delayed_if_no_players(HandlerKind::BombExploded),
    "bomb_pickup" => delayed_if_no_players(HandlerKind::BombPickup),
    "bomb_planted" => delayed_if_no_players(HandlerKind::BombPlanted),
    "bot_takeover" => delayed(HandlerKind::BotTakeover),
    "bullet_damage" => delayed_if_no_players(HandlerKind::BulletDamage),
    "buytime_ended" => NONE,
    "choppers_incoming_warning" => NONE,
    "cs_intermission" => NONE,
    "cs_match_end_restart" => NONE,
    "cs_pre_restart" => NONE,
    "cs_round_final_beep" => NONE,
    "cs_round_start_beep" => NONE,
    "cs_win_panel_match" => immediate(HandlerKind::WinPanelMatch),
    "cs_win_panel_round" => NONE,
    "decoy_detonate" => immediate(HandlerKind::DecoyDetonate),
    // Delayed because the projectile entity is not yet created.
    "decoy_started" => delayed(HandlerKind::DecoyStarted),
    "endmatch_cmm_start_reveal_items" => NONE,
    "entity_killed" => NONE,
    "entity_visible" => NONE,
    "enter_bombzone" => NONE,
    "exit_bombzone" => NONE,
    "enter_buyzone" => NONE,
    "exit_buyzone" => NONE,
    "flashbang_detonate" => immediate(HandlerKind::FlashbangDetonate),
    "firstbombs_incoming_warning" => NONE,
    "grenade_thrown" => NONE,
    "hegrenade_detonate" => immediate(HandlerKind::HeGrenadeDetonate),
    "hostage_killed" => immediate(HandlerKind::HostageKilled),
    "hostage_hurt" => immediate(HandlerKind::HostageHurt),
    "hostage_rescued" => immediate(HandlerKind::HostageRescued),
    "hostage_rescued_all" => immediate(HandlerKind::HostageRescuedAll),
    "hltv_chase" => NONE,
    "hltv_fixed" => NONE,
    "hltv_message" => NONE,
    "hltv_status" => NONE,
    "hltv_title" => NONE,
    "hltv_versioninfo" => NONE,
    "hostname_changed" => NONE,
    "inferno_expire" => immediate(HandlerKind::InfernoExpire),
    // Delayed because the inferno entity is not yet created.
    "inferno_startburn" => delayed(HandlerKind::InfernoStartBurn),
    "inspect_weapon" => NONE,
    // Delayed; a bot entity may not be created yet.
    "item_equip" => delayed(HandlerKind::ItemEquip),
    "item_pickup" => delayed(HandlerKind::ItemPickup),
    "item_pickup_slerp" => NONE,
    "item_remove" => immediate(HandlerKind::ItemRemove),
    "jointeam_failed" => NONE,
    "other_death" => immediate(HandlerKind::OtherDeath),
    "player_activate" => NONE,
    // Delayed because the flash duration prop is updated afterwards.
    "player_blind" => delayed(HandlerKind::PlayerBlind),
    "player_changename" => NONE,
    "player_connect" => immediate(HandlerKind::PlayerConnect),
    "player_connect_full" => NONE,
    "player_death" => delayed_if_no_players(HandlerKind::PlayerDeath),
    "player_disconnect" => immediate(HandlerKind::PlayerDisconnect),
    "player_falldamage" => immediate(HandlerKind::PlayerFallDamage),
    "player_footstep" => delayed_if_no_players(HandlerKind::PlayerFootstep),
    "player_given_c4" => NONE,
    "player_hurt" => immediate(HandlerKind::PlayerHurt),
    "player_jump" => immediate(HandlerKind::PlayerJump),
    "player_ping" => NONE,
    "player_ping_stop" => NONE,
    "player_sound" => delayed_if_no_players(HandlerKind::PlayerSound),
    "player_spawn" => NONE,
    "player_spawned" => NONE,
    // Delayed: team ids of other players changing in the same tick may not
    // have been updated yet, and entities may not be re-created after a
    // reconnect.
    "player_team" => delayed(HandlerKind::PlayerTeam),
    "round_announce_final" => immediate(HandlerKind::RoundAnnounceFinal),
    "round_announce_last_round_half" => immediate(HandlerKind::RoundAnnounceLastRoundHalf),
    "round_announce_match_point" => NONE,
    "round_announce_match_start" => immediate(HandlerKind::RoundAnnounceMatchStart),
    "round_announce_warmup" => NONE,
    "round_end" => immediate(HandlerKind::RoundEnd),
    "round_end_upload_stats" => NONE,
    "round_freeze_end" => immediate(HandlerKind::RoundFreezeEnd),
    "round_mvp" => immediate(HandlerKind::RoundMvp),
    "round_officially_ended" => immediate(HandlerKind::RoundOfficiallyEnded),
    "round_poststart" => NONE,
    "round_prestart" => NONE,
    "round_start" => immediate(HandlerKind::RoundStart),
    "round_time_warning" => NONE,
    "server_cvar" => NONE,
    "show_survival_respawn_status" => NONE,
    "survival_paradrop_spawn" => NONE,
    "smokegrenade_detonate" => immediate(HandlerKind::SmokeGrenadeDetonate),
    "smokegrenade_expired" => immediate(HandlerKind::SmokeGrenadeExpired),
    "switch_team" => NONE,
    "tournament_reward" => NONE,
    "vote_cast" => NONE,
    "weapon_fire" => delayed_if_no_players(HandlerKind::WeaponFire),
    "weapon_fire_on_empty" => NONE,
    "weapon_reload" => immediate(HandlerKind::WeaponReload),
    "weapon_zoom" => NONE,
    "weapon_zoom_rifle" => NONE,
};

/// An end-of-frame task. Tagged records instead of capturing closures keep
/// the queue small and inspectable.
#[derive(Debug)]
pub enum EventTask {
    RunHandler {
        kind: HandlerKind,
        data: EventData,
    },
    DeleteThrownGrenade {
        user_id: Option<i32>,
        equipment_type: EquipmentType,
    },
}

/// `"BOT"` maps to 0; otherwise the classic `STEAM_X:Y:Z` form expands to a
/// 64 bit id.
pub fn guid_to_steam_id64(guid: &str) -> Option<u64> {
    const STEAM64_OFFSET: u64 = 76561197960265728;

    if guid == "BOT" {
        return Some(0);
    }

    let rest = guid.strip_prefix("STEAM_")?;
    let mut parts = rest.splitn(3, ':');
    let _universe: u64 = parts.next()?.parse().ok()?;
    let y: u64 = parts.next()?.parse().ok()?;
    let z: u64 = parts.next()?.parse().ok()?;
    if y > 1 {
        return None;
    }

    Some(z * 2 + y + STEAM64_OFFSET)
}

/// Looks a player up by wire user id, falling back through the raw-player
/// records for ids that only the string tables have seen.
pub(crate) fn lookup_player<'a>(
    game_state: &'a GameState,
    raw_players: &HashMap<i32, RawPlayerInfo>,
    user_id32: i32,
) -> Option<&'a Player> {
    let uid = normalize_user_id(user_id32);
    if let Some(player) = game_state.players_by_user_id.get(&uid) {
        return Some(player);
    }

    let raw = raw_players.get(&uid)?;
    game_state
        .players_by_user_id
        .get(&normalize_user_id(raw.user_id))
}

use crate::gamestate::Player;

/// Resolved pieces of a grenade event, computed before any dispatch borrow
/// is taken.
struct NadeParts {
    thrower_uid: Option<i32>,
    grenade: Option<Equipment>,
    position: [f32; 3],
    entity_id: i32,
}

impl<'b, 'h> Parser<'b, 'h> {
    pub(crate) fn handle_game_event_list(&mut self, list: proto::CMsgSource1LegacyGameEventList) {
        self.descriptors.clear();
        for descriptor in list.descriptors {
            let id = descriptor.eventid.unwrap_or(0);
            self.descriptors.insert(
                id,
                GameEventDescriptor {
                    name: descriptor.name.unwrap_or_default(),
                    keys: descriptor
                        .keys
                        .into_iter()
                        .map(|k| k.name.unwrap_or_default())
                        .collect(),
                },
            );
        }
    }

    pub(crate) fn handle_game_event(&mut self, raw: proto::CMsgSource1LegacyGameEvent) {
        if self.descriptors.is_empty() {
            self.warn(
                WarnType::GameEventBeforeDescriptors,
                "received GameEvent but event descriptors are missing",
            );

            match self
                .config
                .fallback_game_event_list
                .take()
                .map(|bytes| <proto::CMsgSource1LegacyGameEventList as prost::Message>::decode(bytes.as_slice()))
            {
                Some(Ok(list)) => self.handle_game_event_list(list),
                Some(Err(err)) => {
                    self.set_error(format!("failed to decode fallback game event list: {}", err));
                    return;
                }
                None => return,
            }
        }

        let event_id = raw.eventid.unwrap_or(0);
        let Some(descriptor) = self.descriptors.get(&event_id) else {
            self.warn(
                WarnType::UnknownEvent,
                format!("unknown event id {}", event_id),
            );
            return;
        };

        let name = descriptor.name.clone();
        let data = map_game_event_data(descriptor, raw);

        match GAME_EVENT_HANDLERS.get(name.as_str()) {
            Some(spec) => {
                if let Some(kind) = spec.kind {
                    match spec.delivery {
                        Delivery::Immediate => self.run_game_event_handler(kind, &data),
                        Delivery::Delayed => self.delayed_tasks.push_back(EventTask::RunHandler {
                            kind,
                            data: data.clone(),
                        }),
                        Delivery::DelayedIfNoPlayers => {
                            if self.game_state.players_by_user_id.is_empty() {
                                self.delayed_tasks.push_back(EventTask::RunHandler {
                                    kind,
                                    data: data.clone(),
                                });
                            } else {
                                self.run_game_event_handler(kind, &data);
                            }
                        }
                    }
                }
            }
            None => {
                self.warn(WarnType::UnknownEvent, format!("unknown event {:?}", name));
            }
        }

        let Self {
            dispatcher, ..
        } = self;
        dispatcher.dispatch(&Event::GenericGameEvent(events::GenericGameEvent {
            name: &name,
            data: &data,
        }));
    }

    pub(crate) fn run_game_event_handler(&mut self, kind: HandlerKind, data: &EventData) {
        use HandlerKind::*;

        match kind {
            BeginNewMatch => self.dispatch(Event::MatchStart(events::MatchStart)),
            WinPanelMatch => {
                self.dispatch(Event::AnnouncementWinPanelMatch(
                    events::AnnouncementWinPanelMatch,
                ));
            }
            RoundAnnounceFinal => {
                self.dispatch(Event::AnnouncementFinalRound(events::AnnouncementFinalRound));
            }
            RoundAnnounceMatchStart => {
                self.dispatch(Event::AnnouncementMatchStarted(
                    events::AnnouncementMatchStarted,
                ));
            }
            RoundAnnounceLastRoundHalf => {
                self.dispatch(Event::AnnouncementLastRoundHalf(
                    events::AnnouncementLastRoundHalf,
                ));
            }
            RoundStart => self.game_event_round_start(data),
            RoundEnd => self.game_event_round_end(data),
            RoundOfficiallyEnded => self.game_event_round_officially_ended(),
            RoundFreezeEnd => {
                self.dispatch(Event::RoundFreezetimeEnd(events::RoundFreezetimeEnd));
            }
            RoundMvp => self.game_event_round_mvp(data),
            BotTakeover => self.game_event_bot_takeover(data),
            PlayerFootstep => self.game_event_player_footstep(data),
            PlayerJump => self.game_event_player_jump(data),
            PlayerSound => self.game_event_player_sound(data),
            WeaponFire => self.game_event_weapon_fire(data),
            WeaponReload => self.game_event_weapon_reload(data),
            PlayerDeath => self.game_event_player_death(data),
            PlayerHurt => self.game_event_player_hurt(data),
            PlayerFallDamage => self.game_event_player_fall_damage(data),
            PlayerBlind => self.game_event_player_blind(data),
            PlayerConnect => self.game_event_player_connect(data),
            PlayerDisconnect => self.game_event_player_disconnect(data),
            PlayerTeam => self.game_event_player_team(data),
            FlashbangDetonate => self.game_event_flashbang_detonate(data),
            HeGrenadeDetonate => {
                let parts = self.nade_event_parts(data, EquipmentType::HE);
                self.dispatch_nade(parts, EquipmentType::HE, NadeEventKind::HeExplode);
            }
            DecoyStarted => {
                let parts = self.nade_event_parts(data, EquipmentType::Decoy);
                self.dispatch_nade(parts, EquipmentType::Decoy, NadeEventKind::DecoyStart);
            }
            DecoyDetonate => self.game_event_decoy_detonate(data),
            SmokeGrenadeDetonate => {
                let parts = self.nade_event_parts(data, EquipmentType::Smoke);
                self.dispatch_nade(parts, EquipmentType::Smoke, NadeEventKind::SmokeStart);
            }
            SmokeGrenadeExpired => self.game_event_smokegrenade_expired(data),
            InfernoStartBurn => {
                let parts = self.nade_event_parts(data, EquipmentType::Incendiary);
                self.dispatch_nade(
                    parts,
                    EquipmentType::Incendiary,
                    NadeEventKind::FireGrenadeStart,
                );
            }
            InfernoExpire => {
                let parts = self.nade_event_parts(data, EquipmentType::Incendiary);
                self.dispatch_nade(
                    parts,
                    EquipmentType::Incendiary,
                    NadeEventKind::FireGrenadeExpired,
                );
            }
            HostageHurt => self.game_event_hostage(data, HostageEventKind::Hurt),
            HostageKilled => self.game_event_hostage(data, HostageEventKind::Killed),
            HostageRescued => self.game_event_hostage(data, HostageEventKind::Rescued),
            HostageRescuedAll => {
                self.dispatch(Event::HostageRescuedAll(events::HostageRescuedAll));
            }
            BulletDamage => self.game_event_bullet_damage(data),
            BombBeginPlant => self.game_event_bomb_begin_plant(data),
            BombPlanted => self.game_event_bomb_planted(data),
            BombBeginDefuse => self.game_event_bomb_begin_defuse(data),
            BombDefused => self.game_event_bomb_defused(data),
            BombExploded => self.game_event_bomb_exploded(data),
            BombDropped => self.game_event_bomb_dropped(data),
            BombPickup => self.game_event_bomb_pickup(data),
            ItemEquip => self.game_event_item(data, ItemEventKind::Equip),
            ItemPickup => self.game_event_item(data, ItemEventKind::Pickup),
            ItemRemove => self.game_event_item(data, ItemEventKind::Drop),
            OtherDeath => self.game_event_other_death(data),
        }
    }

    fn dispatch(&mut self, event: Event<'_>) {
        self.dispatcher.dispatch(&event);
    }

    pub(crate) fn warn(&mut self, warn_type: WarnType, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{:?}: {}", warn_type, message);
        self.dispatcher.dispatch(&Event::ParserWarn(events::ParserWarn {
            warn_type,
            message,
        }));
    }

    fn player_uid(&self, user_id32: i32) -> Option<i32> {
        lookup_player(&self.game_state, &self.raw_players, user_id32).map(|p| p.user_id)
    }

    fn game_event_round_start(&mut self, data: &EventData) {
        // Handlers mimicking Source 1 events run only when the synthesis
        // from entity properties is disabled; exactly one path is active.
        if !self.config.disable_mimic_source1_game_events {
            return;
        }

        self.game_state.clear_grenade_projectiles();

        self.dispatch(Event::RoundStart(events::RoundStart {
            time_limit: data.long("timelimit"),
            frag_limit: data.long("fraglimit"),
            objective: data.string("objective").to_owned(),
        }));
    }

    fn game_event_round_end(&mut self, data: &EventData) {
        if !self.config.disable_mimic_source1_game_events {
            return;
        }

        let reason = RoundEndReason::from(data.byte("reason"));
        self.frame_to_round_end_reason
            .insert(self.current_frame, reason);

        self.dispatch(Event::RoundEnd(events::RoundEnd {
            message: data.string("message").to_owned(),
            reason,
            winner: Team::from(data.byte("winner")),
        }));
    }

    fn game_event_round_officially_ended(&mut self) {
        if !self.config.disable_mimic_source1_game_events {
            return;
        }

        self.game_state.clear_grenade_projectiles();
        self.dispatch(Event::RoundEndOfficial(events::RoundEndOfficial));
    }

    fn game_event_round_mvp(&mut self, data: &EventData) {
        let uid = data.short("userid");
        let reason = data.short("reason");
        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::RoundMVPAnnouncement(events::RoundMVPAnnouncement {
            player: lookup_player(game_state, raw_players, uid),
            reason,
        }));
    }

    fn game_event_bot_takeover(&mut self, data: &EventData) {
        let uid = data.short("userid");
        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::BotTakenOver(events::BotTakenOver {
            taker: lookup_player(game_state, raw_players, uid),
        }));
    }

    fn game_event_player_footstep(&mut self, data: &EventData) {
        let uid = data.short("userid");
        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::Footstep(events::Footstep {
            player: lookup_player(game_state, raw_players, uid),
        }));
    }

    fn game_event_player_jump(&mut self, data: &EventData) {
        let uid = data.short("userid");
        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::PlayerJump(events::PlayerJump {
            player: lookup_player(game_state, raw_players, uid),
        }));
    }

    fn game_event_player_sound(&mut self, data: &EventData) {
        let uid = data.short("userid");
        let radius = data.long("radius");
        let duration = data.float("duration");
        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::PlayerSound(events::PlayerSound {
            player: lookup_player(game_state, raw_players, uid),
            radius,
            duration_seconds: duration,
        }));
    }

    fn game_event_weapon_fire(&mut self, data: &EventData) {
        if !self.config.disable_mimic_source1_game_events {
            return;
        }

        let uid = data.short("userid");
        let wep_type = EquipmentType::from_name(data.string("weapon"));
        let shooter_uid = self.player_uid(uid);
        let weapon = self.get_player_weapon(shooter_uid, wep_type);

        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::WeaponFire(events::WeaponFire {
            shooter: lookup_player(game_state, raw_players, uid),
            weapon,
        }));
    }

    fn game_event_weapon_reload(&mut self, data: &EventData) {
        let Some(uid) = self.player_uid(data.short("userid")) else {
            // "unknown" players show up since the November 2019 update.
            return;
        };

        if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
            player.is_reloading = true;
        }

        let Self {
            game_state,
            dispatcher,
            ..
        } = self;
        if let Some(player) = game_state.players_by_user_id.get(&uid) {
            dispatcher.dispatch(&Event::WeaponReload(events::WeaponReload { player }));
        }
    }

    fn game_event_player_death(&mut self, data: &EventData) {
        let victim_uid32 = data.short("userid");
        let mut wep_type = EquipmentType::from_name(data.string("weapon"));
        wep_type = self.attacker_weapon_type(wep_type, victim_uid32);

        let mut killer_uid = self.player_uid(data.short("attacker"));
        if killer_uid.is_none() && data.has("attacker_pawn") {
            // Fall back to the pawn handle when the user id resolves nothing.
            killer_uid = self
                .game_state
                .find_by_pawn_handle(data.long("attacker_pawn") as u64)
                .map(|p| p.user_id);
        }

        let weapon = self.get_equipment_instance(killer_uid, wep_type);
        let assister_uid = data.short("assister");

        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::Kill(events::Kill {
            victim: lookup_player(game_state, raw_players, victim_uid32),
            killer: killer_uid.and_then(|uid| game_state.players_by_user_id.get(&uid)),
            assister: lookup_player(game_state, raw_players, assister_uid),
            weapon,
            is_headshot: data.boolean("headshot"),
            penetrated_objects: data.short("penetrated"),
            assisted_flash: data.boolean("assistedflash"),
            attacker_blind: data.boolean("attackerblind"),
            no_scope: data.boolean("noscope"),
            through_smoke: data.boolean("thrusmoke"),
            distance: data.float("distance"),
        }));
    }

    fn game_event_player_hurt(&mut self, data: &EventData) {
        let victim_uid32 = data.short("userid");
        let attacker_uid32 = data.short("attacker");

        let mut wep_type = EquipmentType::from_name(data.string("weapon"));
        wep_type = self.attacker_weapon_type(wep_type, victim_uid32);

        let health = data.byte("health");
        let armor = data.byte("armor");
        let health_damage = data.short("dmg_health");
        let armor_damage = data.byte("dmg_armor");
        let mut health_damage_taken = health_damage.min(100);
        let mut armor_damage_taken = armor_damage.min(100);

        if let Some(player) = lookup_player(&self.game_state, &self.raw_players, victim_uid32) {
            if health == 0 {
                health_damage_taken = player.health;
            }
            if armor == 0 {
                armor_damage_taken = player.armor;
            }
        }

        let attacker_uid = self.player_uid(attacker_uid32);
        let weapon = self.get_equipment_instance(attacker_uid, wep_type);

        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::PlayerHurt(events::PlayerHurt {
            player: lookup_player(game_state, raw_players, victim_uid32),
            attacker: lookup_player(game_state, raw_players, attacker_uid32),
            health,
            armor,
            health_damage,
            armor_damage,
            health_damage_taken,
            armor_damage_taken,
            hit_group: HitGroup::from(data.byte("hitgroup")),
            weapon,
        }));
    }

    fn game_event_player_fall_damage(&mut self, data: &EventData) {
        self.user_id_to_fall_damage_frame
            .insert(data.short("userid"), self.current_frame);
    }

    fn game_event_player_blind(&mut self, data: &EventData) {
        if !self.config.disable_mimic_source1_game_events {
            return;
        }

        let uid = data.short("userid");
        let attacker_uid = self.game_state.last_flash_attacker;
        let projectile_entity = attacker_uid.and_then(|uid| {
            self.game_state
                .grenade_projectiles
                .values()
                .find(|proj| {
                    proj.equipment_type == EquipmentType::Flash
                        && proj.thrower_user_id == Some(uid)
                })
                .map(|proj| proj.entity_id)
        });

        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        let Some(player) = lookup_player(game_state, raw_players, uid) else {
            return;
        };
        dispatcher.dispatch(&Event::PlayerFlashed(events::PlayerFlashed {
            player,
            attacker: attacker_uid.and_then(|uid| game_state.players_by_user_id.get(&uid)),
            projectile: projectile_entity.and_then(|id| game_state.grenade_projectiles.get(&id)),
        }));
    }

    fn game_event_player_connect(&mut self, data: &EventData) {
        let mut info = RawPlayerInfo {
            version: 0,
            xuid: data.uint64("xuid"),
            name: data.string("name").to_owned(),
            user_id: data.short("userid"),
            guid: data.string("networkid").to_owned(),
            friends_id: 0,
            friends_name: String::new(),
            is_fake_player: data.boolean("bot"),
            is_hltv: false,
            custom_files: [0; 4],
            files_downloaded: 0,
        };

        if !info.guid.is_empty() && info.xuid == 0 {
            match guid_to_steam_id64(&info.guid) {
                Some(id) => info.xuid = id,
                None => {
                    self.set_error(format!("failed to parse player XUID from {:?}", info.guid));
                    return;
                }
            }
        }

        // Real players with a short user id are widened so that lookups by
        // full id keep working; normalization recovers the short shape.
        if !info.is_fake_player && !info.is_hltv && info.xuid > 0 && info.user_id <= 0xFF {
            info.user_id |= 0xFF << 8;
        }

        let slot = info.user_id;
        self.apply_user_info(slot, info, false);
    }

    fn game_event_player_disconnect(&mut self, data: &EventData) {
        let Some(uid) = self.player_uid(data.short("userid")) else {
            return;
        };

        let Self {
            game_state,
            dispatcher,
            ..
        } = self;
        if let Some(player) = game_state.players_by_user_id.get(&uid) {
            if player.is_bot {
                dispatcher.dispatch(&Event::PlayerDisconnected(events::PlayerDisconnected {
                    player,
                }));
            }
        }
        if let Some(player) = game_state.players_by_user_id.get_mut(&uid) {
            if player.is_bot {
                player.is_connected = false;
            }
        }
    }

    fn game_event_player_team(&mut self, data: &EventData) {
        let uid = self.player_uid(data.short("userid"));
        let event_team = Team::from(data.byte("team"));
        let old_team = Team::from(data.byte("oldteam"));

        let Some(uid) = uid else {
            self.warn(
                WarnType::TeamSwapPlayerNil,
                "player team swap game-event occurred but player is nil",
            );
            return;
        };

        // The "team" field may disagree with the entity prop, which is
        // updated before the game event fires; the prop is authoritative.
        let new_team = {
            let player = self
                .game_state
                .players_by_user_id
                .get_mut(&uid)
                .expect("player uid was just resolved");
            if player.team != event_team {
                player.team
            } else {
                event_team
            }
        };

        let Self {
            game_state,
            dispatcher,
            ..
        } = self;
        let player = &game_state.players_by_user_id[&uid];
        dispatcher.dispatch(&Event::PlayerTeamChange(events::PlayerTeamChange {
            player,
            new_team,
            old_team,
            silent: data.boolean("silent"),
            is_bot: data.boolean("isbot"),
        }));
    }

    fn game_event_flashbang_detonate(&mut self, data: &EventData) {
        let parts = self.nade_event_parts(data, EquipmentType::Flash);
        self.game_state.last_flash_attacker = parts.thrower_uid;

        // Unlike the other mimic handlers this dispatch is active in
        // synthesis mode; the last-flash bookkeeping happens in both modes.
        if !self.config.disable_mimic_source1_game_events {
            self.dispatch_nade(parts, EquipmentType::Flash, NadeEventKind::FlashExplode);
        }
    }

    fn game_event_decoy_detonate(&mut self, data: &EventData) {
        let parts = self.nade_event_parts(data, EquipmentType::Decoy);
        let thrower = parts.thrower_uid;
        self.dispatch_nade(parts, EquipmentType::Decoy, NadeEventKind::DecoyExpired);

        self.delayed_tasks.push_back(EventTask::DeleteThrownGrenade {
            user_id: thrower,
            equipment_type: EquipmentType::Decoy,
        });
    }

    fn game_event_smokegrenade_expired(&mut self, data: &EventData) {
        let parts = self.nade_event_parts(data, EquipmentType::Smoke);
        let thrower = parts.thrower_uid;
        self.dispatch_nade(parts, EquipmentType::Smoke, NadeEventKind::SmokeExpired);

        if let Some(uid) = thrower {
            self.game_state
                .delete_thrown_grenade(uid, EquipmentType::Smoke);
        }
    }

    fn game_event_hostage(&mut self, data: &EventData, kind: HostageEventKind) {
        let uid = data.short("userid");
        let hostage_entity = data.short("hostage");

        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        let player = lookup_player(game_state, raw_players, uid);
        let hostage = game_state.hostages.get(&hostage_entity);

        let event = match kind {
            HostageEventKind::Hurt => Event::HostageHurt(events::HostageHurt { player, hostage }),
            HostageEventKind::Killed => Event::HostageKilled(events::HostageKilled {
                killer: player,
                hostage,
            }),
            HostageEventKind::Rescued => {
                Event::HostageRescued(events::HostageRescued { player, hostage })
            }
        };
        dispatcher.dispatch(&event);
    }

    fn game_event_bullet_damage(&mut self, data: &EventData) {
        let attacker = data.short("attacker");
        let victim = data.short("victim");
        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::BulletDamage(events::BulletDamage {
            attacker: lookup_player(game_state, raw_players, attacker),
            victim: lookup_player(game_state, raw_players, victim),
            distance: data.float("distance"),
            damage_dir_x: data.float("damage_dir_x"),
            damage_dir_y: data.float("damage_dir_y"),
            damage_dir_z: data.float("damage_dir_z"),
            num_penetrations: data.short("num_penetrations"),
            is_no_scope: data.boolean("no_scope"),
            is_attacker_in_air: data.boolean("in_air"),
        }));
    }

    fn game_event_other_death(&mut self, data: &EventData) {
        let killer_uid32 = data.short("attacker");
        let wep_type = EquipmentType::from_name(data.string("weapon"));
        let killer_uid = self.player_uid(killer_uid32);
        let weapon = self.get_player_weapon(killer_uid, wep_type);

        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::OtherDeath(events::OtherDeath {
            killer: lookup_player(game_state, raw_players, killer_uid32),
            weapon,
            penetrated_objects: data.short("penetrated"),
            no_scope: data.boolean("noscope"),
            through_smoke: data.boolean("thrusmoke"),
            killer_blind: data.boolean("attackerblind"),
            other_type: data.string("othertype").to_owned(),
            other_id: data.short("otherid"),
        }));
    }

    fn game_event_item(&mut self, data: &EventData, kind: ItemEventKind) {
        let uid32 = data.short("userid");
        let wep_type = EquipmentType::from_name(data.string("item"));
        let uid = self.player_uid(uid32);
        let weapon = self.get_player_weapon(uid, wep_type);

        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        let player = lookup_player(game_state, raw_players, uid32);
        let event = match kind {
            ItemEventKind::Equip => Event::ItemEquip(events::ItemEquip { player, weapon }),
            ItemEventKind::Pickup => Event::ItemPickup(events::ItemPickup { player, weapon }),
            ItemEventKind::Drop => Event::ItemDrop(events::ItemDrop { player, weapon }),
        };
        dispatcher.dispatch(&event);
    }

    fn game_event_bomb_begin_plant(&mut self, data: &EventData) {
        if !self.config.disable_mimic_source1_game_events {
            return;
        }
        let Some((uid, site)) = self.bomb_event(data) else {
            return;
        };

        if let Some(uid) = uid {
            if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                player.is_planting = true;
            }
        }
        self.game_state.current_planter = uid;

        let Self {
            game_state,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::BombPlantBegin(events::BombPlantBegin {
            player: uid.and_then(|uid| game_state.players_by_user_id.get(&uid)),
            site,
        }));
    }

    fn game_event_bomb_planted(&mut self, data: &EventData) {
        if !self.config.disable_mimic_source1_game_events {
            return;
        }
        let Some((uid, site)) = self.bomb_event(data) else {
            return;
        };

        if let Some(uid) = uid {
            if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                player.is_planting = false;
            }
        }
        self.game_state.current_planter = None;

        let Self {
            game_state,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::BombPlanted(events::BombPlanted {
            player: uid.and_then(|uid| game_state.players_by_user_id.get(&uid)),
            site,
        }));
    }

    fn game_event_bomb_begin_defuse(&mut self, data: &EventData) {
        if !self.config.disable_mimic_source1_game_events {
            return;
        }

        let uid = self.player_uid(data.short("userid"));
        self.game_state.current_defuser = uid;
        if let Some(uid) = uid {
            if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                player.is_defusing = true;
            }
        }

        let Self {
            game_state,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::BombDefuseStart(events::BombDefuseStart {
            player: uid.and_then(|uid| game_state.players_by_user_id.get(&uid)),
            has_kit: data.boolean("haskit"),
        }));
    }

    fn game_event_bomb_defused(&mut self, data: &EventData) {
        if !self.config.disable_mimic_source1_game_events {
            return;
        }
        let Some((uid, site)) = self.bomb_event(data) else {
            return;
        };

        self.game_state.current_defuser = None;
        let Self {
            game_state,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::BombDefused(events::BombDefused {
            player: uid.and_then(|uid| game_state.players_by_user_id.get(&uid)),
            site,
        }));
    }

    fn game_event_bomb_exploded(&mut self, data: &EventData) {
        if !self.config.disable_mimic_source1_game_events {
            return;
        }
        let Some((uid, site)) = self.bomb_event(data) else {
            return;
        };

        self.game_state.current_defuser = None;
        let Self {
            game_state,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::BombExplode(events::BombExplode {
            player: uid.and_then(|uid| game_state.players_by_user_id.get(&uid)),
            site,
        }));
    }

    fn game_event_bomb_dropped(&mut self, data: &EventData) {
        if !self.config.disable_mimic_source1_game_events {
            return;
        }

        let uid32 = data.short("userid");
        let entity_id = data.short("entityid");
        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::BombDropped(events::BombDropped {
            player: lookup_player(game_state, raw_players, uid32),
            entity_id,
        }));
    }

    fn game_event_bomb_pickup(&mut self, data: &EventData) {
        if !self.config.disable_mimic_source1_game_events {
            return;
        }

        let uid32 = data.short("userid");
        let Self {
            game_state,
            raw_players,
            dispatcher,
            ..
        } = self;
        dispatcher.dispatch(&Event::BombPickup(events::BombPickup {
            player: lookup_player(game_state, raw_players, uid32),
        }));
    }

    /// Resolves the bomb site of a bomb-related event. The wire carries the
    /// trigger index, which is matched against the known site indices and
    /// then against the trigger volumes containing a site center.
    fn bomb_event(&mut self, data: &EventData) -> Option<(Option<i32>, Bombsite)> {
        let uid = self.player_uid(data.short("userid"));

        let site_index = if data.key_type("site") == KEY_TYPE_LONG {
            data.long("site")
        } else {
            data.short("site")
        };

        let mut site = Bombsite::Unknown;
        if site_index == self.game_state.bombsite_a.index {
            site = Bombsite::A;
        } else if site_index == self.game_state.bombsite_b.index {
            site = Bombsite::B;
        } else {
            match self.game_state.triggers.get(&site_index) {
                None => {
                    if !self.config.ignore_bombsite_index_not_found {
                        self.set_error(format!("bombsite with index {} not found", site_index));
                        return None;
                    }
                }
                Some(trigger) => {
                    if trigger.contains(self.game_state.bombsite_a.center) {
                        site = Bombsite::A;
                        self.game_state.bombsite_a.index = site_index;
                    } else if trigger.contains(self.game_state.bombsite_b.center) {
                        site = Bombsite::B;
                        self.game_state.bombsite_b.index = site_index;
                    }
                }
            }

            if site == Bombsite::Unknown {
                self.warn(
                    WarnType::BombsiteUnknown,
                    "bombsite unknown for bomb related event",
                );
            }
        }

        Some((uid, site))
    }

    /// Upgrades an unknown weapon type using per-frame context: fall damage
    /// in this frame means world damage; a round that ended in this frame
    /// with reason `TargetBombed` (or the empirical 0) means bomb damage.
    fn attacker_weapon_type(
        &self,
        wep_type: EquipmentType,
        victim_user_id32: i32,
    ) -> EquipmentType {
        if wep_type == EquipmentType::Unknown
            && self
                .user_id_to_fall_damage_frame
                .get(&victim_user_id32)
                .copied()
                == Some(self.current_frame)
        {
            return EquipmentType::World;
        }

        if wep_type == EquipmentType::Unknown {
            match self.frame_to_round_end_reason.get(&self.current_frame) {
                Some(RoundEndReason::Unspecified) | Some(RoundEndReason::TargetBombed) => {
                    return EquipmentType::Bomb;
                }
                _ => {}
            }
        }

        wep_type
    }

    /// The player's own instance for non-grenades, the thrown-grenade record
    /// for grenades, or a fresh instance as fallback.
    fn get_equipment_instance(
        &self,
        user_id: Option<i32>,
        wep_type: EquipmentType,
    ) -> Equipment {
        if wep_type.class() == EquipmentClass::Grenade {
            if let Some(uid) = user_id {
                if let Some(grenade) = self.game_state.get_thrown_grenade(uid, wep_type) {
                    return grenade.clone();
                }
            }
            return Equipment::new(wep_type);
        }

        self.get_player_weapon(user_id, wep_type)
    }

    fn get_player_weapon(&self, user_id: Option<i32>, wep_type: EquipmentType) -> Equipment {
        if let Some(uid) = user_id {
            if let Some(player) = self.game_state.players_by_user_id.get(&uid) {
                if let Some(weapon) = player.weapon(wep_type) {
                    return weapon.clone();
                }
            }
        }
        Equipment::new(wep_type)
    }

    /// Resolves the shared pieces of a grenade event before any dispatch
    /// borrow is taken. The thrower may only be present as a pawn handle.
    fn nade_event_parts(&self, data: &EventData, nade_type: EquipmentType) -> NadeParts {
        let mut thrower_uid = None;
        if data.has("userid") {
            thrower_uid = lookup_player(&self.game_state, &self.raw_players, data.short("userid"))
                .map(|p| p.user_id);
        }
        if thrower_uid.is_none() && data.has("userid_pawn") {
            thrower_uid = self
                .game_state
                .find_by_pawn_handle(data.long("userid_pawn") as u64)
                .map(|p| p.user_id);
        }

        let grenade = thrower_uid
            .and_then(|uid| self.game_state.get_thrown_grenade(uid, nade_type))
            .cloned();

        NadeParts {
            thrower_uid,
            grenade,
            position: [data.float("x"), data.float("y"), data.float("z")],
            entity_id: data.short("entityid"),
        }
    }

    fn dispatch_nade(&mut self, parts: NadeParts, nade_type: EquipmentType, kind: NadeEventKind) {
        let Self {
            game_state,
            dispatcher,
            ..
        } = self;

        let payload = events::GrenadeEvent {
            grenade_type: nade_type,
            grenade: parts.grenade,
            thrower: parts
                .thrower_uid
                .and_then(|uid| game_state.players_by_user_id.get(&uid)),
            position: parts.position,
            grenade_entity_id: parts.entity_id,
        };

        let event = match kind {
            NadeEventKind::FlashExplode => Event::FlashExplode(payload),
            NadeEventKind::HeExplode => Event::HeExplode(payload),
            NadeEventKind::SmokeStart => Event::SmokeStart(payload),
            NadeEventKind::SmokeExpired => Event::SmokeExpired(payload),
            NadeEventKind::DecoyStart => Event::DecoyStart(payload),
            NadeEventKind::DecoyExpired => Event::DecoyExpired(payload),
            NadeEventKind::FireGrenadeStart => Event::FireGrenadeStart(payload),
            NadeEventKind::FireGrenadeExpired => Event::FireGrenadeExpired(payload),
        };
        dispatcher.dispatch(&event);
    }
}

#[derive(Debug, Clone, Copy)]
enum NadeEventKind {
    FlashExplode,
    HeExplode,
    SmokeStart,
    SmokeExpired,
    DecoyStart,
    DecoyExpired,
    FireGrenadeStart,
    FireGrenadeExpired,
}

#[derive(Debug, Clone, Copy)]
enum HostageEventKind {
    Hurt,
    Killed,
    Rescued,
}

#[derive(Debug, Clone, Copy)]
enum ItemEventKind {
    Equip,
    Pickup,
    Drop,
}

/// Winner derived from a round-end reason when the wire omits the team.
pub(crate) fn winner_for_reason(reason: RoundEndReason) -> Team {
    match reason {
        RoundEndReason::TargetBombed
        | RoundEndReason::TerroristsWin
        | RoundEndReason::TargetSaved
        | RoundEndReason::CtSurrender
        | RoundEndReason::HostagesNotRescued => Team::Terrorists,
        RoundEndReason::BombDefused
        | RoundEndReason::CtWin
        | RoundEndReason::HostagesRescued
        | RoundEndReason::TerroristsSurrender => Team::CounterTerrorists,
        _ => Team::Unassigned,
    }
}

pub(crate) fn round_end_data_from_reason(reason: RoundEndReason) -> RoundEndData {
    RoundEndData {
        message: String::new(),
        reason,
        winner: winner_for_reason(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_conversion() {
        assert_eq!(Some(0), guid_to_steam_id64("BOT"));
        // account id = 19869886 * 2 + 1
        assert_eq!(
            Some(76561197960265728 + 39739773),
            guid_to_steam_id64("STEAM_1:1:19869886")
        );
        assert_eq!(None, guid_to_steam_id64("garbage"));
        assert_eq!(None, guid_to_steam_id64("STEAM_1:7:3"));
    }

    #[test]
    fn handler_table_covers_delivery_disciplines() {
        assert_eq!(
            Delivery::Immediate,
            GAME_EVENT_HANDLERS.get("round_end").unwrap().delivery
        );
        assert_eq!(
            Delivery::Delayed,
            GAME_EVENT_HANDLERS.get("player_blind").unwrap().delivery
        );
        assert_eq!(
            Delivery::DelayedIfNoPlayers,
            GAME_EVENT_HANDLERS.get("player_death").unwrap().delivery
        );
        // Known events without handlers only yield GenericGameEvent.
        assert!(GAME_EVENT_HANDLERS.get("bomb_beep").unwrap().kind.is_none());
    }

    #[test]
    fn event_data_accessors_default_to_zero_values() {
        let data = EventData::default();
        assert_eq!(0, data.short("userid"));
        assert_eq!("", data.string("weapon"));
        assert!(!data.boolean("headshot"));
        assert_eq!(0.0, data.float("distance"));
    }
}
