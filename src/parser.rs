//! The frame orchestrator: sequences per-frame decoding of the demux'd
//! messages into a correctly ordered event dispatch.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::bitreader::{BitReadError, BitReader};
use crate::container::{Container, DemoSource, ParseContainerError};
use crate::dispatch::EventDispatcher;
use crate::equipment::{Equipment, EquipmentType};
use crate::events::{self, Event, RoundEndReason, Team, WarnType};
use crate::frame::{FrameDecompressError, FrameIterator};
use crate::game_event::{round_end_data_from_reason, EventTask, GameEventDescriptor};
use crate::gamestate::{
    normalize_user_id, FlyingFlashbang, GameState, GrenadeProjectile, Hostage, Inferno, Player,
    RoundStartData, TeamState, Trigger, ENTITY_HANDLE_INDEX_MASK,
};
use crate::netmessages::NetmessageType;
use crate::proto;
use crate::stringtables::{RawPlayerInfo, StringTableEngine, StringTableError, TableUpdate};
use crate::DemoCommand;

mod fieldpath;
pub use fieldpath::{FieldPath, Paths};

mod decoder;
mod entities;
mod quantizedfloat;
mod sendtables;
mod variant;

pub use entities::{Entity, EntityChange, EntityEngine, EntityError, EntityOp};
pub use variant::Variant;

/// A controller entity handle whose index equals this value points at no
/// entity.
const ENTITY_HANDLE_MISSING: i32 = 2047;

#[derive(Debug)]
pub enum ParserError {
    Container(ParseContainerError),
    DecompressFrame(FrameDecompressError),
    DecodeProtobuf(prost::DecodeError),
    BitRead(BitReadError),
    Entity(EntityError),
    StringTable(StringTableError),
    /// A previously latched fatal error; repeated on every later call.
    Fatal(String),
}

impl From<prost::DecodeError> for ParserError {
    fn from(value: prost::DecodeError) -> Self {
        Self::DecodeProtobuf(value)
    }
}
impl From<BitReadError> for ParserError {
    fn from(value: BitReadError) -> Self {
        Self::BitRead(value)
    }
}
impl From<EntityError> for ParserError {
    fn from(value: EntityError) -> Self {
        Self::Entity(value)
    }
}
impl From<StringTableError> for ParserError {
    fn from(value: StringTableError) -> Self {
        Self::StringTable(value)
    }
}
impl From<FrameDecompressError> for ParserError {
    fn from(value: FrameDecompressError) -> Self {
        Self::DecompressFrame(value)
    }
}

#[derive(Debug, Default, Clone)]
pub struct ParserConfig {
    /// Demote an unknown bombsite index to a warning instead of a fatal
    /// error.
    pub ignore_bombsite_index_not_found: bool,
    /// Translate the legacy Source 1 game events directly instead of
    /// mimicking them from entity property changes. With the flag unset
    /// (the default) the mimic handlers are skipped and the equivalent
    /// events are synthesized at end-of-frame; exactly one of the two
    /// paths is active.
    pub disable_mimic_source1_game_events: bool,
    /// Descriptor list used when game events arrive before their list.
    pub fallback_game_event_list: Option<Vec<u8>>,
}

/// Cooperative cancellation; checked between frames.
#[derive(Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

type EntityHandler<'h> = Box<dyn FnMut(&Entity, EntityOp) + 'h>;

pub struct Parser<'b, 'h> {
    frames: FrameIterator<'b>,
    demo_source: DemoSource,
    pub(crate) config: ParserConfig,
    pub(crate) header: Option<proto::CDemoFileHeader>,
    file_info: Option<proto::CDemoFileInfo>,
    pub(crate) dispatcher: EventDispatcher<'h>,
    entity_handlers: Vec<EntityHandler<'h>>,
    pub(crate) game_state: GameState,
    string_tables: StringTableEngine,
    entities: EntityEngine,
    pub(crate) raw_players: HashMap<i32, RawPlayerInfo>,
    pub(crate) descriptors: HashMap<i32, GameEventDescriptor>,
    pub(crate) delayed_tasks: VecDeque<EventTask>,
    pub(crate) current_frame: i64,
    pub(crate) user_id_to_fall_damage_frame: HashMap<i32, i64>,
    pub(crate) frame_to_round_end_reason: HashMap<i64, RoundEndReason>,
    recording_player_slot: i32,
    /// Networked weapon entity id to its equipment type.
    weapon_entities: HashMap<i32, EquipmentType>,
    /// Weapon entity id to the user id currently holding it.
    weapon_owners: HashMap<i32, i32>,
    latched: Option<String>,
    cancelled: Arc<AtomicBool>,
    entity_changes: Vec<EntityChange>,
}

impl<'b, 'h> Parser<'b, 'h> {
    pub fn new(input: &'b [u8], config: ParserConfig) -> Result<Self, ParserError> {
        let container = Container::parse(input).map_err(ParserError::Container)?;

        Ok(Self {
            frames: FrameIterator::parse(container.inner),
            demo_source: container.source,
            config,
            header: None,
            file_info: None,
            dispatcher: EventDispatcher::new(),
            entity_handlers: Vec::new(),
            game_state: GameState::new(),
            string_tables: StringTableEngine::new(),
            entities: EntityEngine::new(),
            raw_players: HashMap::new(),
            descriptors: HashMap::new(),
            delayed_tasks: VecDeque::new(),
            current_frame: 0,
            user_id_to_fall_damage_frame: HashMap::new(),
            frame_to_round_end_reason: HashMap::new(),
            recording_player_slot: -1,
            weapon_entities: HashMap::new(),
            weapon_owners: HashMap::new(),
            latched: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            entity_changes: Vec::new(),
        })
    }

    /// Registers a consumer event handler. Handlers run in registration
    /// order and receive borrowed events valid only during the dispatch.
    pub fn register<F>(&mut self, handler: F)
    where
        F: FnMut(&Event<'_>) + 'h,
    {
        self.dispatcher.register(handler);
    }

    /// Registers an entity-change observer, invoked for every entity
    /// operation in read order.
    pub fn register_entity_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&Entity, EntityOp) + 'h,
    {
        self.entity_handlers.push(Box::new(handler));
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancelled))
    }

    pub fn header(&self) -> Option<&proto::CDemoFileHeader> {
        self.header.as_ref()
    }

    pub fn file_info(&self) -> Option<&proto::CDemoFileInfo> {
        self.file_info.as_ref()
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn demo_source(&self) -> DemoSource {
        self.demo_source
    }

    pub fn recording_player_slot(&self) -> i32 {
        self.recording_player_slot
    }

    pub(crate) fn set_error(&mut self, message: String) {
        if self.latched.is_none() {
            log::warn!("latching fatal error: {}", message);
            self.latched = Some(message);
        }
    }

    /// Decodes one frame and dispatches all its end-of-frame events.
    /// Returns whether more frames follow.
    pub fn parse_next_frame(&mut self) -> Result<bool, ParserError> {
        if let Some(message) = &self.latched {
            return Err(ParserError::Fatal(message.clone()));
        }
        if self.cancelled.load(Ordering::Relaxed) {
            return Ok(false);
        }

        let Some(frame) = self.frames.next() else {
            return Ok(false);
        };

        let cmd = frame.cmd;
        let mut buf = Vec::new();
        let data = frame.decompress_with_buf(&mut buf)?;

        let result = self.process_frame(cmd, data);
        if let Err(err) = result {
            let message = format!("{:?}", err);
            self.latched = Some(message);
            return Err(err);
        }

        self.end_of_frame();
        self.current_frame += 1;

        if let Some(message) = &self.latched {
            return Err(ParserError::Fatal(message.clone()));
        }

        Ok(cmd != DemoCommand::Stop)
    }

    /// Runs [`Self::parse_next_frame`] until the demo ends, the caller
    /// cancels, or an error latches.
    pub fn parse_to_end(&mut self) -> Result<(), ParserError> {
        while self.parse_next_frame()? {}
        Ok(())
    }

    fn process_frame(&mut self, cmd: DemoCommand, data: &[u8]) -> Result<(), ParserError> {
        match cmd {
            DemoCommand::FileHeader => {
                let raw: proto::CDemoFileHeader = prost::Message::decode(data)?;
                self.header = Some(raw);
            }
            DemoCommand::FileInfo => {
                let raw: proto::CDemoFileInfo = prost::Message::decode(data)?;
                self.file_info = Some(raw);
            }
            DemoCommand::SignonPacket | DemoCommand::Packet => {
                let raw: proto::CDemoPacket = prost::Message::decode(data)?;
                self.parse_packet(&raw)?;
            }
            DemoCommand::FullPacket => {
                let raw: proto::CDemoFullPacket = prost::Message::decode(data)?;
                if let Some(tables) = &raw.string_table {
                    let updates = self.string_tables.on_snapshot(tables)?;
                    self.apply_table_updates(updates);
                }
                if let Some(packet) = &raw.packet {
                    self.parse_packet(packet)?;
                }
            }
            DemoCommand::StringTables => {
                let raw: proto::CDemoStringTables = prost::Message::decode(data)?;
                let updates = self.string_tables.on_snapshot(&raw)?;
                self.apply_table_updates(updates);
            }
            DemoCommand::SendTables => {
                let raw: proto::CDemoSendTables = prost::Message::decode(data)?;
                self.entities
                    .on_send_tables(raw.data.as_deref().unwrap_or(&[]))?;
            }
            DemoCommand::ClassInfo => {
                let raw: proto::CDemoClassInfo = prost::Message::decode(data)?;
                self.entities.on_class_info(&raw);
            }
            DemoCommand::Stop => {}
            other => {
                log::trace!("skipping frame {:?}", other);
            }
        }

        Ok(())
    }

    fn parse_packet(&mut self, raw: &proto::CDemoPacket) -> Result<(), ParserError> {
        let payload = raw.data.as_deref().unwrap_or(&[]);
        let mut reader = BitReader::new(payload);

        while reader.bits_remaining() > 8 {
            let msg_type = reader.read_u_bit_var()?;
            let size = reader.read_varint()?;
            let msg_bytes = reader.read_n_bytes(size as usize)?;

            let net_msg_type = match NetmessageType::try_from(msg_type as i32) {
                Ok(v) => v,
                Err(unknown) => {
                    log::trace!("skipping unknown net message {}", unknown);
                    continue;
                }
            };

            match net_msg_type {
                NetmessageType::net_Tick => {
                    let raw: proto::CnetMsgTick = prost::Message::decode(msg_bytes.as_slice())?;
                    self.game_state.ingame_tick = raw.tick.unwrap_or(0);
                }
                NetmessageType::svc_ServerInfo => {
                    let raw: proto::CsvcMsgServerInfo =
                        prost::Message::decode(msg_bytes.as_slice())?;
                    self.entities.on_server_info(raw.max_classes.unwrap_or(0));
                }
                NetmessageType::svc_CreateStringTable => {
                    let raw: proto::CsvcMsgCreateStringTable =
                        prost::Message::decode(msg_bytes.as_slice())?;
                    match self.string_tables.on_create(&raw) {
                        Ok(updates) => self.apply_table_updates(updates),
                        Err(err) => self.warn(
                            WarnType::StringTableParsingFailure,
                            format!("failed to create string table: {:?}", err),
                        ),
                    }
                }
                NetmessageType::svc_UpdateStringTable => {
                    let raw: proto::CsvcMsgUpdateStringTable =
                        prost::Message::decode(msg_bytes.as_slice())?;
                    match self.string_tables.on_update(&raw) {
                        Ok(updates) => self.apply_table_updates(updates),
                        Err(err) => self.warn(
                            WarnType::StringTableParsingFailure,
                            format!("failed to update string table: {:?}", err),
                        ),
                    }
                }
                NetmessageType::GE_Source1LegacyGameEventList => {
                    let raw: proto::CMsgSource1LegacyGameEventList =
                        prost::Message::decode(msg_bytes.as_slice())?;
                    self.handle_game_event_list(raw);
                }
                NetmessageType::GE_Source1LegacyGameEvent => {
                    let raw: proto::CMsgSource1LegacyGameEvent =
                        prost::Message::decode(msg_bytes.as_slice())?;
                    self.handle_game_event(raw);
                }
                NetmessageType::svc_PacketEntities => {
                    let raw: proto::CsvcMsgPacketEntities =
                        prost::Message::decode(msg_bytes.as_slice())?;
                    self.handle_packet_entities(&raw);
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Entity deltas are decoded with local recovery: corruptions observed
    /// in the wild abort the message, produce a warning and parsing resumes
    /// at the next outer message.
    fn handle_packet_entities(&mut self, msg: &proto::CsvcMsgPacketEntities) {
        let mut changes = std::mem::take(&mut self.entity_changes);
        changes.clear();

        if let Err(err) = self.entities.parse_packet_entities(msg, &mut changes) {
            self.warn(
                WarnType::PacketEntitiesPanic,
                format!("failed to parse PacketEntities: {:?}", err),
            );
        }

        for change in changes.iter() {
            self.apply_entity_change(change);

            let entity = change
                .removed_entity
                .as_ref()
                .or_else(|| self.entities.entities.get(&change.entity_id));
            if let Some(entity) = entity {
                for handler in self.entity_handlers.iter_mut() {
                    handler(entity, change.op);
                }
            }
        }

        self.entity_changes = changes;
    }

    fn apply_table_updates(&mut self, updates: Vec<TableUpdate>) {
        for update in updates {
            match update {
                TableUpdate::Baseline { class_id, data } => {
                    self.entities.set_instance_baseline(class_id, data);
                }
                TableUpdate::UserInfo { slot, info } => {
                    self.apply_user_info(slot, info, true);
                }
                TableUpdate::TableCreated { name } => {
                    self.dispatcher.dispatch(&Event::StringTableCreated(
                        events::StringTableCreated { table_name: name },
                    ));
                }
                TableUpdate::ParseFailure { table } => {
                    self.warn(
                        WarnType::StringTableParsingFailure,
                        format!("failed to parse stringtable {:?} properly", table),
                    );
                }
            }
        }
    }

    /// Applies a raw user-info record: updates the raw index, creates or
    /// updates the derived player, and emits the lifecycle events.
    pub(crate) fn apply_user_info(
        &mut self,
        slot: i32,
        mut info: RawPlayerInfo,
        first_write_wins: bool,
    ) {
        if first_write_wins && self.raw_players.contains_key(&slot) {
            return;
        }

        // A re-sent slot may carry the unknown-user-id sentinel; keep the id
        // we already know in that case.
        if info.user_id == 0xFFFF {
            if let Some(old) = self.raw_players.get(&slot) {
                info.user_id = old.user_id;
            }
        }

        let uid = normalize_user_id(info.user_id);
        let existing = self.game_state.players_by_user_id.get(&uid);

        let name_changed = existing
            .map(|player| {
                !player.is_bot
                    && !info.is_fake_player
                    && info.guid != "BOT"
                    && player.name != info.name
                    && !player.name.is_empty()
            })
            .unwrap_or(false);
        let old_name = existing.map(|player| player.name.clone()).unwrap_or_default();
        let is_new = existing.is_none();

        let player = self
            .game_state
            .players_by_user_id
            .entry(uid)
            .or_insert_with(|| Player::new(uid));
        player.name = info.name.clone();
        player.steam_id64 = info.xuid;
        player.is_bot = info.is_fake_player;
        player.is_hltv = info.is_hltv;
        // Records arriving through the connect game-event carry a widened
        // user id as "slot"; only a real table slot maps to a controller
        // entity index.
        if player.entity_id.is_none() && (0..=0xFF).contains(&slot) {
            player.entity_id = Some(slot + 1);
        }

        if let Some(entity_id) = player.entity_id {
            self.game_state.players_by_entity_id.insert(entity_id, uid);
        }
        if info.xuid > 0 {
            self.game_state.players_by_steam_id.insert(info.xuid, uid);
        }

        {
            let Self {
                game_state,
                dispatcher,
                ..
            } = self;
            let player = &game_state.players_by_user_id[&uid];

            if name_changed {
                dispatcher.dispatch(&Event::PlayerNameChange(events::PlayerNameChange {
                    player,
                    old_name,
                    new_name: info.name.clone(),
                }));
            }
            if !is_new {
                dispatcher.dispatch(&Event::StringTablePlayerUpdateApplied(
                    events::StringTablePlayerUpdateApplied { player },
                ));
            }
        }

        self.raw_players.insert(slot, info);
        let info = &self.raw_players[&slot];

        self.dispatcher
            .dispatch(&Event::PlayerInfo(events::PlayerInfo { index: slot, info }));

        let pov_detected = self.recording_player_slot == -1
            && self
                .header
                .as_ref()
                .map(|h| !h.client_name().is_empty() && h.client_name() == info.name)
                .unwrap_or(false);
        if pov_detected {
            self.recording_player_slot = slot;
            self.dispatcher.dispatch(&Event::POVRecordingPlayerDetected(
                events::POVRecordingPlayerDetected {
                    player_slot: slot,
                    player_info: info,
                },
            ));
        }
    }

    // ---- entity wiring -------------------------------------------------

    fn apply_entity_change(&mut self, change: &EntityChange) {
        let class_name = change.class_name.as_ref();

        match class_name {
            "CCSPlayerController" => self.wire_player_controller(change),
            "CCSPlayerPawn" => self.wire_player_pawn(change),
            "CInferno" => self.wire_inferno(change),
            "CHostage" => self.wire_hostage(change),
            "CBombTarget" => self.wire_trigger(change),
            "CCSPlayerResource" => self.wire_player_resource(change),
            "CCSGameRulesProxy" | "CCSGameRules" => self.wire_game_rules(change),
            "CCSTeam" => self.wire_team(change),
            _ if class_name.ends_with("Projectile") => self.wire_projectile(change),
            _ => {
                let eq = EquipmentType::from_entity_class(class_name);
                if eq != EquipmentType::Unknown && eq != EquipmentType::World {
                    self.wire_weapon(change, eq);
                }
            }
        }
    }

    fn wire_player_controller(&mut self, change: &EntityChange) {
        let entity_id = change.entity_id;

        if change.op == EntityOp::Created {
            let slot = entity_id - 1;
            let uid = self
                .raw_players
                .get(&slot)
                .map(|raw| normalize_user_id(raw.user_id))
                .unwrap_or(slot);

            let player = self
                .game_state
                .players_by_user_id
                .entry(uid)
                .or_insert_with(|| Player::new(uid));
            player.entity_id = Some(entity_id);
            player.is_connected = true;
            self.game_state.players_by_entity_id.insert(entity_id, uid);
        }

        let Some(&uid) = self.game_state.players_by_entity_id.get(&entity_id) else {
            return;
        };

        for prop in change.props.iter() {
            match prop_suffix(&prop.name) {
                "m_iszPlayerName" => {
                    if let Some(name) = prop.value.as_str() {
                        if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                            player.name = name.to_owned();
                        }
                    }
                }
                "m_steamID" => {
                    if let Some(steam_id) = prop.value.as_u64() {
                        if steam_id > 0 {
                            if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid)
                            {
                                player.steam_id64 = steam_id;
                            }
                            self.game_state.players_by_steam_id.insert(steam_id, uid);
                        }
                    }
                }
                "m_hPlayerPawn" => {
                    if let Some(handle) = prop.value.as_u64() {
                        let pawn = (handle & ENTITY_HANDLE_INDEX_MASK) as i32;
                        if pawn != ENTITY_HANDLE_MISSING {
                            if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid)
                            {
                                player.pawn_entity_id = Some(pawn);
                            }
                            self.game_state.pawn_to_user_id.insert(pawn, uid);
                        }
                    }
                }
                "m_hOriginalControllerOfCurrentPawn" => {
                    // Back-reference used to resolve the controlled bot.
                    if let Some(handle) = prop.value.as_u64() {
                        let controller = (handle & ENTITY_HANDLE_INDEX_MASK) as i32;
                        let bot_steam_id = self
                            .game_state
                            .player_by_entity_id(controller)
                            .map(|p| p.steam_id64);
                        if let (Some(bot_steam_id), Some(player)) = (
                            bot_steam_id,
                            self.game_state.players_by_user_id.get_mut(&uid),
                        ) {
                            player.controlled_bot_steam_id = Some(bot_steam_id);
                        }
                    }
                }
                "m_iTeamNum" => {
                    if let Some(team) = prop.value.as_i32() {
                        if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                            player.team = Team::from(team);
                        }
                    }
                }
                "m_iPawnHealth" => {
                    if let Some(health) = prop.value.as_i32() {
                        if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                            player.health = health;
                        }
                    }
                }
                "m_iPawnArmor" => {
                    if let Some(armor) = prop.value.as_i32() {
                        if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                            player.armor = armor;
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn wire_player_pawn(&mut self, change: &EntityChange) {
        let pawn_entity = change.entity_id;

        // Link pass first: the controller handle may arrive in the same
        // update as the props that need it.
        for prop in change.props.iter() {
            if prop_suffix(&prop.name) == "m_hController" {
                if let Some(handle) = prop.value.as_u64() {
                    let controller = (handle & ENTITY_HANDLE_INDEX_MASK) as i32;
                    if let Some(&uid) = self.game_state.players_by_entity_id.get(&controller) {
                        self.game_state.pawn_to_user_id.insert(pawn_entity, uid);
                        if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                            player.pawn_entity_id = Some(pawn_entity);
                        }
                    }
                }
            }
        }

        let Some(&uid) = self.game_state.pawn_to_user_id.get(&pawn_entity) else {
            return;
        };

        for prop in change.props.iter() {
            match prop_suffix(&prop.name) {
                "m_iHealth" => {
                    if let Some(health) = prop.value.as_i32() {
                        if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                            player.health = health;
                        }
                    }
                }
                "m_ArmorValue" => {
                    if let Some(armor) = prop.value.as_i32() {
                        if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                            player.armor = armor;
                        }
                    }
                }
                "m_iTeamNum" => {
                    if let Some(team) = prop.value.as_i32() {
                        if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                            player.team = Team::from(team);
                        }
                    }
                }
                "m_flFlashDuration" => {
                    if let Some(duration) = prop.value.as_f32() {
                        if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                            player.flash_duration = duration;
                        }
                        // The flashed players of the current explosion are
                        // attributed to the newest flying flashbang.
                        if duration > 0.0 {
                            if let Some(flashbang) = self.game_state.flying_flashbangs.back_mut()
                            {
                                flashbang.flashed_entity_ids.push(pawn_entity);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn wire_projectile(&mut self, change: &EntityChange) {
        let entity_id = change.entity_id;
        let eq = EquipmentType::from_entity_class(&change.class_name);

        match change.op {
            EntityOp::Created => {
                let thrower_uid = self.projectile_thrower(change);

                self.game_state.grenade_projectiles.insert(
                    entity_id,
                    GrenadeProjectile {
                        entity_id,
                        equipment_type: eq,
                        thrower_user_id: thrower_uid,
                        position: [0.0; 3],
                    },
                );

                if eq == EquipmentType::Flash {
                    self.game_state.flying_flashbangs.push_back(FlyingFlashbang {
                        projectile_entity_id: entity_id,
                        flashed_entity_ids: Vec::new(),
                        exploded_frame: 0,
                    });
                }

                if let Some(uid) = thrower_uid {
                    let mut weapon = Equipment::new(eq);
                    weapon.entity_id = Some(entity_id);
                    weapon.owner_user_id = Some(uid);
                    self.game_state.add_thrown_grenade(uid, weapon);
                }
            }
            EntityOp::Updated => {
                // The thrower handle may only arrive after creation.
                if let Some(uid) = self.projectile_thrower(change) {
                    let mut newly_attributed = false;
                    if let Some(projectile) =
                        self.game_state.grenade_projectiles.get_mut(&entity_id)
                    {
                        if projectile.thrower_user_id.is_none() {
                            projectile.thrower_user_id = Some(uid);
                            newly_attributed = true;
                        }
                    }
                    if newly_attributed {
                        let mut weapon = Equipment::new(eq);
                        weapon.entity_id = Some(entity_id);
                        weapon.owner_user_id = Some(uid);
                        self.game_state.add_thrown_grenade(uid, weapon);
                    }
                }
            }
            EntityOp::Deleted | EntityOp::Left => {
                let projectile = self.game_state.grenade_projectiles.remove(&entity_id);

                if eq == EquipmentType::Flash {
                    let frame = self.current_frame;
                    if let Some(flashbang) = self
                        .game_state
                        .flying_flashbangs
                        .iter_mut()
                        .find(|f| f.projectile_entity_id == entity_id)
                    {
                        flashbang.exploded_frame = frame;
                    }
                }

                // HE and flash have no expiry game event that balances the
                // throw bookkeeping, so the projectile teardown does it.
                if matches!(eq, EquipmentType::HE | EquipmentType::Flash) {
                    if let Some(uid) = projectile.and_then(|p| p.thrower_user_id) {
                        self.game_state.delete_thrown_grenade(uid, eq);
                    }
                }
            }
            EntityOp::Entered => {}
        }
    }

    fn projectile_thrower(&self, change: &EntityChange) -> Option<i32> {
        for prop in change.props.iter() {
            let suffix = prop_suffix(&prop.name);
            if suffix == "m_hThrower" || suffix == "m_hOwnerEntity" {
                if let Some(handle) = prop.value.as_u64() {
                    if let Some(player) = self.game_state.find_by_pawn_handle(handle) {
                        return Some(player.user_id);
                    }
                }
            }
        }
        None
    }

    fn wire_inferno(&mut self, change: &EntityChange) {
        match change.op {
            EntityOp::Created => {
                let thrower_uid = self.projectile_thrower(change);
                self.game_state.infernos.insert(
                    change.entity_id,
                    Inferno {
                        entity_id: change.entity_id,
                        thrower_user_id: thrower_uid,
                    },
                );
            }
            EntityOp::Deleted | EntityOp::Left => {
                self.game_state.infernos.remove(&change.entity_id);
            }
            _ => {}
        }
    }

    fn wire_hostage(&mut self, change: &EntityChange) {
        match change.op {
            EntityOp::Deleted => {
                self.game_state.hostages.remove(&change.entity_id);
                return;
            }
            EntityOp::Created | EntityOp::Updated => {}
            _ => return,
        }

        let hostage = self
            .game_state
            .hostages
            .entry(change.entity_id)
            .or_insert_with(|| Hostage {
                entity_id: change.entity_id,
                health: 100,
            });

        for prop in change.props.iter() {
            if prop_suffix(&prop.name) == "m_iHealth" {
                if let Some(health) = prop.value.as_i32() {
                    hostage.health = health;
                }
            }
        }
    }

    fn wire_trigger(&mut self, change: &EntityChange) {
        if change.op == EntityOp::Deleted {
            self.game_state.triggers.remove(&change.entity_id);
            return;
        }

        let trigger = self
            .game_state
            .triggers
            .entry(change.entity_id)
            .or_insert_with(|| Trigger {
                entity_id: change.entity_id,
                mins: [0.0; 3],
                maxs: [0.0; 3],
            });

        for prop in change.props.iter() {
            match prop_suffix(&prop.name) {
                "m_vecMins" => {
                    if let Some(v) = prop.value.as_vec3() {
                        trigger.mins = v;
                    }
                }
                "m_vecMaxs" => {
                    if let Some(v) = prop.value.as_vec3() {
                        trigger.maxs = v;
                    }
                }
                _ => {}
            }
        }
    }

    fn wire_player_resource(&mut self, change: &EntityChange) {
        for prop in change.props.iter() {
            match prop_suffix(&prop.name) {
                "m_bombsiteCenterA" => {
                    if let Some(v) = prop.value.as_vec3() {
                        self.game_state.bombsite_a.center = v;
                    }
                }
                "m_bombsiteCenterB" => {
                    if let Some(v) = prop.value.as_vec3() {
                        self.game_state.bombsite_b.center = v;
                    }
                }
                _ => {}
            }
        }
    }

    fn wire_game_rules(&mut self, change: &EntityChange) {
        for prop in change.props.iter() {
            match prop_suffix(&prop.name) {
                "m_bHasMatchStarted" => {
                    if let Some(started) = prop.value.as_bool() {
                        if started != self.game_state.is_match_started {
                            self.game_state.pending.match_started_changed =
                                Some((self.game_state.is_match_started, started));
                        }
                    }
                }
                "m_bFreezePeriod" => {
                    if let Some(freeze) = prop.value.as_bool() {
                        if freeze != self.game_state.is_freeze_period {
                            if freeze {
                                self.game_state.pending.freeze_time_start = true;
                            } else {
                                self.game_state.pending.freeze_time_end = true;
                            }
                            self.game_state.is_freeze_period = freeze;
                        }
                    }
                }
                "m_eRoundWinReason" => {
                    if let Some(raw) = prop.value.as_i32() {
                        if raw != 0 {
                            let reason = RoundEndReason::from(raw);
                            self.frame_to_round_end_reason
                                .insert(self.current_frame, reason);
                            self.game_state.pending.round_end =
                                Some(round_end_data_from_reason(reason));
                        }
                    }
                }
                "m_totalRoundsPlayed" => {
                    if let Some(rounds) = prop.value.as_i32() {
                        if rounds != self.game_state.total_rounds_played {
                            self.game_state.total_rounds_played = rounds;
                            self.game_state.pending.round_start = Some(RoundStartData::default());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn wire_team(&mut self, change: &EntityChange) {
        let entity_id = change.entity_id;

        for prop in change.props.iter() {
            if prop_suffix(&prop.name) == "m_iTeamNum" {
                if let Some(num) = prop.value.as_i32() {
                    let team = Team::from(num);
                    self.game_state.team_states.insert(
                        team,
                        TeamState {
                            team,
                            entity_id,
                            score: 0,
                            clan_name: String::new(),
                        },
                    );
                }
            }
        }

        let Some(state) = self
            .game_state
            .team_states
            .values_mut()
            .find(|s| s.entity_id == entity_id)
        else {
            return;
        };

        for prop in change.props.iter() {
            match prop_suffix(&prop.name) {
                "m_iScore" => {
                    if let Some(score) = prop.value.as_i32() {
                        state.score = score;
                    }
                }
                "m_szTeamname" | "m_szClanTeamname" => {
                    if let Some(name) = prop.value.as_str() {
                        state.clan_name = name.to_owned();
                    }
                }
                _ => {}
            }
        }
    }

    fn wire_weapon(&mut self, change: &EntityChange, eq: EquipmentType) {
        let entity_id = change.entity_id;

        if change.op == EntityOp::Deleted {
            if let Some(uid) = self.weapon_owners.remove(&entity_id) {
                if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                    player.weapons.retain(|w| w.entity_id != Some(entity_id));
                }
            }
            self.weapon_entities.remove(&entity_id);
            return;
        }

        self.weapon_entities.insert(entity_id, eq);

        for prop in change.props.iter() {
            if prop_suffix(&prop.name) != "m_hOwnerEntity" {
                continue;
            }
            let Some(handle) = prop.value.as_u64() else {
                continue;
            };

            let new_owner = if (handle & ENTITY_HANDLE_INDEX_MASK) as i32 == ENTITY_HANDLE_MISSING
            {
                None
            } else {
                self.game_state.find_by_pawn_handle(handle).map(|p| p.user_id)
            };

            let old_owner = self.weapon_owners.get(&entity_id).copied();
            if old_owner == new_owner {
                continue;
            }

            if let Some(uid) = old_owner {
                if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                    player.weapons.retain(|w| w.entity_id != Some(entity_id));
                }
                self.weapon_owners.remove(&entity_id);
            }

            if let Some(uid) = new_owner {
                if let Some(player) = self.game_state.players_by_user_id.get_mut(&uid) {
                    player.weapons.push(Equipment {
                        equipment_type: eq,
                        entity_id: Some(entity_id),
                        owner_user_id: Some(uid),
                    });
                }
                self.weapon_owners.insert(entity_id, uid);
            }
        }
    }

    // ---- end of frame --------------------------------------------------

    /// Fixed end-of-frame sequence: flying flashbangs, round-progress
    /// slots, then the delayed task queue. Several property updates land
    /// after the game-event messages of the same frame; running these here
    /// guarantees observers see coherent state. The first two steps belong
    /// to the property-synthesis path and are skipped when the legacy game
    /// events are translated directly.
    fn end_of_frame(&mut self) {
        if !self.config.disable_mimic_source1_game_events {
            self.process_flying_flashbangs();
            self.process_round_progress_events();
        }

        while let Some(task) = self.delayed_tasks.pop_front() {
            match task {
                EventTask::RunHandler { kind, data } => self.run_game_event_handler(kind, &data),
                EventTask::DeleteThrownGrenade {
                    user_id,
                    equipment_type,
                } => {
                    if let Some(uid) = user_id {
                        self.game_state.delete_thrown_grenade(uid, equipment_type);
                    }
                }
            }
        }
    }

    fn process_flying_flashbangs(&mut self) {
        let Some(flashbang) = self.game_state.flying_flashbangs.front() else {
            return;
        };

        if flashbang.flashed_entity_ids.is_empty() {
            // Exploded without flashing anyone; retire it once the
            // explosion frame has passed.
            if flashbang.exploded_frame > 0 && flashbang.exploded_frame < self.current_frame {
                self.game_state.flying_flashbangs.pop_front();
            }
            return;
        }

        let flashed = flashbang.flashed_entity_ids.clone();
        let projectile_entity = flashbang.projectile_entity_id;
        let attacker_uid = self
            .game_state
            .grenade_projectiles
            .get(&projectile_entity)
            .and_then(|p| p.thrower_user_id)
            .or(self.game_state.last_flash_attacker);

        for pawn_entity in flashed {
            let Self {
                game_state,
                dispatcher,
                ..
            } = self;
            let Some(&uid) = game_state.pawn_to_user_id.get(&pawn_entity) else {
                continue;
            };
            let Some(player) = game_state.players_by_user_id.get(&uid) else {
                continue;
            };

            dispatcher.dispatch(&Event::PlayerFlashed(events::PlayerFlashed {
                player,
                attacker: attacker_uid.and_then(|uid| game_state.players_by_user_id.get(&uid)),
                projectile: game_state.grenade_projectiles.get(&projectile_entity),
            }));
        }

        self.game_state.flying_flashbangs.pop_front();
    }

    fn dispatch_match_started_if_necessary(&mut self) {
        if let Some((old, new)) = self.game_state.pending.match_started_changed.take() {
            self.game_state.is_match_started = new;
            self.dispatcher
                .dispatch(&Event::MatchStartedChanged(events::MatchStartedChanged {
                    old_is_started: old,
                    new_is_started: new,
                }));
        }
    }

    /// Round-progress slots drain in a fixed order; each slot is
    /// single-valued and cleared on dispatch.
    fn process_round_progress_events(&mut self) {
        self.dispatch_match_started_if_necessary();

        if let Some(data) = self.game_state.pending.round_start.take() {
            // Same round-boundary cleanup the legacy round_start handler
            // performs in direct-translation mode.
            self.game_state.clear_grenade_projectiles();
            self.dispatcher.dispatch(&Event::RoundStart(events::RoundStart {
                time_limit: data.time_limit,
                frag_limit: data.frag_limit,
                objective: data.objective,
            }));
        }

        if std::mem::take(&mut self.game_state.pending.freeze_time_start) {
            self.dispatcher.dispatch(&Event::RoundFreezetimeStart(
                events::RoundFreezetimeStart,
            ));
        }
        if std::mem::take(&mut self.game_state.pending.freeze_time_end) {
            self.dispatcher
                .dispatch(&Event::RoundFreezetimeEnd(events::RoundFreezetimeEnd));
        }

        if let Some(data) = self.game_state.pending.round_end.take() {
            self.dispatcher.dispatch(&Event::RoundEnd(events::RoundEnd {
                message: data.message,
                reason: data.reason,
                winner: data.winner,
            }));
        }

        self.dispatch_match_started_if_necessary();
    }
}

fn prop_suffix(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_event::{EventTask, HandlerKind, KeyValue};
    use crate::gamestate::{Bombsite, RoundEndData};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn minimal_demo() -> Vec<u8> {
        // A container holding a single stop frame.
        let inner = [0u8, 0, 0];
        let mut out = Vec::new();
        out.extend_from_slice(b"PBDEMS2\0");
        out.extend_from_slice(&(inner.len() as u32).to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&inner);
        out.extend_from_slice(&[0u8; 2]);
        out
    }

    fn short(value: i32) -> KeyValue {
        KeyValue {
            key_type: 4,
            val_short: Some(value),
            ..Default::default()
        }
    }

    fn byte(value: i32) -> KeyValue {
        KeyValue {
            key_type: 5,
            val_byte: Some(value),
            ..Default::default()
        }
    }

    fn string(value: &str) -> KeyValue {
        KeyValue {
            key_type: 1,
            val_string: Some(value.to_string()),
            ..Default::default()
        }
    }

    fn data(entries: Vec<(&str, KeyValue)>) -> crate::game_event::EventData {
        crate::game_event::EventData(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    fn add_player(parser: &mut Parser, uid: i32, name: &str) {
        let mut player = Player::new(uid);
        player.name = name.to_string();
        parser.game_state.players_by_user_id.insert(uid, player);
    }

    /// Config that routes round/bomb/flash events through the legacy
    /// game-event handlers instead of the entity-property synthesis.
    fn direct_translation() -> ParserConfig {
        ParserConfig {
            disable_mimic_source1_game_events: true,
            ..Default::default()
        }
    }

    #[test]
    fn delayed_flash_sees_later_property_update() {
        let demo = minimal_demo();
        let mut parser = Parser::new(&demo, direct_translation()).unwrap();
        add_player(&mut parser, 5, "carol");

        let durations = Rc::new(RefCell::new(Vec::new()));
        {
            let durations = Rc::clone(&durations);
            parser.register(move |event| {
                if let Event::PlayerFlashed(ev) = event {
                    durations.borrow_mut().push(ev.player.flash_duration);
                }
            });
        }

        // The blind event is delayed; the flash duration prop lands later in
        // the same frame.
        parser.delayed_tasks.push_back(EventTask::RunHandler {
            kind: HandlerKind::PlayerBlind,
            data: data(vec![("userid", short(5))]),
        });
        parser
            .game_state
            .players_by_user_id
            .get_mut(&5)
            .unwrap()
            .flash_duration = 4.2;

        parser.end_of_frame();

        assert_eq!(vec![4.2], *durations.borrow());
    }

    #[test]
    fn bomb_site_resolved_via_trigger_fallback() {
        let demo = minimal_demo();
        let mut parser = Parser::new(&demo, direct_translation()).unwrap();
        add_player(&mut parser, 5, "dave");

        parser.game_state.bombsite_a = Bombsite {
            index: -1,
            center: [100.0, 100.0, 0.0],
        };
        parser.game_state.bombsite_b = Bombsite {
            index: -2,
            center: [-100.0, -100.0, 0.0],
        };
        parser.game_state.triggers.insert(
            17,
            Trigger {
                entity_id: 17,
                mins: [90.0, 90.0, -10.0],
                maxs: [110.0, 110.0, 10.0],
            },
        );

        let sites = Rc::new(RefCell::new(Vec::new()));
        {
            let sites = Rc::clone(&sites);
            parser.register(move |event| {
                if let Event::BombPlanted(ev) = event {
                    sites.borrow_mut().push(ev.site);
                }
            });
        }

        parser.run_game_event_handler(
            HandlerKind::BombPlanted,
            &data(vec![("userid", short(5)), ("site", short(17))]),
        );

        assert_eq!(vec![crate::events::Bombsite::A], *sites.borrow());
        assert_eq!(17, parser.game_state.bombsite_a.index);
    }

    #[test]
    fn unknown_bomb_site_latches_unless_configured() {
        let demo = minimal_demo();
        let mut parser = Parser::new(&demo, direct_translation()).unwrap();
        add_player(&mut parser, 5, "dave");
        parser.game_state.bombsite_a.index = -1;
        parser.game_state.bombsite_b.index = -2;

        parser.run_game_event_handler(
            HandlerKind::BombPlanted,
            &data(vec![("userid", short(5)), ("site", short(17))]),
        );
        assert!(parser.latched.is_some());

        // With the flag set the failure is demoted to a warning.
        let mut parser = Parser::new(
            &demo,
            ParserConfig {
                ignore_bombsite_index_not_found: true,
                ..direct_translation()
            },
        )
        .unwrap();
        add_player(&mut parser, 5, "dave");
        parser.game_state.bombsite_a.index = -1;
        parser.game_state.bombsite_b.index = -2;

        let warns = Rc::new(RefCell::new(Vec::new()));
        {
            let warns = Rc::clone(&warns);
            parser.register(move |event| {
                if let Event::ParserWarn(warn) = event {
                    warns.borrow_mut().push(warn.warn_type);
                }
            });
        }
        parser.run_game_event_handler(
            HandlerKind::BombPlanted,
            &data(vec![("userid", short(5)), ("site", short(17))]),
        );

        assert!(parser.latched.is_none());
        assert_eq!(vec![WarnType::BombsiteUnknown], *warns.borrow());
    }

    #[test]
    fn player_hurt_damage_taken_is_clamped() {
        let demo = minimal_demo();
        let mut parser = Parser::new(&demo, ParserConfig::default()).unwrap();
        add_player(&mut parser, 7, "victim");
        {
            let player = parser.game_state.players_by_user_id.get_mut(&7).unwrap();
            player.health = 35;
            player.armor = 50;
        }

        let records = Rc::new(RefCell::new(Vec::new()));
        {
            let records = Rc::clone(&records);
            parser.register(move |event| {
                if let Event::PlayerHurt(ev) = event {
                    records.borrow_mut().push((
                        ev.health_damage,
                        ev.health_damage_taken,
                        ev.armor_damage,
                        ev.armor_damage_taken,
                    ));
                }
            });
        }

        parser.run_game_event_handler(
            HandlerKind::PlayerHurt,
            &data(vec![
                ("userid", short(7)),
                ("attacker", short(0)),
                ("weapon", string("ak47")),
                ("health", byte(0)),
                ("armor", byte(12)),
                ("dmg_health", short(120)),
                ("dmg_armor", byte(5)),
                ("hitgroup", byte(1)),
            ]),
        );

        // Raw damage is reported as-is; taken damage is clamped to what the
        // victim actually had left.
        assert_eq!(vec![(120, 35, 5, 5)], *records.borrow());
    }

    #[test]
    fn player_team_prop_is_authoritative() {
        let demo = minimal_demo();
        let mut parser = Parser::new(&demo, ParserConfig::default()).unwrap();
        add_player(&mut parser, 4, "erin");
        parser
            .game_state
            .players_by_user_id
            .get_mut(&4)
            .unwrap()
            .team = Team::Terrorists;

        let teams = Rc::new(RefCell::new(Vec::new()));
        {
            let teams = Rc::clone(&teams);
            parser.register(move |event| {
                if let Event::PlayerTeamChange(ev) = event {
                    teams.borrow_mut().push((ev.new_team, ev.old_team));
                }
            });
        }

        // The event claims CT, but the entity prop already says T.
        parser.run_game_event_handler(
            HandlerKind::PlayerTeam,
            &data(vec![
                ("userid", short(4)),
                ("team", byte(3)),
                ("oldteam", byte(2)),
            ]),
        );

        assert_eq!(
            vec![(Team::Terrorists, Team::Terrorists)],
            *teams.borrow()
        );
    }

    #[test]
    fn fall_damage_upgrades_unknown_weapon_to_world() {
        let demo = minimal_demo();
        let mut parser = Parser::new(&demo, ParserConfig::default()).unwrap();
        add_player(&mut parser, 7, "victim");

        let weapons = Rc::new(RefCell::new(Vec::new()));
        {
            let weapons = Rc::clone(&weapons);
            parser.register(move |event| {
                if let Event::Kill(kill) = event {
                    weapons.borrow_mut().push(kill.weapon.equipment_type);
                }
            });
        }

        parser.run_game_event_handler(
            HandlerKind::PlayerFallDamage,
            &data(vec![("userid", short(7))]),
        );
        parser.run_game_event_handler(
            HandlerKind::PlayerDeath,
            &data(vec![
                ("userid", short(7)),
                ("attacker", short(0)),
                ("weapon", string("")),
            ]),
        );

        assert_eq!(vec![EquipmentType::World], *weapons.borrow());
    }

    #[test]
    fn round_end_reason_upgrades_unknown_weapon_to_bomb() {
        let demo = minimal_demo();
        let mut parser = Parser::new(&demo, ParserConfig::default()).unwrap();
        add_player(&mut parser, 7, "victim");
        parser
            .frame_to_round_end_reason
            .insert(parser.current_frame, RoundEndReason::TargetBombed);

        let weapons = Rc::new(RefCell::new(Vec::new()));
        {
            let weapons = Rc::clone(&weapons);
            parser.register(move |event| {
                if let Event::Kill(kill) = event {
                    weapons.borrow_mut().push(kill.weapon.equipment_type);
                }
            });
        }

        parser.run_game_event_handler(
            HandlerKind::PlayerDeath,
            &data(vec![
                ("userid", short(7)),
                ("attacker", short(0)),
                ("weapon", string("")),
            ]),
        );

        assert_eq!(vec![EquipmentType::Bomb], *weapons.borrow());
    }

    #[test]
    fn end_of_frame_orders_round_progress_before_delayed_tasks() {
        let demo = minimal_demo();
        let mut parser = Parser::new(&demo, ParserConfig::default()).unwrap();

        let order = Rc::new(RefCell::new(Vec::new()));
        {
            let order = Rc::clone(&order);
            parser.register(move |event| {
                let tag = match event {
                    Event::MatchStartedChanged(_) => "match_started_changed",
                    Event::RoundStart(_) => "round_start",
                    Event::RoundFreezetimeStart(_) => "freezetime_start",
                    Event::RoundFreezetimeEnd(_) => "freezetime_end",
                    Event::RoundEnd(_) => "round_end",
                    Event::MatchStart(_) => "delayed_task",
                    _ => return,
                };
                order.borrow_mut().push(tag);
            });
        }

        parser.game_state.pending.match_started_changed = Some((false, true));
        parser.game_state.pending.round_start = Some(RoundStartData::default());
        parser.game_state.pending.freeze_time_start = true;
        parser.game_state.pending.freeze_time_end = true;
        parser.game_state.pending.round_end = Some(RoundEndData {
            message: String::new(),
            reason: RoundEndReason::CtWin,
            winner: Team::CounterTerrorists,
        });
        parser.delayed_tasks.push_back(EventTask::RunHandler {
            kind: HandlerKind::BeginNewMatch,
            data: data(vec![]),
        });

        parser.end_of_frame();

        assert_eq!(
            vec![
                "match_started_changed",
                "round_start",
                "freezetime_start",
                "freezetime_end",
                "round_end",
                "delayed_task",
            ],
            *order.borrow()
        );
        assert!(parser.game_state.is_match_started);
    }

    #[test]
    fn round_events_come_from_exactly_one_path() {
        fn round_end_data() -> crate::game_event::EventData {
            data(vec![
                ("winner", byte(3)),
                ("reason", byte(8)),
                ("message", string("#SFUI_Notice_CTs_Win")),
            ])
        }
        fn count_round_ends<'b, 'h>(parser: &mut Parser<'b, 'h>) -> Rc<RefCell<i32>> {
            let count = Rc::new(RefCell::new(0));
            let captured = Rc::clone(&count);
            parser.register(move |event| {
                if let Event::RoundEnd(_) = event {
                    *captured.borrow_mut() += 1;
                }
            });
            count
        }

        // Synthesis mode: the legacy handler is a no-op, the pending slot
        // dispatches at end-of-frame.
        let demo = minimal_demo();
        let mut parser = Parser::new(&demo, ParserConfig::default()).unwrap();
        let count = count_round_ends(&mut parser);
        parser.run_game_event_handler(HandlerKind::RoundEnd, &round_end_data());
        parser.game_state.pending.round_end = Some(RoundEndData {
            message: String::new(),
            reason: RoundEndReason::CtWin,
            winner: Team::CounterTerrorists,
        });
        parser.end_of_frame();
        assert_eq!(1, *count.borrow());

        // Direct translation: the handler dispatches, the pending slots are
        // left alone by end-of-frame.
        let mut parser = Parser::new(&demo, direct_translation()).unwrap();
        let count = count_round_ends(&mut parser);
        parser.run_game_event_handler(HandlerKind::RoundEnd, &round_end_data());
        parser.game_state.pending.round_end = Some(RoundEndData {
            message: String::new(),
            reason: RoundEndReason::CtWin,
            winner: Team::CounterTerrorists,
        });
        parser.end_of_frame();
        assert_eq!(1, *count.borrow());
    }

    #[test]
    fn flying_flashbang_queue_drains_in_fifo_order() {
        let demo = minimal_demo();
        let mut parser = Parser::new(&demo, ParserConfig::default()).unwrap();
        add_player(&mut parser, 3, "thrower");
        add_player(&mut parser, 5, "flashed");
        parser.game_state.pawn_to_user_id.insert(99, 5);

        parser.game_state.grenade_projectiles.insert(
            50,
            GrenadeProjectile {
                entity_id: 50,
                equipment_type: EquipmentType::Flash,
                thrower_user_id: Some(3),
                position: [0.0; 3],
            },
        );
        parser.game_state.flying_flashbangs.push_back(FlyingFlashbang {
            projectile_entity_id: 50,
            flashed_entity_ids: vec![99],
            exploded_frame: 0,
        });

        let flashes = Rc::new(RefCell::new(Vec::new()));
        {
            let flashes = Rc::clone(&flashes);
            parser.register(move |event| {
                if let Event::PlayerFlashed(ev) = event {
                    flashes
                        .borrow_mut()
                        .push((ev.player.user_id, ev.attacker.map(|a| a.user_id)));
                }
            });
        }

        parser.end_of_frame();

        assert_eq!(vec![(5, Some(3))], *flashes.borrow());
        assert!(parser.game_state.flying_flashbangs.is_empty());
    }

    #[test]
    fn exploded_dud_flashbang_is_retired() {
        let demo = minimal_demo();
        let mut parser = Parser::new(&demo, ParserConfig::default()).unwrap();
        parser.current_frame = 2;
        parser.game_state.flying_flashbangs.push_back(FlyingFlashbang {
            projectile_entity_id: 50,
            flashed_entity_ids: vec![],
            exploded_frame: 1,
        });

        parser.end_of_frame();

        assert!(parser.game_state.flying_flashbangs.is_empty());
    }

    #[test]
    fn fatal_errors_latch() {
        let demo = minimal_demo();
        let mut parser = Parser::new(&demo, ParserConfig::default()).unwrap();
        parser.set_error("desynced".to_string());

        assert!(matches!(
            parser.parse_next_frame(),
            Err(ParserError::Fatal(_))
        ));
        // The error sticks on subsequent calls.
        assert!(matches!(
            parser.parse_next_frame(),
            Err(ParserError::Fatal(_))
        ));
    }
}
