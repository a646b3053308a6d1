//! The typed event stream surfaced to consumers.
//!
//! Events borrow from the parser's game state and are only valid for the
//! duration of the dispatch; handlers that need to retain data must copy it.

use crate::equipment::{Equipment, EquipmentType};
use crate::game_event::EventData;
use crate::gamestate::{GrenadeProjectile, Hostage, Player};
use crate::stringtables::RawPlayerInfo;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Team {
    Unassigned,
    Spectators,
    Terrorists,
    CounterTerrorists,
}

impl From<i32> for Team {
    fn from(value: i32) -> Self {
        match value {
            1 => Self::Spectators,
            2 => Self::Terrorists,
            3 => Self::CounterTerrorists,
            _ => Self::Unassigned,
        }
    }
}

/// Why a round ended. `Unspecified` (0) shows up in the wild alongside
/// `TargetBombed` for bomb kills and must be treated the same way there.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RoundEndReason {
    Unspecified,
    TargetBombed,
    BombDefused,
    CtWin,
    TerroristsWin,
    Draw,
    HostagesRescued,
    TargetSaved,
    HostagesNotRescued,
    GameStart,
    TerroristsSurrender,
    CtSurrender,
    Unknown(i32),
}

impl From<i32> for RoundEndReason {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Unspecified,
            1 => Self::TargetBombed,
            7 => Self::BombDefused,
            8 => Self::CtWin,
            9 => Self::TerroristsWin,
            10 => Self::Draw,
            11 => Self::HostagesRescued,
            12 => Self::TargetSaved,
            13 => Self::HostagesNotRescued,
            16 => Self::GameStart,
            17 => Self::TerroristsSurrender,
            18 => Self::CtSurrender,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HitGroup {
    Generic,
    Head,
    Chest,
    Stomach,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
    Neck,
    Gear,
    Unknown(i32),
}

impl From<i32> for HitGroup {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Generic,
            1 => Self::Head,
            2 => Self::Chest,
            3 => Self::Stomach,
            4 => Self::LeftArm,
            5 => Self::RightArm,
            6 => Self::LeftLeg,
            7 => Self::RightLeg,
            8 => Self::Neck,
            10 => Self::Gear,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Bombsite {
    Unknown,
    A,
    B,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum WarnType {
    Generic,
    UnknownEvent,
    BombsiteUnknown,
    TeamSwapPlayerNil,
    GameEventBeforeDescriptors,
    StringTableParsingFailure,
    PacketEntitiesPanic,
}

#[derive(Debug)]
pub struct MatchStart;

#[derive(Debug)]
pub struct MatchStartedChanged {
    pub old_is_started: bool,
    pub new_is_started: bool,
}

#[derive(Debug)]
pub struct RoundStart {
    pub time_limit: i32,
    pub frag_limit: i32,
    pub objective: String,
}

#[derive(Debug)]
pub struct RoundFreezetimeStart;

#[derive(Debug)]
pub struct RoundFreezetimeEnd;

#[derive(Debug)]
pub struct RoundEnd {
    pub message: String,
    pub reason: RoundEndReason,
    pub winner: Team,
}

#[derive(Debug)]
pub struct RoundEndOfficial;

#[derive(Debug)]
pub struct RoundMVPAnnouncement<'a> {
    pub player: Option<&'a Player>,
    pub reason: i32,
}

#[derive(Debug)]
pub struct AnnouncementFinalRound;

#[derive(Debug)]
pub struct AnnouncementMatchStarted;

#[derive(Debug)]
pub struct AnnouncementLastRoundHalf;

#[derive(Debug)]
pub struct AnnouncementWinPanelMatch;

#[derive(Debug)]
pub struct Kill<'a> {
    pub victim: Option<&'a Player>,
    pub killer: Option<&'a Player>,
    pub assister: Option<&'a Player>,
    pub weapon: Equipment,
    pub is_headshot: bool,
    pub penetrated_objects: i32,
    pub assisted_flash: bool,
    pub attacker_blind: bool,
    pub no_scope: bool,
    pub through_smoke: bool,
    pub distance: f32,
}

#[derive(Debug)]
pub struct PlayerHurt<'a> {
    pub player: Option<&'a Player>,
    pub attacker: Option<&'a Player>,
    pub health: i32,
    pub armor: i32,
    pub health_damage: i32,
    pub armor_damage: i32,
    /// Damage actually applied, capped at 100 and at the victim's remaining
    /// health.
    pub health_damage_taken: i32,
    pub armor_damage_taken: i32,
    pub hit_group: HitGroup,
    pub weapon: Equipment,
}

#[derive(Debug)]
pub struct PlayerFlashed<'a> {
    pub player: &'a Player,
    pub attacker: Option<&'a Player>,
    pub projectile: Option<&'a GrenadeProjectile>,
}

#[derive(Debug)]
pub struct WeaponFire<'a> {
    pub shooter: Option<&'a Player>,
    pub weapon: Equipment,
}

#[derive(Debug)]
pub struct WeaponReload<'a> {
    pub player: &'a Player,
}

#[derive(Debug)]
pub struct Footstep<'a> {
    pub player: Option<&'a Player>,
}

#[derive(Debug)]
pub struct PlayerJump<'a> {
    pub player: Option<&'a Player>,
}

#[derive(Debug)]
pub struct PlayerSound<'a> {
    pub player: Option<&'a Player>,
    pub radius: i32,
    pub duration_seconds: f32,
}

#[derive(Debug)]
pub struct PlayerTeamChange<'a> {
    pub player: &'a Player,
    pub new_team: Team,
    pub old_team: Team,
    pub silent: bool,
    pub is_bot: bool,
}

#[derive(Debug)]
pub struct PlayerDisconnected<'a> {
    pub player: &'a Player,
}

#[derive(Debug)]
pub struct ItemEquip<'a> {
    pub player: Option<&'a Player>,
    pub weapon: Equipment,
}

#[derive(Debug)]
pub struct ItemPickup<'a> {
    pub player: Option<&'a Player>,
    pub weapon: Equipment,
}

#[derive(Debug)]
pub struct ItemDrop<'a> {
    pub player: Option<&'a Player>,
    pub weapon: Equipment,
}

#[derive(Debug)]
pub struct BombPlantBegin<'a> {
    pub player: Option<&'a Player>,
    pub site: Bombsite,
}

#[derive(Debug)]
pub struct BombPlanted<'a> {
    pub player: Option<&'a Player>,
    pub site: Bombsite,
}

#[derive(Debug)]
pub struct BombDefuseStart<'a> {
    pub player: Option<&'a Player>,
    pub has_kit: bool,
}

#[derive(Debug)]
pub struct BombDefused<'a> {
    pub player: Option<&'a Player>,
    pub site: Bombsite,
}

#[derive(Debug)]
pub struct BombExplode<'a> {
    pub player: Option<&'a Player>,
    pub site: Bombsite,
}

#[derive(Debug)]
pub struct BombDropped<'a> {
    pub player: Option<&'a Player>,
    pub entity_id: i32,
}

#[derive(Debug)]
pub struct BombPickup<'a> {
    pub player: Option<&'a Player>,
}

/// Shared payload of the grenade detonation / expiry events.
#[derive(Debug)]
pub struct GrenadeEvent<'a> {
    pub grenade_type: EquipmentType,
    pub grenade: Option<Equipment>,
    pub thrower: Option<&'a Player>,
    pub position: [f32; 3],
    pub grenade_entity_id: i32,
}

#[derive(Debug)]
pub struct BotTakenOver<'a> {
    pub taker: Option<&'a Player>,
}

#[derive(Debug)]
pub struct HostageHurt<'a> {
    pub player: Option<&'a Player>,
    pub hostage: Option<&'a Hostage>,
}

#[derive(Debug)]
pub struct HostageKilled<'a> {
    pub killer: Option<&'a Player>,
    pub hostage: Option<&'a Hostage>,
}

#[derive(Debug)]
pub struct HostageRescued<'a> {
    pub player: Option<&'a Player>,
    pub hostage: Option<&'a Hostage>,
}

#[derive(Debug)]
pub struct HostageRescuedAll;

#[derive(Debug)]
pub struct BulletDamage<'a> {
    pub attacker: Option<&'a Player>,
    pub victim: Option<&'a Player>,
    pub distance: f32,
    pub damage_dir_x: f32,
    pub damage_dir_y: f32,
    pub damage_dir_z: f32,
    pub num_penetrations: i32,
    pub is_no_scope: bool,
    pub is_attacker_in_air: bool,
}

#[derive(Debug)]
pub struct OtherDeath<'a> {
    pub killer: Option<&'a Player>,
    pub weapon: Equipment,
    pub penetrated_objects: i32,
    pub no_scope: bool,
    pub through_smoke: bool,
    pub killer_blind: bool,
    pub other_type: String,
    pub other_id: i32,
}

#[derive(Debug)]
pub struct PlayerInfo<'a> {
    pub index: i32,
    pub info: &'a RawPlayerInfo,
}

#[derive(Debug)]
pub struct PlayerNameChange<'a> {
    pub player: &'a Player,
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug)]
pub struct StringTableCreated {
    pub table_name: String,
}

#[derive(Debug)]
pub struct StringTablePlayerUpdateApplied<'a> {
    pub player: &'a Player,
}

#[derive(Debug)]
pub struct POVRecordingPlayerDetected<'a> {
    pub player_slot: i32,
    pub player_info: &'a RawPlayerInfo,
}

#[derive(Debug)]
pub struct GenericGameEvent<'a> {
    pub name: &'a str,
    pub data: &'a EventData,
}

#[derive(Debug)]
pub struct ParserWarn {
    pub warn_type: WarnType,
    pub message: String,
}

/// The canonical event set, dispatched to registered handlers in the order
/// guaranteed by the frame orchestrator.
#[derive(Debug)]
pub enum Event<'a> {
    MatchStart(MatchStart),
    MatchStartedChanged(MatchStartedChanged),
    RoundStart(RoundStart),
    RoundFreezetimeStart(RoundFreezetimeStart),
    RoundFreezetimeEnd(RoundFreezetimeEnd),
    RoundEnd(RoundEnd),
    RoundEndOfficial(RoundEndOfficial),
    RoundMVPAnnouncement(RoundMVPAnnouncement<'a>),
    AnnouncementFinalRound(AnnouncementFinalRound),
    AnnouncementMatchStarted(AnnouncementMatchStarted),
    AnnouncementLastRoundHalf(AnnouncementLastRoundHalf),
    AnnouncementWinPanelMatch(AnnouncementWinPanelMatch),
    Kill(Kill<'a>),
    PlayerHurt(PlayerHurt<'a>),
    PlayerFlashed(PlayerFlashed<'a>),
    WeaponFire(WeaponFire<'a>),
    WeaponReload(WeaponReload<'a>),
    Footstep(Footstep<'a>),
    PlayerJump(PlayerJump<'a>),
    PlayerSound(PlayerSound<'a>),
    PlayerTeamChange(PlayerTeamChange<'a>),
    PlayerDisconnected(PlayerDisconnected<'a>),
    ItemEquip(ItemEquip<'a>),
    ItemPickup(ItemPickup<'a>),
    ItemDrop(ItemDrop<'a>),
    BombPlantBegin(BombPlantBegin<'a>),
    BombPlanted(BombPlanted<'a>),
    BombDefuseStart(BombDefuseStart<'a>),
    BombDefused(BombDefused<'a>),
    BombExplode(BombExplode<'a>),
    BombDropped(BombDropped<'a>),
    BombPickup(BombPickup<'a>),
    FlashExplode(GrenadeEvent<'a>),
    HeExplode(GrenadeEvent<'a>),
    SmokeStart(GrenadeEvent<'a>),
    SmokeExpired(GrenadeEvent<'a>),
    DecoyStart(GrenadeEvent<'a>),
    DecoyExpired(GrenadeEvent<'a>),
    FireGrenadeStart(GrenadeEvent<'a>),
    FireGrenadeExpired(GrenadeEvent<'a>),
    BotTakenOver(BotTakenOver<'a>),
    HostageHurt(HostageHurt<'a>),
    HostageKilled(HostageKilled<'a>),
    HostageRescued(HostageRescued<'a>),
    HostageRescuedAll(HostageRescuedAll),
    BulletDamage(BulletDamage<'a>),
    OtherDeath(OtherDeath<'a>),
    PlayerInfo(PlayerInfo<'a>),
    PlayerNameChange(PlayerNameChange<'a>),
    StringTableCreated(StringTableCreated),
    StringTablePlayerUpdateApplied(StringTablePlayerUpdateApplied<'a>),
    POVRecordingPlayerDetected(POVRecordingPlayerDetected<'a>),
    GenericGameEvent(GenericGameEvent<'a>),
    ParserWarn(ParserWarn),
}
