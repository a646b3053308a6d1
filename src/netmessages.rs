/// Net-message identifiers carried inside packet frames. Only the types the
/// decoder reacts to (plus the common ones it deliberately skips) are listed;
/// everything else is reported as unknown and ignored.
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NetmessageType {
    net_Tick,
    net_SetConVar,
    net_SignonState,
    net_SpawnGroup_Load,
    svc_ServerInfo,
    svc_FlattenedSerializer,
    svc_ClassInfo,
    svc_CreateStringTable,
    svc_UpdateStringTable,
    svc_VoiceInit,
    svc_VoiceData,
    svc_ClearAllStringTables,
    svc_PacketEntities,
    svc_UserCmds,
    GE_Source1LegacyGameEventList,
    GE_Source1LegacyGameEvent,
    GE_SosStartSoundEvent,
    GE_SosStopSoundEvent,
}

impl TryFrom<i32> for NetmessageType {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        match value {
            4 => Ok(Self::net_Tick),
            6 => Ok(Self::net_SetConVar),
            7 => Ok(Self::net_SignonState),
            8 => Ok(Self::net_SpawnGroup_Load),
            40 => Ok(Self::svc_ServerInfo),
            41 => Ok(Self::svc_FlattenedSerializer),
            42 => Ok(Self::svc_ClassInfo),
            44 => Ok(Self::svc_CreateStringTable),
            45 => Ok(Self::svc_UpdateStringTable),
            46 => Ok(Self::svc_VoiceInit),
            47 => Ok(Self::svc_VoiceData),
            51 => Ok(Self::svc_ClearAllStringTables),
            55 => Ok(Self::svc_PacketEntities),
            76 => Ok(Self::svc_UserCmds),
            205 => Ok(Self::GE_Source1LegacyGameEventList),
            207 => Ok(Self::GE_Source1LegacyGameEvent),
            208 => Ok(Self::GE_SosStartSoundEvent),
            209 => Ok(Self::GE_SosStopSoundEvent),
            unknown => Err(unknown),
        }
    }
}
