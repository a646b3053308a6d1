/// Outer demo frame commands. On the wire the command shares its byte with
/// the snappy-compression flag in bit 6; [`DemoCommand::from_raw`] splits
/// the two.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum DemoCommand {
    Error,
    Stop,
    FileHeader,
    FileInfo,
    SyncTick,
    SendTables,
    ClassInfo,
    StringTables,
    Packet,
    SignonPacket,
    ConsoleCmd,
    CustomData,
    CustomDataCallbacks,
    UserCmd,
    FullPacket,
    SaveGame,
    SpawnGroups,
    AnimationData,
    AnimationHeader,
    Max,
}

impl DemoCommand {
    const COMPRESSED_FLAG: u32 = 64;

    /// Splits a raw frame command into the command and its compression
    /// flag.
    pub fn from_raw(raw: u32) -> Result<(Self, bool), i32> {
        let compressed = raw & Self::COMPRESSED_FLAG != 0;
        let command = Self::try_from((raw & !Self::COMPRESSED_FLAG) as i32)?;
        Ok((command, compressed))
    }
}

impl TryFrom<i32> for DemoCommand {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        match value {
            -1 => Ok(Self::Error),
            0 => Ok(Self::Stop),
            1 => Ok(Self::FileHeader),
            2 => Ok(Self::FileInfo),
            3 => Ok(Self::SyncTick),
            4 => Ok(Self::SendTables),
            5 => Ok(Self::ClassInfo),
            6 => Ok(Self::StringTables),
            7 => Ok(Self::Packet),
            8 => Ok(Self::SignonPacket),
            9 => Ok(Self::ConsoleCmd),
            10 => Ok(Self::CustomData),
            11 => Ok(Self::CustomDataCallbacks),
            12 => Ok(Self::UserCmd),
            13 => Ok(Self::FullPacket),
            14 => Ok(Self::SaveGame),
            15 => Ok(Self::SpawnGroups),
            16 => Ok(Self::AnimationData),
            17 => Ok(Self::AnimationHeader),
            18 => Ok(Self::Max),
            unknown => Err(unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_commands_split_the_compression_flag() {
        assert_eq!(Ok((DemoCommand::Packet, false)), DemoCommand::from_raw(7));
        assert_eq!(
            Ok((DemoCommand::Packet, true)),
            DemoCommand::from_raw(7 | 64)
        );
        assert_eq!(
            Ok((DemoCommand::FullPacket, true)),
            DemoCommand::from_raw(13 | 64)
        );
        assert_eq!(Err(33), DemoCommand::from_raw(33));
    }
}
