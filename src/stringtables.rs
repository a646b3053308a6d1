//! String-table engine: append-and-update tables with reference-compressed
//! keys, carried either bit-packed (Source 1) or inside protobuf messages
//! (Source 2).

use std::collections::HashMap;

use crate::bitreader::{BitReadError, BitReader};
use crate::equipment::{EquipmentType, GRENADE_MODEL_SUBSTRINGS};
use crate::proto;

pub const TABLE_USER_INFO: &str = "userinfo";
pub const TABLE_INSTANCE_BASELINE: &str = "instancebaseline";
pub const TABLE_MODEL_PRECACHE: &str = "modelprecache";

/// Keys referencing earlier entries may look back at most this far.
const KEY_HISTORY_SIZE: usize = 32;

#[derive(Debug)]
pub enum StringTableError {
    BitRead(BitReadError),
    Snappy(snap::Error),
    DecodePlayerInfo(prost::DecodeError),
}

impl From<BitReadError> for StringTableError {
    fn from(value: BitReadError) -> Self {
        Self::BitRead(value)
    }
}
impl From<snap::Error> for StringTableError {
    fn from(value: snap::Error) -> Self {
        Self::Snappy(value)
    }
}

/// The raw user-info record. On Source 1 this is the legacy fixed-layout
/// record, on Source 2 it is distilled from the protobuf value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPlayerInfo {
    pub version: u64,
    pub xuid: u64,
    pub name: String,
    pub user_id: i32,
    pub guid: String,
    pub friends_id: i32,
    pub friends_name: String,
    pub is_fake_player: bool,
    pub is_hltv: bool,
    pub custom_files: [u32; 4],
    pub files_downloaded: u8,
}

#[derive(Debug, PartialEq)]
pub struct StringTableItem {
    pub index: i32,
    pub key: String,
    pub value: Vec<u8>,
}

/// Side effects of a table create/update, applied by the frame pipeline.
#[derive(Debug)]
pub enum TableUpdate {
    Baseline { class_id: i32, data: Vec<u8> },
    UserInfo { slot: i32, info: RawPlayerInfo },
    TableCreated { name: String },
    ParseFailure { table: String },
}

#[derive(Debug, Clone)]
struct TableMeta {
    name: String,
    flags: i32,
    user_data_fixed: bool,
    user_data_size: i32,
    variant_bitcounts: bool,
}

#[derive(Debug, Default)]
pub struct StringTableEngine {
    tables: Vec<TableMeta>,
    model_precache: Vec<String>,
    grenade_model_indices: HashMap<usize, EquipmentType>,
}

fn tracked(name: &str) -> bool {
    matches!(
        name,
        TABLE_USER_INFO | TABLE_INSTANCE_BASELINE | TABLE_MODEL_PRECACHE
    )
}

impl StringTableEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The equipment type for a model-precache slot, if the slot holds a
    /// known grenade model.
    pub fn grenade_model(&self, slot: usize) -> Option<EquipmentType> {
        self.grenade_model_indices.get(&slot).copied()
    }

    pub fn on_create(
        &mut self,
        msg: &proto::CsvcMsgCreateStringTable,
    ) -> Result<Vec<TableUpdate>, StringTableError> {
        let meta = TableMeta {
            name: msg.name.clone().unwrap_or_default(),
            flags: msg.flags.unwrap_or(0),
            user_data_fixed: msg.user_data_fixed_size.unwrap_or(false),
            user_data_size: msg.user_data_size.unwrap_or(0),
            variant_bitcounts: msg.using_varint_bitcounts.unwrap_or(false),
        };
        self.tables.push(meta.clone());

        let mut updates = Vec::new();
        if tracked(&meta.name) {
            self.process(&meta, msg, &mut updates)?;
        }
        updates.push(TableUpdate::TableCreated { name: meta.name });
        Ok(updates)
    }

    pub fn on_update(
        &mut self,
        msg: &proto::CsvcMsgUpdateStringTable,
    ) -> Result<Vec<TableUpdate>, StringTableError> {
        let table_id = msg.table_id.unwrap_or(0);
        let meta = match self.tables.get(table_id as usize) {
            Some(meta) => meta.clone(),
            // No create was seen for this table id.
            None => return Ok(Vec::new()),
        };

        if !tracked(&meta.name) {
            return Ok(Vec::new());
        }

        // Treat the update like a create carrying only the changed entries.
        let synthesized = proto::CsvcMsgCreateStringTable {
            name: Some(meta.name.clone()),
            num_entries: msg.num_changed_entries,
            string_data: msg.string_data.clone(),
            ..Default::default()
        };

        let mut updates = Vec::new();
        self.process(&meta, &synthesized, &mut updates)?;
        Ok(updates)
    }

    /// Authoritative full snapshots: only the baseline and user-info tables
    /// are taken from them, everything else is ignored.
    pub fn on_snapshot(
        &mut self,
        msg: &proto::CDemoStringTables,
    ) -> Result<Vec<TableUpdate>, StringTableError> {
        let mut updates = Vec::new();

        for table in msg.tables.iter() {
            match table.table_name.as_deref() {
                Some(TABLE_INSTANCE_BASELINE) => {
                    for item in table.items.iter() {
                        let key = item.str.as_deref().unwrap_or("");
                        if let Some(class_id) = parse_baseline_key(key) {
                            updates.push(TableUpdate::Baseline {
                                class_id,
                                data: item.data.clone().unwrap_or_default(),
                            });
                        }
                    }
                }
                Some(TABLE_USER_INFO) => {
                    for item in table.items.iter() {
                        let slot: i32 = match item.str.as_deref().unwrap_or("").parse() {
                            Ok(slot) => slot,
                            Err(_) => continue,
                        };
                        if let Some(info) =
                            parse_player_info_proto(item.data.as_deref().unwrap_or(&[]))?
                        {
                            updates.push(TableUpdate::UserInfo { slot, info });
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(updates)
    }

    fn process(
        &mut self,
        meta: &TableMeta,
        msg: &proto::CsvcMsgCreateStringTable,
        updates: &mut Vec<TableUpdate>,
    ) -> Result<(), StringTableError> {
        let num_entries = msg.num_entries.unwrap_or(0);

        if meta.name == TABLE_MODEL_PRECACHE {
            while self.model_precache.len() < num_entries as usize {
                self.model_precache.push(String::new());
            }
        }

        let mut data = msg.string_data.clone().unwrap_or_default();
        if msg.data_compressed.unwrap_or(false) {
            data = snap::raw::Decoder::new().decompress_vec(&data)?;
        }

        let (items, failed) = parse_table(
            &data,
            num_entries,
            meta.user_data_fixed,
            meta.user_data_size,
            meta.flags,
            meta.variant_bitcounts,
        );
        if failed {
            log::warn!("failed to parse stringtable {:?} properly", meta.name);
            updates.push(TableUpdate::ParseFailure {
                table: meta.name.clone(),
            });
        }

        for item in items {
            match meta.name.as_str() {
                TABLE_INSTANCE_BASELINE => {
                    if let Some(class_id) = parse_baseline_key(&item.key) {
                        updates.push(TableUpdate::Baseline {
                            class_id,
                            data: item.value,
                        });
                    }
                }
                TABLE_USER_INFO => {
                    if let Some(info) = parse_player_info_proto(&item.value)? {
                        updates.push(TableUpdate::UserInfo {
                            slot: item.index,
                            info,
                        });
                    }
                }
                TABLE_MODEL_PRECACHE => {
                    let slot = item.index as usize;
                    while self.model_precache.len() <= slot {
                        self.model_precache.push(String::new());
                    }
                    self.model_precache[slot] = item.key;
                }
                _ => {}
            }
        }

        if meta.name == TABLE_MODEL_PRECACHE {
            self.process_model_precache();
        }

        Ok(())
    }

    fn process_model_precache(&mut self) {
        for (slot, name) in self.model_precache.iter().enumerate() {
            for (substring, eq) in GRENADE_MODEL_SUBSTRINGS.entries() {
                if name.contains(substring) {
                    self.grenade_model_indices.insert(slot, *eq);
                }
            }
        }
    }

    /// Parses the legacy bit-packed table block (Source 1). The block is a
    /// known-lossy chunk: an unexpected end inside it is demoted to a
    /// parse-failure update instead of an error.
    pub fn parse_legacy_tables(
        &mut self,
        reader: &mut BitReader,
    ) -> Result<Vec<TableUpdate>, StringTableError> {
        let byte_len = reader.read_signed(32)?;
        reader.begin_chunk((byte_len as usize) << 3)?;

        let mut updates = Vec::new();
        let result = self.parse_legacy_chunk(reader, &mut updates);

        if let Err(err) = result {
            log::warn!("legacy string table chunk ended early: {:?}", err);
            updates.push(TableUpdate::ParseFailure {
                table: String::new(),
            });
        }

        self.process_model_precache();
        reader.end_chunk()?;

        Ok(updates)
    }

    fn parse_legacy_chunk(
        &mut self,
        reader: &mut BitReader,
        updates: &mut Vec<TableUpdate>,
    ) -> Result<(), StringTableError> {
        let tables = reader.read_nbits(8)?;
        for _ in 0..tables {
            let table_name = reader.read_string()?;
            self.parse_legacy_table(reader, &table_name, updates)?;
        }
        Ok(())
    }

    fn parse_legacy_table(
        &mut self,
        reader: &mut BitReader,
        name: &str,
        updates: &mut Vec<TableUpdate>,
    ) -> Result<(), StringTableError> {
        let n_strings = reader.read_signed(16)?;
        for _ in 0..n_strings {
            let string_name = reader.read_string()?;

            if reader.read_boolean()? {
                let user_data_size = reader.read_signed(16)?;
                let data = reader.read_n_bytes(user_data_size as usize)?;

                match name {
                    TABLE_USER_INFO => {
                        let mut record_reader = BitReader::new(&data);
                        let info = parse_legacy_player_info(&mut record_reader)?;
                        if let Ok(slot) = string_name.parse::<i32>() {
                            updates.push(TableUpdate::UserInfo { slot, info });
                        }
                    }
                    TABLE_INSTANCE_BASELINE => {
                        if let Ok(class_id) = string_name.parse::<i32>() {
                            updates.push(TableUpdate::Baseline {
                                class_id,
                                data,
                            });
                        }
                    }
                    TABLE_MODEL_PRECACHE => {
                        self.model_precache.push(string_name);
                    }
                    _ => {}
                }
            }
        }

        // Client-side entries, skipped.
        if reader.read_boolean()? {
            let n_clientside = reader.read_signed(16)?;
            for _ in 0..n_clientside {
                reader.read_string()?;
                if reader.read_boolean()? {
                    let skip = reader.read_signed(16)?;
                    reader.skip((skip as usize) * 8)?;
                }
            }
        }

        Ok(())
    }
}

/// Baseline keys of the form `<class>:<sub>` are skipped; plain integer keys
/// identify the class the value is a baseline for.
fn parse_baseline_key(key: &str) -> Option<i32> {
    if key.is_empty() || key.contains(':') {
        return None;
    }
    key.parse().ok()
}

/// Decodes a table data blob into a list of item updates. Returns the items
/// parsed so far plus a flag signalling that parsing ended early.
pub fn parse_table(
    buf: &[u8],
    num_updates: i32,
    user_data_fixed: bool,
    user_data_size: i32,
    flags: i32,
    variant_bitcounts: bool,
) -> (Vec<StringTableItem>, bool) {
    let mut items = Vec::new();
    if buf.is_empty() {
        return (items, false);
    }

    let mut reader = BitReader::new(buf);
    let result = parse_table_inner(
        &mut reader,
        num_updates,
        user_data_fixed,
        user_data_size,
        flags,
        variant_bitcounts,
        &mut items,
    );

    let failed = result.is_err();
    (items, failed)
}

fn parse_table_inner(
    reader: &mut BitReader,
    num_updates: i32,
    user_data_fixed: bool,
    user_data_size: i32,
    flags: i32,
    variant_bitcounts: bool,
    items: &mut Vec<StringTableItem>,
) -> Result<(), StringTableError> {
    // Start below zero so an increment addresses index 0.
    let mut index: i32 = -1;
    let mut keys: Vec<String> = Vec::with_capacity(KEY_HISTORY_SIZE + 1);

    for _ in 0..num_updates {
        let mut key = String::new();
        let mut value = Vec::new();

        if reader.read_boolean()? {
            index += 1;
        } else {
            index = reader.read_varint()? as i32 + 1;
        }

        let has_key = reader.read_boolean()?;
        if has_key {
            let use_history = reader.read_boolean()?;
            if use_history {
                let pos = reader.read_nbits(5)? as usize;
                let size = reader.read_nbits(5)? as usize;

                if pos >= keys.len() {
                    key += &reader.read_string()?;
                } else {
                    let hist = &keys[pos];
                    if size > hist.len() {
                        key = hist.clone() + &reader.read_string()?;
                    } else {
                        key = hist[..size].to_owned() + &reader.read_string()?;
                    }
                }
            } else {
                key = reader.read_string()?;
            }

            keys.push(key.clone());
            if keys.len() > KEY_HISTORY_SIZE {
                keys.remove(0);
            }
        }

        let has_value = reader.read_boolean()?;
        if has_value {
            let mut is_compressed = false;
            let bit_size;

            if user_data_fixed {
                bit_size = user_data_size as usize;
            } else {
                if flags & 0x1 != 0 {
                    is_compressed = reader.read_boolean()?;
                }
                bit_size = if variant_bitcounts {
                    (reader.read_u_bit_var()? as usize) * 8
                } else {
                    (reader.read_nbits(17)? as usize) * 8
                };
            }

            value = reader.read_bits(bit_size)?;
            if is_compressed {
                value = snap::raw::Decoder::new().decompress_vec(&value)?;
            }
        }

        items.push(StringTableItem { index, key, value });
    }

    Ok(())
}

/// Legacy fixed-layout user-info record (big-endian). The field widths are
/// part of the wire contract.
pub fn parse_legacy_player_info(
    reader: &mut BitReader,
) -> Result<RawPlayerInfo, StringTableError> {
    const NAME_LEN: usize = 128;
    const GUID_LEN: usize = 33;

    let be_u64 = |r: &mut BitReader| -> Result<u64, BitReadError> {
        let bytes: [u8; 8] = r
            .read_n_bytes(8)?
            .try_into()
            .expect("read_n_bytes(8) yields 8 bytes");
        Ok(u64::from_be_bytes(bytes))
    };
    let be_i32 = |r: &mut BitReader| -> Result<i32, BitReadError> {
        let bytes: [u8; 4] = r
            .read_n_bytes(4)?
            .try_into()
            .expect("read_n_bytes(4) yields 4 bytes");
        Ok(i32::from_be_bytes(bytes))
    };

    Ok(RawPlayerInfo {
        version: be_u64(reader)?,
        xuid: be_u64(reader)?,
        name: reader.read_c_string(NAME_LEN)?,
        user_id: be_i32(reader)?,
        guid: reader.read_c_string(GUID_LEN)?,
        friends_id: be_i32(reader)?,
        friends_name: reader.read_c_string(NAME_LEN)?,
        is_fake_player: reader.read_nbits(8)? != 0,
        is_hltv: reader.read_nbits(8)? != 0,
        custom_files: [
            reader.read_nbits(32)?,
            reader.read_nbits(32)?,
            reader.read_nbits(32)?,
            reader.read_nbits(32)?,
        ],
        files_downloaded: reader.read_nbits(8)? as u8,
    })
}

/// Protobuf-carried user-info value (Source 2). Empty slots yield `None`.
fn parse_player_info_proto(data: &[u8]) -> Result<Option<RawPlayerInfo>, StringTableError> {
    if data.is_empty() {
        return Ok(None);
    }

    let msg: proto::CMsgPlayerInfo =
        prost::Message::decode(data).map_err(StringTableError::DecodePlayerInfo)?;

    let xuid = msg.xuid.unwrap_or(0);
    let name = msg.name.clone().unwrap_or_default();
    // The create carries one message per possible slot; slots without a real
    // player, bot or GOTV attached stay empty.
    if xuid == 0 && name.is_empty() {
        return Ok(None);
    }

    Ok(Some(RawPlayerInfo {
        version: 0,
        xuid,
        name,
        user_id: msg.userid.unwrap_or(0),
        guid: String::new(),
        friends_id: 0,
        friends_name: String::new(),
        is_fake_player: msg.fakeplayer.unwrap_or(false),
        is_hltv: msg.ishltv.unwrap_or(false),
        custom_files: [0; 4],
        files_downloaded: 0,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitreader::tests::BitWriter;
    use pretty_assertions::assert_eq;

    struct EntrySpec<'a> {
        incr: bool,
        explicit_index: u32,
        key: Option<KeySpec<'a>>,
        value: Option<&'a [u8]>,
    }

    enum KeySpec<'a> {
        Plain(&'a str),
        History { pos: u32, size: u32, tail: &'a str },
    }

    fn write_entries(w: &mut BitWriter, entries: &[EntrySpec]) {
        for entry in entries {
            w.write_bit(entry.incr);
            if !entry.incr {
                w.write_varint(entry.explicit_index);
            }

            match &entry.key {
                Some(KeySpec::Plain(key)) => {
                    w.write_bit(true);
                    w.write_bit(false);
                    w.write_string(key);
                }
                Some(KeySpec::History { pos, size, tail }) => {
                    w.write_bit(true);
                    w.write_bit(true);
                    w.write_nbits(*pos, 5);
                    w.write_nbits(*size, 5);
                    w.write_string(tail);
                }
                None => w.write_bit(false),
            }

            match entry.value {
                Some(data) => {
                    w.write_bit(true);
                    // flags = 0, no varint bitcounts: 17 bit byte size.
                    w.write_nbits(data.len() as u32, 17);
                    w.write_bytes(data);
                }
                None => w.write_bit(false),
            }
        }
    }

    #[test]
    fn sequential_and_explicit_indices() {
        let mut w = BitWriter::new();
        write_entries(
            &mut w,
            &[
                EntrySpec {
                    incr: true,
                    explicit_index: 0,
                    key: Some(KeySpec::Plain("zero")),
                    value: None,
                },
                EntrySpec {
                    incr: false,
                    explicit_index: 6,
                    key: Some(KeySpec::Plain("seven")),
                    value: Some(b"xy"),
                },
            ],
        );
        let buf = w.finish();

        let (items, failed) = parse_table(&buf, 2, false, 0, 0, false);
        assert!(!failed);
        assert_eq!(
            vec![
                StringTableItem {
                    index: 0,
                    key: "zero".to_string(),
                    value: vec![],
                },
                StringTableItem {
                    index: 7,
                    key: "seven".to_string(),
                    value: b"xy".to_vec(),
                },
            ],
            items
        );
    }

    #[test]
    fn key_history_reconstruction() {
        let mut w = BitWriter::new();
        write_entries(
            &mut w,
            &[
                EntrySpec {
                    incr: true,
                    explicit_index: 0,
                    key: Some(KeySpec::Plain("weapon_ak47")),
                    value: None,
                },
                // Reuse the first 7 chars of history slot 0: "weapon_" + "awp".
                EntrySpec {
                    incr: true,
                    explicit_index: 0,
                    key: Some(KeySpec::History {
                        pos: 0,
                        size: 7,
                        tail: "awp",
                    }),
                    value: None,
                },
                // Size larger than the referenced key: whole key + tail.
                EntrySpec {
                    incr: true,
                    explicit_index: 0,
                    key: Some(KeySpec::History {
                        pos: 1,
                        size: 31,
                        tail: "_x",
                    }),
                    value: None,
                },
                // Position beyond the history: plain read.
                EntrySpec {
                    incr: true,
                    explicit_index: 0,
                    key: Some(KeySpec::History {
                        pos: 20,
                        size: 3,
                        tail: "fresh",
                    }),
                    value: None,
                },
            ],
        );
        let buf = w.finish();

        let (items, failed) = parse_table(&buf, 4, false, 0, 0, false);
        assert!(!failed);
        let keys: Vec<&str> = items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(vec!["weapon_ak47", "weapon_awp", "weapon_awp_x", "fresh"], keys);
    }

    #[test]
    fn fixed_size_user_data() {
        let mut w = BitWriter::new();
        w.write_bit(true); // incr
        w.write_bit(true); // has key
        w.write_bit(false); // no history
        w.write_string("k");
        w.write_bit(true); // has value
        w.write_nbits(0b101, 3); // exactly user_data_size bits
        let buf = w.finish();

        let (items, failed) = parse_table(&buf, 1, true, 3, 0, false);
        assert!(!failed);
        assert_eq!(vec![0b101], items[0].value);
    }

    #[test]
    fn compressed_value_roundtrip() {
        let payload = b"instance baseline bytes, long enough to bother compressing";
        let compressed = snap::raw::Encoder::new().compress_vec(payload).unwrap();

        let mut w = BitWriter::new();
        w.write_bit(true); // incr
        w.write_bit(true); // has key
        w.write_bit(false);
        w.write_string("55");
        w.write_bit(true); // has value
        w.write_bit(true); // compressed (flags & 0x1)
        w.write_nbits(compressed.len() as u32, 17);
        w.write_bytes(&compressed);
        let buf = w.finish();

        let (items, failed) = parse_table(&buf, 1, false, 0, 0x1, false);
        assert!(!failed);
        assert_eq!(payload.to_vec(), items[0].value);
    }

    #[test]
    fn truncated_stream_reports_failure_with_partial_items() {
        let mut w = BitWriter::new();
        write_entries(
            &mut w,
            &[EntrySpec {
                incr: true,
                explicit_index: 0,
                key: Some(KeySpec::Plain("ok")),
                value: None,
            }],
        );
        let buf = w.finish();

        // Claim 3 updates but provide one.
        let (items, failed) = parse_table(&buf, 3, false, 0, 0, false);
        assert!(failed);
        assert_eq!(1, items.len());
    }

    #[test]
    fn baseline_keys() {
        assert_eq!(Some(55), parse_baseline_key("55"));
        assert_eq!(None, parse_baseline_key("12:3"));
        assert_eq!(None, parse_baseline_key(""));
        assert_eq!(None, parse_baseline_key("abc"));
    }

    fn legacy_record_bytes(name: &str, xuid: u64, user_id: i32) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1u64.to_be_bytes()); // version
        raw.extend_from_slice(&xuid.to_be_bytes());
        let mut name_field = name.as_bytes().to_vec();
        name_field.resize(128, 0);
        raw.extend_from_slice(&name_field);
        raw.extend_from_slice(&user_id.to_be_bytes());
        let mut guid = b"STEAM_1:1:19869886".to_vec();
        guid.resize(33, 0);
        raw.extend_from_slice(&guid);
        raw.extend_from_slice(&7i32.to_be_bytes()); // friends id
        let mut friends_name = b"al".to_vec();
        friends_name.resize(128, 0);
        raw.extend_from_slice(&friends_name);
        raw.push(0); // is fake
        raw.push(1); // is hltv
        raw.extend_from_slice(&[0u8; 16]); // custom files
        raw.push(2); // files downloaded
        raw
    }

    #[test]
    fn legacy_player_info_record() {
        let raw = legacy_record_bytes("alice", 76561198000000001, 3);
        let mut reader = BitReader::new(&raw);
        let info = parse_legacy_player_info(&mut reader).unwrap();

        assert_eq!("alice", info.name);
        assert_eq!(76561198000000001, info.xuid);
        assert_eq!(3, info.user_id);
        assert_eq!("STEAM_1:1:19869886", info.guid);
        assert_eq!(7, info.friends_id);
        assert_eq!("al", info.friends_name);
        assert!(!info.is_fake_player);
        assert!(info.is_hltv);
        assert_eq!(2, info.files_downloaded);
        assert_eq!(0, reader.bits_remaining());
    }

    #[test]
    fn legacy_bit_packed_tables() {
        let record = legacy_record_bytes("bob", 76561198000000002, 2);

        let mut inner = BitWriter::new();
        inner.write_nbits(1, 8); // one table
        inner.write_string(TABLE_USER_INFO);
        inner.write_nbits(1, 16); // one string
        inner.write_string("2");
        inner.write_bit(true); // has user data
        inner.write_nbits(record.len() as u32, 16);
        inner.write_bytes(&record);
        inner.write_bit(false); // no client-side entries
        let chunk = inner.finish();

        let mut w = BitWriter::new();
        w.write_nbits(chunk.len() as u32, 32);
        w.write_bytes(&chunk);
        let buf = w.finish();

        let mut engine = StringTableEngine::new();
        let mut reader = BitReader::new(&buf);
        let updates = engine.parse_legacy_tables(&mut reader).unwrap();

        assert_eq!(1, updates.len());
        match &updates[0] {
            TableUpdate::UserInfo { slot, info } => {
                assert_eq!(2, *slot);
                assert_eq!("bob", info.name);
                assert_eq!(76561198000000002, info.xuid);
            }
            other => panic!("expected user info update, got {:?}", other),
        }
        assert_eq!(0, reader.bits_remaining());
    }

    #[test]
    fn model_precache_maps_grenade_models() {
        let mut engine = StringTableEngine::new();

        let mut w = BitWriter::new();
        write_entries(
            &mut w,
            &[
                EntrySpec {
                    incr: true,
                    explicit_index: 0,
                    key: Some(KeySpec::Plain("models/props/crate.vmdl")),
                    value: None,
                },
                EntrySpec {
                    incr: true,
                    explicit_index: 0,
                    key: Some(KeySpec::Plain("weapons/models/grenade/smokegrenade/smokegrenade.vmdl")),
                    value: None,
                },
            ],
        );

        let msg = proto::CsvcMsgCreateStringTable {
            name: Some(TABLE_MODEL_PRECACHE.to_string()),
            num_entries: Some(2),
            string_data: Some(w.finish()),
            ..Default::default()
        };
        engine.on_create(&msg).unwrap();

        assert_eq!(None, engine.grenade_model(0));
        assert_eq!(Some(EquipmentType::Smoke), engine.grenade_model(1));
    }
}
