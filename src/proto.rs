//! Wire message definitions, maintained as hand-derived [`prost::Message`]
//! structs. Field tags follow the Valve protobuf definitions; only the
//! messages and fields the decoder consumes are declared, unknown fields are
//! skipped by prost during decode.

#[derive(Clone, PartialEq, prost::Message)]
pub struct CDemoFileHeader {
    #[prost(string, optional, tag = "1")]
    pub demo_file_stamp: Option<String>,
    #[prost(int32, optional, tag = "2")]
    pub network_protocol: Option<i32>,
    #[prost(string, optional, tag = "3")]
    pub server_name: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub client_name: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub map_name: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub game_directory: Option<String>,
    #[prost(int32, optional, tag = "7")]
    pub fullpackets_version: Option<i32>,
    #[prost(int32, optional, tag = "13")]
    pub build_num: Option<i32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CDemoFileInfo {
    #[prost(float, optional, tag = "1")]
    pub playback_time: Option<f32>,
    #[prost(int32, optional, tag = "2")]
    pub playback_ticks: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub playback_frames: Option<i32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CDemoClassInfo {
    #[prost(message, repeated, tag = "1")]
    pub classes: Vec<cdemo_class_info::ClassT>,
}

pub mod cdemo_class_info {
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ClassT {
        #[prost(int32, optional, tag = "1")]
        pub class_id: Option<i32>,
        #[prost(string, optional, tag = "2")]
        pub network_name: Option<String>,
        #[prost(string, optional, tag = "3")]
        pub table_name: Option<String>,
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CDemoSendTables {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub data: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CDemoStringTables {
    #[prost(message, repeated, tag = "1")]
    pub tables: Vec<cdemo_string_tables::TableT>,
}

pub mod cdemo_string_tables {
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct ItemsT {
        #[prost(string, optional, tag = "1")]
        pub str: Option<String>,
        #[prost(bytes = "vec", optional, tag = "2")]
        pub data: Option<Vec<u8>>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct TableT {
        #[prost(string, optional, tag = "1")]
        pub table_name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub items: Vec<ItemsT>,
        #[prost(message, repeated, tag = "3")]
        pub items_clientside: Vec<ItemsT>,
        #[prost(int32, optional, tag = "4")]
        pub table_flags: Option<i32>,
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CDemoPacket {
    #[prost(bytes = "vec", optional, tag = "3")]
    pub data: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CDemoFullPacket {
    #[prost(message, optional, tag = "1")]
    pub string_table: Option<CDemoStringTables>,
    #[prost(message, optional, tag = "2")]
    pub packet: Option<CDemoPacket>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CnetMsgTick {
    #[prost(uint32, optional, tag = "1")]
    pub tick: Option<u32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CsvcMsgServerInfo {
    #[prost(int32, optional, tag = "1")]
    pub protocol: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub server_count: Option<i32>,
    #[prost(int32, optional, tag = "10")]
    pub max_classes: Option<i32>,
    #[prost(int32, optional, tag = "11")]
    pub max_clients: Option<i32>,
    #[prost(float, optional, tag = "13")]
    pub tick_interval: Option<f32>,
    #[prost(string, optional, tag = "15")]
    pub map_name: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CsvcMsgCreateStringTable {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(int32, optional, tag = "2")]
    pub max_entries: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub num_entries: Option<i32>,
    #[prost(bool, optional, tag = "4")]
    pub user_data_fixed_size: Option<bool>,
    #[prost(int32, optional, tag = "5")]
    pub user_data_size: Option<i32>,
    #[prost(int32, optional, tag = "6")]
    pub user_data_size_bits: Option<i32>,
    #[prost(int32, optional, tag = "7")]
    pub flags: Option<i32>,
    #[prost(bytes = "vec", optional, tag = "8")]
    pub string_data: Option<Vec<u8>>,
    #[prost(int32, optional, tag = "9")]
    pub uncompressed_size: Option<i32>,
    #[prost(bool, optional, tag = "10")]
    pub data_compressed: Option<bool>,
    #[prost(bool, optional, tag = "11")]
    pub using_varint_bitcounts: Option<bool>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CsvcMsgUpdateStringTable {
    #[prost(int32, optional, tag = "1")]
    pub table_id: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub num_changed_entries: Option<i32>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub string_data: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CsvcMsgPacketEntities {
    #[prost(int32, optional, tag = "1")]
    pub max_entries: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub updated_entries: Option<i32>,
    #[prost(bool, optional, tag = "3")]
    pub is_delta: Option<bool>,
    #[prost(bool, optional, tag = "4")]
    pub update_baseline: Option<bool>,
    #[prost(int32, optional, tag = "5")]
    pub baseline: Option<i32>,
    #[prost(int32, optional, tag = "6")]
    pub delta_from: Option<i32>,
    #[prost(bytes = "vec", optional, tag = "7")]
    pub entity_data: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "14")]
    pub has_pvs_vis_bits: Option<u32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CsvcMsgFlattenedSerializer {
    #[prost(message, repeated, tag = "1")]
    pub serializers: Vec<ProtoFlattenedSerializerT>,
    #[prost(string, repeated, tag = "2")]
    pub symbols: Vec<String>,
    #[prost(message, repeated, tag = "3")]
    pub fields: Vec<ProtoFlattenedSerializerFieldT>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ProtoFlattenedSerializerT {
    #[prost(int32, optional, tag = "1")]
    pub serializer_name_sym: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub serializer_version: Option<i32>,
    #[prost(int32, repeated, packed = "false", tag = "3")]
    pub fields_index: Vec<i32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ProtoFlattenedSerializerFieldT {
    #[prost(int32, optional, tag = "1")]
    pub var_type_sym: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub var_name_sym: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub bit_count: Option<i32>,
    #[prost(float, optional, tag = "4")]
    pub low_value: Option<f32>,
    #[prost(float, optional, tag = "5")]
    pub high_value: Option<f32>,
    #[prost(int32, optional, tag = "6")]
    pub encode_flags: Option<i32>,
    #[prost(int32, optional, tag = "7")]
    pub field_serializer_name_sym: Option<i32>,
    #[prost(int32, optional, tag = "8")]
    pub field_serializer_version: Option<i32>,
    #[prost(int32, optional, tag = "9")]
    pub send_node_sym: Option<i32>,
    #[prost(int32, optional, tag = "10")]
    pub var_encoder_sym: Option<i32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CMsgSource1LegacyGameEventList {
    #[prost(message, repeated, tag = "1")]
    pub descriptors: Vec<source1_legacy_game_event_list::DescriptorT>,
}

pub mod source1_legacy_game_event_list {
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct KeyT {
        #[prost(int32, optional, tag = "1")]
        pub r#type: Option<i32>,
        #[prost(string, optional, tag = "2")]
        pub name: Option<String>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct DescriptorT {
        #[prost(int32, optional, tag = "1")]
        pub eventid: Option<i32>,
        #[prost(string, optional, tag = "2")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "3")]
        pub keys: Vec<KeyT>,
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CMsgSource1LegacyGameEvent {
    #[prost(string, optional, tag = "1")]
    pub event_name: Option<String>,
    #[prost(int32, optional, tag = "2")]
    pub eventid: Option<i32>,
    #[prost(message, repeated, tag = "3")]
    pub keys: Vec<source1_legacy_game_event::KeyT>,
}

pub mod source1_legacy_game_event {
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct KeyT {
        #[prost(int32, optional, tag = "1")]
        pub r#type: Option<i32>,
        #[prost(string, optional, tag = "2")]
        pub val_string: Option<String>,
        #[prost(float, optional, tag = "3")]
        pub val_float: Option<f32>,
        #[prost(int32, optional, tag = "4")]
        pub val_long: Option<i32>,
        #[prost(int32, optional, tag = "5")]
        pub val_short: Option<i32>,
        #[prost(int32, optional, tag = "6")]
        pub val_byte: Option<i32>,
        #[prost(bool, optional, tag = "7")]
        pub val_bool: Option<bool>,
        #[prost(uint64, optional, tag = "8")]
        pub val_uint64: Option<u64>,
    }
}

/// CS2 user-info string-table value.
#[derive(Clone, PartialEq, prost::Message)]
pub struct CMsgPlayerInfo {
    #[prost(string, optional, tag = "1")]
    pub name: Option<String>,
    #[prost(uint64, optional, tag = "2")]
    pub xuid: Option<u64>,
    #[prost(int32, optional, tag = "3")]
    pub userid: Option<i32>,
    #[prost(uint64, optional, tag = "4")]
    pub steamid: Option<u64>,
    #[prost(bool, optional, tag = "5")]
    pub fakeplayer: Option<bool>,
    #[prost(bool, optional, tag = "6")]
    pub ishltv: Option<bool>,
}
