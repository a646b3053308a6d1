//! Entity state engine: materializes networked entities from class
//! baselines and per-tick packet-entity deltas.

use std::collections::HashMap;
use std::sync::Arc;

use crate::bitreader::{BitReadError, BitReader};
use crate::proto;

use super::fieldpath::{parse_paths, Paths};
use super::quantizedfloat::QfMapper;
use super::sendtables::{SendTableError, Serializer, SerializerRegistry};
use super::variant::Variant;

#[derive(Debug)]
pub enum EntityError {
    BitRead(BitReadError),
    SendTable(SendTableError),
    UnknownClass(i32),
    MissingEntity(i32),
    DecodeSerializers(prost::DecodeError),
}

impl From<BitReadError> for EntityError {
    fn from(value: BitReadError) -> Self {
        Self::BitRead(value)
    }
}
impl From<SendTableError> for EntityError {
    fn from(value: SendTableError) -> Self {
        Self::SendTable(value)
    }
}
impl From<prost::DecodeError> for EntityError {
    fn from(value: prost::DecodeError) -> Self {
        Self::DecodeSerializers(value)
    }
}

/// Immutable after `DemoClassInfo` is processed.
#[derive(Debug)]
pub struct Class {
    pub class_id: i32,
    pub name: Arc<str>,
    pub serializer: Serializer,
    name_path_cache: HashMap<([i32; 7], usize), Arc<str>>,
}

#[derive(Debug)]
pub struct Entity {
    pub entity_id: i32,
    pub class_id: i32,
    pub serial: u32,
    /// Whether the entity is currently inside the PVS.
    pub is_live: bool,
    pub props: HashMap<Arc<str>, Variant>,
}

impl Entity {
    pub fn prop(&self, full_name: &str) -> Option<&Variant> {
        self.props.get(full_name)
    }

    /// Looks a property up by its trailing path segment, e.g. `m_iHealth`.
    pub fn prop_by_suffix(&self, suffix: &str) -> Option<&Variant> {
        self.props.iter().find_map(|(name, value)| {
            let tail = name.rsplit('.').next().unwrap_or(name);
            (tail == suffix).then_some(value)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityOp {
    Created,
    Entered,
    Updated,
    Left,
    Deleted,
}

#[derive(Debug, Clone)]
pub struct PropUpdate {
    pub name: Arc<str>,
    pub value: Variant,
}

/// One entity operation observed while reading a `PacketEntities` message,
/// emitted in read order.
#[derive(Debug)]
pub struct EntityChange {
    pub entity_id: i32,
    pub class_id: i32,
    pub class_name: Arc<str>,
    pub op: EntityOp,
    pub props: Vec<PropUpdate>,
    /// For `Deleted` ops the entity has already left the store; it is
    /// carried here so observers still see it.
    pub removed_entity: Option<Entity>,
}

#[derive(Debug, Default)]
pub struct EntityEngine {
    pub entities: HashMap<i32, Entity>,
    pub classes_by_id: HashMap<i32, Class>,
    pub serializers: SerializerRegistry,
    baselines: HashMap<i32, Vec<u8>>,
    paths: Paths,
    qf_mapper: QfMapper,
    class_id_bits: u32,
}

impl EntityEngine {
    pub fn new() -> Self {
        Self {
            // Sensible default until ServerInfo arrives.
            class_id_bits: 8,
            ..Default::default()
        }
    }

    pub fn on_server_info(&mut self, max_classes: i32) {
        if max_classes > 0 {
            self.class_id_bits = (max_classes as f64).log2().floor() as u32 + 1;
        }
    }

    /// Ingests the flattened-serializer block carried by a `SendTables`
    /// frame: a varint byte length followed by the protobuf payload.
    pub fn on_send_tables(&mut self, data: &[u8]) -> Result<(), EntityError> {
        let mut reader = BitReader::new(data);
        let n_bytes = reader.read_varint()?;
        let bytes = reader.read_n_bytes(n_bytes as usize)?;

        let msg: proto::CsvcMsgFlattenedSerializer = prost::Message::decode(bytes.as_slice())?;
        self.serializers
            .build_from_msg(&msg, &mut self.qf_mapper)?;
        Ok(())
    }

    pub fn on_class_info(&mut self, msg: &proto::CDemoClassInfo) {
        for class_t in msg.classes.iter() {
            let class_id = class_t.class_id.unwrap_or(0);
            let network_name = class_t.network_name.as_deref().unwrap_or("");

            if let Some(serializer) = self.serializers.take_latest(network_name) {
                self.classes_by_id.insert(
                    class_id,
                    Class {
                        class_id,
                        name: Arc::from(network_name),
                        serializer,
                        name_path_cache: HashMap::new(),
                    },
                );
            } else {
                log::debug!("no serializer for class {:?}", network_name);
            }
        }
    }

    pub fn set_instance_baseline(&mut self, class_id: i32, data: Vec<u8>) {
        self.baselines.insert(class_id, data);
    }

    /// Applies one `PacketEntities` message to the entity store, appending
    /// every resulting operation to `changes` in read order.
    pub fn parse_packet_entities(
        &mut self,
        msg: &proto::CsvcMsgPacketEntities,
        changes: &mut Vec<EntityChange>,
    ) -> Result<(), EntityError> {
        let entity_data = msg.entity_data.as_deref().unwrap_or(&[]);
        let mut reader = BitReader::new(entity_data);
        let has_pvs_vis_bits = msg.has_pvs_vis_bits.unwrap_or(0) > 0;

        let mut entity_id: i32 = -1;
        for _ in 0..msg.updated_entries.unwrap_or(0) {
            entity_id += 1 + reader.read_u_bit_var()? as i32;

            let flags = reader.read_nbits(2)?;
            if flags & 0b01 != 0 {
                // Leave PVS; the second bit deletes the entity entirely.
                self.leave_pvs(entity_id, flags & 0b10 != 0, changes)?;
            } else if flags & 0b10 != 0 {
                self.enter_pvs(entity_id, &mut reader, changes)?;
            } else {
                if has_pvs_vis_bits && reader.read_nbits(2)? & 0x01 == 1 {
                    continue;
                }
                self.update_entity(entity_id, &mut reader, EntityOp::Updated, changes)?;
            }
        }

        Ok(())
    }

    fn enter_pvs(
        &mut self,
        entity_id: i32,
        reader: &mut BitReader,
        changes: &mut Vec<EntityChange>,
    ) -> Result<(), EntityError> {
        let class_id = reader.read_nbits(self.class_id_bits)? as i32;
        let serial = reader.read_nbits(17)?;
        let _ = reader.read_varint()?;

        // At most one live entity per id: a recreate destroys the previous
        // instance first.
        self.entities.remove(&entity_id);
        self.entities.insert(
            entity_id,
            Entity {
                entity_id,
                class_id,
                serial,
                is_live: true,
                props: HashMap::new(),
            },
        );

        // The class baseline applies exactly once, before any overlay delta
        // of the same message. Baseline props are folded into the create op.
        let mut props = Vec::new();
        if let Some(baseline) = self.baselines.get(&class_id).cloned() {
            let mut baseline_reader = BitReader::new(&baseline);
            self.decode_props(entity_id, &mut baseline_reader, &mut props)?;
        }
        self.decode_props(entity_id, reader, &mut props)?;

        let class_name = self.class_name(class_id)?;
        changes.push(EntityChange {
            entity_id,
            class_id,
            class_name: Arc::clone(&class_name),
            op: EntityOp::Created,
            props,
            removed_entity: None,
        });
        changes.push(EntityChange {
            entity_id,
            class_id,
            class_name,
            op: EntityOp::Entered,
            props: Vec::new(),
            removed_entity: None,
        });

        Ok(())
    }

    fn update_entity(
        &mut self,
        entity_id: i32,
        reader: &mut BitReader,
        op: EntityOp,
        changes: &mut Vec<EntityChange>,
    ) -> Result<(), EntityError> {
        let mut props = Vec::new();
        self.decode_props(entity_id, reader, &mut props)?;

        let entity = self
            .entities
            .get(&entity_id)
            .ok_or(EntityError::MissingEntity(entity_id))?;
        let class_name = self.class_name(entity.class_id)?;

        changes.push(EntityChange {
            entity_id,
            class_id: entity.class_id,
            class_name,
            op,
            props,
            removed_entity: None,
        });

        Ok(())
    }

    fn leave_pvs(
        &mut self,
        entity_id: i32,
        delete: bool,
        changes: &mut Vec<EntityChange>,
    ) -> Result<(), EntityError> {
        if delete {
            if let Some(entity) = self.entities.remove(&entity_id) {
                let class_name = self.class_name(entity.class_id)?;
                changes.push(EntityChange {
                    entity_id,
                    class_id: entity.class_id,
                    class_name,
                    op: EntityOp::Deleted,
                    props: Vec::new(),
                    removed_entity: Some(entity),
                });
            }
        } else if let Some(entity) = self.entities.get_mut(&entity_id) {
            entity.is_live = false;
            let class_id = entity.class_id;
            let class_name = self.class_name(class_id)?;
            changes.push(EntityChange {
                entity_id,
                class_id,
                class_name,
                op: EntityOp::Left,
                props: Vec::new(),
                removed_entity: None,
            });
        }
        Ok(())
    }

    fn class_name(&self, class_id: i32) -> Result<Arc<str>, EntityError> {
        self.classes_by_id
            .get(&class_id)
            .map(|c| Arc::clone(&c.name))
            .ok_or(EntityError::UnknownClass(class_id))
    }

    /// Decodes one field-path update run against the entity's class,
    /// mutating the entity's property map and appending the updates.
    fn decode_props(
        &mut self,
        entity_id: i32,
        reader: &mut BitReader,
        out: &mut Vec<PropUpdate>,
    ) -> Result<(), EntityError> {
        let Self {
            entities,
            classes_by_id,
            paths,
            qf_mapper,
            ..
        } = self;

        let entity = entities
            .get_mut(&entity_id)
            .ok_or(EntityError::MissingEntity(entity_id))?;
        let class = classes_by_id
            .get_mut(&entity.class_id)
            .ok_or(EntityError::UnknownClass(entity.class_id))?;

        let n_updates = parse_paths(reader, paths)?;
        for path in paths.paths().take(n_updates) {
            let field = class.serializer.field_at(path)?;
            let decoder = field.get_decoder()?;
            let value = decoder.decode(reader, qf_mapper)?;

            let key = (path.path, path.last);
            if !class.name_path_cache.contains_key(&key) {
                let name = field
                    .prop_name()
                    .ok_or(SendTableError::InvalidFieldPath)?;
                class.name_path_cache.insert(key, name);
            }
            let name = Arc::clone(&class.name_path_cache[&key]);

            entity.props.insert(Arc::clone(&name), value.clone());
            out.push(PropUpdate { name, value });
        }

        Ok(())
    }
}
