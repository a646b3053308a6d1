//! Flattened-serializer ingestion: builds the per-class field trees that
//! packet-entity deltas are decoded against.

use std::collections::HashMap;
use std::sync::Arc;

use crate::proto;

use super::decoder::{self, Decoder};
use super::fieldpath::FieldPath;
use super::quantizedfloat::QfMapper;

#[derive(Debug)]
pub enum SendTableError {
    MissingSymbol(i32),
    InvalidFieldPath,
    InvalidTypeString(String),
}

/// A versioned flat field list. Distinct versions of the same name coexist;
/// classes and sub-serializer references bind the newest one.
#[derive(Debug, Clone, PartialEq)]
pub struct Serializer {
    pub name: String,
    pub version: i32,
    pub fields: Vec<Field>,
}

/// A field slot in a serializer. The model is fully determined by the parsed
/// field type and whether a named sub-serializer resolves.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Simple(ValueField),
    FixedArray(ArrayField),
    VariableArray(VectorField),
    FixedTable(TableField),
    VariableTable(TableField),
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueField {
    pub decoder: Decoder,
    pub name: String,
    pub full_name: Arc<str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayField {
    pub field: Box<Field>,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    pub field: Box<Field>,
    pub decoder: Decoder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableField {
    pub decoder: Decoder,
    pub serializer: Serializer,
}

/// Parsed `var_type` string: `base[< generic >][*][\[count\]]`.
#[derive(Debug, Clone)]
pub struct FieldType {
    pub base_type: String,
    pub generic_type: Option<Box<FieldType>>,
    pub pointer: bool,
    pub count: Option<i32>,
}

static TYPE_RE: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
    regex::Regex::new(r"([^<\[\*]+)(<\s(.*)\s>)?(\*)?(\[(.*)\])?").expect("the pattern is valid")
});

/// Type names that require pointer indirection even without a trailing `*`.
const POINTER_TYPES: &[&str] = &[
    "CBodyComponentDCGBaseAnimating",
    "CBodyComponentBaseAnimating",
    "CBodyComponentBaseAnimatingOverlay",
    "CBodyComponentBaseModelEntity",
    "CBodyComponent",
    "CBodyComponentSkeletonInstance",
    "CBodyComponentPoint",
    "CLightComponent",
    "CRenderComponent",
    "CPhysicsComponent",
];

/// Symbolic array sizes used inside `[...]` counts.
static ITEM_COUNTS: phf::Map<&'static str, i32> = phf::phf_map! {
    "MAX_ITEM_STOCKS" => 8,
    "MAX_ABILITY_DRAFT_ABILITIES" => 48,
};

pub fn find_field_type(
    name: &str,
    field_type_map: &mut HashMap<String, FieldType>,
) -> Result<FieldType, SendTableError> {
    let captures = TYPE_RE
        .captures(name)
        .ok_or_else(|| SendTableError::InvalidTypeString(name.to_owned()))?;

    let base_type = captures
        .get(1)
        .map(|s| s.as_str().to_owned())
        .unwrap_or_default();

    let pointer = match captures.get(4) {
        Some(s) if s.as_str() == "*" => true,
        _ => POINTER_TYPES.contains(&name),
    };

    let mut ft = FieldType {
        base_type,
        pointer,
        count: None,
        generic_type: None,
    };

    if let Some(generic) = captures.get(3) {
        ft.generic_type = Some(Box::new(find_field_type(generic.as_str(), field_type_map)?));
    }
    if let Some(count) = captures.get(6) {
        let raw = count.as_str();
        ft.count = Some(
            raw.parse::<i32>()
                .ok()
                .or_else(|| ITEM_COUNTS.get(raw).copied())
                .unwrap_or(0),
        );
    }

    Ok(ft)
}

/// Intermediate field state while a `FlattenedSerializer` message is being
/// materialized.
#[derive(Debug, Clone)]
pub struct ConstructorField {
    pub var_name: String,
    pub var_type: String,
    pub send_node: String,
    pub serializer_name: Option<String>,
    pub encoder: String,
    pub encode_flags: i32,
    pub bitcount: i32,
    pub low_value: f32,
    pub high_value: f32,
    pub field_type: FieldType,
    pub decoder: Decoder,
    pub field_enum_type: Option<Field>,
}

/// A build-version field patch: data, not code. Applied left-to-right in
/// declaration order after the regular decoder selection.
struct FieldPatch {
    applies: fn(&ConstructorField) -> bool,
    patch: fn(&mut ConstructorField),
}

static FIELD_PATCHES: &[FieldPatch] = &[
    FieldPatch {
        applies: |f| {
            matches!(
                f.var_name.as_str(),
                "m_PredFloatVariables" | "m_OwnerOnlyPredNetFloatVariables"
            )
        },
        patch: |f| f.decoder = Decoder::NoscaleDecoder,
    },
    FieldPatch {
        applies: |f| {
            matches!(
                f.var_name.as_str(),
                "m_PredVectorVariables" | "m_OwnerOnlyPredNetVectorVariables"
            )
        },
        patch: |f| f.decoder = Decoder::VectorNoscaleDecoder,
    },
    FieldPatch {
        applies: |f| f.var_name == "m_pGameModeRules",
        patch: |f| f.decoder = Decoder::GameModeRulesDecoder,
    },
    FieldPatch {
        applies: |f| f.var_name == "m_iClip1",
        patch: |f| f.decoder = Decoder::AmmoDecoder,
    },
    FieldPatch {
        applies: |f| f.encoder == "qangle_precise",
        patch: |f| f.decoder = Decoder::QanglePresDecoder,
    },
];

#[derive(Debug, PartialEq)]
enum FieldModel {
    Simple,
    FixedArray,
    FixedTable,
    VariableArray,
    VariableTable,
}

/// Registry of built serializers, keyed by `(name, version)`.
#[derive(Debug, Default)]
pub struct SerializerRegistry {
    by_key: HashMap<(String, i32), Serializer>,
    latest_version: HashMap<String, i32>,
}

impl SerializerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self, name: &str) -> Option<&Serializer> {
        let version = self.latest_version.get(name)?;
        self.by_key.get(&(name.to_owned(), *version))
    }

    pub fn take_latest(&mut self, name: &str) -> Option<Serializer> {
        let version = *self.latest_version.get(name)?;
        self.by_key.get(&(name.to_owned(), version)).cloned()
    }

    fn insert(&mut self, ser: Serializer) {
        let latest = self
            .latest_version
            .entry(ser.name.clone())
            .or_insert(ser.version);
        if ser.version >= *latest {
            *latest = ser.version;
        }
        self.by_key.insert((ser.name.clone(), ser.version), ser);
    }

    /// Ingests one `FlattenedSerializer` message: materializes every
    /// referenced field once and appends them to each serializer in message
    /// order, which defines the field-path numbering.
    pub fn build_from_msg(
        &mut self,
        msg: &proto::CsvcMsgFlattenedSerializer,
        qf_mapper: &mut QfMapper,
    ) -> Result<(), SendTableError> {
        let mut fields: Vec<Option<ConstructorField>> = vec![None; msg.fields.len()];
        let mut field_type_map: HashMap<String, FieldType> = HashMap::new();

        for serializer in msg.serializers.iter() {
            let name = symbol(msg, serializer.serializer_name_sym)?.to_owned();
            let version = serializer.serializer_version.unwrap_or(0);

            let mut ser = Serializer {
                name: name.clone(),
                version,
                fields: Vec::with_capacity(serializer.fields_index.len()),
            };

            for field_index in serializer.fields_index.iter() {
                let idx = *field_index as usize;
                let slot = fields
                    .get_mut(idx)
                    .ok_or(SendTableError::MissingSymbol(*field_index))?;

                if slot.is_none() {
                    let msg_field = &msg.fields[idx];
                    *slot = Some(constructor_field(
                        msg_field,
                        msg,
                        &mut field_type_map,
                        qf_mapper,
                    )?);
                }

                let cf = slot.as_mut().expect("slot was just filled");
                if cf.field_enum_type.is_none() {
                    cf.field_enum_type = Some(create_field(cf, self)?);
                }
                ser.fields.push(
                    cf.field_enum_type
                        .clone()
                        .expect("field enum was just created"),
                );
            }

            assign_full_names(&mut ser.fields, &ser.name.clone());
            self.insert(ser);
        }

        Ok(())
    }
}

fn symbol(msg: &proto::CsvcMsgFlattenedSerializer, sym: Option<i32>) -> Result<&str, SendTableError> {
    let idx = sym.unwrap_or(0);
    msg.symbols
        .get(idx as usize)
        .map(|s| s.as_str())
        .ok_or(SendTableError::MissingSymbol(idx))
}

fn constructor_field(
    field: &proto::ProtoFlattenedSerializerFieldT,
    msg: &proto::CsvcMsgFlattenedSerializer,
    field_type_map: &mut HashMap<String, FieldType>,
    qf_mapper: &mut QfMapper,
) -> Result<ConstructorField, SendTableError> {
    let var_type = symbol(msg, field.var_type_sym)?.to_owned();
    let var_name = symbol(msg, field.var_name_sym)?.to_owned();
    let send_node = symbol(msg, field.send_node_sym)?.to_owned();
    let serializer_name = match field.field_serializer_name_sym {
        Some(idx) => Some(symbol(msg, Some(idx))?.to_owned()),
        None => None,
    };
    let encoder = match field.var_encoder_sym {
        Some(idx) => symbol(msg, Some(idx))?.to_owned(),
        None => String::new(),
    };

    let field_type = find_field_type(&var_type, field_type_map)?;

    let mut cf = ConstructorField {
        var_name,
        var_type,
        send_node,
        serializer_name,
        encoder,
        encode_flags: field.encode_flags.unwrap_or(0),
        bitcount: field.bit_count.unwrap_or(0),
        low_value: field.low_value.unwrap_or(0.0),
        high_value: field.high_value.unwrap_or(0.0),
        field_type,
        decoder: Decoder::BaseDecoder,
        field_enum_type: None,
    };

    cf.decoder = decoder::find_decoder(&cf, qf_mapper);
    for patch in FIELD_PATCHES {
        if (patch.applies)(&cf) {
            (patch.patch)(&mut cf);
        }
    }

    Ok(cf)
}

fn field_model(cf: &ConstructorField, serializer_resolves: bool) -> FieldModel {
    if serializer_resolves {
        if cf.field_type.pointer || POINTER_TYPES.contains(&cf.field_type.base_type.as_str()) {
            FieldModel::FixedTable
        } else {
            FieldModel::VariableTable
        }
    } else if cf.field_type.count.map(|c| c > 0).unwrap_or(false)
        && cf.field_type.base_type != "char"
    {
        FieldModel::FixedArray
    } else if matches!(
        cf.field_type.base_type.as_str(),
        "CUtlVector" | "CNetworkUtlVectorBase"
    ) {
        FieldModel::VariableArray
    } else {
        FieldModel::Simple
    }
}

fn create_field(
    cf: &ConstructorField,
    registry: &SerializerRegistry,
) -> Result<Field, SendTableError> {
    // A named sub-serializer that does not resolve leaves the field with its
    // plain model; this decides between the table models and the rest.
    let sub_serializer = cf
        .serializer_name
        .as_deref()
        .and_then(|name| registry.latest(name).cloned());

    let element = match &sub_serializer {
        Some(ser) => {
            if field_model(cf, true) == FieldModel::FixedTable {
                // Pointer-indirected tables are prefixed by a presence bit,
                // except the game-mode rules table which carries its own tag.
                let decoder = if ser.name == "CCSGameModeRules" {
                    Decoder::GameModeRulesDecoder
                } else {
                    Decoder::BooleanDecoder
                };
                Field::FixedTable(TableField {
                    decoder,
                    serializer: ser.clone(),
                })
            } else {
                Field::VariableTable(TableField {
                    decoder: Decoder::BooleanDecoder,
                    serializer: ser.clone(),
                })
            }
        }
        None => Field::Simple(ValueField {
            decoder: cf.decoder,
            name: cf.var_name.clone(),
            full_name: Arc::from(cf.var_name.as_str()),
        }),
    };

    match field_model(cf, sub_serializer.is_some()) {
        FieldModel::FixedArray => Ok(Field::FixedArray(ArrayField {
            field: Box::new(element),
            length: cf.field_type.count.unwrap_or(0) as usize,
        })),
        FieldModel::VariableArray => Ok(Field::VariableArray(VectorField {
            field: Box::new(element),
            decoder: Decoder::UnsignedDecoder,
        })),
        _ => Ok(element),
    }
}

/// Rewrites every leaf's `full_name` to the dotted path from the class root.
/// Each serializer owns its embedded sub-trees, so names are per class.
fn assign_full_names(fields: &mut [Field], prefix: &str) {
    for field in fields.iter_mut() {
        match field {
            Field::Simple(v) => {
                v.full_name = Arc::from(format!("{}.{}", prefix, v.name).as_str());
            }
            Field::FixedArray(a) => assign_full_names(std::slice::from_mut(&mut a.field), prefix),
            Field::VariableArray(v) => {
                assign_full_names(std::slice::from_mut(&mut v.field), prefix)
            }
            Field::FixedTable(t) | Field::VariableTable(t) => {
                let nested = format!("{}.{}", prefix, t.serializer.name);
                assign_full_names(&mut t.serializer.fields, &nested);
            }
            Field::None => {}
        }
    }
}

impl Field {
    pub fn get_inner(&self, idx: usize) -> Result<&Field, SendTableError> {
        match self {
            Field::FixedArray(inner) => Ok(&inner.field),
            Field::VariableArray(inner) => Ok(&inner.field),
            Field::FixedTable(inner) | Field::VariableTable(inner) => inner
                .serializer
                .fields
                .get(idx)
                .ok_or(SendTableError::InvalidFieldPath),
            Field::Simple(_) | Field::None => Err(SendTableError::InvalidFieldPath),
        }
    }

    /// The decoder to run when a field path terminates at this field.
    pub fn get_decoder(&self) -> Result<Decoder, SendTableError> {
        match self {
            Field::Simple(inner) => Ok(inner.decoder),
            Field::FixedTable(inner) => Ok(inner.decoder),
            // A path ending at a variable array updates its length.
            Field::VariableArray(_) => Ok(Decoder::UnsignedDecoder),
            Field::FixedArray(inner) => inner.field.get_decoder(),
            Field::VariableTable(_) | Field::None => Err(SendTableError::InvalidFieldPath),
        }
    }

    /// The property name reported for an update terminating at this field.
    pub fn prop_name(&self) -> Option<Arc<str>> {
        match self {
            Field::Simple(inner) => Some(Arc::clone(&inner.full_name)),
            Field::FixedArray(ArrayField { field: inner, .. })
            | Field::VariableArray(VectorField { field: inner, .. }) => inner.prop_name(),
            Field::FixedTable(inner) | Field::VariableTable(inner) => {
                Some(Arc::from(inner.serializer.name.as_str()))
            }
            Field::None => None,
        }
    }
}

impl Serializer {
    /// Resolves a decoded field path to the field it addresses.
    pub fn field_at(&self, path: &FieldPath) -> Result<&Field, SendTableError> {
        let mut field = self
            .fields
            .get(path.path[0] as usize)
            .ok_or(SendTableError::InvalidFieldPath)?;

        for depth in 1..=path.last {
            field = field.get_inner(path.path[depth] as usize)?;
        }

        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_msg() -> proto::CsvcMsgFlattenedSerializer {
        // Symbol table layout:
        // 0: CBodyComponentBaseModelEntity  1: m_cellX       2: uint16
        // 3: CWorld                         4: m_flAnimTime  5: float32
        // 6: m_BodyComponent  7: m_vecNames  8: CUtlVector< CUtlSymbolLarge >
        // 9: m_szName  10: char[128]  11: m_arrSlots  12: int32[MAX_ITEM_STOCKS]
        let symbols = vec![
            "CBodyComponentBaseModelEntity".to_string(),
            "m_cellX".to_string(),
            "uint16".to_string(),
            "CWorld".to_string(),
            "m_flAnimTime".to_string(),
            "float32".to_string(),
            "m_BodyComponent".to_string(),
            "m_vecNames".to_string(),
            "CUtlVector< CUtlSymbolLarge >".to_string(),
            "m_szName".to_string(),
            "char[128]".to_string(),
            "m_arrSlots".to_string(),
            "int32[MAX_ITEM_STOCKS]".to_string(),
        ];

        let fields = vec![
            // 0: CBodyComponentBaseModelEntity.m_cellX (uint16)
            proto::ProtoFlattenedSerializerFieldT {
                var_type_sym: Some(2),
                var_name_sym: Some(1),
                ..Default::default()
            },
            // 1: CWorld.m_flAnimTime (float32)
            proto::ProtoFlattenedSerializerFieldT {
                var_type_sym: Some(5),
                var_name_sym: Some(4),
                ..Default::default()
            },
            // 2: CWorld.m_BodyComponent (pointer table)
            proto::ProtoFlattenedSerializerFieldT {
                var_type_sym: Some(0),
                var_name_sym: Some(6),
                field_serializer_name_sym: Some(0),
                ..Default::default()
            },
            // 3: CWorld.m_vecNames (variable array of strings)
            proto::ProtoFlattenedSerializerFieldT {
                var_type_sym: Some(8),
                var_name_sym: Some(7),
                ..Default::default()
            },
            // 4: CWorld.m_szName (char[128] stays simple)
            proto::ProtoFlattenedSerializerFieldT {
                var_type_sym: Some(10),
                var_name_sym: Some(9),
                ..Default::default()
            },
            // 5: CWorld.m_arrSlots (fixed array via symbolic count)
            proto::ProtoFlattenedSerializerFieldT {
                var_type_sym: Some(12),
                var_name_sym: Some(11),
                ..Default::default()
            },
        ];

        let serializers = vec![
            proto::ProtoFlattenedSerializerT {
                serializer_name_sym: Some(0),
                serializer_version: Some(0),
                fields_index: vec![0],
            },
            proto::ProtoFlattenedSerializerT {
                serializer_name_sym: Some(3),
                serializer_version: Some(0),
                fields_index: vec![1, 2, 3, 4, 5],
            },
        ];

        proto::CsvcMsgFlattenedSerializer {
            serializers,
            symbols,
            fields,
        }
    }

    #[test]
    fn builds_field_models() {
        let mut registry = SerializerRegistry::new();
        let mut qf = QfMapper::default();
        registry.build_from_msg(&sample_msg(), &mut qf).unwrap();

        let world = registry.latest("CWorld").unwrap();
        assert_eq!(5, world.fields.len());

        match &world.fields[0] {
            Field::Simple(v) => {
                assert_eq!(Decoder::FloatSimulationTimeDecoder, v.decoder);
                assert_eq!("CWorld.m_flAnimTime", v.full_name.as_ref());
            }
            other => panic!("expected simple field, got {:?}", other),
        }

        match &world.fields[1] {
            Field::FixedTable(t) => {
                assert_eq!(Decoder::BooleanDecoder, t.decoder);
                assert_eq!("CBodyComponentBaseModelEntity", t.serializer.name);
                match &t.serializer.fields[0] {
                    Field::Simple(v) => assert_eq!(
                        "CWorld.CBodyComponentBaseModelEntity.m_cellX",
                        v.full_name.as_ref()
                    ),
                    other => panic!("expected simple field, got {:?}", other),
                }
            }
            other => panic!("expected fixed table, got {:?}", other),
        }

        assert!(matches!(&world.fields[2], Field::VariableArray(_)));

        match &world.fields[3] {
            Field::Simple(v) => assert_eq!(Decoder::StringDecoder, v.decoder),
            other => panic!("expected char array to stay simple, got {:?}", other),
        }

        match &world.fields[4] {
            Field::FixedArray(a) => assert_eq!(8, a.length),
            other => panic!("expected fixed array, got {:?}", other),
        }
    }

    #[test]
    fn field_path_resolution() {
        let mut registry = SerializerRegistry::new();
        let mut qf = QfMapper::default();
        registry.build_from_msg(&sample_msg(), &mut qf).unwrap();
        let world = registry.latest("CWorld").unwrap();

        // Path [1, 0] descends into the pointer table.
        let mut path = FieldPath::new();
        path.path[0] = 1;
        path.path[1] = 0;
        path.last = 1;

        let field = world.field_at(&path).unwrap();
        assert_eq!(Decoder::UnsignedDecoder, field.get_decoder().unwrap());
        assert_eq!(
            "CWorld.CBodyComponentBaseModelEntity.m_cellX",
            field.prop_name().unwrap().as_ref()
        );
    }

    #[test]
    fn type_string_grammar() {
        let mut map = HashMap::new();

        let ft = find_field_type("CUtlVector< CHandle< CBaseEntity > >", &mut map).unwrap();
        assert_eq!("CUtlVector", ft.base_type);
        assert_eq!(
            "CHandle",
            ft.generic_type.as_ref().unwrap().base_type.as_str()
        );
        assert!(!ft.pointer);

        let ft = find_field_type("CPhysicsComponent", &mut map).unwrap();
        assert!(ft.pointer);

        let ft = find_field_type("int32[MAX_ABILITY_DRAFT_ABILITIES]", &mut map).unwrap();
        assert_eq!(Some(48), ft.count);

        let ft = find_field_type("char[64]", &mut map).unwrap();
        assert_eq!(Some(64), ft.count);
        assert_eq!("char", ft.base_type);
    }

    #[test]
    fn versions_coexist_and_latest_wins() {
        let mut registry = SerializerRegistry::new();
        registry.insert(Serializer {
            name: "CThing".to_string(),
            version: 0,
            fields: Vec::new(),
        });
        registry.insert(Serializer {
            name: "CThing".to_string(),
            version: 2,
            fields: vec![Field::None],
        });

        assert_eq!(2, registry.latest("CThing").unwrap().version);
        assert!(registry.by_key.contains_key(&("CThing".to_string(), 0)));
    }
}
