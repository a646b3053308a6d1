use crate::bitreader::{BitReadError, BitReader};

use super::quantizedfloat::{QfMapper, QuantizedFloat};
use super::sendtables::ConstructorField;
use super::variant::Variant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoder {
    QuantizedFloatDecoder(u8),
    VectorNormalDecoder,
    VectorNoscaleDecoder,
    VectorFloatCoordDecoder,
    Unsigned64Decoder,
    NoscaleDecoder,
    BooleanDecoder,
    StringDecoder,
    SignedDecoder,
    UnsignedDecoder,
    ComponentDecoder,
    FloatCoordDecoder,
    FloatSimulationTimeDecoder,
    Fixed64Decoder,
    QanglePitchYawDecoder,
    Qangle3Decoder,
    QangleVarDecoder,
    QanglePresDecoder,
    BaseDecoder,
    AmmoDecoder,
    GameModeRulesDecoder,
}
use Decoder::*;

pub static BASETYPE_DECODERS: phf::Map<&'static str, Decoder> = phf::phf_map! {
    "bool" =>   BooleanDecoder,
    "char" =>    StringDecoder,
    "int16" =>   SignedDecoder,
    "int32" =>   SignedDecoder,
    "int64" =>   SignedDecoder,
    "int8" =>    SignedDecoder,
    "uint16" =>  UnsignedDecoder,
    "uint32" =>  UnsignedDecoder,
    "uint8" =>   UnsignedDecoder,
    "color32" => UnsignedDecoder,
    "GameTime_t" => NoscaleDecoder,
    "CBodyComponent" =>       ComponentDecoder,
    "CGameSceneNodeHandle" => UnsignedDecoder,
    "Color" =>                UnsignedDecoder,
    "CPhysicsComponent" =>    ComponentDecoder,
    "CRenderComponent" =>     ComponentDecoder,
    "CLightComponent" =>      ComponentDecoder,
    "CUtlString" =>           StringDecoder,
    "CUtlStringToken" =>      UnsignedDecoder,
    "CUtlSymbolLarge" =>      StringDecoder,
    "Quaternion" => NoscaleDecoder,
    "CTransform" => NoscaleDecoder,
    "HSequence" => Unsigned64Decoder,
    "AttachmentHandle_t" => Unsigned64Decoder,
    "CEntityIndex" => Unsigned64Decoder,
    "MoveCollide_t" => Unsigned64Decoder,
    "MoveType_t" => Unsigned64Decoder,
    "RenderMode_t" => Unsigned64Decoder,
    "RenderFx_t" => Unsigned64Decoder,
    "SolidType_t" => Unsigned64Decoder,
    "SurroundingBoundsType_t" => Unsigned64Decoder,
    "ModelConfigHandle_t" => Unsigned64Decoder,
    "NPC_STATE" => Unsigned64Decoder,
    "StanceType_t" => Unsigned64Decoder,
    "AbilityPathType_t" => Unsigned64Decoder,
    "WeaponState_t" => Unsigned64Decoder,
    "DoorState_t" => Unsigned64Decoder,
    "RagdollBlendDirection" => Unsigned64Decoder,
    "BeamType_t" => Unsigned64Decoder,
    "BeamClipStyle_t" => Unsigned64Decoder,
    "EntityDisolveType_t" => Unsigned64Decoder,
    "tablet_skin_state_t" => Unsigned64Decoder,
    "CSWeaponMode" => Unsigned64Decoder,
    "ESurvivalSpawnTileState" => Unsigned64Decoder,
    "SpawnStage_t" => Unsigned64Decoder,
    "ESurvivalGameRuleDecision_t" => Unsigned64Decoder,
    "RelativeDamagedDirection_t" => Unsigned64Decoder,
    "CSPlayerState" => Unsigned64Decoder,
    "MedalRank_t" => Unsigned64Decoder,
    "CSPlayerBlockingUseAction_t" => Unsigned64Decoder,
    "MoveMountingAmount_t" => Unsigned64Decoder,
    "QuestProgress::Reason" => Unsigned64Decoder,
};

pub fn find_decoder(field: &ConstructorField, qf_map: &mut QfMapper) -> Decoder {
    match BASETYPE_DECODERS.get(field.field_type.base_type.as_str()) {
        Some(d) => *d,
        None => match field.field_type.base_type.as_str() {
            "float32" => float_decoder(field, qf_map),
            "Vector" => find_vector_type(3, field, qf_map),
            "Vector2D" => find_vector_type(2, field, qf_map),
            "Vector4D" => find_vector_type(4, field, qf_map),
            "uint64" => find_uint_decoder(field),
            "QAngle" => find_qangle_decoder(field),
            "CHandle" => UnsignedDecoder,
            "CNetworkedQuantizedFloat" => float_decoder(field, qf_map),
            "CStrongHandle" => find_uint_decoder(field),
            "CEntityHandle" => find_uint_decoder(field),
            _ => UnsignedDecoder,
        },
    }
}

fn find_qangle_decoder(field: &ConstructorField) -> Decoder {
    match field.var_name.as_str() {
        "m_angEyeAngles" => QanglePitchYawDecoder,
        _ => {
            if field.bitcount != 0 {
                Qangle3Decoder
            } else {
                QangleVarDecoder
            }
        }
    }
}

fn find_uint_decoder(field: &ConstructorField) -> Decoder {
    match field.encoder.as_str() {
        "fixed64" => Fixed64Decoder,
        _ => Unsigned64Decoder,
    }
}

fn float_decoder(field: &ConstructorField, qf_map: &mut QfMapper) -> Decoder {
    match field.var_name.as_str() {
        "m_flSimulationTime" | "m_flAnimTime" => return FloatSimulationTimeDecoder,
        _ => {}
    };

    match field.encoder.as_str() {
        "coord" => FloatCoordDecoder,
        _ => {
            if field.bitcount <= 0 || field.bitcount >= 32 {
                NoscaleDecoder
            } else {
                let qf = QuantizedFloat::new(
                    field.bitcount as u32,
                    Some(field.encode_flags),
                    Some(field.low_value),
                    Some(field.high_value),
                );
                let idx = qf_map.idx;
                qf_map.map.insert(idx, qf);
                qf_map.idx += 1;
                QuantizedFloatDecoder(idx as u8)
            }
        }
    }
}

fn find_vector_type(dimensions: usize, field: &ConstructorField, qf_map: &mut QfMapper) -> Decoder {
    if dimensions == 3 && field.encoder.as_str() == "normal" {
        return VectorNormalDecoder;
    }

    let float_type = float_decoder(field, qf_map);
    match float_type {
        NoscaleDecoder => VectorNoscaleDecoder,
        FloatCoordDecoder => VectorFloatCoordDecoder,
        _ => VectorNormalDecoder,
    }
}

impl Decoder {
    pub fn decode(
        &self,
        reader: &mut BitReader,
        qf_map: &QfMapper,
    ) -> Result<Variant, BitReadError> {
        match self {
            NoscaleDecoder => Ok(Variant::F32(f32::from_bits(reader.read_nbits(32)?))),
            FloatSimulationTimeDecoder => Ok(Variant::F32(reader.decode_simul_time()?)),
            UnsignedDecoder => Ok(Variant::U32(reader.read_varint()?)),
            QuantizedFloatDecoder(qf_idx) => reader.decode_qfloat(*qf_idx, qf_map),
            Qangle3Decoder => Ok(Variant::VecXYZ(reader.decode_qangle_all_3()?)),
            SignedDecoder => Ok(Variant::I32(reader.read_varint32()?)),
            VectorNoscaleDecoder => Ok(Variant::VecXYZ(reader.decode_vector_noscale()?)),
            BooleanDecoder => Ok(Variant::Bool(reader.read_boolean()?)),
            BaseDecoder => Ok(Variant::U32(reader.read_varint()?)),
            ComponentDecoder => Ok(Variant::Bool(reader.read_boolean()?)),
            FloatCoordDecoder => Ok(Variant::F32(reader.read_bit_coord()?)),
            StringDecoder => Ok(Variant::String(reader.read_string()?)),
            QanglePitchYawDecoder => Ok(Variant::VecXYZ(reader.decode_qangle_pitch_yaw()?)),
            QangleVarDecoder => Ok(Variant::VecXYZ(reader.decode_qangle_variant()?)),
            QanglePresDecoder => Ok(Variant::VecXYZ(reader.decode_qangle_variant_pres()?)),
            VectorNormalDecoder => Ok(Variant::VecXYZ(reader.decode_normal_vec()?)),
            Unsigned64Decoder => Ok(Variant::U64(reader.read_varint_u64()?)),
            Fixed64Decoder => Ok(Variant::U64(reader.decode_uint64()?)),
            VectorFloatCoordDecoder => Ok(Variant::VecXYZ(reader.decode_vector_float_coord()?)),
            AmmoDecoder => Ok(Variant::U32(reader.decode_ammo()?)),
            GameModeRulesDecoder => Ok(Variant::U32(reader.read_nbits(7)?)),
        }
    }
}

impl<'b> BitReader<'b> {
    pub fn read_bit_coord(&mut self) -> Result<f32, BitReadError> {
        let has_int = self.read_boolean()?;
        let has_frac = self.read_boolean()?;
        if !has_int && !has_frac {
            return Ok(0.0);
        }

        let negative = self.read_boolean()?;
        let int_part = if has_int { self.read_nbits(14)? + 1 } else { 0 };
        let frac_part = if has_frac { self.read_nbits(5)? } else { 0 };

        let value = int_part as f32 + frac_part as f32 * (1.0 / 32.0);
        Ok(if negative { -value } else { value })
    }

    fn read_bit_coord_pres(&mut self) -> Result<f32, BitReadError> {
        Ok(self.read_nbits(20)? as f32 * 360.0 / (1 << 20) as f32 - 180.0)
    }

    fn decode_qfloat(&mut self, qf_idx: u8, qf_map: &QfMapper) -> Result<Variant, BitReadError> {
        match qf_map.map.get(&(qf_idx as u32)) {
            Some(qf) => Ok(Variant::F32(qf.decode(self)?)),
            // An index baked at build time always resolves; an absent entry
            // means the stream references a serializer we never built.
            None => Err(BitReadError::UnexpectedEnd),
        }
    }

    fn decode_ammo(&mut self) -> Result<u32, BitReadError> {
        let ammo = self.read_varint()?;
        if ammo > 0 {
            return Ok(ammo - 1);
        }
        Ok(ammo)
    }

    fn decode_uint64(&mut self) -> Result<u64, BitReadError> {
        let bytes = self.read_n_bytes(8)?;
        let arr: [u8; 8] = bytes
            .try_into()
            .expect("read_n_bytes(8) always yields 8 bytes");
        Ok(u64::from_le_bytes(arr))
    }

    fn decode_noscale(&mut self) -> Result<f32, BitReadError> {
        Ok(f32::from_bits(self.read_nbits(32)?))
    }

    fn decode_simul_time(&mut self) -> Result<f32, BitReadError> {
        Ok(self.read_varint()? as f32 * (1.0 / 30.0))
    }

    fn decode_vector_noscale(&mut self) -> Result<[f32; 3], BitReadError> {
        let mut v = [0.0; 3];
        for entry in v.iter_mut() {
            *entry = self.decode_noscale()?;
        }
        Ok(v)
    }

    fn decode_qangle_pitch_yaw(&mut self) -> Result<[f32; 3], BitReadError> {
        Ok([
            self.decode_noscale()?,
            self.decode_noscale()?,
            self.decode_noscale()?,
        ])
    }

    fn decode_qangle_all_3(&mut self) -> Result<[f32; 3], BitReadError> {
        Ok([
            self.decode_noscale()?,
            self.decode_noscale()?,
            self.decode_noscale()?,
        ])
    }

    fn decode_qangle_variant(&mut self) -> Result<[f32; 3], BitReadError> {
        let mut v = [0.0; 3];
        let has_x = self.read_boolean()?;
        let has_y = self.read_boolean()?;
        let has_z = self.read_boolean()?;
        if has_x {
            v[0] = self.read_bit_coord()?;
        }
        if has_y {
            v[1] = self.read_bit_coord()?;
        }
        if has_z {
            v[2] = self.read_bit_coord()?;
        }
        Ok(v)
    }

    fn decode_qangle_variant_pres(&mut self) -> Result<[f32; 3], BitReadError> {
        let mut v = [0.0; 3];
        let has_x = self.read_boolean()?;
        let has_y = self.read_boolean()?;
        let has_z = self.read_boolean()?;
        if has_x {
            v[0] = self.read_bit_coord_pres()?;
        }
        if has_y {
            v[1] = self.read_bit_coord_pres()?;
        }
        if has_z {
            v[2] = self.read_bit_coord_pres()?;
        }
        Ok(v)
    }

    fn decode_normal(&mut self) -> Result<f32, BitReadError> {
        let is_neg = self.read_boolean()?;
        let len = self.read_nbits(11)?;
        let result = (len as f64 * (1.0 / ((1 << 11) as f64 - 1.0))) as f32;
        match is_neg {
            true => Ok(-result),
            false => Ok(result),
        }
    }

    fn decode_normal_vec(&mut self) -> Result<[f32; 3], BitReadError> {
        let mut v = [0.0; 3];
        let has_x = self.read_boolean()?;
        let has_y = self.read_boolean()?;
        if has_x {
            v[0] = self.decode_normal()?;
        }
        if has_y {
            v[1] = self.decode_normal()?;
        }
        let neg_z = self.read_boolean()?;
        let prod_sum = v[0] * v[0] + v[1] * v[1];
        if prod_sum < 1.0 {
            v[2] = (1.0 - prod_sum).sqrt();
        } else {
            v[2] = 0.0;
        }
        if neg_z {
            v[2] = -v[2];
        }
        Ok(v)
    }

    fn decode_vector_float_coord(&mut self) -> Result<[f32; 3], BitReadError> {
        let mut v = [0.0; 3];
        for entry in v.iter_mut() {
            *entry = self.read_bit_coord()?;
        }
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_coord_zero() {
        // has_int = 0, has_frac = 0
        let mut reader = BitReader::new(&[0b00]);
        assert_eq!(0.0, reader.read_bit_coord().unwrap());
    }

    #[test]
    fn ammo_decoder_shifts_by_one() {
        let mut reader = BitReader::new(&[31]);
        assert_eq!(
            Variant::U32(30),
            AmmoDecoder.decode(&mut reader, &QfMapper::default()).unwrap()
        );

        let mut reader = BitReader::new(&[0]);
        assert_eq!(
            Variant::U32(0),
            AmmoDecoder.decode(&mut reader, &QfMapper::default()).unwrap()
        );
    }

    #[test]
    fn simulation_time_scales_by_tick() {
        let mut reader = BitReader::new(&[60]);
        assert_eq!(
            Variant::F32(2.0),
            FloatSimulationTimeDecoder
                .decode(&mut reader, &QfMapper::default())
                .unwrap()
        );
    }

    #[test]
    fn fixed64_is_little_endian() {
        let raw = 0xdead_beef_1234_5678u64.to_le_bytes();
        let mut reader = BitReader::new(&raw);
        assert_eq!(
            Variant::U64(0xdead_beef_1234_5678),
            Fixed64Decoder.decode(&mut reader, &QfMapper::default()).unwrap()
        );
    }
}
