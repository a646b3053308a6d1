use crate::bitreader::{BitReadError, BitReader};

const ROUNDDOWN: i32 = 1 << 0;
const ROUNDUP: i32 = 1 << 1;
const ENCODE_ZERO: i32 = 1 << 2;
const ENCODE_INTEGERS: i32 = 1 << 3;

/// Field-range quantized float, parameterized by the serializer's bit count,
/// encode flags and low/high range.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedFloat {
    low: f32,
    high: f32,
    high_low_mul: f32,
    dec_mul: f32,
    offset: f32,
    bit_count: u32,
    flags: i32,
    no_scale: bool,
}

/// Registry of quantized-float decoders, indexed by the id baked into the
/// field's decoder at serializer-build time.
#[derive(Debug, Default)]
pub struct QfMapper {
    pub idx: u32,
    pub map: std::collections::HashMap<u32, QuantizedFloat>,
}

impl QuantizedFloat {
    pub fn new(bit_count: u32, flags: Option<i32>, low_value: Option<f32>, high_value: Option<f32>) -> Self {
        let mut qf = QuantizedFloat {
            low: 0.0,
            high: 1.0,
            high_low_mul: 0.0,
            dec_mul: 0.0,
            offset: 0.0,
            bit_count: 0,
            flags: 0,
            no_scale: false,
        };

        if bit_count == 0 || bit_count >= 32 {
            qf.no_scale = true;
            return qf;
        }

        qf.no_scale = false;
        qf.bit_count = bit_count;
        qf.low = low_value.unwrap_or(0.0);
        qf.high = high_value.unwrap_or(1.0);
        qf.flags = flags.unwrap_or(0);
        qf.validate_flags();

        let mut steps = 1u32 << qf.bit_count;

        if qf.flags & ROUNDDOWN != 0 {
            let range = qf.high - qf.low;
            qf.offset = range / steps as f32;
            qf.high -= qf.offset;
        } else if qf.flags & ROUNDUP != 0 {
            let range = qf.high - qf.low;
            qf.offset = range / steps as f32;
            qf.low += qf.offset;
        }

        if qf.flags & ENCODE_INTEGERS != 0 {
            let mut delta = qf.high - qf.low;
            if delta < 1.0 {
                delta = 1.0;
            }
            let delta_log2 = delta.log2().ceil() as u32;
            let range2 = 1u32 << delta_log2;

            let mut bc = qf.bit_count;
            while (1u32 << bc) <= range2 {
                bc += 1;
            }
            if bc > qf.bit_count {
                qf.bit_count = bc;
                steps = 1u32 << qf.bit_count;
            }

            qf.offset = range2 as f32 / steps as f32;
            qf.high = qf.low + range2 as f32 - qf.offset;
        }

        qf.assign_multipliers(steps);

        // Drop special-case flags whose value the plain quantization already
        // reproduces exactly.
        if qf.flags & ROUNDDOWN != 0 && qf.quantize(qf.low) == qf.low {
            qf.flags &= !ROUNDDOWN;
        }
        if qf.flags & ROUNDUP != 0 && qf.quantize(qf.high) == qf.high {
            qf.flags &= !ROUNDUP;
        }
        if qf.flags & ENCODE_ZERO != 0 && qf.quantize(0.0) == 0.0 {
            qf.flags &= !ENCODE_ZERO;
        }

        qf
    }

    fn validate_flags(&mut self) {
        if self.flags == 0 {
            return;
        }

        if (self.low == 0.0 && self.flags & ROUNDDOWN != 0)
            || (self.high == 0.0 && self.flags & ROUNDUP != 0)
        {
            self.flags &= !ENCODE_ZERO;
        }

        if self.low == 0.0 && self.flags & ENCODE_ZERO != 0 {
            self.flags |= ROUNDDOWN;
            self.flags &= !ENCODE_ZERO;
        }

        if self.high == 0.0 && self.flags & ENCODE_ZERO != 0 {
            self.flags |= ROUNDUP;
            self.flags &= !ENCODE_ZERO;
        }

        if self.low > 0.0 || self.high < 0.0 {
            self.flags &= !ENCODE_ZERO;
        }

        if self.flags & ENCODE_INTEGERS != 0 {
            self.flags &= !(ROUNDUP | ROUNDDOWN | ENCODE_ZERO);
        }
    }

    fn assign_multipliers(&mut self, steps: u32) {
        let range = self.high - self.low;
        let high: u32 = if self.bit_count == 32 {
            0xFFFF_FFFE
        } else {
            (1 << self.bit_count) - 1
        };

        let mut high_mul = if range.abs() <= 0.0 {
            high as f32
        } else {
            high as f32 / range
        };

        if high_mul * range > high as f32 || (high_mul * range) as f64 > high as f64 {
            for multiplier in [0.9999, 0.99, 0.9, 0.8, 0.7] {
                high_mul = high as f32 / range * multiplier;
                if !(high_mul * range > high as f32 || (high_mul * range) as f64 > high as f64) {
                    break;
                }
            }
        }

        self.high_low_mul = high_mul;
        self.dec_mul = 1.0 / (steps - 1) as f32;
    }

    fn quantize(&self, value: f32) -> f32 {
        if value < self.low {
            return self.low;
        }
        if value > self.high {
            return self.high;
        }

        let i = ((value - self.low) * self.high_low_mul) as u32;
        self.low + (self.high - self.low) * (i as f32 * self.dec_mul)
    }

    pub fn decode(&self, reader: &mut BitReader) -> Result<f32, BitReadError> {
        if self.no_scale {
            return Ok(f32::from_bits(reader.read_nbits(32)?));
        }

        if self.flags & ROUNDDOWN != 0 && reader.read_boolean()? {
            return Ok(self.low);
        }
        if self.flags & ROUNDUP != 0 && reader.read_boolean()? {
            return Ok(self.high);
        }
        if self.flags & ENCODE_ZERO != 0 && reader.read_boolean()? {
            return Ok(0.0);
        }

        let raw = reader.read_nbits(self.bit_count)?;
        Ok(self.low + (self.high - self.low) * raw as f32 * self.dec_mul)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_bitcount_is_noscale() {
        let qf = QuantizedFloat::new(32, Some(0), Some(0.0), Some(1.0));
        assert!(qf.no_scale);

        let raw = 4.25f32.to_bits().to_le_bytes();
        let mut reader = BitReader::new(&raw);
        assert_eq!(4.25, qf.decode(&mut reader).unwrap());
    }

    #[test]
    fn decode_stays_inside_range() {
        let qf = QuantizedFloat::new(10, Some(0), Some(-10.0), Some(10.0));

        let raw = [0xff, 0xff];
        let mut reader = BitReader::new(&raw);
        let value = qf.decode(&mut reader).unwrap();
        assert!((-10.0..=10.0).contains(&value));

        let raw = [0x00, 0x00];
        let mut reader = BitReader::new(&raw);
        assert_eq!(-10.0, qf.decode(&mut reader).unwrap());
    }
}
