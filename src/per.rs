//! Component D: the Aligned PER codec (ITU-T X.691), §4.4.
//!
//! PER carries no tags; the shared descriptor alone drives both the
//! writer and the reader. Every length and integer here follows the
//! constrained/semi-constrained/unconstrained three-way split of §4.4.1.

use crate::bitstream::{BitReader, BitWriter};
use crate::constants::PER_FRAGMENTATION_THRESHOLD;
use crate::descriptor::{Bounds, CompositeKind, DescKind, Descriptor, EnumInfo, Kind, Mode, ScalarKind, StringKind};
use crate::result::{Error, Result};
use crate::utils::{sign_extend, u64_olen};
use crate::value::{BitString, Slot, Value};

fn unconstrained() -> Bounds {
    Bounds::new(i64::MIN, i64::MAX)
}

fn default_count_bounds() -> Bounds {
    Bounds::new(0, i64::MAX)
}

/// Writes `value` (already in `[0, d_max]`) using the three-way split
/// shared by lengths and constrained integers (§4.4.1).
fn write_constrained_u16(w: &mut BitWriter, value: u64, d_max: u64, blen: u32) {
    if blen == 8 && d_max == 255 {
        w.align();
        w.push_bits(value, 8);
    } else if blen <= 8 {
        w.push_bits(value, blen as u8);
    } else {
        w.align();
        w.push_bits(value, 16);
    }
}

fn read_constrained_u16(r: &mut BitReader, d_max: u64, blen: u32) -> Result<u64> {
    if blen == 8 && d_max == 255 {
        r.align();
        r.get_bits(8)
    } else if blen <= 8 {
        r.get_bits(blen as u8)
    } else {
        r.align();
        r.get_bits(16)
    }
}

/// Writes a semi-constrained/unconstrained-small length (§4.4.1): align,
/// then a 1- or 2-byte form depending on magnitude.
fn write_small_length(w: &mut BitWriter, l: usize) -> Result<()> {
    if l >= PER_FRAGMENTATION_THRESHOLD {
        return Err(Error::FragmentationUnsupported { field: "length" });
    }
    w.align();
    if l <= 127 {
        w.push_bits(l as u64, 8);
    } else {
        w.push_bits(0x8000 | l as u64, 16);
    }
    Ok(())
}

fn read_small_length(r: &mut BitReader) -> Result<usize> {
    r.align();
    let first = r.get_bits(8)?;
    if first & 0x80 == 0 {
        Ok(first as usize)
    } else {
        r.align();
        let low = r.get_bits(8)?;
        Ok((((first & 0x7F) as usize) << 8) | low as usize)
    }
}

fn write_length(w: &mut BitWriter, l: usize, info: &Bounds, field: &'static str) -> Result<()> {
    if info.extended {
        let in_root = (l as i64) >= info.min && (l as i64) <= info.max;
        w.push_bit(!in_root);
        if !in_root {
            if (l as i64) < info.ext_min || (l as i64) > info.ext_max {
                return Err(Error::ConstraintViolation { field, detail: format!("length {l} outside extended range") });
            }
            return write_small_length(w, l);
        }
    }
    if info.constrained && info.d_max < (1 << 16) {
        if (l as i64) < info.min || (l as i64) > info.max {
            return Err(Error::ConstraintViolation { field, detail: format!("length {l} outside root range") });
        }
        let off = (l as i64 - info.min) as u64;
        write_constrained_u16(w, off, info.d_max, info.max_blen);
        Ok(())
    } else {
        write_small_length(w, l)
    }
}

fn read_length(r: &mut BitReader, info: &Bounds, field: &'static str) -> Result<usize> {
    if info.extended {
        let extension = r.get_bit()?;
        if extension {
            let l = read_small_length(r)?;
            if (l as i64) < info.ext_min || (l as i64) > info.ext_max {
                return Err(Error::ConstraintViolation { field, detail: format!("length {l} outside extended range") });
            }
            return Ok(l);
        }
    }
    if info.constrained && info.d_max < (1 << 16) {
        let off = read_constrained_u16(r, info.d_max, info.max_blen)?;
        Ok((info.min + off as i64) as usize)
    } else {
        read_small_length(r)
    }
}

/// Writes an unconstrained (two's-complement) integer: align, one-octet
/// length, align, signed big-endian bytes (§4.4.2, §4.4.1 unconstrained
/// small form reused for the length).
fn write_unconstrained_integer(w: &mut BitWriter, value: i64) -> Result<()> {
    let n = crate::utils::i64_olen(value);
    write_small_length(w, n)?;
    w.align();
    let bytes = value.to_be_bytes();
    w.push_bytes(&bytes[8 - n..]);
    Ok(())
}

fn read_unconstrained_integer(r: &mut BitReader) -> Result<i64> {
    let n = read_small_length(r)?;
    r.align();
    let bytes = r.get_bytes(n)?;
    let mut buf = [0u8; 8];
    buf[8 - n..].copy_from_slice(bytes);
    Ok(sign_extend(u64::from_be_bytes(buf), (n * 8) as u32))
}

/// Writes the offset `off = value - info.min` as an unsigned minimal-octet
/// quantity, length-prefixed the same way as an unconstrained integer.
/// Used for semi-constrained fields (a declared lower bound, no upper
/// bound) — ground truth is the original engine's `aper_write_number`
/// falling through to its unsigned, length-prefixed branch.
fn write_semi_constrained_integer(w: &mut BitWriter, off: u64) -> Result<()> {
    let n = u64_olen(off);
    write_small_length(w, n)?;
    w.align();
    let bytes = off.to_be_bytes();
    w.push_bytes(&bytes[8 - n..]);
    Ok(())
}

fn read_semi_constrained_integer(r: &mut BitReader) -> Result<u64> {
    let n = read_small_length(r)?;
    r.align();
    let bytes = r.get_bytes(n)?;
    let mut buf = [0u8; 8];
    buf[8 - n..].copy_from_slice(bytes);
    Ok(u64::from_be_bytes(buf))
}

fn write_integer(w: &mut BitWriter, value: i64, info: &Bounds, field: &'static str) -> Result<()> {
    if info.extended {
        let in_root = value >= info.min && value <= info.max;
        w.push_bit(!in_root);
        if !in_root {
            if value < info.ext_min || value > info.ext_max {
                return Err(Error::ConstraintViolation { field, detail: format!("value {value} outside extended range") });
            }
            return write_unconstrained_integer(w, value);
        }
    }
    if info.min == i64::MIN {
        return write_unconstrained_integer(w, value);
    }
    if value < info.min || (info.max != i64::MAX && value > info.max) {
        return Err(Error::ConstraintViolation { field, detail: format!("value {value} outside root range") });
    }
    let off = (value - info.min) as u64;
    if !info.constrained {
        return write_semi_constrained_integer(w, off);
    }
    if info.max_blen <= 16 {
        write_constrained_u16(w, off, info.d_max, info.max_blen);
        Ok(())
    } else {
        // Octet-count sub-field always takes the aligned-16-bit form,
        // regardless of how few bits max_olen itself would need.
        let n = u64_olen(off) as u64;
        w.align();
        w.push_bits(n - 1, 16);
        w.align();
        w.push_bytes(&off.to_be_bytes()[8 - n as usize..]);
        Ok(())
    }
}

fn read_integer(r: &mut BitReader, info: &Bounds, field: &'static str) -> Result<i64> {
    if info.extended {
        let extension = r.get_bit()?;
        if extension {
            let v = read_unconstrained_integer(r)?;
            if v < info.ext_min || v > info.ext_max {
                return Err(Error::ConstraintViolation { field, detail: format!("value {v} outside extended range") });
            }
            return Ok(v);
        }
    }
    if info.min == i64::MIN {
        return read_unconstrained_integer(r);
    }
    if !info.constrained {
        let off = read_semi_constrained_integer(r)?;
        return Ok(info.min + off as i64);
    }
    if info.max_blen <= 16 {
        let off = read_constrained_u16(r, info.d_max, info.max_blen)?;
        Ok(info.min + off as i64)
    } else {
        r.align();
        let n = r.get_bits(16)? + 1;
        r.align();
        let bytes = r.get_bytes(n as usize)?;
        let mut buf = [0u8; 8];
        buf[8 - n as usize..].copy_from_slice(bytes);
        Ok(info.min + u64::from_be_bytes(buf) as i64)
    }
}

/// NSNNWN: 1 leading `0` bit + 6-bit value for v <= 63, else `1` + the
/// unconstrained number form (§4.4.3).
fn write_nsnnwn(w: &mut BitWriter, v: u64) -> Result<()> {
    if v <= 63 {
        w.push_bit(false);
        w.push_bits(v, 6);
        Ok(())
    } else {
        w.push_bit(true);
        write_unconstrained_integer(w, v as i64)
    }
}

fn read_nsnnwn(r: &mut BitReader) -> Result<u64> {
    if r.get_bit()? {
        Ok(read_unconstrained_integer(r)? as u64)
    } else {
        r.get_bits(6)
    }
}

fn write_enum(w: &mut BitWriter, v: i64, info: &EnumInfo, field: &'static str) -> Result<()> {
    match info.index_of(v) {
        Some(idx) => {
            if info.extended() {
                w.push_bit(false);
            }
            w.push_bits(idx as u64, info.root_blen() as u8);
            Ok(())
        }
        None if info.extended() => {
            w.push_bit(true);
            write_nsnnwn(w, v as u64)
        }
        None => Err(Error::UnknownEnum { field, value: v }),
    }
}

fn read_enum(r: &mut BitReader, info: &EnumInfo, field: &'static str) -> Result<i64> {
    if info.extended() && r.get_bit()? {
        return Ok(read_nsnnwn(r)? as i64);
    }
    let idx = r.get_bits(info.root_blen() as u8)? as usize;
    info.value_at(idx).ok_or(Error::UnknownEnum { field, value: idx as i64 })
}

fn write_string_bytes(w: &mut BitWriter, bytes: &[u8], info: &Bounds, field: &'static str) -> Result<()> {
    write_length(w, bytes.len(), info, field)?;
    if info.constrained && info.min == info.max && info.min <= 2 && bytes.len() as i64 == info.min {
        for &b in bytes {
            w.push_bits(b as u64, 8);
        }
    } else {
        w.align();
        w.push_bytes(bytes);
    }
    Ok(())
}

fn read_string_bytes(r: &mut BitReader, info: &Bounds, field: &'static str) -> Result<Vec<u8>> {
    let len = read_length(r, info, field)?;
    if info.constrained && info.min == info.max && info.min <= 2 && len as i64 == info.min {
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(r.get_bits(8)? as u8);
        }
        Ok(out)
    } else {
        Ok(r.get_bytes(len)?.to_vec())
    }
}

fn write_bit_string(w: &mut BitWriter, bits: &BitString, info: &Bounds, field: &'static str) -> Result<()> {
    write_length(w, bits.bit_len, info, field)?;
    for i in 0..bits.bit_len {
        let byte = bits.bytes[i / 8];
        w.push_bit((byte >> (7 - i % 8)) & 1 != 0);
    }
    Ok(())
}

fn read_bit_string(r: &mut BitReader, info: &Bounds, field: &'static str) -> Result<BitString> {
    let bit_len = read_length(r, info, field)?;
    let byte_len = bit_len.div_ceil(8);
    let mut bytes = vec![0u8; byte_len];
    for i in 0..bit_len {
        if r.get_bit()? {
            bytes[i / 8] |= 1 << (7 - i % 8);
        }
    }
    Ok(BitString::new(bytes, bit_len))
}

fn encode_field(field: &crate::descriptor::FieldDescriptor, value: &Value, w: &mut BitWriter) -> Result<()> {
    match &field.kind {
        Kind::Scalar(ScalarKind::Bool) => {
            w.push_bit(value.as_bool().unwrap_or(false));
            Ok(())
        }
        Kind::Scalar(ScalarKind::Enum) => {
            let info = field.enum_info.as_ref().expect("enum field missing enum_info");
            write_enum(w, value.as_int().unwrap_or(0), info, field.name)
        }
        Kind::Scalar(_) => {
            let info = field.int_info.unwrap_or_else(unconstrained);
            write_integer(w, value.as_int().unwrap_or(0), &info, field.name)
        }
        Kind::Null(_) => Ok(()),
        Kind::String(StringKind::Bit) => {
            let bits = value.as_bits().ok_or_else(|| Error::ConstraintViolation {
                field: field.name,
                detail: "expected a bit string".into(),
            })?;
            let info = field.str_info.unwrap_or_else(default_count_bounds);
            write_bit_string(w, bits, &info, field.name)
        }
        Kind::String(StringKind::Octet) => {
            let bytes = value.as_octets().ok_or_else(|| Error::ConstraintViolation {
                field: field.name,
                detail: "expected octets".into(),
            })?;
            let info = field.str_info.unwrap_or_else(default_count_bounds);
            write_string_bytes(w, bytes, &info, field.name)
        }
        Kind::String(StringKind::Char) => {
            let s = match value {
                Value::Chars(s) => s.as_bytes(),
                _ => return Err(Error::ConstraintViolation { field: field.name, detail: "expected a string".into() }),
            };
            let info = field.str_info.unwrap_or_else(default_count_bounds);
            write_string_bytes(w, s, &info, field.name)
        }
        Kind::Composite(CompositeKind::Sequence)
        | Kind::Composite(CompositeKind::Choice)
        | Kind::Composite(CompositeKind::UntaggedChoice) => {
            let sub = field.sub_descriptor.as_ref().expect("composite field missing sub_descriptor");
            encode_container(sub, value, w)
        }
        Kind::Ext => {
            let sub = field.sub_descriptor.as_ref().expect("ext field missing sub_descriptor");
            encode_container(sub, value, w)
        }
        Kind::Opaque(hooks) => {
            let bytes = (hooks.pack)(value)?;
            write_string_bytes(w, &bytes, &default_count_bounds(), field.name)
        }
        Kind::OpenType => {
            let sub = field.sub_descriptor.as_ref().expect("open type field missing sub_descriptor");
            let mut inner = BitWriter::new();
            encode_container(sub, value, &mut inner)?;
            let bytes = inner.into_bytes();
            write_string_bytes(w, &bytes, &default_count_bounds(), field.name)
        }
        Kind::Skip => Ok(()),
    }
}

fn decode_field(field: &crate::descriptor::FieldDescriptor, r: &mut BitReader) -> Result<Value> {
    match &field.kind {
        Kind::Scalar(ScalarKind::Bool) => Ok(Value::Bool(r.get_bit()?)),
        Kind::Scalar(ScalarKind::Enum) => {
            let info = field.enum_info.as_ref().expect("enum field missing enum_info");
            Ok(Value::Enum(read_enum(r, info, field.name)?))
        }
        Kind::Scalar(_) => {
            let info = field.int_info.unwrap_or_else(unconstrained);
            Ok(Value::Int(read_integer(r, &info, field.name)?))
        }
        Kind::Null(_) => Ok(Value::Null),
        Kind::String(StringKind::Bit) => {
            let info = field.str_info.unwrap_or_else(default_count_bounds);
            Ok(Value::Bits(read_bit_string(r, &info, field.name)?))
        }
        Kind::String(StringKind::Octet) => {
            let info = field.str_info.unwrap_or_else(default_count_bounds);
            Ok(Value::Octets(read_string_bytes(r, &info, field.name)?))
        }
        Kind::String(StringKind::Char) => {
            let info = field.str_info.unwrap_or_else(default_count_bounds);
            let bytes = read_string_bytes(r, &info, field.name)?;
            String::from_utf8(bytes)
                .map(Value::Chars)
                .map_err(|_| Error::MalformedHeader { context: field.name, detail: "invalid utf-8".into() })
        }
        Kind::Composite(CompositeKind::Sequence)
        | Kind::Composite(CompositeKind::Choice)
        | Kind::Composite(CompositeKind::UntaggedChoice) => {
            let sub = field.sub_descriptor.as_ref().expect("composite field missing sub_descriptor");
            decode_container(sub, r)
        }
        Kind::Ext => {
            let sub = field.sub_descriptor.as_ref().expect("ext field missing sub_descriptor");
            decode_container(sub, r)
        }
        Kind::Opaque(hooks) => {
            let bytes = read_string_bytes(r, &default_count_bounds(), field.name)?;
            (hooks.unpack)(&bytes)
        }
        Kind::OpenType => {
            let sub = field.sub_descriptor.as_ref().expect("open type field missing sub_descriptor");
            let bytes = read_string_bytes(r, &default_count_bounds(), field.name)?;
            decode_container(sub, &mut BitReader::new(&bytes))
        }
        Kind::Skip => Ok(Value::Skip(Vec::new())),
    }
}

fn encode_container(desc: &Descriptor, value: &Value, w: &mut BitWriter) -> Result<()> {
    if desc.is_seq_of {
        let field = &desc.fields[0];
        let items = value
            .as_seq_of()
            .ok_or_else(|| Error::ConstraintViolation { field: desc.name, detail: "expected a SEQUENCE OF value".into() })?;
        let info = field.seq_of_info.unwrap_or_else(default_count_bounds);
        write_length(w, items.len(), &info, desc.name)?;
        for item in items {
            encode_field(field, item.get(), w)?;
        }
        return Ok(());
    }
    match desc.kind {
        DescKind::Sequence | DescKind::Set => {
            if desc.extended {
                w.push_bit(false);
            }
            let fields = value
                .as_sequence()
                .ok_or_else(|| Error::ConstraintViolation { field: desc.name, detail: "expected a SEQUENCE value".into() })?;
            for &pos in &desc.opt_fields {
                w.push_bit(fields[pos].is_some());
            }
            for (field, slot) in desc.fields.iter().zip(fields) {
                match field.mode {
                    Mode::Mandatory => {
                        let v = slot.as_ref().ok_or_else(|| Error::ConstraintViolation {
                            field: field.name,
                            detail: "mandatory field absent".into(),
                        })?;
                        encode_field(field, v, w)?;
                    }
                    Mode::Optional => {
                        if let Some(v) = slot {
                            encode_field(field, v, w)?;
                        }
                    }
                    Mode::SeqOf => {
                        let v = slot.as_ref().ok_or_else(|| Error::ConstraintViolation {
                            field: field.name,
                            detail: "SEQ_OF field absent".into(),
                        })?;
                        let items = v
                            .as_seq_of()
                            .ok_or_else(|| Error::ConstraintViolation { field: field.name, detail: "expected SEQ_OF".into() })?;
                        let info = field.seq_of_info.unwrap_or_else(default_count_bounds);
                        write_length(w, items.len(), &info, field.name)?;
                        for item in items {
                            encode_field(field, item.get(), w)?;
                        }
                    }
                }
            }
            Ok(())
        }
        DescKind::Choice => {
            if desc.extended {
                w.push_bit(false);
            }
            let (alt, inner) = value
                .as_choice()
                .ok_or_else(|| Error::ConstraintViolation { field: desc.name, detail: "expected a CHOICE value".into() })?;
            let info = desc.choice_int_info.as_ref().expect("choice descriptor missing choice_int_info");
            write_integer(w, alt as i64, info, desc.name)?;
            let field = desc.fields.get(alt).ok_or(Error::ChoiceMiss { container: desc.name })?;
            encode_field(field, inner, w)
        }
    }
}

fn decode_container(desc: &Descriptor, r: &mut BitReader) -> Result<Value> {
    if desc.is_seq_of {
        let field = &desc.fields[0];
        let info = field.seq_of_info.unwrap_or_else(default_count_bounds);
        let len = read_length(r, &info, desc.name)?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(Slot::wrap(decode_field(field, r)?, field.pointed));
        }
        return Ok(Value::SeqOf(items));
    }
    match desc.kind {
        DescKind::Sequence | DescKind::Set => {
            if desc.extended && r.get_bit()? {
                return Err(Error::ExtensionUnsupported { container: desc.name });
            }
            let mut present = vec![true; desc.fields.len()];
            for &pos in &desc.opt_fields {
                present[pos] = r.get_bit()?;
            }
            let mut values = Vec::with_capacity(desc.fields.len());
            for (i, field) in desc.fields.iter().enumerate() {
                match field.mode {
                    Mode::Mandatory => values.push(Some(decode_field(field, r)?)),
                    Mode::Optional => {
                        if present[i] {
                            values.push(Some(decode_field(field, r)?));
                        } else {
                            values.push(None);
                        }
                    }
                    Mode::SeqOf => {
                        let info = field.seq_of_info.unwrap_or_else(default_count_bounds);
                        let len = read_length(r, &info, field.name)?;
                        let mut items = Vec::with_capacity(len);
                        for _ in 0..len {
                            items.push(Slot::wrap(decode_field(field, r)?, field.pointed));
                        }
                        values.push(Some(Value::SeqOf(items)));
                    }
                }
            }
            Ok(Value::Sequence(values))
        }
        DescKind::Choice => {
            if desc.extended && r.get_bit()? {
                return Err(Error::ExtensionUnsupported { container: desc.name });
            }
            let info = desc.choice_int_info.as_ref().expect("choice descriptor missing choice_int_info");
            let alt = read_integer(r, info, desc.name)? as usize;
            let field = desc.fields.get(alt).ok_or(Error::ChoiceMiss { container: desc.name })?;
            let inner = decode_field(field, r)?;
            Ok(Value::Choice { alt, inner: Box::new(inner) })
        }
    }
}

pub fn per_encode(desc: &Descriptor, value: &Value) -> Result<Vec<u8>> {
    let mut w = BitWriter::new();
    encode_container(desc, value, &mut w)?;
    let mut bytes = w.into_bytes();
    if bytes.is_empty() {
        bytes.push(0);
    }
    Ok(bytes)
}

pub fn per_decode(desc: &Descriptor, input: &[u8]) -> Result<Value> {
    let mut r = BitReader::new(input);
    decode_container(desc, &mut r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::DescBuilder;

    #[test]
    fn s4_constrained_integer_large_range() {
        let mut b = DescBuilder::sequence("S4");
        b.reg_scalar("v", 0, ScalarKind::Int32).unwrap();
        b.set_int_min_max(0, 100_000).unwrap();
        let desc = b.build().unwrap();

        let value = Value::Sequence(vec![Some(Value::Int(45))]);
        let bytes = per_encode(&desc, &value).unwrap();
        assert_eq!(bytes, vec![0x00, 0x00, 0x2D]);
        assert_eq!(per_decode(&desc, &bytes).unwrap(), value);
    }

    #[test]
    fn s5_extensible_integer_out_of_root() {
        let mut b = DescBuilder::sequence("S5");
        b.reg_scalar("v", 0, ScalarKind::Int32).unwrap();
        b.set_int_min_max(0, 7).unwrap();
        b.set_int_extended(0, i64::MAX).unwrap();
        let desc = b.build().unwrap();

        let value = Value::Sequence(vec![Some(Value::Int(8))]);
        let bytes = per_encode(&desc, &value).unwrap();
        assert_eq!(bytes, vec![0x80, 0x01, 0x08]);
        assert_eq!(per_decode(&desc, &bytes).unwrap(), value);
    }

    #[test]
    fn semi_constrained_integer_uses_offset_unsigned_form() {
        let mut b = DescBuilder::sequence("SemiInt");
        b.reg_scalar("v", 0, ScalarKind::Int32).unwrap();
        b.set_int_min(-5).unwrap();
        let desc = b.build().unwrap();

        let value = Value::Sequence(vec![Some(Value::Int(10))]);
        let bytes = per_encode(&desc, &value).unwrap();
        // off = 10 - (-5) = 15, one-octet length prefix then the offset byte.
        assert_eq!(bytes, vec![0x01, 0x0F]);
        assert_eq!(per_decode(&desc, &bytes).unwrap(), value);
    }

    #[test]
    fn semi_constrained_integer_below_min_is_rejected() {
        let mut b = DescBuilder::sequence("SemiIntLow");
        b.reg_scalar("v", 0, ScalarKind::Int32).unwrap();
        b.set_int_min(-5).unwrap();
        let desc = b.build().unwrap();

        let value = Value::Sequence(vec![Some(Value::Int(-6))]);
        let err = per_encode(&desc, &value).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation { .. }));
    }

    #[test]
    fn seq_of_choice_round_trips() {
        let mut choice = DescBuilder::choice("Choice", "sel");
        choice.reg_scalar("c1", 0x23, ScalarKind::Uint32).unwrap();
        choice.reg_scalar("c2", 0x34, ScalarKind::Uint32).unwrap();
        choice.reg_scalar("c3", 0x45, ScalarKind::Uint32).unwrap();
        let choice = choice.build().unwrap();

        let mut seq_of = DescBuilder::seq_of("Seq");
        seq_of.reg_untagged_choice("item", choice).unwrap();
        let desc = seq_of.build().unwrap();

        let value = Value::SeqOf(vec![
            Slot::inline(Value::Choice { alt: 1, inner: Box::new(Value::Int(0x123)) }),
            Slot::inline(Value::Choice { alt: 0, inner: Box::new(Value::Int(0x456)) }),
        ]);
        let bytes = per_encode(&desc, &value).unwrap();
        assert_eq!(per_decode(&desc, &bytes).unwrap(), value);
    }

    #[test]
    fn empty_root_sequence_emits_one_byte() {
        let mut seq_of = DescBuilder::seq_of("Empty");
        seq_of.reg_scalar("item", 0, ScalarKind::Int8).unwrap();
        let desc = seq_of.build().unwrap();

        let value = Value::SeqOf(vec![]);
        let bytes = per_encode(&desc, &value).unwrap();
        assert_eq!(bytes, vec![0x00]);
    }

    #[test]
    fn extension_present_on_decode_is_rejected() {
        let mut b = DescBuilder::sequence("Ext").extensible();
        b.reg_scalar("v", 0, ScalarKind::Int8).unwrap();
        let desc = b.build().unwrap();
        let bytes = vec![0x80, 0x00];
        let err = per_decode(&desc, &bytes).unwrap_err();
        assert!(matches!(err, Error::ExtensionUnsupported { .. }));
    }

    #[test]
    fn bit_string_round_trips_without_extra_padding() {
        let mut b = DescBuilder::sequence("Bits");
        b.reg_bit_string("b", 0).unwrap();
        let desc = b.build().unwrap();
        let value = Value::Sequence(vec![Some(Value::Bits(BitString::new(vec![0xF0], 4)))]);
        let bytes = per_encode(&desc, &value).unwrap();
        assert_eq!(per_decode(&desc, &bytes).unwrap(), value);
    }
}
