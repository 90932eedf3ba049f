//! Component C: the BER codec (ITU-T X.690 definite-length TLV), §4.3.
//!
//! Unlike the original two-pass size-stack design, this rendering builds
//! each composite's content bottom-up into an owned `Vec<u8>` before its
//! tag/length header is written, so there is nothing to back-patch and no
//! separate size-computation pass is needed; `pack_size` is simply the
//! length of what `pack` would write (§8, invariant 3).

use crate::constants::{EOC, FLAG_CONSTRUCTED};
use crate::descriptor::{Bounds, CompositeKind, DescKind, Descriptor, Kind, Mode, ScalarKind, StringKind};
use crate::result::{Error, Result};
use crate::utils::{i64_olen, sign_extend, u64_olen};
use crate::value::{BitString, Slot, Value};

/// BER does not need a field's registered bounds to determine its wire
/// bytes, but out-of-range values are still rejected (§8, invariant 5).
fn string_len(value: &Value) -> Option<usize> {
    match value {
        Value::Octets(b) => Some(b.len()),
        Value::Chars(s) => Some(s.len()),
        Value::Bits(b) => Some(b.bit_len),
        _ => None,
    }
}

fn check_bounds(info: &Option<Bounds>, v: i64, field: &'static str) -> Result<()> {
    let Some(info) = info else { return Ok(()) };
    if info.extended {
        if (v >= info.min && v <= info.max) || (v >= info.ext_min && v <= info.ext_max) {
            return Ok(());
        }
        return Err(Error::ConstraintViolation { field, detail: format!("value {v} outside root and extended range") });
    }
    if (info.min != i64::MIN && v < info.min) || (info.max != i64::MAX && v > info.max) {
        return Err(Error::ConstraintViolation { field, detail: format!("value {v} outside root range") });
    }
    Ok(())
}

fn is_composite(kind: &Kind) -> bool {
    matches!(kind, Kind::Composite(_))
}

fn expected_tag_byte(tag: u8, kind: &Kind) -> u8 {
    if is_composite(kind) {
        tag | FLAG_CONSTRUCTED
    } else {
        tag
    }
}

fn native_bytes(kind: ScalarKind) -> usize {
    match kind {
        ScalarKind::Bool => 1,
        ScalarKind::Int8 | ScalarKind::Uint8 => 1,
        ScalarKind::Int16 | ScalarKind::Uint16 => 2,
        ScalarKind::Int32 | ScalarKind::Uint32 | ScalarKind::Enum => 4,
        ScalarKind::Int64 | ScalarKind::Uint64 => 8,
    }
}

fn is_unsigned(kind: ScalarKind) -> bool {
    matches!(kind, ScalarKind::Uint8 | ScalarKind::Uint16 | ScalarKind::Uint32 | ScalarKind::Uint64)
}

fn write_tlv(tag: u8, content: &[u8], out: &mut Vec<u8>) {
    out.push(tag);
    let len = content.len();
    if len < 128 {
        out.push(len as u8);
    } else {
        let n = u64_olen(len as u64);
        out.push(0x80 | n as u8);
        out.extend_from_slice(&(len as u64).to_be_bytes()[8 - n..]);
    }
    out.extend_from_slice(content);
}

fn encode_scalar(kind: ScalarKind, value: &Value) -> Result<Vec<u8>> {
    if kind == ScalarKind::Bool {
        return Ok(vec![if value.as_bool().unwrap_or(false) { 0x01 } else { 0x00 }]);
    }
    let v = value.as_int().ok_or_else(|| Error::MalformedHeader {
        context: "ber scalar encode",
        detail: "expected an integral value".into(),
    })?;
    if is_unsigned(kind) {
        let u = v as u64;
        let n = u64_olen(u);
        let mut bytes = u.to_be_bytes()[8 - n..].to_vec();
        if bytes[0] & 0x80 != 0 {
            bytes.insert(0, 0);
        }
        Ok(bytes)
    } else {
        let n = i64_olen(v);
        Ok(v.to_be_bytes()[8 - n..].to_vec())
    }
}

fn decode_scalar(kind: ScalarKind, content: &[u8]) -> Result<Value> {
    if kind == ScalarKind::Bool {
        if content.len() != 1 {
            return Err(Error::MalformedHeader { context: "BOOLEAN", detail: "expected one content byte".into() });
        }
        return Ok(Value::Bool(content[0] != 0));
    }
    let native = native_bytes(kind);
    if is_unsigned(kind) {
        let mut bytes = content;
        if bytes.len() == native + 1 && bytes[0] == 0 {
            bytes = &bytes[1..];
        } else if bytes.len() > native || bytes.is_empty() {
            return Err(Error::MalformedHeader { context: "unsigned integer", detail: "content length out of range".into() });
        }
        let mut buf = [0u8; 8];
        buf[8 - bytes.len()..].copy_from_slice(bytes);
        let v = u64::from_be_bytes(buf) as i64;
        Ok(if kind == ScalarKind::Enum { Value::Enum(v) } else { Value::Int(v) })
    } else {
        if content.is_empty() || content.len() > 8 {
            return Err(Error::MalformedHeader { context: "signed integer", detail: "content length out of range".into() });
        }
        let mut buf = [0u8; 8];
        buf[8 - content.len()..].copy_from_slice(content);
        let v = sign_extend(u64::from_be_bytes(buf), (content.len() * 8) as u32);
        Ok(if kind == ScalarKind::Enum { Value::Enum(v) } else { Value::Int(v) })
    }
}

fn encode_string(kind: StringKind, value: &Value) -> Result<Vec<u8>> {
    match kind {
        StringKind::Octet => Ok(value
            .as_octets()
            .ok_or_else(|| Error::MalformedHeader { context: "OCTET STRING", detail: "expected octets".into() })?
            .to_vec()),
        StringKind::Char => match value {
            Value::Chars(s) => Ok(s.as_bytes().to_vec()),
            _ => Err(Error::MalformedHeader { context: "character string", detail: "expected a string value".into() }),
        },
        StringKind::Bit => {
            let bits = value
                .as_bits()
                .ok_or_else(|| Error::MalformedHeader { context: "BIT STRING", detail: "expected a bit string".into() })?;
            let mut out = Vec::with_capacity(1 + bits.byte_len());
            out.push(bits.unused_bits());
            out.extend_from_slice(&bits.bytes[..bits.byte_len()]);
            Ok(out)
        }
    }
}

fn decode_string(kind: StringKind, content: &[u8]) -> Result<Value> {
    match kind {
        StringKind::Octet => Ok(Value::Octets(content.to_vec())),
        StringKind::Char => String::from_utf8(content.to_vec())
            .map(Value::Chars)
            .map_err(|_| Error::MalformedHeader { context: "character string", detail: "invalid utf-8".into() }),
        StringKind::Bit => {
            if content.is_empty() {
                return Err(Error::MalformedHeader { context: "BIT STRING", detail: "missing unused-bits octet".into() });
            }
            let unused = content[0] as usize;
            let data = &content[1..];
            let bit_len = data.len() * 8 - unused.min(8 * data.len().max(1));
            Ok(Value::Bits(BitString::new(data.to_vec(), bit_len)))
        }
    }
}

/// Encodes the content (no outer tag) of a SEQUENCE/SET/CHOICE/SEQ_OF
/// descriptor, matching §4.3.2.
fn encode_container_content(desc: &Descriptor, value: &Value) -> Result<Vec<u8>> {
    if desc.is_seq_of {
        let field = &desc.fields[0];
        let items = value
            .as_seq_of()
            .ok_or_else(|| Error::MalformedHeader { context: desc.name, detail: "expected a SEQUENCE OF value".into() })?;
        check_bounds(&field.seq_of_info, items.len() as i64, field.name)?;
        let mut out = Vec::new();
        for item in items {
            out.extend(encode_field(field, item.get())?);
        }
        return Ok(out);
    }
    match desc.kind {
        DescKind::Sequence | DescKind::Set => {
            let fields = value
                .as_sequence()
                .ok_or_else(|| Error::MalformedHeader { context: desc.name, detail: "expected a SEQUENCE value".into() })?;
            let mut out = Vec::new();
            for (field, slot) in desc.fields.iter().zip(fields) {
                match field.mode {
                    Mode::Mandatory => {
                        let v = slot.as_ref().ok_or_else(|| Error::MalformedHeader {
                            context: field.name,
                            detail: "mandatory field absent".into(),
                        })?;
                        out.extend(encode_field(field, v)?);
                    }
                    Mode::Optional => {
                        if let Some(v) = slot {
                            out.extend(encode_field(field, v)?);
                        }
                    }
                    Mode::SeqOf => {
                        let v = slot.as_ref().ok_or_else(|| Error::MalformedHeader {
                            context: field.name,
                            detail: "SEQ_OF field absent".into(),
                        })?;
                        let items = v
                            .as_seq_of()
                            .ok_or_else(|| Error::MalformedHeader { context: field.name, detail: "expected SEQ_OF".into() })?;
                        check_bounds(&field.seq_of_info, items.len() as i64, field.name)?;
                        for item in items {
                            out.extend(encode_field(field, item.get())?);
                        }
                    }
                }
            }
            Ok(out)
        }
        DescKind::Choice => {
            let (alt, inner) = value
                .as_choice()
                .ok_or_else(|| Error::MalformedHeader { context: desc.name, detail: "expected a CHOICE value".into() })?;
            let field = desc.fields.get(alt).ok_or(Error::ChoiceMiss { container: desc.name })?;
            encode_field(field, inner)
        }
    }
}

/// Encodes one field's full TLV (or, for an untagged composite, its
/// alternative's own TLV with no outer wrapper — §4.3.2).
fn encode_field(field: &crate::descriptor::FieldDescriptor, value: &Value) -> Result<Vec<u8>> {
    match &field.kind {
        Kind::Scalar(k) => {
            if field.is_integer_kind() {
                if let Some(v) = value.as_int() {
                    check_bounds(&field.int_info, v, field.name)?;
                }
            }
            let content = encode_scalar(*k, value)?;
            let mut out = Vec::new();
            write_tlv(field.tag, &content, &mut out);
            Ok(out)
        }
        Kind::Null(_) => {
            let mut out = Vec::new();
            write_tlv(field.tag, &[], &mut out);
            Ok(out)
        }
        Kind::String(k) => {
            if let Some(len) = string_len(value) {
                check_bounds(&field.str_info, len as i64, field.name)?;
            }
            let content = encode_string(*k, value)?;
            let mut out = Vec::new();
            write_tlv(field.tag, &content, &mut out);
            Ok(out)
        }
        Kind::Composite(CompositeKind::Sequence) => {
            let sub = field.sub_descriptor.as_ref().expect("sequence field missing sub_descriptor");
            let content = encode_container_content(sub, value)?;
            let mut out = Vec::new();
            write_tlv(field.tag | FLAG_CONSTRUCTED, &content, &mut out);
            Ok(out)
        }
        Kind::Composite(CompositeKind::Choice) => {
            let sub = field.sub_descriptor.as_ref().expect("choice field missing sub_descriptor");
            let content = encode_container_content(sub, value)?;
            let mut out = Vec::new();
            write_tlv(field.tag | FLAG_CONSTRUCTED, &content, &mut out);
            Ok(out)
        }
        Kind::Composite(CompositeKind::UntaggedChoice) => {
            let sub = field.sub_descriptor.as_ref().expect("untagged choice field missing sub_descriptor");
            encode_container_content(sub, value)
        }
        Kind::Ext => {
            let sub = field.sub_descriptor.as_ref().expect("ext field missing sub_descriptor");
            let content = encode_container_content(sub, value)?;
            let mut out = Vec::new();
            write_tlv(field.tag | FLAG_CONSTRUCTED, &content, &mut out);
            Ok(out)
        }
        Kind::Opaque(hooks) => {
            let content = (hooks.pack)(value)?;
            let mut out = Vec::new();
            write_tlv(field.tag, &content, &mut out);
            Ok(out)
        }
        Kind::OpenType => {
            let content = match value {
                Value::Opaque(bytes) => bytes.clone(),
                _ => return Err(Error::Unimplemented("open type BER encode requires a pre-packed Value::Opaque")),
            };
            let mut out = Vec::new();
            write_tlv(field.tag, &content, &mut out);
            Ok(out)
        }
        Kind::Skip => Ok(Vec::new()),
    }
}

/// Bounded, position-tracking byte cursor used by the BER decoder.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

enum Length {
    Definite(usize),
    Indefinite,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn has_remaining(&self) -> bool {
        self.pos < self.data.len()
    }

    fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.data.len() {
            return Err(Error::ShortRead { context: "ber content", needed: n, available: self.data.len() - self.pos });
        }
        let s = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }

    fn read_length(&mut self) -> Result<Length> {
        let b = self.take(1)?[0];
        if b == 0x80 {
            Ok(Length::Indefinite)
        } else if b < 0x80 {
            Ok(Length::Definite(b as usize))
        } else {
            let n = (b & 0x7F) as usize;
            if n == 0 || n > 8 {
                return Err(Error::MalformedHeader { context: "ber length", detail: "unsupported long-form length".into() });
            }
            let bytes = self.take(n)?;
            let mut buf = [0u8; 8];
            buf[8 - n..].copy_from_slice(bytes);
            Ok(Length::Definite(u64::from_be_bytes(buf) as usize))
        }
    }

    /// Reads one TLV, returning its tag byte and content slice, advancing
    /// past any trailing EOC for an indefinite-length value.
    fn read_tlv(&mut self) -> Result<(u8, &'a [u8])> {
        let tag = self.take(1)?[0];
        match self.read_length()? {
            Length::Definite(len) => Ok((tag, self.take(len)?)),
            Length::Indefinite => {
                let start = self.pos;
                self.skip_to_eoc()?;
                let end = self.pos - 2;
                Ok((tag, &self.data[start..end]))
            }
        }
    }

    /// Advances past nested TLVs until the terminating EOC, without
    /// interpreting their contents (§4.3.3 indefinite-length scanning).
    fn skip_to_eoc(&mut self) -> Result<()> {
        loop {
            if self.remaining().starts_with(&EOC) {
                self.pos += 2;
                return Ok(());
            }
            let _tag = self.take(1)?[0];
            match self.read_length()? {
                Length::Definite(len) => {
                    self.take(len)?;
                }
                Length::Indefinite => self.skip_to_eoc()?,
            }
        }
    }
}

/// Whether `cursor`'s next byte indicates `field` is present, per the
/// distinct MANDATORY/OPTIONAL/SEQ_OF peeking rules of §4.3.3.
fn field_is_present(field: &crate::descriptor::FieldDescriptor, cursor: &Cursor) -> bool {
    if let Kind::Composite(CompositeKind::UntaggedChoice) = &field.kind {
        let sub = field.sub_descriptor.as_ref().expect("untagged choice missing sub_descriptor");
        let table = sub.choice_table.as_ref().expect("untagged choice missing dispatch table");
        match cursor.peek_byte() {
            Some(b) => table[b as usize] != 0,
            None => false,
        }
    } else {
        let expected = expected_tag_byte(field.tag, &field.kind);
        cursor.peek_byte() == Some(expected)
    }
}

fn decode_field(field: &crate::descriptor::FieldDescriptor, cursor: &mut Cursor) -> Result<Value> {
    match &field.kind {
        Kind::Scalar(k) => {
            let (tag, content) = cursor.read_tlv()?;
            if tag != field.tag {
                return Err(Error::MalformedHeader { context: field.name, detail: "unexpected tag".into() });
            }
            decode_scalar(*k, content)
        }
        Kind::Null(_) => {
            let (tag, _content) = cursor.read_tlv()?;
            if tag != field.tag {
                return Err(Error::MalformedHeader { context: field.name, detail: "unexpected tag".into() });
            }
            Ok(Value::Null)
        }
        Kind::String(k) => {
            let (tag, content) = cursor.read_tlv()?;
            if tag != field.tag {
                return Err(Error::MalformedHeader { context: field.name, detail: "unexpected tag".into() });
            }
            decode_string(*k, content)
        }
        Kind::Composite(CompositeKind::Sequence) | Kind::Composite(CompositeKind::Choice) => {
            let (tag, content) = cursor.read_tlv()?;
            let sub = field.sub_descriptor.as_ref().expect("composite field missing sub_descriptor");
            if tag != (field.tag | FLAG_CONSTRUCTED) {
                return Err(Error::MalformedHeader { context: field.name, detail: "unexpected tag".into() });
            }
            decode_container(sub, &mut Cursor::new(content))
        }
        Kind::Composite(CompositeKind::UntaggedChoice) => {
            let sub = field.sub_descriptor.as_ref().expect("untagged choice field missing sub_descriptor");
            decode_container(sub, cursor)
        }
        Kind::Ext => {
            let (tag, content) = cursor.read_tlv()?;
            let sub = field.sub_descriptor.as_ref().expect("ext field missing sub_descriptor");
            if tag != (field.tag | FLAG_CONSTRUCTED) {
                return Err(Error::MalformedHeader { context: field.name, detail: "unexpected tag".into() });
            }
            decode_container(sub, &mut Cursor::new(content))
        }
        Kind::Opaque(hooks) => {
            let (tag, content) = cursor.read_tlv()?;
            if tag != field.tag {
                return Err(Error::MalformedHeader { context: field.name, detail: "unexpected tag".into() });
            }
            (hooks.unpack)(content)
        }
        Kind::OpenType => {
            let (_tag, content) = cursor.read_tlv()?;
            Ok(Value::Opaque(content.to_vec()))
        }
        Kind::Skip => {
            let start = cursor.pos;
            let _ = cursor.read_tlv()?;
            Ok(Value::Skip(cursor.data[start..cursor.pos].to_vec()))
        }
    }
}

fn decode_container(desc: &Descriptor, cursor: &mut Cursor) -> Result<Value> {
    if desc.is_seq_of {
        let field = &desc.fields[0];
        let mut items = Vec::new();
        while cursor.has_remaining() && field_is_present(field, cursor) {
            items.push(Slot::wrap(decode_field(field, cursor)?, field.pointed));
        }
        return Ok(Value::SeqOf(items));
    }
    match desc.kind {
        DescKind::Sequence | DescKind::Set => {
            let mut values = Vec::with_capacity(desc.fields.len());
            for field in &desc.fields {
                match field.mode {
                    Mode::Mandatory => values.push(Some(decode_field(field, cursor)?)),
                    Mode::Optional => {
                        if cursor.has_remaining() && field_is_present(field, cursor) {
                            values.push(Some(decode_field(field, cursor)?));
                        } else {
                            values.push(None);
                        }
                    }
                    Mode::SeqOf => {
                        let mut items = Vec::new();
                        while cursor.has_remaining() && field_is_present(field, cursor) {
                            items.push(Slot::wrap(decode_field(field, cursor)?, field.pointed));
                        }
                        values.push(Some(Value::SeqOf(items)));
                    }
                }
            }
            Ok(Value::Sequence(values))
        }
        DescKind::Choice => {
            let tag = cursor.peek_byte().ok_or(Error::ShortRead { context: desc.name, needed: 1, available: 0 })?;
            let table = desc.choice_table.as_ref().expect("choice descriptor missing dispatch table");
            let alt_index = table[tag as usize];
            if alt_index == 0 {
                return Err(Error::ChoiceMiss { container: desc.name });
            }
            let field = &desc.fields[(alt_index - 1) as usize];
            let inner = decode_field(field, cursor)?;
            Ok(Value::Choice { alt: (alt_index - 1) as usize, inner: Box::new(inner) })
        }
    }
}

pub fn pack(desc: &Descriptor, value: &Value) -> Result<Vec<u8>> {
    encode_container_content(desc, value)
}

pub fn pack_size(desc: &Descriptor, value: &Value) -> Result<usize> {
    Ok(pack(desc, value)?.len())
}

pub fn unpack(desc: &Descriptor, input: &[u8]) -> Result<Value> {
    let mut cursor = Cursor::new(input);
    decode_container(desc, &mut cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::DescBuilder;
    use std::sync::Arc;

    fn seq1() -> Arc<Descriptor> {
        let mut b = DescBuilder::sequence("S1");
        b.reg_scalar("a", 0xAB, ScalarKind::Int8).unwrap();
        b.reg_scalar("b", 0xCD, ScalarKind::Uint32).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn s1_minimal_signed_integer_roundtrip() {
        let desc = seq1();
        let value = Value::Sequence(vec![Some(Value::Int(-1)), Some(Value::Int(0x87654321))]);
        let bytes = pack(&desc, &value).unwrap();
        assert_eq!(bytes, vec![0xAB, 0x01, 0xFF, 0xCD, 0x05, 0x00, 0x87, 0x65, 0x43, 0x21]);
        assert_eq!(pack_size(&desc, &value).unwrap(), bytes.len());
        assert_eq!(unpack(&desc, &bytes).unwrap(), value);
    }

    #[test]
    fn s2_enumerated_and_boolean() {
        let mut b = DescBuilder::sequence("S2");
        b.reg_scalar("b", 0xBB, ScalarKind::Bool).unwrap();
        b.reg_enum("e", 0x0F).unwrap();
        b.set_enum_values(&[0, 1, 2]).unwrap();
        let desc = b.build().unwrap();

        let value = Value::Sequence(vec![Some(Value::Bool(true)), Some(Value::Enum(2))]);
        let bytes = pack(&desc, &value).unwrap();
        assert_eq!(bytes, vec![0xBB, 0x01, 0x01, 0x0F, 0x01, 0x02]);
        assert_eq!(unpack(&desc, &bytes).unwrap(), value);
    }

    #[test]
    fn s3_optional_absent() {
        let mut b = DescBuilder::sequence("S3");
        b.reg_opt_string("p", 0x00, StringKind::Octet).unwrap();
        b.reg_string("s", 0xAB, StringKind::Octet).unwrap();
        let desc = b.build().unwrap();

        let value = Value::Sequence(vec![None, Some(Value::Octets(b"string".to_vec()))]);
        let bytes = pack(&desc, &value).unwrap();
        assert_eq!(bytes, vec![0xAB, 0x06, b's', b't', b'r', b'i', b'n', b'g']);
        assert_eq!(unpack(&desc, &bytes).unwrap(), value);
    }

    #[test]
    fn s6_sequence_of_choice() {
        let c1 = DescBuilder::sequence("C1Inner").build().unwrap();
        let c2 = DescBuilder::sequence("C2Inner").build().unwrap();
        let c3 = DescBuilder::sequence("C3Inner").build().unwrap();

        let mut choice = DescBuilder::choice("Choice", "sel");
        choice.reg_scalar("c1", 0x23, ScalarKind::Uint32).unwrap();
        choice.reg_scalar("c2", 0x34, ScalarKind::Uint32).unwrap();
        choice.reg_scalar("c3", 0x45, ScalarKind::Uint32).unwrap();
        let choice = choice.build().unwrap();
        let _ = (c1, c2, c3);

        let mut seq_of = DescBuilder::seq_of("Seq");
        seq_of.reg_untagged_choice("item", choice).unwrap();
        let desc = seq_of.build().unwrap();

        let value = Value::SeqOf(vec![
            Slot::inline(Value::Choice { alt: 1, inner: Box::new(Value::Int(0x123)) }),
            Slot::inline(Value::Choice { alt: 0, inner: Box::new(Value::Int(0x456)) }),
            Slot::inline(Value::Choice { alt: 2, inner: Box::new(Value::Int(0x789)) }),
        ]);
        let bytes = pack(&desc, &value).unwrap();
        assert_eq!(bytes, vec![0x34, 0x02, 0x01, 0x23, 0x23, 0x02, 0x04, 0x56, 0x45, 0x02, 0x07, 0x89]);
        assert_eq!(unpack(&desc, &bytes).unwrap(), value);
    }

    #[test]
    fn unsigned_with_tolerated_leading_zero() {
        let mut b = DescBuilder::sequence("U");
        b.reg_scalar("v", 0x01, ScalarKind::Uint32).unwrap();
        let desc = b.build().unwrap();
        let bytes = vec![0x01, 0x05, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let v = unpack(&desc, &bytes).unwrap();
        assert_eq!(v, Value::Sequence(vec![Some(Value::Int(0xFFFFFFFFu32 as i64))]));
    }

    #[test]
    fn unknown_mandatory_tag_fails() {
        let desc = seq1();
        let bytes = vec![0xEE, 0x01, 0x00];
        assert!(unpack(&desc, &bytes).is_err());
    }

    #[test]
    fn out_of_range_constrained_integer_is_rejected() {
        let mut b = DescBuilder::sequence("Bounded");
        b.reg_scalar("n", 0x01, ScalarKind::Int32).unwrap();
        b.set_int_min_max(0, 10).unwrap();
        let desc = b.build().unwrap();

        let value = Value::Sequence(vec![Some(Value::Int(11))]);
        let err = pack(&desc, &value).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation { .. }));
    }

    #[test]
    fn semi_constrained_integer_below_min_is_rejected() {
        let mut b = DescBuilder::sequence("SemiBounded");
        b.reg_scalar("n", 0x01, ScalarKind::Int32).unwrap();
        b.set_int_min(0).unwrap();
        let desc = b.build().unwrap();

        let value = Value::Sequence(vec![Some(Value::Int(-1))]);
        let err = pack(&desc, &value).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation { .. }));
    }

    #[test]
    fn semi_constrained_integer_within_min_round_trips() {
        let mut b = DescBuilder::sequence("SemiBoundedOk");
        b.reg_scalar("n", 0x01, ScalarKind::Int32).unwrap();
        b.set_int_min(0).unwrap();
        let desc = b.build().unwrap();

        let value = Value::Sequence(vec![Some(Value::Int(42))]);
        let bytes = pack(&desc, &value).unwrap();
        assert_eq!(unpack(&desc, &bytes).unwrap(), value);
    }
}
