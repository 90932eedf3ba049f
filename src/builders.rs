//! The registration DSL (§6.1): a declarative builder over
//! [`crate::descriptor::Descriptor`] that returns typed
//! [`RegistrationError`]s instead of the original engine's fatal asserts.
//!
//! A descriptor is built once, at startup, and shared read-only
//! thereafter via the `Arc<Descriptor>` returned by [`DescBuilder::build`].

use std::sync::Arc;

use crate::descriptor::{
    Bounds, CompositeKind, DescKind, Descriptor, EnumInfo, FieldDescriptor, Kind, Mode, NullKind, OpaqueHooks,
    ScalarKind, StringKind,
};
use crate::result::{Error, RegistrationError as RErr, Result};

/// Builder for a SEQUENCE, CHOICE, SET, or SEQUENCE OF type descriptor.
#[derive(Debug)]
pub struct DescBuilder {
    desc: Descriptor,
}

impl DescBuilder {
    pub fn sequence(name: &'static str) -> Self {
        Self { desc: Descriptor::new(name, DescKind::Sequence) }
    }

    pub fn set(name: &'static str) -> Self {
        Self { desc: Descriptor::new(name, DescKind::Set) }
    }

    /// `selector_field` names the discriminator for diagnostics only: in
    /// this Rust rendering the discriminator has no stored field, since
    /// `Value::Choice`'s own tag plays that role (see `descriptor.rs`).
    pub fn choice(name: &'static str, _selector_field: &'static str) -> Self {
        Self { desc: Descriptor::new(name, DescKind::Choice) }
    }

    pub fn seq_of(name: &'static str) -> Self {
        let mut desc = Descriptor::new(name, DescKind::Sequence);
        desc.is_seq_of = true;
        Self { desc }
    }

    pub fn extensible(mut self) -> Self {
        self.desc.extended = true;
        self
    }

    fn name(&self) -> &'static str {
        self.desc.name
    }

    fn push(&mut self, field: FieldDescriptor) -> Result<&mut Self> {
        self.desc.register_field(field)?;
        Ok(self)
    }

    fn last_field(&mut self) -> Result<&mut FieldDescriptor> {
        let container = self.name();
        self.desc
            .fields
            .last_mut()
            .ok_or(Error::Registration(RErr::ChoiceTooFewFields { container }))
    }

    // ---- scalar / null fields ----

    pub fn reg_scalar(&mut self, name: &'static str, tag: u8, kind: ScalarKind) -> Result<&mut Self> {
        let field = FieldDescriptor::new(self.name(), name, tag, Mode::Mandatory, Kind::Scalar(kind));
        self.push(field)
    }

    pub fn reg_opt_scalar(&mut self, name: &'static str, tag: u8, kind: ScalarKind) -> Result<&mut Self> {
        let field = FieldDescriptor::new(self.name(), name, tag, Mode::Optional, Kind::Scalar(kind));
        self.push(field)
    }

    pub fn reg_null(&mut self, name: &'static str, tag: u8) -> Result<&mut Self> {
        let field = FieldDescriptor::new(self.name(), name, tag, Mode::Mandatory, Kind::Null(NullKind::Null));
        self.push(field)
    }

    pub fn reg_opt_null(&mut self, name: &'static str, tag: u8) -> Result<&mut Self> {
        let field = FieldDescriptor::new(self.name(), name, tag, Mode::Optional, Kind::Null(NullKind::OptNull));
        self.push(field)
    }

    // ---- enum fields ----

    pub fn reg_enum(&mut self, name: &'static str, tag: u8) -> Result<&mut Self> {
        let mut field = FieldDescriptor::new(self.name(), name, tag, Mode::Mandatory, Kind::Scalar(ScalarKind::Enum));
        field.enum_info = Some(Arc::new(EnumInfo::new()));
        self.push(field)
    }

    /// Registers every value of `values` on the enum field just added via
    /// [`Self::reg_enum`] (the registration-DSL equivalent of repeated
    /// `enum_register_value` calls).
    pub fn set_enum_values(&mut self, values: &[i64]) -> Result<&mut Self> {
        let container = self.name();
        let field = self.last_field()?;
        let info = Arc::get_mut(field.enum_info.as_mut().ok_or(Error::Registration(RErr::WrongFieldKind {
            container,
            field: field.name,
        }))?)
        .expect("enum_info is not yet shared");
        for &v in values {
            info.register_value(container, v)?;
        }
        Ok(self)
    }

    pub fn set_enum_extended(&mut self, extended: bool) -> Result<&mut Self> {
        let container = self.name();
        let field = self.last_field()?;
        let info = Arc::get_mut(field.enum_info.as_mut().ok_or(Error::Registration(RErr::WrongFieldKind {
            container,
            field: field.name,
        }))?)
        .expect("enum_info is not yet shared");
        info.set_extended(extended);
        Ok(self)
    }

    // ---- string fields ----

    pub fn reg_string(&mut self, name: &'static str, tag: u8, kind: StringKind) -> Result<&mut Self> {
        let field = FieldDescriptor::new(self.name(), name, tag, Mode::Mandatory, Kind::String(kind));
        self.push(field)
    }

    pub fn reg_opt_string(&mut self, name: &'static str, tag: u8, kind: StringKind) -> Result<&mut Self> {
        let field = FieldDescriptor::new(self.name(), name, tag, Mode::Optional, Kind::String(kind));
        self.push(field)
    }

    pub fn reg_bit_string(&mut self, name: &'static str, tag: u8) -> Result<&mut Self> {
        self.reg_string(name, tag, StringKind::Bit)
    }

    // ---- composite fields ----

    pub fn reg_sequence(&mut self, name: &'static str, tag: u8, child: Arc<Descriptor>) -> Result<&mut Self> {
        let mut field = FieldDescriptor::new(
            self.name(),
            name,
            tag,
            Mode::Mandatory,
            Kind::Composite(CompositeKind::Sequence),
        );
        field.sub_descriptor = Some(child);
        self.push(field)
    }

    pub fn reg_opt_sequence(&mut self, name: &'static str, tag: u8, child: Arc<Descriptor>) -> Result<&mut Self> {
        let mut field =
            FieldDescriptor::new(self.name(), name, tag, Mode::Optional, Kind::Composite(CompositeKind::Sequence));
        field.sub_descriptor = Some(child);
        self.push(field)
    }

    pub fn reg_choice(&mut self, name: &'static str, tag: u8, child: Arc<Descriptor>) -> Result<&mut Self> {
        let mut field =
            FieldDescriptor::new(self.name(), name, tag, Mode::Mandatory, Kind::Composite(CompositeKind::Choice));
        field.sub_descriptor = Some(child);
        self.push(field)
    }

    /// Registers `child`'s alternatives directly into this descriptor's
    /// dispatch table, without an outer tag envelope (§4.1).
    pub fn reg_untagged_choice(&mut self, name: &'static str, child: Arc<Descriptor>) -> Result<&mut Self> {
        let mut field = FieldDescriptor::new(
            self.name(),
            name,
            0,
            Mode::Mandatory,
            Kind::Composite(CompositeKind::UntaggedChoice),
        );
        field.sub_descriptor = Some(child);
        self.push(field)
    }

    pub fn reg_seq_of_scalar(&mut self, name: &'static str, tag: u8, kind: ScalarKind, pointed: bool) -> Result<&mut Self> {
        let mut field = FieldDescriptor::new(self.name(), name, tag, Mode::SeqOf, Kind::Scalar(kind));
        field.pointed = pointed;
        self.push(field)
    }

    pub fn reg_seq_of_string(&mut self, name: &'static str, tag: u8, kind: StringKind, pointed: bool) -> Result<&mut Self> {
        let mut field = FieldDescriptor::new(self.name(), name, tag, Mode::SeqOf, Kind::String(kind));
        field.pointed = pointed;
        self.push(field)
    }

    pub fn reg_seq_of_sequence(&mut self, name: &'static str, tag: u8, child: Arc<Descriptor>, pointed: bool) -> Result<&mut Self> {
        let mut field = FieldDescriptor::new(self.name(), name, tag, Mode::SeqOf, Kind::Composite(CompositeKind::Sequence));
        field.sub_descriptor = Some(child);
        field.pointed = pointed;
        self.push(field)
    }

    pub fn reg_seq_of_choice(&mut self, name: &'static str, tag: u8, child: Arc<Descriptor>, pointed: bool) -> Result<&mut Self> {
        let mut field = FieldDescriptor::new(self.name(), name, tag, Mode::SeqOf, Kind::Composite(CompositeKind::Choice));
        field.sub_descriptor = Some(child);
        field.pointed = pointed;
        self.push(field)
    }

    // ---- extensibility fields ----

    pub fn reg_ext(&mut self, name: &'static str, tag: u8, child: Arc<Descriptor>) -> Result<&mut Self> {
        let mut field = FieldDescriptor::new(self.name(), name, tag, Mode::Mandatory, Kind::Ext);
        field.sub_descriptor = Some(child);
        self.push(field)
    }

    pub fn reg_opt_ext(&mut self, name: &'static str, tag: u8, child: Arc<Descriptor>) -> Result<&mut Self> {
        let mut field = FieldDescriptor::new(self.name(), name, tag, Mode::Optional, Kind::Ext);
        field.sub_descriptor = Some(child);
        self.push(field)
    }

    pub fn reg_opaque(&mut self, name: &'static str, tag: u8, hooks: OpaqueHooks) -> Result<&mut Self> {
        let field = FieldDescriptor::new(self.name(), name, tag, Mode::Mandatory, Kind::Opaque(Arc::new(hooks)));
        self.push(field)
    }

    pub fn reg_skip(&mut self, name: &'static str, tag: u8) -> Result<&mut Self> {
        let field = FieldDescriptor::new(self.name(), name, tag, Mode::Mandatory, Kind::Skip);
        self.push(field)
    }

    // ---- constraint annotators ----

    fn int_info_mut(&mut self) -> Result<&mut Bounds> {
        let container = self.name();
        let field = self.last_field()?;
        if !field.is_integer_kind() {
            return Err(RErr::WrongFieldKind { container, field: field.name }.into());
        }
        Ok(field.int_info.get_or_insert_with(|| Bounds::new(i64::MIN, i64::MAX)))
    }

    pub fn set_int_min(&mut self, min: i64) -> Result<&mut Self> {
        self.int_info_mut()?.set_min(min);
        self.validate_last_int_bounds()
    }

    pub fn set_int_max(&mut self, max: i64) -> Result<&mut Self> {
        self.int_info_mut()?.set_max(max);
        self.validate_last_int_bounds()
    }

    pub fn set_int_min_max(&mut self, min: i64, max: i64) -> Result<&mut Self> {
        let info = self.int_info_mut()?;
        info.set_min(min);
        info.set_max(max);
        self.validate_last_int_bounds()
    }

    pub fn set_int_extended(&mut self, ext_min: i64, ext_max: i64) -> Result<&mut Self> {
        self.int_info_mut()?.set_extended(ext_min, ext_max);
        Ok(self)
    }

    fn validate_last_int_bounds(&mut self) -> Result<&mut Self> {
        let container = self.name();
        let info = self.last_field()?.int_info.as_ref().expect("int_info just set");
        if info.min > info.max {
            return Err(RErr::InvalidIntBounds { container }.into());
        }
        Ok(self)
    }

    fn str_info_mut(&mut self) -> Result<&mut Bounds> {
        let container = self.name();
        let field = self.last_field()?;
        if !matches!(field.kind, Kind::String(_)) {
            return Err(RErr::WrongFieldKind { container, field: field.name }.into());
        }
        Ok(field.str_info.get_or_insert_with(|| Bounds::new(0, i64::MAX)))
    }

    pub fn set_str_min(&mut self, min: i64) -> Result<&mut Self> {
        self.str_info_mut()?.set_min(min);
        Ok(self)
    }

    pub fn set_str_max(&mut self, max: i64) -> Result<&mut Self> {
        self.str_info_mut()?.set_max(max);
        Ok(self)
    }

    pub fn set_str_min_max(&mut self, min: i64, max: i64) -> Result<&mut Self> {
        let info = self.str_info_mut()?;
        info.set_min(min);
        info.set_max(max);
        Ok(self)
    }

    pub fn set_str_extended(&mut self, ext_min: i64, ext_max: i64) -> Result<&mut Self> {
        self.str_info_mut()?.set_extended(ext_min, ext_max);
        Ok(self)
    }

    fn seq_of_info_mut(&mut self) -> Result<&mut Bounds> {
        let container = self.name();
        let field = self.last_field()?;
        if field.mode != Mode::SeqOf {
            return Err(RErr::WrongFieldKind { container, field: field.name }.into());
        }
        Ok(field.seq_of_info.get_or_insert_with(|| Bounds::new(0, i64::MAX)))
    }

    pub fn set_seq_of_min(&mut self, min: i64) -> Result<&mut Self> {
        self.seq_of_info_mut()?.set_min(min);
        Ok(self)
    }

    pub fn set_seq_of_max(&mut self, max: i64) -> Result<&mut Self> {
        self.seq_of_info_mut()?.set_max(max);
        Ok(self)
    }

    pub fn set_seq_of_min_max(&mut self, min: i64, max: i64) -> Result<&mut Self> {
        let info = self.seq_of_info_mut()?;
        info.set_min(min);
        info.set_max(max);
        Ok(self)
    }

    pub fn set_seq_of_extended(&mut self, ext_min: i64, ext_max: i64) -> Result<&mut Self> {
        self.seq_of_info_mut()?.set_extended(ext_min, ext_max);
        Ok(self)
    }

    pub fn set_open_type(&mut self, buf_bytes: usize) -> Result<&mut Self> {
        let field = self.last_field()?;
        field.is_open_type = true;
        field.open_type_buf_len = Some(buf_bytes);
        Ok(self)
    }

    /// Finalizes the descriptor: builds the CHOICE dispatch table and
    /// checks the SEQUENCE_OF single-field arity invariant.
    pub fn build(mut self) -> Result<Arc<Descriptor>> {
        match self.desc.kind {
            DescKind::Choice => {
                if self.desc.fields.is_empty() {
                    return Err(RErr::ChoiceTooFewFields { container: self.desc.name }.into());
                }
                self.desc.build_choice_table()?;
            }
            DescKind::Sequence | DescKind::Set => {
                if self.desc.is_seq_of && self.desc.fields.len() != 1 {
                    return Err(RErr::SeqOfWrongArity { container: self.desc.name }.into());
                }
            }
        }
        Ok(Arc::new(self.desc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_rejects_seq_of_adjacent_to_mandatory() {
        let mut b = DescBuilder::sequence("Bad");
        b.reg_seq_of_scalar("items", 0x01, ScalarKind::Int32, false).unwrap();
        let err = b.reg_scalar("tail", 0x02, ScalarKind::Int32).unwrap_err();
        assert!(matches!(err, Error::Registration(RErr::IllegalAdjacency { .. })));
    }

    #[test]
    fn choice_rejects_duplicate_tags() {
        let alt_a = DescBuilder::sequence("AltA").build().unwrap();
        let alt_b = DescBuilder::sequence("AltB").build().unwrap();
        let mut b = DescBuilder::choice("Dup", "selector");
        b.reg_sequence("a", 0x30, alt_a).unwrap();
        b.reg_sequence("b", 0x30, alt_b).unwrap();
        let err = b.build().unwrap_err();
        assert!(matches!(err, Error::Registration(RErr::DuplicateChoiceTag { .. })));
    }

    #[test]
    fn seq_of_requires_single_field() {
        let b = DescBuilder::seq_of("Empty");
        let err = b.build().unwrap_err();
        assert!(matches!(err, Error::Registration(RErr::SeqOfWrongArity { .. })));
    }

    #[test]
    fn enum_registration_rejects_duplicate_values() {
        let mut b = DescBuilder::sequence("WithEnum");
        b.reg_enum("e", 0x0F).unwrap();
        let err = b.set_enum_values(&[0, 1, 1]).unwrap_err();
        assert!(matches!(err, Error::Registration(RErr::DuplicateEnumValue { .. })));
    }

    #[test]
    fn int_bounds_validate_min_le_max() {
        let mut b = DescBuilder::sequence("Int");
        b.reg_scalar("n", 0x01, ScalarKind::Int32).unwrap();
        let err = b.set_int_min_max(10, 5).unwrap_err();
        assert!(matches!(err, Error::Registration(RErr::InvalidIntBounds { .. })));
    }
}
