//! Component A: the descriptor registry. A [`Descriptor`] is pure data
//! describing the shape, tags, modes, and constraints of one structured
//! ASN.1 type. It is built once via [`crate::builders`] and shared
//! read-only (`Arc<Descriptor>`) by the BER and PER codecs.

use std::sync::Arc;

use crate::result::RegistrationError as RErr;
use crate::result::Result;
use crate::utils::bit_length;
use crate::value::Value;

/// Whether a field is present unconditionally, optionally, or repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Mandatory,
    Optional,
    SeqOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullKind {
    Null,
    OptNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Octet,
    Char,
    Bit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    Sequence,
    Choice,
    UntaggedChoice,
}

/// The kind of a field, grouping the scalar/null/string/composite/
/// extensibility families described in the data model.
#[derive(Debug, Clone)]
pub enum Kind {
    Scalar(ScalarKind),
    Null(NullKind),
    String(StringKind),
    Composite(CompositeKind),
    /// External sub-descriptor, deferred to a separately registered type.
    Ext,
    Opaque(Arc<OpaqueHooks>),
    /// Never emitted; scanned past on decode.
    Skip,
    OpenType,
}

/// Caller-supplied size/pack/unpack hooks for a type outside the built-in
/// kind system (§4.5, "Opaque").
pub struct OpaqueHooks {
    pub pack_size: Box<dyn Fn(&Value) -> Result<usize> + Send + Sync>,
    pub pack: Box<dyn Fn(&Value) -> Result<Vec<u8>> + Send + Sync>,
    pub unpack: Box<dyn Fn(&[u8]) -> Result<Value> + Send + Sync>,
}

impl std::fmt::Debug for OpaqueHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpaqueHooks").finish_non_exhaustive()
    }
}

/// The `{min, max, extended?, ext_min, ext_max}` constraint annex shared,
/// per the data model, by integer, string-length, and seq-of-count bounds.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
    pub extended: bool,
    pub ext_min: i64,
    pub ext_max: i64,
    pub constrained: bool,
    pub d_max: u64,
    pub max_blen: u32,
    pub max_olen_blen: u32,
}

pub type IntInfo = Bounds;
pub type StrInfo = Bounds;
pub type SeqOfInfo = Bounds;

impl Bounds {
    pub fn new(min: i64, max: i64) -> Self {
        let mut b = Bounds {
            min,
            max,
            extended: false,
            ext_min: 0,
            ext_max: 0,
            constrained: false,
            d_max: 0,
            max_blen: 0,
            max_olen_blen: 0,
        };
        b.recompute();
        b
    }

    pub fn set_min(&mut self, min: i64) {
        self.min = min;
        self.recompute();
    }

    pub fn set_max(&mut self, max: i64) {
        self.max = max;
        self.recompute();
    }

    pub fn set_extended(&mut self, ext_min: i64, ext_max: i64) {
        self.extended = true;
        self.ext_min = ext_min;
        self.ext_max = ext_max;
    }

    /// Recomputes `constrained`, `d_max`, `max_blen`, `max_olen_blen` from
    /// `min`/`max`, per §4.1's algorithm.
    fn recompute(&mut self) {
        self.constrained = self.min != i64::MIN && self.max != i64::MAX;
        if !self.constrained {
            self.d_max = 0;
            self.max_blen = 0;
            self.max_olen_blen = 0;
            return;
        }
        self.d_max = (self.max - self.min) as u64;
        self.max_blen = bit_length(self.d_max);
        let max_olen = crate::utils::u64_olen(self.d_max) as u64;
        self.max_olen_blen = bit_length(max_olen.saturating_sub(1));
    }
}

/// Ordered, deduplicated value table for an ENUMERATED field (§3).
#[derive(Debug, Default, Clone)]
pub struct EnumInfo {
    values: Vec<i64>,
    extended: bool,
    root_blen: u32,
}

impl EnumInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_value(&mut self, container: &'static str, v: i64) -> Result<()> {
        if self.values.len() >= 256 {
            return Err(RErr::EnumTooLarge { container }.into());
        }
        if self.values.contains(&v) {
            return Err(RErr::DuplicateEnumValue { container, value: v }.into());
        }
        self.values.push(v);
        self.recompute_blen();
        Ok(())
    }

    pub fn set_extended(&mut self, extended: bool) {
        self.extended = extended;
    }

    fn recompute_blen(&mut self) {
        let n = self.values.len();
        self.root_blen = if n <= 1 { 0 } else { bit_length((n - 1) as u64) };
    }

    pub fn index_of(&self, v: i64) -> Option<usize> {
        self.values.iter().position(|&x| x == v)
    }

    pub fn value_at(&self, index: usize) -> Option<i64> {
        self.values.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn root_blen(&self) -> u32 {
        self.root_blen
    }

    pub fn extended(&self) -> bool {
        self.extended
    }
}

/// One field of a [`Descriptor`]. For CHOICE descriptors, each entry is an
/// alternative (the discriminator itself has no on-wire representation in
/// this Rust rendering: `Value::Choice` carries the selected index
/// directly, replacing the original's stored selector struct field).
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub container: &'static str,
    pub tag: u8,
    pub mode: Mode,
    pub kind: Kind,
    /// Arena-pointer vs inline storage in the original engine; here it
    /// selects whether `SeqOf`/`Ext` elements are represented as
    /// [`crate::value::Slot::Boxed`] (array-of-pointers) or
    /// [`crate::value::Slot::Inline`] (contiguous vector).
    pub pointed: bool,
    pub int_info: Option<IntInfo>,
    pub str_info: Option<StrInfo>,
    pub seq_of_info: Option<SeqOfInfo>,
    pub enum_info: Option<Arc<EnumInfo>>,
    pub is_open_type: bool,
    pub open_type_buf_len: Option<usize>,
    pub sub_descriptor: Option<Arc<Descriptor>>,
}

impl FieldDescriptor {
    pub(crate) fn new(container: &'static str, name: &'static str, tag: u8, mode: Mode, kind: Kind) -> Self {
        Self {
            name,
            container,
            tag,
            mode,
            kind,
            pointed: false,
            int_info: None,
            str_info: None,
            seq_of_info: None,
            enum_info: None,
            is_open_type: false,
            open_type_buf_len: None,
            sub_descriptor: None,
        }
    }

    pub fn is_integer_kind(&self) -> bool {
        matches!(self.kind, Kind::Scalar(k) if k != ScalarKind::Bool && k != ScalarKind::Enum)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescKind {
    Sequence,
    Choice,
    Set,
}

/// A type descriptor: the shape and constraints driving both the BER and
/// PER codecs for one structured type (§3).
#[derive(Debug)]
pub struct Descriptor {
    pub name: &'static str,
    pub kind: DescKind,
    pub fields: Vec<FieldDescriptor>,
    pub is_seq_of: bool,
    pub extended: bool,
    /// Tag-byte -> 1-based alternative index dispatch table for CHOICE.
    pub choice_table: Option<Box<[u8; 256]>>,
    /// Integer info describing the `[0, n_root - 1]` choice-index range.
    pub choice_int_info: Option<Bounds>,
    /// Registration-order positions of OPTIONAL fields.
    pub opt_fields: Vec<usize>,
}

impl Descriptor {
    pub(crate) fn new(name: &'static str, kind: DescKind) -> Self {
        Self {
            name,
            kind,
            fields: Vec::new(),
            is_seq_of: false,
            extended: false,
            choice_table: None,
            choice_int_info: None,
            opt_fields: Vec::new(),
        }
    }

    /// Appends a field, enforcing the SEQUENCE/SEQ_OF adjacency invariant
    /// and caching the OPTIONAL field position list (§4.1).
    pub(crate) fn register_field(&mut self, field: FieldDescriptor) -> Result<()> {
        if let Some(last) = self.fields.last() {
            let last_is_seq_of = last.mode == Mode::SeqOf;
            let new_is_seq_of = field.mode == Mode::SeqOf;
            if last_is_seq_of != new_is_seq_of {
                return Err(RErr::IllegalAdjacency {
                    container: self.name,
                    field: field.name,
                }
                .into());
            }
        }
        if field.mode == Mode::Optional {
            self.opt_fields.push(self.fields.len());
        }
        self.fields.push(field);
        Ok(())
    }

    /// Builds the 256-entry tag dispatch table for a CHOICE descriptor,
    /// recursing into nested UNTAGGED_CHOICE alternatives (§4.1).
    pub(crate) fn build_choice_table(&mut self) -> Result<()> {
        let mut table = Box::new([0u8; 256]);
        Self::fill_choice_table(self.name, &self.fields, &mut table)?;
        self.choice_table = Some(table);
        self.choice_int_info = Some(Bounds::new(0, self.fields.len().saturating_sub(1) as i64));
        Ok(())
    }

    fn fill_choice_table(container: &'static str, fields: &[FieldDescriptor], table: &mut [u8; 256]) -> Result<()> {
        for (i, f) in fields.iter().enumerate() {
            let alt_index = (i + 1) as u8;
            Self::register_alternative(container, f, alt_index, table)?;
        }
        Ok(())
    }

    /// Registers a single alternative's tag(s) under `alt_index`,
    /// recursing into nested UNTAGGED_CHOICE sub-alternatives so they all
    /// dispatch back to the outer index.
    fn register_alternative(
        container: &'static str,
        field: &FieldDescriptor,
        alt_index: u8,
        table: &mut [u8; 256],
    ) -> Result<()> {
        if matches!(field.kind, Kind::Composite(CompositeKind::UntaggedChoice)) {
            if let Some(sub) = &field.sub_descriptor {
                for sub_field in &sub.fields {
                    Self::register_alternative(container, sub_field, alt_index, table)?;
                }
            }
            return Ok(());
        }
        if table[field.tag as usize] != 0 {
            return Err(RErr::DuplicateChoiceTag {
                container,
                field: field.name,
                tag: field.tag,
            }
            .into());
        }
        table[field.tag as usize] = alt_index;
        Ok(())
    }
}
