//! Universal-class tag numbers, per ITU-T X.690 §8 and the tag catalogue
//! in the spec this crate implements.

pub const TAG_BOOLEAN: u8 = 1;
pub const TAG_INTEGER: u8 = 2;
pub const TAG_BIT_STRING: u8 = 3;
pub const TAG_OCTET_STRING: u8 = 4;
pub const TAG_NULL: u8 = 5;
pub const TAG_OBJECT_IDENTIFIER: u8 = 6;
pub const TAG_ENUMERATED: u8 = 10;
pub const TAG_UTF8_STRING: u8 = 12;
pub const TAG_SEQUENCE: u8 = 16;
pub const TAG_SET: u8 = 17;
pub const TAG_PRINTABLE_STRING: u8 = 19;
pub const TAG_IA5_STRING: u8 = 22;
pub const TAG_UTC_TIME: u8 = 23;
pub const TAG_GENERALIZED_TIME: u8 = 24;

/// Bit 5 of the tag octet: 1 for constructed, 0 for primitive.
pub const FLAG_CONSTRUCTED: u8 = 0x20;

/// End-of-contents marker terminating an indefinite-length BER value.
pub const EOC: [u8; 2] = [0x00, 0x00];

/// PER fragmentation threshold (§4.4.1): lengths at or above this value
/// would require segmented encoding, which this codec does not support.
pub const PER_FRAGMENTATION_THRESHOLD: usize = 1 << 14;
