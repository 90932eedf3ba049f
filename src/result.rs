use thiserror::Error;

pub type Result<A, E = Error> = std::result::Result<A, E>;

/// Errors raised while registering a type descriptor. These only ever
/// surface at program init time, never while encoding or decoding a value.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("{container}.{field}: a SEQ_OF field cannot share a level with a non-SEQ_OF field")]
    IllegalAdjacency { container: &'static str, field: &'static str },
    #[error("{container}: duplicate BER tag 0x{tag:02x} on choice alternative {field}")]
    DuplicateChoiceTag { container: &'static str, field: &'static str, tag: u8 },
    #[error("{container}: enum value {value} registered twice")]
    DuplicateEnumValue { container: &'static str, value: i64 },
    #[error("{container}: enum table holds more than 256 values")]
    EnumTooLarge { container: &'static str },
    #[error("{container}.{field}: bound annotator applied to a field of the wrong kind")]
    WrongFieldKind { container: &'static str, field: &'static str },
    #[error("{container}: CHOICE needs a selector field and at least one alternative")]
    ChoiceTooFewFields { container: &'static str },
    #[error("{container}: int_info.min must be <= int_info.max")]
    InvalidIntBounds { container: &'static str },
    #[error("{container}: a SEQUENCE_OF descriptor must register exactly one repeated field")]
    SeqOfWrongArity { container: &'static str },
}

/// Errors raised while encoding or decoding a value against a registered
/// descriptor.
#[derive(Debug, Error)]
pub enum Error {
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("malformed header in {context}: {detail}")]
    MalformedHeader { context: &'static str, detail: String },

    #[error("short read in {context}: needed {needed} bytes, had {available}")]
    ShortRead {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("constraint violation on {field}: {detail}")]
    ConstraintViolation { field: &'static str, detail: String },

    #[error("unknown enum value {value} for {field}")]
    UnknownEnum { field: &'static str, value: i64 },

    #[error("no CHOICE alternative matches discriminator in {container}")]
    ChoiceMiss { container: &'static str },

    #[error("PER extension-present bit set on {container}, which this codec cannot receive")]
    ExtensionUnsupported { container: &'static str },

    #[error("PER segmented length >= 16384 is not supported ({field})")]
    FragmentationUnsupported { field: &'static str },

    #[error("unimplemented: {0}")]
    Unimplemented(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
