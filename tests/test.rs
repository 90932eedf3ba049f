use std::sync::Arc;

use asn1_codec::builders::DescBuilder;
use asn1_codec::descriptor::{Descriptor, ScalarKind};
use asn1_codec::result::{Error, RegistrationError};
use asn1_codec::value::{BitString, Slot, Value};
use asn1_codec::{pack, pack_size, per_decode, per_encode, unpack};

/// A small CHOICE used as the element type of a SEQUENCE OF below.
fn event_descriptor() -> Arc<Descriptor> {
    let login = DescBuilder::sequence("Login").build().unwrap();
    let mut logout = DescBuilder::sequence("Logout");
    logout.reg_scalar("code", 0x01, ScalarKind::Int32).unwrap();
    let logout = logout.build().unwrap();

    let mut b = DescBuilder::choice("Event", "kind");
    b.reg_sequence("login", 0xA0, login).unwrap();
    b.reg_sequence("logout", 0xA1, logout).unwrap();
    b.build().unwrap()
}

/// A SEQUENCE OF `Event`, standing alone per the SEQUENCE_OF single-field
/// arity invariant, then embedded as an ordinary sequence field below.
fn event_list_descriptor() -> Arc<Descriptor> {
    let event = event_descriptor();
    let mut b = DescBuilder::seq_of("EventList");
    b.reg_seq_of_choice("events", 0x84, event, false).unwrap();
    b.set_seq_of_min_max(0, 4).unwrap();
    b.build().unwrap()
}

/// A SEQUENCE combining every field family the codec supports: a
/// mandatory integer, an optional scalar, an enumerated value, a bit
/// string, and a nested SEQUENCE OF CHOICE.
fn session_descriptor() -> Arc<Descriptor> {
    let events = event_list_descriptor();
    let mut b = DescBuilder::sequence("Session");
    b.reg_scalar("id", 0x80, ScalarKind::Int32).unwrap();
    b.set_int_min_max(0, 1000).unwrap();
    b.reg_opt_scalar("nickname_len", 0x81, ScalarKind::Uint8).unwrap();
    b.reg_enum("role", 0x82).unwrap();
    b.set_enum_values(&[0, 1, 2]).unwrap();
    b.reg_bit_string("flags", 0x83).unwrap();
    b.reg_sequence("events", 0xA4, events).unwrap();
    b.build().unwrap()
}

fn sample_value() -> Value {
    Value::Sequence(vec![
        Some(Value::Int(42)),
        None,
        Some(Value::Enum(1)),
        Some(Value::Bits(BitString::new(vec![0b1011_0000], 4))),
        Some(Value::SeqOf(vec![
            Slot::inline(Value::Choice { alt: 0, inner: Box::new(Value::Sequence(vec![])) }),
            Slot::inline(Value::Choice { alt: 1, inner: Box::new(Value::Sequence(vec![Some(Value::Int(7))])) }),
        ])),
    ])
}

#[test]
fn ber_roundtrip_through_every_field_family() {
    let desc = session_descriptor();
    let value = sample_value();

    let wire = pack(&desc, &value).unwrap();
    assert_eq!(pack_size(&desc, &value).unwrap(), wire.len());
    assert_eq!(unpack(&desc, &wire).unwrap(), value);
}

#[test]
fn per_roundtrip_through_every_field_family() {
    let desc = session_descriptor();
    let value = sample_value();

    let wire = per_encode(&desc, &value).unwrap();
    assert_eq!(per_decode(&desc, &wire).unwrap(), value);
}

#[test]
fn ber_and_per_agree_on_optional_present_case() {
    let desc = session_descriptor();
    let value = Value::Sequence(vec![
        Some(Value::Int(1)),
        Some(Value::Int(5)),
        Some(Value::Enum(2)),
        Some(Value::Bits(BitString::new(vec![], 0))),
        Some(Value::SeqOf(vec![])),
    ]);

    let ber_wire = pack(&desc, &value).unwrap();
    assert_eq!(unpack(&desc, &ber_wire).unwrap(), value);

    let per_wire = per_encode(&desc, &value).unwrap();
    assert_eq!(per_decode(&desc, &per_wire).unwrap(), value);
}

#[test]
fn per_rejects_value_outside_declared_constraint() {
    let desc = session_descriptor();
    let value = Value::Sequence(vec![
        Some(Value::Int(5000)),
        None,
        Some(Value::Enum(0)),
        Some(Value::Bits(BitString::new(vec![], 0))),
        Some(Value::SeqOf(vec![])),
    ]);

    let err = per_encode(&desc, &value).unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation { .. }));
}

#[test]
fn building_a_choice_with_no_alternatives_is_rejected() {
    let b = DescBuilder::choice("Empty", "kind");
    let err = b.build().unwrap_err();
    assert!(matches!(err, Error::Registration(RegistrationError::ChoiceTooFewFields { .. })));
}
