use refbind::{Bind, Moved, ReadOnly, Value};

#[derive(refbind::TypeInfo, Clone, Copy, Debug, PartialEq)]
struct Small {
    x: u32,
    y: u32,
}

#[derive(refbind::TypeInfo, Clone, Debug, PartialEq)]
struct Large {
    name: String,
    items: [u64; 8],
}

fn large() -> Large {
    Large {
        name: "large".to_string(),
        items: [7; 8],
    }
}

#[test]
pub fn test_round_trip_inline() {
    let small = Small { x: 1, y: 2 };
    let value = Value::owned(small);
    assert_eq!(value.get::<Small>(), small);
    assert_eq!(value.get::<ReadOnly<Small>>().into_inner(), small);
    assert_eq!(*value.get::<&Small>(), small);
    assert_eq!(value.into_typed::<Small>(), small);
}

#[test]
pub fn test_round_trip_boxed() {
    let value = Value::owned(large());
    assert_eq!(value.get::<Large>(), large());
    assert_eq!(value.get::<&Large>().name, "large");
    assert_eq!(value.into_typed::<Large>(), large());
}

#[test]
pub fn test_copy_is_independent() {
    let original = Value::owned(large());
    let mut copy = original.clone();

    copy.get_mut::<Moved<Large>>().name.push_str("-copy");

    assert_eq!(original.get::<&Large>().name, "large");
    assert_eq!(copy.get::<&Large>().name, "large-copy");
}

#[test]
pub fn test_move_leaves_null() {
    let mut original = Value::owned("text".to_string());
    let moved = original.take();

    assert!(original.is_null());
    assert!(original.type_desc().is_none());
    assert_eq!(moved.get::<String>(), "text");
}

#[test]
pub fn test_borrowed_value_aliases() {
    let mut small = Small { x: 1, y: 2 };
    let value = (&mut small).into_value();
    assert!(value.is_borrowed());

    let alias: &mut Small = value.into_typed();
    alias.x = 10;
    assert_eq!(small.x, 10);
}

#[test]
pub fn test_unique_borrow_from_mutable_value() {
    let mut small = Small { x: 1, y: 2 };
    let mut value = (&mut small).into_value();

    value.get_mut::<&mut Small>().y = 20;
    assert_eq!(value.get::<&Small>().y, 20);
    value.get_mut::<&mut Small>().x = 10;
    drop(value);
    assert_eq!(small, Small { x: 10, y: 20 });
}

#[test]
pub fn test_read_only_borrow_copies_alias() {
    let small = Small { x: 1, y: 2 };
    let value = (&small).into_value();
    let copy = value.clone();
    assert!(std::ptr::eq(copy.into_typed::<&Small>(), &small));
    assert_eq!(value.get::<Small>(), small);
}

#[test]
#[should_panic(expected = "cannot copy a value holding unique reference")]
pub fn test_unique_borrow_is_not_copied() {
    let mut small = Small { x: 1, y: 2 };
    let value = Moved::new(&mut small).into_value();
    let _copy = value.clone();
}

#[test]
pub fn test_borrowed_value_keeps_category() {
    let small = Small { x: 1, y: 2 };
    let value = (&small).into_value();
    assert_eq!(value.type_desc().map(|desc| desc.name()), Some("&test_value::Small"));
    assert_eq!(value.get::<Small>(), small);
}

#[test]
pub fn test_unit_is_null() {
    assert!(().into_value().is_null());
    assert!(Value::default().is_null());
}

#[test]
#[should_panic(expected = "cannot extract from a null value")]
pub fn test_extract_from_null() {
    Value::null().get::<u32>();
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_extract_other_type() {
    Value::owned(1u32).get::<u64>();
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_extract_read_only_as_mutable() {
    Value::owned(ReadOnly::new(1u32)).get_mut::<Moved<u32>>();
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_extract_owned_as_lvalue() {
    Value::owned(large()).get_mut::<&mut Large>();
}

#[test]
#[should_panic(expected = "consumed owning value")]
pub fn test_consume_owned_as_reference() {
    Value::owned(large()).into_typed::<&Large>();
}
