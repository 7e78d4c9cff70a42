use refbind::{Moved, Property, ReadOnly, Reflect, Volatile};

#[derive(refbind::TypeInfo, Clone, Default, Debug, PartialEq)]
pub struct Data {
    i: i32,
}

#[derive(refbind::TypeInfo, refbind::Reflect, Clone, Debug)]
pub struct St {
    a: Data,
    c_a: ReadOnly<Data>,
}

impl Default for St {
    fn default() -> Self {
        Self {
            a: Data::default(),
            c_a: ReadOnly::new(Data { i: 100 }),
        }
    }
}

#[derive(refbind::TypeInfo, refbind::Reflect, Clone, Copy, Default)]
pub struct Register {
    bits: u32,
}

fn a() -> &'static Property {
    St::registry().property("a")
}

fn c_a() -> &'static Property {
    St::registry().property("c_a")
}

fn data(i: i32) -> Data {
    Data { i }
}

#[test]
pub fn test_set_then_get() {
    let mut s = St::default();

    a().set(&mut s, data(1));
    assert_eq!(a().get::<Data>(&mut s), data(1));
    assert_eq!(a().get::<Data>(&s), data(1));

    a().set(&mut s, ReadOnly::new(data(2)));
    assert_eq!(a().get::<ReadOnly<Data>>(&s).into_inner(), data(2));

    a().set(&mut s, data(3));
    assert_eq!(*a().get::<&mut Data>(&mut s), data(3));

    a().set(&mut s, data(4));
    assert_eq!(*a().get::<&Data>(&mut s), data(4));

    a().set(&mut s, data(5));
    assert_eq!(a().get::<Moved<Data>>(Moved::new(&mut s)).take(), data(5));
    assert_eq!(s.a, Data::default());
}

#[test]
pub fn test_set_strips_value_qualifiers() {
    let mut s = St::default();

    let c_i = ReadOnly::new(data(1));
    a().set(&mut s, &c_i);
    assert_eq!(s.a, data(1));

    let mut lr_i = data(2);
    a().set(&mut s, &mut lr_i);
    assert_eq!(s.a, data(2));

    let c_lr_i = data(3);
    a().set(&mut s, &c_lr_i);
    assert_eq!(s.a, data(3));

    let mut rr_i = data(4);
    a().set(&mut s, Moved::new(&mut rr_i));
    assert_eq!(s.a, data(4));
    assert_eq!(rr_i, data(4));
}

#[test]
pub fn test_read_only_owner() {
    let c_s = ReadOnly::new(St::default());
    assert_eq!(*a().get::<&Data>(&c_s), c_s.a);
    assert_eq!(**a().get::<Moved<ReadOnly<Data>>>(Moved::new(&mut c_s.clone())), c_s.a);
}

#[test]
pub fn test_read_only_field() {
    let mut s = St::default();
    assert_eq!(*c_a().get::<&Data>(&s), *s.c_a);
    assert_eq!(c_a().get::<ReadOnly<Data>>(&mut s).into_inner(), data(100));
    assert_eq!(c_a().get::<Data>(&s), data(100));
    assert_eq!(**c_a().get::<&ReadOnly<Data>>(&mut s), data(100));
}

#[test]
pub fn test_read_only_field_through_rvalue_owner() {
    let mut s = St::default();
    let c_a_rr = c_a().get::<Moved<ReadOnly<Data>>>(Moved::new(&mut s));
    assert_eq!(**c_a_rr, data(100));
    assert_eq!(c_a_rr.into_ref().i, 100);
    assert_eq!(*s.c_a, data(100));
}

#[test]
pub fn test_shared_owner_reads_only() {
    let s = St::default();
    assert_eq!(*a().get::<&Data>(&s), Data::default());
    assert_eq!(**a().get::<&ReadOnly<Data>>(&s), Data::default());
    assert_eq!(**c_a().get::<&ReadOnly<Data>>(&s), data(100));
}

#[test]
pub fn test_write_through_reference() {
    let mut s = St::default();
    a().get::<&mut Data>(&mut s).i = 42;
    assert_eq!(s.a, data(42));
}

#[test]
pub fn test_volatile_owner() {
    let mut reg = Volatile::new(Register { bits: 7 });
    let bits = Register::registry().property("bits");
    assert_eq!(bits.get::<Volatile<u32>>(&mut reg).read(), 7);
    assert_eq!(bits.get::<u32>(&reg), 7);

    bits.get::<&mut Volatile<u32>>(&mut reg).write(9);
    assert_eq!(reg.read().bits, 9);
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_set_through_volatile_owner() {
    let mut reg = Volatile::new(Register::default());
    Register::registry().property("bits").set(&mut reg, 1u32);
}

#[test]
pub fn test_describes_field() {
    assert_eq!(a().owner().name(), "test_mutation::St");
    assert_eq!(a().field().name(), "test_mutation::Data");
    assert_eq!(St::registry().property_names(), ["a", "c_a"]);
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_rvalue_from_lvalue_owner() {
    let mut s = St::default();
    a().get::<Moved<ReadOnly<Data>>>(&mut s);
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_set_through_read_only_owner() {
    let c_s = St::default();
    a().set(&c_s, data(1));
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_set_through_rvalue_owner() {
    let mut s = St::default();
    a().set(Moved::new(&mut s), data(1));
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_set_read_only_field() {
    let mut s = St::default();
    c_a().set(&mut s, data(1));
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_rvalue_from_mutable_lvalue() {
    let mut s = St::default();
    a().get::<Moved<Data>>(&mut s);
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_lvalue_from_rvalue_owner() {
    let mut s = St::default();
    a().get::<&mut Data>(Moved::new(&mut s));
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_mutable_from_read_only_owner() {
    let c_s = ReadOnly::new(St::default());
    a().get::<&mut Data>(&c_s);
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_mutable_from_read_only_field() {
    let mut s = St::default();
    c_a().get::<&mut Data>(&mut s);
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_mutable_from_shared_owner() {
    let s = St::default();
    a().get::<&mut Data>(&s);
}

#[test]
#[should_panic(expected = "cannot be extracted as")]
pub fn test_set_value_of_other_type() {
    let mut s = St::default();
    a().set(&mut s, 1u32);
}

#[test]
#[should_panic(expected = "cannot extract from a null value")]
pub fn test_set_nothing() {
    let mut s = St::default();
    a().set(&mut s, ());
}

#[test]
#[should_panic(expected = "cannot bind to parameter")]
pub fn test_wrong_owner() {
    let mut other = data(1);
    a().get::<Data>(&mut other);
}

#[test]
#[should_panic(expected = "null property accessed")]
pub fn test_null_property() {
    let s = St::default();
    let property = St::registry().property("missing");
    assert!(property.is_null());
    property.get::<Data>(&s);
}
