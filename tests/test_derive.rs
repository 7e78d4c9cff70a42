use refbind::{args, Category, Qualifiers, Reflect, Registry, TypeInfo};

#[derive(refbind::TypeInfo, Clone, Debug, PartialEq)]
pub enum Shape {
    Circle(f32),
    Square { side: f32 },
}

#[derive(refbind::TypeInfo, refbind::Reflect, Clone)]
#[reflect(methods(area, grow))]
pub struct Test {
    a: i32,
    #[reflect(rename = "label")]
    b: String,
    #[reflect(skip)]
    #[allow(dead_code)]
    cache: Vec<u8>,
    shape: Shape,
}

impl Test {
    fn area(&self) -> f32 {
        match self.shape {
            Shape::Circle(radius) => 3.0 * radius * radius,
            Shape::Square { side } => side * side,
        }
    }

    fn grow(&mut self, by: i32) {
        self.a += by;
    }
}

#[derive(refbind::TypeInfo, refbind::Reflect, Clone, Default)]
pub struct Pair(u8, #[reflect(rename = "second")] u16);

#[derive(refbind::TypeInfo, Clone, Default)]
pub struct Counter {
    count: u64,
}

impl Counter {
    fn bump(&mut self) -> u64 {
        self.count += 1;
        self.count
    }
}

impl Reflect for Counter {
    fn register(registry: &mut Registry<Self>) {
        registry
            .add_method("bump", Counter::bump)
            .add_method("double", |n: u64| n * 2)
            .add_field("count", |c| &c.count, |c| &mut c.count);
    }

    fn registry() -> &'static Registry<Self> {
        refbind::registry!(Counter)
    }
}

#[derive(refbind::TypeInfo, Clone)]
pub struct Twice;

impl Reflect for Twice {
    fn register(registry: &mut Registry<Self>) {
        registry
            .add_method("noop", |_: &Twice| ())
            .add_method("noop", |_: &mut Twice| ());
    }

    fn registry() -> &'static Registry<Self> {
        refbind::registry!(Twice)
    }
}

fn test_value() -> Test {
    Test {
        a: 1,
        b: "b".to_string(),
        cache: Vec::new(),
        shape: Shape::Square { side: 2.0 },
    }
}

#[test]
pub fn test_name() {
    assert_eq!(Test::type_desc().name(), "test_derive::Test");
    assert_eq!(Test::type_desc().category(), Category::Owned);
    assert_eq!(Test::type_desc().qualifiers(), Qualifiers::NONE);
    assert!(Shape::type_desc().pointer_chain().is_empty());
}

#[test]
pub fn test_enumeration_order() {
    let registry = Registry::<Test>::of();
    assert_eq!(registry.property_names(), ["a", "label", "shape"]);
    assert_eq!(registry.method_names(), ["area", "grow"]);
    assert!(registry.property("b").is_null());
    assert!(registry.property("cache").is_null());
}

#[test]
pub fn test_registry_is_shared() {
    assert!(std::ptr::eq(Test::registry(), Registry::<Test>::of()));
    let from_thread = std::thread::spawn(|| Test::registry() as *const _ as usize)
        .join()
        .unwrap();
    assert_eq!(from_thread, Test::registry() as *const _ as usize);
}

#[test]
pub fn test_derived_members() {
    let mut test = test_value();
    let registry = Test::registry();

    let area: f32 = registry.method("area").call(args![&test]).get();
    assert_eq!(area, 4.0);

    registry.method("grow").call(args![&mut test, &2]);
    assert_eq!(test.a, 3);

    assert_eq!(registry.property("label").get::<String>(&test), "b");
    registry
        .property("shape")
        .set(&mut test, Shape::Circle(1.0));
    assert_eq!(test.shape, Shape::Circle(1.0));
}

#[test]
pub fn test_tuple_struct() {
    let mut pair = Pair(1, 2);
    let registry = Pair::registry();
    assert_eq!(registry.property_names(), ["0", "second"]);
    assert!(registry.method_names().is_empty());

    registry.property("0").set(&mut pair, 10u8);
    assert_eq!(pair.0, 10);
    assert_eq!(registry.property("second").get::<u16>(&pair), 2);
}

#[test]
pub fn test_hand_written() {
    let mut counter = Counter::default();
    let registry = Counter::registry();

    assert_eq!(registry.method_names(), ["bump", "double"]);
    let count: u64 = registry.method("bump").call(args![&mut counter]).get();
    assert_eq!(count, 1);

    let doubled: u64 = registry.method("double").call(args![&21u64]).get();
    assert_eq!(doubled, 42);

    assert_eq!(registry.property("count").get::<u64>(&counter), 1);
}

#[test]
pub fn test_debug() {
    let registry = Counter::registry();
    let debug = format!("{:?}", registry.method("missing"));
    assert_eq!(debug, "Method(null)");
    let debug = format!("{:?}", registry.property("count"));
    assert!(debug.contains("u64"), "{debug}");
}

#[test]
#[should_panic(expected = "`noop` is already registered on `test_derive::Twice`")]
pub fn test_duplicate() {
    Twice::registry();
}
