use serde::{Deserialize, Serialize};
use serde_refjson::io::{read_file, write_file};
use serde_refjson::{
    decode, decode_with_options, encode, encode_with_options, from_document, from_str, to_document,
    to_string, to_string_pretty, Container, Document, Error, Graph, Map, Number, Options, Value,
};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    total: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
enum Shape {
    Dot,
    Circle(i32),
    Rect { w: i32, h: i32 },
    Line(i32, i32),
}

fn root_map(doc: &Document) -> &Map {
    match doc.container(doc.root()) {
        Some(Container::Map(map)) => map,
        other => panic!("expected a map root, got {:?}", other),
    }
}

fn root_array(doc: &Document) -> &Vec<Value> {
    match doc.container(doc.root()) {
        Some(Container::Array(items)) => items,
        other => panic!("expected an array root, got {:?}", other),
    }
}

#[test]
fn test_shared_array_decodes_to_one_container() {
    let doc = decode(r#"{"a":["string"], "b":$2}"#).unwrap();
    let map = root_map(&doc);

    let a = map.get_str("a").unwrap();
    let b = map.get_str("b").unwrap();
    assert!(a.same_identity(b));
    assert_eq!(doc.graph().len(), 2);
    let shared = a.as_container().unwrap();

    // Mutating through one key is visible through the other
    let (mut graph, root) = doc.into_parts();
    graph.array_mut(shared).unwrap().push(Value::from(5));
    let doc = Document::new(graph, root);
    assert_eq!(encode(&doc), r#"{"a":["string",5],"b":$2}"#);
}

#[test]
fn test_self_reference_round_trip() {
    let mut graph = Graph::new();
    let x = graph.new_map();
    graph
        .map_mut(x)
        .unwrap()
        .insert(Value::from("self"), Value::Container(x));
    let doc = Document::new(graph, Value::Container(x));

    let text = encode(&doc);
    assert_eq!(text, r#"{"self":$1}"#);

    let back = decode(&text).unwrap();
    let map = root_map(&back);
    assert!(map.get_str("self").unwrap().same_identity(back.root()));
    assert_eq!(back, doc);
}

#[test]
fn test_mutual_cycle() {
    let mut graph = Graph::new();
    let a = graph.new_array();
    let b = graph.insert_array(vec![Value::Container(a)]);
    graph.array_mut(a).unwrap().push(Value::Container(b));
    let doc = Document::new(graph, Value::Container(a));

    let text = encode(&doc);
    assert_eq!(text, "[[$1]]");

    let back = decode(&text).unwrap();
    let outer = root_array(&back);
    let inner = back.graph().array(outer[0].as_container().unwrap()).unwrap();
    assert!(inner[0].same_identity(back.root()));
}

#[test]
fn test_non_string_keys_round_trip() {
    let text = r#"{1:"int",2.5:"float",[1,2]:"array",{"k":"v"}:"map"}"#;
    let doc = decode(text).unwrap();
    let map = root_map(&doc);

    assert_eq!(map.len(), 4);
    assert_eq!(map.get(&Value::from(1)), Some(&Value::from("int")));
    assert_eq!(
        map.get(&Value::Number(Number::from_f64(2.5).unwrap())),
        Some(&Value::from("float"))
    );
    assert_eq!(encode(&doc), text);
}

#[test]
fn test_key_container_referenced_as_value() {
    let doc = decode(r#"{[1]:$2}"#).unwrap();
    let (key, value) = root_map(&doc).get_index(0).unwrap();
    assert!(key.same_identity(value));
    assert_eq!(encode(&doc), r#"{[1]:$2}"#);
}

#[test]
fn test_encode_counts_keys_before_values() {
    let mut graph = Graph::new();
    let key = graph.insert_array(vec![Value::from(0)]);
    let value = graph.insert_array(vec![Value::from(1)]);
    let mut map = Map::new();
    map.insert(Value::Container(key), Value::Container(value));
    map.insert(Value::from("again"), Value::Container(value));
    let root = graph.insert_map(map);

    let doc = Document::new(graph, Value::Container(root));
    assert_eq!(encode(&doc), r#"{[0]:[1],"again":$3}"#);
}

#[test]
fn test_pretty_output_decodes_to_same_document() {
    let doc = decode(r#"{"a":[1,{"b":[]}],"c":$2,{}:"empty map key"}"#).unwrap();
    let pretty = encode_with_options(&doc, &Options::pretty());
    assert!(pretty.contains('\n'));
    assert_eq!(decode(&pretty).unwrap(), doc);
}

#[test]
fn test_escapes_survive_round_trip() {
    let raw = "quote\" backslash\\ nl\n cr\r bs\u{8} tab\t vt\u{b} bell\u{7} ff\u{c} é";
    let doc = Document::new(Graph::new(), Value::from(raw));
    let text = encode(&doc);
    assert_eq!(
        text,
        r#""quote\" backslash\\ nl\n cr\r bs\b tab\t vt\v bell\a ff\f é""#
    );
    assert_eq!(decode(&text).unwrap().root(), &Value::from(raw));
}

#[test]
fn test_structural_characters_inside_strings() {
    let doc = decode(r#"{"[$1]":"{,:}"}"#).unwrap();
    let map = root_map(&doc);
    assert_eq!(map.get_str("[$1]"), Some(&Value::from("{,:}")));
}

#[test]
fn test_deep_nesting() {
    let depth = 5_000;
    let text = format!("{}{}", "[".repeat(depth), "]".repeat(depth));

    assert!(matches!(
        decode(&text),
        Err(Error::DepthLimitExceeded { limit: 256, .. })
    ));

    let options = Options::new().with_max_depth(depth);
    let doc = decode_with_options(&text, &options).unwrap();
    assert_eq!(doc.graph().len(), depth);
    assert_eq!(encode(&doc), text);
}

#[test]
fn test_simple_struct() {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        tags: vec!["admin".to_string(), "developer".to_string()],
    };

    let text = to_string(&user).unwrap();
    println!("User: {}", text);

    let user_back: User = from_str(&text).unwrap();
    assert_eq!(user, user_back);
}

#[test]
fn test_nested_struct() {
    let order = Order {
        order_id: 12345,
        customer: User {
            id: 123,
            name: "Alice".to_string(),
            tags: vec!["vip".to_string()],
        },
        items: vec![
            Product {
                sku: "WIDGET-001".to_string(),
                price: 29.99,
                quantity: 2,
            },
            Product {
                sku: "GADGET-002".to_string(),
                price: 49.99,
                quantity: 1,
            },
        ],
        total: 109.97,
    };

    let text = to_string_pretty(&order).unwrap();
    println!("Order:\n{}", text);

    let order_back: Order = from_str(&text).unwrap();
    assert_eq!(order, order_back);
}

#[test]
fn test_enum_round_trip() {
    let shapes = vec![
        Shape::Dot,
        Shape::Circle(3),
        Shape::Rect { w: 1, h: 2 },
        Shape::Line(-1, 1),
    ];
    let text = to_string(&shapes).unwrap();
    let back: Vec<Shape> = from_str(&text).unwrap();
    assert_eq!(shapes, back);
}

#[test]
fn test_shared_containers_are_copied_into_structs() {
    let text = r#"{"order_id":1,"customer":{"id":7,"name":"Bo","tags":["x"]},"items":[{"sku":"A","price":1.5,"quantity":1},$5],"total":3.0}"#;
    let order: Order = from_str(text).unwrap();
    assert_eq!(order.items[0], order.items[1]);
    assert_eq!(order.total, 3.0);
}

#[test]
fn test_to_document_then_from_document() {
    let user = User {
        id: 9,
        name: "Eve".to_string(),
        tags: vec![],
    };
    let doc = to_document(&user).unwrap();
    assert_eq!(encode(&doc), r#"{"id":9,"name":"Eve","tags":[]}"#);

    let back: User = from_document(&doc).unwrap();
    assert_eq!(user, back);
}

#[test]
fn test_borrowed_strings_from_document() {
    let doc = decode(r#"["a","b"]"#).unwrap();
    let words: Vec<&str> = from_document(&doc).unwrap();
    assert_eq!(words, vec!["a", "b"]);
}

#[test]
fn test_unsupported_serde_types() {
    assert!(matches!(to_string(&true), Err(Error::UnsupportedType(_))));
    assert!(matches!(
        to_string(&Option::<u8>::None),
        Err(Error::UnsupportedType(_))
    ));
    assert!(matches!(to_string(&f64::NAN), Err(Error::UnsupportedType(_))));
    assert!(matches!(to_string(&()), Err(Error::UnsupportedType(_))));
}

#[test]
fn test_file_round_trip() {
    let path = std::env::temp_dir().join(format!(
        "serde_refjson_file_round_trip_{}.rj",
        std::process::id()
    ));
    let doc = decode(r#"{"a":["string"],"b":$2,"c":{"back":$1}}"#).unwrap();

    let written = write_file(&path, &doc).unwrap();
    assert_eq!(written, encode(&doc).len());

    let back = read_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(back, doc);

    let map = root_map(&back);
    assert!(map
        .get_str("a")
        .unwrap()
        .same_identity(map.get_str("b").unwrap()));
}

#[test]
fn test_repeated_insert_round_trips() {
    let mut graph = Graph::new();
    let mut map = Map::new();
    map.insert(Value::from("k"), Value::from(1));
    map.insert(Value::from("other"), Value::from(0));
    map.insert(Value::from("k"), Value::from(2));
    let root = graph.insert_map(map);
    let doc = Document::new(graph, Value::Container(root));

    let text = encode(&doc);
    assert_eq!(text, r#"{"k":2,"other":0}"#);
    assert_eq!(decode(&text).unwrap(), doc);
}

#[test]
fn test_wide_map_decode() {
    let n = 200_000;
    let body: Vec<String> = (0..n).map(|i| format!("{}:{}", i, i)).collect();
    let text = format!("{{{}}}", body.join(","));

    let doc = decode(&text).unwrap();
    let map = root_map(&doc);
    assert_eq!(map.len(), n);
    assert_eq!(map.get(&Value::from(123_456)), Some(&Value::from(123_456)));
    assert_eq!(encode(&doc), text);
}

#[test]
fn test_wide_map_serialize() {
    let map: std::collections::BTreeMap<u32, u32> = (0..200_000).map(|i| (i, i)).collect();
    let text = to_string(&map).unwrap();
    let back: std::collections::BTreeMap<u32, u32> = from_str(&text).unwrap();
    assert_eq!(map, back);
}
