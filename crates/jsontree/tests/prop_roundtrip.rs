/// Property-based tests for the parser, formatter, and path engine.
///
/// Uses `proptest` to generate random node trees and checks that:
/// - `parse(format(v)) == v` for compact and pretty output
/// - feeding a document in chunks of any size gives the same tree as one call
/// - the output agrees with `serde_json` as a reference parser
/// - `#` appends in order and reports the current length
/// - a rejecting predicate never changes the tree
/// - removing a path that matches nothing is a no-op
///
/// The `serde_json` oracle uses floats with few significant digits, since
/// serde_json's default float parser is not guaranteed to round the last
/// bit the same way for arbitrary values.
use jsontree::{parse, to_string, FormatOptions, Node, Object, Parser};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_finite_float() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |f| f.is_finite())
}

fn arb_leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        Just(Node::Null),
        any::<bool>().prop_map(Node::Boolean),
        any::<i64>().prop_map(Node::Integer),
        arb_finite_float().prop_map(Node::Float),
        any::<String>().prop_map(Node::String),
    ]
}

/// Leaves whose floats serde_json reads back exactly.
fn arb_simple_leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        Just(Node::Null),
        any::<bool>().prop_map(Node::Boolean),
        any::<i64>().prop_map(Node::Integer),
        (-1_000_000i64..1_000_000i64).prop_map(|n| Node::Float(n as f64 / 100.0)),
        any::<String>().prop_map(Node::String),
    ]
}

fn arb_tree(leaf: BoxedStrategy<Node>) -> impl Strategy<Value = Node> {
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Node::from),
            prop::collection::vec((any::<String>(), inner), 0..8)
                .prop_map(|pairs| Node::Object(pairs.into_iter().collect::<Object>())),
        ]
    })
}

fn arb_node() -> impl Strategy<Value = Node> {
    arb_tree(arb_leaf().boxed())
}

fn arb_simple_node() -> impl Strategy<Value = Node> {
    arb_tree(arb_simple_leaf().boxed())
}

/// Feed `text` to a fresh parser in pieces of `size` characters.
fn parse_chunked(text: &str, size: usize) -> Result<Node, jsontree::ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut parser = Parser::new();
    for piece in chars.chunks(size) {
        let chunk: String = piece.iter().collect();
        parser.feed(&chunk)?;
    }
    parser.finish()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn compact_roundtrip(node in arb_node()) {
        let text = to_string(&node, &FormatOptions::compact());
        let parsed = parse(&text).unwrap();
        prop_assert_eq!(parsed, node, "text: {}", text);
    }

    #[test]
    fn pretty_roundtrip(node in arb_node()) {
        let text = to_string(&node, &FormatOptions::pretty());
        prop_assert_eq!(parse(&text).unwrap(), node);
    }

    #[test]
    fn chunk_size_independence(node in arb_node(), size in 1usize..17) {
        let text = to_string(&node, &FormatOptions::pretty());
        let whole = parse(&text).unwrap();
        let chunked = parse_chunked(&text, size).unwrap();
        prop_assert_eq!(chunked, whole);
    }

    #[test]
    fn chunked_errors_match_whole(text in "[\\[\\]{}\",:0-9a-z. ]{0,24}", size in 1usize..6) {
        let whole = parse(&text);
        let chunked = parse_chunked(&text, size);
        prop_assert_eq!(chunked, whole);
    }

    #[test]
    fn agrees_with_serde_json(node in arb_simple_node()) {
        let text = node.to_string();
        let oracle: serde_json::Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(oracle, serde_json::Value::from(node.clone()));
        let back = Node::try_from(serde_json::from_str::<serde_json::Value>(&text).unwrap()).unwrap();
        prop_assert_eq!(back, node);
    }

    #[test]
    fn append_keeps_order_and_length(values in prop::collection::vec(any::<i64>(), 0..20)) {
        let mut root = Node::from(Vec::new());
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(root.find("#"), Node::Integer(i as i64));
            prop_assert!(root.update("#", *v, true).unwrap());
        }
        prop_assert_eq!(root.find("#"), Node::Integer(values.len() as i64));
        let expected: Vec<Node> = values.into_iter().map(Node::from).collect();
        prop_assert_eq!(root, Node::from(expected));
    }

    #[test]
    fn rejecting_predicate_leaves_tree_unchanged(
        node in arb_node(),
        path in prop_oneof![Just("*"), Just("*/*"), Just("a"), Just("0/#"), Just("x/#/y"), Just("")],
        insert in any::<bool>(),
    ) {
        let before = node.to_string();
        let mut target = node;
        let _ = target.update_if(path, Node::from("new"), insert, |_, _| false);
        prop_assert_eq!(target.to_string(), before.clone());
        let _ = target.remove_if(path, |_, _| false);
        prop_assert_eq!(target.to_string(), before);
    }

    #[test]
    fn removing_missing_path_is_noop(
        node in arb_node(),
        path in prop_oneof![Just("a"), Just("0"), Just("a/b"), Just("0/a"), Just("*/zz")],
    ) {
        let mut target = node.clone();
        if let Ok(false) = target.remove(path) {
            prop_assert_eq!(target, node);
        }
    }

    #[test]
    fn remove_key_twice(node in arb_node()) {
        let mut root = Node::Object([("k", node), ("other", Node::Null)].into_iter().collect());
        prop_assert_eq!(root.remove("k"), Ok(true));
        let snapshot = root.clone();
        prop_assert_eq!(root.remove("k"), Ok(false));
        prop_assert_eq!(root, snapshot);
    }

    #[test]
    fn wildcard_visits_every_key_once(keys in prop::collection::vec("[a-z]{1,4}", 0..10)) {
        let object: Object = keys.iter().map(|k| (k.as_str(), 1)).collect();
        let expected: Vec<String> = object.keys().map(str::to_string).collect();
        let root = Node::Object(object);
        let mut seen = Vec::new();
        root.for_each("*", |_, at| seen.push(at.to_string()));
        prop_assert_eq!(seen, expected);
    }
}
