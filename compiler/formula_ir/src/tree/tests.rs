use pretty_assertions::assert_eq;

use super::*;
use crate::{StringInterner, TreeBuilder};

#[test]
fn test_node_id_sentinel() {
    assert!(!NodeId::INVALID.is_valid());
    assert!(NodeId::new(0).is_valid());
    assert_eq!(format!("{:?}", NodeId::INVALID), "NodeId::INVALID");
}

#[test]
fn test_literal_number_bits() {
    let lit = Literal::number(2.5);
    assert_eq!(lit.as_number(), Some(2.5));
    assert_eq!(Literal::Bool(true).as_number(), None);
    assert_eq!(Literal::number(2.5), Literal::number(2.5));
}

#[test]
fn test_operator_symbols() {
    assert_eq!(Operator::Add.as_symbol(), "+");
    assert_eq!(Operator::Neg.as_symbol(), "-");
    assert_eq!(Operator::GtEq.to_string(), ">=");
}

#[test]
fn test_args_are_ordered() {
    let interner = StringInterner::new();
    let mut b = TreeBuilder::new(&interner);
    let first = b.number(1.0);
    let second = b.number(2.0);
    let third = b.number(3.0);
    let call = b.call("max", &[first, second, third]);
    let tree = b.finish(call);

    let NodeKind::Call { function, args } = tree.node(tree.root()).unwrap().kind else {
        panic!("expected call node");
    };
    assert_eq!(interner.lookup(function), "max");
    assert_eq!(tree.args(args), Some(&[first, second, third][..]));
}

#[test]
fn test_unknown_ids_are_absent() {
    let interner = StringInterner::new();
    let mut b = TreeBuilder::new(&interner);
    let one = b.number(1.0);
    let dangling = NodeId::new(7);
    let root = b.binary(Operator::Add, one, dangling);
    let tree = b.finish(root);

    assert!(tree.node(dangling).is_none());
    assert!(tree.node(NodeId::INVALID).is_none());
    assert!(tree.args(NodeRange::new(1, 4)).is_none());
    assert!(tree.node(root).is_some());
}
