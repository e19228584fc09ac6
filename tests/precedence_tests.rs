// Expression tree shape tests

use pascc::parser::ast::{NodeId, SyntaxTree};
use pascc::parser::Parser;

/// Parse `x := <expr>` and return the tree with the expression root
fn parse_expr(expr: &str) -> (SyntaxTree, NodeId) {
    let source = format!("program T; var x, a, b, c : integer; begin x := {}; end.", expr);
    let mut parser = Parser::new(&source).expect("Parser creation failed");
    let program = parser.parse_program().expect("Parsing failed");
    assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);

    let tree = program.tree;
    let root = tree.root().unwrap();
    let begin = tree[root].right().unwrap();
    let link = tree[begin].right().unwrap();
    let assign = tree[link].left().unwrap();
    assert_eq!(tree[assign].value(), ":=");
    let expr_root = tree[assign].right().unwrap();
    (tree, expr_root)
}

fn children(tree: &SyntaxTree, id: NodeId) -> (NodeId, NodeId) {
    (tree[id].left().unwrap(), tree[id].right().unwrap())
}

#[test]
fn test_multiplication_binds_tighter() {
    let (tree, root) = parse_expr("1+2*3");
    assert_eq!(tree[root].value(), "+");
    let (left, right) = children(&tree, root);
    assert_eq!(tree[left].value(), "1");
    assert_eq!(tree[right].value(), "*");
    let (two, three) = children(&tree, right);
    assert_eq!(tree[two].value(), "2");
    assert_eq!(tree[three].value(), "3");
}

#[test]
fn test_looser_operator_becomes_root() {
    let (tree, root) = parse_expr("1*2+3");
    assert_eq!(tree[root].value(), "+");
    let (left, right) = children(&tree, root);
    assert_eq!(tree[left].value(), "*");
    assert_eq!(tree[right].value(), "3");
}

#[test]
fn test_parenthesis_override() {
    let (tree, root) = parse_expr("(1+2)*3");
    assert_eq!(tree[root].value(), "*");
    let (left, right) = children(&tree, root);
    assert_eq!(tree[left].value(), "+");
    assert_eq!(tree[right].value(), "3");
}

#[test]
fn test_word_operators() {
    let (tree, root) = parse_expr("a or b and c");
    assert_eq!(tree[root].value(), "or");
    let (_, right) = children(&tree, root);
    assert_eq!(tree[right].value(), "and");

    let (tree, root) = parse_expr("a mod b xor c");
    assert_eq!(tree[root].value(), "xor");
    let (left, _) = children(&tree, root);
    assert_eq!(tree[left].value(), "mod");
}

#[test]
fn test_parents_point_upward() {
    let (tree, root) = parse_expr("a+b*c");
    let (a, mul) = children(&tree, root);
    assert_eq!(tree[a].parent(), Some(root));
    assert_eq!(tree[mul].parent(), Some(root));
    let (b, _) = children(&tree, mul);
    assert_eq!(tree[b].parent(), Some(mul));
}

#[test]
fn test_teardown_of_parsed_program() {
    let (mut tree, _) = parse_expr("a+b*(c-1)");
    let live = tree.len();
    let root = tree.root().unwrap();
    assert_eq!(tree.free_subtree(root), live);
    assert!(tree.is_empty());
    assert_eq!(tree.free_subtree(root), 0);
}
