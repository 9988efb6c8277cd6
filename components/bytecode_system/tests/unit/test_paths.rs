//! Tests for node addressing

use bytecode_system::{Component, Container, ControlCommand, Path, Tree, Value};

fn nested() -> (Tree, bytecode_system::NodeId, Vec<bytecode_system::NodeId>) {
    let mut tree = Tree::new();
    let root = tree.add(Container::new());
    let knot = tree.add(Container::named("knot"));
    let stitch = tree.add(Container::named("stitch"));
    let anon = tree.add(Container::new());
    let text = tree.add(Value::string("hello"));
    let done = tree.add(ControlCommand::Done);

    tree.add_content(anon, text).unwrap();
    tree.add_content(stitch, anon).unwrap();
    tree.add_content(stitch, done).unwrap();
    tree.add_to_named_content_only(knot, stitch).unwrap();
    tree.add_to_named_content_only(root, knot).unwrap();

    (tree, root, vec![knot, stitch, anon, text, done])
}

#[test]
fn test_every_reachable_node_round_trips() {
    let (tree, root, nodes) = nested();
    for id in tree.descendants(root) {
        let path = tree.path(id);
        assert_eq!(tree.content_at_path(root, &path), Some(id), "path {}", path);
    }
    assert_eq!(tree.path(nodes[3]).to_string(), "knot.stitch.0.0");
    assert_eq!(tree.path(nodes[4]).to_string(), "knot.stitch.1");
}

#[test]
fn test_named_positional_child_uses_its_name() {
    let mut tree = Tree::new();
    let root = tree.add(Container::new());
    let gather = tree.add(Container::named("g-0"));
    let other = tree.add(Value::Int(1));
    tree.add_content(root, other).unwrap();
    tree.add_content(root, gather).unwrap();

    assert_eq!(tree.path(gather).to_string(), "g-0");
    assert_eq!(tree.content_at_path(root, &Path::parse("1")), Some(gather));
    assert_eq!(tree.content_at_path(root, &Path::parse("g-0")), Some(gather));
    assert!(!tree.container(root).unwrap().has_named_only_content());
}

#[test]
fn test_root_content_container_from_anywhere() {
    let (tree, root, nodes) = nested();
    for id in nodes {
        assert_eq!(tree.root_content_container(id), Some(root));
    }
}

#[test]
fn test_parent_steps() {
    let (tree, root, nodes) = nested();
    let path = Path::relative(vec![Component::Parent, Component::Index(1)]);
    assert_eq!(tree.resolve_path(nodes[2], &path), Some(nodes[4]));
    // From a leaf the first `^` lands on its own container
    assert_eq!(tree.resolve_path(nodes[3], &path), None);
    assert_eq!(tree.resolve_path(nodes[3], &Path::parse(".^.0")), Some(nodes[3]));
    assert_eq!(tree.resolve_path(nodes[3], &Path::parse(".^.^.1")), Some(nodes[4]));
    assert_eq!(tree.content_at_path(root, &Path::parse("knot.^.knot")), Some(nodes[0]));
}

#[test]
fn test_unattached_node_has_empty_path() {
    let mut tree = Tree::new();
    let loose = tree.add(Value::Int(3));
    assert!(tree.path(loose).is_empty());
    assert_eq!(tree.root_content_container(loose), None);
}

#[test]
fn test_sibling_relative_target_from_leaf() {
    let mut tree = Tree::new();
    let root = tree.add(Container::new());
    let knot = tree.add(Container::named("knot"));
    let done = tree.add(ControlCommand::Done);
    let gather = tree.add(Container::named("g-0"));
    let value = tree.add(Value::Int(1));
    tree.add_content(gather, value).unwrap();
    tree.add_content(knot, done).unwrap();
    tree.add_content(knot, gather).unwrap();
    tree.add_to_named_content_only(root, knot).unwrap();
    tree.set_debug_metadata(gather, Some(core_types::DebugMetadata::new(None, 7, 7)));

    assert_eq!(tree.resolve_path(done, &Path::parse(".^.g-0")), Some(gather));
    assert_eq!(tree.resolve_path(done, &Path::parse(".^.1")), Some(gather));
    assert_eq!(tree.resolve_path(value, &Path::parse(".^.^.0")), Some(done));
    assert_eq!(tree.debug_line_number_of_path(done, &Path::parse(".^.g-0.0")), Some(7));
}
