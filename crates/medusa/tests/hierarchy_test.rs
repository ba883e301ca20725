use medusa::{Node, compute_depths, visual_tier};

#[test]
fn depths_follow_the_parent_chain() {
    let nodes = vec![
        Node::new("root"),
        Node::new("a").with_parent("root"),
        Node::new("b").with_parent("a"),
        Node::new("c").with_parent("b"),
    ];
    let depths = compute_depths(&nodes);
    assert_eq!(depths["root"], 0);
    assert_eq!(depths["a"], 1);
    assert_eq!(depths["b"], 2);
    assert_eq!(depths["c"], 3);
}

#[test]
fn every_resolvable_child_sits_one_level_under_its_parent() {
    // Three branches of three children each, plus grandchildren under the
    // first child of every branch.
    let mut nodes = vec![Node::new("root")];
    for b in 0..3 {
        nodes.push(Node::new(format!("b{b}")).with_parent("root"));
        for c in 0..3 {
            nodes.push(Node::new(format!("b{b}c{c}")).with_parent(format!("b{b}")));
        }
        nodes.push(Node::new(format!("b{b}g")).with_parent(format!("b{b}c0")));
    }
    let depths = compute_depths(&nodes);

    assert_eq!(depths.len(), nodes.len());
    for n in &nodes {
        let Some(parent) = n.parent.as_deref() else {
            assert_eq!(depths[&n.id], 0);
            continue;
        };
        assert_eq!(depths[&n.id], depths[parent] + 1);
    }
}

#[test]
fn orphaned_and_multi_root_inputs_all_anchor_at_depth_zero() {
    let nodes = vec![
        Node::new("left"),
        Node::new("right"),
        Node::new("stray").with_parent("never-defined"),
        Node::new("kid").with_parent("right"),
    ];
    let depths = compute_depths(&nodes);
    assert_eq!(depths["left"], 0);
    assert_eq!(depths["right"], 0);
    assert_eq!(depths["stray"], 0);
    assert_eq!(depths["kid"], 1);
}

#[test]
fn a_parent_cycle_is_anchored_at_its_first_member() {
    let nodes = vec![
        Node::new("a").with_parent("c"),
        Node::new("b").with_parent("a"),
        Node::new("c").with_parent("b"),
    ];
    let depths = compute_depths(&nodes);
    // No node is root-like, so the first cycle member in input order is
    // promoted and the rest hang off it.
    assert_eq!(depths["a"], 0);
    assert_eq!(depths["b"], 1);
    assert_eq!(depths["c"], 2);
}

#[test]
fn empty_input_yields_an_empty_depth_map() {
    assert!(compute_depths(&[]).is_empty());
}

#[test]
fn visual_tiers_shrink_with_depth_and_clamp_past_the_table() {
    for d in 0..4 {
        let here = visual_tier(d);
        let deeper = visual_tier(d + 1);
        assert!(here.radius > deeper.radius);
        assert!(here.stroke_width > deeper.stroke_width);
        assert!(here.font_size > deeper.font_size);
    }
    assert_eq!(visual_tier(4), visual_tier(5));
    assert_eq!(visual_tier(4), visual_tier(1000));
}
