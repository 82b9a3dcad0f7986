use skyline_hierarchy::{LayoutGraph, LayoutNode, NodeId, Vec3};
use skyline_io::{Error, gvl, read_path};

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).norm() < 1e-4
}

fn graph(ids: &[(&str, f32)]) -> LayoutGraph {
    let mut g = LayoutGraph::new();
    for (id, height) in ids {
        g.add_node(LayoutNode::leaf(*id, Vec3::new(1.0, *height, 1.0)))
            .unwrap();
    }
    g
}

fn id(g: &LayoutGraph, name: &str) -> NodeId {
    g.node_id(name).unwrap()
}

#[test]
fn collapsed_roots_are_drawn_with_their_own_icon_size() {
    let mut g = graph(&[("r", 3.0)]);
    let text = r#"<Gravis2_Layout W="Hierarchy" V="t">
  <Node Id="Lr" X="100" Y="50" W="0" H="0" CS="20"/>
</Gravis2_Layout>"#;
    let report = gvl::read_str("city.gvl", text, &mut g, 0.0).unwrap();
    assert!(report.is_clean());
    let r = g.node(id(&g, "r"));
    assert_eq!(r.absolute_scale, Vec3::new(20.0, 3.0, 20.0));
    assert_eq!(r.center_position, Vec3::new(110.0, 1.5, -60.0));
    assert_eq!(report.applied["r"].position, Vec3::new(110.0, 0.0, -60.0));
}

#[test]
fn roots_without_icon_size_fall_back_to_the_default() {
    let mut g = graph(&[("r", 1.0)]);
    let text = r#"<Gravis2_Layout><Node Id="Lr" X="0" Y="0" W="0" H="0"/></Gravis2_Layout>"#;
    gvl::read_str("city.gvl", text, &mut g, 2.0).unwrap();
    let r = g.node(id(&g, "r"));
    assert_eq!(r.absolute_scale.x, gvl::DEFAULT_ICON_SIZE);
    assert_eq!(g.ground(id(&g, "r")).y, 2.0);
}

#[test]
fn nested_nodes_are_offsets_from_the_parent_corner() {
    let mut g = graph(&[("p", 2.0), ("c", 4.0)]);
    let text = r#"<?xml version="1.0"?>
<Gravis2_Layout W="Hierarchy" V="t">
  <Node Id="Lp" X="0" Y="0" W="100" H="50" CS="10" Exp="True">
    <Node Id="Sc" X="10" Y="5" W="0" H="0" CS="3"/>
  </Node>
</Gravis2_Layout>"#;
    let report = gvl::read_str("city.gvl", text, &mut g, 0.0).unwrap();
    assert_eq!(report.applied.len(), 2);

    let p = g.node(id(&g, "p"));
    assert_eq!(p.absolute_scale, Vec3::new(100.0, 2.0, 50.0));
    assert_eq!(p.center_position, Vec3::new(50.0, 1.0, -25.0));

    let c = g.node(id(&g, "c"));
    assert_eq!(c.absolute_scale, Vec3::new(10.0, 4.0, 10.0));
    assert_eq!(c.center_position, Vec3::new(15.0, 4.0, -10.0));
    assert_eq!(g.ground(id(&g, "c")).y, g.roof(id(&g, "p")).y);
}

#[test]
fn bad_nodes_are_reported_with_their_line() {
    let mut g = graph(&[("a", 1.0), ("b", 1.0), ("k", 1.0)]);
    let text = r#"<Gravis2_Layout>
  <Node Id="Lghost" X="0" Y="0" W="10" H="10" CS="2" Exp="True">
    <Node Id="Lk" X="1" Y="1" W="0" H="0"/>
  </Node>
  <Node Id="La" X="zero" Y="0" W="0" H="0">
    <Node Id="Lb" X="1" Y="1" W="0" H="0"/>
  </Node>
  <Node Id="Lk2" X="0" Y="0" W="4" H="4" Exp="True">
    <Node Id="Lb" X="1" Y="1" W="0" H="0"/>
  </Node>
</Gravis2_Layout>"#;
    let report = gvl::read_str("city.gvl", text, &mut g, 0.0).unwrap();
    assert_eq!(report.skipped(), 3);
    assert_eq!(report.diagnostics[0].line, 2);
    assert_eq!(report.diagnostics[0].message, "unknown node id ghost");
    assert_eq!(report.diagnostics[1].line, 5);
    assert!(report.diagnostics[1].message.contains("attribute X of node a"));
    assert_eq!(report.diagnostics[2].line, 8);
    assert_eq!(report.diagnostics[2].message, "node k2 has no attribute CS");
    assert_eq!(report.to_string(), "3 rows skipped in file city.gvl");

    // The unknown node still anchors its child; the malformed one drops its subtree.
    assert!(report.applied.contains_key("k"));
    assert!(close(g.node(id(&g, "k")).center_position, Vec3::new(2.0, 0.5, -2.0)));
    assert!(!report.applied.contains_key("b"));
}

#[test]
fn syntax_errors_fail_the_whole_file() {
    let mut g = graph(&[("a", 1.0)]);
    let err = gvl::read_str("broken.gvl", "<Gravis2_Layout><Node", &mut g, 0.0).unwrap_err();
    assert!(matches!(err, Error::Xml { ref file, .. } if file == "broken.gvl"));
}

#[test]
fn written_layouts_read_back_to_the_same_footprints() {
    let mut g = LayoutGraph::new();
    let r = g
        .add_node(LayoutNode::inner("r", Vec3::new(12.0, 1.0, 8.0)).with_center(Vec3::new(3.0, 0.5, -2.0)))
        .unwrap();
    let a = g
        .add_node(LayoutNode::leaf("a", Vec3::new(2.0, 5.0, 3.0)).with_center(Vec3::new(0.0, 3.5, 0.5)))
        .unwrap();
    let b = g
        .add_node(LayoutNode::leaf("b", Vec3::new(1.0, 2.0, 1.0)).with_center(Vec3::new(7.5, 2.0, -4.0)))
        .unwrap();
    g.set_parent(a, r).unwrap();
    g.set_parent(b, r).unwrap();
    let text = gvl::write(&g, "city");
    assert!(text.contains("<!DOCTYPE Gravis2_Layout>"));
    assert!(text.contains(r#"V="city""#));

    let mut fresh = g.clone();
    for v in [r, a, b] {
        fresh.node_mut(v).center_position = Vec3::zeros();
    }
    let report = gvl::read_str("city.gvl", &text, &mut fresh, 0.0).unwrap();
    assert!(report.is_clean());
    for v in [r, a, b] {
        let before = g.node(v);
        let after = fresh.node(v);
        assert!(close(before.absolute_scale, after.absolute_scale), "{}", before.id);
        assert!((before.center_position.x - after.center_position.x).abs() < 1e-4);
        assert!((before.center_position.z - after.center_position.z).abs() < 1e-4);
    }
    // Heights are not stored: children stand on the roof of their parent.
    assert_eq!(fresh.ground(a).y, fresh.roof(r).y);
}

#[test]
fn files_are_dispatched_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("city.gvl");
    std::fs::write(
        &path,
        r#"<Gravis2_Layout><Node Id="La" X="0" Y="0" W="4" H="4" Exp="True"/></Gravis2_Layout>"#,
    )
    .unwrap();
    let mut g = graph(&[("a", 1.0)]);
    let report = read_path(&path, &mut g, 0.0).unwrap();
    assert_eq!(report.file, path.display().to_string());
    assert_eq!(g.node(id(&g, "a")).center_position, Vec3::new(2.0, 0.5, -2.0));

    let missing = dir.path().join("missing.gvl");
    assert!(matches!(
        read_path(&missing, &mut g, 0.0),
        Err(Error::Io { .. })
    ));
}
