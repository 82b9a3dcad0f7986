use skyline_hierarchy::{LayoutGraph, LayoutNode, Vec3};
use skyline_io::{read_path, sld};

fn city() -> LayoutGraph {
    let mut g = LayoutGraph::new();
    let r = g
        .add_node(LayoutNode::inner("r", Vec3::new(10.0, 0.5, 10.0)).with_center(Vec3::new(0.0, 0.25, 0.0)))
        .unwrap();
    let a = g
        .add_node(LayoutNode::leaf("a", Vec3::new(1.0, 3.0, 2.0)).with_center(Vec3::new(-2.5, 2.0, 1.25)))
        .unwrap();
    g.set_parent(a, r).unwrap();
    g.node_mut(a).rotation = 90.0;
    g
}

#[test]
fn written_rows_read_back_exactly() {
    let g = city();
    let text = sld::write(&g);
    assert_eq!(text.lines().count(), 2);
    assert_eq!(text.lines().nth(1), Some("a\t-2.5\t2\t1.25\t0\t90\t0\t1\t3\t2"));

    let mut fresh = g.clone();
    for id in ["r", "a"] {
        let v = fresh.node_id(id).unwrap();
        let node = fresh.node_mut(v);
        node.center_position = Vec3::zeros();
        node.absolute_scale = Vec3::zeros();
        node.rotation = 0.0;
    }
    let report = sld::read_str("city.sld", &text, &mut fresh);
    assert!(report.is_clean());
    assert_eq!(report.applied.len(), 2);
    for id in ["r", "a"] {
        let v = g.node_id(id).unwrap();
        assert_eq!(fresh.node(v), g.node(v));
    }
}

#[test]
fn malformed_rows_are_skipped() {
    let mut g = city();
    let text = "a\t1\t2\t3\t0\t0\t0\t1\t1\t1\n\nghost\t1\t2\t3\t0\t0\t0\t1\t1\t1\nr\t1\t2\nr\tx\t0\t0\t0\t0\t0\t1\t1\t1\n";
    let report = sld::read_str("city.sld", text, &mut g);
    assert_eq!(report.applied.len(), 1);
    let lines: Vec<usize> = report.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![3, 4, 5]);
    assert_eq!(report.to_string(), "3 rows skipped in file city.sld");
    let a = g.node_id("a").unwrap();
    assert_eq!(g.node(a).center_position, Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn sld_files_are_dispatched_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("city.sld");
    let g = city();
    std::fs::write(&path, sld::write(&g)).unwrap();
    let mut fresh = g.clone();
    let report = read_path(&path, &mut fresh, 0.0).unwrap();
    assert_eq!(report.applied.len(), 2);
    let transforms = report.into_transforms();
    assert_eq!(transforms["a"].rotation, 90.0);
    assert_eq!(transforms["a"].position, Vec3::new(-2.5, 0.5, 1.25));
}
