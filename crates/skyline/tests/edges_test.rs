use skyline::edges::{
    BundledEdgeLayout, EdgeLayout, FlatEdgeLayout, SplineEdgeLayout, StraightEdgeLayout,
};
use skyline::hierarchy::hierarchy::set_all_levels;
use skyline::{Error, LayoutEdge, LayoutGraph, LayoutNode, NodeId, SplineKind, Vec3};

const MIN_LEVEL_DISTANCE: f32 = 0.025;

struct City {
    graph: LayoutGraph,
    r: NodeId,
    a: NodeId,
    a1: NodeId,
    a2: NodeId,
    b1: NodeId,
}

impl City {
    fn all(&self) -> Vec<NodeId> {
        self.graph.ids().collect()
    }
}

/// ```text
/// r
/// ├── a
/// │   ├── a1   height 4
/// │   └── a2   height 4
/// └── b
///     └── b1   height 2
/// ```
fn city() -> City {
    let mut g = LayoutGraph::new();
    let r = g
        .add_node(LayoutNode::inner("r", Vec3::new(10.0, 1.0, 10.0)).with_center(Vec3::new(0.0, 0.5, 0.0)))
        .unwrap();
    let a = g
        .add_node(LayoutNode::inner("a", Vec3::new(4.0, 1.0, 4.0)).with_center(Vec3::new(-3.0, 1.5, 0.0)))
        .unwrap();
    let a1 = g
        .add_node(LayoutNode::leaf("a1", Vec3::new(1.0, 4.0, 1.0)).with_center(Vec3::new(-4.0, 4.0, 0.0)))
        .unwrap();
    let a2 = g
        .add_node(LayoutNode::leaf("a2", Vec3::new(1.0, 4.0, 1.0)).with_center(Vec3::new(-2.0, 4.0, 1.0)))
        .unwrap();
    let b = g
        .add_node(LayoutNode::inner("b", Vec3::new(4.0, 1.0, 4.0)).with_center(Vec3::new(3.0, 1.5, 0.0)))
        .unwrap();
    let b1 = g
        .add_node(LayoutNode::leaf("b1", Vec3::new(1.0, 2.0, 1.0)).with_center(Vec3::new(3.0, 3.0, -1.0)))
        .unwrap();
    g.set_parent(a, r).unwrap();
    g.set_parent(a1, a).unwrap();
    g.set_parent(a2, a).unwrap();
    g.set_parent(b, r).unwrap();
    g.set_parent(b1, b).unwrap();
    set_all_levels(&mut g);
    City {
        graph: g,
        r,
        a,
        a1,
        a2,
        b1,
    }
}

fn bundling(above: bool) -> BundledEdgeLayout {
    BundledEdgeLayout::new(above, MIN_LEVEL_DISTANCE, 0.85).unwrap()
}

#[test]
fn straight_edges_run_above_the_tallest_roof() {
    let mut g = LayoutGraph::new();
    let a = g
        .add_node(LayoutNode::leaf("a", Vec3::new(1.0, 4.0, 1.0)).with_center(Vec3::new(0.0, 2.0, 0.0)))
        .unwrap();
    let b = g
        .add_node(LayoutNode::leaf("b", Vec3::new(1.0, 4.0, 1.0)).with_center(Vec3::new(5.0, 2.0, 3.0)))
        .unwrap();
    let mut edges = vec![LayoutEdge::new(a, b)];
    StraightEdgeLayout::new(true, 1.0)
        .create(&g, &[a, b], &mut edges)
        .unwrap();
    let curve = edges[0].curve.as_ref().unwrap();
    assert_eq!(curve.control_points.len(), 2);
    assert_eq!(curve.degree, 1);
    for p in &curve.control_points {
        assert!((p.y - 4.8).abs() < 1e-6, "{p:?}");
    }
    assert_eq!(curve.control_points[0].x, 0.0);
    assert_eq!(curve.control_points[1].z, 3.0);
}

#[test]
fn straight_edges_below_use_the_lowest_ground() {
    let c = city();
    let mut edges = vec![LayoutEdge::new(c.a1, c.b1)];
    StraightEdgeLayout::new(false, 0.5)
        .create(&c.graph, &c.all(), &mut edges)
        .unwrap();
    let curve = edges[0].curve.as_ref().unwrap();
    for p in &curve.control_points {
        assert!((p.y - (0.0 - 0.2 * 4.0 * 0.5)).abs() < 1e-6, "{p:?}");
    }
}

#[test]
fn self_loops_cross_the_roof_diagonally() {
    let c = city();
    let layout = bundling(true);
    let frame = layout.frame(&c.graph, &c.all()).unwrap();
    let mut edges = vec![LayoutEdge::new(c.a1, c.a1)];
    layout.create(&c.graph, &c.all(), &mut edges).unwrap();
    let curve = edges[0].curve.as_ref().unwrap();
    assert_eq!(curve.control_points.len(), 3);
    assert_eq!(curve.kind, SplineKind::Interpolated);
    assert_eq!(curve.control_points[0], Vec3::new(-4.5, 6.0, -0.5));
    assert_eq!(curve.control_points[2], Vec3::new(-3.5, 6.0, 0.5));
    assert_eq!(curve.control_points[1].y, 6.0 + frame.level_distance);
}

#[test]
fn siblings_get_a_direct_spline_at_the_level_offset() {
    let c = city();
    let layout = bundling(true);
    let frame = layout.frame(&c.graph, &c.all()).unwrap();
    let mut edges = vec![LayoutEdge::new(c.a1, c.a2)];
    layout.create(&c.graph, &c.all(), &mut edges).unwrap();
    let curve = edges[0].curve.as_ref().unwrap();
    assert_eq!(curve.control_points.len(), 3);
    assert_eq!(curve.control_points[0], c.graph.roof(c.a1));
    assert_eq!(curve.control_points[2], c.graph.roof(c.a2));
    assert_eq!(curve.control_points[1].y, frame.level_offset);
    assert_eq!(frame.level_distance, 4.0 / 5.0);
    assert_eq!(frame.level_offset, 6.0 + 0.8);
}

#[test]
fn siblings_below_blocks_dip_under_the_lowest_ground() {
    let c = city();
    let layout = bundling(false);
    let frame = layout.frame(&c.graph, &c.all()).unwrap();
    let mut edges = vec![LayoutEdge::new(c.a1, c.a2)];
    layout.create(&c.graph, &c.all(), &mut edges).unwrap();
    let curve = edges[0].curve.as_ref().unwrap();
    assert_eq!(curve.control_points[0], c.graph.ground(c.a1));
    assert_eq!(curve.control_points[1].y, frame.level_offset);
    assert!(frame.level_offset < 0.0);
}

#[test]
fn edges_along_a_hierarchy_path_are_direct() {
    let c = city();
    let layout = bundling(true);
    let frame = layout.frame(&c.graph, &c.all()).unwrap();
    let mut edges = vec![LayoutEdge::new(c.a, c.a1)];
    layout.create(&c.graph, &c.all(), &mut edges).unwrap();
    let curve = edges[0].curve.as_ref().unwrap();
    assert_eq!(curve.control_points.len(), 3);
    assert_eq!(curve.control_points[1].y, frame.level_offset);
}

#[test]
fn general_edges_follow_the_hierarchy() {
    let c = city();
    let layout = bundling(true);
    let frame = layout.frame(&c.graph, &c.all()).unwrap();
    assert_eq!(frame.max_level, 2);
    let mut edges = vec![LayoutEdge::new(c.a1, c.b1)];
    layout.create(&c.graph, &c.all(), &mut edges).unwrap();
    let curve = edges[0].curve.as_ref().unwrap();
    // a1, a, r, b, b1
    assert_eq!(curve.control_points.len(), 5);
    assert_eq!(curve.kind, SplineKind::BSpline);
    assert_eq!(curve.degree, 3);
    assert_eq!(curve.tension, Some(0.85));
    assert_eq!(curve.control_points[0], c.graph.roof(c.a1));
    assert_eq!(curve.control_points[4], c.graph.roof(c.b1));
    // The root's control point is pulled towards the chord but stays well above it.
    let chord_mid = (c.graph.roof(c.a1) + c.graph.roof(c.b1)) / 2.0;
    assert!(curve.control_points[2].y > chord_mid.y);
    assert!(frame.level_height(0) > frame.level_height(1));
}

#[test]
fn zero_tension_gives_a_straight_control_polygon() {
    let c = city();
    let layout = BundledEdgeLayout::new(true, MIN_LEVEL_DISTANCE, 0.0).unwrap();
    let mut edges = vec![LayoutEdge::new(c.a1, c.b1)];
    layout.create(&c.graph, &c.all(), &mut edges).unwrap();
    let curve = edges[0].curve.as_ref().unwrap();
    let start = c.graph.roof(c.a1);
    let end = c.graph.roof(c.b1);
    for (i, p) in curve.control_points.iter().enumerate() {
        let expected = start + (end - start) * (i as f32 / 4.0);
        assert!((p - expected).norm() < 1e-5, "{i}: {p:?} vs {expected:?}");
    }
}

#[test]
fn disconnected_trees_route_above_all_levels() {
    let mut g = LayoutGraph::new();
    let x = g
        .add_node(LayoutNode::leaf("x", Vec3::new(1.0, 1.0, 1.0)).with_center(Vec3::new(0.0, 0.5, 0.0)))
        .unwrap();
    let y = g
        .add_node(LayoutNode::leaf("y", Vec3::new(1.0, 1.0, 1.0)).with_center(Vec3::new(4.0, 0.5, 0.0)))
        .unwrap();
    set_all_levels(&mut g);
    let layout = bundling(true);
    let frame = layout.frame(&g, &[x, y]).unwrap();
    let mut edges = vec![LayoutEdge::new(x, y)];
    layout.create(&g, &[x, y], &mut edges).unwrap();
    let curve = edges[0].curve.as_ref().unwrap();
    assert_eq!(curve.control_points.len(), 3);
    assert_eq!(curve.control_points[1].y, frame.level_height(-1));
    assert_eq!(
        frame.level_height(-1),
        frame.level_offset + frame.level_distance
    );
}

#[test]
fn tension_outside_the_unit_interval_fails() {
    assert!(matches!(
        BundledEdgeLayout::new(true, MIN_LEVEL_DISTANCE, 1.2),
        Err(Error::InvalidTension { .. })
    ));
    assert!(matches!(
        BundledEdgeLayout::new(true, MIN_LEVEL_DISTANCE, -0.1),
        Err(Error::InvalidTension { .. })
    ));
    assert!(BundledEdgeLayout::new(true, 0.0, 0.5).is_err());
}

#[test]
fn bundling_needs_every_ancestor_of_the_endpoints() {
    let c = city();
    let mut edges = vec![LayoutEdge::new(c.a1, c.b1)];
    let err = bundling(true)
        .create(&c.graph, &[c.r, c.a1, c.b1], &mut edges)
        .unwrap_err();
    assert!(
        matches!(&err, Error::MissingAncestor { edge: 0, ancestor } if ancestor == "a"),
        "{err}"
    );
    assert!(edges[0].curve.is_none());

    // Straight edges only look at the endpoints.
    StraightEdgeLayout::new(true, 1.0)
        .create(&c.graph, &[c.a1, c.b1], &mut edges)
        .unwrap();
    assert!(edges[0].curve.is_some());
}

#[test]
fn routing_twice_is_bit_identical() {
    let c = city();
    let layout = bundling(true);
    let mk = || {
        vec![
            LayoutEdge::new(c.a1, c.b1),
            LayoutEdge::new(c.a1, c.a2),
            LayoutEdge::new(c.b1, c.b1),
            LayoutEdge::new(c.r, c.a2),
        ]
    };
    let mut first = mk();
    let mut second = mk();
    layout.create(&c.graph, &c.all(), &mut first).unwrap();
    layout.create(&c.graph, &c.all(), &mut second).unwrap();
    layout.create(&c.graph, &c.all(), &mut second).unwrap();
    assert_eq!(first, second);
}

#[test]
fn direct_splines_are_simplified_with_rdp() {
    let c = city();
    let route = |rdp: f32| {
        let mut edges = vec![LayoutEdge::new(c.a1, c.b1)];
        SplineEdgeLayout::new(true, 1.0, rdp)
            .create(&c.graph, &c.all(), &mut edges)
            .unwrap();
        edges[0].curve.clone().unwrap()
    };
    let plain = route(-1.0);
    assert_eq!(plain.control_points.len(), 3);

    // The default tolerance keeps the peak of the curve.
    let default = route(0.0001);
    assert_eq!(default, plain);

    // A tolerance beyond the peak height leaves the chord.
    let coarse = route(100.0);
    assert_eq!(coarse.control_points.len(), 2);
    assert_eq!(coarse.degree, 1);
    assert_eq!(coarse.first(), plain.first());
    assert_eq!(coarse.last(), plain.last());
}

#[test]
fn flat_edges_join_centers() {
    let c = city();
    let mut edges = vec![LayoutEdge::new(c.a1, c.b1)];
    FlatEdgeLayout
        .create(&c.graph, &c.all(), &mut edges)
        .unwrap();
    let curve = edges[0].curve.as_ref().unwrap();
    assert_eq!(curve.degree, 1);
    assert_eq!(
        curve.control_points,
        vec![
            c.graph.node(c.a1).center_position,
            c.graph.node(c.b1).center_position
        ]
    );
}
