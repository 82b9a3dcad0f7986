use crate::Vec3;

/// Stable index of a node inside a [`crate::LayoutGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Placement computed by a node layout.
///
/// `position.y` is the ground of the node, not its center: a layout that stands a block of
/// height `h` on ground level `g` reports `position.y == g`, and the node's center ends up at
/// `g + h / 2` once the transform is applied (see [`LayoutNode::apply`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub position: Vec3,
    pub scale: Vec3,
    /// Rotation around the y axis in degrees.
    pub rotation: f32,
}

impl NodeTransform {
    pub fn new(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builds a ground-anchored transform from a center position.
    pub fn from_center(center: Vec3, scale: Vec3, rotation: f32) -> Self {
        Self {
            position: Vec3::new(center.x, center.y - scale.y / 2.0, center.z),
            scale,
            rotation,
        }
    }

    pub fn center_position(&self) -> Vec3 {
        Vec3::new(
            self.position.x,
            self.position.y + self.scale.y / 2.0,
            self.position.z,
        )
    }

    pub fn translated(mut self, offset: Vec3) -> Self {
        self.position += offset;
        self
    }
}

/// A node of the city as seen by layouts and edge routing.
///
/// Hierarchy links live in the owning [`crate::LayoutGraph`]; everything a layout pass may
/// mutate lives here.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    /// Scale in world units.
    pub absolute_scale: Vec3,
    pub center_position: Vec3,
    /// Rotation around the y axis in degrees.
    pub rotation: f32,
    /// Center position relative to the root of the sublayout this node belongs to.
    pub relative_position: Vec3,
    /// Distance to the root of the node's tree. Maintained by
    /// [`crate::hierarchy::set_levels`].
    pub level: usize,
    /// Advisory: a leaf may still own children a layout decides not to place.
    pub is_leaf: bool,
    pub is_sublayout_node: bool,
    pub is_sublayout_root: bool,
    /// Root of the sublayout this node was placed by, if any.
    pub sublayout_root: Option<NodeId>,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            absolute_scale: Vec3::zeros(),
            center_position: Vec3::zeros(),
            rotation: 0.0,
            relative_position: Vec3::zeros(),
            level: 0,
            is_leaf: true,
            is_sublayout_node: false,
            is_sublayout_root: false,
            sublayout_root: None,
        }
    }

    pub fn leaf(id: impl Into<String>, scale: Vec3) -> Self {
        Self {
            absolute_scale: scale,
            ..Self::new(id)
        }
    }

    pub fn inner(id: impl Into<String>, scale: Vec3) -> Self {
        Self {
            absolute_scale: scale,
            is_leaf: false,
            ..Self::new(id)
        }
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center_position = center;
        self
    }

    pub fn extent(&self) -> Vec3 {
        self.absolute_scale / 2.0
    }

    /// Center of the top face.
    pub fn roof(&self) -> Vec3 {
        Vec3::new(
            self.center_position.x,
            self.center_position.y + self.absolute_scale.y / 2.0,
            self.center_position.z,
        )
    }

    /// Center of the bottom face.
    pub fn ground(&self) -> Vec3 {
        Vec3::new(
            self.center_position.x,
            self.center_position.y - self.absolute_scale.y / 2.0,
            self.center_position.z,
        )
    }

    /// Applies a ground-anchored transform.
    pub fn apply(&mut self, transform: &NodeTransform) {
        self.center_position = transform.center_position();
        self.absolute_scale = transform.scale;
        self.rotation = transform.rotation;
    }

    pub fn transform(&self) -> NodeTransform {
        NodeTransform::from_center(self.center_position, self.absolute_scale, self.rotation)
    }

    pub fn scale_by(&mut self, factor: f32) {
        self.absolute_scale *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::{LayoutNode, NodeTransform};
    use crate::Vec3;

    #[test]
    fn applying_a_transform_lifts_the_center_by_half_the_height() {
        let mut node = LayoutNode::leaf("a", Vec3::new(1.0, 1.0, 1.0));
        node.apply(&NodeTransform::new(
            Vec3::new(3.0, 2.0, -1.0),
            Vec3::new(2.0, 4.0, 2.0),
        ));
        assert_eq!(node.center_position, Vec3::new(3.0, 4.0, -1.0));
        assert_eq!(node.ground(), Vec3::new(3.0, 2.0, -1.0));
        assert_eq!(node.roof(), Vec3::new(3.0, 6.0, -1.0));
        assert_eq!(node.transform().position, Vec3::new(3.0, 2.0, -1.0));
    }
}
