use crate::foundation::core::{Affine, Crop, Point, Rect, Size, Vec2, normalize_rotation};
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::ids::{NodeId, SceneId, SourceId};

/// Discriminator of a [`SceneNode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A placed source.
    Item,
    /// A group of other nodes.
    Folder,
}

/// Placement state of an item.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ItemPlacement {
    /// Position of the item's (cropped) top-left corner on the canvas.
    #[serde(default)]
    pub position: Vec2,
    /// Scale factors; negative values flip.
    #[serde(default = "default_scale")]
    pub scale: Vec2,
    /// Crop margins in source pixels.
    #[serde(default)]
    pub crop: Crop,
    /// Rotation in degrees around `position`, always in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    /// Whether the item is drawn.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Whether the item ignores interactive edits.
    #[serde(default)]
    pub locked: bool,
}

fn default_scale() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

fn default_visible() -> bool {
    true
}

impl Default for ItemPlacement {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: default_scale(),
            crop: Crop::default(),
            rotation: 0.0,
            visible: true,
            locked: false,
        }
    }
}

impl ItemPlacement {
    /// Size of the cropped source before scaling.
    pub fn cropped_size(&self, source: Size) -> Size {
        Size::new(
            (source.width - self.crop.left - self.crop.right).max(0.0),
            (source.height - self.crop.top - self.crop.bottom).max(0.0),
        )
    }

    /// Local (cropped, unscaled) box to canvas transform.
    ///
    /// Canonical order: `T(position) * R(rotation) * S(scale)`.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.position)
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }

    /// Canvas-space point of `fractions` (`(0,0)` top-left .. `(1,1)` bottom-right) of the box.
    pub fn point_at(&self, source: Size, fractions: Vec2) -> Point {
        let s = self.cropped_size(source);
        self.to_affine() * Point::new(s.width * fractions.x, s.height * fractions.y)
    }

    /// Axis-aligned canvas bounds of the rotated, scaled box.
    pub fn bounds(&self, source: Size) -> Rect {
        let s = self.cropped_size(source);
        let affine = self.to_affine();
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(s.width, 0.0),
            Point::new(s.width, s.height),
            Point::new(0.0, s.height),
        ]
        .map(|p| affine * p);
        let first = Rect::from_points(corners[0], corners[0]);
        corners[1..]
            .iter()
            .fold(first, |acc, p| acc.union_pt(*p))
    }
}

/// Partial update of an item's placement state.
///
/// `None` fields are left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ItemPatch {
    /// New position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec2>,
    /// New scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec2>,
    /// New crop margins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
    /// New rotation in degrees (normalized on apply).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// New visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// New lock state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl ItemPatch {
    /// Patch that only sets the position.
    pub fn position(position: Vec2) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Patch that only sets visibility.
    pub fn visible(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            ..Self::default()
        }
    }

    /// Patch that only sets the lock flag.
    pub fn locked(locked: bool) -> Self {
        Self {
            locked: Some(locked),
            ..Self::default()
        }
    }

    /// Patch carrying every field of `placement`.
    pub fn from_placement(placement: &ItemPlacement) -> Self {
        Self {
            position: Some(placement.position),
            scale: Some(placement.scale),
            crop: Some(placement.crop),
            rotation: Some(placement.rotation),
            visible: Some(placement.visible),
            locked: Some(placement.locked),
        }
    }

    /// Return `true` when the patch sets nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject non-finite geometry and negative crop margins.
    pub fn validate(&self) -> SceneResult<()> {
        if let Some(p) = self.position
            && !(p.x.is_finite() && p.y.is_finite())
        {
            return Err(SceneError::validation("item position must be finite"));
        }
        if let Some(s) = self.scale
            && !(s.x.is_finite() && s.y.is_finite())
        {
            return Err(SceneError::validation("item scale must be finite"));
        }
        if let Some(c) = self.crop
            && !c.is_valid()
        {
            return Err(SceneError::validation(
                "item crop margins must be finite and >= 0",
            ));
        }
        if let Some(r) = self.rotation
            && !r.is_finite()
        {
            return Err(SceneError::validation("item rotation must be finite"));
        }
        Ok(())
    }

    /// Apply to `placement`, returning `true` when anything changed.
    pub(crate) fn apply_to(&self, placement: &mut ItemPlacement) -> bool {
        let before = *placement;
        if let Some(p) = self.position {
            placement.position = p;
        }
        if let Some(s) = self.scale {
            placement.scale = s;
        }
        if let Some(c) = self.crop {
            placement.crop = c;
        }
        if let Some(r) = self.rotation {
            placement.rotation = normalize_rotation(r);
        }
        if let Some(v) = self.visible {
            placement.visible = v;
        }
        if let Some(l) = self.locked {
            placement.locked = l;
        }
        before != *placement
    }
}

/// A node that places a source.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneItem {
    /// Node id.
    pub id: NodeId,
    /// Owning scene.
    pub scene_id: SceneId,
    /// Parent folder, `None` at scene root.
    pub parent_id: Option<NodeId>,
    /// Referenced source (a scene id when this item nests a scene).
    pub source_id: SourceId,
    /// Placement state.
    pub placement: ItemPlacement,
}

/// A node that groups other nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneItemFolder {
    /// Node id.
    pub id: NodeId,
    /// Owning scene.
    pub scene_id: SceneId,
    /// Parent folder, `None` at scene root.
    pub parent_id: Option<NodeId>,
    /// Display name.
    pub name: String,
    /// Direct children in tree order.
    pub children: Vec<NodeId>,
}

/// A member of a scene tree.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneNode {
    /// Placed source.
    Item(SceneItem),
    /// Group of nodes.
    Folder(SceneItemFolder),
}

impl SceneNode {
    /// Node id.
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Item(i) => &i.id,
            Self::Folder(f) => &f.id,
        }
    }

    /// Owning scene.
    pub fn scene_id(&self) -> &SceneId {
        match self {
            Self::Item(i) => &i.scene_id,
            Self::Folder(f) => &f.scene_id,
        }
    }

    /// Parent folder id.
    pub fn parent_id(&self) -> Option<&NodeId> {
        match self {
            Self::Item(i) => i.parent_id.as_ref(),
            Self::Folder(f) => f.parent_id.as_ref(),
        }
    }

    pub(crate) fn set_parent_id(&mut self, parent: Option<NodeId>) {
        match self {
            Self::Item(i) => i.parent_id = parent,
            Self::Folder(f) => f.parent_id = parent,
        }
    }

    /// Kind discriminator.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Item(_) => NodeKind::Item,
            Self::Folder(_) => NodeKind::Folder,
        }
    }

    /// Return `true` for items.
    pub fn is_item(&self) -> bool {
        matches!(self, Self::Item(_))
    }

    /// Return `true` for folders.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    /// Borrow as an item.
    pub fn as_item(&self) -> Option<&SceneItem> {
        match self {
            Self::Item(i) => Some(i),
            Self::Folder(_) => None,
        }
    }

    /// Borrow as a folder.
    pub fn as_folder(&self) -> Option<&SceneItemFolder> {
        match self {
            Self::Item(_) => None,
            Self::Folder(f) => Some(f),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/node.rs"]
mod tests;
