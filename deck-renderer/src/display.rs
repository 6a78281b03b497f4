//! Display lists: a scene plus its editor overlays, flattened into draw order.

use deck_core::{Coordinate, DeckScene, GuideLine, ResourceId};
use serde::Serialize;

use crate::shape::{resource_shapes, DrawCommand, Style, GUIDE_STROKE, SELECTION_STROKE};
use crate::view::EditorView;
use crate::{RenderError, RenderResult};

const SNAP_BOX_FILL: &str = "rgba(0, 0, 0, 0.1)";
const TOOLTIP_FONT_SIZE: f64 = 18.0;

/// Draw commands in painter's order, back to front.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    /// Flatten a scene and its overlays.
    ///
    /// Resources are drawn parent before children. Siblings keep their tree
    /// order except that raised siblings move on top, most recently raised
    /// last. A resource with a pose override in the view is drawn at that
    /// pose, and its subtree follows it. `extent` is the robot size in
    /// millimetres; guide lines span it.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingDeck`] if the scene has no root.
    pub fn build(scene: &DeckScene, view: &EditorView, extent: (f64, f64)) -> RenderResult<Self> {
        let root = scene.root().ok_or(RenderError::MissingDeck)?;
        let mut list = Self::default();
        list.push_subtree(scene, view, root, Coordinate::zero());
        list.push_overlays(view, extent);
        tracing::trace!("Display list built: {} commands", list.commands.len());
        Ok(list)
    }

    /// All commands.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands drawn for one resource.
    pub fn owned_by(&self, id: ResourceId) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(move |c| c.owner() == Some(id))
    }

    /// Paint position of a resource's first shape, used to compare stacking.
    #[must_use]
    pub fn paint_index(&self, id: ResourceId) -> Option<usize> {
        self.commands.iter().position(|c| c.owner() == Some(id))
    }

    fn push_subtree(
        &mut self,
        scene: &DeckScene,
        view: &EditorView,
        id: ResourceId,
        parent_origin: Coordinate,
    ) {
        let Some(resource) = scene.get(id) else {
            return;
        };
        let offset = view
            .pose(id)
            .map_or(resource.location, |(x, y)| {
                Coordinate::new(x, y, resource.location.z)
            });
        let origin = parent_origin + offset;

        let mut shapes = resource_shapes(resource, origin);
        if view.selection() == Some(id) {
            if let Some(main) = shapes.first_mut() {
                main.outline_with(SELECTION_STROKE);
            }
        }
        self.commands.extend(shapes);

        let mut children = resource.children().to_vec();
        // Stable: unraised siblings keep tree order, below raised ones.
        children.sort_by_key(|&child| view.raise_rank(child).map_or(0, |rank| rank + 1));
        for child in children {
            self.push_subtree(scene, view, child, origin);
        }
    }

    fn push_overlays(&mut self, view: &EditorView, (width, height): (f64, f64)) {
        if let Some(rect) = view.snap_box() {
            self.commands.push(DrawCommand::Rect {
                owner: None,
                rect,
                style: Style::stroke(GUIDE_STROKE, 1.0)
                    .with_fill(SNAP_BOX_FILL)
                    .dashed(10.0, 5.0),
            });
        }

        for guide in view.guides() {
            let (from, to) = match *guide {
                GuideLine::Vertical(x) => ((x, 0.0), (x, height)),
                GuideLine::Horizontal(y) => ((0.0, y), (width, y)),
            };
            self.commands.push(DrawCommand::Line {
                from,
                to,
                style: Style::stroke(GUIDE_STROKE, 2.0).dashed(10.0, 5.0),
            });
        }

        if view.trash_visible() {
            self.commands.push(DrawCommand::TrashIcon {
                rect: view.trash_zone(),
            });
        }

        if let Some(tooltip) = view.tooltip() {
            self.commands.push(DrawCommand::Text {
                x: tooltip.x,
                y: tooltip.y,
                content: tooltip.label.clone(),
                font_size: TOOLTIP_FONT_SIZE,
                fill: "black".to_string(),
                centered: true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{DeckSurface, Resource, ResourceKind};

    struct Fixture {
        scene: DeckScene,
        carrier: ResourceId,
        plate: ResourceId,
        trough: ResourceId,
    }

    fn fixture() -> Fixture {
        let deck = Resource::new(
            "deck",
            ResourceKind::HamiltonDeck { num_rails: 30 },
            (1360.0, 653.5, 900.0),
        );
        let mut scene = DeckScene::with_root(deck);
        let root = scene.root().expect("root");
        let carrier = Resource::new("car", ResourceKind::PlateCarrier, (135.0, 497.0, 130.0))
            .with_location(Coordinate::new(100.0, 63.0, 100.0));
        let carrier = scene.insert(carrier, Some(root)).expect("carrier");
        let plate = Resource::new(
            "plate",
            ResourceKind::Plate {
                num_items_x: 0,
                num_items_y: 0,
            },
            (127.0, 86.0, 14.5),
        )
        .with_location(Coordinate::new(4.0, 8.5, 0.0));
        let plate = scene.insert(plate, Some(carrier)).expect("plate");
        let trough = Resource::new(
            "trough",
            ResourceKind::Container(deck_core::ContainerState::new(1000.0)),
            (20.0, 80.0, 40.0),
        )
        .with_location(Coordinate::planar(900.0, 200.0));
        let trough = scene.insert(trough, Some(root)).expect("trough");
        Fixture {
            scene,
            carrier,
            plate,
            trough,
        }
    }

    fn first_rect(list: &DisplayList, id: ResourceId) -> deck_core::Rect {
        list.owned_by(id)
            .find_map(|c| match c {
                DrawCommand::Rect { rect, .. } => Some(*rect),
                _ => None,
            })
            .expect("rect")
    }

    #[test]
    fn test_children_drawn_at_absolute_positions() {
        let f = fixture();
        let list = DisplayList::build(&f.scene, &EditorView::default(), (775.0, 653.5))
            .expect("list");
        let rect = first_rect(&list, f.plate);
        assert_eq!((rect.x, rect.y), (104.0, 71.5));
        assert!(list.paint_index(f.carrier) < list.paint_index(f.plate));
    }

    #[test]
    fn test_pose_override_moves_subtree() {
        let f = fixture();
        let mut view = EditorView::default();
        view.set_pose(f.carrier, 300.0, 63.0);
        let list = DisplayList::build(&f.scene, &view, (775.0, 653.5)).expect("list");
        assert_eq!(first_rect(&list, f.carrier).x, 300.0);
        assert_eq!(first_rect(&list, f.plate).x, 304.0);
    }

    #[test]
    fn test_raised_sibling_paints_last() {
        let f = fixture();
        let mut view = EditorView::default();
        let list = DisplayList::build(&f.scene, &view, (775.0, 653.5)).expect("list");
        assert!(list.paint_index(f.carrier) < list.paint_index(f.trough));

        view.raise(f.carrier);
        let list = DisplayList::build(&f.scene, &view, (775.0, 653.5)).expect("list");
        assert!(list.paint_index(f.trough) < list.paint_index(f.carrier));
        assert!(list.paint_index(f.trough) < list.paint_index(f.plate));
    }

    #[test]
    fn test_selection_outline() {
        let f = fixture();
        let mut view = EditorView::default();
        view.set_selection(Some(f.plate));
        let list = DisplayList::build(&f.scene, &view, (775.0, 653.5)).expect("list");
        let stroke = list.owned_by(f.plate).find_map(|c| match c {
            DrawCommand::Rect { style, .. } => Some(style.stroke.clone()),
            _ => None,
        });
        assert_eq!(stroke.as_deref(), Some(SELECTION_STROKE));
    }

    #[test]
    fn test_overlays_follow_resources() {
        let f = fixture();
        let mut view = EditorView::default();
        view.set_trash_visible(true);
        view.show_snap_box(deck_core::Rect::new(104.0, 71.5, 127.0, 86.0));
        view.show_guide(GuideLine::Vertical(325.0));
        view.show_guide(GuideLine::Horizontal(63.0));
        let list = DisplayList::build(&f.scene, &view, (775.0, 653.5)).expect("list");

        let tail = &list.commands()[list.len() - 4..];
        assert!(matches!(tail[0], DrawCommand::Rect { owner: None, .. }));
        assert!(matches!(
            tail[1],
            DrawCommand::Line { from: (325.0, 0.0), to: (325.0, 653.5), .. }
        ));
        assert!(matches!(
            tail[2],
            DrawCommand::Line { from: (0.0, 63.0), to: (775.0, 63.0), .. }
        ));
        assert!(matches!(tail[3], DrawCommand::TrashIcon { .. }));
    }

    #[test]
    fn test_empty_scene_is_an_error() {
        assert!(matches!(
            DisplayList::build(&DeckScene::new(), &EditorView::default(), (775.0, 653.5)),
            Err(RenderError::MissingDeck)
        ));
    }
}
