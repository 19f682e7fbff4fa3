use std::ops::RangeInclusive;

use crate::catalog::display_name;
use crate::furniture::{TransformPatch, Xyz};
use crate::interaction::{InteractionController, ROTATION_STEP};
use crate::session::EditorSession;

pub const SCALE_RANGE: RangeInclusive<f32> = 0.1..=3.0;
pub const HEIGHT_RANGE: RangeInclusive<f32> = 0.0..=3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    Left,
    Right,
}

impl RotateDirection {
    pub fn delta(self) -> f32 {
        match self {
            RotateDirection::Left => -ROTATION_STEP,
            RotateDirection::Right => ROTATION_STEP,
        }
    }
}

/// Values shown by the inspector panel, read fresh from the session each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectorFields {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub scale: f32,
    pub height: f32,
    pub rotation_y: f32,
    pub shaded: bool,
    pub drag_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InspectorEdit {
    Scale(f32),
    Height(f32),
    Rotate(RotateDirection),
    SetShaded(bool),
    ToggleDragMode,
    Remove,
    Deselect,
}

pub fn inspect(session: &EditorSession) -> Option<InspectorFields> {
    let index = session.selected_index()?;
    let item = session.selected_item()?;
    Some(InspectorFields {
        index,
        id: item.id.clone(),
        title: display_name(&item.kind).to_string(),
        scale: item.scale.x,
        height: item.position.y,
        rotation_y: item.rotation.y,
        shaded: item.shaded,
        drag_mode: session.drag_mode(),
    })
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if !value.is_finite() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

/// Writes an inspector edit back through the controller. Returns true when the
/// session changed.
pub fn apply(controller: &mut InteractionController, edit: InspectorEdit) -> bool {
    let Some(item) = controller.session().selected_item() else {
        return false;
    };
    let id = item.id.clone();
    let position = item.position;
    match edit {
        InspectorEdit::Scale(value) => {
            let scale = clamp_to(value, &SCALE_RANGE);
            controller.update_furniture(&id, &TransformPatch::scale(Xyz::splat(scale)))
        }
        InspectorEdit::Height(value) => {
            let y = clamp_to(value, &HEIGHT_RANGE);
            let patch = TransformPatch::position(Xyz::new(position.x, y, position.z));
            controller.update_furniture(&id, &patch)
        }
        InspectorEdit::Rotate(direction) => controller.rotate_selected(direction.delta()),
        InspectorEdit::SetShaded(shaded) => controller.set_shaded(&id, shaded),
        InspectorEdit::ToggleDragMode => controller.toggle_drag_mode(),
        InspectorEdit::Remove => controller.remove_selected().is_some(),
        InspectorEdit::Deselect => {
            controller.deselect();
            true
        }
    }
}
