use eframe::egui;
use furnish_core::{CameraPose, PointerInput};
use glam::Vec2;
use render::{ndc_from_screen, orbit_position, paint_scene, viewport_aspect, zoom_position};

use super::FurnishApp;

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(0xf0, 0xf0, 0xf0);
const ORBIT_SPEED: f32 = 0.01;
const ZOOM_SPEED: f32 = 0.1;

impl FurnishApp {
    pub(super) fn show_viewport(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        self.handle_viewport_input(ui.ctx(), &response, rect);
        self.refresh_presentations();

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKGROUND);
        let pose = self.controller.session().camera().pose();
        let view_proj = pose.view_proj(viewport_aspect(rect));
        self.last_paint_stats = paint_scene(
            &painter,
            rect,
            view_proj,
            pose.position,
            self.sync.scene(),
            &mut self.mesh_cache,
        );

        let session = self.controller.session();
        let mut status = vec![session.camera_angle().label().to_string()];
        if session.drag_mode() {
            status.push("Drag mode: move the selected item on the floor".to_string());
        }
        let pending = self.assets.pending_count();
        if pending > 0 {
            status.push(format!("Loading {pending} models"));
        }
        painter.text(
            rect.left_top() + egui::vec2(8.0, 8.0),
            egui::Align2::LEFT_TOP,
            status.join("  ·  "),
            egui::FontId::proportional(13.0),
            egui::Color32::from_gray(60),
        );
    }

    fn handle_viewport_input(
        &mut self,
        ctx: &egui::Context,
        response: &egui::Response,
        rect: egui::Rect,
    ) {
        let aspect = viewport_aspect(rect);
        let (pressed, released, primary_down, pointer_pos, delta, scroll) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.primary_down(),
                i.pointer.latest_pos(),
                i.pointer.delta(),
                i.raw_scroll_delta.y,
            )
        });
        if let Some(pos) = pointer_pos {
            self.pointer.last_ndc = Some(ndc_from_screen(rect, pos));
        }
        let input = |ndc: Vec2| PointerInput::new(ndc, aspect);

        if pressed && response.hovered() {
            if let Some(ndc) = self.pointer.last_ndc {
                self.pointer.viewport_press = true;
                let on_item = self.controller.pointer_down(input(ndc), self.sync.scene());
                self.pointer.orbiting = !on_item && self.controller.camera_orbit_enabled();
            }
        }

        if self.controller.wants_global_pointer() {
            // Routed from anywhere in the window until release.
            ctx.set_cursor_icon(egui::CursorIcon::Grabbing);
            if delta != egui::Vec2::ZERO {
                if let Some(ndc) = self.pointer.last_ndc {
                    self.controller.pointer_move(input(ndc));
                }
            }
        } else if self.pointer.orbiting && primary_down && delta != egui::Vec2::ZERO {
            let pose = self.controller.session().camera().pose();
            let position = orbit_position(
                pose.position,
                pose.target,
                delta.x * ORBIT_SPEED,
                delta.y * ORBIT_SPEED,
            );
            self.controller.orbit_camera(CameraPose {
                position,
                target: pose.target,
            });
        }

        if released && self.pointer.viewport_press {
            if let Some(ndc) = self.pointer.last_ndc {
                self.controller.pointer_up(input(ndc), self.sync.scene());
            }
            self.pointer.viewport_press = false;
            self.pointer.orbiting = false;
        }

        if response.hovered() && scroll.abs() > 0.0 && self.controller.camera_orbit_enabled() {
            let pose = self.controller.session().camera().pose();
            let factor = 1.0 - scroll * ZOOM_SPEED / 100.0;
            self.controller.orbit_camera(CameraPose {
                position: zoom_position(pose.position, pose.target, factor),
                target: pose.target,
            });
        }
    }
}
