use eframe::egui;
use furnish_core::plan_pick;
use furnish_scene::PlanView;
use render::{paint_plan, paint_plan_unavailable};

use super::FurnishApp;

impl FurnishApp {
    pub(super) fn show_plan(&mut self, ui: &mut egui::Ui, rect: egui::Rect) {
        let response = ui.allocate_rect(rect, egui::Sense::click());
        let painter = ui.painter_at(rect);
        let Some(plan) = self.sync.plan() else {
            return;
        };
        let canvas = match plan {
            PlanView::Unavailable { message } => {
                paint_plan_unavailable(&painter, rect, message);
                return;
            }
            PlanView::Ready(canvas) => canvas,
        };
        let transform = paint_plan(&painter, rect, canvas);

        if !response.clicked() {
            return;
        }
        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };
        if let Some(index) = plan_pick(canvas, transform.to_plan(pos)) {
            self.controller.select_index(index);
        }
    }
}
