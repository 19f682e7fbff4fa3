use eframe::egui;

use super::{FurnishApp, ViewLayout};

const SPLIT_GAP: f32 = 4.0;

fn split_rect(full: egui::Rect, layout: ViewLayout) -> (Option<egui::Rect>, Option<egui::Rect>) {
    match layout {
        ViewLayout::Scene => (Some(full), None),
        ViewLayout::Plan => (None, Some(full)),
        ViewLayout::Split => {
            let left_width = ((full.width() - SPLIT_GAP) * 0.5).max(0.0);
            let left = egui::Rect::from_min_size(full.min, egui::vec2(left_width, full.height()));
            let right = egui::Rect::from_min_max(
                egui::pos2(left.max.x + SPLIT_GAP, full.min.y),
                full.max,
            );
            (Some(left), Some(right))
        }
    }
}

impl FurnishApp {
    pub(super) fn show_central(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let full = ui.available_rect_before_wrap();
                let (scene_rect, plan_rect) = split_rect(full, self.layout);
                if let Some(rect) = scene_rect {
                    self.show_viewport(ui, rect);
                }
                if let Some(rect) = plan_rect {
                    self.show_plan(ui, rect);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_layout_shares_width() {
        let full = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(804.0, 500.0));
        let (left, right) = split_rect(full, ViewLayout::Split);
        let (left, right) = (left.expect("scene"), right.expect("plan"));
        assert_eq!(left.width(), 400.0);
        assert_eq!(right.width(), 400.0);
        assert_eq!(split_rect(full, ViewLayout::Plan).0, None);
    }
}
