use eframe::egui;
use furnish_core::{catalog_categories, catalog_entries, display_name};

use super::FurnishApp;

impl FurnishApp {
    /// Bottom strip with one group per category; clicking adds the item
    /// at the room origin, selected and in drag mode.
    pub(super) fn show_catalog_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("catalog")
            .resizable(false)
            .show(ctx, |ui| {
                let mut added = None;
                egui::ScrollArea::horizontal().show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for category in catalog_categories() {
                            ui.vertical(|ui| {
                                ui.strong(category.label());
                                ui.horizontal(|ui| {
                                    for entry in catalog_entries()
                                        .iter()
                                        .filter(|entry| entry.category == category)
                                    {
                                        if ui
                                            .button(entry.display_name)
                                            .on_hover_text(entry.model_path)
                                            .clicked()
                                        {
                                            added = Some(entry.key);
                                        }
                                    }
                                });
                            });
                            ui.separator();
                        }
                    });
                });
                if let Some(key) = added {
                    self.controller.add_furniture(key);
                    self.notifications.success(format!("Added {}", display_name(key)));
                }
            });
    }
}
