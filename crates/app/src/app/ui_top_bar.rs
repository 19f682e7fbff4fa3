use eframe::egui;

use super::{FurnishApp, ViewLayout};

impl FurnishApp {
    pub(super) fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New design").clicked() {
                        self.start_new_design();
                        ui.close();
                    }
                    if ui.button("Save").clicked() {
                        self.request_save();
                        ui.close();
                    }

                    #[cfg(not(target_arch = "wasm32"))]
                    {
                        ui.separator();
                        if ui.button("Import design file...").clicked() {
                            self.import_design_dialog();
                            ui.close();
                        }
                        if ui.button("Export design file...").clicked() {
                            self.export_design_dialog();
                            ui.close();
                        }
                    }

                    #[cfg(target_arch = "wasm32")]
                    {
                        ui.separator();
                        ui.add_enabled(false, egui::Button::new("Import design file..."));
                        ui.add_enabled(false, egui::Button::new("Export design file..."));
                        ui.label("File I/O is not available in web builds.");
                    }
                });

                ui.separator();
                let session = self.controller.session();
                let title = if session.is_new_design() {
                    format!("{} (unsaved)", session.design_name())
                } else {
                    session.design_name().to_string()
                };
                ui.strong(title);
                ui.separator();

                if ui
                    .selectable_label(self.designs.open, "My Designs")
                    .clicked()
                {
                    self.designs.open = !self.designs.open;
                    if self.designs.open {
                        self.refresh_design_list();
                    }
                }

                let mut grid = self.controller.session().grid_visible();
                if ui.checkbox(&mut grid, "Grid").changed() {
                    self.controller.set_grid_visible(grid);
                }
                let mut shaded = self.controller.session().room_shaded();
                if ui.checkbox(&mut shaded, "Shade room").changed() {
                    self.controller.toggle_room_shade();
                }

                ui.separator();
                for layout in ViewLayout::ALL {
                    if ui
                        .selectable_label(self.layout == layout, layout.label())
                        .clicked()
                    {
                        self.layout = layout;
                    }
                }
                ui.separator();
                ui.checkbox(&mut self.show_console, "Console");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Save").clicked() {
                        self.request_save();
                    }
                });
            });
        });
    }
}
