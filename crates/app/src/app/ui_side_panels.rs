use eframe::egui;
use furnish_core::{
    apply_inspector_edit, inspect, parse_hex_color, to_hex_color, CameraAngle, InspectorEdit,
    RoomSpecs, RotateDirection, HEIGHT_RANGE, SCALE_RANGE,
};

use super::logging::LEVEL_CHOICES;
use super::FurnishApp;

const ROOM_DIMENSION_RANGE: std::ops::RangeInclusive<f32> = 1.0..=30.0;

fn color_button(ui: &mut egui::Ui, label: &str, hex: &mut String) -> bool {
    let rgb = parse_hex_color(hex).unwrap_or([1.0, 1.0, 1.0]);
    let mut rgb8 = rgb.map(|channel| (channel * 255.0).round() as u8);
    let changed = ui
        .horizontal(|ui| {
            ui.label(label);
            ui.color_edit_button_srgb(&mut rgb8).changed()
        })
        .inner;
    if changed {
        *hex = to_hex_color(rgb8.map(|channel| channel as f32 / 255.0));
    }
    changed
}

fn room_editor(ui: &mut egui::Ui, room: &mut RoomSpecs) -> bool {
    let mut changed = false;
    egui::Grid::new("room_specs").num_columns(2).show(ui, |ui| {
        for (label, value) in [
            ("Width", &mut room.width),
            ("Length", &mut room.length),
            ("Height", &mut room.height),
        ] {
            ui.label(label);
            changed |= ui
                .add(
                    egui::DragValue::new(value)
                        .speed(0.1)
                        .range(ROOM_DIMENSION_RANGE)
                        .suffix(" m"),
                )
                .changed();
            ui.end_row();
        }
    });
    changed |= color_button(ui, "Floor colour", &mut room.floor_color);
    changed |= color_button(ui, "Wall colour", &mut room.wall_color);
    changed
}

impl FurnishApp {
    pub(super) fn show_room_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("room_panel")
            .resizable(false)
            .default_width(190.0)
            .show(ctx, |ui| {
                ui.heading("Camera");
                let current = self.controller.session().camera_angle();
                for angle in CameraAngle::ALL {
                    if ui
                        .selectable_label(current == angle, angle.label())
                        .clicked()
                        && current != angle
                    {
                        self.controller.set_camera_angle(angle);
                    }
                }

                ui.separator();
                ui.heading("Room");
                let mut room = self.controller.session().room().clone();
                if room_editor(ui, &mut room) {
                    self.controller.set_room(room);
                }
            });
    }

    pub(super) fn show_side_panels(&mut self, ctx: &egui::Context) {
        let fields = inspect(self.controller.session());
        if fields.is_none() && !self.designs.open && !self.show_console {
            return;
        }

        egui::SidePanel::right("side_panels")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                if let Some(fields) = fields {
                    egui::CollapsingHeader::new("Selected item")
                        .default_open(true)
                        .show(ui, |ui| {
                            ui.strong(&fields.title);
                            let mut edits = Vec::new();

                            let mut scale = fields.scale;
                            if ui
                                .add(egui::Slider::new(&mut scale, SCALE_RANGE).step_by(0.01).text("Scale"))
                                .changed()
                            {
                                edits.push(InspectorEdit::Scale(scale));
                            }
                            let mut height = fields.height;
                            if ui
                                .add(
                                    egui::Slider::new(&mut height, HEIGHT_RANGE)
                                        .step_by(0.1)
                                        .suffix(" m")
                                        .text("Height"),
                                )
                                .changed()
                            {
                                edits.push(InspectorEdit::Height(height));
                            }

                            ui.horizontal(|ui| {
                                if ui.button("⟲ Rotate (Q)").clicked() {
                                    edits.push(InspectorEdit::Rotate(RotateDirection::Left));
                                }
                                if ui.button("⟳ Rotate (E)").clicked() {
                                    edits.push(InspectorEdit::Rotate(RotateDirection::Right));
                                }
                            });
                            ui.label(format!("Heading {:.1}°", fields.rotation_y.to_degrees()));

                            let mut shaded = fields.shaded;
                            if ui.checkbox(&mut shaded, "Shade item").changed() {
                                edits.push(InspectorEdit::SetShaded(shaded));
                            }
                            let drag_label = if fields.drag_mode {
                                "Exit drag mode (D)"
                            } else {
                                "Drag mode (D)"
                            };
                            if ui.selectable_label(fields.drag_mode, drag_label).clicked() {
                                edits.push(InspectorEdit::ToggleDragMode);
                            }
                            ui.horizontal(|ui| {
                                if ui.button("Remove").clicked() {
                                    edits.push(InspectorEdit::Remove);
                                }
                                if ui.button("Deselect").clicked() {
                                    edits.push(InspectorEdit::Deselect);
                                }
                            });

                            for edit in edits {
                                apply_inspector_edit(&mut self.controller, edit);
                            }
                        });
                }

                if self.designs.open {
                    self.show_design_list(ui);
                }

                if self.show_console {
                    self.show_console_panel(ui);
                }
            });
    }

    fn show_design_list(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("My Designs")
            .default_open(true)
            .show(ui, |ui| {
                if ui.button("Refresh").clicked() {
                    self.refresh_design_list();
                }
                let mut load = None;
                match &self.designs.entries {
                    None => {
                        ui.label("Not loaded yet.");
                    }
                    Some(Err(message)) => {
                        ui.colored_label(egui::Color32::RED, message);
                    }
                    Some(Ok(entries)) if entries.is_empty() => {
                        ui.label("No saved designs.");
                    }
                    Some(Ok(entries)) => {
                        let current = self.controller.session().design_id();
                        for entry in entries {
                            ui.horizontal(|ui| {
                                let name = if entry.name.is_empty() { &entry.id } else { &entry.name };
                                if current == Some(entry.id.as_str()) {
                                    ui.strong(name);
                                } else {
                                    ui.label(name);
                                }
                                if ui.small_button("Load").clicked() {
                                    load = Some(entry.id.clone());
                                }
                                if ui.small_button("Delete").clicked() {
                                    self.designs.pending_delete = Some(entry.clone());
                                }
                            });
                            if let Some(updated) = &entry.updated_at {
                                ui.weak(updated);
                            }
                        }
                    }
                }
                if let Some(id) = load {
                    self.open_design(&id);
                }
            });
    }

    fn show_console_panel(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Console")
            .default_open(true)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    egui::ComboBox::from_label("Log level")
                        .selected_text(format!("{:?}", self.log_level))
                        .show_ui(ui, |ui| {
                            for level in LEVEL_CHOICES {
                                if ui
                                    .selectable_label(self.log_level == level, format!("{:?}", level))
                                    .clicked()
                                {
                                    self.set_log_level(level);
                                }
                            }
                        });
                    if ui.small_button("Clear").clicked() {
                        self.console.clear();
                    }
                });
                let stats = self.mesh_cache.stats_snapshot();
                ui.weak(format!(
                    "Faces {}  culled {}  meshes {}  cache hits {} / misses {}",
                    self.last_paint_stats.faces,
                    self.last_paint_stats.culled,
                    stats.mesh_count,
                    stats.hits,
                    stats.misses
                ));
                let console_lines = self.console.snapshot();
                egui::ScrollArea::vertical()
                    .max_height(240.0)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in console_lines {
                            ui.monospace(line);
                        }
                    });
            });
    }
}
