use std::time::Duration;

use eframe::egui;
use furnish_core::{shortcut_for, KeyFocus, KeyOutcome};

use super::{FurnishApp, LoadState};

const ASSET_POLL_INTERVAL: Duration = Duration::from_millis(100);

impl eframe::App for FurnishApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = self.frame_dt();
        if self.controller.tick(dt) {
            ctx.request_repaint();
        }
        if self.refresh_presentations() {
            ctx.request_repaint_after(ASSET_POLL_INTERVAL);
        }

        if matches!(self.load_state, LoadState::Failed { .. }) {
            self.show_load_failure(ctx);
            self.notifications.show(ctx);
            return;
        }

        let revision = self.controller.session().revision();
        self.handle_shortcuts(ctx);
        self.show_top_bar(ctx);
        self.show_catalog_panel(ctx);
        self.show_room_panel(ctx);
        self.show_side_panels(ctx);
        self.show_central(ctx);
        self.show_save_dialog(ctx);
        self.show_delete_confirmation(ctx);
        self.notifications.show(ctx);

        if self.controller.session().revision() != revision || self.controller.is_dragging() {
            ctx.request_repaint();
        }
    }
}

impl FurnishApp {
    fn key_focus(&self, ctx: &egui::Context) -> KeyFocus {
        if ctx.wants_keyboard_input() || self.save_dialog.open {
            KeyFocus::TextInput
        } else {
            KeyFocus::Editor
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let focus = self.key_focus(ctx);
        let presses: Vec<(egui::Key, egui::Modifiers)> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        modifiers,
                        ..
                    } => Some((*key, *modifiers)),
                    _ => None,
                })
                .collect()
        });
        for (key, modifiers) in presses {
            let Some(command) = shortcut_for(key.name(), modifiers.command) else {
                continue;
            };
            match self.controller.handle_key(command, focus) {
                KeyOutcome::SaveRequested => self.request_save(),
                KeyOutcome::Handled => tracing::debug!("shortcut {:?}", command),
                KeyOutcome::Ignored => {}
            }
        }
    }

    fn show_load_failure(&mut self, ctx: &egui::Context) {
        let LoadState::Failed {
            design_id,
            message,
        } = self.load_state.clone()
        else {
            return;
        };
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.3);
                ui.heading("This design could not be loaded");
                ui.label(format!("{design_id}: {message}"));
                ui.add_space(12.0);
                if ui.button("Back to new design").clicked() {
                    self.start_new_design();
                }
                if ui.button("Try again").clicked() {
                    self.open_design(&design_id);
                }
            });
        });
    }

    fn show_save_dialog(&mut self, ctx: &egui::Context) {
        if !self.save_dialog.open {
            return;
        }
        let mut open = true;
        let mut submitted = false;
        egui::Window::new("Save design")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label("Design name");
                let response = ui.text_edit_singleline(&mut self.save_dialog.name);
                if !response.has_focus() && !response.lost_focus() {
                    response.request_focus();
                }
                let entered =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.horizontal(|ui| {
                    let can_save = !self.save_dialog.name.trim().is_empty();
                    if ui.add_enabled(can_save, egui::Button::new("Save")).clicked()
                        || (entered && can_save)
                    {
                        submitted = true;
                    }
                    if ui.button("Cancel").clicked() {
                        self.save_dialog.open = false;
                    }
                });
            });
        if !open {
            self.save_dialog.open = false;
        }
        if submitted {
            let name = std::mem::take(&mut self.save_dialog.name);
            self.save_with_name(&name);
        }
    }

    fn show_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(summary) = self.designs.pending_delete.clone() else {
            return;
        };
        let mut decision = None;
        egui::Window::new("Delete design")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!("Delete \"{}\"? This cannot be undone.", summary.name));
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });
        match decision {
            Some(true) => {
                self.designs.pending_delete = None;
                self.delete_design(&summary.id);
            }
            Some(false) => self.designs.pending_delete = None,
            None => {}
        }
    }
}
