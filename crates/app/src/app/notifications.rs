use std::collections::VecDeque;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use eframe::egui;

pub(crate) const TOAST_LIFETIME: Duration = Duration::from_secs(3);
const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub(crate) struct Toast {
    pub(crate) kind: ToastKind,
    pub(crate) message: String,
    shown_at: Instant,
}

/// Short-lived messages stacked in the bottom-right corner.
#[derive(Debug, Default)]
pub(crate) struct Notifications {
    toasts: VecDeque<Toast>,
}

impl Notifications {
    pub(crate) fn success(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into(), Instant::now());
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Error, message.into(), Instant::now());
    }

    fn push(&mut self, kind: ToastKind, message: String, now: Instant) {
        self.toasts.push_back(Toast {
            kind,
            message,
            shown_at: now,
        });
        while self.toasts.len() > MAX_TOASTS {
            self.toasts.pop_front();
        }
    }

    /// Drops expired toasts and returns how long until the next one expires.
    pub(crate) fn expire(&mut self, now: Instant) -> Option<Duration> {
        self.toasts
            .retain(|toast| now.duration_since(toast.shown_at) < TOAST_LIFETIME);
        self.toasts
            .iter()
            .map(|toast| TOAST_LIFETIME.saturating_sub(now.duration_since(toast.shown_at)))
            .min()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub(crate) fn show(&mut self, ctx: &egui::Context) {
        if let Some(remaining) = self.expire(Instant::now()) {
            ctx.request_repaint_after(remaining);
        }
        if self.toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in self.iter() {
                    let fill = match toast.kind {
                        ToastKind::Success => egui::Color32::from_rgb(0x16, 0xa3, 0x4a),
                        ToastKind::Error => egui::Color32::from_rgb(0xdc, 0x26, 0x26),
                    };
                    egui::Frame::new()
                        .fill(fill)
                        .corner_radius(6.0)
                        .inner_margin(egui::Margin::symmetric(12, 8))
                        .show(ui, |ui| {
                            ui.colored_label(egui::Color32::WHITE, &toast.message);
                        });
                    ui.add_space(6.0);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_three_seconds() {
        let mut notifications = Notifications::default();
        let start = Instant::now();
        notifications.push(ToastKind::Success, "Design saved".to_string(), start);
        notifications.push(
            ToastKind::Error,
            "Save failed".to_string(),
            start + Duration::from_secs(2),
        );

        let remaining = notifications.expire(start + Duration::from_secs(1));
        assert_eq!(remaining, Some(Duration::from_secs(2)));
        assert_eq!(notifications.iter().count(), 2);

        notifications.expire(start + Duration::from_secs(3));
        let kinds: Vec<ToastKind> = notifications.iter().map(|toast| toast.kind).collect();
        assert_eq!(kinds, vec![ToastKind::Error]);
        assert_eq!(notifications.expire(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn queue_is_bounded() {
        let mut notifications = Notifications::default();
        for index in 0..10 {
            notifications.error(format!("error {index}"));
        }
        assert_eq!(notifications.iter().count(), MAX_TOASTS);
        assert_eq!(notifications.iter().next().map(|t| t.message.as_str()), Some("error 6"));
    }
}
