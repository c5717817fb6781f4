// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Append-only log panel with per-line timestamps.

use eframe::egui;

/// One logged line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    pub stamp: String,
    pub text: String,
}

/// Backing store for the log panel.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct LogModel {
    lines: Vec<LogLine>,
}

impl LogModel {
    /// Append a line stamped with the local wall clock.
    pub fn push(&mut self, text: impl Into<String>) {
        self.lines.push(LogLine {
            stamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            text: text.into(),
        });
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Render the log, pinned to the newest line.
pub fn view(ui: &mut egui::Ui, model: &LogModel) {
    egui::ScrollArea::vertical()
        .id_salt("log_panel")
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if model.is_empty() {
                ui.label(
                    egui::RichText::new("Nothing logged yet.")
                        .italics()
                        .color(egui::Color32::from_gray(110)),
                );
                return;
            }
            for line in model.lines() {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(&line.stamp)
                            .monospace()
                            .color(egui::Color32::from_gray(140)),
                    );
                    ui.label(egui::RichText::new(&line.text).monospace());
                });
            }
        });
}
