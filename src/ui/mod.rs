// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Top-level egui application shell for the redactor.
//! Handles layout, the notice modal, and wiring to the command workers.

pub mod components;

use eframe::egui;

use crate::mvu::{self, AppModel, Command, Msg};
use crate::ui::components::{files, keywords, log};

/// Stateful egui application driving the redaction workflow.
pub struct BlackoutApp {
    model: AppModel,
    inbox: Vec<Msg>,
    cmd_tx: crossbeam_channel::Sender<Command>,
    msg_rx: crossbeam_channel::Receiver<Msg>,
}

impl Default for BlackoutApp {
    fn default() -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<Command>();
        let (msg_tx, msg_rx) = crossbeam_channel::unbounded::<Msg>();

        // A small pool is plenty: batches are sequential by construction,
        // the workers mostly keep dialogs off the UI thread.
        let threads = std::thread::available_parallelism()
            .map(|n| n.get().clamp(2, 4))
            .unwrap_or(2);
        for _ in 0..threads {
            let cmd_rx = cmd_rx.clone();
            let msg_tx = msg_tx.clone();
            std::thread::spawn(move || {
                for cmd in cmd_rx.iter() {
                    let msg = mvu::run_command(cmd);
                    let _ = msg_tx.send(msg);
                }
            });
        }

        Self {
            model: AppModel::default(),
            inbox: Vec::new(),
            cmd_tx,
            msg_rx,
        }
    }
}

impl eframe::App for BlackoutApp {
    // The root rendering is driven from `update(ctx)` below, which eframe
    // still invokes every frame; the trait's required `ui` entry point is a
    // no-op here.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    #[allow(deprecated)]
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_spacing(ctx);

        // Pull messages produced by the command workers.
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.model.pending_commands = self.model.pending_commands.saturating_sub(1);
            self.inbox.push(msg);
        }

        // Process pending messages in arrival order.
        for msg in std::mem::take(&mut self.inbox) {
            let mut commands = Vec::new();
            mvu::update(&mut self.model, msg, &mut commands);
            for cmd in commands {
                if self.cmd_tx.send(cmd).is_ok() {
                    self.model.pending_commands += 1;
                }
            }
        }

        // Keep repainting while workers are busy so their results show up
        // without waiting for user input.
        if self.model.pending_commands > 0 {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading("Blackout");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_theme_controls(ui);
                    ui.separator();
                    self.render_process_button(ui);
                });
            });
            ui.add_space(4.0);
        });

        self.render_notice_modal(ctx);

        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .default_height(180.0)
            .min_height(100.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                self.render_status(ui);
                ui.separator();
                log::view(ui, &self.model.log);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            let processing = self.model.batch.is_some();
            // No cancellation: inputs freeze until the batch finishes.
            ui.add_enabled_ui(!processing, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_files_section(ui);
                    ui.add_space(12.0);

                    let kw_msgs = keywords::view(ui, &self.model.keywords);
                    self.inbox.extend(kw_msgs.into_iter().map(Msg::Keywords));
                    ui.add_space(8.0);
                });
            });
        });
    }
}

impl BlackoutApp {
    fn ensure_spacing(&self, ctx: &egui::Context) {
        ctx.style_mut(|style| {
            style.spacing.item_spacing = egui::vec2(6.0, 6.0);
        });
    }

    fn render_theme_controls(&mut self, ui: &mut egui::Ui) {
        ui.add_space(2.0);
        egui::widgets::global_theme_preference_switch(ui);
    }

    /// Render the processing trigger. Preconditions (files and keywords
    /// present) are checked by the update function so their warnings match
    /// the rest of the flow; the button only locks while a batch runs.
    fn render_process_button(&mut self, ui: &mut egui::Ui) {
        let processing = self.model.batch.is_some();
        let button = egui::Button::new(format!(
            "{} Start processing",
            egui_phosphor::regular::PLAY
        ));

        if ui
            .add_enabled(!processing, button)
            .on_disabled_hover_text("A batch is already running")
            .clicked()
        {
            self.inbox.push(Msg::ProcessRequested);
        }
    }

    /// File selection group: picker, count label, and the output folder.
    fn render_files_section(&mut self, ui: &mut egui::Ui) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());

            let file_msgs = files::view(ui, &self.model.files);
            self.inbox.extend(file_msgs.into_iter().map(Msg::Files));

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label("Output folder:");
                ui.label(
                    egui::RichText::new(self.model.output_dir.display().to_string())
                        .monospace()
                        .color(egui::Color32::from_gray(110)),
                );
            });
            ui.horizontal(|ui| {
                if ui
                    .button(format!("{} Choose…", egui_phosphor::regular::FOLDER_OPEN))
                    .clicked()
                {
                    self.inbox.push(Msg::OutputDirRequested);
                }
                if ui
                    .button(format!(
                        "{} Open",
                        egui_phosphor::regular::ARROW_SQUARE_OUT
                    ))
                    .on_hover_text("Open the output folder in your file manager")
                    .clicked()
                {
                    self.inbox.push(Msg::OpenOutputDirRequested);
                }
            });
        });
    }

    /// Render a blocking modal for warnings, info notices and completion.
    fn render_notice_modal(&mut self, ctx: &egui::Context) {
        if let Some(notice) = self.model.notice.clone() {
            egui::Window::new(notice.title)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(notice.message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.inbox.push(Msg::DismissNotice);
                    }
                });
        }
    }

    /// Render the latest status message when present.
    fn render_status(&self, ui: &mut egui::Ui) {
        if let Some(text) = &self.model.status {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(text).color(egui::Color32::from_gray(110)));
                if self.model.pending_commands > 0 {
                    ui.add(egui::Spinner::new().size(14.0));
                }
            });
        } else {
            ui.label(
                egui::RichText::new("Select files and add keywords to begin.")
                    .color(egui::Color32::from_gray(110)),
            );
        }
    }
}
