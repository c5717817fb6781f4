// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! PDF file selection: a picker trigger plus a selected-count label.
//!
//! The selection is replaced wholesale on every confirmed dialog; a
//! cancelled dialog keeps whatever was selected before.

use std::path::PathBuf;

use eframe::egui;

/// MVU state for the file selection.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct FilesModel {
    files: Vec<PathBuf>,
}

/// Messages emitted by the files view and the picker dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilesMsg {
    PickRequested,
    /// Dialog result; empty means the user cancelled.
    Picked(Vec<PathBuf>),
}

/// Side-effectful commands to run off the UI path.
pub enum FilesCommand {
    PickFiles,
}

impl FilesModel {
    /// Currently selected files, in selection order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Apply a message. Returns log lines for the shell's log panel.
pub fn update(
    model: &mut FilesModel,
    msg: FilesMsg,
    cmds: &mut Vec<FilesCommand>,
) -> Vec<String> {
    match msg {
        FilesMsg::PickRequested => {
            cmds.push(FilesCommand::PickFiles);
            Vec::new()
        }
        FilesMsg::Picked(paths) => {
            if paths.is_empty() {
                return vec!["No files selected.".to_string()];
            }
            let mut lines = vec![format!("Selected {} file(s):", paths.len())];
            lines.extend(paths.iter().map(|p| format!("  {}", p.display())));
            model.files = paths;
            lines
        }
    }
}

/// Render the picker trigger and the selected-count label.
pub fn view(ui: &mut egui::Ui, model: &FilesModel) -> Vec<FilesMsg> {
    let mut msgs = Vec::new();

    ui.horizontal(|ui| {
        if ui
            .add(egui::Button::new(format!(
                "{} Select PDF files…",
                egui_phosphor::regular::FILE_PDF
            )))
            .clicked()
        {
            msgs.push(FilesMsg::PickRequested);
        }

        let label = match model.files.len() {
            0 => "No files selected".to_string(),
            n => format!("{n} file(s) selected"),
        };
        ui.label(egui::RichText::new(label).color(egui::Color32::from_gray(110)));
    });

    msgs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_request_enqueues_the_dialog_command() {
        let mut model = FilesModel::default();
        let mut cmds = Vec::new();

        let lines = update(&mut model, FilesMsg::PickRequested, &mut cmds);

        assert!(lines.is_empty());
        assert!(matches!(cmds.as_slice(), [FilesCommand::PickFiles]));
    }

    #[test]
    fn picked_files_replace_the_selection() {
        let mut model = FilesModel {
            files: vec![PathBuf::from("old.pdf")],
        };
        let mut cmds = Vec::new();

        let lines = update(
            &mut model,
            FilesMsg::Picked(vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")]),
            &mut cmds,
        );

        assert_eq!(model.files().len(), 2);
        assert_eq!(model.files()[0], PathBuf::from("a.pdf"));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Selected 2 file(s):");
    }

    #[test]
    fn cancelled_dialog_keeps_the_prior_selection() {
        let mut model = FilesModel {
            files: vec![PathBuf::from("keep.pdf")],
        };
        let mut cmds = Vec::new();

        let lines = update(&mut model, FilesMsg::Picked(Vec::new()), &mut cmds);

        assert_eq!(model.files(), [PathBuf::from("keep.pdf")]);
        assert_eq!(lines, ["No files selected."]);
    }
}
