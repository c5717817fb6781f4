// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Keyword list editor: entry field, add button, multi-select list and
//! removal of the highlighted entries.

use std::collections::BTreeSet;

use eframe::egui;

/// UI model for the keyword list, kept free of side effects.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct KeywordsModel {
    entry: String,
    keywords: Vec<String>,
    selected: BTreeSet<usize>,
}

/// Messages emitted by the keywords view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeywordsMsg {
    EntryChanged(String),
    Add,
    ToggleSelected(usize),
    RemoveSelected,
}

/// How the shell should surface a keyword event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeywordsEventKind {
    /// Append to the log panel.
    Log,
    /// Blocking info notice.
    Info,
    /// Blocking warning.
    Warning,
}

/// User-facing feedback produced by an update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordsEvent {
    pub message: String,
    pub kind: KeywordsEventKind,
}

impl KeywordsModel {
    /// Current keywords as a slice.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Apply a message to the model. Returns feedback events when relevant.
pub fn update(model: &mut KeywordsModel, msg: KeywordsMsg) -> Vec<KeywordsEvent> {
    match msg {
        KeywordsMsg::EntryChanged(text) => {
            model.entry = text;
            Vec::new()
        }
        KeywordsMsg::Add => add_from_entry(model),
        KeywordsMsg::ToggleSelected(index) => {
            if index < model.keywords.len() && !model.selected.remove(&index) {
                model.selected.insert(index);
            }
            Vec::new()
        }
        KeywordsMsg::RemoveSelected => remove_selected(model),
    }
}

/// Validate the entry field and append it to the list. Duplicates are
/// byte-for-byte: "Name" and "name" are two different keywords.
fn add_from_entry(model: &mut KeywordsModel) -> Vec<KeywordsEvent> {
    let keyword = model.entry.trim().to_string();
    if keyword.is_empty() {
        return vec![KeywordsEvent {
            message: "Please enter a keyword.".into(),
            kind: KeywordsEventKind::Warning,
        }];
    }
    if model.keywords.contains(&keyword) {
        return vec![KeywordsEvent {
            message: format!("Keyword '{keyword}' is already in the list."),
            kind: KeywordsEventKind::Info,
        }];
    }

    model.keywords.push(keyword.clone());
    model.entry.clear();
    vec![KeywordsEvent {
        message: format!("Added keyword: {keyword}"),
        kind: KeywordsEventKind::Log,
    }]
}

/// Remove every highlighted entry, highest index first so earlier removals
/// do not shift the indices still pending.
fn remove_selected(model: &mut KeywordsModel) -> Vec<KeywordsEvent> {
    if model.selected.is_empty() {
        return vec![KeywordsEvent {
            message: "Please select a keyword to remove.".into(),
            kind: KeywordsEventKind::Warning,
        }];
    }

    let mut events = Vec::new();
    for index in model.selected.iter().rev() {
        if *index < model.keywords.len() {
            let keyword = model.keywords.remove(*index);
            events.push(KeywordsEvent {
                message: format!("Removed keyword: {keyword}"),
                kind: KeywordsEventKind::Log,
            });
        }
    }
    model.selected.clear();
    events
}

/// Render the keywords UI and return any messages triggered by the user.
pub fn view(ui: &mut egui::Ui, model: &KeywordsModel) -> Vec<KeywordsMsg> {
    let mut msgs = Vec::new();

    egui::CollapsingHeader::new("Keywords")
        .default_open(true)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                let mut entry = model.entry.clone();
                let response = ui.add(
                    egui::TextEdit::singleline(&mut entry)
                        .hint_text("e.g., confidential")
                        .desired_width(240.0),
                );
                if response.changed() {
                    msgs.push(KeywordsMsg::EntryChanged(entry.clone()));
                }
                if response.lost_focus() && ui.input(|inp| inp.key_pressed(egui::Key::Enter)) {
                    msgs.push(KeywordsMsg::Add);
                }

                if ui
                    .add(egui::Button::new(format!(
                        "{} Add",
                        egui_phosphor::regular::PLUS
                    )))
                    .clicked()
                {
                    msgs.push(KeywordsMsg::Add);
                }
            });

            ui.add_space(4.0);
            ui.label(
                egui::RichText::new("Matching is exact and case-sensitive.")
                    .small()
                    .color(egui::Color32::from_gray(110)),
            );

            ui.add_space(8.0);
            render_list(ui, model, &mut msgs);

            ui.add_space(6.0);
            if ui
                .button(format!(
                    "{} Remove selected",
                    egui_phosphor::regular::TRASH_SIMPLE
                ))
                .clicked()
            {
                msgs.push(KeywordsMsg::RemoveSelected);
            }
        });

    msgs
}

/// List of keywords as a multi-select; clicking an entry toggles its
/// highlight.
fn render_list(ui: &mut egui::Ui, model: &KeywordsModel, msgs: &mut Vec<KeywordsMsg>) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        egui::ScrollArea::vertical()
            .id_salt("keyword_list")
            .max_height(120.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                if model.keywords.is_empty() {
                    ui.label(
                        egui::RichText::new("No keywords added yet.")
                            .italics()
                            .color(egui::Color32::from_gray(110)),
                    );
                    return;
                }
                for (index, keyword) in model.keywords.iter().enumerate() {
                    if ui
                        .selectable_label(model.selected.contains(&index), keyword)
                        .clicked()
                    {
                        msgs.push(KeywordsMsg::ToggleSelected(index));
                    }
                }
            });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(model: &mut KeywordsModel, keyword: &str) -> Vec<KeywordsEvent> {
        update(model, KeywordsMsg::EntryChanged(keyword.into()));
        update(model, KeywordsMsg::Add)
    }

    #[test]
    fn add_trims_and_clears_the_entry() {
        let mut model = KeywordsModel::default();
        let events = add(&mut model, "  secret  ");

        assert_eq!(model.keywords(), ["secret"]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, KeywordsEventKind::Log);
        assert!(model.entry.is_empty());
    }

    #[test]
    fn empty_entry_warns_without_changing_state() {
        let mut model = KeywordsModel::default();
        let events = add(&mut model, "   ");

        assert!(model.keywords().is_empty());
        assert_eq!(events[0].kind, KeywordsEventKind::Warning);
    }

    #[test]
    fn duplicate_add_is_an_info_no_op() {
        let mut model = KeywordsModel::default();
        add(&mut model, "secret");
        let events = add(&mut model, "secret");

        assert_eq!(model.keywords(), ["secret"]);
        assert_eq!(events[0].kind, KeywordsEventKind::Info);
        // The entry keeps its text so the user sees what was rejected.
        assert_eq!(model.entry, "secret");
    }

    #[test]
    fn casing_differences_are_distinct_keywords() {
        let mut model = KeywordsModel::default();
        add(&mut model, "Name");
        let events = add(&mut model, "name");

        assert_eq!(model.keywords(), ["Name", "name"]);
        assert_eq!(events[0].kind, KeywordsEventKind::Log);
    }

    #[test]
    fn remove_without_highlight_warns() {
        let mut model = KeywordsModel::default();
        add(&mut model, "one");

        let events = update(&mut model, KeywordsMsg::RemoveSelected);

        assert_eq!(events[0].kind, KeywordsEventKind::Warning);
        assert_eq!(model.keywords(), ["one"]);
    }

    #[test]
    fn multi_selection_removal_keeps_unselected_order() {
        let mut model = KeywordsModel::default();
        for kw in ["a", "b", "c", "d", "e"] {
            add(&mut model, kw);
        }
        update(&mut model, KeywordsMsg::ToggleSelected(0));
        update(&mut model, KeywordsMsg::ToggleSelected(2));
        update(&mut model, KeywordsMsg::ToggleSelected(4));

        let events = update(&mut model, KeywordsMsg::RemoveSelected);

        assert_eq!(model.keywords(), ["b", "d"]);
        assert_eq!(events.len(), 3);
        assert!(model.selected.is_empty());
        // Highest index first, so the logged order is e, c, a.
        assert!(events[0].message.contains('e'));
        assert!(events[2].message.contains('a'));
    }

    #[test]
    fn toggle_flips_highlight_state() {
        let mut model = KeywordsModel::default();
        add(&mut model, "one");

        update(&mut model, KeywordsMsg::ToggleSelected(0));
        assert!(model.selected.contains(&0));
        update(&mut model, KeywordsMsg::ToggleSelected(0));
        assert!(model.selected.is_empty());
        // Out-of-range toggles are ignored.
        update(&mut model, KeywordsMsg::ToggleSelected(7));
        assert!(model.selected.is_empty());
    }
}
