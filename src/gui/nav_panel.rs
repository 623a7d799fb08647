//! Navigation Panel Widget
//! Left side panel with page and variable selection.

use crate::data::ClimateVariable;
use egui::{Color32, ComboBox, RichText};

/// Dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Prediction,
    Validity,
    Profile,
}

impl Page {
    pub const ALL: [Page; 3] = [Self::Prediction, Self::Validity, Self::Profile];

    pub fn title(self) -> &'static str {
        match self {
            Self::Prediction => "Visualization & Prediction",
            Self::Validity => "Validity Test",
            Self::Profile => "Researcher Profile",
        }
    }
}

/// Current user selection
#[derive(Debug, Default, Clone)]
pub struct UserSettings {
    pub page: Page,
    pub variable: ClimateVariable,
    pub open_after_export: bool,
}

/// Left side panel with navigation controls and load status.
pub struct NavigationPanel {
    pub settings: UserSettings,
    pub status: String,
}

impl Default for NavigationPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            status: "Ready".to_string(),
        }
    }
}

impl NavigationPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the navigation panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> NavigationAction {
        let mut action = NavigationAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📌 Navigation Menu")
                    .size(20.0)
                    .color(Color32::from_rgb(11, 60, 93)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Page Section =====
        ui.label(RichText::new("Choose Page:").size(14.0).strong());
        ui.add_space(5.0);

        for page in Page::ALL {
            if ui
                .radio_value(&mut self.settings.page, page, page.title())
                .changed()
            {
                action = NavigationAction::PageChanged(page);
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Variable Section =====
        ui.label(RichText::new("Choose Parameter:").size(14.0).strong());
        ui.add_space(5.0);

        ComboBox::from_id_salt("variable")
            .width(280.0)
            .selected_text(self.settings.variable.label())
            .show_ui(ui, |ui| {
                for var in ClimateVariable::ALL {
                    if ui
                        .selectable_value(&mut self.settings.variable, var, var.label())
                        .changed()
                    {
                        action = NavigationAction::VariableChanged(var);
                    }
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        ui.checkbox(&mut self.settings.open_after_export, "Open exported charts");

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Exported") || self.status.contains("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set status line
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by the navigation panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationAction {
    None,
    PageChanged(Page),
    VariableChanged(ClimateVariable),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_titles() {
        let titles: Vec<&str> = Page::ALL.iter().map(|p| p.title()).collect();
        assert_eq!(
            titles,
            vec!["Visualization & Prediction", "Validity Test", "Researcher Profile"]
        );
        assert_eq!(Page::default(), Page::Prediction);
    }
}
