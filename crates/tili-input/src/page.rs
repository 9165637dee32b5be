//! Host UI surface consumed by the input layer

use crate::section::Section;

/// Interactive element on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    /// Stable identifier within the page
    pub id: String,
    /// Accessible name
    pub label: String,
    /// Role ("button", "link", "textbox")
    pub role: String,
    /// Accessible description, if any
    pub description: Option<String>,
}

impl ElementRef {
    /// Create element reference
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            role: role.into(),
            description: None,
        }
    }

    /// With accessible description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Short spoken form: "label. description" or "label, role"
    #[must_use]
    pub fn spoken(&self) -> String {
        match &self.description {
            Some(description) => format!("{}. {description}", self.label),
            None => format!("{}, {}", self.label, self.role),
        }
    }
}

/// Queries and actions on the rendered page
pub trait PageSurface: Send + Sync {
    /// Name of the current page ("dashboard")
    fn current_location(&self) -> String;

    /// Element holding focus
    fn focused(&self) -> Option<ElementRef>;

    /// Focusable elements in tab order
    fn focusable(&self) -> Vec<ElementRef>;

    /// Element carrying the navigation tag for `section`
    fn element_for(&self, section: Section) -> Option<ElementRef>;

    /// Move focus; returns whether the element accepted it
    fn focus(&self, element: &ElementRef) -> bool;

    /// Trigger the element's default action
    fn activate(&self, element: &ElementRef) -> bool;

    /// First heading of the page
    fn page_title(&self) -> Option<String>;

    /// Text of the main content region
    fn main_text(&self) -> String;

    /// Close the open modal dialog; returns whether one was open
    fn close_dialog(&self) -> bool;

    /// Focus the main content region; returns whether it exists
    fn focus_main(&self) -> bool;
}

/// Routing and session collaborator
pub trait Navigator: Send + Sync {
    /// Show `section`
    fn navigate(&self, section: Section);

    /// End the user's session
    fn logout(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spoken_form_prefers_description() {
        let plain = ElementRef::new("save", "Save", "button");
        assert_eq!(plain.spoken(), "Save, button");

        let described = plain.with_description("Stores the form");
        assert_eq!(described.spoken(), "Save. Stores the form");
    }
}
