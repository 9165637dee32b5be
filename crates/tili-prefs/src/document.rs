//! Projection of presentation flags onto the document root

use crate::config::Configuration;

/// Attribute sink for the rendered document's root element
pub trait DocumentRoot: Send + Sync {
    /// Set a `data-*` attribute
    fn set_attribute(&self, name: &str, value: &str);

    /// Set a CSS custom property
    fn set_style_property(&self, name: &str, value: &str);
}

/// Root that discards every write
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDocumentRoot;

impl DocumentRoot for NullDocumentRoot {
    fn set_attribute(&self, _name: &str, _value: &str) {}

    fn set_style_property(&self, _name: &str, _value: &str) {}
}

/// Attribute name for the text size preset
pub const FONT_SIZE_ATTR: &str = "data-font-size";
/// Attribute name for the contrast mode
pub const CONTRAST_ATTR: &str = "data-contrast";
/// Attribute name for focus mode
pub const FOCUS_MODE_ATTR: &str = "data-focus-mode";
/// Custom property driving transition durations
pub const TRANSITION_SPEED_PROP: &str = "--transition-speed";

/// Attribute values derived from `config`
#[must_use]
pub fn attributes(config: &Configuration) -> [(&'static str, &'static str); 3] {
    [
        (FONT_SIZE_ATTR, config.font_size.as_str()),
        (CONTRAST_ATTR, config.contrast.as_str()),
        (FOCUS_MODE_ATTR, if config.focus_mode { "true" } else { "false" }),
    ]
}

/// Transition speed for `config`
#[inline]
#[must_use]
pub fn transition_speed(config: &Configuration) -> &'static str {
    if config.reduced_motion {
        "0s"
    } else {
        "0.2s"
    }
}

/// Write every presentation attribute of `config` to `root`
pub fn project(config: &Configuration, root: &dyn DocumentRoot) {
    for (name, value) in attributes(config) {
        root.set_attribute(name, value);
    }
    root.set_style_property(TRANSITION_SPEED_PROP, transition_speed(config));
}
