//! Narration composition
//!
//! A [`Narration`] collects structured facts about an element and renders
//! them in a fixed order:
//!
//! element name, ordinal, spatial position, direction, purpose,
//! side-effect warning, next-action hint
//!
//! Each present part becomes one sentence.

/// Position of an item within a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordinal {
    /// Zero-based index
    pub index: usize,
    /// Number of items
    pub total: usize,
}

impl Ordinal {
    /// Ordinal for item `index` (zero-based) of `total`
    #[inline]
    #[must_use]
    pub fn new(index: usize, total: usize) -> Self {
        Self { index, total }
    }

    /// Spoken form, `None` for an empty list
    #[must_use]
    pub fn phrase(self) -> Option<String> {
        match self.total {
            0 => None,
            1 => Some("the only item".to_string()),
            total if self.index == 0 => Some(format!("first of {total}")),
            total if self.index + 1 >= total => Some(format!("last of {total}")),
            total => Some(format!("item {} of {total}", self.index + 1)),
        }
    }
}

/// Builder for element narration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Narration {
    name: String,
    ordinal: Option<Ordinal>,
    position: Option<String>,
    direction: Option<String>,
    purpose: Option<String>,
    warning: Option<String>,
    hint: Option<String>,
}

impl Narration {
    /// Narration for the element called `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// With list position
    #[inline]
    #[must_use]
    pub fn with_ordinal(mut self, index: usize, total: usize) -> Self {
        self.ordinal = Some(Ordinal::new(index, total));
        self
    }

    /// With spatial position ("at the top right of the page")
    #[inline]
    #[must_use]
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    /// With directional instruction ("press Tab twice")
    #[inline]
    #[must_use]
    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    /// With purpose
    #[inline]
    #[must_use]
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// With side-effect warning
    #[inline]
    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// With next-action hint
    #[inline]
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Element name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render to a single string
    #[must_use]
    pub fn compose(&self) -> String {
        let ordinal = self.ordinal.and_then(Ordinal::phrase);
        let warning = self.warning.as_deref().map(|w| format!("Warning: {}", trim_stop(w)));
        let parts = [
            Some(self.name.as_str()),
            ordinal.as_deref(),
            self.position.as_deref(),
            self.direction.as_deref(),
            self.purpose.as_deref(),
            warning.as_deref(),
            self.hint.as_deref(),
        ];
        sentences(parts.into_iter().flatten())
    }
}

/// Join parts into sentences, one per non-empty part
#[must_use]
pub fn sentences<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for part in parts {
        let part = trim_stop(part);
        if part.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&capitalize(part));
        out.push('.');
    }
    out
}

/// Count with the right noun form; zero reads as "no documents"
#[must_use]
pub fn count_phrase(count: usize, singular: &str, plural: &str) -> String {
    match count {
        0 => format!("no {plural}"),
        1 => format!("1 {singular}"),
        n => format!("{n} {plural}"),
    }
}

/// "a", "a and b", "a, b and c"
#[must_use]
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{} and {}", head.join(", "), last.as_ref())
        }
    }
}

fn trim_stop(text: &str) -> &str {
    text.trim().trim_end_matches('.').trim_end()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
