//! Discord embed wire types.
//!
//! Field names follow the Discord webhook API; optional members are left
//! out of the JSON entirely when unset.

use serde::{Deserialize, Serialize};

/// Zero-width space: Discord rejects empty field names/values.
pub const ZERO_WIDTH_SPACE: &str = "\u{200B}";

/// Maximum number of fields Discord accepts in one embed.
pub const MAX_FIELDS: usize = 25;
/// Maximum length of a field value.
pub const MAX_FIELD_VALUE: usize = 1024;
/// Maximum length of an embed description.
pub const MAX_DESCRIPTION: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    /// ISO 8601 timestamp shown next to the footer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>, description: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: clip(&description.into(), MAX_DESCRIPTION),
            color,
            fields: Vec::new(),
            image: None,
            thumbnail: None,
            footer: None,
            timestamp: None,
        }
    }

    /// Append a field unless the embed is already full.
    pub fn push_field(&mut self, field: EmbedField) {
        if self.fields.len() < MAX_FIELDS {
            self.fields.push(field);
        }
    }

    /// Every user-visible string of the embed.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        [self.title.as_str(), self.description.as_str()]
            .into_iter()
            .chain(
                self.fields
                    .iter()
                    .flat_map(|f| [f.name.as_str(), f.value.as_str()]),
            )
            .chain(self.footer.iter().map(|f| f.text.as_str()))
    }

    pub(crate) fn map_texts(&mut self, f: impl Fn(&str) -> String) {
        self.title = f(&self.title);
        self.description = f(&self.description);
        for field in &mut self.fields {
            field.name = f(&field.name);
            field.value = f(&field.value);
        }
        if let Some(footer) = &mut self.footer {
            footer.text = f(&footer.text);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

impl EmbedField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: clip(&value.into(), MAX_FIELD_VALUE),
            inline,
        }
    }

    /// Full-width blank field that forces a new row of inline fields.
    pub fn spacer() -> Self {
        Self::new(ZERO_WIDTH_SPACE, ZERO_WIDTH_SPACE, false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedMedia {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Truncate to at most `max` characters, marking the cut with `…`.
pub fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
