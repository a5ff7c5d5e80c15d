//! Typed mutation requests queued for single-threaded application.
//!
//! A [`Command`] pairs a [`TypeTag`] with a [`Payload`]. Well-known tags cover
//! the properties every entity has; entities add their own through
//! [`TypeTag::Local`]. Names that do not map to any known tag parse to
//! [`TypeTag::Unknown`] so they can still be queued, logged and discarded.

use crate::components::color::Color;
use crate::components::geometry::Vec2;
use crate::components::payload::Payload;
use std::fmt;

/// Discriminator selecting the handler a command is dispatched to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    BgColor,
    FgColor,
    HoverColor,
    ActiveColor,
    Size,
    Text,
    Tooltip,
    Visible,
    Enabled,
    Selected,
    Collapsed,
    SetTree,
    SetRows,
    SetLocations,
    SetPreset,
    /// Entity-local property or action.
    Local(&'static str),
    /// A tag name nothing recognises.
    Unknown(String),
}

const WELL_KNOWN: &[(&str, TypeTag)] = &[
    ("bg_color", TypeTag::BgColor),
    ("fg_color", TypeTag::FgColor),
    ("hover_color", TypeTag::HoverColor),
    ("active_color", TypeTag::ActiveColor),
    ("size", TypeTag::Size),
    ("text", TypeTag::Text),
    ("tooltip", TypeTag::Tooltip),
    ("visible", TypeTag::Visible),
    ("enabled", TypeTag::Enabled),
    ("selected", TypeTag::Selected),
    ("collapsed", TypeTag::Collapsed),
    ("set_tree", TypeTag::SetTree),
    ("set_rows", TypeTag::SetRows),
    ("set_locations", TypeTag::SetLocations),
    ("set_preset", TypeTag::SetPreset),
];

impl TypeTag {
    /// Parse a well-known tag name. Anything else becomes [`TypeTag::Unknown`].
    pub fn from_name(name: &str) -> TypeTag {
        WELL_KNOWN
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, tag)| tag.clone())
            .unwrap_or_else(|| TypeTag::Unknown(name.to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            TypeTag::Local(n) => *n,
            TypeTag::Unknown(n) => n.as_str(),
            known => WELL_KNOWN
                .iter()
                .find(|(_, tag)| tag == known)
                .map(|(n, _)| *n)
                .unwrap_or("?"),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    pub tag: TypeTag,
    pub data: Payload,
}

impl Command {
    pub fn new(tag: TypeTag, data: impl Into<Payload>) -> Self {
        Command {
            tag,
            data: data.into(),
        }
    }

    /// Command with no payload, for actions.
    pub fn action(tag: TypeTag) -> Self {
        Command {
            tag,
            data: Payload::None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Command::new(TypeTag::Text, Payload::Text(text.into()))
    }

    pub fn bg_color(color: Color) -> Self {
        Command::new(TypeTag::BgColor, color)
    }

    pub fn hover_color(color: Color) -> Self {
        Command::new(TypeTag::HoverColor, color)
    }

    pub fn size(size: Vec2) -> Self {
        Command::new(TypeTag::Size, size)
    }

    pub fn visible(visible: bool) -> Self {
        Command::new(TypeTag::Visible, visible)
    }

    pub fn enabled(enabled: bool) -> Self {
        Command::new(TypeTag::Enabled, enabled)
    }
}
