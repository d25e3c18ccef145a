//! Outline node model — the four entry kinds of a directory document.

use std::collections::BTreeMap;

use crate::error::FormatError;

/// Index of a node in the [`crate::tree::Tree`] arena. Stable for the
/// life of the process; nodes are never removed from the arena, so an id
/// doubles as the node's identity (favourites membership compares ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Attribute map of an outline element. Unique keys; insertion order is
/// not significant for round-tripping.
pub type Attributes = BTreeMap<String, String>;

/// Variant-specific state of an outline entry.
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineKind {
    /// Plain container, children present at construction.
    Branch { collapsed: bool },
    /// Container whose children live in a separate remote document,
    /// fetched once on first activation.
    Link {
        url: String,
        loaded: bool,
        collapsed: bool,
    },
    /// Playable station leaf. `url` points at a playlist whose first
    /// line is the actual stream location.
    Audio {
        url: String,
        bitrate: u32,
        reliability: u8,
        formats: String,
        secondary: String,
    },
    /// The locally stored favourites list.
    Favourites { collapsed: bool, dirty: bool },
}

#[derive(Debug, Clone)]
pub struct OutlineNode {
    pub text: String,
    pub attributes: Attributes,
    pub children: Vec<NodeId>,
    pub kind: OutlineKind,
}

/// The four display columns of a row: title (~half width), secondary
/// text, a 4-char data column and a 5-char data column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowText {
    pub title: String,
    pub secondary: String,
    pub data0: String,
    pub data1: String,
}

/// Upgrade an insecure `URL` attribute to https. Applied once when the
/// node is built from its source element, never re-applied on
/// serialization. Idempotent by construction.
pub(crate) fn upgrade_url_scheme(attributes: &mut Attributes) {
    if let Some(url) = attributes.get_mut("URL") {
        if let Some(rest) = url.strip_prefix("http://") {
            *url = format!("https://{rest}");
        }
    }
}

impl OutlineNode {
    pub fn branch(text: String, attributes: Attributes) -> Self {
        Self {
            text,
            attributes,
            children: Vec::new(),
            kind: OutlineKind::Branch { collapsed: true },
        }
    }

    pub fn link(text: String, attributes: Attributes) -> Result<Self, FormatError> {
        let url = attributes
            .get("URL")
            .cloned()
            .ok_or(FormatError::MissingAttribute("URL"))?;
        Ok(Self {
            text,
            attributes,
            children: Vec::new(),
            kind: OutlineKind::Link {
                url,
                loaded: false,
                collapsed: true,
            },
        })
    }

    pub fn audio(text: String, attributes: Attributes) -> Result<Self, FormatError> {
        let url = attributes
            .get("URL")
            .cloned()
            .ok_or(FormatError::MissingAttribute("URL"))?;
        let bitrate = attributes
            .get("bitrate")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let reliability: u8 = attributes
            .get("reliability")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
            .min(100);
        let formats = attributes.get("formats").cloned().unwrap_or_default();
        // `current_track` wins over `subtext` when both are present.
        let secondary = attributes
            .get("current_track")
            .or_else(|| attributes.get("subtext"))
            .cloned()
            .unwrap_or_default();
        Ok(Self {
            text,
            attributes,
            children: Vec::new(),
            kind: OutlineKind::Audio {
                url,
                bitrate,
                reliability,
                formats,
                secondary,
            },
        })
    }

    pub fn favourites() -> Self {
        Self {
            text: "Favourites".to_string(),
            attributes: Attributes::new(),
            children: Vec::new(),
            kind: OutlineKind::Favourites {
                collapsed: true,
                dirty: false,
            },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, OutlineKind::Audio { .. })
    }

    /// Collapse flag of a branch-like node; `None` for leaves.
    pub fn collapsed(&self) -> Option<bool> {
        match self.kind {
            OutlineKind::Branch { collapsed }
            | OutlineKind::Link { collapsed, .. }
            | OutlineKind::Favourites { collapsed, .. } => Some(collapsed),
            OutlineKind::Audio { .. } => None,
        }
    }

    pub fn toggle_collapsed(&mut self) {
        match &mut self.kind {
            OutlineKind::Branch { collapsed }
            | OutlineKind::Link { collapsed, .. }
            | OutlineKind::Favourites { collapsed, .. } => *collapsed = !*collapsed,
            OutlineKind::Audio { .. } => {}
        }
    }

    pub fn render(&self) -> RowText {
        match &self.kind {
            OutlineKind::Audio {
                bitrate,
                reliability,
                secondary,
                ..
            } => RowText {
                title: self.text.clone(),
                secondary: secondary.clone(),
                data0: format!("{bitrate}k"),
                data1: "|".repeat(usize::from(*reliability) / 20),
            },
            OutlineKind::Branch { collapsed }
            | OutlineKind::Link { collapsed, .. }
            | OutlineKind::Favourites { collapsed, .. } => RowText {
                title: format!("{} {}", if *collapsed { "+" } else { "-" }, self.text),
                ..RowText::default()
            },
        }
    }
}
