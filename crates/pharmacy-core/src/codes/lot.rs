//! Lot codes: the physical drawer (and optional side) where stock is stored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side of a drawer encoded by the second lot-code character.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DrawerSide {
    Left,
    Right,
}

impl DrawerSide {
    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'L' => Some(DrawerSide::Left),
            'R' => Some(DrawerSide::Right),
            _ => None,
        }
    }

    fn code(self) -> char {
        match self {
            DrawerSide::Left => 'L',
            DrawerSide::Right => 'R',
        }
    }

    fn label(self) -> &'static str {
        match self {
            DrawerSide::Left => "Left",
            DrawerSide::Right => "Right",
        }
    }
}

/// A validated 1-2 character lot code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LotCode {
    /// Drawer letter, always uppercase A-Z
    pub drawer: char,
    /// Optional position within the drawer
    pub side: Option<DrawerSide>,
}

impl LotCode {
    /// Parse a lot code.
    ///
    /// The drawer letter is case-insensitive. A second character, when
    /// present, must be `L` or `R` whether or not the clinic requires a
    /// location; `require_location` additionally makes it mandatory.
    pub fn parse(code: &str, require_location: bool) -> Option<Self> {
        let mut chars = code.chars();
        let drawer = chars.next()?.to_ascii_uppercase();
        if !drawer.is_ascii_uppercase() {
            return None;
        }

        let side = match chars.next() {
            Some(c) => Some(DrawerSide::from_char(c)?),
            None => None,
        };

        if chars.next().is_some() || (require_location && side.is_none()) {
            return None;
        }

        Some(Self { drawer, side })
    }

    /// Human-readable location, e.g. "Drawer B Left".
    pub fn description(&self) -> String {
        match self.side {
            Some(side) => format!("Drawer {} {}", self.drawer, side.label()),
            None => format!("Drawer {}", self.drawer),
        }
    }
}

impl fmt::Display for LotCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.drawer)?;
        if let Some(side) = self.side {
            write!(f, "{}", side.code())?;
        }
        Ok(())
    }
}

/// Check whether `code` is a valid lot code.
pub fn validate_lot_code(code: &str, require_location: bool) -> bool {
    LotCode::parse(code, require_location).is_some()
}

/// Describe a lot code for display.
///
/// Unlike [`LotCode::parse`] this never rejects input: an unknown second
/// character is simply not described.
pub fn lot_description(code: &str) -> String {
    if code.is_empty() {
        return "Unknown Location".to_string();
    }

    let mut chars = code.chars().map(|c| c.to_ascii_uppercase());
    let drawer = match chars.next() {
        Some(c) => c,
        None => return "Unknown Drawer".to_string(),
    };

    match chars.next().and_then(DrawerSide::from_char) {
        Some(side) => format!("Drawer {} {}", drawer, side.label()),
        None => format!("Drawer {}", drawer),
    }
}
