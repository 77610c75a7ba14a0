//! Keyword vocabularies for device and element actions.
//!
//! Each remote verb is refined by a keyword drawn from a fixed vocabulary
//! (a click corner, a swipe direction, a scroll axis, ...). Every vocabulary
//! is an enum whose `FromStr` accepts the documented spellings, matched
//! case-insensitively, and rejects anything else with an
//! [`ErrorCode::InvalidField`](crate::error::ErrorCode::InvalidField) error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

fn lookup<T: Copy>(word: &str, table: &[(&str, T)]) -> Result<T, ApiError> {
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(word))
        .map(|(_, value)| *value)
        .ok_or_else(|| {
            let allowed: Vec<&str> = table.iter().map(|(name, _)| *name).collect();
            ApiError::invalid_field(word, &allowed)
        })
}

macro_rules! vocabulary {
    ($ty:ident, [$(($word:literal, $variant:ident)),* $(,)?]) => {
        impl $ty {
            pub const WORDS: &'static [(&'static str, $ty)] = &[$(($word, $ty::$variant)),*];
        }

        impl FromStr for $ty {
            type Err = ApiError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                lookup(s.trim(), Self::WORDS)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Corner of an element for click and long-click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    TopLeft,
    BottomRight,
}

vocabulary!(Corner, [
    ("tl", TopLeft),
    ("topleft", TopLeft),
    ("br", BottomRight),
    ("bottomright", BottomRight),
]);

impl Corner {
    pub fn as_str(self) -> &'static str {
        match self {
            Corner::TopLeft => "topleft",
            Corner::BottomRight => "bottomright",
        }
    }
}

/// Swipe direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

vocabulary!(Direction, [
    ("up", Up),
    ("down", Down),
    ("left", Left),
    ("right", Right),
]);

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Axis of a fling or scroll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

vocabulary!(Axis, [
    ("vert", Vertical),
    ("vertical", Vertical),
    ("vertically", Vertical),
    ("horiz", Horizontal),
    ("horizontal", Horizontal),
    ("horizontally", Horizontal),
]);

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::Vertical => "vertical",
            Axis::Horizontal => "horizontal",
        }
    }

    /// The remote fling/scroll verbs take `isVertical` as a boolean.
    pub fn is_vertical(self) -> bool {
        self == Axis::Vertical
    }
}

/// Where a fling or scroll moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    #[default]
    Forward,
    Backward,
    ToBeginning,
    ToEnd,
}

vocabulary!(Motion, [
    ("forward", Forward),
    ("backward", Backward),
    ("tobeginning", ToBeginning),
    ("to_beginning", ToBeginning),
    ("toend", ToEnd),
    ("to_end", ToEnd),
]);

impl Motion {
    pub fn as_str(self) -> &'static str {
        match self {
            Motion::Forward => "forward",
            Motion::Backward => "backward",
            Motion::ToBeginning => "toBeginning",
            Motion::ToEnd => "toEnd",
        }
    }
}

/// Pinch towards the center (`In`) or towards the edges (`Out`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinchDirection {
    In,
    Out,
}

vocabulary!(PinchDirection, [("in", In), ("out", Out)]);

impl PinchDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            PinchDirection::In => "in",
            PinchDirection::Out => "out",
        }
    }
}

/// Condition an element wait blocks on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitCondition {
    Exists,
    Gone,
}

vocabulary!(WaitCondition, [("exist", Exists), ("exists", Exists), ("gone", Gone)]);

impl WaitCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            WaitCondition::Exists => "exists",
            WaitCondition::Gone => "gone",
        }
    }
}

/// Screen power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenPower {
    On,
    Off,
}

vocabulary!(ScreenPower, [("on", On), ("off", Off)]);

impl ScreenPower {
    pub fn as_str(self) -> &'static str {
        match self {
            ScreenPower::On => "on",
            ScreenPower::Off => "off",
        }
    }
}

/// System panel the device can pull down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Notification,
    QuickSettings,
}

vocabulary!(Panel, [
    ("notification", Notification),
    ("quick_settings", QuickSettings),
    ("quicksettings", QuickSettings),
]);

impl Panel {
    pub fn as_str(self) -> &'static str {
        match self {
            Panel::Notification => "notification",
            Panel::QuickSettings => "quick_settings",
        }
    }
}

/// Display orientation.
///
/// | Name | Short | displayRotation | Degrees |
/// |------|-------|-----------------|---------|
/// | natural | n | 0 | 0 |
/// | left | l | 1 | 90 |
/// | upsidedown | u | 2 | 180 |
/// | right | r | 3 | 270 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Natural,
    Left,
    UpsideDown,
    Right,
}

vocabulary!(Orientation, [
    ("natural", Natural),
    ("n", Natural),
    ("0", Natural),
    ("left", Left),
    ("l", Left),
    ("90", Left),
    ("upsidedown", UpsideDown),
    ("u", UpsideDown),
    ("180", UpsideDown),
    ("right", Right),
    ("r", Right),
    ("270", Right),
]);

impl Orientation {
    /// Name sent to `setOrientation`.
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Natural => "natural",
            Orientation::Left => "left",
            Orientation::UpsideDown => "upsidedown",
            Orientation::Right => "right",
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Orientation::Natural => 0,
            Orientation::Left => 90,
            Orientation::UpsideDown => 180,
            Orientation::Right => 270,
        }
    }

    /// Map `deviceInfo.displayRotation` to an orientation.
    pub fn from_rotation(rotation: u8) -> Option<Self> {
        match rotation {
            0 => Some(Orientation::Natural),
            1 => Some(Orientation::Left),
            2 => Some(Orientation::UpsideDown),
            3 => Some(Orientation::Right),
            _ => None,
        }
    }
}

/// Hardware and navigation keys the server can press by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedKey {
    Home,
    Back,
    Left,
    Right,
    Up,
    Down,
    Center,
    Menu,
    Search,
    Enter,
    Delete,
    Recent,
    VolumeUp,
    VolumeDown,
    VolumeMute,
    Camera,
    Power,
}

vocabulary!(NamedKey, [
    ("home", Home),
    ("back", Back),
    ("left", Left),
    ("right", Right),
    ("up", Up),
    ("down", Down),
    ("center", Center),
    ("menu", Menu),
    ("search", Search),
    ("enter", Enter),
    ("delete", Delete),
    ("del", Delete),
    ("recent", Recent),
    ("volume_up", VolumeUp),
    ("volume_down", VolumeDown),
    ("volume_mute", VolumeMute),
    ("camera", Camera),
    ("power", Power),
]);

impl NamedKey {
    /// Name sent to `pressKey`.
    pub fn as_str(self) -> &'static str {
        match self {
            NamedKey::Home => "home",
            NamedKey::Back => "back",
            NamedKey::Left => "left",
            NamedKey::Right => "right",
            NamedKey::Up => "up",
            NamedKey::Down => "down",
            NamedKey::Center => "center",
            NamedKey::Menu => "menu",
            NamedKey::Search => "search",
            NamedKey::Enter => "enter",
            NamedKey::Delete => "delete",
            NamedKey::Recent => "recent",
            NamedKey::VolumeUp => "volume_up",
            NamedKey::VolumeDown => "volume_down",
            NamedKey::VolumeMute => "volume_mute",
            NamedKey::Camera => "camera",
            NamedKey::Power => "power",
        }
    }
}

/// A key press: either a named key or a raw Android keycode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Named(NamedKey),
    Code { code: i32, meta: Option<i32> },
}

impl Key {
    pub fn code(code: i32) -> Self {
        Key::Code { code, meta: None }
    }

    pub fn code_with_meta(code: i32, meta: i32) -> Self {
        Key::Code {
            code,
            meta: Some(meta),
        }
    }
}

impl From<NamedKey> for Key {
    fn from(key: NamedKey) -> Self {
        Key::Named(key)
    }
}

/// Parses `"back"`, `"89"` or `"89+1"` (keycode plus meta state).
impl FromStr for Key {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with(|c: char| c.is_ascii_digit()) {
            let (code, meta) = match s.split_once('+') {
                Some((code, meta)) => (code, Some(meta)),
                None => (s, None),
            };
            let bad = || ApiError::invalid_field_value("key", "a keycode like 89 or 89+1", s);
            let code = code.parse::<i32>().map_err(|_| bad())?;
            let meta = meta
                .map(|m| m.parse::<i32>().map_err(|_| bad()))
                .transpose()?;
            return Ok(Key::Code { code, meta });
        }
        s.parse::<NamedKey>().map(Key::Named)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Named(key) => write!(f, "{}", key),
            Key::Code { code, meta: None } => write!(f, "{}", code),
            Key::Code {
                code,
                meta: Some(meta),
            } => write!(f, "{}+{}", code, meta),
        }
    }
}
