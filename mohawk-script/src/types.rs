use serde::{Deserialize, Serialize};

pub const SCREEN_WIDTH: i16 = 544;
pub const SCREEN_HEIGHT: i16 = 333;

/// Screen-space rectangle, right/bottom exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
}

impl Rect {
    pub const fn new(left: i16, top: i16, right: i16, bottom: i16) -> Self {
        Self { left, top, right, bottom }
    }

    pub const fn screen() -> Self {
        Self::new(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    pub fn width(&self) -> i16 {
        self.right.wrapping_sub(self.left)
    }

    pub fn height(&self) -> i16 {
        self.bottom.wrapping_sub(self.top)
    }
}

/// Which of the three record layouts a script uses.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    #[default]
    Normal,
    Init,
    Exit,
}

impl ScriptKind {
    pub fn has_resource_id(self) -> bool {
        self != ScriptKind::Normal
    }
}

/// Card change / screen update effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Transition {
    LeftToRight,
    RightToLeft,
    SlideToLeft,
    SlideToRight,
    BottomToTop,
    TopToBottom,
    SlideToTop,
    SlideToBottom,
    PartToRight,
    PartToLeft,
    Copy,
    Dissolve,
    Unk12,
    NoTransition,
    /// Raw value outside the known set, passed through to the renderer.
    Other(u16),
}

impl Transition {
    pub const NONE_RAW: u16 = 999;

    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => Transition::LeftToRight,
            1 => Transition::RightToLeft,
            2 => Transition::SlideToLeft,
            3 => Transition::SlideToRight,
            4 => Transition::BottomToTop,
            5 => Transition::TopToBottom,
            6 => Transition::SlideToTop,
            7 => Transition::SlideToBottom,
            8 => Transition::PartToRight,
            9 => Transition::PartToLeft,
            10 => Transition::Copy,
            11 => Transition::Dissolve,
            12 => Transition::Unk12,
            Self::NONE_RAW => Transition::NoTransition,
            other => Transition::Other(other),
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            Transition::LeftToRight => 0,
            Transition::RightToLeft => 1,
            Transition::SlideToLeft => 2,
            Transition::SlideToRight => 3,
            Transition::BottomToTop => 4,
            Transition::TopToBottom => 5,
            Transition::SlideToTop => 6,
            Transition::SlideToBottom => 7,
            Transition::PartToRight => 8,
            Transition::PartToLeft => 9,
            Transition::Copy => 10,
            Transition::Dissolve => 11,
            Transition::Unk12 => 12,
            Transition::NoTransition => Self::NONE_RAW,
            Transition::Other(raw) => raw,
        }
    }
}

/// Ages (and menu/demo pseudo-stacks) the player can travel between.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::FromRepr,
)]
#[repr(u16)]
pub enum Stack {
    Channelwood = 0,
    Credits,
    Demo,
    Dni,
    Intro,
    MakingOf,
    Mechanical,
    Myst,
    Selenitic,
    DemoSlides,
    DemoPreview,
    Stoneship,
    Menu,
}
