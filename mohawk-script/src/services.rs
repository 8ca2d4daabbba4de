//! Narrow interfaces to the engine pieces scripts drive.
//!
//! All calls are synchronous from the interpreter's point of view: an async host
//! must block (or yield) inside the implementation until the effect is done.

use serde::{Deserialize, Serialize};

use crate::sound::SoundBlock;
use crate::types::{Rect, Stack, Transition};

/// Global game state that scripts read directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Globals {
    /// Page the player is carrying, 0 when empty-handed.
    pub held_page: u16,
    pub ending: u16,
}

/// Hotspot / area attached to the current card.
pub trait Area {
    /// Card the area leads to when clicked.
    fn destination(&self) -> u16;
    fn bounds(&self) -> Rect;
    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;

    /// Plays the area's movie. Returns `false` when the area is not a video area.
    fn play_movie(&mut self, _direction: i16) -> bool {
        false
    }
}

pub trait World {
    fn current_card(&self) -> u16;
    fn change_card(&mut self, card: u16, transition: Transition);
    fn change_stack(&mut self, stack: Stack, start_card: u16, link_src_sound: u16, link_dst_sound: u16);

    /// Resource of the current card by index.
    fn resource(&self, index: u16) -> Option<&dyn Area>;
    fn resource_mut(&mut self, index: u16) -> Option<&mut dyn Area>;

    /// Redraws every area bound to `var`.
    fn redraw_area(&mut self, var: u16);
    fn draw_card_background(&mut self);
    fn draw_resource_images(&mut self);
    /// Draws state `state` of the image switch owning `resource`.
    fn draw_area_state(&mut self, resource: u16, state: u16);
    fn apply_sound_block(&mut self, block: &SoundBlock);

    fn globals(&self) -> &Globals;

    /// Map card of the current stack, if it has one.
    fn map_card(&self) -> Option<u16> {
        None
    }
}

/// Per-stack virtual variables. Every method returns `None`/`false` for
/// variables the host does not know about.
pub trait VariableHost {
    fn var(&self, _var: u16) -> Option<u16> {
        None
    }

    /// Returns whether the variable was handled.
    fn toggle_var(&mut self, _var: u16) -> bool {
        false
    }

    /// `Some(redraw)` when handled; `redraw` asks for the bound areas to be repainted.
    fn set_var(&mut self, _var: u16, _value: u16) -> Option<bool> {
        None
    }
}

pub trait Graphics {
    fn copy_image_section_to_back_buffer(&mut self, image: u16, src: Rect, dst: Rect);
    fn copy_image_section_to_screen(&mut self, image: u16, src: Rect, dst: Rect);
    fn copy_image_to_screen(&mut self, image: u16, dst: Rect);
    fn copy_back_buffer_to_screen(&mut self, rect: Rect);
    fn run_transition(&mut self, kind: Transition, rect: Rect, steps: u16, delay: u16);
    fn enable_drawing_time_simulation(&mut self, enable: bool);
    fn update_screen(&mut self);
}

pub trait Audio {
    fn replace_sound(&mut self, sound: u16);
    fn stop_background(&mut self);
    fn resume_background(&mut self);
    fn stop_sound(&mut self);
    fn play_sound_blocking(&mut self, sound: u16);
    fn is_playing(&mut self) -> bool;
}

pub trait Cursor {
    fn set_cursor(&mut self, cursor: u16);
    fn show_cursor(&mut self);
    fn hide_cursor(&mut self);
    fn main_cursor(&self) -> u16;
    fn set_main_cursor(&mut self, cursor: u16);
}

pub trait Host {
    fn delay_millis(&mut self, ms: u32);
    fn should_quit(&self) -> bool;
}

/// Everything a script run needs, as one object.
pub trait Engine: World + VariableHost + Graphics + Audio + Cursor + Host {}

impl<T> Engine for T where T: World + VariableHost + Graphics + Audio + Cursor + Host {}
