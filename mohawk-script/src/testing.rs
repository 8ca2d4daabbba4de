//! In-memory engine for running scripts in isolation.
//!
//! Every service call is recorded as a [`Call`], so tests can assert on the
//! exact sequence of effects a script produced.

use std::collections::{BTreeMap, BTreeSet};

use crate::decoder::{Instruction, Script};
use crate::services::{Area, Audio, Cursor, Globals, Graphics, Host, VariableHost, World};
use crate::sound::SoundBlock;
use crate::types::{Rect, ScriptKind, Stack, Transition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ChangeCard { card: u16, transition: Transition },
    ChangeStack { stack: Stack, start_card: u16, link_src: u16, link_dst: u16 },
    RedrawArea(u16),
    DrawCardBackground,
    DrawResourceImages,
    DrawAreaState { resource: u16, state: u16 },
    ApplySoundBlock(SoundBlock),
    CopyImageSectionToBackBuffer { image: u16, src: Rect, dst: Rect },
    CopyImageSectionToScreen { image: u16, src: Rect, dst: Rect },
    CopyImageToScreen { image: u16, dst: Rect },
    CopyBackBufferToScreen(Rect),
    RunTransition { kind: Transition, rect: Rect, steps: u16, delay: u16 },
    DrawingTimeSimulation(bool),
    UpdateScreen,
    ReplaceSound(u16),
    StopBackground,
    ResumeBackground,
    StopSound,
    PlaySoundBlocking(u16),
    SetCursor(u16),
    ShowCursor,
    HideCursor,
    SetMainCursor(u16),
    Delay(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestArea {
    pub destination: u16,
    pub bounds: Rect,
    pub enabled: bool,
    /// Video areas accept `play_movie` and remember the directions they got.
    pub video: bool,
    pub movies: Vec<i16>,
}

impl TestArea {
    pub fn new(destination: u16) -> Self {
        Self { destination, enabled: true, ..Default::default() }
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn video(mut self) -> Self {
        self.video = true;
        self
    }
}

impl Area for TestArea {
    fn destination(&self) -> u16 {
        self.destination
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn play_movie(&mut self, direction: i16) -> bool {
        if self.video {
            self.movies.push(direction);
        }
        self.video
    }
}

#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub calls: Vec<Call>,
    pub current_card: u16,
    /// Resource table of the current card, indexed by resource index.
    pub resources: Vec<TestArea>,
    pub globals: Globals,
    pub main_cursor: u16,
    /// Variables the host knows about; unknown ones take the warning path.
    pub vars: BTreeMap<u16, u16>,
    /// Variables whose setter asks for a redraw.
    pub redraw_on_set: BTreeSet<u16>,
    /// `(var, page)`: toggling `var` picks up / drops `page`.
    pub page_var: Option<(u16, u16)>,
    pub map_card: Option<u16>,
    /// Number of `is_playing` polls that still answer `true`.
    pub playing_polls: usize,
    pub quit: bool,
    /// Raise the quit flag once this many delays were issued.
    pub quit_after_delays: Option<usize>,
}

impl RecordingEngine {
    pub fn new(current_card: u16) -> Self {
        Self { current_card, ..Default::default() }
    }

    pub fn with_resources(mut self, resources: Vec<TestArea>) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_var(mut self, var: u16, value: u16) -> Self {
        self.vars.insert(var, value);
        self
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn delays(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Delay(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }

    pub fn card_changes(&self) -> Vec<(u16, Transition)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::ChangeCard { card, transition } => Some((*card, *transition)),
                _ => None,
            })
            .collect()
    }
}

impl World for RecordingEngine {
    fn current_card(&self) -> u16 {
        self.current_card
    }

    fn change_card(&mut self, card: u16, transition: Transition) {
        self.calls.push(Call::ChangeCard { card, transition });
        self.current_card = card;
    }

    fn change_stack(&mut self, stack: Stack, start_card: u16, link_src_sound: u16, link_dst_sound: u16) {
        self.calls.push(Call::ChangeStack {
            stack,
            start_card,
            link_src: link_src_sound,
            link_dst: link_dst_sound,
        });
        self.current_card = start_card;
    }

    fn resource(&self, index: u16) -> Option<&dyn Area> {
        self.resources.get(index as usize).map(|a| a as &dyn Area)
    }

    fn resource_mut(&mut self, index: u16) -> Option<&mut dyn Area> {
        self.resources.get_mut(index as usize).map(|a| a as &mut dyn Area)
    }

    fn redraw_area(&mut self, var: u16) {
        self.calls.push(Call::RedrawArea(var));
    }

    fn draw_card_background(&mut self) {
        self.calls.push(Call::DrawCardBackground);
    }

    fn draw_resource_images(&mut self) {
        self.calls.push(Call::DrawResourceImages);
    }

    fn draw_area_state(&mut self, resource: u16, state: u16) {
        self.calls.push(Call::DrawAreaState { resource, state });
    }

    fn apply_sound_block(&mut self, block: &SoundBlock) {
        self.calls.push(Call::ApplySoundBlock(block.clone()));
    }

    fn globals(&self) -> &Globals {
        &self.globals
    }

    fn map_card(&self) -> Option<u16> {
        self.map_card
    }
}

impl VariableHost for RecordingEngine {
    fn var(&self, var: u16) -> Option<u16> {
        self.vars.get(&var).copied()
    }

    fn toggle_var(&mut self, var: u16) -> bool {
        if let Some((page_var, page)) = self.page_var {
            if page_var == var {
                self.globals.held_page = if self.globals.held_page == 0 { page } else { 0 };
                return true;
            }
        }
        match self.vars.get_mut(&var) {
            Some(value) => {
                *value = u16::from(*value == 0);
                true
            }
            None => false,
        }
    }

    fn set_var(&mut self, var: u16, value: u16) -> Option<bool> {
        let slot = self.vars.get_mut(&var)?;
        *slot = value;
        Some(self.redraw_on_set.contains(&var))
    }
}

impl Graphics for RecordingEngine {
    fn copy_image_section_to_back_buffer(&mut self, image: u16, src: Rect, dst: Rect) {
        self.calls.push(Call::CopyImageSectionToBackBuffer { image, src, dst });
    }

    fn copy_image_section_to_screen(&mut self, image: u16, src: Rect, dst: Rect) {
        self.calls.push(Call::CopyImageSectionToScreen { image, src, dst });
    }

    fn copy_image_to_screen(&mut self, image: u16, dst: Rect) {
        self.calls.push(Call::CopyImageToScreen { image, dst });
    }

    fn copy_back_buffer_to_screen(&mut self, rect: Rect) {
        self.calls.push(Call::CopyBackBufferToScreen(rect));
    }

    fn run_transition(&mut self, kind: Transition, rect: Rect, steps: u16, delay: u16) {
        self.calls.push(Call::RunTransition { kind, rect, steps, delay });
    }

    fn enable_drawing_time_simulation(&mut self, enable: bool) {
        self.calls.push(Call::DrawingTimeSimulation(enable));
    }

    fn update_screen(&mut self) {
        self.calls.push(Call::UpdateScreen);
    }
}

impl Audio for RecordingEngine {
    fn replace_sound(&mut self, sound: u16) {
        self.calls.push(Call::ReplaceSound(sound));
    }

    fn stop_background(&mut self) {
        self.calls.push(Call::StopBackground);
    }

    fn resume_background(&mut self) {
        self.calls.push(Call::ResumeBackground);
    }

    fn stop_sound(&mut self) {
        self.calls.push(Call::StopSound);
    }

    fn play_sound_blocking(&mut self, sound: u16) {
        self.calls.push(Call::PlaySoundBlocking(sound));
    }

    fn is_playing(&mut self) -> bool {
        if self.playing_polls == 0 {
            return false;
        }
        self.playing_polls -= 1;
        true
    }
}

impl Cursor for RecordingEngine {
    fn set_cursor(&mut self, cursor: u16) {
        self.calls.push(Call::SetCursor(cursor));
    }

    fn show_cursor(&mut self) {
        self.calls.push(Call::ShowCursor);
    }

    fn hide_cursor(&mut self) {
        self.calls.push(Call::HideCursor);
    }

    fn main_cursor(&self) -> u16 {
        self.main_cursor
    }

    fn set_main_cursor(&mut self, cursor: u16) {
        self.calls.push(Call::SetMainCursor(cursor));
        self.main_cursor = cursor;
    }
}

impl Host for RecordingEngine {
    fn delay_millis(&mut self, ms: u32) {
        self.calls.push(Call::Delay(ms));
        if let Some(limit) = self.quit_after_delays {
            if self.delays().len() >= limit {
                self.quit = true;
            }
        }
    }

    fn should_quit(&self) -> bool {
        self.quit
    }
}

/// Assembles scripts in the on-disk record layout.
#[derive(Debug, Clone)]
pub struct ScriptBuilder {
    kind: ScriptKind,
    records: Vec<Instruction>,
}

impl ScriptBuilder {
    pub fn new(kind: ScriptKind) -> Self {
        Self { kind, records: Vec::new() }
    }

    pub fn op(self, opcode: u16, var: u16, args: &[u16]) -> Self {
        self.op_for(0, opcode, var, args)
    }

    /// Record bound to `resource` (ignored for normal scripts).
    pub fn op_for(mut self, resource: u16, opcode: u16, var: u16, args: &[u16]) -> Self {
        self.records.push(Instruction {
            kind: self.kind,
            resource_id: self.kind.has_resource_id().then_some(resource),
            opcode,
            var,
            args: args.to_vec(),
            exit_tag: (self.kind == ScriptKind::Exit).then_some(0),
        });
        self
    }

    pub fn script(&self) -> Script {
        Script::new(self.kind, self.records.clone())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut word = |w: u16| out.extend_from_slice(&w.to_le_bytes());

        word(self.records.len() as u16);
        for r in &self.records {
            if let Some(id) = r.resource_id {
                word(id);
            }
            word(r.opcode);
            word(r.var);
            word(r.args.len() as u16);
            for &a in &r.args {
                word(a);
            }
            if let Some(tag) = r.exit_tag {
                word(tag);
            }
        }
        out
    }
}
