pub mod handlers;

use itertools::Itertools;

use crate::config::VmConfig;
use crate::decoder::Script;
use crate::error::ScriptError;
use crate::opcode::{Args, OpcodeTable, Operands};
use crate::services::{Area, Engine};
use crate::trace;
use crate::types::{Rect, ScriptKind, Transition};

/// Scratch register addressable from scripts.
pub const TEMP_VAR: u16 = 105;
/// Read-only view of the global ending state.
pub const ENDING_VAR: u16 = 106;
/// Argument value standing for "the invoking resource" in bulk area opcodes.
pub const INVOKING_RESOURCE: u16 = 0xFFFF;

/// Interpreter registers. Every slot holds a single value; there is no stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptState {
    /// Index of the area that triggered the current record.
    pub invoking: Option<u16>,
    /// Card saved by the push opcode, 0 when nothing was pushed.
    pub saved_card: u16,
    pub saved_cursor: u16,
    pub temp_var: u16,
    pub saved_map_card: u16,
}

/// What a handler sees while it runs.
pub struct ExecContext<'a> {
    pub state: &'a mut ScriptState,
    pub engine: &'a mut dyn Engine,
    pub config: &'a VmConfig,
}

impl ExecContext<'_> {
    pub fn invoking_area(&self) -> Option<&dyn Area> {
        self.state.invoking.and_then(|i| self.engine.resource(i))
    }

    /// Invoking area for opcodes that cannot work without one.
    pub fn require_invoking(&self, opcode: u16) -> Result<u16, ScriptError> {
        self.state
            .invoking
            .ok_or(ScriptError::MissingInvokingResource { opcode })
    }

    pub fn get_var(&mut self, var: u16) -> u16 {
        match var {
            TEMP_VAR => self.state.temp_var,
            ENDING_VAR => self.engine.globals().ending,
            _ => match self.engine.var(var) {
                Some(value) => value,
                None => {
                    log::warn!("Unimplemented var getter 0x{var:02x} ({var})");
                    0
                }
            },
        }
    }

    pub fn toggle_var(&mut self, var: u16) {
        if !self.engine.toggle_var(var) {
            log::warn!("Unimplemented var toggle 0x{var:02x} ({var})");
        }
    }

    /// Returns whether the areas bound to `var` need a redraw.
    pub fn set_var_value(&mut self, var: u16, value: u16) -> bool {
        if var == TEMP_VAR {
            self.state.temp_var = value;
            return false;
        }
        match self.engine.set_var(var, value) {
            Some(redraw) => redraw,
            None => {
                log::warn!("Unimplemented var setter 0x{var:02x} ({var})");
                false
            }
        }
    }

    /// Sleeps `ms` in quantum-sized steps, giving up early on a quit request.
    pub fn wait_millis(&mut self, ms: u32) -> Result<(), ScriptError> {
        let quantum = self.config.sound_wait_quantum_ms.max(1);
        let mut remaining = ms;
        while remaining > 0 {
            if self.engine.should_quit() {
                return Err(ScriptError::Interrupted);
            }
            let step = remaining.min(quantum);
            self.engine.delay_millis(step);
            remaining -= step;
        }
        Ok(())
    }

    /// Polls the audio service until the foreground sound is over.
    pub fn wait_for_sound(&mut self) -> Result<(), ScriptError> {
        let quantum = self.config.sound_wait_quantum_ms.max(1);
        while self.engine.is_playing() {
            if self.engine.should_quit() {
                return Err(ScriptError::Interrupted);
            }
            self.engine.delay_millis(quantum);
        }
        Ok(())
    }

    /// Runs one screen transition per group of six words
    /// (left, top, right, bottom, kind, steps), in order.
    pub fn animated_update(&mut self, data: Args<'_>, delay: u16) -> Result<(), ScriptError> {
        let mut r = data.reader();
        while r.position() < data.len() {
            let rect = Rect::new(r.next_i16()?, r.next_i16()?, r.next_i16()?, r.next_i16()?);
            let kind = Transition::from_raw(r.next_u16()?);
            let steps = r.next_u16()?;

            log::debug!(
                "\trect.left: {} rect.top: {} rect.right: {} rect.bottom: {} kind: {} steps: {}",
                rect.left,
                rect.top,
                rect.right,
                rect.bottom,
                kind,
                steps
            );
            self.engine.run_transition(kind, rect, steps, delay);
        }
        Ok(())
    }

    /// Applies `f` to each area listed after the count word.
    pub fn for_each_area<F>(&mut self, op: &Operands<'_>, label: &str, mut f: F) -> Result<(), ScriptError>
    where
        F: FnMut(&mut dyn Area),
    {
        let count = op.args.get(0)? as usize;
        if op.argc() != count + 1 {
            return Err(ScriptError::InvalidArguments {
                opcode: op.opcode,
                argc: op.argc(),
            });
        }

        for i in 0..count {
            let index = op.args.get(i + 1)?;
            let target = if index == INVOKING_RESOURCE {
                self.state.invoking
            } else {
                Some(index)
            };
            log::debug!("\t{label} resource {index}");
            match target.and_then(|t| self.engine.resource_mut(t)) {
                Some(area) => f(area),
                None => log::warn!("Unknown Resource in {label} script Opcode"),
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionFailure {
    pub index: usize,
    pub opcode: u16,
    pub error: ScriptError,
}

/// Outcome of one [`Vm::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub executed: usize,
    pub failures: Vec<InstructionFailure>,
    /// The host asked to quit before the script was done.
    pub interrupted: bool,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }

    pub fn has_fatal(&self) -> bool {
        self.failures.iter().any(|f| f.error.is_fatal())
    }
}

pub struct Vm {
    opcodes: OpcodeTable,
    state: ScriptState,
    config: VmConfig,
}

impl Vm {
    pub fn new(config: VmConfig) -> Self {
        Self::with_opcodes(OpcodeTable::common(), config)
    }

    pub fn with_opcodes(opcodes: OpcodeTable, config: VmConfig) -> Self {
        Self {
            opcodes,
            state: ScriptState::default(),
            config,
        }
    }

    #[inline]
    pub fn opcodes(&self) -> &OpcodeTable {
        &self.opcodes
    }

    #[inline]
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> &ScriptState {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut ScriptState {
        &mut self.state
    }

    /// Executes every record of `script` in order.
    ///
    /// Normal records run with `invoking` as their invoking area; init and exit
    /// records carry their own resource index. A failing record is logged and
    /// recorded in the report, and execution moves on to the next one.
    pub fn run(&mut self, engine: &mut dyn Engine, script: &Script, invoking: Option<u16>) -> RunReport {
        let mut report = RunReport::default();
        trace::script(format_args!("Script Size: {}", script.len()));

        let simulate = self.config.drawing_time_simulation;
        if simulate {
            engine.enable_drawing_time_simulation(true);
        }

        for (index, entry) in script.iter().enumerate() {
            if engine.should_quit() {
                log::info!("script interrupted before record {index}");
                report.interrupted = true;
                break;
            }

            self.state.invoking = match (entry.kind, entry.resource_id) {
                (ScriptKind::Normal, _) | (_, None) => invoking,
                (_, Some(id)) => {
                    if engine.resource(id).is_some() {
                        Some(id)
                    } else {
                        log::warn!("{} script record {index} references unknown resource {id}", entry.kind);
                        None
                    }
                }
            };

            trace::script(format_args!("\tOpcode {index}: {}", entry.opcode));

            match self.dispatch(engine, entry.opcode, entry.var, &entry.args) {
                Ok(()) => report.executed += 1,
                Err(error) => {
                    if error.is_fatal() {
                        log::error!("record {index} (opcode {}): {error}", entry.opcode);
                    } else {
                        log::warn!("record {index} (opcode {}): {error}", entry.opcode);
                    }
                    let stop = error == ScriptError::Interrupted;
                    report.failures.push(InstructionFailure {
                        index,
                        opcode: entry.opcode,
                        error,
                    });
                    if stop {
                        report.interrupted = true;
                        break;
                    }
                }
            }
        }

        if simulate {
            engine.enable_drawing_time_simulation(false);
        }
        report
    }

    /// Runs a single opcode outside of a script, keeping the current invoking area.
    pub fn run_opcode(
        &mut self,
        engine: &mut dyn Engine,
        opcode: u16,
        var: u16,
        args: &[u16],
    ) -> Result<(), ScriptError> {
        self.dispatch(engine, opcode, var, args)
    }

    fn dispatch(
        &mut self,
        engine: &mut dyn Engine,
        opcode: u16,
        var: u16,
        args: &[u16],
    ) -> Result<(), ScriptError> {
        let Some(entry) = self.opcodes.entry(opcode) else {
            log::warn!(
                "Unimplemented opcode {opcode} (var {var}, argc {}): [{}]",
                args.len(),
                args.iter().join(", ")
            );
            return Err(ScriptError::UnknownOpcode { opcode });
        };

        trace::opcode(format_args!(
            "{} (var {var}) [{}]",
            entry.name,
            args.iter().join(", ")
        ));

        let mut ctx = ExecContext {
            state: &mut self.state,
            engine,
            config: &self.config,
        };
        entry.handler().execute(&mut ctx, &Operands::new(opcode, var, args))
    }

    /// Jumps to the stack's map card, remembering where to come back to.
    pub fn show_map(&mut self, engine: &mut dyn Engine) {
        let Some(map) = engine.map_card() else {
            log::warn!("current stack has no map card");
            return;
        };
        let current = engine.current_card();
        if current != map {
            self.state.saved_map_card = current;
            engine.change_card(map, Transition::Copy);
        }
    }
}
