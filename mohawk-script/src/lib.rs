//! mohawk-script
//!
//! Decoder and interpreter for the opcode records attached to Mohawk cards and
//! their hotspots. A card resource carries three script flavours (normal, init
//! and exit); all of them decode through [`ScriptReader`] and run through [`Vm`].
//!
//! Everything the scripts touch (cards, hotspots, images, sounds, cursors and the
//! clock) is reached through the traits in [`services`], so the VM can be driven
//! by a real engine or by [`testing::RecordingEngine`].

pub mod config;
pub mod decoder;
pub mod error;
pub mod opcode;
pub mod services;
pub mod snapshot;
pub mod sound;
pub mod trace;
pub mod types;
pub mod vm;

/// Developer-facing doubles for the external services (kept as a module so
/// integration tests and downstream crates can reuse them).
pub mod testing;

pub use config::{LoggerConfig, VmConfig, VmConfigBuilder, VmConfigReader};
pub use decoder::{read_script, Instruction, Script, ScriptReader};
pub use error::ScriptError;
pub use opcode::{Args, OpcodeEntry, OpcodeHandler, OpcodeTable, OpcodeTableBuilder, Operands};
pub use services::{Area, Audio, Cursor, Engine, Globals, Graphics, Host, VariableHost, World};
pub use snapshot::ScriptRegistersSnapshotV1;
pub use sound::{SoundBlock, SoundItem};
pub use types::{Rect, ScriptKind, Stack, Transition};
pub use vm::{ExecContext, InstructionFailure, RunReport, ScriptState, Vm};
