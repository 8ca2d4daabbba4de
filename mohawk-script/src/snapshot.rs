use anyhow::{bail, Context, Result};
use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::vm::Vm;

const SNAPSHOT_VERSION: u16 = 1;

/// The two interpreter registers a save game has to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRegistersSnapshotV1 {
    pub version: u16,
    pub saved_card: u16,
    pub saved_cursor: u16,
}

impl ScriptRegistersSnapshotV1 {
    pub fn capture(vm: &Vm) -> Self {
        let state = vm.state();
        ScriptRegistersSnapshotV1 {
            version: SNAPSHOT_VERSION,
            saved_card: state.saved_card,
            saved_cursor: state.saved_cursor,
        }
    }

    pub fn apply(&self, vm: &mut Vm) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            bail!(
                "unsupported ScriptRegistersSnapshot version {} (expected {})",
                self.version,
                SNAPSHOT_VERSION
            );
        }
        let state = vm.state_mut();
        state.saved_card = self.saved_card;
        state.saved_cursor = self.saved_cursor;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode_opts()
            .serialize(self)
            .context("serialize ScriptRegistersSnapshotV1")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode_opts()
            .deserialize(bytes)
            .context("deserialize ScriptRegistersSnapshotV1")
    }
}

fn bincode_opts() -> impl bincode::Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}
