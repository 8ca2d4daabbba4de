use std::io::Cursor;
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;

use crate::error::ScriptError;
use crate::types::ScriptKind;

/// One decoded script record.
///
/// Layout (little-endian u16 words):
/// - `resource_id` (init / exit scripts only)
/// - `opcode`
/// - `var`
/// - `argc`
/// - `argc` argument words
/// - trailing tag (exit scripts only, never interpreted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub kind: ScriptKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<u16>,
    pub opcode: u16,
    pub var: u16,
    pub args: Vec<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_tag: Option<u16>,
}

impl Instruction {
    pub fn new(opcode: u16, var: u16, args: Vec<u16>) -> Self {
        Self {
            kind: ScriptKind::Normal,
            resource_id: None,
            opcode,
            var,
            args,
            exit_tag: None,
        }
    }

    #[inline]
    pub fn argc(&self) -> usize {
        self.args.len()
    }

    /// Number of bytes this record occupies in the stream.
    pub fn encoded_len(&self) -> usize {
        let mut len = 6 + self.args.len() * 2;
        if self.resource_id.is_some() {
            len += 2;
        }
        if self.exit_tag.is_some() {
            len += 2;
        }
        len
    }
}

/// Decoded, immutable script. Cloning shares the record list.
#[derive(Debug, Clone)]
pub struct Script {
    kind: ScriptKind,
    entries: Arc<[Instruction]>,
}

impl Script {
    pub fn new(kind: ScriptKind, entries: Vec<Instruction>) -> Self {
        Self {
            kind,
            entries: entries.into(),
        }
    }

    pub fn empty(kind: ScriptKind) -> Self {
        Self::new(kind, Vec::new())
    }

    #[inline]
    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[Instruction] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Script {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Reads count-prefixed scripts out of a card resource buffer.
///
/// Scripts are embedded in larger records, so the reader never requires the
/// whole buffer to be consumed; [`ScriptReader::position`] tells the caller
/// where the next field starts.
pub struct ScriptReader<'a> {
    cur: Cursor<&'a [u8]>,
}

impl<'a> ScriptReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cur: Cursor::new(bytes),
        }
    }

    #[inline]
    pub fn position(&self) -> u64 {
        self.cur.position()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        let len = self.cur.get_ref().len() as u64;
        len.saturating_sub(self.cur.position()) as usize
    }

    fn read_u16(&mut self, index: usize) -> Result<u16, ScriptError> {
        let offset = self.cur.position();
        self.cur
            .read_u16::<LittleEndian>()
            .map_err(|_| ScriptError::Truncated { index, offset })
    }

    /// Reads the u16 record count followed by that many records.
    pub fn read_script(&mut self, kind: ScriptKind) -> Result<Script, ScriptError> {
        let count = self.read_u16(0)? as usize;
        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            entries.push(self.read_instruction(kind, index)?);
        }
        Ok(Script::new(kind, entries))
    }

    /// Reads a single record. `index` is only used for error reporting.
    pub fn read_instruction(
        &mut self,
        kind: ScriptKind,
        index: usize,
    ) -> Result<Instruction, ScriptError> {
        let resource_id = if kind.has_resource_id() {
            Some(self.read_u16(index)?)
        } else {
            None
        };

        let opcode = self.read_u16(index)?;
        let var = self.read_u16(index)?;
        let argc = self.read_u16(index)? as usize;

        // argc comes from the file, so don't trust it for the allocation
        let mut args = Vec::with_capacity(argc.min(self.remaining() / 2));
        for _ in 0..argc {
            args.push(self.read_u16(index)?);
        }

        let exit_tag = if kind == ScriptKind::Exit {
            Some(self.read_u16(index)?)
        } else {
            None
        };

        Ok(Instruction {
            kind,
            resource_id,
            opcode,
            var,
            args,
            exit_tag,
        })
    }
}

/// Decodes a count-prefixed script starting at the beginning of `bytes`.
pub fn read_script(bytes: &[u8], kind: ScriptKind) -> Result<Script, ScriptError> {
    ScriptReader::new(bytes).read_script(kind)
}
