use std::borrow::Cow;

use crate::error::ScriptError;
use crate::types::Rect;
use crate::vm::{handlers, ExecContext};

/// Opcode id reserved for the no-op; always registered.
pub const NOP_OPCODE: u16 = 0xFFFF;

/// Bounds-checked view over an instruction's argument words.
///
/// `base` keeps indices in error reports relative to the full argument list
/// when handing a sub-range to a helper.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    opcode: u16,
    base: usize,
    argc: usize,
    values: &'a [u16],
}

impl<'a> Args<'a> {
    pub fn new(opcode: u16, values: &'a [u16]) -> Self {
        Self {
            opcode,
            base: 0,
            argc: values.len(),
            values,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [u16] {
        self.values
    }

    fn out_of_range(&self, index: usize) -> ScriptError {
        ScriptError::ArgumentOutOfRange {
            opcode: self.opcode,
            index: self.base + index,
            argc: self.argc,
        }
    }

    pub fn get(&self, index: usize) -> Result<u16, ScriptError> {
        self.values
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_range(index))
    }

    #[inline]
    pub fn get_i16(&self, index: usize) -> Result<i16, ScriptError> {
        Ok(self.get(index)? as i16)
    }

    /// Four consecutive words as left, top, right, bottom.
    pub fn rect(&self, start: usize) -> Result<Rect, ScriptError> {
        Ok(Rect::new(
            self.get_i16(start)?,
            self.get_i16(start + 1)?,
            self.get_i16(start + 2)?,
            self.get_i16(start + 3)?,
        ))
    }

    /// `len` words starting at `start`.
    pub fn window(&self, start: usize, len: usize) -> Result<Args<'a>, ScriptError> {
        let end = start.saturating_add(len);
        if end > self.values.len() {
            return Err(self.out_of_range(end.saturating_sub(1).max(start)));
        }
        Ok(Args {
            opcode: self.opcode,
            base: self.base + start,
            argc: self.argc,
            values: &self.values[start..end],
        })
    }

    pub fn reader(&self) -> ArgReader<'a> {
        ArgReader { args: *self, pos: 0 }
    }
}

/// Sequential reader used by handlers that consume variable-length blocks.
#[derive(Debug, Clone)]
pub struct ArgReader<'a> {
    args: Args<'a>,
    pos: usize,
}

impl ArgReader<'_> {
    pub fn next_u16(&mut self) -> Result<u16, ScriptError> {
        let v = self.args.get(self.pos)?;
        self.pos += 1;
        Ok(v)
    }

    pub fn next_i16(&mut self) -> Result<i16, ScriptError> {
        Ok(self.next_u16()? as i16)
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }
}

/// Everything a handler receives about the record being executed.
#[derive(Debug, Clone, Copy)]
pub struct Operands<'a> {
    pub opcode: u16,
    pub var: u16,
    pub args: Args<'a>,
}

impl<'a> Operands<'a> {
    pub fn new(opcode: u16, var: u16, args: &'a [u16]) -> Self {
        Self {
            opcode,
            var,
            args: Args::new(opcode, args),
        }
    }

    #[inline]
    pub fn argc(&self) -> usize {
        self.args.len()
    }
}

pub trait OpcodeHandler: Send + Sync {
    fn execute(&self, ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError>;
}

impl<F> OpcodeHandler for F
where
    F: Fn(&mut ExecContext<'_>, &Operands<'_>) -> Result<(), ScriptError> + Send + Sync,
{
    fn execute(&self, ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
        self(ctx, op)
    }
}

pub struct OpcodeEntry {
    pub id: u16,
    pub name: &'static str,
    handler: Box<dyn OpcodeHandler>,
}

impl OpcodeEntry {
    #[inline]
    pub fn handler(&self) -> &dyn OpcodeHandler {
        self.handler.as_ref()
    }
}

impl std::fmt::Debug for OpcodeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpcodeEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Id -> handler mapping. Immutable once built; share it behind an `Arc`
/// if several VMs need it.
#[derive(Debug)]
pub struct OpcodeTable {
    entries: Vec<OpcodeEntry>,
}

impl OpcodeTable {
    pub fn builder() -> OpcodeTableBuilder {
        OpcodeTableBuilder::new()
    }

    /// Table holding only the stack-independent opcodes.
    pub fn common() -> Self {
        OpcodeTableBuilder::with_common_opcodes().build()
    }

    pub fn entry(&self, id: u16) -> Option<&OpcodeEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn lookup(&self, id: u16) -> Result<&dyn OpcodeHandler, ScriptError> {
        self.entry(id)
            .map(OpcodeEntry::handler)
            .ok_or(ScriptError::UnknownOpcode { opcode: id })
    }

    #[inline]
    pub fn contains(&self, id: u16) -> bool {
        self.entry(id).is_some()
    }

    /// Mnemonic for listings; unknown ids are rendered numerically.
    pub fn describe(&self, id: u16) -> Cow<'static, str> {
        match self.entry(id) {
            Some(e) => Cow::Borrowed(e.name),
            None => Cow::Owned(format!("Opcode {id}")),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct OpcodeTableBuilder {
    entries: Vec<OpcodeEntry>,
}

impl Default for OpcodeTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OpcodeTableBuilder {
    /// Builder pre-seeded with the no-op only.
    pub fn new() -> Self {
        let mut builder = Self {
            entries: Vec::with_capacity(64),
        };
        builder.entries.push(OpcodeEntry {
            id: NOP_OPCODE,
            name: "NOP",
            handler: Box::new(handlers::nop),
        });
        builder
    }

    pub fn with_common_opcodes() -> Self {
        let mut builder = Self::new();
        builder
            .entries
            .extend(handlers::COMMON_OPCODES.iter().map(|&(id, name, handler)| OpcodeEntry {
                id,
                name,
                handler: Box::new(handler),
            }));
        builder
    }

    /// Registers `handler` under `id`. Ids are write-once.
    pub fn register<H>(
        &mut self,
        id: u16,
        name: &'static str,
        handler: H,
    ) -> Result<&mut Self, ScriptError>
    where
        H: OpcodeHandler + 'static,
    {
        if self.entries.iter().any(|e| e.id == id) {
            return Err(ScriptError::DuplicateOpcode { opcode: id });
        }
        self.entries.push(OpcodeEntry {
            id,
            name,
            handler: Box::new(handler),
        });
        Ok(self)
    }

    pub fn build(self) -> OpcodeTable {
        OpcodeTable {
            entries: self.entries,
        }
    }
}
