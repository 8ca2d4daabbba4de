#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("script truncated in record {index} at byte offset 0x{offset:X}")]
    Truncated { index: usize, offset: u64 },

    #[error("opcode {opcode}: argument {index} read past argc={argc}")]
    ArgumentOutOfRange { opcode: u16, index: usize, argc: usize },

    #[error("invalid arguments for opcode {opcode} (argc={argc})")]
    InvalidArguments { opcode: u16, argc: usize },

    #[error("opcode {opcode}: script executed without an invoking resource")]
    MissingInvokingResource { opcode: u16 },

    #[error("opcode {opcode}: invoking resource {resource} has unexpected type")]
    UnexpectedResourceType { opcode: u16, resource: u16 },

    #[error("opcode {opcode}: unknown target stack {stack}")]
    UnknownStack { opcode: u16, stack: u16 },

    #[error("trying to run invalid opcode {opcode}")]
    UnknownOpcode { opcode: u16 },

    #[error("opcode {opcode} registered twice")]
    DuplicateOpcode { opcode: u16 },

    #[error("script interrupted by a quit request")]
    Interrupted,
}

impl ScriptError {
    /// Authoring errors: the script data is corrupt or incompatible with this
    /// interpreter. Everything else is a diagnostic and the run keeps going.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ScriptError::UnknownOpcode { .. } | ScriptError::Interrupted
        )
    }
}
