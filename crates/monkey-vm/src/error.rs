//! VM execution errors.

use monkey_object::RuntimeError;
use thiserror::Error;

/// Errors that abort a VM run.
///
/// All but [`VmError::Runtime`] mean the bytecode is malformed or a resource
/// limit was hit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// A push found every stack slot in use.
    #[error("stack overflow")]
    StackOverflow,

    /// A pop found the stack empty.
    #[error("stack underflow")]
    StackUnderflow,

    #[error("unknown opcode: {0}")]
    UnknownOpcode(u8),

    /// An instruction's operands extend past the end of the stream.
    #[error("truncated instruction at {ip}")]
    TruncatedInstruction { ip: usize },

    #[error("constant index out of range: {0}")]
    ConstantOutOfRange(usize),

    #[error("global index out of range: {0}")]
    GlobalOutOfRange(usize),

    #[error("jump target out of range: {0}")]
    JumpOutOfRange(usize),

    /// `OpHash` needs a key for every value.
    #[error("hash operand must be even, got {0}")]
    OddHashOperand(usize),

    /// A language-level error, with the same text the evaluator reports.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// VM result type alias.
pub type VmResult<T> = Result<T, VmError>;
