//! Monkey bytecode and stack virtual machine.
//!
//! # Architecture
//!
//! A compiled program is a [`Bytecode`]: a flat [`Instructions`] stream and
//! a constant pool. Each instruction is a one-byte [`Opcode`] followed by
//! fixed-width big-endian operands (see [`code::Definition`]). The compiler
//! that produces bytecode is not part of this crate; [`code::make`] is the
//! encoder it, and the tests, use.
//!
//! The [`Vm`] runs a fetch-decode-execute loop over one fixed-capacity
//! operand stack. Operators share their semantics with the tree-walking
//! evaluator through `monkey_object::ops`.

pub mod bytecode;
pub mod code;
pub mod error;
pub mod vm;

pub use bytecode::Bytecode;
pub use code::{make, read_u16, Instructions, Opcode};
pub use error::{VmError, VmResult};
pub use vm::{Vm, VmConfig, GLOBALS_SIZE, STACK_SIZE};
