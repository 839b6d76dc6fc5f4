//! The compiled program the VM consumes.

use monkey_object::Value;

use crate::code::Instructions;

/// An instruction stream plus the constant pool its `OpConstant`
/// instructions index into.
#[derive(Debug, Clone, Default)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Value>,
}

impl Bytecode {
    pub fn new(instructions: impl Into<Instructions>, constants: Vec<Value>) -> Self {
        Self {
            instructions: instructions.into(),
            constants,
        }
    }
}
