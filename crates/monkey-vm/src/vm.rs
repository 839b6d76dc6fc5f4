//! The stack virtual machine.

use monkey_ast::{InfixOperator, PrefixOperator};
use monkey_object::{ops, Value, FALSE, NULL, TRUE};
use tracing::{debug, trace};

use crate::bytecode::Bytecode;
use crate::code::{read_u16, Instructions, Opcode};
use crate::error::{VmError, VmResult};

/// Default operand stack capacity, in values.
pub const STACK_SIZE: usize = 2048;

/// Default number of global slots.
pub const GLOBALS_SIZE: usize = 65536;

/// Resource limits for one VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    pub stack_size: usize,
    pub globals_size: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            stack_size: STACK_SIZE,
            globals_size: GLOBALS_SIZE,
        }
    }
}

/// Executes one [`Bytecode`] program.
///
/// `sp` always points at the next free slot. Popping leaves the vacated slot
/// untouched, so the value just popped stays readable through
/// [`Vm::last_popped_stack_elem`] until the next push overwrites it.
#[derive(Debug)]
pub struct Vm {
    constants: Vec<Value>,
    instructions: Instructions,
    stack: Vec<Value>,
    sp: usize,
    globals: Vec<Value>,
}

impl Vm {
    /// Create a VM with the default [`VmConfig`].
    pub fn new(bytecode: Bytecode) -> Self {
        Self::with_config(bytecode, VmConfig::default())
    }

    pub fn with_config(bytecode: Bytecode, config: VmConfig) -> Self {
        Self::with_globals_and_config(bytecode, Vec::new(), config)
    }

    /// Create a VM that continues with the globals of an earlier run.
    ///
    /// `globals` is padded with `null` (or truncated) to [`GLOBALS_SIZE`].
    pub fn with_globals(bytecode: Bytecode, globals: Vec<Value>) -> Self {
        Self::with_globals_and_config(bytecode, globals, VmConfig::default())
    }

    /// Like [`Vm::with_globals`], with explicit limits. `globals` is padded
    /// or truncated to `config.globals_size`.
    pub fn with_globals_and_config(
        bytecode: Bytecode,
        mut globals: Vec<Value>,
        config: VmConfig,
    ) -> Self {
        globals.resize(config.globals_size, NULL);
        Self {
            constants: bytecode.constants,
            instructions: bytecode.instructions,
            stack: vec![NULL; config.stack_size],
            sp: 0,
            globals,
        }
    }

    /// Give up the VM, keeping its globals for the next run.
    pub fn into_globals(self) -> Vec<Value> {
        self.globals
    }

    pub fn globals(&self) -> &[Value] {
        &self.globals
    }

    /// Current stack pointer: the number of live values on the stack.
    pub fn sp(&self) -> usize {
        self.sp
    }

    /// The value on top of the stack, without popping it.
    pub fn stack_top(&self) -> Option<&Value> {
        self.sp.checked_sub(1).and_then(|top| self.stack.get(top))
    }

    /// The value most recently popped. Only meaningful right after a pop.
    pub fn last_popped_stack_elem(&self) -> Option<&Value> {
        self.stack.get(self.sp)
    }

    /// Run the program to completion.
    #[tracing::instrument(level = "debug", skip_all, fields(len = self.instructions.len()))]
    pub fn run(&mut self) -> VmResult<()> {
        let result = self.execute();
        if let Err(err) = &result {
            debug!(error = %err, sp = self.sp, "vm run failed");
        }
        result
    }

    fn execute(&mut self) -> VmResult<()> {
        let mut ip = 0;
        while ip < self.instructions.len() {
            let byte = self.instructions.as_bytes()[ip];
            let op = Opcode::try_from(byte).map_err(VmError::UnknownOpcode)?;
            trace!(ip, op = op.definition().name, sp = self.sp, "execute");
            let start = ip;
            ip += 1;

            match op {
                Opcode::Constant => {
                    let index = self.read_operand(start, &mut ip)?;
                    let constant = self
                        .constants
                        .get(index)
                        .cloned()
                        .ok_or(VmError::ConstantOutOfRange(index))?;
                    self.push(constant)?;
                }

                Opcode::Add => self.binary(InfixOperator::Plus)?,
                Opcode::Sub => self.binary(InfixOperator::Minus)?,
                Opcode::Mul => self.binary(InfixOperator::Asterisk)?,
                Opcode::Div => self.binary(InfixOperator::Slash)?,
                Opcode::Equal => self.binary(InfixOperator::Eq)?,
                Opcode::NotEqual => self.binary(InfixOperator::NotEq)?,
                Opcode::GreaterThan => self.binary(InfixOperator::Gt)?,

                Opcode::Minus => self.unary(PrefixOperator::Minus)?,
                Opcode::Bang => self.unary(PrefixOperator::Bang)?,

                Opcode::Pop => {
                    self.pop()?;
                }

                Opcode::True => self.push(TRUE)?,
                Opcode::False => self.push(FALSE)?,
                Opcode::Null => self.push(NULL)?,

                Opcode::Jump => {
                    let target = self.read_operand(start, &mut ip)?;
                    ip = self.jump_target(target)?;
                }
                Opcode::JumpNotTruthy => {
                    let target = self.read_operand(start, &mut ip)?;
                    let condition = self.pop()?;
                    if !ops::is_truthy(&condition) {
                        ip = self.jump_target(target)?;
                    }
                }

                Opcode::SetGlobal => {
                    let index = self.read_operand(start, &mut ip)?;
                    let value = self.pop()?;
                    let slot = self
                        .globals
                        .get_mut(index)
                        .ok_or(VmError::GlobalOutOfRange(index))?;
                    *slot = value;
                }
                Opcode::GetGlobal => {
                    let index = self.read_operand(start, &mut ip)?;
                    let value = self
                        .globals
                        .get(index)
                        .cloned()
                        .ok_or(VmError::GlobalOutOfRange(index))?;
                    self.push(value)?;
                }

                Opcode::Array => {
                    let count = self.read_operand(start, &mut ip)?;
                    let elements = self.take(count)?;
                    self.push(Value::array(elements))?;
                }
                Opcode::Hash => {
                    let count = self.read_operand(start, &mut ip)?;
                    if count % 2 != 0 {
                        return Err(VmError::OddHashOperand(count));
                    }
                    let items = self.take(count)?;
                    let mut items = items.into_iter();
                    let mut entries = Vec::with_capacity(count / 2);
                    while let (Some(key), Some(value)) = (items.next(), items.next()) {
                        entries.push((key, value));
                    }
                    let hash = ops::build_hash(entries)?;
                    self.push(hash)?;
                }
                Opcode::Index => {
                    let index = self.pop()?;
                    let left = self.pop()?;
                    let value = ops::index(&left, &index)?;
                    self.push(value)?;
                }
            }
        }
        Ok(())
    }

    // ── Operands ─────────────────────────────────────────────────────────

    /// Read a `u16` operand at `ip` and advance past it.
    fn read_operand(&self, start: usize, ip: &mut usize) -> VmResult<usize> {
        let bytes = self
            .instructions
            .as_bytes()
            .get(*ip..*ip + 2)
            .ok_or(VmError::TruncatedInstruction { ip: start })?;
        *ip += 2;
        Ok(read_u16(bytes) as usize)
    }

    /// A jump may land on the end of the stream, which halts the VM.
    fn jump_target(&self, target: usize) -> VmResult<usize> {
        if target > self.instructions.len() {
            return Err(VmError::JumpOutOfRange(target));
        }
        Ok(target)
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn binary(&mut self, op: InfixOperator) -> VmResult<()> {
        let right = self.pop()?;
        let left = self.pop()?;
        let result = ops::infix(op, &left, &right)?;
        self.push(result)
    }

    fn unary(&mut self, op: PrefixOperator) -> VmResult<()> {
        let operand = self.pop()?;
        let result = ops::prefix(op, &operand)?;
        self.push(result)
    }

    // ── Stack ────────────────────────────────────────────────────────────

    fn push(&mut self, value: Value) -> VmResult<()> {
        let slot = self.stack.get_mut(self.sp).ok_or(VmError::StackOverflow)?;
        *slot = value;
        self.sp += 1;
        Ok(())
    }

    fn pop(&mut self) -> VmResult<Value> {
        self.sp = self.sp.checked_sub(1).ok_or(VmError::StackUnderflow)?;
        Ok(self.stack[self.sp].clone())
    }

    /// Pop the top `count` values, in the order they were pushed.
    fn take(&mut self, count: usize) -> VmResult<Vec<Value>> {
        let start = self.sp.checked_sub(count).ok_or(VmError::StackUnderflow)?;
        let values = self.stack[start..self.sp].to_vec();
        self.sp = start;
        Ok(values)
    }
}
