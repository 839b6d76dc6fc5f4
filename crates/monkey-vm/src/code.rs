//! Opcode definitions, instruction encoding and disassembly.
//!
//! ```text
//! offset+0 : u8      opcode
//! offset+1 : operands, big-endian, widths per Definition::operand_widths
//! ```

use std::fmt;

/// A single-byte instruction tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Push `constants[u16]`.
    Constant = 0,
    Add,
    Sub,
    Mul,
    Div,
    /// Discard the top of the stack.
    Pop,
    True,
    False,
    Null,
    Equal,
    NotEqual,
    GreaterThan,
    /// Prefix `-`.
    Minus,
    /// Prefix `!`.
    Bang,
    /// Jump to the absolute offset `u16`.
    Jump,
    /// Pop a condition; jump to `u16` when it is falsy.
    JumpNotTruthy,
    /// Push `globals[u16]`.
    GetGlobal,
    /// Pop into `globals[u16]`.
    SetGlobal,
    /// Collect the top `u16` values into an array.
    Array,
    /// Collect the top `u16` values (alternating key, value) into a hash.
    Hash,
    /// Pop index, pop container, push `container[index]`.
    Index,
}

const ALL_OPCODES: [Opcode; 21] = [
    Opcode::Constant,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Pop,
    Opcode::True,
    Opcode::False,
    Opcode::Null,
    Opcode::Equal,
    Opcode::NotEqual,
    Opcode::GreaterThan,
    Opcode::Minus,
    Opcode::Bang,
    Opcode::Jump,
    Opcode::JumpNotTruthy,
    Opcode::GetGlobal,
    Opcode::SetGlobal,
    Opcode::Array,
    Opcode::Hash,
    Opcode::Index,
];

/// Name and operand layout of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Definition {
    pub name: &'static str,
    pub operand_widths: &'static [usize],
}

impl Opcode {
    pub fn definition(self) -> Definition {
        let (name, operand_widths): (&'static str, &'static [usize]) = match self {
            Opcode::Constant => ("OpConstant", &[2]),
            Opcode::Add => ("OpAdd", &[]),
            Opcode::Sub => ("OpSub", &[]),
            Opcode::Mul => ("OpMul", &[]),
            Opcode::Div => ("OpDiv", &[]),
            Opcode::Pop => ("OpPop", &[]),
            Opcode::True => ("OpTrue", &[]),
            Opcode::False => ("OpFalse", &[]),
            Opcode::Null => ("OpNull", &[]),
            Opcode::Equal => ("OpEqual", &[]),
            Opcode::NotEqual => ("OpNotEqual", &[]),
            Opcode::GreaterThan => ("OpGreaterThan", &[]),
            Opcode::Minus => ("OpMinus", &[]),
            Opcode::Bang => ("OpBang", &[]),
            Opcode::Jump => ("OpJump", &[2]),
            Opcode::JumpNotTruthy => ("OpJumpNotTruthy", &[2]),
            Opcode::GetGlobal => ("OpGetGlobal", &[2]),
            Opcode::SetGlobal => ("OpSetGlobal", &[2]),
            Opcode::Array => ("OpArray", &[2]),
            Opcode::Hash => ("OpHash", &[2]),
            Opcode::Index => ("OpIndex", &[]),
        };
        Definition {
            name,
            operand_widths,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        ALL_OPCODES.get(byte as usize).copied().ok_or(byte)
    }
}

/// Look up the definition of a raw opcode byte.
pub fn lookup(byte: u8) -> Option<Definition> {
    Opcode::try_from(byte).ok().map(Opcode::definition)
}

/// Encode one instruction. Operands are truncated to their declared width.
pub fn make(op: Opcode, operands: &[usize]) -> Vec<u8> {
    let def = op.definition();
    let len = 1 + def.operand_widths.iter().sum::<usize>();
    let mut instruction = Vec::with_capacity(len);
    instruction.push(op as u8);
    for (operand, width) in operands.iter().zip(def.operand_widths) {
        match *width {
            2 => instruction.extend_from_slice(&(*operand as u16).to_be_bytes()),
            1 => instruction.push(*operand as u8),
            _ => {}
        }
    }
    instruction
}

/// Decode the operands following an opcode. Returns the operands and the
/// number of bytes read, or `None` if `ins` is too short.
pub fn read_operands(def: &Definition, ins: &[u8]) -> Option<(Vec<usize>, usize)> {
    let mut operands = Vec::with_capacity(def.operand_widths.len());
    let mut offset = 0;
    for width in def.operand_widths {
        let bytes = ins.get(offset..offset + width)?;
        let operand = match *width {
            2 => read_u16(bytes) as usize,
            1 => bytes[0] as usize,
            _ => 0,
        };
        operands.push(operand);
        offset += width;
    }
    Some((operands, offset))
}

/// Read a big-endian `u16` from the first two bytes of `ins`.
///
/// Panics if `ins` is shorter than two bytes; callers bounds-check first.
pub fn read_u16(ins: &[u8]) -> u16 {
    u16::from_be_bytes([ins[0], ins[1]])
}

// ══════════════════════════════════════════════════════════════════════════════
// Instructions
// ══════════════════════════════════════════════════════════════════════════════

/// A flat instruction stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instructions(pub Vec<u8>);

impl Instructions {
    /// Concatenate encoded instructions in order.
    pub fn concat(parts: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Instructions(parts.into_iter().flatten().collect())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Instructions {
    fn from(bytes: Vec<u8>) -> Self {
        Instructions(bytes)
    }
}

impl FromIterator<Vec<u8>> for Instructions {
    fn from_iter<I: IntoIterator<Item = Vec<u8>>>(iter: I) -> Self {
        Instructions::concat(iter)
    }
}

/// Disassembly, one `offset name operands` line per instruction.
impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut i = 0;
        while i < self.0.len() {
            let Some(def) = lookup(self.0[i]) else {
                writeln!(f, "ERROR: unknown opcode {}", self.0[i])?;
                i += 1;
                continue;
            };
            let Some((operands, read)) = read_operands(&def, &self.0[i + 1..]) else {
                writeln!(f, "ERROR: truncated {} at {i:04}", def.name)?;
                break;
            };
            write!(f, "{i:04} {}", def.name)?;
            for operand in &operands {
                write!(f, " {operand}")?;
            }
            writeln!(f)?;
            i += 1 + read;
        }
        Ok(())
    }
}
