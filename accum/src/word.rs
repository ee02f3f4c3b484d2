use crate::op::Opcode;
use std::fmt;
use thiserror::Error;

// Word layout:
//   bits 0-3   : opcode
//   bit 4      : reserved, always zero
//   bits 5-7   : comparison code
//   bits 8-11  : register index
//   bits 12-31 : storage address

pub const OPCODE_BITS: u32 = 4;
pub const CMP_BITS: u32 = 3;
pub const REG_BITS: u32 = 4;
pub const ADDR_BITS: u32 = 20;

const CMP_SHIFT: u32 = 5;
const REG_SHIFT: u32 = 8;
const ADDR_SHIFT: u32 = 12;

const CMP_MASK: u32 = (1 << CMP_BITS) - 1;
const REG_MASK: u32 = (1 << REG_BITS) - 1;
const ADDR_MASK: u32 = (1 << ADDR_BITS) - 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{field} value {value} does not fit in {bits} bits")]
    FieldRange {
        field: &'static str,
        value: u32,
        bits: u32,
    },
}

fn check(field: &'static str, value: u32, bits: u32) -> Result<u32, EncodeError> {
    if value >> bits != 0 {
        return Err(EncodeError::FieldRange { field, value, bits });
    }
    Ok(value)
}

/// One 32-bit instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word(u32);

impl Word {
    pub fn encode(opcode: Opcode, cmp: u8, reg: u8, address: u32) -> Result<Word, EncodeError> {
        let cmp = check("comparison code", cmp as u32, CMP_BITS)?;
        let reg = check("register", reg as u32, REG_BITS)?;
        let address = check("address", address, ADDR_BITS)?;
        let opcode = u8::from(opcode) as u32;
        Ok(Word(
            opcode | (cmp << CMP_SHIFT) | (reg << REG_SHIFT) | (address << ADDR_SHIFT),
        ))
    }

    pub fn clr(reg: u8) -> Result<Word, EncodeError> {
        Word::encode(Opcode::Clr, 0, reg, 0)
    }

    pub fn add(reg: u8, address: u32) -> Result<Word, EncodeError> {
        Word::encode(Opcode::Add, 0, reg, address)
    }

    pub fn sub(reg: u8, address: u32) -> Result<Word, EncodeError> {
        Word::encode(Opcode::Sub, 0, reg, address)
    }

    pub fn mul(reg: u8, address: u32) -> Result<Word, EncodeError> {
        Word::encode(Opcode::Mul, 0, reg, address)
    }

    pub fn div(reg: u8, address: u32) -> Result<Word, EncodeError> {
        Word::encode(Opcode::Div, 0, reg, address)
    }

    pub fn lod(reg: u8, address: u32) -> Result<Word, EncodeError> {
        Word::encode(Opcode::Lod, 0, reg, address)
    }

    pub fn sto(reg: u8, address: u32) -> Result<Word, EncodeError> {
        Word::encode(Opcode::Sto, 0, reg, address)
    }

    pub fn cmp(reg: u8, code: u8, address: u32) -> Result<Word, EncodeError> {
        Word::encode(Opcode::Cmp, code, reg, address)
    }

    /// Jumps always go through register 0 with condition 0.
    pub fn jmp(address: u32) -> Result<Word, EncodeError> {
        Word::encode(Opcode::Jmp, 0, 0, address)
    }

    pub fn hlt() -> Word {
        Word(u8::from(Opcode::Hlt) as u32)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn opcode(self) -> Option<Opcode> {
        Opcode::try_from((self.0 & ((1 << OPCODE_BITS) - 1)) as u8).ok()
    }

    pub fn cmp_code(self) -> u8 {
        ((self.0 >> CMP_SHIFT) & CMP_MASK) as u8
    }

    pub fn reg(self) -> u8 {
        ((self.0 >> REG_SHIFT) & REG_MASK) as u8
    }

    pub fn address(self) -> u32 {
        (self.0 >> ADDR_SHIFT) & ADDR_MASK
    }

    /// Rewrites the address field, leaving every other bit untouched.
    pub fn with_address(self, address: u32) -> Result<Word, EncodeError> {
        let address = check("address", address, ADDR_BITS)?;
        Ok(Word((self.0 & !(ADDR_MASK << ADDR_SHIFT)) | (address << ADDR_SHIFT)))
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032b}", self.0)
    }
}
