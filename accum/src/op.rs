use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::Display;

/// Operations of the accumulator machine. The discriminant is the opcode
/// nibble stored in bits 0-3 of an instruction word.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Display,
)]
#[repr(u8)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Opcode {
    Clr = 0,
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
    Jmp = 5,
    Cmp = 6,
    Lod = 7,
    Sto = 8,
    Hlt = 9,
}
