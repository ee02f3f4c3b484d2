mod op;
mod word;

pub use op::Opcode;
pub use word::{EncodeError, Word, ADDR_BITS, CMP_BITS, OPCODE_BITS, REG_BITS};
