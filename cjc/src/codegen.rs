use crate::atom::Atom;
use crate::error::CompileError;
use accum::{EncodeError, Word};
use indexmap::IndexMap;

/// The single implicit register every load/store/arithmetic word goes
/// through.
const ACCUMULATOR: u8 = 0;

/// Two-pass code generator. Pass one walks the atom sequence emitting
/// instruction words, assigning storage addresses on first use and recording
/// the position of every label and every jump placeholder. Pass two patches
/// each placeholder's address field from the label table.
#[derive(Debug, Default)]
pub struct CodeGen {
    data_table: IndexMap<String, u32>,
    label_table: IndexMap<String, usize>,
    instructions: Vec<Word>,
    pending_jumps: Vec<(usize, String)>,
}

impl CodeGen {
    pub fn new() -> Self {
        CodeGen::default()
    }

    pub fn generate(mut self, atoms: &[Atom]) -> Result<Vec<Word>, CompileError> {
        for atom in atoms {
            match atom {
                Atom::Lbl { label } => {
                    self.label_table
                        .insert(label.clone(), self.instructions.len());
                }
                Atom::Mov { src, dest } => {
                    let src = self.addr_of(src);
                    let dest = self.addr_of(dest);
                    self.instructions.push(Word::lod(ACCUMULATOR, src)?);
                    self.instructions.push(Word::sto(ACCUMULATOR, dest)?);
                }
                Atom::Add { src1, src2, dest } => self.arith(Word::add, src1, src2, dest)?,
                Atom::Sub { src1, src2, dest } => self.arith(Word::sub, src1, src2, dest)?,
                Atom::Mul { src1, src2, dest } => self.arith(Word::mul, src1, src2, dest)?,
                Atom::Div { src1, src2, dest } => self.arith(Word::div, src1, src2, dest)?,
                Atom::Tst {
                    src1,
                    src2,
                    cmp,
                    label,
                } => {
                    let addr1 = self.addr_of(src1);
                    let addr2 = self.addr_of(src2);
                    self.instructions.push(Word::lod(ACCUMULATOR, addr1)?);
                    self.instructions
                        .push(Word::cmp(ACCUMULATOR, *cmp, addr2)?);
                    self.push_pending_jump(label)?;
                }
                Atom::Jmp { label } => {
                    self.push_pending_jump(label)?;
                }
                Atom::Hlt => {
                    self.instructions.push(Word::hlt());
                }
            }
        }

        self.patch_jumps()?;
        Ok(self.instructions)
    }

    /// Load src1, apply the arithmetic word on src2, store to dest.
    fn arith(
        &mut self,
        op: fn(u8, u32) -> Result<Word, EncodeError>,
        src1: &str,
        src2: &str,
        dest: &str,
    ) -> Result<(), CompileError> {
        let addr1 = self.addr_of(src1);
        let addr2 = self.addr_of(src2);
        let dest = self.addr_of(dest);
        self.instructions.push(Word::lod(ACCUMULATOR, addr1)?);
        self.instructions.push(op(ACCUMULATOR, addr2)?);
        self.instructions.push(Word::sto(ACCUMULATOR, dest)?);
        Ok(())
    }

    /// Storage addresses are handed out in first-use order from one space
    /// shared by variables, literals, and temporaries.
    fn addr_of(&mut self, name: &str) -> u32 {
        if let Some(&addr) = self.data_table.get(name) {
            return addr;
        }
        let addr = self.data_table.len() as u32;
        self.data_table.insert(name.to_string(), addr);
        addr
    }

    fn push_pending_jump(&mut self, label: &str) -> Result<(), CompileError> {
        let index = self.instructions.len();
        // Placeholder target; pass two fills in the real address.
        self.instructions.push(Word::jmp(0)?);
        self.pending_jumps.push((index, label.to_string()));
        Ok(())
    }

    fn patch_jumps(&mut self) -> Result<(), CompileError> {
        for (index, label) in &self.pending_jumps {
            let target = *self
                .label_table
                .get(label)
                .ok_or_else(|| CompileError::UndefinedLabel(label.clone()))?;
            self.instructions[*index] = self.instructions[*index].with_address(target as u32)?;
        }
        Ok(())
    }
}
