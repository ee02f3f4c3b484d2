use std::fmt;

/// One node of the linear three-address IR the parser emits. Control flow is
/// expressed by `Jmp`/`Tst` naming the `Lbl` they target; atom order is the
/// only other relationship between nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    Mov {
        src: String,
        dest: String,
    },
    Add {
        src1: String,
        src2: String,
        dest: String,
    },
    Sub {
        src1: String,
        src2: String,
        dest: String,
    },
    Mul {
        src1: String,
        src2: String,
        dest: String,
    },
    Div {
        src1: String,
        src2: String,
        dest: String,
    },
    Tst {
        src1: String,
        src2: String,
        cmp: u8,
        label: String,
    },
    Jmp {
        label: String,
    },
    Lbl {
        label: String,
    },
    Hlt,
}

impl Atom {
    /// Operation name plus the six dump columns: src1, src2, dest, cmp, label.
    fn columns(&self) -> (&'static str, [Option<String>; 5]) {
        match self {
            Atom::Mov { src, dest } => (
                "MOV",
                [Some(src.clone()), None, Some(dest.clone()), None, None],
            ),
            Atom::Add { src1, src2, dest } => (
                "ADD",
                [
                    Some(src1.clone()),
                    Some(src2.clone()),
                    Some(dest.clone()),
                    None,
                    None,
                ],
            ),
            Atom::Sub { src1, src2, dest } => (
                "SUB",
                [
                    Some(src1.clone()),
                    Some(src2.clone()),
                    Some(dest.clone()),
                    None,
                    None,
                ],
            ),
            Atom::Mul { src1, src2, dest } => (
                "MUL",
                [
                    Some(src1.clone()),
                    Some(src2.clone()),
                    Some(dest.clone()),
                    None,
                    None,
                ],
            ),
            Atom::Div { src1, src2, dest } => (
                "DIV",
                [
                    Some(src1.clone()),
                    Some(src2.clone()),
                    Some(dest.clone()),
                    None,
                    None,
                ],
            ),
            Atom::Tst {
                src1,
                src2,
                cmp,
                label,
            } => (
                "TST",
                [
                    Some(src1.clone()),
                    Some(src2.clone()),
                    None,
                    Some(cmp.to_string()),
                    Some(label.clone()),
                ],
            ),
            Atom::Jmp { label } => ("JMP", [None, None, None, None, Some(label.clone())]),
            Atom::Lbl { label } => ("LBL", [None, None, None, None, Some(label.clone())]),
            Atom::Hlt => ("HLT", [None, None, None, None, None]),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (op, fields) = self.columns();
        write!(f, "Atom({op}")?;
        for field in fields {
            match field {
                Some(value) => write!(f, ", {value}")?,
                None => write!(f, ", null")?,
            }
        }
        write!(f, ")")
    }
}
