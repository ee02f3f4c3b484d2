use accum::{Opcode, Word};
use cjc::{Atom, CodeGen, CompileError, Lexer, Parser};

fn compile(code: &str) -> Vec<Word> {
    let tokens = Lexer::new(code).tokenize();
    let atoms = Parser::new(tokens).parse().expect("program should parse");
    CodeGen::new()
        .generate(&atoms)
        .expect("program should encode")
}

fn opcodes(words: &[Word]) -> Vec<Opcode> {
    words.iter().map(|w| w.opcode().unwrap()).collect()
}

#[test]
fn round_trip_sum() {
    let words = compile("num x 5; num y 3; z = x + y;");
    assert_eq!(words.len(), 9);
    assert_eq!(
        opcodes(&words),
        vec![
            Opcode::Lod, // 5
            Opcode::Sto, // x
            Opcode::Lod, // 3
            Opcode::Sto, // y
            Opcode::Lod, // x
            Opcode::Add, // y
            Opcode::Sto, // t0
            Opcode::Lod, // t0
            Opcode::Sto, // z
        ]
    );

    // Addresses assigned in first-use order: 5, x, 3, y, t0, z.
    let addrs: Vec<u32> = words.iter().map(|w| w.address()).collect();
    assert_eq!(addrs, vec![0, 1, 2, 3, 1, 3, 4, 4, 5]);

    // Everything runs through the accumulator.
    assert!(words.iter().all(|w| w.reg() == 0));
}

#[test]
fn distinct_names_get_distinct_addresses() {
    // Re-referencing a name reuses its first address.
    let words = compile("x y; y x;");
    assert_eq!(
        opcodes(&words),
        vec![Opcode::Lod, Opcode::Sto, Opcode::Lod, Opcode::Sto]
    );
    let addrs: Vec<u32> = words.iter().map(|w| w.address()).collect();
    // y -> 0, x -> 1 in first-use order, then reused.
    assert_eq!(addrs, vec![0, 1, 1, 0]);
}

#[test]
fn control_flow_patching() {
    let words = compile("if |x < 5| ( y = 1; ) else ( y = 2; )");
    assert_eq!(
        opcodes(&words),
        vec![
            Opcode::Lod, // x
            Opcode::Sub, // 5
            Opcode::Sto, // t0
            Opcode::Lod, // t0
            Opcode::Cmp, // against "0"
            Opcode::Jmp, // to else
            Opcode::Lod, // 1
            Opcode::Sto, // y
            Opcode::Jmp, // to end
            Opcode::Lod, // 2
            Opcode::Sto, // y
        ]
    );

    // The comparison carries the "<" code.
    assert_eq!(words[4].cmp_code(), 2);

    // Else label lands after the if body, end label after everything.
    assert_eq!(words[5].address(), 9);
    assert_eq!(words[8].address(), 11);

    // Patched targets stay within (or just past) the instruction buffer.
    assert!(words[5].address() as usize <= words.len());
    assert!(words[8].address() as usize <= words.len());
}

#[test]
fn during_loop_jumps_backwards() {
    let words = compile("during |n > 0| ( n = n - 1; )");
    // sub(n,0,t0): LOD SUB STO; loop: LOD CMP JMP; body: LOD SUB STO,
    // LOD STO; JMP back.
    assert_eq!(words.len(), 12);
    assert_eq!(words[4].opcode(), Some(Opcode::Cmp));
    assert_eq!(words[4].cmp_code(), 3);
    // Conditional exit jumps past the end; the tail jump returns to the
    // loop-start label at index 3.
    assert_eq!(words[5].opcode(), Some(Opcode::Jmp));
    assert_eq!(words[5].address(), 12);
    assert_eq!(words[11].opcode(), Some(Opcode::Jmp));
    assert_eq!(words[11].address(), 3);
}

#[test]
fn label_emits_no_words() {
    let atoms = vec![
        Atom::Lbl { label: "L0".into() },
        Atom::Jmp { label: "L0".into() },
    ];
    let words = CodeGen::new().generate(&atoms).unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].opcode(), Some(Opcode::Jmp));
    assert_eq!(words[0].address(), 0);
}

#[test]
fn forward_jump_is_patched() {
    let atoms = vec![
        Atom::Jmp { label: "L0".into() },
        Atom::Hlt,
        Atom::Lbl { label: "L0".into() },
        Atom::Hlt,
    ];
    let words = CodeGen::new().generate(&atoms).unwrap();
    assert_eq!(words.len(), 3);
    assert_eq!(words[0].address(), 2);
    assert_eq!(words[1].opcode(), Some(Opcode::Hlt));
}

#[test]
fn hlt_atom_encodes_hlt_word() {
    let words = CodeGen::new().generate(&[Atom::Hlt]).unwrap();
    assert_eq!(words, vec![Word::hlt()]);
}

#[test]
fn undefined_label_is_fatal() {
    let atoms = vec![Atom::Jmp { label: "L9".into() }];
    let err = CodeGen::new().generate(&atoms).unwrap_err();
    assert_eq!(err, CompileError::UndefinedLabel("L9".to_string()));
}

#[test]
fn tst_cmp_code_survives_patching() {
    let atoms = vec![
        Atom::Tst {
            src1: "a".into(),
            src2: "0".into(),
            cmp: 6,
            label: "L0".into(),
        },
        Atom::Lbl { label: "L0".into() },
    ];
    let words = CodeGen::new().generate(&atoms).unwrap();
    assert_eq!(words[1].cmp_code(), 6);
    assert_eq!(words[2].opcode(), Some(Opcode::Jmp));
    assert_eq!(words[2].cmp_code(), 0);
    assert_eq!(words[2].address(), 3);
}

#[test]
fn words_render_as_32_bit_binary() {
    let words = compile("num x 5;");
    for word in &words {
        let text = word.to_string();
        assert_eq!(text.len(), 32);
        assert!(text.chars().all(|c| c == '0' || c == '1'));
    }
    // LOD acc, addr 0 -> opcode 7, all other fields zero.
    assert_eq!(
        words[0].to_string(),
        "00000000000000000000000000000111"
    );
}
