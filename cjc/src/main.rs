use clap::Parser;
use cjc::{CodeGen, Lexer, Parser as CjParser};
use color_print::cprintln;
use std::process;

#[derive(Debug, clap::Parser)]
#[clap(author, version, about)]
struct Args {
    /// Source file
    #[clap(default_value = "main.cj")]
    input: String,
}

fn main() {
    let args = Args::parse();

    let source = match std::fs::read_to_string(&args.input) {
        Ok(source) => source,
        Err(err) => {
            cprintln!("<r,s>error</>: cannot open {}: {}", args.input, err);
            process::exit(1);
        }
    };

    // 1. Tokenize
    let tokens = Lexer::new(&source).tokenize();
    for token in &tokens {
        println!("{token}");
    }

    // 2. Parse into the atom stream
    let atoms = match CjParser::new(tokens).parse() {
        Ok(atoms) => atoms,
        Err(err) => {
            cprintln!("<r,s>error</>: {}", err);
            process::exit(1);
        }
    };
    println!("Parsing complete: program is syntactically correct.");
    println!("Atom Stream:");
    for atom in &atoms {
        println!("{atom}");
    }
    println!("-----------------------------------");

    // 3. Generate machine words
    let words = match CodeGen::new().generate(&atoms) {
        Ok(words) => words,
        Err(err) => {
            cprintln!("<r,s>error</>: {}", err);
            process::exit(1);
        }
    };
    for word in &words {
        println!("{word}");
    }
}
