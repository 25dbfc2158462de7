use std::{env, fs, process};

use cythonic::interpreter::Interpreter;
use cythonic::parser::Parser;
use cythonic::symtab;
use cythonic::tokenizer::Tokenizer;

/// Driver code.
fn main() {
    let args: Vec<String> = env::args().collect();

    // Note that `args[0]` will be the name of the binary, so exactly one
    // given argument is expected.
    if args.len() != 2 {
        eprintln!("Usage: cythonic <script.cytho>");
        process::exit(1);
    }
    run_file(&args[1]);
}

/// Runs the source code given at the file path. An unreadable source file is
/// the only condition fatal to a run.
fn run_file(path: &str) {
    if !path.ends_with(".cytho") {
        eprintln!("Error: Invalid file type. Expected '.cytho' extension.");
        process::exit(1);
    }

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(_) => {
            eprintln!("Error: Cannot open file '{}'", path);
            process::exit(1);
        },
    };

    run(&source, path);
}

/// Scans, parses and interprets one source buffer, writing the symbol-table
/// and parse-trace artifacts next to the source file. Artifact write
/// failures are reported and the run continues.
fn run(source: &str, path: &str) {
    // Lexical analysis.
    let mut tokenizer = Tokenizer::new(source);
    let tokens = tokenizer.tokenize();

    let table_path = format!("{}.symboltable.txt", path);
    let mut table = Vec::new();
    // Writing into the buffer cannot fail; only the file write can.
    symtab::write_symbol_table(&tokens, &mut table).ok();
    match fs::write(&table_path, table) {
        Ok(()) => println!("Lexical Analysis Complete. Symbol table written to: {}", table_path),
        Err(_) => eprintln!("Error: Cannot create symbol table file '{}'", table_path),
    }

    // Syntax analysis. The parser reports and recovers as it goes, so the
    // statements it returns are always safe to evaluate.
    println!("Starting Syntax Analysis...");
    let mut parser = Parser::new(tokens);
    let statements = parser.parse();

    let tree_path = format!("{}.parsetree.txt", path);
    if fs::write(&tree_path, parser.trace().text()).is_err() {
        eprintln!("Error: Cannot create output file '{}'", tree_path);
    }

    if parser.had_error() {
        println!("Syntax Analysis Complete: Errors found.");
    } else {
        println!("Syntax Analysis Complete: No errors found.");
    }

    // Evaluation and execution.
    let mut interpreter = Interpreter::new();
    interpreter.interpret(&statements);
}
