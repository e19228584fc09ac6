// pascc: Pascal-subset compiler emitting 32-bit assembler text

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use pascc::codegen::BackendProfile;
use pascc::error::CompileError;
use pascc::{compile_file, load_profile};

/// Exit status for soft diagnostics or a failed lowering
const EXIT_ERRORS: i32 = 1;
/// Exit status for hard aborts and unreadable input
const EXIT_ABORT: i32 = 2;

/// Compile a Pascal-subset program to assembler text.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Source file to compile
    file: PathBuf,

    /// Write the assembler text here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Backend profile file (`key = value` lines)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Print the syntax tree to stderr
    #[arg(long)]
    dump_tree: bool,

    /// Report progress on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let profile = match &args.profile {
        Some(path) => load_profile(path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(EXIT_ABORT);
        }),
        None => BackendProfile::default(),
    };

    if args.verbose {
        eprintln!("Parsing {}...", args.file.display());
    }

    let compilation = match compile_file(&args.file, &profile) {
        Ok(compilation) => compilation,
        Err(e @ CompileError::Aborted { .. }) => {
            for diag in e.diagnostics() {
                eprintln!("{}", diag);
            }
            eprintln!("Error: {}", e);
            process::exit(EXIT_ABORT);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(EXIT_ABORT);
        }
    };

    let program = &compilation.program;
    if args.verbose {
        eprintln!(
            "Parsed {} tokens, {} symbols, {} tree nodes",
            compilation.token_count,
            program.symbols.len(),
            program.tree.len()
        );
    }

    for diag in &program.diagnostics {
        eprintln!("{}", diag);
    }

    if args.dump_tree || program.has_errors() {
        if let Some(root) = program.root() {
            eprint!("{}", program.tree.render(root));
        }
    }

    match &compilation.output {
        Ok(text) => {
            if let Some(path) = &args.output {
                if let Err(e) = fs::write(path, text) {
                    eprintln!("Error: cannot write '{}': {}", path.display(), e);
                    process::exit(EXIT_ERRORS);
                }
                if args.verbose {
                    eprintln!("Wrote {}", path.display());
                }
            } else {
                print!("{}", text);
            }
        }
        Err(e) => eprintln!("Code generation error: {}", e),
    }

    if compilation.is_abort() {
        process::exit(EXIT_ABORT);
    }
    if compilation.has_errors() {
        process::exit(EXIT_ERRORS);
    }
}
