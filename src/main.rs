use std::{
    env,
    fs::read_to_string,
    io::{self, Read},
    path::PathBuf,
    process,
    time::Instant,
};

use inkwell::{context::Context, values::AnyValue};
use kaleidoscope::{
    compiler::llvm::LlvmBackend,
    driver::{Driver, Outcome},
    errors::errors::{Error, ErrorTip},
    get_line_at_position,
    lexer::lexer::Lexer,
    parser::{lookups::PrecedenceTable, parser::Parser},
};

struct Options {
    file: Option<String>,
    emit: Option<PathBuf>,
    operators: Vec<(char, i32)>,
}

fn main() {
    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("usage: kaleidoscope [--binop <op>=<precedence>]... [--emit <path>] [file]");
            process::exit(2);
        }
    };

    let (source, file_name) = match read_source(&options.file) {
        Ok(read) => read,
        Err(error) => {
            eprintln!("Failed to read input: {}", error);
            process::exit(1);
        }
    };

    let start = Instant::now();

    let mut precedence = PrecedenceTable::default();
    for (op, level) in &options.operators {
        precedence.install(*op, *level);
    }
    let lexer = Lexer::new(source.clone(), Some(file_name.clone()));
    let parser = Parser::with_precedence(lexer, precedence);

    let context = Context::create();
    let mut backend = LlvmBackend::new(&context, &file_name);

    let mut failures = 0;
    {
        let mut driver = Driver::new(parser, &mut backend);

        while let Some(outcome) = driver.step() {
            match outcome {
                Outcome::Defined { function, .. } => {
                    println!("Read function definition:");
                    print!("{}", function.print_to_string().to_string());
                }
                Outcome::Declared { function, .. } => {
                    println!("Read extern:");
                    print!("{}", function.print_to_string().to_string());
                }
                Outcome::Evaluated { function } => {
                    println!("Read top-level expression:");
                    print!("{}", function.print_to_string().to_string());
                }
                Outcome::Failed(error) => {
                    failures += 1;
                    display_error(&error, &source, &file_name);
                }
            }
        }
    }

    println!("Parsed and lowered in {:?}", start.elapsed());

    if let Some(path) = options.emit {
        if let Err(error) = backend.save_module_to_file(path.clone()) {
            eprintln!("Failed to write {}: {}", path.to_string_lossy(), error);
            process::exit(1);
        }
        println!("Wrote module to {}", path.to_string_lossy());
    } else {
        print!("{}", backend.print_to_string());
    }

    if failures > 0 {
        process::exit(1);
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options {
        file: None,
        emit: None,
        operators: vec![],
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--binop" => {
                let value = args.next().ok_or("--binop needs a value")?;
                options.operators.push(parse_binop(&value)?);
            }
            "--emit" => {
                let value = args.next().ok_or("--emit needs a path")?;
                options.emit = Some(PathBuf::from(value));
            }
            _ if arg.starts_with("--") => return Err(format!("unknown flag {}", arg)),
            _ => {
                if options.file.replace(arg).is_some() {
                    return Err(String::from("only one input file may be given"));
                }
            }
        }
    }

    Ok(options)
}

/// Parses `c=n` into an operator character and its precedence.
fn parse_binop(value: &str) -> Result<(char, i32), String> {
    let (op, level) = value
        .split_once('=')
        .ok_or_else(|| format!("expected <op>=<precedence>, found {:?}", value))?;

    let mut chars = op.chars();
    let op = match (chars.next(), chars.next()) {
        (Some(op), None) => op,
        _ => return Err(format!("operator must be a single character, found {:?}", op)),
    };

    let level = level
        .parse::<i32>()
        .map_err(|_| format!("invalid precedence {:?}", level))?;

    Ok((op, level))
}

fn read_source(file: &Option<String>) -> io::Result<(String, String)> {
    match file {
        Some(path) => {
            let name = PathBuf::from(path)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.clone());
            Ok((read_to_string(path)?, name))
        }
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok((source, String::from("stdin")))
        }
    }
}

fn display_error(error: &Error, source: &str, file_name: &str) {
    /*
        Error: message
        -> file.ks
           |
        20 | def f(x x) x
           | ---------^
    */

    if let ErrorTip::None = error.get_tip() {
        println!("Error: {}: {}", error.get_error_name(), error);
    } else {
        println!("Error: {}: {} ({})", error.get_error_name(), error, error.get_tip());
    }

    // Lowering errors carry no source position
    if error.is_lowering_error() {
        return;
    }

    let position = error.get_position();
    let Some((line, line_text, line_pos)) = get_line_at_position(source, position.0) else {
        return;
    };

    let line_str = line.to_string();
    let padding = line_str.len() + 2;

    println!("-> {}", file_name);
    println!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    println!("{} | {}", line_str, line_text_removed.trim_end());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    println!("{:>padding$} {:->arrows$}", "|", "^");
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.len() - string.trim_start_matches([' ', '\t']).len();

    (String::from(&string[start..]), start)
}
