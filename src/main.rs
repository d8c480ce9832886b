use std::io::{self, BufRead, IsTerminal, Read, Write};

use tracing_subscriber::EnvFilter;

use lark::eval::{Env, Interp};
use lark::reader::{read_str, Reader};
use lark::value::Value;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut interp = Interp::new();

    let stdin = io::stdin();
    if stdin.is_terminal() {
        println!("Lark interpreter");
        println!(
            "  Globals: {} exposed, Symbols: {} interned",
            interp.globals.len(),
            interp.symbols.count()
        );
        println!("Ready.\n");
        run_interactive(&mut interp);
    } else {
        run_piped(&mut interp);
    }
}

/// Interactive loop: feed each line to one persistent incremental reader,
/// so a form may span as many lines as it likes.
fn run_interactive(interp: &mut Interp) {
    let stdin = io::stdin();
    let mut reader = Reader::new();

    loop {
        if reader.is_open() {
            print!("  ");
        } else {
            print!("> ");
        }
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        }

        match reader.feed(&line, &mut interp.heap, &mut interp.symbols) {
            Ok(forms) => {
                for expr in forms {
                    eval_and_print(interp, expr);
                }
            }
            Err(e) => {
                eprintln!("{}", e);
                reader = Reader::new();
            }
        }
    }
}

/// Piped mode: read everything, parse, evaluate form by form.
fn run_piped(interp: &mut Interp) {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("Read error: {}", e);
        return;
    }

    match read_str(&input, &mut interp.heap, &mut interp.symbols) {
        Ok(forms) => {
            for expr in forms {
                eval_and_print(interp, expr);
            }
        }
        Err(e) => eprintln!("{}", e),
    }
}

/// Evaluate one top-level form in an empty environment and print.
fn eval_and_print(interp: &mut Interp, expr: Value) {
    let mut env = Env::new();
    match interp.eval(expr, &mut env) {
        Ok(val) => println!("{}", interp.display(val)),
        Err(e) => eprintln!("Error: {}", e),
    }
}
