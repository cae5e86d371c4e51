use minilisp::ast::Expression;
use minilisp::builtinops::Keyword;
use minilisp::eval_str;
use minilisp::evaluator::{self, Environment};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::env;
use std::panic;
use std::process;

fn main() {
    init_tracing();

    let result = panic::catch_unwind(|| {
        run_repl();
    });

    if let Err(panic_info) = result {
        eprintln!("The REPL encountered an unexpected error and must exit.");

        if let Some(msg) = panic_info.downcast_ref::<&str>() {
            eprintln!("Error: {msg}");
        } else if let Some(msg) = panic_info.downcast_ref::<String>() {
            eprintln!("Error: {msg}");
        } else {
            eprintln!("Error: Unknown panic occurred");
        }

        process::exit(1);
    }
}

/// Log to stderr, only when `RUST_LOG` is set (e.g. `RUST_LOG=minilisp=trace`)
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_repl() {
    println!("minilisp - a small S-expression interpreter");
    println!("Enter one parenthesized expression per line, like: (+ 1 2)");
    println!("Type :help for more commands, or Ctrl+C to exit.");
    println!();

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Could not initialize REPL: {e}");
            return;
        }
    };
    let env = evaluator::create_global_env();

    loop {
        match rl.readline("minilisp> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(&env);
                        continue;
                    }
                    ":quit" | ":exit" | "exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                match eval_str(line, &env) {
                    // define, print and #nil have nothing to show
                    Ok(Expression::Void) => {}
                    Ok(result) => println!("{result}"),
                    Err(e) => println!("Error: {e}"),
                }
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn print_help() {
    println!("minilisp commands:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show current environment bindings");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C     - Exit the interpreter");
    println!();
    println!("Values:");
    println!("  Integers: 42, -5     Floats: 3.5, -0.25");
    println!("  Strings: \"hello\"     Constants: #t, #f, #nil");
    println!();
    println!("Operators (exactly two operands): + - * / % < > = !=");
    print!("Special forms:");
    for keyword in [
        Keyword::Define,
        Keyword::Lambda,
        Keyword::List,
        Keyword::Map,
        Keyword::Filter,
        Keyword::Reduce,
        Keyword::Length,
        Keyword::Range,
        Keyword::Print,
    ] {
        print!(" {keyword}");
    }
    println!(" if");
    println!();
    println!("Examples:");
    println!("  (+ \"Hello\" \" World\")");
    println!("  (define sqr (lambda (r) (* r r)))");
    println!("  (map sqr (range 0 5 1))");
    println!("  ((define r 10) (* 314 (sqr r)))");
    println!();
}

fn print_environment(env: &Environment) {
    let bindings = env.bindings();

    if bindings.is_empty() {
        println!("Environment is empty.");
        return;
    }

    let (functions, values): (Vec<_>, Vec<_>) = bindings
        .into_iter()
        .partition(|(_, value)| matches!(value, Expression::Closure { .. }));

    if !functions.is_empty() {
        println!("Functions ({}):", functions.len());
        for (name, closure) in functions {
            println!("  {name} = {closure}");
        }
    }

    if !values.is_empty() {
        println!("Values ({}):", values.len());
        for (name, value) in values {
            println!("  {name} = {value}");
        }
    }
}
