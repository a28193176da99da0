use calc::{
    keypad::{Calculator, Key},
    parser::{self, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT},
    *,
};
use clap::{builder::RangedU64ValueParser, Parser, Subcommand};
use miette::{IntoDiagnostic, Report, WrapErr};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Deepest nesting of parentheses and unary minus to accept.
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_MAX_DEPTH,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_DEPTH_LIMIT as u64)
    )]
    max_depth: usize,

    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Tokenize { expression: String },
    Parse { expression: String },
    Eval { expression: String },
    Calc,
    /// Press keypad keys in order and print the display.
    Keys {
        #[arg(required = true, allow_hyphen_values = true)]
        keys: Vec<String>,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn report(err: CalcError, source: &str) -> Report {
    Report::new(err).with_source_code(source.to_string())
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = Options {
        max_depth: cli.max_depth,
    };

    match cli.command {
        Commands::Tokenize { expression } => {
            for token in Lexer::new(&expression) {
                println!("{:?}", token);
            }
        }
        Commands::Parse { expression } => {
            let mut parser = parser::Parser::with_max_depth(&expression, options.max_depth);
            match parser.parse() {
                Ok(tt) => println!("{tt}"),
                Err(e) => return Err(report(e, &expression)),
            }
        }
        Commands::Eval { expression } => match evaluate_with(&expression, &options) {
            Ok(value) => println!("{}", format_number(value)),
            Err(e) => return Err(report(e, &expression)),
        },
        Commands::Calc => {
            let stdin = io::stdin();
            let mut lines = stdin.lock().lines();

            loop {
                print!("calc> ");
                if let Err(err) = io::stdout().flush() {
                    tracing::warn!(%err, "could not flush the prompt");
                }

                let Some(line) = lines.next() else {
                    break;
                };
                let line = line.into_diagnostic().wrap_err("reading stdin failed")?;
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if input.eq_ignore_ascii_case("exit") {
                    break;
                }

                tracing::debug!(input, "evaluating");
                match evaluate_with(input, &options) {
                    Ok(value) => println!("{}", format_number(value)),
                    Err(e) => eprintln!("{:?}", report(e, input)),
                }
            }
        }
        Commands::Keys { keys } => {
            let keys = keys
                .iter()
                .map(|label| label.parse::<Key>())
                .collect::<Result<Vec<_>, _>>()?;

            let mut calculator = Calculator::with_options(options);
            calculator.press_all(keys);
            println!("{}", calculator.display());

            if let (Some(err), Some(text)) =
                (calculator.last_error(), calculator.failed_expression())
            {
                eprintln!("{:?}", report(err.clone(), text));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_max_depth_is_bounded() {
        let limit = MAX_DEPTH_LIMIT.to_string();
        let cli = Cli::try_parse_from(["calc", "--max-depth", limit.as_str(), "calc"]).unwrap();
        assert_eq!(cli.max_depth, MAX_DEPTH_LIMIT);

        let too_deep = (MAX_DEPTH_LIMIT + 1).to_string();
        assert!(Cli::try_parse_from(["calc", "--max-depth", too_deep.as_str(), "calc"]).is_err());
        assert!(Cli::try_parse_from(["calc", "--max-depth", "0", "calc"]).is_err());
    }

    #[test]
    fn test_keys_accept_minus() {
        let cli = Cli::try_parse_from(["calc", "keys", "-", "5", "="]).unwrap();
        assert_eq!(cli.max_depth, DEFAULT_MAX_DEPTH);
        match cli.command {
            Commands::Keys { keys } => assert_eq!(keys, vec!["-", "5", "="]),
            other => panic!("expected keys, got {other:?}"),
        }
    }
}
