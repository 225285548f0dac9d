//! GST command line renderer
//!
//! Usage:
//!   gst [OPTIONS] [FILE]
//!
//! Options:
//!   -p, --profile <FILE>     Profile with characters, mode, policy and declarations (TOML)
//!   -D, --define <KEY=VALUE> Declare a literal replacement (repeatable)
//!   -x, --exclude <KEY>      Do not report KEY when the template never uses it
//!       --policy <POLICY>    strict, lenient or warning
//!       --mode <MODE>        unescaped-is-text or unescaped-is-placeholder
//!       --tokens             Print the token sequence instead of rendering
//!   -v, --verbose            Log debug events to stderr
//!   -h, --help               Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gst_template::{EscapingMode, PolicyBundle, Profile, RenderError, Token, TokenSequence};

#[derive(Parser)]
#[command(name = "gst")]
#[command(about = "Render GST templates")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Profile file (TOML format)
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Literal declaration, overrides the profile's value for KEY
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_define)]
    defines: Vec<(String, String)>,

    /// Declared key that may stay unused
    #[arg(short = 'x', long = "exclude", value_name = "KEY")]
    excludes: Vec<String>,

    /// Policy bundle, overrides the profile
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Escaping mode, overrides the profile
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Print the token sequence instead of rendering
    #[arg(long)]
    tokens: bool,

    /// Log debug events to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Strict,
    Lenient,
    Warning,
}

impl From<PolicyArg> for PolicyBundle {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Strict => PolicyBundle::Strict,
            PolicyArg::Lenient => PolicyBundle::Lenient,
            PolicyArg::Warning => PolicyBundle::Warning,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    UnescapedIsText,
    UnescapedIsPlaceholder,
}

impl From<ModeArg> for EscapingMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::UnescapedIsText => EscapingMode::UnescapedIsText,
            ModeArg::UnescapedIsPlaceholder => EscapingMode::UnescapedIsPlaceholder,
        }
    }
}

fn parse_define(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load profile, then apply command line overrides
    let mut profile = match &cli.profile {
        Some(path) => match Profile::from_file(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error loading profile '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Profile::default(),
    };
    if let Some(policy) = cli.policy {
        profile = profile.with_policy(policy.into());
    }
    if let Some(mode) = cli.mode {
        profile = profile.with_mode(mode.into());
    }
    for (key, value) in &cli.defines {
        profile = profile.with_declaration(key.as_str(), value.as_str());
    }

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    if cli.tokens {
        match profile.tokenizer().tokenize(&source) {
            Ok(tokens) => print_tokens(&tokens),
            Err(e) => {
                eprint!("{}", e.format(&source, &filename));
                process::exit(1);
            }
        }
        return;
    }

    let excludes: Vec<&str> = cli.excludes.iter().map(String::as_str).collect();
    match gst_template::render_excluding(&source, &profile, &excludes) {
        Ok(output) => print!("{}", output),
        Err(RenderError::Parse(e)) => {
            eprint!("{}", e.format(&source, &filename));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn print_tokens(tokens: &TokenSequence) {
    for token in tokens {
        match token {
            Token::Text(text) => println!("{:>6}  text         {:?}", text.index, text.content),
            Token::Placeholder(placeholder) => {
                let mut flags = Vec::new();
                if placeholder.exclusion {
                    flags.push("excluded");
                }
                if !placeholder.end_expected {
                    flags.push("unterminated");
                }
                println!(
                    "{:>6}  placeholder  {:?} key={:?} argument={:?} {}",
                    placeholder.original().index,
                    placeholder.original().content,
                    placeholder.key(),
                    placeholder.argument(),
                    flags.join(",")
                );
            }
        }
    }
}
