use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{ArgAction, ArgGroup, Parser};
use console::style;
use tracing::Level;

/// Compiler and interpreter for TINY programs.
#[derive(Parser, Debug)]
#[command(name = "tiny", version, about)]
#[command(group(ArgGroup::new("action").required(true).args(["tree", "interpret", "nasm"])))]
struct Cli {
    /// Display the syntax tree on stdout
    #[arg(short = 't', value_name = "SRC")]
    tree: Option<PathBuf>,

    /// Execute the program with the interpreter
    #[arg(short = 'i', value_name = "SRC")]
    interpret: Option<PathBuf>,

    /// Translate the program into NASM source
    #[arg(short = 'n', num_args = 2, value_names = ["SRC", "DST"])]
    nasm: Option<Vec<PathBuf>>,

    /// Log pipeline stages to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    if let Some(src) = &cli.tree {
        let source = read_source(src)?;
        print!("{}", tiny::dump_tree(&source)?);
    } else if let Some(src) = &cli.interpret {
        let source = read_source(src)?;
        let stdin = io::stdin();
        let stdout = io::stdout();
        tiny::interpret(&source, stdin.lock(), stdout.lock())?;
    } else if let Some(paths) = &cli.nasm {
        let (src, dst) = match paths.as_slice() {
            [src, dst] => (src, dst),
            _ => bail!("-n expects a source and a destination file"),
        };
        let source = read_source(src)?;
        let asm = tiny::generate_nasm(&source)?;
        fs::write(dst, asm).with_context(|| format!("cannot write {}", dst.display()))?;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("{} {:#}", style("[*ERROR*]").red().bold(), err);
        process::exit(1);
    }
}
