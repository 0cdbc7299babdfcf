use std::fs;
use std::io::{self, Read as _, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

mod config;

use config::LineEnding;

/// Reversibly converts binary data to UTF-8 text and back.
///
/// Valid UTF-8 in the input stays readable in the encoded text. Every other
/// byte is mapped to the char with the same value.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// An additional TOML configuration file.
    ///
    /// It takes precedence over `utf8bin.toml` in the working directory.
    /// Environment variables starting with `UTF8BIN_` take precedence over
    /// both.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encode binary data as text.
    Encode(IoArgs),
    /// Decode encoded text back into binary data.
    Decode(IoArgs),
}

#[derive(Debug, clap::Args)]
struct IoArgs {
    /// The input file.
    ///
    /// If not specified, reads from stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// The output file.
    ///
    /// If not specified, writes to stdout. The file is only written once the
    /// whole input was processed successfully.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref())?;
    init_logging(config.log)?;

    let res = run(cli.command, config.output.line_ending);
    if let Err(why) = &res {
        log::error!("Exiting due to error: {why:?}");
    }

    log::logger().flush();
    res
}

fn run(command: Command, line_ending: LineEnding) -> anyhow::Result<()> {
    match command {
        Command::Encode(args) => {
            let data = read_input(args.input.as_deref())?;
            let text = encode_output(&data, line_ending);

            log::info!("Encoded {} bytes into {} chars.", data.len(), text.chars().count());
            write_output(args.output.as_deref(), text.as_bytes())
        },
        Command::Decode(args) => {
            let text = read_input(args.input.as_deref())?;
            let data = decode_input(&text, line_ending)?;

            log::info!("Decoded {} text bytes into {} bytes.", text.len(), data.len());
            write_output(args.output.as_deref(), &data)
        },
    }
}

fn encode_output(data: &[u8], line_ending: LineEnding) -> String {
    let mut text = utf8_bin::to_string(data);
    text.push_str(line_ending.as_str());
    text
}

fn decode_input(text: &[u8], line_ending: LineEnding) -> anyhow::Result<Vec<u8>> {
    let text = line_ending.strip(text);
    utf8_bin::from_bytes(text).context("input is not valid encoded text")
}

fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("cannot read input {path:?}")),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("cannot read stdin")?;
            Ok(buf)
        },
    }
}

fn write_output(path: Option<&Path>, data: &[u8]) -> anyhow::Result<()> {
    match path {
        Some(path) => fs::write(path, data).with_context(|| format!("cannot write output {path:?}")),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data).context("cannot write to stdout")?;
            stdout.flush().context("cannot flush stdout")
        },
    }
}

fn init_logging(config: log4rs::config::RawConfig) -> anyhow::Result<()> {
    use log4rs::config::Deserializers;

    let (appenders, errors) = config.appenders_lossy(&Deserializers::default());
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let config = log4rs::Config::builder()
        .appenders(appenders)
        .loggers(config.loggers())
        .build(config.root())?;

    log4rs::init_config(config)?;
    Ok(())
}
