//! `jt` CLI: format, query, and edit JSON documents by path.
//!
//! ## Usage
//!
//! ```sh
//! # Re-emit a document compactly (stdin -> stdout)
//! echo '{ "a": [1, 2] }' | jt fmt
//!
//! # Pretty-print a file, feeding the parser 64 characters at a time
//! jt fmt --pretty --chunk-size 64 -i data.json
//!
//! # Look up a value; wildcards return the first match
//! jt get users/0/name -i data.json
//!
//! # List every concrete path a pattern matches
//! jt paths 'users/*/email' -i data.json
//!
//! # Append to an array, creating it if missing
//! jt set tags/# '"new"' -i data.json -o data.json
//!
//! # Remove a key from every element
//! jt rm 'users/*/password' -i data.json
//! ```
//!
//! Logs go to stderr. `RUST_LOG` selects the level (default `warn`);
//! `-v` switches to `debug`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use jsontree::{FormatOptions, Node};
use std::io::{self, Read};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(
    name = "jt",
    version,
    about = "Query and edit JSON documents by path"
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,

    /// Feed the parser this many characters at a time
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    chunk_size: Option<u64>,
}

#[derive(Args)]
struct Output {
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,

    /// One element or pair per line
    #[arg(long)]
    pretty: bool,

    /// Spaces per nesting level in pretty output
    #[arg(long, default_value_t = 2)]
    indent: usize,
}

impl Output {
    fn options(&self) -> FormatOptions {
        let base = if self.pretty {
            FormatOptions::pretty()
        } else {
            FormatOptions::compact()
        };
        base.with_indent_width(self.indent)
    }

    fn emit(&self, node: &Node) -> Result<()> {
        let mut text = jsontree::to_string(node, &self.options());
        text.push('\n');
        write_output(self.output.as_deref(), &text)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document and print it back
    Fmt {
        #[command(flatten)]
        input: Input,
        #[command(flatten)]
        output: Output,
    },
    /// Print the value at a path (fails if nothing matches)
    Get {
        /// Path such as `a/b/0`, `items/*/id`, or `list/#`
        path: String,
        #[command(flatten)]
        input: Input,
        #[command(flatten)]
        output: Output,
    },
    /// Print every concrete path a pattern matches, one per line
    Paths {
        path: String,
        #[command(flatten)]
        input: Input,
    },
    /// Set the value at a path
    Set {
        path: String,
        /// JSON literal, e.g. `42`, `"text"`, or `{"k": [1]}`
        value: String,
        /// Only replace existing values, never create structure
        #[arg(long)]
        no_insert: bool,
        #[command(flatten)]
        input: Input,
        #[command(flatten)]
        output: Output,
    },
    /// Remove the pair or element at a path (fails if nothing was removed)
    Rm {
        path: String,
        #[command(flatten)]
        input: Input,
        #[command(flatten)]
        output: Output,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Fmt { input, output } => {
            let doc = load(&input)?;
            output.emit(&doc)?;
        }
        Commands::Get {
            path,
            input,
            output,
        } => {
            let doc = load(&input)?;
            let found = doc.find(path.as_str());
            if found.is_undefined() {
                anyhow::bail!("No value at path '{}'", path);
            }
            output.emit(&found)?;
        }
        Commands::Paths { path, input } => {
            let doc = load(&input)?;
            let mut listing = String::new();
            doc.for_each(path.as_str(), |_, at| {
                listing.push_str(&at.to_string());
                listing.push('\n');
            });
            write_output(None, &listing)?;
        }
        Commands::Set {
            path,
            value,
            no_insert,
            input,
            output,
        } => {
            let mut doc = load(&input)?;
            let value = jsontree::parse(&value)
                .with_context(|| format!("Failed to parse value: {}", value))?;
            let changed = doc
                .update(path.as_str(), value, !no_insert)
                .with_context(|| format!("Failed to set '{}'", path))?;
            if !changed {
                warn!(path = %path, "nothing was updated");
            }
            output.emit(&doc)?;
        }
        Commands::Rm {
            path,
            input,
            output,
        } => {
            let mut doc = load(&input)?;
            let removed = doc
                .remove(path.as_str())
                .with_context(|| format!("Failed to remove '{}'", path))?;
            if !removed {
                anyhow::bail!("Nothing to remove at path '{}'", path);
            }
            output.emit(&doc)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// Read and parse the document, in chunks if requested.
fn load(input: &Input) -> Result<Node> {
    let text = read_input(input.input.as_deref())?;
    let source = input.input.as_deref().unwrap_or("<stdin>");

    let mut parser = jsontree::Parser::new();
    match input.chunk_size {
        Some(size) => {
            let chars: Vec<char> = text.chars().collect();
            let size = usize::try_from(size).unwrap_or(usize::MAX);
            for piece in chars.chunks(size) {
                let chunk: String = piece.iter().collect();
                parser
                    .feed(&chunk)
                    .with_context(|| format!("Failed to parse {}", source))?;
            }
            debug!(chunks = chars.len().div_ceil(size), "fed input in chunks");
        }
        None => parser
            .feed(&text)
            .with_context(|| format!("Failed to parse {}", source))?,
    }
    parser
        .finish()
        .with_context(|| format!("Failed to parse {}", source))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
