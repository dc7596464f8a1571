use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::Path;
use textile_html::Options;

#[derive(Parser)]
#[command(name = "textile")]
#[command(about = "Textile to HTML converter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a Textile file to an HTML fragment
    Convert {
        /// Input file, or `-` for stdin
        path: String,

        /// Write the HTML here instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Keep newlines inside blocks instead of emitting <br />
        #[arg(long)]
        no_hard_breaks: bool,

        /// Sort attributes and style properties by name
        #[arg(long)]
        sort_attributes: bool,

        /// Link alias as NAME=URL; may be repeated
        #[arg(long = "alias", value_parser = parse_alias)]
        aliases: Vec<(String, String)>,
    },

    /// Check a Textile file for syntax errors without rendering
    Check {
        /// Input file, or `-` for stdin
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert {
            path,
            output,
            no_hard_breaks,
            sort_attributes,
            aliases,
        } => {
            let options = Options {
                hard_breaks: !no_hard_breaks,
                link_aliases: aliases.into_iter().collect(),
                sort_attributes,
            };
            cmd_convert(&path, output.as_deref(), &options)
        }
        Command::Check { path } => cmd_check(&path),
    }
}

fn parse_alias(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, url)) if !name.is_empty() && !url.is_empty() => {
            Ok((name.to_string(), url.to_string()))
        }
        _ => Err(format!("expected NAME=URL, got `{value}`")),
    }
}

fn read_source(path: &str) -> String {
    if path == "-" {
        let mut source = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut source) {
            eprintln!("Error reading stdin: {e}");
            std::process::exit(1);
        }
        return source;
    }

    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_convert(path: &str, output: Option<&str>, options: &Options) {
    let source = read_source(path);

    let html = match textile_html::convert(&source, options) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        }
    };

    match output {
        Some(out) => {
            if let Err(e) = std::fs::write(out, format!("{html}\n")) {
                eprintln!("Error writing {out}: {e}");
                std::process::exit(1);
            }
            eprintln!("Wrote: {out}");
        }
        None => println!("{html}"),
    }
}

fn cmd_check(path: &str) {
    let source = read_source(path);

    if let Err(e) = textile_parser::parse(&source) {
        eprintln!("{path}: {e}");
        std::process::exit(1);
    }

    eprintln!("OK: {path}");
}
