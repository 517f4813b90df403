use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use clap::Parser;

use mailfield::{Header, DEFAULT_CHARSET};

/// Reads a header block on stdin and writes it back out, re-encoded.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Charset handed to every field body
    #[clap(long, env = "MAILFIELD_CHARSET", default_value = DEFAULT_CHARSET)]
    charset: String,

    /// Print each field as received instead of re-encoding it
    #[clap(long)]
    as_is: bool,

    /// Keep the input order of the fields
    #[clap(long)]
    no_sort: bool,

    /// Report grammar failures on stderr
    #[clap(long)]
    errors: bool,
}

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "mailfield=info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("reading header block from stdin")?;

    let mut header = Header::parse_with_charset(&input, &args.charset)
        .context("splitting header block into fields")?;
    if !args.no_sort {
        header.sort();
    }

    let mut out = String::new();
    for field in header.fields_mut() {
        if args.as_is {
            out.push_str(&field.encoded_as_is());
        } else {
            out.push_str(&field.encoded());
        }
    }
    io::stdout()
        .write_all(out.as_bytes())
        .context("writing header block")?;

    if args.errors {
        for err in header.errors() {
            eprintln!("{}", err);
        }
    }
    Ok(())
}
