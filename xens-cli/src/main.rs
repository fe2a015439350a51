use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use xens::{Document, Element};

/// Evaluate a path expression on an xml document, using the namespace
/// prefixes the document itself declares.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// path expression
    path: String,
    /// input xml file (default stdin)
    infile: Option<PathBuf>,
    /// Print qualified element names instead of text content.
    #[arg(long)]
    names: bool,
    /// Stop after the first match.
    #[arg(long)]
    first: bool,
}

impl Cli {
    fn run(&self) -> Result<(), anyhow::Error> {
        let document = self.load()?;

        if self.first {
            if let Some(element) = document.find(&self.path)? {
                print_match(&element, self.names);
            }
        } else {
            for element in document.iterfind(&self.path)? {
                print_match(&element, self.names);
            }
        }
        Ok(())
    }

    fn load(&self) -> Result<Document, anyhow::Error> {
        match &self.infile {
            Some(infile) => {
                let file = File::open(infile)
                    .with_context(|| format!("cannot open {}", infile.display()))?;
                Ok(Document::parse(file)?)
            }
            None => {
                // stdin cannot rewind, so buffer it for the two passes
                let mut input_xml = String::new();
                BufReader::new(std::io::stdin())
                    .read_to_string(&mut input_xml)
                    .context("cannot read stdin")?;
                Ok(Document::from_text(&input_xml)?)
            }
        }
    }
}

fn print_match(element: &Element, names: bool) {
    if names {
        match element.namespace_uri() {
            Some(uri) => println!("{{{}}}{}", uri, element.local_name()),
            None => println!("{}", element.local_name()),
        }
    } else {
        println!("{}", element.string_value());
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.run()
}
