//! Command-line interface: load documents through the sample catalogue.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;

use crate::catalog;
use crate::config::{SerializeOptions, DEFAULT_ENCODING};
use crate::error::{BindError, Result};
use crate::node::{Codec, Node};
use crate::registry::{load_document, Loaded};
use crate::xml::write_document;

/// xmlbind - Check and re-render XML documents against typed payloads.
#[derive(Parser)]
#[command(name = "xmlbind")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a document and report its state.
    Check {
        /// XML file to load
        file: PathBuf,

        /// Print the document as it serializes back
        #[arg(short, long)]
        render: bool,

        /// Indent rendered output
        #[arg(short, long, requires = "render")]
        indent: bool,

        /// Encoding named in the XML declaration
        #[arg(short, long, default_value = DEFAULT_ENCODING)]
        encoding: String,

        /// Refuse to render a document that is not valid
        #[arg(long, requires = "render")]
        validate: bool,
    },

    /// List the registered payload kinds.
    Kinds,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            file,
            render,
            indent,
            encoding,
            validate,
        } => {
            let options = render.then(|| {
                SerializeOptions::new()
                    .with_encoding(encoding)
                    .with_indent(indent)
                    .with_validation(validate)
            });
            check_command(&file, options.as_ref())
        }
        Commands::Kinds => kinds_command(),
    }
}

/// Execute the check command.
fn check_command(file: &Path, render: Option<&SerializeOptions>) -> Result<()> {
    let xml = fs::read_to_string(file)?;
    let registry = catalog::registry()?;
    let loaded = load_document(&registry, &xml)?;

    println!(
        "{} {} from {}",
        style("Loaded").bold(),
        style(format!("<{}>", loaded.tag_name())).cyan(),
        file.display()
    );

    match &loaded {
        Loaded::Known(payload) => {
            println!("  Kind: {}", style(payload.name()).green());
            println!("  Defined: {}", yes_no(payload.is_defined()));
            println!("  Valid: {}", yes_no(payload.is_valid()));
            println!("  Fields:");
            for (tag, field) in payload {
                println!("    {tag}: {}", field_state(field));
            }
        }
        Loaded::Generic(group) => {
            println!("  Kind: {}", style("generic group").yellow());
            println!("  Children: {}", group.len());
        }
    }

    let Some(options) = render else {
        return Ok(());
    };
    let output = match &loaded {
        Loaded::Known(payload) => payload.to_xml_string(options)?,
        Loaded::Generic(group) => {
            if options.validate && !group.is_valid() {
                return Err(BindError::Parser(format!(
                    "<{}> has no valid children",
                    group.tag_name()
                )));
            }
            write_document(&group.to_element(), options)?
        }
    };

    println!();
    println!("{output}");
    Ok(())
}

/// Execute the kinds command.
fn kinds_command() -> Result<()> {
    let registry = catalog::registry()?;
    let mut tags: Vec<_> = registry.registered_tags().into_iter().collect();
    tags.sort_unstable();

    println!("{}", style("Registered payload kinds:").bold());
    for tag in tags {
        let standalone = registry
            .construct(tag)?
            .is_some_and(|payload| payload.is_standalone());
        if standalone {
            println!("  {}", style(tag).cyan());
        } else {
            println!("  {} {}", style(tag).cyan(), style("(nested only)").dim());
        }
    }
    Ok(())
}

fn yes_no(flag: bool) -> String {
    if flag {
        style("yes").green().to_string()
    } else {
        style("no").red().to_string()
    }
}

fn field_state(field: &Node) -> String {
    match (field.is_defined(), field.is_valid()) {
        (false, _) => style("unset").dim().to_string(),
        (true, true) => style("ok").green().to_string(),
        (true, false) => style("invalid").red().to_string(),
    }
}
