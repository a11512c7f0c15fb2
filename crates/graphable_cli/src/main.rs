//! Graphable CLI
//!
//! Generates the de/serialization code for an object graph schema.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use graphable_core::Schema;
use graphable_generators::GeneratedFile;

#[derive(Parser, Debug)]
#[command(name = "graphable")]
#[command(about = "Generate the code for de/serialization of object graphs from JSONables")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate C++ code
    Cpp(TargetArgs),

    /// Generate Go code
    Go(TargetArgs),

    /// Generate Python code
    Py(TargetArgs),
}

#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// Path to the schema definition
    #[arg(long)]
    schema: PathBuf,

    /// Path to the directory where the generated files should be stored
    #[arg(long)]
    outdir: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let target_args = match &args.command {
        Command::Cpp(target_args) | Command::Go(target_args) | Command::Py(target_args) => {
            target_args
        }
    };

    let schema = load_schema(target_args)?;

    let files = match &args.command {
        Command::Cpp(_) => graphable_generators::cpp::generate(&schema)?,
        Command::Go(_) => graphable_generators::go::generate(&schema)?,
        Command::Py(_) => graphable_generators::py::generate(&schema)?,
    };

    write_outputs(&files, target_args)?;

    println!("Files generated in: {}", target_args.outdir.display());

    Ok(())
}

fn load_schema(target_args: &TargetArgs) -> Result<Schema> {
    let text = fs::read_to_string(&target_args.schema).with_context(|| {
        format!("Failed to read the schema: {}", target_args.schema.display())
    })?;

    let schema = graphable_core::schema_from_str(&text).with_context(|| {
        format!(
            "Failed to load the schema: {}",
            target_args.schema.display()
        )
    })?;

    Ok(schema)
}

fn write_outputs(files: &[GeneratedFile], target_args: &TargetArgs) -> Result<()> {
    fs::create_dir_all(&target_args.outdir).with_context(|| {
        format!("Failed to create: {}", target_args.outdir.display())
    })?;

    for file in files {
        let path = target_args.outdir.join(&file.name);
        fs::write(&path, &file.content)
            .with_context(|| format!("Failed to write: {}", path.display()))?;
    }

    Ok(())
}
