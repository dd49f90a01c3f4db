use clap::{Parser, Subcommand};
use proto_gen::cmds;
use proto_gen::cmds::analyze::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "proto-gen")]
#[command(about = "Objective-C code generation for protocol schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate Objective-C headers and sources from schema files */
    Codegen {
        /* Input YAML schema files */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Output directory for generated code */
        #[arg(
            short = 'o',
            long = "output",
            value_name = "DIR",
            default_value = "generated"
        )]
        output_dir: PathBuf,

        /* Override the schema's Objective-C class prefix */
        #[arg(long = "class-prefix", value_name = "PREFIX")]
        class_prefix: Option<String>,

        /* Forward declare types imported from other schema files */
        #[arg(long = "include-external-types")]
        include_external_types: bool,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Show has-bit and oneof allocation for every message */
    Analyze {
        /* Input YAML schema files */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Report format */
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn init_logging(verbose: bool) {
    /* RUST_LOG wins over the verbosity flag */
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Codegen {
            files,
            output_dir,
            class_prefix,
            include_external_types,
            verbose,
        } => {
            init_logging(verbose);
            cmds::codegen::run(
                files,
                output_dir,
                class_prefix,
                include_external_types,
                verbose,
            )?;
        }

        Commands::Analyze { files, format } => {
            init_logging(false);
            cmds::analyze::run(files, format)?;
        }
    }

    Ok(())
}
