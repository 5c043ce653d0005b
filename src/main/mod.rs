use std::path::PathBuf;

use clap::{Parser, Subcommand};
use seqalter::{
    commands::{seqalter_add, seqalter_complement, seqalter_translation_table},
    prelude::{AlterationError, AlterationType, EditorConfig, MirrorMode},
    Position,
};
use tracing_subscriber::EnvFilter;

const INFO: &str = "\
seqalter: sequence alteration editing for genome annotation tracks
usage: seqalter [--help] <subcommand>

Subcommands:

  add: validate a sequence alteration, check it against existing
       alterations, and print (or post) the update request.

  complement: complement (or reverse complement) a nucleotide sequence.

  translation-table: load the codon translation table of a sequence.

";

#[derive(Parser)]
#[clap(name = "seqalter")]
#[clap(about = INFO)]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    /// an optional TOML editor configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Add {
        /// the kind of alteration
        #[arg(long = "type", value_enum)]
        alteration_type: AlterationType,

        /// the reference sequence the alteration is on
        #[arg(long, required = true)]
        seqname: String,

        /// the 0-based coordinate of the alteration
        #[arg(long, required = true)]
        coord: Position,

        /// the residues to insert or substitute, or the deletion length
        #[arg(long, required = true, allow_hyphen_values = true)]
        input: String,

        /// a TSV file of existing alterations to check for overlaps
        #[arg(long, requires = "seqlens")]
        alterations: Option<PathBuf>,

        /// a TSV genome file of sequence names and their lengths
        #[arg(long)]
        seqlens: Option<PathBuf>,

        /// post the request to the annotation service at this base URL
        #[arg(long)]
        post: Option<String>,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Complement {
        /// a nucleotide sequence
        seq: String,

        /// reverse complement instead of complementing each base in place
        #[arg(long)]
        reverse: bool,
    },
    TranslationTable {
        /// the reference sequence to load the table for
        #[arg(long, required = true)]
        seqname: String,

        /// the base URL of the annotation service
        #[arg(long)]
        url: Option<String>,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(debug: u8) {
    let level = match debug {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), AlterationError> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let mut config = match &cli.config {
        Some(path) => EditorConfig::from_toml_file(path)?,
        None => EditorConfig::default(),
    };

    match &cli.command {
        Some(Commands::Add {
            alteration_type,
            seqname,
            coord,
            input,
            alterations,
            seqlens,
            post,
            output,
        }) => {
            if let Some(url) = post {
                config.context_path = url.clone();
            }
            seqalter_add(
                *alteration_type,
                seqname,
                *coord,
                input,
                alterations.as_ref(),
                seqlens.as_ref(),
                &config,
                post.is_some(),
                output.as_ref(),
            )?;
        }
        Some(Commands::Complement { seq, reverse }) => {
            let mode = if *reverse {
                MirrorMode::ReverseComplement
            } else {
                config.mirror
            };
            println!("{}", seqalter_complement(seq, mode)?);
        }
        Some(Commands::TranslationTable {
            seqname,
            url,
            output,
        }) => {
            if let Some(url) = url {
                config.context_path = url.clone();
            }
            seqalter_translation_table(seqname, &config, output.as_ref())?;
        }
        None => {
            println!("{}\n", INFO);
            std::process::exit(1);
        }
    }
    Ok(())
}

fn main() {
    match run() {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
