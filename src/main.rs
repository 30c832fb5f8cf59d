//! # BlockForge command line
//!
//! Serves the datapack configurator over HTTP, or builds and previews packs
//! straight from a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{error, info};

use blockforge::{
    catalog, normalize_payload, parse_payload, server, DatapackLayout, DatapackPayload,
    ForgeResult, Settings,
};

#[derive(Parser, Debug)]
#[command(name = "blockforge")]
#[command(about = "Forge custom Minecraft weapons into a ready-to-install datapack")]
#[command(version)]
struct Args {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Settings file (defaults to <config dir>/blockforge/settings.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
        /// Open the service in a browser once listening
        #[arg(long)]
        open: bool,
    },
    /// Build a datapack from a JSON configuration file
    Build {
        input: PathBuf,
        /// Archive path (defaults to <namespace>-datapack.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the pack as a directory tree instead of a zip
        #[arg(long, conflicts_with = "output")]
        unpacked: Option<PathBuf>,
    },
    /// Print the generated command and functions for a JSON configuration file
    Preview { input: PathBuf },
    /// List the selectable base items, colors, enchantments and abilities
    Catalog,
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .try_init()
        .ok();

    if let Err(err) = run(args) {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> ForgeResult<()> {
    match args.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
        open: false,
    }) {
        Command::Serve { host, port, open } => {
            let mut settings = Settings::load(args.config.as_deref())?;
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            settings.open_browser |= open;
            info!("Starting BlockForge v{}", blockforge::VERSION);
            server::serve(&settings)
        }
        Command::Build {
            input,
            output,
            unpacked,
        } => {
            let payload = read_payload(&input)?;
            let layout = DatapackLayout::assemble(&payload)?;
            match unpacked {
                Some(dir) => layout.write_to_dir(&dir)?,
                None => {
                    let target = output.unwrap_or_else(|| PathBuf::from(layout.archive_name()));
                    fs::write(&target, layout.to_zip()?)?;
                    println!("{}", target.display());
                }
            }
            Ok(())
        }
        Command::Preview { input } => {
            let preview = server::Preview::render(&read_payload(&input)?);
            println!("# namespace: {}", preview.namespace);
            println!("\n# give_item.mcfunction\n{}", preview.give_command);
            println!("\n# ability.mcfunction\n{}", preview.ability_function);
            println!("\n# load.mcfunction\n{}", preview.load_function);
            Ok(())
        }
        Command::Catalog => {
            let listing = catalog::listing();
            print_options("Base items", &listing.base_items);
            print_options("Colors", &listing.colors);
            print_options("Primary enchantments", &listing.primary_enchantments);
            print_options("Secondary enchantments", &listing.secondary_enchantments);
            println!("Ability effects:");
            for effect in &listing.ability_effects {
                let amplifier = if effect.supports_amplifier {
                    ""
                } else {
                    " (no amplifier)"
                };
                println!("  {:<14} {}{}", effect.id, effect.label, amplifier);
            }
            Ok(())
        }
    }
}

fn read_payload(path: &Path) -> ForgeResult<DatapackPayload> {
    let raw = parse_payload(&fs::read(path)?)?;
    let payload = normalize_payload(&raw);
    info!("Loaded {} as namespace {}", path.display(), payload.namespace);
    Ok(payload)
}

fn print_options(title: &str, options: &[catalog::CatalogOption]) {
    println!("{}:", title);
    for option in options {
        println!("  {:<20} {}", option.value, option.label);
    }
}
