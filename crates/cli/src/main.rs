use anyhow::{anyhow, bail, Context};
use config::{Config, File};
use log::{info, warn, LevelFilter};
use planetgen::{timed, LogListener, Planet, PlanetConfig, PlanetSize, Seed};
use simple_logger::SimpleLogger;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    process,
};
use structopt::StructOpt;
use strum::{Display, EnumString};

/// CLI for generating procedural planets.
#[derive(Debug, StructOpt)]
#[structopt(name = "planetgen")]
struct Opt {
    /// Path to a config file that defines the planet to be generated.
    /// Supported formats: JSON, TOML. Any field left out of the file gets its
    /// default value
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Path to an existing .bin planet file to load
    #[structopt(short, long)]
    bin: Option<PathBuf>,

    /// Override the seed from the config file. Numbers are used as-is, any
    /// other text is hashed
    #[structopt(short, long)]
    seed: Option<String>,

    /// Override the mesh resolution from the config file. Options: duel,
    /// tiny, small, standard, large, huge, colossal
    #[structopt(long)]
    size: Option<PlanetSize>,

    /// If given, the planet will be saved to this directory. The exact files
    /// that appear in the directory are defined by the output formats. See
    /// `--output-formats` for more info
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// The format(s) to output the planet in. Supported formats:
    ///
    /// bin - Binary representation that can be reloaded by this CLI and
    ///   other tools later. Use this for persisting & sharing planets
    ///
    /// cfg - The full config object used for the planet, in TOML format
    ///
    /// json - JSON representation. Similar to the binary format, but slower
    ///   and much less compact
    ///
    /// stats - Summary statistics (height bands, climates, boundaries,
    ///   rivers, craters, biomes) in JSON format
    #[structopt(short = "f", long)]
    output_formats: Vec<OutputFormat>,

    /// The logging level to use during planet generation. See
    /// https://docs.rs/log/0.4.11/log/enum.LevelFilter.html for options
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

/// Different output formats.
#[derive(Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum OutputFormat {
    // If you change this, make sure to update the help text for
    // `--output-formats`!
    /// Export the planet in a serialized binary format, which can be
    /// deserialized later to recover the planet
    Bin,
    /// Export the planet's full config in a human-readable file
    Cfg,
    /// Export the planet in a serialized JSON format, which can be
    /// deserialized later to recover the planet. This is similar to the bin
    /// format, but is human readable at the cost of being slower and much
    /// less compact
    Json,
    /// Export summary statistics of the planet
    Stats,
}

impl OutputFormat {
    fn file_ext(self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::Cfg => "toml",
            Self::Json => "json",
            Self::Stats => "stats.json",
        }
    }
}

fn load_config(config_path: &Path) -> anyhow::Result<PlanetConfig> {
    let mut settings = Config::new();
    let config_path = config_path.to_str().ok_or_else(|| {
        anyhow!("invalid character in path {:?}", config_path)
    })?;
    settings
        .merge(File::with_name(config_path))
        .context("error reading config file")?;
    settings.try_into().context("error reading config")
}

/// Generate an output form of the planet in the given format.
fn gen_output(
    output_dir: &Path,
    output_format: OutputFormat,
    planet: &Planet,
) -> anyhow::Result<()> {
    fn generate_bytes(
        output_format: OutputFormat,
        planet: &Planet,
    ) -> anyhow::Result<Vec<u8>> {
        let bytes = match output_format {
            OutputFormat::Bin => planet.to_bin()?,
            OutputFormat::Cfg => toml::to_string_pretty(planet.config())
                .context("error serializing config")?
                .into_bytes(),
            OutputFormat::Json => planet.to_json()?.into_bytes(),
            OutputFormat::Stats => serde_json::to_vec_pretty(&planet.stats())
                .context("error serializing stats")?,
        };
        Ok(bytes)
    }

    let output_file_path = output_dir
        .join("planet")
        .with_extension(output_format.file_ext());

    timed!(
        format!(
            "Generating {} output and writing to {:?}",
            output_format, &output_file_path
        ),
        log::Level::Info,
        {
            let bytes = generate_bytes(output_format, planet)?;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&output_file_path)
                .with_context(|| {
                    format!("error opening output file {:?}", &output_file_path)
                })?;
            file.write_all(&bytes).with_context(|| {
                format!("error writing to file {:?}", &output_file_path)
            })?;
        }
    );

    Ok(())
}

/// Run the CLI with some options
fn run(opt: Opt) -> anyhow::Result<()> {
    SimpleLogger::new().with_level(opt.log_level).init()?;

    let planet = match &opt {
        Opt {
            config: Some(config_path),
            bin: None,
            ..
        } => {
            // Load planet config, apply overrides, and generate a new planet
            let mut config = load_config(config_path)?;
            if let Some(seed) = &opt.seed {
                config.seed = Seed::from(seed.as_str());
            }
            if let Some(size) = opt.size {
                config = config.with_size(size);
            }
            Planet::generate_with_listener(config, &mut LogListener)?
        }
        Opt {
            config: None,
            bin: Some(input_path),
            ..
        } => {
            if opt.seed.is_some() || opt.size.is_some() {
                warn!("--seed and --size are ignored when loading a planet");
            }
            // Load existing planet from a file
            let file = OpenOptions::new()
                .read(true)
                .open(input_path)
                .with_context(|| {
                    format!("error opening planet file {:?}", input_path)
                })?;
            let planet = Planet::from_bin(file)?;
            info!("Loaded planet from {:?}", input_path);
            planet
        }
        _ => bail!(
            "must pass exactly one of --config (to generate a new planet) \
            or --bin (to load an existing planet)"
        ),
    };
    info!(
        "Planet has {} polygons, {} rivers and {} craters/volcanoes",
        planet.polygons().len(),
        planet.rivers().len(),
        planet.impacts().len()
    );

    // If an output dir was specified, write out output format(s) there
    if let Some(output_dir) = opt.output {
        if opt.output_formats.is_empty() {
            bail!("output dir was specified, but no output formats were given")
        }
        fs::create_dir_all(&output_dir)?;

        for output_format in opt.output_formats {
            gen_output(&output_dir, output_format, &planet)?;
        }
    }

    Ok(())
}

fn main() {
    let exit_code = match run(Opt::from_args()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    process::exit(exit_code);
}
