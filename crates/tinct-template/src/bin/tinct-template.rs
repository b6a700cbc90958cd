//! Build step: generate the theme template for one variant.
//!
//! ```text
//! VARIANT=light CONTRAST=high tinct-template --out-dir build
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tinct_template::{BuildConfig, Contrast, Generator, ImportResolver, Variant};

#[derive(Debug, Parser)]
#[command(name = "tinct-template", version, about = "Generate a theme template from SCSS sources")]
struct Cli {
    /// Variant to build.
    #[arg(long, env = "VARIANT", value_enum, default_value_t = Variant::Dark)]
    variant: Variant,

    /// Contrast tree to read.
    #[arg(long, env = "CONTRAST", value_enum, default_value_t = Contrast::Normal)]
    contrast: Contrast,

    /// Entry stylesheet.
    #[arg(long, default_value = "resources/css/stylesheet.scss")]
    entry: PathBuf,

    /// Import search directory. Repeatable; searched in order.
    #[arg(
        short = 'I',
        long = "include",
        default_values = ["resources/css", "resources/css/gnome-shell-sass"]
    )]
    include: Vec<PathBuf>,

    /// Directory the template is written to.
    #[arg(long, default_value = "build")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = BuildConfig::new(cli.variant, cli.contrast);

    let mut resolver = ImportResolver::new(config.contrast);
    for dir in &cli.include {
        resolver.add_dir(dir);
    }

    let generator = Generator::new(config, resolver);
    let path = generator
        .write_template(&cli.entry, &cli.out_dir)
        .with_context(|| format!("generating template from {}", cli.entry.display()))?;

    println!("{}", path.display());
    Ok(())
}
