//! propnet CLI: runs the bundled propagator networks.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use propnet::config::NetworkConfig;
use propnet::content::interval::Interval;
use propnet::content::supported::Supported;
use propnet::network::{CellId, Network};
use propnet::networks::{self, DEFAULT_EPSILON};

#[derive(Parser)]
#[command(name = "propnet", version, about = "Propagator network engine")]
struct Cli {
    /// Network configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print every cell of the final network as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate a building's height from the fall time of a barometer.
    Barometer,

    /// Estimate it from shadow lengths, then refine with the fall time.
    Shadows,

    /// Track which measurements each estimate depends on.
    Dependencies,

    /// Square root by Heron's method.
    Sqrt {
        /// Number to take the square root of.
        #[arg(long)]
        x: f64,

        /// Convergence tolerance on |x - g^2|.
        #[arg(long, default_value_t = DEFAULT_EPSILON)]
        epsilon: f64,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NetworkConfig::load(path)?,
        None => NetworkConfig::default(),
    };
    let mut net = Network::new(config)?;

    match cli.command {
        Commands::Barometer => {
            let fall_time = net.new_cell("fall time");
            let building_height = net.new_cell("building height");
            networks::fall_duration(&mut net, fall_time, building_height)?;

            net.add_content(fall_time, Interval::new(2.9, 3.1))?;
            net.run()?;
            print_cells(&net, &[building_height])?;
        }

        Commands::Shadows => {
            let barometer_height = net.new_cell("barometer height");
            let barometer_shadow = net.new_cell("barometer shadow");
            let building_height = net.new_cell("building height");
            let building_shadow = net.new_cell("building shadow");
            networks::similar_triangles(
                &mut net,
                barometer_shadow,
                barometer_height,
                building_shadow,
                building_height,
            )?;

            net.add_content(building_shadow, Interval::new(54.9, 55.1))?;
            net.add_content(barometer_height, Interval::new(0.3, 0.32))?;
            net.add_content(barometer_shadow, Interval::new(0.36, 0.37))?;
            net.run()?;
            print_cells(&net, &[building_height])?;

            let fall_time = net.new_cell("fall time");
            networks::fall_duration(&mut net, fall_time, building_height)?;
            net.add_content(fall_time, Interval::new(2.9, 3.1))?;
            net.run()?;
            print_cells(&net, &[building_height, barometer_height, fall_time])?;
        }

        Commands::Dependencies => {
            let barometer_height = net.new_cell("barometer height");
            let barometer_shadow = net.new_cell("barometer shadow");
            let building_height = net.new_cell("building height");
            let building_shadow = net.new_cell("building shadow");
            networks::similar_triangles(
                &mut net,
                barometer_shadow,
                barometer_height,
                building_shadow,
                building_height,
            )?;

            net.add_content(building_shadow, Supported::with_labels(Interval::new(54.9, 55.1), ["shadows"]))?;
            net.add_content(barometer_height, Supported::with_labels(Interval::new(0.3, 0.32), ["shadows"]))?;
            net.add_content(barometer_shadow, Supported::with_labels(Interval::new(0.36, 0.37), ["shadows"]))?;
            net.run()?;
            print_cells(&net, &[building_height])?;

            let fall_time = net.new_cell("fall time");
            networks::fall_duration(&mut net, fall_time, building_height)?;
            net.add_content(fall_time, Supported::with_labels(Interval::new(2.9, 3.3), ["lousy fall time"]))?;
            net.run()?;
            print_cells(&net, &[building_height])?;

            net.add_content(fall_time, Supported::with_labels(Interval::new(2.9, 3.1), ["better fall time"]))?;
            net.run()?;
            print_cells(&net, &[building_height])?;

            net.add_content(building_height, Supported::with_labels(45, ["superintendent"]))?;
            net.run()?;
            print_cells(
                &net,
                &[building_height, barometer_height, barometer_shadow, building_shadow, fall_time],
            )?;
        }

        Commands::Sqrt { x, epsilon } => {
            let input = net.new_cell("x");
            let answer = net.new_cell("answer");
            networks::sqrt_network(&mut net, input, answer, epsilon)?;

            net.add_content(input, x)?;
            let report = net.run()?;
            tracing::info!(invocations = report.invocations, cells = net.cell_count(), "sqrt network settled");
            print_cells(&net, &[answer])?;
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&net.snapshot()).into_diagnostic()?);
    }

    Ok(())
}

fn print_cells(net: &Network, cells: &[CellId]) -> Result<()> {
    for &id in cells {
        let cell = net.cell(id)?;
        println!("{:<20} {}", cell.label().unwrap_or("?"), cell.content());
    }
    Ok(())
}
