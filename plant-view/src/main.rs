//! Application entry point for the plant viewer.
//!
//! This binary sets up logging and eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use plant_core::config::Species;
use tracing_subscriber::EnvFilter;
use viewer::Viewer;

/// Environment variable naming a species preset or a species TOML file.
const SPECIES_VAR: &str = "PLANT_SPECIES";

/// Resolves the starting species from [`SPECIES_VAR`].
///
/// A preset name wins over a file path. Anything that cannot be loaded is
/// logged and replaced by [`Species::default`].
fn initial_species() -> Species {
    let Ok(value) = std::env::var(SPECIES_VAR) else {
        return Species::default();
    };
    if let Some(species) = Species::preset(&value) {
        tracing::info!(preset = %value, "using species preset");
        return species;
    }
    match Species::load(&value) {
        Ok(species) => {
            tracing::info!(path = %value, "loaded species file");
            species
        }
        Err(e) => {
            tracing::error!("{e}; falling back to the default species");
            Species::default()
        }
    }
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let species = initial_species();
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Plant",
        options,
        Box::new(move |_cc| Ok(Box::new(Viewer::new(species)))),
    )
}
