pub mod commands;
pub mod config;
pub mod error;
pub mod runtime;

use std::path::Path;

use glam::Vec2;

use prize_dash_core::catalog::Catalog;
use prize_dash_core::session::Session;

use crate::config::HostConfig;
use crate::error::HostError;

/// Load the catalog and narrow it to the images present under the asset root.
pub fn load_catalog(config: &HostConfig) -> Result<Catalog, HostError> {
    let mut catalog = Catalog::load(&config.catalog_path)?;
    let root = Path::new(&config.asset_root);
    catalog.resolve_assets(|file| root.join(file).is_file());
    tracing::info!(
        characters = catalog.characters().len(),
        available = catalog.available().len(),
        "Catalog loaded"
    );
    Ok(catalog)
}

/// Build a ready-to-run session from the host configuration.
pub fn build_session(config: &HostConfig) -> Result<Session, HostError> {
    let catalog = load_catalog(config)?;
    if catalog.available().is_empty() {
        tracing::warn!("No character images found, nothing is selectable");
    }
    Ok(Session::new(
        catalog,
        config.session.clone(),
        Vec2::new(config.canvas_width, config.canvas_height),
    ))
}
