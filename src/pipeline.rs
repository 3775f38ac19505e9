//! Map generation pipeline
//!
//! This module contains the core map generation logic behind the binary.
//!
//! The pipeline:
//! 1. Resolves theme and color scale from the configuration
//! 2. Loads and cleans the wage table
//! 3. Loads boundaries, reprojects to LAEA Europe and filters the region
//! 4. Joins boundaries and country centres with the wages
//! 5. Renders the SVG figure

use crate::config::MapConfig;
use crate::data::boundaries::BoundaryLayer;
use crate::data::centroids::load_centroids;
use crate::data::error::{MapError, Result};
use crate::data::join::{attach_centroids, ensure_same_crs, merge_boundaries};
use crate::data::projection::Crs;
use crate::data::wages::WageCleaner;
use crate::render::{MapRenderer, RenderedMap};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Generate the minimum wage map described by `config`
///
/// Any missing or malformed input fails the whole run.
pub fn generate_map(config: &MapConfig) -> Result<RenderedMap> {
    let t0 = Instant::now();

    info!("[1/5] Resolving style...");
    let settings = config.render_settings()?;
    info!(
        "  Theme: {:?}, palette: {} over [{}, {}]",
        config.theme, settings.scale.palette_name, settings.scale.min, settings.scale.max
    );

    info!("[2/5] Loading minimum wages for {}...", config.period);
    let wages = WageCleaner::new(config.period.as_str()).load(&config.wages_path)?;
    info!("  {} countries with a wage", wages.len());
    if wages.is_empty() {
        warn!("No wage rows for period {}", config.period);
    }

    info!("[3/5] Loading boundaries...");
    let boundaries = BoundaryLayer::load(&config.boundaries_source)?
        .to_crs(Crs::EtrsLaea)?
        .filter_region(&config.continent, &config.extra_countries);
    if boundaries.is_empty() {
        return Err(MapError::Schema(format!(
            "no boundaries on continent '{}'",
            config.continent
        )));
    }

    info!("[4/5] Joining layers...");
    let regions = merge_boundaries(&boundaries, &wages);
    let centroids = load_centroids(&config.centroids_path)?;
    let labels = attach_centroids(&wages, &centroids).to_crs(Crs::EtrsLaea)?;
    ensure_same_crs(&regions, &labels)?;

    info!("[5/5] Rendering...");
    let rendered = MapRenderer::new(settings).render(&boundaries, &regions, &labels)?;

    info!(
        "Map generated in {:.2?}: {} regions, {} labels",
        t0.elapsed(),
        rendered.n_regions,
        rendered.n_labels
    );
    Ok(rendered)
}

/// Write a rendered map to disk
pub fn write_map(map: &RenderedMap, path: &Path) -> Result<()> {
    std::fs::write(path, map.svg.as_bytes()).map_err(|e| MapError::io(path, e))?;
    info!("Saved {} ({} bytes)", path.display(), map.svg.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::boundaries::tests::sample_world_geojson;
    use std::fs;
    use tempfile::TempDir;

    const WAGES_CSV: &str = "TIME,GEO,CURRENCY,Value,Flag and Footnotes\n\
        2020S2,France,Euro,1539.42,d\n\
        2020S2,Germany (until 1990 former territory of the FRG),Euro,1584.00,\n\
        2020S2,Czechia,Euro,2500.00,\n\
        2020S2,Iceland,Euro,:,\n\
        2020S2,United States,Euro,1087.01,\n\
        2020S1,France,Euro,1521.22,\n";

    const CENTROIDS_CSV: &str = "name,longitude,latitude\n\
        France,2.0,46.0\n\
        Germany,10.0,51.0\n\
        Czech Republic,15.0,50.0\n\
        Japan,138.0,36.0\n";

    fn write_inputs(dir: &TempDir) -> MapConfig {
        let wages = dir.path().join("wages.csv");
        let centroids = dir.path().join("centres.csv");
        let world = dir.path().join("world.geojson");
        fs::write(&wages, WAGES_CSV).unwrap();
        fs::write(&centroids, CENTROIDS_CSV).unwrap();
        fs::write(&world, sample_world_geojson()).unwrap();

        let mut config = MapConfig::defaults();
        config.wages_path = wages;
        config.centroids_path = centroids;
        config.boundaries_source = world.to_string_lossy().into_owned();
        config.output_path = dir.path().join("map.svg");
        config
    }

    #[test]
    fn test_generate_and_write_map() {
        let dir = TempDir::new().unwrap();
        let config = write_inputs(&dir);

        let map = generate_map(&config).unwrap();
        assert_eq!(map.n_regions, 3);
        assert_eq!(map.n_labels, 3);
        assert_eq!((map.width, map.height), (1600.0, 900.0));

        write_map(&map, &config.output_path).unwrap();
        let written = fs::read_to_string(&config.output_path).unwrap();
        assert!(written.contains("<svg"));
        assert!(written.contains("Minimum wages (Euro / month)"));
    }

    #[test]
    fn test_missing_input_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = write_inputs(&dir);
        config.centroids_path = dir.path().join("absent.csv");
        assert!(matches!(
            generate_map(&config),
            Err(MapError::Io { .. })
        ));
    }

    #[test]
    fn test_unknown_continent_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = write_inputs(&dir);
        config.continent = "Antarctica".to_string();
        config.extra_countries.clear();
        assert!(matches!(generate_map(&config), Err(MapError::Schema(_))));
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let config = write_inputs(&dir);
        let map = generate_map(&config).unwrap();
        let result = write_map(&map, &dir.path().join("nope").join("map.svg"));
        assert!(matches!(result, Err(MapError::Io { .. })));
    }
}
