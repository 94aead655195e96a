//! Parses the structure definition files into a [`StructureCatalog`].
//!
//! Three files make up a structure definition: the spire offsets and the
//! pattern layers are JSON documents, everything else lives in a TOML file.
//! Any structural problem aborts loading; there is no partial catalog.

use std::{
    fs,
    path::{Path, PathBuf},
};

use nether_reactor_core::{BlockPos, BoundingBox, Material, UnknownMaterial};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    default_rounds, LayerTransformation, PatternLayer, Platform, Round, RoundError,
    StructureCatalog, DEFAULT_MAX_BOUND_Y, DEFAULT_MIN_BOUND_Y, DEFAULT_PATTERN_RADIUS,
};

/// File holding the spire offsets.
pub const SPIRE_FILE: &str = "nether_reactor_spire.json";
/// File holding the pattern layers.
pub const PATTERN_FILE: &str = "pattern.json";
/// File holding materials, bounds, room, platforms and rounds.
pub const CONFIG_FILE: &str = "structure_config.toml";

const DEFAULT_SPIRE_MATERIAL: &str = "netherrack";

/// Errors raised while loading a structure definition.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A definition file could not be read.
    #[error("failed to read structure file {}", path.display())]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A JSON definition file is malformed.
    #[error("failed to parse {file}")]
    Json {
        /// Name of the offending file.
        file: &'static str,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// The TOML configuration is malformed.
    #[error("failed to parse {file}")]
    Toml {
        /// Name of the offending file.
        file: &'static str,
        /// Underlying parse failure.
        #[source]
        source: toml::de::Error,
    },
    /// A material name could not be resolved.
    #[error("invalid material for {context}")]
    Material {
        /// Where the material was declared.
        context: String,
        /// Underlying lookup failure.
        #[source]
        source: UnknownMaterial,
    },
    /// A numeric setting does not fit a 32-bit integer.
    #[error("`{key}` must be a finite number within the 32-bit range")]
    NotAnInteger {
        /// Configuration key holding the value.
        key: &'static str,
    },
    /// The inner loot radius is negative.
    #[error("pattern radius {0} must not be negative")]
    NegativePatternRadius(i32),
    /// The pattern declares no layers, so any placement would validate.
    #[error("the pattern must declare at least one layer")]
    NoPatternLayers,
    /// A round definition failed validation.
    #[error("invalid round #{index}")]
    Round {
        /// Position of the round in the configuration.
        index: usize,
        /// Validation failure.
        #[source]
        source: RoundError,
    },
}

/// Raw contents of the three structure definition files.
#[derive(Clone, Copy, Debug)]
pub struct CatalogSources<'a> {
    /// Contents of [`SPIRE_FILE`].
    pub spire: &'a str,
    /// Contents of [`PATTERN_FILE`].
    pub pattern: &'a str,
    /// Contents of [`CONFIG_FILE`].
    pub config: &'a str,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    x: i32,
    y: i32,
    z: i32,
}

impl From<RawPosition> for BlockPos {
    fn from(raw: RawPosition) -> Self {
        BlockPos::new(raw.x, raw.y, raw.z)
    }
}

#[derive(Debug, Deserialize)]
struct RawLayer {
    material: String,
    blocks: Vec<RawPosition>,
    #[serde(default)]
    transformations: Vec<RawTransformation>,
}

#[derive(Debug, Deserialize)]
struct RawTransformation {
    tick: u32,
    material: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Integer(i64),
    Float(f64),
}

impl RawNumber {
    fn to_i32(&self, key: &'static str) -> Result<i32, CatalogError> {
        match *self {
            Self::Integer(value) => {
                i32::try_from(value).map_err(|_| CatalogError::NotAnInteger { key })
            }
            Self::Float(value)
                if value.is_finite()
                    && value >= f64::from(i32::MIN)
                    && value <= f64::from(i32::MAX) =>
            {
                Ok(value.trunc() as i32)
            }
            Self::Float(_) => Err(CatalogError::NotAnInteger { key }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawBounds {
    max_y: Option<RawNumber>,
    min_y: Option<RawNumber>,
}

#[derive(Debug, Deserialize)]
struct RawRoom {
    from: RawPosition,
    to: RawPosition,
}

#[derive(Debug, Deserialize)]
struct RawPlatform {
    from: RawPosition,
    to: RawPosition,
    material: String,
}

#[derive(Debug, Deserialize)]
struct RawRound {
    tick: u32,
    min_loot: u32,
    max_loot: u32,
    #[serde(default)]
    spawn_creatures: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default, alias = "nether_reactor_spire_material")]
    spire_material: Option<String>,
    #[serde(default)]
    pattern_radius: Option<i32>,
    #[serde(default)]
    bounds: RawBounds,
    room: RawRoom,
    #[serde(default)]
    platforms: Vec<RawPlatform>,
    #[serde(default)]
    rounds: Option<Vec<RawRound>>,
}

/// Reads the three definition files from `dir` and builds the catalog.
pub(crate) fn load_dir(dir: &Path) -> Result<StructureCatalog, CatalogError> {
    let read = |name: &str| {
        let path = dir.join(name);
        fs::read_to_string(&path).map_err(|source| CatalogError::Io { path, source })
    };
    let spire = read(SPIRE_FILE)?;
    let pattern = read(PATTERN_FILE)?;
    let config = read(CONFIG_FILE)?;

    parse(CatalogSources {
        spire: &spire,
        pattern: &pattern,
        config: &config,
    })
}

/// Builds the catalog from in-memory definition contents.
pub(crate) fn parse(sources: CatalogSources<'_>) -> Result<StructureCatalog, CatalogError> {
    let spire: Vec<RawPosition> =
        serde_json::from_str(sources.spire).map_err(|source| CatalogError::Json {
            file: SPIRE_FILE,
            source,
        })?;
    let layers: Vec<RawLayer> =
        serde_json::from_str(sources.pattern).map_err(|source| CatalogError::Json {
            file: PATTERN_FILE,
            source,
        })?;
    let config: RawConfig = toml::from_str(sources.config).map_err(|source| CatalogError::Toml {
        file: CONFIG_FILE,
        source,
    })?;

    let pattern_layers = layers
        .into_iter()
        .enumerate()
        .map(|(index, layer)| convert_layer(index, layer))
        .collect::<Result<Vec<_>, _>>()?;
    if pattern_layers.is_empty() {
        return Err(CatalogError::NoPatternLayers);
    }

    let spire_material = parse_material(
        config
            .spire_material
            .as_deref()
            .unwrap_or(DEFAULT_SPIRE_MATERIAL),
        || "spire".to_owned(),
    )?;

    let max_bound_y = config
        .bounds
        .max_y
        .map_or(Ok(DEFAULT_MAX_BOUND_Y), |value| value.to_i32("bounds.max_y"))?;
    let min_bound_y = config
        .bounds
        .min_y
        .map_or(Ok(DEFAULT_MIN_BOUND_Y), |value| value.to_i32("bounds.min_y"))?;

    let pattern_radius = config.pattern_radius.unwrap_or(DEFAULT_PATTERN_RADIUS);
    if pattern_radius < 0 {
        return Err(CatalogError::NegativePatternRadius(pattern_radius));
    }

    let platforms = config
        .platforms
        .into_iter()
        .enumerate()
        .map(|(index, platform)| {
            let material =
                parse_material(&platform.material, || format!("platform #{index}"))?;
            Ok(Platform::new(
                platform.from.into(),
                platform.to.into(),
                material,
            ))
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;

    let rounds = match config.rounds {
        None => default_rounds(),
        Some(rounds) => rounds
            .into_iter()
            .enumerate()
            .map(|(index, round)| {
                Round::new(
                    round.tick,
                    round.min_loot,
                    round.max_loot,
                    round.spawn_creatures,
                )
                .map_err(|source| CatalogError::Round { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(StructureCatalog {
        spire_blocks: spire.into_iter().map(BlockPos::from).collect(),
        spire_material,
        platforms,
        pattern_layers,
        room: BoundingBox::from_corners(config.room.from.into(), config.room.to.into()),
        max_bound_y,
        min_bound_y,
        pattern_radius,
        rounds,
    })
}

fn convert_layer(index: usize, layer: RawLayer) -> Result<PatternLayer, CatalogError> {
    let material = parse_material(&layer.material, || format!("pattern layer #{index}"))?;
    let transformations = layer
        .transformations
        .into_iter()
        .map(|transformation| {
            let material = parse_material(&transformation.material, || {
                format!(
                    "pattern layer #{index} transformation at tick {}",
                    transformation.tick
                )
            })?;
            Ok(LayerTransformation::new(transformation.tick, material))
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;

    Ok(PatternLayer::new(
        material,
        layer.blocks.into_iter().map(BlockPos::from),
        transformations,
    ))
}

fn parse_material(name: &str, context: impl FnOnce() -> String) -> Result<Material, CatalogError> {
    name.parse().map_err(|source| CatalogError::Material {
        context: context(),
        source,
    })
}
