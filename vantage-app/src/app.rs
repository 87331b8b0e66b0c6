use std::path::PathBuf;
use std::time::Duration;

use glam::Vec3;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use vantage_data::{DataFormat, PointCloudMetadata};
use vantage_scene::{Axis, Navigator, ObjectGeometry, SceneEvent, SceneStats};

use crate::config::{ConfigError, LoggingConfig, ViewerConfig};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("load failed: {0}")]
    Load(String),
    #[error("timed out waiting for {0}")]
    Timeout(String),
    #[error("failed to encode summary: {0}")]
    Summary(#[from] serde_json::Error),
}

/// What to do once the file has loaded.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub file: PathBuf,
    pub format: Option<DataFormat>,
    pub rotations: Vec<Axis>,
    pub scale: Option<f32>,
    pub zoom: Option<f32>,
    pub frames: u32,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
pub struct CameraSummary {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

#[derive(Debug, Serialize)]
pub struct ObjectSummary {
    pub kind: &'static str,
    pub elements: usize,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub base_scale: f32,
    pub scale_multiplier: f32,
    pub rotation_degrees: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_cloud: Option<PointCloudSummary>,
}

#[derive(Debug, Serialize)]
pub struct PointCloudSummary {
    pub header_offset: usize,
    pub declared_count: Option<u64>,
    pub record_count: usize,
    pub downsample_step: usize,
    pub probe_float_hits: usize,
    pub probe_int_hits: usize,
    pub used_integer_mode: bool,
    pub has_colors: bool,
}

impl PointCloudSummary {
    fn new(metadata: &PointCloudMetadata, has_colors: bool) -> Self {
        Self {
            header_offset: metadata.header_offset,
            declared_count: metadata.declared_count,
            record_count: metadata.record_count,
            downsample_step: metadata.downsample_step,
            probe_float_hits: metadata.probe_float_hits,
            probe_int_hits: metadata.probe_int_hits,
            used_integer_mode: metadata.used_integer_mode,
            has_colors,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub file: String,
    pub object: Option<ObjectSummary>,
    pub camera: CameraSummary,
    pub stats: SceneStats,
}

/// Initialize tracing from the logging config. `RUST_LOG` wins when set.
pub fn init_logging(logging: &LoggingConfig) {
    #[cfg(feature = "tracy")]
    {
        if logging.enable_tracy {
            use tracing_subscriber::Layer;
            use tracing_subscriber::layer::SubscriberExt;
            use tracing_subscriber::util::SubscriberInitExt;
            tracing_subscriber::registry()
                .with(tracing_tracy::TracyLayer::default())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_filter(
                            tracing_subscriber::EnvFilter::try_from_default_env()
                                .unwrap_or_else(|_| logging.level.clone().into()),
                        ),
                )
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the file, apply the requested edits, run the frame loop and report.
pub fn run(config: &ViewerConfig, options: &RunOptions) -> Result<Summary, AppError> {
    let mut nav = Navigator::new(config.flight, config.scene, config.limits);
    nav.load_path(&options.file, options.format);

    let file = options.file.display().to_string();
    nav.wait_for_loads(options.timeout);
    if nav.is_loading() {
        return Err(AppError::Timeout(file));
    }
    for event in nav.drain_events() {
        match event {
            SceneEvent::LoadFailed(message) => return Err(AppError::Load(message)),
            SceneEvent::Installed { id, kind, elements } => {
                info!("Installed {:?}: {} {}", id, elements, kind)
            }
            _ => {}
        }
    }

    for &axis in &options.rotations {
        nav.rotate(axis);
    }
    if let Some(scale) = options.scale {
        if !scale.is_finite() {
            warn!("Ignoring non-finite scale {}", scale);
        }
        nav.set_scale_multiplier(scale);
    }
    if let Some(zoom) = options.zoom {
        nav.controls_mut().scroll(zoom);
    }

    let dt = 1.0 / 60.0;
    for _ in 0..options.frames.max(1) {
        nav.frame(dt);
    }

    Ok(summarize(&nav, file))
}

fn summarize(nav: &Navigator, file: String) -> Summary {
    let scene = nav.scene();
    let state = scene.model_state();
    let object = scene.active().and_then(|object| {
        let geometry = object.geometry()?;
        let bounds = object.world_bounds();
        let point_cloud = match geometry {
            ObjectGeometry::Points(cloud) => {
                Some(PointCloudSummary::new(&cloud.metadata, cloud.colors.is_some()))
            }
            _ => None,
        };
        Some(ObjectSummary {
            kind: geometry.kind(),
            elements: geometry.element_count(),
            bounds_min: bounds.min,
            bounds_max: bounds.max,
            base_scale: state.base_scale,
            scale_multiplier: state.user_scale_multiplier,
            rotation_degrees: Axis::ALL.map(|axis| state.rotation_degrees(axis)),
            point_cloud,
        })
    });

    let camera = nav.camera();
    Summary {
        file,
        object,
        camera: CameraSummary {
            position: camera.position,
            yaw: camera.yaw,
            pitch: camera.pitch,
            distance: camera.position.length(),
        },
        stats: scene.stats(),
    }
}
