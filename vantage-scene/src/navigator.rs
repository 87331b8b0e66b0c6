//! Host-facing navigation: camera, scene edits and background loads.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;
use vantage_data::{DataFormat, DecodeLimits, Mesh};
use vantage_window::{CameraState, FlightConfig, FlightControls, WindowEvent};

use crate::config::SceneConfig;
use crate::controller::{SceneController, SceneEvent};
use crate::loader::{LoadSource, LoadTicket, Loader};
use crate::object::ObjectId;
use crate::rotation::Axis;

/// Navigation surface handed to the host: camera, scene and background loads.
#[derive(Debug)]
pub struct Navigator {
    controls: FlightControls,
    scene: SceneController,
    loader: Loader,
    limits: DecodeLimits,
}

impl Navigator {
    pub fn new(flight: FlightConfig, scene: SceneConfig, limits: DecodeLimits) -> Self {
        Self {
            controls: FlightControls::new(flight),
            scene: SceneController::new(scene),
            loader: Loader::new(),
            limits,
        }
    }

    pub fn camera(&self) -> &CameraState {
        self.controls.state()
    }

    pub fn controls_mut(&mut self) -> &mut FlightControls {
        &mut self.controls
    }

    pub fn scene(&self) -> &SceneController {
        &self.scene
    }

    /// Camera back to its default pose, rotation bookkeeping zeroed.
    pub fn reset(&mut self) {
        info!("Resetting view");
        self.controls.reset();
        self.scene.reset_rotation_bookkeeping();
    }

    pub fn rotate(&mut self, axis: Axis) {
        self.scene.rotate(axis);
    }

    pub fn set_scale_multiplier(&mut self, multiplier: f32) {
        self.scene.set_scale_multiplier(multiplier);
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        self.controls.handle_event(event)
    }

    /// One frame tick: land finished loads, honor a reset key, move the camera.
    pub fn frame(&mut self, dt: f32) -> &CameraState {
        self.poll_loads();
        if self.controls.take_reset_request() {
            self.reset();
        }
        self.controls.update(dt)
    }

    pub fn load_path(&mut self, path: impl Into<PathBuf>, format: Option<DataFormat>) -> LoadTicket {
        self.start_load(LoadSource::Path(path.into()), format)
    }

    pub fn load_bytes(
        &mut self,
        data: Vec<u8>,
        name: impl Into<String>,
        format: Option<DataFormat>,
    ) -> LoadTicket {
        self.start_load(
            LoadSource::Bytes {
                data,
                name: name.into(),
            },
            format,
        )
    }

    pub fn install_mesh(&mut self, mesh: Mesh) -> ObjectId {
        self.scene.install_mesh(mesh)
    }

    pub fn clear(&mut self) {
        self.scene.clear();
    }

    /// Apply every completion that has arrived. Returns how many installed.
    pub fn poll_loads(&mut self) -> usize {
        let mut installed = 0;
        for completion in self.loader.poll() {
            if self.scene.complete(completion) {
                installed += 1;
            }
        }
        installed
    }

    /// Block until every spawned load has completed or `timeout` passes
    /// waiting for the next one.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> usize {
        let mut installed = 0;
        while let Some(completion) = self.loader.wait(timeout) {
            if self.scene.complete(completion) {
                installed += 1;
            }
        }
        installed
    }

    pub fn is_loading(&self) -> bool {
        self.scene.is_loading()
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        self.scene.drain_events()
    }

    fn start_load(&mut self, source: LoadSource, format: Option<DataFormat>) -> LoadTicket {
        let ticket = self.scene.begin_load();
        info!("Loading {} (generation {})", source.describe(), ticket.generation);
        self.loader.spawn(ticket, source, format, self.limits);
        ticket
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(
            FlightConfig::default(),
            SceneConfig::default(),
            DecodeLimits::default(),
        )
    }
}
