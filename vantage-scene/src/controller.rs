//! Ownership of the active object and generation-checked installs.

use serde::Serialize;
use tracing::{debug, info, warn};
use vantage_data::{Decoded, Mesh};

use crate::config::SceneConfig;
use crate::loader::{LoadCompletion, LoadGeneration, LoadTicket};
use crate::object::{ObjectGeometry, ObjectId, SceneObject};
use crate::rotation::{Axis, ModelRotationController, ModelTransformState};

/// Notifications for the host, drained once per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    LoadingChanged(bool),
    LoadFailed(String),
    Installed {
        id: ObjectId,
        kind: &'static str,
        elements: usize,
    },
    Cleared,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SceneStats {
    pub installed: usize,
    pub released: usize,
    pub stale_discarded: usize,
    pub failed: usize,
}

/// Owns the single active object and decides which load completions land.
#[derive(Debug)]
pub struct SceneController {
    config: SceneConfig,
    generation: LoadGeneration,
    active: Option<SceneObject>,
    model: ModelRotationController,
    next_id: u64,
    loading: bool,
    events: Vec<SceneEvent>,
    stats: SceneStats,
}

impl SceneController {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            model: ModelRotationController::new(&config),
            config,
            generation: LoadGeneration::default(),
            active: None,
            next_id: 1,
            loading: false,
            events: Vec::new(),
            stats: SceneStats::default(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn active(&self) -> Option<&SceneObject> {
        self.active.as_ref()
    }

    pub fn model_state(&self) -> &ModelTransformState {
        self.model.state()
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Issue a ticket for a new load. Every earlier ticket goes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = self.generation.advance();
        debug!("Begin load generation {}", ticket.generation);
        self.set_loading(true);
        ticket
    }

    /// Apply a finished load. Returns true if it was installed.
    pub fn complete(&mut self, completion: LoadCompletion) -> bool {
        if !self.generation.is_current(completion.ticket) {
            // Dropping the decoded buffers here is the release.
            self.stats.stale_discarded += 1;
            debug!(
                "Discarded stale load of {} (generation {}, current {})",
                completion.source,
                completion.ticket.generation,
                self.generation.value()
            );
            return false;
        }

        self.set_loading(false);
        match completion.result {
            Ok(decoded) => {
                info!("Loaded {}: {} elements", completion.source, decoded.element_count());
                self.install(decoded.into());
                true
            }
            Err(e) => {
                warn!("Failed to load {}: {}", completion.source, e);
                self.stats.failed += 1;
                self.events.push(SceneEvent::LoadFailed(e.to_string()));
                false
            }
        }
    }

    /// Install already decoded data, superseding any pending load.
    pub fn install_decoded(&mut self, decoded: Decoded) -> ObjectId {
        self.generation.advance();
        self.set_loading(false);
        self.install(decoded.into())
    }

    /// Install a mesh produced by an external importer.
    pub fn install_mesh(&mut self, mesh: Mesh) -> ObjectId {
        self.install_decoded(Decoded::Mesh(mesh))
    }

    /// Drop the active object and cancel any pending load.
    pub fn clear(&mut self) {
        self.generation.advance();
        self.set_loading(false);
        self.release_active();
        self.model.clear();
        self.events.push(SceneEvent::Cleared);
    }

    pub fn rotate(&mut self, axis: Axis) {
        if let Some(object) = self.active.as_mut() {
            self.model.rotate(object, axis);
        }
    }

    pub fn set_scale_multiplier(&mut self, multiplier: f32) {
        if let Some(object) = self.active.as_mut() {
            self.model.set_scale_multiplier(object, multiplier);
        }
    }

    pub fn reset_rotation_bookkeeping(&mut self) {
        self.model.reset_bookkeeping();
    }

    fn install(&mut self, geometry: ObjectGeometry) -> ObjectId {
        self.release_active();

        let id = ObjectId(self.next_id);
        self.next_id += 1;
        let kind = geometry.kind();
        let elements = geometry.element_count();

        let mut object = SceneObject::new(id, geometry, self.config.marker_axis_length);
        self.model.install(&mut object);
        self.active = Some(object);

        self.stats.installed += 1;
        self.events.push(SceneEvent::Installed { id, kind, elements });
        id
    }

    fn release_active(&mut self) {
        if let Some(mut object) = self.active.take() {
            if object.release() {
                self.stats.released += 1;
            }
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.events.push(SceneEvent::LoadingChanged(loading));
        }
    }
}

impl Default for SceneController {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl Drop for SceneController {
    fn drop(&mut self) {
        self.release_active();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use glam::Vec3;
    use vantage_data::{DecodeError, PoseLocations};

    fn locations(n: usize) -> Decoded {
        Decoded::Locations(PoseLocations {
            positions: (0..n).map(|i| Vec3::new(i as f32, 1.0, -(i as f32))).collect(),
            record_count: n,
            downsample_step: 1,
        })
    }

    fn ok(ticket: LoadTicket, n: usize) -> LoadCompletion {
        LoadCompletion {
            ticket,
            source: "test".into(),
            result: Ok(locations(n)),
        }
    }

    #[test]
    fn test_install_grounds_object() {
        let mut scene = SceneController::default();
        let ticket = scene.begin_load();
        assert!(scene.complete(ok(ticket, 5)));

        let object = scene.active().unwrap();
        assert!(object.world_bounds().min.y.abs() < 1e-4);
        assert_eq!(scene.stats().installed, 1);
        assert_eq!(
            scene.drain_events(),
            vec![
                SceneEvent::LoadingChanged(true),
                SceneEvent::LoadingChanged(false),
                SceneEvent::Installed {
                    id: ObjectId(1),
                    kind: "locations",
                    elements: 5
                },
            ]
        );
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut scene = SceneController::default();
        let first = scene.begin_load();
        let second = scene.begin_load();

        assert!(scene.complete(ok(second, 3)));
        assert!(!scene.complete(ok(first, 9)));

        let stats = scene.stats();
        assert_eq!(stats.installed, 1);
        assert_eq!(stats.stale_discarded, 1);
        assert_eq!(scene.active().unwrap().geometry().unwrap().element_count(), 3);
    }

    #[test]
    fn test_failure_keeps_prior_scene() {
        let mut scene = SceneController::default();
        let ticket = scene.begin_load();
        scene.complete(ok(ticket, 4));
        scene.drain_events();

        let ticket = scene.begin_load();
        let installed = scene.complete(LoadCompletion {
            ticket,
            source: "broken.las".into(),
            result: Err(LoadError::Decode(DecodeError::NoRecords)),
        });
        assert!(!installed);
        assert_eq!(scene.active().unwrap().id(), ObjectId(1));
        assert_eq!(scene.stats().failed, 1);
        let events = scene.drain_events();
        assert!(matches!(events.last(), Some(SceneEvent::LoadFailed(_))));
        assert!(!scene.is_loading());
    }

    #[test]
    fn test_replace_and_clear_release_once_each() {
        let mut scene = SceneController::default();
        scene.install_decoded(locations(2));
        scene.install_decoded(locations(3));
        assert_eq!(scene.stats().released, 1);
        scene.clear();
        assert_eq!(scene.stats().released, 2);
        assert!(scene.active().is_none());
        scene.clear();
        assert_eq!(scene.stats().released, 2);
    }

    #[test]
    fn test_clear_cancels_pending_load() {
        let mut scene = SceneController::default();
        let ticket = scene.begin_load();
        scene.clear();
        assert!(!scene.complete(ok(ticket, 2)));
        assert!(scene.active().is_none());
        assert_eq!(scene.stats().stale_discarded, 1);
    }

    #[test]
    fn test_install_resets_bookkeeping() {
        let mut scene = SceneController::default();
        scene.install_decoded(locations(4));
        scene.rotate(Axis::Y);
        assert_eq!(scene.model_state().turns(Axis::Y), 1);
        scene.install_decoded(locations(4));
        assert_eq!(scene.model_state().quarter_turns, [0; 3]);
    }
}
