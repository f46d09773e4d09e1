use std::time::Duration;

use bevy::prelude::*;
use constants::coordinate_system::SceneFrame;
use constants::render_settings::MARKER_SPHERE_RADIUS;

use crate::engine::assets::scene_setup::SceneSetup;
use crate::engine::camera::controller::{CameraController, OrbitInput};
use crate::engine::camera::navigation::NavigationGraph;
use crate::engine::camera::pose::Perspective;
use crate::engine::core::view_mode::ViewMode;
use crate::engine::loading::asset_loader::{
    AssetLoader, LoadError, LoadPhase, LoadTicket, ViewerDisplay,
};
use crate::tools::pipeline::{
    HotspotVolume, InteractionEvent, InteractionPipeline, MeshCandidate, NavigationMarker,
    PointerOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Started,
    NoOp,
}

/// One viewer instance: a scene, its graph, its camera and its picking state.
///
/// Rebuilt from scratch on every view-mode switch.
#[derive(Debug)]
pub struct Viewer {
    mode: ViewMode,
    setup: SceneSetup,
    loader: AssetLoader,
    navigation: Option<NavigationGraph>,
    camera: CameraController,
    pipeline: InteractionPipeline,
    outbox: Vec<InteractionEvent>,
}

impl Viewer {
    /// Build the viewer and start its single load. The ticket, if any, must be
    /// handed to the fetch task.
    pub fn new(setup: SceneSetup, generation: u64) -> (Self, Option<LoadTicket>) {
        let mut loader = AssetLoader::new(generation);
        let ticket = loader.begin(setup.model_url.clone());
        let viewer = Self {
            mode: setup.mode,
            pipeline: InteractionPipeline::new(setup.mesh_selection),
            setup,
            loader,
            navigation: None,
            camera: CameraController::survey(),
            outbox: Vec::new(),
        };
        (viewer, ticket)
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn generation(&self) -> u64 {
        self.loader.generation()
    }

    pub fn display(&self) -> ViewerDisplay {
        self.loader.display()
    }

    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    pub fn navigation(&self) -> Option<&NavigationGraph> {
        self.navigation.as_ref()
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn pipeline(&self) -> &InteractionPipeline {
        &self.pipeline
    }

    pub fn is_scene_ready(&self) -> bool {
        self.loader.frame().is_some()
    }

    /// Hand a fetch result to the loader. Returns bytes to decode on success.
    pub fn accept_fetch(&mut self, generation: u64, result: Result<Vec<u8>, LoadError>) -> Option<Vec<u8>> {
        let bytes = self.loader.fetched(generation, result);
        self.report_failure();
        bytes
    }

    pub fn fail(&mut self, err: LoadError) {
        self.loader.fail(err);
        self.report_failure();
    }

    fn report_failure(&mut self) {
        if let LoadPhase::Failed(err) = self.loader.phase() {
            let message = err.to_string();
            if !self
                .outbox
                .iter()
                .any(|event| matches!(event, InteractionEvent::Error { message: m } if *m == message))
            {
                self.outbox.push(InteractionEvent::Error { message });
            }
        }
    }

    /// Scene instantiated and normalised. Places graph, markers, hotspots and camera.
    pub fn scene_ready(&mut self, frame: SceneFrame) -> bool {
        if !self.loader.finish(frame) {
            return false;
        }
        let layout = self.setup.layout;

        self.navigation = NavigationGraph::from_layout(&layout, &frame);
        let markers = self
            .navigation
            .iter()
            .flat_map(|graph| graph.nodes())
            .map(|node| NavigationMarker {
                node: node.name.clone(),
                center: node.position,
                radius: MARKER_SPHERE_RADIUS,
            })
            .collect();

        let hotspots = layout
            .hotspots
            .iter()
            .map(|hotspot| HotspotVolume {
                name: hotspot.name.to_string(),
                center: frame.place(Vec3::from_array(hotspot.position), layout.hotspot_space),
                half_extents: frame
                    .place_extents(Vec3::from_array(hotspot.size) * 0.5, layout.hotspot_space),
            })
            .collect();
        self.pipeline.populate(hotspots, markers);

        match &self.navigation {
            Some(graph) => self.camera.place_at(graph.default_node()),
            None => self.camera = CameraController::survey(),
        }

        self.outbox.push(InteractionEvent::Log {
            message: format!("{} scene ready", self.mode.as_str()),
        });
        true
    }

    /// Request a flight to `name`. Rejections are developer diagnostics only.
    pub fn move_to(&mut self, name: &str, now: Duration) -> MoveOutcome {
        let Some(graph) = self.navigation.as_ref() else {
            debug!("Move to {name} ignored: scene has no navigation nodes");
            return MoveOutcome::NoOp;
        };
        if let Some(target) = self.camera.transition_target() {
            debug!("Move to {name} ignored: transition to {target} in flight");
            return MoveOutcome::NoOp;
        }
        match graph.request_move(name) {
            Ok(target) => {
                if self.camera.start_transition(target, now) {
                    MoveOutcome::Started
                } else {
                    MoveOutcome::NoOp
                }
            }
            Err(rejection) => {
                debug!("Move to {name} rejected: {rejection:?}");
                MoveOutcome::NoOp
            }
        }
    }

    /// Next node offered by the navigation toggle, if the scene has one.
    pub fn next_node_name(&self) -> Option<String> {
        let graph = self.navigation.as_ref()?;
        graph.next_from_current().map(|node| node.name.clone())
    }

    /// Pointer press in window pixels. Markers navigate; everything else is reported.
    pub fn handle_pointer_event(
        &mut self,
        screen: Vec2,
        viewport: Vec2,
        projection: &Perspective,
        meshes: &[MeshCandidate<'_>],
        now: Duration,
    ) -> Option<InteractionEvent> {
        if !self.is_scene_ready() {
            return None;
        }
        let camera = *self.camera.pose();
        match self
            .pipeline
            .handle_pointer_event(screen, viewport, &camera, projection, meshes)
        {
            PointerOutcome::Navigate(node) => {
                self.move_to(&node, now);
                None
            }
            PointerOutcome::Interaction(event) => Some(event),
            PointerOutcome::Nothing => None,
        }
    }

    /// Advance the camera one frame; settles the graph on arrival.
    pub fn tick(&mut self, now: Duration, input: OrbitInput) -> Option<String> {
        let arrived = self.camera.tick(now, input)?;
        if let Some(graph) = self.navigation.as_mut() {
            graph.settle(&arrived);
        }
        Some(arrived)
    }

    /// Log and error events produced since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.outbox)
    }
}

#[derive(Resource, Debug, Deref, DerefMut)]
pub struct ActiveViewer(pub Viewer);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::scene_setup::PropertySession;
    use crate::engine::camera::pose::CameraPose;

    fn session() -> PropertySession {
        PropertySession {
            property_name: "Graffiti".to_string(),
            exterior_url: Some("https://cdn/graffiti.glb".to_string()),
            interior_url: Some("https://cdn/graffiti-interior.glb".to_string()),
        }
    }

    fn ready_interior() -> Viewer {
        let (mut viewer, ticket) = Viewer::new(session().setup_for(ViewMode::Interior), 7);
        let ticket = ticket.unwrap();
        viewer.accept_fetch(ticket.generation, Ok(vec![1])).unwrap();
        assert!(viewer.scene_ready(SceneFrame::IDENTITY));
        viewer
    }

    #[test]
    fn interior_parks_at_default_node() {
        let viewer = ready_interior();
        let node_a = viewer.navigation().unwrap().node("Node_A").unwrap().clone();
        assert_eq!(*viewer.camera().pose(), CameraPose::at_node(node_a.position));
        assert_eq!(viewer.pipeline().markers().len(), 2);
        assert!(viewer.pipeline().hotspots().is_empty());
    }

    #[test]
    fn move_to_current_node_is_a_no_op() {
        let mut viewer = ready_interior();
        let before = *viewer.camera().pose();
        assert_eq!(viewer.move_to("Node_A", Duration::ZERO), MoveOutcome::NoOp);
        viewer.tick(Duration::from_millis(16), OrbitInput::default());
        assert_eq!(*viewer.camera().pose(), before);
        assert_eq!(viewer.navigation().unwrap().current_name(), "Node_A");
    }

    #[test]
    fn move_during_flight_keeps_original_target() {
        let mut viewer = ready_interior();
        assert_eq!(viewer.move_to("Node_B", Duration::ZERO), MoveOutcome::Started);
        assert_eq!(viewer.move_to("Node_A", Duration::from_millis(300)), MoveOutcome::NoOp);
        assert_eq!(viewer.camera().transition_target(), Some("Node_B"));
        assert_eq!(viewer.navigation().unwrap().current_name(), "Node_A");
    }

    #[test]
    fn unknown_node_is_silently_rejected() {
        let mut viewer = ready_interior();
        assert_eq!(viewer.move_to("Attic", Duration::ZERO), MoveOutcome::NoOp);
        assert!(viewer.drain_events().iter().all(|e| !matches!(e, InteractionEvent::Error { .. })));
    }

    #[test]
    fn arrival_settles_the_graph() {
        let mut viewer = ready_interior();
        viewer.move_to("Node_B", Duration::from_secs(1));
        assert_eq!(viewer.tick(Duration::from_millis(1900), OrbitInput::default()), None);
        assert_eq!(viewer.navigation().unwrap().current_name(), "Node_A");

        let arrived = viewer.tick(Duration::from_millis(2800), OrbitInput::default());
        assert_eq!(arrived.as_deref(), Some("Node_B"));
        assert_eq!(viewer.navigation().unwrap().current_name(), "Node_B");
        assert_eq!(viewer.camera().transition_target(), None);
        assert_eq!(viewer.next_node_name().as_deref(), Some("Node_A"));
    }

    #[test]
    fn pointer_before_scene_ready_yields_nothing() {
        let (mut viewer, _) = Viewer::new(session().setup_for(ViewMode::Exterior), 1);
        let event = viewer.handle_pointer_event(
            Vec2::new(10.0, 10.0),
            Vec2::new(800.0, 600.0),
            &Perspective::default(),
            &[],
            Duration::ZERO,
        );
        assert_eq!(event, None);
    }

    #[test]
    fn pointer_without_url_yields_nothing() {
        let mut absent = session();
        absent.exterior_url = None;
        let (mut viewer, ticket) = Viewer::new(absent.setup_for(ViewMode::Exterior), 1);
        assert!(ticket.is_none());
        assert_eq!(viewer.display(), ViewerDisplay::Absent);
        let event = viewer.handle_pointer_event(
            Vec2::new(400.0, 300.0),
            Vec2::new(800.0, 600.0),
            &Perspective::default(),
            &[],
            Duration::ZERO,
        );
        assert_eq!(event, None);
    }

    #[test]
    fn render_space_hotspots_are_not_renormalised() {
        let (mut viewer, ticket) = Viewer::new(session().setup_for(ViewMode::Exterior), 2);
        viewer.accept_fetch(ticket.unwrap().generation, Ok(vec![1]));
        let frame = SceneFrame {
            center: Vec3::new(3.0, -1.0, 2.0),
            scale: 0.25,
        };
        viewer.scene_ready(frame);

        let door = &viewer.pipeline().hotspots()[0];
        assert_eq!(door.name, "Object_52");
        assert!(door.center.abs_diff_eq(Vec3::new(-3.301, 0.283, -0.106), 1e-6));
        assert!(door.size().abs_diff_eq(Vec3::new(0.399, 0.996, 1.622), 1e-6));
        assert_eq!(*viewer.camera().pose(), CameraPose::survey());
    }

    #[test]
    fn load_failure_is_reported_once() {
        let (mut viewer, ticket) = Viewer::new(session().setup_for(ViewMode::Exterior), 5);
        viewer.accept_fetch(
            ticket.unwrap().generation,
            Err(LoadError::Fetch("HTTP 500".to_string())),
        );
        viewer.fail(LoadError::Decode("late".to_string()));
        let events = viewer.drain_events();
        assert_eq!(
            events,
            vec![InteractionEvent::Error {
                message: "failed to fetch scene asset: HTTP 500".to_string()
            }]
        );
        assert_eq!(viewer.display(), ViewerDisplay::Failed);
        assert!(!viewer.scene_ready(SceneFrame::IDENTITY));
    }
}
