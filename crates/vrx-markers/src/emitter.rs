//! Waypoint marker drawing
//!
//! `WaypointMarkers` turns waypoints into cylinder markers with an optional
//! text label above them, styled by a [`MarkerConfig`].
//!
//! Drawing takes `&mut self`: one caller at a time. Share an emitter between
//! threads by wrapping it in a `Mutex`.

use tracing::{debug, info, warn};

use crate::config::{MarkerConfig, MarkerParams};
use crate::msgs::{Marker, MarkerAction, MarkerType, Material, Pose, Visibility};
use crate::transport::{MarkerPublisher, PublishError};

/// Draws waypoint markers into the simulator
pub struct WaypointMarkers<P: MarkerPublisher> {
    ns: String,
    config: MarkerConfig,
    /// Id for the next marker drawn without an explicit id; `None` once
    /// every id up to `u64::MAX` has been handed out
    next_id: Option<u64>,
    /// Set once an auto-assigned id has been handed out
    auto_started: bool,
    publisher: P,
}

impl<P: MarkerPublisher> WaypointMarkers<P> {
    /// Create an emitter for `namespace` with the default configuration
    pub fn new(namespace: impl Into<String>, publisher: P) -> Self {
        let ns = namespace.into();
        if ns.is_empty() {
            warn!("Waypoint markers created with an empty namespace");
        }
        let config = MarkerConfig::default();
        Self {
            ns,
            next_id: Some(config.initial_id),
            config,
            auto_started: false,
            publisher,
        }
    }

    /// Apply marker parameters; `None` keeps the current configuration.
    ///
    /// `initial_id` only moves the id counter before the first auto-assigned
    /// draw. Afterwards it is ignored so ids already in the scene are not
    /// handed out again.
    pub fn load(&mut self, params: Option<&MarkerParams>) {
        let Some(params) = params else {
            debug!(ns = %self.ns, "No marker parameters, keeping configuration");
            return;
        };

        let mut params = params.clone();
        if let Some(initial_id) = params.initial_id {
            if self.auto_started {
                warn!(
                    ns = %self.ns,
                    initial_id,
                    next_id = ?self.next_id,
                    "Ignoring initial_id, markers were already drawn with assigned ids"
                );
                params.initial_id = None;
            } else {
                self.next_id = Some(initial_id);
            }
        }

        self.config.apply(&params);

        info!(
            ns = %self.ns,
            material = %self.config.material,
            scaling = ?self.config.scaling.to_array(),
            height = self.config.height,
            next_id = ?self.next_id,
            "Loaded marker configuration"
        );
    }

    /// Build the marker request for a waypoint without sending it
    pub fn build_marker(&self, id: u64, x: f64, y: f64, yaw: f64, text: &str) -> Marker {
        Marker {
            ns: self.ns.clone(),
            id,
            action: MarkerAction::AddModify,
            marker_type: MarkerType::Cylinder,
            visibility: Visibility::Gui,
            scale: self.config.scaling,
            material: Material {
                script_name: self.config.material.clone(),
            },
            pose: Pose::from_xyz_yaw(x, y, self.config.height, yaw),
            text: (!text.is_empty()).then(|| text.to_string()),
        }
    }

    /// Draw a marker with an explicit id. The assigned-id counter is untouched.
    pub fn draw_marker_with_id(
        &mut self,
        id: u64,
        x: f64,
        y: f64,
        yaw: f64,
        text: &str,
    ) -> Result<(), PublishError> {
        let marker = self.build_marker(id, x, y, yaw, text);

        match self.publisher.publish(&marker) {
            Ok(()) => {
                debug!(ns = %self.ns, id, x, y, yaw, "Drew waypoint marker");
                Ok(())
            }
            Err(e) => {
                warn!(ns = %self.ns, id, error = %e, "Failed to send waypoint marker");
                Err(e)
            }
        }
    }

    /// Draw a marker with the next assigned id.
    ///
    /// The id is consumed even if sending fails. Ids never wrap: after
    /// `u64::MAX` has been used, every further call fails with
    /// [`PublishError::IdsExhausted`] without sending anything.
    pub fn draw_marker(&mut self, x: f64, y: f64, yaw: f64, text: &str) -> Result<(), PublishError> {
        let Some(id) = self.next_id else {
            warn!(ns = %self.ns, "No marker ids left to assign");
            return Err(PublishError::IdsExhausted { ns: self.ns.clone() });
        };
        self.next_id = id.checked_add(1);
        self.auto_started = true;
        self.draw_marker_with_id(id, x, y, yaw, text)
    }

    pub fn namespace(&self) -> &str {
        &self.ns
    }

    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    /// Id the next auto-assigned marker will get, `None` when exhausted
    pub fn next_id(&self) -> Option<u64> {
        self.next_id
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn into_publisher(self) -> P {
        self.publisher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msgs::Vector3d;
    use crate::transport::BroadcastPublisher;

    /// Records every marker; fails while `fail` is set
    #[derive(Default)]
    struct RecordingPublisher {
        sent: Vec<Marker>,
        attempts: Vec<u64>,
        fail: bool,
    }

    impl MarkerPublisher for RecordingPublisher {
        fn publish(&mut self, marker: &Marker) -> Result<(), PublishError> {
            self.attempts.push(marker.id);
            if self.fail {
                return Err(PublishError::NoSubscribers {
                    topic: "/marker".to_string(),
                });
            }
            self.sent.push(marker.clone());
            Ok(())
        }
    }

    fn emitter() -> WaypointMarkers<RecordingPublisher> {
        WaypointMarkers::new("vrx/wp", RecordingPublisher::default())
    }

    fn red_params() -> MarkerParams {
        MarkerParams {
            material: Some("Gazebo/Red".to_string()),
            scaling: Some([0.3, 0.3, 2.0]),
            height: Some(1.0),
            initial_id: Some(5),
        }
    }

    #[test]
    fn test_configured_auto_draws() {
        let mut markers = emitter();
        markers.load(Some(&red_params()));

        markers.draw_marker(1.0, 2.0, 0.0, "").unwrap();
        markers.draw_marker(3.0, 4.0, 1.57, "A").unwrap();

        let sent = &markers.publisher().sent;
        assert_eq!(sent.len(), 2);

        let first = &sent[0];
        assert_eq!(first.ns, "vrx/wp");
        assert_eq!(first.id, 5);
        assert_eq!(first.pose.position, Vector3d::new(1.0, 2.0, 1.0));
        assert_eq!(first.material.script_name, "Gazebo/Red");
        assert_eq!(first.scale, Vector3d::new(0.3, 0.3, 2.0));
        assert_eq!(first.marker_type, MarkerType::Cylinder);
        assert_eq!(first.action, MarkerAction::AddModify);
        assert!(first.text.is_none());

        let second = &sent[1];
        assert_eq!(second.id, 6);
        assert_eq!(second.text.as_deref(), Some("A"));
        assert!((second.pose.orientation.yaw() - 1.57).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_draw_uses_defaults() {
        let mut markers = emitter();

        markers.draw_marker_with_id(42, 0.0, 0.0, 0.0, "").unwrap();
        markers.draw_marker(0.0, 0.0, 0.0, "").unwrap();

        let sent = &markers.publisher().sent;
        assert_eq!(sent[0].id, 42);
        assert_eq!(sent[0].material.script_name, "Gazebo/Green");
        assert_eq!(sent[0].scale, Vector3d::new(0.2, 0.2, 1.5));
        assert_eq!(sent[0].pose.position.z, 0.0);
        assert_eq!(sent[1].id, 0);
    }

    #[test]
    fn test_explicit_draws_do_not_disturb_sequence() {
        let mut markers = emitter();

        markers.draw_marker(0.0, 0.0, 0.0, "").unwrap();
        markers.draw_marker_with_id(100, 0.0, 0.0, 0.0, "").unwrap();
        markers.draw_marker(0.0, 0.0, 0.0, "").unwrap();
        markers.draw_marker_with_id(1, 0.0, 0.0, 0.0, "").unwrap();
        markers.draw_marker(0.0, 0.0, 0.0, "").unwrap();

        let ids: Vec<u64> = markers.publisher().sent.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 100, 1, 1, 2]);
        assert_eq!(markers.next_id(), Some(3));
    }

    #[test]
    fn test_failed_send_consumes_id() {
        let mut markers = emitter();

        markers.publisher.fail = true;
        assert!(markers.draw_marker(0.0, 0.0, 0.0, "").is_err());
        assert!(markers.draw_marker(0.0, 0.0, 0.0, "").is_err());
        markers.publisher.fail = false;
        assert!(markers.draw_marker(0.0, 0.0, 0.0, "").is_ok());

        let publisher = markers.into_publisher();
        assert_eq!(publisher.attempts, vec![0, 1, 2]);
        assert_eq!(publisher.sent.len(), 1);
        assert_eq!(publisher.sent[0].id, 2);
    }

    #[test]
    fn test_load_none_keeps_configuration() {
        let mut markers = emitter();
        markers.load(Some(&red_params()));
        let before = markers.config().clone();

        markers.load(None);

        assert_eq!(markers.config(), &before);
        assert_eq!(markers.next_id(), Some(5));
    }

    #[test]
    fn test_load_height_only() {
        let mut markers = emitter();
        markers.load(Some(&red_params()));
        markers.load(Some(&MarkerParams {
            height: Some(2.5),
            ..Default::default()
        }));

        let config = markers.config();
        assert_eq!(config.height, 2.5);
        assert_eq!(config.material, "Gazebo/Red");
        assert_eq!(config.scaling, Vector3d::new(0.3, 0.3, 2.0));
        assert_eq!(config.initial_id, 5);
        assert_eq!(markers.next_id(), Some(5));
    }

    #[test]
    fn test_height_independent_of_position() {
        let mut markers = emitter();
        markers.load(Some(&MarkerParams {
            height: Some(0.75),
            ..Default::default()
        }));

        for (x, y) in [(0.0, 0.0), (-120.5, 33.0), (1e6, -1e6)] {
            let marker = markers.build_marker(0, x, y, 0.3, "");
            assert_eq!(marker.pose.position.z, 0.75);
            assert_eq!(marker.pose.position.x, x);
            assert_eq!(marker.pose.position.y, y);
        }
    }

    #[test]
    fn test_yaw_only_orientation() {
        let markers = emitter();
        let marker = markers.build_marker(0, 0.0, 0.0, -2.0, "wp");
        let q = marker.pose.orientation;
        assert_eq!(q.x, 0.0);
        assert_eq!(q.y, 0.0);
        assert!((q.yaw() + 2.0).abs() < 1e-12);
        assert_eq!(marker.text.as_deref(), Some("wp"));
    }

    #[test]
    fn test_initial_id_ignored_after_auto_draw() {
        let mut markers = emitter();
        markers.load(Some(&MarkerParams {
            initial_id: Some(10),
            ..Default::default()
        }));
        markers.load(Some(&MarkerParams {
            initial_id: Some(20),
            ..Default::default()
        }));
        markers.draw_marker(0.0, 0.0, 0.0, "").unwrap();

        markers.load(Some(&red_params()));
        markers.draw_marker(0.0, 0.0, 0.0, "").unwrap();

        let sent = &markers.publisher().sent;
        assert_eq!(sent[0].id, 20);
        assert_eq!(sent[1].id, 21);
        assert_eq!(sent[1].material.script_name, "Gazebo/Red");
        assert_eq!(markers.config().initial_id, 20);
    }

    #[test]
    fn test_explicit_draw_does_not_lock_initial_id() {
        let mut markers = emitter();
        markers.draw_marker_with_id(3, 0.0, 0.0, 0.0, "").unwrap();
        markers.load(Some(&MarkerParams {
            initial_id: Some(7),
            ..Default::default()
        }));
        markers.draw_marker(0.0, 0.0, 0.0, "").unwrap();

        assert_eq!(markers.publisher().sent[1].id, 7);
    }

    #[tokio::test]
    async fn test_broadcast_topic() {
        let publisher = BroadcastPublisher::new(16);
        let mut rx = publisher.subscribe();
        let mut markers = WaypointMarkers::new("vrx/wp", publisher);

        markers.draw_marker(5.0, 6.0, 0.0, "gate").unwrap();

        let marker = rx.recv().await.unwrap();
        assert_eq!(marker.id, 0);
        assert_eq!(marker.text.as_deref(), Some("gate"));

        drop(rx);
        assert!(matches!(
            markers.draw_marker(0.0, 0.0, 0.0, ""),
            Err(PublishError::NoSubscribers { .. })
        ));
        assert_eq!(markers.next_id(), Some(2));
    }

    #[test]
    fn test_ids_do_not_wrap() {
        let mut markers = emitter();
        markers.load(Some(&MarkerParams {
            initial_id: Some(u64::MAX - 1),
            ..Default::default()
        }));

        markers.draw_marker(0.0, 0.0, 0.0, "").unwrap();
        markers.draw_marker(0.0, 0.0, 0.0, "").unwrap();
        assert_eq!(markers.next_id(), None);

        assert!(matches!(
            markers.draw_marker(0.0, 0.0, 0.0, ""),
            Err(PublishError::IdsExhausted { ref ns }) if ns == "vrx/wp"
        ));

        // Explicit ids still work once the sequence is used up
        markers.draw_marker_with_id(0, 0.0, 0.0, 0.0, "").unwrap();

        let publisher = markers.into_publisher();
        assert_eq!(publisher.attempts, vec![u64::MAX - 1, u64::MAX, 0]);
    }
}
