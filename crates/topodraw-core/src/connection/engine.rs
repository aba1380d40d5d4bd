//! Connection drawing engine: anchors, the drawing session and the
//! connection set.

use super::analytics::ConnectionAnalytics;
use super::anchor::{ConnectionAnchor, anchors_for_device, nearest_anchor_index};
use super::path::{DrawingMode, SnapSettings, generate_path, snap_to_device_edge, snap_to_grid};
use super::{Connection, ConnectionId, ConnectionRequest, ConnectionType};
use crate::config::EditorConfig;
use crate::device::{DeviceId, DeviceRef};
use crate::error::{EditorError, EditorResult};
use crate::store::{Store, Subscription};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Transient state of an in-progress connection draw.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawingSession {
    pub is_drawing: bool,
    pub start_device: Option<DeviceId>,
    pub start_point: Option<Point>,
    pub current_point: Option<Point>,
    /// Device the pointer is currently snapped to.
    pub end_device: Option<DeviceId>,
    pub preview_path: Vec<Point>,
    pub drawing_mode: DrawingMode,
    pub connection_type: ConnectionType,
}

/// Published engine state: the session, the connection set and the anchors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrawingState {
    pub session: DrawingSession,
    pub connections: Vec<Connection>,
    pub anchors: Vec<ConnectionAnchor>,
}

/// Owns anchors, the active drawing session and connection records.
///
/// State moves Idle -> Drawing -> Idle. Every mutation replaces the session
/// or the anchor vector as a whole, so listeners never observe a half
/// applied change.
#[derive(Debug)]
pub struct ConnectionDrawingEngine {
    enabled: bool,
    drawing_mode: DrawingMode,
    snap: SnapSettings,
    max_connections: usize,
    max_connections_per_anchor: usize,
    devices: Vec<DeviceRef>,
    state: Store<DrawingState>,
}

impl ConnectionDrawingEngine {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            enabled: true,
            drawing_mode: config.default_drawing_mode,
            snap: config.snap,
            max_connections: config.max_connections,
            max_connections_per_anchor: config.max_connections_per_anchor,
            devices: Vec::new(),
            state: Store::new(DrawingState::default()),
        }
    }

    // --- Observation ---

    pub fn get_current(&self) -> DrawingState {
        self.state.get_current()
    }

    pub fn subscribe(&self, listener: impl Fn(&DrawingState) + 'static) -> Subscription<DrawingState> {
        self.state.subscribe(listener)
    }

    pub fn session(&self) -> &DrawingSession {
        &self.state.current().session
    }

    pub fn is_drawing(&self) -> bool {
        self.state.current().session.is_drawing
    }

    pub fn connections(&self) -> &[Connection] {
        &self.state.current().connections
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections().iter().find(|c| c.id == id)
    }

    pub fn anchors(&self) -> &[ConnectionAnchor] {
        &self.state.current().anchors
    }

    pub fn anchors_for_device(&self, device_id: DeviceId) -> impl Iterator<Item = &ConnectionAnchor> {
        self.anchors().iter().filter(move |a| a.device_id == device_id)
    }

    /// The anchor of `device_id` closest to `point`.
    pub fn nearest_anchor(&self, device_id: DeviceId, point: Point) -> Option<&ConnectionAnchor> {
        nearest_anchor_index(self.anchors(), device_id, point).map(|i| &self.anchors()[i])
    }

    pub fn devices(&self) -> &[DeviceRef] {
        &self.devices
    }

    pub fn device(&self, id: DeviceId) -> Option<&DeviceRef> {
        self.devices.iter().find(|d| d.id == id)
    }

    // --- Settings ---

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable drawing. Disabling cancels an active session.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.cancel_drawing();
        }
    }

    pub fn drawing_mode(&self) -> DrawingMode {
        self.drawing_mode
    }

    /// Change path routing; an active preview is re-routed immediately.
    pub fn set_drawing_mode(&mut self, mode: DrawingMode) {
        self.drawing_mode = mode;
        if !self.is_drawing() {
            return;
        }
        let mut session = self.session().clone();
        session.drawing_mode = mode;
        if let (Some(start), Some(current)) = (session.start_point, session.current_point) {
            session.preview_path = generate_path(mode, start, current);
        }
        self.state.update(|s| s.session = session);
    }

    pub fn snap_settings(&self) -> SnapSettings {
        self.snap
    }

    pub fn set_snap_settings(&mut self, snap: SnapSettings) {
        self.snap = snap;
    }

    // --- Device registry ---

    /// Replace the anchor set from the device registry.
    ///
    /// Four anchors are generated per device. Connections whose endpoints
    /// are no longer in the registry are dropped; occupancy is re-derived
    /// from the connections that remain.
    pub fn update_anchors_from_devices(&mut self, devices: &[DeviceRef]) {
        self.devices = devices.to_vec();
        let connections = self.connections().to_vec();
        self.rebuild(connections);
    }

    /// Replace the connection set with the project's, for example after an
    /// undo or redo changed it. Anchor occupancy is re-derived.
    pub fn sync_connections(&mut self, connections: &[Connection]) {
        self.rebuild(connections.to_vec());
    }

    /// Take devices and connections from the project in one update.
    pub fn sync_with_project(&mut self, devices: &[DeviceRef], connections: &[Connection]) {
        self.devices = devices.to_vec();
        self.rebuild(connections.to_vec());
    }

    /// Publish `connections` (minus those with unknown endpoints) together
    /// with freshly derived anchors.
    fn rebuild(&mut self, connections: Vec<Connection>) {
        let mut anchors: Vec<ConnectionAnchor> = self
            .devices
            .iter()
            .flat_map(|d| anchors_for_device(d, self.max_connections_per_anchor))
            .collect();

        let (kept, dropped): (Vec<Connection>, Vec<Connection>) = connections
            .into_iter()
            .partition(|c| self.device(c.source_device_id).is_some() && self.device(c.target_device_id).is_some());
        if !dropped.is_empty() {
            log::debug!("Dropped {} connection(s) attached to removed devices", dropped.len());
        }

        for conn in &kept {
            for (device_id, point) in endpoint_points(conn, &self.devices) {
                let Some(idx) = nearest_anchor_index(&anchors, device_id, point) else {
                    continue;
                };
                if !anchors[idx].attach(conn.id) {
                    log::warn!("Anchor on device {} over capacity after regeneration", device_id);
                }
            }
        }

        let session = self.session_after_registry_change();
        self.state.set(DrawingState {
            session,
            connections: kept,
            anchors,
        });
    }

    /// Device whose bounds, grown by the snap distance, contain `point`.
    /// The nearest centre wins when several qualify.
    pub fn find_snap_target(&self, point: Point) -> Option<&DeviceRef> {
        let margin = self.snap.snap_distance;
        self.devices
            .iter()
            .filter(|d| d.bounds().inflate(margin, margin).contains(point))
            .min_by(|a, b| {
                a.center()
                    .distance_squared(point)
                    .total_cmp(&b.center().distance_squared(point))
            })
    }

    // --- Drawing session ---

    /// Begin drawing from `device`. Fails when disabled, already drawing,
    /// or when the device is not in the registry.
    pub fn start_drawing(&mut self, device: &DeviceRef, point: Point, kind: ConnectionType) -> bool {
        if !self.enabled {
            log::debug!("Connection drawing is disabled");
            return false;
        }
        if self.is_drawing() {
            log::debug!("Ignoring start_drawing: a session is already active");
            return false;
        }
        if self.device(device.id).is_none() {
            log::warn!("Cannot start drawing from unknown device {}", device.id);
            return false;
        }

        let session = DrawingSession {
            is_drawing: true,
            start_device: Some(device.id),
            start_point: Some(point),
            current_point: Some(point),
            end_device: None,
            preview_path: vec![point],
            drawing_mode: self.drawing_mode,
            connection_type: kind,
        };
        log::debug!("Started drawing {} connection from {}", kind, device.id);
        self.state.update(|s| s.session = session);
        true
    }

    /// Move the loose end of the connection. Ignored when idle.
    pub fn update_drawing(&mut self, point: Point, snap_target: Option<&DeviceRef>) {
        if !self.is_drawing() {
            return;
        }
        let mut session = self.session().clone();
        let Some(start) = session.start_point else {
            return;
        };

        let current = match snap_target {
            Some(target) if self.snap.snaps_to_devices() => snap_to_device_edge(target, point).point,
            None if self.snap.snaps_to_grid() => snap_to_grid(point, self.snap.grid_size).point,
            _ => point,
        };

        session.current_point = Some(current);
        session.end_device = snap_target.map(|d| d.id);
        session.preview_path = generate_path(session.drawing_mode, start, current);
        self.state.update(|s| s.session = session);
    }

    /// Complete the session on `end_device`.
    ///
    /// The engine returns to Idle whether or not a connection is created.
    pub fn finish_drawing(
        &mut self,
        end_device: &DeviceRef,
        point: Point,
        kind: ConnectionType,
    ) -> EditorResult<Connection> {
        if !self.is_drawing() {
            return Err(EditorError::state("finish_drawing called with no active session"));
        }
        let session = self.session().clone();
        let result = self.complete_session(&session, end_device, point, kind);
        if let Err(err) = &result {
            log::info!("Connection rejected: {}", err);
        }
        // Reset only the session; `complete_session` already replaced the
        // connection set and anchors on success.
        self.state.update(|s| s.session = DrawingSession::default());
        result
    }

    /// Like [`Self::finish_drawing`] but with the type given by name.
    pub fn finish_drawing_named(
        &mut self,
        end_device: &DeviceRef,
        point: Point,
        kind: &str,
    ) -> EditorResult<Connection> {
        match kind.parse::<ConnectionType>() {
            Ok(kind) => self.finish_drawing(end_device, point, kind),
            Err(err) => {
                self.cancel_drawing();
                Err(err)
            }
        }
    }

    /// Abandon the session. Safe to call when idle.
    pub fn cancel_drawing(&mut self) {
        if !self.is_drawing() {
            return;
        }
        log::debug!("Connection drawing cancelled");
        self.state.update(|s| s.session = DrawingSession::default());
    }

    fn complete_session(
        &mut self,
        session: &DrawingSession,
        end_device: &DeviceRef,
        point: Point,
        kind: ConnectionType,
    ) -> EditorResult<Connection> {
        let source_id = session.start_device.ok_or(EditorError::MissingEndpoint("source"))?;
        let start = session.start_point.ok_or(EditorError::MissingEndpoint("source"))?;
        if source_id == end_device.id {
            return Err(EditorError::SelfConnection);
        }
        let end = if self.snap.snaps_to_devices() {
            snap_to_device_edge(end_device, point).point
        } else {
            point
        };
        let points = generate_path(session.drawing_mode, start, end);
        self.attach(Connection::new(kind, source_id, end_device.id, points))
    }

    // --- Direct creation / removal ---

    /// Create a connection without a drawing session.
    pub fn create_connection(&mut self, request: ConnectionRequest) -> EditorResult<Connection> {
        let source_id = request.source.ok_or(EditorError::MissingEndpoint("source"))?;
        let target_id = request.target.ok_or(EditorError::MissingEndpoint("target"))?;
        if source_id == target_id {
            return Err(EditorError::SelfConnection);
        }
        let source = *self
            .device(source_id)
            .ok_or_else(|| EditorError::not_found("Device", source_id))?;
        let target = *self
            .device(target_id)
            .ok_or_else(|| EditorError::not_found("Device", target_id))?;

        let start = request
            .source_point
            .unwrap_or_else(|| snap_to_device_edge(&source, target.center()).point);
        let end = request
            .target_point
            .unwrap_or_else(|| snap_to_device_edge(&target, source.center()).point);
        let points = generate_path(self.drawing_mode, start, end);
        self.attach(Connection::new(request.kind, source_id, target_id, points))
    }

    /// Re-insert a previously removed connection record, keeping its id.
    pub fn restore_connection(&mut self, connection: Connection) -> EditorResult<Connection> {
        if self.connection(connection.id).is_some() {
            return Err(EditorError::state(format!(
                "connection {} already exists",
                connection.id
            )));
        }
        self.attach(connection)
    }

    /// Remove a connection and free its anchor slots.
    pub fn remove_connection(&mut self, id: ConnectionId) -> EditorResult<Connection> {
        let Some(index) = self.connections().iter().position(|c| c.id == id) else {
            return Err(EditorError::not_found("Connection", id));
        };

        let mut connections = self.connections().to_vec();
        let removed = connections.remove(index);
        let mut anchors = self.anchors().to_vec();
        for anchor in &mut anchors {
            anchor.detach(id);
        }

        log::debug!("Removed connection {}", id);
        self.state.update(|s| {
            s.connections = connections;
            s.anchors = anchors;
        });
        Ok(removed)
    }

    /// Remove every connection touching `device_id`.
    pub fn remove_connections_for_device(&mut self, device_id: DeviceId) -> Vec<Connection> {
        let ids: Vec<ConnectionId> = self
            .connections()
            .iter()
            .filter(|c| c.involves_device(device_id))
            .map(|c| c.id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.remove_connection(id).ok())
            .collect()
    }

    // --- Analytics ---

    pub fn get_analytics(&self) -> ConnectionAnalytics {
        let device_ids: Vec<DeviceId> = self.devices.iter().map(|d| d.id).collect();
        ConnectionAnalytics::compute(self.connections(), &device_ids)
    }

    /// Validate `connection` and commit it together with its anchor
    /// attachments. Nothing changes unless every check passes.
    fn attach(&mut self, connection: Connection) -> EditorResult<Connection> {
        if connection.is_self_connection() {
            return Err(EditorError::SelfConnection);
        }
        for id in [connection.source_device_id, connection.target_device_id] {
            if self.device(id).is_none() {
                return Err(EditorError::not_found("Device", id));
            }
        }
        if self.connections().len() >= self.max_connections {
            return Err(EditorError::LimitExceeded {
                what: "Connection",
                limit: self.max_connections,
            });
        }

        let mut anchors = self.anchors().to_vec();
        for (device_id, point) in endpoint_points(&connection, &self.devices) {
            let idx = nearest_anchor_index(&anchors, device_id, point)
                .ok_or_else(|| EditorError::not_found("Anchor", device_id))?;
            if !anchors[idx].attach(connection.id) {
                return Err(EditorError::LimitExceeded {
                    what: "Anchor connection",
                    limit: anchors[idx].max_connections,
                });
            }
        }

        log::info!(
            "Created {} connection {} ({} -> {})",
            connection.kind,
            connection.id,
            connection.source_device_id,
            connection.target_device_id
        );
        let created = connection.clone();
        self.state.update(|s| {
            s.connections.push(connection);
            s.anchors = anchors;
        });
        Ok(created)
    }

    /// A session whose start device disappeared cannot finish; drop it.
    fn session_after_registry_change(&self) -> DrawingSession {
        let session = self.session();
        match session.start_device {
            Some(id) if self.device(id).is_none() => {
                log::debug!("Start device {} removed; cancelling drawing", id);
                DrawingSession::default()
            }
            _ => session.clone(),
        }
    }
}

/// Source and target endpoints of a connection, falling back to device
/// centres for connections without points.
fn endpoint_points(connection: &Connection, devices: &[DeviceRef]) -> [(DeviceId, Point); 2] {
    let center = |id: DeviceId| {
        devices
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.center())
            .unwrap_or(Point::ZERO)
    };
    let source = connection.source_device_id;
    let target = connection.target_device_id;
    [
        (source, connection.start_point().unwrap_or_else(|| center(source))),
        (target, connection.end_point().unwrap_or_else(|| center(target))),
    ]
}
