//! Topology statistics over the connection set.

use super::{Connection, ConnectionType};
use crate::device::DeviceId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Summary statistics of the current topology.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectionAnalytics {
    pub total_connections: usize,
    pub connections_by_type: BTreeMap<ConnectionType, usize>,
    /// Mean polyline length; 0 without connections.
    pub average_path_length: f64,
    /// Device with the highest source + target incidence. Ties go to the
    /// device that appears first in connection order.
    pub most_connected_device: Option<DeviceId>,
    /// Connections per distinct device touched.
    pub connection_density: f64,
    /// Registry devices no connection touches, in registry order.
    pub isolated_devices: Vec<DeviceId>,
}

impl ConnectionAnalytics {
    /// Compute statistics for `connections` against the registry's `devices`.
    pub fn compute(connections: &[Connection], devices: &[DeviceId]) -> Self {
        let total = connections.len();

        let mut by_type = BTreeMap::new();
        let mut total_length = 0.0;
        let mut incidence: HashMap<DeviceId, usize> = HashMap::new();
        let mut first_seen: Vec<DeviceId> = Vec::new();

        for conn in connections {
            *by_type.entry(conn.kind).or_insert(0) += 1;
            total_length += conn.path_length();
            for id in [conn.source_device_id, conn.target_device_id] {
                let count = incidence.entry(id).or_insert(0);
                if *count == 0 {
                    first_seen.push(id);
                }
                *count += 1;
            }
        }

        let mut most_connected: Option<(DeviceId, usize)> = None;
        for id in &first_seen {
            let count = incidence[id];
            if most_connected.is_none_or(|(_, best)| count > best) {
                most_connected = Some((*id, count));
            }
        }

        let touched: HashSet<DeviceId> = incidence.keys().copied().collect();
        let isolated_devices = devices
            .iter()
            .copied()
            .filter(|id| !touched.contains(id))
            .collect();

        Self {
            total_connections: total,
            connections_by_type: by_type,
            average_path_length: if total == 0 { 0.0 } else { total_length / total as f64 },
            most_connected_device: most_connected.map(|(id, _)| id),
            connection_density: total as f64 / touched.len().max(1) as f64,
            isolated_devices,
        }
    }

    pub fn count_for(&self, kind: ConnectionType) -> usize {
        self.connections_by_type.get(&kind).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use uuid::Uuid;

    fn link(kind: ConnectionType, a: DeviceId, b: DeviceId, len: f64) -> Connection {
        Connection::new(kind, a, b, vec![Point::new(0.0, 0.0), Point::new(len, 0.0)])
    }

    #[test]
    fn test_empty_analytics() {
        let device = Uuid::new_v4();
        let stats = ConnectionAnalytics::compute(&[], &[device]);
        assert_eq!(stats.total_connections, 0);
        assert_eq!(stats.average_path_length, 0.0);
        assert_eq!(stats.connection_density, 0.0);
        assert_eq!(stats.most_connected_device, None);
        assert_eq!(stats.isolated_devices, vec![device]);
    }

    #[test]
    fn test_analytics_over_star_topology() {
        let (hub, a, b, lonely) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let connections = vec![
            link(ConnectionType::Ethernet, a, hub, 10.0),
            link(ConnectionType::Ethernet, hub, b, 20.0),
            link(ConnectionType::Fiber, a, b, 30.0),
        ];
        let stats = ConnectionAnalytics::compute(&connections, &[hub, a, b, lonely]);

        assert_eq!(stats.total_connections, 3);
        assert_eq!(stats.count_for(ConnectionType::Ethernet), 2);
        assert_eq!(stats.count_for(ConnectionType::Fiber), 1);
        assert_eq!(stats.count_for(ConnectionType::Power), 0);
        assert!((stats.average_path_length - 20.0).abs() < 1e-9);
        assert!((stats.connection_density - 1.0).abs() < 1e-9);
        assert_eq!(stats.isolated_devices, vec![lonely]);
        // a, hub and b all have incidence 2; a appears first
        assert_eq!(stats.most_connected_device, Some(a));
    }

    #[test]
    fn test_most_connected_prefers_higher_count() {
        let (hub, a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let connections = vec![
            link(ConnectionType::Ethernet, a, b, 1.0),
            link(ConnectionType::Ethernet, hub, a, 1.0),
            link(ConnectionType::Ethernet, hub, b, 1.0),
            link(ConnectionType::Serial, hub, c, 1.0),
        ];
        let stats = ConnectionAnalytics::compute(&connections, &[]);
        assert_eq!(stats.most_connected_device, Some(hub));
        assert!((stats.connection_density - 1.0).abs() < 1e-9);
        assert!(stats.isolated_devices.is_empty());
    }
}
