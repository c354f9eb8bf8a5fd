//! # Fixture Placer
//!
//! Four magnet sockets per tile, one near each corner. Each socket is a
//! cylindrical bore opening through the underside and a 45° countersink cone
//! above it.
//!
//! ```text
//!        ▲ countersink apex
//!       ╱ ╲
//!   ┌──╱───╲──┐  bottom + magnet_height
//!   │  bore   │
//! ══╪═════════╪══ tile bottom
//!   └─────────┘  bottom - BORE_OVERCUT
//! ```

use config::constants::{BORE_OVERCUT, COUNTERSINK_OVERLAP, MIN_COUNTERSINK_RADIUS};
use config::{MagnetParams, TileConfig};
use glam::{DVec2, DVec3};
use tile_mesh::primitives::create_frustum;
use tile_mesh::{Mesh, MeshError};

/// Inset of socket centers from the tile edges.
///
/// Clamped so a bore never comes closer to an edge than
/// `magnet_radius + magnet_safety`.
pub fn effective_offset(params: &MagnetParams) -> f64 {
    params.effective_offset()
}

/// Cylindrical magnet pocket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bore {
    pub center: DVec2,
    pub radius: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl Bore {
    pub fn depth(&self) -> f64 {
        self.z_max - self.z_min
    }

    pub fn to_mesh(&self, segments: u32) -> Result<Mesh, MeshError> {
        create_frustum(
            self.center.extend(self.z_min),
            self.depth(),
            self.radius,
            self.radius,
            segments,
        )
    }
}

/// Insertion chamfer, a cone pointing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countersink {
    pub center: DVec2,
    pub base_radius: f64,
    pub height: f64,
    pub base_z: f64,
}

impl Countersink {
    pub fn to_mesh(&self, segments: u32) -> Result<Mesh, MeshError> {
        create_frustum(
            self.center.extend(self.base_z),
            self.height,
            self.base_radius,
            0.0,
            segments,
        )
    }
}

/// One corner socket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetSocket {
    pub corner: DVec2,
    pub bore: Bore,
    pub countersink: Countersink,
}

/// Places the four sockets of a tile.
///
/// `center` is the enclosure center and `cube_height` its height, so the
/// underside lies at `center.z - cube_height / 2`. Corners come in the order
/// `(-,-), (+,-), (-,+), (+,+)`.
pub fn place_sockets(center: DVec3, cube_height: f64, config: &TileConfig) -> [MagnetSocket; 4] {
    let params = config.magnet_params();
    let d = params.tile_size * 0.5 - effective_offset(&params);
    let bottom = center.z - cube_height * 0.5;

    let base_radius = (params.magnet_radius - params.countersink_shoulder).max(MIN_COUNTERSINK_RADIUS);

    [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)].map(|(sx, sy)| {
        let corner = DVec2::new(center.x + sx * d, center.y + sy * d);
        MagnetSocket {
            corner,
            bore: Bore {
                center: corner,
                radius: params.magnet_radius,
                z_min: bottom - BORE_OVERCUT,
                z_max: bottom + params.magnet_height,
            },
            countersink: Countersink {
                center: corner,
                base_radius,
                height: base_radius,
                base_z: bottom + params.magnet_height - COUNTERSINK_OVERLAP,
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sockets_at_origin(config: &TileConfig) -> [MagnetSocket; 4] {
        // block from z = -0.02 to z = 0.1
        place_sockets(DVec3::new(0.1, 0.1, 0.04), 0.12, config)
    }

    #[test]
    fn test_offset_clamped_to_safety() {
        let config = TileConfig {
            magnet_perim_offset: 0.001,
            ..TileConfig::default()
        };
        assert_relative_eq!(effective_offset(&config.magnet_params()), 0.006, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_keeps_larger_request() {
        let config = TileConfig {
            magnet_perim_offset: 0.02,
            ..TileConfig::default()
        };
        assert_relative_eq!(effective_offset(&config.magnet_params()), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_invariant_over_inputs() {
        for i in 0..50 {
            let config = TileConfig {
                magnet_perim_offset: i as f64 * 0.0005,
                ..TileConfig::default()
            };
            let p = config.magnet_params();
            assert!(effective_offset(&p) >= p.magnet_radius + p.magnet_safety);
        }
    }

    #[test]
    fn test_corner_order_and_positions() {
        let sockets = sockets_at_origin(&TileConfig::default());
        // d = 0.1 - 0.006
        let lo = 0.006;
        let hi = 0.194;
        let expected = [(lo, lo), (hi, lo), (lo, hi), (hi, hi)];
        for (socket, (x, y)) in sockets.iter().zip(expected) {
            assert_relative_eq!(socket.corner.x, x, epsilon = 1e-12);
            assert_relative_eq!(socket.corner.y, y, epsilon = 1e-12);
            assert_eq!(socket.bore.center, socket.corner);
            assert_eq!(socket.countersink.center, socket.corner);
        }
    }

    #[test]
    fn test_bore_opens_through_underside() {
        let config = TileConfig::default();
        let bore = sockets_at_origin(&config)[0].bore;
        assert_relative_eq!(bore.z_min, -0.03, epsilon = 1e-12);
        assert_relative_eq!(bore.z_max, -0.018, epsilon = 1e-12);
        assert_relative_eq!(bore.depth(), config.magnet_height + BORE_OVERCUT, epsilon = 1e-12);
        assert_eq!(bore.radius, config.magnet_radius);
    }

    #[test]
    fn test_countersink_is_45_degrees() {
        let sink = sockets_at_origin(&TileConfig::default())[3].countersink;
        assert_relative_eq!(sink.base_radius, 0.004, epsilon = 1e-12);
        assert_eq!(sink.height, sink.base_radius);
        assert_relative_eq!(sink.base_z, -0.018 - COUNTERSINK_OVERLAP, epsilon = 1e-12);
    }

    #[test]
    fn test_countersink_radius_floor() {
        let config = TileConfig {
            countersink_shoulder: 0.01,
            ..TileConfig::default()
        };
        let sink = sockets_at_origin(&config)[0].countersink;
        assert_eq!(sink.base_radius, MIN_COUNTERSINK_RADIUS);
    }

    #[test]
    fn test_cutter_meshes_are_placed() {
        let socket = sockets_at_origin(&TileConfig::default())[1];

        let (min, max) = socket.bore.to_mesh(16).unwrap().bounding_box().unwrap();
        assert_relative_eq!(min.z, socket.bore.z_min, epsilon = 1e-12);
        assert_relative_eq!(max.z, socket.bore.z_max, epsilon = 1e-12);
        assert_relative_eq!(max.x, socket.corner.x + socket.bore.radius, epsilon = 1e-12);

        let (min, max) = socket.countersink.to_mesh(16).unwrap().bounding_box().unwrap();
        assert_relative_eq!(min.z, socket.countersink.base_z, epsilon = 1e-12);
        assert_relative_eq!(
            max.z,
            socket.countersink.base_z + socket.countersink.height,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_placement_is_deterministic() {
        let config = TileConfig::default();
        assert_eq!(sockets_at_origin(&config), sockets_at_origin(&config));
    }
}
