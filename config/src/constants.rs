//! # Configuration Constants
//!
//! Centralized constants for the tiling pipeline. Geometry tolerances,
//! tessellation defaults and the fixed fixture dimensions are defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Resolution**: Default tessellation for round cutters
//! - **Fixtures**: Fixed magnet socket dimensions (meters)
//! - **Limits**: Safety bounds for input files and recursion

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Epsilon for vertex deduplication.
///
/// Slightly larger tolerance used when comparing vertices that went through
/// boolean operations and transformations.
pub const VERTEX_MERGE_EPSILON: f64 = 1e-8;

/// Distance under which imported vertices are welded together.
///
/// Matches the merge-by-distance cleanup applied to the source mesh before
/// tiling (0.1 mm).
///
/// # Example
///
/// ```rust
/// use config::constants::WELD_DISTANCE;
/// assert!(WELD_DISTANCE < 0.001);
/// ```
pub const WELD_DISTANCE: f64 = 1e-4;

/// Thickness of a plane when classifying points during BSP booleans.
///
/// Tiles are modelled in meters and the smallest feature (countersink
/// overlap) is half a millimeter, so the plane must be much thinner than
/// that while staying above f32 noise of imported STL coordinates.
///
/// # Example
///
/// ```rust
/// use config::constants::{COUNTERSINK_OVERLAP, PLANE_EPSILON};
/// assert!(PLANE_EPSILON < COUNTERSINK_OVERLAP / 100.0);
/// ```
pub const PLANE_EPSILON: f64 = 1e-7;

// =============================================================================
// RESOLUTION CONSTANTS
// =============================================================================

/// Default number of segments around a bore or countersink.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_SEGMENTS;
/// assert!(DEFAULT_SEGMENTS >= 12);
/// ```
pub const DEFAULT_SEGMENTS: u32 = 32;

/// Minimum number of segments for a round cutter.
pub const MIN_SEGMENTS: u32 = 3;

// =============================================================================
// FIXTURE CONSTANTS
// =============================================================================

/// Extra bore length below the tile underside (10 mm).
///
/// The bore reaches this far below the enclosure so the subtraction pierces
/// the bottom face cleanly instead of leaving a coplanar skin.
///
/// # Example
///
/// ```rust
/// use config::constants::BORE_OVERCUT;
///
/// let magnet_height = 0.002;
/// let bore_depth = magnet_height + BORE_OVERCUT;
/// assert!((bore_depth - 0.012).abs() < 1e-12);
/// ```
pub const BORE_OVERCUT: f64 = 0.01;

/// Overlap between the countersink base and the bore top (0.5 mm).
pub const COUNTERSINK_OVERLAP: f64 = 0.0005;

/// Smallest countersink base radius (0.5 mm).
///
/// Used when the radial shoulder would leave a cone thinner than this.
pub const MIN_COUNTERSINK_RADIUS: f64 = 0.0005;

// =============================================================================
// LIMIT CONSTANTS
// =============================================================================

/// Red zone in bytes before `stacker` grows the stack during BSP recursion.
pub const STACKER_RED_ZONE_BYTES: usize = 64 * 1024;

/// Bytes of stack space reserved when growing recursion limits using the
/// `stacker` crate.
///
/// # Examples
/// ```
/// use config::constants::STACKER_STACK_SIZE_BYTES;
/// assert!(STACKER_STACK_SIZE_BYTES >= 1024);
/// ```
pub const STACKER_STACK_SIZE_BYTES: usize = 8 * 1024 * 1024;

/// Maximum file size for imported meshes (in bytes).
///
/// Prevents loading extremely large files that could exhaust memory.
/// 1 GB default.
pub const MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Checks if two f64 values are approximately equal within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_equal;
///
/// assert!(approx_equal(1.0, 1.0 + 1e-11));
/// assert!(!approx_equal(1.0, 1.1));
/// ```
#[inline]
pub fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Checks if a f64 value is approximately zero within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_zero;
///
/// assert!(approx_zero(1e-11));
/// assert!(!approx_zero(0.1));
/// ```
#[inline]
pub fn approx_zero(value: f64) -> bool {
    value.abs() < EPSILON
}
