//! Identifier type aliases shared across the wire model.

/// Identifies a [`Work`](super::work::Work) for the lifetime of a request.
pub type WorkId = u64;

/// Identifies a [`Vehicle`](super::vehicle::Vehicle) for the lifetime of a request.
pub type VehicleId = u64;

/// Identifies an [`Assembly`](super::assembly::Assembly) for the lifetime of a request.
pub type AssemblyId = u64;

/// A (longitude, latitude) pair, matching the coordinate order used by the
/// routing collaborator.
pub type Coordinate = (f64, f64);
