//! Fixed limits enforced by the repository
//!
//! ## Contract
//!
//! These limits are FROZEN: they are not configurable and cannot change
//! without a major version bump.

use crate::error::{Result, VesselError};
use crate::types::ContentType;

/// Maximum identifiers of one type in a single id lookup
pub const MAX_ID_BATCH_SIZE: usize = 100;

/// Validate the size of one type-group of an id lookup
///
/// Returns `Err(VesselError::BatchTooLarge)` if `requested` exceeds
/// [`MAX_ID_BATCH_SIZE`].
pub fn validate_id_batch(content_type: &ContentType, requested: usize) -> Result<()> {
    if requested > MAX_ID_BATCH_SIZE {
        return Err(VesselError::BatchTooLarge {
            content_type: content_type.clone(),
            requested,
            max: MAX_ID_BATCH_SIZE,
        });
    }
    Ok(())
}
