//! Plain data crossing port boundaries.

use quickslot_domain::{InstanceId, OwnerId};

/// The currently selected instance and the entity that owns its items.
///
/// Transient: derived from the host's selection, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    pub instance: InstanceId,
    pub owner: OwnerId,
}

impl Selection {
    pub fn new(instance: InstanceId, owner: OwnerId) -> Self {
        Self { instance, owner }
    }
}
