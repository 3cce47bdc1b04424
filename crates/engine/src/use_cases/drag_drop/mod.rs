//! Drag and drop between slots.
//!
//! A gesture starts from an occupied slot (carrying its reference) or from
//! outside the panel (carrying only a stable id) and ends in a drop or a
//! cancel. Every exit returns the controller to `Idle`.

use std::sync::Arc;

use quickslot_domain::{
    ItemReference, PlaceOutcome, SlotLocation, StableId, SwapOutcome, ValidationError,
};
use tokio::sync::Mutex;

use crate::use_cases::layout::{LayoutError, LayoutSession};

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    /// Picked up from a slot
    Slot {
        source: SlotLocation,
        reference: ItemReference,
    },
    /// Dragged in from outside the panel
    External { stable_id: StableId },
}

impl DragPayload {
    pub fn source(&self) -> Option<SlotLocation> {
        match self {
            Self::Slot { source, .. } => Some(*source),
            Self::External { .. } => None,
        }
    }

    pub fn stable_id(&self) -> &StableId {
        match self {
            Self::Slot { reference, .. } => &reference.stable_id,
            Self::External { stable_id } => stable_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragPayload),
}

/// Why a drop did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    NotDragging,
    /// Released outside any slot
    NoTarget,
    /// Released on the slot it came from
    SameSlot,
    /// Target (or source) grid is locked
    Locked,
    /// Target slot does not exist
    InvalidTarget,
    /// The source slot no longer holds the dragged item
    SourceChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Swapped(SwapOutcome),
    Placed(PlaceOutcome),
    Cancelled(CancelReason),
}

pub struct DragDropController {
    session: Arc<LayoutSession>,
    state: Mutex<DragState>,
}

impl DragDropController {
    pub fn new(session: Arc<LayoutSession>) -> Self {
        Self {
            session,
            state: Mutex::new(DragState::Idle),
        }
    }

    pub async fn state(&self) -> DragState {
        self.state.lock().await.clone()
    }

    /// Pick up the item in `source`. Replaces any gesture in progress.
    pub async fn start_from_slot(&self, source: SlotLocation) -> Result<(), LayoutError> {
        let set = self
            .session
            .snapshot()
            .await
            .ok_or(LayoutError::NoActiveLayout)?;
        let reference = set
            .get(source)
            .cloned()
            .ok_or(ValidationError::EmptySlot(source))?;
        *self.state.lock().await = DragState::Dragging(DragPayload::Slot { source, reference });
        Ok(())
    }

    /// Start dragging an item from outside the panel.
    pub async fn start_external(&self, stable_id: StableId) {
        *self.state.lock().await = DragState::Dragging(DragPayload::External { stable_id });
    }

    /// Abandon the gesture. No side effects.
    pub async fn cancel(&self) {
        *self.state.lock().await = DragState::Idle;
    }

    /// Finish the gesture on `target` (`None` when released outside the panel).
    ///
    /// Slot payloads swap with the target; external payloads are placed,
    /// discarding the target's occupant. Locked or missing targets cancel.
    pub async fn drop_on(
        &self,
        target: Option<SlotLocation>,
        override_lock: bool,
    ) -> Result<DropOutcome, LayoutError> {
        let state = std::mem::take(&mut *self.state.lock().await);
        let DragState::Dragging(payload) = state else {
            return Ok(DropOutcome::Cancelled(CancelReason::NotDragging));
        };
        let Some(target) = target else {
            return Ok(self.cancelled(&payload, CancelReason::NoTarget));
        };
        if payload.source() == Some(target) {
            return Ok(self.cancelled(&payload, CancelReason::SameSlot));
        }

        let set = self
            .session
            .snapshot()
            .await
            .ok_or(LayoutError::NoActiveLayout)?;
        let Ok(target_grid) = set.grid(target.grid) else {
            return Ok(self.cancelled(&payload, CancelReason::InvalidTarget));
        };
        if target_grid.check_bounds(target.address).is_err() {
            return Ok(self.cancelled(&payload, CancelReason::InvalidTarget));
        }
        if target_grid.is_locked() && !override_lock {
            return Ok(self.cancelled(&payload, CancelReason::Locked));
        }

        match payload {
            DragPayload::Slot { source, reference } => {
                if set.get(source).map(|r| &r.stable_id) != Some(&reference.stable_id) {
                    return Ok(self.cancelled_at(source, CancelReason::SourceChanged));
                }
                if set.grid(source.grid).is_ok_and(|g| g.is_locked()) && !override_lock {
                    return Ok(self.cancelled_at(source, CancelReason::Locked));
                }
                let outcome = self.session.swap(source, target, override_lock).await?;
                Ok(DropOutcome::Swapped(outcome))
            }
            DragPayload::External { stable_id } => {
                let outcome = self
                    .session
                    .place(target, &stable_id, override_lock)
                    .await?;
                Ok(DropOutcome::Placed(outcome))
            }
        }
    }

    fn cancelled(&self, payload: &DragPayload, reason: CancelReason) -> DropOutcome {
        tracing::debug!(stable_id = %payload.stable_id(), ?reason, "Drop cancelled");
        DropOutcome::Cancelled(reason)
    }

    fn cancelled_at(&self, source: SlotLocation, reason: CancelReason) -> DropOutcome {
        tracing::debug!(source = %source, ?reason, "Drop cancelled");
        DropOutcome::Cancelled(reason)
    }
}
