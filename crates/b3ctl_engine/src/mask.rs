//! Tracking of controls under direct user manipulation.

use crate::error::{PanelError, PanelResult};
use b3ctl_protocol::Control;
use std::collections::BTreeSet;
use tracing::debug;

/// The set of controls currently owned by an edit gesture.
///
/// A control is masked from the moment its gesture starts until the moment
/// it ends. While masked, polled server values must not overwrite it.
/// Several controls may be masked at once (multi-touch).
#[derive(Debug, Default, Clone)]
pub struct EditMaskRegistry {
    masked: BTreeSet<&'static str>,
}

impl EditMaskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a control as being edited.
    pub fn begin_edit(&mut self, control: &Control) {
        if !self.masked.insert(control.id) {
            debug!(control = control.id, "edit already in progress");
        }
    }

    /// Releases a control at the end of its gesture.
    ///
    /// Fails with [`PanelError::UnexpectedState`] if the control was not
    /// masked; other controls are left untouched either way.
    pub fn end_edit(&mut self, control: &Control) -> PanelResult<()> {
        if self.masked.remove(control.id) {
            Ok(())
        } else {
            Err(PanelError::UnexpectedState(format!(
                "edit of {} ended without having started",
                control.id
            )))
        }
    }

    /// Returns true if the control is being edited.
    pub fn is_masked(&self, control: &Control) -> bool {
        self.masked.contains(control.id)
    }

    /// Returns the identifiers of all masked controls.
    pub fn masked(&self) -> Vec<&'static str> {
        self.masked.iter().copied().collect()
    }

    /// Returns true if no control is masked.
    pub fn is_empty(&self) -> bool {
        self.masked.is_empty()
    }
}
