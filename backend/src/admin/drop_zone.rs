//! Drop zones: regions that accept a dropped or picked file for one upload
//! target.
//!
//! Each zone gets a [`ZoneId`] that is never reused, so a zone created at the
//! same position as a removed one is a different zone. Wiring is keyed by that
//! identity: wiring a zone twice keeps the first handler, and a drop fires the
//! attached handler exactly once.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::upload::UploadTarget;

/// A file handed over by a drop or a file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    /// File name as reported by the client, before sanitising.
    pub name: String,
    /// MIME type sent with the upload; must parse as a media type.
    pub content_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    /// Bundle a picked or dropped file.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Identity of one drop zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneId(u64);

/// Receives the file dropped on a wired zone.
#[cfg_attr(test, mockall::automock)]
pub trait DropHandler: Send + Sync {
    /// Called once per delivered drop with the zone's target.
    fn on_drop(&self, target: UploadTarget, file: DroppedFile);
}

/// Result of [`DropZoneRegistry::wire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireOutcome {
    /// The handler is now attached.
    Attached,
    /// The zone already had a handler; the new one was discarded.
    AlreadyWired,
}

/// Why a drop was not delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropZoneError {
    /// The zone was never created or has been unwired.
    #[error("drop zone {0:?} does not exist")]
    UnknownZone(ZoneId),
    /// The zone exists but nothing is listening on it.
    #[error("drop zone {0:?} has no handler attached")]
    NotWired(ZoneId),
    /// The drop carried no files.
    #[error("no file was dropped")]
    NoFiles,
}

/// Zones added and removed by [`DropZoneRegistry::sync`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Newly created and wired zones.
    pub added: Vec<ZoneId>,
    /// Zones whose target went away.
    pub removed: Vec<ZoneId>,
}

struct Zone {
    target: UploadTarget,
    handler: Option<Arc<dyn DropHandler>>,
}

/// All live drop zones.
#[derive(Default)]
pub struct DropZoneRegistry {
    next_id: u64,
    zones: BTreeMap<ZoneId, Zone>,
}

impl std::fmt::Debug for DropZoneRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropZoneRegistry")
            .field("next_id", &self.next_id)
            .field("zones", &self.zones.len())
            .finish()
    }
}

impl DropZoneRegistry {
    /// Registry with no zones.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unwired zone for `target`.
    pub fn create_zone(&mut self, target: UploadTarget) -> ZoneId {
        self.next_id += 1;
        let id = ZoneId(self.next_id);
        self.zones.insert(id, Zone { target, handler: None });
        id
    }

    /// Attach `handler` to `zone` unless one is attached already.
    pub fn wire(
        &mut self,
        zone: ZoneId,
        handler: Arc<dyn DropHandler>,
    ) -> Result<WireOutcome, DropZoneError> {
        let entry = self
            .zones
            .get_mut(&zone)
            .ok_or(DropZoneError::UnknownZone(zone))?;
        if entry.handler.is_some() {
            return Ok(WireOutcome::AlreadyWired);
        }
        entry.handler = Some(handler);
        Ok(WireOutcome::Attached)
    }

    /// Remove a zone together with its handler.
    pub fn unwire(&mut self, zone: ZoneId) -> bool {
        self.zones.remove(&zone).is_some()
    }

    /// Deliver the first dropped file to the zone's handler.
    pub fn drop_files(
        &self,
        zone: ZoneId,
        files: Vec<DroppedFile>,
    ) -> Result<UploadTarget, DropZoneError> {
        let entry = self.zones.get(&zone).ok_or(DropZoneError::UnknownZone(zone))?;
        let handler = entry.handler.as_ref().ok_or(DropZoneError::NotWired(zone))?;
        let mut files = files.into_iter();
        let file = files.next().ok_or(DropZoneError::NoFiles)?;
        let ignored = files.count();
        if ignored > 0 {
            warn!(?zone, ignored, "only the first dropped file is uploaded");
        }
        handler.on_drop(entry.target, file);
        Ok(entry.target)
    }

    /// Zone currently serving `target`.
    #[must_use]
    pub fn zone_for(&self, target: UploadTarget) -> Option<ZoneId> {
        self.zones
            .iter()
            .find(|(_, zone)| zone.target == target)
            .map(|(id, _)| *id)
    }

    /// Number of live zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether no zone is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Make the live zones match `targets`: targets without a zone get a new
    /// wired zone, zones whose target disappeared are unwired. Zones that
    /// already serve a target are left untouched.
    pub fn sync(&mut self, targets: &[UploadTarget], handler: &Arc<dyn DropHandler>) -> SyncReport {
        let mut report = SyncReport::default();
        let stale: Vec<ZoneId> = self
            .zones
            .iter()
            .filter(|(_, zone)| !targets.contains(&zone.target))
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            self.unwire(id);
            report.removed.push(id);
        }
        for target in targets {
            if self.zone_for(*target).is_some() {
                continue;
            }
            let id = self.create_zone(*target);
            if let Ok(WireOutcome::Attached) = self.wire(id, Arc::clone(handler)) {
                report.added.push(id);
            }
        }
        debug!(added = report.added.len(), removed = report.removed.len(), "drop zones synced");
        report
    }
}
