//! Surface registry
//!
//! Id-addressed lookup over the live player surfaces, for hosts that route
//! commands by identifier instead of holding handles directly. Every
//! addressed operation resolves the id first and fails with
//! `TargetNotFound` when no surface with that id is registered.

use crate::surface::PlayerHandle;
use crate::types::{PlaybackState, RenditionDescriptor, SurfaceId};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Shared directory of live surfaces, keyed by [`SurfaceId`]
#[derive(Default, Clone)]
pub struct SurfaceRegistry {
    surfaces: Arc<RwLock<HashMap<SurfaceId, PlayerHandle>>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface under its own id
    pub fn register(&self, handle: PlayerHandle) {
        let id = handle.id();
        self.surfaces
            .write()
            .expect("registry lock poisoned")
            .insert(id, handle);
        info!(surface_id = %id, "Surface registered");
    }

    /// Remove a surface and detach it. Detaching an already-removed id is a
    /// no-op.
    pub fn remove(&self, id: SurfaceId) {
        let removed = self
            .surfaces
            .write()
            .expect("registry lock poisoned")
            .remove(&id);
        match removed {
            Some(handle) => {
                handle.detach();
                info!(surface_id = %id, "Surface removed and detached");
            }
            None => debug!(surface_id = %id, "Remove ignored; surface not registered"),
        }
    }

    /// Look up a live surface handle
    pub fn get(&self, id: SurfaceId) -> Result<PlayerHandle> {
        self.surfaces
            .read()
            .expect("registry lock poisoned")
            .get(&id)
            .cloned()
            .ok_or(Error::TargetNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.surfaces.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub async fn play(&self, id: SurfaceId) -> Result<()> {
        self.get(id)?.play().await
    }

    pub async fn pause(&self, id: SurfaceId) -> Result<()> {
        self.get(id)?.pause().await
    }

    pub async fn seek_to(&self, id: SurfaceId, position_ms: i64) -> Result<()> {
        self.get(id)?.seek_to(position_ms).await
    }

    pub async fn set_volume(&self, id: SurfaceId, volume: f32) -> Result<()> {
        self.get(id)?.set_volume(volume).await
    }

    pub async fn begin_scrub(&self, id: SurfaceId) -> Result<()> {
        self.get(id)?.begin_scrub().await
    }

    pub async fn end_scrub(&self, id: SurfaceId) -> Result<()> {
        self.get(id)?.end_scrub().await
    }

    pub async fn available_qualities(&self, id: SurfaceId) -> Result<Vec<RenditionDescriptor>> {
        self.get(id)?.available_qualities().await
    }

    pub async fn current_quality(&self, id: SurfaceId) -> Result<RenditionDescriptor> {
        self.get(id)?.current_quality().await
    }

    pub async fn available_captions(&self, id: SurfaceId) -> Result<Vec<RenditionDescriptor>> {
        self.get(id)?.available_captions().await
    }

    pub async fn current_time(&self, id: SurfaceId) -> Result<u64> {
        self.get(id)?.current_time().await
    }

    pub async fn duration(&self, id: SurfaceId) -> Result<u64> {
        self.get(id)?.duration().await
    }

    pub async fn state(&self, id: SurfaceId) -> Result<PlaybackState> {
        self.get(id)?.state().await
    }
}
