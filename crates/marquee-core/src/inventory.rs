//! Rendition inventory
//!
//! Snapshot of the encoded variants the engine currently exposes, partitioned
//! by renderer kind. The set is replaced wholesale on every "tracks changed"
//! signal; there is no incremental mutation.

use crate::engine::{EngineTrackInfo, RendererKind};
use crate::types::RenditionDescriptor;
use crate::{Error, Result};
use tracing::debug;

/// One captured partition of the engine's track report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventorySnapshot {
    video: Vec<RenditionDescriptor>,
    text: Vec<RenditionDescriptor>,
}

impl InventorySnapshot {
    /// Video renditions in the engine's enumeration order
    pub fn video(&self) -> &[RenditionDescriptor] {
        &self.video
    }

    /// Caption/subtitle tracks in the engine's enumeration order
    pub fn text(&self) -> &[RenditionDescriptor] {
        &self.text
    }
}

/// Holds the most recent inventory snapshot, if any has been captured
#[derive(Debug, Default)]
pub struct RenditionInventory {
    snapshot: Option<InventorySnapshot>,
}

impl RenditionInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot from a fresh engine track report.
    ///
    /// A report with zero renderers of a kind yields an empty sequence for
    /// that kind. Audio and metadata renderers are not surfaced.
    pub fn refresh(&mut self, info: &EngineTrackInfo) -> &InventorySnapshot {
        let mut snapshot = InventorySnapshot::default();

        for renderer in &info.renderers {
            match renderer.kind {
                RendererKind::Video => {
                    for group in &renderer.groups {
                        for format in &group.formats {
                            snapshot.video.push(RenditionDescriptor {
                                kind: crate::types::RenditionKind::Video,
                                width: format.width,
                                height: format.height,
                                bitrate_bps: format.bitrate_bps,
                                language: format.language.clone(),
                                label: format.label.clone(),
                            });
                        }
                    }
                }
                RendererKind::Text => {
                    for group in &renderer.groups {
                        for format in &group.formats {
                            snapshot
                                .text
                                .push(RenditionDescriptor::text(
                                    format.language.clone(),
                                    format.label.clone(),
                                ));
                        }
                    }
                }
                RendererKind::Audio | RendererKind::Metadata => {}
            }
        }

        debug!(
            video = snapshot.video.len(),
            text = snapshot.text.len(),
            "Rendition inventory refreshed"
        );

        &*self.snapshot.insert(snapshot)
    }

    /// Drop the captured snapshot. Called when a new asset load begins.
    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Video renditions of the current snapshot, or `Unavailable` before the
    /// first capture
    pub fn video_renditions(&self) -> Result<&[RenditionDescriptor]> {
        self.snapshot
            .as_ref()
            .map(|s| s.video())
            .ok_or(Error::Unavailable)
    }

    /// Caption tracks of the current snapshot, or `Unavailable` before the
    /// first capture
    pub fn caption_tracks(&self) -> Result<&[RenditionDescriptor]> {
        self.snapshot
            .as_ref()
            .map(|s| s.text())
            .ok_or(Error::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineFormat, EngineRenderer, EngineTrackGroup};

    fn format(width: u32, height: u32, bitrate_bps: u64) -> EngineFormat {
        EngineFormat {
            width,
            height,
            bitrate_bps,
            language: None,
            label: None,
        }
    }

    fn text_format(language: &str, label: &str) -> EngineFormat {
        EngineFormat {
            width: 0,
            height: 0,
            bitrate_bps: 0,
            language: Some(language.to_string()),
            label: Some(label.to_string()),
        }
    }

    fn sample_info() -> EngineTrackInfo {
        EngineTrackInfo {
            renderers: vec![
                EngineRenderer {
                    kind: RendererKind::Video,
                    groups: vec![EngineTrackGroup {
                        formats: vec![
                            format(640, 360, 1_000_000),
                            format(1280, 720, 4_000_000),
                            format(1920, 1080, 8_000_000),
                        ],
                    }],
                },
                EngineRenderer {
                    kind: RendererKind::Audio,
                    groups: vec![EngineTrackGroup {
                        formats: vec![format(0, 0, 128_000)],
                    }],
                },
                EngineRenderer {
                    kind: RendererKind::Text,
                    groups: vec![EngineTrackGroup {
                        formats: vec![text_format("en", "English"), text_format("es", "Español")],
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_unavailable_before_first_refresh() {
        let inventory = RenditionInventory::new();
        assert!(matches!(
            inventory.video_renditions(),
            Err(Error::Unavailable)
        ));
        assert!(matches!(inventory.caption_tracks(), Err(Error::Unavailable)));
    }

    #[test]
    fn test_partition_by_renderer_kind() {
        let mut inventory = RenditionInventory::new();
        inventory.refresh(&sample_info());

        let video = inventory.video_renditions().unwrap();
        assert_eq!(video.len(), 3);
        // Stable within one snapshot: engine enumeration order
        assert_eq!(video[0].height, 360);
        assert_eq!(video[2].height, 1080);

        let text = inventory.caption_tracks().unwrap();
        assert_eq!(text.len(), 2);
        assert_eq!(text[0].language.as_deref(), Some("en"));
    }

    #[test]
    fn test_audio_and_metadata_not_surfaced() {
        let mut inventory = RenditionInventory::new();
        inventory.refresh(&sample_info());

        let video = inventory.video_renditions().unwrap();
        assert!(video.iter().all(|r| r.bitrate_bps >= 1_000_000));
    }

    #[test]
    fn test_zero_renderers_of_a_kind_is_empty_not_error() {
        let mut inventory = RenditionInventory::new();
        inventory.refresh(&EngineTrackInfo::default());

        assert!(inventory.video_renditions().unwrap().is_empty());
        assert!(inventory.caption_tracks().unwrap().is_empty());
    }

    #[test]
    fn test_refresh_replaces_wholesale() {
        let mut inventory = RenditionInventory::new();
        inventory.refresh(&sample_info());

        let smaller = EngineTrackInfo {
            renderers: vec![EngineRenderer {
                kind: RendererKind::Video,
                groups: vec![EngineTrackGroup {
                    formats: vec![format(854, 480, 2_000_000)],
                }],
            }],
        };
        inventory.refresh(&smaller);

        let video = inventory.video_renditions().unwrap();
        assert_eq!(video.len(), 1);
        assert_eq!(video[0].width, 854);
        assert!(inventory.caption_tracks().unwrap().is_empty());
    }

    #[test]
    fn test_clear_returns_to_unavailable() {
        let mut inventory = RenditionInventory::new();
        inventory.refresh(&sample_info());
        assert!(inventory.has_snapshot());

        inventory.clear();
        assert!(!inventory.has_snapshot());
        assert!(matches!(
            inventory.video_renditions(),
            Err(Error::Unavailable)
        ));
    }
}
