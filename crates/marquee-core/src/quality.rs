//! Quality constraint resolution
//!
//! Computes the effective upper bound (resolution + bitrate) for automatic
//! rendition selection from three ranked sources: an explicit user preset,
//! the network-adaptive policy, and the built-in default ceiling. The
//! resolved constraint is pushed into the engine's selection parameters;
//! pushes are idempotent because engines may interrupt playback briefly on
//! reconfiguration.

use crate::engine::PlaybackEngine;
use crate::types::{ConnectivityClass, QualityConstraint, QualitySource};
use crate::{error::CommandKind, Error, Result};
use tracing::debug;

/// Default ceiling when neither a user preset nor the adaptive policy applies
pub const DEFAULT_CEILING: QualityConstraint = QualityConstraint::new(1920, 1080, 8_000_000);

/// Fixed preset table for user-selectable quality labels
pub fn preset_for_label(label: &str) -> Option<QualityConstraint> {
    match label {
        "1080p" => Some(QualityConstraint::new(1920, 1080, 8_000_000)),
        "720p" => Some(QualityConstraint::new(1280, 720, 4_000_000)),
        "480p" => Some(QualityConstraint::new(854, 480, 2_000_000)),
        "360p" => Some(QualityConstraint::new(640, 360, 1_000_000)),
        _ => None,
    }
}

/// Fixed connectivity ceiling table. Total over [`ConnectivityClass`] and
/// monotonic by nominal bandwidth.
pub fn ceiling_for_class(class: ConnectivityClass) -> QualityConstraint {
    match class {
        ConnectivityClass::HighBandwidth => QualityConstraint::new(1920, 1080, 8_000_000),
        ConnectivityClass::Metered => QualityConstraint::new(854, 480, 2_000_000),
        ConnectivityClass::Other => QualityConstraint::new(640, 360, 1_000_000),
    }
}

/// Owns the active quality constraint and its provenance.
///
/// `resolve` is a pure function of its inputs plus the keep-last rule for an
/// unreadable connectivity class; the only side effect is the (deduplicated)
/// push into the engine.
#[derive(Debug)]
pub struct QualityResolver {
    pushed: Option<QualityConstraint>,
    source: QualitySource,
}

impl QualityResolver {
    pub fn new() -> Self {
        Self {
            pushed: None,
            source: QualitySource::Default,
        }
    }

    /// The constraint currently in effect on the engine, if any was pushed
    pub fn active_constraint(&self) -> Option<QualityConstraint> {
        self.pushed
    }

    /// Which source produced the active constraint
    pub fn active_source(&self) -> &QualitySource {
        &self.source
    }

    /// Resolve the effective constraint and push it into the engine's
    /// selection parameters when it differs from the last push.
    ///
    /// Precedence, first match wins:
    /// 1. `selected_label` naming a known preset (unknown labels fall through);
    /// 2. the connectivity ceiling table, when `auto_quality` is on and the
    ///    class is readable — an unreadable class keeps the last constraint
    ///    unchanged, or establishes the default as the first baseline;
    /// 3. the default ceiling.
    pub fn resolve(
        &mut self,
        selected_label: Option<&str>,
        auto_quality: bool,
        connectivity: Option<ConnectivityClass>,
        engine: &mut dyn PlaybackEngine,
    ) -> Result<QualityConstraint> {
        let preset = selected_label.and_then(|label| {
            preset_for_label(label).map(|c| (c, QualitySource::UserFixed(label.to_string())))
        });

        let (constraint, source) = match preset {
            Some(resolved) => resolved,
            None if auto_quality => match connectivity {
                Some(class) => (ceiling_for_class(class), QualitySource::NetworkAdaptive(class)),
                None => {
                    if let Some(current) = self.pushed {
                        debug!(constraint = %current, "Connectivity unreadable; keeping active constraint");
                        return Ok(current);
                    }
                    (DEFAULT_CEILING, QualitySource::Default)
                }
            },
            None => (DEFAULT_CEILING, QualitySource::Default),
        };

        if self.pushed != Some(constraint) {
            engine
                .apply_selection(&constraint)
                .map_err(|e| Error::CommandFailed {
                    kind: CommandKind::Quality,
                    message: e.to_string(),
                })?;
            self.pushed = Some(constraint);
            debug!(constraint = %constraint, source = ?source, "Selection constraint pushed");
        }

        self.source = source;
        Ok(constraint)
    }
}

impl Default for QualityResolver {
    fn default() -> Self {
        Self::new()
    }
}
