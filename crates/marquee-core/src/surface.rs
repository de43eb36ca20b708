//! Player surface - control task owning all playback state
//!
//! One surface binds a catalog asset to a playback engine and owns every
//! piece of mutable state: the rendition inventory, the quality resolver,
//! the state machine, and the observer bus. All mutation runs serialized on
//! a single control task; host commands, engine callbacks, and connectivity
//! signals are marshaled onto it over channels. Commands resolve or reject
//! through oneshot completions and never block the caller.
//!
//! Teardown releases the engine exactly once; anything arriving after that
//! fails fast with `Detached`.

use crate::{
    catalog::{Catalog, Video},
    connectivity::{ConnectivityMonitor, ConnectivitySource},
    engine::{EngineEvent, PlaybackEngine},
    error::CommandKind,
    events::{Observer, ObserverBus, ObserverId, PlayerEvent},
    inventory::RenditionInventory,
    quality::QualityResolver,
    state::PlaybackStateMachine,
    types::{PlaybackState, PlayerOptions, RenditionDescriptor, SelectedQuality, SurfaceId},
    Error, Result,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Transport commands executed against the engine
#[derive(Debug, Clone, Copy, PartialEq)]
enum TransportCommand {
    Play,
    Pause,
    SeekTo(i64),
    SetVolume(f32),
    /// User grabbed the scrubber: pause while tracking
    BeginScrub,
    /// User released the scrubber: resume
    EndScrub,
}

/// One host-settable configuration input
#[derive(Debug, Clone)]
enum ConfigChange {
    AccountId(String),
    VideoId(String),
    PolicyKey(String),
    InitialQuality(Option<String>),
    AutoQuality(bool),
    CaptionsEnabled(bool),
    CaptionsLanguage(String),
    ShowControls(bool),
}

/// Everything marshaled onto the control task
enum ControlMsg {
    Transport(TransportCommand, oneshot::Sender<Result<()>>),
    QueryQualities(oneshot::Sender<Result<Vec<RenditionDescriptor>>>),
    QueryCurrentQuality(oneshot::Sender<Result<RenditionDescriptor>>),
    QueryCaptions(oneshot::Sender<Result<Vec<RenditionDescriptor>>>),
    QueryTime(oneshot::Sender<Result<u64>>),
    QueryDuration(oneshot::Sender<Result<u64>>),
    QueryState(oneshot::Sender<Result<PlaybackState>>),
    Configure(ConfigChange),
    Subscribe(Observer, oneshot::Sender<Result<ObserverId>>),
    Unsubscribe(ObserverId),
    AssetResolved {
        generation: u64,
        result: Result<Video>,
    },
    Detach,
}

/// Async handle to one playback surface.
///
/// Cheap to clone; every method is a queued request against the control
/// task. After `detach`, every request fails with [`Error::Detached`].
#[derive(Clone)]
pub struct PlayerHandle {
    id: SurfaceId,
    tx: mpsc::UnboundedSender<ControlMsg>,
}

impl PlayerHandle {
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T>>) -> ControlMsg,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send(build(reply_tx)).map_err(|_| Error::Detached)?;
        reply_rx.await.map_err(|_| Error::Detached)?
    }

    async fn transport(&self, command: TransportCommand) -> Result<()> {
        self.request(|reply| ControlMsg::Transport(command, reply))
            .await
    }

    pub async fn play(&self) -> Result<()> {
        self.transport(TransportCommand::Play).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.transport(TransportCommand::Pause).await
    }

    /// Seek to a position in milliseconds; clamped into `[0, duration]`
    pub async fn seek_to(&self, position_ms: i64) -> Result<()> {
        self.transport(TransportCommand::SeekTo(position_ms)).await
    }

    /// Volume in `[0.0, 1.0]`; out-of-range values are clamped
    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        self.transport(TransportCommand::SetVolume(volume)).await
    }

    /// User started dragging the scrubber; pauses playback while tracking
    pub async fn begin_scrub(&self) -> Result<()> {
        self.transport(TransportCommand::BeginScrub).await
    }

    /// User released the scrubber; resumes playback
    pub async fn end_scrub(&self) -> Result<()> {
        self.transport(TransportCommand::EndScrub).await
    }

    /// Video renditions of the current inventory snapshot
    pub async fn available_qualities(&self) -> Result<Vec<RenditionDescriptor>> {
        self.request(ControlMsg::QueryQualities).await
    }

    /// The format currently in effect on the video renderer
    pub async fn current_quality(&self) -> Result<RenditionDescriptor> {
        self.request(ControlMsg::QueryCurrentQuality).await
    }

    /// Caption tracks of the current inventory snapshot
    pub async fn available_captions(&self) -> Result<Vec<RenditionDescriptor>> {
        self.request(ControlMsg::QueryCaptions).await
    }

    /// Current playback position in milliseconds
    pub async fn current_time(&self) -> Result<u64> {
        self.request(ControlMsg::QueryTime).await
    }

    /// Asset duration in milliseconds, once known
    pub async fn duration(&self) -> Result<u64> {
        self.request(ControlMsg::QueryDuration).await
    }

    /// Canonical playback state
    pub async fn state(&self) -> Result<PlaybackState> {
        self.request(ControlMsg::QueryState).await
    }

    /// Register an observer, invoked on the control task for every event
    pub async fn subscribe<F>(&self, observer: F) -> Result<ObserverId>
    where
        F: Fn(&PlayerEvent) + Send + 'static,
    {
        self.request(|reply| ControlMsg::Subscribe(Box::new(observer), reply))
            .await
    }

    pub fn unsubscribe(&self, id: ObserverId) -> Result<()> {
        self.tx
            .send(ControlMsg::Unsubscribe(id))
            .map_err(|_| Error::Detached)
    }

    fn configure(&self, change: ConfigChange) -> Result<()> {
        self.tx
            .send(ControlMsg::Configure(change))
            .map_err(|_| Error::Detached)
    }

    /// Set the catalog account; triggers a load attempt once the catalog
    /// context and video id are all present
    pub fn set_account_id(&self, account_id: impl Into<String>) -> Result<()> {
        self.configure(ConfigChange::AccountId(account_id.into()))
    }

    /// Set the video identifier; triggers a load attempt
    pub fn set_video_id(&self, video_id: impl Into<String>) -> Result<()> {
        self.configure(ConfigChange::VideoId(video_id.into()))
    }

    /// Set the catalog policy key; triggers a load attempt
    pub fn set_policy_key(&self, policy_key: impl Into<String>) -> Result<()> {
        self.configure(ConfigChange::PolicyKey(policy_key.into()))
    }

    /// Fix the quality to a preset label, or clear the override with `None`;
    /// triggers constraint resolution
    pub fn set_initial_quality(&self, label: Option<String>) -> Result<()> {
        self.configure(ConfigChange::InitialQuality(label))
    }

    /// Toggle the network-adaptive quality policy; triggers constraint
    /// resolution
    pub fn set_auto_quality(&self, enabled: bool) -> Result<()> {
        self.configure(ConfigChange::AutoQuality(enabled))
    }

    pub fn set_captions_enabled(&self, enabled: bool) -> Result<()> {
        self.configure(ConfigChange::CaptionsEnabled(enabled))
    }

    /// Preferred caption language, pushed into the engine's text selection
    pub fn set_captions_language(&self, language: impl Into<String>) -> Result<()> {
        self.configure(ConfigChange::CaptionsLanguage(language.into()))
    }

    pub fn set_show_controls(&self, visible: bool) -> Result<()> {
        self.configure(ConfigChange::ShowControls(visible))
    }

    /// Tear the surface down. Idempotent; the engine is released exactly
    /// once and every later request fails with `Detached`.
    pub fn detach(&self) {
        let _ = self.tx.send(ControlMsg::Detach);
    }
}

/// Control-task state for one playback surface
pub struct PlayerSurface {
    id: SurfaceId,
    engine: Box<dyn PlaybackEngine>,
    catalog: Arc<dyn Catalog>,
    monitor: ConnectivityMonitor,
    options: PlayerOptions,
    inventory: RenditionInventory,
    resolver: QualityResolver,
    machine: PlaybackStateMachine,
    bus: ObserverBus,
    selected: Option<SelectedQuality>,
    duration_ms: Option<u64>,
    /// Monotonic floor for emitted progress values within one session
    progress_floor_ms: u64,
    /// Discards catalog resolutions that a newer load superseded
    load_generation: u64,
    msg_tx: mpsc::UnboundedSender<ControlMsg>,
    released: bool,
}

impl PlayerSurface {
    /// Spawn the control task and return its handle.
    ///
    /// `engine_events` and `network_signals` are the marshaling channels for
    /// engine callbacks and platform connectivity signals. The control loop
    /// drains engine events before host commands, so an awaited command also
    /// fences every event sent before it.
    pub fn spawn(
        engine: Box<dyn PlaybackEngine>,
        catalog: Arc<dyn Catalog>,
        connectivity: Arc<dyn ConnectivitySource>,
        engine_events: mpsc::UnboundedReceiver<EngineEvent>,
        network_signals: mpsc::UnboundedReceiver<()>,
        options: PlayerOptions,
    ) -> PlayerHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SurfaceId::new();

        let surface = PlayerSurface {
            id,
            engine,
            catalog,
            monitor: ConnectivityMonitor::new(connectivity),
            options,
            inventory: RenditionInventory::new(),
            resolver: QualityResolver::new(),
            machine: PlaybackStateMachine::new(),
            bus: ObserverBus::new(),
            selected: None,
            duration_ms: None,
            progress_floor_ms: 0,
            load_generation: 0,
            msg_tx: tx.clone(),
            released: false,
        };

        info!(surface_id = %id, "Player surface spawned");
        tokio::spawn(surface.run(rx, engine_events, network_signals));

        PlayerHandle { id, tx }
    }

    async fn run(
        mut self,
        mut control: mpsc::UnboundedReceiver<ControlMsg>,
        mut engine_events: mpsc::UnboundedReceiver<EngineEvent>,
        mut network_signals: mpsc::UnboundedReceiver<()>,
    ) {
        self.initialize();

        let mut engine_closed = false;
        let mut network_closed = false;

        loop {
            tokio::select! {
                // Engine callbacks and connectivity signals drain ahead of
                // host commands; awaiting a command therefore fences them.
                biased;

                event = engine_events.recv(), if !engine_closed => match event {
                    Some(event) => self.handle_engine_event(event),
                    None => engine_closed = true,
                },

                signal = network_signals.recv(), if !network_closed => match signal {
                    Some(()) => self.handle_network_available(),
                    None => network_closed = true,
                },

                msg = control.recv() => match msg {
                    Some(ControlMsg::Detach) | None => break,
                    Some(msg) => self.handle_msg(msg),
                },
            }
        }

        self.release_engine();
    }

    /// Apply the initial options: baseline constraint, caption language, and
    /// a load attempt when the asset is already fully addressed
    fn initialize(&mut self) {
        let language = self.options.captions_language.clone();
        if let Err(e) = self.engine.set_preferred_text_language(&language) {
            warn!(error = %e, "Engine rejected caption language");
        }
        self.reresolve();
        self.try_load();
    }

    fn handle_msg(&mut self, msg: ControlMsg) {
        match msg {
            ControlMsg::Transport(command, reply) => {
                let _ = reply.send(self.handle_transport(command));
            }
            ControlMsg::QueryQualities(reply) => {
                let _ = reply.send(self.inventory.video_renditions().map(<[_]>::to_vec));
            }
            ControlMsg::QueryCurrentQuality(reply) => {
                let result = self
                    .engine
                    .selected_video_format()
                    .map(|format| {
                        let mut descriptor =
                            RenditionDescriptor::video(format.width, format.height, format.bitrate_bps);
                        descriptor.language = format.language;
                        descriptor.label = format.label;
                        descriptor
                    })
                    .ok_or(Error::Unavailable);
                let _ = reply.send(result);
            }
            ControlMsg::QueryCaptions(reply) => {
                let _ = reply.send(self.inventory.caption_tracks().map(<[_]>::to_vec));
            }
            ControlMsg::QueryTime(reply) => {
                let _ = reply.send(Ok(self.engine.current_position()));
            }
            ControlMsg::QueryDuration(reply) => {
                let result = self
                    .duration_ms
                    .or_else(|| self.engine.duration())
                    .ok_or(Error::Unavailable);
                let _ = reply.send(result);
            }
            ControlMsg::QueryState(reply) => {
                let _ = reply.send(Ok(self.machine.state().clone()));
            }
            ControlMsg::Configure(change) => self.apply_config(change),
            ControlMsg::Subscribe(observer, reply) => {
                let _ = reply.send(Ok(self.bus.subscribe(observer)));
            }
            ControlMsg::Unsubscribe(id) => {
                self.bus.unsubscribe(id);
            }
            ControlMsg::AssetResolved { generation, result } => {
                self.handle_asset_resolved(generation, result);
            }
            ControlMsg::Detach => unreachable!("handled by the control loop"),
        }
    }

    fn handle_transport(&mut self, command: TransportCommand) -> Result<()> {
        match command {
            TransportCommand::Play | TransportCommand::EndScrub => {
                self.engine.play().map_err(|e| Error::CommandFailed {
                    kind: CommandKind::Play,
                    message: e.0,
                })?;
                if let Some(state) = self.machine.play_requested() {
                    self.emit(PlayerEvent::StateChanged { state });
                }
                Ok(())
            }
            TransportCommand::Pause | TransportCommand::BeginScrub => {
                self.engine.pause().map_err(|e| Error::CommandFailed {
                    kind: CommandKind::Pause,
                    message: e.0,
                })?;
                if let Some(state) = self.machine.pause_requested() {
                    self.emit(PlayerEvent::StateChanged { state });
                }
                Ok(())
            }
            TransportCommand::SeekTo(position_ms) => self.seek_to(position_ms),
            TransportCommand::SetVolume(volume) => {
                let volume = volume.clamp(0.0, 1.0);
                self.engine
                    .set_volume(volume)
                    .map_err(|e| Error::CommandFailed {
                        kind: CommandKind::Volume,
                        message: e.0,
                    })
            }
        }
    }

    /// Clamp into `[0, duration]` and seek. Does not change the canonical
    /// state; emits one progress notification at the clamped target.
    fn seek_to(&mut self, position_ms: i64) -> Result<()> {
        let target = position_ms.max(0) as u64;
        let duration = self.duration_ms.or_else(|| self.engine.duration());
        let clamped = match duration {
            Some(duration_ms) => target.min(duration_ms),
            None => target,
        };

        self.engine
            .seek_to(clamped)
            .map_err(|e| Error::CommandFailed {
                kind: CommandKind::Seek,
                message: e.0,
            })?;

        self.progress_floor_ms = clamped;
        self.emit(PlayerEvent::Progress {
            current_time_ms: clamped,
        });
        Ok(())
    }

    fn apply_config(&mut self, change: ConfigChange) {
        debug!(surface_id = %self.id, change = ?change, "Configuration change");
        match change {
            ConfigChange::AccountId(account_id) => {
                self.options.account_id = Some(account_id);
                self.try_load();
            }
            ConfigChange::VideoId(video_id) => {
                self.options.video_id = Some(video_id);
                self.try_load();
            }
            ConfigChange::PolicyKey(policy_key) => {
                self.options.policy_key = Some(policy_key);
                self.try_load();
            }
            ConfigChange::InitialQuality(label) => {
                self.options.initial_quality = label;
                self.reresolve();
            }
            ConfigChange::AutoQuality(enabled) => {
                self.options.auto_quality = enabled;
                self.reresolve();
            }
            ConfigChange::CaptionsEnabled(enabled) => {
                self.options.captions_enabled = enabled;
            }
            ConfigChange::CaptionsLanguage(language) => {
                self.options.captions_language = language.clone();
                if let Err(e) = self.engine.set_preferred_text_language(&language) {
                    warn!(error = %e, "Engine rejected caption language");
                }
            }
            ConfigChange::ShowControls(visible) => {
                self.options.show_controls = visible;
            }
        }
    }

    /// Re-run constraint resolution against the current options and
    /// connectivity. Idempotent at the engine boundary.
    fn reresolve(&mut self) {
        let label = self.options.initial_quality.clone();
        let class = self.monitor.current_class();
        if let Err(e) = self.resolver.resolve(
            label.as_deref(),
            self.options.auto_quality,
            class,
            self.engine.as_mut(),
        ) {
            warn!(error = %e, "Constraint resolution failed");
        }
    }

    /// Kick off asset resolution when the catalog context and video id are
    /// all present; withheld otherwise.
    fn try_load(&mut self) {
        let (Some(account_id), Some(policy_key), Some(video_id)) = (
            self.options.account_id.clone(),
            self.options.policy_key.clone(),
            self.options.video_id.clone(),
        ) else {
            debug!(surface_id = %self.id, "Load withheld; catalog context incomplete");
            return;
        };

        self.load_generation += 1;
        let generation = self.load_generation;

        // New session: progress restarts at zero, inventory and quality
        // snapshot no longer describe the outgoing asset
        self.duration_ms = None;
        self.progress_floor_ms = 0;
        self.selected = None;
        self.inventory.clear();

        if let Some(state) = self.machine.begin_loading() {
            self.emit(PlayerEvent::StateChanged { state });
        }

        info!(surface_id = %self.id, video_id = %video_id, "Resolving catalog asset");

        let catalog = Arc::clone(&self.catalog);
        let tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let result = catalog.find_video(&account_id, &policy_key, &video_id).await;
            let _ = tx.send(ControlMsg::AssetResolved { generation, result });
        });
    }

    fn handle_asset_resolved(&mut self, generation: u64, result: Result<Video>) {
        if generation != self.load_generation {
            debug!(generation, "Stale asset resolution discarded");
            return;
        }

        match result {
            Ok(video) => {
                info!(video_id = %video.id, sources = video.sources.len(), "Asset resolved");
                if let Err(e) = self.engine.load(&video) {
                    self.fail_playback(e.0);
                    return;
                }
                // Restore the active constraint policy on the fresh
                // selection parameters; a no-op when nothing changed
                self.reresolve();
            }
            Err(e) => self.fail_playback(e.to_string()),
        }
    }

    /// Terminal playback fault: one state transition, one error notification
    fn fail_playback(&mut self, message: String) {
        warn!(surface_id = %self.id, error = %message, "Playback fault");
        if self.machine.on_error(message.clone()).is_some() {
            self.emit(PlayerEvent::Error { message });
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Ready => {
                let was_buffering = self.machine.is_buffering();
                if let Some(state) = self.machine.on_ready() {
                    if was_buffering {
                        self.emit(PlayerEvent::Buffering {
                            is_buffering: false,
                        });
                    } else {
                        self.emit(PlayerEvent::StateChanged { state });
                    }
                }
                self.refresh_tracks();
            }
            EngineEvent::BufferStart => {
                if self.machine.on_buffer_start().is_some() {
                    self.emit(PlayerEvent::Buffering { is_buffering: true });
                }
            }
            EngineEvent::BufferEnd => {
                if self.machine.on_buffer_end().is_some() {
                    self.emit(PlayerEvent::Buffering {
                        is_buffering: false,
                    });
                }
            }
            EngineEvent::Progress { current_time_ms } => {
                let current_time_ms = current_time_ms.max(self.progress_floor_ms);
                self.progress_floor_ms = current_time_ms;
                self.emit(PlayerEvent::Progress { current_time_ms });
            }
            EngineEvent::DurationChanged { duration_ms } => {
                self.duration_ms = Some(duration_ms);
                self.emit(PlayerEvent::DurationChanged { duration_ms });
            }
            EngineEvent::TracksChanged => {
                // Inventory change is a resolver input
                self.reresolve();
                // Inventory must be current before observers interpret a
                // quality change
                self.refresh_tracks();
                self.notify_quality_change();
            }
            EngineEvent::PlaybackEnded => {
                if let Some(state) = self.machine.on_ended() {
                    self.emit(PlayerEvent::StateChanged { state });
                }
            }
            EngineEvent::Error { message } => self.fail_playback(message),
        }
    }

    fn handle_network_available(&mut self) {
        if self.monitor.on_network_available(self.options.auto_quality) {
            self.reresolve();
        }
    }

    /// Capture a fresh inventory snapshot and announce it when it carries at
    /// least one video rendition
    fn refresh_tracks(&mut self) {
        let Some(info) = self.engine.track_info() else {
            return;
        };
        let qualities = self.inventory.refresh(&info).video().to_vec();
        if !qualities.is_empty() {
            self.emit(PlayerEvent::AvailableQualities { qualities });
        }
    }

    /// Emit `QualityChanged` when the renderer's format moved away from the
    /// snapshot; the snapshot updates together with the emission
    fn notify_quality_change(&mut self) {
        let Some(format) = self.engine.selected_video_format() else {
            return;
        };
        let current = SelectedQuality {
            width: format.width,
            height: format.height,
            bitrate_bps: format.bitrate_bps,
        };
        if self.selected == Some(current) {
            return;
        }
        self.selected = Some(current);

        let mut quality = current.descriptor();
        quality.language = format.language;
        quality.label = format.label;
        self.emit(PlayerEvent::QualityChanged { quality });
    }

    fn emit(&self, event: PlayerEvent) {
        self.bus.notify(&event);
    }

    fn release_engine(&mut self) {
        if !self.released {
            self.engine.release();
            self.released = true;
            info!(surface_id = %self.id, "Player surface detached; engine released");
        }
    }
}
