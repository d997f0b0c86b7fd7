//! Viewport controller: pan and zoom for one image inside one container.
//!
//! The controller owns the zoom scale, the pan offset and the active gesture,
//! translates host input into changes of that state, and re-applies the
//! resulting [`Transform`] to the image element after every change.
//!
//! ## Loading
//!
//! [`ViewportController::load`] is split in two around the host's asynchronous
//! decode:
//!
//! 1. `load(bytes)` checks the blob header, swaps the resource URL (revoking the
//!    previous one), assigns it to the image and shows the container. It returns
//!    a [`LoadTicket`].
//! 2. When the host finishes decoding, it calls [`ViewportController::complete_load`]
//!    with that ticket, which measures both elements and centers the image. On a
//!    decode failure it calls [`ViewportController::fail_load`] instead.
//!
//! Zoom and pan requests may arrive at any point in between; centering is an
//! absolute re-set of the offset, so their order does not matter. Tickets from
//! superseded loads are rejected.


use imgpan_input::{Handled, Point, PointerInput, Size, TouchInput, TouchPoint, WheelInput};

use crate::config::ViewportConfig;
use crate::error::{ConfigurationError, LoadError};
use crate::gesture::{Gesture, GestureTracker, PinchStep};
use crate::host::{ContainerElement, ImageElement, ResourceLoader};
use crate::probe::{ImageInfo, probe};
use crate::zoom_math::{Transform, centered_offset, clamp_scale, fit_scale};

/// Identifies one call to [`ViewportController::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Mutable viewport state. Only the controller writes to it.
#[derive(Debug, Clone)]
pub struct ViewportState {
    /// Current zoom factor, always within `[min_scale, max_scale]`
    pub scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub step_scale: f32,
    /// Offset of the image's top-left corner inside the container
    pub position: Point,
    /// URL currently assigned to the image element
    pub source_url: Option<String>,
    gesture: GestureTracker,
}

impl ViewportState {
    fn from_config(config: &ViewportConfig) -> Self {
        Self {
            scale: config.scale,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            step_scale: config.step_scale,
            position: Point::zero(),
            source_url: None,
            gesture: GestureTracker::new(),
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.scale, self.position.x, self.position.y)
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    /// Touch contacts recorded for the active pinch (empty unless pinching).
    pub fn active_touches(&self) -> &[TouchPoint] {
        self.gesture.active_touches()
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture.state()
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingLoad {
    ticket: LoadTicket,
    info: ImageInfo,
}

/// Builder for [`ViewportController`].
///
/// All three host handles are required; a missing one is reported by
/// [`ViewportControllerBuilder::build`].
#[derive(Debug)]
pub struct ViewportControllerBuilder<C, I, R> {
    container: Option<C>,
    image: Option<I>,
    loader: Option<R>,
    config: ViewportConfig,
}

impl<C, I, R> ViewportControllerBuilder<C, I, R>
where
    C: ContainerElement,
    I: ImageElement,
    R: ResourceLoader,
{
    pub fn new() -> Self {
        Self {
            container: None,
            image: None,
            loader: None,
            config: ViewportConfig::default(),
        }
    }

    /// Set the bounding container.
    pub fn container(mut self, container: C) -> Self {
        self.container = Some(container);
        self
    }

    /// Set the image element.
    pub fn image(mut self, image: I) -> Self {
        self.image = Some(image);
        self
    }

    /// Set the resource loader used to turn blobs into URLs.
    pub fn loader(mut self, loader: R) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Set the zoom configuration (defaults otherwise).
    pub fn config(mut self, config: ViewportConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the wiring and create the controller.
    pub fn build(self) -> Result<ViewportController<C, I, R>, ConfigurationError> {
        let container = self.container.ok_or(ConfigurationError::MissingContainer)?;
        let image = self.image.ok_or(ConfigurationError::MissingImage)?;
        let loader = self.loader.ok_or(ConfigurationError::MissingLoader)?;
        let config = self.config.validate()?;

        log::debug!(
            "Viewport created: scale {} in [{}, {}], step {}",
            config.scale,
            config.min_scale,
            config.max_scale,
            config.step_scale
        );

        Ok(ViewportController {
            state: ViewportState::from_config(&config),
            initial_scale: config.scale,
            container,
            image,
            loader,
            pending: None,
            loaded: None,
            next_ticket: 0,
        })
    }
}

impl<C, I, R> Default for ViewportControllerBuilder<C, I, R>
where
    C: ContainerElement,
    I: ImageElement,
    R: ResourceLoader,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Pan/zoom controller bound to one container and one image element.
#[derive(Debug)]
pub struct ViewportController<C, I, R> {
    state: ViewportState,
    initial_scale: f32,
    container: C,
    image: I,
    loader: R,
    /// Load waiting for the host's decode callback
    pending: Option<PendingLoad>,
    /// Image currently displayed and centered
    loaded: Option<ImageInfo>,
    next_ticket: u64,
}

impl<C, I, R> ViewportController<C, I, R>
where
    C: ContainerElement,
    I: ImageElement,
    R: ResourceLoader,
{
    pub fn builder() -> ViewportControllerBuilder<C, I, R> {
        ViewportControllerBuilder::new()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn scale(&self) -> f32 {
        self.state.scale
    }

    pub fn position(&self) -> Point {
        self.state.position
    }

    pub fn transform(&self) -> Transform {
        self.state.transform()
    }

    pub fn gesture(&self) -> Gesture {
        self.state.gesture()
    }

    pub fn source_url(&self) -> Option<&str> {
        self.state.source_url.as_deref()
    }

    /// True between `load` and its completion or failure.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Ticket of the load waiting for its decode callback.
    pub fn pending_ticket(&self) -> Option<LoadTicket> {
        self.pending.map(|p| p.ticket)
    }

    /// Header info of the image currently displayed, once its load completed.
    pub fn loaded_image(&self) -> Option<ImageInfo> {
        self.loaded
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn image(&self) -> &I {
        &self.image
    }

    pub fn loader(&self) -> &R {
        &self.loader
    }

    /// Mutable access for hosts that need to re-layout their elements.
    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    pub fn image_mut(&mut self) -> &mut I {
        &mut self.image
    }

    pub fn loader_mut(&mut self) -> &mut R {
        &mut self.loader
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Start displaying a new image blob.
    ///
    /// Empty blobs and corrupt headers of known formats fail before anything on
    /// the page changes. Formats not known here are handed to the host, whose
    /// decode result arrives through [`Self::complete_load`] or [`Self::fail_load`].
    /// On success the previous URL (if any) is revoked, the new one assigned and
    /// the container shown; centering waits for [`Self::complete_load`].
    pub fn load(&mut self, bytes: &[u8]) -> Result<LoadTicket, LoadError> {
        let info = probe(bytes).inspect_err(|e| log::warn!("Rejected image blob: {}", e))?;
        let url = self.loader.create_url(bytes, info.mime)?;

        if let Some(previous) = self.state.source_url.take() {
            log::debug!("Revoking previous image URL {}", previous);
            self.loader.revoke_url(&previous);
        }

        self.image.set_source(Some(&url));
        self.state.source_url = Some(url);
        self.container.set_visible(true);

        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        if let Some(superseded) = self.pending.replace(PendingLoad { ticket, info }) {
            log::debug!("Load {} superseded by {}", superseded.ticket.0, ticket.0);
        }
        self.loaded = None;

        match info.dimensions {
            Some((width, height)) => {
                log::info!("Loading {}x{} {} image (load {})", width, height, info.mime, ticket.0)
            }
            None => log::info!("Loading {} image of unknown size (load {})", info.mime, ticket.0),
        }
        Ok(ticket)
    }

    /// Decode-completion callback: measure and center the image.
    pub fn complete_load(&mut self, ticket: LoadTicket) -> Result<(), LoadError> {
        let pending = self.take_pending(ticket)?;

        self.loaded = Some(pending.info);
        self.center();

        log::info!(
            "Load {} complete, centered at ({:.1}, {:.1})",
            ticket.0,
            self.state.position.x,
            self.state.position.y
        );
        Ok(())
    }

    /// Decode-failure callback: hide the container and release the URL.
    ///
    /// Returns the error to surface to the embedder. A stale ticket changes nothing.
    pub fn fail_load(&mut self, ticket: LoadTicket) -> LoadError {
        if let Err(stale) = self.take_pending(ticket) {
            return stale;
        }

        self.container.set_visible(false);
        self.image.set_source(None);
        if let Some(url) = self.state.source_url.take() {
            self.loader.revoke_url(&url);
        }
        self.loaded = None;

        log::warn!("Load {} failed to decode", ticket.0);
        LoadError::DecodeFailed
    }

    fn take_pending(&mut self, ticket: LoadTicket) -> Result<PendingLoad, LoadError> {
        match self.pending {
            Some(pending) if pending.ticket == ticket => {
                self.pending = None;
                Ok(pending)
            }
            _ => {
                let current = self.next_ticket;
                log::debug!("Ignoring stale load {} (current {})", ticket.0, current);
                Err(LoadError::Stale {
                    ticket: ticket.0,
                    current,
                })
            }
        }
    }

    /// Laid-out image size, falling back to the natural size if the host
    /// has not laid it out and the header told us one.
    fn image_size(&self) -> Size {
        let measured = self.image.size();
        if !measured.is_empty() {
            return measured;
        }
        self.loaded
            .and_then(|info| info.natural_size())
            .unwrap_or(measured)
    }

    fn center(&mut self) {
        let offset = centered_offset(self.container.size(), self.image_size());
        self.set_position(offset);
    }

    // ------------------------------------------------------------------
    // Zoom and pan
    // ------------------------------------------------------------------

    /// Step the scale up by `step_scale`, clamped at `max_scale`.
    pub fn zoom_in(&mut self) {
        self.set_scale(self.state.scale + self.state.step_scale);
    }

    /// Step the scale down by `step_scale`, clamped at `min_scale`.
    pub fn zoom_out(&mut self) {
        self.set_scale(self.state.scale - self.state.step_scale);
    }

    /// Set the scale, silently clamped into the configured bounds.
    pub fn set_scale(&mut self, target: f32) {
        let scale = clamp_scale(target, self.state.min_scale, self.state.max_scale);
        if scale != target {
            log::trace!("Scale {} clamped to {}", target, scale);
        }
        self.state.scale = scale;
        self.apply_transform();
    }

    /// Move the image by `(dx, dy)` pixels. Pan range is unbounded.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let moved = self.state.transform().pan_by(dx, dy);
        self.set_position(moved.position());
    }

    fn set_position(&mut self, position: Point) {
        self.state.position = position;
        self.apply_transform();
    }

    /// Scale the displayed image to fit the container and re-center it.
    ///
    /// Returns `false` (and changes nothing) until a load has completed.
    pub fn fit_to_container(&mut self) -> bool {
        if self.loaded.is_none() {
            return false;
        }
        let Some(scale) = fit_scale(self.image_size(), self.container.size()) else {
            log::debug!("Fit skipped: elements not measurable");
            return false;
        };

        self.state.scale = clamp_scale(scale, self.state.min_scale, self.state.max_scale);
        self.center();
        true
    }

    /// Restore the initial scale and re-center the displayed image.
    pub fn reset(&mut self) {
        self.state.scale = self.initial_scale;
        if self.loaded.is_some() {
            self.center();
        } else {
            self.apply_transform();
        }
    }

    fn apply_transform(&mut self) {
        let transform = self.state.transform();
        log::trace!(
            "Transform: scale {:.2}, offset ({:.1}, {:.1})",
            transform.scale,
            transform.x,
            transform.y
        );
        self.image.apply_transform(&transform);
    }

    // ------------------------------------------------------------------
    // Input handlers
    // ------------------------------------------------------------------

    /// Ctrl/Meta + wheel zooms; a plain wheel scroll passes through.
    pub fn handle_wheel(&mut self, input: &WheelInput) -> Handled {
        if !input.modifiers.is_zoom() {
            return Handled::Ignored;
        }

        if input.delta_y < 0.0 {
            self.zoom_in();
        } else if input.delta_y > 0.0 {
            self.zoom_out();
        }
        Handled::Consumed
    }

    pub fn handle_pointer_down(&mut self, input: &PointerInput) -> Handled {
        if self.state.gesture.pointer_down(input) {
            Handled::Consumed
        } else {
            Handled::Ignored
        }
    }

    pub fn handle_pointer_move(&mut self, input: &PointerInput) -> Handled {
        match self.state.gesture.pointer_move(input.position) {
            Some((dx, dy)) => {
                self.pan(dx, dy);
                Handled::Consumed
            }
            None => Handled::Ignored,
        }
    }

    pub fn handle_pointer_up(&mut self, _input: &PointerInput) -> Handled {
        if self.state.gesture.pointer_up() {
            Handled::Consumed
        } else {
            Handled::Ignored
        }
    }

    /// Pointer cancel or leave: end any drag without further movement.
    pub fn handle_pointer_cancel(&mut self) -> Handled {
        if self.state.gesture.pointer_up() {
            Handled::Consumed
        } else {
            Handled::Ignored
        }
    }

    pub fn handle_touch_start(&mut self, input: &TouchInput) -> Handled {
        if self.state.gesture.touch_start(input) {
            Handled::Consumed
        } else {
            Handled::Ignored
        }
    }

    /// Two-finger move: one discrete zoom step per event, direction only.
    pub fn handle_touch_move(&mut self, input: &TouchInput) -> Handled {
        match self.state.gesture.touch_move(input) {
            Some(PinchStep::ZoomIn) => self.zoom_in(),
            Some(PinchStep::ZoomOut) => self.zoom_out(),
            Some(PinchStep::Hold) => {}
            None => return Handled::Ignored,
        }
        Handled::Consumed
    }

    /// Touch end or cancel; `input` lists the contacts still down.
    pub fn handle_touch_end(&mut self, input: &TouchInput) -> Handled {
        self.state.gesture.touch_end(input);
        Handled::Ignored
    }
}
