//! Browser bindings.
//!
//! Implements the host traits on top of `web_sys` and exposes the controller
//! to JavaScript as [`WebViewport`]. Every listener is attached to the
//! viewport's own container and image, never to the document, so several
//! viewports can live on one page; all of them are removed by
//! [`WebViewport::dispose`] or when the viewport is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use imgpan_input::{Modifiers, MouseButton, PointerInput, Size, TouchInput, TouchPoint, WheelInput};
use js_sys::{Array, Uint8Array};
use wasm_bindgen::closure::WasmClosure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Blob, BlobPropertyBag, Event, EventTarget, HtmlElement,
    HtmlImageElement, MouseEvent, TouchEvent, Url, WheelEvent,
};

use crate::config::ViewportConfig;
use crate::controller::ViewportController;
use crate::error::{ConfigurationError, LoadError};
use crate::host::{ContainerElement, ImageElement, ListenerGuard, ResourceLoader};
use crate::logging;
use crate::zoom_math::Transform;

/// Display value used when the container is shown.
const CONTAINER_DISPLAY: &str = "flex";

/// DOM container element.
#[derive(Debug, Clone)]
pub struct WebContainer(pub HtmlElement);

impl ContainerElement for WebContainer {
    fn size(&self) -> Size {
        Size::new(self.0.client_width() as f32, self.0.client_height() as f32)
    }

    fn set_visible(&mut self, visible: bool) {
        let display = if visible { CONTAINER_DISPLAY } else { "none" };
        if let Err(e) = self.0.style().set_property("display", display) {
            log::warn!("Failed to set container display: {:?}", e);
        }
    }
}

/// DOM `<img>` element.
#[derive(Debug, Clone)]
pub struct WebImage(pub HtmlImageElement);

impl ImageElement for WebImage {
    fn set_source(&mut self, url: Option<&str>) {
        match url {
            Some(url) => self.0.set_src(url),
            None => {
                if let Err(e) = self.0.remove_attribute("src") {
                    log::warn!("Failed to clear image source: {:?}", e);
                }
            }
        }
    }

    fn size(&self) -> Size {
        // offsetWidth/Height ignore CSS transforms
        Size::new(self.0.offset_width() as f32, self.0.offset_height() as f32)
    }

    fn apply_transform(&mut self, transform: &Transform) {
        let style = self.0.style();
        let result = style
            .set_property("position", "absolute")
            .and_then(|_| style.set_property("transform", &transform.css_transform()))
            .and_then(|_| style.set_property("left", &transform.css_left()))
            .and_then(|_| style.set_property("top", &transform.css_top()));
        if let Err(e) = result {
            log::warn!("Failed to apply image transform: {:?}", e);
        }
    }
}

/// Object-URL loader backed by `Blob` and `URL.createObjectURL`.
#[derive(Debug, Clone, Default)]
pub struct BlobUrlLoader;

impl ResourceLoader for BlobUrlLoader {
    fn create_url(&mut self, bytes: &[u8], mime: &str) -> Result<String, LoadError> {
        let parts = Array::new();
        parts.push(&Uint8Array::from(bytes));

        let options = BlobPropertyBag::new();
        options.set_type(mime);

        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|e| LoadError::Resource(format!("{:?}", e)))?;
        Url::create_object_url_with_blob(&blob).map_err(|e| LoadError::Resource(format!("{:?}", e)))
    }

    fn revoke_url(&mut self, url: &str) {
        if let Err(e) = Url::revoke_object_url(url) {
            log::warn!("Failed to revoke {}: {:?}", url, e);
        }
    }
}

type WebController = ViewportController<WebContainer, WebImage, BlobUrlLoader>;

/// Pan/zoom viewport exported to JavaScript.
#[wasm_bindgen]
pub struct WebViewport {
    controller: Rc<RefCell<WebController>>,
    config: ViewportConfig,
    on_load_error: Rc<RefCell<Option<js_sys::Function>>>,
    listeners: ListenerGuard,
}

#[wasm_bindgen]
impl WebViewport {
    /// Bind to the container and image elements with the given ids.
    ///
    /// `config_json` may hold `minScale`, `maxScale`, `stepScale`, `scale` and `logLevel`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container_id: &str,
        image_id: &str,
        config_json: Option<String>,
    ) -> Result<WebViewport, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("No document available"))?;

        let container = document
            .get_element_by_id(container_id)
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| to_js(ConfigurationError::ElementNotFound(container_id.to_string())))?;
        let image = document
            .get_element_by_id(image_id)
            .and_then(|e| e.dyn_into::<HtmlImageElement>().ok())
            .ok_or_else(|| to_js(ConfigurationError::ElementNotFound(image_id.to_string())))?;

        Self::from_elements(container, image, config_json)
    }

    /// Bind to element handles the page already holds.
    #[wasm_bindgen(js_name = fromElements)]
    pub fn from_elements(
        container: HtmlElement,
        image: HtmlImageElement,
        config_json: Option<String>,
    ) -> Result<WebViewport, JsValue> {
        let (config, storage_error) = match config_json {
            Some(json) => {
                let config = ViewportConfig::from_json(&json)
                    .map_err(|e| to_js(ConfigurationError::InvalidConfig(e)))?;
                (config, None)
            }
            None => match ViewportConfig::read_local_storage() {
                Ok(stored) => (stored.unwrap_or_default(), None),
                Err(e) => (ViewportConfig::default(), Some(e)),
            },
        };
        logging::init(config.log_level);
        if let Some(e) = storage_error {
            log::warn!("Stored config ignored: {}", e);
        }

        let controller = ViewportController::builder()
            .container(WebContainer(container.clone()))
            .image(WebImage(image.clone()))
            .loader(BlobUrlLoader)
            .config(config.clone())
            .build()
            .map_err(to_js)?;

        let mut viewport = WebViewport {
            controller: Rc::new(RefCell::new(controller)),
            config,
            on_load_error: Rc::new(RefCell::new(None)),
            listeners: ListenerGuard::new(),
        };
        viewport.attach_input_listeners(container.as_ref())?;
        viewport.attach_image_listeners(image.as_ref())?;

        log::info!("Viewport attached ({} listeners)", viewport.listeners.len());
        Ok(viewport)
    }

    /// Display an image blob. Empty blobs and corrupt headers are rejected
    /// without touching the page; other formats are left to the browser.
    pub fn load(&self, bytes: &[u8]) -> Result<(), JsValue> {
        self.controller.borrow_mut().load(bytes).map(|_| ()).map_err(to_js)
    }

    /// Callback receiving an error message when the browser fails to decode a loaded image.
    #[wasm_bindgen(js_name = setOnLoadError)]
    pub fn set_on_load_error(&self, callback: Option<js_sys::Function>) {
        *self.on_load_error.borrow_mut() = callback;
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&self) {
        self.controller.borrow_mut().zoom_in();
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&self) {
        self.controller.borrow_mut().zoom_out();
    }

    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&self, scale: f32) {
        self.controller.borrow_mut().set_scale(scale);
    }

    pub fn pan(&self, dx: f32, dy: f32) {
        self.controller.borrow_mut().pan(dx, dy);
    }

    #[wasm_bindgen(js_name = fitToContainer)]
    pub fn fit_to_container(&self) -> bool {
        self.controller.borrow_mut().fit_to_container()
    }

    pub fn reset(&self) {
        self.controller.borrow_mut().reset();
    }

    pub fn scale(&self) -> f32 {
        self.controller.borrow().scale()
    }

    #[wasm_bindgen(js_name = positionX)]
    pub fn position_x(&self) -> f32 {
        self.controller.borrow().position().x
    }

    #[wasm_bindgen(js_name = positionY)]
    pub fn position_y(&self) -> f32 {
        self.controller.borrow().position().y
    }

    /// Persist this viewport's configuration, with the current scale as its
    /// initial scale, to localStorage.
    #[wasm_bindgen(js_name = saveConfig)]
    pub fn save_config(&self) -> Result<(), JsValue> {
        let scale = self.controller.borrow().scale();
        self.config
            .clone()
            .with_scale(scale)
            .write_local_storage()
            .map_err(to_js)
    }

    /// Remove every listener this viewport registered.
    pub fn dispose(&mut self) {
        self.listeners.dispose();
    }
}

impl WebViewport {
    fn attach_input_listeners(&mut self, target: &EventTarget) -> Result<(), JsValue> {
        // Wheel
        {
            let controller = self.controller.clone();
            let closure = Closure::wrap(Box::new(move |event: WheelEvent| {
                let input = WheelInput::new(event.delta_y() as f32, modifiers_of(&event));
                if controller.borrow_mut().handle_wheel(&input).prevents_default() {
                    event.prevent_default();
                }
            }) as Box<dyn FnMut(WheelEvent)>);
            register(target, "wheel", closure, &mut self.listeners)?;
        }

        // Mouse down
        {
            let controller = self.controller.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                let input = pointer_of(&event);
                if controller.borrow_mut().handle_pointer_down(&input).prevents_default() {
                    event.prevent_default();
                }
            }) as Box<dyn FnMut(MouseEvent)>);
            register(target, "mousedown", closure, &mut self.listeners)?;
        }

        // Mouse move
        {
            let controller = self.controller.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                let input = pointer_of(&event);
                if controller.borrow_mut().handle_pointer_move(&input).prevents_default() {
                    event.prevent_default();
                }
            }) as Box<dyn FnMut(MouseEvent)>);
            register(target, "mousemove", closure, &mut self.listeners)?;
        }

        // Mouse up
        {
            let controller = self.controller.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                let input = pointer_of(&event);
                controller.borrow_mut().handle_pointer_up(&input);
            }) as Box<dyn FnMut(MouseEvent)>);
            register(target, "mouseup", closure, &mut self.listeners)?;
        }

        // Mouse leave ends the drag
        {
            let controller = self.controller.clone();
            let closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
                controller.borrow_mut().handle_pointer_cancel();
            }) as Box<dyn FnMut(MouseEvent)>);
            register(target, "mouseleave", closure, &mut self.listeners)?;
        }

        // Touch start / move
        {
            let controller = self.controller.clone();
            let closure = Closure::wrap(Box::new(move |event: TouchEvent| {
                let input = touches_of(&event);
                if controller.borrow_mut().handle_touch_start(&input).prevents_default() {
                    event.prevent_default();
                }
            }) as Box<dyn FnMut(TouchEvent)>);
            register(target, "touchstart", closure, &mut self.listeners)?;
        }
        {
            let controller = self.controller.clone();
            let closure = Closure::wrap(Box::new(move |event: TouchEvent| {
                let input = touches_of(&event);
                if controller.borrow_mut().handle_touch_move(&input).prevents_default() {
                    event.prevent_default();
                }
            }) as Box<dyn FnMut(TouchEvent)>);
            register(target, "touchmove", closure, &mut self.listeners)?;
        }

        // Touch end and cancel both report the contacts still down
        for kind in ["touchend", "touchcancel"] {
            let controller = self.controller.clone();
            let closure = Closure::wrap(Box::new(move |event: TouchEvent| {
                let input = touches_of(&event);
                controller.borrow_mut().handle_touch_end(&input);
            }) as Box<dyn FnMut(TouchEvent)>);
            register(target, kind, closure, &mut self.listeners)?;
        }

        Ok(())
    }

    fn attach_image_listeners(&mut self, target: &EventTarget) -> Result<(), JsValue> {
        // Decode finished: sizes are measurable now
        {
            let controller = self.controller.clone();
            let closure = Closure::wrap(Box::new(move |_event: Event| {
                let mut controller = controller.borrow_mut();
                if let Some(ticket) = controller.pending_ticket() {
                    if let Err(e) = controller.complete_load(ticket) {
                        log::debug!("Image load event ignored: {}", e);
                    }
                }
            }) as Box<dyn FnMut(Event)>);
            register(target, "load", closure, &mut self.listeners)?;
        }

        // Decode failed
        {
            let controller = self.controller.clone();
            let on_load_error = self.on_load_error.clone();
            let closure = Closure::wrap(Box::new(move |_event: Event| {
                let error = {
                    let mut controller = controller.borrow_mut();
                    match controller.pending_ticket() {
                        Some(ticket) => controller.fail_load(ticket),
                        None => return,
                    }
                };
                if let Some(callback) = on_load_error.borrow().as_ref() {
                    if let Err(e) = callback.call1(&JsValue::NULL, &to_js(error)) {
                        log::warn!("Load error callback threw: {:?}", e);
                    }
                }
            }) as Box<dyn FnMut(Event)>);
            register(target, "error", closure, &mut self.listeners)?;
        }

        Ok(())
    }
}

/// Attach `closure` as a non-passive `kind` listener and hand its removal to `guard`.
fn register<T>(
    target: &EventTarget,
    kind: &'static str,
    closure: Closure<T>,
    guard: &mut ListenerGuard,
) -> Result<(), JsValue>
where
    T: ?Sized + WasmClosure + 'static,
{
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;

    let target = target.clone();
    guard.push(move || {
        if let Err(e) =
            target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        {
            log::warn!("Failed to remove {} listener: {:?}", kind, e);
        }
        drop(closure);
    });
    Ok(())
}

fn modifiers_of(event: &WheelEvent) -> Modifiers {
    Modifiers {
        shift: event.shift_key(),
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        meta: event.meta_key(),
    }
}

fn pointer_of(event: &MouseEvent) -> PointerInput {
    PointerInput::new(
        MouseButton::from_dom(event.button()),
        event.client_x() as f32,
        event.client_y() as f32,
    )
}

fn touches_of(event: &TouchEvent) -> TouchInput {
    let list = event.touches();
    let touches = (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| TouchPoint::new(t.identifier(), t.client_x() as f32, t.client_y() as f32))
        .collect();
    TouchInput::new(touches)
}

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}
