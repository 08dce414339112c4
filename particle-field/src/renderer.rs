//! Canvas renderer of the particle field.
//!
//! The canvas is appended to a container element and sized to it. One
//! `requestAnimationFrame` callback drives the field until `stop()`, which
//! cancels the pending frame, drops the window resize listener and detaches
//! the canvas.

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, Window};

use site_common::{console_debug, console_warn};

use crate::field::{FieldConfig, ParticleField, RandomSource, Surface};

/// `Math.random()`
struct MathRandom;

impl RandomSource for MathRandom {
    fn next_f32(&mut self) -> f32 {
        (js_sys::Math::random() as f32).min(0.999_999_9)
    }
}

struct CanvasSurface<'a> {
    context: &'a CanvasRenderingContext2d,
}

impl Surface for CanvasSurface<'_> {
    fn fill_background(&mut self, width: f32, height: f32, color: &str) {
        let (width, height) = (width as f64, height as f64);
        self.context.clear_rect(0.0, 0.0, width, height);
        self.context.set_fill_style_str(color);
        self.context.fill_rect(0.0, 0.0, width, height);
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str) {
        self.context.save();
        self.context.begin_path();
        if self
            .context
            .arc(x as f64, y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .is_ok()
        {
            self.context.set_fill_style_str(color);
            self.context.fill();
        }
        self.context.close_path();
        self.context.restore();
    }
}

struct Scene {
    container: Element,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    field: ParticleField,
    rng: MathRandom,
}

impl Scene {
    fn container_size(&self) -> (u32, u32) {
        let rect = self.container.get_bounding_client_rect();
        (rect.width().max(0.0) as u32, rect.height().max(0.0) as u32)
    }

    fn resize(&mut self) {
        let (width, height) = self.container_size();
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.field.resize(width as f32, height as f32);
    }

    fn draw(&mut self) {
        let mut surface = CanvasSurface { context: &self.context };
        self.field.frame(&mut surface, &mut self.rng);
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn request_frame(callback: &Closure<dyn FnMut()>) -> Option<i32> {
    let window = window().ok()?;
    window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| console_warn!("requestAnimationFrame failed: {:?}", err))
        .ok()
}

/// Animated background mounted into a container element
#[wasm_bindgen]
pub struct ParticleBackground {
    scene: Rc<RefCell<Scene>>,
    mounted: Rc<Cell<bool>>,
    pending: Rc<Cell<Option<i32>>>,
    frame: FrameCallback,
    on_resize: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl ParticleBackground {
    /// Mount a canvas into `#container_id` and start animating.
    ///
    /// `config` is an optional partial `FieldConfig`; missing keys keep their
    /// defaults.
    pub fn start(container_id: &str, opacity: f64, config: JsValue) -> Result<ParticleBackground, JsValue> {
        let config: FieldConfig = if config.is_undefined() || config.is_null() {
            FieldConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid particle config: {}", e)))?
        };

        let window = window()?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let container = document.get_element_by_id(container_id).ok_or_else(|| {
            console_warn!("Particle background: container #{} not found", container_id);
            JsValue::from_str(&format!("No element with id {}", container_id))
        })?;

        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        let style = canvas.style();
        style.set_property("position", "absolute")?;
        style.set_property("top", "0")?;
        style.set_property("left", "0")?;
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;
        style.set_property("z-index", "0")?;
        style.set_property("pointer-events", "none")?;
        container.append_child(&canvas)?;

        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        let rect = container.get_bounding_client_rect();
        let mut rng = MathRandom;
        let field = ParticleField::new(config, rect.width() as f32, rect.height() as f32, &mut rng);
        console_debug!("Particle field started with {} particles", field.len());

        let scene = Rc::new(RefCell::new(Scene {
            container,
            canvas,
            context,
            field,
            rng,
        }));
        scene.borrow_mut().resize();

        let mut background = ParticleBackground {
            scene,
            mounted: Rc::new(Cell::new(true)),
            pending: Rc::new(Cell::new(None)),
            frame: Rc::new(RefCell::new(None)),
            on_resize: None,
        };
        background.set_opacity(opacity)?;
        background.listen_for_resize(&window)?;
        background.run();
        Ok(background)
    }

    /// Resize the canvas to its container
    pub fn resize(&self) {
        self.scene.borrow_mut().resize();
    }

    /// CSS opacity of the canvas, clamped to `[0, 1]`
    pub fn set_opacity(&self, opacity: f64) -> Result<(), JsValue> {
        let opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
        self.scene
            .borrow()
            .canvas
            .style()
            .set_property("opacity", &opacity.to_string())
    }

    pub fn is_running(&self) -> bool {
        self.mounted.get()
    }

    pub fn frames(&self) -> f64 {
        self.scene.borrow().field.frames() as f64
    }

    /// Stop animating and remove the canvas; safe to call more than once
    pub fn stop(&mut self) {
        if !self.mounted.replace(false) {
            return;
        }

        if let Ok(window) = window() {
            if let Some(id) = self.pending.take() {
                if let Err(err) = window.cancel_animation_frame(id) {
                    console_warn!("cancelAnimationFrame failed: {:?}", err);
                }
            }
            if let Some(on_resize) = self.on_resize.take() {
                if let Err(err) = window
                    .remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
                {
                    console_warn!("Removing the resize listener failed: {:?}", err);
                }
            }
        }
        // breaks the closure's reference back to itself
        self.frame.borrow_mut().take();
        self.scene.borrow().canvas.remove();
        console_debug!("Particle field stopped");
    }
}

impl ParticleBackground {
    fn listen_for_resize(&mut self, window: &Window) -> Result<(), JsValue> {
        let scene = Rc::clone(&self.scene);
        let on_resize = Closure::<dyn FnMut()>::new(move || {
            scene.borrow_mut().resize();
        });
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
        self.on_resize = Some(on_resize);
        Ok(())
    }

    fn run(&self) {
        let scene = Rc::clone(&self.scene);
        let mounted = Rc::clone(&self.mounted);
        let pending = Rc::clone(&self.pending);
        let frame = Rc::clone(&self.frame);

        *self.frame.borrow_mut() = Some(Closure::<dyn FnMut()>::new(move || {
            pending.set(None);
            if !mounted.get() {
                return;
            }
            scene.borrow_mut().draw();
            if let Some(callback) = frame.borrow().as_ref() {
                pending.set(request_frame(callback));
            }
        }));

        if let Some(callback) = self.frame.borrow().as_ref() {
            self.pending.set(request_frame(callback));
        }
    }
}

impl Drop for ParticleBackground {
    fn drop(&mut self) {
        self.stop();
    }
}
