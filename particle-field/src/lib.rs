use wasm_bindgen::prelude::*;

pub mod field;
pub mod noise;

#[cfg(target_arch = "wasm32")]
mod renderer;

#[cfg(target_arch = "wasm32")]
pub use renderer::ParticleBackground;

pub use field::{fade_in_out, FieldConfig, Particle, ParticleField, RandomSource, Surface, XorShift};
pub use noise::LatticeNoise;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Set up panic reporting once the module is instantiated
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Default tunables, for pages that tweak a few of them
#[wasm_bindgen]
pub fn default_config() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&FieldConfig::default())
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize config: {}", e)))
}

#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
