//! Web UI for datamapper
//!
//! A Yew single-page app for editing field mappings, switching the
//! scheduler flag and forwarding test webhooks.

mod app;
pub mod client;
pub mod components;
mod state;

use wasm_bindgen::prelude::*;

/// Entry point for the WASM application.
#[wasm_bindgen(start)]
pub fn run_app() {
    // Initialize panic hook for better error messages
    console_error_panic_hook::set_once();

    yew::Renderer::<app::App>::new().render();
}
