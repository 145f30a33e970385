//! Minimal terminal runtime: a fixed-rate tick, on-demand rendering and
//! batched key input.

pub use self::{app::App, runtime::Runtime};

mod app;
mod event;
mod event_loop;
mod runtime;
