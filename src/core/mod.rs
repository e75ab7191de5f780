// src/core/mod.rs

pub mod html;
pub mod net;
pub mod sanitize;
pub mod webdriver;

pub use webdriver::{RenderSession, Renderer, WebDriver};
