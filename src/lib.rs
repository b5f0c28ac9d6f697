//! Tick Snake - a grid snake game driven by a fixed-rate simulation engine
//!
//! This library provides:
//! - The simulation core (game module): board, snake, fruit, score and
//!   status advanced by a background tick driver
//! - JSON settings for the front-end (settings module)
//! - Terminal input mapping and rendering (input, render modules)
//! - The interactive terminal mode (modes module)

pub mod game;
pub mod input;
pub mod modes;
pub mod render;
pub mod settings;
