//! Frame-locked arcade games in the style of the Commodore 64 clones:
//! a ball-and-grid game with Arkanoid and Breakout presets, and Meteor
//! Storm, all running under one phase machine.
//!
//! The core talks to the outside world only through the traits in [`hal`].

pub mod collision;
pub mod compute;
pub mod config;
pub mod display;
pub mod entities;
pub mod error;
pub mod fixed;
pub mod hal;
pub mod levels;
pub mod machine;
pub mod meteor;
pub mod physics;
pub mod sound;
