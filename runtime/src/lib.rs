//! Automation runtime — drives a game client through a local HTTP telemetry
//! endpoint and synthesized OS-level input.
//!
//! The crate is organized as a stack of subsystems owned by [`runtime::Runtime`]:
//! telemetry reads feed the state machine, which dispatches to navigation,
//! camera, and interaction subsystems; humanization wraps every outbound
//! input call.

pub mod bot_loop;
pub mod camera;
pub mod collision;
pub mod error_handler;
pub mod helpers;
pub mod humanization;
pub mod input;
pub mod interactor;
pub mod navigator;
pub mod pathfinder;
pub mod policy;
pub mod runtime;
pub mod state_machine;
pub mod telemetry;

pub use runtime::Runtime;
