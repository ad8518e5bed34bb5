//! Sway Motion System
//!
//! Spring-driven procedural motion for game feel: weapon sway, camera bob and
//! shake, recoil, UI bounce.
//!
//! # Features
//!
//! - **Spring Solver**: RK4 damped springs, sub-stepped or clamped on large frames
//! - **Forces**: constant targets and time-value curves driving spring targets
//! - **Motion Data**: shared, swappable spring/force profiles keyed by kind
//! - **Broadcasting**: preset stack with overrides and defaults, pushed to receivers
//! - **Mixing**: fixed-step ticking and weighted blending per consumer
//! - **Assets**: TOML motion libraries and game-state bound presets
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use sway_core::Vec3;
//! use sway_motion::{DataMotion, MotionDataBroadcaster, MotionMixer, MotionProfiles};
//!
//! let mut broadcaster = MotionDataBroadcaster::new();
//! let sway = Rc::new(RefCell::new(
//!     DataMotion::<Vec3>::new(MotionProfiles::weapon_sway_idle()).unwrap(),
//! ));
//! broadcaster.register(&sway).unwrap();
//!
//! let mut mixer = MotionMixer::new(Vec3::ZERO);
//! mixer.add_shared(&sway);
//!
//! broadcaster.push_preset(MotionProfiles::aiming_preset());
//! mixer.update(1.0 / 60.0);
//! let _offset = mixer.current_value();
//! ```

pub mod broadcaster;
pub mod config;
pub mod curve;
pub mod data;
pub mod force;
pub mod mixer;
pub mod motion;
pub mod presets;
pub mod receiver;
pub mod scheduler;
pub mod spring;
pub mod state;

pub use broadcaster::{
    BroadcastCommand, BroadcastQueue, MotionDataBroadcaster, PresetId, ReceiverId,
};
pub use config::MotionLibrary;
pub use curve::{Curve, CurveKey, Easing, WrapMode};
pub use data::{ChannelData, CurveKeyData, DataKind, ForceData, MotionData, MotionDataPreset};
pub use force::{ConstantForce, CurveForce, Force};
pub use mixer::{MotionId, MotionMixer, SharedMotion};
pub use motion::{Animated, DisableBehavior, Motion, PoolHooks, SpringChannel};
pub use presets::MotionProfiles;
pub use receiver::{DataMotion, MotionDataReceiver};
pub use scheduler::FixedTimestep;
pub use spring::{SolverConfig, Spring, SpringParams, SpringSolver, SpringState, StepReport};
pub use state::StatePresets;
