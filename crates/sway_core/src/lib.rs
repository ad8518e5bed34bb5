//! Sway Core
//!
//! Foundational pieces shared by the Sway motion crates:
//!
//! - **Channels**: [`Animatable`] values (scalar, [`Vec2`], [`Vec3`]) that springs integrate
//! - **Errors**: [`MotionError`], reported and never fatal
//! - **Game States**: a flat [`StateMachine`] whose transitions drive motion presets
//!
//! # Example
//!
//! ```rust
//! use sway_core::{Animatable, Vec3};
//!
//! let a = Vec3::new(0.0, 1.0, 0.0);
//! let b = Vec3::new(2.0, 1.0, 0.0);
//! assert_eq!(a.lerp(b, 0.5), Vec3::new(1.0, 1.0, 0.0));
//! ```

pub mod error;
pub mod fsm;
pub mod math;

pub use error::{MotionError, Result};
pub use fsm::{EventId, StateChange, StateId, StateMachine, Transition};
pub use math::{Animatable, Vec2, Vec3};
