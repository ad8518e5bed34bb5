//! Built-in motion profiles
//!
//! Ready-made [`MotionData`] for common procedural motion, and presets that
//! group them by game state. Games normally author their own data in a
//! [`MotionLibrary`](crate::config::MotionLibrary); these are starting points.

use crate::curve::{Easing, WrapMode};
use crate::data::{CurveKeyData, DataKind, ForceData, MotionData, MotionDataPreset};
use crate::spring::SpringParams;
use std::sync::Arc;

/// Kind names used by the built-in profiles
pub mod kinds {
    pub const WEAPON_SWAY: &str = "weapon_sway";
    pub const CAMERA_BOB: &str = "camera_bob";
    pub const CAMERA_SHAKE: &str = "camera_shake";
    pub const UI_SCALE: &str = "ui_scale";
}

fn key(time: f32, value: [f32; 3], easing: Easing) -> CurveKeyData {
    CurveKeyData {
        time,
        value,
        easing,
    }
}

/// Pre-built motion data
pub struct MotionProfiles;

impl MotionProfiles {
    // ========================================================================
    // Weapon sway
    // ========================================================================

    /// Slow breathing drift while standing
    pub fn weapon_sway_idle() -> Arc<MotionData> {
        MotionData::new("weapon_sway_idle", kinds::WEAPON_SWAY)
            .channel(
                SpringParams::gentle(),
                ForceData::Curve {
                    keys: vec![
                        key(0.0, [0.0, 0.0, 0.0], Easing::Linear),
                        key(1.5, [0.004, 0.006, 0.0], Easing::EaseInOutQuad),
                        key(3.0, [0.0, 0.0, 0.0], Easing::EaseInOutQuad),
                    ],
                    wrap: WrapMode::Loop,
                },
            )
            .into_shared()
    }

    /// Tight, almost still sway while aiming down sights
    pub fn weapon_sway_aiming() -> Arc<MotionData> {
        MotionData::new("weapon_sway_aiming", kinds::WEAPON_SWAY)
            .channel(
                SpringParams::snappy(),
                ForceData::Curve {
                    keys: vec![
                        key(0.0, [0.0, 0.0, 0.0], Easing::Linear),
                        key(2.0, [0.001, 0.0015, 0.0], Easing::EaseInOutQuad),
                        key(4.0, [0.0, 0.0, 0.0], Easing::EaseInOutQuad),
                    ],
                    wrap: WrapMode::Loop,
                },
            )
            .into_shared()
    }

    /// Heavy, lagging sway while sprinting
    pub fn weapon_sway_sprinting() -> Arc<MotionData> {
        MotionData::new("weapon_sway_sprinting", kinds::WEAPON_SWAY)
            .channel(
                SpringParams::wobbly(),
                ForceData::Curve {
                    keys: vec![
                        key(0.0, [-0.02, 0.0, 0.0], Easing::Linear),
                        key(0.3, [0.02, -0.015, 0.0], Easing::EaseInOutQuad),
                        key(0.6, [-0.02, 0.0, 0.0], Easing::EaseInOutQuad),
                    ],
                    wrap: WrapMode::Loop,
                },
            )
            .into_shared()
    }

    // ========================================================================
    // Camera
    // ========================================================================

    /// Vertical head bob at walking pace
    pub fn camera_bob_walk() -> Arc<MotionData> {
        Self::camera_bob("camera_bob_walk", 0.5, 0.03)
    }

    /// Faster, deeper head bob at sprinting pace
    pub fn camera_bob_sprint() -> Arc<MotionData> {
        Self::camera_bob("camera_bob_sprint", 0.33, 0.06)
    }

    fn camera_bob(name: &str, period: f32, depth: f32) -> Arc<MotionData> {
        MotionData::new(name, kinds::CAMERA_BOB)
            .channel(
                SpringParams::stiff(),
                ForceData::Curve {
                    keys: vec![
                        key(0.0, [0.0, 0.0, 0.0], Easing::Linear),
                        key(period * 0.5, [0.0, -depth, 0.0], Easing::EaseOutQuad),
                        key(period, [0.0, 0.0, 0.0], Easing::EaseInQuad),
                    ],
                    wrap: WrapMode::Loop,
                },
            )
            .into_shared()
    }

    /// One-shot kick that settles back to rest (explosions, heavy landings).
    /// Two channels: a fast jolt layered over a slower roll.
    pub fn camera_shake_explosion() -> Arc<MotionData> {
        MotionData::new("camera_shake_explosion", kinds::CAMERA_SHAKE)
            .channel(
                SpringParams::from_damping_ratio(900.0, 0.2, 1.0),
                ForceData::Curve {
                    keys: vec![
                        key(0.0, [0.0, 0.0, 0.0], Easing::Linear),
                        key(0.03, [0.8, 1.2, 0.0], Easing::Step),
                        key(0.15, [0.0, 0.0, 0.0], Easing::EaseOutCubic),
                    ],
                    wrap: WrapMode::Hold,
                },
            )
            .channel(
                SpringParams::wobbly(),
                ForceData::Curve {
                    keys: vec![
                        key(0.0, [0.0, 0.0, 0.0], Easing::Linear),
                        key(0.1, [0.0, 0.0, 2.5], Easing::EaseOutQuad),
                        key(0.6, [0.0, 0.0, 0.0], Easing::EaseInOutCubic),
                    ],
                    wrap: WrapMode::Hold,
                },
            )
            .into_shared()
    }

    /// No camera shake
    pub fn camera_shake_none() -> Arc<MotionData> {
        MotionData::new("camera_shake_none", kinds::CAMERA_SHAKE)
            .channel(SpringParams::stiff(), ForceData::rest())
            .channel(SpringParams::wobbly(), ForceData::rest())
            .into_shared()
    }

    // ========================================================================
    // UI
    // ========================================================================

    /// Overshooting scale pop for highlighted widgets
    pub fn ui_bounce() -> Arc<MotionData> {
        MotionData::new("ui_bounce", kinds::UI_SCALE)
            .channel(SpringParams::wobbly(), ForceData::constant(&[0.1]))
            .into_shared()
    }

    /// Scale offset at rest
    pub fn ui_still() -> Arc<MotionData> {
        MotionData::new("ui_still", kinds::UI_SCALE)
            .channel(SpringParams::stiff(), ForceData::rest())
            .into_shared()
    }

    // ========================================================================
    // Game-state presets
    // ========================================================================

    pub fn aiming_preset() -> Arc<MotionDataPreset> {
        MotionDataPreset::new("aiming")
            .with(Self::weapon_sway_aiming())
            .into_shared()
    }

    pub fn sprinting_preset() -> Arc<MotionDataPreset> {
        MotionDataPreset::new("sprinting")
            .with(Self::weapon_sway_sprinting())
            .with(Self::camera_bob_sprint())
            .into_shared()
    }

    /// Every built-in profile
    pub fn all() -> Vec<Arc<MotionData>> {
        vec![
            Self::weapon_sway_idle(),
            Self::weapon_sway_aiming(),
            Self::weapon_sway_sprinting(),
            Self::camera_bob_walk(),
            Self::camera_bob_sprint(),
            Self::camera_shake_explosion(),
            Self::camera_shake_none(),
            Self::ui_bounce(),
            Self::ui_still(),
        ]
    }

    /// Built-in profile by name
    pub fn by_name(name: &str) -> Option<Arc<MotionData>> {
        Self::all().into_iter().find(|data| data.name() == name)
    }

    /// Kinds covered by the built-in profiles
    pub fn kinds() -> [DataKind; 4] {
        [
            DataKind::from(kinds::WEAPON_SWAY),
            DataKind::from(kinds::CAMERA_BOB),
            DataKind::from(kinds::CAMERA_SHAKE),
            DataKind::from(kinds::UI_SCALE),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{Animated, Motion};
    use sway_core::Vec3;

    #[test]
    fn test_all_profiles_validate() {
        for data in MotionProfiles::all() {
            assert!(data.validate().is_ok(), "{} failed validation", data.name());
        }
    }

    #[test]
    fn test_profiles_of_a_kind_share_channel_layout() {
        for kind in MotionProfiles::kinds() {
            let counts: Vec<usize> = MotionProfiles::all()
                .iter()
                .filter(|d| d.kind() == &kind)
                .map(|d| d.channels().len())
                .collect();
            assert!(!counts.is_empty());
            assert!(counts.windows(2).all(|w| w[0] == w[1]), "{kind}: {counts:?}");
        }
    }

    #[test]
    fn test_explosion_shake_returns_to_rest() {
        let data = MotionProfiles::camera_shake_explosion();
        let mut motion: Motion<Vec3> = Motion::from_data("shake", &data);

        let mut peak = 0.0f32;
        for _ in 0..(60 * 4) {
            motion.tick(1.0 / 60.0);
            peak = peak.max(motion.output().length());
        }
        assert!(peak > 0.3, "shake never kicked: {peak}");
        assert!(motion.output().length() < 0.01);
    }

    #[test]
    fn test_lookup_by_name() {
        assert!(MotionProfiles::by_name("ui_bounce").is_some());
        assert!(MotionProfiles::by_name("missing").is_none());
    }
}
