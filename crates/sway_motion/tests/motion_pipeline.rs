//! Integration tests for broadcaster + data motions + mixer
//!
//! These tests verify that:
//! - Springs converge and stay bounded under realistic parameters
//! - Preset pushes, pops and overrides reach every subscribed motion
//! - Data swaps never make a motion jump
//! - Identical inputs give bit-identical traces

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use sway_core::{StateMachine, Transition, Vec3};
use sway_motion::{
    Animated, DataKind, DataMotion, FixedTimestep, Force, ForceData, Motion, MotionData,
    MotionDataBroadcaster, MotionDataPreset, MotionMixer, MotionProfiles, PoolHooks,
    SpringParams, StatePresets,
};

const FRAME: f32 = 1.0 / 60.0;

fn sway(name: &str, params: SpringParams, target: f32) -> Arc<MotionData> {
    MotionData::new(name, "sway")
        .channel(params, ForceData::constant(&[target]))
        .into_shared()
}

fn preset(name: &str, data: Arc<MotionData>) -> Arc<MotionDataPreset> {
    MotionDataPreset::new(name).with(data).into_shared()
}

type Rig = (MotionDataBroadcaster, Rc<RefCell<DataMotion<f32>>>, MotionMixer<f32>);

/// Broadcaster, one subscribed data motion, and a mixer owning it
fn rig(fallback: Arc<MotionData>) -> Rig {
    let mut broadcaster = MotionDataBroadcaster::new();
    let motion = Rc::new(RefCell::new(DataMotion::new(fallback).unwrap()));
    broadcaster.register(&motion).unwrap();

    let mut mixer = MotionMixer::new(0.0).with_timestep(FixedTimestep::from_hz(120.0));
    mixer.add_shared(&motion);
    (broadcaster, motion, mixer)
}

fn run(mixer: &mut MotionMixer<f32>, seconds: f32) {
    let frames = (seconds / FRAME).round() as usize;
    for _ in 0..frames {
        mixer.update(FRAME);
    }
}

#[test]
fn test_spring_settles_within_one_percent() {
    let params = SpringParams::new(200.0, 10.0, 1.0);
    let mut mixer = MotionMixer::new(0.0f32).with_timestep(FixedTimestep::from_hz(120.0));
    mixer.add(Motion::new("settle").channel(params, Force::constant(1.0f32)));

    // Envelope decays as e^(-5t), under 1% by roughly 0.92 s
    let mut peak = 0.0f32;
    for _ in 0..90 {
        mixer.update(FRAME);
        peak = peak.max(mixer.current_value());
    }
    assert!(peak - 1.0 <= params.overshoot_bound() + 0.01);

    for frame in 0..(3 * 60) {
        mixer.update(FRAME);
        let value = mixer.current_value();
        assert!(
            (value - 1.0).abs() < 0.01,
            "frame {frame} after settling: {value}"
        );
    }
}

#[test]
fn test_preset_push_and_pop_drive_mixer() {
    let (mut broadcaster, motion, mut mixer) = rig(sway("idle", SpringParams::stiff(), 0.0));
    let aiming = preset("aiming", sway("aim", SpringParams::stiff(), 1.0));

    let id = broadcaster.push_preset(aiming);
    assert_eq!(motion.borrow().current_data().name(), "aim");
    run(&mut mixer, 2.0);
    assert!((mixer.current_value() - 1.0).abs() < 0.01);

    broadcaster.pop_preset(id).unwrap();
    assert_eq!(motion.borrow().current_data().name(), "idle");
    run(&mut mixer, 2.0);
    assert!(mixer.current_value().abs() < 0.01);
}

#[test]
fn test_override_wins_until_cleared() {
    let (mut broadcaster, motion, mut mixer) = rig(sway("idle", SpringParams::stiff(), 0.0));
    broadcaster.push_preset(preset("aiming", sway("aim", SpringParams::stiff(), 1.0)));
    broadcaster.set_override(sway("cutscene", SpringParams::stiff(), -2.0));

    broadcaster.push_preset(preset("sprint", sway("sprint", SpringParams::stiff(), 3.0)));
    assert_eq!(motion.borrow().current_data().name(), "cutscene");
    run(&mut mixer, 2.0);
    assert!((mixer.current_value() + 2.0).abs() < 0.02);

    broadcaster.clear_override(&DataKind::from("sway"));
    assert_eq!(motion.borrow().current_data().name(), "sprint");
}

#[test]
fn test_swap_mid_flight_is_continuous() {
    let (mut broadcaster, motion, mut mixer) = rig(sway("idle", SpringParams::gentle(), 1.0));
    run(&mut mixer, 0.1);
    let before = motion.borrow().output();
    let value_before = mixer.current_value();

    broadcaster.push_preset(preset("aiming", sway("aim", SpringParams::snappy(), -1.0)));
    assert_eq!(motion.borrow().output(), before);
    assert_eq!(mixer.current_value(), value_before);

    mixer.step();
    assert!((mixer.current_value() - value_before).abs() < 0.1);
}

#[test]
fn test_disabled_motion_decays_without_jump() {
    let (_broadcaster, _motion, mut mixer) = rig(sway("idle", SpringParams::stiff(), 1.0));
    run(&mut mixer, 1.0);
    let before = mixer.current_value();
    let id = mixer.ids().next().unwrap();

    mixer.set_enabled(id, false);
    mixer.step();
    assert!((mixer.current_value() - before).abs() < 0.05);

    run(&mut mixer, 2.0);
    assert!(mixer.current_value().abs() < 0.01);
}

#[test]
fn test_queued_changes_apply_at_boundary() {
    let (mut broadcaster, motion, _mixer) = rig(sway("idle", SpringParams::stiff(), 0.0));
    let queue = broadcaster.queue();
    let aiming = preset("aiming", sway("aim", SpringParams::stiff(), 1.0));

    queue.push_preset(aiming.clone());
    assert_eq!(motion.borrow().current_data().name(), "idle");

    assert_eq!(broadcaster.apply_queued(), 1);
    assert_eq!(motion.borrow().current_data().name(), "aim");

    queue.pop_preset(aiming);
    broadcaster.apply_queued();
    assert_eq!(motion.borrow().current_data().name(), "idle");
    assert_eq!(broadcaster.stack_len(), 0);
}

#[test]
fn test_dropped_motion_is_pruned() {
    let (mut broadcaster, motion, mut mixer) = rig(sway("idle", SpringParams::stiff(), 0.0));
    let id = mixer.ids().next().unwrap();
    mixer.remove(id);
    drop(motion);

    broadcaster.push_preset(preset("aiming", sway("aim", SpringParams::stiff(), 1.0)));
    assert_eq!(broadcaster.receiver_count(), 0);
}

#[test]
fn test_reset_motion_waits_for_registration() {
    let (mut broadcaster, motion, _mixer) = rig(sway("idle", SpringParams::stiff(), 0.0));
    motion.borrow_mut().reset();
    assert_eq!(broadcaster.receiver_count(), 0);

    broadcaster.push_preset(preset("aiming", sway("aim", SpringParams::stiff(), 1.0)));
    assert_eq!(motion.borrow().current_data().name(), "idle");
    assert_eq!(broadcaster.receiver_count(), 0);

    broadcaster.register(&motion).unwrap();
    assert_eq!(motion.borrow().current_data().name(), "aim");
    assert_eq!(broadcaster.receiver_count(), 1);
    assert!(broadcaster.register(&motion).is_err());
}

#[test]
fn test_game_state_drives_profiles() {
    const IDLE: u32 = 0;
    const SPRINTING: u32 = 1;
    const SPRINT: u32 = 0;

    let mut fsm = StateMachine::new(IDLE, vec![Transition::new(IDLE, SPRINT, SPRINTING)]);
    let mut broadcaster = MotionDataBroadcaster::new();
    broadcaster.set_default(MotionProfiles::weapon_sway_idle());

    let motion = Rc::new(RefCell::new(
        DataMotion::<Vec3>::new(MotionProfiles::weapon_sway_idle()).unwrap(),
    ));
    broadcaster.register(&motion).unwrap();

    let mut presets = StatePresets::new().bind(SPRINTING, MotionProfiles::sprinting_preset());
    fsm.send(SPRINT);
    presets.sync(&fsm, &mut broadcaster).unwrap();

    assert_eq!(motion.borrow().current_data().name(), "weapon_sway_sprinting");
}

#[test]
fn test_identical_runs_are_bit_identical() {
    fn trace() -> Vec<Vec3> {
        let mut broadcaster = MotionDataBroadcaster::new();
        let sway = Rc::new(RefCell::new(
            DataMotion::<Vec3>::new(MotionProfiles::weapon_sway_idle()).unwrap(),
        ));
        let shake = Rc::new(RefCell::new(
            DataMotion::<Vec3>::new(MotionProfiles::camera_shake_none()).unwrap(),
        ));
        broadcaster.register(&sway).unwrap();
        broadcaster.register(&shake).unwrap();

        let mut mixer = MotionMixer::new(Vec3::new(0.0, 1.6, 0.0));
        mixer.add_shared(&sway);
        mixer.add_shared_weighted(&shake, 0.5);

        let mut out = Vec::new();
        for frame in 0..600 {
            match frame {
                60 => {
                    broadcaster.push_preset(MotionProfiles::sprinting_preset());
                }
                200 => broadcaster.set_override(MotionProfiles::camera_shake_explosion()),
                400 => {
                    broadcaster.clear_override(&DataKind::from("camera_shake"));
                }
                _ => {}
            }
            // Uneven frame pacing
            let dt = FRAME + (frame % 7) as f32 * 0.001;
            mixer.update(dt);
            out.push(mixer.current_value());
        }
        out
    }

    let a = trace();
    let b = trace();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.x.to_bits(), y.x.to_bits());
        assert_eq!(x.y.to_bits(), y.y.to_bits());
        assert_eq!(x.z.to_bits(), y.z.to_bits());
    }
}
