//! Offline motion traces
//!
//! Runs one data motion through a broadcaster and mixer exactly as a game
//! would, with preset and override changes scheduled on frame numbers.

use anyhow::{anyhow, Context, Result};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::str::FromStr;
use sway_core::Animatable;
use sway_motion::{
    BroadcastCommand, DataKind, DataMotion, FixedTimestep, MotionDataBroadcaster, MotionLibrary,
    MotionMixer,
};

/// A broadcaster change applied at the start of a frame
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Push(String),
    Pop(String),
    Override(String),
    Clear(String),
}

/// `FRAME:ACTION:NAME`, e.g. `60:push:aiming` or `90:clear:camera_shake`
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledEvent {
    pub frame: u32,
    pub action: Action,
}

impl FromStr for ScheduledEvent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(frame), Some(action), Some(name)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected FRAME:ACTION:NAME, got `{s}`"));
        };
        let frame = frame
            .parse()
            .map_err(|_| format!("invalid frame number `{frame}`"))?;
        if name.is_empty() {
            return Err(format!("missing name in `{s}`"));
        }
        let name = name.to_string();
        let action = match action {
            "push" => Action::Push(name),
            "pop" => Action::Pop(name),
            "override" => Action::Override(name),
            "clear" => Action::Clear(name),
            other => {
                return Err(format!(
                    "unknown action `{other}` (expected push, pop, override or clear)"
                ))
            }
        };
        Ok(Self { frame, action })
    }
}

/// Simulation settings
#[derive(Clone, Debug)]
pub struct SimulateOptions {
    pub kind: DataKind,
    /// Fixed simulation rate
    pub hz: f32,
    /// Host frame rate
    pub fps: f32,
    pub frames: u32,
    /// Record every n-th frame
    pub every: u32,
    pub events: Vec<ScheduledEvent>,
}

/// One recorded frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample<T> {
    pub frame: u32,
    pub time: f32,
    pub value: T,
}

/// Run the simulation and collect the mixer output
pub fn simulate<T: Animatable>(
    library: &MotionLibrary,
    options: &SimulateOptions,
) -> Result<Vec<Sample<T>>> {
    let fallback = library
        .fallback_for(&options.kind)
        .cloned()
        .with_context(|| format!("No motion data of kind `{}` in library", options.kind))?;
    let schedule = resolve_events(library, &options.events)?;

    let mut broadcaster = MotionDataBroadcaster::new();
    library.install_defaults(&mut broadcaster);

    let motion = Rc::new(RefCell::new(DataMotion::<T>::new(fallback)?));
    broadcaster.register(&motion)?;

    let mut mixer = MotionMixer::new(T::ZERO).with_timestep(FixedTimestep::from_hz(options.hz));
    mixer.add_shared(&motion);

    let queue = broadcaster.queue();
    let frame_dt = 1.0 / options.fps;
    let every = options.every.max(1);
    let mut samples = Vec::with_capacity((options.frames / every) as usize + 1);

    for frame in 0..options.frames {
        for (_, command) in schedule.iter().filter(|(at, _)| *at == frame) {
            queue.push(command.clone());
        }
        broadcaster.apply_queued();
        mixer.update(frame_dt);

        if frame % every == 0 {
            samples.push(Sample {
                frame,
                time: (frame + 1) as f32 * frame_dt,
                value: mixer.current_value(),
            });
        }
    }

    tracing::debug!(
        frames = options.frames,
        ticks = mixer.tick_count(),
        unstable = motion.borrow().motion().unstable_steps(),
        "simulation finished"
    );
    Ok(samples)
}

/// Turn named events into broadcaster commands, failing on unknown names
fn resolve_events(
    library: &MotionLibrary,
    events: &[ScheduledEvent],
) -> Result<Vec<(u32, BroadcastCommand)>> {
    events
        .iter()
        .map(|event| {
            let command = match &event.action {
                Action::Push(name) => BroadcastCommand::PushPreset(
                    library
                        .preset(name)
                        .cloned()
                        .ok_or_else(|| anyhow!("Unknown preset `{name}`"))?,
                ),
                Action::Pop(name) => BroadcastCommand::PopPreset(
                    library
                        .preset(name)
                        .cloned()
                        .ok_or_else(|| anyhow!("Unknown preset `{name}`"))?,
                ),
                Action::Override(name) => BroadcastCommand::SetOverride(
                    library
                        .data(name)
                        .cloned()
                        .ok_or_else(|| anyhow!("Unknown motion data `{name}`"))?,
                ),
                Action::Clear(kind) => {
                    BroadcastCommand::ClearOverride(DataKind::from(kind.as_str()))
                }
            };
            Ok((event.frame, command))
        })
        .collect()
}

/// Write samples as whitespace-separated columns
pub fn print_trace<T: Animatable>(out: &mut impl Write, samples: &[Sample<T>]) -> Result<()> {
    write!(out, "{:>6} {:>9}", "frame", "time")?;
    for i in 0..T::COMPONENTS {
        write!(out, " {:>11}", format!("c{i}"))?;
    }
    writeln!(out)?;

    for sample in samples {
        write!(out, "{:>6} {:>9.4}", sample.frame, sample.time)?;
        for i in 0..T::COMPONENTS {
            write!(out, " {:>11.6}", sample.value.component(i))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
