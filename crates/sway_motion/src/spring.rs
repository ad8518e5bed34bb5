//! Spring physics
//!
//! RK4-integrated damped harmonic oscillator. The solver is a pure function of
//! its inputs: it threads a [`SpringState`] through one time step and keeps no
//! state of its own. Large steps are split into substeps (or clamped) so the
//! integration stays stable for every parameter range the presets expose.

use sway_core::{Animatable, MotionError, Result};

/// Smallest stiffness the solver will integrate with
pub const MIN_STIFFNESS: f32 = 0.01;
/// Smallest damping coefficient the solver will integrate with
pub const MIN_DAMPING: f32 = 0.001;
/// Smallest mass the solver will integrate with
pub const MIN_MASS: f32 = 0.001;

/// Stiffness, damping and mass of a spring
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringParams {
    pub stiffness: f32,
    /// Damping coefficient (not ratio)
    pub damping: f32,
    pub mass: f32,
}

impl SpringParams {
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Build from a damping ratio (1.0 = critically damped)
    pub fn from_damping_ratio(stiffness: f32, ratio: f32, mass: f32) -> Self {
        let damping = ratio * 2.0 * (stiffness * mass).max(0.0).sqrt();
        Self::new(stiffness, damping, mass)
    }

    /// A gentle, slow spring (idle sway)
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    /// A wobbly spring with overshoot (landing bounce, UI pop)
    pub fn wobbly() -> Self {
        Self::new(180.0, 12.0, 1.0)
    }

    /// A stiff, snappy spring (recoil kick)
    pub fn stiff() -> Self {
        Self::new(400.0, 30.0, 1.0)
    }

    /// A very stiff spring with minimal oscillation (aim-down-sights)
    pub fn snappy() -> Self {
        Self::new(600.0, 40.0, 1.0)
    }

    /// A slow spring with no overshoot (critically damped)
    pub fn molasses() -> Self {
        Self::new(100.0, 20.0, 1.0)
    }

    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    pub fn damping_ratio(&self) -> f32 {
        self.damping / self.critical_damping()
    }

    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }

    pub fn is_critically_damped(&self) -> bool {
        (self.damping - self.critical_damping()).abs() < 0.01
    }

    pub fn is_overdamped(&self) -> bool {
        self.damping > self.critical_damping()
    }

    /// Largest overshoot past the target as a fraction of the initial
    /// displacement, for a spring released from rest.
    pub fn overshoot_bound(&self) -> f32 {
        let zeta = self.damping_ratio();
        if zeta >= 1.0 {
            0.0
        } else {
            (-zeta * std::f32::consts::PI / (1.0 - zeta * zeta).sqrt()).exp()
        }
    }

    /// Reject non-positive or non-finite parameters
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("stiffness", self.stiffness),
            ("damping", self.damping),
            ("mass", self.mass),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(MotionError::InvalidSpring(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Clamp every parameter to its safe minimum
    pub fn sanitized(&self) -> Self {
        fn floor(value: f32, min: f32) -> f32 {
            if value.is_finite() {
                value.max(min)
            } else {
                min
            }
        }
        Self {
            stiffness: floor(self.stiffness, MIN_STIFFNESS),
            damping: floor(self.damping, MIN_DAMPING),
            mass: floor(self.mass, MIN_MASS),
        }
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::stiff()
    }
}

/// Value and velocity of one spring
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringState<T> {
    pub value: T,
    pub velocity: T,
}

impl<T: Animatable> SpringState<T> {
    /// At `value`, not moving
    pub fn at(value: T) -> Self {
        Self {
            value,
            velocity: T::ZERO,
        }
    }

    /// Within `epsilon` of `target` and moving slower than `velocity_epsilon`
    pub fn is_settled(&self, target: T, epsilon: f32, velocity_epsilon: f32) -> bool {
        (self.value - target).magnitude() < epsilon && self.velocity.magnitude() < velocity_epsilon
    }
}

impl<T: Animatable> Default for SpringState<T> {
    fn default() -> Self {
        Self::at(T::ZERO)
    }
}

/// Stability limits for the solver
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    /// Largest step integrated in one RK4 pass; longer steps are split
    pub stability_threshold: f32,
    /// Longest step accepted at all; anything above is clamped
    pub max_delta: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            stability_threshold: 1.0 / 30.0,
            max_delta: 0.25,
        }
    }
}

/// Diagnostics for one call to [`SpringSolver::advance`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Number of RK4 passes performed (0 when the step was skipped)
    pub substeps: u32,
    /// The step exceeded `max_delta` and was shortened
    pub clamped: bool,
    /// Integration produced a non-finite value and the previous state was kept
    pub rejected: bool,
}

impl StepReport {
    /// The caller supplied a step beyond the stability threshold
    pub fn exceeded_threshold(&self) -> bool {
        self.clamped || self.substeps > 1
    }
}

/// Stateless RK4 spring integrator
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpringSolver {
    config: SolverConfig,
}

impl SpringSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Advance `state` toward `target` by `dt` seconds
    pub fn advance<T: Animatable>(
        &self,
        state: SpringState<T>,
        params: &SpringParams,
        target: T,
        dt: f32,
    ) -> (SpringState<T>, StepReport) {
        let mut report = StepReport::default();
        if !dt.is_finite() || dt <= 0.0 {
            return (state, report);
        }

        let params = params.sanitized();
        let threshold = self.config.stability_threshold.max(f32::EPSILON);

        report.clamped = dt > self.config.max_delta;
        let dt = dt.min(self.config.max_delta);
        report.substeps = if dt > threshold {
            (dt / threshold).ceil() as u32
        } else {
            1
        };

        if report.exceeded_threshold() {
            tracing::trace!(
                dt,
                substeps = report.substeps,
                clamped = report.clamped,
                "spring step exceeded stability threshold"
            );
        }

        let h = dt / report.substeps as f32;
        let mut next = state;
        for _ in 0..report.substeps {
            next = rk4(next, &params, target, h);
        }

        if !next.value.is_finite() || !next.velocity.is_finite() {
            tracing::warn!(?params, dt, "spring integration diverged, holding last state");
            report.rejected = true;
            return (state, report);
        }

        (next, report)
    }
}

fn acceleration<T: Animatable>(params: &SpringParams, target: T, x: T, v: T) -> T {
    let spring_force = (target - x) * params.stiffness;
    let damping_force = v * -params.damping;
    (spring_force + damping_force) * (1.0 / params.mass)
}

fn rk4<T: Animatable>(
    s: SpringState<T>,
    params: &SpringParams,
    target: T,
    dt: f32,
) -> SpringState<T> {
    let half = dt * 0.5;

    let k1_v = acceleration(params, target, s.value, s.velocity);
    let k1_x = s.velocity;

    let k2_v = acceleration(params, target, s.value + k1_x * half, s.velocity + k1_v * half);
    let k2_x = s.velocity + k1_v * half;

    let k3_v = acceleration(params, target, s.value + k2_x * half, s.velocity + k2_v * half);
    let k3_x = s.velocity + k2_v * half;

    let k4_v = acceleration(params, target, s.value + k3_x * dt, s.velocity + k3_v * dt);
    let k4_x = s.velocity + k3_v * dt;

    SpringState {
        value: s.value + (k1_x + k2_x * 2.0 + k3_x * 2.0 + k4_x) * (dt / 6.0),
        velocity: s.velocity + (k1_v + k2_v * 2.0 + k3_v * 2.0 + k4_v) * (dt / 6.0),
    }
}

/// A self-contained spring chasing a settable target
#[derive(Clone, Copy, Debug)]
pub struct Spring<T> {
    params: SpringParams,
    state: SpringState<T>,
    target: T,
}

impl<T: Animatable> Spring<T> {
    pub fn new(params: SpringParams, initial: T) -> Self {
        Self {
            params,
            state: SpringState::at(initial),
            target: initial,
        }
    }

    pub fn value(&self) -> T {
        self.state.value
    }

    pub fn velocity(&self) -> T {
        self.state.velocity
    }

    pub fn state(&self) -> SpringState<T> {
        self.state
    }

    pub fn target(&self) -> T {
        self.target
    }

    pub fn set_target(&mut self, target: T) {
        self.target = target;
    }

    pub fn params(&self) -> &SpringParams {
        &self.params
    }

    /// Swap parameters; value and velocity carry over untouched
    pub fn set_params(&mut self, params: SpringParams) {
        self.params = params;
    }

    /// Overwrite value and velocity (pool reset, teleport)
    pub fn set_state(&mut self, state: SpringState<T>) {
        self.state = state;
    }

    /// Within half a thousandth of the target and nearly still
    pub fn is_settled(&self) -> bool {
        self.state.is_settled(self.target, 5e-4, 5e-3)
    }

    /// Advance with the default solver
    pub fn step(&mut self, dt: f32) -> StepReport {
        self.step_with(&SpringSolver::default(), dt)
    }

    pub fn step_with(&mut self, solver: &SpringSolver, dt: f32) -> StepReport {
        let (state, report) = solver.advance(self.state, &self.params, self.target, dt);
        self.state = state;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sway_core::Vec3;

    #[test]
    fn test_spring_settles_to_target() {
        let mut spring = Spring::new(SpringParams::stiff(), 0.0f32);
        spring.set_target(100.0);

        for _ in 0..120 {
            spring.step(1.0 / 60.0);
        }

        assert!((spring.value() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_spring_inherits_velocity() {
        let mut spring = Spring::new(SpringParams::wobbly(), 0.0f32);
        spring.set_target(100.0);

        for _ in 0..10 {
            spring.step(1.0 / 60.0);
        }

        let velocity = spring.velocity();
        assert!(velocity > 0.0);

        // Retargeting mid-flight keeps value and velocity
        spring.set_target(50.0);
        spring.set_params(SpringParams::gentle());
        assert_eq!(spring.velocity(), velocity);
    }

    #[test]
    fn test_spring_presets() {
        assert!(SpringParams::wobbly().is_underdamped());
        assert!(SpringParams::gentle().is_underdamped());
        assert!(SpringParams::stiff().is_underdamped());
        assert!(SpringParams::molasses().is_critically_damped());
    }

    #[test]
    fn test_damping_ratio_round_trip() {
        let params = SpringParams::from_damping_ratio(200.0, 0.5, 2.0);
        assert!((params.damping_ratio() - 0.5).abs() < 1e-5);
        assert!((params.damping - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_no_overshoot_when_critically_damped() {
        let solver = SpringSolver::default();
        let params = SpringParams::from_damping_ratio(300.0, 1.0, 1.0);
        let mut state = SpringState::at(0.0f32);
        let mut previous = 0.0;

        for _ in 0..600 {
            state = solver.advance(state, &params, 1.0, 1.0 / 60.0).0;
            assert!(state.value <= 1.0 + 1e-4, "overshot to {}", state.value);
            assert!(state.value >= previous - 1e-6, "not monotonic");
            previous = state.value;
        }
        assert!((state.value - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_overshoot_within_predicted_bound() {
        let solver = SpringSolver::default();
        for params in [SpringParams::wobbly(), SpringParams::gentle(), SpringParams::stiff()] {
            let bound = params.overshoot_bound();
            let mut state = SpringState::at(0.0f32);
            let mut peak = 0.0f32;
            for _ in 0..600 {
                state = solver.advance(state, &params, 1.0, 1.0 / 60.0).0;
                peak = peak.max(state.value);
            }
            assert!(peak - 1.0 <= bound + 1e-3, "{params:?}: peak {peak} bound {bound}");
            assert!((state.value - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_large_step_is_substepped() {
        let solver = SpringSolver::default();
        let params = SpringParams::snappy();
        let (state, report) = solver.advance(SpringState::at(0.0f32), &params, 1.0, 0.09);

        assert_eq!(report.substeps, 3);
        assert!(!report.clamped);
        assert!(report.exceeded_threshold());
        assert!(state.value.is_finite());
    }

    #[test]
    fn test_huge_step_is_clamped() {
        let solver = SpringSolver::default();
        let params = SpringParams::stiff();
        let mut state = SpringState::at(0.0f32);

        for _ in 0..20 {
            let (next, report) = solver.advance(state, &params, 1000.0, 5.0);
            assert!(report.clamped);
            state = next;
            assert!(state.value < 2000.0 && state.value > -500.0);
        }
    }

    #[test]
    fn test_non_positive_dt_is_noop() {
        let solver = SpringSolver::default();
        let start = SpringState {
            value: 0.5f32,
            velocity: 2.0,
        };
        for dt in [0.0, -1.0, f32::NAN] {
            let (state, report) = solver.advance(start, &SpringParams::stiff(), 1.0, dt);
            assert_eq!(state, start);
            assert_eq!(report.substeps, 0);
        }
    }

    #[test]
    fn test_invalid_params_fall_back_to_minimum() {
        let params = SpringParams::new(0.0, -3.0, 0.0);
        assert!(params.validate().is_err());

        let safe = params.sanitized();
        assert_eq!(safe.stiffness, MIN_STIFFNESS);
        assert_eq!(safe.damping, MIN_DAMPING);
        assert_eq!(safe.mass, MIN_MASS);

        let solver = SpringSolver::default();
        let (state, _) = solver.advance(SpringState::at(0.0f32), &params, 1.0, 1.0 / 60.0);
        assert!(state.value.is_finite());
    }

    #[test]
    fn test_vector_channels_match_scalar_recurrence() {
        let solver = SpringSolver::default();
        let params = SpringParams::wobbly();
        let mut scalar = SpringState::at(0.0f32);
        let mut vector = SpringState::at(Vec3::ZERO);
        let target = Vec3::new(1.0, 1.0, 1.0);

        for _ in 0..30 {
            scalar = solver.advance(scalar, &params, 1.0, 1.0 / 60.0).0;
            vector = solver.advance(vector, &params, target, 1.0 / 60.0).0;
        }

        assert_eq!(vector.value.x, scalar.value);
        assert_eq!(vector.value.y, scalar.value);
        assert_eq!(vector.value.z, scalar.value);
    }
}
