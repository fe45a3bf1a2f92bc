//! Planar point-mass flight under gravity and drag.
//!
//! State is `(x, y, vx, vy)`; x downrange, y up. Every scheme implements
//! [`Stepper`], so a sweep picks its scheme once and the inner loop is
//! monomorphized per stepper.
//!
//! A flight ends at the first of:
//! - a downward crossing of the ground plane (impact interpolated between the
//!   bracketing samples),
//! - the time bound (interpolated to the bound),
//! - the distance bound,
//! - the step cap `ceil(max_distance / (dt · 1 m/s))`, which returns the last
//!   sample as a best effort.

use core::f64::consts::FRAC_PI_2;

use nalgebra::Vector4;
use naval_shell_core::{CalcSettings, G};
use naval_shell_models::DragTerms;
use serde::{Deserialize, Serialize};

/// Phase-space state: x, y, vx, vy.
pub type Phase = Vector4<f64>;

/// Slowest average downrange progress the step cap allows for [m/s].
const MIN_PROGRESS: f64 = 1.0;
/// Absolute ceiling on steps per flight.
const STEP_CEILING: f64 = 50_000_000.0;

/// Time derivative of `s`.
#[inline]
pub fn derivative(drag: &DragTerms, s: &Phase) -> Phase {
    let (vx, vy) = (s[2], s[3]);
    let v = vx.hypot(vy);
    if v <= f64::EPSILON {
        return Phase::new(vx, vy, 0.0, -G);
    }
    let a = drag.deceleration(v, s[1]) / v;
    Phase::new(vx, vy, -a * vx, -G - a * vy)
}

/// One explicit integration scheme.
pub trait Stepper: Clone + Send + Sync {
    /// Advance `s` by `dt` given the derivative function `f`.
    fn step<F: Fn(&Phase) -> Phase>(&mut self, s: &Phase, dt: f64, f: &F) -> Phase;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardEuler;

impl Stepper for ForwardEuler {
    fn step<F: Fn(&Phase) -> Phase>(&mut self, s: &Phase, dt: f64, f: &F) -> Phase {
        s + f(s) * dt
    }
}

/// Heun's method.
#[derive(Clone, Copy, Debug, Default)]
pub struct RungeKutta2;

impl Stepper for RungeKutta2 {
    fn step<F: Fn(&Phase) -> Phase>(&mut self, s: &Phase, dt: f64, f: &F) -> Phase {
        let k1 = f(s);
        let k2 = f(&(s + k1 * dt));
        s + (k1 + k2) * (dt * 0.5)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RungeKutta4;

impl RungeKutta4 {
    fn step_from<F: Fn(&Phase) -> Phase>(s: &Phase, k1: &Phase, dt: f64, f: &F) -> Phase {
        let k2 = f(&(s + k1 * (dt * 0.5)));
        let k3 = f(&(s + k2 * (dt * 0.5)));
        let k4 = f(&(s + k3 * dt));
        s + (k1 + (k2 + k3) * 2.0 + k4) * (dt / 6.0)
    }
}

impl Stepper for RungeKutta4 {
    fn step<F: Fn(&Phase) -> Phase>(&mut self, s: &Phase, dt: f64, f: &F) -> Phase {
        let k1 = f(s);
        Self::step_from(s, &k1, dt, f)
    }
}

/// Five-step Adams-Bashforth; the first four steps are RK4.
#[derive(Clone, Debug)]
pub struct AdamsBashforth5 {
    /// f(n-1) .. f(n-4), newest first
    history: [Phase; 4],
    filled: usize,
}

impl Default for AdamsBashforth5 {
    fn default() -> Self {
        Self { history: [Phase::zeros(); 4], filled: 0 }
    }
}

impl Stepper for AdamsBashforth5 {
    fn step<F: Fn(&Phase) -> Phase>(&mut self, s: &Phase, dt: f64, f: &F) -> Phase {
        let fn0 = f(s);
        let next = if self.filled < self.history.len() {
            RungeKutta4::step_from(s, &fn0, dt, f)
        } else {
            let [f1, f2, f3, f4] = &self.history;
            s + (fn0 * 1901.0 - f1 * 2774.0 + f2 * 2616.0 - f3 * 1274.0 + f4 * 251.0)
                * (dt / 720.0)
        };
        self.history.rotate_right(1);
        self.history[0] = fn0;
        self.filled = (self.filled + 1).min(self.history.len());
        next
    }
}

/// RK4 until the flight-path angle drops to `switch_angle`, RK2 after.
#[derive(Clone, Copy, Debug)]
pub struct Hybrid {
    switch_angle: f64,
    switched: bool,
}

impl Hybrid {
    pub fn new(switch_angle_deg: f64) -> Self {
        Self { switch_angle: switch_angle_deg.to_radians(), switched: false }
    }
}

impl Stepper for Hybrid {
    fn step<F: Fn(&Phase) -> Phase>(&mut self, s: &Phase, dt: f64, f: &F) -> Phase {
        if !self.switched && s[3].atan2(s[2]) <= self.switch_angle {
            self.switched = true;
        }
        if self.switched {
            RungeKutta2.step(s, dt, f)
        } else {
            RungeKutta4.step(s, dt, f)
        }
    }
}

/// Runtime choice of integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    ForwardEuler,
    RungeKutta2,
    #[default]
    RungeKutta4,
    AdamsBashforth5,
    Hybrid,
}

/// Why a flight stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Ground,
    TimeLimit,
    DistanceLimit,
    StepCap,
    /// Launch angle outside (0°, 90°) for a ground-bounded flight
    Degenerate,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightLimits {
    pub dt: f64,
    pub x0: f64,
    pub y0: f64,
    /// Stop on a downward crossing of this height
    pub ground: Option<f64>,
    /// Stop once this much time has elapsed
    pub max_time: Option<f64>,
    pub max_distance: f64,
    pub keep_path: bool,
}

impl FlightLimits {
    /// Launch-to-impact flights of an angle sweep.
    pub fn impact(settings: &CalcSettings) -> Self {
        Self {
            dt: settings.dt_min,
            x0: settings.x0,
            y0: settings.y0,
            ground: Some(0.0),
            max_time: None,
            max_distance: settings.max_distance,
            keep_path: settings.keep_trajectories,
        }
    }

    /// Flight after perforating a plate, bounded by the fuse time.
    pub fn post_penetration(settings: &CalcSettings, fuse_time: f64) -> Self {
        Self {
            dt: settings.dtf,
            x0: settings.xf0,
            y0: settings.yf0,
            ground: None,
            max_time: Some(fuse_time),
            max_distance: settings.max_distance,
            keep_path: false,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn step_cap(&self) -> usize {
        let by_distance = (self.max_distance.abs() / (self.dt * MIN_PROGRESS)).ceil();
        let cap = match self.max_time {
            Some(t) => by_distance.min((t / self.dt).ceil() + 1.0),
            None => by_distance,
        };
        (cap.min(STEP_CEILING) as usize).max(1)
    }
}

/// End state of one flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Flight {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub steps: usize,
    pub termination: Termination,
    /// (x, y) samples, empty unless the limits asked to keep them
    pub path: Vec<[f64; 2]>,
}

impl Flight {
    fn new(time: f64, s: &Phase, steps: usize, termination: Termination, path: Vec<[f64; 2]>) -> Self {
        Self { time, x: s[0], y: s[1], vx: s[2], vy: s[3], steps, termination, path }
    }

    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    /// Angle below the horizontal [rad], as a positive magnitude.
    pub fn fall_angle(&self) -> f64 {
        (-self.vy).atan2(self.vx).abs()
    }
}

/// Fly one shell with a fresh copy of `stepper`.
pub fn integrate_with<S: Stepper>(
    mut stepper: S,
    drag: &DragTerms,
    speed: f64,
    angle: f64,
    limits: &FlightLimits,
) -> Flight {
    let mut s = Phase::new(limits.x0, limits.y0, speed * angle.cos(), speed * angle.sin());
    let mut path = Vec::new();
    if limits.keep_path {
        path.push([s[0], s[1]]);
    }

    if limits.ground.is_some() && !(angle > 0.0 && angle < FRAC_PI_2) {
        return Flight::new(0.0, &s, 0, Termination::Degenerate, path);
    }

    let f = |p: &Phase| derivative(drag, p);
    let dt = limits.dt;
    let cap = limits.step_cap();
    let mut t = 0.0;

    for steps in 1..=cap {
        let next = stepper.step(&s, dt, &f);

        let stop = if let Some(ground) = limits.ground.filter(|&g| s[1] > g && next[1] <= g) {
            Some(((s[1] - ground) / (s[1] - next[1]), Termination::Ground))
        } else if let Some(max_time) = limits.max_time.filter(|&m| t + dt >= m) {
            Some(((max_time - t) / dt, Termination::TimeLimit))
        } else if next[0] > limits.max_distance {
            Some(((limits.max_distance - s[0]) / (next[0] - s[0]), Termination::DistanceLimit))
        } else {
            None
        };

        if let Some((frac, termination)) = stop {
            let frac = frac.clamp(0.0, 1.0);
            let end = s + (next - s) * frac;
            if limits.keep_path {
                path.push([end[0], end[1]]);
            }
            return Flight::new(t + dt * frac, &end, steps, termination, path);
        }

        s = next;
        t += dt;
        if limits.keep_path {
            path.push([s[0], s[1]]);
        }
    }

    log::warn!(
        "flight at {:.3} deg hit the step cap ({cap} steps) at x = {:.1} m",
        angle.to_degrees(),
        s[0]
    );
    Flight::new(t, &s, cap, Termination::StepCap, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use naval_shell_core::AtmosphereModel;

    fn vacuum() -> DragTerms {
        DragTerms::new(0.0, 0.0, AtmosphereModel::SeaLevel)
    }

    fn yamato_drag() -> DragTerms {
        DragTerms::new(0.5 * 0.292 * 0.23 * 0.23 * core::f64::consts::PI / 1460.0, 0.0, AtmosphereModel::SeaLevel)
    }

    fn limits() -> FlightLimits {
        FlightLimits::impact(&CalcSettings::default())
    }

    #[test]
    fn vacuum_range_matches_closed_form() {
        let v = 300.0;
        let a = 30f64.to_radians();
        let flight = integrate_with(RungeKutta4, &vacuum(), v, a, &limits());
        let expected = v * v * (2.0 * a).sin() / G;
        assert_eq!(flight.termination, Termination::Ground);
        assert_relative_eq!(flight.x, expected, max_relative = 1e-6);
        assert_relative_eq!(flight.time, 2.0 * v * a.sin() / G, max_relative = 1e-6);
        assert!(flight.y.abs() < 1e-6);
    }

    #[test]
    fn every_scheme_lands_on_the_ground_plane() {
        let drag = yamato_drag();
        let a = 20f64.to_radians();
        let reference = integrate_with(RungeKutta4, &drag, 780.0, a, &limits());
        let flights = [
            integrate_with(ForwardEuler, &drag, 780.0, a, &limits()),
            integrate_with(RungeKutta2, &drag, 780.0, a, &limits()),
            integrate_with(AdamsBashforth5::default(), &drag, 780.0, a, &limits()),
            integrate_with(Hybrid::new(0.0), &drag, 780.0, a, &limits()),
        ];
        for flight in flights {
            assert_eq!(flight.termination, Termination::Ground);
            assert!(flight.y.abs() < 1e-6);
            assert!(flight.steps < limits().step_cap());
            assert_relative_eq!(flight.x, reference.x, max_relative = 0.01);
        }
    }

    #[test]
    fn adams_bashforth_tracks_rk4_closely() {
        let drag = yamato_drag();
        let a = 35f64.to_radians();
        let rk4 = integrate_with(RungeKutta4, &drag, 780.0, a, &limits());
        let ab5 = integrate_with(AdamsBashforth5::default(), &drag, 780.0, a, &limits());
        assert_relative_eq!(ab5.x, rk4.x, max_relative = 1e-4);
        assert_relative_eq!(ab5.speed(), rk4.speed(), max_relative = 1e-4);
    }

    #[test]
    fn drag_shortens_range_and_steepens_fall() {
        let a = 20f64.to_radians();
        let vac = integrate_with(RungeKutta4, &vacuum(), 780.0, a, &limits());
        let air = integrate_with(RungeKutta4, &yamato_drag(), 780.0, a, &limits());
        assert!(air.x < vac.x);
        assert!(air.speed() < 780.0);
        assert!(air.fall_angle() > a);
    }

    #[test]
    fn degenerate_angles_do_not_move() {
        for deg in [0.0, -5.0, 90.0, 120.0] {
            let flight = integrate_with(RungeKutta4, &yamato_drag(), 780.0, f64::to_radians(deg), &limits());
            assert_eq!(flight.termination, Termination::Degenerate);
            assert_eq!(flight.x, 0.0);
            assert_eq!(flight.time, 0.0);
            assert_eq!(flight.steps, 0);
        }
    }

    #[test]
    fn time_bound_is_interpolated() {
        let settings = CalcSettings { dtf: 0.003, ..CalcSettings::default() };
        let limits = FlightLimits::post_penetration(&settings, 0.01);
        let flight = integrate_with(RungeKutta4, &vacuum(), 400.0, -0.2, &limits);
        assert_eq!(flight.termination, Termination::TimeLimit);
        assert_relative_eq!(flight.time, 0.01, epsilon = 1e-12);
        assert_relative_eq!(flight.x, 400.0 * 0.2f64.cos() * 0.01, max_relative = 1e-9);
    }

    #[test]
    fn distance_bound_stops_the_flight() {
        let l = FlightLimits { max_distance: 5_000.0, ..limits() };
        let flight = integrate_with(RungeKutta4, &yamato_drag(), 780.0, 30f64.to_radians(), &l);
        assert_eq!(flight.termination, Termination::DistanceLimit);
        assert_relative_eq!(flight.x, 5_000.0, epsilon = 1e-6);
    }

    #[test]
    fn step_cap_returns_best_effort_sample() {
        // 20 m / (0.1 s · 1 m/s) = 200 steps; a near-vertical shot is still
        // climbing after 20 s and has drifted only about 10 m downrange
        let l = FlightLimits { dt: 0.1, max_distance: 20.0, ..limits() };
        let a = 89.9f64.to_radians();
        let flight = integrate_with(RungeKutta4, &vacuum(), 300.0, a, &l);
        assert_eq!(l.step_cap(), 200);
        assert_eq!(flight.termination, Termination::StepCap);
        assert_eq!(flight.steps, 200);
        assert_relative_eq!(flight.time, 20.0, max_relative = 1e-9);
        assert_relative_eq!(flight.x, 300.0 * a.cos() * 20.0, max_relative = 1e-9);
        assert!(flight.y > 0.0);
    }

    #[test]
    fn hybrid_switches_to_rk2_below_the_switch_angle() {
        let drag = yamato_drag();
        let a = 30f64.to_radians();
        let rk4 = integrate_with(RungeKutta4, &drag, 780.0, a, &limits());
        let rk2 = integrate_with(RungeKutta2, &drag, 780.0, a, &limits());

        // already below a 60 deg switch at launch: RK2 throughout
        assert_eq!(integrate_with(Hybrid::new(60.0), &drag, 780.0, a, &limits()), rk2);
        // the path angle never reaches -90 deg: RK4 throughout
        assert_eq!(integrate_with(Hybrid::new(-90.0), &drag, 780.0, a, &limits()), rk4);

        // switch at the apex: neither pure scheme, but close to both
        let hybrid = integrate_with(Hybrid::new(0.0), &drag, 780.0, a, &limits());
        assert_ne!(hybrid.x, rk4.x);
        assert_ne!(hybrid.x, rk2.x);
        assert_relative_eq!(hybrid.x, rk4.x, max_relative = 1e-3);
    }

    #[test]
    fn scheme_names_in_json() {
        assert_eq!(serde_json::to_string(&Scheme::AdamsBashforth5).unwrap(), r#""adams_bashforth5""#);
        assert_eq!(serde_json::to_string(&Scheme::ForwardEuler).unwrap(), r#""forward_euler""#);
        let scheme: Scheme = serde_json::from_str(r#""runge_kutta2""#).unwrap();
        assert_eq!(scheme, Scheme::RungeKutta2);
        let scheme: Scheme = serde_json::from_str(r#""hybrid""#).unwrap();
        assert_eq!(scheme, Scheme::Hybrid);
        assert_eq!(Scheme::default(), Scheme::RungeKutta4);
    }

    #[test]
    fn path_is_kept_on_request() {
        let l = FlightLimits { keep_path: true, ..limits() };
        let flight = integrate_with(RungeKutta4, &yamato_drag(), 780.0, 10f64.to_radians(), &l);
        assert_eq!(flight.path.len(), flight.steps + 1);
        assert_eq!(flight.path[0], [0.0, 0.0]);
        let last = flight.path.last().unwrap();
        assert_relative_eq!(last[0], flight.x);

        let bare = integrate_with(RungeKutta4, &yamato_drag(), 780.0, 10f64.to_radians(), &limits());
        assert!(bare.path.is_empty());
    }
}
