//! Spring system - the three-point simulation whose state log feeds the movie.
//!
//! Point masses are connected by length springs (rest distance) and torsion
//! springs (rest angle of the start->end vector). Each step accumulates the
//! spring forces and integrates the points explicitly.

use std::f64::consts::FRAC_PI_2;

use crate::schema::{FIELDS_PER_POINT, Point, Record};

/// Proportional gain (spring constant).
pub const DEFAULT_KP: f64 = 2.0;
/// Derivative gain (damping constant).
pub const DEFAULT_KD: f64 = 0.3;
/// Integration time step.
pub const STEP_DT: f64 = 0.04;
/// Look-ahead used to estimate a torsion spring's angular rate.
pub const TORSION_PROBE_DT: f64 = 0.01;

/// What a spring constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpringKind {
    /// Distance between the endpoints.
    Length,
    /// Angle of the start->end vector.
    Torsion,
}

/// A damped spring between two points of a [`SpringSystem`].
#[derive(Debug, Clone)]
pub struct Spring {
    pub kp: f64,
    pub kd: f64,
    /// Rest length, or rest angle in radians for torsion springs.
    pub rest: f64,
    pub start: usize,
    pub end: usize,
    pub kind: SpringKind,
}

impl Spring {
    pub fn new(start: usize, end: usize, rest: f64, kind: SpringKind) -> Self {
        Self {
            kp: DEFAULT_KP,
            kd: DEFAULT_KD,
            rest,
            start,
            end,
            kind,
        }
    }

    /// Forces on the start and end point.
    pub fn forces(&self, a: &Body, b: &Body) -> [(f64, f64); 2] {
        match self.kind {
            SpringKind::Length => self.length_forces(a, b),
            SpringKind::Torsion => self.torsion_forces(a, b),
        }
    }

    fn length_forces(&self, a: &Body, b: &Body) -> [(f64, f64); 2] {
        let dx = b.position.x - a.position.x;
        let dy = b.position.y - a.position.y;
        let dist = dx.hypot(dy);
        let err = dist - self.rest;

        // Relative velocity projected onto the spring axis
        let rvx = b.velocity.0 - a.velocity.0;
        let rvy = b.velocity.1 - a.velocity.1;
        let closing = (rvx * dx + rvy * dy) / dist;

        let f = self.kp * err + self.kd * closing;
        let fx = f * dx / dist;
        let fy = f * dy / dist;
        [(fx, fy), (-fx, -fy)]
    }

    fn torsion_forces(&self, a: &Body, b: &Body) -> [(f64, f64); 2] {
        let angle = (b.position.y - a.position.y).atan2(b.position.x - a.position.x);
        let err = self.rest - angle;

        let pa = a.advanced(TORSION_PROBE_DT);
        let pb = b.advanced(TORSION_PROBE_DT);
        let probed = (pb.y - pa.y).atan2(pb.x - pa.x);
        let rate = (probed - angle) / TORSION_PROBE_DT;

        let torque = self.kp * err - self.kd * rate;

        let dx = b.position.x - a.position.x;
        let dy = b.position.y - a.position.y;
        let f = torque / dx.hypot(dy);

        let fx = f * dy;
        let fy = -f * dx;
        [(fx, fy), (-fx, -fy)]
    }
}

/// A unit point mass.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Point,
    pub velocity: (f64, f64),
    pub force: (f64, f64),
    pub mass: f64,
}

impl Body {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            velocity: (0.0, 0.0),
            force: (0.0, 0.0),
            mass: 1.0,
        }
    }

    /// Position after coasting for `dt`.
    #[inline]
    pub fn advanced(&self, dt: f64) -> Point {
        Point::new(
            self.position.x + self.velocity.0 * dt,
            self.position.y + self.velocity.1 * dt,
        )
    }
}

/// A set of bodies and the springs between them.
#[derive(Debug, Clone, Default)]
pub struct SpringSystem {
    pub bodies: Vec<Body>,
    pub springs: Vec<Spring>,
}

impl SpringSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reference triangle: three unit-length springs plus a right-angle torsion on A-B.
    pub fn reference_triangle() -> Self {
        let mut system = Self::new();
        let a = system.add_body(0.0, 0.0);
        let b = system.add_body(1.0, 1.0);
        let c = system.add_body(1.0, 0.0);

        system.add_spring(b, c, 1.0);
        system.add_spring(a, c, 1.0);
        system.add_spring(a, b, 1.0);
        system.add_torsion(a, b, FRAC_PI_2);
        system
    }

    /// Add a body at rest and return its index.
    pub fn add_body(&mut self, x: f64, y: f64) -> usize {
        self.bodies.push(Body::at(x, y));
        self.bodies.len() - 1
    }

    /// Add a length spring and return its index.
    pub fn add_spring(&mut self, start: usize, end: usize, rest_length: f64) -> usize {
        self.springs
            .push(Spring::new(start, end, rest_length, SpringKind::Length));
        self.springs.len() - 1
    }

    /// Add a torsion spring and return its index.
    pub fn add_torsion(&mut self, start: usize, end: usize, rest_angle: f64) -> usize {
        self.springs
            .push(Spring::new(start, end, rest_angle, SpringKind::Torsion));
        self.springs.len() - 1
    }

    /// Advance the system by one time step.
    pub fn step(&mut self) {
        for body in &mut self.bodies {
            body.force = (0.0, 0.0);
        }

        for spring in &self.springs {
            let [fa, fb] = spring.forces(&self.bodies[spring.start], &self.bodies[spring.end]);
            let a = &mut self.bodies[spring.start].force;
            a.0 += fa.0;
            a.1 += fa.1;
            let b = &mut self.bodies[spring.end].force;
            b.0 += fb.0;
            b.1 += fb.1;
        }

        let dt = STEP_DT;
        for body in &mut self.bodies {
            let ax = body.force.0 / body.mass;
            let ay = body.force.1 / body.mass;
            // Velocity takes the full acceleration each step
            body.velocity.0 += ax;
            body.velocity.1 += ay;
            body.position.x += 0.5 * ax * dt * dt + body.velocity.0 * dt;
            body.position.y += 0.5 * ay * dt * dt + body.velocity.1 * dt;
        }
    }

    /// Current state as one log record: `x, y, vx, vy, fx, fy` per body.
    pub fn state_record(&self) -> Record {
        let mut fields = Vec::with_capacity(self.bodies.len() * FIELDS_PER_POINT);
        for body in &self.bodies {
            fields.extend_from_slice(&[
                body.position.x,
                body.position.y,
                body.velocity.0,
                body.velocity.1,
                body.force.0,
                body.force.1,
            ]);
        }
        Record::new(fields)
    }

    /// Record the initial state and the state after each of `steps` steps.
    pub fn run(&mut self, steps: u64) -> Vec<Record> {
        let mut records = Vec::with_capacity(steps as usize + 1);
        records.push(self.state_record());
        for _ in 0..steps {
            self.step();
            records.push(self.state_record());
        }
        records
    }
}

/// Format a record as one comma-separated log line (no newline).
pub fn format_record(record: &Record) -> String {
    record
        .fields
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
