//! Force-directed layout state
//!
//! Velocity-Verlet style simulation with many-body repulsion, link springs and
//! x/y centering, cooled by an alpha schedule. Same parameters the page's
//! force library runs with, so server-side positions are a warm start for it.

use serde::{Deserialize, Serialize};

/// 2D position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct LayoutSettings {
    /// Many-body strength; negative repels
    pub charge: f64,
    /// Rest length of link springs
    pub link_distance: f64,
    /// Pull towards the origin on each axis
    pub center_strength: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub velocity_decay: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let alpha_min: f64 = 0.001;
        Self {
            charge: -100.0,
            link_distance: 30.0,
            center_strength: 0.1,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
        }
    }
}

#[derive(Debug, Clone)]
struct Body {
    pos: Point,
    vel: Point,
    pin: Option<Point>,
}

#[derive(Debug, Clone)]
struct Link {
    source: usize,
    target: usize,
    strength: f64,
    bias: f64,
}

/// Layout for a fixed node set
#[derive(Debug, Clone)]
pub struct ForceLayout {
    bodies: Vec<Body>,
    links: Vec<Link>,
    alpha: f64,
    alpha_target: f64,
    settings: LayoutSettings,
}

impl ForceLayout {
    /// Nodes are placed on a phyllotaxis spiral; links are index pairs
    pub fn new(node_count: usize, edges: &[(usize, usize)], settings: LayoutSettings) -> Self {
        let golden_angle = std::f64::consts::PI * (3.0 - 5f64.sqrt());
        let bodies = (0..node_count)
            .map(|i| {
                let radius = 10.0 * (0.5 + i as f64).sqrt();
                let angle = i as f64 * golden_angle;
                Body {
                    pos: Point::new(radius * angle.cos(), radius * angle.sin()),
                    vel: Point::default(),
                    pin: None,
                }
            })
            .collect();

        let mut degree = vec![0usize; node_count];
        for &(s, t) in edges {
            degree[s] += 1;
            degree[t] += 1;
        }
        let links = edges
            .iter()
            .map(|&(source, target)| {
                let (ds, dt) = (degree[source] as f64, degree[target] as f64);
                Link {
                    source,
                    target,
                    strength: 1.0 / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect();

        Self {
            bodies,
            links,
            alpha: 1.0,
            alpha_target: 0.0,
            settings,
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    /// Re-heat (or let cool, with 0) towards a target energy
    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target;
    }

    /// Cooled down and not being re-heated
    pub fn is_settled(&self) -> bool {
        self.alpha < self.settings.alpha_min && self.alpha_target < self.settings.alpha_min
    }

    pub fn position(&self, index: usize) -> Option<Point> {
        self.bodies.get(index).map(|b| b.pos)
    }

    pub fn positions(&self) -> Vec<Point> {
        self.bodies.iter().map(|b| b.pos).collect()
    }

    pub fn is_pinned(&self, index: usize) -> bool {
        self.bodies.get(index).is_some_and(|b| b.pin.is_some())
    }

    /// Fix a node at a point until unpinned
    pub fn pin(&mut self, index: usize, at: Point) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.pin = Some(at);
            body.pos = at;
            body.vel = Point::default();
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.pin = None;
        }
    }

    /// Advance one step
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.settings.alpha_decay;
        let alpha = self.alpha;

        self.apply_links(alpha);
        self.apply_charge(alpha);

        let center = self.settings.center_strength * alpha;
        let keep = 1.0 - self.settings.velocity_decay;
        for body in &mut self.bodies {
            body.vel.x += -body.pos.x * center;
            body.vel.y += -body.pos.y * center;
            match body.pin {
                Some(at) => {
                    body.pos = at;
                    body.vel = Point::default();
                }
                None => {
                    body.vel.x *= keep;
                    body.vel.y *= keep;
                    body.pos.x += body.vel.x;
                    body.pos.y += body.vel.y;
                }
            }
        }
    }

    /// Tick until settled or `max_ticks` reached; returns ticks run
    pub fn settle(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && !self.is_settled() {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    fn apply_links(&mut self, alpha: f64) {
        for link in &self.links {
            let (s, t) = (&self.bodies[link.source], &self.bodies[link.target]);
            let mut dx = t.pos.x + t.vel.x - s.pos.x - s.vel.x;
            let mut dy = t.pos.y + t.vel.y - s.pos.y - s.vel.y;
            if dx == 0.0 && dy == 0.0 {
                dx = 1e-6;
            }
            let len = (dx * dx + dy * dy).sqrt();
            let k = (len - self.settings.link_distance) / len * alpha * link.strength;
            dx *= k;
            dy *= k;
            let target = &mut self.bodies[link.target];
            target.vel.x -= dx * link.bias;
            target.vel.y -= dy * link.bias;
            let source = &mut self.bodies[link.source];
            source.vel.x += dx * (1.0 - link.bias);
            source.vel.y += dy * (1.0 - link.bias);
        }
    }

    fn apply_charge(&mut self, alpha: f64) {
        let n = self.bodies.len();
        let strength = self.settings.charge * alpha;
        for i in 0..n {
            let (mut fx, mut fy) = (0.0, 0.0);
            let pi = self.bodies[i].pos;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let pj = self.bodies[j].pos;
                let (dx, dy) = (pj.x - pi.x, pj.y - pi.y);
                let l2 = (dx * dx + dy * dy).max(1.0);
                fx += dx * strength / l2;
                fy += dy * strength / l2;
            }
            self.bodies[i].vel.x += fx;
            self.bodies[i].vel.y += fy;
        }
    }
}
