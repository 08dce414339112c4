//! Particle simulation behind the page background.
//!
//! Particles live in one contiguous `Vec<f32>`, `PROPS_PER_PARTICLE` slots
//! each. A frame draws every particle at its current position, then ages and
//! moves it, and re-initializes it once it leaves the padded viewport or
//! outlives its ttl.

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::noise::LatticeNoise;

/// x, y, vx, vy, life, ttl, radius, hue
pub const PROPS_PER_PARTICLE: usize = 8;

const X: usize = 0;
const Y: usize = 1;
const VX: usize = 2;
const VY: usize = 3;
const LIFE: usize = 4;
const TTL: usize = 5;
const RADIUS: usize = 6;
const HUE: usize = 7;

/// Uniform randomness in `[0, 1)`
pub trait RandomSource {
    fn next_f32(&mut self) -> f32;
}

/// Seedable xorshift generator for deterministic fields
#[derive(Clone, Debug)]
pub struct XorShift {
    state: u32,
}

impl XorShift {
    pub fn new(seed: u32) -> Self {
        // xorshift is stuck at zero
        Self { state: if seed == 0 { 0x9E37_79B9 } else { seed } }
    }
}

impl RandomSource for XorShift {
    fn next_f32(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        // 24 high bits keep the result strictly below 1.0
        (x >> 8) as f32 / (1u32 << 24) as f32
    }
}

/// Where a frame is drawn
pub trait Surface {
    /// Clear the whole surface to `color`
    fn fill_background(&mut self, width: f32, height: f32, color: &str);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str);
}

/// Tunables of the field. Every `*_range` is added on top of its base value
/// scaled by a random factor.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    pub particle_count: usize,
    pub base_speed: f32,
    pub range_speed: f32,
    pub base_ttl: f32,
    pub range_ttl: f32,
    pub base_radius: f32,
    pub range_radius: f32,
    pub range_hue: f32,
    /// Frequency of the noise lookup on all three axes
    pub noise_scale: f32,
    pub base_hue: f32,
    pub background: String,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 120,
            base_speed: 0.1,
            range_speed: 1.0,
            base_ttl: 150.0,
            range_ttl: 200.0,
            base_radius: 80.0,
            range_radius: 200.0,
            range_hue: 60.0,
            noise_scale: 0.0015,
            base_hue: 220.0,
            background: "hsla(0,0%,5%,1)".to_string(),
        }
    }
}

/// Triangle envelope over a lifetime: 0 at `t = 0` and `t = m`, 1 at `t = m / 2`
pub fn fade_in_out(t: f32, m: f32) -> f32 {
    if m <= 0.0 {
        return 0.0;
    }
    let half = 0.5 * m;
    (((t + half) % m) - half).abs() / half
}

/// Snapshot of one particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub ttl: f32,
    pub radius: f32,
    pub hue: f32,
}

impl Particle {
    pub fn alpha(&self) -> f32 {
        fade_in_out(self.life, self.ttl).clamp(0.0, 1.0)
    }

    /// Canvas fill color at the current alpha
    pub fn color(&self) -> String {
        format!("hsla({},60%,30%,{})", self.hue, self.alpha())
    }
}

pub struct ParticleField {
    config: FieldConfig,
    props: Vec<f32>,
    noise: LatticeNoise,
    base_hue: f32,
    width: f32,
    height: f32,
    frames: u64,
}

impl ParticleField {
    pub fn new<R: RandomSource>(config: FieldConfig, width: f32, height: f32, rng: &mut R) -> Self {
        let noise = LatticeNoise::new(rng);
        let mut field = Self {
            props: vec![0.0; config.particle_count * PROPS_PER_PARTICLE],
            base_hue: config.base_hue,
            config,
            noise,
            width,
            height,
            frames: 0,
        };
        for index in 0..field.len() {
            field.init_particle(index, rng);
        }
        field
    }

    pub fn len(&self) -> usize {
        self.props.len() / PROPS_PER_PARTICLE
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn base_hue(&self) -> f32 {
        self.base_hue
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn particle(&self, index: usize) -> Option<Particle> {
        let start = index * PROPS_PER_PARTICLE;
        let p = self.props.get(start..start + PROPS_PER_PARTICLE)?;
        Some(Particle {
            x: p[X],
            y: p[Y],
            vx: p[VX],
            vy: p[VY],
            life: p[LIFE],
            ttl: p[TTL],
            radius: p[RADIUS],
            hue: p[HUE],
        })
    }

    /// New viewport size; particles outside it are recycled on their next update
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Draw the current state, then advance every particle by one step
    pub fn frame<S: Surface, R: RandomSource>(&mut self, surface: &mut S, rng: &mut R) {
        surface.fill_background(self.width, self.height, &self.config.background);
        self.base_hue += 1.0;

        for index in 0..self.len() {
            if let Some(particle) = self.particle(index) {
                surface.fill_circle(particle.x, particle.y, particle.radius, &particle.color());
            }
            self.update_particle(index, rng);
        }
        self.frames += 1;
    }

    fn init_particle<R: RandomSource>(&mut self, index: usize, rng: &mut R) {
        let config = &self.config;
        let scale = config.noise_scale;
        let x = rng.next_f32() * self.width;
        let y = rng.next_f32() * self.height;
        // the drifting base hue moves the sample through the third axis
        let n = self.noise.noise3d(x * scale, y * scale, self.base_hue * scale);
        let theta = rng.next_f32() * TAU;
        let speed = config.base_speed + rng.next_f32() * config.range_speed;
        let values = [
            x,
            y,
            speed * theta.cos(),
            speed * theta.sin(),
            0.0,
            config.base_ttl + rng.next_f32() * config.range_ttl,
            config.base_radius + rng.next_f32() * config.range_radius,
            self.base_hue + n * config.range_hue,
        ];

        let start = index * PROPS_PER_PARTICLE;
        self.props[start..start + PROPS_PER_PARTICLE].copy_from_slice(&values);
    }

    fn update_particle<R: RandomSource>(&mut self, index: usize, rng: &mut R) {
        let start = index * PROPS_PER_PARTICLE;
        let p = &mut self.props[start..start + PROPS_PER_PARTICLE];
        let (x, y, radius) = (p[X], p[Y], p[RADIUS]);

        p[LIFE] += 1.0;
        p[X] += p[VX];
        p[Y] += p[VY];

        // bounds use the position the particle was drawn at
        let out_of_bounds =
            x < -radius || x > self.width + radius || y < -radius || y > self.height + radius;
        if out_of_bounds || p[LIFE] > p[TTL] {
            self.init_particle(index, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        backgrounds: Vec<String>,
        circles: Vec<(f32, f32, f32, String)>,
    }

    impl Surface for Recorder {
        fn fill_background(&mut self, _width: f32, _height: f32, color: &str) {
            self.backgrounds.push(color.to_string());
        }

        fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str) {
            self.circles.push((x, y, radius, color.to_string()));
        }
    }

    /// Always returns the same value
    struct Fixed(f32);

    impl RandomSource for Fixed {
        fn next_f32(&mut self) -> f32 {
            self.0
        }
    }

    fn field(count: usize, seed: u32) -> ParticleField {
        let config = FieldConfig {
            particle_count: count,
            ..FieldConfig::default()
        };
        ParticleField::new(config, 800.0, 600.0, &mut XorShift::new(seed))
    }

    #[test]
    fn fade_peaks_mid_life() {
        assert_eq!(fade_in_out(0.0, 200.0), 0.0);
        assert_eq!(fade_in_out(100.0, 200.0), 1.0);
        assert_eq!(fade_in_out(200.0, 200.0), 0.0);
        assert!((fade_in_out(50.0, 200.0) - 0.5).abs() < 1e-6);
        assert_eq!(fade_in_out(10.0, 0.0), 0.0);
    }

    #[test]
    fn xorshift_stays_in_unit_interval() {
        let mut rng = XorShift::new(0);
        for _ in 0..10_000 {
            let value = rng.next_f32();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn particles_start_inside_their_ranges() {
        let field = field(200, 42);
        assert_eq!(field.len(), 200);
        let config = field.config().clone();
        for index in 0..field.len() {
            let p = field.particle(index).unwrap();
            assert!((0.0..=800.0).contains(&p.x));
            assert!((0.0..=600.0).contains(&p.y));
            assert_eq!(p.life, 0.0);
            assert!(p.ttl >= config.base_ttl && p.ttl <= config.base_ttl + config.range_ttl);
            assert!(p.radius >= config.base_radius && p.radius <= config.base_radius + config.range_radius);
            assert!(p.hue >= config.base_hue && p.hue <= config.base_hue + config.range_hue);
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            assert!(speed >= config.base_speed - 1e-4);
            assert!(speed <= config.base_speed + config.range_speed + 1e-4);
        }
        assert!(field.particle(200).is_none());
    }

    #[test]
    fn frame_draws_then_moves() {
        let mut field = field(10, 5);
        let before: Vec<Particle> = (0..10).map(|i| field.particle(i).unwrap()).collect();
        let mut surface = Recorder::default();
        field.frame(&mut surface, &mut XorShift::new(6));

        assert_eq!(surface.backgrounds, vec!["hsla(0,0%,5%,1)".to_string()]);
        assert_eq!(surface.circles.len(), 10);
        for (drawn, particle) in surface.circles.iter().zip(&before) {
            assert_eq!((drawn.0, drawn.1, drawn.2), (particle.x, particle.y, particle.radius));
            // drawn at age 0
            assert!(drawn.3.ends_with(",0)"), "unexpected color {}", drawn.3);
        }
        for (index, particle) in before.iter().enumerate() {
            let after = field.particle(index).unwrap();
            assert_eq!(after.life, 1.0);
            assert!((after.x - (particle.x + particle.vx)).abs() < 1e-4);
            assert!((after.y - (particle.y + particle.vy)).abs() < 1e-4);
        }
    }

    #[test]
    fn base_hue_advances_once_per_frame() {
        let mut field = field(3, 8);
        let mut surface = Recorder::default();
        let mut rng = XorShift::new(9);
        for _ in 0..5 {
            field.frame(&mut surface, &mut rng);
        }
        assert_eq!(field.base_hue(), 225.0);
        assert_eq!(field.frames(), 5);
        assert_eq!(surface.backgrounds.len(), 5);
    }

    #[test]
    fn expired_particles_are_recycled() {
        let config = FieldConfig {
            particle_count: 1,
            base_ttl: 2.0,
            range_ttl: 0.0,
            base_speed: 0.0,
            range_speed: 0.0,
            ..FieldConfig::default()
        };
        let mut field = ParticleField::new(config, 800.0, 600.0, &mut Fixed(0.5));
        let mut surface = Recorder::default();
        let mut rng = Fixed(0.5);

        field.frame(&mut surface, &mut rng);
        field.frame(&mut surface, &mut rng);
        assert_eq!(field.particle(0).unwrap().life, 2.0);

        field.frame(&mut surface, &mut rng);
        let recycled = field.particle(0).unwrap();
        assert_eq!(recycled.life, 0.0);
        // picks up the hue drift of the frames so far
        assert!(recycled.hue >= 223.0 && recycled.hue <= 283.0, "hue {}", recycled.hue);
    }

    #[test]
    fn particles_leaving_the_viewport_are_recycled() {
        let mut field = field(1, 13);
        let start = field.particle(0).unwrap();
        // shrink so the particle sits far outside the padded bounds
        field.resize(-1000.0, -1000.0);
        field.frame(&mut Recorder::default(), &mut XorShift::new(2));
        assert_eq!(field.particle(0).unwrap().life, 0.0);
        assert_ne!(field.particle(0).unwrap(), start);
    }

    #[test]
    fn resize_keeps_particles() {
        let mut field = field(50, 21);
        let before: Vec<Particle> = (0..50).map(|i| field.particle(i).unwrap()).collect();
        field.resize(1024.0, 768.0);
        let after: Vec<Particle> = (0..50).map(|i| field.particle(i).unwrap()).collect();
        assert_eq!(before, after);
        assert_eq!((field.width(), field.height()), (1024.0, 768.0));
    }

    #[test]
    fn alpha_stays_in_unit_range() {
        let mut field = field(40, 77);
        let mut surface = Recorder::default();
        let mut rng = XorShift::new(78);
        for _ in 0..400 {
            field.frame(&mut surface, &mut rng);
            for index in 0..field.len() {
                let alpha = field.particle(index).unwrap().alpha();
                assert!((0.0..=1.0).contains(&alpha));
            }
        }
    }

    #[test]
    fn config_decodes_partial_json() {
        let config: FieldConfig = serde_json::from_str(r#"{"particle_count": 30}"#).unwrap();
        assert_eq!(config.particle_count, 30);
        assert_eq!(config.base_hue, 220.0);
        assert_eq!(config.background, "hsla(0,0%,5%,1)");
    }
}
