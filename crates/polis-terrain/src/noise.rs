use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::config::Fractal;

/// Fractal Brownian motion over OpenSimplex2 gradient noise, normalized to [-1, 1].
pub struct FractalNoise {
    noise: FastNoiseLite,
    octaves: u32,
    persistence: f32,
    lacunarity: f32,
    frequency: f32,
}

impl FractalNoise {
    pub fn new(seed: u64, cfg: &Fractal) -> Self {
        // fastnoise seeds are i32; fold the high half in so distinct u64 seeds stay distinct.
        let folded = (seed as u32) ^ ((seed >> 32) as u32);
        let mut noise = FastNoiseLite::with_seed(folded as i32);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        // Octave frequencies are applied to coordinates directly.
        noise.set_frequency(Some(1.0));
        Self {
            noise,
            octaves: cfg.octaves.max(1),
            persistence: cfg.persistence,
            lacunarity: cfg.lacunarity,
            frequency: cfg.frequency,
        }
    }

    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let mut amp = 1.0f32;
        let mut freq = self.frequency;
        let mut sum = 0.0f32;
        let mut total = 0.0f32;
        for octave in 0..self.octaves {
            // Offset each octave so lattice origins don't line up.
            let shift = octave as f32 * 31.7;
            sum += amp * self.noise.get_noise_2d(x * freq + shift, z * freq - shift);
            total += amp;
            amp *= self.persistence;
            freq *= self.lacunarity;
        }
        if total > 0.0 { sum / total } else { 0.0 }
    }
}
