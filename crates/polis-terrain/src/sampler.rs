use polis_geom::Vec2;

/// Read-only height query shared by every consumer of the terrain.
///
/// `None` means "no ground here" (outside the domain); callers treat it as
/// "don't place / don't collide" rather than an error.
pub trait HeightSampler {
    fn sample(&self, x: f32, z: f32) -> Option<f32>;

    /// Max absolute height delta between `(x, z)` and its four `±offset` axis
    /// neighbors. Missing samples count as infinitely steep.
    fn slope(&self, x: f32, z: f32, offset: f32) -> f32 {
        let Some(center) = self.sample(x, z) else {
            return f32::INFINITY;
        };
        let mut worst = 0.0f32;
        for (dx, dz) in [(offset, 0.0), (-offset, 0.0), (0.0, offset), (0.0, -offset)] {
            match self.sample(x + dx, z + dz) {
                Some(h) => worst = worst.max((h - center).abs()),
                None => return f32::INFINITY,
            }
        }
        worst
    }

    /// Central-difference gradient `(dh/dx, dh/dz)`.
    fn gradient(&self, x: f32, z: f32, step: f32) -> Option<Vec2> {
        let step = step.max(1e-3);
        let hx0 = self.sample(x - step, z)?;
        let hx1 = self.sample(x + step, z)?;
        let hz0 = self.sample(x, z - step)?;
        let hz1 = self.sample(x, z + step)?;
        Some(Vec2::new((hx1 - hx0) / (2.0 * step), (hz1 - hz0) / (2.0 * step)))
    }
}

impl<F> HeightSampler for F
where
    F: Fn(f32, f32) -> Option<f32>,
{
    #[inline]
    fn sample(&self, x: f32, z: f32) -> Option<f32> {
        self(x, z)
    }
}
