use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const LAYOUT_STREAM: u64 = 1;
/// Vegetation layer `i` draws from stream `VEGETATION_STREAM_BASE + i`.
pub const VEGETATION_STREAM_BASE: u64 = 16;

/// Independent, reproducible random stream for one generation stage.
pub fn stream_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}
