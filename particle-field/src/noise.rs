use crate::field::RandomSource;

/// Lattice noise over a shuffled permutation table.
///
/// Coordinates are floored and masked to the 256-cell lattice, so the value is
/// constant inside each unit cube and changes from cube to cube.
#[derive(Clone, Debug)]
pub struct LatticeNoise {
    perm: [u8; 512],
}

impl LatticeNoise {
    pub fn new<R: RandomSource>(rng: &mut R) -> Self {
        let mut p = [0u8; 256];
        for (i, slot) in p.iter_mut().enumerate() {
            *slot = i as u8;
        }
        for i in 0..256 {
            let j = ((rng.next_f32() * 256.0) as usize).min(255);
            p.swap(i, j);
        }

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = p[i & 255];
        }
        Self { perm }
    }

    /// Noise value in `[0, 1]`
    pub fn noise3d(&self, x: f32, y: f32, z: f32) -> f32 {
        let xi = lattice(x);
        let yi = lattice(y);
        let zi = lattice(z);
        let inner = self.perm[yi + self.perm[zi] as usize] as usize;
        self.perm[xi + inner] as f32 / 255.0
    }

    #[cfg(test)]
    pub(crate) fn table(&self) -> &[u8; 512] {
        &self.perm
    }
}

fn lattice(value: f32) -> usize {
    ((value.floor() as i64) & 255) as usize
}
