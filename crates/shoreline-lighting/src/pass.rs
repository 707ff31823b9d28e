//! Terrain strip pass: walks the grid row by row and hands lit triangle
//! strips to a [`GeometryEmitter`].

use crate::{LightingComposer, TerrainVertex};

/// Consumer of lit terrain triangle strips.
pub trait GeometryEmitter {
    fn emit_strip(&mut self, vertices: &[TerrainVertex]);
}

impl GeometryEmitter for Vec<Vec<TerrainVertex>> {
    fn emit_strip(&mut self, vertices: &[TerrainVertex]) {
        self.push(vertices.to_vec());
    }
}

/// Counters from one terrain pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Vertices handed to the emitter.
    pub vertices: usize,
    /// Vertices composed from scratch.
    pub computed: usize,
    /// Vertices served from the row cache.
    pub cache_hits: usize,
    /// Strips handed to the emitter.
    pub strips: usize,
    /// Vertex pairs refused by the composer.
    pub suppressed_pairs: usize,
}

/// Drives a [`LightingComposer`] over every row of the terrain.
pub struct TerrainPass<'c, 'a> {
    composer: &'c mut LightingComposer<'a>,
}

impl<'c, 'a> TerrainPass<'c, 'a> {
    pub fn new(composer: &'c mut LightingComposer<'a>) -> Self {
        Self { composer }
    }

    /// Emit one strip per unbroken run of vertex pairs.
    ///
    /// A refused pair flushes the strip collected so far. The last column of
    /// every row is always offered, and a row's trailing strip is emitted
    /// only if it holds more than one vertex.
    pub fn run<E: GeometryEmitter + ?Sized>(&mut self, emitter: &mut E) -> PassStats {
        let geometry = *self.composer.geometry();
        let mut stats = PassStats::default();
        self.composer.reset_pass();

        for row in 0..geometry.height - 1 {
            let y = geometry.yval(row);
            self.composer.clear_strip();

            for col in 0..geometry.width - 1 {
                if !self.composer.draw_pair(row, col, geometry.xval(col), y) {
                    stats.suppressed_pairs += 1;
                    if self.composer.strip_len() > 0 {
                        self.flush(emitter, &mut stats);
                    }
                }
            }
            let last = geometry.width - 1;
            if !self.composer.draw_pair(row, last, geometry.xval(last), y) {
                stats.suppressed_pairs += 1;
            }
            if self.composer.strip_len() > 1 {
                self.flush(emitter, &mut stats);
            }
            tracing::trace!(row, strips = stats.strips, "terrain row drawn");
        }
        self.composer.clear_strip();

        stats.computed = self.composer.computed();
        stats.cache_hits = self.composer.cache_hits();
        tracing::debug!(
            vertices = stats.vertices,
            computed = stats.computed,
            cache_hits = stats.cache_hits,
            strips = stats.strips,
            suppressed = stats.suppressed_pairs,
            "terrain pass complete"
        );
        stats
    }

    fn flush<E: GeometryEmitter + ?Sized>(&mut self, emitter: &mut E, stats: &mut PassStats) {
        emitter.emit_strip(self.composer.strip());
        stats.vertices += self.composer.strip_len();
        stats.strips += 1;
        self.composer.clear_strip();
    }
}
