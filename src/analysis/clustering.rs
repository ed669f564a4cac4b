use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// k-means parameters.
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Requested cluster count; clamped to the number of points.
    pub clusters: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            clusters: 100,
            max_iterations: 300,
            seed: 42,
        }
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the nearest centroid; ties go to the lowest index.
fn nearest(point: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared distance from the closest existing one.
fn init_centroids(points: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let mut centroids = vec![points[rng.gen_range(0..points.len())].clone()];
    let mut dist: Vec<f32> = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f32 = dist.iter().sum();
        let next = if total > 0.0 {
            let mut draw = rng.gen::<f32>() * total;
            let mut chosen = points.len() - 1;
            for (i, d) in dist.iter().enumerate() {
                if draw < *d {
                    chosen = i;
                    break;
                }
                draw -= d;
            }
            chosen
        } else {
            // Every point coincides with a centroid
            rng.gen_range(0..points.len())
        };
        let centroid = points[next].clone();
        for (d, p) in dist.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &centroid));
        }
        centroids.push(centroid);
    }
    centroids
}

/// Partition `points` into clusters with Lloyd's algorithm.
///
/// Returns one label in `0..k` per point, where `k` is the configured
/// cluster count clamped to `points.len()`. Iteration stops early once no
/// assignment changes. Empty input yields no labels.
#[must_use]
pub fn kmeans(points: &[Vec<f32>], config: &KMeansConfig) -> Vec<usize> {
    if points.is_empty() {
        return Vec::new();
    }
    let k = config.clusters.clamp(1, points.len());
    let dims = points[0].len();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut centroids = init_centroids(points, k, &mut rng);
    let mut labels: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();

    for _ in 0..config.max_iterations {
        let mut sums = vec![vec![0f32; dims]; k];
        let mut counts = vec![0usize; k];
        for (p, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            for (s, v) in sums[label].iter_mut().zip(p) {
                *s += v;
            }
        }
        // Empty clusters keep their previous centroid
        for ((centroid, sum), &count) in centroids.iter_mut().zip(sums).zip(&counts) {
            if count > 0 {
                *centroid = sum.into_iter().map(|s| s / count as f32).collect();
            }
        }

        let next: Vec<usize> = points.iter().map(|p| nearest(p, &centroids)).collect();
        if next == labels {
            break;
        }
        labels = next;
    }
    labels
}
