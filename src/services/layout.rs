// src/services/layout.rs
//! Fruchterman–Reingold spring layout for the interaction graph.
//!
//! Initial positions come from a seeded `StdRng`, so the same graph and seed
//! always produce the same coordinates. Output is rescaled into [-1, 1].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::services::graph::InteractionGraph;

#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    pub iterations: usize,
    /// Optimal node distance.
    pub k: f64,
    pub seed: u64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            iterations: 50,
            k: 0.5,
            seed: 42,
        }
    }
}

/// Positions indexed like `graph.nodes()`.
pub fn spring_layout(graph: &InteractionGraph, params: LayoutParams) -> Vec<(f64, f64)> {
    let n = graph.nodes().len();
    match n {
        0 => return Vec::new(),
        1 => return vec![(0.0, 0.0)],
        _ => {}
    }

    // Undirected weighted adjacency; direction doesn't matter for attraction.
    let mut adj = vec![vec![0.0f64; n]; n];
    for ((from, to), w) in graph.edges() {
        if let (Some(i), Some(j)) = (graph.index_of(from), graph.index_of(to)) {
            adj[i][j] += f64::from(w);
            adj[j][i] += f64::from(w);
        }
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut pos: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
        .collect();

    let k = if params.k > 0.0 { params.k } else { (1.0 / n as f64).sqrt() };
    let mut t = 0.1;
    let dt = t / (params.iterations as f64 + 1.0);

    for _ in 0..params.iterations {
        let mut disp = vec![(0.0f64, 0.0f64); n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i].0 - pos[j].0;
                let dy = pos[i].1 - pos[j].1;
                let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                // repulsion k^2/d minus attraction A*d^2/k, along the unit vector
                let f = k * k / (dist * dist) - adj[i][j] * dist / k;
                disp[i].0 += dx * f;
                disp[i].1 += dy * f;
            }
        }
        for i in 0..n {
            let len = (disp[i].0 * disp[i].0 + disp[i].1 * disp[i].1).sqrt().max(0.01);
            pos[i].0 += disp[i].0 * t / len;
            pos[i].1 += disp[i].1 * t / len;
        }
        t -= dt;
    }

    rescale(pos)
}

/// Center on the mean and scale the largest extent to 1.
fn rescale(mut pos: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    let n = pos.len() as f64;
    let cx = pos.iter().map(|p| p.0).sum::<f64>() / n;
    let cy = pos.iter().map(|p| p.1).sum::<f64>() / n;
    let mut lim = 0.0f64;
    for p in pos.iter_mut() {
        p.0 -= cx;
        p.1 -= cy;
        lim = lim.max(p.0.abs()).max(p.1.abs());
    }
    if lim > 0.0 {
        for p in pos.iter_mut() {
            p.0 /= lim;
            p.1 /= lim;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> InteractionGraph {
        let mut g = InteractionGraph::new(["A", "B", "C"]);
        g.record_post("A", "@B @C");
        g.record_post("B", "@C");
        g
    }

    #[test]
    fn same_seed_same_layout() {
        let g = triangle();
        let a = spring_layout(&g, LayoutParams::default());
        let b = spring_layout(&g, LayoutParams::default());
        assert_eq!(a, b);
    }

    #[test]
    fn positions_fit_unit_box() {
        let g = triangle();
        let pos = spring_layout(&g, LayoutParams::default());
        assert_eq!(pos.len(), 3);
        for (x, y) in pos {
            assert!((-1.0..=1.0).contains(&x) && (-1.0..=1.0).contains(&y));
        }
    }

    #[test]
    fn degenerate_graphs() {
        let empty = InteractionGraph::new(Vec::<String>::new());
        assert!(spring_layout(&empty, LayoutParams::default()).is_empty());
        let single = InteractionGraph::new(["Solo"]);
        assert_eq!(spring_layout(&single, LayoutParams::default()), vec![(0.0, 0.0)]);
    }
}
