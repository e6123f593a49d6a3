//! Contour-merging tidy tree placement.
//!
//! Works bottom-up: every subtree keeps its left and right contour (one node
//! per level, positions relative to the subtree root). Each child subtree is
//! pushed right until, on every shared level, it keeps the requested separation
//! from the forest of its left siblings; the parent is then centred over its
//! first and last child. A top-down pass turns relative offsets into positions.

/// Per-level extreme nodes of a subtree: `(relative position, node)`.
#[derive(Debug, Clone)]
struct Contour {
    left: Vec<(f64, usize)>,
    right: Vec<(f64, usize)>,
}

impl Contour {
    fn single(node: usize) -> Self {
        Contour {
            left: vec![(0.0, node)],
            right: vec![(0.0, node)],
        }
    }

    /// Place `other` at `shift` to the right of this forest and merge contours.
    fn merge_right(&mut self, other: Contour, shift: f64) {
        for (level, &(x, node)) in other.right.iter().enumerate() {
            if level < self.right.len() {
                self.right[level] = (x + shift, node);
            } else {
                self.right.push((x + shift, node));
            }
        }
        let start = self.left.len().min(other.left.len());
        for &(x, node) in &other.left[start..] {
            self.left.push((x + shift, node));
        }
    }
}

/// Breadth-axis positions for a tree given in preorder as child lists.
///
/// `children[v]` lists the children of `v` in order; every child index is
/// greater than its parent's. `separation(a, b)` is the minimum gap between
/// neighbouring nodes `a` (left) and `b` (right) on the same level.
pub(crate) fn tidy_positions<F>(children: &[Vec<usize>], separation: F) -> Vec<f64>
where
    F: Fn(usize, usize) -> f64,
{
    let n = children.len();
    let mut offset = vec![0.0_f64; n];
    let mut contours: Vec<Option<Contour>> = (0..n).map(|_| None).collect();

    for v in (0..n).rev() {
        let kids = &children[v];
        if kids.is_empty() {
            contours[v] = Some(Contour::single(v));
            continue;
        }

        let mut placed: Vec<f64> = Vec::with_capacity(kids.len());
        let mut forest: Option<Contour> = None;
        for &child in kids {
            let contour = contours[child]
                .take()
                .unwrap_or_else(|| Contour::single(child));
            match forest.as_mut() {
                None => {
                    placed.push(0.0);
                    forest = Some(contour);
                }
                Some(forest) => {
                    let shift = forest
                        .right
                        .iter()
                        .zip(contour.left.iter())
                        .map(|(&(rx, rn), &(lx, ln))| rx + separation(rn, ln) - lx)
                        .fold(f64::NEG_INFINITY, f64::max);
                    placed.push(shift);
                    forest.merge_right(contour, shift);
                }
            }
        }

        let first = placed.first().copied().unwrap_or(0.0);
        let last = placed.last().copied().unwrap_or(0.0);
        let mid = (first + last) / 2.0;
        for (&child, &position) in kids.iter().zip(&placed) {
            offset[child] = position - mid;
        }

        let forest = forest.unwrap_or_else(|| Contour::single(v));
        let mut contour = Contour::single(v);
        contour
            .left
            .extend(forest.left.into_iter().map(|(x, node)| (x - mid, node)));
        contour
            .right
            .extend(forest.right.into_iter().map(|(x, node)| (x - mid, node)));
        contours[v] = Some(contour);
    }

    let mut positions = vec![0.0_f64; n];
    for v in 0..n {
        let base = positions[v];
        for &child in &children[v] {
            positions[child] = base + offset[child];
        }
    }
    positions
}
