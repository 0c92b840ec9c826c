//! Ring clean-up, fan triangulation and face normals.

use glam::DVec3;

/// The ring without its closing vertex (when the last point repeats the first).
pub fn open_ring(polygon: &[DVec3]) -> &[DVec3] {
    match polygon {
        [first, .., last] if first == last => &polygon[..polygon.len() - 1],
        _ => polygon,
    }
}

/// Check if the ring has at least three distinct points.
pub fn is_valid_ring(polygon: &[DVec3]) -> bool {
    let ring = open_ring(polygon);
    let mut distinct: Vec<DVec3> = Vec::with_capacity(3);
    for p in ring {
        if !distinct.contains(p) {
            distinct.push(*p);
            if distinct.len() == 3 {
                return true;
            }
        }
    }
    false
}

/// Fan-triangulate a ring from its first vertex.
///
/// Returns triangles as indices into [`open_ring`]: `(0, i, i + 1)` for `i` in
/// `1..n-1`. Rings with fewer than three vertices yield no triangles. Only convex,
/// planar rings come out right; concave rings give valid but overlapping triangles.
pub fn triangulate(polygon: &[DVec3]) -> Vec<[usize; 3]> {
    let n = open_ring(polygon).len();
    if n < 3 {
        return Vec::new();
    }
    (1..n - 1).map(|i| [0, i, i + 1]).collect()
}

/// Unit normal of the triangle `(v0, v1, v2)` by the right-hand rule.
///
/// Zero-area triangles yield the zero vector.
pub fn face_normal(v0: DVec3, v1: DVec3, v2: DVec3) -> DVec3 {
    (v1 - v0).cross(v2 - v0).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square() -> Vec<DVec3> {
        vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(4.0, 0.0, 0.0),
            DVec3::new(4.0, 0.0, 3.0),
            DVec3::new(0.0, 0.0, 3.0),
            DVec3::new(0.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_open_ring_drops_closing_vertex() {
        assert_eq!(open_ring(&square()).len(), 4);
        assert_eq!(open_ring(&square()[..4]).len(), 4);
        assert_eq!(open_ring(&[DVec3::ONE]).len(), 1);
        assert!(open_ring(&[]).is_empty());
    }

    #[test]
    fn test_closed_square_gives_two_triangles() {
        assert_eq!(triangulate(&square()), vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_ngon_triangle_count_and_coverage() {
        for n in 3..12usize {
            let ring: Vec<DVec3> = (0..n)
                .map(|i| {
                    let angle = i as f64 / n as f64 * std::f64::consts::TAU;
                    DVec3::new(angle.cos(), angle.sin(), 0.0)
                })
                .collect();
            let triangles = triangulate(&ring);
            assert_eq!(triangles.len(), n - 2);

            let mut used = vec![false; n];
            for triangle in &triangles {
                for &i in triangle {
                    assert!(i < n);
                    used[i] = true;
                }
            }
            assert!(used.iter().all(|&u| u));
        }
    }

    #[test]
    fn test_degenerate_rings() {
        let two = [DVec3::ZERO, DVec3::X];
        assert!(triangulate(&two).is_empty());
        assert!(!is_valid_ring(&two));
        let closed_two = [DVec3::ZERO, DVec3::X, DVec3::ZERO];
        assert!(triangulate(&closed_two).is_empty());
        assert!(!is_valid_ring(&closed_two));
        assert!(!is_valid_ring(&[DVec3::ZERO, DVec3::X, DVec3::X, DVec3::ZERO, DVec3::X]));
        assert!(is_valid_ring(&square()));
    }

    #[test]
    fn test_face_normal() {
        let n = face_normal(DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0), DVec3::new(0.0, 5.0, 0.0));
        assert_abs_diff_eq!(n.x, 0.0);
        assert_abs_diff_eq!(n.y, 0.0);
        assert_abs_diff_eq!(n.z, 1.0);

        let wall = square();
        let n = face_normal(wall[0], wall[1], wall[2]);
        assert_abs_diff_eq!(n.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_face_normal_degenerate_is_zero() {
        let n = face_normal(DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0));
        assert_eq!(n, DVec3::ZERO);
    }
}
