//! Triangle and segment tests for diagonal terrain.
//!
//! All tests are closed: touching counts as intersecting.

use ashfall_shared::math::{Rect, Vec2};

use crate::terrain::TileType;

/// A triangle as three vertices.
pub type Triangle = [Vec2; 3];

/// The solid half of a diagonal tile spanning `tile`.
///
/// `None` for anything that is not a diagonal wall.
#[must_use]
pub fn diagonal_triangle(kind: TileType, tile: &Rect) -> Option<Triangle> {
    let (x0, y0, x1, y1) = (tile.min_x(), tile.min_y(), tile.max_x(), tile.max_y());
    let (top_left, top_right) = (Vec2::new(x0, y0), Vec2::new(x1, y0));
    let (bottom_left, bottom_right) = (Vec2::new(x0, y1), Vec2::new(x1, y1));

    match kind {
        TileType::WallNE => Some([top_left, top_right, bottom_right]),
        TileType::WallNW => Some([top_left, top_right, bottom_left]),
        TileType::WallSE => Some([top_right, bottom_right, bottom_left]),
        TileType::WallSW => Some([top_left, bottom_left, bottom_right]),
        _ => None,
    }
}

/// Point in triangle, edges included. Works for either winding.
#[must_use]
pub fn point_in_triangle(p: Vec2, [a, b, c]: &Triangle) -> bool {
    let d1 = (*b - *a).cross(p - *a);
    let d2 = (*c - *b).cross(p - *b);
    let d3 = (*a - *c).cross(p - *c);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Segment `p1-p2` against `q1-q2`. Parallel segments never intersect.
#[must_use]
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let r = p2 - p1;
    let s = q2 - q1;
    let denom = r.cross(s);
    if denom == 0.0 {
        return false;
    }

    let offset = q1 - p1;
    let t = offset.cross(s) / denom;
    let u = offset.cross(r) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Triangle against axis-aligned box.
///
/// Hits if a triangle vertex lies in the box, a box corner lies in the
/// triangle, or any pair of edges cross. An empty box never hits.
#[must_use]
pub fn triangle_intersects_aabb(triangle: &Triangle, aabb: &Rect) -> bool {
    if aabb.is_empty() {
        return false;
    }

    if triangle.iter().any(|v| aabb.contains_point(v.x, v.y)) {
        return true;
    }

    let corners = aabb.corners();
    if corners.iter().any(|&c| point_in_triangle(c, triangle)) {
        return true;
    }

    (0..3).any(|i| {
        let (a, b) = (triangle[i], triangle[(i + 1) % 3]);
        (0..4).any(|j| segments_intersect(a, b, corners[j], corners[(j + 1) % 4]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ne_tile() -> Triangle {
        diagonal_triangle(TileType::WallNE, &Rect::new(0.0, 0.0, 30.0, 30.0)).unwrap()
    }

    #[test]
    fn test_only_diagonals_have_triangles() {
        let tile = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(diagonal_triangle(TileType::Wall, &tile).is_none());
        assert!(diagonal_triangle(TileType::Floor, &tile).is_none());
        assert!(diagonal_triangle(TileType::Ramp { layer: 1 }, &tile).is_none());
        assert!(diagonal_triangle(TileType::WallSW, &tile).is_some());
    }

    #[test]
    fn test_point_in_triangle_either_winding() {
        let tri = ne_tile();
        let reversed = [tri[2], tri[1], tri[0]];

        for t in [tri, reversed] {
            assert!(point_in_triangle(Vec2::new(25.0, 5.0), &t));
            assert!(point_in_triangle(Vec2::new(15.0, 15.0), &t));
            assert!(!point_in_triangle(Vec2::new(5.0, 25.0), &t));
        }
    }

    #[test]
    fn test_parallel_segments_never_intersect() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!(!segments_intersect(a, b, Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0)));
        assert!(segments_intersect(a, b, Vec2::new(5.0, -5.0), Vec2::new(5.0, 5.0)));
        assert!(!segments_intersect(a, b, Vec2::new(5.0, 1.0), Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_vertex_inside_box() {
        let aabb = Rect::new(25.0, -5.0, 10.0, 10.0);
        assert!(triangle_intersects_aabb(&ne_tile(), &aabb));
    }

    #[test]
    fn test_box_inside_triangle() {
        let aabb = Rect::new(20.0, 2.0, 4.0, 4.0);
        assert!(triangle_intersects_aabb(&ne_tile(), &aabb));
    }

    #[test]
    fn test_edge_crossing_only() {
        // No vertex of either shape lies inside the other; only edges cross.
        let aabb = Rect::from_min_max(-10.0, 10.0, 40.0, 12.0);
        assert!(triangle_intersects_aabb(&ne_tile(), &aabb));
    }

    #[test]
    fn test_open_half_of_tile_is_clear() {
        let aabb = Rect::from_min_max(2.0, 18.0, 12.0, 28.0);
        assert!(!triangle_intersects_aabb(&ne_tile(), &aabb));
    }

    #[test]
    fn test_empty_box_never_hits() {
        assert!(!triangle_intersects_aabb(&ne_tile(), &Rect::new(20.0, 5.0, 0.0, 5.0)));
    }
}
