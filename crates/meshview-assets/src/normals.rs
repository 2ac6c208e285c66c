//! Per-vertex normal generation

use glam::Vec3;

/// Compute smooth per-vertex normals for an indexed triangle list.
///
/// Each triangle adds its unnormalized face normal (the cross product of
/// the two edges leaving a corner) to all three of its vertices, so larger
/// faces weigh more. Accumulated normals are then normalized. A vertex no
/// triangle touches keeps a zero normal.
///
/// # Panics
///
/// Panics if an index is not smaller than `positions.len()`.
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (p0, p1, p2) = (positions[i0], positions[i1], positions[i2]);

        let e01 = p1 - p0;
        let e12 = p2 - p1;
        let e20 = p0 - p2;

        normals[i0] += e01.cross(-e20);
        normals[i1] += e12.cross(-e01);
        normals[i2] += e20.cross(-e12);
    }

    for normal in &mut normals {
        if normal.length() > 0.0 {
            *normal = normal.normalize();
        }
    }

    normals
}
