//! Reader for the whitespace-separated text mesh format:
//!
//! ```text
//! <vertex count>
//! <x> <y> <z>        (vertex count times)
//! <color count>
//! <r> <g> <b>        (color count times)
//! <triangle count>
//! <i0> <i1> <i2>     (triangle count times)
//! ```
//!
//! Line breaks carry no meaning; tokens may be split across lines freely.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::{FromStr, SplitAsciiWhitespace};

use glam::Vec3;
use tracing::debug;

use crate::error::{MalformedReason, MeshError, MeshSection};
use crate::mesh::{MeshData, MeshOptions};

/// Upper bound on capacity reserved from a declared count, so a corrupt
/// count can't trigger a huge allocation before the data runs out.
const MAX_PREALLOCATED: usize = 1 << 16;

/// Read and parse a mesh file, then apply the load-time options.
pub fn load_mesh(path: &Path, options: &MeshOptions) -> Result<MeshData, MeshError> {
    let source = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => MeshError::NotFound(path.to_path_buf()),
        _ => MeshError::Unreadable(path.to_path_buf(), e),
    })?;

    let mut mesh = parse_mesh(&source, path)?;
    mesh.apply_options(options);

    debug!(
        "Loaded mesh '{}': {} vertices, {} triangles",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    Ok(mesh)
}

/// Parse mesh text. `path` is only used to label errors.
pub fn parse_mesh(source: &str, path: &Path) -> Result<MeshData, MeshError> {
    let mut tokens = Tokens {
        inner: source.split_ascii_whitespace(),
        path,
    };

    let vertex_count = tokens.count(MeshSection::VertexCount)?;
    let positions = tokens.vec3s(MeshSection::Positions, vertex_count)?;

    let color_count = tokens.count(MeshSection::ColorCount)?;
    let colors = tokens.vec3s(MeshSection::Colors, color_count)?;

    let triangle_count = tokens.count(MeshSection::IndexCount)?;
    let indices = tokens.remaining_indices()?;

    let expected = triangle_count.saturating_mul(3);
    if indices.len() % 3 != 0 {
        return Err(MeshError::malformed(
            path,
            MalformedReason::IndexCountNotMultipleOfThree(indices.len()),
        ));
    }
    if indices.len() < expected {
        return Err(MeshError::Truncated {
            path: path.to_path_buf(),
            section: MeshSection::Indices,
            expected,
            found: indices.len(),
        });
    }
    if indices.len() > expected {
        return Err(MeshError::malformed(
            path,
            MalformedReason::TrailingIndexData {
                declared: triangle_count,
                found: indices.len(),
            },
        ));
    }

    let mesh = MeshData::new(positions, colors, indices);
    mesh.validate()
        .map_err(|reason| MeshError::malformed(path, reason))?;

    Ok(mesh)
}

struct Tokens<'a> {
    inner: SplitAsciiWhitespace<'a>,
    path: &'a Path,
}

impl<'a> Tokens<'a> {
    fn parse<T: FromStr>(&self, section: MeshSection, token: &str) -> Result<T, MeshError> {
        token.parse().map_err(|_| {
            MeshError::malformed(
                self.path,
                MalformedReason::InvalidToken {
                    section,
                    token: token.to_string(),
                },
            )
        })
    }

    fn truncated(&self, section: MeshSection, expected: usize, found: usize) -> MeshError {
        MeshError::Truncated {
            path: self.path.to_path_buf(),
            section,
            expected,
            found,
        }
    }

    fn count(&mut self, section: MeshSection) -> Result<usize, MeshError> {
        let token = self
            .inner
            .next()
            .ok_or_else(|| self.truncated(section, 1, 0))?;
        self.parse(section, token)
    }

    fn vec3s(&mut self, section: MeshSection, count: usize) -> Result<Vec<Vec3>, MeshError> {
        let expected = count.saturating_mul(3);
        let mut values = Vec::with_capacity(count.min(MAX_PREALLOCATED));

        for i in 0..count {
            let mut xyz = [0.0f32; 3];
            for (j, slot) in xyz.iter_mut().enumerate() {
                let token = self
                    .inner
                    .next()
                    .ok_or_else(|| self.truncated(section, expected, i * 3 + j))?;
                *slot = self.parse(section, token)?;
            }
            values.push(Vec3::from_array(xyz));
        }

        Ok(values)
    }

    fn remaining_indices(&mut self) -> Result<Vec<u32>, MeshError> {
        let path = self.path;
        self.inner
            .by_ref()
            .map(|token| {
                token.parse().map_err(|_| {
                    MeshError::malformed(
                        path,
                        MalformedReason::InvalidToken {
                            section: MeshSection::Indices,
                            token: token.to_string(),
                        },
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(source: &str) -> Result<MeshData, MeshError> {
        parse_mesh(source, Path::new("test.mesh"))
    }

    const TRIANGLE: &str = "3\n0 0 0\n1 0 0\n0 1 0\n0\n1\n0 1 2\n";

    #[test]
    fn parses_single_triangle() {
        let mut mesh = parse(TRIANGLE).unwrap();
        mesh.compute_normals();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.normals, vec![Vec3::Z; 3]);
        assert_eq!(mesh.colors, vec![Vec3::ONE; 3]);
    }

    #[test]
    fn tokens_may_span_lines_and_use_exponents() {
        let mesh = parse("3 0 0 0 1e0\n0 0\n0 1.0E+0\n0 2 0.5 0.25\n\n  0.125 1 1 1 1\n0\n1\n2").unwrap();
        assert_eq!(mesh.positions[1], Vec3::X);
        assert_eq!(mesh.colors[0], Vec3::new(0.5, 0.25, 0.125));
        assert_eq!(mesh.colors[1], Vec3::ONE);
        assert_eq!(mesh.colors[2], Vec3::ONE);
    }

    #[test]
    fn counts_round_trip() {
        let source = "4\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n4\n1 0 0\n0 1 0\n0 0 1\n1 1 0\n2\n0 1 2\n0 2 3\n";
        let mesh = parse(source).unwrap();
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.colors[3], Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn surplus_colors_are_dropped() {
        let source = "1\n0 0 0\n2\n0.1 0.2 0.3\n0.4 0.5 0.6\n0\n";
        let mesh = parse(source).unwrap();
        assert_eq!(mesh.colors, vec![Vec3::new(0.1, 0.2, 0.3)]);
    }

    #[test]
    fn seven_index_values_are_malformed() {
        let source = "3\n0 0 0\n1 0 0\n0 1 0\n0\n2\n0 1 2\n0 1 2\n0\n";
        match parse(source) {
            Err(MeshError::Malformed { path, reason }) => {
                assert_eq!(path, Path::new("test.mesh"));
                assert_eq!(reason, MalformedReason::IndexCountNotMultipleOfThree(7));
            }
            other => panic!("expected Malformed, got: {:?}", other),
        }

        let short = "3\n0 0 0\n1 0 0\n0 1 0\n0\n3\n0 1 2\n0 1 2\n0\n";
        assert!(matches!(parse(short), Err(MeshError::Malformed { .. })));
    }

    #[test]
    fn missing_triangles_are_truncated() {
        let source = "3\n0 0 0\n1 0 0\n0 1 0\n0\n2\n0 1 2\n";
        match parse(source) {
            Err(MeshError::Truncated {
                section,
                expected,
                found,
                ..
            }) => {
                assert_eq!(section, MeshSection::Indices);
                assert_eq!(expected, 6);
                assert_eq!(found, 3);
            }
            other => panic!("expected Truncated, got: {:?}", other),
        }
    }

    #[test]
    fn trailing_triangles_are_malformed() {
        let source = "3\n0 0 0\n1 0 0\n0 1 0\n0\n1\n0 1 2\n2 1 0\n";
        assert!(matches!(
            parse(source),
            Err(MeshError::Malformed {
                reason: MalformedReason::TrailingIndexData {
                    declared: 1,
                    found: 6
                },
                ..
            })
        ));
    }

    #[test]
    fn end_of_input_inside_positions_is_truncated() {
        match parse("2\n0 0 0\n1 0") {
            Err(MeshError::Truncated {
                section,
                expected,
                found,
                ..
            }) => {
                assert_eq!(section, MeshSection::Positions);
                assert_eq!(expected, 6);
                assert_eq!(found, 5);
            }
            other => panic!("expected Truncated, got: {:?}", other),
        }
    }

    #[test]
    fn missing_counts_are_truncated() {
        assert!(matches!(
            parse(""),
            Err(MeshError::Truncated {
                section: MeshSection::VertexCount,
                ..
            })
        ));
        assert!(matches!(
            parse("1 0 0 0"),
            Err(MeshError::Truncated {
                section: MeshSection::ColorCount,
                ..
            })
        ));
        assert!(matches!(
            parse("1 0 0 0 0"),
            Err(MeshError::Truncated {
                section: MeshSection::IndexCount,
                ..
            })
        ));
    }

    #[test]
    fn non_numeric_tokens_are_malformed() {
        let bad_color_count = "3\n0 0 0\n1 0 0\n0 1 0\nmany\n1\n0 1 2\n";
        match parse(bad_color_count) {
            Err(MeshError::Malformed {
                reason: MalformedReason::InvalidToken { section, token },
                ..
            }) => {
                assert_eq!(section, MeshSection::ColorCount);
                assert_eq!(token, "many");
            }
            other => panic!("expected Malformed, got: {:?}", other),
        }

        let negative_index = "3\n0 0 0\n1 0 0\n0 1 0\n0\n1\n0 -1 2\n";
        assert!(matches!(
            parse(negative_index),
            Err(MeshError::Malformed {
                reason: MalformedReason::InvalidToken {
                    section: MeshSection::Indices,
                    ..
                },
                ..
            })
        ));
    }

    #[test]
    fn out_of_range_index_is_malformed() {
        let source = "3\n0 0 0\n1 0 0\n0 1 0\n0\n1\n0 1 3\n";
        assert!(matches!(
            parse(source),
            Err(MeshError::Malformed {
                reason: MalformedReason::IndexOutOfRange {
                    index: 3,
                    vertex_count: 3
                },
                ..
            })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        match load_mesh(&path, &MeshOptions::default()) {
            Err(MeshError::NotFound(p)) => assert_eq!(p, path),
            other => panic!("expected NotFound, got: {:?}", other),
        }
    }

    #[test]
    fn load_applies_options() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "3\n2 0 0\n4 0 0\n2 3 0\n0\n1\n0 1 2\n").unwrap();

        let options = MeshOptions {
            centered: true,
            compute_normals: true,
        };
        let mesh = load_mesh(file.path(), &options).unwrap();

        assert!(mesh.is_centered());
        assert!(mesh.centroid().unwrap().length() < 1e-6);
        assert!(mesh.normals.iter().all(|n| (*n - Vec3::Z).length() < 1e-6));

        let raw = load_mesh(
            file.path(),
            &MeshOptions {
                centered: false,
                compute_normals: false,
            },
        )
        .unwrap();
        assert_eq!(raw.positions[0], Vec3::new(2.0, 0.0, 0.0));
        assert!(raw.normals.iter().all(|n| *n == Vec3::ZERO));
    }
}
