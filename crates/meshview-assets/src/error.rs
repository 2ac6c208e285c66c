use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while loading a mesh file.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("mesh file not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error reading mesh '{0}': {1}")]
    Unreadable(PathBuf, #[source] std::io::Error),

    #[error("truncated mesh '{path}': expected {expected} {section} value(s), found {found}")]
    Truncated {
        path: PathBuf,
        section: MeshSection,
        expected: usize,
        found: usize,
    },

    #[error("malformed mesh '{path}': {reason}")]
    Malformed {
        path: PathBuf,
        reason: MalformedReason,
    },
}

impl MeshError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: MalformedReason) -> Self {
        Self::Malformed {
            path: path.into(),
            reason,
        }
    }
}

/// Why a mesh file was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The index section holds a number of integers that is not a multiple of 3
    IndexCountNotMultipleOfThree(usize),
    /// More index integers follow than the declared triangle count allows
    TrailingIndexData { declared: usize, found: usize },
    /// A triangle references a vertex that does not exist
    IndexOutOfRange { index: u32, vertex_count: usize },
    /// A token could not be read as the number its section requires
    InvalidToken { section: MeshSection, token: String },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexCountNotMultipleOfThree(count) => {
                write!(f, "index count {} is not divisible by 3", count)
            }
            Self::TrailingIndexData { declared, found } => write!(
                f,
                "{} triangle(s) declared but {} index values present",
                declared, found
            ),
            Self::IndexOutOfRange {
                index,
                vertex_count,
            } => write!(
                f,
                "index {} out of range for {} vertices",
                index, vertex_count
            ),
            Self::InvalidToken { section, token } => {
                write!(f, "invalid {} token '{}'", section, token)
            }
        }
    }
}

/// The part of the mesh file a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshSection {
    VertexCount,
    Positions,
    ColorCount,
    Colors,
    IndexCount,
    Indices,
}

impl fmt::Display for MeshSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::VertexCount => "vertex count",
            Self::Positions => "position",
            Self::ColorCount => "color count",
            Self::Colors => "color",
            Self::IndexCount => "index count",
            Self::Indices => "index",
        };
        f.write_str(name)
    }
}
