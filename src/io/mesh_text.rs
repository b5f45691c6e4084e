//! Whitespace-separated mesh and field reader.
//!
//! # Format
//! Triangle meshes start with the face count and the vertex count, followed
//! by three vertex indices per face. A file whose first character is `n`
//! holds arbitrary polygons instead: after the two counts every face lists
//! its vertex indices terminated by `-1`.
//!
//! The vertex coordinates follow, three numbers per declared vertex, and then
//! the field: three components per face or per declared vertex depending on
//! the [`FieldSampling`] the reader was built with.
//!
//! # Limitations
//! - Vertex indices are zero-based; there is no header or comment syntax.
//! - Declared vertices that no face references are dropped with a warning.

use std::io::Read;
use std::str::SplitWhitespace;

use super::{MeshInput, MeshReader};
use crate::flow::{FieldSampling, FieldSamples};
use crate::geometry::{SurfaceMesh, Vec3};
use crate::mesh_error::MeshMorseError;
use crate::topology::CellComplex;

/// Reader for the text mesh format.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeshTextReader {
    sampling: FieldSampling,
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn next_raw(&mut self, what: &str) -> Result<&'a str, MeshMorseError> {
        self.inner
            .next()
            .ok_or_else(|| MeshMorseError::MeshIoParse(format!("unexpected end of input reading {what}")))
    }

    fn next_count(&mut self, what: &str) -> Result<usize, MeshMorseError> {
        let raw = self.next_raw(what)?;
        raw.parse::<usize>()
            .map_err(|_| MeshMorseError::MeshIoParse(format!("invalid {what}: {raw}")))
    }

    fn next_index(&mut self) -> Result<i64, MeshMorseError> {
        let raw = self.next_raw("vertex index")?;
        raw.parse::<i64>()
            .map_err(|_| MeshMorseError::MeshIoParse(format!("invalid vertex index: {raw}")))
    }

    fn next_coord(&mut self, what: &str) -> Result<Option<f64>, MeshMorseError> {
        match self.inner.next() {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(Some)
                .map_err(|_| MeshMorseError::MeshIoParse(format!("invalid {what}: {raw}"))),
        }
    }

    /// Three numbers, `None` if the input ends before the first.
    fn next_vec3(&mut self, what: &str) -> Result<Option<Vec3>, MeshMorseError> {
        let Some(x) = self.next_coord(what)? else {
            return Ok(None);
        };
        let mut v = [x, 0.0, 0.0];
        for c in &mut v[1..] {
            *c = self
                .next_coord(what)?
                .ok_or_else(|| MeshMorseError::MeshIoParse(format!("truncated {what}")))?;
        }
        Ok(Some(v))
    }
}

fn to_vertex(raw: i64) -> Result<usize, MeshMorseError> {
    usize::try_from(raw)
        .map_err(|_| MeshMorseError::MeshIoParse(format!("negative vertex index: {raw}")))
}

impl MeshTextReader {
    pub fn new(sampling: FieldSampling) -> Self {
        MeshTextReader { sampling }
    }

    pub fn sampling(&self) -> FieldSampling {
        self.sampling
    }

    /// Read only the mesh part, ignoring anything after the coordinates.
    pub fn read_surface<R: Read>(&self, mut reader: R) -> Result<SurfaceMesh, MeshMorseError> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;
        let (mut tokens, polygonal) = Self::tokens(&contents);
        Self::parse_surface(&mut tokens, polygonal).map(|(surface, _)| surface)
    }

    fn tokens(contents: &str) -> (Tokens<'_>, bool) {
        let trimmed = contents.trim_start();
        match trimmed.strip_prefix('n') {
            Some(rest) => (
                Tokens {
                    inner: rest.split_whitespace(),
                },
                true,
            ),
            None => (
                Tokens {
                    inner: trimmed.split_whitespace(),
                },
                false,
            ),
        }
    }

    /// Surface and declared vertex count.
    fn parse_surface(
        tokens: &mut Tokens<'_>,
        polygonal: bool,
    ) -> Result<(SurfaceMesh, usize), MeshMorseError> {
        let face_count = tokens.next_count("face count")?;
        let vertex_count = tokens.next_count("vertex count")?;

        let mut polygons: Vec<Vec<usize>> = Vec::with_capacity(face_count);
        for _ in 0..face_count {
            let mut loop_ = Vec::new();
            if polygonal {
                loop {
                    let raw = tokens.next_index()?;
                    if raw == -1 {
                        break;
                    }
                    loop_.push(to_vertex(raw)?);
                }
            } else {
                for _ in 0..3 {
                    loop_.push(to_vertex(tokens.next_index()?)?);
                }
            }
            polygons.push(loop_);
        }
        let complex = CellComplex::from_polygons(polygons)?;

        let mut coords = Vec::with_capacity(vertex_count);
        for i in 0..vertex_count {
            let v = tokens
                .next_vec3("vertex coordinate")?
                .ok_or(MeshMorseError::CoordinateCountMismatch {
                    expected: vertex_count,
                    found: i,
                })?;
            coords.push(v);
        }
        log::debug!(
            "read {} faces, {} edges, {} vertices",
            complex.num_faces(),
            complex.num_edges(),
            complex.num_vertices()
        );
        Ok((SurfaceMesh::new(complex, coords)?, vertex_count))
    }

    fn parse_field(
        tokens: &mut Tokens<'_>,
        count: usize,
    ) -> Result<Vec<Vec3>, MeshMorseError> {
        let mut vectors = Vec::with_capacity(count);
        for found in 0..count {
            let v = tokens
                .next_vec3("field vector")?
                .ok_or(MeshMorseError::PrematureEndOfField {
                    expected: count,
                    found,
                })?;
            vectors.push(v);
        }
        Ok(vectors)
    }
}

impl MeshReader for MeshTextReader {
    fn read<R: Read>(&self, mut reader: R) -> Result<MeshInput, MeshMorseError> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;
        let (mut tokens, polygonal) = Self::tokens(&contents);
        let (surface, declared) = Self::parse_surface(&mut tokens, polygonal)?;

        let field = match self.sampling {
            FieldSampling::PerFace => {
                FieldSamples::PerFace(Self::parse_field(&mut tokens, surface.complex().num_faces())?)
            }
            FieldSampling::PerVertex => {
                let mut vectors = Self::parse_field(&mut tokens, declared)?;
                // samples of dropped vertices
                vectors.truncate(surface.complex().num_vertices());
                FieldSamples::PerVertex(vectors)
            }
        };
        if tokens.inner.next().is_some() {
            log::warn!("trailing data after the vector field ignored");
        }
        Ok(MeshInput { surface, field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "2 4\n0 1 2\n0 2 3\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n1 0 0\n1 0 0\n";

    #[test]
    fn triangles_with_face_field() {
        let input = MeshTextReader::new(FieldSampling::PerFace)
            .read(SQUARE.as_bytes())
            .unwrap();
        assert_eq!(input.surface.complex().num_faces(), 2);
        assert_eq!(input.surface.complex().num_edges(), 5);
        assert_eq!(input.field, FieldSamples::PerFace(vec![[1.0, 0.0, 0.0]; 2]));
    }

    #[test]
    fn polygon_loops() {
        let text = "n 1 4  0 1 2 3 -1  0 0 0  1 0 0  1 1 0  0 1 0  0.5 0.5 0";
        let input = MeshTextReader::new(FieldSampling::PerFace)
            .read(text.as_bytes())
            .unwrap();
        assert_eq!(input.surface.complex().face(0).corner_count(), 4);
        assert_eq!(input.field.vectors(), &[[0.5, 0.5, 0.0]]);
    }

    #[test]
    fn short_field_is_reported() {
        let text = "2 4 0 1 2 0 2 3 0 0 0 1 0 0 1 1 0 0 1 0 1 0 0";
        let err = MeshTextReader::new(FieldSampling::PerFace)
            .read(text.as_bytes())
            .unwrap_err();
        assert_eq!(
            err,
            MeshMorseError::PrematureEndOfField {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn unreferenced_vertex_samples_are_dropped() {
        // vertex 3 is declared but unused
        let text = "1 4 0 1 2 0 0 0 1 0 0 0 1 0 5 5 5 1 0 0 1 0 0 1 0 0 9 9 9";
        let input = MeshTextReader::new(FieldSampling::PerVertex)
            .read(text.as_bytes())
            .unwrap();
        assert_eq!(input.surface.complex().num_vertices(), 3);
        assert_eq!(input.field.vectors().len(), 3);
    }

    #[test]
    fn bad_tokens_are_parse_errors() {
        let err = MeshTextReader::new(FieldSampling::PerFace)
            .read("1 3 0 1 x".as_bytes())
            .unwrap_err();
        assert!(matches!(err, MeshMorseError::MeshIoParse(_)));
        let err = MeshTextReader::default()
            .read_surface("1 3 0 1 2 0 0 0 1 0 0".as_bytes())
            .unwrap_err();
        assert_eq!(
            err,
            MeshMorseError::CoordinateCountMismatch {
                expected: 3,
                found: 2
            }
        );
    }
}
