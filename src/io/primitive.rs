//! Binary geometry records.
//!
//! # Layout
//! Every record is little-endian: `id: i32`, `index: i32`, `index2: i32`,
//! `stability: u8`, `verts: u8`, `boundary: u8`, followed by `verts` points of
//! three `f64` each. A record holds a point, a segment, a triangle or a quad.
//! Records are concatenated without framing; the stream ends at end of input.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::geometry::vec3::{self, Vec3};
use crate::mesh_error::MeshMorseError;

const HEADER_LEN: usize = 15;
const POINT_LEN: usize = 24;

/// Stability code marking separatrix records.
pub const SEPARATRIX_STABILITY: u8 = 255;

/// Morse set attributes carried by every record.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordTag {
    pub id: i32,
    pub index: i32,
    pub index2: i32,
    pub stability: u8,
    pub boundary: bool,
}

impl RecordTag {
    /// Tag of records that belong to no Morse set.
    pub const SEPARATRIX: RecordTag = RecordTag {
        id: 0,
        index: 0,
        index2: 0,
        stability: SEPARATRIX_STABILITY,
        boundary: false,
    };
}

#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    tag: RecordTag,
    points: Vec<Vec3>,
}

impl Primitive {
    pub fn point(tag: RecordTag, a: Vec3) -> Self {
        Primitive { tag, points: vec![a] }
    }

    pub fn segment(tag: RecordTag, a: Vec3, b: Vec3) -> Self {
        Primitive {
            tag,
            points: vec![a, b],
        }
    }

    pub fn triangle(tag: RecordTag, a: Vec3, b: Vec3, c: Vec3) -> Self {
        Primitive {
            tag,
            points: vec![a, b, c],
        }
    }

    /// A quad, or a triangle when two of its corners coincide.
    pub fn quad(tag: RecordTag, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        let points = if d == c || d == b || d == a {
            vec![a, b, c]
        } else if c == b || c == a {
            vec![a, b, d]
        } else if a == b {
            vec![a, d, c]
        } else {
            vec![a, b, c, d]
        };
        Primitive { tag, points }
    }

    pub fn tag(&self) -> RecordTag {
        self.tag
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Reorder the corners so the primitive faces along `normal`.
    ///
    /// A triangle swaps its last two corners when wound the wrong way. A quad
    /// is treated as the strip `a b | c d`: each pair is swapped when the
    /// strip folds against `normal`.
    pub fn orient(&mut self, normal: Vec3) -> &mut Self {
        let p = &mut self.points;
        let tri = |a: Vec3, b: Vec3, c: Vec3| vec3::cross(vec3::sub(b, a), vec3::sub(c, a));
        match p.len() {
            3 => {
                if vec3::dot(tri(p[0], p[1], p[2]), normal) < 0.0 {
                    p.swap(1, 2);
                }
            }
            4 => {
                let facing = vec3::add(tri(p[0], p[2], p[3]), tri(p[1], p[2], p[3]));
                if vec3::dot(facing, normal) < 0.0 {
                    p.swap(2, 3);
                }
                let facing = vec3::add(tri(p[2], p[0], p[1]), tri(p[3], p[0], p[1]));
                if vec3::dot(facing, normal) < 0.0 {
                    p.swap(0, 1);
                }
            }
            _ => {}
        }
        self
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + POINT_LEN * self.points.len()
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_i32_le(self.tag.id);
        buf.put_i32_le(self.tag.index);
        buf.put_i32_le(self.tag.index2);
        buf.put_u8(self.tag.stability);
        buf.put_u8(self.points.len() as u8);
        buf.put_u8(u8::from(self.tag.boundary));
        for p in &self.points {
            for &c in p {
                buf.put_f64_le(c);
            }
        }
    }

    /// Next record of `buf`, or `None` when it is exhausted.
    pub fn decode(buf: &mut Bytes) -> Result<Option<Self>, MeshMorseError> {
        if !buf.has_remaining() {
            return Ok(None);
        }
        if buf.remaining() < HEADER_LEN {
            return Err(MeshMorseError::MeshIoParse(format!(
                "truncated record header: {} bytes left",
                buf.remaining()
            )));
        }
        let id = buf.get_i32_le();
        let index = buf.get_i32_le();
        let index2 = buf.get_i32_le();
        let stability = buf.get_u8();
        let verts = buf.get_u8() as usize;
        let boundary = buf.get_u8() != 0;
        if !(1..=4).contains(&verts) {
            return Err(MeshMorseError::MeshIoParse(format!(
                "record {id} has {verts} points; 1 to 4 are allowed"
            )));
        }
        if buf.remaining() < POINT_LEN * verts {
            return Err(MeshMorseError::MeshIoParse(format!(
                "record {id} is truncated"
            )));
        }
        let points = (0..verts)
            .map(|_| [buf.get_f64_le(), buf.get_f64_le(), buf.get_f64_le()])
            .collect();
        Ok(Some(Primitive {
            tag: RecordTag {
                id,
                index,
                index2,
                stability,
                boundary,
            },
            points,
        }))
    }
}

pub fn write_primitives<W: Write>(
    mut writer: W,
    primitives: &[Primitive],
) -> Result<(), MeshMorseError> {
    let mut buf = BytesMut::with_capacity(primitives.iter().map(Primitive::encoded_len).sum());
    for p in primitives {
        p.encode(&mut buf);
    }
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

/// Read records until the end of the stream or a record with a negative id,
/// which terminates the stream and is not returned.
pub fn read_primitives<R: Read>(mut reader: R) -> Result<Vec<Primitive>, MeshMorseError> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    let mut buf = Bytes::from(raw);
    let mut out = Vec::new();
    while let Some(p) = Primitive::decode(&mut buf)? {
        if p.tag.id < 0 {
            if buf.has_remaining() {
                log::debug!("{} bytes after the terminating record", buf.remaining());
            }
            break;
        }
        out.push(p);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const Z: Vec3 = [0.0, 0.0, 1.0];

    #[test]
    fn quad_drops_repeated_corner() {
        let a = [0.0, 0.0, 0.0];
        let b = [1.0, 0.0, 0.0];
        let c = [1.0, 1.0, 0.0];
        assert_eq!(Primitive::quad(RecordTag::SEPARATRIX, a, b, c, b).points(), &[a, b, c]);
        assert_eq!(Primitive::quad(RecordTag::SEPARATRIX, a, a, c, b).points(), &[a, b, c]);
        assert_eq!(Primitive::quad(RecordTag::SEPARATRIX, a, b, a, c).points(), &[a, b, c]);
    }

    #[test]
    fn triangle_is_wound_counter_clockwise() {
        let mut t = Primitive::triangle(
            RecordTag::default(),
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0],
        );
        t.orient(Z);
        assert_eq!(t.points()[1], [1.0, 0.0, 0.0]);
        t.orient([0.0, 0.0, -1.0]);
        assert_eq!(t.points()[1], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn strip_quad_is_untangled() {
        // pieces on the bottom and top side of a unit square, both listed left to right
        let mut q = Primitive::quad(
            RecordTag::default(),
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
        );
        q.orient(Z);
        let p = q.points();
        let tri = |a: Vec3, b: Vec3, c: Vec3| vec3::cross(vec3::sub(b, a), vec3::sub(c, a));
        assert!(vec3::dot(tri(p[0], p[2], p[3]), Z) >= 0.0);
        assert!(vec3::dot(tri(p[2], p[0], p[1]), Z) >= 0.0);
    }

    #[test]
    fn stream_layout_is_little_endian() {
        let tag = RecordTag {
            id: 7,
            index: -1,
            index2: 1,
            stability: 3,
            boundary: true,
        };
        let p = Primitive::segment(tag, [1.0, 2.0, 3.0], [4.0, 5.0, 6.0]);
        let mut out = Vec::new();
        write_primitives(&mut out, &[p.clone(), Primitive::point(RecordTag::SEPARATRIX, [0.5; 3])])
            .unwrap();
        assert_eq!(out.len(), p.encoded_len() + HEADER_LEN + POINT_LEN);
        assert_eq!(&out[..4], &7i32.to_le_bytes());
        assert_eq!(&out[4..8], &(-1i32).to_le_bytes());
        assert_eq!(&out[12..15], &[3, 2, 1]);
        assert_eq!(&out[15..23], &1.0f64.to_le_bytes());

        let back = read_primitives(out.as_slice()).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0], p);
        assert_eq!(back[1].tag().stability, SEPARATRIX_STABILITY);
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let mut out = Vec::new();
        write_primitives(&mut out, &[Primitive::point(RecordTag::default(), [0.0; 3])]).unwrap();
        out.truncate(out.len() - 1);
        assert!(matches!(
            read_primitives(out.as_slice()),
            Err(MeshMorseError::MeshIoParse(_))
        ));
    }
}
