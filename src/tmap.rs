// src/tmap.rs
//! TMAP binary map format (little endian).
//!
//! ```text
//! "TMAP" u32 version, u32 mesh count
//! mesh: u16+utf8 name, u32+f32x3 positions, u32+f32x3 normals,
//!       u32+f32x2 uvs, u16+utf8 material
//! f32x3 spawn position, f32x3 spawn rotation, f32x3 map offset
//! ```

use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};
use log::info;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::level::{LevelData, MapMesh, SpawnPoint};

pub const MAGIC: [u8; 4] = *b"TMAP";

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.bytes.len() - self.offset;
        if len > remaining {
            return Err(Error::Truncated {
                offset: self.offset,
                needed: len - remaining,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    fn vec2(&mut self) -> Result<Vec2> {
        Ok(Vec2::new(self.f32()?, self.f32()?))
    }

    fn vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.f32()?, self.f32()?, self.f32()?))
    }

    fn string(&mut self) -> Result<String> {
        let len = self.u16()? as usize;
        Ok(std::str::from_utf8(self.take(len)?)?.to_owned())
    }

    /// Element count, checked against the bytes left before anything is
    /// allocated for it.
    fn count(&mut self, element_size: usize) -> Result<usize> {
        let count = self.u32()? as usize;
        let needed = count.saturating_mul(element_size);
        let remaining = self.bytes.len() - self.offset;
        if needed > remaining {
            return Err(Error::Truncated {
                offset: self.offset,
                needed: needed - remaining,
            });
        }
        Ok(count)
    }

    fn list<T>(&mut self, element_size: usize, mut read: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.count(element_size)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }
}

fn read_mesh(reader: &mut Reader<'_>) -> Result<MapMesh> {
    Ok(MapMesh {
        name: reader.string()?,
        positions: reader.list(12, Reader::vec3)?,
        normals: reader.list(12, Reader::vec3)?,
        uvs: reader.list(8, Reader::vec2)?,
        material: reader.string()?,
    })
}

pub fn parse_tmap(bytes: &[u8]) -> Result<LevelData> {
    let mut reader = Reader::new(bytes);

    let magic: [u8; 4] = reader.array()?;
    if magic != MAGIC {
        return Err(Error::InvalidMagic { found: magic });
    }

    let version = reader.u32()?;
    // the smallest possible mesh is 16 bytes: two empty strings, three empty lists
    let mesh_count = reader.count(16)?;
    let mut meshes = Vec::with_capacity(mesh_count);
    for index in 0..mesh_count {
        meshes.push(read_mesh(&mut reader).with_context(|| format!("reading mesh {index}"))?);
    }

    let spawn = SpawnPoint {
        position: reader.vec3()?,
        rotation: reader.vec3()?,
    };
    let offset = reader.vec3()?;

    Ok(LevelData {
        version,
        meshes,
        spawn,
        offset,
    })
}

pub fn load_tmap(path: impl AsRef<Path>) -> Result<LevelData> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("opening map {}", path.display()))?;
    let level = parse_tmap(&bytes).with_context(|| format!("parsing map {}", path.display()))?;
    info!(
        "map {}: version {}, {} meshes, {} triangles",
        path.display(),
        level.version,
        level.meshes.len(),
        level.triangle_count()
    );
    Ok(level)
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

fn put_vec3(out: &mut Vec<u8>, v: Vec3) {
    for c in v.to_array() {
        out.extend_from_slice(&c.to_le_bytes());
    }
}

fn put_string(out: &mut Vec<u8>, s: &str) -> Result<()> {
    let len = u16::try_from(s.len())
        .map_err(|_| Error::custom(format!("string of {} bytes does not fit a TMAP field", s.len())))?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

fn put_count(out: &mut Vec<u8>, count: usize) -> Result<()> {
    let count = u32::try_from(count)
        .map_err(|_| Error::custom(format!("{count} elements do not fit a TMAP list")))?;
    out.extend_from_slice(&count.to_le_bytes());
    Ok(())
}

/// Serialize a level; `parse_tmap` reads it back unchanged.
pub fn write_tmap(level: &LevelData) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&level.version.to_le_bytes());
    put_count(&mut out, level.meshes.len())?;

    for mesh in &level.meshes {
        put_string(&mut out, &mesh.name)?;
        put_count(&mut out, mesh.positions.len())?;
        mesh.positions.iter().for_each(|p| put_vec3(&mut out, *p));
        put_count(&mut out, mesh.normals.len())?;
        mesh.normals.iter().for_each(|n| put_vec3(&mut out, *n));
        put_count(&mut out, mesh.uvs.len())?;
        for uv in &mesh.uvs {
            out.extend_from_slice(&uv.x.to_le_bytes());
            out.extend_from_slice(&uv.y.to_le_bytes());
        }
        put_string(&mut out, &mesh.material)?;
    }

    put_vec3(&mut out, level.spawn.position);
    put_vec3(&mut out, level.spawn.rotation);
    put_vec3(&mut out, level.offset);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LevelData {
        let mut level = LevelData::arena();
        level.version = 2;
        level.meshes[0].material = "concrete".into();
        level.spawn.rotation = Vec3::new(0.0, 90.0, 0.0);
        level.offset = Vec3::new(1.0, -2.0, 0.5);
        level
    }

    #[test]
    fn written_maps_parse_back() {
        let level = sample();
        let bytes = write_tmap(&level).unwrap();
        assert_eq!(&bytes[..4], b"TMAP");
        assert_eq!(parse_tmap(&bytes).unwrap(), level);
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut bytes = write_tmap(&sample()).unwrap();
        bytes[..4].copy_from_slice(b"OBJ ");
        match parse_tmap(&bytes) {
            Err(Error::InvalidMagic { found }) => assert_eq!(&found, b"OBJ "),
            other => panic!("expected InvalidMagic, got {other:?}"),
        }
    }

    #[test]
    fn truncation_anywhere_is_an_error() {
        let bytes = write_tmap(&sample()).unwrap();
        for len in [0, 3, 8, 20, bytes.len() - 1] {
            let err = parse_tmap(&bytes[..len]).unwrap_err();
            assert!(err.is_malformed_map(), "len {len}: {err}");
        }
    }

    #[test]
    fn absurd_counts_fail_before_allocating() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"TMAP");
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(parse_tmap(&bytes), Err(Error::Truncated { .. })));
    }

    #[test]
    fn invalid_utf8_names_are_reported() {
        let mut level = sample();
        level.meshes[0].name = "ab".into();
        let mut bytes = write_tmap(&level).unwrap();
        // name bytes start after magic, version, count and the u16 length
        bytes[14] = 0xFF;
        let err = parse_tmap(&bytes).unwrap_err();
        assert!(err.is_malformed_map());
        assert!(err.to_string().contains("mesh 0"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_tmap("no/such/map.tmap").unwrap_err();
        assert!(err.is_io());
    }
}
