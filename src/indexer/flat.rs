use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &[u8; 8] = b"RRAGIDX1";

/// One search hit. `id` is the vector's insertion position, or `-1` for a
/// slot no stored vector could fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: i64,
    pub score: f32,
}

/// Nearest-neighbor search over stored vectors.
pub trait VectorIndex {
    fn dim(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top `k` neighbors of `query`, best first. At most `len()` slots are
    /// returned; slots without a comparable vector carry `id = -1`.
    fn search(&self, query: &[f32], k: usize) -> Vec<Neighbor>;

    /// Chunk id stored for vector `id`.
    fn label(&self, id: usize) -> Option<&str>;
}

/// Exact inner-product index. Each vector carries the `chunk_id` it was
/// built from, so hits resolve to chunks by id rather than by file position.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIpIndex {
    dim: usize,
    labels: Vec<String>,
    data: Vec<f32>,
}

impl FlatIpIndex {
    /// Build an index from `vectors`, labelling vector `i` with `labels[i]`.
    pub fn build(vectors: &[Vec<f32>], labels: Vec<String>) -> Result<Self> {
        if vectors.len() != labels.len() {
            return Err(Error::Index(format!(
                "{} vectors but {} labels",
                vectors.len(),
                labels.len()
            )));
        }
        let dim = vectors.first().map(Vec::len).unwrap_or(0);
        if dim == 0 {
            return Err(Error::Index("cannot build an index without dimensions".to_string()));
        }

        let mut data = Vec::with_capacity(dim * vectors.len());
        for (i, vector) in vectors.iter().enumerate() {
            if vector.len() != dim {
                return Err(Error::Index(format!(
                    "vector {i} has {} dimensions, expected {dim}",
                    vector.len()
                )));
            }
            if vector.iter().any(|v| !v.is_finite()) {
                return Err(Error::Index(format!("vector {i} contains non-finite values")));
            }
            data.extend_from_slice(vector);
        }

        Ok(Self { dim, labels, data })
    }

    fn vector(&self, id: usize) -> &[f32] {
        &self.data[id * self.dim..(id + 1) * self.dim]
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(MAGIC)?;
        out.write_all(&(self.dim as u32).to_le_bytes())?;
        out.write_all(&(self.labels.len() as u64).to_le_bytes())?;
        for (id, label) in self.labels.iter().enumerate() {
            out.write_all(&(label.len() as u32).to_le_bytes())?;
            out.write_all(label.as_bytes())?;
            for value in self.vector(id) {
                out.write_all(&value.to_le_bytes())?;
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::NotFound(format!("index {}: {e}", path.display())))?;
        let mut input = BufReader::new(file);

        let mut magic = [0u8; 8];
        input.read_exact(&mut magic).map_err(|_| corrupt(path))?;
        if &magic != MAGIC {
            return Err(Error::Index(format!("{} is not a recipe index file", path.display())));
        }

        let dim = read_u32(&mut input, path)? as usize;
        let count = usize::try_from(read_u64(&mut input, path)?).map_err(|_| corrupt(path))?;

        let mut labels = Vec::with_capacity(count);
        let mut data = Vec::with_capacity(count.saturating_mul(dim));
        let mut buf = [0u8; 4];
        for _ in 0..count {
            let len = read_u32(&mut input, path)? as usize;
            let mut label = vec![0u8; len];
            input.read_exact(&mut label).map_err(|_| corrupt(path))?;
            labels.push(String::from_utf8(label).map_err(|_| corrupt(path))?);
            for _ in 0..dim {
                input.read_exact(&mut buf).map_err(|_| corrupt(path))?;
                data.push(f32::from_le_bytes(buf));
            }
        }

        if input.read(&mut buf)? != 0 {
            return Err(corrupt(path));
        }

        Ok(Self { dim, labels, data })
    }
}

impl VectorIndex for FlatIpIndex {
    fn dim(&self) -> usize {
        self.dim
    }

    fn len(&self) -> usize {
        self.labels.len()
    }

    fn search(&self, query: &[f32], k: usize) -> Vec<Neighbor> {
        let k = k.min(self.len());
        let mut hits: Vec<Neighbor> = if query.len() == self.dim {
            (0..self.len())
                .map(|id| Neighbor {
                    id: id as i64,
                    score: self.vector(id).iter().zip(query).map(|(a, b)| a * b).sum(),
                })
                .collect()
        } else {
            Vec::new()
        };

        // Stable sort keeps lower ids first on equal scores.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        hits.resize(
            k,
            Neighbor {
                id: -1,
                score: f32::NEG_INFINITY,
            },
        );
        hits
    }

    fn label(&self, id: usize) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }
}

fn corrupt(path: &Path) -> Error {
    Error::Index(format!("{} is truncated or corrupt", path.display()))
}

fn read_u32(input: &mut impl Read, path: &Path) -> Result<u32> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf).map_err(|_| corrupt(path))?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(input: &mut impl Read, path: &Path) -> Result<u64> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf).map_err(|_| corrupt(path))?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlatIpIndex {
        FlatIpIndex::build(
            &[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.6, 0.8]],
            vec!["a:0".into(), "b:0".into(), "c:0".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_search_orders_by_inner_product() {
        let index = sample();
        let hits = index.search(&[1.0, 0.0], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 0);
        assert_eq!(hits[1].id, 2);
        assert!((hits[1].score - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_search_is_capped_at_stored_count() {
        let index = sample();
        let hits = index.search(&[0.0, 1.0], 5);
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| h.id >= 0));

        let hits = index.search(&[1.0, 0.0], usize::MAX);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, 0);
    }

    #[test]
    fn test_search_with_wrong_dimension_returns_empty_slots() {
        let index = sample();
        let hits = index.search(&[1.0, 0.0, 0.0], 2);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.id == -1));
    }

    #[test]
    fn test_build_rejects_ragged_vectors() {
        let result = FlatIpIndex::build(&[vec![1.0, 0.0], vec![1.0]], vec!["a".into(), "b".into()]);
        assert!(matches!(result, Err(Error::Index(_))));

        let result = FlatIpIndex::build(&[vec![1.0]], Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes_chunks.index");
        let index = sample();
        index.save(&path).unwrap();

        let loaded = FlatIpIndex::load(&path).unwrap();
        assert_eq!(loaded, index);
        assert_eq!(loaded.label(2), Some("c:0"));
    }

    #[test]
    fn test_load_rejects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.index");
        sample().save(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

        assert!(matches!(FlatIpIndex::load(&path), Err(Error::Index(_))));
    }
}
