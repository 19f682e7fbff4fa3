use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use furnish_scene::SceneMesh;
use glam::Vec3;

/// Triangle budget per painted mesh; denser models are thinned by stride.
pub const MAX_PAINTED_TRIANGLES: usize = 12_000;

/// Valid triangles of a mesh with their local-space face normals.
pub struct PreparedMesh {
    pub triangles: Vec<[u32; 3]>,
    pub normals: Vec<Vec3>,
    pub source_triangles: usize,
}

impl PreparedMesh {
    fn build(mesh: &SceneMesh) -> Self {
        let vertex_count = mesh.positions.len() as u32;
        let source_triangles = mesh.triangle_count();
        let stride = source_triangles.div_ceil(MAX_PAINTED_TRIANGLES).max(1);
        let mut triangles = Vec::new();
        let mut normals = Vec::new();
        for tri in mesh.indices.chunks_exact(3).step_by(stride) {
            let tri = [tri[0], tri[1], tri[2]];
            if tri.iter().any(|index| *index >= vertex_count) {
                continue;
            }
            let a = Vec3::from(mesh.positions[tri[0] as usize]);
            let b = Vec3::from(mesh.positions[tri[1] as usize]);
            let c = Vec3::from(mesh.positions[tri[2] as usize]);
            let normal = (b - a).cross(c - a);
            if normal.length_squared() <= 1.0e-12 {
                continue;
            }
            triangles.push(tri);
            normals.push(normal.normalize());
        }
        Self {
            triangles,
            normals,
            source_triangles,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub mesh_count: u32,
}

struct CachedMesh {
    source: Arc<SceneMesh>,
    prepared: Arc<PreparedMesh>,
}

/// Keyed by mesh allocation; entries hold their source so the key stays valid.
pub struct MeshCache {
    meshes: HashMap<usize, CachedMesh>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for MeshCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshCache {
    pub fn new() -> Self {
        Self {
            meshes: HashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn prepare(&mut self, mesh: &Arc<SceneMesh>) -> Arc<PreparedMesh> {
        let key = Arc::as_ptr(mesh) as usize;
        if let Some(cached) = self.meshes.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(&cached.prepared);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let prepared = Arc::new(PreparedMesh::build(mesh));
        self.meshes.insert(
            key,
            CachedMesh {
                source: Arc::clone(mesh),
                prepared: Arc::clone(&prepared),
            },
        );
        prepared
    }

    /// Drops entries whose mesh is no longer referenced outside the cache.
    pub fn evict_unused(&mut self) -> usize {
        let before = self.meshes.len();
        self.meshes
            .retain(|_, cached| Arc::strong_count(&cached.source) > 1);
        before - self.meshes.len()
    }

    pub fn stats_snapshot(&self) -> MeshCacheStats {
        MeshCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            mesh_count: self.meshes.len() as u32,
        }
    }
}
