use std::path::Path;

use furnish_scene::SceneMesh;
use glam::{Mat4, Vec3};

/// Loads a furniture model and normalizes it so its footprint is centred on the
/// origin and it rests on y = 0.
pub fn load_model_file(path: &Path) -> Result<SceneMesh, String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let (positions, indices) = match extension.as_str() {
        "gltf" | "glb" => load_gltf_triangles(path)?,
        "obj" => load_obj_triangles(path)?,
        other => return Err(format!("Unsupported model format '{other}': {}", path.display())),
    };
    if positions.is_empty() || indices.len() < 3 {
        return Err(format!("Model has no triangle geometry: {}", path.display()));
    }
    Ok(SceneMesh::new(seat_on_floor(positions), indices))
}

fn seat_on_floor(mut positions: Vec<[f32; 3]>) -> Vec<[f32; 3]> {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for p in &positions {
        let p = Vec3::from(*p);
        min = min.min(p);
        max = max.max(p);
    }
    let shift = Vec3::new(-(min.x + max.x) * 0.5, -min.y, -(min.z + max.z) * 0.5);
    for p in &mut positions {
        *p = (Vec3::from(*p) + shift).to_array();
    }
    positions
}

#[cfg(not(target_arch = "wasm32"))]
fn load_gltf_triangles(path: &Path) -> Result<(Vec<[f32; 3]>, Vec<u32>), String> {
    let (document, buffers, _) =
        gltf::import(path).map_err(|err| format!("glTF load failed: {err}"))?;
    let mut positions = Vec::new();
    let mut indices = Vec::new();
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    match scene {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Mat4::IDENTITY, &buffers, &mut positions, &mut indices)?;
            }
        }
        None => {
            for mesh in document.meshes() {
                collect_mesh(&mesh, Mat4::IDENTITY, &buffers, &mut positions, &mut indices)?;
            }
        }
    }
    Ok((positions, indices))
}

#[cfg(target_arch = "wasm32")]
fn load_gltf_triangles(path: &Path) -> Result<(Vec<[f32; 3]>, Vec<u32>), String> {
    Err(format!("glTF import is not available in web builds: {}", path.display()))
}

#[cfg(not(target_arch = "wasm32"))]
fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    positions: &mut Vec<[f32; 3]>,
    indices: &mut Vec<u32>,
) -> Result<(), String> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        collect_mesh(&mesh, world, buffers, positions, indices)?;
    }
    for child in node.children() {
        collect_node(&child, world, buffers, positions, indices)?;
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn collect_mesh(
    mesh: &gltf::Mesh,
    transform: Mat4,
    buffers: &[gltf::buffer::Data],
    positions: &mut Vec<[f32; 3]>,
    indices: &mut Vec<u32>,
) -> Result<(), String> {
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            continue;
        }
        let reader =
            primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
        let prim_positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| "glTF primitive missing POSITION attribute".to_string())?
            .collect();
        if prim_positions.is_empty() {
            continue;
        }
        let base = positions.len() as u32;
        positions.extend(
            prim_positions
                .iter()
                .map(|p| transform.transform_point3(Vec3::from(*p)).to_array()),
        );
        match reader.read_indices() {
            Some(read) => indices.extend(read.into_u32().map(|idx| idx + base)),
            None => indices.extend((0..prim_positions.len() as u32).map(|idx| idx + base)),
        }
    }
    Ok(())
}

fn load_obj_triangles(path: &Path) -> Result<(Vec<[f32; 3]>, Vec<u32>), String> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()));
    }
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, _) =
        tobj::load_obj(path, &options).map_err(|err| format!("OBJ load failed: {err}"))?;
    let mut positions = Vec::new();
    let mut indices = Vec::new();
    for model in models {
        let mesh = &model.mesh;
        if mesh.positions.len() % 3 != 0 {
            return Err("OBJ has malformed positions".to_string());
        }
        let base = positions.len() as u32;
        positions.extend(mesh.positions.chunks_exact(3).map(|v| [v[0], v[1], v[2]]));
        indices.extend(mesh.indices.iter().map(|idx| idx + base));
    }
    Ok((positions, indices))
}
