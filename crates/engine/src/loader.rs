use crate::prelude::*;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Why a model could not be loaded
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to import {path}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("{path} does not contain a scene")]
    NoScene { path: PathBuf },
}

/// Geometry and metadata pulled out of a model file
#[derive(Debug, Clone, Default)]
pub struct LoadedModel {
    /// One mesh per triangle primitive, already in model space
    pub meshes: Vec<Mesh>,
    /// Names of the animation clips in the file
    pub animations: Vec<String>,
}

/// Names of the animation clips that came with a loaded model
#[derive(Component, Clone, Debug, Default)]
pub struct AnimationClips(pub Vec<String>);

/// A model to load and where to place it once loaded
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub label: String,
    pub path: PathBuf,
    pub placement: Transform,
}

struct LoadOutcome {
    request: ModelRequest,
    result: std::result::Result<LoadedModel, LoadError>,
}

/// Loads models on the rayon pool.
///
/// Finished loads are queued and turned into entities by the
/// `apply_loaded_models` system on the main thread, so the world never has to
/// be locked from a background thread. Until a load finishes there is simply
/// nothing to draw.
#[derive(Resource, Clone, Default)]
pub struct ModelLoader {
    pending_results: Arc<Mutex<Vec<LoadOutcome>>>,
    in_flight: Arc<Mutex<usize>>,
}

impl ModelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, request: ModelRequest) {
        log::info!("Loading model '{}' from {}", request.label, request.path.display());

        let pending_results = self.pending_results.clone();
        let in_flight = self.in_flight.clone();
        *in_flight.lock().unwrap() += 1;

        rayon::spawn(move || {
            let result = import_model(&request.path);

            pending_results
                .lock()
                .unwrap()
                .push(LoadOutcome { request, result });
            *in_flight.lock().unwrap() -= 1;
        });
    }

    /// Number of loads that have neither finished nor failed yet
    pub fn in_flight(&self) -> usize {
        *self.in_flight.lock().unwrap()
    }

    /// Number of finished loads waiting to be applied
    pub fn ready(&self) -> usize {
        self.pending_results.lock().unwrap().len()
    }

    fn take_results(&self) -> Vec<LoadOutcome> {
        std::mem::take(&mut *self.pending_results.lock().unwrap())
    }
}

/// Spawn entities for every finished load. Failures are logged and dropped.
pub fn apply_loaded_models(mut commands: Commands, loader: Res<ModelLoader>) {
    for LoadOutcome { request, result } in loader.take_results() {
        match result {
            Ok(model) => {
                log::info!(
                    "Loaded model '{}': {} meshes, animations {:?}",
                    request.label,
                    model.meshes.len(),
                    model.animations
                );

                commands.spawn((
                    Tag {
                        label: request.label.clone(),
                    },
                    request.placement.clone(),
                    AnimationClips(model.animations),
                ));

                for (index, mesh) in model.meshes.into_iter().enumerate() {
                    commands.spawn((
                        Tag {
                            label: format!("{} / mesh {}", request.label, index),
                        },
                        request.placement.clone(),
                        mesh,
                    ));
                }
            }
            Err(e) => {
                log::error!("Unable to load model '{}': {}", request.label, e);
            }
        }
    }
}

/// Import a glTF or GLB file and flatten its default scene into meshes.
pub fn import_model(path: &Path) -> std::result::Result<LoadedModel, LoadError> {
    let (document, buffers, _images) = gltf::import(path).map_err(|source| LoadError::Import {
        path: path.to_path_buf(),
        source,
    })?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| LoadError::NoScene {
            path: path.to_path_buf(),
        })?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        collect_meshes(&node, &Matrix4::identity(), &buffers, &mut meshes);
    }

    let animations = document
        .animations()
        .map(|animation| {
            animation
                .name()
                .map(str::to_owned)
                .unwrap_or_else(|| format!("animation_{}", animation.index()))
        })
        .collect();

    Ok(LoadedModel { meshes, animations })
}

fn collect_meshes(
    node: &gltf::Node,
    parent: &Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    meshes: &mut Vec<Mesh>,
) {
    let world = parent * Matrix4::from(node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            match read_primitive(&primitive, &world, buffers) {
                Some(mesh) => meshes.push(mesh),
                None => log::warn!(
                    "Skipping primitive {} of mesh {:?}: not an indexable triangle list",
                    primitive.index(),
                    mesh.name()
                ),
            }
        }
    }

    for child in node.children() {
        collect_meshes(&child, &world, buffers, meshes);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive,
    world: &Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
) -> Option<Mesh> {
    if !matches!(primitive.mode(), gltf::mesh::Mode::Triangles) {
        return None;
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<Point3<f32>> = reader
        .read_positions()?
        .map(|p| world.transform_point(&Point3::from(p)))
        .collect();

    let indices: Vec<Index> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as Index).collect(),
    };

    if indices.iter().any(|&i| i as usize >= positions.len()) {
        return None;
    }

    let normals: Vec<Vector3<f32>> = match reader.read_normals() {
        Some(normals) => {
            let normal_matrix = world
                .fixed_view::<3, 3>(0, 0)
                .clone_owned()
                .try_inverse()
                .map(|m| m.transpose())
                .unwrap_or_else(Matrix3::identity);

            normals
                .map(|n| {
                    (normal_matrix * Vector3::from(n))
                        .try_normalize(f32::EPSILON)
                        .unwrap_or_else(Vector3::y)
                })
                .collect()
        }
        None => smooth_normals(&positions, &indices),
    };

    let color = primitive.material().pbr_metallic_roughness().base_color_factor();

    let vertices = positions
        .iter()
        .zip(normals.iter().chain(std::iter::repeat(&Vector3::y())))
        .map(|(position, normal)| Vertex {
            position: position.coords.into(),
            normal: (*normal).into(),
            color,
        })
        .collect();

    Some(Mesh { vertices, indices })
}

/// Area weighted vertex normals for geometry that ships without any
fn smooth_normals(positions: &[Point3<f32>], indices: &[Index]) -> Vec<Vector3<f32>> {
    let mut normals = vec![Vector3::zeros(); positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let face = (positions[b] - positions[a]).cross(&(positions[c] - positions[a]));
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| n.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::{Duration, Instant};

    // One triangle in the XY plane under a node translated by +1 on X, plus a
    // two-key translation clip named "Hover".
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "translation": [1.0, 0.0, 0.0] }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }] }],
        "materials": [{ "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.5, 0.25, 1.0] } }],
        "animations": [{
            "name": "Hover",
            "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }],
            "samplers": [{ "input": 2, "output": 3, "interpolation": "LINEAR" }]
        }],
        "buffers": [{
            "byteLength": 76,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAAAAAAAAACAPwAAgD8AAAAAAAAAAAAAgD8AAIA/AAAAAA=="
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 },
            { "buffer": 0, "byteOffset": 44, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 52, "byteLength": 24 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" },
            { "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
            { "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" }
        ]
    }"#;

    fn write_fixture(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lookaround-{}-{}.gltf", name, std::process::id()));
        std::fs::write(&path, TRIANGLE_GLTF).unwrap();
        path
    }

    fn request(path: PathBuf) -> ModelRequest {
        ModelRequest {
            label: "Fixture".to_string(),
            path,
            placement: Transform::default().with_uniform_scale(10.0),
        }
    }

    fn wait_for(loader: &ModelLoader) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while loader.in_flight() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(loader.in_flight(), 0, "model load did not finish in time");
    }

    #[test]
    fn import_bakes_node_transform_into_vertices() {
        let path = write_fixture("bake");
        let model = import_model(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[0].position, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[1].position, [2.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].position, [1.0, 1.0, 0.0]);
        assert_eq!(mesh.vertices[0].color, [1.0, 0.5, 0.25, 1.0]);
    }

    #[test]
    fn missing_normals_are_generated_from_faces() {
        let path = write_fixture("normals");
        let model = import_model(&path).unwrap();
        std::fs::remove_file(&path).ok();

        for vertex in &model.meshes[0].vertices {
            assert!((vertex.normal[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn animation_clip_names_are_reported() {
        let path = write_fixture("clips");
        let model = import_model(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(model.animations, vec!["Hover".to_string()]);
    }

    #[test]
    fn missing_file_is_an_import_error() {
        let result = import_model(Path::new("/definitely/not/here/station.glb"));
        assert!(matches!(result, Err(LoadError::Import { .. })));
    }

    #[test]
    fn background_load_spawns_model_entities() {
        let path = write_fixture("spawn");
        let mut world = World::new();
        let loader = ModelLoader::new();
        world.insert_resource(loader.clone());

        loader.load(request(path.clone()));
        wait_for(&loader);
        std::fs::remove_file(&path).ok();
        assert_eq!(loader.ready(), 1);

        let mut schedule = Schedule::default();
        schedule.add_systems(apply_loaded_models);
        schedule.run(&mut world);

        let mut meshes = world.query::<(&Mesh, &Transform)>();
        let spawned: Vec<_> = meshes.iter(&world).collect();
        assert_eq!(spawned.len(), 1);
        assert_eq!(spawned[0].1.scale, Vector3::new(10.0, 10.0, 10.0));

        let mut clips = world.query::<&AnimationClips>();
        assert_eq!(clips.iter(&world).count(), 1);
        assert_eq!(loader.ready(), 0);
    }

    #[test]
    fn failed_load_leaves_the_world_empty() {
        let mut world = World::new();
        let loader = ModelLoader::new();
        world.insert_resource(loader.clone());

        loader.load(request(PathBuf::from("/definitely/not/here/station.glb")));
        wait_for(&loader);

        let mut schedule = Schedule::default();
        schedule.add_systems(apply_loaded_models);
        schedule.run(&mut world);

        let mut tags = world.query::<&Tag>();
        assert_eq!(tags.iter(&world).count(), 0);
        assert_eq!(loader.ready(), 0);
    }
}
