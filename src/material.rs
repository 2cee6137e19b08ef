//! Shared material descriptors.
//!
//! Materials that many objects share (tree bark, leaves, terrain, gravel
//! embankments) live in an explicitly constructed [`MaterialRegistry`] that
//! is handed to the builders. Cloning the registry clones the handle, not
//! the materials.

use std::sync::Arc;

use glam::Vec3;
use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shader stages a material may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    DeferredFragment,
    Geometry,
    TessControl,
    TessEvaluation,
}

/// Renderer-agnostic material description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub diffuse: Vec3,
    pub ambient: Vec3,
    pub specular: Vec3,
    /// Stage → shader source path.
    pub shaders: Vec<(ShaderStage, String)>,
    pub textures: Vec<String>,
    pub wireframe: bool,
    pub z_offset: Option<(f32, f32)>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse: Vec3::splat(0.8),
            ambient: Vec3::splat(0.2),
            specular: Vec3::splat(0.1),
            shaders: Vec::new(),
            textures: Vec::new(),
            wireframe: false,
            z_offset: None,
        }
    }

    pub fn with_colors(mut self, diffuse: Vec3, ambient: Vec3, specular: Vec3) -> Self {
        self.diffuse = diffuse;
        self.ambient = ambient;
        self.specular = specular;
        self
    }

    pub fn with_shader(mut self, stage: ShaderStage, path: impl Into<String>) -> Self {
        self.shaders.push((stage, path.into()));
        self
    }

    pub fn with_texture(mut self, path: impl Into<String>) -> Self {
        self.textures.push(path.into());
        self
    }

    pub fn with_z_offset(mut self, factor: f32, bias: f32) -> Self {
        self.z_offset = Some((factor, bias));
        self
    }

    pub fn shader(&self, stage: ShaderStage) -> Option<&str> {
        self.shaders.iter().find(|(s, _)| *s == stage).map(|(_, p)| p.as_str())
    }
}

/// Process-wide table of named, shared materials.
#[derive(Debug, Clone, Default)]
pub struct MaterialRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<Material>>>>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Material>> {
        self.inner.read().get(name).cloned()
    }

    /// Return the material registered under `name`, creating it with `build`
    /// on first use.
    pub fn get_or_insert_with(&self, name: &str, build: impl FnOnce() -> Material) -> Arc<Material> {
        if let Some(m) = self.get(name) {
            return m;
        }
        let mut map = self.inner.write();
        map.entry(name.to_string())
            .or_insert_with(|| {
                debug!(material = name, "creating shared material");
                Arc::new(build())
            })
            .clone()
    }

    /// Replace (or add) a material.
    pub fn insert(&self, material: Material) -> Arc<Material> {
        let m = Arc::new(material);
        self.inner.write().insert(m.name.clone(), m.clone());
        m
    }

    pub fn len(&self) -> usize { self.inner.read().len() }
    pub fn is_empty(&self) -> bool { self.inner.read().is_empty() }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_insert_builds_once() {
        let reg = MaterialRegistry::new();
        let mut builds = 0;
        let a = reg.get_or_insert_with("bark", || { builds += 1; Material::new("bark") });
        let b = reg.get_or_insert_with("bark", || { builds += 1; Material::new("bark") });
        assert_eq!(builds, 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_clone_shares_table() {
        let reg = MaterialRegistry::new();
        let handle = reg.clone();
        handle.insert(Material::new("gravel").with_texture("gravel.jpg"));
        assert_eq!(reg.get("gravel").unwrap().textures, vec!["gravel.jpg"]);
        assert_eq!(reg.names(), vec!["gravel"]);
    }

    #[test]
    fn test_shader_lookup() {
        let m = Material::new("leafs").with_shader(ShaderStage::Vertex, "leafs.vp");
        assert_eq!(m.shader(ShaderStage::Vertex), Some("leafs.vp"));
        assert_eq!(m.shader(ShaderStage::Geometry), None);
    }
}
