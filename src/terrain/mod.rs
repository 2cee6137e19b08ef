//! # Terrain
//!
//! A [`Terrain`] is a rectangular height field centred on the origin of the
//! xz plane. Heights come from a [`HeightMap`] sampled bilinearly; named
//! [`Embankment`]s raise the surface inside their footprint.
//!
//! ```text
//!   x ∈ [-size.x/2, size.x/2]  ──►  u ∈ [0, W-1]
//!   z ∈ [-size.y/2, size.y/2]  ──►  v ∈ [0, H-1]
//! ```
//!
//! Renderable output is a grid of flat patches ([`Terrain::patches`]) whose
//! texture coordinates address the height map; displacement is left to the
//! renderer's tessellation stage.

pub mod embankment;
pub mod heightmap;
pub mod physics;

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::{DVec2, DVec3, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::TerrainConfig;
use crate::geometry::GeoData;
use crate::material::{Material, MaterialRegistry, ShaderStage};
use crate::math::{Boundingbox, Path, Polygon};
use crate::{Error, Result};

pub use embankment::{Embankment, EmbankmentSample, EMBANKMENT_ITERATIONS};
pub use heightmap::HeightMap;
pub use physics::{Heightfield, PhysicsMode, PhysicsShape, ROAD_TERRAIN_OFFSET};

/// Side length of the zero map installed at construction.
const DEFAULT_MAP_SIZE: usize = 128;
/// Patch grid spacing per unit of resolution.
const GRID_PER_RESOLUTION: f64 = 64.0;
/// Distance below which a marched ray counts as touching the surface.
const RAY_HIT_DISTANCE: f64 = 0.03;
/// Most patches the grid may hold along one axis.
const MAX_PATCHES_PER_AXIS: f64 = 4096.0;

/// Check that `size` and `resolution` give a finite, non-empty patch grid.
pub fn check_parameters(size: DVec2, resolution: f64) -> Result<()> {
    if !(resolution.is_finite() && resolution > 0.0) {
        return Err(Error::InvalidParameter(format!("terrain resolution {resolution} must be positive")));
    }
    if !(size.is_finite() && size.x > 0.0 && size.y > 0.0) {
        return Err(Error::InvalidParameter(format!("terrain size {size} must be positive")));
    }
    let patches = size / (resolution * GRID_PER_RESOLUTION);
    if !(patches.max_element() <= MAX_PATCHES_PER_AXIS) {
        return Err(Error::InvalidParameter(format!(
            "terrain size {size} at resolution {resolution} exceeds {MAX_PATCHES_PER_AXIS} patches per axis"
        )));
    }
    Ok(())
}

/// Result of [`Terrain::probe_height`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HeightProbe {
    /// Interpolated point and the four lattice corners it was blended from,
    /// ordered `(i,j)`, `(i+1,j)`, `(i,j+1)`, `(i+1,j+1)`.
    Lattice { point: DVec3, corners: [DVec3; 4] },
    /// Point inside an embankment plus the closest guide-path points.
    Embankment(EmbankmentSample),
}

impl HeightProbe {
    pub fn point(&self) -> DVec3 {
        match self {
            HeightProbe::Lattice { point, .. } => *point,
            HeightProbe::Embankment(s) => s.point,
        }
    }

    /// All probe points, the query point first.
    pub fn points(&self) -> Vec<DVec3> {
        match self {
            HeightProbe::Lattice { point, corners } => {
                std::iter::once(*point).chain(corners.iter().copied()).collect()
            }
            HeightProbe::Embankment(s) => vec![s.point, s.left, s.right],
        }
    }
}

/// Cell lookup shared by the sampler and the probe.
struct Cell {
    i: i64,
    j: i64,
    h: [f64; 4],
    u: f64,
    v: f64,
}

impl Cell {
    fn blend(&self) -> f64 {
        let [h00, h10, h01, h11] = self.h;
        (h00 * (1.0 - self.u) + h10 * self.u) * (1.0 - self.v) + (h01 * (1.0 - self.u) + h11 * self.u) * self.v
    }
}

#[derive(Debug, Clone)]
pub struct Terrain {
    name: String,
    size: DVec2,
    resolution: f64,
    height_scale: f64,
    grid: f64,
    texel_size: DVec2,
    map: HeightMap,
    embankments: BTreeMap<String, Embankment>,
    physics: Option<PhysicsShape>,
    ray_step: f64,
    ray_max_steps: usize,
    material: Arc<Material>,
    embankment_material: Arc<Material>,
    patches: GeoData,
}

impl Terrain {
    pub fn new(name: impl Into<String>, config: &TerrainConfig, materials: &MaterialRegistry) -> Self {
        let material = materials.get_or_insert_with("terrain", || {
            Material::new("terrain")
                .with_shader(ShaderStage::Vertex, "terrainVS")
                .with_shader(ShaderStage::Fragment, "terrainFS")
                .with_shader(ShaderStage::TessControl, "terrainTCS")
                .with_shader(ShaderStage::TessEvaluation, "terrainTES")
                .with_z_offset(1.0, 1.0)
        });
        let embankment_material = materials.get_or_insert_with("embankment", || {
            Material::new("embankment")
                .with_colors(Vec3::splat(0.5), Vec3::splat(0.2), Vec3::splat(0.1))
                .with_texture("world/textures/gravel2.jpg")
                .with_z_offset(1.0, 1.0)
        });

        let name = name.into();
        let (size, resolution) = match check_parameters(DVec2::from(config.size), config.resolution) {
            Ok(()) => (DVec2::from(config.size), config.resolution),
            Err(e) => {
                warn!(terrain = %name, error = %e, "invalid terrain parameters, using defaults");
                let defaults = TerrainConfig::default();
                (DVec2::from(defaults.size), defaults.resolution)
            }
        };

        let mut terrain = Self {
            name,
            size,
            resolution,
            height_scale: config.height_scale,
            grid: resolution * GRID_PER_RESOLUTION,
            texel_size: DVec2::ONE,
            map: HeightMap::zeros(DEFAULT_MAP_SIZE, DEFAULT_MAP_SIZE),
            embankments: BTreeMap::new(),
            physics: None,
            ray_step: config.ray_step,
            ray_max_steps: config.ray_max_steps,
            material,
            embankment_material,
            patches: GeoData::new(),
        };
        terrain.update_texel_size();
        terrain.setup_geo();
        terrain
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn size(&self) -> DVec2 { self.size }
    pub fn resolution(&self) -> f64 { self.resolution }
    pub fn height_scale(&self) -> f64 { self.height_scale }
    pub fn grid(&self) -> f64 { self.grid }
    pub fn texel_size(&self) -> DVec2 { self.texel_size }
    pub fn map(&self) -> &HeightMap { &self.map }
    pub fn material(&self) -> &Arc<Material> { &self.material }
    pub fn patches(&self) -> &GeoData { &self.patches }

    /// Resize the terrain. Invalid parameters leave it unchanged.
    pub fn set_parameters(&mut self, size: DVec2, resolution: f64, height_scale: f64) -> Result<()> {
        check_parameters(size, resolution)?;
        if !height_scale.is_finite() {
            return Err(Error::InvalidParameter(format!("terrain height scale {height_scale} must be finite")));
        }
        self.size = size;
        self.resolution = resolution;
        self.height_scale = height_scale;
        self.grid = resolution * GRID_PER_RESOLUTION;
        self.update_texel_size();
        self.setup_geo();
        Ok(())
    }

    pub fn set_map(&mut self, map: HeightMap) {
        debug!(terrain = %self.name, width = map.width(), depth = map.depth(), "set height map");
        self.map = map;
        self.update_texel_size();
        self.setup_geo();
    }

    /// Load a raster height map, see [`HeightMap::load`].
    #[cfg(feature = "raster")]
    pub fn load_map(&mut self, path: impl AsRef<std::path::Path>, channel: usize) -> Result<()> {
        let map = HeightMap::load(path, channel)?;
        self.set_map(map);
        Ok(())
    }

    fn update_texel_size(&mut self) {
        self.texel_size = DVec2::new(
            self.size.x / (self.map.width() - 1) as f64,
            self.size.y / (self.map.depth() - 1) as f64,
        );
    }

    /// Rebuild the patch grid covering the terrain.
    fn setup_geo(&mut self) {
        let nx = ((self.size.x / self.grid - 0.5).round() as i64).max(1) as usize;
        let nz = ((self.size.y / self.grid - 0.5).round() as i64).max(1) as usize;
        let cell = DVec2::new(self.size.x / nx as f64, self.size.y / nz as f64);
        let texel = Vec2::new(1.0 / self.map.width() as f32, 1.0 / self.map.depth() as f32);
        let chunk = Vec2::new((1.0 - texel.x) / nx as f32, (1.0 - texel.y) / nz as f32);

        let mut geo = GeoData::new();
        for i in 0..nx {
            let x1 = -self.size.x * 0.5 + i as f64 * cell.x;
            let x2 = x1 + cell.x;
            let u1 = texel.x * 0.5 + i as f32 * chunk.x;
            let u2 = u1 + chunk.x;
            for j in 0..nz {
                let z1 = -self.size.y * 0.5 + j as f64 * cell.y;
                let z2 = z1 + cell.y;
                let v1 = texel.y * 0.5 + j as f32 * chunk.y;
                let v2 = v1 + chunk.y;
                geo.push_vert_tc(Vec3::new(x1 as f32, 0.0, z1 as f32), Vec3::Y, Vec2::new(u1, v1));
                geo.push_vert_tc(Vec3::new(x1 as f32, 0.0, z2 as f32), Vec3::Y, Vec2::new(u1, v2));
                geo.push_vert_tc(Vec3::new(x2 as f32, 0.0, z2 as f32), Vec3::Y, Vec2::new(u2, v2));
                geo.push_vert_tc(Vec3::new(x2 as f32, 0.0, z1 as f32), Vec3::Y, Vec2::new(u2, v1));
                geo.push_last_quad();
            }
        }
        trace!(terrain = %self.name, nx, nz, "patch grid");
        self.patches = geo;
    }

    fn uv_extent(&self) -> DVec2 {
        DVec2::new((self.map.width() - 1) as f64, (self.map.depth() - 1) as f64)
    }

    pub fn to_uv_space(&self, p: DVec2) -> DVec2 {
        (p / self.size + 0.5) * self.uv_extent()
    }

    pub fn from_uv_space(&self, uv: DVec2) -> DVec2 {
        (uv / self.uv_extent() - 0.5) * self.size
    }

    /// Locate the lattice cell around `p`, clamping to the grid edges.
    fn cell(&self, p: DVec2) -> Cell {
        let ext = self.uv_extent();
        let uv = self.to_uv_space(p).clamp(DVec2::ZERO, ext);
        let i = (uv.x.floor() as i64).min(ext.x as i64 - 1);
        let j = (uv.y.floor() as i64).min(ext.y as i64 - 1);
        let m = &self.map;
        Cell {
            i,
            j,
            h: [
                m.get(i, j) as f64,
                m.get(i + 1, j) as f64,
                m.get(i, j + 1) as f64,
                m.get(i + 1, j + 1) as f64,
            ],
            u: uv.x - i as f64,
            v: uv.y - j as f64,
        }
    }

    /// Surface height at `p` (xz). With `use_embankments`, every embankment
    /// containing `p` can only raise the result.
    pub fn height(&self, p: DVec2, use_embankments: bool) -> f64 {
        let mut h = self.cell(p).blend();
        if use_embankments {
            for e in self.embankments.values() {
                if e.is_inside(p) {
                    h = h.max(e.height(p));
                }
            }
        }
        h
    }

    /// Height plus the samples it was derived from. The first embankment
    /// containing `p` takes precedence over the lattice.
    pub fn probe_height(&self, p: DVec2) -> HeightProbe {
        if let Some(e) = self.embankments.values().find(|e| e.is_inside(p)) {
            return HeightProbe::Embankment(e.probe(p));
        }
        let c = self.cell(p);
        let p0 = self.from_uv_space(DVec2::new(c.i as f64, c.j as f64));
        let p1 = self.from_uv_space(DVec2::new((c.i + 1) as f64, (c.j + 1) as f64));
        let [h00, h10, h01, h11] = c.h;
        HeightProbe::Lattice {
            point: DVec3::new(p.x, c.blend(), p.y),
            corners: [
                DVec3::new(p0.x, h00, p0.y),
                DVec3::new(p1.x, h10, p0.y),
                DVec3::new(p0.x, h01, p1.y),
                DVec3::new(p1.x, h11, p1.y),
            ],
        }
    }

    /// Terrain extents with the height range of the map.
    pub fn bounding_box(&self) -> Boundingbox {
        let (lo, hi) = self.map.min_max();
        let mut bb = Boundingbox::new();
        bb.update(DVec3::new(self.size.x * 0.5, hi as f64, self.size.y * 0.5));
        bb.update(DVec3::new(-self.size.x * 0.5, lo as f64, -self.size.y * 0.5));
        bb
    }

    // ========================================================================
    // Elevation helpers
    // ========================================================================

    pub fn elevate_point(&self, p: &mut DVec3, offset: f64, use_embankments: bool) {
        p.y = self.height(DVec2::new(p.x, p.z), use_embankments) + offset;
    }

    /// Snap every vertex of `geo` onto the surface.
    pub fn elevate_vertices(&self, geo: &mut GeoData, offset: f64) {
        for v in &mut geo.positions {
            v.y = (self.height(DVec2::new(v.x as f64, v.z as f64), true) + offset) as f32;
        }
    }

    /// Lift a 2D outline onto the surface.
    pub fn elevate_polygon(&self, poly: &Polygon, offset: f64, use_embankments: bool) -> Vec<DVec3> {
        poly.points()
            .iter()
            .map(|p| {
                let mut q = DVec3::new(p.x, 0.0, p.y);
                self.elevate_point(&mut q, offset, use_embankments);
                q
            })
            .collect()
    }

    /// Re-project the horizontal part of `t` onto the surface slope at `p`.
    pub fn project_tangent(&self, t: DVec3, p: DVec3) -> DVec3 {
        let flat = DVec3::new(t.x, 0.0, t.z).normalize_or_zero();
        if flat == DVec3::ZERO {
            return t;
        }
        let h1 = self.height(DVec2::new(p.x - flat.x * 0.5, p.z - flat.z * 0.5), true);
        let h2 = self.height(DVec2::new(p.x + flat.x * 0.5, p.z + flat.z * 0.5), true);
        DVec3::new(flat.x, h2 - h1, flat.z).normalize()
    }

    /// March along the ray until it lands within a hair of the surface.
    ///
    /// Whenever a step crosses the surface the direction flips and the step
    /// halves. Rays starting below the surface miss.
    pub fn intersect_ray(&self, origin: DVec3, dir: DVec3) -> Option<DVec3> {
        let d = dir.normalize_or_zero();
        if d == DVec3::ZERO {
            return None;
        }
        let dist = |p: DVec3| p.y - self.height(DVec2::new(p.x, p.z), true);
        if dist(origin) < 0.0 {
            return None;
        }

        let mut p = origin;
        let mut step = self.ray_step;
        let mut sign = 1.0;
        for _ in 0..self.ray_max_steps {
            p += d * step * sign;
            let l = dist(p);
            if l > 0.0 && l < RAY_HIT_DISTANCE {
                return Some(p);
            }
            if l * sign < 0.0 {
                sign = -sign;
                step *= 0.5;
            }
        }
        None
    }

    // ========================================================================
    // Embankments
    // ========================================================================

    /// Register (or replace) an embankment and build its mesh.
    pub fn add_embankment(&mut self, id: impl Into<String>, p1: Path, p2: Path, sides: Option<(Path, Path)>) {
        let id = id.into();
        let mut e = Embankment::new(id.clone(), p1, p2, sides);
        e.create_geometry();
        e.set_material(self.embankment_material.clone());
        debug!(terrain = %self.name, embankment = %id, "add embankment");
        self.embankments.insert(id, e);
    }

    pub fn embankment(&self, id: &str) -> Option<&Embankment> {
        self.embankments.get(id)
    }

    pub fn embankments(&self) -> impl Iterator<Item = &Embankment> {
        self.embankments.values()
    }

    pub fn remove_embankment(&mut self, id: &str) -> Option<Embankment> {
        self.embankments.remove(id)
    }

    /// Drop all embankments.
    pub fn clear(&mut self) {
        self.embankments.clear();
    }

    // ========================================================================
    // Physics
    // ========================================================================

    /// Install (or remove) the collision shape. Exactly one shape is active
    /// while enabled.
    pub fn physicalize(&mut self, enabled: bool, mode: PhysicsMode) {
        if !enabled {
            self.physics = None;
            return;
        }
        debug!(terrain = %self.name, ?mode, "physicalize");
        self.physics = Some(match mode {
            PhysicsMode::Heightfield => PhysicsShape::Heightfield(Heightfield::from_map(
                &self.map,
                self.texel_size.x,
                self.texel_size.y,
            )),
            PhysicsMode::Analytic => PhysicsShape::Analytic { resolution: self.resolution },
        });
    }

    pub fn is_physicalized(&self) -> bool {
        self.physics.is_some()
    }

    pub fn physics_shape(&self) -> Option<&PhysicsShape> {
        self.physics.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terrain_with(map: HeightMap) -> Terrain {
        let mut t = Terrain::new("t", &TerrainConfig::default(), &MaterialRegistry::new());
        t.set_map(map);
        t
    }

    #[test]
    fn test_default_map_is_flat_zero() {
        let t = Terrain::new("t", &TerrainConfig::default(), &MaterialRegistry::new());
        assert_eq!(t.map().width(), 128);
        assert_eq!(t.height(DVec2::new(12.0, -3.0), true), 0.0);
        assert!((t.texel_size().x - 100.0 / 127.0).abs() < 1e-12);
    }

    #[test]
    fn test_uv_roundtrip() {
        let t = terrain_with(HeightMap::constant(11, 21, 0.0).unwrap());
        let p = DVec2::new(13.5, -40.25);
        let back = t.from_uv_space(t.to_uv_space(p));
        assert!(back.distance(p) < 1e-9);
        assert_eq!(t.to_uv_space(DVec2::new(-50.0, -50.0)), DVec2::ZERO);
        assert_eq!(t.to_uv_space(DVec2::new(50.0, 50.0)), DVec2::new(10.0, 20.0));
    }

    #[test]
    fn test_lattice_points_return_texels() {
        let map = HeightMap::from_fn(5, 5, |i, j| (i * 7 + j * 3) as f32).unwrap();
        let t = terrain_with(map.clone());
        for j in 0..5 {
            for i in 0..5 {
                let p = t.from_uv_space(DVec2::new(i as f64, j as f64));
                let h = t.height(p, false);
                assert!((h - map.get(i, j) as f64).abs() < 1e-9, "({i},{j}) -> {h}");
            }
        }
    }

    #[test]
    fn test_outside_returns_edge_height() {
        let t = terrain_with(HeightMap::from_fn(4, 4, |i, _| i as f32).unwrap());
        assert_eq!(t.height(DVec2::new(500.0, 0.0), false), 3.0);
        assert_eq!(t.height(DVec2::new(-500.0, 0.0), false), 0.0);
    }

    #[test]
    fn test_patch_grid() {
        let mut t = Terrain::new("t", &TerrainConfig::default(), &MaterialRegistry::new());
        assert_eq!(t.patches().count_quads(), 1);
        t.set_parameters(DVec2::new(1000.0, 500.0), 1.0, 1.0).unwrap();
        // round(1000/64 - 0.5) = 15, round(500/64 - 0.5) = 7
        assert_eq!(t.patches().count_quads(), 15 * 7);
        assert_eq!(t.grid(), 64.0);
    }

    #[test]
    fn test_invalid_parameters_keep_previous_grid() {
        let mut t = Terrain::new("t", &TerrainConfig::default(), &MaterialRegistry::new());
        t.set_parameters(DVec2::new(1000.0, 500.0), 1.0, 1.0).unwrap();
        for (size, resolution) in [
            (DVec2::new(1000.0, 500.0), 0.0),
            (DVec2::new(1000.0, 500.0), f64::NAN),
            (DVec2::new(1000.0, 500.0), -1.0),
            (DVec2::new(1000.0, 500.0), 1e-12),
            (DVec2::new(0.0, 500.0), 1.0),
            (DVec2::new(f64::INFINITY, 500.0), 1.0),
        ] {
            let err = t.set_parameters(size, resolution, 1.0);
            assert!(matches!(err, Err(Error::InvalidParameter(_))), "{size} @ {resolution}");
        }
        assert!(t.set_parameters(DVec2::new(100.0, 100.0), 1.0, f64::NAN).is_err());
        assert_eq!(t.size(), DVec2::new(1000.0, 500.0));
        assert_eq!(t.grid(), 64.0);
        assert_eq!(t.patches().count_quads(), 15 * 7);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let config = TerrainConfig { resolution: 0.0, ..TerrainConfig::default() };
        let t = Terrain::new("t", &config, &MaterialRegistry::new());
        assert_eq!(t.resolution(), 1.0);
        assert_eq!(t.grid(), 64.0);
        assert_eq!(t.patches().count_quads(), 1);
    }

    #[test]
    fn test_probe_lattice_corners() {
        let t = terrain_with(HeightMap::constant(3, 3, 2.0).unwrap());
        match t.probe_height(DVec2::new(1.0, 1.0)) {
            HeightProbe::Lattice { point, corners } => {
                assert_eq!(point.y, 2.0);
                assert!(corners.iter().all(|c| c.y == 2.0));
            }
            other => panic!("unexpected probe {other:?}"),
        }
    }

    #[test]
    fn test_embankment_raises_surface() {
        let mut t = terrain_with(HeightMap::constant(9, 9, 1.0).unwrap());
        let p1 = Path::line(DVec3::new(-2.0, 3.0, -10.0), DVec3::new(-2.0, 3.0, 10.0));
        let p2 = Path::line(DVec3::new(2.0, 3.0, 10.0), DVec3::new(2.0, 3.0, -10.0));
        t.add_embankment("road", p1, p2, None);
        assert!((t.height(DVec2::ZERO, true) - 3.0).abs() < 1e-6);
        assert_eq!(t.height(DVec2::ZERO, false), 1.0);
        assert_eq!(t.height(DVec2::new(30.0, 0.0), true), 1.0);
        assert!(matches!(t.probe_height(DVec2::ZERO), HeightProbe::Embankment(_)));
        t.clear();
        assert_eq!(t.height(DVec2::ZERO, true), 1.0);
    }

    #[test]
    fn test_lower_embankment_does_not_dig() {
        let mut t = terrain_with(HeightMap::constant(9, 9, 5.0).unwrap());
        let p1 = Path::line(DVec3::new(-2.0, 0.0, -10.0), DVec3::new(-2.0, 0.0, 10.0));
        let p2 = Path::line(DVec3::new(2.0, 0.0, 10.0), DVec3::new(2.0, 0.0, -10.0));
        t.add_embankment("ditch", p1, p2, None);
        assert_eq!(t.height(DVec2::ZERO, true), 5.0);
    }

    #[test]
    fn test_physicalize_modes() {
        let mut t = terrain_with(HeightMap::constant(4, 4, 1.0).unwrap());
        t.physicalize(true, PhysicsMode::Heightfield);
        match t.physics_shape() {
            Some(PhysicsShape::Heightfield(hf)) => assert_eq!(hf.heights.len(), 16),
            other => panic!("unexpected shape {other:?}"),
        }
        t.physicalize(true, PhysicsMode::Analytic);
        assert_eq!(t.physics_shape().map(PhysicsShape::mode), Some(PhysicsMode::Analytic));
        t.physicalize(false, PhysicsMode::Analytic);
        assert!(!t.is_physicalized());
    }

    #[test]
    fn test_ray_hits_flat_ground() {
        let t = terrain_with(HeightMap::constant(8, 8, 1.0).unwrap());
        let hit = t.intersect_ray(DVec3::new(0.0, 10.0, 0.0), DVec3::NEG_Y).unwrap();
        assert!(hit.y > 1.0 && hit.y < 1.03);
        assert!(t.intersect_ray(DVec3::new(0.0, -5.0, 0.0), DVec3::NEG_Y).is_none());
    }

    #[test]
    fn test_project_tangent_follows_slope() {
        let t = terrain_with(HeightMap::from_fn(101, 101, |i, _| i as f32).unwrap());
        let tan = t.project_tangent(DVec3::X, DVec3::ZERO);
        assert!(tan.y > 0.0);
        assert!((tan.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box_spans_heights() {
        let t = terrain_with(HeightMap::from_fn(3, 3, |i, j| (i + j) as f32 - 1.0).unwrap());
        let bb = t.bounding_box();
        assert_eq!(bb.min(), DVec3::new(-50.0, -1.0, -50.0));
        assert_eq!(bb.max(), DVec3::new(50.0, 3.0, 50.0));
    }
}
