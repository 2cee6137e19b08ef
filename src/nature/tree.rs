//! Recursive tree grower.

use std::sync::Arc;

use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::{Segment, SegmentId, TreeParams};
use crate::geometry::GeoData;
use crate::material::{Material, MaterialRegistry, ShaderStage};
use crate::math::convex_hull;

/// Camera distances at which LOD1 and LOD2 take over.
pub const LOD_DISTANCES: [f64; 2] = [20.0, 50.0];

/// Deepest level kept in LOD1 and LOD2 wood geometry.
const LOD_MAX_LEVEL: [u32; 2] = [3, 2];

/// Leaf point size in LOD0.
const LEAF_SIZE: f32 = 0.03;

/// Leaf scatter radius relative to branch length.
const LEAF_SPREAD: f32 = 0.3;

/// Draws used to find a rotation axis before giving up.
const MAX_AXIS_DRAWS: usize = 64;

/// A grown tree: segment arena plus three levels of detail for wood and leaves.
#[derive(Debug, Clone, Serialize)]
pub struct Tree {
    params: TreeParams,
    seed: u64,
    segments: Vec<Segment>,
    wood: [GeoData; 3],
    leaves: [GeoData; 3],
    #[serde(skip)]
    rng: StdRng,
    #[serde(skip)]
    wood_material: Arc<Material>,
    #[serde(skip)]
    leaf_material: Arc<Material>,
}

impl Tree {
    /// Bare trunk using the shared tree materials from `materials`.
    pub fn new(materials: &MaterialRegistry) -> Self {
        let wood_material = materials.get_or_insert_with("tree_wood", Self::wood_material_template);
        let leaf_material = materials.get_or_insert_with("tree_leafs", Self::leaf_material_template);
        let mut tree = Self {
            params: TreeParams::default().with_branching(0, 0),
            seed: 0,
            segments: vec![Segment::trunk()],
            wood: Default::default(),
            leaves: Default::default(),
            rng: StdRng::seed_from_u64(0),
            wood_material,
            leaf_material,
        };
        tree.init_armature_geo();
        tree
    }

    fn wood_material_template() -> Material {
        let dir = "shader/Trees/Shader_tree_base";
        Material::new("tree_wood")
            .with_colors(Vec3::new(0.8, 0.8, 0.6), Vec3::new(0.4, 0.4, 0.2), Vec3::splat(0.1))
            .with_shader(ShaderStage::Vertex, format!("{dir}.vp"))
            .with_shader(ShaderStage::Fragment, format!("{dir}.fp"))
            .with_shader(ShaderStage::DeferredFragment, format!("{dir}.dfp"))
            .with_shader(ShaderStage::Geometry, format!("{dir}.gp"))
            .with_shader(ShaderStage::TessControl, format!("{dir}.tcp"))
            .with_shader(ShaderStage::TessEvaluation, format!("{dir}.tep"))
    }

    fn leaf_material_template() -> Material {
        let dir = "shader/Trees/Shader_leafs";
        Material::new("tree_leafs")
            .with_colors(Vec3::new(0.6, 1.0, 0.4), Vec3::new(0.2, 0.6, 0.2), Vec3::splat(0.1))
            .with_shader(ShaderStage::Vertex, format!("{dir}.vp"))
            .with_shader(ShaderStage::Fragment, format!("{dir}.fp"))
            .with_shader(ShaderStage::DeferredFragment, format!("{dir}.dfp"))
            .with_shader(ShaderStage::Geometry, format!("{dir}.gp"))
            .with_texture("examples/maple-leaf.png")
    }

    /// Regrow from a fresh trunk. The same `(params, seed)` always yields the
    /// same tree. Previously added leaves are discarded.
    pub fn setup(&mut self, params: TreeParams, seed: u64) {
        debug!(
            iterations = params.iterations,
            children = params.child_number,
            seed,
            "growing tree"
        );
        self.rng = StdRng::seed_from_u64(seed);
        self.seed = seed;
        self.params = params;
        self.segments = vec![Segment::trunk()];
        self.leaves = Default::default();
        self.grow(SegmentId(0), 0);
        self.init_armature_geo();
    }

    pub fn params(&self) -> &TreeParams { &self.params }
    pub fn seed(&self) -> u64 { self.seed }
    pub fn segments(&self) -> &[Segment] { &self.segments }
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> { self.segments.get(id.0) }
    pub fn root(&self) -> SegmentId { SegmentId(0) }

    pub fn children(&self, id: SegmentId) -> &[SegmentId] {
        self.segment(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    /// Wood line geometry for LOD `lod` (0..=2).
    pub fn wood(&self, lod: usize) -> Option<&GeoData> { self.wood.get(lod) }
    /// Leaf point geometry for LOD `lod` (0..=2).
    pub fn leaves(&self, lod: usize) -> Option<&GeoData> { self.leaves.get(lod) }

    pub fn wood_material(&self) -> &Arc<Material> { &self.wood_material }
    pub fn leaf_material(&self) -> &Arc<Material> { &self.leaf_material }

    pub fn set_leaf_material(&mut self, material: Arc<Material>) {
        self.leaf_material = material;
    }

    /// LOD index to display at camera distance `d`.
    pub fn lod_for_distance(d: f64) -> usize {
        LOD_DISTANCES.iter().take_while(|&&limit| d >= limit).count()
    }

    // ========================================================================
    // Growth
    // ========================================================================

    fn grow(&mut self, parent: SegmentId, iteration: u32) {
        if iteration >= self.params.iterations {
            return;
        }
        let sp = self.params.clone();
        let p = self.segments[parent.0].clone();

        let first = self.segments.len();
        for _ in 0..sp.child_number {
            let mut c = Segment::branch(p.level + 1, Some(parent), p.p2);

            let angle = self.variation(sp.p_angle, sp.p_angle_var);
            let dir = self.random_rotate(p.axis(), angle);
            c.p2 = p.p2 + dir * self.variation(sp.l_factor, sp.l_factor_var);

            c.n2 = (c.p2 - c.p1).normalize_or_zero();
            c.n1 = p.n2 + (p.n2 - c.n2) * self.variation(sp.n_angle, sp.n_angle_var);

            c.params[0].x = sp.r_factor.powi(iteration as i32);
            c.params[1].x = sp.r_factor.powi(iteration as i32 + 1);

            self.segments.push(c);
        }
        let ids: Vec<SegmentId> = (first..self.segments.len()).map(SegmentId).collect();
        self.segments[parent.0].children.extend(ids.iter().copied());
        trace!(parent = %parent, children = ids.len(), iteration, "branched");

        for id in ids {
            self.grow(id, iteration + 1);
        }
    }

    /// Uniform draw from `[min, max)`; equal bounds return `max`.
    pub fn random(&mut self, min: f32, max: f32) -> f32 {
        if min == max || !min.is_finite() || !max.is_finite() {
            return max;
        }
        let (lo, hi) = if min < max { (min, max) } else { (max, min) };
        self.rng.gen_range(lo..hi)
    }

    /// `v` varied by the relative amount `var`. Zero variation returns `v`.
    pub fn variation(&mut self, v: f32, var: f32) -> f32 {
        self.random(v * (1.0 - var), v * (1.0 + var))
    }

    fn random_unit_cube(&mut self) -> Vec3 {
        Vec3::new(self.random(-1.0, 1.0), self.random(-1.0, 1.0), self.random(-1.0, 1.0))
    }

    /// Rotate `v` by `a` radians around a random axis perpendicular-ish to it.
    pub fn random_rotate(&mut self, v: Vec3, a: f32) -> Vec3 {
        if a == 0.0 || v == Vec3::ZERO {
            return v;
        }
        for _ in 0..MAX_AXIS_DRAWS {
            let x = self.random_unit_cube();
            if x.dot(v) > 1e-3 {
                continue;
            }
            let d = v.cross(x);
            if d.length_squared() < 1e-12 {
                continue;
            }
            return Quat::from_axis_angle(d.normalize(), a) * v;
        }
        warn!("no rotation axis found, keeping direction");
        v
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    fn init_armature_geo(&mut self) {
        let mut geo: [GeoData; 3] = Default::default();
        for s in &self.segments {
            let lods = std::iter::once(true).chain(LOD_MAX_LEVEL.iter().map(|&m| s.level <= m));
            for (g, keep) in geo.iter_mut().zip(lods) {
                if keep {
                    g.push_vert_tc(s.p1, s.n1, s.params[0]);
                    g.push_vert_tc(s.p2, s.n2, s.params[1]);
                    g.push_line();
                }
            }
        }
        self.wood = geo;
    }

    /// Scatter `amount` leaves around every segment of generation `level`.
    ///
    /// Repeated calls append to the existing leaves instead of replacing
    /// them, so several levels can carry foliage; [`Tree::setup`] clears
    /// them. LOD1 keeps every 4th leaf at double size and LOD2 every 16th at
    /// four times the size. Vertex colour encodes `(size, carotene, chlorophyll)`.
    pub fn add_leaves(&mut self, level: u32, amount: usize) {
        let carotene = self.random(0.5, 1.0);
        let chlorophyll = self.random(0.5, 1.0);

        let branches: Vec<(Vec3, Vec3, f32)> = self
            .segments
            .iter()
            .filter(|s| s.level == level)
            .map(|s| (s.midpoint(), s.p1, s.axis().length()))
            .collect();
        if branches.is_empty() {
            warn!(level, "no branches on level, no leaves added");
        }

        for (mid, base, len) in branches {
            let r = len * LEAF_SPREAD;
            for _ in 0..amount {
                let v = Vec3::new(
                    self.rng.sample::<f32, _>(StandardNormal),
                    self.rng.sample::<f32, _>(StandardNormal),
                    self.rng.sample::<f32, _>(StandardNormal),
                ) * r;
                let pos = mid + v;
                let n = (pos - base).normalize_or_zero();
                self.leaves[0].push_vert_color(pos, n, Vec3::new(LEAF_SIZE, carotene, chlorophyll));
                self.leaves[0].push_point();
            }
        }

        self.leaves[1] = Self::thin_leaves(&self.leaves[0], 4, 2.0);
        self.leaves[2] = Self::thin_leaves(&self.leaves[0], 16, 4.0);
    }

    fn thin_leaves(src: &GeoData, stride: usize, size_factor: f32) -> GeoData {
        let mut out = GeoData::new();
        for i in (0..src.len()).step_by(stride) {
            let (Some(p), Some(n), Some(mut c)) = (src.position(i), src.normal(i), src.color(i)) else {
                continue;
            };
            c.x *= size_factor;
            out.push_vert_color(p, n, c);
            out.push_point();
        }
        out
    }

    /// Append a convex hull of a fraction `amount` of the leaves to `geo`,
    /// shifted by `offset` and coloured by the mean leaf pigments.
    pub fn create_hull_leaf_lod(&self, geo: &mut GeoData, amount: f32, offset: Vec3) {
        let g0 = &self.leaves[0];
        if g0.is_empty() || amount <= 0.0 {
            return;
        }
        let n = ((g0.len() as f32 * amount) as usize).max(1);
        let stride = 1.0 / amount;

        let mut mean = Vec3::ZERO;
        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            let j = ((i as f32 * stride) as usize).min(g0.len() - 1);
            mean += g0.color(j).unwrap_or(Vec3::ZERO);
            points.push(g0.positions[j] + offset);
        }
        mean /= n as f32;

        let Some(hull) = convex_hull(&points) else {
            warn!(points = points.len(), "leaf cloud too flat for a hull");
            return;
        };
        let (carotene, chlorophyll) = (mean.y, mean.z);
        let color = Vec3::new(0.4 * carotene, 0.8 * chlorophyll, 0.2 * chlorophyll);
        let center = hull.vertices.iter().copied().sum::<Vec3>() / hull.vertices.len() as f32;

        let mut res = GeoData::new();
        for &v in &hull.vertices {
            res.push_vert_color(v, (v - center).normalize_or_zero(), color);
        }
        for [a, b, c] in hull.triangles {
            res.push_triangle(a, b, c);
        }
        geo.append(&res);
    }

    /// Append a fixed square trunk box (half-width 0.1, height 3) at `offset`.
    pub fn create_hull_trunk_lod(&self, geo: &mut GeoData, offset: Vec3) {
        if self.leaves[0].is_empty() {
            return;
        }
        let (r, h) = (0.1, 3.0);
        let colored = !geo.colors.is_empty();
        let base = geo.len() as u32;
        for y in [0.0, h] {
            for (x, z) in [(-r, -r), (-r, r), (r, r), (r, -r)] {
                let pos = Vec3::new(x, y, z) + offset;
                let n = Vec3::new(x, 0.0, z).normalize();
                if colored {
                    geo.push_vert_color(pos, n, Vec3::new(0.4, 0.3, 0.2));
                } else {
                    geo.push_vert(pos, n);
                }
            }
        }
        for k in 0..4 {
            let (a, b) = (base + k, base + (k + 1) % 4);
            geo.push_quad(a, b, b + 4, a + 4);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Tree {
        Tree::new(&MaterialRegistry::new())
    }

    #[test]
    fn test_new_is_bare_trunk() {
        let t = tree();
        assert_eq!(t.segments().len(), 1);
        let trunk = &t.segments()[0];
        assert_eq!(trunk.p1, Vec3::ZERO);
        assert_eq!(trunk.p2, Vec3::Y);
        assert_eq!(trunk.params[0], glam::Vec2::new(1.0, 0.0));
        assert!(trunk.parent.is_none());
    }

    #[test]
    fn test_zero_iterations_only_trunk() {
        let mut t = tree();
        t.setup(TreeParams::default().with_branching(5, 0), 1);
        assert_eq!(t.segments().len(), 1);
        assert!(t.segments()[0].children.is_empty());
    }

    #[test]
    fn test_zero_children_only_trunk() {
        let mut t = tree();
        t.setup(TreeParams::default().with_branching(0, 4), 1);
        assert_eq!(t.segments().len(), 1);
    }

    #[test]
    fn test_segment_count_is_geometric_sum() {
        for (c, k) in [(1, 4), (2, 3), (3, 3), (5, 2)] {
            let mut t = tree();
            let p = TreeParams::default().with_branching(c, k);
            t.setup(p.clone(), 7);
            assert_eq!(t.segments().len() - 1, p.branch_count(), "c={c} k={k}");
        }
    }

    #[test]
    fn test_children_appended_before_recursion() {
        let mut t = tree();
        t.setup(TreeParams::default().with_branching(3, 2), 3);
        let root = t.children(t.root()).to_vec();
        assert_eq!(root, vec![SegmentId(1), SegmentId(2), SegmentId(3)]);
        // first grandchild block belongs to the first child
        assert_eq!(t.children(SegmentId(1)), &[SegmentId(4), SegmentId(5), SegmentId(6)]);
        for id in root {
            assert_eq!(t.segment(id).unwrap().parent, Some(SegmentId(0)));
            assert_eq!(t.segment(id).unwrap().p1, Vec3::Y);
        }
    }

    #[test]
    fn test_radius_params_shrink_per_generation() {
        let mut t = tree();
        t.setup(TreeParams::default().with_branching(2, 2), 3);
        let s = t.segment(SegmentId(1)).unwrap();
        assert_eq!(s.params[0].x, 1.0);
        assert_eq!(s.params[1].x, 0.5);
        let g = t.segment(t.children(SegmentId(1))[0]).unwrap();
        assert_eq!(g.params[0].x, 0.5);
        assert_eq!(g.params[1].x, 0.25);
    }

    #[test]
    fn test_same_seed_same_tree() {
        let mut a = tree();
        let mut b = tree();
        a.setup(TreeParams::default().with_branching(3, 3), 99);
        b.setup(TreeParams::default().with_branching(3, 3), 99);
        assert_eq!(a.segments(), b.segments());
    }

    #[test]
    fn test_zero_variation_is_exact() {
        let mut t = tree();
        for v in [0.0, 0.2, 1.5, -3.0] {
            assert_eq!(t.variation(v, 0.0), v);
        }
        assert_eq!(t.random(2.0, 2.0), 2.0);
    }

    #[test]
    fn test_random_in_range_even_with_swapped_bounds() {
        let mut t = tree();
        for _ in 0..100 {
            let r = t.random(1.0, -1.0);
            assert!((-1.0..1.0).contains(&r));
        }
    }

    #[test]
    fn test_random_rotate_keeps_length_and_angle() {
        let mut t = tree();
        let v = Vec3::new(0.0, 2.0, 0.0);
        assert_eq!(t.random_rotate(v, 0.0), v);
        let r = t.random_rotate(v, 0.5);
        assert!((r.length() - 2.0).abs() < 1e-5);
        assert!((r.angle_between(v) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_wood_lods_bucket_by_level() {
        let mut t = tree();
        t.setup(TreeParams::default().with_branching(2, 4), 5);
        let all = t.segments().len();
        let lod1 = t.segments().iter().filter(|s| s.level <= 3).count();
        let lod2 = t.segments().iter().filter(|s| s.level <= 2).count();
        assert_eq!(t.wood(0).unwrap().count_lines(), all);
        assert_eq!(t.wood(1).unwrap().count_lines(), lod1);
        assert_eq!(t.wood(2).unwrap().count_lines(), lod2);
    }

    #[test]
    fn test_leaves_and_lod_thinning() {
        let mut t = tree();
        t.setup(TreeParams::default().with_branching(2, 2), 5);
        t.add_leaves(2, 10);
        assert_eq!(t.leaves(0).unwrap().len(), 40);
        assert_eq!(t.leaves(1).unwrap().len(), 10);
        assert_eq!(t.leaves(2).unwrap().len(), 3);
        let c0 = t.leaves(0).unwrap().color(0).unwrap();
        let c1 = t.leaves(1).unwrap().color(0).unwrap();
        assert_eq!(c0.x, LEAF_SIZE);
        assert_eq!(c1.x, LEAF_SIZE * 2.0);
        assert!((0.5..1.0).contains(&c0.y) && (0.5..1.0).contains(&c0.z));
    }

    #[test]
    fn test_leaves_accumulate() {
        let mut t = tree();
        t.setup(TreeParams::default().with_branching(2, 2), 5);
        t.add_leaves(1, 5);
        t.add_leaves(2, 5);
        assert_eq!(t.leaves(0).unwrap().len(), 2 * 5 + 4 * 5);
    }

    #[test]
    fn test_hull_lods_need_leaves() {
        let t = tree();
        let mut geo = GeoData::new();
        t.create_hull_leaf_lod(&mut geo, 0.5, Vec3::ZERO);
        t.create_hull_trunk_lod(&mut geo, Vec3::ZERO);
        assert!(geo.is_empty());
    }

    #[test]
    fn test_hull_leaf_color_and_trunk_box() {
        let mut t = tree();
        t.setup(TreeParams::default().with_branching(3, 2), 11);
        t.add_leaves(2, 20);
        let mut geo = GeoData::new();
        t.create_hull_leaf_lod(&mut geo, 0.5, Vec3::ZERO);
        assert!(!geo.is_empty());
        let leaf = t.leaves(0).unwrap().color(0).unwrap();
        let c = geo.color(0).unwrap();
        assert!((c - Vec3::new(0.4 * leaf.y, 0.8 * leaf.z, 0.2 * leaf.z)).length() < 1e-4);

        let n = geo.len();
        t.create_hull_trunk_lod(&mut geo, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(geo.len(), n + 8);
        assert_eq!(geo.count_quads(), 4);
        assert_eq!(geo.colors.len(), geo.len());
        assert!(geo.position(n + 4).unwrap().distance(Vec3::new(0.9, 3.0, -0.1)) < 1e-6);
    }

    #[test]
    fn test_lod_for_distance() {
        assert_eq!(Tree::lod_for_distance(0.0), 0);
        assert_eq!(Tree::lod_for_distance(19.9), 0);
        assert_eq!(Tree::lod_for_distance(20.0), 1);
        assert_eq!(Tree::lod_for_distance(75.0), 2);
    }

    #[test]
    fn test_materials_shared_through_registry() {
        let reg = MaterialRegistry::new();
        let a = Tree::new(&reg);
        let b = Tree::new(&reg);
        assert!(Arc::ptr_eq(a.wood_material(), b.wood_material()));
        assert_eq!(reg.names(), vec!["tree_leafs", "tree_wood"]);
    }
}
