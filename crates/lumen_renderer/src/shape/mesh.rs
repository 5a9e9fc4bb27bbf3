use crate::accel::Bvh;
use crate::shape::{AreaSample, Intersection, Shape};
use crate::Sampler;
use lumen_math::{Aabb, Frame, Ray, Vec2, Vec3, EPSILON};

/// One mesh vertex: position, shading normal and texture coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// An indexed triangle mesh behind its own BVH.
///
/// Triangles share the vertex buffer; the index buffer has one `[u32; 3]`
/// entry per triangle. With `smooth` set, shading normals interpolate the
/// vertex normals; otherwise the geometric normal is used.
pub struct TriangleMesh {
    triangles: Vec<[u32; 3]>,
    vertices: Vec<Vertex>,
    smooth: bool,
    accel: Bvh,
    bbox: Aabb,
    /// Cumulative triangle areas for area sampling; last entry is the total.
    cumulative_areas: Vec<f32>,
}

impl TriangleMesh {
    pub fn new(triangles: Vec<[u32; 3]>, mut vertices: Vec<Vertex>, smooth: bool) -> Self {
        if smooth && vertices.iter().all(|v| v.normal == Vec3::ZERO) {
            compute_vertex_normals(&triangles, &mut vertices);
        }

        let bounds: Vec<Aabb> = triangles
            .iter()
            .map(|tri| {
                let (a, b, c) = (
                    vertices[tri[0] as usize].position,
                    vertices[tri[1] as usize].position,
                    vertices[tri[2] as usize].position,
                );
                let mut bbox = Aabb::from_points(a, b);
                bbox.extend(c);
                bbox
            })
            .collect();

        let bbox = bounds
            .iter()
            .fold(Aabb::EMPTY, |acc, b| acc.union(b));
        let accel = Bvh::build(&bounds);

        let mut cumulative_areas = Vec::with_capacity(triangles.len());
        let mut total = 0.0;
        for tri in &triangles {
            let e1 = vertices[tri[1] as usize].position - vertices[tri[0] as usize].position;
            let e2 = vertices[tri[2] as usize].position - vertices[tri[0] as usize].position;
            total += 0.5 * e1.cross(e2).length();
            cumulative_areas.push(total);
        }

        log::debug!(
            "built mesh with {} triangles, {} vertices",
            triangles.len(),
            vertices.len()
        );

        Self {
            triangles,
            vertices,
            smooth,
            accel,
            bbox,
            cumulative_areas,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Möller-Trumbore intersection against one triangle.
    fn intersect_triangle(
        &self,
        index: usize,
        ray: &Ray,
        its: &mut Intersection,
    ) -> bool {
        let tri = self.triangles[index];
        let v0 = self.vertices[tri[0] as usize];
        let v1 = self.vertices[tri[1] as usize];
        let v2 = self.vertices[tri[2] as usize];

        let edge1 = v1.position - v0.position;
        let edge2 = v2.position - v0.position;

        let h = ray.direction.cross(edge2);
        let det = edge1.dot(h);
        if det == 0.0 {
            return false;
        }
        let inv_det = 1.0 / det;

        let s = ray.origin - v0.position;
        let u = s.dot(h) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(edge1);
        let v = ray.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = edge2.dot(q) * inv_det;
        if t < EPSILON || t > its.t {
            return false;
        }

        its.t = t;
        its.position = ray.at(t);
        its.geometry_normal = edge1.cross(edge2).normalize();
        its.shading_normal = if self.smooth {
            ((1.0 - u - v) * v0.normal + u * v1.normal + v * v2.normal).normalize()
        } else {
            its.geometry_normal
        };
        its.uv = (1.0 - u - v) * v0.uv + u * v1.uv + v * v2.uv;
        its.tangent = self.uv_tangent(v0, v1, v2, edge1, edge2, its.shading_normal);
        its.pdf = 1.0;

        true
    }

    /// Tangent along dP/du of the UV parameterization, guarded against
    /// degenerate charts.
    fn uv_tangent(
        &self,
        v0: Vertex,
        v1: Vertex,
        v2: Vertex,
        edge1: Vec3,
        edge2: Vec3,
        shading_normal: Vec3,
    ) -> Vec3 {
        let duv1 = v1.uv - v0.uv;
        let duv2 = v2.uv - v0.uv;

        let det = duv1.x * duv2.y - duv1.y * duv2.x;
        if det.abs() < 1e-10 {
            return Frame::new(shading_normal).tangent;
        }

        let tangent = (edge1 * duv2.y - edge2 * duv1.y) / det;
        Frame::with_tangent(shading_normal, tangent).tangent
    }
}

/// Area-weighted vertex normals for meshes loaded without them.
fn compute_vertex_normals(triangles: &[[u32; 3]], vertices: &mut [Vertex]) {
    for tri in triangles {
        let e1 = vertices[tri[1] as usize].position - vertices[tri[0] as usize].position;
        let e2 = vertices[tri[2] as usize].position - vertices[tri[0] as usize].position;
        let weighted = e1.cross(e2);
        for &i in tri {
            vertices[i as usize].normal += weighted;
        }
    }
    for v in vertices.iter_mut() {
        let len = v.normal.length();
        if len > 1e-10 {
            v.normal /= len;
        } else {
            v.normal = Vec3::Z;
        }
    }
}

impl Shape for TriangleMesh {
    fn intersect(&self, ray: &Ray, its: &mut Intersection, _sampler: &mut Sampler) -> bool {
        self.accel
            .intersect(ray, its, |i, ray, its| self.intersect_triangle(i, ray, its))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn centroid(&self) -> Vec3 {
        self.bbox.centroid()
    }

    fn sample_area(&self, sampler: &mut Sampler) -> Option<AreaSample> {
        let total = *self.cumulative_areas.last()?;
        if total <= 0.0 {
            return None;
        }

        // Pick a triangle proportional to area, then a uniform barycentric
        // point on it.
        let target = sampler.next() * total;
        let index = self
            .cumulative_areas
            .partition_point(|&cum| cum < target)
            .min(self.triangles.len() - 1);

        let tri = self.triangles[index];
        let v0 = self.vertices[tri[0] as usize];
        let v1 = self.vertices[tri[1] as usize];
        let v2 = self.vertices[tri[2] as usize];

        let u = sampler.next_2d();
        let su = u.x.sqrt();
        let b0 = 1.0 - su;
        let b1 = u.y * su;
        let b2 = 1.0 - b0 - b1;

        let position = b0 * v0.position + b1 * v1.position + b2 * v2.position;
        let normal = (v1.position - v0.position)
            .cross(v2.position - v0.position)
            .normalize();

        Some(AreaSample {
            position,
            normal,
            uv: b0 * v0.uv + b1 * v1.uv + b2 * v2.uv,
            pdf: 1.0 / total,
        })
    }

    fn type_name(&self) -> &'static str {
        "mesh"
    }
}
