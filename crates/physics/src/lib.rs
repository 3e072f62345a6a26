#![warn(missing_docs)]
//! Collision geometry primitives (AABB, renderable collision shapes).

use glam::Vec3;

/// Axis-aligned bounding box in a renderable's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Create an AABB from a center and full size.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest AABB enclosing every point, or `None` for an empty set.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for point in rest {
            min = min.min(*point);
            max = max.max(*point);
        }
        Some(Self { min, max })
    }

    /// Full extent along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Collision geometry attached to a renderable, in local space.
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionShape {
    /// Box with full `size` centered at `center`.
    Box {
        /// Full extents (width, height, depth).
        size: Vec3,
        /// Local center offset.
        center: Vec3,
    },
    /// Sphere of `radius` around `center`.
    Sphere {
        /// Sphere radius.
        radius: f32,
        /// Local center offset.
        center: Vec3,
    },
    /// Y-aligned cylinder.
    Cylinder {
        /// Cylinder radius.
        radius: f32,
        /// Full height along +Y.
        height: f32,
        /// Local center offset.
        center: Vec3,
    },
    /// Arbitrary mesh, measured through its vertices.
    Mesh {
        /// Local-space vertex positions.
        vertices: Vec<Vec3>,
    },
}

impl CollisionShape {
    /// Short label used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            CollisionShape::Box { .. } => "box",
            CollisionShape::Sphere { .. } => "sphere",
            CollisionShape::Cylinder { .. } => "cylinder",
            CollisionShape::Mesh { .. } => "mesh",
        }
    }

    /// Box size when this shape is a box.
    pub fn box_size(&self) -> Option<Vec3> {
        match self {
            CollisionShape::Box { size, .. } => Some(*size),
            _ => None,
        }
    }

    /// Axis-aligned bounds of the shape. `None` only for an empty mesh.
    pub fn bounding_aabb(&self) -> Option<Aabb> {
        match self {
            CollisionShape::Box { size, center } => Some(Aabb::from_center_size(*center, *size)),
            CollisionShape::Sphere { radius, center } => {
                Some(Aabb::from_center_size(*center, Vec3::splat(radius.abs() * 2.0)))
            }
            CollisionShape::Cylinder {
                radius,
                height,
                center,
            } => {
                let diameter = radius.abs() * 2.0;
                Some(Aabb::from_center_size(
                    *center,
                    Vec3::new(diameter, height.abs(), diameter),
                ))
            }
            CollisionShape::Mesh { vertices } => Aabb::from_points(vertices),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_from_points_encloses_all() {
        let aabb = Aabb::from_points(&[
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(-2.0, 3.0, 0.5),
            Vec3::new(0.0, 0.0, -0.5),
        ])
        .expect("non-empty");
        assert_eq!(aabb.min, Vec3::new(-2.0, -1.0, -0.5));
        assert_eq!(aabb.max, Vec3::new(1.0, 3.0, 0.5));
        assert_eq!(aabb.size(), Vec3::new(3.0, 4.0, 1.0));
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        let shape = CollisionShape::Mesh {
            vertices: Vec::new(),
        };
        assert!(shape.bounding_aabb().is_none());
    }

    #[test]
    fn sphere_and_cylinder_bounds() {
        let sphere = CollisionShape::Sphere {
            radius: 0.1,
            center: Vec3::ZERO,
        };
        assert_eq!(sphere.bounding_aabb().map(|b| b.size()), Some(Vec3::splat(0.2)));

        let cylinder = CollisionShape::Cylinder {
            radius: 0.1,
            height: 0.3,
            center: Vec3::ZERO,
        };
        assert_eq!(
            cylinder.bounding_aabb().map(|b| b.size()),
            Some(Vec3::new(0.2, 0.3, 0.2))
        );
    }

    #[test]
    fn only_boxes_report_box_size() {
        let cube = CollisionShape::Box {
            size: Vec3::splat(0.2),
            center: Vec3::ZERO,
        };
        assert_eq!(cube.box_size(), Some(Vec3::splat(0.2)));
        assert_eq!(cube.kind(), "box");
        let sphere = CollisionShape::Sphere {
            radius: 0.1,
            center: Vec3::ZERO,
        };
        assert_eq!(sphere.box_size(), None);
    }
}
