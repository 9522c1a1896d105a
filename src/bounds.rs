use glam::Vec3;

/// Axis-aligned bounding box of the imported mesh.
///
/// Computed once right after import and never modified; `min <= max` holds
/// on every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Folds the per-axis extrema over a vertex set in one pass.
    ///
    /// Callers must pass at least one position. The importer rejects empty
    /// meshes before this is ever reached.
    pub fn from_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut iter = positions.into_iter();
        let first = iter.next().unwrap_or(Vec3::ZERO);

        iter.fold(
            Self {
                min: first,
                max: first,
            },
            |bounds, p| Self {
                min: bounds.min.min(p),
                max: bounds.max.max(p),
            },
        )
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Per-axis extents.
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Characteristic size: the largest of the three extents.
    pub fn size(&self) -> f32 {
        self.extents().max_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_mixed_vertices() {
        let bounds = BoundingBox::from_positions([
            Vec3::new(-1.0, -2.0, 0.0),
            Vec3::new(3.0, 4.0, 5.0),
            Vec3::new(0.0, 0.0, 0.0),
        ]);

        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, 1.0, 2.5));
        assert_eq!(bounds.size(), 6.0);
    }

    #[test]
    fn single_vertex_is_degenerate_box() {
        let p = Vec3::new(0.5, -0.5, 2.0);
        let bounds = BoundingBox::from_positions([p]);
        assert_eq!(bounds.min, p);
        assert_eq!(bounds.max, p);
        assert_eq!(bounds.center(), p);
        assert_eq!(bounds.size(), 0.0);
    }

    #[test]
    fn min_never_exceeds_max() {
        let points = (0..50).map(|i| {
            let t = i as f32 * 0.37;
            Vec3::new(t.sin() * 4.0, t.cos() * -2.0, (t * 1.7).sin())
        });
        let bounds = BoundingBox::from_positions(points);
        assert!(bounds.min.cmple(bounds.max).all());
    }
}
