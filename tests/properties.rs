//! Property tests for shapes and the narrow phase

use p2d::geometry::cross;
use p2d::sim::detect;
use p2d::{Axle, CollisionShape, ConvexHull, Point, Vector};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    -100.0f64..100.0
}

fn radius() -> impl Strategy<Value = f64> {
    0.1f64..20.0
}

proptest! {
    /// Overlapping circles overlap on every axle
    #[test]
    fn test_circle_projections_overlap(
        ax in coord(), ay in coord(), ra in radius(),
        bx in coord(), by in coord(), rb in radius(),
        angle in 0.0f64..std::f64::consts::TAU,
    ) {
        let a = CollisionShape::circle(Point::new(ax, ay), ra);
        let b = CollisionShape::circle(Point::new(bx, by), rb);
        let distance = Point::new(ax, ay).distance(Point::new(bx, by));
        prop_assume!(distance < ra + rb);

        let axle = Axle::new(Vector::from_angle(angle));
        prop_assert!(a.project(&axle).overlaps(&b.project(&axle)));
    }

    /// Circle contacts agree with the center distance
    #[test]
    fn test_circle_contact_matches_distance(
        ax in coord(), ay in coord(), ra in radius(),
        bx in coord(), by in coord(), rb in radius(),
    ) {
        let distance = Point::new(ax, ay).distance(Point::new(bx, by));
        prop_assume!((distance - (ra + rb)).abs() > 1e-6);
        prop_assume!(distance > 1e-6);

        let contact = detect(
            &CollisionShape::circle(Point::new(ax, ay), ra),
            &CollisionShape::circle(Point::new(bx, by), rb),
        );
        match contact {
            Some(c) => {
                prop_assert!(distance < ra + rb);
                prop_assert!((c.depth - (ra + rb - distance)).abs() < 1e-9);
                prop_assert!(c.normal.dot(Point::new(bx, by) - Point::new(ax, ay)) > 0.0);
            }
            None => prop_assert!(distance > ra + rb),
        }
    }

    /// Moving a clone never moves the original
    #[test]
    fn test_clone_independence(
        x in coord(), y in coord(), r in radius(),
        dx in coord(), dy in coord(),
        is_circle in any::<bool>(),
    ) {
        let original = if is_circle {
            CollisionShape::circle(Point::new(x, y), r)
        } else {
            CollisionShape::rectangle(Point::new(x, y), Vector::splat(r))
        };
        let before = original.center();
        let mut copy = original.clone();
        copy.move_by(Vector::new(dx, dy));
        copy.rotate(0.3);

        prop_assert_eq!(original.center(), before);
        prop_assert!((copy.center() - Point::new(x + dx, y + dy)).length() < 1e-9);
    }

    /// Hull generation gives counter-clockwise winding containing every input
    #[test]
    fn test_hull_from_points_is_ccw_and_encloses(
        points in prop::collection::vec((coord(), coord()), 3..40),
    ) {
        let points: Vec<Point> = points.into_iter().map(|(x, y)| Point::new(x, y)).collect();
        let Ok(hull) = ConvexHull::from_points(&points) else {
            // Collinear inputs
            return Ok(());
        };
        let v = hull.vertices();
        for i in 0..v.len() {
            let (p0, p1, p2) = (v[i], v[(i + 1) % v.len()], v[(i + 2) % v.len()]);
            prop_assert!(cross(p1 - p0, p2 - p1) > 0.0);
        }

        for axle in hull.edge_normals() {
            let extent = hull.project(&axle);
            for p in &points {
                let s = p.dot(axle.direction());
                prop_assert!(s <= extent.max + 1e-9);
            }
        }
    }
}
