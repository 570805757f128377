use super::manifold::Contact;
use crate::math::{Vec2, EPSILON};
use crate::objects::rigid_body::RigidBody;
use crate::shapes::{Circle, Polygon, Shape};

/// Narrow-phase test for any pair of bodies.
///
/// The returned normal points from `body_a` towards `body_b`. `None` means
/// the shapes do not overlap.
pub fn collide(body_a: &RigidBody, body_b: &RigidBody) -> Option<Contact> {
    match (&body_a.shape, &body_b.shape) {
        (Shape::Circle(_), Shape::Circle(_)) => circle_circle(body_a, body_b),
        (Shape::Circle(_), Shape::Polygon(_)) => circle_polygon(body_a, body_b),
        (Shape::Polygon(_), Shape::Circle(_)) => polygon_circle(body_a, body_b),
        (Shape::Polygon(_), Shape::Polygon(_)) => polygon_polygon(body_a, body_b),
    }
}

fn as_circle(body: &RigidBody) -> Option<&Circle> {
    match &body.shape {
        Shape::Circle(circle) => Some(circle),
        Shape::Polygon(_) => None,
    }
}

fn as_polygon(body: &RigidBody) -> Option<&Polygon> {
    match &body.shape {
        Shape::Polygon(polygon) => Some(polygon),
        Shape::Circle(_) => None,
    }
}

/// Checks for collision between two circles.
pub fn circle_circle(body_a: &RigidBody, body_b: &RigidBody) -> Option<Contact> {
    let radius_a = as_circle(body_a)?.radius;
    let radius_b = as_circle(body_b)?.radius;

    let dist_vec = body_b.position - body_a.position;
    let dist_sq = dist_vec.magnitude_squared();
    let radius_sum = radius_a + radius_b;
    if dist_sq >= radius_sum * radius_sum {
        return None;
    }

    let distance = dist_sq.sqrt();
    if distance == 0.0 {
        // Concentric circles: any direction separates them.
        return Some(Contact::single(Vec2::new(1.0, 0.0), radius_a, body_a.position));
    }

    let normal = dist_vec / distance;
    Some(Contact::single(
        normal,
        radius_sum - distance,
        body_a.position + normal * radius_a,
    ))
}

/// Checks for collision between a circle (`circle_body`) and a polygon.
///
/// The circle center is moved into the polygon's model space and tested
/// against the face of greatest separation, then against the Voronoi regions
/// of that face's two vertices.
pub fn circle_polygon(circle_body: &RigidBody, polygon_body: &RigidBody) -> Option<Contact> {
    let radius = as_circle(circle_body)?.radius;
    let polygon = as_polygon(polygon_body)?;
    let rotation = polygon.transform();

    let center = rotation.transpose() * (circle_body.position - polygon_body.position);

    let mut separation = f64::NEG_INFINITY;
    let mut face = 0;
    for (i, (&v, &n)) in polygon.vertices().iter().zip(polygon.normals()).enumerate() {
        let current = n.dot(center - v);
        if current > radius {
            return None;
        }
        if current > separation {
            separation = current;
            face = i;
        }
    }

    let v1 = polygon.vertices()[face];
    let v2 = polygon.vertices()[polygon.next_index(face)];

    // Center inside the polygon
    if separation < EPSILON {
        let normal = -(rotation * polygon.normals()[face]);
        return Some(Contact::single(
            normal,
            radius,
            circle_body.position + normal * radius,
        ));
    }

    let dot1 = (center - v1).dot(v2 - v1);
    let dot2 = (center - v2).dot(v1 - v2);

    if dot1 <= 0.0 {
        vertex_contact(center, v1, radius, polygon_body)
    } else if dot2 <= 0.0 {
        vertex_contact(center, v2, radius, polygon_body)
    } else {
        let face_normal = polygon.normals()[face];
        if (center - v1).dot(face_normal) > radius {
            return None;
        }
        let normal = -(rotation * face_normal);
        Some(Contact::single(
            normal,
            radius - separation,
            circle_body.position + normal * radius,
        ))
    }
}

fn vertex_contact(
    center: Vec2,
    vertex: Vec2,
    radius: f64,
    polygon_body: &RigidBody,
) -> Option<Contact> {
    let dist_sq = center.distance_squared(vertex);
    if dist_sq > radius * radius {
        return None;
    }

    let rotation = polygon_body.shape.transform();
    let normal = (rotation * (vertex - center)).normalize();
    Some(Contact::single(
        normal,
        radius - dist_sq.sqrt(),
        polygon_body.position + rotation * vertex,
    ))
}

/// Polygon against circle: the circle test with roles swapped and the normal
/// negated so it still points from the polygon towards the circle.
pub fn polygon_circle(polygon_body: &RigidBody, circle_body: &RigidBody) -> Option<Contact> {
    circle_polygon(circle_body, polygon_body).map(Contact::flipped)
}

/// Checks for collision between two convex polygons.
///
/// Separating axes are searched on the faces of both polygons. The face with
/// the least penetration becomes the reference face, the most anti-parallel
/// face of the other polygon is clipped against its side planes, and every
/// clipped point behind the reference face becomes a contact.
pub fn polygon_polygon(body_a: &RigidBody, body_b: &RigidBody) -> Option<Contact> {
    let polygon_a = as_polygon(body_a)?;
    let polygon_b = as_polygon(body_b)?;

    let (penetration_a, face_a) = find_axis_least_penetration(body_a, polygon_a, body_b, polygon_b);
    if penetration_a >= 0.0 {
        return None;
    }
    let (penetration_b, face_b) = find_axis_least_penetration(body_b, polygon_b, body_a, polygon_a);
    if penetration_b >= 0.0 {
        return None;
    }

    let (ref_body, ref_poly, inc_body, inc_poly, ref_index, flip) =
        if bias_greater_than(penetration_a, penetration_b) {
            (body_a, polygon_a, body_b, polygon_b, face_a, false)
        } else {
            (body_b, polygon_b, body_a, polygon_a, face_b, true)
        };

    let mut incident = find_incident_face(ref_poly, inc_body, inc_poly, ref_index);

    let v1 = ref_poly.world_vertex(ref_body.position, ref_index);
    let v2 = ref_poly.world_vertex(ref_body.position, ref_poly.next_index(ref_index));

    let side_normal = (v2 - v1).normalize();
    let ref_normal = side_normal.perpendicular_cw();
    let ref_offset = ref_normal.dot(v1);
    let neg_side = -side_normal.dot(v1);
    let pos_side = side_normal.dot(v2);

    if clip(-side_normal, neg_side, &mut incident) < 2 {
        return None;
    }
    if clip(side_normal, pos_side, &mut incident) < 2 {
        return None;
    }

    let mut points = [Vec2::ZERO; 2];
    let mut count = 0;
    let mut penetration = 0.0;
    for point in incident {
        let separation = ref_normal.dot(point) - ref_offset;
        if separation <= 0.0 {
            points[count] = point;
            penetration -= separation;
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }

    let normal = if flip { -ref_normal } else { ref_normal };
    Some(Contact::with_points(
        normal,
        penetration / count as f64,
        &points[..count],
    ))
}

/// Face of `poly_a` whose normal best separates it from `poly_b`, with the
/// signed distance along it. A non-negative distance is a separating axis.
fn find_axis_least_penetration(
    body_a: &RigidBody,
    poly_a: &Polygon,
    body_b: &RigidBody,
    poly_b: &Polygon,
) -> (f64, usize) {
    let to_b_space = poly_b.transform().transpose();
    let mut best_distance = f64::NEG_INFINITY;
    let mut best_index = 0;

    for (i, &face_normal) in poly_a.normals().iter().enumerate() {
        let normal = to_b_space * (poly_a.transform() * face_normal);
        let support = poly_b.support(-normal);

        let vertex = poly_a.world_vertex(body_a.position, i) - body_b.position;
        let vertex = to_b_space * vertex;

        let distance = normal.dot(support - vertex);
        if distance > best_distance {
            best_distance = distance;
            best_index = i;
        }
    }

    (best_distance, best_index)
}

/// World-space endpoints of the incident polygon's face most anti-parallel
/// to the reference face.
fn find_incident_face(
    ref_poly: &Polygon,
    inc_body: &RigidBody,
    inc_poly: &Polygon,
    ref_index: usize,
) -> [Vec2; 2] {
    let ref_normal =
        inc_poly.transform().transpose() * (ref_poly.transform() * ref_poly.normals()[ref_index]);

    let mut incident_face = 0;
    let mut min_dot = f64::INFINITY;
    for (i, &n) in inc_poly.normals().iter().enumerate() {
        let dot = ref_normal.dot(n);
        if dot < min_dot {
            min_dot = dot;
            incident_face = i;
        }
    }

    [
        inc_poly.world_vertex(inc_body.position, incident_face),
        inc_poly.world_vertex(inc_body.position, inc_poly.next_index(incident_face)),
    ]
}

/// Clips a segment against the half-plane `dot(normal, p) <= offset`,
/// rewriting `face` in place. Returns how many points survive.
fn clip(normal: Vec2, offset: f64, face: &mut [Vec2; 2]) -> usize {
    let mut out = *face;
    let mut count = 0;

    let distance_a = normal.dot(face[0]) - offset;
    let distance_b = normal.dot(face[1]) - offset;

    if distance_a <= 0.0 {
        out[count] = face[0];
        count += 1;
    }
    if distance_b <= 0.0 {
        out[count] = face[1];
        count += 1;
    }
    if distance_a * distance_b < 0.0 {
        let alpha = distance_a / (distance_a - distance_b);
        out[count] = face[0] + (face[1] - face[0]) * alpha;
        count += 1;
    }

    *face = out;
    count
}

/// Prefers `a` unless `b` is clearly better, so the reference face does not
/// flicker between near-equal candidates.
fn bias_greater_than(a: f64, b: f64) -> bool {
    const BIAS_RELATIVE: f64 = 0.95;
    const BIAS_ABSOLUTE: f64 = 0.01;
    a >= b * BIAS_RELATIVE + a * BIAS_ABSOLUTE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    const EPSILON: f64 = 1e-9;

    fn circle(x: f64, y: f64, radius: f64) -> RigidBody {
        RigidBody::new_circle(Vec2::new(x, y), radius, 1.0).unwrap()
    }

    fn square(x: f64, y: f64, size: f64) -> RigidBody {
        RigidBody::new_rectangle(Vec2::new(x, y), size, size, 1.0).unwrap()
    }

    fn assert_vec_eq(actual: Vec2, expected: Vec2) {
        assert!(
            (actual.x - expected.x).abs() < EPSILON && (actual.y - expected.y).abs() < EPSILON,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_circle_circle_no_collision() {
        assert!(circle_circle(&circle(0.0, 0.0, 1.0), &circle(3.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn test_circle_circle_touching_is_not_contact() {
        assert!(circle_circle(&circle(0.0, 0.0, 1.0), &circle(2.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn test_circle_circle_colliding() {
        let a = circle(1.0, 1.0, 2.0);
        let b = circle(4.0, 1.0, 2.0);
        let contact = circle_circle(&a, &b).unwrap();

        assert_eq!(contact.count(), 1);
        assert!((contact.penetration - 1.0).abs() < EPSILON);
        assert_vec_eq(contact.normal, Vec2::new(1.0, 0.0));
        assert_vec_eq(contact.points()[0], Vec2::new(3.0, 1.0));
    }

    #[test]
    fn test_circle_circle_concentric() {
        let contact = circle_circle(&circle(2.0, 2.0, 1.5), &circle(2.0, 2.0, 1.0)).unwrap();
        assert_eq!(contact.normal, Vec2::new(1.0, 0.0));
        assert_eq!(contact.penetration, 1.5);
        assert_eq!(contact.points()[0], Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_circle_polygon_face_region() {
        let c = circle(1.5, 0.0, 1.0);
        let poly = square(0.0, 0.0, 2.0);
        let contact = circle_polygon(&c, &poly).unwrap();

        assert!((contact.penetration - 0.5).abs() < EPSILON);
        assert_vec_eq(contact.normal, Vec2::new(-1.0, 0.0));
        assert_vec_eq(contact.points()[0], Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_circle_polygon_center_inside() {
        let c = circle(0.5, 0.0, 1.0);
        let poly = square(0.0, 0.0, 2.0);
        let contact = circle_polygon(&c, &poly).unwrap();

        assert!((contact.penetration - 1.0).abs() < EPSILON);
        assert_vec_eq(contact.normal, Vec2::new(-1.0, 0.0));
        // Deepest circle point along the contact normal
        assert_eq!(contact.count(), 1);
        assert_vec_eq(contact.points()[0], Vec2::new(-0.5, 0.0));
    }

    #[test]
    fn test_circle_polygon_vertex_region() {
        let c = circle(1.5, 1.5, 1.0);
        let poly = square(0.0, 0.0, 2.0);
        let contact = circle_polygon(&c, &poly).unwrap();

        let d = 0.5f64.sqrt();
        assert!((contact.penetration - (1.0 - d)).abs() < EPSILON);
        assert_vec_eq(contact.normal, Vec2::new(-d, -d));
        assert_vec_eq(contact.points()[0], Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_circle_polygon_misses_corner() {
        let c = circle(1.8, 1.8, 1.0);
        let poly = square(0.0, 0.0, 2.0);
        assert!(circle_polygon(&c, &poly).is_none());
        assert!(circle_polygon(&circle(3.0, 0.0, 1.0), &poly).is_none());
    }

    #[test]
    fn test_circle_polygon_rotated() {
        let c = circle(0.0, 1.5, 1.0);
        let mut poly = square(0.0, 0.0, 2.0);
        poly.set_rotation(PI / 2.0);
        let contact = circle_polygon(&c, &poly).unwrap();

        assert!((contact.penetration - 0.5).abs() < EPSILON);
        assert_vec_eq(contact.normal, Vec2::new(0.0, -1.0));
        assert_vec_eq(contact.points()[0], Vec2::new(0.0, 0.5));
    }

    #[test]
    fn test_polygon_circle_negates_normal() {
        let c = circle(1.5, 0.0, 1.0);
        let poly = square(0.0, 0.0, 2.0);
        let forward = circle_polygon(&c, &poly).unwrap();
        let reverse = polygon_circle(&poly, &c).unwrap();

        assert_eq!(reverse.normal, -forward.normal);
        assert_eq!(reverse.penetration, forward.penetration);
        assert_eq!(reverse.points(), forward.points());
    }

    #[test]
    fn test_polygon_polygon_overlap() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.5, 0.0, 2.0);
        let contact = polygon_polygon(&a, &b).unwrap();

        assert_eq!(contact.count(), 2);
        assert!((contact.penetration - 0.5).abs() < EPSILON);
        assert_vec_eq(contact.normal, Vec2::new(1.0, 0.0));
        for p in contact.points() {
            assert!((p.x - 1.0).abs() < EPSILON);
            assert!(p.y.abs() <= 1.0 + EPSILON);
        }
    }

    #[test]
    fn test_polygon_polygon_normal_points_a_to_b() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(0.0, -1.8, 2.0);
        let contact = polygon_polygon(&a, &b).unwrap();
        assert_vec_eq(contact.normal, Vec2::new(0.0, -1.0));
        assert!((contact.penetration - 0.2).abs() < EPSILON);

        let contact = polygon_polygon(&b, &a).unwrap();
        assert_vec_eq(contact.normal, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_polygon_polygon_separated() {
        assert!(polygon_polygon(&square(0.0, 0.0, 2.0), &square(3.0, 0.0, 2.0)).is_none());
        assert!(polygon_polygon(&square(0.0, 0.0, 2.0), &square(2.0, 0.0, 2.0)).is_none());
    }

    #[test]
    fn test_polygon_polygon_box_on_floor() {
        let floor = RigidBody::new_rectangle(Vec2::new(0.0, 1.0), 20.0, 2.0, 0.0).unwrap();
        let crate_body = square(3.0, -0.45, 1.0);
        let contact = polygon_polygon(&floor, &crate_body).unwrap();

        assert_eq!(contact.count(), 2);
        assert_vec_eq(contact.normal, Vec2::new(0.0, -1.0));
        assert!((contact.penetration - 0.05).abs() < EPSILON);
    }

    #[test]
    fn test_collide_dispatch() {
        let c = circle(1.5, 0.0, 1.0);
        let poly = square(0.0, 0.0, 2.0);
        assert_eq!(collide(&c, &poly), circle_polygon(&c, &poly));
        assert_eq!(collide(&poly, &c), polygon_circle(&poly, &c));
        assert_eq!(collide(&c, &circle(2.0, 0.0, 1.0)), circle_circle(&c, &circle(2.0, 0.0, 1.0)));
        assert_eq!(collide(&poly, &square(1.5, 0.0, 2.0)), polygon_polygon(&poly, &square(1.5, 0.0, 2.0)));
    }

    #[test]
    fn test_clip_segment() {
        let mut face = [Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)];
        let kept = clip(Vec2::new(1.0, 0.0), 0.5, &mut face);
        assert_eq!(kept, 2);
        assert_eq!(face[0], Vec2::new(-1.0, 0.0));
        assert_vec_eq(face[1], Vec2::new(0.5, 0.0));

        let mut outside = [Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)];
        assert_eq!(clip(Vec2::new(1.0, 0.0), 0.5, &mut outside), 0);
    }

    #[test]
    fn test_bias_greater_than() {
        assert!(bias_greater_than(-0.1, -0.5));
        assert!(!bias_greater_than(-0.5, -0.1));
    }
}
