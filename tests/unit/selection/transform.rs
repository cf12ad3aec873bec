use super::*;
use crate::foundation::core::Point;

fn close(a: Point, b: Point) -> bool {
    (a - b).hypot() < 1e-9
}

fn placed() -> ItemPlacement {
    ItemPlacement {
        position: Vec2::new(100.0, 50.0),
        ..ItemPlacement::default()
    }
}

const SRC: Size = Size::new(200.0, 100.0);

#[test]
fn scale_keeps_anchor_fixed() {
    let p = placed();
    let br = Vec2::new(1.0, 1.0);
    let s = scaled(&p, SRC, Vec2::new(2.0, 2.0), br);
    assert_eq!(s.scale, Vec2::new(2.0, 2.0));
    assert!(close(s.point_at(SRC, br), p.point_at(SRC, br)));
    assert!(close(s.point_at(SRC, Vec2::ZERO), Point::new(-100.0, -50.0)));

    let top_left = scaled(&p, SRC, Vec2::new(0.5, 0.5), Vec2::ZERO);
    assert_eq!(top_left.position, p.position);
}

#[test]
fn scale_anchor_follows_rotation() {
    let mut p = placed();
    p.rotation = 90.0;
    let c = Vec2::new(0.5, 0.5);
    let s = scaled(&p, SRC, Vec2::new(3.0, 3.0), c);
    assert!(close(s.point_at(SRC, c), p.point_at(SRC, c)));
}

#[test]
fn rotate_and_flip_pivot_on_center() {
    let p = placed();
    let c = Vec2::new(0.5, 0.5);
    let r = rotated(&p, SRC, -90.0);
    assert_eq!(r.rotation, 270.0);
    assert!(close(r.point_at(SRC, c), p.point_at(SRC, c)));

    let f = flipped(&p, SRC, true, false);
    assert_eq!(f.scale, Vec2::new(-1.0, 1.0));
    assert!(close(f.point_at(SRC, c), p.point_at(SRC, c)));
    assert_eq!(f.bounds(SRC), p.bounds(SRC));
}

#[test]
fn reset_keeps_flags() {
    let mut p = placed();
    p.visible = false;
    p.locked = true;
    p.rotation = 45.0;
    let r = reset(&p);
    assert_eq!(r.position, Vec2::ZERO);
    assert_eq!(r.rotation, 0.0);
    assert!(!r.visible);
    assert!(r.locked);
}

#[test]
fn fit_scales_uniformly_and_centers() {
    let area = Rect::new(0.0, 0.0, 1920.0, 1080.0);
    let f = fitted(&placed(), SRC, area).unwrap();
    assert!((f.scale.x - 9.6).abs() < 1e-9);
    assert!((f.scale.y - 9.6).abs() < 1e-9);
    let b = f.bounds(SRC);
    assert!(close(b.center(), area.center()));
    assert!(b.height() <= 1080.0 + 1e-9);

    assert!(fitted(&placed(), Size::ZERO, area).is_none());
}

#[test]
fn center_moves_bounds_center() {
    let area = Rect::new(0.0, 0.0, 1000.0, 1000.0);
    let c = centered(&placed(), SRC, area);
    assert!(close(c.bounds(SRC).center(), Point::new(500.0, 500.0)));
}
