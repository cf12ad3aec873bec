use super::*;

#[test]
fn rotation_normalizes_into_half_open_range() {
    assert_eq!(normalize_rotation(0.0), 0.0);
    assert_eq!(normalize_rotation(360.0), 0.0);
    assert_eq!(normalize_rotation(-90.0), 270.0);
    assert_eq!(normalize_rotation(725.0), 5.0);
    assert_eq!(normalize_rotation(-1e-18), 0.0);
    assert_eq!(normalize_rotation(f64::NAN), 0.0);
}

#[test]
fn anchor_fractions_cover_corners_and_center() {
    assert_eq!(Anchor::TopLeft.fractions(), Vec2::new(0.0, 0.0));
    assert_eq!(Anchor::Center.fractions(), Vec2::new(0.5, 0.5));
    assert_eq!(Anchor::BottomRight.fractions(), Vec2::new(1.0, 1.0));
}

#[test]
fn crop_validity_rejects_negative_and_nan() {
    assert!(Crop::default().is_valid());
    assert!(
        !Crop {
            left: -1.0,
            ..Crop::default()
        }
        .is_valid()
    );
    assert!(
        !Crop {
            top: f64::NAN,
            ..Crop::default()
        }
        .is_valid()
    );
}
