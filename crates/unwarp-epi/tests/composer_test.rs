use nalgebra::{DMatrix, Rotation3};
use proptest::prelude::*;
use unwarp_core::spatial::direction::is_orthonormal;
use unwarp_core::spatial::{Point3, Spacing3};
use unwarp_core::ImageMetadata;
use unwarp_epi::{MotionTable, TransformComposer};

fn metadata(origin: [f64; 3], spacing: [f64; 3], angles: [f64; 3]) -> ImageMetadata {
    let direction = Rotation3::from_euler_angles(angles[0], angles[1], angles[2]).into_inner();
    ImageMetadata::new(
        Point3::new(origin[0], origin[1], origin[2]),
        Spacing3::new(spacing[0], spacing[1], spacing[2]),
        direction,
    )
}

fn geometry() -> impl Strategy<Value = ImageMetadata> {
    (
        prop::array::uniform3(-50.0..50.0f64),
        prop::array::uniform3(0.5..4.0f64),
        prop::array::uniform3(-0.5..0.5f64),
    )
        .prop_map(|(o, s, a)| metadata(o, s, a))
}

proptest! {
    #[test]
    fn zero_motion_slices_equal_static_transform(
        data in geometry(),
        field in geometry(),
        volumes in 1usize..4,
        z in 0usize..40,
    ) {
        let composer = TransformComposer::new(&data, &field, MotionTable::zeros(volumes), None).unwrap();
        for v in 0..volumes {
            let slice = composer.slice_transform(v, z).unwrap();
            prop_assert!(slice.total().approx_eq(composer.static_transform(), 1e-9));
        }
    }

    #[test]
    fn aligned_volume_with_uniform_motion_reduces_to_unaligned_static(
        data in geometry(),
        field in geometry(),
        rotation in prop::array::uniform3(-0.2..0.2f64),
        translation in prop::array::uniform3(-5.0..5.0f64),
        groups in 1usize..4,
    ) {
        let row: Vec<f64> = rotation.iter().chain(translation.iter()).copied().collect();
        let mut rows = DMatrix::zeros(2 * groups, 6);
        for g in 0..groups {
            // Volume 0 is still, volume 1 repeats one motion in every group.
            for c in 0..6 {
                rows[(groups + g, c)] = row[c];
            }
        }
        let motion = MotionTable::new(&rows, 2).unwrap();
        let composer = TransformComposer::new(&data, &field, motion, Some(1)).unwrap();
        let unaligned = field.scanner_to_voxel().unwrap() * data.voxel_to_scanner();

        for z in 0..6 {
            let slice = composer.slice_transform(1, z).unwrap();
            prop_assert!(slice.total().approx_eq(&unaligned, 1e-8));
        }
    }

    #[test]
    fn rotation_transpose_is_orthonormal(
        data in geometry(),
        field in geometry(),
        rotation in prop::array::uniform3(-0.5..0.5f64),
    ) {
        let row = DMatrix::from_row_slice(1, 6, &[rotation[0], rotation[1], rotation[2], 0.0, 0.0, 0.0]);
        let composer = TransformComposer::new(&data, &field, MotionTable::new(&row, 1).unwrap(), None).unwrap();
        let rt = *composer.slice_transform(0, 0).unwrap().rotation_transpose();
        prop_assert!(is_orthonormal(&rt, 1e-9));
        prop_assert!((rt.determinant() - 1.0).abs() < 1e-9);
    }
}
