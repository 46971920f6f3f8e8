use burn::tensor::{Tensor, TensorData};
use burn_ndarray::NdArray;
use nalgebra::{Rotation3, Vector3};
use std::f64::consts::PI;
use unwarp_core::image::Image;
use unwarp_core::spatial::{Direction3, Point3, Spacing3};

type Backend = NdArray<f32>;

#[test]
fn test_rotated_image_transform() {
    let device = Default::default();
    let data = Tensor::<Backend, 3>::zeros([10, 10, 10], &device);

    // Rotate 90 degrees around Z: voxel x points along scanner +y
    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
    let image = Image::new(data, Point3::origin(), Spacing3::repeat(1.0), rotation.into_inner());

    // Scanner (1, 0, 0) lies along voxel -y
    let index = image
        .transform_physical_point_to_continuous_index(&Point3::new(1.0, 0.0, 0.0))
        .unwrap();

    assert!((index[0] - 0.0).abs() < 1e-12, "Expected index[0] to be 0.0, got {}", index[0]);
    assert!((index[1] + 1.0).abs() < 1e-12, "Expected index[1] to be -1.0, got {}", index[1]);
    assert!((index[2] - 0.0).abs() < 1e-12, "Expected index[2] to be 0.0, got {}", index[2]);
}

#[test]
fn test_voxel_values_survive_host_roundtrip() {
    let device = Default::default();
    let values: Vec<f32> = (0..4 * 3 * 2).map(|v| v as f32 * 0.5).collect();
    let data = Tensor::<Backend, 3>::from_data(TensorData::new(values.clone(), [2, 3, 4]), &device);
    let image = Image::new(data, Point3::origin(), Spacing3::repeat(1.0), Direction3::identity());

    let grid = image.to_voxel_grid().unwrap();
    assert_eq!(grid.dims(), [4, 3, 2]);
    assert_eq!(grid.as_slice(), values.as_slice());

    let rebuilt = Image::<Backend, 3>::from_voxel_grid(&grid, *image.metadata(), &device).unwrap();
    assert_eq!(rebuilt.shape(), [2, 3, 4]);
    assert_eq!(rebuilt.to_voxel_grid().unwrap(), grid);
}
