// tests/pipeline_tests.rs
//
// End-to-end runs over synthetic GeoTIFF pairs in a temp dir. These
// exercise the real GDAL read/resample/write path, so they need a GDAL
// build with the GTiff driver (always present in stock builds).
use std::path::{Path, PathBuf};

use gdal::raster::Buffer;
use gdal::DriverManager;
use tempfile::TempDir;

use ndvi_delta::error::PipelineError;
use ndvi_delta::processing::index::{difference, normalized_difference, INVALID_INDEX};
use ndvi_delta::processing::{run_custom, run_optimal, BandPair};
use ndvi_delta::raster::source::RasterSource;
use ndvi_delta::raster::window::Window;

/// Write a single-band float32 GeoTIFF with 10 m pixels at the given
/// origin and return its path.
fn write_band(
    dir: &Path,
    name: &str,
    width: usize,
    height: usize,
    data: Vec<f32>,
) -> PathBuf {
    let path = dir.join(name);
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver
        .create_with_band_type::<f32, _>(&path, width, height, 1)
        .unwrap();
    dataset
        .set_geo_transform(&[500_000.0, 10.0, 0.0, 5_000_000.0, 0.0, -10.0])
        .unwrap();
    let mut band = dataset.rasterband(1).unwrap();
    let mut buffer = Buffer::new((width, height), data);
    band.write((0, 0), (width, height), &mut buffer).unwrap();
    dataset.flush_cache().unwrap();
    path
}

/// Deterministic pseudo-band: positive values with some structure, plus
/// a patch of zeros so the invalid sentinel shows up.
fn band_values(width: usize, height: usize, seed: u32) -> Vec<f32> {
    let mut values = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let v = ((col as u32 * 7 + row as u32 * 13 + seed) % 97) as f32 + 1.0;
            values.push(v);
        }
    }
    // zero out a corner in every band so both timesteps share an
    // invalid patch there
    for row in 0..4.min(height) {
        for col in 0..4.min(width) {
            values[row * width + col] = 0.0;
        }
    }
    values
}

fn read_all(path: &Path) -> (usize, usize, Vec<f32>) {
    let source = RasterSource::open(path.to_str().unwrap()).unwrap();
    let meta = source.meta().clone();
    let block = source.read(&Window::full(meta.width, meta.height)).unwrap();
    (meta.width, meta.height, block.data().to_vec())
}

struct Fixture {
    _dir: TempDir,
    dir: PathBuf,
    first: BandPair,
    second: BandPair,
}

fn fixture(width: usize, height: usize, second_width: usize, second_height: usize) -> Fixture {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().to_path_buf();

    let red1 = write_band(&dir, "red1.tif", width, height, band_values(width, height, 3));
    let nir1 = write_band(&dir, "nir1.tif", width, height, band_values(width, height, 17));
    let red2 = write_band(
        &dir,
        "red2.tif",
        second_width,
        second_height,
        band_values(second_width, second_height, 29),
    );
    let nir2 = write_band(
        &dir,
        "nir2.tif",
        second_width,
        second_height,
        band_values(second_width, second_height, 41),
    );

    Fixture {
        _dir: tmp,
        dir,
        first: BandPair::new(red1.to_str().unwrap(), nir1.to_str().unwrap()),
        second: BandPair::new(red2.to_str().unwrap(), nir2.to_str().unwrap()),
    }
}

#[test]
fn worker_count_does_not_change_the_result() {
    let fx = fixture(64, 48, 64, 48);

    let out_serial = fx.dir.join("serial.tif");
    let out_parallel = fx.dir.join("parallel.tif");
    run_optimal(fx.first.clone(), fx.second.clone(), &out_serial, 1).unwrap();
    run_optimal(fx.first.clone(), fx.second.clone(), &out_parallel, 4).unwrap();

    let (w1, h1, serial) = read_all(&out_serial);
    let (w2, h2, parallel) = read_all(&out_parallel);
    assert_eq!((w1, h1), (64, 48));
    assert_eq!((w1, h1), (w2, h2));
    assert_eq!(serial, parallel);
}

#[test]
fn tiling_mode_does_not_change_the_result() {
    let fx = fixture(64, 48, 64, 48);

    let out_optimal = fx.dir.join("optimal.tif");
    let out_custom = fx.dir.join("custom.tif");
    run_optimal(fx.first.clone(), fx.second.clone(), &out_optimal, 2).unwrap();
    // 200 m tiles over 10 m pixels: 20-pixel strides
    run_custom(fx.first.clone(), fx.second.clone(), &out_custom, 200.0, 200.0, 2).unwrap();

    let (w1, h1, optimal) = read_all(&out_optimal);
    let (w2, h2, custom) = read_all(&out_custom);
    assert_eq!((w1, h1), (w2, h2));
    assert_eq!(optimal, custom);
}

#[test]
fn tiled_result_matches_whole_image_computation() {
    let fx = fixture(64, 48, 64, 48);

    let out = fx.dir.join("delta.tif");
    run_optimal(fx.first.clone(), fx.second.clone(), &out, 3).unwrap();
    let (width, height, actual) = read_all(&out);

    // Reference: the same kernels applied to the full rasters at once.
    let red1 = Buffer::new((width, height), band_values(width, height, 3));
    let nir1 = Buffer::new((width, height), band_values(width, height, 17));
    let red2 = Buffer::new((width, height), band_values(width, height, 29));
    let nir2 = Buffer::new((width, height), band_values(width, height, 41));
    let index1 = normalized_difference(&red1, &nir1).unwrap();
    let index2 = normalized_difference(&red2, &nir2).unwrap();
    let expected = difference(&index1, &index2).unwrap();

    for (i, (&got, &want)) in actual.iter().zip(expected.data()).enumerate() {
        if want == 0.0 && index1.data()[i] == INVALID_INDEX {
            // both timesteps invalid here; the pipeline masks to the sentinel
            assert_eq!(got, INVALID_INDEX, "pixel {i}");
        } else {
            assert!((got - want).abs() < 1e-6, "pixel {i}: {got} vs {want}");
        }
    }
}

#[test]
fn known_three_by_three_difference() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().to_path_buf();

    // Timestep 1: the canonical index fixture.
    let red1 = write_band(&dir, "red1.tif", 3, 3, vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    let nir1 = write_band(&dir, "nir1.tif", 3, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.0, 0.0, 0.0]);
    // Timestep 2: red == nir everywhere, so its index is identically 0
    // except the all-zero bottom row.
    let equal = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.0, 0.0, 0.0];
    let red2 = write_band(&dir, "red2.tif", 3, 3, equal.clone());
    let nir2 = write_band(&dir, "nir2.tif", 3, 3, equal);

    let out = dir.join("delta.tif");
    run_optimal(
        BandPair::new(red1.to_str().unwrap(), nir1.to_str().unwrap()),
        BandPair::new(red2.to_str().unwrap(), nir2.to_str().unwrap()),
        &out,
        1,
    )
    .unwrap();

    let (_, _, data) = read_all(&out);
    assert_eq!(data, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, -2.0, -2.0, -2.0]);
}

#[test]
fn trailing_edge_misalignment_uses_the_boundary_fallback() {
    // Timestep 2 is two columns narrower, so every full-width window of
    // the reference grid overruns its trailing edge and must be clamped
    // and resampled back to the reference shape.
    let fx = fixture(64, 48, 62, 48);

    let out_serial = fx.dir.join("serial.tif");
    let out_parallel = fx.dir.join("parallel.tif");
    run_optimal(fx.first.clone(), fx.second.clone(), &out_serial, 1).unwrap();
    run_optimal(fx.first.clone(), fx.second.clone(), &out_parallel, 4).unwrap();

    let (width, height, serial) = read_all(&out_serial);
    let (_, _, parallel) = read_all(&out_parallel);
    // Output stays on the reference grid.
    assert_eq!((width, height), (64, 48));
    assert_eq!(serial, parallel);
    assert!(serial.iter().all(|v| v.is_finite()));
}

#[test]
fn fallback_fails_when_the_window_misses_the_raster_entirely() {
    let tmp = TempDir::new().unwrap();
    let path = write_band(tmp.path(), "band.tif", 10, 10, vec![1.0; 100]);
    let source = RasterSource::open(path.to_str().unwrap()).unwrap();

    // Partial overlap: clamped and resampled to the requested shape.
    let partial = source
        .read_aligned(&Window::new(5, 5, 10, 10), (8, 8))
        .unwrap();
    assert_eq!(partial.shape(), (8, 8));

    // No overlap at all: the fallback itself fails.
    let err = source
        .read_aligned(&Window::new(20, 20, 5, 5), (8, 8))
        .unwrap_err();
    assert!(matches!(err, PipelineError::BoundaryRead(_)));
}
