//! Reading synthetic forecast files written through the netcdf crate.

use netcdf_parser::{ForecastDataset, NetCdfError};
use ofs_common::{parse_model_cycle, BoundingBox};
use test_utils::{assert_approx_eq, create_constant_grid, with_nans, ForecastFixture};

fn base() -> chrono::DateTime<chrono::Utc> {
    parse_model_cycle("2024102000").unwrap()
}

#[test]
fn test_open_reads_coordinates_and_times() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wave.nc");
    ForecastFixture::wave(base(), vec![0.0, 3.0, 6.0])
        .write(&path)
        .unwrap();

    let ds = ForecastDataset::open(&path).unwrap();
    assert_eq!(ds.lon().len(), 56);
    assert_eq!(ds.lat().len(), 31);
    assert_eq!(ds.times().len(), 3);
    assert_eq!(ds.times()[0], base());
    assert_eq!(ds.times()[2].format("%Y%m%d%H").to_string(), "2024102006");
    assert!(ds.depths().is_empty());
    assert!(ds.has_variable("hs"));
    assert!(!ds.has_variable("gust"));
}

#[test]
fn test_read_field_slice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wave.nc");
    let fixture = ForecastFixture::wave(base(), vec![0.0]);
    fixture.write(&path).unwrap();

    let ds = ForecastDataset::open(&path).unwrap();
    let hs = ds.read_field("hs", 0, None).unwrap();
    assert_eq!(hs.width(), 56);
    assert_eq!(hs.height(), 31);
    // West edge is calm, east edge peaks at 4 m
    assert_approx_eq!(hs.get(0, 0), 0.0, 1e-6);
    assert_approx_eq!(hs.get(0, 55), 4.0, 1e-5);
}

#[test]
fn test_read_window_matches_cropped_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wave.nc");
    ForecastFixture::wave(base(), vec![0.0, 3.0])
        .write(&path)
        .unwrap();

    let ds = ForecastDataset::open(&path).unwrap();
    let bbox = BoundingBox::new(114.5, -9.0, 116.0, -8.0);
    let window = ds.read_window("hs", 1, None, &bbox).unwrap();
    assert_eq!(window.lon, vec![115.0, 116.0]);
    assert_eq!(window.lat, vec![-9.0, -8.0]);
    assert_eq!(window, ds.read_field("hs", 1, None).unwrap().subset(&bbox).unwrap());

    // Repeated reads go through the same handle
    assert_eq!(window, ds.read_window("hs", 1, None, &bbox).unwrap());

    let outside = BoundingBox::new(150.0, 20.0, 160.0, 30.0);
    assert!(matches!(
        ds.read_window("hs", 0, None, &outside),
        Err(NetCdfError::MissingData(_))
    ));
}

#[test]
fn test_fill_value_becomes_nan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filled.nc");
    let fixture = ForecastFixture::indonesia(base(), vec![0.0]);
    let (w, h) = (fixture.width(), fixture.height());
    let slice = create_constant_grid(w, h, 1.5);
    let mut with_fill = slice.clone();
    with_fill[3] = -999.0;
    fixture
        .with_filled_variable("hs", with_fill, -999.0)
        .with_variable("land", with_nans(slice, &[7]))
        .write(&path)
        .unwrap();

    let ds = ForecastDataset::open(&path).unwrap();
    let hs = ds.read_field("hs", 0, None).unwrap();
    assert!(hs.data[3].is_nan());
    assert_eq!(hs.data[4], 1.5);

    let land = ds.read_field("land", 0, None).unwrap();
    assert!(land.data[7].is_nan());
}

#[test]
fn test_read_field_at_depth() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flow.nc");
    ForecastFixture::flow(base(), vec![0.0, 1.0], vec![0.0, 10.0, 25.0])
        .write(&path)
        .unwrap();

    let ds = ForecastDataset::open(&path).unwrap();
    assert_eq!(ds.depths(), &[0.0, 10.0, 25.0]);
    assert_eq!(ds.depth_index(25.0).unwrap(), 2);

    let salt = ds.read_field("S", 1, Some(10.0)).unwrap();
    assert_approx_eq!(salt.get(5, 5), 33.7, 1e-4);
}

#[test]
fn test_missing_depth_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flow.nc");
    ForecastFixture::flow(base(), vec![0.0], vec![0.0, 10.0])
        .write(&path)
        .unwrap();

    let ds = ForecastDataset::open(&path).unwrap();
    let err = ds.read_field("S", 0, Some(250.0)).unwrap_err();
    assert!(matches!(err, NetCdfError::MissingData(_)));
}

#[test]
fn test_missing_variable_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wave.nc");
    ForecastFixture::wave(base(), vec![0.0]).write(&path).unwrap();

    let ds = ForecastDataset::open(&path).unwrap();
    let err = ds.read_field("wpp", 0, None).unwrap_err();
    assert!(matches!(err, NetCdfError::MissingData(_)));
    assert!(ds.read_field("hs", 5, None).is_err());
}

#[test]
fn test_open_missing_file() {
    let err = ForecastDataset::open("/nonexistent/w3g_hires_20241020_0000.nc").unwrap_err();
    assert!(matches!(err, NetCdfError::IoError(_)));
}
