//! End-to-end map composition without a font.

use catalog::{ResolvedRegion, VariableCatalog};
use netcdf_parser::Grid2D;
use ofs_common::{parse_model_cycle, BoundingBox, ForecastStep};
use renderer::arrows::direction_to_uv;
use renderer::{render_map, write_png, Color, ColorMode, Fonts, Layout, MapSpec};
use test_utils::{axis, create_constant_grid, create_wave_height_grid};

fn region() -> ResolvedRegion {
    ResolvedRegion {
        name: "bali".to_string(),
        title: "Bali".to_string(),
        bbox: BoundingBox::new(114.0, -10.0, 117.0, -7.0),
        outlines: vec![vec![(114.5, -9.0), (116.0, -9.0), (116.0, -8.0), (114.5, -9.0)]],
        arrow_scale: 16.0,
        arrow_density: 2,
        label_spacing: 1.0,
    }
}

fn grid(data: Vec<f32>) -> Grid2D {
    Grid2D::new(axis(114.0, 117.0, 13), axis(-10.0, -7.0, 13), data).unwrap()
}

fn step() -> ForecastStep {
    let base = parse_model_cycle("2024102000").unwrap();
    ForecastStep::new(base, base + chrono::Duration::hours(3))
}

fn pixel(img: &image::RgbaImage, x: f32, y: f32) -> [u8; 4] {
    img.get_pixel(x as u32, y as u32).0
}

#[test]
fn test_direction_map_dimensions_and_fill() {
    let catalog = VariableCatalog::builtin().unwrap();
    let swh = catalog.get("swh").unwrap();
    let scale = catalog.scale(&swh.scale).unwrap();
    let region = region();

    let hs = grid(create_constant_grid(13, 13, 1.3));
    let (u1, v1) = direction_to_uv(45.0, 2.0);
    let u = grid(create_constant_grid(13, 13, u1));
    let v = grid(create_constant_grid(13, 13, v1));

    let spec = MapSpec::new(&region, swh, scale, &hs, step()).with_arrows(&u, &v);
    let img = render_map(&spec, &Fonts::none()).unwrap();

    let layout = Layout::compute(&region.bbox, swh.kind);
    assert_eq!(img.dimensions(), (layout.width, layout.height));
    assert_eq!(layout.map.width, 1000);
    assert_eq!(layout.map.height, 1000);

    // A spot between arrows, graticule and outline carries the interval color
    let (x, y) = layout.map.to_pixel(114.13, -9.6);
    let expected = catalog::hex_to_rgb("#01D743").unwrap();
    assert_eq!(pixel(&img, x, y), [expected.0, expected.1, expected.2, 255]);

    // Margins stay white
    assert_eq!(pixel(&img, 2.0, 2.0), [255, 255, 255, 255]);
}

#[test]
fn test_land_cells_are_gray() {
    let catalog = VariableCatalog::builtin().unwrap();
    let s = catalog.get("s").unwrap();
    let scale = catalog.scale(&s.scale).unwrap();
    let region = region();

    let salt = grid(vec![f32::NAN; 13 * 13]);
    let spec = MapSpec::new(&region, s, scale, &salt, step());
    let img = render_map(&spec, &Fonts::none()).unwrap();

    let layout = Layout::compute(&region.bbox, s.kind);
    let (x, y) = layout.map.to_pixel(114.13, -9.6);
    assert_eq!(pixel(&img, x, y), Color::LAND.to_rgba());
}

#[test]
fn test_warning_map_is_wider_and_uses_listed_colors() {
    let catalog = VariableCatalog::builtin().unwrap();
    let ww = catalog.get("ww").unwrap();
    let scale = catalog.scale(&ww.scale).unwrap();
    let region = region();

    let hs = grid(create_wave_height_grid(13, 13, 8.0));
    let spec = MapSpec::new(&region, ww, scale, &hs, step());
    assert_eq!(
        spec.header_text(),
        format!(
            "{}\n20 October 2024 07.00 WIB - 21 October 2024 07.00 WIB",
            ww.figtitle.to_uppercase()
        )
    );
    assert_eq!(spec.info_text(), "Bali\nSource: INAWAVES");

    let img = render_map(&spec, &Fonts::none()).unwrap();
    let layout = Layout::compute(&region.bbox, ww.kind);
    assert_eq!(img.dimensions(), (layout.width, layout.height));
    assert!(layout.width > layout.map.width + 150);
}

#[test]
fn test_annotation_text() {
    let catalog = VariableCatalog::builtin().unwrap();
    let swh = catalog.get("swh").unwrap();
    let scale = catalog.scale(&swh.scale).unwrap();
    let region = region();
    let hs = grid(create_constant_grid(13, 13, 1.0));

    let mut spec = MapSpec::new(&region, swh, scale, &hs, step());
    spec.created_year = 2024;
    assert_eq!(
        spec.header_text(),
        "BADAN METEOROLOGI KLIMATOLOGI DAN GEOFISIKA\nSignificant Wave Height and Direction\nBali"
    );
    assert_eq!(
        spec.info_text(),
        "Initial: 00UTC 2024-10-20\nForecast: 03UTC 2024-10-20 (t+3)"
    );
    assert_eq!(
        spec.footer_text(),
        "Source: BMKG Ocean Forecast System (BMKG-OFS)\nCreated by Center for Marine Meteorology. ©2024"
    );
}

#[test]
fn test_write_png_roundtrips_through_decoder() {
    let catalog = VariableCatalog::builtin().unwrap();
    let ws = catalog.get("ws").unwrap();
    let scale = catalog.scale(&ws.scale).unwrap();
    let region = region();
    let speed = grid(create_constant_grid(13, 13, 12.0));
    let spec = MapSpec::new(&region, ws, scale, &speed, step());
    let img = render_map(&spec, &Fonts::none()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bali").join("ws_2024102003.png");
    let bytes = write_png(&path, &img).unwrap();
    assert!(bytes > 0);

    let decoded = image::open(&path).unwrap();
    assert_eq!(
        (decoded.width(), decoded.height()),
        img.dimensions()
    );
}

#[test]
fn test_mismatched_arrow_grids_fail() {
    let catalog = VariableCatalog::builtin().unwrap();
    let ws = catalog.get("ws").unwrap();
    let scale = catalog.scale(&ws.scale).unwrap();
    let region = region();
    let speed = grid(create_constant_grid(13, 13, 12.0));
    let small = Grid2D::new(vec![115.0], vec![-8.0], vec![1.0]).unwrap();

    let spec = MapSpec::new(&region, ws, scale, &speed, step()).with_arrows(&speed, &small);
    assert!(render_map(&spec, &Fonts::none()).is_err());
}

#[test]
fn test_maps_with_arrows_extend_max_only() {
    let catalog = VariableCatalog::builtin().unwrap();
    let swh = catalog.get("swh").unwrap();
    let scale = catalog.scale(&swh.scale).unwrap();
    let region = region();
    let layout = Layout::compute(&region.bbox, swh.kind);
    let (x, y) = layout.map.to_pixel(114.13, -9.6);

    let (u1, v1) = direction_to_uv(45.0, 2.0);
    let u = grid(create_constant_grid(13, 13, u1));
    let v = grid(create_constant_grid(13, 13, v1));

    // Below the bottom level: not painted, the panel shows through
    let below = grid(create_constant_grid(13, 13, -1.0));
    let spec = MapSpec::new(&region, swh, scale, &below, step()).with_arrows(&u, &v);
    assert_eq!(spec.color_mode(), ColorMode::Discrete);
    let img = render_map(&spec, &Fonts::none()).unwrap();
    assert_eq!(pixel(&img, x, y), [255, 255, 255, 255]);

    // Above the top level: the spare palette entry
    let above = grid(create_constant_grid(13, 13, 9.0));
    let spec = MapSpec::new(&region, swh, scale, &above, step()).with_arrows(&u, &v);
    let img = render_map(&spec, &Fonts::none()).unwrap();
    let spare = catalog::hex_to_rgb("#691D77").unwrap();
    assert_eq!(pixel(&img, x, y), [spare.0, spare.1, spare.2, 255]);
}

#[test]
fn test_maps_without_arrows_extend_both_ways() {
    let catalog = VariableCatalog::builtin().unwrap();
    let indigo = catalog::hex_to_rgb(catalog::DEFAULT_OVER_COLOR).unwrap();
    let indigo = [indigo.0, indigo.1, indigo.2, 255];
    let region = region();

    // A direction variable whose direction field is missing
    let psp = catalog.get("psp").unwrap();
    let scale = catalog.scale(&psp.scale).unwrap();
    let layout = Layout::compute(&region.bbox, psp.kind);
    let (x, y) = layout.map.to_pixel(114.13, -9.6);

    for value in [-1.0, 30.0] {
        let field = grid(create_constant_grid(13, 13, value));
        let spec = MapSpec::new(&region, psp, scale, &field, step());
        assert_eq!(spec.color_mode(), ColorMode::Continuous);
        let img = render_map(&spec, &Fonts::none()).unwrap();
        assert_eq!(pixel(&img, x, y), indigo, "value {}", value);
    }
}
