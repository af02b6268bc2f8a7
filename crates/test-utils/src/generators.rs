//! Generators for synthetic ocean fields.
//!
//! All grids are row-major, `height` rows of `width` values, row 0 at the
//! first latitude.

/// Evenly spaced coordinate axis from `start` to `end` inclusive.
pub fn axis(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Significant wave height in metres, rising from 0 m in the west to
/// `max_height` in the east.
pub fn create_wave_height_grid(width: usize, height: usize, max_height: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            let x = col as f32 / (width.max(2) - 1) as f32;
            data.push(x * max_height);
        }
    }
    data
}

/// Direction field in degrees, constant everywhere.
pub fn create_direction_grid(width: usize, height: usize, degrees: f32) -> Vec<f32> {
    vec![degrees; width * height]
}

/// Eastward current in m/s, varying with latitude from -0.5 to 0.5.
pub fn create_current_u_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        let y = row as f32 / (height.max(2) - 1) as f32;
        for _col in 0..width {
            data.push(y - 0.5);
        }
    }
    data
}

/// Grid with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Copy of `data` with NaN written at the listed flat indices (land cells).
pub fn with_nans(mut data: Vec<f32>, indices: &[usize]) -> Vec<f32> {
    for &i in indices {
        if i < data.len() {
            data[i] = f32::NAN;
        }
    }
    data
}
