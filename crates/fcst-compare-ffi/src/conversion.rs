//! Conversion of C arguments into core types.

use core::ffi::{c_char, c_double, c_int};
use fcst_compare_core::{ArimaOrder, ForecastError, Result, Series};
use libc::size_t;

/// Build a series from raw pointers, interpolating NULL entries.
///
/// The validity bitmask follows the Arrow/DuckDB convention: bit `i` of
/// `validity[i / 64]` is set when element `i` is valid. A null `validity`
/// means every element is valid.
///
/// # Safety
/// `data` must point to `length` doubles and `validity`, if non-null, to
/// `length.div_ceil(64)` words.
pub unsafe fn build_series(
    data: *const c_double,
    validity: *const u64,
    length: size_t,
) -> Result<Series> {
    let data_slice = std::slice::from_raw_parts(data, length);

    if validity.is_null() {
        return Series::new(data_slice.to_vec());
    }

    let validity_slice = std::slice::from_raw_parts(validity, length.div_ceil(64));
    let values: Vec<Option<f64>> = data_slice
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let is_valid = (validity_slice[i / 64] >> (i % 64)) & 1 == 1;
            is_valid.then_some(v)
        })
        .collect();
    Series::from_optional(&values)
}

/// Convert a signed count argument, rejecting negatives.
pub fn to_usize(name: &str, value: c_int) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| ForecastError::invalid_parameter(name, value, "must be non-negative"))
}

/// Convert a signed ARIMA order.
pub fn to_arima_order(p: c_int, d: c_int, q: c_int) -> Result<ArimaOrder> {
    ArimaOrder::try_from((i64::from(p), i64::from(d), i64::from(q)))
}

/// Copy a string to a fixed-size char buffer, truncating if needed.
pub fn copy_string_to_buffer(s: &str, buffer: &mut [c_char]) {
    if buffer.is_empty() {
        return;
    }
    let bytes = s.as_bytes();
    let len = bytes.len().min(buffer.len() - 1);
    for (i, &b) in bytes[..len].iter().enumerate() {
        buffer[i] = b as c_char;
    }
    buffer[len] = 0;
}
