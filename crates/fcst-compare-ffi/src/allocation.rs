//! Memory allocation utilities for FFI functions.
//!
//! Arrays handed to C are allocated with `malloc` so callers may release
//! them with the matching `fcst_free_*` function.

use core::ffi::c_double;
use libc::{free, malloc};
use std::ptr;

/// Copy a Rust slice to a newly allocated C array.
///
/// # Safety
/// Returns null on allocation failure or if slice is empty.
pub unsafe fn slice_to_c_array<T: Copy>(slice: &[T]) -> *mut T {
    if slice.is_empty() {
        return ptr::null_mut();
    }

    let ptr = malloc(std::mem::size_of_val(slice)) as *mut T;
    if !ptr.is_null() {
        ptr::copy_nonoverlapping(slice.as_ptr(), ptr, slice.len());
    }
    ptr
}

/// Copy `values` to a newly allocated C double array.
///
/// Returns `None` only when a non-empty copy could not be allocated; an
/// empty slice yields a null pointer.
///
/// # Safety
/// The returned pointer must be released with [`free_double_array`].
pub unsafe fn copy_to_c_doubles(values: &[f64]) -> Option<*mut c_double> {
    let ptr = slice_to_c_array(values);
    if ptr.is_null() && !values.is_empty() {
        None
    } else {
        Some(ptr)
    }
}

/// Free an array from [`copy_to_c_doubles`] and null out the pointer.
///
/// # Safety
/// `*array` must be null or a pointer returned by this module.
pub unsafe fn free_double_array(array: &mut *mut c_double) {
    if !array.is_null() {
        free(*array as *mut libc::c_void);
        *array = ptr::null_mut();
    }
}
