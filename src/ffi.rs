//! FFI bindings for Synheart Cortisol
//!
//! This module provides C-compatible functions for hosting the monitor from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `cortisol_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde::Serialize;

use crate::config::SensorConfig;
use crate::monitor::CortisolMonitor;
use crate::recommendation::RecommendationEngine;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn to_json_cstr<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode FFI response");
            set_last_error(crate::error::GENERIC_FAILURE_MESSAGE);
            ptr::null_mut()
        }
    }
}

/// Opaque handle to a monitor
pub struct CortisolMonitorHandle {
    monitor: CortisolMonitor,
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Create a monitor with default calibration and random noise.
///
/// # Safety
/// - Returns a pointer that must be freed with `cortisol_monitor_free`.
#[no_mangle]
pub unsafe extern "C" fn cortisol_monitor_new() -> *mut CortisolMonitorHandle {
    let handle = Box::new(CortisolMonitorHandle {
        monitor: CortisolMonitor::new(),
    });
    Box::into_raw(handle)
}

/// Create a monitor from a JSON config.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string.
/// - Returns a pointer that must be freed with `cortisol_monitor_free`.
/// - Returns NULL on error; call `cortisol_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn cortisol_monitor_from_config(
    config_json: *const c_char,
) -> *mut CortisolMonitorHandle {
    clear_last_error();

    let json_str = match cstr_to_string(config_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        }
    };

    let monitor = match SensorConfig::from_json(&json_str)
        .and_then(|config| CortisolMonitor::from_config(&config))
    {
        Ok(monitor) => monitor,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    Box::into_raw(Box::new(CortisolMonitorHandle { monitor }))
}

/// Free a monitor.
///
/// # Safety
/// - `monitor` must be a valid pointer returned by a `cortisol_monitor_*`
///   constructor, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn cortisol_monitor_free(monitor: *mut CortisolMonitorHandle) {
    if !monitor.is_null() {
        drop(Box::from_raw(monitor));
    }
}

// ============================================================================
// Monitor API
// ============================================================================

/// Get the current reading as JSON.
///
/// # Safety
/// - `monitor` must be a valid pointer returned by a `cortisol_monitor_*` constructor.
/// - Returns a newly allocated string that must be freed with `cortisol_free_string`.
/// - Returns NULL on error; call `cortisol_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn cortisol_monitor_reading(
    monitor: *const CortisolMonitorHandle,
) -> *mut c_char {
    clear_last_error();

    if monitor.is_null() {
        set_last_error("Null monitor pointer");
        return ptr::null_mut();
    }

    let handle = &*monitor;
    to_json_cstr(&handle.monitor.current_reading())
}

/// Submit an override payload (`{"cortisol": <number>}`) and get the outcome
/// with recommendations as JSON.
///
/// # Safety
/// - `monitor` must be a valid pointer returned by a `cortisol_monitor_*` constructor.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `cortisol_free_string`.
/// - Returns NULL on error; call `cortisol_last_error` to get the error message.
///   Validation failures report their reason, anything else a generic message.
#[no_mangle]
pub unsafe extern "C" fn cortisol_monitor_submit_override(
    monitor: *const CortisolMonitorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if monitor.is_null() {
        set_last_error("Null monitor pointer");
        return ptr::null_mut();
    }

    let handle = &*monitor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match handle.monitor.submit_override_to_json(&json_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.public_message());
            ptr::null_mut()
        }
    }
}

/// Return the monitor to automatic readings.
///
/// # Safety
/// - `monitor` must be a valid pointer returned by a `cortisol_monitor_*` constructor.
/// - Returns a newly allocated string that must be freed with `cortisol_free_string`.
/// - Returns NULL on error; call `cortisol_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn cortisol_monitor_reset(
    monitor: *const CortisolMonitorHandle,
) -> *mut c_char {
    clear_last_error();

    if monitor.is_null() {
        set_last_error("Null monitor pointer");
        return ptr::null_mut();
    }

    let handle = &*monitor;
    to_json_cstr(&handle.monitor.reset_to_automatic())
}

/// Current mode: 0 = automatic, 1 = manual, -1 on error.
///
/// # Safety
/// - `monitor` must be a valid pointer returned by a `cortisol_monitor_*` constructor.
#[no_mangle]
pub unsafe extern "C" fn cortisol_monitor_mode(monitor: *const CortisolMonitorHandle) -> i32 {
    clear_last_error();

    if monitor.is_null() {
        set_last_error("Null monitor pointer");
        return -1;
    }

    match (*monitor).monitor.mode() {
        crate::state::ReadingMode::Automatic => 0,
        crate::state::ReadingMode::Manual => 1,
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Get the guidance record for a cortisol level as JSON.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `cortisol_free_string`.
/// - Returns NULL for a NaN, infinite or negative level; call `cortisol_last_error`
///   to get the error message.
#[no_mangle]
pub unsafe extern "C" fn cortisol_recommendation(level: f64) -> *mut c_char {
    clear_last_error();

    if !RecommendationEngine::is_valid_level(level) {
        set_last_error(&format!("Invalid cortisol level: {}", level));
        return ptr::null_mut();
    }

    to_json_cstr(&RecommendationEngine::recommend(level))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Cortisol functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Cortisol function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn cortisol_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Cortisol function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn cortisol_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn cortisol_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
