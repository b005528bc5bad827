//! FFI bindings for Fastwise
//!
//! This module provides C-compatible functions for driving the tracker from a host
//! app. All functions use C strings (null-terminated) and return allocated memory
//! that must be freed by the caller using `fastwise_free_string`.
//!
//! The controller behind a handle keeps its state in memory. Hosts persist it by
//! reading `fastwise_controller_state` and restoring it with
//! `fastwise_controller_load_state`, and deliver notifications by draining
//! `fastwise_controller_drain_notifications`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde::Serialize;

use crate::clock::SystemClock;
use crate::config::TrackerConfig;
use crate::controller::{Collaborators, Command, FastingController};
use crate::error::FastingError;
use crate::notify::MemoryNotifier;
use crate::recipes::{all_ingredients, recipes_for_day};
use crate::stages::stage_for_elapsed_hours;
use crate::state::TrackerState;
use crate::store::{MemoryCache, MemoryStore};

/// User id for controllers created through FFI
const FFI_USER_ID: &str = "local";

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
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

/// Serialize a result to a C string, recording the error on failure
fn json_result<T: Serialize>(result: Result<T, FastingError>) -> *mut c_char {
    match result.and_then(|value| Ok(serde_json::to_string(&value)?)) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&format!("{}: {e}", e.code()));
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Controller API
// ============================================================================

/// Opaque handle to a FastingController
pub struct FastingControllerHandle {
    controller: FastingController,
    notifier: MemoryNotifier,
}

unsafe fn handle_mut<'a>(
    controller: *mut FastingControllerHandle,
) -> Option<&'a mut FastingControllerHandle> {
    if controller.is_null() {
        set_last_error("Null controller pointer");
        return None;
    }
    Some(&mut *controller)
}

/// Create a controller from a JSON configuration (NULL for defaults).
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Returns a pointer that must be freed with `fastwise_controller_free`.
/// - Returns NULL on error; call `fastwise_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fastwise_controller_new(
    config_json: *const c_char,
) -> *mut FastingControllerHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        TrackerConfig::default()
    } else {
        let json = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match TrackerConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let notifier = MemoryNotifier::new();
    let collaborators = Collaborators {
        store: Box::new(MemoryStore::new()),
        cache: Box::new(MemoryCache::new()),
        notifier: Box::new(notifier.clone()),
        clock: Box::new(SystemClock),
    };

    match FastingController::bootstrap(config, FFI_USER_ID, collaborators) {
        Ok(controller) => Box::into_raw(Box::new(FastingControllerHandle {
            controller,
            notifier,
        })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a controller.
///
/// # Safety
/// - `controller` must be a valid pointer returned by `fastwise_controller_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn fastwise_controller_free(controller: *mut FastingControllerHandle) {
    if !controller.is_null() {
        drop(Box::from_raw(controller));
    }
}

/// Replace the controller state with a previously saved JSON snapshot.
///
/// # Safety
/// - `controller` must be a valid pointer returned by `fastwise_controller_new`.
/// - `state_json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error (see `fastwise_last_error`).
#[no_mangle]
pub unsafe extern "C" fn fastwise_controller_load_state(
    controller: *mut FastingControllerHandle,
    state_json: *const c_char,
) -> i32 {
    clear_last_error();

    let Some(handle) = handle_mut(controller) else {
        return -1;
    };
    let json = match cstr_to_string(state_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid state string pointer");
            return -1;
        }
    };

    match TrackerState::from_json(&json) {
        Ok(state) => {
            handle.controller.load_state(state);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Dispatch a JSON command such as `{"type":"start_fast","payload":{}}` and
/// return the outcome as JSON.
///
/// # Safety
/// - `controller` must be a valid pointer returned by `fastwise_controller_new`.
/// - `command_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `fastwise_free_string`.
/// - Returns NULL on error; call `fastwise_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fastwise_controller_dispatch(
    controller: *mut FastingControllerHandle,
    command_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(handle) = handle_mut(controller) else {
        return ptr::null_mut();
    };
    let json = match cstr_to_string(command_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid command string pointer");
            return ptr::null_mut();
        }
    };

    json_result(Command::from_json(&json).and_then(|command| handle.controller.dispatch(command)))
}

/// Timer tick: elapsed/remaining time, progress and stages as JSON. Ends the fast
/// when its end time has been reached.
///
/// # Safety
/// - `controller` must be a valid pointer returned by `fastwise_controller_new`.
/// - Returns a newly allocated string that must be freed with `fastwise_free_string`.
/// - Returns NULL when no fast is active or on error.
#[no_mangle]
pub unsafe extern "C" fn fastwise_controller_tick(
    controller: *mut FastingControllerHandle,
) -> *mut c_char {
    clear_last_error();
    match handle_mut(controller) {
        Some(handle) => json_result(handle.controller.tick()),
        None => ptr::null_mut(),
    }
}

/// Full tracker state as JSON.
///
/// # Safety
/// - `controller` must be a valid pointer returned by `fastwise_controller_new`.
/// - Returns a newly allocated string that must be freed with `fastwise_free_string`.
#[no_mangle]
pub unsafe extern "C" fn fastwise_controller_state(
    controller: *mut FastingControllerHandle,
) -> *mut c_char {
    clear_last_error();
    match handle_mut(controller) {
        Some(handle) => json_result(Ok(handle.controller.state())),
        None => ptr::null_mut(),
    }
}

/// Analytics series as JSON.
///
/// # Safety
/// - `controller` must be a valid pointer returned by `fastwise_controller_new`.
/// - Returns a newly allocated string that must be freed with `fastwise_free_string`.
#[no_mangle]
pub unsafe extern "C" fn fastwise_controller_analytics(
    controller: *mut FastingControllerHandle,
) -> *mut c_char {
    clear_last_error();
    match handle_mut(controller) {
        Some(handle) => json_result(Ok(handle.controller.analytics())),
        None => ptr::null_mut(),
    }
}

/// Insights as a JSON array.
///
/// # Safety
/// - `controller` must be a valid pointer returned by `fastwise_controller_new`.
/// - Returns a newly allocated string that must be freed with `fastwise_free_string`.
#[no_mangle]
pub unsafe extern "C" fn fastwise_controller_insights(
    controller: *mut FastingControllerHandle,
) -> *mut c_char {
    clear_last_error();
    match handle_mut(controller) {
        Some(handle) => json_result(Ok(handle.controller.insights())),
        None => ptr::null_mut(),
    }
}

/// Recommendations as a JSON array, highest priority first.
///
/// # Safety
/// - `controller` must be a valid pointer returned by `fastwise_controller_new`.
/// - Returns a newly allocated string that must be freed with `fastwise_free_string`.
#[no_mangle]
pub unsafe extern "C" fn fastwise_controller_recommendations(
    controller: *mut FastingControllerHandle,
) -> *mut c_char {
    clear_last_error();
    match handle_mut(controller) {
        Some(handle) => json_result(Ok(handle.controller.recommendations())),
        None => ptr::null_mut(),
    }
}

/// Daily calorie target in kcal.
///
/// # Safety
/// - `controller` must be a valid pointer returned by `fastwise_controller_new`.
/// - Returns -1 on a NULL controller.
#[no_mangle]
pub unsafe extern "C" fn fastwise_controller_calorie_target(
    controller: *mut FastingControllerHandle,
) -> i64 {
    clear_last_error();
    match handle_mut(controller) {
        Some(handle) => i64::from(handle.controller.calorie_target()),
        None => -1,
    }
}

/// Take the notification events recorded since the last call, as a JSON array.
///
/// # Safety
/// - `controller` must be a valid pointer returned by `fastwise_controller_new`.
/// - Returns a newly allocated string that must be freed with `fastwise_free_string`.
#[no_mangle]
pub unsafe extern "C" fn fastwise_controller_drain_notifications(
    controller: *mut FastingControllerHandle,
) -> *mut c_char {
    clear_last_error();
    match handle_mut(controller) {
        Some(handle) => json_result(Ok(handle.notifier.drain_events())),
        None => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Stage for a number of elapsed fasting hours, as JSON.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `fastwise_free_string`.
#[no_mangle]
pub unsafe extern "C" fn fastwise_stage_for_hours(hours: f64) -> *mut c_char {
    clear_last_error();
    json_result(Ok(stage_for_elapsed_hours(hours)))
}

/// Meal plan for program day `day`, as JSON.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `fastwise_free_string`.
#[no_mangle]
pub unsafe extern "C" fn fastwise_recipes_for_day(day: u32) -> *mut c_char {
    clear_last_error();
    json_result(Ok(recipes_for_day(day)))
}

/// Every catalog ingredient, deduplicated by id, as a JSON array.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `fastwise_free_string`.
#[no_mangle]
pub unsafe extern "C" fn fastwise_all_ingredients() -> *mut c_char {
    clear_last_error();
    json_result(Ok(all_ingredients()))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Fastwise functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Fastwise function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn fastwise_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Fastwise function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn fastwise_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn fastwise_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
