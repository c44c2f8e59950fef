//! C ABI consumed by managed hosts.
//!
//! Exported symbols: `NewCore`, `StartCore`, `StopCore`, `FreeCore`.
//!
//! Hosts commonly copy the `CoreRepr` returned by `NewCore` and pass a pointer
//! to their copy back in. Every function therefore resolves the Core through
//! the `window` pointer the struct carries rather than through the struct's own
//! address. `FreeCore` nulls that pointer, which turns later calls on the same
//! struct into logged no-ops. The structs themselves are never freed, so a
//! stale copy can never alias a newer Core.
//!
//! No panic crosses the boundary; failures are logged and reported as a null
//! handle where a value is returned.
#![allow(non_snake_case, unsafe_code)]

mod registry;
mod repr;

use std::ffi::{c_char, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use std::sync::{Arc, TryLockError};

use anyhow::Result;
use log::{debug, error, info, warn};

use crate::core::{Core, CoreConfig};
use crate::error::EngineError;
use crate::logging::{init_logging, LoggingConfig};

pub use repr::{CoreRepr, WindowRepr};

use registry::NativeCore;

/// Creates a Core and returns its handle, or null on failure.
///
/// The configuration starts from the arguments and then applies the
/// `DOA_*` environment overrides.
///
/// # Safety
/// `title` must be null or point to a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn NewCore(
    width: i32,
    height: i32,
    title: *const c_char,
    fullscreen: bool,
) -> *mut CoreRepr {
    init_logging(LoggingConfig::default());

    guard("NewCore", ptr::null_mut(), || {
        if title.is_null() {
            return Err(EngineError::NullHandle("title").into());
        }
        // SAFETY: non-null and NUL-terminated per the contract above.
        let title = unsafe { CStr::from_ptr(title) };

        let (width, height) = native_extent(width, height)?;
        let config = CoreConfig::new(width, height, title.to_string_lossy())
            .fullscreen(fullscreen)
            .with_env_overrides()?;

        Ok(register(config, title.to_owned())?)
    })
}

/// Runs the Core's loop on the calling thread until it stops.
///
/// A Core runs once; a call while it is running returns at once, and later
/// calls log `InvalidState` and return.
///
/// # Safety
/// `core` must be null or point to a `CoreRepr` obtained from `NewCore`
/// (or a copy of one).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn StartCore(core: *mut CoreRepr) {
    guard("StartCore", (), || {
        // SAFETY: forwarded from the caller.
        let Some(native) = (unsafe { resolve(core)? }) else {
            warn!("StartCore on a released core ignored");
            return Ok(());
        };

        let mut core = match native.core().try_lock() {
            Ok(core) => core,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                warn!("StartCore on a running core ignored");
                return Ok(());
            }
        };

        let stats = core.start()?;
        info!("StartCore returned after {} frames ({:?})", stats.frames, stats.reason);
        Ok(())
    })
}

/// Asks a running Core to stop. Callable from any thread.
///
/// # Safety
/// Same contract as [`StartCore`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn StopCore(core: *mut CoreRepr) {
    guard("StopCore", (), || {
        // SAFETY: forwarded from the caller.
        match unsafe { resolve(core)? } {
            Some(native) => native.stop_handle().request(),
            None => debug!("StopCore on a released core ignored"),
        }
        Ok(())
    })
}

/// Releases the Core. Calling it again on the same struct is a no-op.
///
/// A loop still running on another thread is asked to stop; its memory is
/// reclaimed when that `StartCore` returns. The window struct stays readable
/// but its title pointer is null after this call.
///
/// # Safety
/// Same contract as [`StartCore`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn FreeCore(core: *mut CoreRepr) {
    guard("FreeCore", (), || {
        if core.is_null() {
            return Err(EngineError::NullHandle("core").into());
        }

        // SAFETY: non-null and points to a live CoreRepr per the contract.
        let key = unsafe { (*core).window } as usize;
        if key == 0 {
            debug!("FreeCore on a released core ignored");
            return Ok(());
        }

        let native = registry::remove(key);

        // SAFETY: as above.
        unsafe { (*core).window = ptr::null() };

        match native {
            Some(native) => {
                // SAFETY: the entry is no longer in the table.
                unsafe { native.retire() };
                native.stop_handle().request();
                debug!("core {key:#x} freed");
            }
            None => warn!("FreeCore on unknown core {key:#x} ignored"),
        }
        Ok(())
    })
}

/// Creates a Core from `config` and publishes it in the handle table.
pub(crate) fn register(config: CoreConfig, title: CString) -> Result<*mut CoreRepr, EngineError> {
    let core = Core::create(config)?;
    let native = NativeCore::new(core, title);
    let repr = native.repr_ptr();
    registry::insert(native);
    Ok(repr)
}

fn native_extent(width: i32, height: i32) -> Result<(u32, u32), EngineError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(EngineError::InvalidDimensions {
            width: width.into(),
            height: height.into(),
        }),
    }
}

/// Looks up the Core a `CoreRepr` refers to. `Ok(None)` means it was released.
///
/// # Safety
/// `core` must be null or point to a live `CoreRepr`.
unsafe fn resolve(core: *const CoreRepr) -> Result<Option<Arc<NativeCore>>, EngineError> {
    if core.is_null() {
        return Err(EngineError::NullHandle("core"));
    }
    // SAFETY: upheld by the caller.
    let key = unsafe { (*core).window } as usize;
    if key == 0 {
        return Ok(None);
    }
    Ok(registry::get(key))
}

/// Runs `body`, logging errors and panics instead of letting them cross the
/// boundary.
fn guard<T>(op: &str, fallback: T, body: impl FnOnce() -> Result<T>) -> T {
    match catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            error!("{op} failed: {e:#}");
            fallback
        }
        Err(panic) => {
            let msg = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("{op} panicked: {msg}");
            fallback
        }
    }
}
