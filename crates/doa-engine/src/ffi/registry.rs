use std::collections::HashMap;
use std::ffi::CString;
use std::ptr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use state::InitCell;

use crate::core::{Core, StopHandle};

use super::repr::{CoreRepr, WindowRepr};

/// A Core handed across the C boundary together with the memory its native
/// structs point into.
///
/// The `CoreRepr` and `WindowRepr` allocations are never freed. Their
/// addresses are table keys and hosts may keep pointers to them after
/// `FreeCore`, so they must stay unique for the life of the process.
pub(crate) struct NativeCore {
    repr: *mut CoreRepr,
    window: *mut WindowRepr,
    title: CString,
    stop: StopHandle,
    core: Mutex<Core>,
}

// SAFETY: `repr` and `window` are leaked allocations created in `NativeCore::new`
// and valid for the rest of the process. The engine writes through them only
// in `retire`, after the entry has left the table.
unsafe impl Send for NativeCore {}
unsafe impl Sync for NativeCore {}

impl NativeCore {
    pub(crate) fn new(core: Core, title: CString) -> Arc<Self> {
        let (width, height) = core.window().size();
        // Window guarantees both extents fit in i32.
        let window = Box::into_raw(Box::new(WindowRepr {
            width: width as i32,
            height: height as i32,
            title: title.as_ptr(),
        }));
        let repr = Box::into_raw(Box::new(CoreRepr { window }));

        Arc::new(Self {
            repr,
            window,
            title,
            stop: core.stop_handle(),
            core: Mutex::new(core),
        })
    }

    /// Table key: the address of the window struct, which every copy of the
    /// `CoreRepr` carries.
    pub(crate) fn key(&self) -> usize {
        self.window as usize
    }

    pub(crate) fn repr_ptr(&self) -> *mut CoreRepr {
        self.repr
    }

    #[cfg(test)]
    pub(crate) fn title(&self) -> &std::ffi::CStr {
        &self.title
    }

    pub(crate) fn stop_handle(&self) -> &StopHandle {
        &self.stop
    }

    pub(crate) fn core(&self) -> &Mutex<Core> {
        &self.core
    }

    /// Detaches the native structs from this Core: the returned `CoreRepr`
    /// no longer points at a window and the window no longer points at the
    /// title, which is freed with `self`.
    ///
    /// # Safety
    /// Must only be called once the entry has been removed from the table.
    pub(crate) unsafe fn retire(&self) {
        // SAFETY: both pointers are leaked in `new` and never freed.
        unsafe {
            (*self.window).title = ptr::null();
            (*self.repr).window = ptr::null();
        }
    }
}

type Table = HashMap<usize, Arc<NativeCore>>;

static TABLE: InitCell<Mutex<Table>> = InitCell::new();

fn table() -> MutexGuard<'static, Table> {
    TABLE
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn insert(native: Arc<NativeCore>) {
    table().insert(native.key(), native);
}

pub(crate) fn get(key: usize) -> Option<Arc<NativeCore>> {
    table().get(&key).cloned()
}

pub(crate) fn remove(key: usize) -> Option<Arc<NativeCore>> {
    table().remove(&key)
}

/// Whether `key` currently maps to the Core created with `title`.
///
/// Keys are addresses and may be reused after a free, so tests match on both.
#[cfg(test)]
pub(crate) fn is_live(key: usize, title: &std::ffi::CStr) -> bool {
    get(key).is_some_and(|n| n.title() == title)
}
