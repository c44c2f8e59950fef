use std::ffi::{c_char, CStr};

/// C layout of a Core handle: `struct Core { Window* window; }`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct CoreRepr {
    pub window: *const WindowRepr,
}

/// C layout of the window descriptor:
/// `struct Window { int32_t width; int32_t height; const char* title; }`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct WindowRepr {
    pub width: i32,
    pub height: i32,
    pub title: *const c_char,
}

impl WindowRepr {
    /// Borrows the title bytes.
    ///
    /// # Safety
    /// `self.title` must point to a live NUL-terminated string, which holds until
    /// the owning Core is freed.
    pub unsafe fn title(&self) -> &CStr {
        // SAFETY: upheld by the caller.
        unsafe { CStr::from_ptr(self.title) }
    }
}

#[cfg(test)]
mod tests {
    use std::mem::{align_of, offset_of, size_of};

    use super::*;

    #[test]
    fn layouts_match_the_native_structs() {
        assert_eq!(size_of::<CoreRepr>(), size_of::<*const ()>());
        assert_eq!(offset_of!(WindowRepr, width), 0);
        assert_eq!(offset_of!(WindowRepr, height), 4);
        assert_eq!(offset_of!(WindowRepr, title), 8);
        assert_eq!(align_of::<WindowRepr>(), align_of::<*const ()>());
    }
}
