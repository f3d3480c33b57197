use std::alloc::{Layout, alloc, dealloc};

use core::ptr::NonNull;

use crate::Allocator;

/// Forwards to the process-wide allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalAlloc;

pub static GLOBAL_ALLOC: GlobalAlloc = GlobalAlloc;

impl Allocator for GlobalAlloc {

    unsafe fn allocate_raw(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let layout = Layout::from_size_align(size, align).ok()?;
        if layout.size() == 0 {
            return None
        }
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr)
    }

    unsafe fn free_raw(&self, ptr: NonNull<u8>, size: usize, align: usize) {
        let layout = match Layout::from_size_align(size, align) {
            Ok(l) => l,
            Err(_) => return,
        };
        if layout.size() == 0 {
            return
        }
        unsafe { dealloc(ptr.as_ptr(), layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_request_is_refused() {
        let ptr = unsafe { GLOBAL_ALLOC.allocate_raw(0, 1) };
        assert!(ptr.is_none());
    }

    #[test]
    fn allocate_and_free_typed_block() {
        unsafe {
            let ptr = GLOBAL_ALLOC.allocate_uninit::<u64>(4).unwrap();
            for i in 0..4 {
                ptr.add(i).write(i as u64 * 3);
            }
            assert_eq!(ptr.add(3).read(), 9);
            GLOBAL_ALLOC.free_uninit(ptr, 4);
        }
    }
}
