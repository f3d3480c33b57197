use core::{
    alloc::Layout,
    ptr::NonNull,
};

/// Source of raw, untyped memory for [`AdjustableArray`](crate::AdjustableArray).
///
/// Returning [`None`] from an allocation is the only way an implementor reports failure.
pub trait Allocator {

    unsafe fn allocate_raw(&self, size: usize, align: usize) -> Option<NonNull<u8>>;

    unsafe fn free_raw(&self, ptr: NonNull<u8>, size: usize, align: usize);

    /// Allocates room for `count` values of `T` without initializing them.
    unsafe fn allocate_uninit<T>(&self, count: usize) -> Option<NonNull<T>> {
        let layout = Layout::array::<T>(count).ok()?;
        unsafe { self.allocate_raw(layout.size(), layout.align()).map(|ptr| ptr.cast::<T>()) }
    }

    /// Frees a block previously returned by [`allocate_uninit`](Self::allocate_uninit) with
    /// the same `count`.
    unsafe fn free_uninit<T>(&self, ptr: NonNull<T>, count: usize) {
        let layout = Layout::array::<T>(count);
        debug_assert!(layout.is_ok(), "freed block of {} elements has no valid layout", count);
        let Ok(layout) = layout else {
            return
        };
        unsafe { self.free_raw(ptr.cast::<u8>(), layout.size(), layout.align()) }
    }
}
