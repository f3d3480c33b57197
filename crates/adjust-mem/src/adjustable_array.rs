//! [`AdjustableArray`], an explicitly sized array that reports misuse instead of panicking.
//!
//! The array never grows on its own. Its length is set at construction and only changes
//! through [`change_size`](AdjustableArray::change_size). Misuse (a nonpositive size, an
//! out-of-range checked index, a nonpositive resize) is recorded in a [`Misuses`] register
//! and the operation carries on with a safe fallback. Allocation failure is the only hard
//! error and is returned as a [`CapacityError`].

use core::{
    alloc::Layout,
    cell::Cell,
    fmt::{self, Debug, Display, Formatter},
    marker::PhantomData,
    ops::{Index, IndexMut},
    ptr::{self, NonNull},
    slice,
};

use std::alloc::handle_alloc_error;

use adjust_log::{debug, trace, warn};

use crate::{
    Result,
    allocator::Allocator,
    errors::CapacityError,
    global_alloc::{GlobalAlloc, GLOBAL_ALLOC},
    misuse::{Misuse, Misuses},
    const_assert,
    size_of,
};

use CapacityError::AllocFailed;

pub struct AdjustableArray<'alloc, T, Alloc: Allocator> {
    data: NonNull<T>,
    capacity: usize,
    dud: T,
    dud_mut: T,
    misuses: Cell<Misuses>,
    alloc: &'alloc Alloc,
    _marker: PhantomData<T>,
}

pub type GlobalArray<T> = AdjustableArray<'static, T, GlobalAlloc>;

const_assert!(size_of!(GlobalArray<u32>) == size_of!(Option<GlobalArray<u32>>));

/// Owns a freshly allocated block while it is being filled.
///
/// Elements in `start..end` are initialized. If the fill unwinds, they are dropped and the
/// block is freed.
struct FillGuard<'a, T, Alloc: Allocator> {
    data: NonNull<T>,
    capacity: usize,
    start: usize,
    end: usize,
    alloc: &'a Alloc,
}

impl<'a, T, Alloc: Allocator> FillGuard<'a, T, Alloc> {

    #[inline(always)]
    fn new(data: NonNull<T>, capacity: usize, start: usize, alloc: &'a Alloc) -> Self {
        Self {
            data,
            capacity,
            start,
            end: start,
            alloc,
        }
    }

    #[inline(always)]
    fn push(&mut self, value: T) {
        debug_assert!(self.end < self.capacity);
        unsafe { self.data.add(self.end).write(value) }
        self.end += 1;
    }

    #[inline(always)]
    fn finish(self) -> NonNull<T> {
        let data = self.data;
        core::mem::forget(self);
        data
    }
}

impl<'a, T, Alloc: Allocator> Drop for FillGuard<'a, T, Alloc> {

    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.data.add(self.start).as_ptr(), self.end - self.start,
            ));
            free_block(self.alloc, self.data, self.capacity);
        }
    }
}

/// Allocates `capacity` uninitialized slots. Zero-sized types need no memory and get a
/// dangling pointer.
fn allocate_block<T, Alloc: Allocator>(capacity: usize, alloc: &Alloc) -> Result<NonNull<T>> {
    if size_of::<T>() == 0 {
        return Ok(NonNull::dangling())
    }
    unsafe { alloc
        .allocate_uninit(capacity)
        .ok_or(AllocFailed { new_capacity: capacity })
    }
}

/// # Safety
/// `data` must come from [`allocate_block`] with the same `capacity` and `alloc`.
unsafe fn free_block<T, Alloc: Allocator>(alloc: &Alloc, data: NonNull<T>, capacity: usize) {
    if size_of::<T>() != 0 {
        unsafe { alloc.free_uninit(data, capacity) }
    }
}

impl<T: Default> GlobalArray<T> {

    /// Creates an array of `size` default values backed by the global allocator.
    ///
    /// See [`new_in`](AdjustableArray::new_in).
    #[inline(always)]
    pub fn new(size: isize) -> Result<Self> {
        Self::new_in(size, &GLOBAL_ALLOC)
    }
}

impl<'alloc, T, Alloc: Allocator> AdjustableArray<'alloc, T, Alloc> {

    /// Creates an array of `size` default values in `alloc`.
    ///
    /// A `size` below one is clamped to one and recorded as [`Misuse::NonPositiveSize`].
    ///
    /// # Errors
    /// Returns [`CapacityError`] if the buffer can't be allocated.
    pub fn new_in(size: isize, alloc: &'alloc Alloc) -> Result<Self>
        where
            T: Default,
    {
        let mut misuses = Misuses::empty();
        let capacity =
            if size < 1 {
                misuses.insert(Misuse::NonPositiveSize);
                warn!("nonpositive size {} passed into constructor, capacity set to 1", size);
                1
            }
            else {
                size as usize
            };
        let mut guard = FillGuard::new(allocate_block(capacity, alloc)?, capacity, 0, alloc);
        for _ in 0..capacity {
            guard.push(T::default());
        }
        Ok(Self {
            dud: T::default(),
            dud_mut: T::default(),
            data: guard.finish(),
            capacity,
            misuses: Cell::new(misuses),
            alloc,
            _marker: PhantomData,
        })
    }

    /// Deep copies `other` into a fresh buffer from `alloc`, register included.
    fn copy_in(other: &Self, alloc: &'alloc Alloc) -> Result<Self>
        where
            T: Clone,
    {
        let mut guard = FillGuard::new(
            allocate_block(other.capacity, alloc)?, other.capacity, 0, alloc,
        );
        for value in other.as_slice() {
            guard.push(value.clone());
        }
        Ok(Self {
            dud: other.dud.clone(),
            dud_mut: other.dud_mut.clone(),
            data: guard.finish(),
            capacity: other.capacity,
            misuses: Cell::new(other.misuses.get()),
            alloc,
            _marker: PhantomData,
        })
    }

    /// Returns a deep copy of `self`, including every recorded misuse.
    ///
    /// # Errors
    /// Returns [`CapacityError`] if the buffer can't be allocated.
    #[inline(always)]
    pub fn try_clone(&self) -> Result<Self>
        where
            T: Clone,
    {
        Self::copy_in(self, self.alloc)
    }

    /// Replaces the contents, length and misuse register of `self` with a deep copy of
    /// `other`.
    ///
    /// Assigning an array to itself does nothing. On error `self` is left untouched.
    ///
    /// # Errors
    /// Returns [`CapacityError`] if the buffer can't be allocated.
    pub fn assign(&mut self, other: &Self) -> Result<&mut Self>
        where
            T: Clone,
    {
        if ptr::eq(&*self, other) {
            return Ok(self)
        }
        *self = Self::copy_in(other, self.alloc)?;
        Ok(self)
    }

    /// The number of elements, which is always at least one.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn misuses(&self) -> Misuses {
        self.misuses.get()
    }

    /// Renders every recorded misuse as a report, or `"No error.\n"`.
    pub fn error_message(&self) -> String {
        self.misuses.get().to_string()
    }

    #[inline(always)]
    fn record(&self, misuse: Misuse) {
        self.misuses.set(self.misuses.get().with(misuse));
    }

    #[inline(always)]
    fn in_range(&self, index: isize) -> Option<usize> {
        usize::try_from(index)
            .ok()
            .filter(|&index| index < self.capacity)
    }

    #[inline(always)]
    fn reject_index(&self, index: impl Display) {
        self.record(Misuse::InvalidIndex);
        debug!("index {} out of range for length {}", index, self.capacity);
    }

    /// Returns the element at `index`, or the sentinel if `index` is out of range.
    ///
    /// Out-of-range access is recorded as [`Misuse::InvalidIndex`].
    pub fn checked(&self, index: isize) -> &T {
        match self.in_range(index) {
            Some(index) => unsafe { self.get_unchecked(index) },
            None => {
                self.reject_index(index);
                &self.dud
            },
        }
    }

    /// Mutable version of [`checked`](Self::checked).
    ///
    /// Out-of-range access hands out a separate sentinel, reset to its default value each
    /// time, so anything written through it is lost.
    pub fn checked_mut(&mut self, index: isize) -> &mut T
        where
            T: Default,
    {
        match self.in_range(index) {
            Some(index) => unsafe { self.get_unchecked_mut(index) },
            None => {
                self.reject_index(index);
                self.dud_mut = T::default();
                &mut self.dud_mut
            },
        }
    }

    #[inline(always)]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.capacity {
            Some(unsafe { self.get_unchecked(index) })
        }
        else {
            None
        }
    }

    #[inline(always)]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.capacity {
            Some(unsafe { self.get_unchecked_mut(index) })
        }
        else {
            None
        }
    }

    /// # Safety
    /// `index` must be less than [`len`](Self::len).
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.capacity);
        unsafe { self.data.add(index).as_ref() }
    }

    /// # Safety
    /// `index` must be less than [`len`](Self::len).
    #[inline(always)]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.capacity);
        unsafe { self.data.add(index).as_mut() }
    }

    /// Reallocates the array to exactly `new_size` elements.
    ///
    /// The first `min(new_size, len)` elements are kept, new slots are default values and
    /// trailing elements are dropped. A `new_size` below one is recorded as
    /// [`Misuse::NonPositiveResize`] and leaves the array unchanged.
    ///
    /// # Errors
    /// Returns [`CapacityError`] if the new buffer can't be allocated, in which case the array
    /// is unchanged.
    pub fn change_size(&mut self, new_size: isize) -> Result<()>
        where
            T: Default,
    {
        if new_size < 1 {
            self.record(Misuse::NonPositiveResize);
            warn!("nonpositive new size {} passed into change_size, size left at {}", new_size, self.capacity);
            return Ok(())
        }
        let new_capacity = new_size as usize;
        let limit = new_capacity.min(self.capacity);
        let mut guard = FillGuard::new(
            allocate_block(new_capacity, self.alloc)?, new_capacity, limit, self.alloc,
        );
        for _ in limit..new_capacity {
            guard.push(T::default());
        }
        let tmp = guard.finish();
        unsafe { self.data.copy_to_nonoverlapping(tmp, limit); }
        let old = core::mem::replace(&mut self.data, tmp);
        let old_capacity = core::mem::replace(&mut self.capacity, new_capacity);
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                old.add(limit).as_ptr(), old_capacity - limit,
            ));
            free_block(self.alloc, old, old_capacity);
        }
        trace!("resized from {} to {}", old_capacity, new_capacity);
        Ok(())
    }

    #[inline(always)]
    fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.capacity) }
    }

    #[cfg(not(feature = "bounds-check"))]
    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.data.as_ptr(), self.capacity) }
    }

    fn layout(&self) -> Layout {
        Layout::array::<T>(self.capacity).unwrap_or_else(|_| Layout::new::<T>())
    }
}

impl<'alloc, T, Alloc: Allocator> Drop for AdjustableArray<'alloc, T, Alloc> {

    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.data.as_ptr(), self.capacity));
            free_block(self.alloc, self.data, self.capacity);
        }
    }
}

impl<'alloc, T: Clone, Alloc: Allocator> Clone for AdjustableArray<'alloc, T, Alloc> {

    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(array) => array,
            Err(_) => handle_alloc_error(self.layout()),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if self.assign(source).is_err() {
            handle_alloc_error(source.layout())
        }
    }
}

impl<'alloc, T, Alloc: Allocator> Index<usize> for AdjustableArray<'alloc, T, Alloc> {

    type Output = T;

    #[cfg(feature = "bounds-check")]
    #[inline(always)]
    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Some(value) => value,
            None => {
                self.reject_index(index);
                &self.dud
            },
        }
    }

    #[cfg(not(feature = "bounds-check"))]
    #[inline(always)]
    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl<'alloc, T: Default, Alloc: Allocator> IndexMut<usize> for AdjustableArray<'alloc, T, Alloc> {

    #[cfg(feature = "bounds-check")]
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        if index < self.capacity {
            return unsafe { self.get_unchecked_mut(index) }
        }
        self.reject_index(index);
        self.dud_mut = T::default();
        &mut self.dud_mut
    }

    #[cfg(not(feature = "bounds-check"))]
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.as_mut_slice()[index]
    }
}

impl<'alloc, T: Debug, Alloc: Allocator> Debug for AdjustableArray<'alloc, T, Alloc> {

    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdjustableArray")
            .field("capacity", &self.capacity)
            .field("misuses", &self.misuses.get())
            .field("elements", &self.as_slice())
            .finish()
    }
}
