/// This module implements a thin wrapper around the system allocator
/// that allows to count how many bytes are allocated, and how many
/// allocations each thread performed.
///
/// Install it with `#[global_allocator]` in a binary or test to check that
/// the preallocated entry points really do not allocate.
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};

pub struct CountingAllocator;

static ALLOCATED: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    // const-initialized, so accessing it never allocates
    static THREAD_ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ret = System.alloc(layout);
        if !ret.is_null() {
            ALLOCATED.fetch_add(layout.size(), SeqCst);
            let _ = THREAD_ALLOCATIONS.try_with(|c| c.set(c.get() + 1));
        }
        ret
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        ALLOCATED.fetch_sub(layout.size(), SeqCst);
    }
}

/// Bytes currently allocated through [`CountingAllocator`], across all threads.
pub fn allocated() -> usize {
    ALLOCATED.load(SeqCst)
}

/// Number of allocations performed so far by the calling thread.
pub fn thread_allocations() -> usize {
    THREAD_ALLOCATIONS.try_with(|c| c.get()).unwrap_or(0)
}

#[macro_export]
macro_rules! alloc_cnt {
    ($body:block) => {{
        let __allocs_before = $crate::allocator::thread_allocations();
        let r = $body;
        let __allocs_after = $crate::allocator::thread_allocations();
        (r, __allocs_after - __allocs_before)
    }};
}
