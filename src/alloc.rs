use std::alloc::{alloc, Layout};

use crate::error::AllocError;

/// Like `Box::new`, but reports an exhausted allocator instead of aborting.
pub(crate) fn try_box<T>(value: T) -> Result<Box<T>, AllocError> {
    let layout = Layout::new::<T>();
    // Zero sized values never touch the allocator.
    if layout.size() == 0 {
        return Ok(Box::new(value));
    }
    unsafe {
        let p = alloc(layout) as *mut T;
        if p.is_null() {
            return Err(AllocError { layout });
        }
        p.write(value);
        Ok(Box::from_raw(p))
    }
}
