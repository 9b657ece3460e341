use super::r#trait::{ContextHandle, ImeApi};
use crate::events::WindowHandle;

/// Input context acquired for one window; released on drop.
pub struct ContextGuard<'a, I: ImeApi + ?Sized> {
    ime: &'a I,
    window: WindowHandle,
    context: ContextHandle,
}

impl<'a, I: ImeApi + ?Sized> ContextGuard<'a, I> {
    pub fn acquire(ime: &'a I, window: WindowHandle) -> Option<Self> {
        let context = ime.acquire_context(window)?;
        Some(Self { ime, window, context })
    }

    pub fn conversion_mode(&self) -> Option<u32> {
        self.ime.conversion_mode(self.context)
    }
}

impl<I: ImeApi + ?Sized> Drop for ContextGuard<'_, I> {
    fn drop(&mut self) {
        self.ime.release_context(self.window, self.context);
    }
}
