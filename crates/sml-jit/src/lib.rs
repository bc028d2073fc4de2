//! Drives a single SML compile from source text to a callable function
//! pointer.
//!
//! Allocates one read+write page, runs the assembler and linker into it,
//! flips the page to read+execute, and hands back a [`CompiledFunction`].
//! The page is never simultaneously writable and executable.

pub use sml_assembler::CompileOptions;
pub use sml_types::CompileError;

/// A compiled SML function, backed by one executable page.
///
/// Callable as `fn(i32, i32, i32) -> i32` per the System V AMD64
/// calling convention; excess parameters beyond what the source reads
/// are simply ignored by the generated code.
pub struct CompiledFunction {
    allocation: region::Allocation,
}

impl CompiledFunction {
    /// Calls the function with no arguments.
    ///
    /// # Safety
    /// The caller must ensure nothing else is concurrently calling
    /// [`dispose`](Self::dispose) on this same function.
    pub unsafe fn call0(&self) -> i32 {
        (self.entry_point())(0, 0, 0)
    }

    /// # Safety
    /// See [`call0`](Self::call0).
    pub unsafe fn call1(&self, a: i32) -> i32 {
        (self.entry_point())(a, 0, 0)
    }

    /// # Safety
    /// See [`call0`](Self::call0).
    pub unsafe fn call2(&self, a: i32, b: i32) -> i32 {
        (self.entry_point())(a, b, 0)
    }

    /// # Safety
    /// See [`call0`](Self::call0).
    pub unsafe fn call3(&self, a: i32, b: i32, c: i32) -> i32 {
        (self.entry_point())(a, b, c)
    }

    /// Releases the backing page. Calling any `callN` method after this
    /// is impossible: the consuming signature takes the value, so the
    /// function pointer cannot outlive its page.
    pub fn dispose(self) {
        tracing::debug!("releasing compiled function's code page");
        drop(self);
    }

    /// The function's entry address, for callers that need to invoke it
    /// through something other than `callN` - e.g. a test harness that
    /// drives the call through inline assembly to inspect registers the
    /// Rust calling convention would otherwise hide.
    pub fn as_ptr(&self) -> *const u8 {
        self.allocation.as_ptr::<u8>()
    }

    fn entry_point(&self) -> extern "C" fn(i32, i32, i32) -> i32 {
        // SAFETY: `allocation` was transitioned to READ_EXECUTE by
        // `compile` before this function was ever constructed, and it
        // holds bytes produced by `sml_assembler::compile_to_bytes`,
        // whose generated prologue/epilogue honor the System V calling
        // convention this signature assumes.
        unsafe { std::mem::transmute(self.allocation.as_ptr::<u8>()) }
    }
}

/// Compiles `source` with the default [`CompileOptions`].
#[tracing::instrument(skip(source))]
pub fn compile(source: &str) -> Result<CompiledFunction, CompileError> {
    compile_with_options(source, CompileOptions::default())
}

/// Compiles `source`, allocating a writable page, assembling and linking
/// into it, then transitioning it to executable.
///
/// On any failure - syntax, link, or a resource failure allocating or
/// protecting the page - no page is left behind.
#[tracing::instrument(skip(source), fields(max_lines = options.max_lines))]
pub fn compile_with_options(
    source: &str,
    options: CompileOptions,
) -> Result<CompiledFunction, CompileError> {
    let code = sml_assembler::compile_to_bytes(source, options)?;

    let page_size = region::page::size();
    if code.len() > page_size {
        return Err(CompileError::resource(format!(
            "compiled function ({} bytes) exceeds the code page size ({page_size} bytes)",
            code.len()
        )));
    }

    let mut allocation = region::alloc(page_size, region::Protection::READ_WRITE)
        .map_err(|err| CompileError::resource(format!("failed to allocate a writable code page: {err}")))?;

    // SAFETY: `allocation` is freshly allocated with exactly `page_size`
    // writable bytes, and `code.len() <= page_size` was just checked.
    unsafe {
        std::ptr::copy_nonoverlapping(code.as_ptr(), allocation.as_mut_ptr::<u8>(), code.len());
    }

    // SAFETY: `allocation`'s full extent is the region this process just
    // allocated; dropping the write permission here is what establishes
    // the W^X invariant before any caller can obtain a callable.
    unsafe {
        region::protect(
            allocation.as_ptr::<u8>(),
            allocation.len(),
            region::Protection::READ_EXECUTE,
        )
        .map_err(|err| CompileError::resource(format!("failed to make the code page executable: {err}")))?;
    }

    tracing::debug!(bytes = code.len(), "SML function compiled into an executable page");

    Ok(CompiledFunction { allocation })
}
