//! Memory-mapped register window
//!
//! Maps the FIR IP's resource file (a platform/PCIe resource exposing the
//! register window) and performs bounds-checked volatile word access against
//! it. The mapping is claimed exclusively: a non-blocking `flock` on the
//! resource file makes a second attach fail instead of silently remapping,
//! in this process or any other.

use crate::bus::RegisterBus;
use crate::error::{FirError, Result};
use fir_chip::regs;
use rustix::fs::{flock, FlockOperation};
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsFd;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// Memory-mapped FIR register window.
///
/// Valid strictly between [`MmioBus::attach`] and [`RegisterBus::detach`];
/// every accessor fails with `Detached` outside that span. `Drop` unmaps as
/// a backstop if the caller never detached.
pub struct MmioBus {
    /// Mapped base; `None` once detached.
    ptr: Option<NonNull<u8>>,
    /// Mapped length in register-words.
    words: usize,
    /// Mapped length in bytes (what was passed to mmap).
    bytes: usize,
    /// Keeps the fd (and the exclusive flock) alive for the mapping's lifetime.
    file: Option<File>,
    path: PathBuf,
}

impl std::fmt::Debug for MmioBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmioBus")
            .field("path", &self.path)
            .field("words", &self.words)
            .field("attached", &self.ptr.is_some())
            .finish()
    }
}

// SAFETY: MmioBus owns the mapping exclusively (flock + sole pointer copy).
// mmap'd memory is process-wide, so moving the struct between threads does
// not invalidate it, and all access goes through &mut self.
unsafe impl Send for MmioBus {}

impl MmioBus {
    /// Claim and map the FIR register window behind `path`.
    ///
    /// The file is opened read/write, locked with a non-blocking exclusive
    /// `flock`, and mapped shared. The mapping must cover at least the full
    /// 257-word window.
    ///
    /// # Errors
    ///
    /// `ResourceUnavailable` if the file cannot be opened, is already claimed
    /// by another attach, cannot be mapped, or is smaller than the window.
    pub fn attach(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let resource = path.display().to_string();

        tracing::debug!("Attaching FIR window: {resource}");

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| FirError::resource_unavailable(&resource, e.to_string()))?;

        flock(&file, FlockOperation::NonBlockingLockExclusive).map_err(|e| {
            FirError::resource_unavailable(&resource, format!("already attached? flock: {e}"))
        })?;

        // Window sizes fit in usize on 64-bit, our only target
        #[allow(clippy::cast_possible_truncation)]
        let bytes = file
            .metadata()
            .map_err(|e| FirError::resource_unavailable(&resource, format!("stat: {e}")))?
            .len() as usize;

        let words = bytes / regs::WORD_BYTES;
        if words < regs::WINDOW_WORDS {
            return Err(FirError::resource_unavailable(
                &resource,
                format!(
                    "window too small: {words} words, need {}",
                    regs::WINDOW_WORDS
                ),
            ));
        }

        // SAFETY: mmap necessary for register access - maps the resource into
        // the process address space. Invariants: (1) fd valid, just opened;
        // (2) bytes is non-zero (>= WINDOW_WORDS * 4, checked above);
        // (3) MAP_SHARED so stores reach the device; (4) ptr valid for bytes
        // or Err. The fd is kept in the struct so the mapping (and the flock)
        // outlive every access.
        let ptr = unsafe {
            let addr = mmap(
                std::ptr::null_mut(),
                bytes,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                0,
            )
            .map_err(|e| FirError::resource_unavailable(&resource, format!("mmap: {e}")))?;

            NonNull::new(addr.cast::<u8>()).expect("mmap returns non-null pointer on success")
        };

        tracing::info!("Mapped FIR window {resource}: {words} words at {ptr:p}");

        Ok(Self {
            ptr: Some(ptr),
            words,
            bytes,
            file: Some(file),
            path,
        })
    }

    /// The resource path this window was attached from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn base(&self) -> Result<NonNull<u8>> {
        self.ptr.ok_or(FirError::Detached)
    }

    fn check_bounds(&self, offset: usize) -> Result<()> {
        if offset >= self.words {
            return Err(FirError::OutOfRange {
                offset,
                limit: self.words,
            });
        }
        Ok(())
    }

    fn unmap(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            // SAFETY: ptr/bytes are exactly what mmap returned in attach(),
            // and taking ptr out first means this runs at most once.
            unsafe {
                if let Err(e) = munmap(ptr.as_ptr().cast(), self.bytes) {
                    tracing::error!("munmap failed for {}: {e}", self.path.display());
                }
            }
            tracing::debug!("Unmapped FIR window {}", self.path.display());
        }
        // Dropping the file releases the flock.
        self.file = None;
    }
}

impl RegisterBus for MmioBus {
    fn load(&mut self, offset: usize) -> Result<u32> {
        let base = self.base()?;
        self.check_bounds(offset)?;

        // SAFETY: Volatile read of a mapped register. Bounds checked above,
        // base is from a live mapping, the window is word-aligned by mmap
        // (page-aligned base, 4-byte stride). read_volatile is required:
        // the device changes these words and the compiler must not cache,
        // reorder, or elide the access.
        #[allow(clippy::cast_ptr_alignment)]
        let value = unsafe {
            base.as_ptr()
                .add(offset * regs::WORD_BYTES)
                .cast::<u32>()
                .read_volatile()
        };

        tracing::trace!("load [{offset}] = {value:#x}");
        Ok(value)
    }

    fn store(&mut self, offset: usize, word: u32) -> Result<()> {
        let base = self.base()?;
        self.check_bounds(offset)?;

        tracing::trace!("store [{offset}] = {word:#x}");

        // SAFETY: Volatile write of a mapped register. Bounds checked above,
        // base is from a live mapping, aligned as in load(). write_volatile
        // is required: stores trigger device side effects and must not be
        // reordered or elided.
        #[allow(clippy::cast_ptr_alignment)]
        unsafe {
            base.as_ptr()
                .add(offset * regs::WORD_BYTES)
                .cast::<u32>()
                .write_volatile(word);
        }

        Ok(())
    }

    fn len_words(&self) -> usize {
        self.words
    }

    fn detach(&mut self) -> Result<()> {
        if self.ptr.is_none() {
            return Err(FirError::Detached);
        }
        self.unmap();
        Ok(())
    }
}

impl Drop for MmioBus {
    fn drop(&mut self) {
        self.unmap();
    }
}
