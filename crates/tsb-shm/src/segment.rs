use crate::error::ShmError;
use memmap2::MmapMut;
use nix::fcntl::OFlag;
use nix::sys::mman::{shm_open, shm_unlink};
use nix::sys::stat::Mode;
use nix::unistd::ftruncate;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use tracing::debug;
use tsb_core::{DataRing, DescRing};

/// A named POSIX shared-memory segment, mapped read/write for the
/// lifetime of this handle.
///
/// Segments are created fresh at startup — any stale segment left behind
/// by a crashed prior run is unlinked first, matching the spec's "removed
/// at startup, re-created" memory-layout rule. The name is only ever
/// unlinked explicitly, by [`unlink`], at a controlled shutdown point —
/// not implicitly on drop — since the mapping itself is usually handed
/// off to a [`DataRing`]/[`DescRing`] whose lifetime outlives this
/// wrapper.
pub struct ShmSegment {
    name: String,
    mmap: MmapMut,
}

impl ShmSegment {
    /// Creates (replacing any stale segment of the same name) a
    /// zero-filled segment of exactly `size` bytes.
    pub fn create(name: &str, size: usize) -> Result<Self, ShmError> {
        let _ = shm_unlink(name); // best-effort; ENOENT is expected and fine

        let fd = shm_open(
            name,
            OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR,
            Mode::S_IRUSR | Mode::S_IWUSR,
        )?;
        // Safety: `shm_open` just handed us ownership of this descriptor.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        ftruncate(fd.as_raw_fd(), size as libc::off_t)?;

        let mmap = unsafe { MmapMut::map_mut(fd.as_raw_fd()).map_err(ShmError::Io)? };
        debug!(name, size, "created shared-memory segment");
        Ok(Self {
            name: name.to_string(),
            mmap,
        })
    }

    /// Opens an already-created segment (used by a processor child
    /// process given the segment name as an argument).
    pub fn open(name: &str) -> Result<Self, ShmError> {
        let fd = shm_open(name, OFlag::O_RDWR, Mode::empty())?;
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };
        let mmap = unsafe { MmapMut::map_mut(fd.as_raw_fd()).map_err(ShmError::Io)? };
        Ok(Self {
            name: name.to_string(),
            mmap,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    #[must_use]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.mmap
    }

    /// Consumes the wrapper, handing the raw mapping to the caller (e.g.
    /// to back a [`DataRing`]/[`DescRing`]). The segment's name stays
    /// registered in the OS until [`unlink`] is called.
    #[must_use]
    pub fn into_mmap(self) -> MmapMut {
        self.mmap
    }

    /// Removes this segment's name so no further process can `open` it.
    /// Existing mappings (including any `DataRing`/`DescRing` built from
    /// [`into_mmap`]) remain valid until unmapped.
    pub fn unlink(name: &str) -> Result<(), ShmError> {
        shm_unlink(name).map_err(ShmError::from)
    }
}

/// Builds a [`DataRing`] backed by a freshly created named segment sized
/// for `2^data_bits` bytes.
pub fn create_data_ring(name: &str, data_bits: u8) -> Result<DataRing<MmapMut>, ShmError> {
    let size = 1usize << data_bits;
    let segment = ShmSegment::create(name, size)?;
    Ok(DataRing::with_storage(data_bits, segment.into_mmap()))
}

/// Builds a [`DescRing`] backed by a freshly created named segment sized
/// for `2^desc_bits` 32-byte entries.
pub fn create_desc_ring(name: &str, desc_bits: u8) -> Result<DescRing<MmapMut>, ShmError> {
    let size = (1usize << desc_bits) * tsb_core::DESC_ENTRY_BYTES as usize;
    let segment = ShmSegment::create(name, size)?;
    Ok(DescRing::with_storage(desc_bits, segment.into_mmap()))
}
