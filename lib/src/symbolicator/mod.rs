//! Frame symbolication and the whole-report walk.

use crate::arch::Arch;
use crate::error::FrameError;
use crate::instruction::find_best_instruction;
use crate::report::{CrashReport, Frame, SymbolicatedReport, SymbolicatedThread, Thread};

pub mod demangle;
pub mod directory;

pub use demangle::demangle;
pub use directory::CacheDirectory;

/// Symbolicates the frames of one crash report against a prebuilt cache
/// directory.
///
/// Holds only shared references to immutable data; it is cheap to construct
/// and safe to use from concurrent tasks.
pub struct Symbolicator<'a> {
    report: &'a CrashReport,
    directory: &'a CacheDirectory,
}

impl<'a> Symbolicator<'a> {
    pub fn new(report: &'a CrashReport, directory: &'a CacheDirectory) -> Self {
        Symbolicator { report, directory }
    }

    /// Resolves one raw frame into its logical output frames.
    ///
    /// Returns one frame per source location the cache reports at the
    /// corrected address, preserving the cache's inline-chain order
    /// (innermost first). An empty result means either no debug info for the
    /// frame's image or no symbol at the address; both are valid outcomes,
    /// and the caller should keep the raw frame. Errors are fatal for this
    /// frame only.
    pub fn symbolicate_frame(
        &self,
        frame: &Frame,
        thread: &Thread,
        is_crashing_frame: bool,
    ) -> Result<Vec<Frame>, FrameError> {
        let image = self.report.used_images.get(frame.image_index).ok_or(
            FrameError::InvalidImageIndex {
                index: frame.image_index,
                count: self.report.used_images.len(),
            },
        )?;

        let Some(cache) = self.directory.get(&image.uuid) else {
            return Ok(Vec::new());
        };

        let arch = Arch::from_name(cache.architecture())?;

        // Missing or ill-typed register state degrades the address
        // correction but must not abort the frame.
        let ip_register_value = thread
            .thread_state
            .get(arch.ip_register_name())
            .map(|reg| reg.value)
            .unwrap_or(0);

        let addr = find_best_instruction(
            frame.image_offset,
            ip_register_value,
            self.report.termination.code,
            arch,
            is_crashing_frame,
        );

        let locations = cache.lookup(addr).map_err(FrameError::LookupFailed)?;

        Ok(locations
            .into_iter()
            .map(|location| Frame {
                symbol: Some(demangle(&location.symbol, &location.language)),
                symbol_location: Some(location.symbol_address),
                image_offset: frame.image_offset,
                image_index: frame.image_index,
            })
            .collect())
    }

    /// Walks every thread and frame of the report in order.
    ///
    /// Only the first frame of the faulting thread is treated as the
    /// crashing frame. Each frame's expansion is spliced in place; a frame
    /// that produced no output (no debug info, no symbol, or a frame-level
    /// error) is carried through unsymbolicated so the report never loses
    /// frames.
    pub fn symbolicate_report(&self) -> SymbolicatedReport {
        let threads = self
            .report
            .threads
            .iter()
            .enumerate()
            .map(|(thread_index, thread)| {
                let mut frames = Vec::with_capacity(thread.frames.len());
                for (frame_index, frame) in thread.frames.iter().enumerate() {
                    let is_crashing_frame =
                        thread_index == self.report.faulting_thread && frame_index == 0;
                    match self.symbolicate_frame(frame, thread, is_crashing_frame) {
                        Ok(expanded) if !expanded.is_empty() => frames.extend(expanded),
                        Ok(_) => frames.push(frame.clone()),
                        Err(e) => {
                            log::debug!(
                                "leaving thread {thread_index} frame {frame_index} unsymbolicated: {e}"
                            );
                            frames.push(frame.clone());
                        }
                    }
                }
                SymbolicatedThread { frames }
            })
            .collect();

        SymbolicatedReport {
            faulting_thread: self.report.faulting_thread,
            threads,
        }
    }
}
