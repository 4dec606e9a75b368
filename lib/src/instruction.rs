//! Picking the right instruction address to symbolicate for a stack frame.
//!
//! Walked stack frames hold *return addresses*: the instruction after the
//! call, which can sit on the wrong source line or even in the wrong symbol.
//! Only the crashing frame's program counter points at the instruction that
//! actually executed. The resolver backs return addresses up into the call
//! instruction, using the architecture's instruction width, and leaves the
//! crashing frame alone (modulo alignment).

use crate::arch::Arch;

const SIGILL: u32 = 4;
const SIGBUS: u32 = 10;
const SIGSEGV: u32 = 11;

/// Inputs for resolving the best instruction address of one frame.
///
/// Pure value type; [`caller_address`](Self::caller_address) has no side
/// effects and is safe to call any number of times.
#[derive(Debug, Clone)]
pub struct InstructionInfo {
    addr: u64,
    arch: Arch,
    crashing_frame: bool,
    signal: Option<u32>,
    ip_reg: Option<u64>,
}

impl InstructionInfo {
    /// Creates info for a frame address. By default the frame is not the
    /// crashing frame and no signal or register value is known.
    pub fn new(arch: Arch, addr: u64) -> Self {
        InstructionInfo {
            addr,
            arch,
            crashing_frame: false,
            signal: None,
            ip_reg: None,
        }
    }

    /// Marks whether this is the trapping frame: the first frame of the
    /// faulting thread, whose address is the faulting instruction itself.
    pub fn is_crashing_frame(mut self, flag: bool) -> Self {
        self.crashing_frame = flag;
        self
    }

    /// Sets the POSIX signal the process terminated with, if known.
    pub fn signal(mut self, signal: Option<u32>) -> Self {
        self.signal = signal;
        self
    }

    /// Sets the live instruction pointer register value for the frame's
    /// thread, if the report carried one.
    pub fn ip_register_value(mut self, value: Option<u64>) -> Self {
        self.ip_reg = value;
        self
    }

    /// The frame address aligned down to an instruction boundary.
    ///
    /// No-op for variable-width architectures. On 32-bit ARM this strips the
    /// thumb bit.
    pub fn aligned_address(&self) -> u64 {
        match self.arch.instruction_alignment() {
            Some(alignment) => self.addr - (self.addr % alignment),
            None => self.addr,
        }
    }

    /// An address inside the instruction preceding the current one.
    ///
    /// Exact for fixed-width instruction sets. For variable-width encodings
    /// the best we can do without decoding is one byte back, which lands
    /// inside the previous instruction. MIPS return addresses skip the branch
    /// delay slot, so they are two instructions past the call.
    pub fn previous_address(&self) -> u64 {
        let instruction_size = self.arch.instruction_alignment().unwrap_or(1);
        let offset = match self.arch {
            Arch::Mips | Arch::Mips64 => 2 * instruction_size,
            _ => instruction_size,
        };
        self.aligned_address().saturating_sub(offset)
    }

    /// Whether the termination signal traps at the faulting instruction
    /// itself (invalid, privileged or misaligned access).
    pub fn is_crash_signal(&self) -> bool {
        matches!(self.signal, Some(SIGILL) | Some(SIGBUS) | Some(SIGSEGV))
    }

    /// Whether the frame address is a return address that must be backed up
    /// into its call instruction before lookup.
    pub fn should_adjust_caller(&self) -> bool {
        if !self.crashing_frame {
            return true;
        }

        // Some reporters strip the signal-handler frame from the top of the
        // trace for trap signals. The replacement top frame then holds a
        // return address like any other, detectable because it disagrees
        // with the live instruction pointer.
        if let Some(ip) = self.ip_reg {
            if ip != self.addr && self.is_crash_signal() {
                return true;
            }
        }

        false
    }

    /// The single address to hand to symbol lookup for this frame.
    pub fn caller_address(&self) -> u64 {
        if self.should_adjust_caller() {
            self.previous_address()
        } else {
            self.aligned_address()
        }
    }
}

/// Resolves the lookup address for a frame from raw report values.
///
/// A signal code or register value of 0 means "unknown" in the report and is
/// treated as absent.
pub fn find_best_instruction(
    image_offset: u64,
    ip_register_value: u64,
    signal: u32,
    arch: Arch,
    is_crashing_frame: bool,
) -> u64 {
    InstructionInfo::new(arch, image_offset)
        .is_crashing_frame(is_crashing_frame)
        .signal((signal != 0).then_some(signal))
        .ip_register_value((ip_register_value != 0).then_some(ip_register_value))
        .caller_address()
}
