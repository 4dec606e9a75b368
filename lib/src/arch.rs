//! Architecture register and alignment tables.

use crate::error::FrameError;

/// CPU architecture of a binary image, as reported by its symbol cache.
///
/// Sub-variants that share register and alignment behavior are collapsed:
/// every ARMv6/v7 spelling parses to [`Arch::Arm`], every 64-bit ARM spelling
/// to [`Arch::Arm64`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    Amd64,
    Arm,
    Arm64,
    Mips,
    Mips64,
    Ppc,
    Ppc64,
}

impl Arch {
    /// Parses an architecture name as found in debug archives and crash
    /// reports. Unknown names are fatal for the frame being symbolicated.
    pub fn from_name(name: &str) -> Result<Self, FrameError> {
        Ok(match name {
            "x86" | "i386" | "i486" | "i586" | "i686" => Arch::X86,
            "x86_64" | "x86_64h" | "amd64" => Arch::Amd64,
            "arm" | "armv5" | "armv6" | "armv6m" | "armv7" | "armv7f" | "armv7s" | "armv7k"
            | "armv7m" | "armv7em" => Arch::Arm,
            "arm64" | "arm64e" | "arm64_32" | "arm64v8" | "aarch64" => Arch::Arm64,
            "mips" => Arch::Mips,
            "mips64" => Arch::Mips64,
            "ppc" | "powerpc" => Arch::Ppc,
            "ppc64" | "powerpc64" => Arch::Ppc64,
            _ => return Err(FrameError::UnsupportedArchitecture(name.to_string())),
        })
    }

    /// The name of the instruction pointer register in a thread's saved
    /// register state.
    pub fn ip_register_name(self) -> &'static str {
        match self {
            Arch::X86 => "eip",
            Arch::Amd64 => "rip",
            Arch::Arm | Arch::Arm64 => "pc",
            Arch::Mips | Arch::Mips64 => "pc",
            Arch::Ppc | Arch::Ppc64 => "srr0",
        }
    }

    /// Fixed instruction alignment, or `None` for variable-length encodings.
    ///
    /// 32-bit ARM reports 2 because of thumb: instructions are 2 or 4 bytes,
    /// and aligning down by 2 also strips the thumb bit from return
    /// addresses.
    pub fn instruction_alignment(self) -> Option<u64> {
        match self {
            Arch::X86 | Arch::Amd64 => None,
            Arch::Arm => Some(2),
            Arch::Arm64 => Some(4),
            Arch::Mips | Arch::Mips64 => Some(4),
            Arch::Ppc | Arch::Ppc64 => Some(4),
        }
    }
}
