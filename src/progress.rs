//! Suspension as an explicit result type.
//!
//! The source this profile is modeled on signals suspension with a bare
//! `bool` return from `encode_mcu`/`decompress_data`. Per Design Note
//! "Suspension via boolean return -> explicit `Progress` result," we use a
//! two-valued enum instead so call sites can't silently ignore it the way a
//! discarded `bool` can be.

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Progress {
    /// The unit of work (one iMCU row, one MCU) completed.
    Done,
    /// The entropy coder's sink is full (encode) or exhausted (decode).
    /// Callers must preserve their input and retry with identical
    /// arguments once the sink has been serviced.
    Suspended,
}

impl Progress {
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }

    #[must_use]
    pub const fn is_suspended(self) -> bool {
        matches!(self, Self::Suspended)
    }
}
