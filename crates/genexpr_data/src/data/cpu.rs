use serde::{Deserialize, Serialize};

/// Number of general registers each programid carries.
pub const NUM_REGISTERS: usize = 3;
/// Number of heads each programid carries: max(register count, platform heads).
pub const NUM_HEADS: usize = if HeadKind::ALL.len() >= NUM_REGISTERS {
    HeadKind::ALL.len()
} else {
    NUM_REGISTERS
};

/// General purpose registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Register {
    Ax,
    Bx,
    Cx,
}

impl Register {
    pub const ALL: [Register; NUM_REGISTERS] = [Register::Ax, Register::Bx, Register::Cx];

    /// Register selected by a nop modifier.
    #[must_use]
    pub fn from_nop(nop: u8) -> Self {
        Self::ALL[nop as usize % NUM_REGISTERS]
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % NUM_REGISTERS]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + NUM_REGISTERS - 1) % NUM_REGISTERS]
    }
}

/// Heads every programid owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadKind {
    /// Instruction pointer.
    Ip,
    Read,
    Write,
    Flow,
}

impl HeadKind {
    pub const ALL: [HeadKind; 4] = [HeadKind::Ip, HeadKind::Read, HeadKind::Write, HeadKind::Flow];

    /// Head selected by a nop modifier. Only the first three are addressable.
    #[must_use]
    pub fn from_nop(nop: u8) -> Self {
        Self::ALL[nop as usize % 3]
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// What a programid is allowed to do and have done to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Runs when no foreign head rests on it.
    pub executable: bool,
    /// Other programids may bind heads onto its sites.
    pub bindable: bool,
    /// Other programids may read (copy) from it.
    pub readable: bool,
}

impl Capabilities {
    /// The programid wrapping the organism's starting genome.
    pub const ORIGIN: Capabilities = Capabilities {
        executable: true,
        bindable: true,
        readable: true,
    };
    /// An executable "protein" that cannot be bound or read.
    pub const PROTEIN: Capabilities = Capabilities {
        executable: true,
        bindable: false,
        readable: false,
    };
    /// A passive genomic fragment.
    pub const GENOMIC: Capabilities = Capabilities {
        executable: false,
        bindable: true,
        readable: true,
    };
}
