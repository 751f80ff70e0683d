//! Instruction library and instruction sets.
//!
//! The library is the fixed catalogue of operations the hardware knows
//! ([`Op`]), each with its configuration name. An [`InstSet`] selects and
//! orders a subset of the library: a genome's opcodes index into it. Sets are
//! read from the `instset-gx.cfg` text format:
//!
//! ```text
//! # name          redundancy  cost
//! nop-A           1
//! nop-B           1
//! nop-C           1
//! bind            1           2
//! ```
//!
//! Sets are immutable once built and shared between machines through `Arc`.

use crate::error::{HardwareError, Result};
use genexpr_data::{Genome, Instruction, NUM_NOPS};
use rand::Rng;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Default instruction set file name.
pub const DEFAULT_INST_FILENAME: &str = "instset-gx.cfg";

/// Every operation the gene-expression hardware can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    NopA,
    NopB,
    NopC,

    If0,
    IfEqu,
    IfNot0,
    IfNEqu,
    IfGr0,
    IfGr,
    IfGrEqu0,
    IfGrEqu,
    IfLess0,
    IfLess,
    IfLsEqu0,
    IfLsEqu,
    IfBit1,
    IfANotEqB,
    IfBNotEqC,
    IfANotEqC,
    JumpF,
    JumpB,
    Call,
    Return,
    Throw,
    ThrowIf0,
    ThrowIfNot0,
    Catch,
    Goto,
    GotoIf0,
    GotoIfNot0,
    Label,
    Skip,

    Pop,
    Push,
    HeadPop,
    HeadPush,
    PopA,
    PopB,
    PopC,
    PushA,
    PushB,
    PushC,
    SwitchStack,
    FlipStack,
    Swap,
    SwapAB,
    SwapBC,
    SwapAC,
    CopyReg,
    CopyRegAB,
    CopyRegAC,
    CopyRegBA,
    CopyRegBC,
    CopyRegCA,
    CopyRegCB,
    Reset,

    ShiftR,
    ShiftL,
    Bit1,
    SetNum,
    ValGrey,
    ValDir,
    ValAddP,
    ValFib,
    ValPolyC,
    Inc,
    Dec,
    Zero,
    Not,
    Neg,
    Square,
    Sqrt,
    Log,
    Log10,
    Minus17,

    Add,
    Sub,
    Mult,
    Div,
    Mod,
    Nand,
    Nor,
    And,
    Order,
    Xor,

    Copy,
    ReadInst,
    WriteInst,
    StackReadInst,
    StackWriteInst,
    Compare,
    IfNCpy,
    Allocate,
    CAlloc,
    MaxAlloc,
    Inject,
    InjectRand,
    Kazi,
    Kazi5,
    Die,

    TaskGet,
    TaskGet2,
    TaskPut,
    TaskPutResetInputs,
    TaskIO,
    TaskIOFeedback,
    TaskStackGet,
    TaskStackLoad,
    MatchStrings,
    Send,
    Receive,
    SenseLog2,
    SenseUnit,
    SenseMult100,
    SearchF,
    SearchB,
    MemSize,
    RotateL,
    RotateR,

    AdvanceHead,
    MoveHead,
    JumpHead,
    GetHead,
    IfLabel,
    IfLabel2,
    HeadDivide,
    HeadRead,
    HeadWrite,
    HeadCopy,
    /// `h-copy` repeated this many times.
    HeadCopyN(u8),
    HeadSearch,
    SetFlow,

    NewExecutableProgramid,
    NewGenomeProgramid,
    Site,
    Bind,
    IfBind,
    NumSites,
    ProgramidCopy,
    ProgramidDivide,
}

/// The instruction library: configuration name of every [`Op`].
pub const LIBRARY: &[(&str, Op)] = &[
    ("nop-A", Op::NopA),
    ("nop-B", Op::NopB),
    ("nop-C", Op::NopC),
    ("if-0", Op::If0),
    ("if-equ", Op::IfEqu),
    ("if-not-0", Op::IfNot0),
    ("if-n-equ", Op::IfNEqu),
    ("if-grt-0", Op::IfGr0),
    ("if-grt", Op::IfGr),
    ("if->=-0", Op::IfGrEqu0),
    ("if->=", Op::IfGrEqu),
    ("if-less-0", Op::IfLess0),
    ("if-less", Op::IfLess),
    ("if-<=-0", Op::IfLsEqu0),
    ("if-<=", Op::IfLsEqu),
    ("if-bit-1", Op::IfBit1),
    ("if-A!=B", Op::IfANotEqB),
    ("if-B!=C", Op::IfBNotEqC),
    ("if-A!=C", Op::IfANotEqC),
    ("jump-f", Op::JumpF),
    ("jump-b", Op::JumpB),
    ("call", Op::Call),
    ("return", Op::Return),
    ("throw", Op::Throw),
    ("throw-if=0", Op::ThrowIf0),
    ("throw-if!=0", Op::ThrowIfNot0),
    ("catch", Op::Catch),
    ("goto", Op::Goto),
    ("goto-if=0", Op::GotoIf0),
    ("goto-if!=0", Op::GotoIfNot0),
    ("label", Op::Label),
    ("skip", Op::Skip),
    ("pop", Op::Pop),
    ("push", Op::Push),
    ("h-pop", Op::HeadPop),
    ("h-push", Op::HeadPush),
    ("pop-A", Op::PopA),
    ("pop-B", Op::PopB),
    ("pop-C", Op::PopC),
    ("push-A", Op::PushA),
    ("push-B", Op::PushB),
    ("push-C", Op::PushC),
    ("switch-stack", Op::SwitchStack),
    ("flip-stack", Op::FlipStack),
    ("swap", Op::Swap),
    ("swap-AB", Op::SwapAB),
    ("swap-BC", Op::SwapBC),
    ("swap-AC", Op::SwapAC),
    ("copy-reg", Op::CopyReg),
    ("copy-reg-AB", Op::CopyRegAB),
    ("copy-reg-AC", Op::CopyRegAC),
    ("copy-reg-BA", Op::CopyRegBA),
    ("copy-reg-BC", Op::CopyRegBC),
    ("copy-reg-CA", Op::CopyRegCA),
    ("copy-reg-CB", Op::CopyRegCB),
    ("reset", Op::Reset),
    ("shift-r", Op::ShiftR),
    ("shift-l", Op::ShiftL),
    ("bit-1", Op::Bit1),
    ("set-num", Op::SetNum),
    ("val-grey", Op::ValGrey),
    ("val-dir", Op::ValDir),
    ("val-add-p", Op::ValAddP),
    ("val-fib", Op::ValFib),
    ("val-poly-c", Op::ValPolyC),
    ("inc", Op::Inc),
    ("dec", Op::Dec),
    ("zero", Op::Zero),
    ("not", Op::Not),
    ("neg", Op::Neg),
    ("square", Op::Square),
    ("sqrt", Op::Sqrt),
    ("log", Op::Log),
    ("log10", Op::Log10),
    ("minus-17", Op::Minus17),
    ("add", Op::Add),
    ("sub", Op::Sub),
    ("mult", Op::Mult),
    ("div", Op::Div),
    ("mod", Op::Mod),
    ("nand", Op::Nand),
    ("nor", Op::Nor),
    ("and", Op::And),
    ("order", Op::Order),
    ("xor", Op::Xor),
    ("copy", Op::Copy),
    ("read-inst", Op::ReadInst),
    ("write-inst", Op::WriteInst),
    ("stk-read-inst", Op::StackReadInst),
    ("stk-write-inst", Op::StackWriteInst),
    ("compare", Op::Compare),
    ("if-n-cpy", Op::IfNCpy),
    ("allocate", Op::Allocate),
    ("c-alloc", Op::CAlloc),
    ("max-alloc", Op::MaxAlloc),
    ("inject", Op::Inject),
    ("inject-r", Op::InjectRand),
    ("kazi", Op::Kazi),
    ("kazi5", Op::Kazi5),
    ("die", Op::Die),
    ("get", Op::TaskGet),
    ("get-2", Op::TaskGet2),
    ("put", Op::TaskPut),
    ("put-reset", Op::TaskPutResetInputs),
    ("IO", Op::TaskIO),
    ("IO-Feedback", Op::TaskIOFeedback),
    ("stk-get", Op::TaskStackGet),
    ("stk-load", Op::TaskStackLoad),
    ("match-strings", Op::MatchStrings),
    ("send", Op::Send),
    ("receive", Op::Receive),
    ("sense", Op::SenseLog2),
    ("sense-unit", Op::SenseUnit),
    ("sense-m100", Op::SenseMult100),
    ("search-f", Op::SearchF),
    ("search-b", Op::SearchB),
    ("mem-size", Op::MemSize),
    ("rotate-l", Op::RotateL),
    ("rotate-r", Op::RotateR),
    ("h-advance", Op::AdvanceHead),
    ("mov-head", Op::MoveHead),
    ("jmp-head", Op::JumpHead),
    ("get-head", Op::GetHead),
    ("if-label", Op::IfLabel),
    ("if-label2", Op::IfLabel2),
    ("h-divide", Op::HeadDivide),
    ("h-read", Op::HeadRead),
    ("h-write", Op::HeadWrite),
    ("h-copy", Op::HeadCopy),
    ("h-copy2", Op::HeadCopyN(2)),
    ("h-copy3", Op::HeadCopyN(3)),
    ("h-copy4", Op::HeadCopyN(4)),
    ("h-copy5", Op::HeadCopyN(5)),
    ("h-copy6", Op::HeadCopyN(6)),
    ("h-copy7", Op::HeadCopyN(7)),
    ("h-copy8", Op::HeadCopyN(8)),
    ("h-copy9", Op::HeadCopyN(9)),
    ("h-copy10", Op::HeadCopyN(10)),
    ("h-search", Op::HeadSearch),
    ("set-flow", Op::SetFlow),
    ("new-exe-programid", Op::NewExecutableProgramid),
    ("new-genome-programid", Op::NewGenomeProgramid),
    ("site", Op::Site),
    ("bind", Op::Bind),
    ("if-bind", Op::IfBind),
    ("num-sites", Op::NumSites),
    ("p-copy", Op::ProgramidCopy),
    ("p-divide", Op::ProgramidDivide),
];

impl Op {
    /// Looks an operation up by its configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Op> {
        LIBRARY.iter().find(|(n, _)| *n == name).map(|(_, op)| *op)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        LIBRARY
            .iter()
            .find(|(_, op)| *op == self)
            .map_or("?", |(n, _)| n)
    }

    /// Label symbol carried by a nop, `None` for everything else.
    #[must_use]
    pub fn nop_mod(self) -> Option<u8> {
        match self {
            Op::NopA => Some(0),
            Op::NopB => Some(1),
            Op::NopC => Some(2),
            _ => None,
        }
    }
}

/// One selected instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstEntry {
    pub name: &'static str,
    pub op: Op,
    /// Relative weight when drawing random instructions.
    pub redundancy: u32,
    /// Cycles charged per execution.
    pub cost: u32,
}

#[derive(Debug, Clone)]
pub struct InstSet {
    entries: Vec<InstEntry>,
    by_name: HashMap<&'static str, Instruction>,
    total_redundancy: u32,
}

static DEFAULT_GX: OnceLock<Arc<InstSet>> = OnceLock::new();

impl InstSet {
    /// Builds a set from entries. Opcodes follow entry order.
    pub fn from_entries(entries: Vec<InstEntry>) -> Result<Self> {
        if entries.len() > usize::from(u8::MAX) + 1 {
            return Err(HardwareError::parse(
                entries.len(),
                "instruction set exceeds 256 entries",
            ));
        }
        let mut by_name = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            if by_name.insert(entry.name, Instruction(i as u8)).is_some() {
                return Err(HardwareError::parse(
                    i + 1,
                    format!("duplicate instruction `{}`", entry.name),
                ));
            }
        }
        for nop in [Op::NopA, Op::NopB, Op::NopC] {
            if !entries.iter().any(|e| e.op == nop) {
                return Err(HardwareError::parse(
                    0,
                    format!("instruction set lacks `{}`", nop.name()),
                ));
            }
        }
        let total_redundancy = entries.iter().map(|e| e.redundancy).sum();
        Ok(Self {
            entries,
            by_name,
            total_redundancy,
        })
    }

    /// Parses the `instset-gx.cfg` format: `name [redundancy [cost]]` per line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let Some(name) = fields.next() else { continue };
            let (name, op) = LIBRARY
                .iter()
                .find(|(n, _)| *n == name)
                .copied()
                .ok_or_else(|| HardwareError::unknown(name).with_context(format!("line {line_no}")))?;
            let redundancy = parse_field(fields.next(), 1, line_no, "redundancy")?;
            let cost = parse_field(fields.next(), 0, line_no, "cost")?;
            if redundancy == 0 {
                continue;
            }
            entries.push(InstEntry {
                name,
                op,
                redundancy,
                cost,
            });
        }
        Self::from_entries(entries)
    }

    /// Reads and parses an instruction set file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| HardwareError::from(e).with_context(path.display().to_string()))?;
        Self::parse(&text)
    }

    /// The full library in catalogue order, each instruction once at no cost.
    ///
    /// Built once per process; every caller shares the same set.
    pub fn default_gx() -> Arc<InstSet> {
        DEFAULT_GX
            .get_or_init(|| {
                let entries = LIBRARY
                    .iter()
                    .map(|&(name, op)| InstEntry {
                        name,
                        op,
                        redundancy: 1,
                        cost: 0,
                    })
                    .collect();
                // The library always contains the three nops and fits in a byte.
                Arc::new(Self::from_entries(entries).unwrap_or_else(|_| unreachable!()))
            })
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[InstEntry] {
        &self.entries
    }

    #[must_use]
    pub fn entry(&self, inst: Instruction) -> Option<&InstEntry> {
        self.entries.get(inst.op())
    }

    #[must_use]
    pub fn op(&self, inst: Instruction) -> Option<Op> {
        self.entry(inst).map(|e| e.op)
    }

    #[must_use]
    pub fn name(&self, inst: Instruction) -> &'static str {
        self.entry(inst).map_or("?", |e| e.name)
    }

    /// Opcode of a named instruction.
    #[must_use]
    pub fn inst(&self, name: &str) -> Option<Instruction> {
        self.by_name.get(name).copied()
    }

    /// First opcode in this set that dispatches to `op`.
    #[must_use]
    pub fn inst_for(&self, op: Op) -> Option<Instruction> {
        self.entries
            .iter()
            .position(|e| e.op == op)
            .map(|i| Instruction(i as u8))
    }

    #[must_use]
    pub fn is_nop(&self, inst: Instruction) -> bool {
        self.nop_mod(inst).is_some()
    }

    #[must_use]
    pub fn nop_mod(&self, inst: Instruction) -> Option<u8> {
        self.op(inst).and_then(Op::nop_mod)
    }

    #[must_use]
    pub fn num_nops(&self) -> usize {
        NUM_NOPS
    }

    #[must_use]
    pub fn cost(&self, inst: Instruction) -> u32 {
        self.entry(inst).map_or(0, |e| e.cost)
    }

    /// Instruction newly allocated memory is filled with.
    #[must_use]
    pub fn default_inst(&self) -> Instruction {
        Instruction(0)
    }

    /// Draws an instruction weighted by redundancy.
    pub fn random_inst<R: Rng + ?Sized>(&self, rng: &mut R) -> Instruction {
        if self.total_redundancy == 0 {
            return self.default_inst();
        }
        let mut ticket = rng.gen_range(0..self.total_redundancy);
        for (i, entry) in self.entries.iter().enumerate() {
            if ticket < entry.redundancy {
                return Instruction(i as u8);
            }
            ticket -= entry.redundancy;
        }
        self.default_inst()
    }

    /// Parses a genome written as whitespace separated instruction names.
    pub fn parse_genome(&self, text: &str) -> Result<Genome> {
        let mut genome = Genome::default();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("");
            for name in line.split_whitespace() {
                let inst = self
                    .inst(name)
                    .ok_or_else(|| HardwareError::unknown(name).with_context(format!("line {}", idx + 1)))?;
                genome.push(inst);
            }
        }
        Ok(genome)
    }

    /// Renders a genome one instruction name per line.
    #[must_use]
    pub fn genome_to_text(&self, genome: &Genome) -> String {
        genome
            .iter()
            .map(|&inst| self.name(inst))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renders the set in the format [`InstSet::parse`] reads.
    #[must_use]
    pub fn to_config(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{:<22}{:<4}{}", e.name, e.redundancy, e.cost))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_field(field: Option<&str>, default: u32, line: usize, what: &str) -> Result<u32> {
    match field {
        None => Ok(default),
        Some(text) => text
            .parse()
            .map_err(|_| HardwareError::parse(line, format!("invalid {what} `{text}`"))),
    }
}
