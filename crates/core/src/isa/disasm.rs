//! Token-based disassembler.
//!
//! Renders one instruction into a stream of typed display tokens so a host can colour
//! registers, follow addresses and align operands.
//!
//! # Format
//!
//! - The mnemonic is an `Instruction` token, followed by a single-space `Text` token when
//!   operands follow.
//! - Operands are separated by `", "` (`OperandSeparator`).
//! - Immediates are a `#` text token followed by a hex `Integer`.
//! - Indirect operands render as `[rN]`, `[rN+]`, `[-rN]` and `[rN+#0x..]`.
//! - Bit operands render as `cell.pos`.
//! - Memory, SFR and branch-target operands are hex `PossibleAddress` tokens, resolved under
//!   the extension state recorded for the instruction's address.
//! - Condition codes are text (`cc_z`).
//!
//! # Usage
//!
//! ```
//! use c166_core::ExtensionStore;
//! use c166_core::isa::disasm::{disassemble, to_text};
//!
//! let store = ExtensionStore::new();
//! let (tokens, len) = disassemble(&[0xF0, 0x12], 0x1000, &store).unwrap();
//! assert_eq!(len, 2);
//! assert_eq!(to_text(&tokens), "mov r1, r2");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::common::LiftError;
use crate::il::Width;
use crate::isa::decode::{
    bit_rel_target, caddr_target, cond_high, fetch, rel_target, seg_target, trap7,
};
use crate::isa::family::{Family, Form, OpcodeInfo};
use crate::isa::flags::Condition;
use crate::isa::instruction::InstructionBits;
use crate::isa::registers::Reg;
use crate::resolve::{Resolver, ShortTarget};
use crate::state::ExtensionStore;

/// Mnemonics of the immediate and register extension opcodes, by sub-opcode.
const EXT_MNEMONICS: [&str; 4] = ["exts", "extp", "extsr", "extpr"];

/// Sub-opcode of `extr` in the ATOMIC/EXTR encoding.
const EXTR_SUBOP: u8 = 0b10;

/// Display class of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Mnemonic.
    Instruction,
    /// Register name.
    Register,
    /// Immediate, count or bit position.
    Integer,
    /// Value that is likely an address (memory operand, SFR, branch target).
    PossibleAddress,
    /// Punctuation and condition codes.
    Text,
    /// `", "` between operands.
    OperandSeparator,
}

/// One display token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Display class.
    pub kind: TokenKind,
    /// Rendered text.
    pub text: String,
    /// Numeric value for registers (id), integers and addresses; zero otherwise.
    pub value: u64,
}

impl Token {
    /// Creates a token.
    pub fn new(kind: TokenKind, text: impl Into<String>, value: u64) -> Self {
        Self {
            kind,
            text: text.into(),
            value,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Concatenates the text of a token stream.
pub fn to_text(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

/// Renders the instruction at `addr`.
///
/// # Arguments
///
/// * `bytes` - Bytes starting at the instruction; may extend past it.
/// * `addr`  - Address of the first byte.
/// * `store` - Extension state used to resolve memory and SFR operands.
///
/// # Returns
///
/// The tokens and the instruction length.
///
/// # Errors
///
/// `UnknownOpcode` for bytes outside the instruction set, `Truncated` when `bytes` is
/// shorter than the encoding.
pub fn disassemble(
    bytes: &[u8],
    addr: u64,
    store: &ExtensionStore,
) -> Result<(Vec<Token>, usize), LiftError> {
    let (info, w) = fetch(bytes, addr)?;
    let mut out = Writer {
        tokens: Vec::with_capacity(8),
        resolver: Resolver::new(store),
        addr,
        width: info.width,
        operands: 0,
    };
    out.mnemonic(mnemonic(info, w));
    operands(&mut out, info, w);

    trace!(addr, tokens = out.tokens.len(), "rendered");
    Ok((out.tokens, info.length()))
}

/// Mnemonic with the extension sub-opcode folded in.
fn mnemonic(info: &OpcodeInfo, w: u32) -> &'static str {
    match info.family {
        Family::ExtAtomic if w.ext_subop() == EXTR_SUBOP => "extr",
        Family::ExtImm | Family::ExtReg => EXT_MNEMONICS[w.ext_subop() as usize],
        _ => info.mnemonic,
    }
}

// ── Token writer ─────────────────────────────────────────────

struct Writer<'a> {
    tokens: Vec<Token>,
    resolver: Resolver<'a>,
    addr: u64,
    width: Width,
    operands: usize,
}

impl Writer<'_> {
    fn push(&mut self, kind: TokenKind, text: impl Into<String>, value: u64) {
        self.tokens.push(Token::new(kind, text, value));
    }

    fn mnemonic(&mut self, name: &str) {
        self.push(TokenKind::Instruction, name, 0);
    }

    fn text(&mut self, text: &str) {
        self.push(TokenKind::Text, text, 0);
    }

    /// Starts the next operand: a space after the mnemonic, a separator afterwards.
    fn begin_operand(&mut self) {
        if self.operands == 0 {
            self.text(" ");
        } else {
            self.push(TokenKind::OperandSeparator, ", ", 0);
        }
        self.operands += 1;
    }

    fn reg(&mut self, reg: Reg) {
        self.begin_operand();
        self.reg_token(reg);
    }

    fn reg_token(&mut self, reg: Reg) {
        self.push(TokenKind::Register, reg.name(), u64::from(reg.0));
    }

    fn imm(&mut self, value: u64) {
        self.begin_operand();
        self.text("#");
        self.push(TokenKind::Integer, format!("{value:#x}"), value);
    }

    fn address(&mut self, value: u64) {
        self.begin_operand();
        self.address_token(value);
    }

    fn address_token(&mut self, value: u64) {
        self.push(TokenKind::PossibleAddress, format!("{value:#x}"), value);
    }

    fn condition(&mut self, cond: Condition) {
        self.begin_operand();
        self.text(cond.name());
    }

    /// Register-short operand at `width`.
    fn short_at(&mut self, code: u8, width: Width) {
        self.begin_operand();
        self.target(self.resolver.resolve_register_short(self.addr, code), width);
    }

    fn short(&mut self, code: u8) {
        self.short_at(code, self.width);
    }

    fn target(&mut self, target: ShortTarget, width: Width) {
        match target {
            ShortTarget::Gpr(n) => self.reg_token(gpr(n, width)),
            ShortTarget::Mem(addr) => self.address_token(u64::from(addr)),
        }
    }

    fn mem(&mut self, w: u32) {
        let physical = self.resolver.resolve_memory_operand(self.addr, w.data16());
        self.address(physical);
    }

    /// `cell.pos`.
    fn bit(&mut self, bitoff: u8, pos: u8) {
        self.begin_operand();
        let cell = self.resolver.resolve_bit_offset(self.addr, bitoff);
        self.target(cell, Width::Word);
        self.text(".");
        self.push(TokenKind::Integer, pos.to_string(), u64::from(pos));
    }

    /// `[rN]`, with optional pre-decrement, post-increment or displacement.
    fn indirect(&mut self, n: u8, shape: Indirect) {
        self.begin_operand();
        self.text(if shape == Indirect::PreDec { "[-" } else { "[" });
        self.reg_token(Reg::word(n));
        match shape {
            Indirect::PostInc => self.text("+]"),
            Indirect::Disp(disp) => {
                self.text("+#");
                self.push(TokenKind::Integer, format!("{disp:#x}"), u64::from(disp));
                self.text("]");
            }
            Indirect::Plain | Indirect::PreDec => self.text("]"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Indirect {
    Plain,
    PreDec,
    PostInc,
    Disp(u16),
}

const fn gpr(n: u8, width: Width) -> Reg {
    match width {
        Width::Byte => Reg::byte(n),
        _ => Reg::word(n),
    }
}

// ── Operand layouts ──────────────────────────────────────────

fn operands(out: &mut Writer<'_>, info: &OpcodeInfo, w: u32) {
    let width = info.width;
    let (n, m) = (w.n_high(), w.n_low());
    let extend = matches!(info.family, Family::Movbs | Family::Movbz);

    match info.form {
        Form::RegReg => {
            out.reg(gpr(n, width));
            out.reg(gpr(m, width));
        }
        Form::RegIndirect => {
            out.reg(gpr(n, width));
            match w.rwi_mode() {
                0b10 => out.indirect(w.rwi(), Indirect::Plain),
                0b11 => out.indirect(w.rwi(), Indirect::PostInc),
                _ => out.imm(u64::from(w.data3())),
            }
        }
        Form::RegImm => {
            out.short(w.byte1());
            if info.is_byte() {
                out.imm(u64::from(w.byte2()));
            } else {
                out.imm(u64::from(w.data16()));
            }
        }
        // MOVBS/MOVBZ write a word register from a byte in memory.
        Form::RegMem => {
            out.short_at(w.byte1(), if extend { Width::Word } else { width });
            out.mem(w);
        }
        Form::MemReg => {
            out.mem(w);
            out.short(w.byte1());
        }
        Form::RegData4 => {
            out.reg(gpr(m, width));
            out.imm(u64::from(n));
        }
        Form::RwMem => {
            out.reg(Reg::word(m));
            out.mem(w);
        }
        Form::RwImm16 => {
            out.reg(Reg::word(m));
            out.imm(u64::from(w.data16()));
        }
        Form::Single => out.reg(gpr(n, width)),
        Form::ShortReg => out.short(w.byte1()),
        Form::BitOff => out.bit(w.byte1(), w.opcode_high()),
        Form::BitPair => {
            out.bit(w.byte2(), w.z_pos());
            out.bit(w.byte1(), w.q_pos());
        }
        Form::BitField => {
            let (mask, data) = if info.family == Family::Bfldh {
                (w.byte3(), w.byte2())
            } else {
                (w.byte2(), w.byte3())
            };
            out.begin_operand();
            let cell = out.resolver.resolve_bit_offset(out.addr, w.byte1());
            out.target(cell, Width::Word);
            out.imm(u64::from(mask));
            out.imm(u64::from(data));
        }
        Form::BitRel => {
            out.bit(w.byte1(), w.q_pos());
            out.address(bit_rel_target(out.addr, w));
        }
        Form::WordByte => {
            out.reg(Reg::word(m));
            out.reg(Reg::byte(n));
        }
        Form::IndMem => {
            out.indirect(m, Indirect::Plain);
            out.mem(w);
        }
        Form::MemInd => {
            out.mem(w);
            out.indirect(m, Indirect::Plain);
        }
        Form::PreDec => {
            out.indirect(m, Indirect::PreDec);
            out.reg(gpr(n, width));
        }
        Form::PostInc => {
            out.reg(gpr(n, width));
            out.indirect(m, Indirect::PostInc);
        }
        Form::RegInd => {
            out.reg(gpr(n, width));
            out.indirect(m, Indirect::Plain);
        }
        Form::IndReg => {
            out.indirect(m, Indirect::Plain);
            out.reg(gpr(n, width));
        }
        Form::IndInd => {
            out.indirect(n, Indirect::Plain);
            out.indirect(m, Indirect::Plain);
        }
        Form::IncInd => {
            out.indirect(n, Indirect::PostInc);
            out.indirect(m, Indirect::Plain);
        }
        Form::IndInc => {
            out.indirect(n, Indirect::Plain);
            out.indirect(m, Indirect::PostInc);
        }
        Form::RegDisp => {
            out.reg(gpr(n, width));
            out.indirect(m, Indirect::Disp(w.data16()));
        }
        Form::DispReg => {
            out.indirect(m, Indirect::Disp(w.data16()));
            out.reg(gpr(n, width));
        }
        Form::Rel8 => {
            if info.family == Family::Jmpr {
                out.condition(Condition::from_bits(w.opcode_high()));
            }
            out.address(rel_target(out.addr, w));
        }
        Form::CondCaddr => {
            out.condition(cond_high(w));
            out.address(caddr_target(out.addr, w));
        }
        Form::SegCaddr => {
            let seg = w.byte1();
            out.begin_operand();
            out.push(TokenKind::Integer, format!("{seg:#x}"), u64::from(seg));
            out.begin_operand();
            out.push(
                TokenKind::PossibleAddress,
                format!("{:#x}", w.data16()),
                seg_target(w),
            );
        }
        Form::CondInd => {
            out.condition(cond_high(w));
            out.indirect(m, Indirect::Plain);
        }
        Form::RegCaddr => {
            out.short(w.byte1());
            out.address(caddr_target(out.addr, w));
        }
        Form::Trap7 => out.imm(u64::from(trap7(w))),
        Form::Implied | Form::System => {}
        Form::ExtCount => out.imm(u64::from(w.ext_count())),
        Form::ExtImm => {
            let operand = if w.ext_subop() & 1 == 0 {
                u64::from(w.byte2())
            } else {
                u64::from(w.page10())
            };
            out.imm(operand);
            out.imm(u64::from(w.ext_count()));
        }
        Form::ExtReg => {
            out.reg(Reg::word(m));
            out.imm(u64::from(w.ext_count()));
        }
    }
}
