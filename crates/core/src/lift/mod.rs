//! Semantic Lifter.
//!
//! Turns one instruction into a sequence of IR operations. Dispatch is data-driven: the opcode
//! table names the family and operand form, and one routine per family lifts every form it
//! owns. Routines are organized into submodules by category:
//! - `arith`:   ADD/ADDC/SUB/SUBC/AND/OR/XOR/CMP, CMPD/CMPI, NEG/CPL, PRIOR
//! - `muldiv`:  MUL/MULU, DIV/DIVU/DIVL/DIVLU
//! - `shift`:   ROL/ROR/SHL/SHR/ASHR
//! - `bits`:    BSET/BCLR, BAND/BOR/BXOR/BMOV/BMOVN, BCMP, BFLDH/BFLDL
//! - `moves`:   MOV/MOVB in every addressing form, MOVBS/MOVBZ
//! - `stack`:   PUSH/POP/SCXT
//! - `branch`:  jumps, calls, traps and returns
//! - `system`:  NOP and the protected power/watchdog instructions
//! - `ext`:     ATOMIC/EXTR/EXTS/EXTP and their register forms
//!
//! # Extension state
//!
//! After the operations of an instruction are built, the lifter runs the propagation rule at
//! the instruction's own address, then lets an extension instruction record its override at
//! the following address. A failed lift appends nothing and leaves the store untouched.

mod arith;
mod bits;
mod branch;
mod ext;
mod moves;
mod muldiv;
mod shift;
mod stack;
mod system;

use tracing::{debug, trace};

use crate::common::LiftError;
use crate::config::CpuConfig;
use crate::il::{BinOp, Expr, IlFunction, IlOp, Label, LabelLookup, Width};
use crate::isa::decode;
use crate::isa::family::{Family, OpcodeInfo};
use crate::isa::flags::FlagWrite;
use crate::isa::instruction::InstructionBits;
use crate::isa::registers::Reg;
use crate::resolve::{Resolver, ShortTarget, constant_register};
use crate::state::ExtensionStore;

/// Lifts instructions against one extension store and CPU configuration.
///
/// The lifter is cheap to construct and holds only borrows, so hosts can create one per
/// worker thread over a shared store.
#[derive(Clone, Copy, Debug)]
pub struct Lifter<'a> {
    store: &'a ExtensionStore,
    config: &'a CpuConfig,
}

impl<'a> Lifter<'a> {
    /// Creates a lifter over `store` for the given CPU variant configuration.
    pub const fn new(store: &'a ExtensionStore, config: &'a CpuConfig) -> Self {
        Self { store, config }
    }

    /// Extension store read and updated by this lifter.
    pub const fn store(&self) -> &'a ExtensionStore {
        self.store
    }

    /// CPU configuration in use.
    pub const fn config(&self) -> &'a CpuConfig {
        self.config
    }

    /// Lifts the instruction at `addr` and appends its operations to `il`.
    ///
    /// # Arguments
    ///
    /// * `bytes`  - Bytes starting at the instruction; may extend past it.
    /// * `addr`   - Address of the first byte.
    /// * `labels` - Host label lookup used for direct and conditional branches.
    /// * `il`     - Function the operations are appended to.
    ///
    /// # Returns
    ///
    /// The number of bytes consumed, which always equals the classifier's length.
    ///
    /// # Errors
    ///
    /// Fails for unknown opcodes, short buffers, unmodelled conditional/indirect forms and
    /// branch targets the host has no label for. Nothing is appended on failure.
    pub fn lift(
        &self,
        bytes: &[u8],
        addr: u64,
        labels: &dyn LabelLookup,
        il: &mut IlFunction,
    ) -> Result<usize, LiftError> {
        let (info, w) = decode::fetch(bytes, addr)?;
        let site = Site {
            addr,
            w,
            info,
            resolver: Resolver::new(self.store),
            config: self.config,
            labels,
        };

        let mut ops = Vec::new();
        dispatch(&site, &mut ops)?;

        let length = info.length();
        self.store.propagate(addr, length);
        if let Some(extension) = ext::decode_override(info, w) {
            extension.record(self.store, site.next());
        }

        trace!(addr, mnemonic = info.mnemonic, ops = ops.len(), "lifted");
        il.extend(ops);
        Ok(length)
    }
}

fn dispatch(site: &Site<'_>, ops: &mut Vec<IlOp>) -> Result<(), LiftError> {
    use Family as F;

    match site.info.family {
        // Arithmetic and logic
        F::Add | F::Addc | F::Sub | F::Subc | F::Cmp | F::Xor | F::And | F::Or => {
            arith::lift_binary(site, ops);
        }
        F::Cmpd1 | F::Cmpd2 | F::Cmpi1 | F::Cmpi2 => arith::lift_compare_step(site, ops),
        F::Neg | F::Cpl => arith::lift_unary(site, ops),
        F::Prior => arith::lift_prior(site, ops),

        // Multiply and divide
        F::Mul | F::Mulu => muldiv::lift_multiply(site, ops),
        F::Div | F::Divu | F::Divl | F::Divlu => muldiv::lift_divide(site, ops),

        // Shifts and rotates
        F::Rol | F::Ror | F::Shl | F::Shr | F::Ashr => shift::lift(site, ops),

        // Bit manipulation
        F::Bclr | F::Bset => bits::lift_single(site, ops),
        F::Band | F::Bor | F::Bxor | F::Bmov | F::Bmovn => bits::lift_pair(site, ops),
        F::Bcmp => bits::lift_compare(site, ops),
        F::Bfldh | F::Bfldl => bits::lift_field(site, ops),

        // Control transfer
        F::Jb | F::Jbc | F::Jnb | F::Jnbs => return branch::lift_bit_branch(site, ops),
        F::Jmpr | F::Jmpa | F::Jmps | F::Jmpi => return branch::lift_jump(site, ops),
        F::Callr | F::Calla | F::Calls | F::Calli | F::Trap => {
            return branch::lift_call(site, ops);
        }
        F::Pcall => return Err(site.unsupported("pcall is not modelled")),
        F::Ret | F::Reti | F::Rets | F::Retp => branch::lift_return(site, ops),

        // Data movement
        F::Mov => moves::lift_mov(site, ops),
        F::Movbs | F::Movbz => moves::lift_extend(site, ops),
        F::Scxt | F::Push | F::Pop => stack::lift(site, ops),

        // System and extension
        F::Nop | F::Idle | F::Pwrdn | F::Srst | F::Srvwdt | F::Diswdt | F::Einit => {
            system::lift(site, ops);
        }
        F::ExtAtomic | F::ExtImm | F::ExtReg => ext::lift(site, ops),
    }
    Ok(())
}

// ── Per-instruction context ──────────────────────────────────

/// Everything a family routine needs to lift one instruction.
pub(crate) struct Site<'a> {
    /// Address of the instruction.
    pub addr: u64,
    /// Packed instruction word.
    pub w: u32,
    /// Static descriptor of the opcode.
    pub info: &'static OpcodeInfo,
    /// Operand resolver over the lifter's store.
    pub resolver: Resolver<'a>,
    /// CPU configuration (stack pointer, link register).
    pub config: &'a CpuConfig,
    /// Host label lookup.
    pub labels: &'a dyn LabelLookup,
}

impl Site<'_> {
    /// Operand width of the opcode.
    pub const fn width(&self) -> Width {
        self.info.width
    }

    /// Flag-write policy of the opcode's family.
    pub const fn flags(&self) -> Option<FlagWrite> {
        self.info.flag_write()
    }

    /// Address of the next sequential instruction.
    pub const fn next(&self) -> u64 {
        self.addr.wrapping_add(self.info.length() as u64)
    }

    /// GPR named by a 4-bit field at the opcode's width.
    pub const fn gpr(&self, n: u8) -> Reg {
        gpr(n, self.width())
    }

    /// Resolves the register-short address in byte 1.
    pub fn short(&self, code: u8) -> ShortTarget {
        self.resolver.resolve_register_short(self.addr, code)
    }

    /// Resolves a bit offset to the word holding the bit.
    pub fn bit_cell(&self, bitoff: u8) -> ShortTarget {
        self.resolver.resolve_bit_offset(self.addr, bitoff)
    }

    /// Physical address of the 16-bit memory operand in bytes 2-3.
    pub fn mem_operand(&self) -> Expr {
        Expr::ptr(
            self.resolver
                .resolve_memory_operand(self.addr, self.w.data16()),
        )
    }

    /// Address expression of `[Rw]` or `[Rw+#disp]`.
    pub fn indirect(&self, rw: u8, disp: Option<u16>) -> Expr {
        self.resolver
            .resolve_indirect(self.addr, Reg::word(rw), disp)
    }

    /// Label of the basic block at `target`.
    pub fn label(&self, target: u64) -> Result<Label, LiftError> {
        self.labels.label_for(target).ok_or_else(|| {
            debug!(addr = self.addr, target, "no label for branch target");
            LiftError::UnresolvedLabel {
                addr: self.addr,
                target,
            }
        })
    }

    /// Error for a recognised but unmodelled encoding.
    pub fn unsupported(&self, detail: &'static str) -> LiftError {
        debug!(addr = self.addr, mnemonic = self.info.mnemonic, detail, "unsupported variant");
        LiftError::UnsupportedVariant {
            addr: self.addr,
            mnemonic: self.info.mnemonic,
            detail,
        }
    }
}

// ── Operand helpers ──────────────────────────────────────────

/// GPR named by a 4-bit field at `width`.
pub(crate) const fn gpr(n: u8, width: Width) -> Reg {
    match width {
        Width::Byte => Reg::byte(n),
        _ => Reg::word(n),
    }
}

/// Value of a register-short or bit-cell operand.
///
/// Constant SFRs fold to their fixed value instead of a load.
pub(crate) fn read_short(target: ShortTarget, width: Width) -> Expr {
    match target {
        ShortTarget::Gpr(n) => Expr::reg(gpr(n, width), width),
        ShortTarget::Mem(addr) => match constant_register(addr) {
            Some(value) => Expr::konst(u64::from(value), width),
            None => Expr::load(Expr::ptr(u64::from(addr)), width),
        },
    }
}

/// Write of `value` to a register-short or bit-cell operand.
pub(crate) fn write_short(
    target: ShortTarget,
    width: Width,
    value: Expr,
    flags: Option<FlagWrite>,
) -> IlOp {
    match target {
        ShortTarget::Gpr(n) => IlOp::SetReg {
            reg: gpr(n, width),
            width,
            value,
            flags,
        },
        ShortTarget::Mem(addr) => IlOp::Store {
            addr: Expr::ptr(u64::from(addr)),
            width,
            value,
            flags,
        },
    }
}

/// `reg = reg + delta` (or `- delta`) without flag effects.
pub(crate) fn step_register(reg: Reg, width: Width, delta: i8) -> IlOp {
    let (op, amount) = if delta < 0 {
        (BinOp::Sub, u64::from(delta.unsigned_abs()))
    } else {
        (BinOp::Add, delta as u64)
    };
    IlOp::SetReg {
        reg,
        width,
        value: Expr::binary(op, width, Expr::reg(reg, width), Expr::konst(amount, width)),
        flags: None,
    }
}
