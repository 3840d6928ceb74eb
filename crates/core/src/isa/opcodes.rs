//! Opcode byte constants.
//!
//! Named after the assembler form they encode. Families whose low nibble carries an operand
//! (BCLR/BSET bit position, JMPR condition) are listed by their zero-nibble base value.

// ── Arithmetic and logic: word forms ─────────────────────────

/// `add Rwn, Rwm`
pub const ADD_RR: u8 = 0x00;
/// `add reg, mem`
pub const ADD_REG_MEM: u8 = 0x02;
/// `add mem, reg`
pub const ADD_MEM_REG: u8 = 0x04;
/// `add reg, #data16`
pub const ADD_REG_IMM: u8 = 0x06;
/// `add Rwn, [Rwi]` / `[Rwi+]` / `#data3`
pub const ADD_R_IND: u8 = 0x08;
/// `addc Rwn, Rwm`
pub const ADDC_RR: u8 = 0x10;
/// `sub Rwn, Rwm`
pub const SUB_RR: u8 = 0x20;
/// `subc Rwn, Rwm`
pub const SUBC_RR: u8 = 0x30;
/// `cmp Rwn, Rwm`
pub const CMP_RR: u8 = 0x40;
/// `xor Rwn, Rwm`
pub const XOR_RR: u8 = 0x50;
/// `and Rwn, Rwm`
pub const AND_RR: u8 = 0x60;
/// `or Rwn, Rwm`
pub const OR_RR: u8 = 0x70;

// ── Compare and increment/decrement ──────────────────────────

/// `cmpi1 Rwn, #data4`
pub const CMPI1_IMM4: u8 = 0x80;
/// `cmpi2 Rwn, #data4`
pub const CMPI2_IMM4: u8 = 0x90;
/// `cmpd1 Rwn, #data4`
pub const CMPD1_IMM4: u8 = 0xA0;
/// `cmpd2 Rwn, #data4`
pub const CMPD2_IMM4: u8 = 0xB0;

// ── Unary and multiply/divide ────────────────────────────────

/// `neg Rwn`
pub const NEG: u8 = 0x81;
/// `cpl Rwn`
pub const CPL: u8 = 0x91;
/// `negb Rbn`
pub const NEGB: u8 = 0xA1;
/// `cplb Rbn`
pub const CPLB: u8 = 0xB1;
/// `mul Rwn, Rwm`
pub const MUL: u8 = 0x0B;
/// `mulu Rwn, Rwm`
pub const MULU: u8 = 0x1B;
/// `prior Rwn, Rwm`
pub const PRIOR: u8 = 0x2B;
/// `div Rwn`
pub const DIV: u8 = 0x4B;
/// `divu Rwn`
pub const DIVU: u8 = 0x5B;
/// `divl Rwn`
pub const DIVL: u8 = 0x6B;
/// `divlu Rwn`
pub const DIVLU: u8 = 0x7B;

// ── Shifts and rotates ───────────────────────────────────────

/// `rol Rwn, Rwm`
pub const ROL_RR: u8 = 0x0C;
/// `rol Rwn, #data4`
pub const ROL_IMM: u8 = 0x1C;
/// `ror Rwn, Rwm`
pub const ROR_RR: u8 = 0x2C;
/// `ror Rwn, #data4`
pub const ROR_IMM: u8 = 0x3C;
/// `shl Rwn, Rwm`
pub const SHL_RR: u8 = 0x4C;
/// `shl Rwn, #data4`
pub const SHL_IMM: u8 = 0x5C;
/// `shr Rwn, Rwm`
pub const SHR_RR: u8 = 0x6C;
/// `shr Rwn, #data4`
pub const SHR_IMM: u8 = 0x7C;
/// `ashr Rwn, Rwm`
pub const ASHR_RR: u8 = 0xAC;
/// `ashr Rwn, #data4`
pub const ASHR_IMM: u8 = 0xBC;

// ── Bit manipulation ─────────────────────────────────────────

/// `bclr bitaddr.q`, bit position in the high nibble.
pub const BCLR: u8 = 0x0E;
/// `bset bitaddr.q`, bit position in the high nibble.
pub const BSET: u8 = 0x0F;
/// `bfldl bitoff, #mask8, #data8`
pub const BFLDL: u8 = 0x0A;
/// `bfldh bitoff, #mask8, #data8`
pub const BFLDH: u8 = 0x1A;
/// `bcmp bitaddrZ.z, bitaddrQ.q`
pub const BCMP: u8 = 0x2A;
/// `bmovn bitaddrZ.z, bitaddrQ.q`
pub const BMOVN: u8 = 0x3A;
/// `bmov bitaddrZ.z, bitaddrQ.q`
pub const BMOV: u8 = 0x4A;
/// `bor bitaddrZ.z, bitaddrQ.q`
pub const BOR: u8 = 0x5A;
/// `band bitaddrZ.z, bitaddrQ.q`
pub const BAND: u8 = 0x6A;
/// `bxor bitaddrZ.z, bitaddrQ.q`
pub const BXOR: u8 = 0x7A;

// ── Control transfer ─────────────────────────────────────────

/// `jb bitaddr.q, rel`
pub const JB: u8 = 0x8A;
/// `jnb bitaddr.q, rel`
pub const JNB: u8 = 0x9A;
/// `jbc bitaddr.q, rel`
pub const JBC: u8 = 0xAA;
/// `jnbs bitaddr.q, rel`
pub const JNBS: u8 = 0xBA;
/// `calla cc, caddr`
pub const CALLA: u8 = 0xCA;
/// `calls seg, caddr`
pub const CALLS: u8 = 0xDA;
/// `jmpa cc, caddr`
pub const JMPA: u8 = 0xEA;
/// `jmps seg, caddr`
pub const JMPS: u8 = 0xFA;
/// `jmpr cc, rel`, condition in the high nibble.
pub const JMPR: u8 = 0x0D;
/// `trap #trap7`
pub const TRAP: u8 = 0x9B;
/// `calli cc, [Rwn]`
pub const CALLI: u8 = 0xAB;
/// `callr rel`
pub const CALLR: u8 = 0xBB;
/// `ret`
pub const RET: u8 = 0xCB;
/// `rets`
pub const RETS: u8 = 0xDB;
/// `retp reg`
pub const RETP: u8 = 0xEB;
/// `reti`
pub const RETI: u8 = 0xFB;
/// `jmpi cc, [Rwn]`
pub const JMPI: u8 = 0x9C;
/// `pcall reg, caddr`
pub const PCALL: u8 = 0xE2;

// ── Data movement ────────────────────────────────────────────

/// `movbz Rwn, Rbm`
pub const MOVBZ_RR: u8 = 0xC0;
/// `movbz reg, mem`
pub const MOVBZ_REG_MEM: u8 = 0xC2;
/// `movbz mem, reg`
pub const MOVBZ_MEM_REG: u8 = 0xC5;
/// `movbs Rwn, Rbm`
pub const MOVBS_RR: u8 = 0xD0;
/// `movbs reg, mem`
pub const MOVBS_REG_MEM: u8 = 0xD2;
/// `movbs mem, reg`
pub const MOVBS_MEM_REG: u8 = 0xD5;
/// `mov Rwn, #data4`
pub const MOV_IMM4: u8 = 0xE0;
/// `mov Rwn, Rwm`
pub const MOV_RR: u8 = 0xF0;
/// `mov [Rwn], mem`
pub const MOV_IND_MEM: u8 = 0x84;
/// `mov [-Rwm], Rwn`
pub const MOV_PREDEC: u8 = 0x88;
/// `mov mem, [Rwn]`
pub const MOV_MEM_IND: u8 = 0x94;
/// `mov Rwn, [Rwm+]`
pub const MOV_POSTINC: u8 = 0x98;
/// `mov Rwn, [Rwm]`
pub const MOV_R_IND: u8 = 0xA8;
/// `mov [Rwm], Rwn`
pub const MOV_IND_R: u8 = 0xB8;
/// `mov [Rwm+#data16], Rwn`
pub const MOV_DISP_R: u8 = 0xC4;
/// `mov [Rwn], [Rwm]`
pub const MOV_IND_IND: u8 = 0xC8;
/// `mov Rwn, [Rwm+#data16]`
pub const MOV_R_DISP: u8 = 0xD4;
/// `mov [Rwn+], [Rwm]`
pub const MOV_INC_IND: u8 = 0xD8;
/// `mov reg, #data16`
pub const MOV_REG_IMM: u8 = 0xE6;
/// `mov [Rwn], [Rwm+]`
pub const MOV_IND_INC: u8 = 0xE8;
/// `mov reg, mem`
pub const MOV_REG_MEM: u8 = 0xF2;
/// `mov mem, reg`
pub const MOV_MEM_REG: u8 = 0xF6;
/// `scxt reg, #data16`
pub const SCXT_IMM: u8 = 0xC6;
/// `scxt reg, mem`
pub const SCXT_MEM: u8 = 0xD6;
/// `push reg`
pub const PUSH: u8 = 0xEC;
/// `pop reg`
pub const POP: u8 = 0xFC;

// ── System and extension ─────────────────────────────────────

/// `idle`
pub const IDLE: u8 = 0x87;
/// `pwrdn`
pub const PWRDN: u8 = 0x97;
/// `diswdt`
pub const DISWDT: u8 = 0xA5;
/// `srvwdt`
pub const SRVWDT: u8 = 0xA7;
/// `einit`
pub const EINIT: u8 = 0xB5;
/// `srst`
pub const SRST: u8 = 0xB7;
/// `nop`
pub const NOP: u8 = 0xCC;
/// `atomic #irang2` / `extr #irang2`
pub const EXT_ATOMIC: u8 = 0xD1;
/// `exts|extp|extsr|extpr #pag/#seg, #irang2`
pub const EXT_IMM: u8 = 0xD7;
/// `exts|extp|extsr|extpr Rwm, #irang2`
pub const EXT_REG: u8 = 0xDC;
