//! Instruction-set tests.




/// Static opcode table contents.
pub mod opcode_table;
