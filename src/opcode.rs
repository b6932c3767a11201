//! Opcode abstractions, decoding and constants.
use crate::{
    definitions::memory::{self, ADDRESS_MASK},
    OpcodeError,
};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single nibble
const NIBBLE_SIZE: u16 = 0x4;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # assert_eq!(
/// #    Err(OpcodeError::MemoryInvalid { pointer, len: SPLIT_OPCODE.len() }),
/// #    build_opcode(&SPLIT_OPCODE, pointer)
/// # );
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// the opcode family, so the highest nibble `T` of `TXYN`
    fn t(&self) -> u8;

    /// the address part `NNN` of `TNNN`
    fn nnn(&self) -> u16;

    /// the register `X` and the constant `NN` of `TXNN`
    fn xnn(&self) -> (usize, u8);

    /// the registers `X`, `Y` and the sub type `N` of `TXYN`
    fn xyn(&self) -> (usize, usize, u8);

    /// the register `X` of `TXTT`
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> u8 {
        ((self & OPCODE_MASK_F000) >> (3 * NIBBLE_SIZE)) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> u16 {
        self & OPCODE_MASK_0FFF
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8) {
        (self.x(), (self & OPCODE_MASK_00FF) as u8)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, u8) {
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        let y = ((self & MASK) >> NIBBLE_SIZE) as usize;
        let n = (self & OPCODE_MASK_000F) as u8;
        (self.x(), y, n)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> (2 * NIBBLE_SIZE)) as usize
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next instruction
    Next,
    /// Will skip over the next instruction
    Skip,
    /// Will simply move the program counter to the given location,
    /// the location is wrapped into the ram.
    Jump(u16),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Applies the step onto the given program counter.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(0x202, ProgramCounterStep::Next.apply(0x200));
    /// assert_eq!(0x204, ProgramCounterStep::Skip.apply(0x200));
    /// assert_eq!(0x200, ProgramCounterStep::None.apply(0x200));
    /// assert_eq!(0x0FE, ProgramCounterStep::Jump(0x10FE).apply(0x200));
    /// ```
    #[inline]
    pub fn apply(&self, program_counter: u16) -> u16 {
        const SIZE: u16 = memory::opcodes::SIZE as u16;
        match *self {
            ProgramCounterStep::None => program_counter,
            ProgramCounterStep::Next => program_counter.wrapping_add(SIZE),
            ProgramCounterStep::Skip => program_counter.wrapping_add(2 * SIZE),
            ProgramCounterStep::Jump(pointer) => pointer & ADDRESS_MASK,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Represents a command from the interpreter up to the driver.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The chip is waiting for the next key press
    Wait,
    /// The display has changed and should be redrawn
    Draw,
}

/// All the instructions the chip understands, `X` and `Y` are register
/// indices, `N`, `NN` are constants and `NNN` is an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `0NNN` - Calls machine code routine at `NNN`, ignored by this interpreter.
    Sys { nnn: u16 },
    /// `00E0` - Clears the screen.
    Clear,
    /// `00EE` - Returns from a subroutine.
    Return,
    /// `1NNN` - Jumps to address `NNN`.
    Jump { nnn: u16 },
    /// `2NNN` - Calls subroutine at `NNN`.
    Call { nnn: u16 },
    /// `3XNN` - Skips the next instruction if `VX` equals `NN`.
    SkipEqualConst { x: usize, nn: u8 },
    /// `4XNN` - Skips the next instruction if `VX` doesn't equal `NN`.
    SkipNotEqualConst { x: usize, nn: u8 },
    /// `5XY0` - Skips the next instruction if `VX` equals `VY`.
    SkipEqualRegister { x: usize, y: usize },
    /// `6XNN` - Sets `VX` to `NN`.
    SetConst { x: usize, nn: u8 },
    /// `7XNN` - Adds `NN` to `VX`. (Carry flag is not changed)
    AddConst { x: usize, nn: u8 },
    /// `8XY0` - Sets `VX` to the value of `VY`.
    Assign { x: usize, y: usize },
    /// `8XY1` - Sets `VX` to `VX | VY`.
    Or { x: usize, y: usize },
    /// `8XY2` - Sets `VX` to `VX & VY`.
    And { x: usize, y: usize },
    /// `8XY3` - Sets `VX` to `VX ^ VY`.
    Xor { x: usize, y: usize },
    /// `8XY4` - Adds `VY` to `VX`. `VF` is set to `1` when there's a carry, and to `0` when there isn't.
    AddRegister { x: usize, y: usize },
    /// `8XY5` - `VY` is subtracted from `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    Subtract { x: usize, y: usize },
    /// `8XY6` - Stores the least significant bit of `VX` in `VF` and then shifts `VX` to the right by `1`.
    ///
    /// `VY` is ignored, `VX` is shifted in place.
    ShiftRight { x: usize, y: usize },
    /// `8XY7` - Sets `VX` to `VY` minus `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    ReverseSubtract { x: usize, y: usize },
    /// `8XYE` - Stores the most significant bit of `VX` in `VF` and then shifts `VX` to the left by `1`.
    ///
    /// `VY` is ignored, `VX` is shifted in place.
    ShiftLeft { x: usize, y: usize },
    /// `9XY0` - Skips the next instruction if `VX` doesn't equal `VY`.
    SkipNotEqualRegister { x: usize, y: usize },
    /// `ANNN` - Sets `I` to the address `NNN`.
    SetIndex { nnn: u16 },
    /// `BNNN` - Jumps to the address `NNN` plus `V0`.
    JumpOffset { nnn: u16 },
    /// `CXNN` - Sets `VX` to a random number and `NN`.
    Random { x: usize, nn: u8 },
    /// `DXYN` - Draws a sprite at coordinate `(VX, VY)` that has a width of `8` pixels and a height of `N` pixels.
    Draw { x: usize, y: usize, n: u8 },
    /// `EX9E` - Skips the next instruction if the key stored in `VX` is pressed.
    SkipKeyPressed { x: usize },
    /// `EXA1` - Skips the next instruction if the key stored in `VX` isn't pressed.
    SkipKeyNotPressed { x: usize },
    /// `FX07` - Sets `VX` to the value of the delay timer.
    GetDelayTimer { x: usize },
    /// `FX0A` - A key press is awaited, and then stored in `VX`.
    AwaitKeyPress { x: usize },
    /// `FX15` - Sets the delay timer to `VX`.
    SetDelayTimer { x: usize },
    /// `FX18` - Sets the sound timer to `VX`.
    SetSoundTimer { x: usize },
    /// `FX1E` - Adds `VX` to `I`. `VF` is not affected.
    AddIndex { x: usize },
    /// `FX29` - Sets `I` to the location of the font glyph for the character in `VX`.
    SetIndexToSprite { x: usize },
    /// `FX33` - Stores the binary-coded decimal representation of `VX` at `I`, `I+1` and `I+2`.
    StoreBcd { x: usize },
    /// `FX55` - Stores `V0` to `VX` (including `VX`) in memory starting at address `I`.
    StoreRegisters { x: usize },
    /// `FX65` - Fills `V0` to `VX` (including `VX`) with values from memory starting at address `I`.
    LoadRegisters { x: usize },
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let nnn = value.nnn();
        let (x, nn) = value.xnn();
        let (_, y, n) = value.xyn();

        let instruction = match (value.t(), n) {
            (0x0, _) => match nn {
                0xE0 => Instruction::Clear,
                0xEE => Instruction::Return,
                _ => Instruction::Sys { nnn },
            },
            (0x1, _) => Instruction::Jump { nnn },
            (0x2, _) => Instruction::Call { nnn },
            (0x3, _) => Instruction::SkipEqualConst { x, nn },
            (0x4, _) => Instruction::SkipNotEqualConst { x, nn },
            (0x5, _) => Instruction::SkipEqualRegister { x, y },
            (0x6, _) => Instruction::SetConst { x, nn },
            (0x7, _) => Instruction::AddConst { x, nn },
            (0x8, 0x0) => Instruction::Assign { x, y },
            (0x8, 0x1) => Instruction::Or { x, y },
            (0x8, 0x2) => Instruction::And { x, y },
            (0x8, 0x3) => Instruction::Xor { x, y },
            (0x8, 0x4) => Instruction::AddRegister { x, y },
            (0x8, 0x5) => Instruction::Subtract { x, y },
            (0x8, 0x6) => Instruction::ShiftRight { x, y },
            (0x8, 0x7) => Instruction::ReverseSubtract { x, y },
            (0x8, 0xE) => Instruction::ShiftLeft { x, y },
            (0x9, _) => Instruction::SkipNotEqualRegister { x, y },
            (0xA, _) => Instruction::SetIndex { nnn },
            (0xB, _) => Instruction::JumpOffset { nnn },
            (0xC, _) => Instruction::Random { x, nn },
            (0xD, _) => Instruction::Draw { x, y, n },
            (0xE, _) => match nn {
                0x9E => Instruction::SkipKeyPressed { x },
                0xA1 => Instruction::SkipKeyNotPressed { x },
                _ => return Err(OpcodeError::InvalidOpcode(value)),
            },
            (0xF, _) => match nn {
                0x07 => Instruction::GetDelayTimer { x },
                0x0A => Instruction::AwaitKeyPress { x },
                0x15 => Instruction::SetDelayTimer { x },
                0x18 => Instruction::SetSoundTimer { x },
                0x1E => Instruction::AddIndex { x },
                0x29 => Instruction::SetIndexToSprite { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegisters { x },
                0x65 => Instruction::LoadRegisters { x },
                _ => return Err(OpcodeError::InvalidOpcode(value)),
            },
            _ => return Err(OpcodeError::InvalidOpcode(value)),
        };
        Ok(instruction)
    }
}
