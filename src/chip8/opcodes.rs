//! The implementation of every single instruction the chip understands.

use rand::Rng;

use super::{ChipSet, State};
use crate::{
    definitions::{
        cpu,
        display::{self, fontset},
        memory::ADDRESS_MASK,
    },
    opcode::{Instruction, Operation, ProgramCounterStep},
    timer::TimerCallback,
};

/// The flag register `VF`
const FLAG: usize = cpu::register::LAST;

/// The width of a sprite row in pixels.
const SPRITE_WIDTH: usize = 8;

impl<S> ChipSet<S>
where
    S: TimerCallback,
{
    /// Will run the given instruction against the machine and report how the
    /// program counter has to move on.
    pub(super) fn execute(&mut self, instruction: Instruction) -> (ProgramCounterStep, Operation) {
        log::debug!(
            "{:#06X} opcode {:#06X} {:?}",
            self.program_counter,
            self.opcode,
            instruction
        );

        let step = match instruction {
            Instruction::Sys { .. } => ProgramCounterStep::Next,
            Instruction::Clear => {
                self.display.fill(0);
                self.dirty = true;
                return (ProgramCounterStep::Next, Operation::Draw);
            }
            Instruction::Return => {
                let pointer = self.pop_stack();
                ProgramCounterStep::Jump(ProgramCounterStep::Next.apply(pointer))
            }
            Instruction::Jump { nnn } => ProgramCounterStep::Jump(nnn),
            Instruction::Call { nnn } => {
                self.push_stack(self.program_counter);
                ProgramCounterStep::Jump(nnn)
            }
            Instruction::SkipEqualConst { x, nn } => {
                ProgramCounterStep::cond(self.registers[x] == nn)
            }
            Instruction::SkipNotEqualConst { x, nn } => {
                ProgramCounterStep::cond(self.registers[x] != nn)
            }
            Instruction::SkipEqualRegister { x, y } => {
                ProgramCounterStep::cond(self.registers[x] == self.registers[y])
            }
            Instruction::SetConst { x, nn } => {
                self.registers[x] = nn;
                ProgramCounterStep::Next
            }
            Instruction::AddConst { x, nn } => {
                self.registers[x] = self.registers[x].wrapping_add(nn);
                ProgramCounterStep::Next
            }
            Instruction::Assign { x, y } => {
                self.registers[x] = self.registers[y];
                ProgramCounterStep::Next
            }
            Instruction::Or { x, y } => {
                self.registers[x] |= self.registers[y];
                ProgramCounterStep::Next
            }
            Instruction::And { x, y } => {
                self.registers[x] &= self.registers[y];
                ProgramCounterStep::Next
            }
            Instruction::Xor { x, y } => {
                self.registers[x] ^= self.registers[y];
                ProgramCounterStep::Next
            }
            Instruction::AddRegister { x, y } => {
                let (result, carry) = self.registers[x].overflowing_add(self.registers[y]);
                self.set_with_flag(x, result, carry)
            }
            Instruction::Subtract { x, y } => {
                let (result, borrow) = self.registers[x].overflowing_sub(self.registers[y]);
                self.set_with_flag(x, result, !borrow)
            }
            Instruction::ShiftRight { x, .. } => {
                let value = self.registers[x];
                self.set_with_flag(x, value >> 1, value & 0x01 == 0x01)
            }
            Instruction::ReverseSubtract { x, y } => {
                let (result, borrow) = self.registers[y].overflowing_sub(self.registers[x]);
                self.set_with_flag(x, result, !borrow)
            }
            Instruction::ShiftLeft { x, .. } => {
                let value = self.registers[x];
                self.set_with_flag(x, value << 1, value & 0x80 == 0x80)
            }
            Instruction::SkipNotEqualRegister { x, y } => {
                ProgramCounterStep::cond(self.registers[x] != self.registers[y])
            }
            Instruction::SetIndex { nnn } => {
                self.index_register = nnn;
                ProgramCounterStep::Next
            }
            Instruction::JumpOffset { nnn } => {
                ProgramCounterStep::Jump(nnn.wrapping_add(self.registers[0] as u16))
            }
            Instruction::Random { x, nn } => {
                let random: u8 = self.rng.gen();
                self.registers[x] = random & nn;
                ProgramCounterStep::Next
            }
            Instruction::Draw { x, y, n } => {
                self.draw(x, y, n);
                return (ProgramCounterStep::Next, Operation::Draw);
            }
            Instruction::SkipKeyPressed { x } => {
                ProgramCounterStep::cond(self.keyboard.is_pressed(self.registers[x] as usize))
            }
            Instruction::SkipKeyNotPressed { x } => {
                ProgramCounterStep::cond(!self.keyboard.is_pressed(self.registers[x] as usize))
            }
            Instruction::GetDelayTimer { x } => {
                self.registers[x] = self.delay_timer.get_value();
                ProgramCounterStep::Next
            }
            Instruction::AwaitKeyPress { x } => match self.keyboard.first_pressed() {
                Some(key) => {
                    self.registers[x] = key as u8;
                    ProgramCounterStep::Next
                }
                None => {
                    log::debug!("waiting for a key press into V{:X}", x);
                    self.state = State::AwaitingKey(x);
                    return (ProgramCounterStep::None, Operation::Wait);
                }
            },
            Instruction::SetDelayTimer { x } => {
                self.delay_timer.set_value(self.registers[x]);
                ProgramCounterStep::Next
            }
            Instruction::SetSoundTimer { x } => {
                self.sound_timer.set_value(self.registers[x]);
                ProgramCounterStep::Next
            }
            Instruction::AddIndex { x } => {
                self.index_register =
                    self.index_register.wrapping_add(self.registers[x] as u16) & ADDRESS_MASK;
                ProgramCounterStep::Next
            }
            Instruction::SetIndexToSprite { x } => {
                let glyph = fontset::LOCATION + self.registers[x] as usize * fontset::GLYPH_SIZE;
                self.index_register = glyph as u16 & ADDRESS_MASK;
                ProgramCounterStep::Next
            }
            Instruction::StoreBcd { x } => {
                let value = self.registers[x];
                let digits = [value / 100, (value / 10) % 10, value % 10];
                for (offset, digit) in digits.iter().enumerate() {
                    let address = self.address(offset);
                    self.memory[address] = *digit;
                }
                ProgramCounterStep::Next
            }
            Instruction::StoreRegisters { x } => {
                for offset in 0..=x {
                    let address = self.address(offset);
                    self.memory[address] = self.registers[offset];
                }
                ProgramCounterStep::Next
            }
            Instruction::LoadRegisters { x } => {
                for offset in 0..=x {
                    self.registers[offset] = self.memory[self.address(offset)];
                }
                ProgramCounterStep::Next
            }
        };

        (step, Operation::None)
    }

    /// Writes the flag first and the result last, so that a result stored
    /// into `VF` wins over the flag.
    fn set_with_flag(&mut self, x: usize, result: u8, flag: bool) -> ProgramCounterStep {
        self.registers[FLAG] = flag as u8;
        self.registers[x] = result;
        ProgramCounterStep::Next
    }

    /// Draws a sprite at coordinate `(VX, VY)` that has a width of `8` pixels and a height of
    /// `N` pixels. Each row of `8` pixels is read as bit-coded starting from memory location
    /// `I`. Pixels are XOR-ed onto the screen and wrap around at the edges. `VF` is set to `1`
    /// if any screen pixel was flipped from set to unset, and to `0` otherwise.
    fn draw(&mut self, x: usize, y: usize, n: u8) {
        let origin_x = self.registers[x] as usize;
        let origin_y = self.registers[y] as usize;

        self.registers[FLAG] = 0;

        for row in 0..n as usize {
            let sprite = self.memory[self.address(row)];
            let py = (origin_y + row) % display::HEIGHT;

            for column in 0..SPRITE_WIDTH {
                let mask = 0x80 >> column;
                if sprite & mask == 0 {
                    continue;
                }

                let px = (origin_x + column) % display::WIDTH;
                let pixel = &mut self.display[py * display::WIDTH + px];
                if *pixel == 1 {
                    self.registers[FLAG] = 1;
                }
                *pixel ^= 1;
            }
        }

        self.dirty = true;
    }
}
