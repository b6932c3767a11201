use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::{
    definitions::{cpu, display, memory},
    devices::Keyboard,
    opcode::{self, Instruction, Opcode, Operation, ProgramCounterStep},
    resources::Rom,
    timer::{NoCallback, Timer, TimerCallback},
    OpcodeError,
};

/// The execution state of the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Fetches and executes the next instruction on every step.
    Running,
    /// `FX0A` is pending, every step polls the keyboard until a key is
    /// pressed, the value is then written into the contained register.
    AwaitingKey(usize),
    /// The chip ran into an instruction it could not handle, nothing is
    /// executed anymore.
    Halted(OpcodeError),
}

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet<S = NoCallback>
where
    S: TimerCallback,
{
    /// name of the loaded rom
    pub(super) name: String,
    /// the last executed opcode, all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x04F` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x050-0x1FF` - Free, historically the interpreter itself
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Vec<u8>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`, only the lower twelve bits are ever used.
    pub(super) index_register: u16,
    /// The program counter has the address of the next instruction to be executed from memory.
    pub(super) program_counter: u16,
    /// The stack is only used to store return addresses when subroutines are called.
    ///
    /// Nesting deeper than `16` levels is undefined on the real machine, here the
    /// stack pointer silently wraps around and the oldest entries are overwritten.
    pub(super) stack: [u16; cpu::stack::SIZE],
    /// Points to the next free slot of the stack.
    pub(super) stack_pointer: usize,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    pub(super) delay_timer: Timer<NoCallback>,
    /// Sound timer: This timer is used for sound effects, the callback plays the tone when it
    /// runs out.
    pub(super) sound_timer: Timer<S>,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`, stored row by row with one byte (`0` or `1`) per pixel.
    pub(super) display: Vec<u8>,
    /// Set as soon as the display changed, cleared by whoever renders it.
    pub(super) dirty: bool,
    /// Input is done with a hex keyboard that has 16 keys ranging `0-F`.
    pub(super) keyboard: Keyboard,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
    pub(super) state: State,
}

impl<S> ChipSet<S>
where
    S: TimerCallback + Default,
{
    /// will create a new chipset object with the rom already loaded
    pub fn new(rom: Rom) -> Self {
        let mut chip = Self::with_callback(S::default());
        chip.load_rom(&rom);
        chip
    }
}

impl<S> ChipSet<S>
where
    S: TimerCallback,
{
    /// will create a new and empty chipset, the callback is run whenever the
    /// sound timer runs out
    pub fn with_callback(callback: S) -> Self {
        let mut chip = Self {
            name: String::new(),
            opcode: 0,
            memory: vec![0; memory::SIZE],
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER as u16,
            stack: [0; cpu::stack::SIZE],
            stack_pointer: 0,
            delay_timer: Timer::new(0),
            sound_timer: Timer::with_callback(0, callback),
            display: vec![0; display::RESOLUTION],
            dirty: false,
            keyboard: Keyboard::new(),
            rng: Box::new(StdRng::from_entropy()),
            state: State::Running,
        };
        chip.reset();
        chip
    }

    /// Completely resets the chip, the memory, registers, stack, keys,
    /// timers and the display are cleared. The fonts are written back into
    /// memory and the random number generator is reseeded.
    pub fn reset(&mut self) {
        self.name.clear();
        self.opcode = 0;

        self.memory.fill(0);
        let fontset = display::fontset::LOCATION
            ..(display::fontset::LOCATION + display::fontset::FONTSET.len());
        self.memory[fontset].copy_from_slice(&display::fontset::FONTSET);

        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER as u16;
        self.stack = [0; cpu::stack::SIZE];
        self.stack_pointer = 0;
        self.delay_timer.set_value(0);
        self.sound_timer.set_value(0);
        self.display.fill(0);
        self.dirty = false;
        self.keyboard.reset();
        self.rng = Box::new(StdRng::from_entropy());
        self.state = State::Running;

        log::info!("chipset reset");
    }

    /// Will copy the data verbatim into memory, starting at the program
    /// location. Everything that does not fit into memory is dropped.
    pub fn load(&mut self, data: &[u8]) {
        let available = memory::SIZE - cpu::PROGRAM_COUNTER;
        if data.len() > available {
            log::warn!(
                "program has {} bytes, only {} fit into memory, the rest is dropped",
                data.len(),
                available
            );
        }
        let len = data.len().min(available);
        self.memory[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + len)]
            .copy_from_slice(&data[..len]);
        log::info!("loaded {} bytes at {:#06X}", len, cpu::PROGRAM_COUNTER);
    }

    /// Will load the given rom into memory.
    pub fn load_rom(&mut self, rom: &Rom) {
        self.name = rom.get_name().to_string();
        self.load(rom.get_data());
    }

    /// will advance the program by a single step
    ///
    /// The timers are counted down after the instruction was executed. If the
    /// instruction could not be fetched or decoded the chip halts, which can be
    /// checked with [`should_terminate`](Self::should_terminate).
    pub fn step(&mut self) -> Operation {
        let operation = match self.state {
            State::Halted(_) => return Operation::None,
            State::AwaitingKey(x) => self.poll_key(x),
            State::Running => match self.fetch() {
                Ok(instruction) => {
                    let (step, operation) = self.execute(instruction);
                    self.advance(step);
                    operation
                }
                Err(err) => {
                    log::error!(
                        "halting at {:#06X}: {}",
                        self.program_counter,
                        err
                    );
                    self.state = State::Halted(err);
                    return Operation::None;
                }
            },
        };

        self.tick_timers();
        operation
    }

    /// will get and decode the next instruction from memory
    fn fetch(&mut self) -> Result<Instruction, OpcodeError> {
        let opcode = opcode::build_opcode(&self.memory, self.program_counter as usize)?;
        let instruction = Instruction::try_from(opcode)?;
        self.opcode = opcode;
        Ok(instruction)
    }

    /// finishes a pending `FX0A` once any key is pressed
    fn poll_key(&mut self, x: usize) -> Operation {
        match self.keyboard.first_pressed() {
            Some(key) => {
                self.registers[x] = key as u8;
                self.advance(ProgramCounterStep::Next);
                self.state = State::Running;
                Operation::None
            }
            None => Operation::Wait,
        }
    }

    fn tick_timers(&mut self) {
        self.delay_timer.tick();
        if self.sound_timer.tick() {
            log::debug!("sound timer ran out");
        }
    }

    /// will move the program counter according to the step
    pub(super) fn advance(&mut self, step: ProgramCounterStep) {
        self.program_counter = step.apply(self.program_counter);
    }

    /// Will push the given pointer to the stack, wrapping around if the
    /// stack is full.
    pub(super) fn push_stack(&mut self, pointer: u16) {
        self.stack[self.stack_pointer] = pointer;
        self.stack_pointer = (self.stack_pointer + 1) % cpu::stack::SIZE;
    }

    /// Will pop from the stack, wrapping around if the stack is empty.
    pub(super) fn pop_stack(&mut self) -> u16 {
        self.stack_pointer = (self.stack_pointer + cpu::stack::SIZE - 1) % cpu::stack::SIZE;
        self.stack[self.stack_pointer]
    }

    /// The memory location `offset` bytes after the index register.
    #[inline]
    pub(super) fn address(&self, offset: usize) -> usize {
        (self.index_register as usize + offset) % memory::SIZE
    }

    /// Returns `true` once the chip halted and should not be run anymore.
    pub fn should_terminate(&self) -> bool {
        matches!(self.state, State::Halted(_))
    }

    /// The reason the chip halted, if it did.
    pub fn halt_reason(&self) -> Option<OpcodeError> {
        match self.state {
            State::Halted(err) => Some(err),
            _ => None,
        }
    }

    pub fn get_state(&self) -> State {
        self.state
    }

    /// Will set the value of the given key, keys outside of `0-F` are ignored.
    pub fn set_key(&mut self, key: usize, to: bool) {
        self.keyboard.set_key(key, to)
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool] {
        self.keyboard.get_keys()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// Grants access to the callback of the sound timer.
    pub fn sound_callback_mut(&mut self) -> &mut S {
        self.sound_timer.callback_mut()
    }

    /// Will return a immutable slice of the current display configuration,
    /// `WIDTH * HEIGHT` entries of either `0` or `1`, row by row.
    pub fn get_display(&self) -> &[u8] {
        &self.display
    }

    /// `true` if the display changed since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the display as rendered.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn get_memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_index_register(&self) -> u16 {
        self.index_register
    }

    pub fn get_program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn get_opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Will replace the random number generator, e.g. with a seeded one.
    /// The generator is replaced again on [`reset`](Self::reset).
    pub fn set_rng(&mut self, rng: Box<dyn RngCore + Send>) {
        self.rng = rng;
    }
}
