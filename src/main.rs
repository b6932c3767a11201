use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use chip::{
    chip8::ChipSet,
    definitions::{cpu, keyboard},
    devices::KeyBindings,
    resources::Rom,
    Runner,
};
use clap::Parser;

mod terminal;

/// Runs a chip8 program inside of the terminal, press `Esc` to quit.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the program to run
    rom: PathBuf,

    /// The key bindings, written with the default layout if missing
    #[arg(short, long, default_value = keyboard::BINDINGS_FILE)]
    bindings: PathBuf,

    /// How many instructions are executed per second
    #[arg(long, default_value_t = cpu::HERTZ)]
    hertz: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rom = Rom::from_path(&args.rom)
        .with_context(|| format!("unable to start '{}'", args.rom.display()))?;

    let bindings = KeyBindings::load(&args.bindings).with_context(|| {
        format!(
            "unable to read the key bindings '{}'",
            args.bindings.display()
        )
    })?;
    if !args.bindings.exists() {
        bindings
            .save(&args.bindings)
            .context("unable to store the default key bindings")?;
    }

    let mut chip = ChipSet::with_callback(terminal::Beep);
    chip.load_rom(&rom);

    let interval = Duration::from_micros(1_000_000 / args.hertz.max(1));
    let display = terminal::TerminalDisplay::new().context("unable to set up the terminal")?;
    let keyboard = terminal::TerminalKeyboard::new(bindings);

    let mut runner = Runner::with_interval(chip, display, keyboard, interval);
    let halted = runner.run();
    // restores the terminal before anything is reported
    drop(runner);

    if let Some(reason) = halted {
        bail!("'{}' stopped: {}", rom.get_name(), reason);
    }
    Ok(())
}
