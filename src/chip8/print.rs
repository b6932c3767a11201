//! The pretty print implementation of the [`ChipSet`](super::ChipSet), split into
//! this file as it takes up quite a few lines.

use std::fmt::{self, Write};

use once_cell::sync::Lazy;

use super::ChipSet;
use crate::{definitions::memory, timer::TimerCallback};

/// How many entries are printed per row.
const ROW_SIZE: usize = 8;

const INDENT: &str = "\t\t";

/// The values that are used when a row is made up of only zeros.
const FILLER_BASE: &str = "...";

/// Prepares the line that will be used for rows of only zeros, it has the
/// same width as a row full of opcodes.
static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
    let zero = format!("{:#06X}", 0);
    let width = ROW_SIZE * zero.len() + (ROW_SIZE - 1) - 2 * zero.len() - FILLER_BASE.len();
    let padding = " ".repeat(width / 2);
    format!("{}{}{}{}{}", zero, padding, FILLER_BASE, padding, zero)
});

/// Will write the pointer range a row is covering.
fn range(out: &mut String, from: usize, to: usize) -> fmt::Result {
    write!(out, "{}{:#06X} - {:#06X} :", INDENT, from, to)
}

/// Will pretty print the memory as opcodes, consecutive rows of only zeros
/// are merged into a single filler row.
fn memory_rows(out: &mut String, data: &[u8]) -> fmt::Result {
    const ROW_BYTES: usize = ROW_SIZE * memory::opcodes::SIZE;

    let mut rows: Vec<(usize, usize, Option<&[u8]>)> = Vec::with_capacity(data.len() / ROW_BYTES);
    for (index, chunk) in data.chunks(ROW_BYTES).enumerate() {
        let from = index * ROW_BYTES;
        let to = from + chunk.len() - 1;
        let only_zero = chunk.iter().all(|&byte| byte == 0);

        match rows.last_mut() {
            Some((_, last_to, None)) if only_zero => *last_to = to,
            _ => rows.push((from, to, if only_zero { None } else { Some(chunk) })),
        }
    }

    for (from, to, chunk) in rows {
        out.push('\n');
        range(out, from, to)?;
        match chunk {
            Some(chunk) => {
                for pair in chunk.chunks(memory::opcodes::SIZE) {
                    let high = pair[0] as u16;
                    let low = pair.get(1).copied().unwrap_or_default() as u16;
                    write!(out, " {:#06X}", high << 8 | low)?;
                }
            }
            None => {
                out.push(' ');
                out.push_str(&ZERO_FILLER);
            }
        }
    }
    Ok(())
}

/// Will pretty print any unsigned integers.
fn integer_rows<T>(out: &mut String, data: &[T]) -> fmt::Result
where
    T: Copy + Into<u16>,
{
    for (index, chunk) in data.chunks(ROW_SIZE).enumerate() {
        let from = index * ROW_SIZE;
        out.push('\n');
        range(out, from, from + chunk.len() - 1)?;
        for &value in chunk {
            let value: u16 = value.into();
            write!(out, " {:#06X}", value)?;
        }
    }
    Ok(())
}

/// Will pretty print booleans, padded to the width of an integer.
fn bool_rows(out: &mut String, data: &[bool]) -> fmt::Result {
    for (index, chunk) in data.chunks(ROW_SIZE).enumerate() {
        let from = index * ROW_SIZE;
        let mut line = String::new();
        range(&mut line, from, from + chunk.len() - 1)?;
        for value in chunk {
            write!(line, " {:<6}", value)?;
        }
        out.push('\n');
        out.push_str(line.trim_end());
    }
    Ok(())
}

impl<S> fmt::Display for ChipSet<S>
where
    S: TimerCallback,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut mem = String::new();
        memory_rows(&mut mem, &self.memory)?;
        let mut key = String::new();
        bool_rows(&mut key, self.keyboard.get_keys())?;
        let mut sta = String::new();
        integer_rows(&mut sta, &self.stack)?;
        let mut reg = String::new();
        integer_rows(&mut reg, &self.registers)?;

        write!(
            f,
            "Chipset {{\n\
                \tProgram Name :\n{indent}{}\n\
                \tOpcode :\n{indent}{:#06X}\n\
                \tProgram Counter :\n{indent}{:#06X}\n\
                \tIndex Register :\n{indent}{:#06X}\n\
                \tTimers :\n{indent}delay {:#06X} sound {:#06X}\n\
                \tState :\n{indent}{:?}\n\
                \tMemory :{}\n\
                \tKeyboard :{}\n\
                \tStack :{}\n\
                \tRegister :{}\n\
            }}",
            self.name,
            self.opcode,
            self.program_counter,
            self.index_register,
            self.delay_timer.get_value(),
            self.sound_timer.get_value(),
            self.state,
            mem,
            key,
            sta,
            reg,
            indent = INDENT,
        )
    }
}
