use std::{fs, io::ErrorKind, path::Path};

use hashbrown::HashMap;

use crate::{definitions::keyboard, ConfigError};

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will clear the display
    fn clear_display(&mut self);
    /// Will display all the pixels, one byte (`0` or `1`) per pixel, row by row
    fn display(&mut self, pixels: &[u8]);
}

/// A single change on the host keyboard, already translated into the
/// chip key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(usize),
    Released(usize),
    /// The host wants the emulation to stop.
    Quit,
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the keyboard data
pub trait KeyboardCommands {
    /// Returns all the events that happened since the last call, without blocking.
    fn poll_events(&mut self) -> Vec<KeyEvent>;
}

/// The internal representation of the keyboard.
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. The `8`, `4`, `6`, and
/// `2` keys are typically used for directional input. Three opcodes are used to detect input.
/// One skips an instruction if a specific key is pressed, while another does the same if a
/// specific key is not pressed. The third waits for a key press, and then stores it in one of
/// the data registers.
#[derive(Default, Debug, Clone)]
pub struct Keyboard {
    keys: [bool; keyboard::SIZE],
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    pub(crate) fn reset(&mut self) {
        self.keys = [false; keyboard::SIZE];
    }

    /// Keys outside of `0-F` are ignored.
    pub fn set_key(&mut self, key: usize, to: bool) {
        match self.keys.get_mut(key) {
            Some(state) => *state = to,
            None => log::warn!(
                "ignoring key {:#X}, the keyboard only has {} keys",
                key,
                keyboard::SIZE
            ),
        }
    }

    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys[key % keyboard::SIZE]
    }

    /// The lowest key that is currently held down.
    pub fn first_pressed(&self) -> Option<usize> {
        self.keys.iter().position(|&pressed| pressed)
    }

    pub fn get_keys(&self) -> &[bool] {
        &self.keys
    }
}

/// Maps every chip key onto a host key.
///
/// Stored on disk as a json object from the hex digit to the host key,
/// `{"0": "x", "1": "1", ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    host_keys: [char; keyboard::SIZE],
    lookup: HashMap<char, usize>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut host_keys = ['\0'; keyboard::SIZE];
        for (row, host_row) in keyboard::LAYOUT.iter().zip(keyboard::HOST_LAYOUT.iter()) {
            for (&key, &host) in row.iter().zip(host_row.iter()) {
                host_keys[key] = host;
            }
        }
        Self::from_host_keys(host_keys)
    }
}

impl KeyBindings {
    fn from_host_keys(host_keys: [char; keyboard::SIZE]) -> Self {
        let lookup = host_keys
            .iter()
            .enumerate()
            .map(|(key, host)| (host.to_ascii_lowercase(), key))
            .collect();
        Self { host_keys, lookup }
    }

    /// Will load the bindings from the given file, falls back to the
    /// default layout if there is no such file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(data) => Self::from_json(&data),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::warn!(
                    "Key bindings file '{}' not found, using the default layout instead.",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let raw: HashMap<String, char> = serde_json::from_str(data)?;

        let mut host_keys = [None; keyboard::SIZE];
        for (key, host) in raw {
            let index = usize::from_str_radix(&key, 16)
                .ok()
                .filter(|&index| index < keyboard::SIZE)
                .ok_or_else(|| ConfigError::InvalidKey(key.clone()))?;
            host_keys[index] = Some(host);
        }

        let mut resolved = ['\0'; keyboard::SIZE];
        for (index, host) in host_keys.iter().enumerate() {
            resolved[index] = host.ok_or(ConfigError::MissingKey(index))?;
        }
        Ok(Self::from_host_keys(resolved))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        let raw: std::collections::BTreeMap<String, char> = self
            .host_keys
            .iter()
            .enumerate()
            .map(|(key, &host)| (format!("{:X}", key), host))
            .collect();
        Ok(serde_json::to_string_pretty(&raw)?)
    }

    /// The chip key bound to the given host key.
    pub fn key_for(&self, host: char) -> Option<usize> {
        self.lookup.get(&host.to_ascii_lowercase()).copied()
    }

    /// The host key bound to the given chip key.
    pub fn host_for(&self, key: usize) -> char {
        self.host_keys[key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_key_keeps_other_keys() {
        let mut keyboard = Keyboard::new();
        keyboard.set_key(0x1, true);
        keyboard.set_key(0xA, true);

        assert!(keyboard.is_pressed(0x1));
        assert!(keyboard.is_pressed(0xA));
        assert_eq!(keyboard.first_pressed(), Some(0x1));

        keyboard.set_key(0x1, false);
        assert_eq!(keyboard.first_pressed(), Some(0xA));
    }

    #[test]
    fn test_reset() {
        let mut keyboard = Keyboard::new();
        keyboard.set_key(0x3, true);
        keyboard.set_key(0xF, true);
        keyboard.reset();
        assert_eq!(keyboard.first_pressed(), None);
        assert!(keyboard.get_keys().iter().all(|&key| !key));
    }

    #[test]
    fn test_set_key_out_of_range_is_ignored() {
        let mut keys = Keyboard::new();
        keys.set_key(keyboard::SIZE, true);
        keys.set_key(0x42, true);
        assert!(keys.get_keys().iter().all(|&key| !key));
        assert_eq!(keys.first_pressed(), None);
    }

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        let expected = [
            ('1', 0x1),
            ('2', 0x2),
            ('3', 0x3),
            ('4', 0xC),
            ('q', 0x4),
            ('w', 0x5),
            ('e', 0x6),
            ('r', 0xD),
            ('a', 0x7),
            ('s', 0x8),
            ('d', 0x9),
            ('f', 0xE),
            ('z', 0xA),
            ('x', 0x0),
            ('c', 0xB),
            ('v', 0xF),
        ];
        for (host, key) in expected {
            assert_eq!(bindings.key_for(host), Some(key));
            assert_eq!(bindings.host_for(key), host);
        }
        assert_eq!(bindings.key_for('Q'), Some(0x4));
        assert_eq!(bindings.key_for('p'), None);
    }

    #[test]
    fn test_bindings_json() {
        let bindings = KeyBindings::default();
        let json = bindings.to_json().unwrap();
        assert!(json.contains("\"A\": \"z\""));
        assert_eq!(KeyBindings::from_json(&json).unwrap(), bindings);
    }

    #[test]
    fn test_bindings_invalid_json() {
        assert!(matches!(
            KeyBindings::from_json("not json"),
            Err(ConfigError::Format(_))
        ));
        assert!(matches!(
            KeyBindings::from_json(r#"{"G": "g"}"#),
            Err(ConfigError::InvalidKey(key)) if key == "G"
        ));
        assert!(matches!(
            KeyBindings::from_json(r#"{"0": "x"}"#),
            Err(ConfigError::MissingKey(1))
        ));
    }

    #[test]
    fn test_bindings_missing_file_uses_default() {
        let path = std::env::temp_dir().join("chip8-bindings-that-do-not-exist.json");
        let _ = fs::remove_file(&path);
        assert_eq!(KeyBindings::load(&path).unwrap(), KeyBindings::default());
    }

    #[test]
    fn test_bindings_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "chip8-bindings-{}.json",
            std::process::id()
        ));
        let mut json = KeyBindings::default().to_json().unwrap();
        json = json.replace("\"x\"", "\"m\"");
        fs::write(&path, json).unwrap();

        let bindings = KeyBindings::load(&path).unwrap();
        assert_eq!(bindings.key_for('m'), Some(0x0));
        assert_eq!(bindings.key_for('x'), None);

        bindings.save(&path).unwrap();
        assert_eq!(KeyBindings::load(&path).unwrap(), bindings);
        fs::remove_file(&path).unwrap();
    }
}
