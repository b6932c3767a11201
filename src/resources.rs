use std::{fs, path::Path};

use crate::ResourceError;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The raw program image, copied verbatim into memory
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data
    pub fn new(name: &str, data: Box<[u8]>) -> Self {
        Rom {
            name: name.to_string(),
            data,
        }
    }

    /// Will read the rom from the file system, the file name is used
    /// as the rom name.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ResourceError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

        let name = path
            .file_stem()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        log::info!("read rom '{}' with {} bytes", name, data.len());
        Ok(Rom::new(&name, data.into_boxed_slice()))
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}
