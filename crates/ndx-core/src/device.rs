//! Backend and device identities

use crate::error::{Error, Result};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Opaque, comparable identity of a compute backend (e.g. `"native"`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(Cow<'static, str>);

impl BackendId {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for BackendId {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

/// A device is a backend plus an ordinal, written `"<backend>:<index>"`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Device {
    backend: BackendId,
    index: usize,
}

impl Device {
    pub fn new(backend: impl Into<BackendId>, index: usize) -> Self {
        Self {
            backend: backend.into(),
            index,
        }
    }

    pub fn backend(&self) -> &BackendId {
        &self.backend
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// `native:0`
impl Default for Device {
    fn default() -> Self {
        Self::new("native", 0)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.backend, self.index)
    }
}

impl FromStr for Device {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (backend, index) = match s.split_once(':') {
            Some((backend, index)) => {
                let index = index
                    .parse::<usize>()
                    .map_err(|_| Error::InvalidInput(format!("invalid device index in '{s}'")))?;
                (backend, index)
            }
            None => (s, 0),
        };
        if backend.is_empty() {
            return Err(Error::InvalidInput(format!("missing backend name in '{s}'")));
        }
        Ok(Self::new(BackendId::new(backend), index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_id_equality_ignores_ownership() {
        assert_eq!(BackendId::from_static("native"), BackendId::new("native"));
        assert_ne!(BackendId::from_static("native"), BackendId::new("cuda"));
    }

    #[test]
    fn test_device_parse_and_display() {
        let device: Device = "cuda:1".parse().unwrap();
        assert_eq!(device.backend().as_str(), "cuda");
        assert_eq!(device.index(), 1);
        assert_eq!(device.to_string(), "cuda:1");

        let device: Device = "native".parse().unwrap();
        assert_eq!(device, Device::default());

        assert!("native:x".parse::<Device>().is_err());
        assert!(":0".parse::<Device>().is_err());
    }
}
