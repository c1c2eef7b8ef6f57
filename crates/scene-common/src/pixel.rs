//! Pixel type codes understood by the raster catalog consumer.

use serde::{Serialize, Serializer};

use crate::{SceneError, SceneResult};

/// Pixel type of a raster band, serialized as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    U1,
    U2,
    U4,
    U8,
    S8,
    U16,
    S16,
    U32,
    S32,
    F32,
    F64,
}

impl PixelType {
    pub fn code(&self) -> u8 {
        match self {
            PixelType::U1 => 0,
            PixelType::U2 => 1,
            PixelType::U4 => 2,
            PixelType::U8 => 3,
            PixelType::S8 => 4,
            PixelType::U16 => 5,
            PixelType::S16 => 6,
            PixelType::U32 => 7,
            PixelType::S32 => 8,
            PixelType::F32 => 9,
            PixelType::F64 => 10,
        }
    }

    /// Unsigned pixel type for an integer bit depth declared by a sensor.
    pub fn from_bit_depth(bits: u32) -> SceneResult<Self> {
        match bits {
            1 => Ok(PixelType::U1),
            2 => Ok(PixelType::U2),
            4 => Ok(PixelType::U4),
            8 => Ok(PixelType::U8),
            16 => Ok(PixelType::U16),
            32 => Ok(PixelType::U32),
            other => Err(SceneError::UnknownPixelType(format!("{} bits", other))),
        }
    }
}

impl Serialize for PixelType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(PixelType::U8.code(), 3);
        assert_eq!(PixelType::S16.code(), 6);
        assert_eq!(PixelType::F64.code(), 10);
    }

    #[test]
    fn test_from_bit_depth() {
        assert_eq!(PixelType::from_bit_depth(16).unwrap(), PixelType::U16);
        assert_eq!(PixelType::from_bit_depth(8).unwrap(), PixelType::U8);
        assert!(PixelType::from_bit_depth(12).is_err());
    }

    #[test]
    fn test_serializes_as_code() {
        assert_eq!(serde_json::to_string(&PixelType::U16).unwrap(), "5");
    }
}
