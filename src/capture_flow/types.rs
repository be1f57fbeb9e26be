//! Capture flow type definitions

use crate::camera_session::Facing;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which subject a shot represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Front,
    Back,
    Selfie,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
            Side::Selfie => "selfie",
        }
    }

    /// Which physical camera this side is captured with
    pub fn facing(&self) -> Facing {
        match self {
            Side::Selfie => Facing::User,
            _ => Facing::Environment,
        }
    }

    pub fn parse(s: &str) -> Result<Side> {
        match s {
            "front" => Ok(Side::Front),
            "back" => Ok(Side::Back),
            "selfie" => Ok(Side::Selfie),
            other => Err(Error::Validation(format!("unknown side: {}", other))),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shot count / side list configuration
///
/// One parameter covers both deployed variants: 2 shots (document only)
/// and 3 shots (document + selfie).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    sides: Vec<Side>,
}

impl CaptureConfig {
    /// Build from a configured shot count (2 or 3)
    pub fn from_shot_count(count: usize) -> Result<Self> {
        match count {
            2 => Ok(Self {
                sides: vec![Side::Front, Side::Back],
            }),
            3 => Ok(Self {
                sides: vec![Side::Front, Side::Back, Side::Selfie],
            }),
            other => Err(Error::Validation(format!(
                "unsupported shot count: {} (expected 2 or 3)",
                other
            ))),
        }
    }

    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    pub fn shot_count(&self) -> usize {
        self.sides.len()
    }

    pub fn initial_facing(&self) -> Facing {
        self.sides[0].facing()
    }
}

/// One encoded shot, held client-side until submit or discard
#[derive(Debug, Clone)]
pub struct CapturedShot {
    pub id: Uuid,
    pub side: Side,
    /// JPEG payload
    pub jpeg: Vec<u8>,
}

impl CapturedShot {
    pub fn new(side: Side, jpeg: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            side,
            jpeg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_facing() {
        assert_eq!(Side::Front.facing(), Facing::Environment);
        assert_eq!(Side::Back.facing(), Facing::Environment);
        assert_eq!(Side::Selfie.facing(), Facing::User);
    }

    #[test]
    fn test_config_variants() {
        let two = CaptureConfig::from_shot_count(2).unwrap();
        assert_eq!(two.sides(), &[Side::Front, Side::Back]);

        let three = CaptureConfig::from_shot_count(3).unwrap();
        assert_eq!(three.sides(), &[Side::Front, Side::Back, Side::Selfie]);

        assert!(CaptureConfig::from_shot_count(4).is_err());
    }
}
