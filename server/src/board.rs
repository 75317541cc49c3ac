/**
 * @file board.rs
 * @author Nguyen Le Duy
 * @date 10/04/2025
 * @brief Mapping of board display names to fully-qualified board names.
 */
use api_types::BoardIdentity;

/// Boards known out of the box, `(display name, FQBN)`.
const BUILTIN_BOARDS: &[(&str, &str)] = &[
    ("ESP32 Dev Module", "esp32:esp32:esp32"),
    ("ESP32-S2 Dev Module", "esp32:esp32:esp32s2"),
    ("ESP32-S3 Dev Module", "esp32:esp32:esp32s3"),
    ("ESP32-C3 Dev Module", "esp32:esp32:esp32c3"),
    ("NodeMCU 1.0 (ESP-12E Module)", "esp8266:esp8266:nodemcuv2"),
    ("Generic ESP8266 Module", "esp8266:esp8266:generic"),
    ("Arduino Uno", "arduino:avr:uno"),
    ("Arduino Nano", "arduino:avr:nano"),
    ("Arduino Mega 2560", "arduino:avr:mega"),
];

pub fn default_boards() -> Vec<BoardIdentity> {
    BUILTIN_BOARDS
        .iter()
        .map(|(name, fqbn)| BoardIdentity::new(*name, *fqbn))
        .collect()
}

/// Read-only board table. Built once at startup and owned by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTable {
    boards: Vec<BoardIdentity>,
}

impl Default for BoardTable {
    fn default() -> Self {
        Self::new(default_boards())
    }
}

impl BoardTable {
    pub fn new(boards: Vec<BoardIdentity>) -> Self {
        Self { boards }
    }

    /// Resolve a display name to its FQBN.
    /// Unknown labels are returned unchanged and treated as an FQBN already,
    /// the toolchain is the one to reject them.
    pub fn resolve<'a>(&'a self, label: &'a str) -> &'a str {
        self.boards
            .iter()
            .find(|board| board.display_name == label)
            .map_or(label, |board| board.fqbn.as_str())
    }

    pub fn boards(&self) -> &[BoardIdentity] {
        &self.boards
    }

    pub fn display_names(&self) -> Vec<String> {
        self.boards
            .iter()
            .map(|board| board.display_name.clone())
            .collect()
    }
}

/// Chip family of a resolved FQBN, as far as the mock analyzer cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetFamily {
    Esp32,
    Esp8266,
    Avr,
}

impl TargetFamily {
    pub fn from_fqbn(fqbn: &str) -> Self {
        if fqbn.contains("esp32") {
            TargetFamily::Esp32
        } else if fqbn.contains("esp8266") {
            TargetFamily::Esp8266
        } else {
            TargetFamily::Avr
        }
    }

    /// Size of an empty sketch for this family, in bytes
    pub fn base_size(self) -> u64 {
        match self {
            TargetFamily::Esp32 => 250_000,
            TargetFamily::Esp8266 => 200_000,
            TargetFamily::Avr => 15_000,
        }
    }

    /// Program storage space available, in bytes
    pub fn flash_size(self) -> u64 {
        match self {
            TargetFamily::Esp32 | TargetFamily::Esp8266 => 1_310_720,
            TargetFamily::Avr => 32_256,
        }
    }
}
