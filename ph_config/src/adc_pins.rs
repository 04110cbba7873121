//! GPIO → ADC channel tables for the ESP32 family.
//!
//! A pin listed under ADC2 shares the converter with the Wi-Fi radio and cannot be
//! sampled while Wi-Fi is up.

use crate::Esp32Variant;

type PinMap = &'static [(u8, u8)];

const ESP32_ADC1: PinMap = &[
    (36, 0),
    (37, 1),
    (38, 2),
    (39, 3),
    (32, 4),
    (33, 5),
    (34, 6),
    (35, 7),
];
const ESP32_ADC2: PinMap = &[
    (4, 0),
    (0, 1),
    (2, 2),
    (15, 3),
    (13, 4),
    (12, 5),
    (14, 6),
    (27, 7),
    (25, 8),
    (26, 9),
];

// S2 and S3 share the same layout.
const ESP32S_ADC1: PinMap = &[
    (1, 0),
    (2, 1),
    (3, 2),
    (4, 3),
    (5, 4),
    (6, 5),
    (7, 6),
    (8, 7),
    (9, 8),
    (10, 9),
];
const ESP32S_ADC2: PinMap = &[
    (11, 0),
    (12, 1),
    (13, 2),
    (14, 3),
    (15, 4),
    (16, 5),
    (17, 6),
    (18, 7),
    (19, 8),
    (20, 9),
];

const ESP32C2_ADC1: PinMap = &[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)];
const ESP32C3_ADC1: PinMap = ESP32C2_ADC1;
const ESP32C3_ADC2: PinMap = &[(5, 0)];
const ESP32C6_ADC1: PinMap = &[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6)];
const ESP32H2_ADC1: PinMap = &[(1, 0), (2, 1), (3, 2), (4, 3), (5, 4)];

fn adc1_map(variant: Esp32Variant) -> PinMap {
    match variant {
        Esp32Variant::Esp32 => ESP32_ADC1,
        Esp32Variant::Esp32s2 | Esp32Variant::Esp32s3 => ESP32S_ADC1,
        Esp32Variant::Esp32c2 => ESP32C2_ADC1,
        Esp32Variant::Esp32c3 => ESP32C3_ADC1,
        Esp32Variant::Esp32c6 => ESP32C6_ADC1,
        Esp32Variant::Esp32h2 => ESP32H2_ADC1,
    }
}

fn adc2_map(variant: Esp32Variant) -> PinMap {
    match variant {
        Esp32Variant::Esp32 => ESP32_ADC2,
        Esp32Variant::Esp32s2 | Esp32Variant::Esp32s3 => ESP32S_ADC2,
        Esp32Variant::Esp32c3 => ESP32C3_ADC2,
        Esp32Variant::Esp32c2 | Esp32Variant::Esp32c6 | Esp32Variant::Esp32h2 => &[],
    }
}

fn lookup(map: PinMap, gpio: u8) -> Option<u8> {
    map.iter().find(|(pin, _)| *pin == gpio).map(|(_, ch)| *ch)
}

/// ADC1 channel for `gpio` on `variant`, if the pin is wired to ADC1.
pub fn adc1_channel(variant: Esp32Variant, gpio: u8) -> Option<u8> {
    lookup(adc1_map(variant), gpio)
}

/// ADC2 channel for `gpio` on `variant`, if the pin is wired to ADC2.
pub fn adc2_channel(variant: Esp32Variant, gpio: u8) -> Option<u8> {
    lookup(adc2_map(variant), gpio)
}

/// True when the pin can be sampled by either converter.
pub fn is_adc_pin(variant: Esp32Variant, gpio: u8) -> bool {
    adc1_channel(variant, gpio).is_some() || adc2_channel(variant, gpio).is_some()
}
