//! Onboard temperature sensor.
//!
//! On the board this is ADC input 4 of the RP2040; on the host a
//! [`SimulatedSensor`] produces plausible noisy raw readings through the same
//! conversion.

/// Source of the temperature shown on the info line.
pub trait TemperatureSensor: Send {
    fn read_celsius(&mut self) -> f32;
}

impl<F: FnMut() -> f32 + Send> TemperatureSensor for F {
    fn read_celsius(&mut self) -> f32 {
        self()
    }
}

/// ADC reference voltage
const VREF: f32 = 3.3;
/// Sensor voltage at 27 C
const V27: f32 = 0.706;
/// Sensor slope in V per degree
const SLOPE: f32 = 0.001721;

/// Convert a raw 12-bit reading of the RP2040 temperature channel.
pub fn adc_to_celsius(raw: u16) -> f32 {
    let v = (raw & 0x0fff) as f32 * VREF / 4096.0;
    27.0 - (v - V27) / SLOPE
}

/// Temperature in hundredths of a degree, as drawn on the info line.
pub fn centidegrees(celsius: f32) -> u32 {
    (celsius * 100.0).round().clamp(0.0, 99999.0) as u32
}

/// Sensor reading an ADC that hovers around a fixed raw value.
pub struct SimulatedSensor {
    base: u16,
    rng: u32,
}

impl SimulatedSensor {
    /// `base` is the raw reading without noise, 876 is about 27 C.
    pub fn new(base: u16, seed: u32) -> Self {
        SimulatedSensor { base, rng: seed.max(1) }
    }

    fn raw(&mut self) -> u16 {
        // +-3 LSB of noise
        let n = (xorshift(&mut self.rng) % 7) as i32 - 3;
        (self.base as i32 + n).clamp(0, 0x0fff) as u16
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        SimulatedSensor::new(876, 0x2545_f491)
    }
}

impl TemperatureSensor for SimulatedSensor {
    fn read_celsius(&mut self) -> f32 {
        let raw = self.raw();
        adc_to_celsius(raw)
    }
}

fn xorshift(state: &mut u32) -> u32 {
    *state ^= *state << 13;
    *state ^= *state >> 17;
    *state ^= *state << 5;
    *state
}
