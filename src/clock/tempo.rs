/*
Tempo Knob
==========

The internal clock is a square wave whose half-period comes from the
tempo knob. The ADC delivers 10-bit samples; only the top 8 bits are
used so the reading doesn't flicker between neighbouring values.

    half_period_ms = 12500 / (reading + 25)

  reading     0  ->  500 ms   (one step per second)
  reading   225  ->   50 ms
  reading   255  ->   44 ms

Integer division makes the curve coarse at the slow end and fine at
the fast end. Existing patches were played with exactly this curve, so
it must not be "improved".
*/

/// Numerator of the knob curve.
pub const TEMPO_NUMERATOR: u16 = 12_500;

/// Offset added to the reading so the curve never divides by zero.
pub const TEMPO_OFFSET: u16 = 25;

/// Half-period used until the knob has been read for the first time.
pub const DEFAULT_HALF_PERIOD_MS: u32 = 120;

/// Reduce a raw 10-bit ADC sample to the 8-bit knob reading.
pub fn knob_reading(sample: u16) -> u16 {
    (sample & 0x03FF) >> 2
}

/// Half-period of the internal clock in milliseconds for an 8-bit reading.
pub fn half_period_ms(reading: u16) -> u32 {
    u32::from(TEMPO_NUMERATOR) / (u32::from(reading) + u32::from(TEMPO_OFFSET))
}
