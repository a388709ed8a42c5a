//! G.711 µ-law companding and 8kHz ⇄ 24kHz sample-rate conversion.

use bytes::{BufMut, Bytes, BytesMut};

/// Bias added to the magnitude before companding.
pub const MULAW_BIAS: i32 = 0x84;

/// Largest magnitude representable before the bias is applied.
pub const MULAW_CLIP: i32 = 32635;

/// Ratio between the linear16 and telephony sample rates.
pub const UPSAMPLE_RATIO: usize = 3;

/// Bytes consumed from a linear16 buffer for each µ-law output byte.
const DECIMATION_STRIDE: usize = UPSAMPLE_RATIO * 2;

/// Expand one µ-law byte into a 16-bit linear sample.
#[inline]
pub fn mulaw_to_linear(byte: u8) -> i16 {
    let byte = !byte;
    let negative = byte & 0x80 != 0;
    let exponent = (byte >> 4) & 0x07;
    let mantissa = i32::from(byte & 0x0F);

    let magnitude = (((mantissa << 3) + MULAW_BIAS) << exponent) - MULAW_BIAS;
    if negative {
        -magnitude as i16
    } else {
        magnitude as i16
    }
}

/// Compress one 16-bit linear sample into a µ-law byte.
#[inline]
pub fn linear_to_mulaw(sample: i16) -> u8 {
    let sample = i32::from(sample);
    let sign: u8 = if sample < 0 { 0x80 } else { 0x00 };

    let magnitude = sample.abs().min(MULAW_CLIP) + MULAW_BIAS;
    let exponent = exponent_for(magnitude);
    let mantissa = ((magnitude >> (exponent + 3)) & 0x0F) as u8;

    !(sign | ((exponent as u8) << 4) | mantissa)
}

/// Segment lookup for a biased magnitude in `MULAW_BIAS..=32767`.
#[inline]
fn exponent_for(magnitude: i32) -> i32 {
    match magnitude {
        m if m >= 0x4000 => 7,
        m if m >= 0x2000 => 6,
        m if m >= 0x1000 => 5,
        m if m >= 0x0800 => 4,
        m if m >= 0x0400 => 3,
        m if m >= 0x0200 => 2,
        m if m >= 0x0100 => 1,
        _ => 0,
    }
}

/// Decode 8kHz µ-law into 24kHz PCM16 little-endian.
///
/// Each narrowband sample is written `UPSAMPLE_RATIO` times. The output is
/// always `6 * narrowband.len()` bytes.
pub fn decode_to_linear16(narrowband: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(narrowband.len() * DECIMATION_STRIDE);
    for &byte in narrowband {
        let sample = mulaw_to_linear(byte);
        for _ in 0..UPSAMPLE_RATIO {
            out.put_i16_le(sample);
        }
    }
    out.freeze()
}

/// Encode 24kHz PCM16 little-endian into 8kHz µ-law.
///
/// Keeps the first sample of every group of `UPSAMPLE_RATIO`. A trailing
/// partial group (including an odd byte) is dropped.
pub fn encode_from_linear16(linear16: &[u8]) -> Bytes {
    let out: Vec<u8> = linear16
        .chunks_exact(DECIMATION_STRIDE)
        .map(|group| linear_to_mulaw(i16::from_le_bytes([group[0], group[1]])))
        .collect();
    Bytes::from(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence() {
        assert_eq!(mulaw_to_linear(0xFF), 0);
        assert_eq!(mulaw_to_linear(0x7F), 0);
        assert_eq!(linear_to_mulaw(0), 0xFF);
    }

    #[test]
    fn test_known_values() {
        // Loudest codes in each polarity
        assert_eq!(mulaw_to_linear(0x80), 32124);
        assert_eq!(mulaw_to_linear(0x00), -32124);
        assert_eq!(linear_to_mulaw(i16::MAX), 0x80);
        assert_eq!(linear_to_mulaw(i16::MIN), 0x00);
    }

    #[test]
    fn test_decode_is_odd_symmetric() {
        for byte in 0u8..0x80 {
            assert_eq!(mulaw_to_linear(byte), -mulaw_to_linear(byte | 0x80));
        }
    }

    #[test]
    fn test_reconstruction_levels_are_stable() {
        for byte in 0..=255u8 {
            let level = mulaw_to_linear(byte);
            assert_eq!(
                mulaw_to_linear(linear_to_mulaw(level)),
                level,
                "byte {byte:#04x} did not survive re-encoding"
            );
        }
    }

    #[test]
    fn test_quantization_error_is_bounded() {
        for sample in (i16::MIN..=i16::MAX).step_by(7) {
            let restored = mulaw_to_linear(linear_to_mulaw(sample));
            let error = (i32::from(sample) - i32::from(restored)).abs();
            let bound = i32::from(sample).abs() / 16 + 16;
            assert!(
                error <= bound,
                "sample {sample} restored as {restored} (error {error} > {bound})"
            );
        }
    }

    #[test]
    fn test_encode_is_monotonic() {
        let mut previous = mulaw_to_linear(linear_to_mulaw(i16::MIN));
        for sample in (i16::MIN..=i16::MAX).step_by(64) {
            let restored = mulaw_to_linear(linear_to_mulaw(sample));
            assert!(restored >= previous);
            previous = restored;
        }
    }

    #[test]
    fn test_decode_upsamples_three_times() {
        let out = decode_to_linear16(&[0x80, 0x00]);
        assert_eq!(out.len(), 12);

        let samples: Vec<i16> = out
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(samples, vec![32124, 32124, 32124, -32124, -32124, -32124]);
    }

    #[test]
    fn test_encode_decimates() {
        let samples: [i16; 6] = [1000, -5, -5, -1000, 7, 7];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let out = encode_from_linear16(&bytes);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], linear_to_mulaw(1000));
        assert_eq!(out[1], linear_to_mulaw(-1000));
    }

    #[test]
    fn test_round_trip_every_byte() {
        for byte in 0..=255u8 {
            let linear = decode_to_linear16(&[byte]);
            let narrowband = encode_from_linear16(&linear);
            assert_eq!(narrowband.len(), 1);
            assert_eq!(mulaw_to_linear(narrowband[0]), mulaw_to_linear(byte));
        }
    }

    #[test]
    fn test_encode_drops_trailing_partial_group() {
        assert!(encode_from_linear16(&[]).is_empty());
        assert!(encode_from_linear16(&[0x01]).is_empty());
        assert!(encode_from_linear16(&[0u8; 5]).is_empty());
        assert_eq!(encode_from_linear16(&[0u8; 7]).len(), 1);
        assert_eq!(encode_from_linear16(&[0u8; 13]).len(), 2);
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_to_linear16(&[]).is_empty());
    }
}
