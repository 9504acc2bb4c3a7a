//! Float to 16-bit PCM wire encoding.
//!
//! Pure function (no state, no side effects), easy to test.

/// Encode float samples as 16-bit signed little-endian PCM.
///
/// Each sample is clipped to [-1.0, 1.0], then scaled asymmetrically:
/// negative values by 32768, non-negative by 32767. +1.0 lands exactly on
/// `i16::MAX` and -1.0 on `i16::MIN`, so no input can overflow or wrap.
/// Out-of-range inputs are clipped, never rejected.
pub fn encode(samples: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);

    for &sample in samples {
        let s = sample.clamp(-1.0, 1.0);
        let value = if s < 0.0 {
            (s * 32768.0) as i16
        } else {
            (s * 32767.0) as i16
        };
        out.extend_from_slice(&value.to_le_bytes());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Vec<i16> {
        bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }

    #[test]
    fn test_encode_output_length() {
        for len in [0, 1, 7, 4096] {
            let samples = vec![0.25f32; len];
            assert_eq!(encode(&samples).len(), len * 2);
        }
    }

    #[test]
    fn test_encode_empty() {
        assert!(encode(&[]).is_empty());
    }

    #[test]
    fn test_encode_silence() {
        let decoded = decode(&encode(&[0.0, 0.0, 0.0]));
        assert_eq!(decoded, vec![0, 0, 0]);
    }

    #[test]
    fn test_encode_full_scale() {
        let decoded = decode(&encode(&[1.0, -1.0]));
        assert_eq!(decoded, vec![i16::MAX, i16::MIN]);
    }

    #[test]
    fn test_encode_clips_out_of_range() {
        // Anything past full scale clips to the rail, never wraps.
        let decoded = decode(&encode(&[2.0, 1.0001, -2.0, -100.0]));
        assert_eq!(decoded, vec![i16::MAX, i16::MAX, i16::MIN, i16::MIN]);
    }

    #[test]
    fn test_encode_asymmetric_scaling() {
        let decoded = decode(&encode(&[0.5, -0.5]));
        assert_eq!(decoded[0], (0.5f32 * 32767.0) as i16);
        assert_eq!(decoded[1], (-0.5f32 * 32768.0) as i16);
    }

    #[test]
    fn test_encode_round_trip_within_quantization_step() {
        let samples: Vec<f32> = (-100..=100).map(|i| i as f32 / 100.0).collect();
        let decoded = decode(&encode(&samples));

        for (&original, &quantized) in samples.iter().zip(decoded.iter()) {
            let scale = if original < 0.0 { 32768.0 } else { 32767.0 };
            let recovered = quantized as f32 / scale;
            assert!(
                (recovered - original).abs() <= 1.0 / 32767.0,
                "sample {} decoded to {}",
                original,
                recovered
            );
        }
    }

    #[test]
    fn test_encode_little_endian() {
        // 0.5 * 32767 = 16383 = 0x3FFF -> LE bytes [0xFF, 0x3F]
        let bytes = encode(&[0.5]);
        assert_eq!(bytes, vec![0xFF, 0x3F]);
    }
}
