//! CV-to-note quantization.
//!
//! Maps a 16-bit CV sample onto a (pad, octave) pair: the sample picks an
//! octave band first, then the in-band remainder is scanned against the
//! pad thresholds. Change detection and retrigger suppression belong to
//! the caller; this stage is a pure lookup.

use tc_ir::{OCTAVE_COUNT, PAD_COUNT};

/// Upper bound of each octave band over the CV range.
pub const OCTAVE_THRESHOLDS: [u16; OCTAVE_COUNT] = [16384, 32768, 49152, u16::MAX];

/// Ascending in-band thresholds, one per pad. Spacing follows the pads'
/// interval layout rather than equal semitone steps.
pub const PAD_THRESHOLDS: [u16; PAD_COUNT] = [2731, 4096, 5461, 8192, 9557, 12288, 15019, 16384];

/// A quantized CV reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuantizedNote {
    pub pad: u8,
    pub octave: u8,
}

/// Quantize a raw CV sample to a pad and octave.
pub fn quantize(sample: u16) -> QuantizedNote {
    let (octave, clipped) = octave_band(sample);
    let pad = PAD_THRESHOLDS
        .iter()
        .position(|&threshold| clipped < threshold)
        .unwrap_or(PAD_COUNT - 1) as u8;
    QuantizedNote { pad, octave }
}

/// Octave band for a sample, plus the sample clipped to the band base.
fn octave_band(sample: u16) -> (u8, u16) {
    for (band, &threshold) in OCTAVE_THRESHOLDS.iter().enumerate() {
        if sample < threshold {
            let base = if band == 0 {
                0
            } else {
                OCTAVE_THRESHOLDS[band - 1]
            };
            return (band as u8, sample - base);
        }
    }
    // Only the very top code lands here.
    let top = OCTAVE_COUNT - 1;
    (top as u8, sample - OCTAVE_THRESHOLDS[top - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_ascending() {
        for window in OCTAVE_THRESHOLDS.windows(2) {
            assert!(window[0] < window[1]);
        }
        for window in PAD_THRESHOLDS.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn zero_maps_to_bottom() {
        assert_eq!(quantize(0), QuantizedNote { pad: 0, octave: 0 });
    }

    #[test]
    fn full_scale_maps_to_top() {
        assert_eq!(quantize(u16::MAX), QuantizedNote { pad: 7, octave: 3 });
    }

    #[test]
    fn octave_bands_split_at_their_thresholds() {
        assert_eq!(quantize(OCTAVE_THRESHOLDS[0] - 1).octave, 0);
        assert_eq!(quantize(OCTAVE_THRESHOLDS[0]).octave, 1);
        assert_eq!(quantize(OCTAVE_THRESHOLDS[1]).octave, 2);
        assert_eq!(quantize(OCTAVE_THRESHOLDS[2]).octave, 3);
    }

    #[test]
    fn band_base_is_subtracted() {
        // The same in-band offset must select the same pad in every octave.
        for band in 1..OCTAVE_COUNT {
            let base = OCTAVE_THRESHOLDS[band - 1];
            let note = quantize(base + 5000);
            assert_eq!(note.octave, band as u8);
            assert_eq!(note.pad, quantize(5000).pad);
        }
    }

    #[test]
    fn pad_selection_uses_first_exceeding_threshold() {
        assert_eq!(quantize(PAD_THRESHOLDS[0] - 1).pad, 0);
        assert_eq!(quantize(PAD_THRESHOLDS[0]).pad, 1);
        assert_eq!(quantize(PAD_THRESHOLDS[6]).pad, 7);
    }

    #[test]
    fn mapping_is_monotonic() {
        let mut prev = quantize(0);
        for sample in (0..=u16::MAX).step_by(97) {
            let note = quantize(sample);
            let rank = |n: QuantizedNote| (n.octave as u32) * 8 + n.pad as u32;
            assert!(rank(note) >= rank(prev), "regressed at sample {}", sample);
            prev = note;
        }
    }
}
