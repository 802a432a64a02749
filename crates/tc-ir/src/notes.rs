//! Pad-to-note lookup arithmetic.
//!
//! Converts (pad, scale degree variant, octave) into the 16-bit 1V/oct DAC
//! code and the MIDI note number. Each pad carries two interval variants
//! selected by the channel's external degree toggles:
//!
//! pad 0: I        pad 1: maj2       pad 2: min3/maj3  pad 3: per4/aug4
//! pad 4: dim5/per5  pad 5: min6/maj6  pad 6: min7/maj7  pad 7: VIII

/// DAC codes per semitone of 1V/oct output.
pub const DAC_SEMITONE: u16 = 938;

/// Interval variants selectable per pad.
pub const DEGREE_VARIANTS: usize = 2;

/// DAC code per (pad, degree variant), relative to the octave base.
/// Values are semitone offsets scaled by `DAC_SEMITONE`.
pub const DAC_NOTE_TABLE: [[u16; DEGREE_VARIANTS]; 8] = [
    [0, 0],         // I
    [1876, 1876],   // maj2
    [2814, 3752],   // min3, maj3
    [4690, 5628],   // per4, aug4
    [5628, 6566],   // dim5, per5
    [7504, 8442],   // min6, maj6
    [9380, 10318],  // min7, maj7
    [11256, 11256], // VIII
];

/// DAC code added per octave (12 semitones).
pub const DAC_OCTAVE_OFFSET: [u16; 4] = [0, 11256, 22512, 33768];

/// MIDI note per (pad, degree variant), octave 0. Root is C2 (36).
pub const MIDI_NOTE_TABLE: [[u8; DEGREE_VARIANTS]; 8] = [
    [36, 36],
    [38, 38],
    [39, 40],
    [41, 42],
    [42, 43],
    [44, 45],
    [46, 47],
    [48, 48],
];

/// MIDI note offset added per octave.
pub const MIDI_OCTAVE_OFFSET: [u8; 4] = [0, 12, 24, 36];

/// Fixed velocity for all note-on/note-off messages.
pub const MIDI_VELOCITY: u8 = 100;

/// DAC code for a pad at a degree variant and octave.
///
/// Out-of-range variants clamp to the last table column; octaves are the
/// caller's responsibility (the channel keeps its octave within 0-3).
pub fn dac_code(pad: u8, degree: u8, octave: u8) -> u16 {
    let variant = (degree as usize).min(DEGREE_VARIANTS - 1);
    DAC_NOTE_TABLE[pad as usize][variant] + DAC_OCTAVE_OFFSET[octave as usize]
}

/// MIDI note number for a pad at a degree variant and octave.
pub fn midi_note(pad: u8, degree: u8, octave: u8) -> u8 {
    let variant = (degree as usize).min(DEGREE_VARIANTS - 1);
    MIDI_NOTE_TABLE[pad as usize][variant] + MIDI_OCTAVE_OFFSET[octave as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octave_offset_is_twelve_semitones() {
        for window in DAC_OCTAVE_OFFSET.windows(2) {
            assert_eq!(window[1] - window[0], 12 * DAC_SEMITONE);
        }
        for window in MIDI_OCTAVE_OFFSET.windows(2) {
            assert_eq!(window[1] - window[0], 12);
        }
    }

    #[test]
    fn root_pad_at_octave_zero_is_zero() {
        assert_eq!(dac_code(0, 0, 0), 0);
        assert_eq!(midi_note(0, 0, 0), 36);
    }

    #[test]
    fn top_pad_is_one_octave_above_root() {
        assert_eq!(dac_code(7, 0, 0), 12 * DAC_SEMITONE);
        assert_eq!(midi_note(7, 0, 0), midi_note(0, 0, 1));
    }

    #[test]
    fn degree_variant_selects_table_column() {
        assert_eq!(dac_code(2, 0, 0), 2814);
        assert_eq!(dac_code(2, 1, 0), 3752);
        assert_eq!(midi_note(2, 0, 0), 39);
        assert_eq!(midi_note(2, 1, 0), 40);
    }

    #[test]
    fn out_of_range_degree_clamps_to_last_variant() {
        assert_eq!(dac_code(3, 7, 0), dac_code(3, 1, 0));
        assert_eq!(midi_note(3, 7, 0), midi_note(3, 1, 0));
    }

    #[test]
    fn highest_code_fits_the_dac_range() {
        let max = dac_code(7, 1, 3);
        assert_eq!(max, 11256 + 33768);
        assert!(max < u16::MAX);
    }

    #[test]
    fn tables_track_each_other_in_semitones() {
        // Every DAC entry must be the MIDI entry's semitone offset from the
        // root, scaled by DAC_SEMITONE.
        for pad in 0..8 {
            for variant in 0..DEGREE_VARIANTS {
                let semitones = (MIDI_NOTE_TABLE[pad][variant] - MIDI_NOTE_TABLE[0][0]) as u16;
                assert_eq!(DAC_NOTE_TABLE[pad][variant], semitones * DAC_SEMITONE);
            }
        }
    }
}
