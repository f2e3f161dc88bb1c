//! Mixer: routes voice outputs to a stereo pair and applies the output stage.

use super::utils::{crossfade, unit_to_cv};

/// Which physical outputs the host has connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputRouting {
    /// Both outputs patched: voices alternate left/right.
    #[default]
    Stereo,
    /// One output patched: both channels carry the mono sum.
    Mono,
}

/// Per-sample stereo accumulator for the active voices.
#[derive(Debug, Clone, Copy)]
pub struct StereoMix {
    left: f32,
    right: f32,
    active: usize,
    routing: OutputRouting,
}

impl StereoMix {
    pub fn new(active: usize, routing: OutputRouting) -> Self {
        StereoMix {
            left: 0.0,
            right: 0.0,
            active: active.max(1),
            routing,
        }
    }

    /// Add voice `index`'s output.
    ///
    /// With an odd count voice 0 sits in the centre at `1 / active`; the
    /// rest alternate even→left, odd→right at `1 / (active / 2)` (integer
    /// halving, as the pair count).
    #[inline]
    pub fn add(&mut self, index: usize, sample: f32) {
        let active = self.active;

        if self.routing == OutputRouting::Mono {
            let s = sample / active as f32;
            self.left += s;
            self.right += s;
            return;
        }

        if active % 2 == 1 && index == 0 {
            let s = sample / active as f32;
            self.left += s;
            self.right += s;
        } else {
            let s = sample / (active / 2) as f32;
            if index % 2 == 0 {
                self.left += s;
            } else {
                self.right += s;
            }
        }
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn right(&self) -> f32 {
        self.right
    }

    /// Apply VCA, dry/wet and rescale to output volts.
    #[inline]
    pub fn output(&self, stage: &OutputStage) -> (f32, f32) {
        let gain = stage.vca * stage.vca_mod;
        let left = crossfade(stage.dry, self.left * gain, stage.mix);
        let right = crossfade(stage.dry, self.right * gain, stage.mix);
        (unit_to_cv(left), unit_to_cv(right))
    }
}

/// Scalars of the final output stage, all in normalized units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputStage {
    /// VCA knob gain.
    pub vca: f32,
    /// Unipolar VCA modulation in `[0, 1]`, 1 when unpatched.
    pub vca_mod: f32,
    /// Dry/wet position in `[0, 1]`.
    pub mix: f32,
    /// Pre-engine input signal.
    pub dry: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unity() -> OutputStage {
        OutputStage {
            vca: 1.0,
            vca_mod: 1.0,
            mix: 1.0,
            dry: 0.0,
        }
    }

    #[test]
    fn single_voice_is_centred() {
        let mut m = StereoMix::new(1, OutputRouting::Stereo);
        m.add(0, 0.6);
        assert_eq!(m.left(), 0.6);
        assert_eq!(m.right(), 0.6);
    }

    #[test]
    fn even_count_alternates_sides() {
        let mut m = StereoMix::new(4, OutputRouting::Stereo);
        for (i, s) in [0.1, 0.2, 0.3, 0.4].iter().enumerate() {
            m.add(i, *s);
        }
        assert!((m.left() - (0.1 + 0.3) / 2.0).abs() < 1e-6);
        assert!((m.right() - (0.2 + 0.4) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn odd_count_centres_voice_zero() {
        let mut m = StereoMix::new(3, OutputRouting::Stereo);
        m.add(0, 0.9);
        m.add(1, 0.2);
        m.add(2, 0.4);
        // Centre at 1/3, pair members at 1/(3/2) = 1/1
        assert!((m.left() - (0.3 + 0.4)).abs() < 1e-6);
        assert!((m.right() - (0.3 + 0.2)).abs() < 1e-6);
    }

    #[test]
    fn mono_routing_sums_to_both() {
        let mut m = StereoMix::new(4, OutputRouting::Mono);
        for i in 0..4 {
            m.add(i, 0.4);
        }
        assert!((m.left() - 0.4).abs() < 1e-6);
        assert_eq!(m.left(), m.right());
    }

    #[test]
    fn output_stage_crossfades_and_rescales() {
        let mut m = StereoMix::new(1, OutputRouting::Stereo);
        m.add(0, 0.5);

        let (l, r) = m.output(&unity());
        assert!((l - 2.5).abs() < 1e-5);
        assert_eq!(l, r);

        let dry_only = OutputStage { mix: 0.0, dry: -0.2, ..unity() };
        let (l, _) = m.output(&dry_only);
        assert!((l + 1.0).abs() < 1e-5);

        let muted = OutputStage { vca_mod: 0.0, ..unity() };
        assert_eq!(m.output(&muted), (0.0, 0.0));
    }
}
