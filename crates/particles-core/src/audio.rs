//! Microphone band analysis with an explicit capture lifecycle.
//!
//! The analyzer owns an optional capture stream provided by the host. Stream
//! acquisition is asynchronous on the web, so [`AudioAnalyzer::start`] hands
//! out an [`AcquireTicket`] and the host later calls [`AudioAnalyzer::resolve`]
//! with the outcome. Every `start`/`stop` bumps a generation counter; a
//! resolution carrying an older generation is stale and its stream is released
//! on the spot.

use crate::constants::{BASS_BINS, FREQUENCY_BIN_COUNT, MID_BINS, TREBLE_BINS};
use crate::error::Error;

/// Normalized energy per frequency band, each in \[0, 1\].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioBands {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub average: f32,
}

impl AudioBands {
    pub const ZERO: AudioBands = AudioBands {
        bass: 0.0,
        mid: 0.0,
        treble: 0.0,
        average: 0.0,
    };

    /// Split a byte-valued spectrum into fixed bass/mid/treble bands.
    ///
    /// Bins past the end of `spectrum` count as silence, so a short spectrum
    /// degrades toward zero instead of panicking.
    pub fn from_spectrum(spectrum: &[u8]) -> Self {
        let bass = band_mean(spectrum, BASS_BINS);
        let mid = band_mean(spectrum, MID_BINS);
        let treble = band_mean(spectrum, TREBLE_BINS);
        let average = (bass + mid + treble) / 3.0;
        Self {
            bass: bass / 255.0,
            mid: mid / 255.0,
            treble: treble / 255.0,
            average: average / 255.0,
        }
    }
}

fn band_mean(spectrum: &[u8], (lo, hi): (usize, usize)) -> f32 {
    let sum: u32 = (lo..hi)
        .map(|i| spectrum.get(i).copied().unwrap_or(0) as u32)
        .sum();
    sum as f32 / (hi - lo) as f32
}

/// Host-provided live capture: a microphone stream routed into a
/// frequency-domain analyser.
pub trait CaptureStream {
    /// Copy the current byte-valued spectrum into `out`.
    fn byte_frequency_data(&mut self, out: &mut [u8]);

    /// Whether the underlying audio graph is currently producing data.
    fn is_running(&self) -> bool {
        true
    }

    /// Stop the device tracks and detach from the audio graph.
    fn release(&mut self);
}

/// Proof of a pending acquisition, returned by [`AudioAnalyzer::start`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcquireTicket {
    generation: u64,
}

impl AcquireTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

enum CaptureState<S> {
    Disabled,
    Acquiring { generation: u64 },
    Enabled(S),
}

/// Coarse view of the capture lifecycle for UI and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapturePhase {
    Disabled,
    Acquiring,
    Enabled,
}

pub struct AudioAnalyzer<S: CaptureStream> {
    state: CaptureState<S>,
    generation: u64,
    spectrum: Vec<u8>,
    bands: AudioBands,
}

impl<S: CaptureStream> Default for AudioAnalyzer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CaptureStream> AudioAnalyzer<S> {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Disabled,
            generation: 0,
            spectrum: vec![0; FREQUENCY_BIN_COUNT],
            bands: AudioBands::ZERO,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        match self.state {
            CaptureState::Disabled => CapturePhase::Disabled,
            CaptureState::Acquiring { .. } => CapturePhase::Acquiring,
            CaptureState::Enabled(_) => CapturePhase::Enabled,
        }
    }

    /// Last computed bands without touching the stream.
    pub fn bands(&self) -> AudioBands {
        self.bands
    }

    /// Begin acquiring a capture stream. Returns `None` when capture is
    /// already enabled or an acquisition is in flight.
    pub fn start(&mut self) -> Option<AcquireTicket> {
        match self.state {
            CaptureState::Disabled => {
                self.generation += 1;
                self.state = CaptureState::Acquiring {
                    generation: self.generation,
                };
                log::info!("[audio] acquiring microphone (gen {})", self.generation);
                Some(AcquireTicket {
                    generation: self.generation,
                })
            }
            _ => None,
        }
    }

    /// Deliver the outcome of an acquisition. Returns `true` when the stream
    /// was attached. Stale successes are released immediately; failures leave
    /// the analyzer disabled with zeroed bands.
    pub fn resolve(&mut self, ticket: AcquireTicket, outcome: Result<S, Error>) -> bool {
        let current = matches!(
            self.state,
            CaptureState::Acquiring { generation } if generation == ticket.generation
        );
        match outcome {
            Ok(mut stream) if !current => {
                log::info!(
                    "[audio] releasing stale stream (gen {}, now {})",
                    ticket.generation,
                    self.generation
                );
                stream.release();
                false
            }
            Ok(stream) => {
                log::info!("[audio] microphone attached (gen {})", ticket.generation);
                self.state = CaptureState::Enabled(stream);
                true
            }
            Err(e) => {
                if current {
                    log::warn!("[audio] capture unavailable: {}", e);
                    self.state = CaptureState::Disabled;
                    self.bands = AudioBands::ZERO;
                }
                false
            }
        }
    }

    /// Release the stream (if any), cancel an in-flight acquisition and zero
    /// the bands. Safe to call in any state.
    pub fn stop(&mut self) {
        self.generation += 1;
        if let CaptureState::Enabled(stream) = &mut self.state {
            stream.release();
            log::info!("[audio] microphone released");
        }
        self.state = CaptureState::Disabled;
        self.bands = AudioBands::ZERO;
        self.spectrum.iter_mut().for_each(|b| *b = 0);
    }

    /// Recompute the bands from the live spectrum. A no-op returning the
    /// last-known bands unless capture is enabled and running.
    pub fn update(&mut self) -> AudioBands {
        if let CaptureState::Enabled(stream) = &mut self.state {
            if stream.is_running() {
                stream.byte_frequency_data(&mut self.spectrum);
                self.bands = AudioBands::from_spectrum(&self.spectrum);
            }
        }
        self.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_use_fixed_bin_ranges() {
        let mut spectrum = [0u8; FREQUENCY_BIN_COUNT];
        spectrum[..8].fill(255);
        let bands = AudioBands::from_spectrum(&spectrum);
        assert_eq!(bands.bass, 1.0);
        assert_eq!(bands.mid, 0.0);
        assert_eq!(bands.treble, 0.0);
        assert!((bands.average - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn bins_above_treble_are_ignored() {
        let mut spectrum = [0u8; FREQUENCY_BIN_COUNT];
        spectrum[64..].fill(255);
        assert_eq!(AudioBands::from_spectrum(&spectrum), AudioBands::ZERO);
    }

    #[test]
    fn short_spectrum_reads_as_silence() {
        let bands = AudioBands::from_spectrum(&[255; 8]);
        assert_eq!(bands.bass, 1.0);
        assert_eq!(bands.treble, 0.0);
    }
}
