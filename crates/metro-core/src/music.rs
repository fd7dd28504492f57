//! Background music: container negotiation and the first-press gate.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundFormat {
    Mp3,
    Ogg,
}

impl SoundFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SoundFormat::Mp3 => "mp3",
            SoundFormat::Ogg => "ogg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            SoundFormat::Mp3 => "audio/mpeg",
            SoundFormat::Ogg => "audio/ogg",
        }
    }
}

/// Declared preference order for the background track.
pub const MUSIC_FORMATS: [SoundFormat; 2] = [SoundFormat::Mp3, SoundFormat::Ogg];

/// First format the host reports it can play.
///
/// `can_play` receives a MIME type and answers like `canPlayType`: any
/// non-empty answer ("maybe", "probably") counts as playable.
pub fn negotiate_format(
    formats: &[SoundFormat],
    can_play: impl Fn(&str) -> String,
) -> Option<SoundFormat> {
    formats
        .iter()
        .copied()
        .find(|f| !can_play(f.mime()).is_empty())
}

/// `base` with the extension of `format`, e.g. `track` + Ogg -> `track.ogg`.
pub fn track_path(base: &str, format: SoundFormat) -> String {
    format!("{}.{}", base, format.extension())
}

/// One-shot playback trigger.
///
/// Playback may start once, after the first press and after the track is
/// decoded, in whichever order those two happen.
#[derive(Clone, Copy, Debug, Default)]
pub struct MusicGate {
    pressed: bool,
    ready: bool,
    started: bool,
}

impl MusicGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer press. Returns true only for the first press.
    pub fn press(&mut self) -> bool {
        if self.pressed {
            return false;
        }
        self.pressed = true;
        true
    }

    /// Record that the track finished decoding.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Returns true exactly once, when both press and decode have happened.
    pub fn take_start(&mut self) -> bool {
        if self.pressed && self.ready && !self.started {
            self.started = true;
            return true;
        }
        false
    }

    #[inline]
    pub fn started(&self) -> bool {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_format() {
        let only_ogg = |mime: &str| {
            if mime == "audio/ogg" {
                "maybe".to_string()
            } else {
                String::new()
            }
        };
        assert_eq!(negotiate_format(&MUSIC_FORMATS, only_ogg), Some(SoundFormat::Ogg));
        assert_eq!(
            negotiate_format(&MUSIC_FORMATS, |_| "probably".to_string()),
            Some(SoundFormat::Mp3)
        );
        assert_eq!(negotiate_format(&MUSIC_FORMATS, |_| String::new()), None);
    }

    #[test]
    fn gate_starts_once_after_press_and_decode() {
        let mut gate = MusicGate::new();
        assert!(!gate.take_start());
        assert!(gate.press());
        assert!(!gate.press());
        assert!(!gate.take_start());
        gate.mark_ready();
        assert!(gate.take_start());
        assert!(!gate.take_start());
        assert!(gate.started());
    }

    #[test]
    fn track_path_swaps_extension() {
        assert_eq!(track_path("endleSSStation", SoundFormat::Ogg), "endleSSStation.ogg");
    }
}
