//! Boot entries as seen by the voice-over layer

use crate::voiceover::AudioFileId;

/// What a boot entry starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryKind {
    /// macOS installation
    MacOs,
    /// macOS recovery
    MacOsRecovery,
    /// Time Machine backup
    MacOsTimeMachine,
    /// Firmware update
    MacOsUpdateFw,
    /// Windows
    Windows,
    /// NVRAM reset tool
    ResetNvram,
    /// UEFI shell
    UefiShell,
    /// Generic tool
    Tool,
    /// Disk image
    DiskImage,
    /// Restart
    Restart,
    /// Shut down
    ShutDown,
    /// Anything else
    #[default]
    Other,
}

/// One selectable picker entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BootEntry {
    /// Display name
    pub name: String,
    /// Entry kind
    pub kind: EntryKind,
    /// Lives on an external drive
    pub external: bool,
    /// Explicit voice-over asset, overriding the kind's phrase
    pub audio: Option<AudioFileId>,
}

impl BootEntry {
    /// Entry with a name and kind
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        BootEntry {
            name: name.into(),
            kind,
            external: false,
            audio: None,
        }
    }

    /// Mark as external
    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Attach an explicit voice-over asset
    pub fn with_audio(mut self, audio: AudioFileId) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Phrase announcing this entry
    pub fn voice_cue(&self) -> AudioFileId {
        if let Some(audio) = self.audio {
            return audio;
        }

        match self.kind {
            EntryKind::MacOs => AudioFileId::MAC_OS,
            EntryKind::MacOsRecovery => AudioFileId::MAC_OS_RECOVERY,
            EntryKind::MacOsTimeMachine => AudioFileId::MAC_OS_TIME_MACHINE,
            EntryKind::MacOsUpdateFw => AudioFileId::MAC_OS_UPDATE_FW,
            EntryKind::Windows => AudioFileId::WINDOWS,
            EntryKind::ResetNvram => AudioFileId::RESET_NVRAM,
            EntryKind::UefiShell => AudioFileId::UEFI_SHELL,
            EntryKind::Tool => AudioFileId::EXTERNAL_TOOL,
            EntryKind::DiskImage => AudioFileId::DISK_IMAGE,
            EntryKind::Restart => AudioFileId::RESTART,
            EntryKind::ShutDown => AudioFileId::SHUT_DOWN,
            EntryKind::Other if self.external => AudioFileId::EXTERNAL_OS,
            EntryKind::Other => AudioFileId::OTHER_OS,
        }
    }
}
