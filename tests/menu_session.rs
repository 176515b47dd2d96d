//! Boot picker sessions driven end to end with scripted collaborators

mod common;

use canopy_voice::codec::ToneSpec;
use canopy_voice::engine::{AudioProtocol, Cue, RequestOutcome};
use canopy_voice::picker::{
    BootEntry, CursorOffset, EntryKind, GuiState, InputEvent, MenuOrchestrator, MenuPhase, PickerAttributes,
    PickerContext, ScreenMode, SelectionReason, ViewKind,
};
use canopy_voice::{AudioFileId, ProviderError, VoiceOverError, VolumeLevel};
use common::{all_outputs, Harness, RecordingDisplay, RecordingProvider, ScriptedOutput, ScriptedView, ViewCall};
use std::time::Duration;

fn entries() -> Vec<BootEntry> {
    vec![
        BootEntry::new("Macintosh HD", EntryKind::MacOs),
        BootEntry::new("Windows", EntryKind::Windows),
        BootEntry::new("UEFI Shell", EntryKind::UefiShell),
    ]
}

fn assisted() -> PickerContext {
    PickerContext {
        audio_assist: true,
        timeout_seconds: 5,
        volume: VolumeLevel::new(70, false),
        output: Some(all_outputs()),
        ..Default::default()
    }
}

fn file(id: AudioFileId) -> Cue {
    Cue::File(id)
}

#[test]
fn announces_menu_in_order_with_default_marker() {
    let mut h = Harness::with_polls(2);
    let mut view = ScriptedView::idle();
    let mut display = RecordingDisplay::default();
    let mut picker = assisted();
    let mut gui = GuiState::new();

    let selection = MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref())
        .show_menu(&mut picker, &mut gui, &entries(), 1)
        .unwrap();
    assert_eq!(selection.index, 1);

    assert_eq!(
        h.audio.enqueued,
        vec![
            file(AudioFileId::CHOOSE_OS),
            file(AudioFileId::MAC_OS),
            file(AudioFileId::WINDOWS),
            file(AudioFileId::DEFAULT),
            file(AudioFileId::UEFI_SHELL),
            Cue::Tone(ToneSpec::NORMAL),
        ]
    );
    assert_eq!(h.output.lock().connects, 1, "assisted session connects the configured output");
}

#[test]
fn no_default_marker_without_timeout() {
    let mut h = Harness::with_polls(1);
    let mut view = ScriptedView::new([None, None, Some(InputEvent::Select(0))]);
    let mut display = RecordingDisplay::default();
    let mut picker = PickerContext {
        timeout_seconds: 0,
        ..assisted()
    };
    let mut gui = GuiState::new();

    MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref())
        .show_menu(&mut picker, &mut gui, &entries(), 1)
        .unwrap();

    assert!(!h.audio.enqueued.contains(&file(AudioFileId::DEFAULT)));
    assert!(
        !h.audio.enqueued.contains(&file(AudioFileId::ABORT_TIMEOUT)),
        "no countdown to abort"
    );
}

#[test]
fn failed_asset_is_skipped_and_menu_stays_interactive() {
    let mut h = Harness::new(
        ScriptedOutput::new(2),
        RecordingProvider::new().failing(AudioFileId::WINDOWS),
    );
    let mut view = ScriptedView::idle();
    let mut display = RecordingDisplay::default();
    let mut picker = assisted();
    let mut gui = GuiState::new();

    let mut menu = MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref());
    let selection = menu.show_menu(&mut picker, &mut gui, &entries(), 1).unwrap();
    assert!(menu.phases().contains(&MenuPhase::Interactive));
    assert_eq!(selection.reason, SelectionReason::Timeout);

    let reports = h.audio.take_reports();
    let failed: Vec<_> = reports
        .iter()
        .filter(|r| matches!(r.outcome, RequestOutcome::ProviderFailed(ProviderError::NotFound { .. })))
        .map(|r| r.cue)
        .collect();
    assert_eq!(failed, vec![file(AudioFileId::WINDOWS)]);
    assert_eq!(reports.iter().filter(|r| r.outcome.is_played()).count(), 5);

    let log = h.provider.lock();
    assert_eq!(log.acquired, log.released);
    assert_eq!(h.output.lock().started.len(), 5);
}

#[test]
fn refresh_skips_clear_and_reports_abort() {
    let mut h = Harness::with_polls(1);
    let mut view = ScriptedView::new([None, Some(InputEvent::Refresh)]);
    let mut display = RecordingDisplay::default();
    let mut picker = PickerContext {
        timeout_seconds: 5,
        ..Default::default()
    };
    let mut gui = GuiState::new();

    let mut menu = MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref());
    let err = menu.show_menu(&mut picker, &mut gui, &entries(), 0).unwrap_err();
    assert!(err.is_aborted());
    assert_eq!(
        menu.phases(),
        [
            MenuPhase::Idle,
            MenuPhase::Entering,
            MenuPhase::PopulatingEntries,
            MenuPhase::Interactive,
            MenuPhase::Exiting,
            MenuPhase::Done,
        ]
    );

    assert!(!view.called(&ViewCall::Clear), "refresh keeps the screen for the rebuilt menu");
    assert!(view.called(&ViewCall::Deinitialize));
    assert!(view.called(&ViewCall::Destruct));
    assert_eq!(display.mode, ScreenMode::Text);
    assert_eq!(display.history, vec![ScreenMode::Graphics, ScreenMode::Text]);
}

#[test]
fn timeout_selects_default_after_full_countdown() {
    let mut h = Harness::with_polls(1);
    let mut view = ScriptedView::idle();
    let mut display = RecordingDisplay::default();
    let mut picker = PickerContext {
        timeout_seconds: 5,
        frame_interval: Duration::from_millis(10),
        ..Default::default()
    };
    let mut gui = GuiState::new();

    let selection = MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref())
        .show_menu(&mut picker, &mut gui, &entries(), 1)
        .unwrap();

    assert_eq!(selection.index, 1);
    assert_eq!(selection.reason, SelectionReason::Timeout);
    assert_eq!(selection.elapsed, Duration::from_secs(5));
    assert_eq!(view.frames, 501, "one frame per 10 ms plus the frame at zero");
    assert!(view.called(&ViewCall::Clear));
    assert!(h.audio.enqueued.is_empty(), "assist is off");
}

#[test]
fn user_activity_cancels_countdown() {
    let mut h = Harness::with_polls(1);
    let mut view = ScriptedView::new([
        None,
        Some(InputEvent::Activity),
        None,
        Some(InputEvent::Focus(2)),
        Some(InputEvent::Select(2)),
    ]);
    let mut display = RecordingDisplay::default();
    let mut picker = assisted();
    let mut gui = GuiState::new();

    let selection = MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref())
        .show_menu(&mut picker, &mut gui, &entries(), 1)
        .unwrap();

    assert_eq!(selection.index, 2);
    assert_eq!(selection.reason, SelectionReason::User);

    let after_menu = &h.audio.enqueued[6..];
    assert_eq!(after_menu, [file(AudioFileId::ABORT_TIMEOUT), file(AudioFileId::UEFI_SHELL)]);
    assert_eq!(h.audio.stops, vec![false, true], "focus interrupts, exit silences");
    assert!(h.audio.is_idle());
}

#[test]
fn default_out_of_range_is_rejected() {
    let mut h = Harness::with_polls(1);
    let mut view = ScriptedView::idle();
    let mut display = RecordingDisplay::default();
    let mut picker = PickerContext::default();
    let mut gui = GuiState::new();

    let err = MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref())
        .show_menu(&mut picker, &mut gui, &entries(), 3)
        .unwrap_err();
    assert!(matches!(err, VoiceOverError::SessionInit(_)));
    assert!(view.calls.is_empty());
    assert!(display.history.is_empty());
}

#[test]
fn registration_failure_unwinds_view() {
    let mut h = Harness::with_polls(1);
    let mut view = ScriptedView::idle().failing_register(1);
    let mut display = RecordingDisplay::default();
    let mut picker = PickerContext::default();
    let mut gui = GuiState::new();

    let mut menu = MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref());
    let err = menu.show_menu(&mut picker, &mut gui, &entries(), 0).unwrap_err();
    assert!(matches!(err, VoiceOverError::EntryRegistration { index: 1, .. }));
    assert_eq!(
        menu.phases(),
        [
            MenuPhase::Idle,
            MenuPhase::Entering,
            MenuPhase::PopulatingEntries,
            MenuPhase::Exiting,
            MenuPhase::Done,
        ]
    );

    assert_eq!(
        view.calls,
        vec![
            ViewCall::Construct(CursorOffset { x: 4, y: 112 }),
            ViewCall::Initialize(ViewKind::BootPicker { entry_count: 3 }),
            ViewCall::Register(0),
            ViewCall::Deinitialize,
            ViewCall::Destruct,
        ]
    );
    assert_eq!(display.mode, ScreenMode::Text);
}

#[test]
fn view_init_failure_restores_display() {
    let mut h = Harness::with_polls(1);
    let mut view = ScriptedView::idle().failing_initialize();
    let mut display = RecordingDisplay::default();
    let mut picker = PickerContext::default();
    let mut gui = GuiState::new();

    let err = MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref())
        .show_menu(&mut picker, &mut gui, &entries(), 0)
        .unwrap_err();
    assert!(matches!(err, VoiceOverError::SessionInit(_)));
    assert!(view.called(&ViewCall::Destruct));
    assert!(!view.called(&ViewCall::Deinitialize), "view was never initialized");
    assert_eq!(display.history, vec![ScreenMode::Graphics, ScreenMode::Text]);
    assert_eq!(gui.sessions(), 0);
}

#[test]
fn construct_failure_leaves_display_alone() {
    let mut h = Harness::with_polls(1);
    let mut view = ScriptedView::idle().failing_construct();
    let mut display = RecordingDisplay::default();
    let mut picker = PickerContext::default();
    let mut gui = GuiState::new();

    let err = MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref())
        .show_menu(&mut picker, &mut gui, &entries(), 0)
        .unwrap_err();
    assert!(matches!(err, VoiceOverError::SessionInit(_)));
    assert!(display.history.is_empty());
}

#[test]
fn output_failure_aborts_assisted_session() {
    let mut h = Harness::new(ScriptedOutput::new(1).failing_connect(), RecordingProvider::new());
    let mut view = ScriptedView::idle();
    let mut display = RecordingDisplay::default();
    let mut picker = assisted();
    let mut gui = GuiState::new();

    let err = MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref())
        .show_menu(&mut picker, &mut gui, &entries(), 0)
        .unwrap_err();
    assert!(matches!(err, VoiceOverError::Codec(_)));
    assert!(view.calls.is_empty());
}

#[test]
fn muted_system_stays_silent() {
    let mut h = Harness::with_polls(1);
    let mut view = ScriptedView::new([Some(InputEvent::Select(0))]);
    let mut display = RecordingDisplay::default();
    let mut picker = PickerContext {
        volume: VolumeLevel::new(70, true),
        ..assisted()
    };
    let mut gui = GuiState::new();

    MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref())
        .show_menu(&mut picker, &mut gui, &entries(), 0)
        .unwrap();
    assert!(h.audio.enqueued.is_empty());
    assert_eq!(h.output.lock().connects, 0);
}

#[test]
fn cursor_default_applies_once_then_persists() {
    let mut h = Harness::with_polls(1);
    let mut display = RecordingDisplay::default();
    let mut picker = PickerContext {
        scale: 2,
        ..Default::default()
    };
    let mut gui = GuiState::new();

    let moved = CursorOffset { x: 50, y: 60 };
    let mut first = ScriptedView::new([Some(InputEvent::Select(0))]).leaving_cursor_at(moved);
    MenuOrchestrator::new(&mut h.audio, &mut first, &mut display, h.clock.as_ref())
        .show_menu(&mut picker, &mut gui, &entries(), 0)
        .unwrap();
    assert_eq!(first.calls[0], ViewCall::Construct(CursorOffset { x: 8, y: 224 }));

    let mut second = ScriptedView::new([Some(InputEvent::Select(0))]);
    MenuOrchestrator::new(&mut h.audio, &mut second, &mut display, h.clock.as_ref())
        .show_menu(&mut picker, &mut gui, &entries(), 0)
        .unwrap();
    assert_eq!(second.calls[0], ViewCall::Construct(moved));
    assert_eq!(gui.sessions(), 2);
}

#[test]
fn toggling_auxiliary_persists_and_requests_rebuild() {
    let mut h = Harness::with_polls(3);
    let mut view = ScriptedView::new([Some(InputEvent::ToggleAuxiliary)]);
    let mut display = RecordingDisplay::default();
    let mut picker = assisted();
    let mut gui = GuiState::new();
    assert!(picker.hide_auxiliary);

    let err = MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref())
        .show_menu(&mut picker, &mut gui, &entries(), 0)
        .unwrap_err();
    assert!(err.is_aborted());
    assert!(!picker.hide_auxiliary);
    assert_eq!(h.audio.enqueued.last(), Some(&file(AudioFileId::SHOW_AUXILIARY)));
    assert!(!view.called(&ViewCall::Clear));

    let reports = h.audio.take_reports();
    let shown = reports
        .iter()
        .find(|r| r.cue == file(AudioFileId::SHOW_AUXILIARY))
        .map(|r| r.outcome.clone());
    assert_eq!(shown, Some(RequestOutcome::Played), "announcement plays out before the rebuild");
}

#[test]
fn reduce_motion_disables_ease_in() {
    let picker = PickerContext {
        attributes: PickerAttributes::REDUCE_MOTION,
        ..Default::default()
    };
    assert!(!picker.use_ease_in());
}

#[test]
fn reused_orchestrator_reports_only_its_latest_session() {
    let mut h = Harness::with_polls(1);
    let mut view = ScriptedView::new([Some(InputEvent::Select(0)), Some(InputEvent::Select(2))]);
    let mut display = RecordingDisplay::default();
    let mut picker = PickerContext::default();
    let mut gui = GuiState::new();

    let mut menu = MenuOrchestrator::new(&mut h.audio, &mut view, &mut display, h.clock.as_ref());
    for expected in [0, 2] {
        let selection = menu.show_menu(&mut picker, &mut gui, &entries(), 0).unwrap();
        assert_eq!(selection.index, expected);
        assert_eq!(
            menu.phases(),
            [
                MenuPhase::Idle,
                MenuPhase::Entering,
                MenuPhase::PopulatingEntries,
                MenuPhase::Interactive,
                MenuPhase::Exiting,
                MenuPhase::Done,
            ]
        );
    }
}
