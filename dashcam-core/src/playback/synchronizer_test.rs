#[cfg(test)]
mod tests {
    use super::super::handle::{CameraRegistry, MediaHandle};
    use super::super::simulated::SimulatedCamera;
    use super::super::synchronizer::PlaybackSynchronizer;
    use crate::config::SyncConfig;
    use crate::errors::PlaybackError;
    use crate::footage::{resolve_durations, Footage};
    use crate::timeline::{TimelineBuilder, UnifiedTimeline};
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use common::{
        CameraEvent, CameraEventKind, CameraPosition, ClipEvent, PlaybackCommand, RawMediaFile,
        TransportState,
    };

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 19)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    /// Footage at `offset_secs` with one file per listed camera
    fn footage(offset_secs: i64, cameras: &[(CameraPosition, f64)]) -> Footage {
        let date = start() + Duration::seconds(offset_secs);
        let key = date.format("%Y-%m-%d_%H-%M-%S").to_string();
        let assignments = cameras
            .iter()
            .map(|(camera, duration)| {
                let name = format!("{}-{}.mp4", key, camera.label());
                (*camera, RawMediaFile::new(name.clone(), 1024, *duration, name))
            })
            .collect();
        Footage::new(key, date, assignments)
    }

    fn all_cameras(duration: f64) -> Vec<(CameraPosition, f64)> {
        CameraPosition::ALL.iter().map(|c| (*c, duration)).collect()
    }

    /// Three complete footages 60 s apart, the last one 58 s long
    fn three_footage_timeline(event: Option<ClipEvent>) -> UnifiedTimeline {
        let mut footages = vec![
            footage(0, &all_cameras(60.0)),
            footage(60, &all_cameras(60.0)),
            footage(120, &all_cameras(58.0)),
        ];
        resolve_durations(&mut footages);
        TimelineBuilder::build_from_footages("clip-test", footages, event)
    }

    fn synchronizer(config: SyncConfig) -> PlaybackSynchronizer<SimulatedCamera> {
        PlaybackSynchronizer::new(CameraRegistry::with_all(SimulatedCamera::new), config)
    }

    fn loaded(timeline: UnifiedTimeline) -> PlaybackSynchronizer<SimulatedCamera> {
        let mut sync = synchronizer(SyncConfig::default());
        sync.load(timeline).unwrap();
        sync.pump();
        sync
    }

    fn paused_config() -> SyncConfig {
        SyncConfig {
            autoplay: false,
            ..SyncConfig::default()
        }
    }

    /// Drive one camera to the end of its media and deliver the callbacks
    fn finish(sync: &mut PlaybackSynchronizer<SimulatedCamera>, camera: CameraPosition) {
        if let Some(handle) = sync.cameras_mut().get_mut(camera) {
            handle.set_position(f64::MAX);
        }
        sync.pump();
    }

    fn finish_all(sync: &mut PlaybackSynchronizer<SimulatedCamera>) {
        for camera in CameraPosition::ALL {
            finish(sync, camera);
        }
    }

    fn run_until_end(sync: &mut PlaybackSynchronizer<SimulatedCamera>) -> usize {
        let mut ticks = 0;
        while !sync.state().is_at_end_of_clip && ticks < 1_000 {
            sync.advance(1.0);
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn test_idle_until_loaded() {
        let mut sync = synchronizer(SyncConfig::default());
        assert_eq!(sync.transport_state(), TransportState::Idle);
        assert_eq!(sync.play(), Err(PlaybackError::NoTimeline));
        assert_eq!(sync.seek(10.0), Err(PlaybackError::NoTimeline));
    }

    #[test]
    fn test_load_requires_cameras_and_footage() {
        let mut empty = PlaybackSynchronizer::<SimulatedCamera>::new(
            CameraRegistry::new(),
            SyncConfig::default(),
        );
        assert_eq!(
            empty.load(three_footage_timeline(None)),
            Err(PlaybackError::NoCameras)
        );

        let mut sync = synchronizer(SyncConfig::default());
        let timeline = TimelineBuilder::build_from_footages("empty", Vec::new(), None);
        assert_eq!(sync.load(timeline), Err(PlaybackError::EmptyTimeline));
    }

    #[test]
    fn test_load_points_cameras_at_first_footage() {
        let mut sync = synchronizer(SyncConfig::default());
        sync.load(three_footage_timeline(None)).unwrap();
        assert_eq!(sync.transport_state(), TransportState::Loading);

        sync.pump();
        assert_eq!(sync.transport_state(), TransportState::Playing);
        assert_eq!(sync.state().current_footage_index, 0);
        assert_eq!(sync.state().ready_cameras.len(), 4);

        for (_, camera) in sync.cameras().iter() {
            assert_eq!(camera.token(), sync.current_token());
            assert_eq!(camera.source_duration(), Some(60.0));
            assert!(!camera.is_paused());
        }
    }

    #[test]
    fn test_autoplay_disabled_loads_paused() {
        let mut sync = synchronizer(paused_config());
        sync.load(three_footage_timeline(None)).unwrap();
        sync.pump();

        assert_eq!(sync.transport_state(), TransportState::Paused);
        assert!(sync.cameras().iter().all(|(_, c)| c.is_paused()));
    }

    #[test]
    fn test_plays_through_every_footage_to_end_of_clip() {
        let mut sync = loaded(three_footage_timeline(None));

        let ticks = run_until_end(&mut sync);
        assert!(ticks >= 178 && ticks < 185, "took {} ticks", ticks);
        assert_eq!(sync.transport_state(), TransportState::EndOfClip);
        assert_eq!(sync.state().current_footage_index, 2);
        assert_eq!(sync.global_time(), 178.0);
        assert!(!sync.state().is_playing);
        assert!(sync.cameras().iter().all(|(_, c)| c.is_paused()));
    }

    #[test]
    fn test_play_after_end_restarts_from_first_footage() {
        let mut sync = loaded(three_footage_timeline(None));
        run_until_end(&mut sync);

        sync.play().unwrap();
        sync.pump();

        assert_eq!(sync.state().current_footage_index, 0);
        assert!(!sync.state().is_at_end_of_clip);
        assert!(sync.state().is_playing);
        assert!(sync.state().per_camera_ended.is_empty());
        assert_eq!(sync.global_time(), 0.0);
        assert_eq!(sync.transport_state(), TransportState::Playing);
    }

    #[test]
    fn test_barrier_waits_for_every_camera() {
        let mut sync = loaded(three_footage_timeline(None));

        for camera in [CameraPosition::Front, CameraPosition::Back, CameraPosition::LeftRepeater] {
            finish(&mut sync, camera);
            assert_eq!(sync.state().current_footage_index, 0);
        }

        finish(&mut sync, CameraPosition::RightRepeater);
        assert_eq!(sync.state().current_footage_index, 1);
        assert!(sync.state().per_camera_ended.is_empty());
        assert_eq!(sync.global_time(), 60.0);
    }

    #[test]
    fn test_missing_camera_is_not_waited_on() {
        let no_back: Vec<(CameraPosition, f64)> = all_cameras(60.0)
            .into_iter()
            .filter(|(c, _)| *c != CameraPosition::Back)
            .collect();
        let mut footages = vec![footage(0, &no_back), footage(60, &all_cameras(60.0))];
        resolve_durations(&mut footages);
        assert!(!footages[0].is_complete);

        let mut sync = loaded(TimelineBuilder::build_from_footages("clip", footages, None));
        let back = sync.cameras().get(CameraPosition::Back).unwrap();
        assert!(back.is_blank());

        for camera in [
            CameraPosition::Front,
            CameraPosition::LeftRepeater,
            CameraPosition::RightRepeater,
        ] {
            finish(&mut sync, camera);
        }
        assert_eq!(sync.state().current_footage_index, 1);
    }

    #[test]
    fn test_ended_from_absent_camera_is_ignored() {
        let mut footages = vec![
            footage(0, &[(CameraPosition::Front, 60.0)]),
            footage(60, &[(CameraPosition::Front, 60.0)]),
        ];
        resolve_durations(&mut footages);
        let mut sync = loaded(TimelineBuilder::build_from_footages("clip", footages, None));

        let event = CameraEvent::new(CameraPosition::Back, sync.current_token(), CameraEventKind::Ended);
        sync.handle_event(event);
        assert!(sync.state().per_camera_ended.is_empty());
        assert_eq!(sync.state().current_footage_index, 0);
    }

    #[test]
    fn test_stale_events_are_ignored() {
        let mut sync = loaded(three_footage_timeline(None));
        let stale = sync.current_token();

        sync.seek(65.0).unwrap();
        assert_ne!(sync.current_token(), stale);

        for camera in CameraPosition::ALL {
            sync.handle_event(CameraEvent::new(camera, stale, CameraEventKind::Ended));
        }
        assert_eq!(sync.state().current_footage_index, 1);
        assert!(sync.state().per_camera_ended.is_empty());
    }

    #[test]
    fn test_first_progress_after_swap_is_dropped() {
        let mut sync = loaded(three_footage_timeline(None));
        let token = sync.current_token();
        sync.seek(30.0).unwrap();
        assert_eq!(sync.current_token(), token);
        assert_eq!(sync.global_time(), 30.0);

        let progress = |position| {
            CameraEvent::new(
                CameraPosition::Front,
                token,
                CameraEventKind::TimeUpdate { position },
            )
        };
        sync.handle_event(progress(2.0));
        assert_eq!(sync.global_time(), 30.0);

        sync.handle_event(progress(31.0));
        assert_eq!(sync.global_time(), 31.0);
    }

    #[test]
    fn test_seek_across_footages() {
        let mut sync = loaded(three_footage_timeline(None));

        sync.seek(125.0).unwrap();
        assert_eq!(sync.state().current_footage_index, 2);
        assert_eq!(sync.global_time(), 125.0);
        for (_, camera) in sync.cameras().iter() {
            assert_eq!(camera.position(), 5.0);
            assert_eq!(camera.source_duration(), Some(58.0));
        }

        sync.seek(-20.0).unwrap();
        assert_eq!(sync.state().current_footage_index, 0);
        assert_eq!(sync.global_time(), 0.0);

        sync.seek(f64::NAN).unwrap();
        assert_eq!(sync.global_time(), 0.0);
    }

    #[test]
    fn test_seek_within_footage_keeps_sources() {
        let mut sync = loaded(three_footage_timeline(None));
        let token = sync.current_token();

        sync.seek(42.5).unwrap();
        assert_eq!(sync.current_token(), token);
        assert!(sync.cameras().iter().all(|(_, c)| c.position() == 42.5));
    }

    #[test]
    fn test_seek_past_camera_end_marks_it_ended() {
        let mut footages = vec![
            footage(
                0,
                &[
                    (CameraPosition::Front, 60.0),
                    (CameraPosition::Back, 50.0),
                ],
            ),
            footage(60, &all_cameras(60.0)),
        ];
        resolve_durations(&mut footages);

        let mut sync = synchronizer(paused_config());
        sync.load(TimelineBuilder::build_from_footages("clip", footages, None))
            .unwrap();
        sync.pump();

        sync.seek(55.0).unwrap();
        assert!(sync.state().per_camera_ended.contains(&CameraPosition::Back));
        assert!(!sync.state().per_camera_ended.contains(&CameraPosition::Front));

        sync.seek(20.0).unwrap();
        sync.pump();
        assert!(sync.state().per_camera_ended.is_empty());
    }

    #[test]
    fn test_paused_barrier_holds_until_play() {
        let mut sync = synchronizer(paused_config());
        sync.load(three_footage_timeline(None)).unwrap();
        sync.pump();

        for camera in CameraPosition::ALL {
            finish(&mut sync, camera);
        }
        assert_eq!(sync.state().current_footage_index, 0);
        assert_eq!(sync.state().per_camera_ended.len(), 4);

        sync.play().unwrap();
        assert_eq!(sync.state().current_footage_index, 1);
        assert_eq!(sync.transport_state(), TransportState::Playing);
    }

    #[test]
    fn test_seek_to_end_while_paused_does_not_finish_clip() {
        let mut sync = synchronizer(paused_config());
        sync.load(three_footage_timeline(None)).unwrap();
        sync.pump();

        sync.seek(178.0).unwrap();
        sync.pump();
        assert_eq!(sync.state().current_footage_index, 2);
        assert!(!sync.state().is_at_end_of_clip);

        sync.play().unwrap();
        assert!(sync.state().is_at_end_of_clip);
    }

    #[test]
    fn test_scrub_suppresses_playback() {
        let mut sync = loaded(three_footage_timeline(None));

        sync.begin_scrub().unwrap();
        assert_eq!(sync.transport_state(), TransportState::Seeking);
        assert!(sync.cameras().iter().all(|(_, c)| c.is_paused()));

        sync.seek(70.0).unwrap();
        sync.pump();
        assert!(sync.cameras().iter().all(|(_, c)| c.is_paused()));

        sync.advance(1.0);
        assert_eq!(sync.global_time(), 70.0);

        sync.end_scrub().unwrap();
        assert_eq!(sync.transport_state(), TransportState::Playing);
        assert!(sync.cameras().iter().all(|(_, c)| !c.is_paused()));
    }

    #[test]
    fn test_scrub_while_paused_stays_paused() {
        let mut sync = synchronizer(paused_config());
        sync.load(three_footage_timeline(None)).unwrap();
        sync.pump();

        sync.begin_scrub().unwrap();
        sync.seek(90.0).unwrap();
        sync.end_scrub().unwrap();
        sync.pump();

        assert_eq!(sync.transport_state(), TransportState::Paused);
        assert!(sync.cameras().iter().all(|(_, c)| c.is_paused()));
    }

    #[test]
    fn test_pause_stops_every_camera() {
        let mut sync = loaded(three_footage_timeline(None));
        sync.pause().unwrap();

        assert_eq!(sync.transport_state(), TransportState::Paused);
        assert!(sync.cameras().iter().all(|(_, c)| c.is_paused()));

        sync.toggle_play().unwrap();
        assert!(sync.cameras().iter().all(|(_, c)| !c.is_paused()));
    }

    #[test]
    fn test_playback_rate_is_uniform_and_survives_swaps() {
        let mut sync = loaded(three_footage_timeline(None));

        sync.set_playback_rate(2.0).unwrap();
        assert!(sync.cameras().iter().all(|(_, c)| c.playback_rate() == 2.0));

        sync.seek(100.0).unwrap();
        assert_eq!(sync.state().current_footage_index, 1);
        assert!(sync.cameras().iter().all(|(_, c)| c.playback_rate() == 2.0));

        // Natural advance reloads every source as well
        finish_all(&mut sync);
        assert_eq!(sync.state().current_footage_index, 2);
        assert!(sync.cameras().iter().all(|(_, c)| c.playback_rate() == 2.0));

        assert!(matches!(
            sync.set_playback_rate(12.0),
            Err(PlaybackError::InvalidPlaybackRate { .. })
        ));
        assert_eq!(sync.state().playback_rate, 2.0);
    }

    #[test]
    fn test_double_speed_finishes_in_half_the_ticks() {
        let mut sync = loaded(three_footage_timeline(None));
        sync.set_playback_rate(2.0).unwrap();

        let ticks = run_until_end(&mut sync);
        assert!(ticks >= 89 && ticks < 95, "took {} ticks", ticks);
    }

    #[test]
    fn test_seek_relative_clamps() {
        let mut sync = loaded(three_footage_timeline(None));

        sync.seek_relative(-10.0).unwrap();
        assert_eq!(sync.global_time(), 0.0);

        sync.seek_relative(70.0).unwrap();
        assert_eq!(sync.global_time(), 70.0);
        assert_eq!(sync.state().current_footage_index, 1);

        sync.seek_relative(500.0).unwrap();
        assert_eq!(sync.global_time(), 178.0);
    }

    #[test]
    fn test_jump_to_event() {
        let event = ClipEvent {
            timestamp: "2024-06-19T14:31:30".to_string(),
            city: String::new(),
            est_lat: String::new(),
            est_lon: String::new(),
            reason: "user_interaction_honk".to_string(),
            camera: String::new(),
        };
        let mut sync = loaded(three_footage_timeline(Some(event.clone())));

        assert_eq!(sync.jump_to_event(), Ok(true));
        assert_eq!(sync.global_time(), 85.0);
        assert_eq!(sync.state().current_footage_index, 1);

        let mut late = event.clone();
        late.timestamp = "2024-06-19T18:00:00".to_string();
        let mut sync = loaded(three_footage_timeline(Some(late)));
        sync.seek(10.0).unwrap();
        assert_eq!(sync.jump_to_event(), Ok(false));
        assert_eq!(sync.global_time(), 10.0);

        let mut early = event;
        early.timestamp = "2024-06-19T14:30:02".to_string();
        let mut sync = loaded(three_footage_timeline(Some(early)));
        assert_eq!(sync.jump_to_event(), Ok(true));
        assert_eq!(sync.global_time(), 0.0);
    }

    #[test]
    fn test_jump_to_event_without_event() {
        let mut sync = loaded(three_footage_timeline(None));
        assert_eq!(sync.jump_to_event(), Err(PlaybackError::NoEvent));
    }

    #[test]
    fn test_jump_to_footage_end() {
        let mut sync = loaded(three_footage_timeline(None));
        sync.seek(61.0).unwrap();

        assert_eq!(sync.jump_to_footage_end(), Ok(true));
        assert_eq!(sync.global_time(), 117.0);
        assert_eq!(sync.state().current_footage_index, 1);
    }

    #[test]
    fn test_footage_navigation() {
        let mut sync = loaded(three_footage_timeline(None));

        assert_eq!(sync.previous_footage(), Ok(false));
        assert_eq!(sync.next_footage(), Ok(true));
        assert_eq!(sync.global_time(), 60.0);
        assert_eq!(sync.next_footage(), Ok(true));
        assert_eq!(sync.next_footage(), Ok(false));
        assert_eq!(sync.state().current_footage_index, 2);

        let nav = sync.navigation().unwrap();
        assert!(nav.can_go_previous);
        assert!(!nav.can_go_next);
        assert_eq!(nav.current_footage, 3);

        assert_eq!(
            sync.go_to_footage(9),
            Err(PlaybackError::FootageOutOfRange { index: 9, len: 3 })
        );
        sync.go_to_footage(0).unwrap();
        assert_eq!(sync.state().current_footage_index, 0);
    }

    #[test]
    fn test_apply_commands() {
        let mut sync = loaded(three_footage_timeline(None));

        sync.apply(PlaybackCommand::Pause).unwrap();
        assert!(!sync.state().is_playing);
        sync.apply(PlaybackCommand::Seek { position: 130.0 }).unwrap();
        assert_eq!(sync.state().current_footage_index, 2);
        sync.apply(PlaybackCommand::PreviousFootage).unwrap();
        assert_eq!(sync.state().current_footage_index, 1);
        sync.apply(PlaybackCommand::SetRate { rate: 0.5 }).unwrap();
        assert_eq!(sync.snapshot().playback_rate, 0.5);
        sync.apply(PlaybackCommand::TogglePlay).unwrap();
        assert!(sync.snapshot().is_playing);
        assert!(sync.apply(PlaybackCommand::JumpToEvent).is_err());
    }

    #[test]
    fn test_unload_returns_to_idle() {
        let mut sync = loaded(three_footage_timeline(None));
        sync.unload();

        assert_eq!(sync.transport_state(), TransportState::Idle);
        assert!(sync.cameras().iter().all(|(_, c)| c.is_blank() && c.is_paused()));
    }

    #[test]
    fn test_snapshot_progress() {
        let mut sync = loaded(three_footage_timeline(None));
        sync.seek(89.0).unwrap();

        let snapshot = sync.snapshot();
        assert_eq!(snapshot.total_duration, 178.0);
        assert_eq!(snapshot.progress_percent(), 50.0);
        assert_eq!(snapshot.current_footage_index, 1);
    }

    #[test]
    fn test_registry_without_every_camera() {
        let mut registry = CameraRegistry::new();
        registry.insert(CameraPosition::Front, SimulatedCamera::new(CameraPosition::Front));
        let mut sync = PlaybackSynchronizer::new(registry, SyncConfig::default());
        sync.load(three_footage_timeline(None)).unwrap();
        sync.pump();

        finish(&mut sync, CameraPosition::Front);
        assert_eq!(sync.state().current_footage_index, 1);
    }

    #[test]
    fn test_footage_without_registered_camera_is_skipped() {
        let mut registry = CameraRegistry::new();
        registry.insert(CameraPosition::Front, SimulatedCamera::new(CameraPosition::Front));
        let mut footages = vec![
            footage(0, &[(CameraPosition::Back, 60.0)]),
            footage(60, &[(CameraPosition::Front, 60.0)]),
        ];
        resolve_durations(&mut footages);
        let timeline = TimelineBuilder::build_from_footages("clip-back-only", footages, None);

        let mut sync = PlaybackSynchronizer::new(registry, SyncConfig::default());
        sync.load(timeline).unwrap();
        assert_eq!(sync.state().current_footage_index, 1);
        assert_eq!(sync.global_time(), 60.0);

        sync.pump();
        assert_eq!(sync.transport_state(), TransportState::Playing);

        run_until_end(&mut sync);
        assert_eq!(sync.transport_state(), TransportState::EndOfClip);

        // Restarting lands on the same skipped footage and moves past it again
        sync.play().unwrap();
        assert_eq!(sync.state().current_footage_index, 1);
        assert!(sync.state().is_playing);
    }

    #[test]
    fn test_late_ready_camera_joins_playback() {
        let mut registry = CameraRegistry::with_all(SimulatedCamera::new);
        registry.insert(
            CameraPosition::Back,
            SimulatedCamera::new(CameraPosition::Back).with_manual_ready(),
        );
        let mut sync = PlaybackSynchronizer::new(registry, SyncConfig::default());
        sync.load(three_footage_timeline(None)).unwrap();
        sync.pump();

        assert_eq!(sync.state().ready_cameras.len(), 3);
        assert_eq!(sync.transport_state(), TransportState::Playing);

        sync.advance(5.0);
        let back = sync.cameras_mut().get_mut(CameraPosition::Back).unwrap();
        assert_eq!(back.position(), 0.0);
        back.mark_ready();
        sync.pump();

        assert!(sync.state().ready_cameras.contains(&CameraPosition::Back));
        sync.advance(1.0);
        assert_eq!(sync.cameras().get(CameraPosition::Back).unwrap().position(), 1.0);
    }
}
