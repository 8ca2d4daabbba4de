use pretty_assertions::assert_eq;

use mohawk_script::testing::{Call, RecordingEngine, ScriptBuilder, TestArea};
use mohawk_script::{
    Rect, RunReport, ScriptError, ScriptKind, SoundBlock, Stack, Transition, Vm, VmConfig,
    VmConfigBuilder,
};

fn config() -> VmConfig {
    VmConfigBuilder::new().with_drawing_time_simulation(false).get()
}

fn run(engine: &mut RecordingEngine, invoking: Option<u16>, ops: &[(u16, u16, &[u16])]) -> RunReport {
    run_with(config(), engine, invoking, ops)
}

fn run_with(
    config: VmConfig,
    engine: &mut RecordingEngine,
    invoking: Option<u16>,
    ops: &[(u16, u16, &[u16])],
) -> RunReport {
    let script = ops
        .iter()
        .fold(ScriptBuilder::new(ScriptKind::Normal), |b, &(opcode, var, args)| {
            b.op(opcode, var, args)
        })
        .script();
    Vm::new(config).run(engine, &script, invoking)
}

fn six_areas() -> Vec<TestArea> {
    (0..6).map(|i| TestArea::new(1000 + i)).collect()
}

fn enabled(engine: &RecordingEngine) -> Vec<bool> {
    engine.resources.iter().map(|a| a.enabled).collect()
}

#[test]
fn bulk_disable_uses_invoking_sentinel() {
    let mut engine = RecordingEngine::new(1).with_resources(six_areas());
    let report = run(&mut engine, Some(3), &[(20, 0, &[2, 0xFFFF, 5])]);

    assert!(report.is_clean());
    assert_eq!(enabled(&engine), vec![true, true, true, false, true, false]);
}

#[test]
fn bulk_toggle_and_enable() {
    let mut engine = RecordingEngine::new(1).with_resources(six_areas());
    engine.resources[5].enabled = false;

    run(&mut engine, Some(0), &[(23, 0, &[2, 0xFFFF, 5])]);
    assert_eq!(enabled(&engine), vec![false, true, true, true, true, true]);

    run(&mut engine, Some(0), &[(19, 0, &[1, 0xFFFF])]);
    assert_eq!(enabled(&engine), vec![true; 6]);
}

#[test]
fn bulk_count_mismatch_is_fatal() {
    let mut engine = RecordingEngine::new(1).with_resources(six_areas());
    let report = run(&mut engine, Some(3), &[(20, 0, &[2, 5])]);

    assert_eq!(
        report.failures[0].error,
        ScriptError::InvalidArguments { opcode: 20, argc: 2 }
    );
    assert!(report.has_fatal());
    assert_eq!(enabled(&engine), vec![true; 6]);
}

#[test]
fn bulk_unknown_resource_is_skipped() {
    let mut engine = RecordingEngine::new(1).with_resources(six_areas());
    // no invoking area either
    let report = run(&mut engine, None, &[(20, 0, &[3, 40, 0xFFFF, 1])]);

    assert!(report.is_clean());
    assert_eq!(enabled(&engine), vec![true, false, true, true, true, true]);
}

#[test]
fn sound_wait_polls_until_silent() {
    let mut engine = RecordingEngine::new(1);
    engine.playing_polls = 4;

    let report = run(&mut engine, None, &[(46, 0, &[])]);

    assert!(report.is_clean());
    assert_eq!(engine.delays(), vec![10, 10, 10, 10]);
    assert_eq!(engine.playing_polls, 0);
}

#[test]
fn sound_wait_honors_quit() {
    let mut engine = RecordingEngine::new(1);
    engine.playing_polls = 1000;
    engine.quit_after_delays = Some(3);

    let report = run(&mut engine, None, &[(46, 0, &[]), (37, 0, &[])]);

    assert!(report.interrupted);
    assert_eq!(report.failures[0].error, ScriptError::Interrupted);
    assert_eq!(engine.delays().len(), 3);
    assert!(!engine.calls.contains(&Call::HideCursor));
}

#[test]
fn zero_quantum_still_sleeps() {
    let zero = VmConfigBuilder::new()
        .with_drawing_time_simulation(false)
        .with_sound_wait_quantum_ms(0)
        .get();

    let mut engine = RecordingEngine::new(1);
    engine.playing_polls = 2;
    run_with(zero.clone(), &mut engine, None, &[(46, 0, &[])]);
    assert_eq!(engine.delays(), vec![1, 1]);

    let mut engine = RecordingEngine::new(1);
    run_with(zero, &mut engine, None, &[(39, 0, &[3])]);
    assert_eq!(engine.delays(), vec![1, 1, 1]);
}

#[test]
fn delay_is_chunked_by_the_quantum() {
    let mut engine = RecordingEngine::new(1);
    run(&mut engine, None, &[(39, 0, &[25])]);
    assert_eq!(engine.delays(), vec![10, 10, 5]);

    let mut engine = RecordingEngine::new(1);
    let coarse = VmConfigBuilder::new()
        .with_drawing_time_simulation(false)
        .with_sound_wait_quantum_ms(100)
        .get();
    run_with(coarse, &mut engine, None, &[(39, 0, &[250])]);
    assert_eq!(engine.delays(), vec![100, 100, 50]);
}

#[test]
fn back_buffer_blit_remaps_staircase_image() {
    let mut engine = RecordingEngine::new(1);
    run(&mut engine, None, &[(29, 0, &[7158, 10, 20, 110, 70, 0xFFFF, 5])]);

    assert_eq!(
        engine.calls,
        vec![Call::CopyImageSectionToBackBuffer {
            image: 7178,
            src: Rect::new(10, 20, 110, 70),
            dst: Rect::new(0, 0, 100, 50),
        }]
    );
}

#[test]
fn screen_blit_keeps_image_and_origin() {
    let mut engine = RecordingEngine::new(1);
    run(&mut engine, None, &[(33, 0, &[7158, 0, 0, 50, 50, 30, 40])]);

    assert_eq!(
        engine.calls,
        vec![
            Call::CopyImageSectionToScreen {
                image: 7158,
                src: Rect::new(0, 0, 50, 50),
                dst: Rect::new(30, 40, 80, 90),
            },
            Call::UpdateScreen,
        ]
    );
}

#[test]
fn blit_with_missing_origin_is_fatal() {
    let mut engine = RecordingEngine::new(1);
    let report = run(&mut engine, None, &[(29, 0, &[1, 0, 0, 10, 10, 4])]);

    assert_eq!(
        report.failures[0].error,
        ScriptError::ArgumentOutOfRange { opcode: 29, index: 6, argc: 6 }
    );
    assert!(engine.calls.is_empty());
}

#[test]
fn card_switch_selects_by_variable() {
    let mut engine = RecordingEngine::new(1)
        .with_var(12, 2)
        .with_resources(vec![TestArea::new(555)]);
    run(&mut engine, None, &[(2, 12, &[1000, 2000])]);
    assert_eq!(engine.card_changes(), vec![(2000, Transition::Dissolve)]);

    let mut engine = RecordingEngine::new(1)
        .with_var(12, 0)
        .with_resources(vec![TestArea::new(555)]);
    run(&mut engine, Some(0), &[(12, 12, &[1000, 2000])]);
    assert_eq!(engine.card_changes(), vec![(555, Transition::LeftToRight)]);

    let mut engine = RecordingEngine::new(1).with_var(12, 0);
    let report = run(&mut engine, None, &[(13, 12, &[1000])]);
    assert!(report.is_clean());
    assert!(engine.card_changes().is_empty());

    let mut engine = RecordingEngine::new(1).with_var(12, 3);
    let report = run(&mut engine, None, &[(13, 12, &[1000, 2000])]);
    assert_eq!(
        report.failures[0].error,
        ScriptError::ArgumentOutOfRange { opcode: 13, index: 2, argc: 2 }
    );
}

#[test]
fn temp_var_is_a_vm_register() {
    let mut engine = RecordingEngine::new(1);
    let report = run(
        &mut engine,
        None,
        &[(1, 105, &[3]), (13, 105, &[100, 200, 300])],
    );

    assert!(report.is_clean());
    assert_eq!(engine.card_changes(), vec![(300, Transition::RightToLeft)]);
    assert!(!engine.calls.contains(&Call::RedrawArea(105)));
}

#[test]
fn ending_var_reads_globals() {
    let mut engine = RecordingEngine::new(1);
    engine.globals.ending = 1;
    run(&mut engine, None, &[(2, 106, &[4, 5])]);
    assert_eq!(engine.card_changes(), vec![(4, Transition::Dissolve)]);
}

#[test]
fn set_var_redraw_is_per_variable() {
    let mut engine = RecordingEngine::new(1).with_var(20, 0).with_var(21, 0);
    engine.redraw_on_set.insert(20);

    run(&mut engine, None, &[(1, 20, &[1]), (1, 21, &[1]), (1, 99, &[1])]);

    assert_eq!(engine.calls, vec![Call::RedrawArea(20)]);
    assert_eq!(engine.vars[&20], 1);
    assert_eq!(engine.vars[&21], 1);
}

#[test]
fn toggle_var_variants() {
    let mut engine = RecordingEngine::new(1).with_var(8, 0);
    run(&mut engine, None, &[(0, 8, &[]), (10, 8, &[]), (15, 8, &[])]);

    assert_eq!(engine.vars[&8], 0);
    assert_eq!(engine.calls, vec![Call::RedrawArea(8), Call::RedrawArea(8)]);
}

#[test]
fn take_page_swaps_cursor() {
    let mut engine = RecordingEngine::new(1);
    engine.page_var = Some((41, 13));

    run(&mut engine, None, &[(3, 41, &[800])]);
    assert_eq!(engine.globals.held_page, 13);
    assert_eq!(
        engine.take_calls(),
        vec![
            Call::HideCursor,
            Call::RedrawArea(41),
            Call::SetMainCursor(800),
            Call::ShowCursor,
        ]
    );

    run(&mut engine, None, &[(3, 41, &[800])]);
    assert_eq!(engine.globals.held_page, 0);
    assert!(engine.calls.contains(&Call::SetMainCursor(3)));

    // unknown variable: page untouched, nothing drawn
    engine.calls.clear();
    run(&mut engine, None, &[(3, 42, &[800])]);
    assert!(engine.calls.is_empty());
}

#[test]
fn animated_update_runs_groups_in_order() {
    let mut engine = RecordingEngine::new(1);
    let data = [0, 0, 100, 100, 11, 5, 50, 60, 70, 80, 3, 2];
    run(&mut engine, None, &[(21, 0, &data)]);

    assert_eq!(
        engine.calls,
        vec![
            Call::RunTransition {
                kind: Transition::Dissolve,
                rect: Rect::new(0, 0, 100, 100),
                steps: 5,
                delay: 0,
            },
            Call::RunTransition {
                kind: Transition::SlideToRight,
                rect: Rect::new(50, 60, 70, 80),
                steps: 2,
                delay: 0,
            },
        ]
    );
}

#[test]
fn animated_update_partial_group_is_fatal() {
    let mut engine = RecordingEngine::new(1);
    let data = [0, 0, 100, 100, 11, 5, 50];
    let report = run(&mut engine, None, &[(21, 0, &data)]);

    assert_eq!(engine.calls.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        ScriptError::ArgumentOutOfRange { opcode: 21, index: 7, .. }
    ));
}

#[test]
fn directional_card_changes() {
    let mut engine = RecordingEngine::new(1);
    run(&mut engine, None, &[(16, 0, &[1234, 6, 1, 2, 3, 4, 0, 9])]);
    assert_eq!(
        engine.take_calls(),
        vec![
            Call::ChangeCard { card: 1234, transition: Transition::NoTransition },
            Call::RunTransition {
                kind: Transition::LeftToRight,
                rect: Rect::new(1, 2, 3, 4),
                steps: 9,
                delay: 0,
            },
        ]
    );

    run(&mut engine, None, &[(41, 0, &[77, 9, 5, 6, 1, 2, 3, 4, 5, 1])]);
    assert_eq!(
        engine.take_calls(),
        vec![
            Call::ReplaceSound(9),
            Call::ChangeCard { card: 77, transition: Transition::NoTransition },
            Call::RunTransition {
                kind: Transition::TopToBottom,
                rect: Rect::new(1, 2, 3, 4),
                steps: 1,
                delay: 5,
            },
        ]
    );

    run(&mut engine, None, &[(42, 0, &[0, 8, 6, 1, 2, 3, 4, 999, 1])]);
    assert_eq!(
        engine.take_calls(),
        vec![Call::RunTransition {
            kind: Transition::NoTransition,
            rect: Rect::new(1, 2, 3, 4),
            steps: 1,
            delay: 8,
        }]
    );

    // declared data size larger than what follows
    let report = run(&mut engine, None, &[(16, 0, &[1234, 12, 1, 2, 3, 4, 0, 9])]);
    assert!(report.has_fatal());
    assert!(engine.calls.is_empty());
}

#[test]
fn change_stack_maps_link_index() {
    let mut engine = RecordingEngine::new(1);
    run(&mut engine, None, &[(40, 0, &[2, 11, 12])]);
    assert_eq!(
        engine.take_calls(),
        vec![
            Call::StopSound,
            Call::ChangeStack { stack: Stack::Myst, start_card: 4396, link_src: 11, link_dst: 12 },
        ]
    );

    run(&mut engine, None, &[(40, 0, &[8, 0, 0])]);
    assert!(engine
        .take_calls()
        .contains(&Call::ChangeStack { stack: Stack::Credits, start_card: 10000, link_src: 0, link_dst: 0 }));

    let report = run(&mut engine, None, &[(40, 0, &[11, 0, 0])]);
    assert_eq!(
        report.failures[0].error,
        ScriptError::UnknownStack { opcode: 40, stack: 11 }
    );
}

#[test]
fn change_stack_demo_mapping() {
    let demo = VmConfigBuilder::new()
        .with_drawing_time_simulation(false)
        .with_demo(true)
        .get();
    let mut engine = RecordingEngine::new(1);
    let report = run_with(demo, &mut engine, None, &[(40, 0, &[2, 3, 4]), (40, 0, &[5, 0, 0])]);

    assert!(report.is_clean());
    assert_eq!(
        engine.calls,
        vec![
            Call::StopSound,
            Call::ChangeStack { stack: Stack::DemoPreview, start_card: 3000, link_src: 3, link_dst: 4 },
            Call::StopSound,
        ]
    );
}

#[test]
fn cursor_register() {
    let mut engine = RecordingEngine::new(1);
    engine.main_cursor = 5;

    run(&mut engine, None, &[(43, 0, &[]), (36, 0, &[9]), (44, 0, &[])]);

    assert_eq!(
        engine.calls,
        vec![Call::SetMainCursor(9), Call::SetCursor(9), Call::SetMainCursor(5)]
    );
    assert_eq!(engine.main_cursor, 5);
}

#[test]
fn copy_back_buffer_uses_invoking_bounds() {
    let bounds = Rect::new(10, 10, 60, 40);
    let mut engine =
        RecordingEngine::new(1).with_resources(vec![TestArea::new(0).with_bounds(bounds)]);

    run(&mut engine, Some(0), &[(28, 0, &[0xFFFF]), (28, 0, &[1, 2, 3, 4])]);
    assert_eq!(
        engine.take_calls(),
        vec![
            Call::CopyBackBufferToScreen(bounds),
            Call::UpdateScreen,
            Call::CopyBackBufferToScreen(Rect::new(1, 2, 3, 4)),
            Call::UpdateScreen,
        ]
    );

    let report = run(&mut engine, None, &[(28, 0, &[0xFFFF])]);
    assert_eq!(
        report.failures[0].error,
        ScriptError::MissingInvokingResource { opcode: 28 }
    );
}

#[test]
fn trigger_movie_needs_a_video_area() {
    let mut engine = RecordingEngine::new(1)
        .with_resources(vec![TestArea::new(0).video(), TestArea::new(0)]);

    let report = run(&mut engine, Some(0), &[(9, 0, &[0xFFFF]), (9, 0, &[])]);
    assert!(report.is_clean());
    assert_eq!(engine.resources[0].movies, vec![-1, 1]);

    let report = run(&mut engine, Some(1), &[(9, 0, &[])]);
    assert_eq!(
        report.failures[0].error,
        ScriptError::UnexpectedResourceType { opcode: 9, resource: 1 }
    );
}

#[test]
fn draw_area_state_requires_invoking_area() {
    let mut engine = RecordingEngine::new(1).with_resources(vec![TestArea::new(0); 3]);
    run(&mut engine, Some(2), &[(14, 0, &[4])]);
    assert_eq!(engine.take_calls(), vec![Call::DrawAreaState { resource: 2, state: 4 }]);

    let report = run(&mut engine, None, &[(14, 0, &[4])]);
    assert!(report.has_fatal());
}

#[test]
fn sound_opcodes() {
    let mut engine = RecordingEngine::new(1).with_var(7, 1);
    run(
        &mut engine,
        None,
        &[
            (24, 0, &[100]),
            (26, 0, &[]),
            (27, 0, &[200]),
            (32, 0, &[]),
            (30, 0, &[0xFFFE]),
            (31, 7, &[0, 33]),
        ],
    );

    assert_eq!(
        engine.calls,
        vec![
            Call::ReplaceSound(100),
            Call::StopBackground,
            Call::StopSound,
            Call::PlaySoundBlocking(200),
            Call::ResumeBackground,
            Call::ApplySoundBlock(SoundBlock::Stop),
            Call::ReplaceSound(33),
        ]
    );
}

#[test]
fn sound_switch_ignores_out_of_range_and_zero() {
    let mut engine = RecordingEngine::new(1).with_var(7, 0).with_var(8, 5);
    let report = run(&mut engine, None, &[(31, 7, &[0, 33]), (31, 8, &[1, 2])]);
    assert!(report.is_clean());
    assert!(engine.calls.is_empty());
}

#[test]
fn redraw_and_full_screen_image() {
    let mut engine = RecordingEngine::new(1);
    run(&mut engine, None, &[(4, 0, &[]), (35, 0, &[3000, 2001, 10])]);

    assert_eq!(
        engine.calls,
        vec![
            Call::DrawCardBackground,
            Call::DrawResourceImages,
            Call::CopyBackBufferToScreen(Rect::new(0, 0, 544, 333)),
            Call::UpdateScreen,
            Call::CopyImageToScreen { image: 3000, dst: Rect::new(0, 0, 544, 333) },
            Call::UpdateScreen,
            Call::ChangeCard { card: 2001, transition: Transition::Copy },
        ]
    );
}

#[test]
fn go_to_dest_transitions() {
    let mut engine = RecordingEngine::new(1).with_resources(vec![TestArea::new(42)]);
    let report = run(
        &mut engine,
        Some(0),
        &[(6, 0, &[]), (7, 0, &[]), (8, 0, &[]), (22, 0, &[]), (48, 0, &[])],
    );

    assert!(report.is_clean());
    assert_eq!(
        engine.card_changes(),
        vec![
            (42, Transition::Dissolve),
            (42, Transition::PartToRight),
            (42, Transition::PartToLeft),
            (42, Transition::TopToBottom),
            (42, Transition::Copy),
        ]
    );

    let mut engine = RecordingEngine::new(1);
    let report = run(&mut engine, None, &[(48, 0, &[])]);
    assert!(report.is_clean());
    assert!(engine.calls.is_empty());
}

#[test]
fn nop_does_nothing() {
    let mut engine = RecordingEngine::new(1);
    let report = run(&mut engine, None, &[(0xFFFF, 3, &[1, 2])]);
    assert!(report.is_clean());
    assert_eq!(report.executed, 1);
    assert!(engine.calls.is_empty());
}
