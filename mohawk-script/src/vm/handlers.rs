//! Stack-independent opcodes.

use crate::error::ScriptError;
use crate::opcode::Operands;
use crate::sound::SoundBlock;
use crate::types::{Rect, Stack, Transition};
use crate::vm::{ExecContext, INVOKING_RESOURCE};

pub type HandlerFn = fn(&mut ExecContext<'_>, &Operands<'_>) -> Result<(), ScriptError>;

/// Cursor shown when the player is not carrying anything.
pub const DEFAULT_CURSOR: u16 = 3;

// Mechanical staircase scripts reference the wrong image.
const STAIRCASE_BAD_IMAGE: u16 = 7158;
const STAIRCASE_IMAGE: u16 = 7178;

/// Target stack for each stack link index.
const STACK_MAP: [Stack; 11] = [
    Stack::Selenitic,
    Stack::Stoneship,
    Stack::Myst,
    Stack::Mechanical,
    Stack::Channelwood,
    Stack::Intro,
    Stack::Dni,
    Stack::Myst,
    Stack::Credits,
    Stack::Myst,
    Stack::Myst,
];

const START_CARD: [u16; 11] = [1282, 2029, 4396, 6122, 3137, 1, 5038, 4134, 10000, 4739, 4741];

pub(crate) const COMMON_OPCODES: &[(u16, &str, HandlerFn)] = &[
    (0, "ToggleVar", toggle_var),
    (1, "SetVar", set_var),
    (2, "ChangeCardSwitch4", change_card_switch4),
    (3, "TakePage", take_page),
    (4, "RedrawCard", redraw_card),
    (6, "GoToDestForward", go_to_dest_forward),
    (7, "GoToDestLeft", go_to_dest_left),
    (8, "GoToDestRight", go_to_dest_right),
    (9, "TriggerMovie", trigger_movie),
    (10, "ToggleVarNoRedraw", toggle_var_no_redraw),
    (12, "ChangeCardSwitchLtR", change_card_switch_ltr),
    (13, "ChangeCardSwitchRtL", change_card_switch_rtl),
    (14, "DrawAreaState", draw_area_state),
    (15, "RedrawAreaForVar", redraw_area_for_var),
    (16, "ChangeCardDirectional", change_card_directional),
    (17, "ChangeCardPush", change_card_push),
    (18, "ChangeCardPop", change_card_pop),
    (19, "EnableAreas", enable_areas),
    (20, "DisableAreas", disable_areas),
    (21, "DirectionalUpdate", directional_update),
    (22, "GoToDestUp", go_to_dest_up),
    (23, "ToggleAreasActivation", toggle_areas_activation),
    (24, "PlaySound", play_sound),
    (26, "StopSoundBackground", stop_sound_background),
    (27, "PlaySoundBlocking", play_sound_blocking),
    (28, "CopyBackBufferToScreen", copy_back_buffer_to_screen),
    (29, "CopyImageToBackBuffer", copy_image_to_back_buffer),
    (30, "ChangeBackgroundSound", change_background_sound),
    (31, "SoundPlaySwitch", sound_play_switch),
    (32, "SoundResumeBackground", sound_resume_background),
    (33, "CopyImageToScreen", copy_image_to_screen),
    (34, "ChangeCard", change_card),
    (35, "DrawImageChangeCard", draw_image_change_card),
    (36, "ChangeMainCursor", change_main_cursor),
    (37, "HideCursor", hide_cursor),
    (38, "ShowCursor", show_cursor),
    (39, "Delay", delay),
    (40, "ChangeStack", change_stack),
    (41, "ChangeCardPlaySoundDirectional", change_card_play_sound_directional),
    (42, "DirectionalUpdatePlaySound", directional_update_play_sound),
    (43, "SaveMainCursor", save_main_cursor),
    (44, "RestoreMainCursor", restore_main_cursor),
    (46, "SoundWaitStop", sound_wait_stop),
    (48, "GoToDest", go_to_dest),
    (51, "ExitMap", exit_map),
];

pub(crate) fn nop(_ctx: &mut ExecContext<'_>, _op: &Operands<'_>) -> Result<(), ScriptError> {
    Ok(())
}

fn toggle_var(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    log::debug!("Opcode {}: Toggle var {}", op.opcode, op.var);
    ctx.toggle_var(op.var);
    ctx.engine.redraw_area(op.var);
    Ok(())
}

fn set_var(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let value = op.args.get(0)?;
    log::debug!("Opcode {}: Set var {}: {}", op.opcode, op.var, value);
    if ctx.set_var_value(op.var, value) {
        ctx.engine.redraw_area(op.var);
    }
    Ok(())
}

/// Variable value selects a card from the arguments (1-based); zero means the
/// invoking area's own destination.
fn change_card_switch(
    ctx: &mut ExecContext<'_>,
    op: &Operands<'_>,
    transition: Transition,
) -> Result<(), ScriptError> {
    let value = ctx.get_var(op.var);
    log::debug!("Opcode {}: changeCardSwitch var {}: {}", op.opcode, op.var, value);

    if value != 0 {
        let card = op.args.get(value as usize - 1)?;
        ctx.engine.change_card(card, transition);
    } else if let Some(dest) = ctx.invoking_area().map(|a| a.destination()) {
        ctx.engine.change_card(dest, transition);
    } else {
        log::warn!("Missing invokingResource in altDest call");
    }
    Ok(())
}

fn change_card_switch4(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    change_card_switch(ctx, op, Transition::Dissolve)
}

fn change_card_switch_ltr(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    change_card_switch(ctx, op, Transition::LeftToRight)
}

fn change_card_switch_rtl(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    change_card_switch(ctx, op, Transition::RightToLeft)
}

fn take_page(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let cursor = op.args.get(0)?;
    let old_page = ctx.engine.globals().held_page;
    log::debug!("Opcode {}: takePage Var {} CursorId {}", op.opcode, op.var, cursor);

    ctx.toggle_var(op.var);

    let held = ctx.engine.globals().held_page;
    if old_page != held {
        ctx.engine.hide_cursor();
        ctx.engine.redraw_area(op.var);
        ctx.engine
            .set_main_cursor(if held != 0 { cursor } else { DEFAULT_CURSOR });
        ctx.engine.show_cursor();
    }
    Ok(())
}

fn redraw_card(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    log::debug!("Opcode {}: Redraw card", op.opcode);
    ctx.engine.draw_card_background();
    ctx.engine.draw_resource_images();
    ctx.engine.copy_back_buffer_to_screen(Rect::screen());
    ctx.engine.update_screen();
    Ok(())
}

fn go_to_invoking_dest(
    ctx: &mut ExecContext<'_>,
    op: &Operands<'_>,
    transition: Transition,
) -> Result<(), ScriptError> {
    log::debug!("Opcode {}: Change To Dest of Invoking Resource", op.opcode);
    match ctx.invoking_area().map(|a| a.destination()) {
        Some(dest) => ctx.engine.change_card(dest, transition),
        None => log::warn!("Opcode {}: Missing invokingResource", op.opcode),
    }
    Ok(())
}

fn go_to_dest(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    go_to_invoking_dest(ctx, op, Transition::Copy)
}

fn go_to_dest_forward(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    go_to_invoking_dest(ctx, op, Transition::Dissolve)
}

fn go_to_dest_left(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    go_to_invoking_dest(ctx, op, Transition::PartToRight)
}

fn go_to_dest_right(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    go_to_invoking_dest(ctx, op, Transition::PartToLeft)
}

fn go_to_dest_up(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    go_to_invoking_dest(ctx, op, Transition::TopToBottom)
}

fn trigger_movie(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let direction = if op.argc() == 1 { op.args.get_i16(0)? } else { 1 };
    log::debug!("Opcode {}: Trigger Type 6 Resource Movie, direction {}", op.opcode, direction);

    let resource = ctx.require_invoking(op.opcode)?;
    let area = ctx
        .engine
        .resource_mut(resource)
        .ok_or(ScriptError::MissingInvokingResource { opcode: op.opcode })?;
    if !area.play_movie(direction) {
        return Err(ScriptError::UnexpectedResourceType {
            opcode: op.opcode,
            resource,
        });
    }
    Ok(())
}

fn toggle_var_no_redraw(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    log::debug!("Opcode {}: toggleVarNoRedraw", op.opcode);
    ctx.toggle_var(op.var);
    Ok(())
}

fn draw_area_state(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let state = op.args.get(0)?;
    log::debug!("Opcode {}: drawAreaState, state: {}", op.opcode, state);
    let resource = ctx.require_invoking(op.opcode)?;
    ctx.engine.draw_area_state(resource, state);
    Ok(())
}

fn redraw_area_for_var(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    log::debug!("Opcode {}: redraw area, var: {}", op.opcode, op.var);
    ctx.engine.redraw_area(op.var);
    Ok(())
}

fn change_card_directional(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let card = op.args.get(0)?;
    let size = op.args.get(1)? as usize;
    let data = op.args.window(2, size)?;
    log::debug!("Opcode {}: Change Card {} with optional directional update", op.opcode, card);

    ctx.engine.change_card(card, Transition::NoTransition);
    ctx.animated_update(data, 0)
}

// A single register, so a second push overwrites the first one.
fn change_card_push(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let card = op.args.get(0)?;
    let transition = Transition::from_raw(op.args.get(1)?);
    ctx.state.saved_card = ctx.engine.current_card();
    log::debug!(
        "Opcode {}: Jump to Card {}, storing current card {}",
        op.opcode,
        card,
        ctx.state.saved_card
    );
    ctx.engine.change_card(card, transition);
    Ok(())
}

fn change_card_pop(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    if ctx.state.saved_card == 0 {
        log::warn!("No pushed card to go back to");
        return Ok(());
    }
    let transition = Transition::from_raw(op.args.get(0)?);
    log::debug!("Opcode {}: Return To Stored Card {}", op.opcode, ctx.state.saved_card);
    ctx.engine.change_card(ctx.state.saved_card, transition);
    Ok(())
}

fn enable_areas(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    ctx.for_each_area(op, "enableAreas", |area| area.set_enabled(true))
}

fn disable_areas(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    ctx.for_each_area(op, "disableAreas", |area| area.set_enabled(false))
}

fn toggle_areas_activation(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    ctx.for_each_area(op, "toggleAreasActivation", |area| {
        let enabled = area.is_enabled();
        area.set_enabled(!enabled);
    })
}

fn directional_update(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    log::debug!("Opcode {}: Transition / Directional update", op.opcode);
    ctx.animated_update(op.args, 0)
}

fn play_sound(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let sound = op.args.get(0)?;
    log::debug!("Opcode {}: playSound, soundId: {}", op.opcode, sound);
    ctx.engine.replace_sound(sound);
    Ok(())
}

fn stop_sound_background(ctx: &mut ExecContext<'_>, _op: &Operands<'_>) -> Result<(), ScriptError> {
    ctx.engine.stop_background();
    Ok(())
}

fn play_sound_blocking(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let sound = op.args.get(0)?;
    log::debug!("Opcode {}: playSoundBlocking, soundId: {}", op.opcode, sound);
    ctx.engine.stop_sound();
    ctx.engine.play_sound_blocking(sound);
    Ok(())
}

fn copy_back_buffer_to_screen(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let rect = if op.args.get(0)? == INVOKING_RESOURCE {
        let resource = ctx.require_invoking(op.opcode)?;
        ctx.engine
            .resource(resource)
            .map(|a| a.bounds())
            .ok_or(ScriptError::MissingInvokingResource { opcode: op.opcode })?
    } else {
        op.args.rect(0)?
    };
    log::debug!("Opcode {}: Copy back buffer to screen {:?}", op.opcode, rect);

    ctx.engine.copy_back_buffer_to_screen(rect);
    ctx.engine.update_screen();
    Ok(())
}

/// Image id, source rectangle and destination for the two image blit opcodes.
/// An origin of -1 on either axis means the top-left corner.
fn image_blit_rects(op: &Operands<'_>) -> Result<(u16, Rect, Rect), ScriptError> {
    let image = op.args.get(0)?;
    let src = op.args.rect(1)?;
    let mut left = op.args.get_i16(5)?;
    let mut top = op.args.get_i16(6)?;

    if left == -1 || top == -1 {
        left = 0;
        top = 0;
    }

    let dst = Rect::new(
        left,
        top,
        left.wrapping_add(src.width()),
        top.wrapping_add(src.height()),
    );
    Ok((image, src, dst))
}

fn copy_image_to_back_buffer(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let (mut image, src, dst) = image_blit_rects(op)?;
    if image == STAIRCASE_BAD_IMAGE {
        image = STAIRCASE_IMAGE;
    }
    log::debug!(
        "Opcode {}: Copy image {} to back buffer, src {:?} dst {:?}",
        op.opcode,
        image,
        src,
        dst
    );
    ctx.engine.copy_image_section_to_back_buffer(image, src, dst);
    Ok(())
}

fn copy_image_to_screen(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let (image, src, dst) = image_blit_rects(op)?;
    log::debug!(
        "Opcode {}: Copy image {} to screen, src {:?} dst {:?}",
        op.opcode,
        image,
        src,
        dst
    );
    ctx.engine.copy_image_section_to_screen(image, src, dst);
    ctx.engine.update_screen();
    Ok(())
}

fn change_background_sound(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    log::debug!("Opcode {}: Process Sound Block", op.opcode);
    let block = SoundBlock::read(op.args)?;
    ctx.engine.apply_sound_block(&block);
    Ok(())
}

fn sound_play_switch(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let value = ctx.get_var(op.var) as usize;
    log::debug!("Opcode {}: Switch Choice of Play Sound, var {}: {}", op.opcode, op.var, value);

    if value < op.argc() {
        let sound = op.args.get(value)?;
        if sound != 0 {
            ctx.engine.replace_sound(sound);
        }
    }
    Ok(())
}

fn sound_resume_background(ctx: &mut ExecContext<'_>, _op: &Operands<'_>) -> Result<(), ScriptError> {
    ctx.engine.resume_background();
    Ok(())
}

fn change_card(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let card = op.args.get(0)?;
    let transition = Transition::from_raw(op.args.get(1)?);
    log::debug!("Opcode {}: Change Card {} ({})", op.opcode, card, transition);
    ctx.engine.change_card(card, transition);
    Ok(())
}

fn draw_image_change_card(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let image = op.args.get(0)?;
    let card = op.args.get(1)?;
    let transition = Transition::from_raw(op.args.get(2)?);
    log::debug!(
        "Opcode {}: Draw Full Screen Image {} then Change Card {}",
        op.opcode,
        image,
        card
    );

    ctx.engine.copy_image_to_screen(image, Rect::screen());
    ctx.engine.update_screen();
    ctx.engine.change_card(card, transition);
    Ok(())
}

fn change_main_cursor(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let cursor = op.args.get(0)?;
    log::debug!("Opcode {}: Change main cursor to {}", op.opcode, cursor);
    ctx.engine.set_main_cursor(cursor);
    ctx.engine.set_cursor(cursor);
    Ok(())
}

fn hide_cursor(ctx: &mut ExecContext<'_>, _op: &Operands<'_>) -> Result<(), ScriptError> {
    ctx.engine.hide_cursor();
    Ok(())
}

fn show_cursor(ctx: &mut ExecContext<'_>, _op: &Operands<'_>) -> Result<(), ScriptError> {
    ctx.engine.show_cursor();
    Ok(())
}

fn delay(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let time = op.args.get(0)?;
    log::debug!("Opcode {}: Delay {} ms", op.opcode, time);
    ctx.wait_millis(u32::from(time))
}

fn change_stack(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    let target = op.args.get(0)?;
    let link_src = op.args.get(1)?;
    let link_dst = op.args.get(2)?;
    log::debug!(
        "Opcode {}: changeStack, target {} link sounds {}/{}",
        op.opcode,
        target,
        link_src,
        link_dst
    );

    ctx.engine.stop_sound();

    if ctx.config.demo {
        match target {
            1 => ctx.engine.change_stack(Stack::DemoSlides, 1000, link_src, link_dst),
            2 => ctx.engine.change_stack(Stack::DemoPreview, 3000, link_src, link_dst),
            other => log::warn!("demo has no stack link {other}"),
        }
        return Ok(());
    }

    let index = target as usize;
    match (STACK_MAP.get(index), START_CARD.get(index)) {
        (Some(&stack), Some(&card)) => {
            ctx.engine.change_stack(stack, card, link_src, link_dst);
            Ok(())
        }
        _ => Err(ScriptError::UnknownStack {
            opcode: op.opcode,
            stack: target,
        }),
    }
}

fn change_card_play_sound_directional(
    ctx: &mut ExecContext<'_>,
    op: &Operands<'_>,
) -> Result<(), ScriptError> {
    let card = op.args.get(0)?;
    let sound = op.args.get(1)?;
    let delay = op.args.get(2)?;
    let size = op.args.get(3)? as usize;
    let data = op.args.window(4, size)?;
    log::debug!(
        "Opcode {}: Play Sound {}, Change Card {} and Directional Update (delay {})",
        op.opcode,
        sound,
        card,
        delay
    );

    if sound != 0 {
        ctx.engine.replace_sound(sound);
    }
    ctx.engine.change_card(card, Transition::NoTransition);
    ctx.animated_update(data, delay)
}

fn directional_update_play_sound(
    ctx: &mut ExecContext<'_>,
    op: &Operands<'_>,
) -> Result<(), ScriptError> {
    let sound = op.args.get(0)?;
    let delay = op.args.get(1)?;
    let size = op.args.get(2)? as usize;
    let data = op.args.window(3, size)?;
    log::debug!(
        "Opcode {}: Play Sound {} and Directional Update (delay {})",
        op.opcode,
        sound,
        delay
    );

    if sound != 0 {
        ctx.engine.replace_sound(sound);
    }
    ctx.animated_update(data, delay)
}

fn save_main_cursor(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    ctx.state.saved_cursor = ctx.engine.main_cursor();
    log::debug!("Opcode {}: Save main cursor {}", op.opcode, ctx.state.saved_cursor);
    Ok(())
}

fn restore_main_cursor(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    log::debug!("Opcode {}: Restore main cursor {}", op.opcode, ctx.state.saved_cursor);
    ctx.engine.set_main_cursor(ctx.state.saved_cursor);
    Ok(())
}

fn sound_wait_stop(ctx: &mut ExecContext<'_>, op: &Operands<'_>) -> Result<(), ScriptError> {
    log::debug!("Opcode {}: Wait for foreground sound to finish", op.opcode);
    ctx.wait_for_sound()
}

fn exit_map(ctx: &mut ExecContext<'_>, _op: &Operands<'_>) -> Result<(), ScriptError> {
    ctx.engine.change_card(ctx.state.saved_map_card, Transition::Copy);
    Ok(())
}
