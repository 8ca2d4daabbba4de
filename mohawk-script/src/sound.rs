use crate::error::ScriptError;
use crate::opcode::{ArgReader, Args};

const ACTION_CONDITIONAL: i16 = -4;
const ACTION_CHANGE_VOLUME: i16 = -3;
const ACTION_STOP: i16 = -2;
const ACTION_CONTINUE: i16 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundItem {
    /// Sound id when positive, otherwise one of the control actions.
    pub action: i16,
    pub volume: u16,
}

/// Background sound instruction embedded in a card or script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundBlock {
    /// Pick `items[var]` when the variable is in range.
    Conditional { var: u16, items: Vec<SoundItem> },
    ChangeVolume { volume: u16 },
    Stop,
    Continue,
    Play { sound: u16, volume: u16 },
    /// Action word with no defined meaning, ignored by the engine.
    Unknown(i16),
}

impl SoundBlock {
    pub fn read(args: Args<'_>) -> Result<Self, ScriptError> {
        let mut r = args.reader();
        Self::read_from(&mut r)
    }

    pub fn read_from(r: &mut ArgReader<'_>) -> Result<Self, ScriptError> {
        let action = r.next_i16()?;
        let block = match action {
            ACTION_CONDITIONAL => {
                let var = r.next_u16()?;
                let count = r.next_u16()? as usize;
                let mut items = Vec::with_capacity(count.min(64));
                for _ in 0..count {
                    let action = r.next_i16()?;
                    let volume = r.next_u16()?;
                    items.push(SoundItem { action, volume });
                }
                SoundBlock::Conditional { var, items }
            }
            ACTION_CHANGE_VOLUME => SoundBlock::ChangeVolume {
                volume: r.next_u16()?,
            },
            ACTION_STOP => SoundBlock::Stop,
            ACTION_CONTINUE => SoundBlock::Continue,
            sound if sound > 0 => SoundBlock::Play {
                sound: sound as u16,
                volume: r.next_u16()?,
            },
            other => {
                log::warn!("Unknown sound control value {other} in sound block");
                SoundBlock::Unknown(other)
            }
        };
        log::debug!("sound block: {block:?}");
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn read(values: &[u16]) -> Result<SoundBlock, ScriptError> {
        SoundBlock::read(Args::new(30, values))
    }

    #[test]
    fn conditional_list() {
        let block = read(&[0xFFFC, 12, 2, 4001, 50, 0xFFFE, 0]).unwrap();
        assert_eq!(
            block,
            SoundBlock::Conditional {
                var: 12,
                items: vec![
                    SoundItem { action: 4001, volume: 50 },
                    SoundItem { action: -2, volume: 0 },
                ],
            }
        );
    }

    #[test]
    fn simple_actions() {
        assert_eq!(read(&[0xFFFD, 80]).unwrap(), SoundBlock::ChangeVolume { volume: 80 });
        assert_eq!(read(&[0xFFFE]).unwrap(), SoundBlock::Stop);
        assert_eq!(read(&[0xFFFF]).unwrap(), SoundBlock::Continue);
        assert_eq!(read(&[2280, 65535]).unwrap(), SoundBlock::Play { sound: 2280, volume: 65535 });
        assert_eq!(read(&[0]).unwrap(), SoundBlock::Unknown(0));
    }

    #[test]
    fn truncated_block() {
        assert!(matches!(
            read(&[0xFFFC, 3, 2, 100]),
            Err(ScriptError::ArgumentOutOfRange { opcode: 30, index: 4, .. })
        ));
    }
}
