use anyhow::Result;
use pretty_assertions::assert_eq;

use mohawk_nls::Encoding;
use mohawk_text::{
    format, read_number, Alignment, FontMetrics, FormatArg, FormatOptions, Formatter,
    LayoutStyle, TextError, TextLayouter, TextRect, TextResourceTable,
};

struct Monospace;

impl FontMetrics for Monospace {
    fn char_width(&self, _font: u16, _ch: char) -> i32 {
        8
    }

    fn line_height(&self, _font: u16) -> i32 {
        12
    }
}

#[test]
fn legacy_format_examples() -> Result<()> {
    assert_eq!(format("%5d", &[FormatArg::from(42u16)])?, "   42");
    assert_eq!(format("%-5d", &[FormatArg::from(42u16)])?, "42   ");
    assert_eq!(format("%05d", &[FormatArg::from(42u16)])?, "00042");
    assert_eq!(format("%%", &[])?, "%");
    assert_eq!(format("%d", &[FormatArg::from(-7i16)])?, "-7");
    Ok(())
}

#[test]
fn resource_strings_feed_the_formatter() -> Result<()> {
    let mut texts = TextResourceTable::new(Encoding::Windows1252);
    texts.insert(40, b"Channelwood\0Selenitic\0".to_vec());

    let formatter = Formatter::new(FormatOptions::default()).with_texts(&texts);
    let args = [
        FormatArg::from("Age"),
        FormatArg::from(40u16),
        FormatArg::from(1u16),
        FormatArg::from(3u16),
    ];
    assert_eq!(
        formatter.format("%s: %-10s|%x", &args)?,
        "Age: Selenitic |3"
    );
    Ok(())
}

#[test]
fn capacity_overflow_is_an_error() {
    let formatter = Formatter::new(FormatOptions { capacity: 8 });
    let err = formatter.format("%10s", &[FormatArg::from("x")]).unwrap_err();
    assert_eq!(err, TextError::CapacityExceeded { capacity: 8 });
    assert_eq!(err.to_string(), "formatted text exceeds the 8 character buffer");
}

#[test]
fn number_reader() {
    assert_eq!(read_number(" 120"), 120);
    assert_eq!(read_number("$7FFF"), i16::MAX);
}

#[test]
fn formatted_text_lays_out_centered() -> Result<()> {
    let text = format("%s %s", &[FormatArg::from("THE"), FormatArg::from("BOOK")])?;
    let layouter = TextLayouter::new(&Monospace, &text);
    let style = LayoutStyle {
        alignment: Alignment::Center,
        fore_color: 3,
        ..LayoutStyle::default()
    };

    let layout = layouter.layout(style, TextRect::new(0, 0, 40, 40));

    assert_eq!(layout.lines.len(), 2);
    let starts: Vec<(char, i32, i32)> = layout
        .glyphs
        .iter()
        .filter(|g| g.ch == 'T' || g.ch == 'B')
        .map(|g| (g.ch, g.x, g.y))
        .collect();
    assert_eq!(starts, vec![('T', 8, 0), ('B', 4, 12)]);
    assert!(layout.glyphs.iter().all(|g| g.color == 3));
    Ok(())
}
