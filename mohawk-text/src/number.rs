/// Parses a script number the way the interpreter's number reader does.
///
/// Leading whitespace is skipped, an optional `-` negates and a `$` prefix
/// switches to hexadecimal. Parsing stops at the first character that is
/// not a digit in the active radix; overflow wraps at 16 bits.
pub fn read_number(text: &str) -> i16 {
    let mut chars = text.chars().skip_while(|c| c.is_whitespace()).peekable();
    let negative = chars.next_if_eq(&'-').is_some();
    let radix: u32 = if chars.next_if_eq(&'$').is_some() { 16 } else { 10 };

    let mut value: i16 = 0;
    for digit in chars.map_while(|c| c.to_digit(radix)) {
        value = value.wrapping_mul(radix as i16).wrapping_add(digit as i16);
    }

    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_and_hex() {
        assert_eq!(read_number("42"), 42);
        assert_eq!(read_number("  \t-17 apples"), -17);
        assert_eq!(read_number("$1f"), 31);
        assert_eq!(read_number("-$10"), -16);
        assert_eq!(read_number("$FFFF"), -1);
    }

    #[test]
    fn no_digits_reads_zero() {
        assert_eq!(read_number(""), 0);
        assert_eq!(read_number("abc"), 0);
        assert_eq!(read_number("-"), 0);
    }

    #[test]
    fn overflow_wraps() {
        assert_eq!(read_number("65535"), -1);
        assert_eq!(read_number("32768"), i16::MIN);
    }
}
