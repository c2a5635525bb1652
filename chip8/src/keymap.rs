#[cfg(feature = "sdl")]
use sdl2::keyboard::Keycode;

/// # Keymap
/// Chip-8 input is generated with a hexadecimal keypad.
///
/// Each key is typed as its own hex digit: `0`..`9` and `a`..`f`.
/// ```text
/// |1|2|3|C|
/// |4|5|6|D|
/// |7|8|9|E|
/// |A|0|B|F|
/// ```
#[cfg_attr(not(feature = "sdl"), allow(dead_code))]
pub fn keymap(key: char) -> Option<u8> {
    match key {
        '0'..='9' | 'a'..='f' | 'A'..='F' => key.to_digit(16).map(|digit| digit as u8),
        _ => None,
    }
}

/// The keypad index for an SDL key, if it is one of the hex digits
#[cfg(feature = "sdl")]
pub fn keycode(key: Keycode) -> Option<u8> {
    let name = key.name();
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => keymap(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_map_to_themselves() {
        assert_eq!(keymap('0'), Some(0x0));
        assert_eq!(keymap('7'), Some(0x7));
        assert_eq!(keymap('9'), Some(0x9));
    }

    #[test]
    fn test_letters_map_to_high_keys() {
        assert_eq!(keymap('a'), Some(0xA));
        assert_eq!(keymap('f'), Some(0xF));
        assert_eq!(keymap('C'), Some(0xC));
    }

    #[test]
    fn test_other_keys_are_unmapped() {
        assert_eq!(keymap('g'), None);
        assert_eq!(keymap('j'), None);
        assert_eq!(keymap(' '), None);
    }
}
