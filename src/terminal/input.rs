//! Raw byte-stream parsing into [`InputEvent`]s (spec.md §4.4).
//!
//! Used to replay captured input against a [`super::test_backend::TestBackend`]
//! without a real TTY, and as the fallback path when a backend hands over raw
//! bytes instead of pre-parsed events.

use crate::event::{
    InputEvent, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// Parse as many complete events as possible out of `buf`.
///
/// Returns the parsed events and the number of bytes consumed. A trailing
/// incomplete escape sequence is left unconsumed — the caller should retain
/// those bytes and prepend them to the next read.
pub fn parse_input_bytes(buf: &[u8]) -> (Vec<InputEvent>, usize) {
    let mut events = Vec::new();
    let mut pos = 0;

    while pos < buf.len() {
        match parse_one(&buf[pos..]) {
            Some((mut parsed, consumed)) => {
                events.append(&mut parsed);
                pos += consumed;
            }
            None => break, // incomplete sequence, wait for more bytes
        }
    }

    (events, pos)
}

/// Parse a single logical unit of input from the front of `input`,
/// returning every event it produces (a printable character produces both
/// a `Key` and an accompanying `Text` event, spec.md §4.4). Returns `None`
/// if `input` looks like the start of an escape sequence that hasn't fully
/// arrived yet.
fn parse_one(input: &[u8]) -> Option<(Vec<InputEvent>, usize)> {
    let first = *input.first()?;

    if first != 0x1b {
        return parse_plain_byte(input);
    }

    if input.len() < 2 {
        return None; // lone ESC could be the start of a sequence
    }

    match input[1] {
        b'[' => parse_csi(input),
        b'O' => parse_ss3(input),
        _ => Some((vec![key(KeyCode::Escape)], 1)),
    }
}

fn parse_plain_byte(input: &[u8]) -> Option<(Vec<InputEvent>, usize)> {
    let first = input[0];

    match first {
        b'\r' | b'\n' => Some((vec![key(KeyCode::Enter)], 1)),
        b'\t' => Some((vec![key(KeyCode::Tab)], 1)),
        0x7f | 0x08 => Some((vec![key(KeyCode::Backspace)], 1)),
        0x01..=0x1a => {
            // Ctrl-A..Ctrl-Z (Ctrl-I/M/H already handled above as Tab/Enter/Backspace).
            let c = (first - 1 + b'a') as char;
            Some((
                vec![InputEvent::Key(KeyEvent::new(KeyCode::Char(c), Modifiers::CTRL))],
                1,
            ))
        }
        _ => decode_utf8_char(input).map(|(c, len)| {
            // Every decoded character gets a Key event with its keysym; a
            // printable one is also composed as Text (spec.md §4.4 "letters
            // produce both a Key event... and an accompanying Text").
            let mut events = vec![key(KeyCode::Char(c))];
            if !c.is_control() {
                events.push(InputEvent::Text(c.to_string()));
            }
            (events, len)
        }),
    }
}

fn decode_utf8_char(input: &[u8]) -> Option<(char, usize)> {
    let width = utf8_width(input[0]);
    if input.len() < width {
        return None;
    }
    let s = std::str::from_utf8(&input[..width]).ok()?;
    s.chars().next().map(|c| (c, width))
}

fn utf8_width(lead: u8) -> usize {
    if lead & 0x80 == 0 {
        1
    } else if lead & 0xe0 == 0xc0 {
        2
    } else if lead & 0xf0 == 0xe0 {
        3
    } else if lead & 0xf8 == 0xf0 {
        4
    } else {
        1
    }
}

fn key(code: KeyCode) -> InputEvent {
    InputEvent::Key(KeyEvent::plain(code))
}

/// Parse a CSI sequence: `ESC [ ...`.
fn parse_csi(input: &[u8]) -> Option<(Vec<InputEvent>, usize)> {
    // Bracketed paste: ESC [ 200 ~ ... ESC [ 201 ~
    if input.starts_with(b"\x1b[200~") {
        return parse_bracketed_paste(input);
    }

    // SGR mouse: ESC [ < Cb ; Cx ; Cy (M | m)
    if input.len() > 2 && input[2] == b'<' {
        return parse_sgr_mouse(input);
    }

    // Simple letter-terminated sequences: ESC [ A..D, H, F.
    if input.len() >= 3 && input[2].is_ascii_alphabetic() {
        let code = match input[2] {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            _ => return Some((Vec::new(), 3)),
        };
        return Some((vec![key(code)], 3));
    }

    // Numeric-tilde sequences: ESC [ N ~ (and F-keys ESC [ N ; M ~ with modifiers,
    // not currently distinguished).
    let tilde_pos = input.iter().position(|&b| b == b'~')?;
    if tilde_pos < 2 {
        return None;
    }
    let digits = &input[2..tilde_pos];
    let num_str = std::str::from_utf8(digits).ok()?;
    let num: u32 = num_str.split(';').next()?.parse().ok()?;
    let code = match num {
        1 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        11..=15 => KeyCode::F((num - 10) as u8),
        17..=21 => KeyCode::F((num - 11) as u8),
        23 | 24 => KeyCode::F((num - 12) as u8),
        _ => return Some((Vec::new(), tilde_pos + 1)),
    };
    Some((vec![key(code)], tilde_pos + 1))
}

fn parse_bracketed_paste(input: &[u8]) -> Option<(Vec<InputEvent>, usize)> {
    const END: &[u8] = b"\x1b[201~";
    let start = 6; // len of "\x1b[200~"
    let end_rel = find_subslice(&input[start..], END)?;
    let end = start + end_rel;
    let text = String::from_utf8_lossy(&input[start..end]).into_owned();
    Some((vec![InputEvent::Text(text)], end + END.len()))
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn parse_sgr_mouse(input: &[u8]) -> Option<(Vec<InputEvent>, usize)> {
    let end = input.iter().position(|&b| b == b'M' || b == b'm')?;
    let release = input[end] == b'm';
    let body = std::str::from_utf8(&input[3..end]).ok()?;
    let mut parts = body.split(';');
    let cb: i32 = parts.next()?.parse().ok()?;
    let x: u16 = parts.next()?.parse::<u16>().ok()?.saturating_sub(1);
    let y: u16 = parts.next()?.parse::<u16>().ok()?.saturating_sub(1);

    let modifiers = {
        let mut m = Modifiers::NONE;
        if cb & 0x04 != 0 {
            m = m | Modifiers::SHIFT;
        }
        if cb & 0x08 != 0 {
            m = m | Modifiers::ALT;
        }
        if cb & 0x10 != 0 {
            m = m | Modifiers::CTRL;
        }
        m
    };

    let button_bits = cb & 0x43;
    let kind = if cb & 0x40 != 0 {
        if button_bits == 0x40 {
            MouseEventKind::ScrollUp
        } else {
            MouseEventKind::ScrollDown
        }
    } else {
        let button = match button_bits & 0x03 {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        };
        if cb & 0x20 != 0 {
            MouseEventKind::Drag(button)
        } else if release {
            MouseEventKind::Release(button)
        } else {
            MouseEventKind::Press(button)
        }
    };

    Some((
        vec![InputEvent::Mouse(MouseEvent {
            kind,
            x,
            y,
            modifiers,
        })],
        end + 1,
    ))
}

/// Parse an SS3 sequence: `ESC O ...` (used by some terminals for F1-F4).
fn parse_ss3(input: &[u8]) -> Option<(Vec<InputEvent>, usize)> {
    if input.len() < 3 {
        return None;
    }
    let code = match input[2] {
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Some((Vec::new(), 3)),
    };
    Some((vec![key(code)], 3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_ascii() {
        let (events, consumed) = parse_input_bytes(b"a");
        assert_eq!(consumed, 1);
        assert_eq!(
            events,
            vec![key(KeyCode::Char('a')), InputEvent::Text("a".into())]
        );
    }

    #[test]
    fn parses_multiple_chars() {
        let (events, consumed) = parse_input_bytes(b"abc");
        assert_eq!(consumed, 3);
        assert_eq!(events.len(), 6); // Key + Text per character
    }

    #[test]
    fn parses_enter_tab_backspace() {
        let (events, _) = parse_input_bytes(b"\r\t\x7f");
        assert_eq!(
            events,
            vec![key(KeyCode::Enter), key(KeyCode::Tab), key(KeyCode::Backspace)]
        );
    }

    #[test]
    fn parses_ctrl_letter() {
        let (events, consumed) = parse_input_bytes(&[0x03]); // Ctrl-C
        assert_eq!(consumed, 1);
        assert_eq!(
            events,
            vec![InputEvent::Key(KeyEvent::new(KeyCode::Char('c'), Modifiers::CTRL))]
        );
    }

    #[test]
    fn parses_arrow_keys() {
        let (events, consumed) = parse_input_bytes(b"\x1b[A\x1b[B\x1b[C\x1b[D");
        assert_eq!(consumed, 12);
        assert_eq!(
            events,
            vec![
                key(KeyCode::Up),
                key(KeyCode::Down),
                key(KeyCode::Right),
                key(KeyCode::Left),
            ]
        );
    }

    #[test]
    fn parses_home_end_via_letters() {
        let (events, _) = parse_input_bytes(b"\x1b[H\x1b[F");
        assert_eq!(events, vec![key(KeyCode::Home), key(KeyCode::End)]);
    }

    #[test]
    fn parses_tilde_sequences() {
        let (events, _) = parse_input_bytes(b"\x1b[5~\x1b[6~\x1b[3~");
        assert_eq!(
            events,
            vec![
                key(KeyCode::PageUp),
                key(KeyCode::PageDown),
                key(KeyCode::Delete),
            ]
        );
    }

    #[test]
    fn parses_function_keys_ss3() {
        let (events, _) = parse_input_bytes(b"\x1bOP\x1bOQ");
        assert_eq!(events, vec![key(KeyCode::F(1)), key(KeyCode::F(2))]);
    }

    #[test]
    fn parses_escape_alone() {
        let (events, consumed) = parse_input_bytes(b"\x1b");
        assert_eq!(consumed, 0); // held back, could be start of a sequence
        assert!(events.is_empty());
    }

    #[test]
    fn parses_escape_followed_by_non_sequence() {
        let (events, consumed) = parse_input_bytes(b"\x1bq");
        assert_eq!(consumed, 2);
        assert_eq!(
            events,
            vec![
                key(KeyCode::Escape),
                key(KeyCode::Char('q')),
                InputEvent::Text("q".into()),
            ]
        );
    }

    #[test]
    fn parses_sgr_mouse_press() {
        let (events, consumed) = parse_input_bytes(b"\x1b[<0;10;5M");
        assert_eq!(consumed, 10);
        assert_eq!(
            events,
            vec![InputEvent::Mouse(MouseEvent {
                kind: MouseEventKind::Press(MouseButton::Left),
                x: 9,
                y: 4,
                modifiers: Modifiers::NONE,
            })]
        );
    }

    #[test]
    fn parses_sgr_mouse_release() {
        let (events, _) = parse_input_bytes(b"\x1b[<0;1;1m");
        assert_eq!(
            events,
            vec![InputEvent::Mouse(MouseEvent {
                kind: MouseEventKind::Release(MouseButton::Left),
                x: 0,
                y: 0,
                modifiers: Modifiers::NONE,
            })]
        );
    }

    #[test]
    fn parses_sgr_mouse_scroll() {
        let (events, _) = parse_input_bytes(b"\x1b[<64;1;1M");
        assert_eq!(
            events,
            vec![InputEvent::Mouse(MouseEvent {
                kind: MouseEventKind::ScrollUp,
                x: 0,
                y: 0,
                modifiers: Modifiers::NONE,
            })]
        );
    }

    #[test]
    fn parses_bracketed_paste() {
        let mut input = Vec::new();
        input.extend_from_slice(b"\x1b[200~");
        input.extend_from_slice(b"pasted text");
        input.extend_from_slice(b"\x1b[201~");
        let (events, consumed) = parse_input_bytes(&input);
        assert_eq!(consumed, input.len());
        assert_eq!(events, vec![InputEvent::Text("pasted text".into())]);
    }

    #[test]
    fn incomplete_csi_sequence_is_held_back() {
        let (events, consumed) = parse_input_bytes(b"\x1b[");
        assert_eq!(consumed, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn parses_multibyte_utf8_char() {
        let (events, consumed) = parse_input_bytes("世".as_bytes());
        assert_eq!(consumed, 3);
        assert_eq!(
            events,
            vec![key(KeyCode::Char('世')), InputEvent::Text("世".into())]
        );
    }

    #[test]
    fn ctrl_letter_does_not_emit_text() {
        let (events, _) = parse_input_bytes(&[0x03]); // Ctrl-C
        assert_eq!(events.len(), 1);
        assert!(!matches!(events[0], InputEvent::Text(_)));
    }
}
