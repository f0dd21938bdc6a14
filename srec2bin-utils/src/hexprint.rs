use std::fmt::Write;

const ROW_LEN: usize = 16;

/// Nicely format the given bytes as a hex block. The listed addresses will
/// start from `start`. Runs of identical full rows are collapsed into a
/// single `*` line, since ROM images are mostly blank fill.
pub fn pretty_print_hex_block(buf: &[u8], start: usize) -> String {
    let mut lines = Vec::new();
    let mut previous: Option<&[u8]> = None;
    let mut collapsing = false;
    for (i, row) in buf.chunks(ROW_LEN).enumerate() {
        if row.len() == ROW_LEN && previous == Some(row) {
            if !collapsing {
                lines.push(String::from("*"));
                collapsing = true;
            }
            continue;
        }
        collapsing = false;
        previous = Some(row);
        lines.push(format_row(row, start + i * ROW_LEN));
    }
    // Show where the block ends if its tail was collapsed.
    if collapsing {
        lines.push(format!("{:#010X}", start + buf.len()));
    }

    lines.join("\n")
}

/// Shortcut for starting the addresses at zero.
#[inline]
pub fn pretty_print_hex_block_zero(buf: &[u8]) -> String {
    pretty_print_hex_block(buf, 0)
}

/// Format up to 16 bytes as one line: a 10-character address, the bytes in
/// groups of four, then the ASCII representation between vertical bars.
fn format_row(row: &[u8], address: usize) -> String {
    let mut line = String::with_capacity(85);
    write!(line, "{:#010X}    ", address).unwrap();
    for i in 0..ROW_LEN {
        if i != 0 {
            line.push_str(separator(i));
        }
        match row.get(i) {
            Some(byte) => write!(line, "{:02X}", byte).unwrap(),
            None => line.push_str("  "),
        }
    }
    line.push_str("  |");
    line.extend(row.iter().copied().map(printable));
    line.push('|');
    line
}

/// Double space between groups of four bytes, single space otherwise.
fn separator(index: usize) -> &'static str {
    match index {
        4 | 8 | 12 => "  ",
        _ => " ",
    }
}

fn printable(chr: u8) -> char {
    match chr {
        32..=126 => chr.into(),
        _ => '.',
    }
}
