//! Formatting utility functions.

/// Format byte count as human-readable string.
///
/// # Examples
/// ```
/// use gramscope::util::format::format_bytes;
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a single hex-view row.
///
/// Format: `XXXXXXXX  XX XX .. XX  |ascii|`, padded so rows align for any
/// column count.
pub fn hex_row(data: &[u8], row_offset: usize, columns: usize) -> String {
    use std::fmt::Write;

    let columns = columns.max(1);
    let end = (row_offset + columns).min(data.len());
    let chunk = if row_offset < data.len() {
        &data[row_offset..end]
    } else {
        &[]
    };

    let mut output = String::with_capacity(12 + columns * 4);
    let _ = write!(output, "{:08X}  ", row_offset);

    for &byte in chunk {
        let _ = write!(output, "{byte:02X} ");
    }
    for _ in chunk.len()..columns {
        output.push_str("   ");
    }

    output.push_str(" |");
    for &byte in chunk {
        if (32..=126).contains(&byte) {
            output.push(byte as char);
        } else {
            output.push('.');
        }
    }
    output.push('|');

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_hex_row() {
        let data = [0x48u8, 0x65, 0x6c, 0x6c, 0x6f]; // "Hello"
        let row = hex_row(&data, 0, 16);
        assert!(row.starts_with("00000000  48 65 6C 6C 6F"));
        assert!(row.ends_with("|Hello|"));
    }

    #[test]
    fn test_hex_row_past_end() {
        let data = [0u8; 4];
        let row = hex_row(&data, 16, 8);
        assert!(row.ends_with("||"));
    }

    #[test]
    fn test_hex_rows_align() {
        let data: Vec<u8> = (0..40).collect();
        let full = hex_row(&data, 0, 16);
        let partial = hex_row(&data, 32, 16);
        let bar = |s: &str| s.find('|').unwrap();
        assert_eq!(bar(&full), bar(&partial));
    }
}
