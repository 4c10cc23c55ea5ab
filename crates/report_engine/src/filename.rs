const FALLBACK_NAME: &str = "report";
const MAX_NAME_LEN: usize = 120;

/// Local file name for a server-provided `result_file`.
///
/// Only the last path component is kept, forbidden characters become `_`
/// and Windows device names get a trailing `_`, so the result always stays
/// inside the output directory.
pub fn safe_download_name(result_file: &str) -> String {
    let last = result_file
        .rsplit(['/', '\\'])
        .find(|part| !part.trim().is_empty())
        .unwrap_or("");

    let mut cleaned: String = last
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = FALLBACK_NAME.to_string();
    }
    if cleaned.len() > MAX_NAME_LEN {
        let mut end = MAX_NAME_LEN;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }
    let stem = cleaned.split('.').next().unwrap_or_default();
    if is_reserved_windows_name(stem) {
        let stem_len = stem.len();
        cleaned.insert(stem_len, '_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::safe_download_name;

    #[test]
    fn plain_names_are_kept() {
        assert_eq!(safe_download_name("report.pdf"), "report.pdf");
        assert_eq!(safe_download_name("Q3 summary.xlsx"), "Q3 summary.xlsx");
    }

    #[test]
    fn traversal_is_stripped() {
        assert_eq!(safe_download_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_download_name("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(safe_download_name(".."), "report");
        assert_eq!(safe_download_name(""), "report");
    }

    #[test]
    fn forbidden_characters_are_replaced() {
        assert_eq!(safe_download_name("a:b?.pdf"), "a_b_.pdf");
    }

    #[test]
    fn reserved_names_are_patched() {
        assert_eq!(safe_download_name("CON.pdf"), "CON_.pdf");
        assert_eq!(safe_download_name("nul"), "nul_");
    }
}
