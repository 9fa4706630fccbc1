// ==========================================
// IMP 批次导入服务 - 跳过模式判定
// ==========================================
// 职责: 批次首行包含任一跳过模式 → 整个文件跳过派生
// ==========================================

/// 取批次首行（第一个 '\n' 之前的内容，按 UTF-8 宽松解码）
pub fn first_line(raw: &[u8]) -> String {
    let end = raw.iter().position(|b| *b == b'\n').unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// 返回首行命中的第一个跳过模式
///
/// 首行为空时永不命中；空模式被忽略。
pub fn match_skip_pattern(raw: &[u8], patterns: &[String]) -> Option<String> {
    let line = first_line(raw);
    if line.is_empty() {
        return None;
    }
    patterns
        .iter()
        .filter(|p| !p.is_empty())
        .find(|p| line.contains(p.as_str()))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_line_only() {
        let raw = b"HEADER;X\nROW-VKa;1\n";
        assert_eq!(match_skip_pattern(raw, &patterns(&["-VKa"])), None);

        let raw = b"HEADER-VKa;X\nROW;1\n";
        assert_eq!(
            match_skip_pattern(raw, &patterns(&["-VKa"])),
            Some("-VKa".to_string())
        );
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let raw = b"A-QQ-VKa";
        assert_eq!(
            match_skip_pattern(raw, &patterns(&["-ZZ", "-VKa", "-QQ"])),
            Some("-VKa".to_string())
        );
    }

    #[test]
    fn test_empty_first_line_never_matches() {
        let raw = b"\nA-VKa;1";
        assert_eq!(match_skip_pattern(raw, &patterns(&["-VKa"])), None);
        assert_eq!(match_skip_pattern(b"", &patterns(&["-VKa"])), None);
    }

    #[test]
    fn test_empty_pattern_ignored() {
        assert_eq!(match_skip_pattern(b"ABC", &patterns(&[""])), None);
    }
}
