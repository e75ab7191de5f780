// src/core/sanitize.rs

pub const NBSP: char = '\u{a0}';

/// Decode the entities report/profile pages actually emit. `&nbsp;` becomes
/// a real non-breaking space so callers can still split on it.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_one(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_one(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "nbsp" => Some(NBSP),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "eacute" => Some('é'),
        "egrave" => Some('è'),
        "ecirc" => Some('ê'),
        "agrave" => Some('à'),
        "ccedil" => Some('ç'),
        "ouml" => Some('ö'),
        "uuml" => Some('ü'),
        "auml" => Some('ä'),
        _ => None,
    }
}

/// Decode entities and flatten non-breaking spaces to plain ones.
pub fn normalize_entities(s: &str) -> String {
    decode_entities(s).replace(NBSP, " ")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// `"M:SS"` → total seconds. Parentheses and any whitespace are ignored,
/// so `"(2:05)"` and `" 2:05\n"` both read as 125.
pub fn parse_clock(s: &str) -> Option<u32> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .collect();
    let (m, sec) = cleaned.split_once(':')?;
    let minutes: u32 = m.parse().ok()?;
    let seconds: u32 = sec.parse().ok()?;
    minutes.checked_mul(60)?.checked_add(seconds)
}

/// `"23.45%"` → 23.45. Only finite values in `[0, 100]` pass.
pub fn parse_percent(s: &str) -> Option<f64> {
    let v: f64 = s.trim().trim_end_matches('%').trim().parse().ok()?;
    (v.is_finite() && (0.0..=100.0).contains(&v)).then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_minutes_times_sixty_plus_seconds() {
        assert_eq!(parse_clock("2:05"), Some(125));
        assert_eq!(parse_clock("(10:00)"), Some(600));
        assert_eq!(parse_clock("\n  0:59 "), Some(59));
        for m in [0u32, 1, 7, 42] {
            for sec in [0u32, 9, 30, 59] {
                assert_eq!(parse_clock(&format!("{m}:{sec:02}")), Some(m * 60 + sec));
            }
        }
    }

    #[test]
    fn clock_rejects_garbage() {
        assert_eq!(parse_clock(""), None);
        assert_eq!(parse_clock("5"), None);
        assert_eq!(parse_clock("a:05"), None);
        assert_eq!(parse_clock("1:02:03"), None);
    }

    #[test]
    fn percent_parsing() {
        assert_eq!(parse_percent("23.45%"), Some(23.45));
        assert_eq!(parse_percent(" 100% "), Some(100.0));
        assert_eq!(parse_percent("n/a"), None);
        assert_eq!(parse_percent("120%"), None);
    }

    #[test]
    fn entities_keep_nbsp_until_normalized() {
        assert_eq!(decode_entities("Ragnarok&nbsp;(Chaos)"), "Ragnarok\u{a0}(Chaos)");
        assert_eq!(normalize_entities("Trinit&eacute; F&#233;ale"), "Trinité Féale");
        assert_eq!(decode_entities("Q&A &bogus; &"), "Q&A &bogus; &");
        assert_eq!(decode_entities("Queen&#39;s Justice"), "Queen's Justice");
    }
}
