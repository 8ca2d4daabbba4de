use std::env;
use std::fmt;
use std::sync::OnceLock;

/// Trace categories, enabled via environment variables.
///
/// Supported:
/// - MOHAWK_TRACE="script,opcode" (comma/space separated; "all" enables all)
/// - MOHAWK_TRACE_SCRIPT=1, MOHAWK_TRACE_OPCODE=1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceKind {
    Script,
    Opcode,
}

const M_SCRIPT: u32 = 1 << 0;
const M_OPCODE: u32 = 1 << 1;

fn parse_bool_env(name: &str) -> bool {
    match env::var(name) {
        Ok(v) => {
            let s = v.trim().to_ascii_lowercase();
            !(s.is_empty() || s == "0" || s == "false" || s == "no" || s == "off")
        }
        Err(_) => false,
    }
}

fn parse_mask_from_trace_list(s: &str) -> u32 {
    let mut mask = 0u32;
    for raw in s.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
        let t = raw.trim().to_ascii_lowercase();
        if t.is_empty() {
            continue;
        }
        match t.as_str() {
            "all" => mask |= M_SCRIPT | M_OPCODE,
            "script" | "vm" => mask |= M_SCRIPT,
            "opcode" | "op" => mask |= M_OPCODE,
            _ => {}
        }
    }
    mask
}

fn build_mask() -> u32 {
    let mut mask = 0u32;

    if let Ok(list) = env::var("MOHAWK_TRACE") {
        mask |= parse_mask_from_trace_list(&list);
    }
    if parse_bool_env("MOHAWK_TRACE_SCRIPT") {
        mask |= M_SCRIPT;
    }
    if parse_bool_env("MOHAWK_TRACE_OPCODE") {
        mask |= M_OPCODE;
    }
    mask
}

fn mask() -> u32 {
    static MASK: OnceLock<u32> = OnceLock::new();
    *MASK.get_or_init(build_mask)
}

pub fn enabled(k: TraceKind) -> bool {
    let m = mask();
    match k {
        TraceKind::Script => (m & M_SCRIPT) != 0,
        TraceKind::Opcode => (m & M_OPCODE) != 0,
    }
}

pub fn script(args: fmt::Arguments) {
    if !enabled(TraceKind::Script) {
        return;
    }
    log::info!("{}", args);
}

pub fn opcode(args: fmt::Arguments) {
    if !enabled(TraceKind::Opcode) {
        return;
    }
    log::info!("{}", args);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_list_parsing() {
        assert_eq!(parse_mask_from_trace_list("script, opcode"), M_SCRIPT | M_OPCODE);
        assert_eq!(parse_mask_from_trace_list("text"), 0);
        assert_eq!(parse_mask_from_trace_list("ALL"), M_SCRIPT | M_OPCODE);
        assert_eq!(parse_mask_from_trace_list("op;bogus"), M_OPCODE);
        assert_eq!(parse_mask_from_trace_list(""), 0);
    }
}
