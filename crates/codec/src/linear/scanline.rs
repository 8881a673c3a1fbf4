//! Reads a Code 128 symbol from a single row of pixels.

use super::patterns::{self, PATTERNS, START_A, START_C, STOP};

/// Rows with less spread than this between darkest and lightest pixel are
/// not worth binarising.
const MIN_CONTRAST: u8 = 48;
/// Upper bound on the summed per-element deviation (in modules) for a run
/// group to be accepted as a symbol.
const MAX_VARIANCE: f32 = 1.5;
/// Light modules required before the start symbol.
const QUIET_MODULES: f32 = 5.0;

/// Decodes the first valid symbol found in `row`, left to right.
pub(crate) fn decode(row: &[u8]) -> Option<String> {
    let dark = binarize(row)?;
    let leading = dark.iter().position(|&d| d)? as u32;
    let runs = runs(&dark[leading as usize..]);
    (0..runs.len()).step_by(2).find_map(|start| read_from(&runs, start, leading))
}

fn binarize(row: &[u8]) -> Option<Vec<bool>> {
    let (min, max) = row.iter().fold((u8::MAX, u8::MIN), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    if max.saturating_sub(min) < MIN_CONTRAST {
        return None;
    }
    let threshold = ((u16::from(min) + u16::from(max)) / 2) as u8;
    Some(row.iter().map(|&p| p < threshold).collect())
}

/// Alternating run lengths, starting with a dark run.
fn runs(dark: &[bool]) -> Vec<u32> {
    let mut runs = Vec::new();
    let mut current = true;
    let mut length = 0u32;
    for &pixel in dark {
        if pixel == current {
            length += 1;
        } else {
            runs.push(length);
            current = pixel;
            length = 1;
        }
    }
    if length > 0 {
        runs.push(length);
    }
    runs
}

/// Best matching symbol for six runs, with the module width it implies.
fn match_symbol(runs: &[u32]) -> Option<(u8, f32)> {
    let total: u32 = runs.iter().sum();
    if total == 0 {
        return None;
    }
    let unit = total as f32 / 11.0;
    let mut best: Option<(usize, f32)> = None;
    for (code, pattern) in PATTERNS.iter().enumerate() {
        let variance: f32 = runs.iter().zip(pattern).map(|(&run, &width)| (run as f32 / unit - f32::from(width)).abs()).sum();
        if best.is_none_or(|(_, lowest)| variance < lowest) {
            best = Some((code, variance));
        }
    }
    best.filter(|(_, variance)| *variance < MAX_VARIANCE).map(|(code, _)| (code as u8, unit))
}

fn read_from(runs: &[u32], start: usize, leading: u32) -> Option<String> {
    let (code, unit) = match_symbol(runs.get(start..start + 6)?)?;
    if !(START_A..=START_C).contains(&code) {
        return None;
    }
    let quiet = if start == 0 { leading } else { runs[start - 1] };
    let at_edge = start == 0 && leading == 0;
    if !at_edge && (quiet as f32) < QUIET_MODULES * unit {
        return None;
    }

    let mut codes = vec![code];
    let mut at = start + 6;
    loop {
        let (code, unit) = match_symbol(runs.get(at..at + 6)?)?;
        if code == STOP {
            let bar = *runs.get(at + 6)?;
            if (bar as f32 / unit - 2.0).abs() >= 1.0 {
                return None;
            }
            break;
        }
        codes.push(code);
        at += 6;
    }

    let check = codes.pop()?;
    if codes.len() < 2 || patterns::checksum(&codes) != check {
        tracing::trace!(symbols = codes.len(), "linear candidate failed checksum");
        return None;
    }
    patterns::interpret(&codes)
}
