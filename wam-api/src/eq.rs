//! Seven-band equalizer encoding

use crate::call::Argument;
use crate::error::CommandError;

/// Named presets and the index the device knows them by
pub const EQ_PRESETS: &[(&str, i64)] = &[
    ("Normal", 0),
    ("Flat", 1),
    ("Jazz", 2),
    ("Rock", 3),
    ("Classical", 4),
    ("Bass Boost", 5),
    ("Treble Boost", 6),
    ("Movie", 7),
    ("Voice", 8),
];

/// Number of integers `set_eq_values` takes: the preset index then 7 bands
pub const EQ_VALUE_COUNT: usize = 8;

/// Index of the preset called `name`, or 0 (Normal) for an unknown name
pub fn preset_index(name: &str) -> i64 {
    match EQ_PRESETS.iter().find(|(preset, _)| *preset == name) {
        Some((_, index)) => *index,
        None => {
            tracing::warn!("Unknown EQ preset '{}', using Normal", name);
            0
        }
    }
}

/// Parse `"p,b1,b2,b3,b4,b5,b6,b7"` into `presetindex` and `eqvalue1..7`
pub fn parse_eq_values(command: &str, value: &str) -> Result<Vec<Argument>, CommandError> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != EQ_VALUE_COUNT {
        return Err(CommandError::invalid(
            command,
            value,
            format!("expected {} comma-separated integers, got {}", EQ_VALUE_COUNT, parts.len()),
        ));
    }

    let mut numbers = Vec::with_capacity(EQ_VALUE_COUNT);
    for part in parts {
        let n: i64 = part
            .parse()
            .map_err(|_| CommandError::invalid(command, value, format!("'{}' is not an integer", part)))?;
        numbers.push(n);
    }

    let mut args = vec![Argument::dec("presetindex", numbers[0])];
    args.extend(
        numbers[1..]
            .iter()
            .enumerate()
            .map(|(i, n)| Argument::dec(&format!("eqvalue{}", i + 1), *n)),
    );
    Ok(args)
}
